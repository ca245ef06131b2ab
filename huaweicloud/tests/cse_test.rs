//! Integration tests for the CSE engine and microservice resources

mod common;

use mockito::{Matcher, Server};
use tf_provider::value::Value;
use tf_provider::{Diagnostics, Resource};

use huaweicloud::resources::cse_engine::{CseEngineResource, CseEngineState};
use huaweicloud::resources::cse_microservice::{CseMicroserviceResource, CseMicroserviceState};

#[tokio::test(flavor = "multi_thread")]
async fn engine_read_flattens_limits_and_addresses() {
    let mut server = Server::new_async().await;
    let _get_mock = server
        .mock("GET", "/v2/pid/enginemgr/engines/eng-1")
        .with_body(
            r#"{
                "id": "eng-1",
                "name": "engine",
                "status": "Available",
                "flavor": "cse.s1.small2",
                "azList": ["cn-north-4a"],
                "authType": "RBAC",
                "version": "2.4.0",
                "reference": {"serviceLimit": 200, "instanceLimit": 2000},
                "externalEntrypoint": {
                    "serviceCenterAddress": "https://192.168.0.10:30100",
                    "configCenterAddress": "https://192.168.0.10:30110"
                }
            }"#,
        )
        .create_async()
        .await;

    let resource = CseEngineResource::new(common::shared_data(&[("cse", &server.url())]));
    let mut diags = Diagnostics::default();

    let state = CseEngineState {
        id: Value::Value("eng-1".into()),
        name: Value::Value("engine".into()),
        ..Default::default()
    };

    let (new_state, _) = resource
        .read(&mut diags, Value::Value(state), Value::Null, Value::Null)
        .await
        .expect("read should succeed");

    assert!(diags.errors.is_empty(), "diags: {:?}", diags.errors);
    let state = new_state.as_option().expect("state should be present");
    assert_eq!(state.status.as_str(), "Available");
    assert_eq!(state.service_limit, Value::Value(200));
    assert_eq!(state.instance_limit, Value::Value(2000));
    assert_eq!(
        state.service_registry_address.as_str(),
        "https://192.168.0.10:30100"
    );
    assert!(state.service_registry_public_address.is_null());
}

#[tokio::test]
async fn engine_validate_requires_password_for_rbac() {
    let resource = CseEngineResource::new(common::unconfigured_data());
    let mut diags = Diagnostics::default();

    let config = CseEngineState {
        name: Value::Value("engine".into()),
        flavor: Value::Value("cse.s1.small2".into()),
        auth_type: Value::Value("RBAC".into()),
        ..Default::default()
    };

    let result = resource.validate(&mut diags, Value::Value(config)).await;
    assert!(result.is_none());
    assert_eq!(diags.errors[0].summary, "Missing admin_pass");
}

#[tokio::test(flavor = "multi_thread")]
async fn microservice_create_uses_the_engine_token() {
    let mut server = Server::new_async().await;

    let token_mock = server
        .mock("POST", "/v4/token")
        .match_body(Matcher::PartialJsonString(
            r#"{"name": "root", "password": "Cse-Secret1"}"#.to_string(),
        ))
        .with_body(r#"{"token": "engine-token"}"#)
        .create_async()
        .await;
    let create_mock = server
        .mock("POST", "/v4/default/registry/microservices")
        .match_header("authorization", "Bearer engine-token")
        .match_body(Matcher::PartialJsonString(
            r#"{"service": {"serviceName": "orders", "appId": "shop", "version": "1.0.0"}}"#
                .to_string(),
        ))
        .with_body(r#"{"serviceId": "svc-1"}"#)
        .create_async()
        .await;
    let _get_mock = server
        .mock("GET", "/v4/default/registry/microservices/svc-1")
        .with_body(
            r#"{
                "service": {
                    "serviceId": "svc-1",
                    "serviceName": "orders",
                    "appId": "shop",
                    "version": "1.0.0",
                    "environment": "production",
                    "status": "UP"
                }
            }"#,
        )
        .create_async()
        .await;

    let resource = CseMicroserviceResource::new(common::shared_data(&[]));
    let mut diags = Diagnostics::default();

    let config = CseMicroserviceState {
        connect_address: Value::Value(server.url().into()),
        name: Value::Value("orders".into()),
        app_name: Value::Value("shop".into()),
        version: Value::Value("1.0.0".into()),
        environment: Value::Value("production".into()),
        admin_user: Value::Value("root".into()),
        admin_pass: Value::Value("Cse-Secret1".into()),
        ..Default::default()
    };

    let (state, _) = resource
        .create(
            &mut diags,
            Value::Value(config.clone()),
            Value::Value(config),
            Value::Null,
            Value::Null,
        )
        .await
        .expect("create should succeed");

    assert!(diags.errors.is_empty(), "diags: {:?}", diags.errors);
    let state = state.as_option().expect("state should be present");
    assert_eq!(state.id.as_str(), "svc-1");
    assert_eq!(state.status.as_str(), "UP");

    token_mock.assert_async().await;
    create_mock.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn microservice_destroy_forces_deregistration() {
    let mut server = Server::new_async().await;
    let delete_mock = server
        .mock("DELETE", "/v4/default/registry/microservices/svc-1")
        .match_query(Matcher::UrlEncoded("force".into(), "true".into()))
        .create_async()
        .await;

    let resource = CseMicroserviceResource::new(common::shared_data(&[]));
    let mut diags = Diagnostics::default();

    let state = CseMicroserviceState {
        id: Value::Value("svc-1".into()),
        connect_address: Value::Value(server.url().into()),
        name: Value::Value("orders".into()),
        app_name: Value::Value("shop".into()),
        version: Value::Value("1.0.0".into()),
        ..Default::default()
    };

    resource
        .destroy(&mut diags, Value::Value(state), Value::Null)
        .await
        .expect("destroy should succeed");

    assert!(diags.errors.is_empty());
    delete_mock.assert_async().await;
}
