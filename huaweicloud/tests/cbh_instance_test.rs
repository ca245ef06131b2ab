//! Integration tests for the CBH instance resource

mod common;

use mockito::{Matcher, Server};
use tf_provider::value::Value;
use tf_provider::{Diagnostics, Resource};

use huaweicloud::resources::cbh_instance::{CbhInstanceResource, CbhInstanceState};

const LIST_BODY: &str = r#"{
    "instance": [
        {
            "server_id": "sid-1",
            "name": "bastion",
            "status": "ACTIVE",
            "flavor_id": "cbh.basic.50",
            "vpc_id": "vpc-1",
            "subnet_id": "subnet-1",
            "security_group_id": "sg-1",
            "availability_zone": "cn-north-4a",
            "private_ip": "192.168.0.8",
            "public_ip": "1.2.3.4",
            "version": "3.3.38.0"
        }
    ]
}"#;

fn existing_state<'a>() -> CbhInstanceState<'a> {
    CbhInstanceState {
        id: Value::Value("sid-1".into()),
        name: Value::Value("bastion".into()),
        flavor_id: Value::Value("cbh.basic.50".into()),
        vpc_id: Value::Value("vpc-1".into()),
        subnet_id: Value::Value("subnet-1".into()),
        security_group_id: Value::Value("sg-1".into()),
        availability_zone: Value::Value("cn-north-4a".into()),
        password: Value::Value("Sup3rSecret!".into()),
        ..Default::default()
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn read_flattens_the_instance_list_entry() {
    let mut server = Server::new_async().await;
    let _list_mock = server
        .mock("GET", "/v2/pid/cbs/instance/list")
        .with_body(LIST_BODY)
        .create_async()
        .await;

    let resource = CbhInstanceResource::new(common::shared_data(&[("cbh", &server.url())]));
    let mut diags = Diagnostics::default();

    let (state, _) = resource
        .read(
            &mut diags,
            Value::Value(existing_state()),
            Value::Null,
            Value::Null,
        )
        .await
        .expect("read should succeed");

    assert!(diags.errors.is_empty(), "diags: {:?}", diags.errors);
    let state = state.as_option().expect("state should be present");
    assert_eq!(state.status.as_str(), "ACTIVE");
    assert_eq!(state.private_ip.as_str(), "192.168.0.8");
    assert_eq!(state.public_ip.as_str(), "1.2.3.4");
    assert_eq!(state.version.as_str(), "3.3.38.0");
}

#[tokio::test(flavor = "multi_thread")]
async fn read_of_vanished_instance_clears_the_state() {
    let mut server = Server::new_async().await;
    let _list_mock = server
        .mock("GET", "/v2/pid/cbs/instance/list")
        .with_body(r#"{"instance": []}"#)
        .create_async()
        .await;

    let resource = CbhInstanceResource::new(common::shared_data(&[("cbh", &server.url())]));
    let mut diags = Diagnostics::default();

    let (state, _) = resource
        .read(
            &mut diags,
            Value::Value(existing_state()),
            Value::Null,
            Value::Null,
        )
        .await
        .expect("read should succeed");

    assert!(diags.errors.is_empty());
    assert!(state.is_null());
}

#[tokio::test(flavor = "multi_thread")]
async fn update_rotates_password_and_binds_eip() {
    let mut server = Server::new_async().await;

    let password_mock = server
        .mock("PUT", "/v2/pid/cbs/instance/password")
        .match_body(Matcher::PartialJsonString(
            r#"{"server_id": "sid-1", "new_password": "EvenM0reSecret!"}"#.to_string(),
        ))
        .create_async()
        .await;
    let bind_mock = server
        .mock("POST", "/v2/pid/cbs/instance/sid-1/eip/bind")
        .match_body(Matcher::PartialJsonString(
            r#"{"publicip_id": "eip-1"}"#.to_string(),
        ))
        .create_async()
        .await;
    let _list_mock = server
        .mock("GET", "/v2/pid/cbs/instance/list")
        .with_body(LIST_BODY)
        .create_async()
        .await;

    let resource = CbhInstanceResource::new(common::shared_data(&[("cbh", &server.url())]));
    let mut diags = Diagnostics::default();

    let prior = existing_state();
    let mut planned = existing_state();
    planned.password = Value::Value("EvenM0reSecret!".into());
    planned.public_ip_id = Value::Value("eip-1".into());

    let (state, _) = resource
        .update(
            &mut diags,
            Value::Value(prior),
            Value::Value(planned.clone()),
            Value::Value(planned),
            Value::Null,
            Value::Null,
        )
        .await
        .expect("update should succeed");

    assert!(diags.errors.is_empty(), "diags: {:?}", diags.errors);
    let state = state.as_option().expect("state should be present");
    assert_eq!(state.id.as_str(), "sid-1");
    password_mock.assert_async().await;
    bind_mock.assert_async().await;
}

#[tokio::test]
async fn validate_rejects_short_passwords() {
    let resource = CbhInstanceResource::new(common::unconfigured_data());
    let mut diags = Diagnostics::default();

    let mut config = existing_state();
    config.password = Value::Value("short".into());

    let result = resource.validate(&mut diags, Value::Value(config)).await;
    assert!(result.is_none());
    assert_eq!(diags.errors[0].summary, "Invalid password");
}

#[tokio::test]
async fn operations_require_a_configured_provider() {
    let resource = CbhInstanceResource::new(common::unconfigured_data());
    let mut diags = Diagnostics::default();

    let result = resource
        .read(
            &mut diags,
            Value::Value(existing_state()),
            Value::Null,
            Value::Null,
        )
        .await;

    assert!(result.is_none());
    assert_eq!(diags.errors[0].summary, "Provider not configured");
}

#[tokio::test]
async fn plan_update_marks_create_only_changes_for_replacement() {
    let resource = CbhInstanceResource::new(common::unconfigured_data());
    let mut diags = Diagnostics::default();

    let prior = existing_state();
    let mut proposed = existing_state();
    proposed.vpc_id = Value::Value("vpc-2".into());
    proposed.name = Value::Value("renamed".into());

    let (_, _, triggers) = resource
        .plan_update(
            &mut diags,
            Value::Value(prior),
            Value::Value(proposed.clone()),
            Value::Value(proposed),
            Value::Null,
            Value::Null,
        )
        .await
        .expect("plan should succeed");

    let paths: Vec<String> = triggers.iter().map(|path| format!("{}", path)).collect();
    assert!(paths.contains(&"vpc_id".to_string()), "paths: {:?}", paths);
    assert!(paths.contains(&"name".to_string()), "paths: {:?}", paths);
    assert_eq!(triggers.len(), 2);
}
