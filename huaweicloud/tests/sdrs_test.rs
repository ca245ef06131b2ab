//! Integration tests for the SDRS resources and domain data source

mod common;

use mockito::{Matcher, Server};
use tf_provider::value::Value;
use tf_provider::{DataSource, Diagnostics, Resource};

use huaweicloud::data_sources::sdrs_domain::{SdrsDomainDataSource, SdrsDomainState};
use huaweicloud::resources::sdrs_protection_group::{
    SdrsProtectionGroupResource, SdrsProtectionGroupState,
};

const GROUP_BODY: &str = r#"{
    "server_group": {
        "id": "group-1",
        "name": "dr-group",
        "status": "available",
        "source_availability_zone": "cn-north-4a",
        "target_availability_zone": "cn-north-4b",
        "domain_id": "domain-1",
        "source_vpc_id": "vpc-1",
        "dr_type": "migration",
        "protected_instances": []
    }
}"#;

fn group_config<'a>() -> SdrsProtectionGroupState<'a> {
    SdrsProtectionGroupState {
        name: Value::Value("dr-group".into()),
        source_availability_zone: Value::Value("cn-north-4a".into()),
        target_availability_zone: Value::Value("cn-north-4b".into()),
        domain_id: Value::Value("domain-1".into()),
        source_vpc_id: Value::Value("vpc-1".into()),
        dr_type: Value::Value("migration".into()),
        ..Default::default()
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn protection_group_create_polls_the_job() {
    let mut server = Server::new_async().await;

    let create_mock = server
        .mock("POST", "/v1/pid/server-groups")
        .match_body(Matcher::PartialJsonString(
            r#"{"server_group": {"name": "dr-group", "domain_id": "domain-1"}}"#.to_string(),
        ))
        .with_body(r#"{"job_id": "job-1"}"#)
        .create_async()
        .await;
    let job_mock = server
        .mock("GET", "/v1/pid/jobs/job-1")
        .with_body(
            r#"{"status": "SUCCESS", "entities": {"server_group_id": "group-1"}}"#,
        )
        .expect_at_least(2)
        .create_async()
        .await;
    let get_mock = server
        .mock("GET", "/v1/pid/server-groups/group-1")
        .with_body(GROUP_BODY)
        .create_async()
        .await;

    let resource =
        SdrsProtectionGroupResource::new(common::shared_data(&[("sdrs", &server.url())]));
    let mut diags = Diagnostics::default();

    let (state, _) = resource
        .create(
            &mut diags,
            Value::Value(group_config()),
            Value::Value(group_config()),
            Value::Null,
            Value::Null,
        )
        .await
        .expect("create should succeed");

    assert!(diags.errors.is_empty(), "diags: {:?}", diags.errors);
    let state = state.as_option().expect("state should be present");
    assert_eq!(state.id.as_str(), "group-1");
    assert_eq!(state.status.as_str(), "available");
    assert_eq!(state.enable, Value::Value(false));

    create_mock.assert_async().await;
    job_mock.assert_async().await;
    get_mock.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn protection_group_create_fails_on_failed_job() {
    let mut server = Server::new_async().await;

    let _create_mock = server
        .mock("POST", "/v1/pid/server-groups")
        .with_body(r#"{"job_id": "job-1"}"#)
        .create_async()
        .await;
    let _job_mock = server
        .mock("GET", "/v1/pid/jobs/job-1")
        .with_body(r#"{"status": "FAIL", "fail_reason": "quota exceeded"}"#)
        .create_async()
        .await;

    let resource =
        SdrsProtectionGroupResource::new(common::shared_data(&[("sdrs", &server.url())]));
    let mut diags = Diagnostics::default();

    let result = resource
        .create(
            &mut diags,
            Value::Value(group_config()),
            Value::Value(group_config()),
            Value::Null,
            Value::Null,
        )
        .await;

    assert!(result.is_none());
    assert!(!diags.errors.is_empty());
    assert!(
        diags.errors[0].detail.contains("quota exceeded"),
        "detail: {}",
        diags.errors[0].detail
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn domain_data_source_returns_the_domain() {
    let mut server = Server::new_async().await;
    let _list_mock = server
        .mock("GET", "/v1/pid/active-domains")
        .with_body(
            r#"{
                "domains": [
                    {"id": "domain-1", "name": "domain_001", "description": "default domain"}
                ]
            }"#,
        )
        .create_async()
        .await;

    let data_source = SdrsDomainDataSource::new(common::shared_data(&[("sdrs", &server.url())]));
    let mut diags = Diagnostics::default();

    let state = data_source
        .read(&mut diags, SdrsDomainState::default(), Value::Null)
        .await
        .expect("read should succeed");

    assert!(diags.errors.is_empty(), "diags: {:?}", diags.errors);
    assert_eq!(state.id.as_str(), "domain-1");
    assert_eq!(state.name.as_str(), "domain_001");
    assert_eq!(state.description.as_str(), "default domain");
}
