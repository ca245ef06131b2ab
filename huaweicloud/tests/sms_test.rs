//! Integration tests for the SMS task resource and source servers data source

mod common;

use mockito::{Matcher, Server};
use tf_provider::value::Value;
use tf_provider::{DataSource, Diagnostics, Resource};

use huaweicloud::data_sources::sms_source_servers::{
    SmsSourceServersDataSource, SmsSourceServersState,
};
use huaweicloud::resources::sms_task::{SmsTaskResource, SmsTaskState};

const TASK_BODY: &str = r#"{
    "id": "task-1",
    "type": "MIGRATE_FILE",
    "os_type": "LINUX",
    "state": "READY",
    "enterprise_project_id": "0",
    "source_server": {"id": "src-1", "name": "legacy-host"},
    "target_server": {"vm_id": "vm-9", "name": "migrated-host"}
}"#;

fn task_config<'a>() -> SmsTaskState<'a> {
    SmsTaskState {
        task_type: Value::Value("MIGRATE_FILE".into()),
        os_type: Value::Value("LINUX".into()),
        source_server_id: Value::Value("src-1".into()),
        region: Value::Value(common::TEST_REGION.into()),
        use_public_ip: Value::Value(true),
        ..Default::default()
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn task_create_applies_requested_action() {
    let mut server = Server::new_async().await;

    let create_mock = server
        .mock("POST", "/v3/tasks")
        .match_body(Matcher::PartialJsonString(
            r#"{"type": "MIGRATE_FILE", "os_type": "LINUX", "source_server_id": "src-1"}"#
                .to_string(),
        ))
        .with_body(r#"{"id": "task-1"}"#)
        .create_async()
        .await;
    let action_mock = server
        .mock("POST", "/v3/tasks/task-1/action")
        .match_body(Matcher::PartialJsonString(
            r#"{"operation": "start"}"#.to_string(),
        ))
        .create_async()
        .await;
    let _get_mock = server
        .mock("GET", "/v3/tasks/task-1")
        .with_body(TASK_BODY)
        .create_async()
        .await;

    let resource = SmsTaskResource::new(common::shared_data(&[("sms", &server.url())]));
    let mut diags = Diagnostics::default();

    let mut config = task_config();
    config.action = Value::Value("start".into());

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
    assert_eq!(state.id.as_str(), "task-1");
    assert_eq!(state.state.as_str(), "READY");
    assert_eq!(state.target_server_id.as_str(), "vm-9");
    assert_eq!(state.target_server_name.as_str(), "migrated-host");

    create_mock.assert_async().await;
    action_mock.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn task_read_gone_clears_state() {
    let mut server = Server::new_async().await;
    let _get_mock = server
        .mock("GET", "/v3/tasks/task-1")
        .with_status(404)
        .with_body(r#"{"error_code": "SMS.0202", "error_msg": "task not found"}"#)
        .create_async()
        .await;

    let resource = SmsTaskResource::new(common::shared_data(&[("sms", &server.url())]));
    let mut diags = Diagnostics::default();

    let mut state = task_config();
    state.id = Value::Value("task-1".into());
    let (new_state, _) = resource
        .read(&mut diags, Value::Value(state), Value::Null, Value::Null)
        .await
        .expect("read should succeed");

    assert!(diags.errors.is_empty());
    assert!(new_state.is_null());
}

#[tokio::test]
async fn task_validate_rejects_unknown_action() {
    let resource = SmsTaskResource::new(common::unconfigured_data());
    let mut diags = Diagnostics::default();

    let mut config = task_config();
    config.action = Value::Value("explode".into());

    let result = resource.validate(&mut diags, Value::Value(config)).await;
    assert!(result.is_none());
    assert_eq!(diags.errors[0].summary, "Invalid action");
}

#[tokio::test(flavor = "multi_thread")]
async fn source_servers_are_filtered_and_flattened() {
    let mut server = Server::new_async().await;
    let list_mock = server
        .mock("GET", "/v3/sources")
        .match_query(Matcher::UrlEncoded("state".into(), "unavailable".into()))
        .with_body(
            r#"{
                "count": 1,
                "source_servers": [
                    {
                        "id": "src-1",
                        "name": "legacy-host",
                        "ip": "10.0.0.12",
                        "os_type": "LINUX",
                        "os_version": "CENTOS_7_9",
                        "state": "unavailable",
                        "connected": false,
                        "agent_version": "25.0.0"
                    }
                ]
            }"#,
        )
        .create_async()
        .await;

    let data_source =
        SmsSourceServersDataSource::new(common::shared_data(&[("sms", &server.url())]));
    let mut diags = Diagnostics::default();

    let config = SmsSourceServersState {
        state: Value::Value("unavailable".into()),
        ..Default::default()
    };

    let state = data_source
        .read(&mut diags, config, Value::Null)
        .await
        .expect("read should succeed");

    assert!(diags.errors.is_empty(), "diags: {:?}", diags.errors);
    let servers = state.servers.as_ref_option().expect("servers should be set");
    assert_eq!(servers.len(), 1);
    let entry = servers[0].as_ref_option().expect("entry should be present");
    assert_eq!(entry.id.as_str(), "src-1");
    assert_eq!(entry.os_version.as_str(), "CENTOS_7_9");
    assert_eq!(entry.connected, Value::Value(false));

    list_mock.assert_async().await;
}
