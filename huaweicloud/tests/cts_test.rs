//! Integration tests for the CTS tracker and notification resources

mod common;

use mockito::{Matcher, Server};
use tf_provider::value::Value;
use tf_provider::{Diagnostics, Resource};

use huaweicloud::resources::cts_notification::{CtsNotificationResource, CtsNotificationState};
use huaweicloud::resources::cts_tracker::{CtsTrackerResource, CtsTrackerState};

fn tracker_config<'a>() -> CtsTrackerState<'a> {
    CtsTrackerState {
        bucket_name: Value::Value("audit-bucket".into()),
        file_prefix: Value::Value("trace".into()),
        lts_enabled: Value::Value(true),
        ..Default::default()
    }
}

const TRACKER_BODY: &str = r#"{
    "id": "tracker-1",
    "tracker_name": "system",
    "tracker_type": "system",
    "status": "enabled",
    "obs_info": {"bucket_name": "audit-bucket", "file_prefix_name": "trace", "is_sort_by_service": false},
    "lts": {"is_lts_enabled": true, "log_group_name": "CTS", "log_topic_name": "system-trace"},
    "agency_name": "cts_admin_trust"
}"#;

#[tokio::test(flavor = "multi_thread")]
async fn tracker_create_and_read_lifecycle() {
    let mut server = Server::new_async().await;

    let create_mock = server
        .mock("POST", "/v3/pid/tracker")
        .match_header(
            "authorization",
            Matcher::Regex("SDK-HMAC-SHA256 Access=test-ak.*".to_string()),
        )
        .with_body(TRACKER_BODY)
        .create_async()
        .await;
    let get_mock = server
        .mock("GET", "/v3/pid/trackers")
        .match_query(Matcher::UrlEncoded("tracker_name".into(), "system".into()))
        .with_body(format!(r#"{{"trackers":[{}]}}"#, TRACKER_BODY))
        .create_async()
        .await;

    let resource = CtsTrackerResource::new(common::shared_data(&[("cts", &server.url())]));
    let mut diags = Diagnostics::default();

    let (state, _) = resource
        .create(
            &mut diags,
            Value::Value(tracker_config()),
            Value::Value(tracker_config()),
            Value::Null,
            Value::Null,
        )
        .await
        .expect("create should succeed");

    assert!(diags.errors.is_empty(), "diags: {:?}", diags.errors);
    let state = state.as_option().expect("state should be present");
    assert_eq!(state.id.as_str(), "tracker-1");
    assert_eq!(state.name.as_str(), "system");
    assert_eq!(state.status.as_str(), "enabled");
    assert_eq!(state.enabled, Value::Value(true));
    assert_eq!(state.agency_name.as_str(), "cts_admin_trust");

    create_mock.assert_async().await;
    get_mock.assert_async().await;

    // a subsequent read keeps the flattened attributes
    let mut diags = Diagnostics::default();
    let (read_state, _) = resource
        .read(&mut diags, Value::Value(state.clone()), Value::Null, Value::Null)
        .await
        .expect("read should succeed");
    assert!(diags.errors.is_empty());
    let read_state = read_state.as_option().expect("state should be present");
    assert_eq!(read_state.bucket_name.as_str(), "audit-bucket");
    assert_eq!(read_state.lts_enabled, Value::Value(true));
}

#[tokio::test(flavor = "multi_thread")]
async fn tracker_gone_is_removed_from_state() {
    let mut server = Server::new_async().await;

    let _get_mock = server
        .mock("GET", "/v3/pid/trackers")
        .match_query(Matcher::Any)
        .with_body(r#"{"trackers":[]}"#)
        .create_async()
        .await;

    let resource = CtsTrackerResource::new(common::shared_data(&[("cts", &server.url())]));
    let mut diags = Diagnostics::default();

    let mut state = tracker_config();
    state.id = Value::Value("tracker-1".into());
    let (new_state, _) = resource
        .read(&mut diags, Value::Value(state), Value::Null, Value::Null)
        .await
        .expect("read should succeed");

    assert!(diags.errors.is_empty());
    assert!(new_state.is_null(), "vanished tracker must clear the state");
}

#[tokio::test(flavor = "multi_thread")]
async fn tracker_destroy_disables_by_default() {
    let mut server = Server::new_async().await;

    let update_mock = server
        .mock("PUT", "/v3/pid/tracker")
        .match_body(Matcher::PartialJsonString(
            r#"{"status": "disabled"}"#.to_string(),
        ))
        .create_async()
        .await;

    let resource = CtsTrackerResource::new(common::shared_data(&[("cts", &server.url())]));
    let mut diags = Diagnostics::default();

    let mut state = tracker_config();
    state.id = Value::Value("tracker-1".into());
    resource
        .destroy(&mut diags, Value::Value(state), Value::Null)
        .await
        .expect("destroy should succeed");

    assert!(diags.errors.is_empty());
    update_mock.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn notification_lifecycle() {
    let mut server = Server::new_async().await;

    let create_mock = server
        .mock("POST", "/v3/pid/notifications")
        .match_body(Matcher::PartialJsonString(
            r#"{"notification_name": "key-events", "operation_type": "complete"}"#.to_string(),
        ))
        .with_body(
            r#"{
                "notification_id": "n-1",
                "notification_name": "key-events",
                "operation_type": "complete",
                "status": "enabled",
                "topic_id": "urn:smn:topic"
            }"#,
        )
        .create_async()
        .await;
    let delete_mock = server
        .mock("DELETE", "/v3/pid/notifications")
        .match_body(Matcher::PartialJsonString(
            r#"{"notification_id": ["n-1"]}"#.to_string(),
        ))
        .create_async()
        .await;

    let resource = CtsNotificationResource::new(common::shared_data(&[("cts", &server.url())]));
    let mut diags = Diagnostics::default();

    let config = CtsNotificationState {
        name: Value::Value("key-events".into()),
        operation_type: Value::Value("complete".into()),
        smn_topic: Value::Value("urn:smn:topic".into()),
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
    assert_eq!(state.notification_id.as_str(), "n-1");
    assert_eq!(state.status.as_str(), "enabled");
    create_mock.assert_async().await;

    let mut diags = Diagnostics::default();
    resource
        .destroy(&mut diags, Value::Value(state), Value::Null)
        .await
        .expect("destroy should succeed");
    assert!(diags.errors.is_empty());
    delete_mock.assert_async().await;
}

#[tokio::test]
async fn notification_validate_rejects_bad_operation_type() {
    let resource = CtsNotificationResource::new(common::unconfigured_data());
    let mut diags = Diagnostics::default();

    let config = CtsNotificationState {
        name: Value::Value("key-events".into()),
        operation_type: Value::Value("everything".into()),
        ..Default::default()
    };

    let result = resource.validate(&mut diags, Value::Value(config)).await;
    assert!(result.is_none());
    assert_eq!(diags.errors[0].summary, "Invalid operation_type");
}
