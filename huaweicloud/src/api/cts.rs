//! Cloud Trace Service (CTS) API

use serde::{Deserialize, Serialize};

use super::client::Client;
use super::common::ApiQueryParams;
use super::error::ApiError;

impl Client {
    /// CTS API operations
    pub fn cts(&self, region: Option<&str>) -> CtsApi<'_> {
        CtsApi {
            endpoint: self.endpoint("cts", region),
            client: self,
        }
    }
}

pub struct CtsApi<'a> {
    client: &'a Client,
    endpoint: String,
}

pub const SYSTEM_TRACKER_NAME: &str = "system";
pub const SYSTEM_TRACKER_TYPE: &str = "system";

#[derive(Debug, Serialize)]
pub struct TrackerRequest {
    pub tracker_type: String,
    pub tracker_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obs_info: Option<ObsInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_lts_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_support_validate: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kms_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_support_trace_files_encryption: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_organization_tracker: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agency_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObsInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_prefix_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_sort_by_service: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_obs_created: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tracker {
    pub id: String,
    pub tracker_name: String,
    pub tracker_type: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub obs_info: Option<ObsInfo>,
    #[serde(default)]
    pub lts: Option<Lts>,
    #[serde(default)]
    pub is_support_validate: Option<bool>,
    #[serde(default)]
    pub kms_id: Option<String>,
    #[serde(default)]
    pub is_organization_tracker: Option<bool>,
    #[serde(default)]
    pub agency_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Lts {
    #[serde(default)]
    pub is_lts_enabled: Option<bool>,
    #[serde(default)]
    pub log_group_name: Option<String>,
    #[serde(default)]
    pub log_topic_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListTrackersResponse {
    #[serde(default)]
    trackers: Vec<Tracker>,
}

#[derive(Debug, Serialize)]
pub struct NotificationRequest {
    pub notification_name: String,
    pub operation_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operations: Option<Vec<NotificationOperation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<NotificationFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agency_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationOperation {
    pub service_type: String,
    pub resource_type: String,
    #[serde(default)]
    pub trace_names: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationFilter {
    pub condition: String,
    #[serde(default)]
    pub rule: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Notification {
    pub notification_id: String,
    pub notification_name: String,
    #[serde(default)]
    pub operation_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub topic_id: Option<String>,
    #[serde(default)]
    pub operations: Option<Vec<NotificationOperation>>,
    #[serde(default)]
    pub filter: Option<NotificationFilter>,
    #[serde(default)]
    pub agency_name: Option<String>,
    #[serde(default)]
    pub create_time: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ListNotificationsResponse {
    #[serde(default)]
    notifications: Vec<Notification>,
}

#[derive(Debug, Serialize)]
struct DeleteNotificationRequest {
    notification_id: Vec<String>,
}

impl CtsApi<'_> {
    /// POST /v3/{project_id}/tracker
    pub async fn create_tracker(&self, request: &TrackerRequest) -> Result<Tracker, ApiError> {
        let url = format!("{}/v3/{}/tracker", self.endpoint, self.client.project_id());
        self.client.post(&url, request).await
    }

    /// PUT /v3/{project_id}/tracker
    pub async fn update_tracker(&self, request: &TrackerRequest) -> Result<(), ApiError> {
        let url = format!("{}/v3/{}/tracker", self.endpoint, self.client.project_id());
        self.client.put_empty(&url, request).await
    }

    /// GET /v3/{project_id}/trackers
    pub async fn get_tracker(&self, name: &str) -> Result<Option<Tracker>, ApiError> {
        let query = ApiQueryParams::new()
            .add("tracker_name", name)
            .to_query_string();
        let url = format!(
            "{}/v3/{}/trackers{}",
            self.endpoint,
            self.client.project_id(),
            query
        );
        let response: ListTrackersResponse = self.client.get(&url).await?;
        Ok(response.trackers.into_iter().next())
    }

    /// DELETE /v3/{project_id}/tracker
    pub async fn delete_tracker(&self, name: &str, tracker_type: &str) -> Result<(), ApiError> {
        let query = ApiQueryParams::new()
            .add("tracker_name", name)
            .add("tracker_type", tracker_type)
            .to_query_string();
        let url = format!(
            "{}/v3/{}/tracker{}",
            self.endpoint,
            self.client.project_id(),
            query
        );
        self.client.delete(&url).await
    }

    /// POST /v3/{project_id}/notifications
    pub async fn create_notification(
        &self,
        request: &NotificationRequest,
    ) -> Result<Notification, ApiError> {
        let url = format!(
            "{}/v3/{}/notifications",
            self.endpoint,
            self.client.project_id()
        );
        self.client.post(&url, request).await
    }

    /// PUT /v3/{project_id}/notifications
    pub async fn update_notification(
        &self,
        request: &NotificationRequest,
    ) -> Result<Notification, ApiError> {
        let url = format!(
            "{}/v3/{}/notifications",
            self.endpoint,
            self.client.project_id()
        );
        self.client.put(&url, request).await
    }

    /// GET /v3/{project_id}/notifications/smn
    pub async fn get_notification(&self, name: &str) -> Result<Option<Notification>, ApiError> {
        let query = ApiQueryParams::new()
            .add("notification_name", name)
            .to_query_string();
        let url = format!(
            "{}/v3/{}/notifications/smn{}",
            self.endpoint,
            self.client.project_id(),
            query
        );
        let response: ListNotificationsResponse = self.client.get(&url).await?;
        Ok(response.notifications.into_iter().next())
    }

    /// DELETE /v3/{project_id}/notifications
    pub async fn delete_notification(&self, notification_id: &str) -> Result<(), ApiError> {
        let url = format!(
            "{}/v3/{}/notifications",
            self.endpoint,
            self.client.project_id()
        );
        let request = DeleteNotificationRequest {
            notification_id: vec![notification_id.to_string()],
        };
        self.client.delete_with_body(&url, &request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracker_request_keeps_only_set_fields() {
        let request = TrackerRequest {
            tracker_type: SYSTEM_TRACKER_TYPE.to_string(),
            tracker_name: SYSTEM_TRACKER_NAME.to_string(),
            status: None,
            obs_info: Some(ObsInfo {
                bucket_name: Some("audit-bucket".to_string()),
                file_prefix_name: None,
                is_sort_by_service: Some(true),
                is_obs_created: None,
            }),
            is_lts_enabled: Some(true),
            is_support_validate: None,
            kms_id: None,
            is_support_trace_files_encryption: None,
            is_organization_tracker: None,
            agency_name: None,
        };

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["tracker_name"], "system");
        assert_eq!(body["obs_info"]["bucket_name"], "audit-bucket");
        assert!(body["obs_info"].get("file_prefix_name").is_none());
        assert!(body.get("status").is_none());
        assert!(body.get("kms_id").is_none());
    }

    #[test]
    fn tracker_response_with_nested_lts() {
        let tracker: Tracker = serde_json::from_str(
            r#"{
                "id": "tr-1",
                "tracker_name": "system",
                "tracker_type": "system",
                "status": "enabled",
                "lts": {"is_lts_enabled": true, "log_group_name": "CTS", "log_topic_name": "system-trace"}
            }"#,
        )
        .unwrap();
        assert_eq!(tracker.status.as_deref(), Some("enabled"));
        assert_eq!(
            tracker.lts.unwrap().log_group_name.as_deref(),
            Some("CTS")
        );
        assert!(tracker.obs_info.is_none());
    }

    #[test]
    fn notification_delete_body_is_an_id_list() {
        let request = DeleteNotificationRequest {
            notification_id: vec!["n-1".to_string()],
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["notification_id"][0], "n-1");
    }
}
