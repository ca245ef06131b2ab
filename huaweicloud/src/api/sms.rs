//! Server Migration Service (SMS) API
//!
//! SMS is a global service: the endpoint resolver ignores the region
//! unless an explicit override is configured.

use serde::{Deserialize, Serialize};

use super::client::Client;
use super::common::ApiQueryParams;
use super::error::ApiError;

impl Client {
    /// SMS API operations
    pub fn sms(&self) -> SmsApi<'_> {
        SmsApi {
            endpoint: self.endpoint("sms", None),
            client: self,
        }
    }
}

pub struct SmsApi<'a> {
    client: &'a Client,
    endpoint: String,
}

#[derive(Debug, Serialize)]
pub struct CreateTaskRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub task_type: String,
    pub os_type: String,
    pub region_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_name: Option<String>,
    pub project_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    pub source_server_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_server_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vm_template_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub migration_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_public_ip: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub syncing: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_target_server: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskResponse {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub task_type: Option<String>,
    #[serde(default)]
    pub os_type: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub connected: Option<bool>,
    #[serde(default)]
    pub migrate_speed: Option<f64>,
    #[serde(default)]
    pub enterprise_project_id: Option<String>,
    #[serde(default)]
    pub start_target_server: Option<bool>,
    #[serde(default)]
    pub use_public_ip: Option<bool>,
    #[serde(default)]
    pub syncing: Option<bool>,
    #[serde(default)]
    pub migration_ip: Option<String>,
    #[serde(default)]
    pub source_server: Option<TaskSourceServer>,
    #[serde(default)]
    pub target_server: Option<TaskTargetServer>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskSourceServer {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskTargetServer {
    #[serde(default)]
    pub vm_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TaskActionRequest {
    pub operation: String,
}

#[derive(Debug, Default, Clone)]
pub struct SourceServerFilter {
    pub id: Option<String>,
    pub name: Option<String>,
    pub ip: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListSourceServersResponse {
    #[serde(default)]
    pub count: i64,
    #[serde(default)]
    pub source_servers: Vec<SourceServer>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceServer {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub os_type: Option<String>,
    #[serde(default)]
    pub os_version: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub connected: Option<bool>,
    #[serde(default)]
    pub agent_version: Option<String>,
    #[serde(default)]
    pub enterprise_project_id: Option<String>,
}

impl SmsApi<'_> {
    /// POST /v3/tasks
    pub async fn create_task(&self, request: &CreateTaskRequest) -> Result<CreateTaskResponse, ApiError> {
        let url = format!("{}/v3/tasks", self.endpoint);
        self.client.post(&url, request).await
    }

    /// GET /v3/tasks/{task_id}
    pub async fn get_task(&self, task_id: &str) -> Result<Task, ApiError> {
        let url = format!("{}/v3/tasks/{}", self.endpoint, task_id);
        self.client.get(&url).await
    }

    /// POST /v3/tasks/{task_id}/action
    pub async fn task_action(&self, task_id: &str, operation: &str) -> Result<(), ApiError> {
        let url = format!("{}/v3/tasks/{}/action", self.endpoint, task_id);
        let request = TaskActionRequest {
            operation: operation.to_string(),
        };
        self.client.post_empty(&url, &request).await
    }

    /// DELETE /v3/tasks/{task_id}
    pub async fn delete_task(&self, task_id: &str) -> Result<(), ApiError> {
        let url = format!("{}/v3/tasks/{}", self.endpoint, task_id);
        self.client.delete(&url).await
    }

    /// GET /v3/sources
    pub async fn list_source_servers(
        &self,
        filter: &SourceServerFilter,
    ) -> Result<ListSourceServersResponse, ApiError> {
        let query = ApiQueryParams::new()
            .add_optional("id", filter.id.as_deref())
            .add_optional("name", filter.name.as_deref())
            .add_optional("ip", filter.ip.as_deref())
            .add_optional("state", filter.state.as_deref())
            .to_query_string();
        let url = format!("{}/v3/sources{}", self.endpoint, query);
        self.client.get(&url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_request_renames_type_and_drops_unset() {
        let request = CreateTaskRequest {
            name: None,
            task_type: "MIGRATE_FILE".to_string(),
            os_type: "LINUX".to_string(),
            region_id: "cn-north-4".to_string(),
            region_name: None,
            project_id: "pid".to_string(),
            project_name: None,
            source_server_id: "src-1".to_string(),
            target_server_id: None,
            vm_template_id: Some("tpl-1".to_string()),
            migration_ip: None,
            use_public_ip: Some(true),
            syncing: None,
            start_target_server: None,
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["type"], "MIGRATE_FILE");
        assert_eq!(body["vm_template_id"], "tpl-1");
        assert!(body.get("task_type").is_none());
        assert!(body.get("target_server_id").is_none());
    }

    #[test]
    fn task_response_flattens_target_server() {
        let task: Task = serde_json::from_str(
            r#"{
                "id": "task-1",
                "state": "MIGRATING",
                "migrate_speed": 12.5,
                "target_server": {"vm_id": "vm-9", "name": "migrated"}
            }"#,
        )
        .unwrap();
        assert_eq!(task.state.as_deref(), Some("MIGRATING"));
        assert_eq!(task.target_server.unwrap().name.as_deref(), Some("migrated"));
    }
}
