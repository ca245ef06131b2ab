//! Elastic Cloud Server (ECS) API
//!
//! Server creation and deletion are asynchronous and tracked through the
//! ECS jobs endpoint; the created server id is carried in the finished
//! job's sub-job entities.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::client::Client;
use super::common::{JobDetail, ResourceTag};
use super::error::ApiError;

impl Client {
    /// ECS API operations
    pub fn ecs(&self, region: Option<&str>) -> EcsApi<'_> {
        EcsApi {
            endpoint: self.endpoint("ecs", region),
            client: self,
        }
    }
}

pub struct EcsApi<'a> {
    client: &'a Client,
    endpoint: String,
}

pub const SERVER_STATUS_ACTIVE: &str = "ACTIVE";
pub const SERVER_STATUS_BUILD: &str = "BUILD";
pub const SERVER_STATUS_ERROR: &str = "ERROR";

#[derive(Debug, Serialize)]
pub struct CreateServerRequest {
    pub server: CreateServerBody,
}

#[derive(Debug, Serialize)]
pub struct CreateServerBody {
    pub name: String,
    #[serde(rename = "imageRef")]
    pub image_ref: String,
    #[serde(rename = "flavorRef")]
    pub flavor_ref: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<String>,
    #[serde(rename = "adminPass", skip_serializing_if = "Option::is_none")]
    pub admin_pass: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_name: Option<String>,
    pub vpcid: String,
    pub nics: Vec<ServerNic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_groups: Option<Vec<IdRef>>,
    pub root_volume: RootVolume,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_tags: Option<Vec<ResourceTag>>,
}

#[derive(Debug, Serialize)]
pub struct ServerNic {
    pub subnet_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IdRef {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct RootVolume {
    pub volumetype: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct JobResponse {
    pub job_id: String,
}

#[derive(Debug, Deserialize)]
pub struct GetServerResponse {
    pub server: ServerDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerDetail {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub flavor: Option<FlavorInfo>,
    #[serde(default)]
    pub image: Option<ImageInfo>,
    #[serde(default)]
    pub key_name: Option<String>,
    #[serde(rename = "OS-EXT-AZ:availability_zone", default)]
    pub availability_zone: Option<String>,
    #[serde(default)]
    pub addresses: HashMap<String, Vec<ServerAddress>>,
    #[serde(rename = "os-extended-volumes:volumes_attached", default)]
    pub volumes_attached: Vec<AttachedVolume>,
    #[serde(default)]
    pub security_groups: Vec<SecurityGroupInfo>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FlavorInfo {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageInfo {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerAddress {
    pub addr: String,
    #[serde(rename = "OS-EXT-IPS:type", default)]
    pub addr_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttachedVolume {
    pub id: String,
    #[serde(rename = "bootIndex", default)]
    pub boot_index: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityGroupInfo {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UpdateServerRequest {
    pub server: UpdateServerBody,
}

#[derive(Debug, Serialize)]
pub struct UpdateServerBody {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct ResizeServerRequest {
    pub resize: ResizeServerBody,
}

#[derive(Debug, Serialize)]
pub struct ResizeServerBody {
    #[serde(rename = "flavorRef")]
    pub flavor_ref: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteServersRequest {
    pub servers: Vec<IdOnly>,
    pub delete_volume: bool,
}

#[derive(Debug, Serialize)]
pub struct IdOnly {
    pub id: String,
}

impl EcsApi<'_> {
    /// Poll a job until it reports SUCCESS, then return its entities.
    pub async fn wait_for_job(
        &self,
        job_id: &str,
        timeout: std::time::Duration,
    ) -> Result<serde_json::Value, ApiError> {
        use crate::api::common::{JOB_STATUS_FAIL, JOB_STATUS_INIT, JOB_STATUS_RUNNING, JOB_STATUS_SUCCESS};
        use crate::api::poll::{wait_for_state, StateWait};

        let wait = StateWait {
            pending: &[JOB_STATUS_INIT, JOB_STATUS_RUNNING],
            target: &[JOB_STATUS_SUCCESS],
            delay: std::time::Duration::from_secs(5),
            interval: std::time::Duration::from_secs(10),
            timeout,
        };
        let api = self;
        wait_for_state(wait, move || async move {
            let job = api.get_job(job_id).await?;
            if job.status == JOB_STATUS_FAIL {
                return Err(ApiError::UnexpectedState {
                    state: job.status,
                    reason: job.fail_reason.unwrap_or_else(|| "job failed".to_string()),
                });
            }
            Ok(job.status)
        })
        .await?;

        Ok(self.get_job(job_id).await?.entities)
    }

    /// GET /v1/{project_id}/jobs/{job_id}
    pub async fn get_job(&self, job_id: &str) -> Result<JobDetail, ApiError> {
        let url = format!(
            "{}/v1/{}/jobs/{}",
            self.endpoint,
            self.client.project_id(),
            job_id
        );
        self.client.get(&url).await
    }

    /// POST /v1/{project_id}/cloudservers
    pub async fn create_server(&self, request: &CreateServerRequest) -> Result<JobResponse, ApiError> {
        let url = format!(
            "{}/v1/{}/cloudservers",
            self.endpoint,
            self.client.project_id()
        );
        self.client.post(&url, request).await
    }

    /// GET /v1/{project_id}/cloudservers/{server_id}
    pub async fn get_server(&self, server_id: &str) -> Result<ServerDetail, ApiError> {
        let url = format!(
            "{}/v1/{}/cloudservers/{}",
            self.endpoint,
            self.client.project_id(),
            server_id
        );
        let response: GetServerResponse = self.client.get(&url).await?;
        Ok(response.server)
    }

    /// PUT /v1/{project_id}/cloudservers/{server_id}
    pub async fn update_server(
        &self,
        server_id: &str,
        request: &UpdateServerRequest,
    ) -> Result<(), ApiError> {
        let url = format!(
            "{}/v1/{}/cloudservers/{}",
            self.endpoint,
            self.client.project_id(),
            server_id
        );
        self.client.put_empty(&url, request).await
    }

    /// POST /v1/{project_id}/cloudservers/{server_id}/resize
    pub async fn resize_server(
        &self,
        server_id: &str,
        request: &ResizeServerRequest,
    ) -> Result<JobResponse, ApiError> {
        let url = format!(
            "{}/v1/{}/cloudservers/{}/resize",
            self.endpoint,
            self.client.project_id(),
            server_id
        );
        self.client.post(&url, request).await
    }

    /// POST /v1/{project_id}/cloudservers/delete
    pub async fn delete_servers(&self, request: &DeleteServersRequest) -> Result<JobResponse, ApiError> {
        let url = format!(
            "{}/v1/{}/cloudservers/delete",
            self.endpoint,
            self.client.project_id()
        );
        self.client.post(&url, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_body_uses_the_mixed_case_api_names() {
        let request = CreateServerRequest {
            server: CreateServerBody {
                name: "web-1".to_string(),
                image_ref: "img-1".to_string(),
                flavor_ref: "s6.large.2".to_string(),
                availability_zone: Some("cn-north-4a".to_string()),
                admin_pass: None,
                key_name: Some("deploy".to_string()),
                vpcid: "vpc-1".to_string(),
                nics: vec![ServerNic {
                    subnet_id: "subnet-1".to_string(),
                    ip_address: None,
                }],
                security_groups: None,
                root_volume: RootVolume {
                    volumetype: "SSD".to_string(),
                    size: Some(40),
                },
                user_data: None,
                server_tags: None,
            },
        };
        let body = serde_json::to_value(&request).unwrap();
        let server = &body["server"];
        assert_eq!(server["imageRef"], "img-1");
        assert_eq!(server["flavorRef"], "s6.large.2");
        assert_eq!(server["vpcid"], "vpc-1");
        assert_eq!(server["root_volume"]["volumetype"], "SSD");
        assert!(server.get("adminPass").is_none());
    }

    #[test]
    fn server_detail_reads_extension_attributes() {
        let response: GetServerResponse = serde_json::from_str(
            r#"{
                "server": {
                    "id": "srv-1",
                    "name": "web-1",
                    "status": "ACTIVE",
                    "OS-EXT-AZ:availability_zone": "cn-north-4a",
                    "addresses": {
                        "vpc-1": [{"addr": "192.168.0.5", "OS-EXT-IPS:type": "fixed"}]
                    },
                    "os-extended-volumes:volumes_attached": [{"id": "vol-1", "bootIndex": 0}]
                }
            }"#,
        )
        .unwrap();
        let server = response.server;
        assert_eq!(server.availability_zone.as_deref(), Some("cn-north-4a"));
        assert_eq!(server.addresses["vpc-1"][0].addr, "192.168.0.5");
        assert_eq!(server.volumes_attached[0].boot_index, Some(0));
    }
}
