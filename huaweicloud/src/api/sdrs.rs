//! Storage Disaster Recovery Service (SDRS) API
//!
//! Mutations are asynchronous: each returns a job id which is polled via
//! the jobs endpoint until it reports SUCCESS, and created resource ids are
//! pulled out of the finished job's entities.

use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::client::{Client, RequestAuth};
use super::common::{JobDetail, ResourceTag};
use super::error::ApiError;

impl Client {
    /// SDRS API operations
    pub fn sdrs(&self, region: Option<&str>) -> SdrsApi<'_> {
        SdrsApi {
            endpoint: self.endpoint("sdrs", region),
            client: self,
        }
    }
}

pub struct SdrsApi<'a> {
    client: &'a Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
pub struct JobResponse {
    pub job_id: String,
}

#[derive(Debug, Serialize)]
pub struct CreateProtectionGroupRequest {
    pub server_group: ProtectionGroupBody,
}

#[derive(Debug, Serialize)]
pub struct ProtectionGroupBody {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub source_availability_zone: String,
    pub target_availability_zone: String,
    pub domain_id: String,
    pub source_vpc_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dr_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GetProtectionGroupResponse {
    pub server_group: ProtectionGroup,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProtectionGroup {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub source_availability_zone: Option<String>,
    #[serde(default)]
    pub target_availability_zone: Option<String>,
    #[serde(default)]
    pub domain_id: Option<String>,
    #[serde(default)]
    pub source_vpc_id: Option<String>,
    #[serde(default)]
    pub dr_type: Option<String>,
    #[serde(default)]
    pub protected_instances: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct UpdateProtectionGroupRequest {
    pub server_group: UpdateProtectionGroupBody,
}

#[derive(Debug, Serialize)]
pub struct UpdateProtectionGroupBody {
    pub name: String,
}

#[derive(Debug, Serialize)]
struct EmptyObject {}

#[derive(Debug, Serialize)]
struct StartProtectionRequest {
    #[serde(rename = "start-server-group")]
    start_server_group: EmptyObject,
}

#[derive(Debug, Serialize)]
struct StopProtectionRequest {
    #[serde(rename = "stop-server-group")]
    stop_server_group: EmptyObject,
}

#[derive(Debug, Serialize)]
pub struct CreateProtectedInstanceRequest {
    pub protected_instance: ProtectedInstanceBody,
}

#[derive(Debug, Serialize)]
pub struct ProtectedInstanceBody {
    pub name: String,
    pub server_group_id: String,
    pub server_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_subnet_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<ResourceTag>>,
}

#[derive(Debug, Deserialize)]
pub struct GetProtectedInstanceResponse {
    pub protected_instance: ProtectedInstance,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProtectedInstance {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub server_group_id: Option<String>,
    #[serde(default)]
    pub source_server: Option<String>,
    #[serde(default)]
    pub target_server: Option<String>,
    #[serde(default)]
    pub tags: Vec<ResourceTag>,
}

#[derive(Debug, Serialize)]
pub struct UpdateProtectedInstanceRequest {
    pub protected_instance: UpdateProtectedInstanceBody,
}

#[derive(Debug, Serialize)]
pub struct UpdateProtectedInstanceBody {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteProtectedInstanceRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_target_server: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_target_eip: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct ActiveDomainsResponse {
    #[serde(default)]
    domains: Vec<ActiveDomain>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActiveDomain {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl SdrsApi<'_> {
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

    /// POST /v1/{project_id}/server-groups
    pub async fn create_protection_group(
        &self,
        request: &CreateProtectionGroupRequest,
    ) -> Result<JobResponse, ApiError> {
        let url = format!(
            "{}/v1/{}/server-groups",
            self.endpoint,
            self.client.project_id()
        );
        self.client.post(&url, request).await
    }

    /// GET /v1/{project_id}/server-groups/{id}
    pub async fn get_protection_group(&self, id: &str) -> Result<ProtectionGroup, ApiError> {
        let url = format!(
            "{}/v1/{}/server-groups/{}",
            self.endpoint,
            self.client.project_id(),
            id
        );
        let response: GetProtectionGroupResponse = self.client.get(&url).await?;
        Ok(response.server_group)
    }

    /// PUT /v1/{project_id}/server-groups/{id}
    pub async fn update_protection_group(
        &self,
        id: &str,
        request: &UpdateProtectionGroupRequest,
    ) -> Result<(), ApiError> {
        let url = format!(
            "{}/v1/{}/server-groups/{}",
            self.endpoint,
            self.client.project_id(),
            id
        );
        self.client.put_empty(&url, request).await
    }

    /// POST /v1/{project_id}/server-groups/{id}/action
    pub async fn set_protection(&self, id: &str, enable: bool) -> Result<JobResponse, ApiError> {
        let url = format!(
            "{}/v1/{}/server-groups/{}/action",
            self.endpoint,
            self.client.project_id(),
            id
        );
        if enable {
            self.client
                .post(
                    &url,
                    &StartProtectionRequest {
                        start_server_group: EmptyObject {},
                    },
                )
                .await
        } else {
            self.client
                .post(
                    &url,
                    &StopProtectionRequest {
                        stop_server_group: EmptyObject {},
                    },
                )
                .await
        }
    }

    /// DELETE /v1/{project_id}/server-groups/{id}
    pub async fn delete_protection_group(&self, id: &str) -> Result<JobResponse, ApiError> {
        let url = format!(
            "{}/v1/{}/server-groups/{}",
            self.endpoint,
            self.client.project_id(),
            id
        );
        self.client.delete_json(&url).await
    }

    /// POST /v1/{project_id}/protected-instances
    pub async fn create_protected_instance(
        &self,
        request: &CreateProtectedInstanceRequest,
    ) -> Result<JobResponse, ApiError> {
        let url = format!(
            "{}/v1/{}/protected-instances",
            self.endpoint,
            self.client.project_id()
        );
        self.client.post(&url, request).await
    }

    /// GET /v1/{project_id}/protected-instances/{id}
    pub async fn get_protected_instance(&self, id: &str) -> Result<ProtectedInstance, ApiError> {
        let url = format!(
            "{}/v1/{}/protected-instances/{}",
            self.endpoint,
            self.client.project_id(),
            id
        );
        let response: GetProtectedInstanceResponse = self.client.get(&url).await?;
        Ok(response.protected_instance)
    }

    /// PUT /v1/{project_id}/protected-instances/{id}
    pub async fn update_protected_instance(
        &self,
        id: &str,
        request: &UpdateProtectedInstanceRequest,
    ) -> Result<(), ApiError> {
        let url = format!(
            "{}/v1/{}/protected-instances/{}",
            self.endpoint,
            self.client.project_id(),
            id
        );
        self.client.put_empty(&url, request).await
    }

    /// DELETE /v1/{project_id}/protected-instances/{id}
    pub async fn delete_protected_instance(
        &self,
        id: &str,
        request: &DeleteProtectedInstanceRequest,
    ) -> Result<JobResponse, ApiError> {
        let url = format!(
            "{}/v1/{}/protected-instances/{}",
            self.endpoint,
            self.client.project_id(),
            id
        );
        self.client
            .request_with_auth(Method::DELETE, &url, Some(request), RequestAuth::Sign)
            .await
    }

    /// GET /v1/{project_id}/active-domains
    pub async fn list_active_domains(&self) -> Result<Vec<ActiveDomain>, ApiError> {
        let url = format!(
            "{}/v1/{}/active-domains",
            self.endpoint,
            self.client.project_id()
        );
        let response: ActiveDomainsResponse = self.client.get(&url).await?;
        Ok(response.domains)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_body_nests_under_server_group() {
        let request = CreateProtectionGroupRequest {
            server_group: ProtectionGroupBody {
                name: "group".to_string(),
                description: None,
                source_availability_zone: "az1".to_string(),
                target_availability_zone: "az2".to_string(),
                domain_id: "domain-1".to_string(),
                source_vpc_id: "vpc-1".to_string(),
                dr_type: Some("migration".to_string()),
            },
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["server_group"]["source_availability_zone"], "az1");
        assert_eq!(body["server_group"]["dr_type"], "migration");
        assert!(body["server_group"].get("description").is_none());
    }

    #[test]
    fn protection_action_bodies_use_dashed_keys() {
        let start = serde_json::to_value(StartProtectionRequest {
            start_server_group: EmptyObject {},
        })
        .unwrap();
        assert!(start.get("start-server-group").is_some());

        let stop = serde_json::to_value(StopProtectionRequest {
            stop_server_group: EmptyObject {},
        })
        .unwrap();
        assert!(stop.get("stop-server-group").is_some());
    }
}
