//! Cloud Bastion Host (CBH) API

use serde::{Deserialize, Serialize};

use super::client::Client;
use super::common::ResourceTag;
use super::error::ApiError;

impl Client {
    /// CBH API operations
    pub fn cbh(&self, region: Option<&str>) -> CbhApi<'_> {
        CbhApi {
            endpoint: self.endpoint("cbh", region),
            client: self,
        }
    }
}

pub struct CbhApi<'a> {
    client: &'a Client,
    endpoint: String,
}

#[derive(Debug, Serialize)]
pub struct CreateInstanceRequest {
    pub server: CreateInstanceBody,
}

#[derive(Debug, Serialize)]
pub struct CreateInstanceBody {
    pub flavor_ref: String,
    pub instance_name: String,
    pub vpc_id: String,
    pub nics: Vec<Nic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_ip: Option<PublicIp>,
    pub security_groups: Vec<SecurityGroupRef>,
    pub availability_zone: String,
    pub region: String,
    pub hx_password: String,
    pub bastion_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv6_enable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<ResourceTag>>,
}

#[derive(Debug, Serialize)]
pub struct Nic {
    pub subnet_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SecurityGroupRef {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct PublicIp {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateInstanceResponse {
    pub server_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ListInstancesResponse {
    #[serde(default)]
    pub instance: Vec<InstanceInfo>,
}

/// Instance entry as returned by the list endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct InstanceInfo {
    pub server_id: String,
    pub name: String,
    #[serde(default)]
    pub status: String,
    pub flavor_id: Option<String>,
    pub vpc_id: Option<String>,
    pub subnet_id: Option<String>,
    pub security_group_id: Option<String>,
    pub availability_zone: Option<String>,
    pub private_ip: Option<String>,
    pub public_ip: Option<String>,
    pub subnet_address: Option<String>,
    pub version: Option<String>,
    pub ipv6_enable: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ChangePasswordRequest {
    pub server_id: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct EipRequest {
    pub publicip_id: String,
}

impl CbhApi<'_> {
    /// POST /v2/{project_id}/cbs/instance
    pub async fn create_instance(
        &self,
        request: &CreateInstanceRequest,
    ) -> Result<CreateInstanceResponse, ApiError> {
        let url = format!(
            "{}/v2/{}/cbs/instance",
            self.endpoint,
            self.client.project_id()
        );
        self.client.post(&url, request).await
    }

    /// GET /v2/{project_id}/cbs/instance/list
    pub async fn list_instances(&self) -> Result<Vec<InstanceInfo>, ApiError> {
        let url = format!(
            "{}/v2/{}/cbs/instance/list",
            self.endpoint,
            self.client.project_id()
        );
        let response: ListInstancesResponse = self.client.get(&url).await?;
        Ok(response.instance)
    }

    /// Find a single instance by server id. `None` means it no longer
    /// exists on the remote side.
    pub async fn get_instance(&self, server_id: &str) -> Result<Option<InstanceInfo>, ApiError> {
        Ok(self
            .list_instances()
            .await?
            .into_iter()
            .find(|instance| instance.server_id == server_id))
    }

    /// PUT /v2/{project_id}/cbs/instance/password
    pub async fn change_password(&self, request: &ChangePasswordRequest) -> Result<(), ApiError> {
        let url = format!(
            "{}/v2/{}/cbs/instance/password",
            self.endpoint,
            self.client.project_id()
        );
        self.client.put_empty(&url, request).await
    }

    /// POST /v2/{project_id}/cbs/instance/{server_id}/eip/bind
    pub async fn bind_eip(&self, server_id: &str, request: &EipRequest) -> Result<(), ApiError> {
        let url = format!(
            "{}/v2/{}/cbs/instance/{}/eip/bind",
            self.endpoint,
            self.client.project_id(),
            server_id
        );
        self.client.post_empty(&url, request).await
    }

    /// POST /v2/{project_id}/cbs/instance/{server_id}/eip/unbind
    pub async fn unbind_eip(&self, server_id: &str, request: &EipRequest) -> Result<(), ApiError> {
        let url = format!(
            "{}/v2/{}/cbs/instance/{}/eip/unbind",
            self.endpoint,
            self.client.project_id(),
            server_id
        );
        self.client.post_empty(&url, request).await
    }

    /// DELETE /v2/{project_id}/cbs/instance/{server_id}
    pub async fn delete_instance(&self, server_id: &str) -> Result<(), ApiError> {
        let url = format!(
            "{}/v2/{}/cbs/instance/{}",
            self.endpoint,
            self.client.project_id(),
            server_id
        );
        self.client.delete(&url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_omits_absent_optionals() {
        let request = CreateInstanceRequest {
            server: CreateInstanceBody {
                flavor_ref: "cbh.basic.50".to_string(),
                instance_name: "bastion".to_string(),
                vpc_id: "vpc-1".to_string(),
                nics: vec![Nic {
                    subnet_id: "subnet-1".to_string(),
                    ip_address: None,
                }],
                public_ip: None,
                security_groups: vec![SecurityGroupRef {
                    id: "sg-1".to_string(),
                }],
                availability_zone: "cn-north-4a".to_string(),
                region: "cn-north-4".to_string(),
                hx_password: "secret".to_string(),
                bastion_type: "OEM".to_string(),
                ipv6_enable: None,
                tags: None,
            },
        };

        let body = serde_json::to_value(&request).unwrap();
        let server = &body["server"];
        assert_eq!(server["flavor_ref"], "cbh.basic.50");
        assert_eq!(server["bastion_type"], "OEM");
        assert!(server.get("public_ip").is_none());
        assert!(server.get("ipv6_enable").is_none());
        assert!(server.get("tags").is_none());
        assert!(server["nics"][0].get("ip_address").is_none());
    }

    #[test]
    fn list_response_tolerates_missing_fields() {
        let response: ListInstancesResponse = serde_json::from_str(
            r#"{"instance":[{"server_id":"sid","name":"bastion","status":"ACTIVE"}]}"#,
        )
        .unwrap();
        assert_eq!(response.instance.len(), 1);
        assert_eq!(response.instance[0].server_id, "sid");
        assert!(response.instance[0].private_ip.is_none());
    }
}
