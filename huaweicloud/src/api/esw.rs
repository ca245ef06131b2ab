//! Enterprise Switch (ESW) API
//!
//! Layer-2 connectivity gateways (`l2cg`) that stretch a subnet between a
//! VPC and an on-premises network.

use serde::{Deserialize, Serialize};

use super::client::Client;
use super::common::ResourceTag;
use super::error::ApiError;

impl Client {
    /// ESW API operations
    pub fn esw(&self, region: Option<&str>) -> EswApi<'_> {
        EswApi {
            endpoint: self.endpoint("esw", region),
            client: self,
        }
    }
}

pub struct EswApi<'a> {
    client: &'a Client,
    endpoint: String,
}

pub const GATEWAY_STATUS_ACTIVE: &str = "ACTIVE";
pub const GATEWAY_STATUS_PENDING_CREATE: &str = "PENDING_CREATE";
pub const GATEWAY_STATUS_PENDING_UPDATE: &str = "PENDING_UPDATE";
pub const GATEWAY_STATUS_PENDING_DELETE: &str = "PENDING_DELETE";
pub const GATEWAY_STATUS_ERROR: &str = "ERROR";

#[derive(Debug, Serialize)]
pub struct CreateGatewayRequest {
    pub l2cg: GatewayBody,
}

#[derive(Debug, Serialize)]
pub struct GatewayBody {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flavor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<String>,
    pub virsubnet_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<ResourceTag>>,
}

#[derive(Debug, Deserialize)]
pub struct GatewayResponse {
    pub l2cg: Gateway,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Gateway {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub flavor: Option<String>,
    #[serde(default)]
    pub availability_zone: Option<String>,
    #[serde(default)]
    pub vpc_id: Option<String>,
    #[serde(default)]
    pub virsubnet_id: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub tags: Vec<ResourceTag>,
}

#[derive(Debug, Serialize)]
pub struct UpdateGatewayRequest {
    pub l2cg: UpdateGatewayBody,
}

#[derive(Debug, Serialize)]
pub struct UpdateGatewayBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl EswApi<'_> {
    /// POST /v1/{project_id}/l2cgs
    pub async fn create_gateway(&self, request: &CreateGatewayRequest) -> Result<Gateway, ApiError> {
        let url = format!("{}/v1/{}/l2cgs", self.endpoint, self.client.project_id());
        let response: GatewayResponse = self.client.post(&url, request).await?;
        Ok(response.l2cg)
    }

    /// GET /v1/{project_id}/l2cgs/{id}
    pub async fn get_gateway(&self, id: &str) -> Result<Gateway, ApiError> {
        let url = format!(
            "{}/v1/{}/l2cgs/{}",
            self.endpoint,
            self.client.project_id(),
            id
        );
        let response: GatewayResponse = self.client.get(&url).await?;
        Ok(response.l2cg)
    }

    /// PUT /v1/{project_id}/l2cgs/{id}
    pub async fn update_gateway(
        &self,
        id: &str,
        request: &UpdateGatewayRequest,
    ) -> Result<(), ApiError> {
        let url = format!(
            "{}/v1/{}/l2cgs/{}",
            self.endpoint,
            self.client.project_id(),
            id
        );
        self.client.put_empty(&url, request).await
    }

    /// DELETE /v1/{project_id}/l2cgs/{id}
    pub async fn delete_gateway(&self, id: &str) -> Result<(), ApiError> {
        let url = format!(
            "{}/v1/{}/l2cgs/{}",
            self.endpoint,
            self.client.project_id(),
            id
        );
        self.client.delete(&url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_body_nests_under_l2cg() {
        let request = CreateGatewayRequest {
            l2cg: GatewayBody {
                name: "edge-switch".to_string(),
                description: None,
                flavor: None,
                availability_zone: Some("cn-north-4a".to_string()),
                virsubnet_id: "subnet-1".to_string(),
                ip_address: None,
                tags: None,
            },
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["l2cg"]["name"], "edge-switch");
        assert_eq!(body["l2cg"]["virsubnet_id"], "subnet-1");
        assert!(body["l2cg"].get("flavor").is_none());
    }
}
