//! Cloud Service Engine (CSE) API
//!
//! Two distinct surfaces: engine management on the regional endpoint
//! (signed like every other service), and the service registry spoken
//! directly to a provisioned engine's connect address (token or anonymous
//! auth, depending on the engine's auth type).

use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::client::{Client, RequestAuth};
use super::error::ApiError;

impl Client {
    /// Engine management operations
    pub fn cse(&self, region: Option<&str>) -> CseApi<'_> {
        CseApi {
            endpoint: self.endpoint("cse", region),
            client: self,
        }
    }

    /// Service registry operations against a concrete engine
    pub fn cse_registry(&self, connect_address: &str) -> CseRegistryApi<'_> {
        CseRegistryApi {
            endpoint: connect_address.trim_end_matches('/').to_string(),
            client: self,
        }
    }
}

pub struct CseApi<'a> {
    client: &'a Client,
    endpoint: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEngineRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub flavor: String,
    pub az_list: Vec<String>,
    pub auth_type: String,
    pub network_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub spec_type: String,
    #[serde(rename = "auth_cred", skip_serializing_if = "Option::is_none")]
    pub auth_cred: Option<AuthCred>,
    #[serde(rename = "enterprise_project_id", skip_serializing_if = "Option::is_none")]
    pub enterprise_project_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthCred {
    pub pwd: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEngineResponse {
    pub id: String,
    pub job_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteEngineResponse {
    pub job_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct EngineJob {
    pub status: String,
    #[serde(default)]
    pub description: Option<String>,
}

pub const ENGINE_JOB_FINISHED: &str = "Finished";
pub const ENGINE_JOB_EXECUTING: &str = "Executing";
pub const ENGINE_JOB_INIT: &str = "Init";
pub const ENGINE_JOB_ERROR: &str = "Error";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineDetail {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub flavor: Option<String>,
    #[serde(default)]
    pub az_list: Option<Vec<String>>,
    #[serde(default)]
    pub auth_type: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "enterprise_project_id", default)]
    pub enterprise_project_id: Option<String>,
    #[serde(default)]
    pub reference: Option<EngineReference>,
    #[serde(default)]
    pub external_entrypoint: Option<EngineEntrypoint>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineReference {
    #[serde(default)]
    pub service_limit: Option<i64>,
    #[serde(default)]
    pub instance_limit: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineEntrypoint {
    #[serde(default)]
    pub service_center_address: Option<String>,
    #[serde(default)]
    pub service_center_public_address: Option<String>,
    #[serde(default)]
    pub config_center_address: Option<String>,
    #[serde(default)]
    pub config_center_public_address: Option<String>,
}

impl CseApi<'_> {
    /// POST /v2/{project_id}/enginemgr/engines
    pub async fn create_engine(
        &self,
        request: &CreateEngineRequest,
    ) -> Result<CreateEngineResponse, ApiError> {
        let url = format!(
            "{}/v2/{}/enginemgr/engines",
            self.endpoint,
            self.client.project_id()
        );
        self.client.post(&url, request).await
    }

    /// GET /v2/{project_id}/enginemgr/engines/{engine_id}
    pub async fn get_engine(&self, engine_id: &str) -> Result<EngineDetail, ApiError> {
        let url = format!(
            "{}/v2/{}/enginemgr/engines/{}",
            self.endpoint,
            self.client.project_id(),
            engine_id
        );
        self.client.get(&url).await
    }

    /// GET /v2/{project_id}/enginemgr/engines/{engine_id}/jobs/{job_id}
    pub async fn get_engine_job(&self, engine_id: &str, job_id: i64) -> Result<EngineJob, ApiError> {
        let url = format!(
            "{}/v2/{}/enginemgr/engines/{}/jobs/{}",
            self.endpoint,
            self.client.project_id(),
            engine_id,
            job_id
        );
        self.client.get(&url).await
    }

    /// DELETE /v2/{project_id}/enginemgr/engines/{engine_id}
    pub async fn delete_engine(&self, engine_id: &str) -> Result<DeleteEngineResponse, ApiError> {
        let url = format!(
            "{}/v2/{}/enginemgr/engines/{}",
            self.endpoint,
            self.client.project_id(),
            engine_id
        );
        self.client.delete_json(&url).await
    }
}

pub struct CseRegistryApi<'a> {
    client: &'a Client,
    endpoint: String,
}

#[derive(Debug, Serialize)]
pub struct TokenRequest {
    pub name: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct CreateMicroserviceRequest {
    pub service: Microservice,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMicroserviceResponse {
    pub service_id: String,
}

#[derive(Debug, Deserialize)]
pub struct GetMicroserviceResponse {
    pub service: Microservice,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Microservice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    pub service_name: String,
    pub app_id: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl CseRegistryApi<'_> {
    fn auth<'t>(&self, token: Option<&'t str>) -> RequestAuth<'t> {
        match token {
            Some(token) => RequestAuth::Bearer(token),
            None => RequestAuth::Anonymous,
        }
    }

    /// POST /v4/token
    pub async fn get_token(&self, request: &TokenRequest) -> Result<String, ApiError> {
        let url = format!("{}/v4/token", self.endpoint);
        let response: TokenResponse = self
            .client
            .request_with_auth(Method::POST, &url, Some(request), RequestAuth::Anonymous)
            .await?;
        Ok(response.token)
    }

    /// POST /v4/default/registry/microservices
    pub async fn create_microservice(
        &self,
        token: Option<&str>,
        request: &CreateMicroserviceRequest,
    ) -> Result<CreateMicroserviceResponse, ApiError> {
        let url = format!("{}/v4/default/registry/microservices", self.endpoint);
        self.client
            .request_with_auth(Method::POST, &url, Some(request), self.auth(token))
            .await
    }

    /// GET /v4/default/registry/microservices/{service_id}
    pub async fn get_microservice(
        &self,
        token: Option<&str>,
        service_id: &str,
    ) -> Result<Microservice, ApiError> {
        let url = format!(
            "{}/v4/default/registry/microservices/{}",
            self.endpoint, service_id
        );
        let response: GetMicroserviceResponse = self
            .client
            .request_with_auth(Method::GET, &url, None::<&()>, self.auth(token))
            .await?;
        Ok(response.service)
    }

    /// DELETE /v4/default/registry/microservices/{service_id}?force=true
    pub async fn delete_microservice(
        &self,
        token: Option<&str>,
        service_id: &str,
    ) -> Result<(), ApiError> {
        let url = format!(
            "{}/v4/default/registry/microservices/{}?force=true",
            self.endpoint, service_id
        );
        self.client
            .request_with_auth_empty(Method::DELETE, &url, None::<&()>, self.auth(token))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_request_uses_camel_case() {
        let request = CreateEngineRequest {
            name: "engine".to_string(),
            description: None,
            flavor: "cse.s1.small2".to_string(),
            az_list: vec!["cn-north-4a".to_string()],
            auth_type: "RBAC".to_string(),
            network_id: "net-1".to_string(),
            version: None,
            spec_type: "CSE2".to_string(),
            auth_cred: Some(AuthCred {
                pwd: "secret".to_string(),
            }),
            enterprise_project_id: None,
        };

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["azList"][0], "cn-north-4a");
        assert_eq!(body["authType"], "RBAC");
        assert_eq!(body["networkId"], "net-1");
        assert_eq!(body["specType"], "CSE2");
        assert_eq!(body["auth_cred"]["pwd"], "secret");
        assert!(body.get("description").is_none());
        assert!(body.get("version").is_none());
    }

    #[test]
    fn engine_detail_flattens_nested_addresses() {
        let detail: EngineDetail = serde_json::from_str(
            r#"{
                "id": "eng-1",
                "name": "engine",
                "status": "Available",
                "reference": {"serviceLimit": 200, "instanceLimit": 2000},
                "externalEntrypoint": {
                    "serviceCenterAddress": "https://192.168.0.10:30100",
                    "configCenterAddress": "https://192.168.0.10:30110"
                }
            }"#,
        )
        .unwrap();
        assert_eq!(detail.status.as_deref(), Some("Available"));
        let reference = detail.reference.unwrap();
        assert_eq!(reference.service_limit, Some(200));
        let entrypoint = detail.external_entrypoint.unwrap();
        assert_eq!(
            entrypoint.service_center_address.as_deref(),
            Some("https://192.168.0.10:30100")
        );
        assert!(entrypoint.service_center_public_address.is_none());
    }

    #[test]
    fn microservice_round_trip_field_names() {
        let service = Microservice {
            service_id: None,
            service_name: "orders".to_string(),
            app_id: "shop".to_string(),
            version: "1.0.0".to_string(),
            environment: Some("production".to_string()),
            level: None,
            description: None,
            status: None,
        };
        let body = serde_json::to_value(CreateMicroserviceRequest { service }).unwrap();
        assert_eq!(body["service"]["serviceName"], "orders");
        assert_eq!(body["service"]["appId"], "shop");
        assert!(body["service"].get("serviceId").is_none());
        assert!(body["service"].get("level").is_none());
    }
}
