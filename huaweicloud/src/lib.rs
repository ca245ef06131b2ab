pub mod api;
pub mod data_sources;
pub mod provider_data;
pub mod resources;
mod utils;

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use tf_provider::DynamicDataSource;
use tf_provider::DynamicResource;
use tf_provider::schema::{
    Attribute, AttributeConstraint, AttributeType, Block, Description, Schema,
};
use tf_provider::value::{Value, ValueBool, ValueEmpty, ValueMap, ValueNumber, ValueString};
use tf_provider::{map, Diagnostics, Provider};

use api::{Client, ClientConfig};
use provider_data::{ProviderData, SharedProviderData};

/// Provider configuration block
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProviderConfig<'a> {
    #[serde(borrow = "'a")]
    pub region: ValueString<'a>,
    pub access_key: ValueString<'a>,
    pub secret_key: ValueString<'a>,
    pub security_token: ValueString<'a>,
    pub project_id: ValueString<'a>,
    pub endpoints: ValueMap<'a, ValueString<'a>>,
    pub insecure: ValueBool,
    pub max_retries: ValueNumber,
}

pub struct HuaweicloudProvider {
    data: SharedProviderData,
}

impl Default for HuaweicloudProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl HuaweicloudProvider {
    pub fn new() -> Self {
        Self {
            data: Arc::new(OnceLock::new()),
        }
    }

    #[cfg(test)]
    fn configured_data(&self) -> Option<&ProviderData> {
        self.data.get()
    }
}

fn value_or_env(value: &ValueString<'_>, env: &str) -> Option<String> {
    match value {
        Value::Value(v) => Some(v.to_string()),
        _ => std::env::var(env).ok().filter(|v| !v.is_empty()),
    }
}

#[async_trait]
impl Provider for HuaweicloudProvider {
    type Config<'a> = ProviderConfig<'a>;
    type MetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(Schema {
            version: 1,
            block: Block {
                version: 1,
                description: Description::plain("HuaweiCloud provider"),
                attributes: map! {
                    "region" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The HuaweiCloud region to manage resources in"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "access_key" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The access key of the HuaweiCloud account"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "secret_key" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The secret key of the HuaweiCloud account"),
                        constraint: AttributeConstraint::Optional,
                        sensitive: true,
                        ..Default::default()
                    },
                    "security_token" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The security token for temporary credentials"),
                        constraint: AttributeConstraint::Optional,
                        sensitive: true,
                        ..Default::default()
                    },
                    "project_id" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The ID of the project to manage resources in"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "endpoints" => Attribute {
                        attr_type: AttributeType::Map(AttributeType::String.into()),
                        description: Description::plain("Per-service endpoint overrides"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "insecure" => Attribute {
                        attr_type: AttributeType::Bool,
                        description: Description::plain("Skip TLS certificate verification"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "max_retries" => Attribute {
                        attr_type: AttributeType::Number,
                        description: Description::plain("Maximum number of retries for retryable API errors"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                },
                ..Default::default()
            },
        })
    }

    async fn validate<'a>(
        &self,
        diags: &mut Diagnostics,
        config: Self::Config<'a>,
    ) -> Option<()> {
        match (config.access_key.is_value(), config.secret_key.is_value()) {
            (true, false) => {
                diags.root_error(
                    "Incomplete credentials",
                    "`access_key` is set but `secret_key` is missing",
                );
            }
            (false, true) => {
                diags.root_error(
                    "Incomplete credentials",
                    "`secret_key` is set but `access_key` is missing",
                );
            }
            _ => {}
        }

        if diags.errors.is_empty() {
            Some(())
        } else {
            None
        }
    }

    async fn configure<'a>(
        &self,
        diags: &mut Diagnostics,
        _terraform_version: String,
        config: Self::Config<'a>,
    ) -> Option<()> {
        let region = value_or_env(&config.region, "HW_REGION_NAME");
        let access_key = value_or_env(&config.access_key, "HW_ACCESS_KEY");
        let secret_key = value_or_env(&config.secret_key, "HW_SECRET_KEY");
        let security_token = value_or_env(&config.security_token, "HW_SECURITY_TOKEN");
        let project_id = value_or_env(&config.project_id, "HW_PROJECT_ID");

        let Some(region) = region else {
            diags.root_error_short(
                "region is required (set in provider config or HW_REGION_NAME env var)",
            );
            return None;
        };
        let (Some(access_key), Some(secret_key)) = (access_key, secret_key) else {
            diags.root_error_short(
                "credentials are required (set access_key/secret_key or HW_ACCESS_KEY/HW_SECRET_KEY)",
            );
            return None;
        };

        let insecure = match config.insecure {
            Value::Value(insecure) => insecure,
            _ => std::env::var("HW_INSECURE")
                .ok()
                .and_then(|v| v.parse::<bool>().ok())
                .unwrap_or(false),
        };
        let max_retries = match config.max_retries {
            Value::Value(n) => n.max(0) as u32,
            _ => std::env::var("HW_MAX_RETRIES")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(3),
        };

        let endpoints: HashMap<String, String> = config
            .endpoints
            .iter()
            .flatten()
            .filter_map(|(service, endpoint)| {
                Some((service.to_string(), endpoint.as_ref_option()?.to_string()))
            })
            .collect();

        let client_config = ClientConfig {
            access_key,
            secret_key,
            security_token,
            region,
            project_id: project_id.unwrap_or_default(),
            endpoints,
            insecure,
            max_retries,
        };

        match Client::new(client_config) {
            Ok(client) => {
                let _ = self.data.set(ProviderData::new(client));
                Some(())
            }
            Err(e) => {
                diags.root_error("Failed to create API client", e.to_string());
                None
            }
        }
    }

    fn get_resources(
        &self,
        _diags: &mut Diagnostics,
    ) -> Option<HashMap<String, Box<dyn DynamicResource>>> {
        Some(map! {
            "cbh_instance" => resources::CbhInstanceResource::new(self.data.clone()),
            "cse_microservice_engine" => resources::CseEngineResource::new(self.data.clone()),
            "cse_microservice" => resources::CseMicroserviceResource::new(self.data.clone()),
            "cts_tracker" => resources::CtsTrackerResource::new(self.data.clone()),
            "cts_notification" => resources::CtsNotificationResource::new(self.data.clone()),
            "sdrs_protection_group" => resources::SdrsProtectionGroupResource::new(self.data.clone()),
            "sdrs_protected_instance" => resources::SdrsProtectedInstanceResource::new(self.data.clone()),
            "sms_task" => resources::SmsTaskResource::new(self.data.clone()),
            "esw_instance" => resources::EswInstanceResource::new(self.data.clone()),
            "compute_instance" => resources::ComputeInstanceResource::new(self.data.clone()),
        })
    }

    fn get_data_sources(
        &self,
        _diags: &mut Diagnostics,
    ) -> Option<HashMap<String, Box<dyn DynamicDataSource>>> {
        Some(map! {
            "cbh_instances" => data_sources::CbhInstancesDataSource::new(self.data.clone()),
            "sms_source_servers" => data_sources::SmsSourceServersDataSource::new(self.data.clone()),
            "sdrs_domain" => data_sources::SdrsDomainDataSource::new(self.data.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for var in [
            "HW_REGION_NAME",
            "HW_ACCESS_KEY",
            "HW_SECRET_KEY",
            "HW_SECURITY_TOKEN",
            "HW_PROJECT_ID",
            "HW_INSECURE",
            "HW_MAX_RETRIES",
        ] {
            std::env::remove_var(var);
        }
    }

    #[tokio::test]
    #[serial]
    async fn provider_configures_from_env_vars() {
        clear_env();
        std::env::set_var("HW_REGION_NAME", "cn-north-4");
        std::env::set_var("HW_ACCESS_KEY", "ak");
        std::env::set_var("HW_SECRET_KEY", "sk");
        std::env::set_var("HW_PROJECT_ID", "pid");

        let provider = HuaweicloudProvider::new();
        let mut diags = Diagnostics::default();
        let result = provider
            .configure(&mut diags, "1.8.0".to_string(), ProviderConfig::default())
            .await;

        assert!(result.is_some(), "diags: {:?}", diags.errors);
        assert!(diags.errors.is_empty());
        let data = provider.configured_data().unwrap();
        assert_eq!(data.client.region(), "cn-north-4");
        assert_eq!(data.client.project_id(), "pid");

        clear_env();
    }

    #[tokio::test]
    #[serial]
    async fn provider_configure_requires_region() {
        clear_env();
        std::env::set_var("HW_ACCESS_KEY", "ak");
        std::env::set_var("HW_SECRET_KEY", "sk");

        let provider = HuaweicloudProvider::new();
        let mut diags = Diagnostics::default();
        let result = provider
            .configure(&mut diags, "1.8.0".to_string(), ProviderConfig::default())
            .await;

        assert!(result.is_none());
        assert!(diags.errors[0].summary.contains("region is required"));

        clear_env();
    }

    #[tokio::test]
    #[serial]
    async fn provider_configure_requires_credentials() {
        clear_env();
        std::env::set_var("HW_REGION_NAME", "cn-north-4");

        let provider = HuaweicloudProvider::new();
        let mut diags = Diagnostics::default();
        let result = provider
            .configure(&mut diags, "1.8.0".to_string(), ProviderConfig::default())
            .await;

        assert!(result.is_none());
        assert!(diags.errors[0].summary.contains("credentials are required"));

        clear_env();
    }

    #[tokio::test]
    async fn validate_rejects_half_configured_credentials() {
        let provider = HuaweicloudProvider::new();
        let mut diags = Diagnostics::default();
        let config = ProviderConfig {
            access_key: Value::Value("ak".into()),
            ..Default::default()
        };
        let result = provider.validate(&mut diags, config).await;
        assert!(result.is_none());
        assert_eq!(diags.errors[0].summary, "Incomplete credentials");
    }

    #[test]
    fn registries_contain_the_expected_types() {
        let provider = HuaweicloudProvider::new();
        let mut diags = Diagnostics::default();

        let resources = provider.get_resources(&mut diags).unwrap();
        for name in [
            "cbh_instance",
            "cse_microservice_engine",
            "cse_microservice",
            "cts_tracker",
            "cts_notification",
            "sdrs_protection_group",
            "sdrs_protected_instance",
            "sms_task",
            "esw_instance",
            "compute_instance",
        ] {
            assert!(resources.contains_key(name), "missing resource {}", name);
        }

        let data_sources = provider.get_data_sources(&mut diags).unwrap();
        for name in ["cbh_instances", "sms_source_servers", "sdrs_domain"] {
            assert!(data_sources.contains_key(name), "missing data source {}", name);
        }
    }
}
