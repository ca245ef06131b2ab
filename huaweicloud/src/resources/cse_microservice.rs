//! CSE microservice resource
//!
//! Registered directly against a microservice engine through its connect
//! address rather than the regional management endpoint. Engines created
//! with RBAC auth require an account/password pair to obtain a token
//! before each call.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use tf_provider::schema::{
    Attribute, AttributeConstraint, AttributeType, Block, Description, Schema,
};
use tf_provider::value::{Value, ValueEmpty, ValueString};
use tf_provider::{map, AttributePath, Diagnostics, Resource};

use crate::api::cse::{CreateMicroserviceRequest, CseRegistryApi, Microservice, TokenRequest};
use crate::api::ApiError;
use crate::provider_data::SharedProviderData;
use crate::utils::{expect_state, force_new, keep_or_null, opt_string, provider_client, set_opt_string, set_string};

const ENVIRONMENTS: &[&str] = &["development", "testing", "acceptance", "production"];

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CseMicroserviceState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    pub connect_address: ValueString<'a>,
    pub name: ValueString<'a>,
    pub app_name: ValueString<'a>,
    pub version: ValueString<'a>,
    pub environment: ValueString<'a>,
    pub level: ValueString<'a>,
    pub description: ValueString<'a>,
    pub admin_user: ValueString<'a>,
    pub admin_pass: ValueString<'a>,
    pub status: ValueString<'a>,
}

pub struct CseMicroserviceResource {
    data: SharedProviderData,
}

impl CseMicroserviceResource {
    pub fn new(data: SharedProviderData) -> Self {
        Self { data }
    }
}

async fn registry_token(
    api: &CseRegistryApi<'_>,
    state: &CseMicroserviceState<'_>,
) -> Result<Option<String>, ApiError> {
    match (opt_string(&state.admin_user), opt_string(&state.admin_pass)) {
        (Some(name), Some(password)) => {
            let token = api.get_token(&TokenRequest { name, password }).await?;
            Ok(Some(token))
        }
        _ => Ok(None),
    }
}

fn flatten_microservice<'a>(
    state: &CseMicroserviceState<'a>,
    service: &Microservice,
) -> CseMicroserviceState<'a> {
    let mut new_state = state.clone();
    if let Some(service_id) = &service.service_id {
        new_state.id = set_string(service_id.clone());
    }
    new_state.name = set_string(service.service_name.clone());
    new_state.app_name = set_string(service.app_id.clone());
    new_state.version = set_string(service.version.clone());
    new_state.status = set_opt_string(service.status.clone());
    new_state.environment = match &service.environment {
        Some(environment) => set_string(environment.clone()),
        None => keep_or_null(&state.environment),
    };
    new_state.level = match &service.level {
        Some(level) => set_string(level.clone()),
        None => keep_or_null(&state.level),
    };
    new_state.description = match &service.description {
        Some(description) => set_string(description.clone()),
        None => keep_or_null(&state.description),
    };
    new_state
}

#[async_trait]
impl Resource for CseMicroserviceResource {
    type State<'a> = Value<CseMicroserviceState<'a>>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(Schema {
            version: 1,
            block: Block {
                version: 1,
                description: Description::plain("Manages a microservice in a CSE engine"),
                attributes: map! {
                    "id" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The ID of the microservice"),
                        constraint: AttributeConstraint::Computed,
                        ..Default::default()
                    },
                    "connect_address" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The service registry address of the engine"),
                        constraint: AttributeConstraint::Required,
                        ..Default::default()
                    },
                    "name" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The name of the microservice"),
                        constraint: AttributeConstraint::Required,
                        ..Default::default()
                    },
                    "app_name" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The name of the application the microservice belongs to"),
                        constraint: AttributeConstraint::Required,
                        ..Default::default()
                    },
                    "version" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The version of the microservice"),
                        constraint: AttributeConstraint::Required,
                        ..Default::default()
                    },
                    "environment" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The environment the microservice is registered in"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "level" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The service level, e.g. `FRONT` or `BACK`"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "description" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The description of the microservice"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "admin_user" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The account name for an RBAC engine"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "admin_pass" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The account password for an RBAC engine"),
                        constraint: AttributeConstraint::Optional,
                        sensitive: true,
                        ..Default::default()
                    },
                    "status" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The status of the microservice"),
                        constraint: AttributeConstraint::Computed,
                        ..Default::default()
                    },
                },
                ..Default::default()
            },
        })
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::State<'a>) -> Option<()> {
        if let Value::Value(config) = &config {
            if let Some(environment) = config.environment.as_ref_option() {
                if !ENVIRONMENTS.contains(&environment.as_ref()) {
                    diags.error(
                        "Invalid environment",
                        format!("`environment` must be one of {:?}", ENVIRONMENTS),
                        AttributePath::new("environment"),
                    );
                }
            }
            if config.admin_user.is_value() && config.admin_pass.is_null() {
                diags.error(
                    "Missing admin_pass",
                    "`admin_pass` is required when `admin_user` is set",
                    AttributePath::new("admin_pass"),
                );
            }
        }
        if diags.errors.is_empty() {
            Some(())
        } else {
            None
        }
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        state: Self::State<'a>,
        private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let Value::Value(state) = state else {
            return Some((Value::Null, private_state));
        };
        let (Some(address), Some(id)) = (opt_string(&state.connect_address), opt_string(&state.id))
        else {
            return Some((Value::Null, private_state));
        };
        let client = provider_client(diags, &self.data)?;
        let api = client.cse_registry(&address);

        let token = match registry_token(&api, &state).await {
            Ok(token) => token,
            Err(e) => {
                diags.root_error("Failed to authenticate with CSE engine", e.to_string());
                return None;
            }
        };

        match api.get_microservice(token.as_deref(), &id).await {
            Ok(service) => Some((
                Value::Value(flatten_microservice(&state, &service)),
                private_state,
            )),
            Err(e) if e.is_not_found() => Some((Value::Null, private_state)),
            Err(e) => {
                diags.root_error("Failed to read microservice", e.to_string());
                None
            }
        }
    }

    async fn plan_create<'a>(
        &self,
        diags: &mut Diagnostics,
        proposed_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let mut state = expect_state(diags, proposed_state)?;
        state.id = Value::Unknown;
        state.status = Value::Unknown;
        Some((Value::Value(state), Default::default()))
    }

    async fn plan_update<'a>(
        &self,
        _diags: &mut Diagnostics,
        prior_state: Self::State<'a>,
        proposed_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        prior_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>, Vec<AttributePath>)> {
        let (Value::Value(prior), Value::Value(proposed)) = (prior_state, proposed_state) else {
            return None;
        };

        let mut triggers = Vec::new();
        force_new(
            &mut triggers,
            "connect_address",
            &prior.connect_address,
            &proposed.connect_address,
        );
        force_new(&mut triggers, "name", &prior.name, &proposed.name);
        force_new(&mut triggers, "app_name", &prior.app_name, &proposed.app_name);
        force_new(&mut triggers, "version", &prior.version, &proposed.version);
        force_new(&mut triggers, "environment", &prior.environment, &proposed.environment);
        force_new(&mut triggers, "level", &prior.level, &proposed.level);
        force_new(&mut triggers, "description", &prior.description, &proposed.description);

        Some((Value::Value(proposed), prior_private_state, triggers))
    }

    async fn plan_destroy<'a>(
        &self,
        _diags: &mut Diagnostics,
        _prior_state: Self::State<'a>,
        _prior_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<()> {
        Some(())
    }

    async fn create<'a>(
        &self,
        diags: &mut Diagnostics,
        planned_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        planned_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let state = expect_state(diags, planned_state)?;
        let client = provider_client(diags, &self.data)?;
        let address = state.connect_address.as_str().to_string();
        let api = client.cse_registry(&address);

        let token = match registry_token(&api, &state).await {
            Ok(token) => token,
            Err(e) => {
                diags.root_error("Failed to authenticate with CSE engine", e.to_string());
                return None;
            }
        };

        let request = CreateMicroserviceRequest {
            service: Microservice {
                service_id: None,
                service_name: state.name.as_str().to_string(),
                app_id: state.app_name.as_str().to_string(),
                version: state.version.as_str().to_string(),
                environment: opt_string(&state.environment),
                level: opt_string(&state.level),
                description: opt_string(&state.description),
                status: None,
            },
        };

        let service_id = match api.create_microservice(token.as_deref(), &request).await {
            Ok(response) => response.service_id,
            Err(e) => {
                diags.root_error("Failed to create microservice", e.to_string());
                return None;
            }
        };

        let mut new_state = state.clone();
        new_state.id = set_string(service_id.clone());
        match api.get_microservice(token.as_deref(), &service_id).await {
            Ok(service) => new_state = flatten_microservice(&new_state, &service),
            Err(e) => {
                diags.root_error("Failed to read microservice after creation", e.to_string());
                return None;
            }
        }

        Some((Value::Value(new_state), planned_private_state))
    }

    async fn update<'a>(
        &self,
        diags: &mut Diagnostics,
        _prior_state: Self::State<'a>,
        planned_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        planned_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        // registrations are immutable; only credential rotation lands here
        let planned = expect_state(diags, planned_state)?;
        Some((Value::Value(planned), planned_private_state))
    }

    async fn destroy<'a>(
        &self,
        diags: &mut Diagnostics,
        prior_state: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<()> {
        let state = expect_state(diags, prior_state)?;
        let client = provider_client(diags, &self.data)?;
        let (Some(address), Some(id)) = (opt_string(&state.connect_address), opt_string(&state.id))
        else {
            return Some(());
        };
        let api = client.cse_registry(&address);

        let token = match registry_token(&api, &state).await {
            Ok(token) => token,
            Err(e) => {
                diags.root_error("Failed to authenticate with CSE engine", e.to_string());
                return None;
            }
        };

        match api.delete_microservice(token.as_deref(), &id).await {
            Ok(()) => Some(()),
            Err(e) if e.is_not_found() => Some(()),
            Err(e) => {
                diags.root_error("Failed to delete microservice", e.to_string());
                None
            }
        }
    }

    async fn import<'a>(
        &self,
        diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        // import id format: <connect_address>/<service_id>
        let Some((address, service_id)) = id.rsplit_once('/') else {
            diags.root_error(
                "Invalid import id",
                "expected `<connect_address>/<service_id>`",
            );
            return None;
        };
        let state = CseMicroserviceState {
            id: set_string(service_id.to_string()),
            connect_address: set_string(address.to_string()),
            ..Default::default()
        };
        Some((Value::Value(state), Default::default()))
    }
}
