//! CSE microservice engine resource
//!
//! Engine provisioning is a long-running job; every mutable attribute is
//! create-only, so the resource has no in-place update surface.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use tf_provider::schema::{
    Attribute, AttributeConstraint, AttributeType, Block, Description, Schema,
};
use tf_provider::value::{Value, ValueEmpty, ValueList, ValueNumber, ValueString};
use tf_provider::{map, AttributePath, Diagnostics, Resource};

use crate::api::cse::{
    AuthCred, CreateEngineRequest, EngineDetail, ENGINE_JOB_ERROR, ENGINE_JOB_EXECUTING,
    ENGINE_JOB_FINISHED, ENGINE_JOB_INIT,
};
use crate::api::poll::{wait_for_state, StateWait};
use crate::provider_data::SharedProviderData;
use crate::utils::{expect_state, force_new, keep_or_null, opt_string, provider_client, set_opt_string, set_string};

const CREATE_TIMEOUT: Duration = Duration::from_secs(60 * 60);
const DELETE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

const AUTH_TYPE_RBAC: &str = "RBAC";
const AUTH_TYPE_NONE: &str = "NONE";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CseEngineState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    pub region: ValueString<'a>,
    pub name: ValueString<'a>,
    pub flavor: ValueString<'a>,
    pub availability_zones: ValueList<ValueString<'a>>,
    pub network_id: ValueString<'a>,
    pub auth_type: ValueString<'a>,
    pub admin_pass: ValueString<'a>,
    pub description: ValueString<'a>,
    pub version: ValueString<'a>,
    pub enterprise_project_id: ValueString<'a>,
    pub status: ValueString<'a>,
    pub service_limit: ValueNumber,
    pub instance_limit: ValueNumber,
    pub service_registry_address: ValueString<'a>,
    pub service_registry_public_address: ValueString<'a>,
    pub config_center_address: ValueString<'a>,
    pub config_center_public_address: ValueString<'a>,
}

pub struct CseEngineResource {
    data: SharedProviderData,
}

impl CseEngineResource {
    pub fn new(data: SharedProviderData) -> Self {
        Self { data }
    }
}

fn flatten_engine<'a>(state: &CseEngineState<'a>, engine: &EngineDetail) -> CseEngineState<'a> {
    let mut new_state = state.clone();
    new_state.id = set_string(engine.id.clone());
    new_state.name = set_string(engine.name.clone());
    new_state.status = set_opt_string(engine.status.clone());
    if let Some(flavor) = &engine.flavor {
        new_state.flavor = set_string(flavor.clone());
    }
    if let Some(az_list) = &engine.az_list {
        new_state.availability_zones =
            Value::Value(az_list.iter().cloned().map(set_string).collect());
    }
    if let Some(auth_type) = &engine.auth_type {
        new_state.auth_type = set_string(auth_type.clone());
    }
    new_state.version = match &engine.version {
        Some(version) => set_string(version.clone()),
        None => keep_or_null(&state.version),
    };
    new_state.description = match &engine.description {
        Some(description) => set_string(description.clone()),
        None => keep_or_null(&state.description),
    };
    new_state.enterprise_project_id = match &engine.enterprise_project_id {
        Some(id) => set_string(id.clone()),
        None => keep_or_null(&state.enterprise_project_id),
    };
    let reference = engine.reference.as_ref();
    new_state.service_limit = match reference.and_then(|r| r.service_limit) {
        Some(limit) => Value::Value(limit),
        None => Value::Null,
    };
    new_state.instance_limit = match reference.and_then(|r| r.instance_limit) {
        Some(limit) => Value::Value(limit),
        None => Value::Null,
    };
    let entrypoint = engine.external_entrypoint.as_ref();
    new_state.service_registry_address =
        set_opt_string(entrypoint.and_then(|e| e.service_center_address.clone()));
    new_state.service_registry_public_address =
        set_opt_string(entrypoint.and_then(|e| e.service_center_public_address.clone()));
    new_state.config_center_address =
        set_opt_string(entrypoint.and_then(|e| e.config_center_address.clone()));
    new_state.config_center_public_address =
        set_opt_string(entrypoint.and_then(|e| e.config_center_public_address.clone()));
    new_state.admin_pass = keep_or_null(&state.admin_pass);
    new_state
}

#[async_trait]
impl Resource for CseEngineResource {
    type State<'a> = Value<CseEngineState<'a>>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(Schema {
            version: 1,
            block: Block {
                version: 1,
                description: Description::plain("Manages a CSE microservice engine"),
                attributes: map! {
                    "id" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The ID of the engine"),
                        constraint: AttributeConstraint::Computed,
                        ..Default::default()
                    },
                    "region" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The region in which to create the engine"),
                        constraint: AttributeConstraint::OptionalComputed,
                        ..Default::default()
                    },
                    "name" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The name of the engine"),
                        constraint: AttributeConstraint::Required,
                        ..Default::default()
                    },
                    "flavor" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The flavor of the engine"),
                        constraint: AttributeConstraint::Required,
                        ..Default::default()
                    },
                    "availability_zones" => Attribute {
                        attr_type: AttributeType::List(AttributeType::String.into()),
                        description: Description::plain("The availability zones the engine is deployed in"),
                        constraint: AttributeConstraint::Required,
                        ..Default::default()
                    },
                    "network_id" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The network ID of the subnet the engine is attached to"),
                        constraint: AttributeConstraint::Required,
                        ..Default::default()
                    },
                    "auth_type" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The authentication method, either `RBAC` or `NONE`"),
                        constraint: AttributeConstraint::Required,
                        ..Default::default()
                    },
                    "admin_pass" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The password of the engine `root` account, required for RBAC"),
                        constraint: AttributeConstraint::Optional,
                        sensitive: true,
                        ..Default::default()
                    },
                    "description" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The description of the engine"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "version" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The version of the engine"),
                        constraint: AttributeConstraint::OptionalComputed,
                        ..Default::default()
                    },
                    "enterprise_project_id" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The enterprise project the engine belongs to"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "status" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The status of the engine"),
                        constraint: AttributeConstraint::Computed,
                        ..Default::default()
                    },
                    "service_limit" => Attribute {
                        attr_type: AttributeType::Number,
                        description: Description::plain("The maximum number of microservices the engine supports"),
                        constraint: AttributeConstraint::Computed,
                        ..Default::default()
                    },
                    "instance_limit" => Attribute {
                        attr_type: AttributeType::Number,
                        description: Description::plain("The maximum number of instances the engine supports"),
                        constraint: AttributeConstraint::Computed,
                        ..Default::default()
                    },
                    "service_registry_address" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The private address of the service registry"),
                        constraint: AttributeConstraint::Computed,
                        ..Default::default()
                    },
                    "service_registry_public_address" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The public address of the service registry"),
                        constraint: AttributeConstraint::Computed,
                        ..Default::default()
                    },
                    "config_center_address" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The private address of the config center"),
                        constraint: AttributeConstraint::Computed,
                        ..Default::default()
                    },
                    "config_center_public_address" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The public address of the config center"),
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
            if let Some(auth_type) = config.auth_type.as_ref_option() {
                let valid = [AUTH_TYPE_RBAC, AUTH_TYPE_NONE];
                if !valid.contains(&auth_type.as_ref()) {
                    diags.error(
                        "Invalid auth_type",
                        format!("`auth_type` must be one of {:?}", valid),
                        AttributePath::new("auth_type"),
                    );
                }
                if auth_type.as_ref() == AUTH_TYPE_RBAC && config.admin_pass.is_null() {
                    diags.error(
                        "Missing admin_pass",
                        "`admin_pass` is required when `auth_type` is `RBAC`",
                        AttributePath::new("admin_pass"),
                    );
                }
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
        let Some(id) = opt_string(&state.id) else {
            return Some((Value::Null, private_state));
        };
        let client = provider_client(diags, &self.data)?;
        let region = opt_string(&state.region);

        match client.cse(region.as_deref()).get_engine(&id).await {
            Ok(engine) => Some((Value::Value(flatten_engine(&state, &engine)), private_state)),
            Err(e) if e.is_not_found() => Some((Value::Null, private_state)),
            Err(e) => {
                diags.root_error("Failed to read CSE engine", e.to_string());
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
        state.service_limit = Value::Unknown;
        state.instance_limit = Value::Unknown;
        state.service_registry_address = Value::Unknown;
        state.service_registry_public_address = Value::Unknown;
        state.config_center_address = Value::Unknown;
        state.config_center_public_address = Value::Unknown;
        if state.region.is_null() {
            state.region = Value::Unknown;
        }
        if state.version.is_null() {
            state.version = Value::Unknown;
        }
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
        force_new(&mut triggers, "region", &prior.region, &proposed.region);
        force_new(&mut triggers, "name", &prior.name, &proposed.name);
        force_new(&mut triggers, "flavor", &prior.flavor, &proposed.flavor);
        force_new(
            &mut triggers,
            "availability_zones",
            &prior.availability_zones,
            &proposed.availability_zones,
        );
        force_new(&mut triggers, "network_id", &prior.network_id, &proposed.network_id);
        force_new(&mut triggers, "auth_type", &prior.auth_type, &proposed.auth_type);
        force_new(&mut triggers, "admin_pass", &prior.admin_pass, &proposed.admin_pass);
        force_new(&mut triggers, "description", &prior.description, &proposed.description);
        force_new(&mut triggers, "version", &prior.version, &proposed.version);
        force_new(
            &mut triggers,
            "enterprise_project_id",
            &prior.enterprise_project_id,
            &proposed.enterprise_project_id,
        );

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
        let region = opt_string(&state.region).unwrap_or_else(|| client.region().to_string());
        let api = client.cse(Some(&region));

        let request = CreateEngineRequest {
            name: state.name.as_str().to_string(),
            description: opt_string(&state.description),
            flavor: state.flavor.as_str().to_string(),
            az_list: state
                .availability_zones
                .iter()
                .flatten()
                .map(|az| az.as_str().to_string())
                .collect(),
            auth_type: state.auth_type.as_str().to_string(),
            network_id: state.network_id.as_str().to_string(),
            version: opt_string(&state.version),
            spec_type: "CSE2".to_string(),
            auth_cred: opt_string(&state.admin_pass).map(|pwd| AuthCred { pwd }),
            enterprise_project_id: opt_string(&state.enterprise_project_id),
        };

        let response = match api.create_engine(&request).await {
            Ok(response) => response,
            Err(e) => {
                diags.root_error("Failed to create CSE engine", e.to_string());
                return None;
            }
        };
        let engine_id = response.id;
        let job_id = response.job_id;

        let wait = StateWait {
            pending: &[ENGINE_JOB_INIT, ENGINE_JOB_EXECUTING],
            target: &[ENGINE_JOB_FINISHED],
            delay: Duration::from_secs(10),
            interval: Duration::from_secs(10),
            timeout: CREATE_TIMEOUT,
        };
        let wait_result = wait_for_state(wait, || {
            let api = client.cse(Some(&region));
            let engine_id = engine_id.clone();
            async move { Ok(api.get_engine_job(&engine_id, job_id).await?.status) }
        })
        .await;
        if let Err(e) = wait_result {
            diags.root_error("Error waiting for CSE engine creation", e.to_string());
            return None;
        }

        let mut new_state = state.clone();
        new_state.region = set_string(region);
        match api.get_engine(&engine_id).await {
            Ok(engine) => new_state = flatten_engine(&new_state, &engine),
            Err(e) => {
                diags.root_error("Failed to read CSE engine after creation", e.to_string());
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
        // every user attribute forces replacement, so only no-op diffs land
        // here
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
        let region = opt_string(&state.region);

        let Some(engine_id) = opt_string(&state.id) else {
            return Some(());
        };

        let job_id = match client.cse(region.as_deref()).delete_engine(&engine_id).await {
            Ok(response) => response.job_id,
            Err(e) if e.is_not_found() => return Some(()),
            Err(e) => {
                diags.root_error("Failed to delete CSE engine", e.to_string());
                return None;
            }
        };

        let wait = StateWait {
            pending: &[ENGINE_JOB_INIT, ENGINE_JOB_EXECUTING],
            target: &[ENGINE_JOB_FINISHED],
            delay: Duration::from_secs(10),
            interval: Duration::from_secs(10),
            timeout: DELETE_TIMEOUT,
        };
        let wait_result = wait_for_state(wait, || {
            let api = client.cse(region.as_deref());
            let engine_id = engine_id.clone();
            async move {
                match api.get_engine_job(&engine_id, job_id).await {
                    Ok(job) if job.status == ENGINE_JOB_ERROR => Ok(ENGINE_JOB_ERROR.to_string()),
                    Ok(job) => Ok(job.status),
                    // the engine vanishing with its jobs means the delete
                    // finished
                    Err(e) if e.is_not_found() => Ok(ENGINE_JOB_FINISHED.to_string()),
                    Err(e) => Err(e),
                }
            }
        })
        .await;
        if let Err(e) = wait_result {
            diags.root_error("Error waiting for CSE engine deletion", e.to_string());
            return None;
        }

        Some(())
    }

    async fn import<'a>(
        &self,
        _diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let state = CseEngineState {
            id: set_string(id),
            ..Default::default()
        };
        Some((Value::Value(state), Default::default()))
    }
}
