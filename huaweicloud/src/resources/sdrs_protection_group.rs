//! SDRS protection group resource

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use tf_provider::schema::{
    Attribute, AttributeConstraint, AttributeType, Block, Description, Schema,
};
use tf_provider::value::{Value, ValueBool, ValueEmpty, ValueList, ValueString};
use tf_provider::{map, AttributePath, Diagnostics, Resource};

use crate::api::common::path_search_string;
use crate::api::sdrs::{
    CreateProtectionGroupRequest, ProtectionGroup, ProtectionGroupBody,
    UpdateProtectionGroupBody, UpdateProtectionGroupRequest,
};
use crate::provider_data::SharedProviderData;
use crate::utils::{expect_state, force_new, keep_or_null, opt_string, provider_client, set_opt_string, set_string};

const CREATE_TIMEOUT: Duration = Duration::from_secs(10 * 60);
const UPDATE_TIMEOUT: Duration = Duration::from_secs(10 * 60);
const DELETE_TIMEOUT: Duration = Duration::from_secs(10 * 60);

const DR_TYPE_MIGRATION: &str = "migration";
const STATUS_PROTECTED: &str = "protected";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SdrsProtectionGroupState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    pub region: ValueString<'a>,
    pub name: ValueString<'a>,
    pub description: ValueString<'a>,
    pub source_availability_zone: ValueString<'a>,
    pub target_availability_zone: ValueString<'a>,
    pub domain_id: ValueString<'a>,
    pub source_vpc_id: ValueString<'a>,
    pub dr_type: ValueString<'a>,
    pub enable: ValueBool,
    pub status: ValueString<'a>,
    pub protected_instances: ValueList<ValueString<'a>>,
}

pub struct SdrsProtectionGroupResource {
    data: SharedProviderData,
}

impl SdrsProtectionGroupResource {
    pub fn new(data: SharedProviderData) -> Self {
        Self { data }
    }
}

fn flatten_group<'a>(
    state: &SdrsProtectionGroupState<'a>,
    group: &ProtectionGroup,
) -> SdrsProtectionGroupState<'a> {
    let mut new_state = state.clone();
    new_state.id = set_string(group.id.clone());
    new_state.name = set_string(group.name.clone());
    new_state.status = set_opt_string(group.status.clone());
    new_state.enable = Value::Value(group.status.as_deref() == Some(STATUS_PROTECTED));
    new_state.description = match &group.description {
        Some(description) => set_string(description.clone()),
        None => keep_or_null(&state.description),
    };
    if let Some(zone) = &group.source_availability_zone {
        new_state.source_availability_zone = set_string(zone.clone());
    }
    if let Some(zone) = &group.target_availability_zone {
        new_state.target_availability_zone = set_string(zone.clone());
    }
    if let Some(domain_id) = &group.domain_id {
        new_state.domain_id = set_string(domain_id.clone());
    }
    if let Some(vpc_id) = &group.source_vpc_id {
        new_state.source_vpc_id = set_string(vpc_id.clone());
    }
    new_state.dr_type = match &group.dr_type {
        Some(dr_type) => set_string(dr_type.clone()),
        None => keep_or_null(&state.dr_type),
    };
    new_state.protected_instances = Value::Value(
        group
            .protected_instances
            .iter()
            .cloned()
            .map(set_string)
            .collect(),
    );
    new_state
}

#[async_trait]
impl Resource for SdrsProtectionGroupResource {
    type State<'a> = Value<SdrsProtectionGroupState<'a>>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(Schema {
            version: 1,
            block: Block {
                version: 1,
                description: Description::plain("Manages an SDRS protection group"),
                attributes: map! {
                    "id" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The ID of the protection group"),
                        constraint: AttributeConstraint::Computed,
                        ..Default::default()
                    },
                    "region" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The region in which to create the protection group"),
                        constraint: AttributeConstraint::OptionalComputed,
                        ..Default::default()
                    },
                    "name" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The name of the protection group"),
                        constraint: AttributeConstraint::Required,
                        ..Default::default()
                    },
                    "description" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The description of the protection group"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "source_availability_zone" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The production site availability zone"),
                        constraint: AttributeConstraint::Required,
                        ..Default::default()
                    },
                    "target_availability_zone" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The disaster recovery site availability zone"),
                        constraint: AttributeConstraint::Required,
                        ..Default::default()
                    },
                    "domain_id" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The ID of the active-active replication domain"),
                        constraint: AttributeConstraint::Required,
                        ..Default::default()
                    },
                    "source_vpc_id" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The ID of the production site VPC"),
                        constraint: AttributeConstraint::Required,
                        ..Default::default()
                    },
                    "dr_type" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The deployment model, currently only `migration`"),
                        constraint: AttributeConstraint::OptionalComputed,
                        ..Default::default()
                    },
                    "enable" => Attribute {
                        attr_type: AttributeType::Bool,
                        description: Description::plain("Whether protection is started for the group"),
                        constraint: AttributeConstraint::OptionalComputed,
                        ..Default::default()
                    },
                    "status" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The status of the protection group"),
                        constraint: AttributeConstraint::Computed,
                        ..Default::default()
                    },
                    "protected_instances" => Attribute {
                        attr_type: AttributeType::List(AttributeType::String.into()),
                        description: Description::plain("The IDs of the protected instances in the group"),
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
            if let Some(dr_type) = config.dr_type.as_ref_option() {
                if dr_type.as_ref() != DR_TYPE_MIGRATION {
                    diags.error(
                        "Invalid dr_type",
                        format!("`dr_type` only supports `{}`", DR_TYPE_MIGRATION),
                        AttributePath::new("dr_type"),
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

        match client.sdrs(region.as_deref()).get_protection_group(&id).await {
            Ok(group) => Some((Value::Value(flatten_group(&state, &group)), private_state)),
            Err(e) if e.is_not_found() => Some((Value::Null, private_state)),
            Err(e) => {
                diags.root_error("Failed to read SDRS protection group", e.to_string());
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
        state.protected_instances = Value::Unknown;
        if state.region.is_null() {
            state.region = Value::Unknown;
        }
        if state.dr_type.is_null() {
            state.dr_type = Value::Value("migration".into());
        }
        if state.enable.is_null() {
            state.enable = Value::Value(false);
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
        let (Value::Value(prior), Value::Value(mut proposed)) = (prior_state, proposed_state)
        else {
            return None;
        };

        let mut triggers = Vec::new();
        force_new(&mut triggers, "region", &prior.region, &proposed.region);
        force_new(&mut triggers, "description", &prior.description, &proposed.description);
        force_new(
            &mut triggers,
            "source_availability_zone",
            &prior.source_availability_zone,
            &proposed.source_availability_zone,
        );
        force_new(
            &mut triggers,
            "target_availability_zone",
            &prior.target_availability_zone,
            &proposed.target_availability_zone,
        );
        force_new(&mut triggers, "domain_id", &prior.domain_id, &proposed.domain_id);
        force_new(&mut triggers, "source_vpc_id", &prior.source_vpc_id, &proposed.source_vpc_id);
        force_new(&mut triggers, "dr_type", &prior.dr_type, &proposed.dr_type);

        if proposed.enable != prior.enable {
            proposed.status = Value::Unknown;
        }

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
        let api = client.sdrs(Some(&region));

        let request = CreateProtectionGroupRequest {
            server_group: ProtectionGroupBody {
                name: state.name.as_str().to_string(),
                description: opt_string(&state.description),
                source_availability_zone: state.source_availability_zone.as_str().to_string(),
                target_availability_zone: state.target_availability_zone.as_str().to_string(),
                domain_id: state.domain_id.as_str().to_string(),
                source_vpc_id: state.source_vpc_id.as_str().to_string(),
                dr_type: opt_string(&state.dr_type),
            },
        };

        let job_id = match api.create_protection_group(&request).await {
            Ok(response) => response.job_id,
            Err(e) => {
                diags.root_error("Failed to create SDRS protection group", e.to_string());
                return None;
            }
        };

        let entities = match api.wait_for_job(&job_id, CREATE_TIMEOUT).await {
            Ok(entities) => entities,
            Err(e) => {
                diags.root_error(
                    "Error waiting for SDRS protection group creation",
                    e.to_string(),
                );
                return None;
            }
        };
        let Some(group_id) = path_search_string(&entities, "server_group_id") else {
            diags.root_error_short("server_group_id not found in job entities");
            return None;
        };

        if state.enable.contains(&true) {
            match api.set_protection(&group_id, true).await {
                Ok(response) => {
                    if let Err(e) = api.wait_for_job(&response.job_id, CREATE_TIMEOUT).await {
                        diags.root_error("Error waiting for protection start", e.to_string());
                        return None;
                    }
                }
                Err(e) => {
                    diags.root_error("Failed to start protection", e.to_string());
                    return None;
                }
            }
        }

        let mut new_state = state.clone();
        new_state.region = set_string(region);
        new_state.id = set_string(group_id.clone());
        match api.get_protection_group(&group_id).await {
            Ok(group) => new_state = flatten_group(&new_state, &group),
            Err(e) => {
                diags.root_error(
                    "Failed to read SDRS protection group after creation",
                    e.to_string(),
                );
                return None;
            }
        }

        Some((Value::Value(new_state), planned_private_state))
    }

    async fn update<'a>(
        &self,
        diags: &mut Diagnostics,
        prior_state: Self::State<'a>,
        planned_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        planned_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let prior = expect_state(diags, prior_state)?;
        let planned = expect_state(diags, planned_state)?;
        let client = provider_client(diags, &self.data)?;
        let region = opt_string(&planned.region);
        let api = client.sdrs(region.as_deref());

        let Some(group_id) = opt_string(&prior.id) else {
            diags.root_error_short("SDRS protection group id is missing from state");
            return None;
        };

        if planned.name != prior.name {
            let request = UpdateProtectionGroupRequest {
                server_group: UpdateProtectionGroupBody {
                    name: planned.name.as_str().to_string(),
                },
            };
            if let Err(e) = api.update_protection_group(&group_id, &request).await {
                diags.root_error("Failed to update SDRS protection group", e.to_string());
                return None;
            }
        }

        if planned.enable != prior.enable {
            let enable = planned.enable.contains(&true);
            match api.set_protection(&group_id, enable).await {
                Ok(response) => {
                    if let Err(e) = api.wait_for_job(&response.job_id, UPDATE_TIMEOUT).await {
                        diags.root_error("Error waiting for protection change", e.to_string());
                        return None;
                    }
                }
                Err(e) => {
                    diags.root_error("Failed to change protection state", e.to_string());
                    return None;
                }
            }
        }

        let mut new_state = planned.clone();
        match api.get_protection_group(&group_id).await {
            Ok(group) => new_state = flatten_group(&new_state, &group),
            Err(e) => {
                diags.root_error(
                    "Failed to read SDRS protection group after update",
                    e.to_string(),
                );
                return None;
            }
        }

        Some((Value::Value(new_state), planned_private_state))
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
        let api = client.sdrs(region.as_deref());

        let Some(group_id) = opt_string(&state.id) else {
            return Some(());
        };

        let job_id = match api.delete_protection_group(&group_id).await {
            Ok(response) => response.job_id,
            Err(e) if e.is_not_found() => return Some(()),
            Err(e) => {
                diags.root_error("Failed to delete SDRS protection group", e.to_string());
                return None;
            }
        };

        if let Err(e) = api.wait_for_job(&job_id, DELETE_TIMEOUT).await {
            diags.root_error(
                "Error waiting for SDRS protection group deletion",
                e.to_string(),
            );
            return None;
        }

        Some(())
    }

    async fn import<'a>(
        &self,
        _diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let state = SdrsProtectionGroupState {
            id: set_string(id),
            ..Default::default()
        };
        Some((Value::Value(state), Default::default()))
    }
}
