//! SDRS protected instance resource

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use tf_provider::schema::{
    Attribute, AttributeConstraint, AttributeType, Block, Description, Schema,
};
use tf_provider::value::{Value, ValueBool, ValueEmpty, ValueMap, ValueString};
use tf_provider::{map, AttributePath, Diagnostics, Resource};

use crate::api::common::path_search_string;
use crate::api::sdrs::{
    CreateProtectedInstanceRequest, DeleteProtectedInstanceRequest, ProtectedInstance,
    ProtectedInstanceBody, UpdateProtectedInstanceBody, UpdateProtectedInstanceRequest,
};
use crate::provider_data::SharedProviderData;
use crate::utils::{
    expand_tags, expect_state, flatten_tags, force_new, keep_or_null, opt_string, provider_client,
    set_opt_string, set_string,
};

const CREATE_TIMEOUT: Duration = Duration::from_secs(30 * 60);
const DELETE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SdrsProtectedInstanceState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    pub region: ValueString<'a>,
    pub name: ValueString<'a>,
    pub group_id: ValueString<'a>,
    pub server_id: ValueString<'a>,
    pub primary_subnet_id: ValueString<'a>,
    pub primary_ip_address: ValueString<'a>,
    pub description: ValueString<'a>,
    pub delete_target_server: ValueBool,
    pub delete_target_eip: ValueBool,
    pub tags: ValueMap<'a, ValueString<'a>>,
    pub status: ValueString<'a>,
    pub target_server: ValueString<'a>,
}

pub struct SdrsProtectedInstanceResource {
    data: SharedProviderData,
}

impl SdrsProtectedInstanceResource {
    pub fn new(data: SharedProviderData) -> Self {
        Self { data }
    }
}

fn flatten_protected_instance<'a>(
    state: &SdrsProtectedInstanceState<'a>,
    instance: &ProtectedInstance,
) -> SdrsProtectedInstanceState<'a> {
    let mut new_state = state.clone();
    new_state.id = set_string(instance.id.clone());
    new_state.name = set_string(instance.name.clone());
    new_state.status = set_opt_string(instance.status.clone());
    new_state.target_server = set_opt_string(instance.target_server.clone());
    if let Some(group_id) = &instance.server_group_id {
        new_state.group_id = set_string(group_id.clone());
    }
    if let Some(server_id) = &instance.source_server {
        new_state.server_id = set_string(server_id.clone());
    }
    new_state.description = match &instance.description {
        Some(description) => set_string(description.clone()),
        None => keep_or_null(&state.description),
    };
    if instance.tags.is_empty() {
        new_state.tags = keep_or_null(&state.tags);
    } else {
        new_state.tags = flatten_tags(&instance.tags);
    }
    new_state.primary_subnet_id = keep_or_null(&state.primary_subnet_id);
    new_state.primary_ip_address = keep_or_null(&state.primary_ip_address);
    new_state.delete_target_server = keep_or_null(&state.delete_target_server);
    new_state.delete_target_eip = keep_or_null(&state.delete_target_eip);
    new_state
}

#[async_trait]
impl Resource for SdrsProtectedInstanceResource {
    type State<'a> = Value<SdrsProtectedInstanceState<'a>>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(Schema {
            version: 1,
            block: Block {
                version: 1,
                description: Description::plain("Manages an SDRS protected instance"),
                attributes: map! {
                    "id" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The ID of the protected instance"),
                        constraint: AttributeConstraint::Computed,
                        ..Default::default()
                    },
                    "region" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The region in which to create the protected instance"),
                        constraint: AttributeConstraint::OptionalComputed,
                        ..Default::default()
                    },
                    "name" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The name of the protected instance"),
                        constraint: AttributeConstraint::Required,
                        ..Default::default()
                    },
                    "group_id" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The ID of the protection group"),
                        constraint: AttributeConstraint::Required,
                        ..Default::default()
                    },
                    "server_id" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The ID of the production site server"),
                        constraint: AttributeConstraint::Required,
                        ..Default::default()
                    },
                    "primary_subnet_id" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The network ID of the subnet for the DR site server"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "primary_ip_address" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The IP address of the primary NIC on the DR site server"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "description" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The description of the protected instance"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "delete_target_server" => Attribute {
                        attr_type: AttributeType::Bool,
                        description: Description::plain("Whether to delete the DR site server on destroy"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "delete_target_eip" => Attribute {
                        attr_type: AttributeType::Bool,
                        description: Description::plain("Whether to delete the DR site EIP on destroy"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "tags" => Attribute {
                        attr_type: AttributeType::Map(AttributeType::String.into()),
                        description: Description::plain("The key/value pairs to associate with the protected instance"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "status" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The status of the protected instance"),
                        constraint: AttributeConstraint::Computed,
                        ..Default::default()
                    },
                    "target_server" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The ID of the DR site server"),
                        constraint: AttributeConstraint::Computed,
                        ..Default::default()
                    },
                },
                ..Default::default()
            },
        })
    }

    async fn validate<'a>(&self, _diags: &mut Diagnostics, _config: Self::State<'a>) -> Option<()> {
        Some(())
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

        match client
            .sdrs(region.as_deref())
            .get_protected_instance(&id)
            .await
        {
            Ok(instance) => Some((
                Value::Value(flatten_protected_instance(&state, &instance)),
                private_state,
            )),
            Err(e) if e.is_not_found() => Some((Value::Null, private_state)),
            Err(e) => {
                diags.root_error("Failed to read SDRS protected instance", e.to_string());
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
        state.target_server = Value::Unknown;
        if state.region.is_null() {
            state.region = Value::Unknown;
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
        force_new(&mut triggers, "group_id", &prior.group_id, &proposed.group_id);
        force_new(&mut triggers, "server_id", &prior.server_id, &proposed.server_id);
        force_new(
            &mut triggers,
            "primary_subnet_id",
            &prior.primary_subnet_id,
            &proposed.primary_subnet_id,
        );
        force_new(
            &mut triggers,
            "primary_ip_address",
            &prior.primary_ip_address,
            &proposed.primary_ip_address,
        );
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
        let region = opt_string(&state.region).unwrap_or_else(|| client.region().to_string());
        let api = client.sdrs(Some(&region));

        let request = CreateProtectedInstanceRequest {
            protected_instance: ProtectedInstanceBody {
                name: state.name.as_str().to_string(),
                server_group_id: state.group_id.as_str().to_string(),
                server_id: state.server_id.as_str().to_string(),
                primary_subnet_id: opt_string(&state.primary_subnet_id),
                primary_ip_address: opt_string(&state.primary_ip_address),
                description: opt_string(&state.description),
                tags: expand_tags(&state.tags),
            },
        };

        let job_id = match api.create_protected_instance(&request).await {
            Ok(response) => response.job_id,
            Err(e) => {
                diags.root_error("Failed to create SDRS protected instance", e.to_string());
                return None;
            }
        };

        let entities = match api.wait_for_job(&job_id, CREATE_TIMEOUT).await {
            Ok(entities) => entities,
            Err(e) => {
                diags.root_error(
                    "Error waiting for SDRS protected instance creation",
                    e.to_string(),
                );
                return None;
            }
        };
        let Some(instance_id) = path_search_string(&entities, "protected_instance_id") else {
            diags.root_error_short("protected_instance_id not found in job entities");
            return None;
        };

        let mut new_state = state.clone();
        new_state.region = set_string(region);
        new_state.id = set_string(instance_id.clone());
        match api.get_protected_instance(&instance_id).await {
            Ok(instance) => new_state = flatten_protected_instance(&new_state, &instance),
            Err(e) => {
                diags.root_error(
                    "Failed to read SDRS protected instance after creation",
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

        let Some(instance_id) = opt_string(&prior.id) else {
            diags.root_error_short("SDRS protected instance id is missing from state");
            return None;
        };

        if planned.name != prior.name {
            let request = UpdateProtectedInstanceRequest {
                protected_instance: UpdateProtectedInstanceBody {
                    name: planned.name.as_str().to_string(),
                },
            };
            if let Err(e) = api.update_protected_instance(&instance_id, &request).await {
                diags.root_error("Failed to update SDRS protected instance", e.to_string());
                return None;
            }
        }

        let mut new_state = planned.clone();
        match api.get_protected_instance(&instance_id).await {
            Ok(instance) => new_state = flatten_protected_instance(&new_state, &instance),
            Err(e) => {
                diags.root_error(
                    "Failed to read SDRS protected instance after update",
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

        let Some(instance_id) = opt_string(&state.id) else {
            return Some(());
        };

        let request = DeleteProtectedInstanceRequest {
            delete_target_server: state.delete_target_server.as_ref_option().copied(),
            delete_target_eip: state.delete_target_eip.as_ref_option().copied(),
        };

        let job_id = match api.delete_protected_instance(&instance_id, &request).await {
            Ok(response) => response.job_id,
            Err(e) if e.is_not_found() => return Some(()),
            Err(e) => {
                diags.root_error("Failed to delete SDRS protected instance", e.to_string());
                return None;
            }
        };

        if let Err(e) = api.wait_for_job(&job_id, DELETE_TIMEOUT).await {
            diags.root_error(
                "Error waiting for SDRS protected instance deletion",
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
        let state = SdrsProtectedInstanceState {
            id: set_string(id),
            ..Default::default()
        };
        Some((Value::Value(state), Default::default()))
    }
}
