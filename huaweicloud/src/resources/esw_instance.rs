//! ESW instance (layer-2 connectivity gateway) resource

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use tf_provider::schema::{
    Attribute, AttributeConstraint, AttributeType, Block, Description, Schema,
};
use tf_provider::value::{Value, ValueEmpty, ValueMap, ValueString};
use tf_provider::{map, AttributePath, Diagnostics, Resource};

use crate::api::esw::{
    CreateGatewayRequest, Gateway, GatewayBody, UpdateGatewayBody, UpdateGatewayRequest,
    GATEWAY_STATUS_ACTIVE, GATEWAY_STATUS_ERROR, GATEWAY_STATUS_PENDING_CREATE,
    GATEWAY_STATUS_PENDING_DELETE, GATEWAY_STATUS_PENDING_UPDATE,
};
use crate::api::poll::{wait_for_state, StateWait, STATE_DELETED};
use crate::provider_data::SharedProviderData;
use crate::utils::{
    expand_tags, expect_state, flatten_tags, force_new, keep_or_null, opt_string, provider_client,
    set_opt_string, set_string,
};

const CREATE_TIMEOUT: Duration = Duration::from_secs(30 * 60);
const DELETE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EswInstanceState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    pub region: ValueString<'a>,
    pub name: ValueString<'a>,
    pub description: ValueString<'a>,
    pub flavor: ValueString<'a>,
    pub availability_zone: ValueString<'a>,
    pub virsubnet_id: ValueString<'a>,
    pub ip_address: ValueString<'a>,
    pub tags: ValueMap<'a, ValueString<'a>>,
    pub vpc_id: ValueString<'a>,
    pub status: ValueString<'a>,
    pub created_at: ValueString<'a>,
}

pub struct EswInstanceResource {
    data: SharedProviderData,
}

impl EswInstanceResource {
    pub fn new(data: SharedProviderData) -> Self {
        Self { data }
    }
}

fn flatten_gateway<'a>(state: &EswInstanceState<'a>, gateway: &Gateway) -> EswInstanceState<'a> {
    let mut new_state = state.clone();
    new_state.id = set_string(gateway.id.clone());
    new_state.name = set_string(gateway.name.clone());
    new_state.status = set_opt_string(gateway.status.clone());
    new_state.vpc_id = set_opt_string(gateway.vpc_id.clone());
    new_state.created_at = set_opt_string(gateway.created_at.clone());
    new_state.description = match &gateway.description {
        Some(description) => set_string(description.clone()),
        None => keep_or_null(&state.description),
    };
    new_state.flavor = match &gateway.flavor {
        Some(flavor) => set_string(flavor.clone()),
        None => keep_or_null(&state.flavor),
    };
    new_state.availability_zone = match &gateway.availability_zone {
        Some(zone) => set_string(zone.clone()),
        None => keep_or_null(&state.availability_zone),
    };
    if let Some(virsubnet_id) = &gateway.virsubnet_id {
        new_state.virsubnet_id = set_string(virsubnet_id.clone());
    }
    new_state.ip_address = match &gateway.ip_address {
        Some(ip) => set_string(ip.clone()),
        None => keep_or_null(&state.ip_address),
    };
    if gateway.tags.is_empty() {
        new_state.tags = keep_or_null(&state.tags);
    } else {
        new_state.tags = flatten_tags(&gateway.tags);
    }
    new_state
}

#[async_trait]
impl Resource for EswInstanceResource {
    type State<'a> = Value<EswInstanceState<'a>>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(Schema {
            version: 1,
            block: Block {
                version: 1,
                description: Description::plain("Manages an ESW layer-2 connectivity gateway"),
                attributes: map! {
                    "id" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The ID of the gateway"),
                        constraint: AttributeConstraint::Computed,
                        ..Default::default()
                    },
                    "region" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The region in which to create the gateway"),
                        constraint: AttributeConstraint::OptionalComputed,
                        ..Default::default()
                    },
                    "name" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The name of the gateway"),
                        constraint: AttributeConstraint::Required,
                        ..Default::default()
                    },
                    "description" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The description of the gateway"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "flavor" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The flavor of the gateway"),
                        constraint: AttributeConstraint::OptionalComputed,
                        ..Default::default()
                    },
                    "availability_zone" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The availability zone of the gateway"),
                        constraint: AttributeConstraint::OptionalComputed,
                        ..Default::default()
                    },
                    "virsubnet_id" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The ID of the virtual subnet the gateway extends"),
                        constraint: AttributeConstraint::Required,
                        ..Default::default()
                    },
                    "ip_address" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The tunnel IP address of the gateway"),
                        constraint: AttributeConstraint::OptionalComputed,
                        ..Default::default()
                    },
                    "tags" => Attribute {
                        attr_type: AttributeType::Map(AttributeType::String.into()),
                        description: Description::plain("The key/value pairs to associate with the gateway"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "vpc_id" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The ID of the VPC the subnet belongs to"),
                        constraint: AttributeConstraint::Computed,
                        ..Default::default()
                    },
                    "status" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The status of the gateway"),
                        constraint: AttributeConstraint::Computed,
                        ..Default::default()
                    },
                    "created_at" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The creation time of the gateway"),
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

        match client.esw(region.as_deref()).get_gateway(&id).await {
            Ok(gateway) => Some((Value::Value(flatten_gateway(&state, &gateway)), private_state)),
            Err(e) if e.is_not_found() => Some((Value::Null, private_state)),
            Err(e) => {
                diags.root_error("Failed to read ESW instance", e.to_string());
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
        state.vpc_id = Value::Unknown;
        state.created_at = Value::Unknown;
        if state.region.is_null() {
            state.region = Value::Unknown;
        }
        if state.flavor.is_null() {
            state.flavor = Value::Unknown;
        }
        if state.availability_zone.is_null() {
            state.availability_zone = Value::Unknown;
        }
        if state.ip_address.is_null() {
            state.ip_address = Value::Unknown;
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
        force_new(&mut triggers, "flavor", &prior.flavor, &proposed.flavor);
        force_new(
            &mut triggers,
            "availability_zone",
            &prior.availability_zone,
            &proposed.availability_zone,
        );
        force_new(&mut triggers, "virsubnet_id", &prior.virsubnet_id, &proposed.virsubnet_id);
        force_new(&mut triggers, "ip_address", &prior.ip_address, &proposed.ip_address);

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
        let api = client.esw(Some(&region));

        let request = CreateGatewayRequest {
            l2cg: GatewayBody {
                name: state.name.as_str().to_string(),
                description: opt_string(&state.description),
                flavor: opt_string(&state.flavor),
                availability_zone: opt_string(&state.availability_zone),
                virsubnet_id: state.virsubnet_id.as_str().to_string(),
                ip_address: opt_string(&state.ip_address),
                tags: expand_tags(&state.tags),
            },
        };

        let gateway_id = match api.create_gateway(&request).await {
            Ok(gateway) => gateway.id,
            Err(e) => {
                diags.root_error("Failed to create ESW instance", e.to_string());
                return None;
            }
        };

        let wait = StateWait {
            pending: &[GATEWAY_STATUS_PENDING_CREATE],
            target: &[GATEWAY_STATUS_ACTIVE],
            delay: Duration::from_secs(5),
            interval: Duration::from_secs(10),
            timeout: CREATE_TIMEOUT,
        };
        let wait_result = wait_for_state(wait, || {
            let api = client.esw(Some(&region));
            let gateway_id = gateway_id.clone();
            async move {
                let gateway = api.get_gateway(&gateway_id).await?;
                Ok(gateway
                    .status
                    .unwrap_or_else(|| GATEWAY_STATUS_ERROR.to_string()))
            }
        })
        .await;
        if let Err(e) = wait_result {
            diags.root_error(
                "Error waiting for ESW instance to become active",
                e.to_string(),
            );
            return None;
        }

        let mut new_state = state.clone();
        new_state.region = set_string(region);
        new_state.id = set_string(gateway_id.clone());
        match api.get_gateway(&gateway_id).await {
            Ok(gateway) => new_state = flatten_gateway(&new_state, &gateway),
            Err(e) => {
                diags.root_error("Failed to read ESW instance after creation", e.to_string());
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
        let api = client.esw(region.as_deref());

        let Some(gateway_id) = opt_string(&prior.id) else {
            diags.root_error_short("ESW instance id is missing from state");
            return None;
        };

        if planned.name != prior.name || planned.description != prior.description {
            let request = UpdateGatewayRequest {
                l2cg: UpdateGatewayBody {
                    name: opt_string(&planned.name),
                    description: opt_string(&planned.description),
                },
            };
            if let Err(e) = api.update_gateway(&gateway_id, &request).await {
                diags.root_error("Failed to update ESW instance", e.to_string());
                return None;
            }
        }

        let mut new_state = planned.clone();
        new_state.id = set_string(gateway_id.clone());
        match api.get_gateway(&gateway_id).await {
            Ok(gateway) => new_state = flatten_gateway(&new_state, &gateway),
            Err(e) => {
                diags.root_error("Failed to read ESW instance after update", e.to_string());
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

        let Some(gateway_id) = opt_string(&state.id) else {
            return Some(());
        };

        match client.esw(region.as_deref()).delete_gateway(&gateway_id).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => return Some(()),
            Err(e) => {
                diags.root_error("Failed to delete ESW instance", e.to_string());
                return None;
            }
        }

        let wait = StateWait {
            pending: &[
                GATEWAY_STATUS_ACTIVE,
                GATEWAY_STATUS_PENDING_DELETE,
                GATEWAY_STATUS_PENDING_UPDATE,
            ],
            target: &[STATE_DELETED],
            delay: Duration::from_secs(5),
            interval: Duration::from_secs(10),
            timeout: DELETE_TIMEOUT,
        };
        let wait_result = wait_for_state(wait, || {
            let api = client.esw(region.as_deref());
            let gateway_id = gateway_id.clone();
            async move {
                match api.get_gateway(&gateway_id).await {
                    Ok(gateway) => Ok(gateway
                        .status
                        .unwrap_or_else(|| GATEWAY_STATUS_PENDING_DELETE.to_string())),
                    Err(e) if e.is_not_found() => Ok(STATE_DELETED.to_string()),
                    Err(e) => Err(e),
                }
            }
        })
        .await;
        if let Err(e) = wait_result {
            diags.root_error("Error waiting for ESW instance deletion", e.to_string());
            return None;
        }

        Some(())
    }

    async fn import<'a>(
        &self,
        _diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let state = EswInstanceState {
            id: set_string(id),
            ..Default::default()
        };
        Some((Value::Value(state), Default::default()))
    }
}
