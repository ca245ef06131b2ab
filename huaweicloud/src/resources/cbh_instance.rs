//! CBH instance resource

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use tf_provider::schema::{
    Attribute, AttributeConstraint, AttributeType, Block, Description, Schema,
};
use tf_provider::value::{Value, ValueBool, ValueEmpty, ValueMap, ValueString};
use tf_provider::{map, AttributePath, Diagnostics, Resource};

use crate::api::cbh::{
    ChangePasswordRequest, CreateInstanceBody, CreateInstanceRequest, EipRequest, InstanceInfo,
    Nic, PublicIp, SecurityGroupRef,
};
use crate::api::poll::{wait_for_state, StateWait, STATE_DELETED};
use crate::provider_data::SharedProviderData;
use crate::utils::{
    expand_tags, expect_state, force_new, keep_or_null, opt_string, provider_client, set_opt_string,
    set_string,
};

const CREATE_TIMEOUT: Duration = Duration::from_secs(60 * 60);
const DELETE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CbhInstanceState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    pub region: ValueString<'a>,
    pub name: ValueString<'a>,
    pub flavor_id: ValueString<'a>,
    pub vpc_id: ValueString<'a>,
    pub subnet_id: ValueString<'a>,
    pub security_group_id: ValueString<'a>,
    pub availability_zone: ValueString<'a>,
    pub password: ValueString<'a>,
    pub subnet_address: ValueString<'a>,
    pub public_ip_id: ValueString<'a>,
    pub public_ip: ValueString<'a>,
    pub ipv6_enable: ValueBool,
    pub tags: ValueMap<'a, ValueString<'a>>,
    pub private_ip: ValueString<'a>,
    pub status: ValueString<'a>,
    pub version: ValueString<'a>,
}

pub struct CbhInstanceResource {
    data: SharedProviderData,
}

impl CbhInstanceResource {
    pub fn new(data: SharedProviderData) -> Self {
        Self { data }
    }
}

fn flatten_instance<'a>(state: &CbhInstanceState<'a>, info: &InstanceInfo) -> CbhInstanceState<'a> {
    let mut new_state = state.clone();
    new_state.id = set_string(info.server_id.clone());
    new_state.name = set_string(info.name.clone());
    new_state.status = set_string(info.status.clone());
    new_state.private_ip = set_opt_string(info.private_ip.clone());
    new_state.public_ip = set_opt_string(info.public_ip.clone());
    new_state.version = set_opt_string(info.version.clone());
    if let Some(flavor_id) = &info.flavor_id {
        new_state.flavor_id = set_string(flavor_id.clone());
    }
    if let Some(vpc_id) = &info.vpc_id {
        new_state.vpc_id = set_string(vpc_id.clone());
    }
    if let Some(subnet_id) = &info.subnet_id {
        new_state.subnet_id = set_string(subnet_id.clone());
    }
    if let Some(security_group_id) = &info.security_group_id {
        new_state.security_group_id = set_string(security_group_id.clone());
    }
    if let Some(availability_zone) = &info.availability_zone {
        new_state.availability_zone = set_string(availability_zone.clone());
    }
    new_state.subnet_address = match &info.subnet_address {
        Some(address) => set_string(address.clone()),
        None => keep_or_null(&state.subnet_address),
    };
    new_state.ipv6_enable = match info.ipv6_enable {
        Some(enabled) => Value::Value(enabled),
        None => keep_or_null(&state.ipv6_enable),
    };
    new_state.public_ip_id = keep_or_null(&state.public_ip_id);
    new_state.tags = keep_or_null(&state.tags);
    new_state.password = keep_or_null(&state.password);
    new_state
}

#[async_trait]
impl Resource for CbhInstanceResource {
    type State<'a> = Value<CbhInstanceState<'a>>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(Schema {
            version: 1,
            block: Block {
                version: 1,
                description: Description::plain("Manages a CBH (Cloud Bastion Host) instance"),
                attributes: map! {
                    "id" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The server ID of the instance"),
                        constraint: AttributeConstraint::Computed,
                        ..Default::default()
                    },
                    "region" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The region in which to create the instance"),
                        constraint: AttributeConstraint::OptionalComputed,
                        ..Default::default()
                    },
                    "name" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The name of the CBH instance"),
                        constraint: AttributeConstraint::Required,
                        ..Default::default()
                    },
                    "flavor_id" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The product ID of the CBH server"),
                        constraint: AttributeConstraint::Required,
                        ..Default::default()
                    },
                    "vpc_id" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The ID of a VPC"),
                        constraint: AttributeConstraint::Required,
                        ..Default::default()
                    },
                    "subnet_id" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The ID of a subnet"),
                        constraint: AttributeConstraint::Required,
                        ..Default::default()
                    },
                    "security_group_id" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The ID of the security group"),
                        constraint: AttributeConstraint::Required,
                        ..Default::default()
                    },
                    "availability_zone" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The availability zone name"),
                        constraint: AttributeConstraint::Required,
                        ..Default::default()
                    },
                    "password" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The password for logging in to the management console"),
                        constraint: AttributeConstraint::Required,
                        sensitive: true,
                        ..Default::default()
                    },
                    "subnet_address" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The IP address of the subnet"),
                        constraint: AttributeConstraint::OptionalComputed,
                        ..Default::default()
                    },
                    "public_ip_id" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The ID of the elastic IP to bind"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "public_ip" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The elastic IP address"),
                        constraint: AttributeConstraint::Computed,
                        ..Default::default()
                    },
                    "ipv6_enable" => Attribute {
                        attr_type: AttributeType::Bool,
                        description: Description::plain("Whether the IPv6 network is enabled"),
                        constraint: AttributeConstraint::OptionalComputed,
                        ..Default::default()
                    },
                    "tags" => Attribute {
                        attr_type: AttributeType::Map(AttributeType::String.into()),
                        description: Description::plain("The key/value pairs to associate with the instance"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "private_ip" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The private IP of the instance"),
                        constraint: AttributeConstraint::Computed,
                        ..Default::default()
                    },
                    "status" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The status of the instance"),
                        constraint: AttributeConstraint::Computed,
                        ..Default::default()
                    },
                    "version" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The current version of the instance image"),
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
            if let Some(password) = config.password.as_ref_option() {
                if password.len() < 8 {
                    diags.error(
                        "Invalid password",
                        "The console password must be at least 8 characters long",
                        AttributePath::new("password"),
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

        match client.cbh(region.as_deref()).get_instance(&id).await {
            Ok(Some(info)) => {
                let new_state = flatten_instance(&state, &info);
                Some((Value::Value(new_state), private_state))
            }
            Ok(None) => Some((Value::Null, private_state)),
            Err(e) if e.is_not_found() => Some((Value::Null, private_state)),
            Err(e) => {
                diags.root_error("Failed to read CBH instance", e.to_string());
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
        state.private_ip = Value::Unknown;
        state.public_ip = Value::Unknown;
        state.version = Value::Unknown;
        if state.region.is_null() {
            state.region = Value::Unknown;
        }
        if state.subnet_address.is_null() {
            state.subnet_address = Value::Unknown;
        }
        if state.ipv6_enable.is_null() {
            state.ipv6_enable = Value::Unknown;
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
        force_new(&mut triggers, "name", &prior.name, &proposed.name);
        force_new(&mut triggers, "flavor_id", &prior.flavor_id, &proposed.flavor_id);
        force_new(&mut triggers, "vpc_id", &prior.vpc_id, &proposed.vpc_id);
        force_new(&mut triggers, "subnet_id", &prior.subnet_id, &proposed.subnet_id);
        force_new(
            &mut triggers,
            "security_group_id",
            &prior.security_group_id,
            &proposed.security_group_id,
        );
        force_new(
            &mut triggers,
            "availability_zone",
            &prior.availability_zone,
            &proposed.availability_zone,
        );
        force_new(
            &mut triggers,
            "ipv6_enable",
            &prior.ipv6_enable,
            &proposed.ipv6_enable,
        );

        if proposed.public_ip_id != prior.public_ip_id {
            proposed.public_ip = Value::Unknown;
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

        let request = CreateInstanceRequest {
            server: CreateInstanceBody {
                flavor_ref: state.flavor_id.as_str().to_string(),
                instance_name: state.name.as_str().to_string(),
                vpc_id: state.vpc_id.as_str().to_string(),
                nics: vec![Nic {
                    subnet_id: state.subnet_id.as_str().to_string(),
                    ip_address: opt_string(&state.subnet_address),
                }],
                public_ip: opt_string(&state.public_ip_id).map(|id| PublicIp { id: Some(id) }),
                security_groups: vec![SecurityGroupRef {
                    id: state.security_group_id.as_str().to_string(),
                }],
                availability_zone: state.availability_zone.as_str().to_string(),
                region: region.clone(),
                hx_password: state.password.as_str().to_string(),
                bastion_type: "OEM".to_string(),
                ipv6_enable: state.ipv6_enable.as_ref_option().copied(),
                tags: expand_tags(&state.tags),
            },
        };

        let api = client.cbh(Some(&region));
        let server_id = match api.create_instance(&request).await {
            Ok(response) => response.server_id,
            Err(e) => {
                diags.root_error("Failed to create CBH instance", e.to_string());
                return None;
            }
        };

        let wait = StateWait {
            pending: &["BUILD"],
            target: &["ACTIVE"],
            delay: Duration::from_secs(10),
            interval: Duration::from_secs(10),
            timeout: CREATE_TIMEOUT,
        };
        let wait_result = wait_for_state(wait, || {
            let api = client.cbh(Some(&region));
            let server_id = server_id.clone();
            async move {
                Ok(api
                    .get_instance(&server_id)
                    .await?
                    .map(|info| info.status)
                    .unwrap_or_else(|| STATE_DELETED.to_string()))
            }
        })
        .await;
        if let Err(e) = wait_result {
            diags.root_error(
                "Error waiting for CBH instance to become active",
                e.to_string(),
            );
            return None;
        }

        let mut new_state = state.clone();
        new_state.region = set_string(region.clone());
        new_state.id = set_string(server_id.clone());
        match api.get_instance(&server_id).await {
            Ok(Some(info)) => new_state = flatten_instance(&new_state, &info),
            Ok(None) => {
                diags.root_error_short("CBH instance disappeared after creation");
                return None;
            }
            Err(e) => {
                diags.root_error("Failed to read CBH instance after creation", e.to_string());
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
        let api = client.cbh(region.as_deref());

        let Some(server_id) = opt_string(&prior.id) else {
            diags.root_error_short("CBH instance id is missing from state");
            return None;
        };

        if planned.password != prior.password {
            let request = ChangePasswordRequest {
                server_id: server_id.clone(),
                new_password: planned.password.as_str().to_string(),
            };
            if let Err(e) = api.change_password(&request).await {
                diags.root_error("Failed to update CBH instance password", e.to_string());
                return None;
            }
        }

        if planned.public_ip_id != prior.public_ip_id {
            if let Some(old_eip) = opt_string(&prior.public_ip_id) {
                let request = EipRequest {
                    publicip_id: old_eip,
                };
                if let Err(e) = api.unbind_eip(&server_id, &request).await {
                    diags.root_error("Failed to unbind EIP from CBH instance", e.to_string());
                    return None;
                }
            }
            if let Some(new_eip) = opt_string(&planned.public_ip_id) {
                let request = EipRequest {
                    publicip_id: new_eip,
                };
                if let Err(e) = api.bind_eip(&server_id, &request).await {
                    diags.root_error("Failed to bind EIP to CBH instance", e.to_string());
                    return None;
                }
            }
        }

        let mut new_state = planned.clone();
        new_state.id = set_string(server_id.clone());
        match api.get_instance(&server_id).await {
            Ok(Some(info)) => new_state = flatten_instance(&new_state, &info),
            Ok(None) => {
                diags.root_error_short("CBH instance no longer exists");
                return None;
            }
            Err(e) => {
                diags.root_error("Failed to read CBH instance after update", e.to_string());
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

        let Some(server_id) = opt_string(&state.id) else {
            return Some(());
        };

        match client.cbh(region.as_deref()).delete_instance(&server_id).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => return Some(()),
            Err(e) => {
                diags.root_error("Failed to delete CBH instance", e.to_string());
                return None;
            }
        }

        let wait = StateWait {
            pending: &["ACTIVE", "SHUTOFF", "DELETING"],
            target: &[STATE_DELETED],
            delay: Duration::from_secs(10),
            interval: Duration::from_secs(10),
            timeout: DELETE_TIMEOUT,
        };
        let wait_result = wait_for_state(wait, || {
            let api = client.cbh(region.as_deref());
            let server_id = server_id.clone();
            async move {
                Ok(api
                    .get_instance(&server_id)
                    .await?
                    .map(|info| info.status)
                    .unwrap_or_else(|| STATE_DELETED.to_string()))
            }
        })
        .await;
        if let Err(e) = wait_result {
            diags.root_error("Error waiting for CBH instance deletion", e.to_string());
            return None;
        }

        Some(())
    }

    async fn import<'a>(
        &self,
        _diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let state = CbhInstanceState {
            id: set_string(id),
            ..Default::default()
        };
        Some((Value::Value(state), Default::default()))
    }
}
