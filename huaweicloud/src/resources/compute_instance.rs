//! ECS compute instance resource

use std::borrow::Cow;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use tf_provider::schema::{
    Attribute, AttributeConstraint, AttributeType, Block, Description, Schema,
};
use tf_provider::value::{Value, ValueBool, ValueEmpty, ValueList, ValueMap, ValueNumber, ValueString};
use tf_provider::{map, AttributePath, Diagnostics, Resource};

use crate::api::common::path_search_string;
use crate::api::ecs::{
    CreateServerBody, CreateServerRequest, DeleteServersRequest, IdOnly, IdRef, ResizeServerBody,
    ResizeServerRequest, RootVolume, ServerDetail, ServerNic, UpdateServerBody,
    UpdateServerRequest, SERVER_STATUS_ACTIVE, SERVER_STATUS_BUILD,
};
use crate::api::poll::{wait_for_state, StateWait};
use crate::provider_data::SharedProviderData;
use crate::utils::{
    expand_tags, expect_state, force_new, keep_or_null, opt_string, provider_client,
    set_opt_string, set_string,
};

const CREATE_TIMEOUT: Duration = Duration::from_secs(30 * 60);
const UPDATE_TIMEOUT: Duration = Duration::from_secs(30 * 60);
const DELETE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

const DEFAULT_SYSTEM_DISK_TYPE: &str = "GPSSD";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ComputeInstanceState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    pub region: ValueString<'a>,
    pub name: ValueString<'a>,
    pub image_id: ValueString<'a>,
    pub flavor_id: ValueString<'a>,
    pub availability_zone: ValueString<'a>,
    pub admin_pass: ValueString<'a>,
    pub key_pair: ValueString<'a>,
    pub vpc_id: ValueString<'a>,
    pub network: ValueList<Value<NetworkState<'a>>>,
    pub security_group_ids: ValueList<ValueString<'a>>,
    pub system_disk_type: ValueString<'a>,
    pub system_disk_size: ValueNumber,
    pub user_data: ValueString<'a>,
    pub tags: ValueMap<'a, ValueString<'a>>,
    pub delete_disks_on_termination: ValueBool,
    pub status: ValueString<'a>,
    pub access_ip_v4: ValueString<'a>,
    pub system_disk_id: ValueString<'a>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NetworkState<'a> {
    #[serde(borrow = "'a")]
    pub uuid: ValueString<'a>,
    pub fixed_ip_v4: ValueString<'a>,
}

pub struct ComputeInstanceResource {
    data: SharedProviderData,
}

impl ComputeInstanceResource {
    pub fn new(data: SharedProviderData) -> Self {
        Self { data }
    }
}

/// ECS reports instance tags as `key=value` strings.
fn parse_server_tags<'a>(tags: &[String]) -> ValueMap<'a, ValueString<'a>> {
    Value::Value(
        tags.iter()
            .map(|tag| match tag.split_once('=') {
                Some((key, value)) => (
                    Cow::Owned(key.to_string()),
                    Value::Value(Cow::Owned(value.to_string())),
                ),
                None => (Cow::Owned(tag.clone()), Value::Value(Cow::from(""))),
            })
            .collect(),
    )
}

fn flatten_server<'a>(
    state: &ComputeInstanceState<'a>,
    server: &ServerDetail,
) -> ComputeInstanceState<'a> {
    let mut new_state = state.clone();
    new_state.id = set_string(server.id.clone());
    new_state.name = set_string(server.name.clone());
    new_state.status = set_opt_string(server.status.clone());
    if let Some(flavor) = &server.flavor {
        new_state.flavor_id = set_string(flavor.id.clone());
    }
    if let Some(image) = &server.image {
        new_state.image_id = set_string(image.id.clone());
    }
    new_state.availability_zone = match &server.availability_zone {
        Some(zone) => set_string(zone.clone()),
        None => keep_or_null(&state.availability_zone),
    };
    new_state.key_pair = match &server.key_name {
        Some(key_name) => set_string(key_name.clone()),
        None => keep_or_null(&state.key_pair),
    };

    let fixed_ip = server
        .addresses
        .values()
        .flatten()
        .find(|address| address.addr_type.as_deref() == Some("fixed"))
        .or_else(|| server.addresses.values().flatten().next());
    new_state.access_ip_v4 = set_opt_string(fixed_ip.map(|address| address.addr.clone()));

    let boot_volume = server
        .volumes_attached
        .iter()
        .find(|volume| volume.boot_index == Some(0))
        .or_else(|| server.volumes_attached.first());
    new_state.system_disk_id = set_opt_string(boot_volume.map(|volume| volume.id.clone()));

    if !server.security_groups.is_empty() {
        let ids: Vec<ValueString<'a>> = server
            .security_groups
            .iter()
            .filter_map(|group| group.id.clone())
            .map(set_string)
            .collect();
        if !ids.is_empty() {
            new_state.security_group_ids = Value::Value(ids);
        }
    }
    if server.tags.is_empty() {
        new_state.tags = keep_or_null(&state.tags);
    } else {
        new_state.tags = parse_server_tags(&server.tags);
    }

    // fill in computed fixed ips on the declared networks
    if let Value::Value(networks) = &mut new_state.network {
        for network in networks.iter_mut().flatten() {
            if network.fixed_ip_v4.is_unknown() {
                network.fixed_ip_v4 = new_state.access_ip_v4.clone();
            }
        }
    }

    new_state.admin_pass = keep_or_null(&state.admin_pass);
    new_state.user_data = keep_or_null(&state.user_data);
    new_state.system_disk_type = keep_or_null(&state.system_disk_type);
    new_state.system_disk_size = keep_or_null(&state.system_disk_size);
    new_state.security_group_ids = keep_or_null(&new_state.security_group_ids);
    new_state.delete_disks_on_termination = keep_or_null(&state.delete_disks_on_termination);
    new_state
}

#[async_trait]
impl Resource for ComputeInstanceResource {
    type State<'a> = Value<ComputeInstanceState<'a>>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(Schema {
            version: 1,
            block: Block {
                version: 1,
                description: Description::plain("Manages an ECS compute instance"),
                attributes: map! {
                    "id" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The ID of the instance"),
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
                        description: Description::plain("The name of the instance"),
                        constraint: AttributeConstraint::Required,
                        ..Default::default()
                    },
                    "image_id" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The ID of the image used to boot the instance"),
                        constraint: AttributeConstraint::Required,
                        ..Default::default()
                    },
                    "flavor_id" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The flavor of the instance"),
                        constraint: AttributeConstraint::Required,
                        ..Default::default()
                    },
                    "availability_zone" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The availability zone of the instance"),
                        constraint: AttributeConstraint::OptionalComputed,
                        ..Default::default()
                    },
                    "admin_pass" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The administrator password of the instance"),
                        constraint: AttributeConstraint::Optional,
                        sensitive: true,
                        ..Default::default()
                    },
                    "key_pair" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The SSH key pair name used to log in"),
                        constraint: AttributeConstraint::OptionalComputed,
                        ..Default::default()
                    },
                    "vpc_id" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The ID of the VPC the instance belongs to"),
                        constraint: AttributeConstraint::Required,
                        ..Default::default()
                    },
                    "network" => Attribute {
                        attr_type: AttributeType::AttributeList(map! {
                            "uuid" => Attribute {
                                attr_type: AttributeType::String,
                                description: Description::plain("The network ID of the subnet to attach"),
                                constraint: AttributeConstraint::Required,
                                ..Default::default()
                            },
                            "fixed_ip_v4" => Attribute {
                                attr_type: AttributeType::String,
                                description: Description::plain("The fixed IPv4 address on this network"),
                                constraint: AttributeConstraint::OptionalComputed,
                                ..Default::default()
                            },
                        }),
                        description: Description::plain("The networks to attach the instance to"),
                        constraint: AttributeConstraint::Required,
                        ..Default::default()
                    },
                    "security_group_ids" => Attribute {
                        attr_type: AttributeType::List(AttributeType::String.into()),
                        description: Description::plain("The IDs of the security groups applied to the instance"),
                        constraint: AttributeConstraint::OptionalComputed,
                        ..Default::default()
                    },
                    "system_disk_type" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The volume type of the system disk"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "system_disk_size" => Attribute {
                        attr_type: AttributeType::Number,
                        description: Description::plain("The size of the system disk in GB"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "user_data" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The user data injected on boot"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "tags" => Attribute {
                        attr_type: AttributeType::Map(AttributeType::String.into()),
                        description: Description::plain("The key/value pairs to associate with the instance"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "delete_disks_on_termination" => Attribute {
                        attr_type: AttributeType::Bool,
                        description: Description::plain("Whether to delete data disks when destroying the instance"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "status" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The status of the instance"),
                        constraint: AttributeConstraint::Computed,
                        ..Default::default()
                    },
                    "access_ip_v4" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The primary fixed IPv4 address of the instance"),
                        constraint: AttributeConstraint::Computed,
                        ..Default::default()
                    },
                    "system_disk_id" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The ID of the system disk volume"),
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
            if let Value::Value(networks) = &config.network {
                if networks.is_empty() {
                    diags.error(
                        "Missing network",
                        "at least one `network` block is required",
                        AttributePath::new("network"),
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

        match client.ecs(region.as_deref()).get_server(&id).await {
            Ok(server) => {
                // servers linger in DELETED state for a while after removal
                if server.status.as_deref() == Some("DELETED") {
                    return Some((Value::Null, private_state));
                }
                Some((Value::Value(flatten_server(&state, &server)), private_state))
            }
            Err(e) if e.is_not_found() => Some((Value::Null, private_state)),
            Err(e) => {
                diags.root_error("Failed to read compute instance", e.to_string());
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
        state.access_ip_v4 = Value::Unknown;
        state.system_disk_id = Value::Unknown;
        if state.region.is_null() {
            state.region = Value::Unknown;
        }
        if state.availability_zone.is_null() {
            state.availability_zone = Value::Unknown;
        }
        if state.key_pair.is_null() {
            state.key_pair = Value::Unknown;
        }
        if state.security_group_ids.is_null() {
            state.security_group_ids = Value::Unknown;
        }
        if let Value::Value(networks) = &mut state.network {
            for network in networks.iter_mut().flatten() {
                if network.fixed_ip_v4.is_null() {
                    network.fixed_ip_v4 = Value::Unknown;
                }
            }
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
        force_new(&mut triggers, "image_id", &prior.image_id, &proposed.image_id);
        force_new(
            &mut triggers,
            "availability_zone",
            &prior.availability_zone,
            &proposed.availability_zone,
        );
        force_new(&mut triggers, "admin_pass", &prior.admin_pass, &proposed.admin_pass);
        force_new(&mut triggers, "key_pair", &prior.key_pair, &proposed.key_pair);
        force_new(&mut triggers, "vpc_id", &prior.vpc_id, &proposed.vpc_id);
        force_new(&mut triggers, "network", &prior.network, &proposed.network);
        force_new(
            &mut triggers,
            "system_disk_type",
            &prior.system_disk_type,
            &proposed.system_disk_type,
        );
        force_new(&mut triggers, "user_data", &prior.user_data, &proposed.user_data);

        if proposed.flavor_id != prior.flavor_id {
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
        let api = client.ecs(Some(&region));

        let nics: Vec<ServerNic> = state
            .network
            .iter()
            .flatten()
            .flatten()
            .map(|network| ServerNic {
                subnet_id: network.uuid.as_str().to_string(),
                ip_address: opt_string(&network.fixed_ip_v4),
            })
            .collect();
        if nics.is_empty() {
            diags.root_error_short("at least one `network` block is required");
            return None;
        }

        let security_groups: Vec<IdRef> = state
            .security_group_ids
            .iter()
            .flatten()
            .flatten()
            .map(|id| IdRef { id: id.to_string() })
            .collect();

        let request = CreateServerRequest {
            server: CreateServerBody {
                name: state.name.as_str().to_string(),
                image_ref: state.image_id.as_str().to_string(),
                flavor_ref: state.flavor_id.as_str().to_string(),
                availability_zone: opt_string(&state.availability_zone),
                admin_pass: opt_string(&state.admin_pass),
                key_name: opt_string(&state.key_pair),
                vpcid: state.vpc_id.as_str().to_string(),
                nics,
                security_groups: if security_groups.is_empty() {
                    None
                } else {
                    Some(security_groups)
                },
                root_volume: RootVolume {
                    volumetype: opt_string(&state.system_disk_type)
                        .unwrap_or_else(|| DEFAULT_SYSTEM_DISK_TYPE.to_string()),
                    size: state.system_disk_size.as_ref_option().copied(),
                },
                user_data: opt_string(&state.user_data),
                server_tags: expand_tags(&state.tags),
            },
        };

        let job_id = match api.create_server(&request).await {
            Ok(response) => response.job_id,
            Err(e) => {
                diags.root_error("Failed to create compute instance", e.to_string());
                return None;
            }
        };

        let entities = match api.wait_for_job(&job_id, CREATE_TIMEOUT).await {
            Ok(entities) => entities,
            Err(e) => {
                diags.root_error("Error waiting for compute instance creation", e.to_string());
                return None;
            }
        };
        let Some(server_id) = path_search_string(&entities, "sub_jobs.0.entities.server_id")
        else {
            diags.root_error_short("server_id not found in job entities");
            return None;
        };

        let wait = StateWait {
            pending: &[SERVER_STATUS_BUILD],
            target: &[SERVER_STATUS_ACTIVE],
            delay: Duration::from_secs(5),
            interval: Duration::from_secs(10),
            timeout: CREATE_TIMEOUT,
        };
        let wait_result = wait_for_state(wait, || {
            let api = client.ecs(Some(&region));
            let server_id = server_id.clone();
            async move {
                let server = api.get_server(&server_id).await?;
                Ok(server
                    .status
                    .unwrap_or_else(|| SERVER_STATUS_BUILD.to_string()))
            }
        })
        .await;
        if let Err(e) = wait_result {
            diags.root_error(
                "Error waiting for compute instance to become active",
                e.to_string(),
            );
            return None;
        }

        let mut new_state = state.clone();
        new_state.region = set_string(region);
        new_state.id = set_string(server_id.clone());
        match api.get_server(&server_id).await {
            Ok(server) => new_state = flatten_server(&new_state, &server),
            Err(e) => {
                diags.root_error(
                    "Failed to read compute instance after creation",
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
        let api = client.ecs(region.as_deref());

        let Some(server_id) = opt_string(&prior.id) else {
            diags.root_error_short("compute instance id is missing from state");
            return None;
        };

        if planned.name != prior.name {
            let request = UpdateServerRequest {
                server: UpdateServerBody {
                    name: planned.name.as_str().to_string(),
                },
            };
            if let Err(e) = api.update_server(&server_id, &request).await {
                diags.root_error("Failed to rename compute instance", e.to_string());
                return None;
            }
        }

        if planned.flavor_id != prior.flavor_id {
            let request = ResizeServerRequest {
                resize: ResizeServerBody {
                    flavor_ref: planned.flavor_id.as_str().to_string(),
                },
            };
            let job_id = match api.resize_server(&server_id, &request).await {
                Ok(response) => response.job_id,
                Err(e) => {
                    diags.root_error("Failed to resize compute instance", e.to_string());
                    return None;
                }
            };
            if let Err(e) = api.wait_for_job(&job_id, UPDATE_TIMEOUT).await {
                diags.root_error("Error waiting for compute instance resize", e.to_string());
                return None;
            }
        }

        let mut new_state = planned.clone();
        new_state.id = set_string(server_id.clone());
        match api.get_server(&server_id).await {
            Ok(server) => new_state = flatten_server(&new_state, &server),
            Err(e) => {
                diags.root_error("Failed to read compute instance after update", e.to_string());
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
        let api = client.ecs(region.as_deref());

        let Some(server_id) = opt_string(&state.id) else {
            return Some(());
        };

        let request = DeleteServersRequest {
            servers: vec![IdOnly {
                id: server_id.clone(),
            }],
            delete_volume: state.delete_disks_on_termination.unwrap_or(true),
        };

        let job_id = match api.delete_servers(&request).await {
            Ok(response) => response.job_id,
            Err(e) if e.is_not_found() => return Some(()),
            Err(e) => {
                diags.root_error("Failed to delete compute instance", e.to_string());
                return None;
            }
        };

        if let Err(e) = api.wait_for_job(&job_id, DELETE_TIMEOUT).await {
            diags.root_error("Error waiting for compute instance deletion", e.to_string());
            return None;
        }

        Some(())
    }

    async fn import<'a>(
        &self,
        _diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let state = ComputeInstanceState {
            id: set_string(id),
            ..Default::default()
        };
        Some((Value::Value(state), Default::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_tags_parse_into_a_map() {
        let tags = vec!["env=prod".to_string(), "standalone".to_string()];
        let map = parse_server_tags(&tags);
        let map = map.as_ref_option().unwrap();
        assert_eq!(map.get("env").unwrap().as_str(), "prod");
        assert_eq!(map.get("standalone").unwrap().as_str(), "");
    }
}
