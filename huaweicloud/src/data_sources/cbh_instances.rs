//! CBH instances data source

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use tf_provider::schema::{
    Attribute, AttributeConstraint, AttributeType, Block, Description, Schema,
};
use tf_provider::value::{Value, ValueEmpty, ValueList, ValueString};
use tf_provider::{map, DataSource, Diagnostics};

use crate::api::cbh::InstanceInfo;
use crate::provider_data::SharedProviderData;
use crate::utils::{opt_string, provider_client, set_opt_string, set_string};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CbhInstancesState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    pub region: ValueString<'a>,
    pub name: ValueString<'a>,
    pub vpc_id: ValueString<'a>,
    pub subnet_id: ValueString<'a>,
    pub instances: ValueList<Value<CbhInstanceEntry<'a>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CbhInstanceEntry<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    pub name: ValueString<'a>,
    pub status: ValueString<'a>,
    pub private_ip: ValueString<'a>,
    pub public_ip: ValueString<'a>,
    pub flavor_id: ValueString<'a>,
    pub availability_zone: ValueString<'a>,
    pub version: ValueString<'a>,
}

pub struct CbhInstancesDataSource {
    data: SharedProviderData,
}

impl CbhInstancesDataSource {
    pub fn new(data: SharedProviderData) -> Self {
        Self { data }
    }
}

fn matches_filter(instance: &InstanceInfo, filter: &CbhInstancesState<'_>) -> bool {
    if let Some(name) = filter.name.as_ref_option() {
        if instance.name != name.as_ref() {
            return false;
        }
    }
    if let Some(vpc_id) = filter.vpc_id.as_ref_option() {
        if instance.vpc_id.as_deref() != Some(vpc_id.as_ref()) {
            return false;
        }
    }
    if let Some(subnet_id) = filter.subnet_id.as_ref_option() {
        if instance.subnet_id.as_deref() != Some(subnet_id.as_ref()) {
            return false;
        }
    }
    true
}

fn flatten_entry<'a>(instance: &InstanceInfo) -> Value<CbhInstanceEntry<'a>> {
    Value::Value(CbhInstanceEntry {
        id: set_string(instance.server_id.clone()),
        name: set_string(instance.name.clone()),
        status: set_string(instance.status.clone()),
        private_ip: set_opt_string(instance.private_ip.clone()),
        public_ip: set_opt_string(instance.public_ip.clone()),
        flavor_id: set_opt_string(instance.flavor_id.clone()),
        availability_zone: set_opt_string(instance.availability_zone.clone()),
        version: set_opt_string(instance.version.clone()),
    })
}

#[async_trait]
impl DataSource for CbhInstancesDataSource {
    type State<'a> = CbhInstancesState<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(Schema {
            version: 1,
            block: Block {
                version: 1,
                description: Description::plain("Queries CBH instances"),
                attributes: map! {
                    "id" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The data source ID"),
                        constraint: AttributeConstraint::Computed,
                        ..Default::default()
                    },
                    "region" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The region in which to query instances"),
                        constraint: AttributeConstraint::OptionalComputed,
                        ..Default::default()
                    },
                    "name" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("Filter by instance name"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "vpc_id" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("Filter by VPC ID"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "subnet_id" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("Filter by subnet ID"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "instances" => Attribute {
                        attr_type: AttributeType::AttributeList(map! {
                            "id" => Attribute {
                                attr_type: AttributeType::String,
                                description: Description::plain("The server ID of the instance"),
                                constraint: AttributeConstraint::Computed,
                                ..Default::default()
                            },
                            "name" => Attribute {
                                attr_type: AttributeType::String,
                                description: Description::plain("The name of the instance"),
                                constraint: AttributeConstraint::Computed,
                                ..Default::default()
                            },
                            "status" => Attribute {
                                attr_type: AttributeType::String,
                                description: Description::plain("The status of the instance"),
                                constraint: AttributeConstraint::Computed,
                                ..Default::default()
                            },
                            "private_ip" => Attribute {
                                attr_type: AttributeType::String,
                                description: Description::plain("The private IP of the instance"),
                                constraint: AttributeConstraint::Computed,
                                ..Default::default()
                            },
                            "public_ip" => Attribute {
                                attr_type: AttributeType::String,
                                description: Description::plain("The elastic IP of the instance"),
                                constraint: AttributeConstraint::Computed,
                                ..Default::default()
                            },
                            "flavor_id" => Attribute {
                                attr_type: AttributeType::String,
                                description: Description::plain("The flavor of the instance"),
                                constraint: AttributeConstraint::Computed,
                                ..Default::default()
                            },
                            "availability_zone" => Attribute {
                                attr_type: AttributeType::String,
                                description: Description::plain("The availability zone of the instance"),
                                constraint: AttributeConstraint::Computed,
                                ..Default::default()
                            },
                            "version" => Attribute {
                                attr_type: AttributeType::String,
                                description: Description::plain("The image version of the instance"),
                                constraint: AttributeConstraint::Computed,
                                ..Default::default()
                            },
                        }),
                        description: Description::plain("The matched CBH instances"),
                        constraint: AttributeConstraint::Computed,
                        ..Default::default()
                    },
                },
                ..Default::default()
            },
        })
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        config: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::State<'a>> {
        let client = provider_client(diags, &self.data)?;
        let region = opt_string(&config.region);

        let instances = match client.cbh(region.as_deref()).list_instances().await {
            Ok(instances) => instances,
            Err(e) => {
                diags.root_error("Failed to list CBH instances", e.to_string());
                return None;
            }
        };

        let mut state = config.clone();
        state.id = set_string("cbh_instances".to_string());
        state.region =
            set_string(region.unwrap_or_else(|| client.region().to_string()));
        state.instances = Value::Value(
            instances
                .iter()
                .filter(|instance| matches_filter(instance, &config))
                .map(flatten_entry)
                .collect(),
        );

        Some(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(name: &str, vpc: &str) -> InstanceInfo {
        serde_json::from_value(serde_json::json!({
            "server_id": format!("sid-{}", name),
            "name": name,
            "status": "ACTIVE",
            "vpc_id": vpc,
        }))
        .unwrap()
    }

    #[test]
    fn filters_match_on_name_and_vpc() {
        let a = instance("one", "vpc-1");
        let b = instance("two", "vpc-2");

        let filter = CbhInstancesState {
            name: Value::Value("one".into()),
            ..Default::default()
        };
        assert!(matches_filter(&a, &filter));
        assert!(!matches_filter(&b, &filter));

        let filter = CbhInstancesState {
            vpc_id: Value::Value("vpc-2".into()),
            ..Default::default()
        };
        assert!(!matches_filter(&a, &filter));
        assert!(matches_filter(&b, &filter));

        let open = CbhInstancesState::default();
        assert!(matches_filter(&a, &open));
        assert!(matches_filter(&b, &open));
    }
}
