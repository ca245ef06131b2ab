//! SMS source servers data source

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use tf_provider::schema::{
    Attribute, AttributeConstraint, AttributeType, Block, Description, Schema,
};
use tf_provider::value::{Value, ValueBool, ValueEmpty, ValueList, ValueString};
use tf_provider::{map, DataSource, Diagnostics};

use crate::api::sms::{SourceServer, SourceServerFilter};
use crate::provider_data::SharedProviderData;
use crate::utils::{opt_string, provider_client, set_opt_string, set_string};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SmsSourceServersState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    pub server_id: ValueString<'a>,
    pub name: ValueString<'a>,
    pub ip: ValueString<'a>,
    pub state: ValueString<'a>,
    pub servers: ValueList<Value<SourceServerEntry<'a>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SourceServerEntry<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    pub name: ValueString<'a>,
    pub ip: ValueString<'a>,
    pub hostname: ValueString<'a>,
    pub os_type: ValueString<'a>,
    pub os_version: ValueString<'a>,
    pub state: ValueString<'a>,
    pub connected: ValueBool,
    pub agent_version: ValueString<'a>,
    pub enterprise_project_id: ValueString<'a>,
}

pub struct SmsSourceServersDataSource {
    data: SharedProviderData,
}

impl SmsSourceServersDataSource {
    pub fn new(data: SharedProviderData) -> Self {
        Self { data }
    }
}

fn flatten_server<'a>(server: &SourceServer) -> Value<SourceServerEntry<'a>> {
    Value::Value(SourceServerEntry {
        id: set_string(server.id.clone()),
        name: set_opt_string(server.name.clone()),
        ip: set_opt_string(server.ip.clone()),
        hostname: set_opt_string(server.hostname.clone()),
        os_type: set_opt_string(server.os_type.clone()),
        os_version: set_opt_string(server.os_version.clone()),
        state: set_opt_string(server.state.clone()),
        connected: match server.connected {
            Some(connected) => Value::Value(connected),
            None => Value::Null,
        },
        agent_version: set_opt_string(server.agent_version.clone()),
        enterprise_project_id: set_opt_string(server.enterprise_project_id.clone()),
    })
}

#[async_trait]
impl DataSource for SmsSourceServersDataSource {
    type State<'a> = SmsSourceServersState<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(Schema {
            version: 1,
            block: Block {
                version: 1,
                description: Description::plain("Queries servers registered with SMS"),
                attributes: map! {
                    "id" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The data source ID"),
                        constraint: AttributeConstraint::Computed,
                        ..Default::default()
                    },
                    "server_id" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("Filter by source server ID"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "name" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("Filter by source server name"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "ip" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("Filter by source server IP address"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "state" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("Filter by migration state"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "servers" => Attribute {
                        attr_type: AttributeType::AttributeList(map! {
                            "id" => Attribute {
                                attr_type: AttributeType::String,
                                description: Description::plain("The ID of the source server"),
                                constraint: AttributeConstraint::Computed,
                                ..Default::default()
                            },
                            "name" => Attribute {
                                attr_type: AttributeType::String,
                                description: Description::plain("The name of the source server"),
                                constraint: AttributeConstraint::Computed,
                                ..Default::default()
                            },
                            "ip" => Attribute {
                                attr_type: AttributeType::String,
                                description: Description::plain("The IP address of the source server"),
                                constraint: AttributeConstraint::Computed,
                                ..Default::default()
                            },
                            "hostname" => Attribute {
                                attr_type: AttributeType::String,
                                description: Description::plain("The hostname of the source server"),
                                constraint: AttributeConstraint::Computed,
                                ..Default::default()
                            },
                            "os_type" => Attribute {
                                attr_type: AttributeType::String,
                                description: Description::plain("The OS type of the source server"),
                                constraint: AttributeConstraint::Computed,
                                ..Default::default()
                            },
                            "os_version" => Attribute {
                                attr_type: AttributeType::String,
                                description: Description::plain("The OS version of the source server"),
                                constraint: AttributeConstraint::Computed,
                                ..Default::default()
                            },
                            "state" => Attribute {
                                attr_type: AttributeType::String,
                                description: Description::plain("The migration state of the source server"),
                                constraint: AttributeConstraint::Computed,
                                ..Default::default()
                            },
                            "connected" => Attribute {
                                attr_type: AttributeType::Bool,
                                description: Description::plain("Whether the agent is connected"),
                                constraint: AttributeConstraint::Computed,
                                ..Default::default()
                            },
                            "agent_version" => Attribute {
                                attr_type: AttributeType::String,
                                description: Description::plain("The version of the migration agent"),
                                constraint: AttributeConstraint::Computed,
                                ..Default::default()
                            },
                            "enterprise_project_id" => Attribute {
                                attr_type: AttributeType::String,
                                description: Description::plain("The enterprise project of the source server"),
                                constraint: AttributeConstraint::Computed,
                                ..Default::default()
                            },
                        }),
                        description: Description::plain("The matched source servers"),
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

        let filter = SourceServerFilter {
            id: opt_string(&config.server_id),
            name: opt_string(&config.name),
            ip: opt_string(&config.ip),
            state: opt_string(&config.state),
        };

        let response = match client.sms().list_source_servers(&filter).await {
            Ok(response) => response,
            Err(e) => {
                diags.root_error("Failed to list SMS source servers", e.to_string());
                return None;
            }
        };

        let mut state = config.clone();
        state.id = set_string("sms_source_servers".to_string());
        state.servers = Value::Value(response.source_servers.iter().map(flatten_server).collect());

        Some(state)
    }
}
