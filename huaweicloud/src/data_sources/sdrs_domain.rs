//! SDRS active-active domain data source

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use tf_provider::schema::{
    Attribute, AttributeConstraint, AttributeType, Block, Description, Schema,
};
use tf_provider::value::{ValueEmpty, ValueString};
use tf_provider::{map, DataSource, Diagnostics};

use crate::provider_data::SharedProviderData;
use crate::utils::{opt_string, provider_client, set_opt_string, set_string};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SdrsDomainState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    pub region: ValueString<'a>,
    pub name: ValueString<'a>,
    pub description: ValueString<'a>,
}

pub struct SdrsDomainDataSource {
    data: SharedProviderData,
}

impl SdrsDomainDataSource {
    pub fn new(data: SharedProviderData) -> Self {
        Self { data }
    }
}

#[async_trait]
impl DataSource for SdrsDomainDataSource {
    type State<'a> = SdrsDomainState<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(Schema {
            version: 1,
            block: Block {
                version: 1,
                description: Description::plain("Queries the SDRS active-active replication domain"),
                attributes: map! {
                    "id" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The ID of the domain"),
                        constraint: AttributeConstraint::Computed,
                        ..Default::default()
                    },
                    "region" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The region in which to query the domain"),
                        constraint: AttributeConstraint::OptionalComputed,
                        ..Default::default()
                    },
                    "name" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("Filter by domain name"),
                        constraint: AttributeConstraint::OptionalComputed,
                        ..Default::default()
                    },
                    "description" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The description of the domain"),
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

        let domains = match client.sdrs(region.as_deref()).list_active_domains().await {
            Ok(domains) => domains,
            Err(e) => {
                diags.root_error("Failed to list SDRS domains", e.to_string());
                return None;
            }
        };

        let name_filter = opt_string(&config.name);
        let Some(domain) = domains
            .iter()
            .find(|domain| match &name_filter {
                Some(name) => &domain.name == name,
                None => true,
            })
        else {
            diags.root_error_short("No matching SDRS replication domain found");
            return None;
        };

        let mut state = config.clone();
        state.id = set_string(domain.id.clone());
        state.region = set_string(region.unwrap_or_else(|| client.region().to_string()));
        state.name = set_string(domain.name.clone());
        state.description = set_opt_string(domain.description.clone());

        Some(state)
    }
}
