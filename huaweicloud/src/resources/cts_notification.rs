//! CTS key event notification resource

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use tf_provider::schema::{
    Attribute, AttributeConstraint, AttributeType, Block, Description, Schema,
};
use tf_provider::value::{Value, ValueBool, ValueEmpty, ValueList, ValueString};
use tf_provider::{map, AttributePath, Diagnostics, Resource};

use crate::api::cts::{Notification, NotificationFilter, NotificationOperation, NotificationRequest};
use crate::provider_data::SharedProviderData;
use crate::utils::{expect_state, force_new, keep_or_null, opt_string, provider_client, set_opt_string, set_string};

const OPERATION_TYPE_COMPLETE: &str = "complete";
const OPERATION_TYPE_CUSTOMIZED: &str = "customized";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CtsNotificationState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    pub region: ValueString<'a>,
    pub name: ValueString<'a>,
    pub operation_type: ValueString<'a>,
    pub smn_topic: ValueString<'a>,
    pub enabled: ValueBool,
    pub agency_name: ValueString<'a>,
    pub operations: ValueList<Value<OperationState<'a>>>,
    pub filter: Value<FilterState<'a>>,
    pub notification_id: ValueString<'a>,
    pub status: ValueString<'a>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct OperationState<'a> {
    #[serde(borrow = "'a")]
    pub service_type: ValueString<'a>,
    pub resource_type: ValueString<'a>,
    pub trace_names: ValueList<ValueString<'a>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FilterState<'a> {
    #[serde(borrow = "'a")]
    pub condition: ValueString<'a>,
    pub rule: ValueList<ValueString<'a>>,
}

pub struct CtsNotificationResource {
    data: SharedProviderData,
}

impl CtsNotificationResource {
    pub fn new(data: SharedProviderData) -> Self {
        Self { data }
    }
}

fn expand_operations(
    operations: &ValueList<Value<OperationState<'_>>>,
) -> Option<Vec<NotificationOperation>> {
    let list = operations.as_ref_option()?;
    if list.is_empty() {
        return None;
    }
    Some(
        list.iter()
            .flatten()
            .map(|operation| NotificationOperation {
                service_type: operation.service_type.as_str().to_string(),
                resource_type: operation.resource_type.as_str().to_string(),
                trace_names: operation
                    .trace_names
                    .iter()
                    .flatten()
                    .flatten()
                    .map(|name| name.to_string())
                    .collect(),
            })
            .collect(),
    )
}

fn expand_filter(filter: &Value<FilterState<'_>>) -> Option<NotificationFilter> {
    let filter = filter.as_ref_option()?;
    Some(NotificationFilter {
        condition: filter.condition.as_str().to_string(),
        rule: filter
            .rule
            .iter()
            .flatten()
            .flatten()
            .map(|rule| rule.to_string())
            .collect(),
    })
}

fn flatten_operations<'a>(
    operations: &[NotificationOperation],
) -> ValueList<Value<OperationState<'a>>> {
    Value::Value(
        operations
            .iter()
            .map(|operation| {
                Value::Value(OperationState {
                    service_type: set_string(operation.service_type.clone()),
                    resource_type: set_string(operation.resource_type.clone()),
                    trace_names: Value::Value(
                        operation
                            .trace_names
                            .iter()
                            .map(|name| set_string(name.clone()))
                            .collect(),
                    ),
                })
            })
            .collect(),
    )
}

fn flatten_notification<'a>(
    state: &CtsNotificationState<'a>,
    notification: &Notification,
) -> CtsNotificationState<'a> {
    let mut new_state = state.clone();
    new_state.id = set_string(notification.notification_id.clone());
    new_state.notification_id = set_string(notification.notification_id.clone());
    new_state.name = set_string(notification.notification_name.clone());
    new_state.status = set_opt_string(notification.status.clone());
    new_state.enabled = Value::Value(notification.status.as_deref() == Some("enabled"));
    if let Some(operation_type) = &notification.operation_type {
        new_state.operation_type = set_string(operation_type.clone());
    }
    new_state.smn_topic = match &notification.topic_id {
        Some(topic) => set_string(topic.clone()),
        None => keep_or_null(&state.smn_topic),
    };
    new_state.agency_name = match &notification.agency_name {
        Some(agency) => set_string(agency.clone()),
        None => keep_or_null(&state.agency_name),
    };
    if let Some(operations) = &notification.operations {
        new_state.operations = flatten_operations(operations);
    } else {
        new_state.operations = keep_or_null(&state.operations);
    }
    if let Some(filter) = &notification.filter {
        new_state.filter = Value::Value(FilterState {
            condition: set_string(filter.condition.clone()),
            rule: Value::Value(filter.rule.iter().cloned().map(set_string).collect()),
        });
    } else {
        new_state.filter = keep_or_null(&state.filter);
    }
    new_state
}

fn build_notification_request(
    state: &CtsNotificationState<'_>,
    notification_id: Option<String>,
) -> NotificationRequest {
    let status = notification_id.as_ref().map(|_| {
        if state.enabled.contains(&false) {
            "disabled".to_string()
        } else {
            "enabled".to_string()
        }
    });
    NotificationRequest {
        notification_name: state.name.as_str().to_string(),
        operation_type: state.operation_type.as_str().to_string(),
        operations: expand_operations(&state.operations),
        topic_id: opt_string(&state.smn_topic),
        filter: expand_filter(&state.filter),
        agency_name: opt_string(&state.agency_name),
        notification_id,
        status,
    }
}

#[async_trait]
impl Resource for CtsNotificationResource {
    type State<'a> = Value<CtsNotificationState<'a>>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(Schema {
            version: 1,
            block: Block {
                version: 1,
                description: Description::plain("Manages a CTS key event notification"),
                attributes: map! {
                    "id" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The ID of the notification"),
                        constraint: AttributeConstraint::Computed,
                        ..Default::default()
                    },
                    "region" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The region in which to create the notification"),
                        constraint: AttributeConstraint::OptionalComputed,
                        ..Default::default()
                    },
                    "name" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The name of the notification"),
                        constraint: AttributeConstraint::Required,
                        ..Default::default()
                    },
                    "operation_type" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The operation type, either `complete` or `customized`"),
                        constraint: AttributeConstraint::Required,
                        ..Default::default()
                    },
                    "smn_topic" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The URN of the SMN topic notified on key events"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "enabled" => Attribute {
                        attr_type: AttributeType::Bool,
                        description: Description::plain("Whether the notification is enabled"),
                        constraint: AttributeConstraint::OptionalComputed,
                        ..Default::default()
                    },
                    "agency_name" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The cloud service agency delivering notifications"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "operations" => Attribute {
                        attr_type: AttributeType::AttributeList(map! {
                            "service_type" => Attribute {
                                attr_type: AttributeType::String,
                                description: Description::plain("The cloud service the operations belong to"),
                                constraint: AttributeConstraint::Required,
                                ..Default::default()
                            },
                            "resource_type" => Attribute {
                                attr_type: AttributeType::String,
                                description: Description::plain("The resource type the operations apply to"),
                                constraint: AttributeConstraint::Required,
                                ..Default::default()
                            },
                            "trace_names" => Attribute {
                                attr_type: AttributeType::List(AttributeType::String.into()),
                                description: Description::plain("The trace names of the operations"),
                                constraint: AttributeConstraint::Required,
                                ..Default::default()
                            },
                        }),
                        description: Description::plain("The operations that trigger the notification"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "filter" => Attribute {
                        attr_type: AttributeType::AttributeSingle(map! {
                            "condition" => Attribute {
                                attr_type: AttributeType::String,
                                description: Description::plain("How the rules are combined, `AND` or `OR`"),
                                constraint: AttributeConstraint::Required,
                                ..Default::default()
                            },
                            "rule" => Attribute {
                                attr_type: AttributeType::List(AttributeType::String.into()),
                                description: Description::plain("The filter rules"),
                                constraint: AttributeConstraint::Required,
                                ..Default::default()
                            },
                        }),
                        description: Description::plain("The filter applied before notifying"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "notification_id" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The notification ID"),
                        constraint: AttributeConstraint::Computed,
                        ..Default::default()
                    },
                    "status" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The status of the notification"),
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
            if let Some(operation_type) = config.operation_type.as_ref_option() {
                let valid = [OPERATION_TYPE_COMPLETE, OPERATION_TYPE_CUSTOMIZED];
                if !valid.contains(&operation_type.as_ref()) {
                    diags.error(
                        "Invalid operation_type",
                        format!("`operation_type` must be one of {:?}", valid),
                        AttributePath::new("operation_type"),
                    );
                }
                if operation_type.as_ref() == OPERATION_TYPE_CUSTOMIZED
                    && config.operations.is_null()
                {
                    diags.error(
                        "Missing operations",
                        "`operations` is required when `operation_type` is `customized`",
                        AttributePath::new("operations"),
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
        let Some(name) = opt_string(&state.name) else {
            return Some((Value::Null, private_state));
        };
        let client = provider_client(diags, &self.data)?;
        let region = opt_string(&state.region);

        match client.cts(region.as_deref()).get_notification(&name).await {
            Ok(Some(notification)) => Some((
                Value::Value(flatten_notification(&state, &notification)),
                private_state,
            )),
            Ok(None) => Some((Value::Null, private_state)),
            Err(e) if e.is_not_found() => Some((Value::Null, private_state)),
            Err(e) => {
                diags.root_error("Failed to read CTS notification", e.to_string());
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
        state.notification_id = Value::Unknown;
        state.status = Value::Unknown;
        if state.region.is_null() {
            state.region = Value::Unknown;
        }
        if state.enabled.is_null() {
            state.enabled = Value::Unknown;
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

        if proposed.enabled != prior.enabled {
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
        let api = client.cts(Some(&region));

        let request = build_notification_request(&state, None);
        let notification = match api.create_notification(&request).await {
            Ok(notification) => notification,
            Err(e) => {
                diags.root_error("Failed to create CTS notification", e.to_string());
                return None;
            }
        };

        let mut new_state = state.clone();
        new_state.region = set_string(region);
        new_state = flatten_notification(&new_state, &notification);

        // creation always enables the notification; apply the requested
        // disabled state right away
        if state.enabled.contains(&false) {
            let request =
                build_notification_request(&state, Some(notification.notification_id.clone()));
            match api.update_notification(&request).await {
                Ok(updated) => new_state = flatten_notification(&new_state, &updated),
                Err(e) => {
                    diags.root_error("Failed to disable CTS notification", e.to_string());
                    return None;
                }
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
        let api = client.cts(region.as_deref());

        let Some(notification_id) = opt_string(&prior.notification_id) else {
            diags.root_error_short("CTS notification id is missing from state");
            return None;
        };

        let request = build_notification_request(&planned, Some(notification_id));
        let notification = match api.update_notification(&request).await {
            Ok(notification) => notification,
            Err(e) => {
                diags.root_error("Failed to update CTS notification", e.to_string());
                return None;
            }
        };

        let new_state = flatten_notification(&planned, &notification);
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

        let Some(notification_id) = opt_string(&state.notification_id) else {
            return Some(());
        };

        match client
            .cts(region.as_deref())
            .delete_notification(&notification_id)
            .await
        {
            Ok(()) => Some(()),
            Err(e) if e.is_not_found() => Some(()),
            Err(e) => {
                diags.root_error("Failed to delete CTS notification", e.to_string());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    #[test]
    fn operations_expand_to_api_shape() {
        let operations: ValueList<Value<OperationState>> = Value::Value(vec![Value::Value(
            OperationState {
                service_type: Value::Value(Cow::from("ECS")),
                resource_type: Value::Value(Cow::from("ecs")),
                trace_names: Value::Value(vec![
                    Value::Value(Cow::from("createServer")),
                    Value::Value(Cow::from("deleteServer")),
                ]),
            },
        )]);
        let expanded = expand_operations(&operations).unwrap();
        assert_eq!(expanded.len(), 1);
        assert_eq!(expanded[0].service_type, "ECS");
        assert_eq!(expanded[0].trace_names, vec!["createServer", "deleteServer"]);

        assert!(expand_operations(&Value::Null).is_none());
        assert!(expand_operations(&Value::Value(vec![])).is_none());
    }

    #[test]
    fn flatten_round_trips_operations() {
        let api_operations = vec![NotificationOperation {
            service_type: "CTS".to_string(),
            resource_type: "tracker".to_string(),
            trace_names: vec!["deleteTracker".to_string()],
        }];
        let flattened = flatten_operations(&api_operations);
        let expanded = expand_operations(&flattened).unwrap();
        assert_eq!(expanded, api_operations);
    }
}
