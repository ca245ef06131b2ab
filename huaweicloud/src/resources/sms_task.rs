//! SMS migration task resource

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use tf_provider::schema::{
    Attribute, AttributeConstraint, AttributeType, Block, Description, Schema,
};
use tf_provider::value::{Value, ValueBool, ValueEmpty, ValueString};
use tf_provider::{map, AttributePath, Diagnostics, Resource};

use crate::api::sms::{CreateTaskRequest, Task};
use crate::provider_data::SharedProviderData;
use crate::utils::{expect_state, force_new, keep_or_null, opt_string, provider_client, set_opt_string, set_string};

const TASK_TYPES: &[&str] = &["MIGRATE_FILE", "MIGRATE_BLOCK"];
const OS_TYPES: &[&str] = &["WINDOWS", "LINUX"];
const ACTIONS: &[&str] = &["start", "stop", "collect_log", "test", "clone_test", "restart"];

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SmsTaskState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    #[serde(rename = "type")]
    pub task_type: ValueString<'a>,
    pub os_type: ValueString<'a>,
    pub source_server_id: ValueString<'a>,
    pub region: ValueString<'a>,
    pub project_id: ValueString<'a>,
    pub project_name: ValueString<'a>,
    pub vm_template_id: ValueString<'a>,
    pub target_server_id: ValueString<'a>,
    pub migration_ip: ValueString<'a>,
    pub use_public_ip: ValueBool,
    pub syncing: ValueBool,
    pub start_target_server: ValueBool,
    pub action: ValueString<'a>,
    pub state: ValueString<'a>,
    pub enterprise_project_id: ValueString<'a>,
    pub target_server_name: ValueString<'a>,
    pub migrate_speed: Value<f64>,
}

pub struct SmsTaskResource {
    data: SharedProviderData,
}

impl SmsTaskResource {
    pub fn new(data: SharedProviderData) -> Self {
        Self { data }
    }
}

fn flatten_task<'a>(current: &SmsTaskState<'a>, task: &Task) -> SmsTaskState<'a> {
    let mut new_state = current.clone();
    new_state.id = set_string(task.id.clone());
    new_state.state = set_opt_string(task.state.clone());
    new_state.enterprise_project_id = set_opt_string(task.enterprise_project_id.clone());
    new_state.migrate_speed = match task.migrate_speed {
        Some(speed) => Value::Value(speed),
        None => Value::Null,
    };
    if let Some(task_type) = &task.task_type {
        new_state.task_type = set_string(task_type.clone());
    }
    if let Some(os_type) = &task.os_type {
        new_state.os_type = set_string(os_type.clone());
    }
    if let Some(source) = &task.source_server {
        if let Some(id) = &source.id {
            new_state.source_server_id = set_string(id.clone());
        }
    }
    match &task.target_server {
        Some(target) => {
            match &target.vm_id {
                Some(vm_id) => new_state.target_server_id = set_string(vm_id.clone()),
                None => {
                    new_state.target_server_id = keep_or_null(&current.target_server_id)
                }
            }
            new_state.target_server_name = set_opt_string(target.name.clone());
        }
        None => {
            new_state.target_server_id = keep_or_null(&current.target_server_id);
            new_state.target_server_name = Value::Null;
        }
    }
    new_state.migration_ip = match &task.migration_ip {
        Some(ip) => set_string(ip.clone()),
        None => keep_or_null(&current.migration_ip),
    };
    if let Some(use_public_ip) = task.use_public_ip {
        new_state.use_public_ip = Value::Value(use_public_ip);
    }
    if let Some(syncing) = task.syncing {
        new_state.syncing = Value::Value(syncing);
    }
    if let Some(start_target_server) = task.start_target_server {
        new_state.start_target_server = Value::Value(start_target_server);
    }
    new_state.use_public_ip = keep_or_null(&new_state.use_public_ip);
    new_state.syncing = keep_or_null(&new_state.syncing);
    new_state.start_target_server = keep_or_null(&new_state.start_target_server);
    new_state.vm_template_id = keep_or_null(&current.vm_template_id);
    new_state.action = keep_or_null(&current.action);
    new_state.project_name = keep_or_null(&current.project_name);
    new_state
}

#[async_trait]
impl Resource for SmsTaskResource {
    type State<'a> = Value<SmsTaskState<'a>>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(Schema {
            version: 1,
            block: Block {
                version: 1,
                description: Description::plain("Manages an SMS migration task"),
                attributes: map! {
                    "id" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The ID of the migration task"),
                        constraint: AttributeConstraint::Computed,
                        ..Default::default()
                    },
                    "type" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The task type, `MIGRATE_FILE` or `MIGRATE_BLOCK`"),
                        constraint: AttributeConstraint::Required,
                        ..Default::default()
                    },
                    "os_type" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The OS type of the source server, `WINDOWS` or `LINUX`"),
                        constraint: AttributeConstraint::Required,
                        ..Default::default()
                    },
                    "source_server_id" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The ID of the registered source server"),
                        constraint: AttributeConstraint::Required,
                        ..Default::default()
                    },
                    "region" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The region to migrate to"),
                        constraint: AttributeConstraint::OptionalComputed,
                        ..Default::default()
                    },
                    "project_id" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The ID of the project to migrate to"),
                        constraint: AttributeConstraint::OptionalComputed,
                        ..Default::default()
                    },
                    "project_name" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The name of the project to migrate to"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "vm_template_id" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The ID of the template used to create the target server"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "target_server_id" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The ID of an existing target server"),
                        constraint: AttributeConstraint::OptionalComputed,
                        ..Default::default()
                    },
                    "migration_ip" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The IP address of the target server used for migration"),
                        constraint: AttributeConstraint::OptionalComputed,
                        ..Default::default()
                    },
                    "use_public_ip" => Attribute {
                        attr_type: AttributeType::Bool,
                        description: Description::plain("Whether a public IP is used for migration"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "syncing" => Attribute {
                        attr_type: AttributeType::Bool,
                        description: Description::plain("Whether to continue syncing after the first replication"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "start_target_server" => Attribute {
                        attr_type: AttributeType::Bool,
                        description: Description::plain("Whether to start the target server after migration"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "action" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("An operation to apply to the task"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "state" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The state of the migration task"),
                        constraint: AttributeConstraint::Computed,
                        ..Default::default()
                    },
                    "enterprise_project_id" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The enterprise project the task belongs to"),
                        constraint: AttributeConstraint::Computed,
                        ..Default::default()
                    },
                    "target_server_name" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The name of the target server"),
                        constraint: AttributeConstraint::Computed,
                        ..Default::default()
                    },
                    "migrate_speed" => Attribute {
                        attr_type: AttributeType::Number,
                        description: Description::plain("The migration rate in MB/s"),
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
            if let Some(task_type) = config.task_type.as_ref_option() {
                if !TASK_TYPES.contains(&task_type.as_ref()) {
                    diags.error(
                        "Invalid type",
                        format!("`type` must be one of {:?}", TASK_TYPES),
                        AttributePath::new("type"),
                    );
                }
            }
            if let Some(os_type) = config.os_type.as_ref_option() {
                if !OS_TYPES.contains(&os_type.as_ref()) {
                    diags.error(
                        "Invalid os_type",
                        format!("`os_type` must be one of {:?}", OS_TYPES),
                        AttributePath::new("os_type"),
                    );
                }
            }
            if let Some(action) = config.action.as_ref_option() {
                if !ACTIONS.contains(&action.as_ref()) {
                    diags.error(
                        "Invalid action",
                        format!("`action` must be one of {:?}", ACTIONS),
                        AttributePath::new("action"),
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
        let Value::Value(task_state) = state else {
            return Some((Value::Null, private_state));
        };
        let Some(id) = opt_string(&task_state.id) else {
            return Some((Value::Null, private_state));
        };
        let client = provider_client(diags, &self.data)?;

        match client.sms().get_task(&id).await {
            Ok(task) => Some((Value::Value(flatten_task(&task_state, &task)), private_state)),
            Err(e) if e.is_not_found() => Some((Value::Null, private_state)),
            Err(e) => {
                diags.root_error("Failed to read SMS task", e.to_string());
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
        let mut task_state = expect_state(diags, proposed_state)?;
        task_state.id = Value::Unknown;
        task_state.state = Value::Unknown;
        task_state.enterprise_project_id = Value::Unknown;
        task_state.target_server_name = Value::Unknown;
        task_state.migrate_speed = Value::Unknown;
        if task_state.region.is_null() {
            task_state.region = Value::Unknown;
        }
        if task_state.project_id.is_null() {
            task_state.project_id = Value::Unknown;
        }
        if task_state.target_server_id.is_null() {
            task_state.target_server_id = Value::Unknown;
        }
        if task_state.migration_ip.is_null() {
            task_state.migration_ip = Value::Unknown;
        }
        Some((Value::Value(task_state), Default::default()))
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
        force_new(&mut triggers, "type", &prior.task_type, &proposed.task_type);
        force_new(&mut triggers, "os_type", &prior.os_type, &proposed.os_type);
        force_new(
            &mut triggers,
            "source_server_id",
            &prior.source_server_id,
            &proposed.source_server_id,
        );
        force_new(&mut triggers, "region", &prior.region, &proposed.region);
        force_new(&mut triggers, "project_id", &prior.project_id, &proposed.project_id);
        force_new(
            &mut triggers,
            "vm_template_id",
            &prior.vm_template_id,
            &proposed.vm_template_id,
        );

        if proposed.action != prior.action {
            proposed.state = Value::Unknown;
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
        let task_state = expect_state(diags, planned_state)?;
        let client = provider_client(diags, &self.data)?;
        let api = client.sms();

        let region = opt_string(&task_state.region).unwrap_or_else(|| client.region().to_string());
        let project_id =
            opt_string(&task_state.project_id).unwrap_or_else(|| client.project_id().to_string());

        let request = CreateTaskRequest {
            name: None,
            task_type: task_state.task_type.as_str().to_string(),
            os_type: task_state.os_type.as_str().to_string(),
            region_id: region.clone(),
            region_name: Some(region.clone()),
            project_id: project_id.clone(),
            project_name: opt_string(&task_state.project_name),
            source_server_id: task_state.source_server_id.as_str().to_string(),
            target_server_id: opt_string(&task_state.target_server_id),
            vm_template_id: opt_string(&task_state.vm_template_id),
            migration_ip: opt_string(&task_state.migration_ip),
            use_public_ip: task_state.use_public_ip.as_ref_option().copied(),
            syncing: task_state.syncing.as_ref_option().copied(),
            start_target_server: task_state.start_target_server.as_ref_option().copied(),
        };

        let task_id = match api.create_task(&request).await {
            Ok(response) => response.id,
            Err(e) => {
                diags.root_error("Failed to create SMS task", e.to_string());
                return None;
            }
        };

        if let Some(action) = opt_string(&task_state.action) {
            if let Err(e) = api.task_action(&task_id, &action).await {
                diags.root_error(
                    format!("Failed to apply `{}` to SMS task", action),
                    e.to_string(),
                );
                return None;
            }
        }

        let mut new_state = task_state.clone();
        new_state.region = set_string(region);
        new_state.project_id = set_string(project_id);
        new_state.id = set_string(task_id.clone());
        match api.get_task(&task_id).await {
            Ok(task) => new_state = flatten_task(&new_state, &task),
            Err(e) => {
                diags.root_error("Failed to read SMS task after creation", e.to_string());
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
        let api = client.sms();

        let Some(task_id) = opt_string(&prior.id) else {
            diags.root_error_short("SMS task id is missing from state");
            return None;
        };

        if planned.action != prior.action {
            if let Some(action) = opt_string(&planned.action) {
                if let Err(e) = api.task_action(&task_id, &action).await {
                    diags.root_error(
                        format!("Failed to apply `{}` to SMS task", action),
                        e.to_string(),
                    );
                    return None;
                }
            }
        }

        let mut new_state = planned.clone();
        new_state.id = set_string(task_id.clone());
        match api.get_task(&task_id).await {
            Ok(task) => new_state = flatten_task(&new_state, &task),
            Err(e) => {
                diags.root_error("Failed to read SMS task after update", e.to_string());
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
        let task_state = expect_state(diags, prior_state)?;
        let client = provider_client(diags, &self.data)?;

        let Some(task_id) = opt_string(&task_state.id) else {
            return Some(());
        };

        match client.sms().delete_task(&task_id).await {
            Ok(()) => Some(()),
            Err(e) if e.is_not_found() => Some(()),
            Err(e) => {
                diags.root_error("Failed to delete SMS task", e.to_string());
                None
            }
        }
    }

    async fn import<'a>(
        &self,
        _diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let state = SmsTaskState {
            id: set_string(id),
            ..Default::default()
        };
        Some((Value::Value(state), Default::default()))
    }
}
