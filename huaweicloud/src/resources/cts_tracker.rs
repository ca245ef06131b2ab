//! CTS system tracker resource
//!
//! The audit tracker is a per-project singleton named `system`: creating
//! the resource adopts the tracker if the service already provisioned one,
//! and destroying it by default only disables audit delivery unless
//! `delete_tracker` is set.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use tf_provider::schema::{
    Attribute, AttributeConstraint, AttributeType, Block, Description, Schema,
};
use tf_provider::value::{Value, ValueBool, ValueEmpty, ValueString};
use tf_provider::{map, AttributePath, Diagnostics, Resource};

use crate::api::cts::{
    ObsInfo, Tracker, TrackerRequest, SYSTEM_TRACKER_NAME, SYSTEM_TRACKER_TYPE,
};
use crate::api::ApiError;
use crate::provider_data::SharedProviderData;
use crate::utils::{expect_state, force_new, keep_or_null, opt_string, provider_client, set_opt_string, set_string};

const STATUS_ENABLED: &str = "enabled";
const STATUS_DISABLED: &str = "disabled";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CtsTrackerState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    pub region: ValueString<'a>,
    pub bucket_name: ValueString<'a>,
    pub file_prefix: ValueString<'a>,
    pub lts_enabled: ValueBool,
    pub organization_enabled: ValueBool,
    pub validate_file: ValueBool,
    pub kms_id: ValueString<'a>,
    pub is_sort_by_service: ValueBool,
    pub enabled: ValueBool,
    pub delete_tracker: ValueBool,
    pub name: ValueString<'a>,
    #[serde(rename = "type")]
    pub tracker_type: ValueString<'a>,
    pub status: ValueString<'a>,
    pub agency_name: ValueString<'a>,
}

pub struct CtsTrackerResource {
    data: SharedProviderData,
}

impl CtsTrackerResource {
    pub fn new(data: SharedProviderData) -> Self {
        Self { data }
    }
}

fn build_tracker_request(state: &CtsTrackerState<'_>, status: Option<String>) -> TrackerRequest {
    TrackerRequest {
        tracker_type: SYSTEM_TRACKER_TYPE.to_string(),
        tracker_name: SYSTEM_TRACKER_NAME.to_string(),
        status,
        obs_info: Some(ObsInfo {
            bucket_name: Some(state.bucket_name.as_str().to_string()),
            file_prefix_name: opt_string(&state.file_prefix),
            is_sort_by_service: state.is_sort_by_service.as_ref_option().copied(),
            is_obs_created: None,
        }),
        is_lts_enabled: state.lts_enabled.as_ref_option().copied(),
        is_support_validate: state.validate_file.as_ref_option().copied(),
        kms_id: opt_string(&state.kms_id),
        is_support_trace_files_encryption: opt_string(&state.kms_id).map(|_| true),
        is_organization_tracker: state.organization_enabled.as_ref_option().copied(),
        agency_name: None,
    }
}

fn flatten_tracker<'a>(state: &CtsTrackerState<'a>, tracker: &Tracker) -> CtsTrackerState<'a> {
    let mut new_state = state.clone();
    new_state.id = set_string(tracker.id.clone());
    new_state.name = set_string(tracker.tracker_name.clone());
    new_state.tracker_type = set_string(tracker.tracker_type.clone());
    new_state.status = set_opt_string(tracker.status.clone());
    new_state.agency_name = set_opt_string(tracker.agency_name.clone());
    new_state.enabled = Value::Value(tracker.status.as_deref() == Some(STATUS_ENABLED));
    if let Some(obs) = &tracker.obs_info {
        new_state.bucket_name = match &obs.bucket_name {
            Some(bucket) => set_string(bucket.clone()),
            None => keep_or_null(&state.bucket_name),
        };
        new_state.file_prefix = match &obs.file_prefix_name {
            Some(prefix) => set_string(prefix.clone()),
            None => keep_or_null(&state.file_prefix),
        };
        if let Some(sorted) = obs.is_sort_by_service {
            new_state.is_sort_by_service = Value::Value(sorted);
        }
    }
    if let Some(lts) = &tracker.lts {
        if let Some(enabled) = lts.is_lts_enabled {
            new_state.lts_enabled = Value::Value(enabled);
        }
    }
    if let Some(validate) = tracker.is_support_validate {
        new_state.validate_file = Value::Value(validate);
    }
    if let Some(organization) = tracker.is_organization_tracker {
        new_state.organization_enabled = Value::Value(organization);
    }
    new_state.kms_id = match &tracker.kms_id {
        Some(kms_id) => set_string(kms_id.clone()),
        None => keep_or_null(&state.kms_id),
    };
    new_state.delete_tracker = keep_or_null(&state.delete_tracker);
    new_state.is_sort_by_service = keep_or_null(&new_state.is_sort_by_service);
    new_state.lts_enabled = keep_or_null(&new_state.lts_enabled);
    new_state.validate_file = keep_or_null(&new_state.validate_file);
    new_state.organization_enabled = keep_or_null(&new_state.organization_enabled);
    new_state.file_prefix = keep_or_null(&new_state.file_prefix);
    new_state
}

fn tracker_exists_error(error: &ApiError) -> bool {
    match error {
        ApiError::Api { status, code, .. } => {
            *status == 409
                || code
                    .as_deref()
                    .is_some_and(|code| code.eq_ignore_ascii_case("CTS.0110"))
        }
        _ => false,
    }
}

#[async_trait]
impl Resource for CtsTrackerResource {
    type State<'a> = Value<CtsTrackerState<'a>>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(Schema {
            version: 1,
            block: Block {
                version: 1,
                description: Description::plain("Manages the CTS system tracker"),
                attributes: map! {
                    "id" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The ID of the system tracker"),
                        constraint: AttributeConstraint::Computed,
                        ..Default::default()
                    },
                    "region" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The region in which to manage the tracker"),
                        constraint: AttributeConstraint::OptionalComputed,
                        ..Default::default()
                    },
                    "bucket_name" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The OBS bucket to which traces are delivered"),
                        constraint: AttributeConstraint::Required,
                        ..Default::default()
                    },
                    "file_prefix" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The file name prefix to mark trace files"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "lts_enabled" => Attribute {
                        attr_type: AttributeType::Bool,
                        description: Description::plain("Whether traces are delivered to LTS"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "organization_enabled" => Attribute {
                        attr_type: AttributeType::Bool,
                        description: Description::plain("Whether the tracker applies to the whole organization"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "validate_file" => Attribute {
                        attr_type: AttributeType::Bool,
                        description: Description::plain("Whether trace file integrity verification is enabled"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "kms_id" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The ID of the KMS key used for trace file encryption"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "is_sort_by_service" => Attribute {
                        attr_type: AttributeType::Bool,
                        description: Description::plain("Whether trace files are stored per service in the bucket"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "enabled" => Attribute {
                        attr_type: AttributeType::Bool,
                        description: Description::plain("Whether the tracker is enabled"),
                        constraint: AttributeConstraint::OptionalComputed,
                        ..Default::default()
                    },
                    "delete_tracker" => Attribute {
                        attr_type: AttributeType::Bool,
                        description: Description::plain("Whether to delete the tracker on destroy instead of disabling it"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "name" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The tracker name, always `system`"),
                        constraint: AttributeConstraint::Computed,
                        ..Default::default()
                    },
                    "type" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The tracker type, always `system`"),
                        constraint: AttributeConstraint::Computed,
                        ..Default::default()
                    },
                    "status" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The status of the tracker"),
                        constraint: AttributeConstraint::Computed,
                        ..Default::default()
                    },
                    "agency_name" => Attribute {
                        attr_type: AttributeType::String,
                        description: Description::plain("The cloud service agency used by the tracker"),
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
            if let Some(bucket) = config.bucket_name.as_ref_option() {
                if bucket.is_empty() {
                    diags.error(
                        "Invalid bucket_name",
                        "`bucket_name` must not be empty",
                        AttributePath::new("bucket_name"),
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
        let client = provider_client(diags, &self.data)?;
        let region = opt_string(&state.region);

        match client.cts(region.as_deref()).get_tracker(SYSTEM_TRACKER_NAME).await {
            Ok(Some(tracker)) => Some((Value::Value(flatten_tracker(&state, &tracker)), private_state)),
            Ok(None) => Some((Value::Null, private_state)),
            Err(e) if e.is_not_found() => Some((Value::Null, private_state)),
            Err(e) => {
                diags.root_error("Failed to read CTS tracker", e.to_string());
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
        state.name = Value::Unknown;
        state.tracker_type = Value::Unknown;
        state.status = Value::Unknown;
        state.agency_name = Value::Unknown;
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

        let request = build_tracker_request(&state, None);
        match api.create_tracker(&request).await {
            Ok(_) => {}
            // the service pre-provisions the system tracker in some
            // projects; adopt it by updating in place
            Err(e) if tracker_exists_error(&e) => {
                if let Err(e) = api.update_tracker(&request).await {
                    diags.root_error("Failed to adopt existing CTS tracker", e.to_string());
                    return None;
                }
            }
            Err(e) => {
                diags.root_error("Failed to create CTS tracker", e.to_string());
                return None;
            }
        }

        if state.enabled.contains(&false) {
            let request = build_tracker_request(&state, Some(STATUS_DISABLED.to_string()));
            if let Err(e) = api.update_tracker(&request).await {
                diags.root_error("Failed to disable CTS tracker", e.to_string());
                return None;
            }
        }

        let mut new_state = state.clone();
        new_state.region = set_string(region);
        match api.get_tracker(SYSTEM_TRACKER_NAME).await {
            Ok(Some(tracker)) => new_state = flatten_tracker(&new_state, &tracker),
            Ok(None) => {
                diags.root_error_short("CTS tracker not found after creation");
                return None;
            }
            Err(e) => {
                diags.root_error("Failed to read CTS tracker after creation", e.to_string());
                return None;
            }
        }

        Some((Value::Value(new_state), planned_private_state))
    }

    async fn update<'a>(
        &self,
        diags: &mut Diagnostics,
        _prior_state: Self::State<'a>,
        planned_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        planned_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let planned = expect_state(diags, planned_state)?;
        let client = provider_client(diags, &self.data)?;
        let region = opt_string(&planned.region);
        let api = client.cts(region.as_deref());

        let status = if planned.enabled.contains(&false) {
            STATUS_DISABLED
        } else {
            STATUS_ENABLED
        };
        let request = build_tracker_request(&planned, Some(status.to_string()));
        if let Err(e) = api.update_tracker(&request).await {
            diags.root_error("Failed to update CTS tracker", e.to_string());
            return None;
        }

        let mut new_state = planned.clone();
        match api.get_tracker(SYSTEM_TRACKER_NAME).await {
            Ok(Some(tracker)) => new_state = flatten_tracker(&new_state, &tracker),
            Ok(None) => {
                diags.root_error_short("CTS tracker no longer exists");
                return None;
            }
            Err(e) => {
                diags.root_error("Failed to read CTS tracker after update", e.to_string());
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
        let api = client.cts(region.as_deref());

        if state.delete_tracker.contains(&true) {
            match api
                .delete_tracker(SYSTEM_TRACKER_NAME, SYSTEM_TRACKER_TYPE)
                .await
            {
                Ok(()) => Some(()),
                Err(e) if e.is_not_found() => Some(()),
                Err(e) => {
                    diags.root_error("Failed to delete CTS tracker", e.to_string());
                    None
                }
            }
        } else {
            let request = build_tracker_request(&state, Some(STATUS_DISABLED.to_string()));
            match api.update_tracker(&request).await {
                Ok(()) => Some(()),
                Err(e) if e.is_not_found() => Some(()),
                Err(e) => {
                    diags.root_error("Failed to disable CTS tracker", e.to_string());
                    None
                }
            }
        }
    }

    async fn import<'a>(
        &self,
        _diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let state = CtsTrackerState {
            id: set_string(id),
            ..Default::default()
        };
        Some((Value::Value(state), Default::default()))
    }
}
