//! Conversions between Terraform values and API types

use std::borrow::Cow;

use tf_provider::value::{Value, ValueMap, ValueString};
use tf_provider::{AttributePath, Diagnostics};

use crate::api::common::ResourceTag;
use crate::api::Client;
use crate::provider_data::SharedProviderData;

/// Fetch the configured client, or record the standard diagnostic.
pub(crate) fn provider_client<'d>(
    diags: &mut Diagnostics,
    data: &'d SharedProviderData,
) -> Option<&'d Client> {
    match data.get() {
        Some(data) => Some(&data.client),
        None => {
            diags.root_error(
                "Provider not configured",
                "The provider must be configured before this operation",
            );
            None
        }
    }
}

/// Unwrap the root state object, which the protocol hands over as a
/// nullable value.
pub(crate) fn expect_state<T>(diags: &mut Diagnostics, state: Value<T>) -> Option<T> {
    match state {
        Value::Value(state) => Some(state),
        _ => {
            diags.root_error_short("Missing state object");
            None
        }
    }
}

/// Record a replace trigger when a create-only attribute changed.
pub(crate) fn force_new<T: PartialEq>(
    triggers: &mut Vec<AttributePath>,
    attribute: &'static str,
    prior: &Value<T>,
    proposed: &Value<T>,
) {
    // An unknown proposed value may differ once known, so it counts as a
    // change.
    let changed = proposed.is_unknown() || prior != proposed;
    if changed {
        triggers.push(AttributePath::new(attribute));
    }
}

pub(crate) fn set_string<'a>(value: String) -> ValueString<'a> {
    Value::Value(Cow::Owned(value))
}

pub(crate) fn set_opt_string<'a>(value: Option<String>) -> ValueString<'a> {
    match value {
        Some(value) => Value::Value(Cow::Owned(value)),
        None => Value::Null,
    }
}

pub(crate) fn opt_string(value: &ValueString<'_>) -> Option<String> {
    value.as_ref_option().map(|v| v.to_string())
}

/// Applied state must not carry unknowns: keep a concrete value as-is, but
/// collapse a leftover unknown to null.
pub(crate) fn keep_or_null<'a, T: Clone>(value: &Value<T>) -> Value<T> {
    if value.is_unknown() {
        Value::Null
    } else {
        value.clone()
    }
}

/// Terraform tag map -> API tag list. Empty and null maps are collapsed to
/// `None` so request bodies omit the field entirely.
pub(crate) fn expand_tags(tags: &ValueMap<'_, ValueString<'_>>) -> Option<Vec<ResourceTag>> {
    let map = tags.as_ref_option()?;
    if map.is_empty() {
        return None;
    }
    Some(
        map.iter()
            .map(|(key, value)| ResourceTag {
                key: key.to_string(),
                value: value.as_str().to_string(),
            })
            .collect(),
    )
}

/// API tag list -> Terraform tag map.
pub(crate) fn flatten_tags<'a>(tags: &[ResourceTag]) -> ValueMap<'a, ValueString<'a>> {
    Value::Value(
        tags.iter()
            .map(|tag| {
                (
                    Cow::Owned(tag.key.clone()),
                    Value::Value(Cow::Owned(tag.value.clone())),
                )
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn expand_tags_skips_null_and_empty() {
        assert!(expand_tags(&Value::Null).is_none());
        assert!(expand_tags(&Value::Value(BTreeMap::new())).is_none());

        let mut map = BTreeMap::new();
        map.insert(Cow::from("owner"), Value::Value(Cow::from("ops")));
        let tags = expand_tags(&Value::Value(map)).unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].key, "owner");
        assert_eq!(tags[0].value, "ops");
    }

    #[test]
    fn flatten_round_trips() {
        let tags = vec![ResourceTag {
            key: "env".to_string(),
            value: "prod".to_string(),
        }];
        let value = flatten_tags(&tags);
        let map = value.as_ref_option().unwrap();
        assert_eq!(map.get("env").unwrap().as_str(), "prod");
    }

    #[test]
    fn force_new_marks_unknown_and_changed() {
        let mut triggers = Vec::new();
        force_new::<i64>(&mut triggers, "same", &Value::Value(1), &Value::Value(1));
        assert!(triggers.is_empty());

        force_new::<i64>(&mut triggers, "changed", &Value::Value(1), &Value::Value(2));
        force_new::<i64>(&mut triggers, "unknown", &Value::Value(1), &Value::Unknown);
        assert_eq!(triggers.len(), 2);
    }
}
