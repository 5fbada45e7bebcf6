//! Custom field discovery from a sample issue

use super::types::{CustomField, FieldSource, FieldType};
use crate::records::Issue;
use std::collections::BTreeMap;

/// Contexts Sentry attaches to most events; these are not custom data
pub const KNOWN_CONTEXTS: [&str; 4] = ["browser", "os", "device", "runtime"];

/// Underscores to spaces, first letter of every word upper-cased
pub fn title_case(key: &str) -> String {
    key.replace('_', " ")
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Derive custom field descriptors from one issue's tags and contexts
pub fn discover_custom_fields(sample: &Issue) -> BTreeMap<String, CustomField> {
    let mut fields = BTreeMap::new();

    for tag in sample.tags.iter().filter(|t| !t.key.is_empty()) {
        fields.insert(
            format!("tag_{}", tag.key),
            CustomField {
                display_name: format!("Tag: {}", title_case(&tag.key)),
                description: "custom tag from sentry".to_string(),
                field_type: FieldType::String,
                required: false,
                source: FieldSource::Dynamic,
            },
        );
    }

    let contexts = sample.contexts.iter().flat_map(|c| c.keys());
    for key in contexts.filter(|k| !KNOWN_CONTEXTS.contains(&k.as_str())) {
        fields.insert(
            format!("context_{key}"),
            CustomField {
                display_name: format!("Context: {key}"),
                description: "custom context data from sentry".to_string(),
                field_type: FieldType::Object,
                required: false,
                source: FieldSource::Dynamic,
            },
        );
    }

    fields
}
