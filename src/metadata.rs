//! Shapes returned by the external metadata lookups, and the seam they are consumed through.
//!
//! The lookups themselves (field lists, picklists, relationships) live outside this
//! crate. Their failures never abort editing: `options_or_empty` logs them and
//! degrades to an empty option list.

use crate::error::MetadataError;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageOption {
    pub label: String,
    pub value: String,
}

/// A field of an object, as offered by the field pickers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub label: String,
    /// The field's API name, which is also how formulas refer to it.
    pub value: String,
    #[serde(rename = "type", default)]
    pub field_type: String,
}

impl FieldOption {
    pub fn new(label: &str, value: &str, field_type: &str) -> Self {
        Self {
            label: label.to_string(),
            value: value.to_string(),
            field_type: field_type.to_string(),
        }
    }

    pub fn is_picklist(&self) -> bool {
        self.field_type.eq_ignore_ascii_case("PICKLIST")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PicklistEntry {
    pub label: String,
    pub value: String,
}

impl PicklistEntry {
    /// The entry as an IF-condition operand: the value wrapped in double quotes
    /// so it reaches the evaluator as a text literal.
    pub fn as_formula_operand(&self) -> PicklistEntry {
        PicklistEntry {
            label: self.label.clone(),
            value: format!("\"{}\"", self.value.replace('\\', "\\\\").replace('"', "\\\"")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationshipType {
    Parent,
    Child,
}

/// How a related object is reached from the primary record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipDescriptor {
    pub related_object_api: String,
    pub relationship_name: String,
    pub relationship_type: RelationshipType,
}

/// A relationship as offered in the "related record" picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipOption {
    pub label: String,
    pub value: String,
    #[serde(flatten)]
    pub descriptor: RelationshipDescriptor,
}

/// The metadata lookups the UI layer performs on behalf of the core.
pub trait MetadataProvider: Send + Sync {
    fn list_formula_pages(&self) -> Result<Vec<PageOption>, MetadataError>;

    fn list_related_objects(&self, object_api: &str)
    -> Result<Vec<RelationshipOption>, MetadataError>;

    fn list_fields_for_object(&self, object_api: &str) -> Result<Vec<FieldOption>, MetadataError>;

    fn list_picklist_values(
        &self,
        object_api: &str,
        field_api: &str,
    ) -> Result<Vec<PicklistEntry>, MetadataError>;
}

/// Unwraps a lookup result, logging and degrading to an empty list on failure.
pub fn options_or_empty<T>(result: Result<Vec<T>, MetadataError>, what: &str) -> Vec<T> {
    match result {
        Ok(options) => options,
        Err(e) => {
            tracing::warn!(lookup = what, error = %e, "metadata lookup failed, using no options");
            Vec::new()
        }
    }
}

/// A map-backed provider, used by the CLI and tests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InMemoryMetadata {
    pub pages: Vec<PageOption>,
    pub relationships: AHashMap<String, Vec<RelationshipOption>>,
    pub fields: AHashMap<String, Vec<FieldOption>>,
    /// Keyed by `"<object>.<field>"`.
    pub picklists: AHashMap<String, Vec<PicklistEntry>>,
}

impl InMemoryMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fields(mut self, object_api: &str, fields: Vec<FieldOption>) -> Self {
        self.fields.insert(object_api.to_string(), fields);
        self
    }

    pub fn with_relationships(
        mut self,
        object_api: &str,
        relationships: Vec<RelationshipOption>,
    ) -> Self {
        self.relationships
            .insert(object_api.to_string(), relationships);
        self
    }

    pub fn with_picklist(
        mut self,
        object_api: &str,
        field_api: &str,
        entries: Vec<PicklistEntry>,
    ) -> Self {
        self.picklists
            .insert(format!("{}.{}", object_api, field_api), entries);
        self
    }

    fn not_found(provider: &str, key: &str) -> MetadataError {
        MetadataError::Lookup {
            provider: provider.to_string(),
            message: format!("no metadata for '{}'", key),
        }
    }
}

impl MetadataProvider for InMemoryMetadata {
    fn list_formula_pages(&self) -> Result<Vec<PageOption>, MetadataError> {
        Ok(self.pages.clone())
    }

    fn list_related_objects(
        &self,
        object_api: &str,
    ) -> Result<Vec<RelationshipOption>, MetadataError> {
        self.relationships
            .get(object_api)
            .cloned()
            .ok_or_else(|| Self::not_found("listRelatedObjects", object_api))
    }

    fn list_fields_for_object(&self, object_api: &str) -> Result<Vec<FieldOption>, MetadataError> {
        self.fields
            .get(object_api)
            .cloned()
            .ok_or_else(|| Self::not_found("listFieldsForObject", object_api))
    }

    fn list_picklist_values(
        &self,
        object_api: &str,
        field_api: &str,
    ) -> Result<Vec<PicklistEntry>, MetadataError> {
        let key = format!("{}.{}", object_api, field_api);
        self.picklists
            .get(&key)
            .cloned()
            .ok_or_else(|| Self::not_found("listPicklistValues", &key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_lookup_degrades_to_empty() {
        let metadata = InMemoryMetadata::new();
        let fields = options_or_empty(metadata.list_fields_for_object("Booking__c"), "fields");
        assert!(fields.is_empty());
    }

    #[test]
    fn formula_pages_load_from_json() {
        let metadata: InMemoryMetadata = serde_json::from_str(
            r#"{"pages":[{"label":"Invoice","value":"InvoicePDF"}]}"#,
        )
        .unwrap();
        let pages = options_or_empty(metadata.list_formula_pages(), "formula pages");
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].value, "InvoicePDF");
        assert!(metadata.fields.is_empty());
    }

    #[test]
    fn picklist_operand_is_quoted() {
        let entry = PicklistEntry {
            label: "Open".to_string(),
            value: "Open".to_string(),
        };
        assert_eq!(entry.as_formula_operand().value, "\"Open\"");
    }

    #[test]
    fn relationship_options_deserialize_flat() {
        let json = r#"{"label":"Payments","value":"Payment__c.Booking__c",
            "relatedObjectApi":"Payment__c","relationshipName":"Booking__c",
            "relationshipType":"Child"}"#;
        let option: RelationshipOption = serde_json::from_str(json).unwrap();
        assert_eq!(option.descriptor.relationship_type, RelationshipType::Child);
        assert_eq!(option.descriptor.related_object_api, "Payment__c");
    }
}
