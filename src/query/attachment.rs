use super::clause::build_where_clause;
use super::condition::ConditionList;
use super::preview::{ChildRecordMode, compose_query_preview};
use crate::config::EngineConfig;
use crate::metadata::{RelationshipOption, RelationshipType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AttachmentType {
    #[default]
    #[serde(rename = "VFPage")]
    VfPage,
    StaticDocument,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RecordSourceType {
    /// The primary record itself.
    #[default]
    Direct,
    /// A parent or child record reached through a relationship.
    Related,
}

/// One email attachment configuration row.
///
/// Serializes to the persisted shape, with the condition list stored as a JSON
/// string under `filterConditionsJson`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttachmentRule {
    pub name: String,
    #[serde(rename = "type")]
    pub attachment_type: AttachmentType,
    pub vf_page_name: String,
    pub vf_page_param: String,
    pub document_id: String,
    pub file_name_pattern: String,
    pub is_default_checked: bool,
    pub is_required: bool,
    pub record_source_type: RecordSourceType,
    pub selected_relationship: String,
    pub child_record_type: ChildRecordMode,
    /// Accepts a number or a numeric string, clamped to at least 1.
    #[serde(deserialize_with = "child_record_limit::deserialize")]
    pub max_child_records: u32,
    #[serde(rename = "filterConditionsJson", with = "conditions_json")]
    pub filter_conditions: ConditionList,
}

impl Default for AttachmentRule {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl AttachmentRule {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            name: String::new(),
            attachment_type: AttachmentType::VfPage,
            vf_page_name: String::new(),
            vf_page_param: "id".to_string(),
            document_id: String::new(),
            file_name_pattern: String::new(),
            is_default_checked: false,
            is_required: false,
            record_source_type: RecordSourceType::Direct,
            selected_relationship: String::new(),
            child_record_type: ChildRecordMode::All,
            max_child_records: config.default_max_child_records,
            filter_conditions: ConditionList::new(),
        }
    }

    pub fn with_name(&self, name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..self.clone()
        }
    }

    /// Switching type forgets the page and document chosen for the previous type.
    pub fn with_attachment_type(&self, attachment_type: AttachmentType) -> Self {
        Self {
            attachment_type,
            vf_page_name: String::new(),
            document_id: String::new(),
            ..self.clone()
        }
    }

    pub fn with_vf_page(&self, page_name: &str) -> Self {
        Self {
            vf_page_name: page_name.to_string(),
            ..self.clone()
        }
    }

    pub fn with_vf_page_param(&self, param: &str) -> Self {
        Self {
            vf_page_param: param.to_string(),
            ..self.clone()
        }
    }

    pub fn with_document_id(&self, document_id: &str) -> Self {
        Self {
            document_id: document_id.to_string(),
            ..self.clone()
        }
    }

    pub fn with_file_name_pattern(&self, pattern: &str) -> Self {
        Self {
            file_name_pattern: pattern.to_string(),
            ..self.clone()
        }
    }

    /// Appends a merge field such as `{!Name}` to the file name pattern.
    pub fn with_merge_field(&self, merge_field: &str) -> Self {
        self.with_file_name_pattern(&format!("{}{}", self.file_name_pattern, merge_field))
    }

    pub fn with_default_checked(&self, checked: bool) -> Self {
        Self {
            is_default_checked: checked,
            ..self.clone()
        }
    }

    /// A required attachment is always checked by default.
    pub fn with_required(&self, required: bool) -> Self {
        Self {
            is_required: required,
            is_default_checked: self.is_default_checked || required,
            ..self.clone()
        }
    }

    pub fn with_record_source(&self, source: RecordSourceType) -> Self {
        Self {
            record_source_type: source,
            selected_relationship: String::new(),
            child_record_type: ChildRecordMode::All,
            filter_conditions: ConditionList::new(),
            ..self.clone()
        }
    }

    pub fn with_relationship(&self, relationship: &str) -> Self {
        Self {
            selected_relationship: relationship.to_string(),
            filter_conditions: ConditionList::new(),
            ..self.clone()
        }
    }

    /// Switching to `Single` with no conditions starts one blank condition.
    pub fn with_child_record_type(&self, mode: ChildRecordMode) -> Self {
        let filter_conditions =
            if mode == ChildRecordMode::Single && self.filter_conditions.is_empty() {
                self.filter_conditions.with_added()
            } else {
                self.filter_conditions.clone()
            };
        Self {
            child_record_type: mode,
            filter_conditions,
            ..self.clone()
        }
    }

    /// Zero is not a usable cap and is stored as one.
    pub fn with_max_child_records(&self, max: u32) -> Self {
        Self {
            max_child_records: max.max(1),
            ..self.clone()
        }
    }

    pub fn with_filter_conditions(&self, conditions: ConditionList) -> Self {
        Self {
            filter_conditions: conditions,
            ..self.clone()
        }
    }

    pub fn selected_option<'a>(
        &self,
        options: &'a [RelationshipOption],
    ) -> Option<&'a RelationshipOption> {
        if self.selected_relationship.is_empty() {
            return None;
        }
        options
            .iter()
            .find(|option| option.value == self.selected_relationship)
    }

    /// Child cardinality and the query preview only apply to child relationships.
    pub fn shows_child_record_options(&self, options: &[RelationshipOption]) -> bool {
        self.selected_option(options)
            .is_some_and(|o| o.descriptor.relationship_type == RelationshipType::Child)
    }

    pub fn where_clause(&self) -> String {
        build_where_clause(self.filter_conditions.conditions())
    }

    pub fn query_preview(&self, options: &[RelationshipOption]) -> String {
        compose_query_preview(
            self.selected_option(options).map(|o| &o.descriptor),
            self.child_record_type,
            &self.where_clause(),
            self.max_child_records,
        )
    }

    /// The object whose fields are offered as file-name merge fields.
    pub fn merge_field_object(&self, object_api: &str, options: &[RelationshipOption]) -> String {
        match (self.record_source_type, self.selected_option(options)) {
            (RecordSourceType::Related, Some(option)) => {
                option.descriptor.related_object_api.clone()
            }
            _ => object_api.to_string(),
        }
    }

    pub fn record_source_help_text(&self, object_api: &str, options: &[RelationshipOption]) -> String {
        if self.record_source_type == RecordSourceType::Direct {
            return format!("PDF will be generated for the primary {} record.", object_api);
        }
        let Some(option) = self.selected_option(options) else {
            return "Select a record source type to configure the attachment.".to_string();
        };
        let related = &option.descriptor.related_object_api;
        match (option.descriptor.relationship_type, self.child_record_type) {
            (RelationshipType::Parent, _) => {
                format!("PDF will be generated for the parent {} record.", related)
            }
            (RelationshipType::Child, ChildRecordMode::All) => format!(
                "Multiple PDFs will be generated - one for each child {} record (max {}).",
                related, self.max_child_records
            ),
            (RelationshipType::Child, ChildRecordMode::Single) => format!(
                "PDF will be generated for ONE specific child {} record matching your filter.",
                related
            ),
        }
    }

    pub fn filter_conditions_json(&self) -> Result<String, serde_json::Error> {
        self.filter_conditions.to_json()
    }
}

mod conditions_json {
    use super::ConditionList;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(list: &ConditionList, serializer: S) -> Result<S::Ok, S::Error> {
        let json = list.to_json().map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&json)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ConditionList, D::Error> {
        let json = Option::<String>::deserialize(deserializer)?;
        Ok(json
            .map(|j| ConditionList::from_json_lossy(&j))
            .unwrap_or_default())
    }
}

mod child_record_limit {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Limit {
        Number(u64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let max = match Limit::deserialize(deserializer)? {
            Limit::Number(n) => n,
            Limit::Text(s) => s.trim().parse::<u64>().map_err(|_| {
                serde::de::Error::custom(format!("invalid maxChildRecords '{}'", s))
            })?,
        };
        Ok(u32::try_from(max).unwrap_or(u32::MAX).max(1))
    }
}
