use crate::metadata::RelationshipDescriptor;
use serde::{Deserialize, Serialize};

/// Whether a child relationship attaches one matching record or all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ChildRecordMode {
    Single,
    #[default]
    All,
}

impl ChildRecordMode {
    pub fn label(self) -> &'static str {
        match self {
            ChildRecordMode::Single => "Single Specific Child",
            ChildRecordMode::All => "All Children",
        }
    }
}

/// Renders the query that would select the related records.
///
/// ```text
/// SELECT Id FROM Payment__c
/// WHERE Booking__c = :recordId
///   AND Status__c = 'Paid'
/// LIMIT 1
/// ```
///
/// The filter clause only applies in `Single` mode. Exactly one LIMIT line is
/// emitted. Without a descriptor there is nothing to preview.
pub fn compose_query_preview(
    descriptor: Option<&RelationshipDescriptor>,
    mode: ChildRecordMode,
    clause: &str,
    max_records: u32,
) -> String {
    let Some(rel) = descriptor else {
        return String::new();
    };

    let mut lines = vec![
        format!("SELECT Id FROM {}", rel.related_object_api),
        format!("WHERE {} = :recordId", rel.relationship_name),
    ];
    match mode {
        ChildRecordMode::Single => {
            if !clause.is_empty() {
                lines.push(format!("  AND {}", clause));
            }
            lines.push("LIMIT 1".to_string());
        }
        ChildRecordMode::All => lines.push(format!("LIMIT {}", max_records)),
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::RelationshipType;
    use pretty_assertions::assert_eq;

    fn payments() -> RelationshipDescriptor {
        RelationshipDescriptor {
            related_object_api: "Payment__c".to_string(),
            relationship_name: "Booking__c".to_string(),
            relationship_type: RelationshipType::Child,
        }
    }

    #[test]
    fn all_mode_ignores_the_clause() {
        assert_eq!(
            compose_query_preview(Some(&payments()), ChildRecordMode::All, "X = 1", 25),
            "SELECT Id FROM Payment__c\nWHERE Booking__c = :recordId\nLIMIT 25"
        );
    }

    #[test]
    fn single_mode_adds_the_clause_and_limit_one() {
        assert_eq!(
            compose_query_preview(
                Some(&payments()),
                ChildRecordMode::Single,
                "Status__c = 'Paid'",
                10
            ),
            "SELECT Id FROM Payment__c\nWHERE Booking__c = :recordId\n  AND Status__c = 'Paid'\nLIMIT 1"
        );
    }

    #[test]
    fn single_mode_without_clause_still_limits() {
        assert_eq!(
            compose_query_preview(Some(&payments()), ChildRecordMode::Single, "", 10),
            "SELECT Id FROM Payment__c\nWHERE Booking__c = :recordId\nLIMIT 1"
        );
    }

    #[test]
    fn no_descriptor_means_no_preview() {
        assert_eq!(compose_query_preview(None, ChildRecordMode::All, "", 10), "");
    }
}
