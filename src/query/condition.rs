use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

const ID_PREFIX: &str = "id_";
const ID_LENGTH: usize = 9;

/// Operators available in the filter-condition builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum FilterOperator {
    #[default]
    #[serde(rename = "=")]
    Equals,
    #[serde(rename = "!=")]
    NotEquals,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = "<=")]
    LessOrEqual,
    #[serde(rename = "LIKE")]
    Contains,
    #[serde(rename = "STARTS_WITH")]
    StartsWith,
}

impl FilterOperator {
    pub const ALL: [FilterOperator; 8] = [
        FilterOperator::Equals,
        FilterOperator::NotEquals,
        FilterOperator::GreaterThan,
        FilterOperator::LessThan,
        FilterOperator::GreaterOrEqual,
        FilterOperator::LessOrEqual,
        FilterOperator::Contains,
        FilterOperator::StartsWith,
    ];

    /// The value stored in persisted conditions.
    pub fn code(self) -> &'static str {
        match self {
            FilterOperator::Equals => "=",
            FilterOperator::NotEquals => "!=",
            FilterOperator::GreaterThan => ">",
            FilterOperator::LessThan => "<",
            FilterOperator::GreaterOrEqual => ">=",
            FilterOperator::LessOrEqual => "<=",
            FilterOperator::Contains => "LIKE",
            FilterOperator::StartsWith => "STARTS_WITH",
        }
    }

    /// The operator as written in the WHERE clause.
    pub fn clause_operator(self) -> &'static str {
        match self {
            FilterOperator::StartsWith => "LIKE",
            other => other.code(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FilterOperator::Equals => "Equals (=)",
            FilterOperator::NotEquals => "Not Equals (!=)",
            FilterOperator::GreaterThan => "Greater Than (>)",
            FilterOperator::LessThan => "Less Than (<)",
            FilterOperator::GreaterOrEqual => "Greater or Equal (>=)",
            FilterOperator::LessOrEqual => "Less or Equal (<=)",
            FilterOperator::Contains => "Contains (LIKE)",
            FilterOperator::StartsWith => "Starts With",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.code() == code)
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCondition {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub operator: FilterOperator,
    #[serde(default)]
    pub value: String,
}

impl FilterCondition {
    pub fn new(id: &str, field: &str, operator: FilterOperator, value: &str) -> Self {
        Self {
            id: id.to_string(),
            field: field.to_string(),
            operator,
            value: value.to_string(),
        }
    }

    /// A condition contributes to the clause only when field and value are both filled in.
    pub fn is_valid(&self) -> bool {
        !self.field.trim().is_empty() && !self.value.trim().is_empty()
    }
}

/// An ordered list of filter conditions. Edits return a new list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConditionList {
    conditions: Vec<FilterCondition>,
}

impl ConditionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_conditions(conditions: Vec<FilterCondition>) -> Self {
        Self { conditions }
    }

    /// Loads the persisted JSON array. Invalid JSON yields an empty list.
    pub fn from_json_lossy(json: &str) -> Self {
        if json.trim().is_empty() {
            return Self::new();
        }
        match serde_json::from_str::<Vec<FilterCondition>>(json) {
            Ok(conditions) => {
                let mut list = Self::new();
                for mut condition in conditions {
                    if condition.id.is_empty() || list.contains_id(&condition.id) {
                        condition.id = list.fresh_id();
                    }
                    list.conditions.push(condition);
                }
                list
            }
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable filter conditions");
                Self::new()
            }
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.conditions)
    }

    pub fn conditions(&self) -> &[FilterCondition] {
        &self.conditions
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&FilterCondition> {
        self.conditions.iter().find(|c| c.id == id)
    }

    /// Appends a blank `=` condition with a new id.
    pub fn with_added(&self) -> Self {
        let mut conditions = self.conditions.clone();
        conditions.push(FilterCondition::new(
            &self.fresh_id(),
            "",
            FilterOperator::Equals,
            "",
        ));
        Self { conditions }
    }

    pub fn with_field(&self, id: &str, field: &str) -> Self {
        self.updated(id, |c| c.field = field.to_string())
    }

    pub fn with_operator(&self, id: &str, operator: FilterOperator) -> Self {
        self.updated(id, |c| c.operator = operator)
    }

    pub fn with_value(&self, id: &str, value: &str) -> Self {
        self.updated(id, |c| c.value = value.to_string())
    }

    pub fn without(&self, id: &str) -> Self {
        Self {
            conditions: self
                .conditions
                .iter()
                .filter(|c| c.id != id)
                .cloned()
                .collect(),
        }
    }

    fn updated(&self, id: &str, edit: impl Fn(&mut FilterCondition)) -> Self {
        Self {
            conditions: self
                .conditions
                .iter()
                .cloned()
                .map(|mut c| {
                    if c.id == id {
                        edit(&mut c);
                    }
                    c
                })
                .collect(),
        }
    }

    fn contains_id(&self, id: &str) -> bool {
        self.conditions.iter().any(|c| c.id == id)
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = new_condition_id();
            if !self.contains_id(&id) {
                return id;
            }
        }
    }
}

/// A random condition id such as `id_3f9a0c2b1`.
pub fn new_condition_id() -> String {
    let token = Uuid::new_v4().simple().to_string();
    format!("{}{}", ID_PREFIX, &token[..ID_LENGTH])
}
