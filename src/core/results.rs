//! Purpose: Outcome objects for create, update, and delete calls.
//! Exports: `CreateResult`, `UpdateResult`, `DeleteResult`.
//! Role: Built by the caster from each element of `creates`/`updates`/`deletes`.
//! Invariants: Keys absent from the server object stay unset (`None`), never defaulted.
use super::record::FromAttributes;
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CreateResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    success: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct UpdateResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    success: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DeleteResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    success: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<Value>,
}

fn read_success(attributes: &Map<String, Value>) -> Option<bool> {
    attributes.get("success").map(truthy)
}

fn read_error(attributes: &Map<String, Value>) -> Option<Value> {
    attributes.get("error").filter(|value| !value.is_null()).cloned()
}

// The server is loose with booleans ("1", 1, true); follow its truthiness.
pub(crate) fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty() && text != "0",
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

macro_rules! outcome_accessors {
    ($name:ident) => {
        impl $name {
            /// `None` when the server did not report an outcome for this item.
            pub fn success(&self) -> Option<bool> {
                self.success
            }

            pub fn is_success(&self) -> bool {
                self.success == Some(true)
            }

            pub fn error(&self) -> Option<&Value> {
                self.error.as_ref()
            }
        }
    };
}

outcome_accessors!(CreateResult);
outcome_accessors!(UpdateResult);
outcome_accessors!(DeleteResult);

impl CreateResult {
    /// Identifier of the newly created record.
    pub fn id(&self) -> Option<&Value> {
        self.id.as_ref()
    }

    pub fn id_u64(&self) -> Option<u64> {
        match self.id.as_ref()? {
            Value::Number(number) => number.as_u64(),
            Value::String(text) => text.parse().ok(),
            _ => None,
        }
    }
}

impl FromAttributes for CreateResult {
    fn from_attributes(attributes: Map<String, Value>) -> Self {
        Self {
            success: read_success(&attributes),
            error: read_error(&attributes),
            id: attributes.get("id").filter(|value| !value.is_null()).cloned(),
        }
    }
}

impl FromAttributes for UpdateResult {
    fn from_attributes(attributes: Map<String, Value>) -> Self {
        Self {
            success: read_success(&attributes),
            error: read_error(&attributes),
        }
    }
}

impl FromAttributes for DeleteResult {
    fn from_attributes(attributes: Map<String, Value>) -> Self {
        Self {
            success: read_success(&attributes),
            error: read_error(&attributes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CreateResult, DeleteResult, UpdateResult};
    use crate::core::record::FromAttributes;
    use serde_json::{Map, Value, json};

    fn attrs(value: Value) -> Map<String, Value> {
        serde_json::from_value(value).expect("object")
    }

    #[test]
    fn absent_keys_stay_unknown() {
        let result = UpdateResult::from_attributes(Map::new());
        assert_eq!(result.success(), None);
        assert!(!result.is_success());
        assert_eq!(result.error(), None);
    }

    #[test]
    fn create_result_reads_id_and_success() {
        let result = CreateResult::from_attributes(attrs(json!({"success": true, "id": 7})));
        assert_eq!(result.success(), Some(true));
        assert_eq!(result.id(), Some(&json!(7)));
        assert_eq!(result.id_u64(), Some(7));
    }

    #[test]
    fn string_ids_parse_as_numbers() {
        let result = CreateResult::from_attributes(attrs(json!({"id": "512"})));
        assert_eq!(result.id_u64(), Some(512));
    }

    #[test]
    fn serialize_skips_unknown_outcomes() {
        let result = CreateResult::from_attributes(attrs(json!({"success": 1, "id": 4})));
        let value = serde_json::to_value(&result).expect("serialize");
        assert_eq!(value, json!({"success": true, "id": 4}));
    }

    #[test]
    fn failed_delete_keeps_error_object() {
        let result = DeleteResult::from_attributes(attrs(json!({
            "success": "0",
            "error": {"code": 301, "message": "Entry not found"}
        })));
        assert_eq!(result.success(), Some(false));
        assert_eq!(result.error().and_then(|e| e.get("code")), Some(&json!(301)));
    }
}
