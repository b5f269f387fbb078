//! Hand-registered builder for tool invocation schemas.
//!
//! Each tool declares its input shape with [`ObjectSchema`]; `to_value`
//! renders the JSON-Schema-like object the chat API expects. A field is
//! listed in `required` exactly when it was added with `field` rather than
//! `optional`, so optionality has a single source of truth.

use serde_json::{Map, Value, json};

#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    String,
    Integer,
    Number,
    Boolean,
    Array(Box<FieldType>),
    Object(ObjectSchema),
}

impl FieldType {
    fn to_value(&self, description: Option<&str>) -> Value {
        let mut value = match self {
            FieldType::String => json!({"type": "string"}),
            FieldType::Integer => json!({"type": "integer"}),
            FieldType::Number => json!({"type": "number"}),
            FieldType::Boolean => json!({"type": "boolean"}),
            FieldType::Array(item) => json!({"type": "array", "items": item.to_value(None)}),
            FieldType::Object(schema) => schema.to_value(),
        };
        if let Some(description) = description
            && let Some(obj) = value.as_object_mut()
        {
            obj.insert("description".into(), Value::String(description.into()));
        }
        value
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Field {
    name: String,
    ty: FieldType,
    description: Option<String>,
    required: bool,
}

/// Ordered set of named fields describing a JSON object. A schema with zero
/// fields renders as empty properties and an empty required list, which is
/// the representation for "no arguments".
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectSchema {
    fields: Vec<Field>,
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a required field.
    pub fn field(
        mut self,
        name: impl Into<String>,
        ty: FieldType,
        description: impl Into<String>,
    ) -> Self {
        self.fields.push(Field {
            name: name.into(),
            ty,
            description: Some(description.into()),
            required: true,
        });
        self
    }

    /// Adds an optional field. Optional fields never appear in `required`.
    pub fn optional(
        mut self,
        name: impl Into<String>,
        ty: FieldType,
        description: impl Into<String>,
    ) -> Self {
        self.fields.push(Field {
            name: name.into(),
            ty,
            description: Some(description.into()),
            required: false,
        });
        self
    }

    pub fn to_value(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for field in &self.fields {
            properties.insert(
                field.name.clone(),
                field.ty.to_value(field.description.as_deref()),
            );
            if field.required {
                required.push(Value::String(field.name.clone()));
            }
        }
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_schema_is_empty_object_shape() {
        let value = ObjectSchema::new().to_value();
        assert_eq!(
            value,
            json!({"type": "object", "properties": {}, "required": []})
        );
    }

    #[test]
    fn optional_fields_are_excluded_from_required() {
        let value = ObjectSchema::new()
            .field("query", FieldType::String, "Search terms")
            .optional("limit", FieldType::Integer, "Max results")
            .to_value();
        assert_eq!(value["required"], json!(["query"]));
        assert_eq!(value["properties"]["limit"]["type"], "integer");
    }

    #[test]
    fn derivation_is_idempotent() {
        let schema = ObjectSchema::new()
            .field("a", FieldType::Number, "First operand")
            .field("b", FieldType::Number, "Second operand")
            .optional("mode", FieldType::String, "Rounding mode");
        let first = serde_json::to_string(&schema.to_value()).unwrap();
        let second = serde_json::to_string(&schema.to_value()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn nested_object_recurses() {
        let inner = ObjectSchema::new().field("lat", FieldType::Number, "Latitude");
        let value = ObjectSchema::new()
            .field("location", FieldType::Object(inner), "Coordinates")
            .to_value();
        assert_eq!(value["properties"]["location"]["type"], "object");
        assert_eq!(
            value["properties"]["location"]["required"],
            json!(["lat"])
        );
    }

    #[test]
    fn array_field_declares_item_type() {
        let value = ObjectSchema::new()
            .field(
                "tags",
                FieldType::Array(Box::new(FieldType::String)),
                "Tag list",
            )
            .to_value();
        assert_eq!(value["properties"]["tags"]["type"], "array");
        assert_eq!(value["properties"]["tags"]["items"]["type"], "string");
    }
}
