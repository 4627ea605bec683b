//! JSON Schema builders for tool input schemas

use serde_json::{Value, json};

/// Create a JSON Schema object type
///
/// # Arguments
///
/// * `properties` - Map of property names to their schemas
/// * `required` - List of required property names
///
/// # Example
///
/// ```
/// use yfin_tools::schema::{object, string};
/// use serde_json::json;
///
/// let schema = object(
///     json!({ "ticker": string(Some("Stock ticker")) }),
///     &["ticker"],
/// );
/// assert_eq!(schema["required"][0], "ticker");
/// ```
pub fn object(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Create a JSON Schema string type
pub fn string(description: Option<&str>) -> Value {
    if let Some(d) = description {
        json!({
            "type": "string",
            "description": d,
        })
    } else {
        json!({"type": "string"})
    }
}

/// Create a JSON Schema array type
///
/// # Arguments
///
/// * `items` - Schema for array items
/// * `description` - Optional description of the array field
pub fn array(items: Value, description: Option<&str>) -> Value {
    if let Some(d) = description {
        json!({
            "type": "array",
            "items": items,
            "description": d,
        })
    } else {
        json!({
            "type": "array",
            "items": items,
        })
    }
}

/// Create an enum schema (string with allowed values)
pub fn enum_string(values: &[&str], description: Option<&str>) -> Value {
    if let Some(d) = description {
        json!({
            "type": "string",
            "enum": values,
            "description": d,
        })
    } else {
        json!({
            "type": "string",
            "enum": values,
        })
    }
}
