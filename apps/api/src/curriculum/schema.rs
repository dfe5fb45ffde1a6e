//! Structured-output schema handed to the hosted provider.
//!
//! Every object is closed (`additionalProperties: false`) and lists all of its
//! properties as required, which strict mode demands. Schema enforcement is
//! what lets the hosted path skip the text repair used for the local model.

use serde_json::{json, Value};

pub const SCHEMA_NAME: &str = "curriculum";
pub const COURSE_TYPES: [&str; 3] = ["theory", "practical", "lab"];

fn course_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "name": {"type": "string"},
            "type": {"type": "string", "enum": COURSE_TYPES},
            "hoursPerWeek": {"type": "integer"},
            "description": {"type": "string"}
        },
        "required": ["name", "type", "hoursPerWeek", "description"],
        "additionalProperties": false
    })
}

fn semester_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "semester": {"type": "integer"},
            "courses": {"type": "array", "items": course_schema()}
        },
        "required": ["semester", "courses"],
        "additionalProperties": false
    })
}

/// The `text.format` value for a schema-constrained Responses API call.
pub fn curriculum_format() -> Value {
    json!({
        "type": "json_schema",
        "name": SCHEMA_NAME,
        "strict": true,
        "schema": {
            "type": "object",
            "properties": {
                "curriculum": {
                    "type": "object",
                    "properties": {
                        "domain": {"type": "string"},
                        "level": {"type": "string"},
                        "industryOrientation": {"type": "string"},
                        "semesters": {"type": "integer"},
                        "weeklyHours": {"type": "integer"},
                        "courses": {"type": "array", "items": semester_schema()}
                    },
                    "required": [
                        "domain",
                        "level",
                        "industryOrientation",
                        "semesters",
                        "weeklyHours",
                        "courses"
                    ],
                    "additionalProperties": false
                }
            },
            "required": ["curriculum"],
            "additionalProperties": false
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Walks every `"type": "object"` node of the schema.
    fn objects(node: &Value, out: &mut Vec<Value>) {
        if node.get("type") == Some(&json!("object")) {
            out.push(node.clone());
        }
        match node {
            Value::Object(map) => map.values().for_each(|v| objects(v, out)),
            Value::Array(items) => items.iter().for_each(|v| objects(v, out)),
            _ => {}
        }
    }

    #[test]
    fn test_format_envelope() {
        let format = curriculum_format();
        assert_eq!(format["type"], "json_schema");
        assert_eq!(format["name"], "curriculum");
        assert_eq!(format["strict"], true);
    }

    #[test]
    fn test_every_object_is_closed_and_fully_required() {
        let mut found = Vec::new();
        objects(&curriculum_format()["schema"], &mut found);
        assert_eq!(found.len(), 4, "root, curriculum, semester, course");

        for object in found {
            assert_eq!(object["additionalProperties"], false);
            let mut properties: Vec<&str> = object["properties"]
                .as_object()
                .unwrap()
                .keys()
                .map(String::as_str)
                .collect();
            let mut required: Vec<&str> = object["required"]
                .as_array()
                .unwrap()
                .iter()
                .map(|v| v.as_str().unwrap())
                .collect();
            properties.sort();
            required.sort();
            assert_eq!(properties, required);
        }
    }

    #[test]
    fn test_course_type_enum() {
        let format = curriculum_format();
        let course = &format["schema"]["properties"]["curriculum"]["properties"]["courses"]
            ["items"]["properties"]["courses"]["items"];
        assert_eq!(
            course["properties"]["type"]["enum"],
            json!(["theory", "practical", "lab"])
        );
    }
}
