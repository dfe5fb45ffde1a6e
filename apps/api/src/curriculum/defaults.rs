//! Defaulting pass — fills structurally missing curriculum fields.
//!
//! Only absent keys are filled. Present values are never removed, replaced or
//! coerced, even when they have the wrong type. Nodes that are not objects
//! (or a `courses` value that is not an array) are left untouched, so the pass
//! is idempotent.

use serde_json::{json, Map, Value};

use crate::curriculum::models::{
    DEFAULT_DOMAIN, DEFAULT_INDUSTRY_FOCUS, DEFAULT_LEVEL, DEFAULT_SEMESTERS,
    DEFAULT_WEEKLY_HOURS,
};

pub const DEFAULT_SEMESTER_NUMBER: i64 = 1;
pub const DEFAULT_COURSE_NAME: &str = "Unnamed Course";
pub const DEFAULT_COURSE_TYPE: &str = "theory";
pub const DEFAULT_COURSE_HOURS: i64 = 0;

/// The curriculum produced when generation fails outright.
pub fn empty_curriculum() -> Value {
    apply_defaults(json!({"curriculum": {}}))
}

/// Ensures every field of the curriculum data model exists.
pub fn apply_defaults(mut document: Value) -> Value {
    let Some(root) = document.as_object_mut() else {
        return document;
    };

    let curriculum = root
        .entry("curriculum")
        .or_insert_with(|| Value::Object(Map::new()));
    let Some(curriculum) = curriculum.as_object_mut() else {
        return document;
    };

    set_default(curriculum, "domain", json!(DEFAULT_DOMAIN));
    set_default(curriculum, "level", json!(DEFAULT_LEVEL));
    set_default(curriculum, "industryOrientation", json!(DEFAULT_INDUSTRY_FOCUS));
    set_default(curriculum, "semesters", json!(DEFAULT_SEMESTERS));
    set_default(curriculum, "weeklyHours", json!(DEFAULT_WEEKLY_HOURS));
    set_default(curriculum, "courses", json!([]));

    for block in objects_in(curriculum.get_mut("courses")) {
        set_default(block, "semester", json!(DEFAULT_SEMESTER_NUMBER));
        set_default(block, "courses", json!([]));

        for course in objects_in(block.get_mut("courses")) {
            set_default(course, "name", json!(DEFAULT_COURSE_NAME));
            set_default(course, "type", json!(DEFAULT_COURSE_TYPE));
            set_default(course, "hoursPerWeek", json!(DEFAULT_COURSE_HOURS));
            set_default(course, "description", json!(""));
        }
    }

    document
}

fn set_default(object: &mut Map<String, Value>, key: &str, default: Value) {
    object.entry(key).or_insert(default);
}

/// Mutable object elements of `value` when it is an array; nothing otherwise.
fn objects_in(value: Option<&mut Value>) -> impl Iterator<Item = &mut Map<String, Value>> {
    value
        .and_then(Value::as_array_mut)
        .into_iter()
        .flat_map(|items| items.iter_mut())
        .filter_map(Value::as_object_mut)
}
