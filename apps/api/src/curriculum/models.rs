//! Request and curriculum data models.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::errors::AppError;

pub const DEFAULT_DOMAIN: &str = "General";
pub const DEFAULT_LEVEL: &str = "B.Tech";
pub const DEFAULT_INDUSTRY_FOCUS: &str = "General";
pub const DEFAULT_SEMESTERS: i64 = 8;
pub const DEFAULT_WEEKLY_HOURS: i64 = 30;

// ────────────────────────────────────────────────────────────────────────────
// Request
// ────────────────────────────────────────────────────────────────────────────

/// Body of `POST /api/generate`. Every field is optional.
///
/// The HTML form posts numbers as strings, so `semesters` and `hours` are kept
/// as raw JSON here and coerced in [`CurriculumRequest::resolve`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurriculumRequest {
    pub skill: Option<String>,
    pub level: Option<String>,
    #[serde(default, deserialize_with = "nullable_value")]
    pub semesters: Option<Value>,
    #[serde(default, deserialize_with = "nullable_value")]
    pub hours: Option<Value>,
    pub focus: Option<String>,
}

/// Keeps an explicit `null` distinguishable from "absent" (serde would fold
/// both into `None` for `Option<Value>`); `null` is then rejected by coercion.
fn nullable_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Fully resolved generation parameters. Both backends consume this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurriculumParams {
    pub domain: String,
    pub level: String,
    pub semesters: i64,
    pub weekly_hours: i64,
    pub industry_focus: String,
}

impl Default for CurriculumParams {
    fn default() -> Self {
        Self {
            domain: DEFAULT_DOMAIN.to_string(),
            level: DEFAULT_LEVEL.to_string(),
            semesters: DEFAULT_SEMESTERS,
            weekly_hours: DEFAULT_WEEKLY_HOURS,
            industry_focus: DEFAULT_INDUSTRY_FOCUS.to_string(),
        }
    }
}

impl CurriculumRequest {
    /// Substitutes the documented default for each absent field independently.
    pub fn resolve(self) -> Result<CurriculumParams, AppError> {
        let defaults = CurriculumParams::default();
        Ok(CurriculumParams {
            domain: self.skill.unwrap_or(defaults.domain),
            level: self.level.unwrap_or(defaults.level),
            semesters: coerce_int("semesters", self.semesters)?.unwrap_or(defaults.semesters),
            weekly_hours: coerce_int("hours", self.hours)?.unwrap_or(defaults.weekly_hours),
            industry_focus: self.focus.unwrap_or(defaults.industry_focus),
        })
    }
}

/// Accepts an integer, an integral float, or a string holding an integer.
fn coerce_int(field: &str, value: Option<Value>) -> Result<Option<i64>, AppError> {
    let Some(value) = value else {
        return Ok(None);
    };

    let parsed = match &value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    parsed
        .map(Some)
        .ok_or_else(|| AppError::Validation(format!("{field} must be an integer, got {value}")))
}

// ────────────────────────────────────────────────────────────────────────────
// Curriculum
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseType {
    Theory,
    Practical,
    Lab,
}

impl CourseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseType::Theory => "theory",
            CourseType::Practical => "practical",
            CourseType::Lab => "lab",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub course_type: CourseType,
    pub hours_per_week: i64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemesterBlock {
    pub semester: i64,
    pub courses: Vec<CourseEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Curriculum {
    pub domain: String,
    pub level: String,
    pub industry_orientation: String,
    pub semesters: i64,
    pub weekly_hours: i64,
    pub courses: Vec<SemesterBlock>,
}

/// The `{"curriculum": {...}}` wrapper every generator returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurriculumEnvelope {
    pub curriculum: Curriculum,
}

impl SemesterBlock {
    /// Summed weekly hours, saturating at `i64::MAX` for oversized model output.
    pub fn total_hours(&self) -> i64 {
        self.courses
            .iter()
            .fold(0i64, |acc, c| acc.saturating_add(c.hours_per_week))
    }
}

impl Curriculum {
    /// Semesters whose summed weekly course hours exceed `weekly_hours`.
    pub fn semesters_over_budget(&self) -> Vec<(i64, i64)> {
        self.courses
            .iter()
            .filter(|block| block.total_hours() > self.weekly_hours)
            .map(|block| (block.semester, block.total_hours()))
            .collect()
    }
}
