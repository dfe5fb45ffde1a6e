//! Best-effort cleanup of free-text model output into a JSON object string.
//!
//! This is a text heuristic, not a parser. Known limitations:
//! - `//` inside string literals (e.g. URLs) is treated as a comment start.
//! - Braces inside string literals take part in the outermost-brace extraction.
//!
//! The result may still fail to parse; callers must handle that.

use std::sync::LazyLock;

use regex::Regex;

static FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```json|```").expect("fence pattern is valid"));

static LINE_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"//.*").expect("comment pattern is valid"));

// A run of commas (`,,}`) is dropped in one pass so a second pass is a no-op.
static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:,\s*)+([\]}])").expect("trailing comma pattern is valid"));

static OUTER_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("object pattern is valid"));

/// Strips fences, `//` comments and trailing commas, then extracts the span
/// from the first `{` to the last `}`. Without braces, returns the cleaned text.
pub fn clean_model_json(raw: &str) -> String {
    let text = FENCE.replace_all(raw, "");
    let text = LINE_COMMENT.replace_all(&text, "");
    let text = TRAILING_COMMA.replace_all(&text, "$1");

    match OUTER_OBJECT.find(&text) {
        Some(m) => m.as_str().trim().to_string(),
        None => text.trim().to_string(),
    }
}
