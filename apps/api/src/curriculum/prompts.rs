// Prompt constants and builders for curriculum generation.

use crate::curriculum::models::CurriculumParams;

/// System-role instruction for the hosted provider.
pub const HOSTED_SYSTEM: &str = "You are an expert academic curriculum designer.";

/// Hosted user prompt. Replace: {domain}, {level}, {semesters}, {hours}, {focus}
pub const HOSTED_PROMPT_TEMPLATE: &str = r#"Generate a complete B.Tech curriculum.

Skill Domain: {domain}
Level: {level}
Semesters: {semesters}
Weekly Hours: {hours}
Industry Focus: {focus}

Distribute courses logically across semesters.
Include theory, practical and lab subjects.
Return only valid JSON."#;

/// Single-shot prompt for the local model, which has no schema enforcement and
/// therefore carries the target structure inline.
/// Replace: {{skill}}, {{level}}, {{semesters}}, {{hours}}, {{focus}}
pub const LOCAL_PROMPT_TEMPLATE: &str = r#"You are an academic curriculum designer.

Generate a structured B.Tech curriculum in JSON format ONLY.

IMPORTANT:
- Return ONLY valid JSON.
- Do NOT include explanations.
- Do NOT include markdown.
- Do NOT include extra text.
- Follow the exact structure below.

JSON Structure Required:

{
  "curriculum": {
    "domain": "<skill domain>",
    "level": "<education level>",
    "industryOrientation": "<industry focus>",
    "semesters": <number>,
    "weeklyHours": <number>,
    "courses": [
      {
        "semester": 1,
        "courses": [
          {
            "name": "<course name>",
            "type": "theory/practical/lab",
            "hoursPerWeek": <number>,
            "description": ""
          }
        ]
      }
    ]
  }
}

Guidelines:
- Distribute courses evenly across semesters.
- Ensure weekly hours per semester do not exceed the provided weeklyHours.
- Include 4–6 courses per semester.
- Mix theory, practical, and lab courses.
- Keep descriptions empty ("").
- Ensure JSON is syntactically valid.

Inputs:
Skill Domain: {{skill}}
Education Level: {{level}}
Total Semesters: {{semesters}}
Weekly Hours: {{hours}}
Industry Focus: {{focus}}"#;

pub fn build_hosted_prompt(params: &CurriculumParams) -> String {
    let semesters = params.semesters.to_string();
    let hours = params.weekly_hours.to_string();
    fill_template(
        HOSTED_PROMPT_TEMPLATE,
        &[
            ("{domain}", params.domain.as_str()),
            ("{level}", params.level.as_str()),
            ("{semesters}", semesters.as_str()),
            ("{hours}", hours.as_str()),
            ("{focus}", params.industry_focus.as_str()),
        ],
    )
}

pub fn build_local_prompt(params: &CurriculumParams) -> String {
    let semesters = params.semesters.to_string();
    let hours = params.weekly_hours.to_string();
    fill_template(
        LOCAL_PROMPT_TEMPLATE,
        &[
            ("{{skill}}", params.domain.as_str()),
            ("{{level}}", params.level.as_str()),
            ("{{semesters}}", semesters.as_str()),
            ("{{hours}}", hours.as_str()),
            ("{{focus}}", params.industry_focus.as_str()),
        ],
    )
}

/// Replaces placeholders in one left-to-right scan of `template`.
/// Substituted values are copied verbatim and never rescanned.
fn fill_template(template: &str, substitutions: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while !rest.is_empty() {
        match substitutions
            .iter()
            .find(|(placeholder, _)| rest.starts_with(placeholder))
        {
            Some((placeholder, value)) => {
                out.push_str(value);
                rest = &rest[placeholder.len()..];
            }
            None => {
                let mut chars = rest.chars();
                if let Some(c) = chars.next() {
                    out.push(c);
                }
                rest = chars.as_str();
            }
        }
    }

    out
}
