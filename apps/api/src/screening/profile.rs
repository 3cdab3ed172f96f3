//! Candidate profile produced by the AI step.
//!
//! Model output is loosely typed. Every field is resolved once, here, into a
//! concrete default-valued type so downstream code never re-checks for
//! missing or mistyped values.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Shown in place of an empty summary or recommendation.
pub const PLACEHOLDER: &str = "---";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    #[serde(default, deserialize_with = "lenient_string")]
    pub candidate_name: String,
    #[serde(
        default,
        deserialize_with = "lenient_years",
        serialize_with = "compact_number"
    )]
    pub years_of_experience: f64,
    #[serde(default, deserialize_with = "lenient_skills")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub current_role: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub education: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub summary: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub recommendation: String,
    /// Fields the model returned beyond the schema. Forwarded untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CandidateProfile {
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn summary_or_placeholder(&self) -> &str {
        non_empty_or_placeholder(&self.summary)
    }

    pub fn recommendation_or_placeholder(&self) -> &str {
        non_empty_or_placeholder(&self.recommendation)
    }
}

fn non_empty_or_placeholder(value: &str) -> &str {
    if value.trim().is_empty() {
        PLACEHOLDER
    } else {
        value
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Lenient field deserializers
// ────────────────────────────────────────────────────────────────────────────

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Array(items) => items
            .iter()
            .filter_map(scalar_to_string)
            .collect::<Vec<_>>()
            .join(", "),
        other => scalar_to_string(&other).unwrap_or_else(|| other.to_string()),
    })
}

fn lenient_years<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => leading_number(&s).unwrap_or(0.0),
        _ => 0.0,
    })
}

fn lenient_skills<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let skills = match Value::deserialize(deserializer)? {
        Value::Array(items) => items.iter().filter_map(scalar_to_string).collect(),
        Value::String(s) => s.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    };
    Ok(skills
        .into_iter()
        .map(|s: String| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// First decimal number appearing in free text ("5+ years", "about 3.5").
fn leading_number(text: &str) -> Option<f64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let rest = &text[start..];
    let end = rest
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(rest.len());
    rest[..end].trim_end_matches('.').parse().ok()
}

/// Whole numbers go out as integers so `5` is not forwarded as `5.0`.
fn compact_number<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_profile_deserializes() {
        let profile = CandidateProfile::from_value(json!({
            "candidate_name": "Jane Doe",
            "years_of_experience": 4.5,
            "skills": ["Python", "SQL", "Power BI"],
            "current_role": "Data Analyst",
            "education": "BSc Statistics",
            "email": "jane@example.com",
            "summary": "Analyst with BI focus.",
            "recommendation": "Interview."
        }))
        .unwrap();

        assert_eq!(profile.candidate_name, "Jane Doe");
        assert_eq!(profile.years_of_experience, 4.5);
        assert_eq!(profile.skills, vec!["Python", "SQL", "Power BI"]);
        assert_eq!(profile.email, "jane@example.com");
        assert!(profile.extra.is_empty());
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let profile = CandidateProfile::from_value(json!({})).unwrap();
        assert_eq!(profile, CandidateProfile::default());
        assert_eq!(profile.years_of_experience, 0.0);
        assert_eq!(profile.summary_or_placeholder(), PLACEHOLDER);
        assert_eq!(profile.recommendation_or_placeholder(), PLACEHOLDER);
    }

    #[test]
    fn test_years_from_string() {
        for (raw, expected) in [("5", 5.0), ("3.5 years", 3.5), ("5+ years", 5.0), ("about 2", 2.0)] {
            let profile = CandidateProfile::from_value(json!({ "years_of_experience": raw })).unwrap();
            assert_eq!(profile.years_of_experience, expected, "input {raw}");
        }
    }

    #[test]
    fn test_unparsable_years_is_zero() {
        let profile =
            CandidateProfile::from_value(json!({ "years_of_experience": "not stated" })).unwrap();
        assert_eq!(profile.years_of_experience, 0.0);
        let profile = CandidateProfile::from_value(json!({ "years_of_experience": null })).unwrap();
        assert_eq!(profile.years_of_experience, 0.0);
    }

    #[test]
    fn test_skills_as_comma_string() {
        let profile =
            CandidateProfile::from_value(json!({ "skills": "Python, SQL ,, Excel" })).unwrap();
        assert_eq!(profile.skills, vec!["Python", "SQL", "Excel"]);
    }

    #[test]
    fn test_non_string_skills_dropped_or_stringified() {
        let profile =
            CandidateProfile::from_value(json!({ "skills": ["Python", null, {"x": 1}, 3] }))
                .unwrap();
        assert_eq!(profile.skills, vec!["Python", "3"]);
    }

    #[test]
    fn test_education_list_joined() {
        let profile =
            CandidateProfile::from_value(json!({ "education": ["BSc CS", "MSc AI"] })).unwrap();
        assert_eq!(profile.education, "BSc CS, MSc AI");
    }

    #[test]
    fn test_extra_fields_preserved_on_serialize() {
        let profile = CandidateProfile::from_value(json!({
            "candidate_name": "A",
            "years_of_experience": 3,
            "linkedin": "https://linkedin.com/in/a"
        }))
        .unwrap();

        let out = serde_json::to_value(&profile).unwrap();
        assert_eq!(out["linkedin"], "https://linkedin.com/in/a");
        assert_eq!(out["years_of_experience"], json!(3));
        assert_eq!(out["candidate_name"], "A");
    }

    #[test]
    fn test_fractional_years_serialized_as_float() {
        let profile = CandidateProfile {
            years_of_experience: 2.5,
            ..Default::default()
        };
        let out = serde_json::to_value(&profile).unwrap();
        assert_eq!(out["years_of_experience"], json!(2.5));
    }
}
