// Résumé parsing prompt template.
// The schema block mirrors `CandidateProfile`; keep the two in sync.

use crate::llm_client::prompts::{GROUNDING_RULES, JSON_ONLY_RULE};

pub const PROFILE_PARSE_PROMPT: &str = r#"
You are an AI Resume Parser and Analyzer.
Read the following résumé and return output strictly in JSON format with this schema:

{
  "candidate_name": "string",
  "years_of_experience": "float or int",
  "skills": ["list", "of", "skills"],
  "current_role": "string",
  "education": "string",
  "email": "string",
  "summary": "string (short professional summary)",
  "recommendation": "string (AI-generated recommendation paragraph)"
}

Resume Text:
"""{raw_text}"""

Rules:
{rules}
"#;

/// Embeds the extracted résumé text (possibly empty) in the fixed template.
pub fn build_profile_prompt(raw_text: &str) -> String {
    let rules = format!("{GROUNDING_RULES}\n{JSON_ONLY_RULE}");
    PROFILE_PARSE_PROMPT
        .replace("{rules}", &rules)
        .replacen("{raw_text}", raw_text, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELDS: [&str; 8] = [
        "candidate_name",
        "years_of_experience",
        "skills",
        "current_role",
        "education",
        "email",
        "summary",
        "recommendation",
    ];

    #[test]
    fn test_prompt_embeds_text_between_quotes() {
        let prompt = build_profile_prompt("Jane Doe, 5 years Python");
        assert!(prompt.contains("\"\"\"Jane Doe, 5 years Python\"\"\""));
    }

    #[test]
    fn test_prompt_lists_all_schema_fields() {
        let prompt = build_profile_prompt("");
        for field in FIELDS {
            assert!(prompt.contains(&format!("\"{field}\"")), "missing {field}");
        }
    }

    #[test]
    fn test_prompt_carries_rules() {
        let prompt = build_profile_prompt("x");
        assert!(prompt.contains("Do not invent any details."));
        assert!(prompt.contains("pure JSON"));
        assert!(!prompt.contains("{rules}"));
    }

    #[test]
    fn test_placeholder_inside_resume_text_is_left_alone() {
        let prompt = build_profile_prompt("literal {rules} and {raw_text}");
        assert!(prompt.contains("literal {rules} and {raw_text}"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        assert_eq!(build_profile_prompt("abc"), build_profile_prompt("abc"));
    }
}
