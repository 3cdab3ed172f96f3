//! Selection criteria and the pass/fail evaluator.
//!
//! A candidate meets the criteria iff
//! `years_of_experience >= min_experience` AND at least two of the selected
//! skills appear in the candidate's skills. The "two" is fixed, so selecting
//! fewer than two skills can never pass.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::screening::profile::CandidateProfile;

/// The skills a recruiter may require, in display order.
pub const SKILL_OPTIONS: [&str; 6] = ["Python", "SQL", "Power BI", "Tableau", "Deep Learning", "Excel"];

pub const MIN_EXPERIENCE_MAX: i64 = 10;
pub const DEFAULT_MIN_EXPERIENCE: i64 = 1;
/// Matched required skills needed to pass, regardless of how many were selected.
pub const REQUIRED_SKILL_MATCHES: usize = 2;

#[derive(Debug, Error, PartialEq)]
pub enum CriteriaError {
    #[error("min_experience must be between 0 and {MIN_EXPERIENCE_MAX}, got {0}")]
    ExperienceOutOfRange(i64),

    #[error("min_experience must be a whole number, got '{0}'")]
    InvalidExperience(String),

    #[error("unknown skill '{0}'; expected one of: Python, SQL, Power BI, Tableau, Deep Learning, Excel")]
    UnknownSkill(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionCriteria {
    #[serde(default = "default_min_experience")]
    pub min_experience: i64,
    #[serde(default)]
    pub required_skills: Vec<String>,
    /// Accepted and echoed back, but not part of the match decision.
    #[serde(default)]
    pub target_role: Option<String>,
}

fn default_min_experience() -> i64 {
    DEFAULT_MIN_EXPERIENCE
}

impl Default for SelectionCriteria {
    fn default() -> Self {
        Self {
            min_experience: DEFAULT_MIN_EXPERIENCE,
            required_skills: Vec::new(),
            target_role: None,
        }
    }
}

impl SelectionCriteria {
    /// Checks bounds and canonicalizes skills to their option names,
    /// dropping duplicates while keeping the first-seen order.
    pub fn validated(self) -> Result<Self, CriteriaError> {
        check_experience_range(self.min_experience)?;

        let mut required_skills: Vec<String> = Vec::with_capacity(self.required_skills.len());
        for raw in &self.required_skills {
            let canonical = canonical_skill(raw)
                .ok_or_else(|| CriteriaError::UnknownSkill(raw.trim().to_string()))?;
            if !required_skills.iter().any(|s| s == canonical) {
                required_skills.push(canonical.to_string());
            }
        }

        let target_role = self
            .target_role
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());

        Ok(Self {
            min_experience: self.min_experience,
            required_skills,
            target_role,
        })
    }
}

/// Parses a raw experience value from a form field.
pub fn parse_min_experience(raw: &str) -> Result<i64, CriteriaError> {
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| CriteriaError::InvalidExperience(raw.trim().to_string()))?;
    check_experience_range(value)
}

fn check_experience_range(value: i64) -> Result<i64, CriteriaError> {
    if (0..=MIN_EXPERIENCE_MAX).contains(&value) {
        Ok(value)
    } else {
        Err(CriteriaError::ExperienceOutOfRange(value))
    }
}

fn canonical_skill(raw: &str) -> Option<&'static str> {
    let needle = normalize_skill(raw);
    SKILL_OPTIONS
        .iter()
        .copied()
        .find(|option| normalize_skill(option) == needle)
}

/// Lower-cases and removes spaces: "Power BI" and "powerbi" compare equal.
pub fn normalize_skill(skill: &str) -> String {
    skill
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub meets_criteria: bool,
    /// Required skills (display names) found among the candidate's skills.
    pub matched_skills: Vec<String>,
    pub experience_met: bool,
}

pub fn evaluate(profile: &CandidateProfile, criteria: &SelectionCriteria) -> EvaluationResult {
    let candidate_skills: Vec<String> = profile.skills.iter().map(|s| normalize_skill(s)).collect();

    let mut seen: Vec<String> = Vec::new();
    let mut matched_skills = Vec::new();
    for required in &criteria.required_skills {
        let normalized = normalize_skill(required);
        if seen.contains(&normalized) {
            continue;
        }
        if candidate_skills.contains(&normalized) {
            matched_skills.push(required.clone());
        }
        seen.push(normalized);
    }

    let experience_met = profile.years_of_experience >= criteria.min_experience as f64;
    let meets_criteria = experience_met && matched_skills.len() >= REQUIRED_SKILL_MATCHES;

    if let Some(role) = &criteria.target_role {
        debug!("Target role '{role}' supplied; not used in the match decision");
    }
    debug!(
        "Evaluated candidate: experience_met={}, matches={}, meets_criteria={}",
        experience_met,
        matched_skills.len(),
        meets_criteria
    );

    EvaluationResult {
        meets_criteria,
        matched_skills,
        experience_met,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(years: f64, skills: &[&str]) -> CandidateProfile {
        CandidateProfile {
            years_of_experience: years,
            skills: skills.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn criteria(min_experience: i64, skills: &[&str]) -> SelectionCriteria {
        SelectionCriteria {
            min_experience,
            required_skills: skills.iter().map(|s| s.to_string()).collect(),
            target_role: None,
        }
    }

    #[test]
    fn test_two_matches_and_experience_meets() {
        let result = evaluate(
            &profile(3.0, &["python", "excel", "sql"]),
            &criteria(2, &["Python", "SQL"]),
        );
        assert!(result.meets_criteria);
        assert_eq!(result.matched_skills, vec!["Python", "SQL"]);
    }

    #[test]
    fn test_single_selected_skill_never_meets() {
        let result = evaluate(&profile(30.0, &["python", "excel", "sql"]), &criteria(0, &["Python"]));
        assert!(!result.meets_criteria);
        assert!(result.experience_met);
        assert_eq!(result.matched_skills.len(), 1);
    }

    #[test]
    fn test_no_selected_skills_never_meets() {
        let result = evaluate(&profile(10.0, &["python", "sql"]), &criteria(0, &[]));
        assert!(!result.meets_criteria);
        assert!(result.matched_skills.is_empty());
    }

    #[test]
    fn test_missing_years_treated_as_zero() {
        let p = CandidateProfile::from_value(serde_json::json!({"skills": ["Python", "SQL"]})).unwrap();
        assert!(!evaluate(&p, &criteria(1, &["Python", "SQL"])).meets_criteria);
        assert!(evaluate(&p, &criteria(0, &["Python", "SQL"])).meets_criteria);
    }

    #[test]
    fn test_experience_bound_is_inclusive() {
        let result = evaluate(&profile(2.0, &["sql", "tableau"]), &criteria(2, &["SQL", "Tableau"]));
        assert!(result.meets_criteria);
        let result = evaluate(&profile(1.9, &["sql", "tableau"]), &criteria(2, &["SQL", "Tableau"]));
        assert!(!result.meets_criteria);
        assert!(!result.experience_met);
    }

    #[test]
    fn test_space_and_case_insensitive_match() {
        let result = evaluate(
            &profile(5.0, &["POWERBI", "deep learning"]),
            &criteria(1, &["Power BI", "Deep Learning"]),
        );
        assert!(result.meets_criteria);
    }

    #[test]
    fn test_substring_does_not_count_as_match() {
        let result = evaluate(
            &profile(5.0, &["Python scripting", "MySQL"]),
            &criteria(1, &["Python", "SQL"]),
        );
        assert!(!result.meets_criteria);
        assert!(result.matched_skills.is_empty());
    }

    #[test]
    fn test_duplicate_required_skill_counts_once() {
        let result = evaluate(&profile(5.0, &["python"]), &criteria(1, &["Python", "python"]));
        assert!(!result.meets_criteria);
        assert_eq!(result.matched_skills, vec!["Python"]);
    }

    #[test]
    fn test_target_role_does_not_affect_decision() {
        let mut c = criteria(1, &["Python", "SQL"]);
        c.target_role = Some("Astronaut".to_string());
        assert!(evaluate(&profile(3.0, &["python", "sql"]), &c).meets_criteria);
    }

    #[test]
    fn test_validated_canonicalizes_and_dedups() {
        let c = SelectionCriteria {
            min_experience: 4,
            required_skills: vec!["powerbi".into(), " Power BI ".into(), "sql".into()],
            target_role: Some("   ".into()),
        }
        .validated()
        .unwrap();
        assert_eq!(c.required_skills, vec!["Power BI", "SQL"]);
        assert_eq!(c.target_role, None);
    }

    #[test]
    fn test_validated_rejects_unknown_skill() {
        let err = criteria(1, &["Rust"]).validated().unwrap_err();
        assert_eq!(err, CriteriaError::UnknownSkill("Rust".to_string()));
    }

    #[test]
    fn test_validated_rejects_experience_above_ten() {
        let err = criteria(11, &[]).validated().unwrap_err();
        assert_eq!(err, CriteriaError::ExperienceOutOfRange(11));
    }

    #[test]
    fn test_out_of_range_json_experience_reaches_validation() {
        for raw in [-1, 300] {
            let c: SelectionCriteria =
                serde_json::from_value(serde_json::json!({ "min_experience": raw })).unwrap();
            assert_eq!(c.validated().unwrap_err(), CriteriaError::ExperienceOutOfRange(raw));
        }
    }

    #[test]
    fn test_parse_min_experience_bounds() {
        assert_eq!(parse_min_experience("0"), Ok(0));
        assert_eq!(parse_min_experience(" 10 "), Ok(10));
        assert_eq!(parse_min_experience("11"), Err(CriteriaError::ExperienceOutOfRange(11)));
        assert_eq!(parse_min_experience("-2"), Err(CriteriaError::ExperienceOutOfRange(-2)));
        assert_eq!(
            parse_min_experience("three"),
            Err(CriteriaError::InvalidExperience("three".to_string()))
        );
    }

    #[test]
    fn test_default_criteria_matches_form_defaults() {
        let c: SelectionCriteria = serde_json::from_str("{}").unwrap();
        assert_eq!(c, SelectionCriteria::default());
        assert_eq!(c.min_experience, 1);
    }
}
