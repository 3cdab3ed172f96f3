//! Screening pipeline: extract → prompt → AI → parse → evaluate.
//!
//! Strictly linear. Each stage's user-facing messages are collected as
//! notices and returned with the result.

use anyhow::anyhow;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::llm_client::{LlmClient, RetryPolicy, TextSource};
use crate::models::notice::Notice;
use crate::screening::criteria::{evaluate, EvaluationResult, SelectionCriteria};
use crate::screening::extractor::{extract_text, UploadedDocument};
use crate::screening::parser::parse_json_object;
use crate::screening::profile::CandidateProfile;
use crate::screening::prompts::build_profile_prompt;

const LOGGED_OUTPUT_CHARS: usize = 500;

#[derive(Debug)]
pub struct ScreeningOutcome {
    pub profile: CandidateProfile,
    pub evaluation: EvaluationResult,
    pub notices: Vec<Notice>,
}

#[instrument(
    skip_all,
    fields(
        filename = document.filename.as_deref().unwrap_or("<unnamed>"),
        size = document.content.len(),
        pdf = document.is_pdf(),
    )
)]
pub async fn screen_document(
    llm: &LlmClient,
    document: UploadedDocument,
    criteria: &SelectionCriteria,
) -> Result<ScreeningOutcome, AppError> {
    let text = tokio::task::spawn_blocking(move || extract_text(&document))
        .await
        .map_err(|e| AppError::Internal(anyhow!("text extraction task failed: {e}")))?;
    info!(chars = text.chars().count(), "Extracted document text");

    let (profile, mut notices) = extract_profile(llm, &text).await?;

    let evaluation = evaluate(&profile, criteria);
    notices.extend(evaluation_notices(&evaluation, criteria));

    Ok(ScreeningOutcome {
        profile,
        evaluation,
        notices,
    })
}

/// Runs the AI step on already-extracted text.
pub async fn extract_profile(
    llm: &LlmClient,
    text: &str,
) -> Result<(CandidateProfile, Vec<Notice>), AppError> {
    let prompt = build_profile_prompt(text);
    let completion = llm.complete(&prompt).await?;

    let mut notices = rate_limit_notices(completion.rate_limit_waits, llm.retry_policy());
    if completion.source == TextSource::Fallback {
        notices.push(Notice::error("Could not extract AI response text."));
    }

    let value = parse_json_object(&completion.text).map_err(|e| {
        warn!(
            "AI output is not parseable JSON: {e}; output starts with {:?}",
            completion.text.chars().take(LOGGED_OUTPUT_CHARS).collect::<String>()
        );
        AppError::ProfileParse(e)
    })?;

    let profile = CandidateProfile::from_value(value)
        .map_err(|e| AppError::Internal(anyhow!("profile conversion failed: {e}")))?;
    info!(
        skills = profile.skills.len(),
        years = profile.years_of_experience,
        "Parsed candidate profile"
    );

    Ok((profile, notices))
}

fn rate_limit_notices(waits: u32, retry: RetryPolicy) -> Vec<Notice> {
    (0..waits)
        .map(|_| {
            Notice::warning(format!(
                "AI API limit reached. Retried after waiting {} seconds.",
                retry.backoff.as_secs()
            ))
        })
        .collect()
}

pub fn evaluation_notices(evaluation: &EvaluationResult, criteria: &SelectionCriteria) -> Vec<Notice> {
    let mut notices = Vec::new();
    if evaluation.meets_criteria {
        notices.push(Notice::success("Candidate meets your selected criteria."));
    } else {
        notices.push(Notice::warning("Candidate does not meet your selected criteria."));
    }
    if criteria.target_role.is_some() {
        notices.push(Notice::info(
            "Target role is recorded but not yet used when matching candidates.",
        ));
    }
    notices
}
