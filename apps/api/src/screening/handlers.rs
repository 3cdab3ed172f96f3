//! Axum route handlers for the Screening API.

use axum::{
    extract::{rejection::JsonRejection, Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::notice::Notice;
use crate::screening::criteria::{
    evaluate, parse_min_experience, EvaluationResult, SelectionCriteria, DEFAULT_MIN_EXPERIENCE,
    MIN_EXPERIENCE_MAX, REQUIRED_SKILL_MATCHES, SKILL_OPTIONS,
};
use crate::screening::extractor::UploadedDocument;
use crate::screening::pipeline::{evaluation_notices, screen_document};
use crate::screening::profile::CandidateProfile;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ScreeningResponse {
    pub interaction_id: Uuid,
    pub profile: CandidateProfile,
    pub criteria: SelectionCriteria,
    pub evaluation: EvaluationResult,
    pub summary: String,
    pub recommendation: String,
    pub notices: Vec<Notice>,
}

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub profile: CandidateProfile,
    #[serde(default)]
    pub criteria: SelectionCriteria,
}

#[derive(Debug, Serialize)]
pub struct EvaluateResponse {
    pub evaluation: EvaluationResult,
    pub notices: Vec<Notice>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/screenings
///
/// Multipart upload: `file` plus optional `min_experience`, `required_skills`
/// (repeatable or comma separated) and `target_role`.
pub async fn handle_screen(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ScreeningResponse>, AppError> {
    let (document, criteria) = read_screening_form(multipart).await?;
    let criteria = criteria.validated()?;

    let outcome = screen_document(&state.llm, document, &criteria).await?;

    Ok(Json(ScreeningResponse {
        interaction_id: Uuid::new_v4(),
        summary: outcome.profile.summary_or_placeholder().to_string(),
        recommendation: outcome.profile.recommendation_or_placeholder().to_string(),
        profile: outcome.profile,
        criteria,
        evaluation: outcome.evaluation,
        notices: outcome.notices,
    }))
}

/// POST /api/v1/screenings/evaluate
///
/// Re-evaluates a previously extracted profile against new criteria. No AI call.
pub async fn handle_evaluate(
    body: Result<Json<EvaluateRequest>, JsonRejection>,
) -> Result<Json<EvaluateResponse>, AppError> {
    let Json(request) = body?;
    let criteria = request.criteria.validated()?;
    let evaluation = evaluate(&request.profile, &criteria);
    let notices = evaluation_notices(&evaluation, &criteria);
    Ok(Json(EvaluateResponse {
        evaluation,
        notices,
    }))
}

/// GET /api/v1/criteria/options
pub async fn handle_criteria_options() -> Json<Value> {
    Json(json!({
        "skills": SKILL_OPTIONS,
        "min_experience": {
            "min": 0,
            "max": MIN_EXPERIENCE_MAX,
            "default": DEFAULT_MIN_EXPERIENCE
        },
        "required_skill_matches": REQUIRED_SKILL_MATCHES
    }))
}

async fn read_screening_form(
    mut multipart: Multipart,
) -> Result<(UploadedDocument, SelectionCriteria), AppError> {
    let mut document = None;
    let mut criteria = SelectionCriteria::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().map(String::from);
                let media_type = field.content_type().map(String::from);
                let content = field.bytes().await?;
                document = Some(UploadedDocument {
                    filename,
                    media_type,
                    content,
                });
            }
            "min_experience" => {
                criteria.min_experience = parse_min_experience(&field_text(field).await?)?;
            }
            "required_skills" => {
                let raw = field_text(field).await?;
                criteria.required_skills.extend(
                    raw.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(String::from),
                );
            }
            "target_role" => {
                criteria.target_role = Some(field_text(field).await?);
            }
            other => {
                tracing::debug!("Ignoring unknown multipart field '{other}'");
            }
        }
    }

    let document =
        document.ok_or_else(|| AppError::Validation("A résumé file is required".to_string()))?;
    Ok((document, criteria))
}

async fn field_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    Ok(field.text().await?)
}
