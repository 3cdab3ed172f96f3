//! Axum route handlers for the Workflow API.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::notice::Notice;
use crate::screening::criteria::{evaluate, SelectionCriteria};
use crate::screening::profile::CandidateProfile;
use crate::state::AppState;
use crate::workflow::forwarder::{ForwardOutcome, WorkflowPayload};

#[derive(Debug, Deserialize)]
pub struct ForwardRequest {
    pub profile: CandidateProfile,
    #[serde(default)]
    pub criteria: SelectionCriteria,
    #[serde(default)]
    pub question: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ForwardResponse {
    pub meets_criteria: bool,
    pub outcome: ForwardOutcome,
    pub notices: Vec<Notice>,
}

/// POST /api/v1/screenings/forward
///
/// Re-evaluates the profile, then sends it to the recruitment workflow only
/// when it meets the criteria. Every call re-sends; there is no dedup.
pub async fn handle_forward(
    State(state): State<AppState>,
    body: Result<Json<ForwardRequest>, JsonRejection>,
) -> Result<Json<ForwardResponse>, AppError> {
    let Json(request) = body?;
    let criteria = request.criteria.validated()?;
    let evaluation = evaluate(&request.profile, &criteria);

    let payload = WorkflowPayload {
        candidate_data: &request.profile,
        meets_criteria: evaluation.meets_criteria,
        question: request.question.as_deref().unwrap_or_default(),
    };
    let outcome = state.forwarder.forward(&payload).await?;

    Ok(Json(ForwardResponse {
        meets_criteria: evaluation.meets_criteria,
        notices: vec![outcome_notice(&outcome)],
        outcome,
    }))
}

fn outcome_notice(outcome: &ForwardOutcome) -> Notice {
    match outcome {
        ForwardOutcome::Skipped => Notice::warning(
            "Candidate does not meet your selected criteria. Nothing was sent to the workflow.",
        ),
        ForwardOutcome::Delivered { status, .. } => Notice::success(format!(
            "Workflow completed: {}",
            status.as_deref().unwrap_or("no status returned")
        )),
        ForwardOutcome::Rejected { http_status, .. } => Notice::error(format!(
            "Failed to send to the recruitment workflow (HTTP {http_status})."
        )),
    }
}
