//! Request handlers for the intake API
//!
//! Error policy: validation problems are 4xx with a short message; upstream
//! AI failures degrade to placeholders with the error carried in the
//! `x-ai-fallback-reason` header - except follow-up questions, which have
//! no placeholder and answer 502.

use axum::extract::State;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};
use std::str::FromStr;

use super::ServerAppState;
use crate::assemblers::{concept, followup, mockup, summary};
use crate::evaluator;
use crate::models::{DesignRequestSummary, DiagnosticReport, MockupImage, SectionKind};

/// Header carrying the upstream error when a placeholder was served
pub const FALLBACK_REASON_HEADER: &str = "x-ai-fallback-reason";

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

fn opt_str(body: &Value, key: &str) -> String {
    body.get(key)
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string()
}

/// Attach the fallback-reason header to an otherwise-normal response.
/// Header values must be ASCII; the reason is sanitized and capped.
fn with_fallback_reason(mut response: Response, reason: &str) -> Response {
    let sanitized: String = reason
        .chars()
        .filter(|c| c.is_ascii() && *c != '\n' && *c != '\r')
        .take(200)
        .collect();
    let value = HeaderValue::from_str(&sanitized)
        .unwrap_or_else(|_| HeaderValue::from_static("upstream error"));
    response
        .headers_mut()
        .insert(HeaderName::from_static(FALLBACK_REASON_HEADER), value);
    response
}

/// POST /api/evaluate-section
pub async fn evaluate_section(
    State(state): State<ServerAppState>,
    Json(body): Json<Value>,
) -> Response {
    let Some(section_str) = body.get("section").and_then(Value::as_str) else {
        return bad_request("'section' is required and must be a string");
    };
    let section = match SectionKind::from_str(section_str) {
        Ok(section) => section,
        Err(e) => return bad_request(&e),
    };
    let Some(input) = body.get("input").and_then(Value::as_str) else {
        return bad_request("'input' is required and must be a string");
    };

    log::info!("[routes] Evaluating section '{}'", section);
    let feedback = evaluator::evaluate_section(&state.gateway, section, input).await;
    Json(feedback).into_response()
}

/// POST /api/generate-summary - always 200, placeholder on upstream failure
pub async fn generate_summary(
    State(state): State<ServerAppState>,
    Json(body): Json<Value>,
) -> Response {
    let inputs = summary::SummaryInputs {
        opening: opt_str(&body, "opening"),
        problem_framing: opt_str(&body, "problemFraming"),
        objectives: opt_str(&body, "objectives"),
        constraints: opt_str(&body, "constraints"),
    };

    match summary::generate_summary(&state.gateway, &inputs).await {
        Ok(generated) => Json(generated).into_response(),
        Err(e) => {
            log::warn!("[routes] Summary generation degraded to placeholder: {}", e);
            let placeholder = summary::placeholder_summary(&inputs);
            with_fallback_reason(Json(placeholder).into_response(), &e.to_string())
        }
    }
}

/// POST /api/follow-up-questions - no placeholder; upstream failure is 502
pub async fn follow_up_questions(
    State(state): State<ServerAppState>,
    Json(body): Json<Value>,
) -> Response {
    let opening = opt_str(&body, "opening");
    let objectives = opt_str(&body, "objectives");

    // Validate before any network activity
    if opening.trim().is_empty() && objectives.trim().is_empty() {
        return bad_request("Provide at least one of 'opening' or 'objectives'");
    }

    match followup::generate_follow_ups(&state.gateway, &opening, &objectives).await {
        Ok(questions) => Json(questions).into_response(),
        Err(e) => {
            log::warn!("[routes] Follow-up generation failed: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// POST /api/generate-concept - always 200 past validation
pub async fn generate_concept(
    State(state): State<ServerAppState>,
    Json(body): Json<Value>,
) -> Response {
    let summary_value = body.get("summary").cloned().unwrap_or(Value::Null);
    if !summary_value
        .get("problem")
        .map(Value::is_string)
        .unwrap_or(false)
    {
        return bad_request("'summary.problem' is required and must be a string");
    }

    // Remaining fields degrade to the placeholder value rather than 400
    let summary = DesignRequestSummary {
        problem: crate::assemblers::str_field(&summary_value, "problem"),
        desired_outcome: crate::assemblers::str_field(&summary_value, "desiredOutcome"),
        users_impacted: crate::assemblers::str_field(&summary_value, "usersImpacted"),
        business_value: crate::assemblers::str_field(&summary_value, "businessValue"),
        constraints: crate::assemblers::str_field(&summary_value, "constraints"),
    };
    let skip_visual = body
        .get("skipVisual")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    match concept::generate_concept(&state.gateway, &summary, skip_visual).await {
        Ok(generated) => Json(generated).into_response(),
        Err(e) => {
            log::warn!("[routes] Concept generation degraded to placeholder: {}", e);
            let placeholder = concept::placeholder_concept(&summary);
            with_fallback_reason(Json(placeholder).into_response(), &e.to_string())
        }
    }
}

/// POST /api/generate-mockup
pub async fn generate_mockup(
    State(state): State<ServerAppState>,
    Json(body): Json<Value>,
) -> Response {
    let Some(intent_summary) = body.get("intentSummary").and_then(Value::as_str) else {
        return bad_request("'intentSummary' is required and must be a string");
    };
    let objectives = body.get("objectives").and_then(Value::as_str);

    match mockup::generate_mockup(&state.gateway, intent_summary, objectives).await {
        Ok(MockupImage::Inline(b64)) => Json(json!({ "image": b64 })).into_response(),
        Ok(MockupImage::Url(url)) => Json(json!({ "imageUrl": url })).into_response(),
        Err(e) => {
            // No placeholder image and no automatic retry; the caller shows
            // the error and the wizard proceeds without a mockup
            log::warn!("[routes] Mockup generation failed: {}", e);
            Json(json!({ "error": e.to_string() })).into_response()
        }
    }
}

/// GET /api/diagnostics - read-only credential/connectivity probe
pub async fn diagnostics(State(state): State<ServerAppState>) -> Json<DiagnosticReport> {
    let key_set = state.gateway.key_set();

    let report = if !key_set {
        DiagnosticReport {
            key_set: false,
            reachable: None,
            message: format!(
                "API credential not set ({}); AI features run in fallback mode",
                state.gateway.config().api_key_env
            ),
            checked_at: Utc::now(),
        }
    } else {
        match state.gateway.probe().await {
            Ok(()) => DiagnosticReport {
                key_set: true,
                reachable: Some(true),
                message: "AI service reachable".to_string(),
                checked_at: Utc::now(),
            },
            Err(e) => DiagnosticReport {
                key_set: true,
                reachable: Some(false),
                message: format!("AI service unreachable: {}", e),
                checked_at: Utc::now(),
            },
        }
    };

    Json(report)
}

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
