// Section evaluation - external model first, deterministic heuristic on
// any failure. The evaluator itself never fails: worst case the caller
// gets keyword-based scoring with the upstream error attached.

pub mod heuristic;

use crate::gateway::{GatewayError, LlmGateway};
use crate::models::{
    FeedbackSource, RiskFlag, SectionFeedback, SectionKind, RISK_DELTA_MAX, RISK_DELTA_MIN,
};
use serde_json::Value;

/// Deadline for one evaluation call
pub const EVALUATION_TIMEOUT_MS: u64 = 20_000;

/// Output budget for one evaluation reply
const EVALUATION_MAX_TOKENS: u32 = 600;

const BASE_PROMPT: &str = "You are a design-operations coach reviewing one answer from a product \
design intake form. Assess the answer and reply with a single JSON object, no prose, with the \
fields: \"message\" (short coaching feedback), \"suggestions\" (array of concrete improvement \
strings), \"riskDelta\" (integer between -10 and 25, where higher means the request is riskier \
to take on as-is), and \"flags\" (array of qualitative risk labels such as \"Solution Bias\", \
\"Missing Metrics\", \"Missing Stakeholders/Dependencies\", \"Incomplete Answer\", or \
\"Strategic Misalignment\").";

/// Evaluate one section answer. Tries the external model; on any gateway
/// error falls back to the keyword heuristic and records the reason.
pub async fn evaluate_section(
    gateway: &LlmGateway,
    section: SectionKind,
    input: &str,
) -> SectionFeedback {
    match model_evaluation(gateway, section, input).await {
        Ok(feedback) => feedback,
        Err(e) => {
            log::warn!(
                "[evaluator] External model path failed for '{}', using fallback heuristic: {}",
                section,
                e
            );
            let mut feedback = heuristic::evaluate(section, input);
            feedback.fallback_reason = Some(e.to_string());
            feedback
        }
    }
}

async fn model_evaluation(
    gateway: &LlmGateway,
    section: SectionKind,
    input: &str,
) -> Result<SectionFeedback, GatewayError> {
    let system_prompt = build_system_prompt(section);
    let user_content = format!("Section: {}\nAnswer:\n{}", section, input);

    let reply = gateway
        .call(
            &system_prompt,
            &user_content,
            EVALUATION_TIMEOUT_MS,
            EVALUATION_MAX_TOKENS,
        )
        .await?;

    Ok(coerce_feedback(&reply))
}

fn build_system_prompt(section: SectionKind) -> String {
    let augmentation = match section {
        SectionKind::Opening => {
            "For the opening answer, confirm you can tell the project's name and whether this is \
             a brand-new initiative or part of an existing product; if either is unclear, ask for it."
        }
        SectionKind::Objectives => {
            "For objectives, demand specificity: vague outcomes without a measurable target \
             should be called out directly."
        }
        SectionKind::Constraints => {
            "For constraints, look for concrete technical, timeline, or resource bounds."
        }
    };
    format!("{} {}", BASE_PROMPT, augmentation)
}

/// Shape-coerce a model reply into feedback. Missing or wrong-typed fields
/// degrade to neutral values rather than failing the evaluation.
fn coerce_feedback(reply: &Value) -> SectionFeedback {
    let message = reply["message"].as_str().unwrap_or("—").to_string();

    let suggestions = reply["suggestions"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str())
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default();

    let risk_delta = reply["riskDelta"]
        .as_i64()
        .unwrap_or(0)
        .clamp(RISK_DELTA_MIN as i64, RISK_DELTA_MAX as i64) as i32;

    let flags: Vec<RiskFlag> = reply["flags"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str())
                .map(|s| RiskFlag::from(s.to_string()))
                .collect()
        })
        .unwrap_or_default();

    SectionFeedback {
        message,
        suggestions,
        risk_delta,
        flags,
        source: FeedbackSource::ExternalModel,
        fallback_reason: None,
    }
}
