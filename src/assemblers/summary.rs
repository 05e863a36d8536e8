// Design request summary generation

use super::{or_placeholder, str_field};
use crate::gateway::{GatewayError, LlmGateway};
use crate::models::DesignRequestSummary;
use serde_json::json;

/// Deadline for summary generation
pub const SUMMARY_TIMEOUT_MS: u64 = 30_000;

const SUMMARY_MAX_TOKENS: u32 = 700;

const SYSTEM_PROMPT: &str = "You are summarizing a product design intake conversation. Reply \
with a single JSON object, no prose, with exactly these string fields: \"problem\", \
\"desiredOutcome\", \"usersImpacted\", \"businessValue\", \"constraints\". Each field is one \
or two plain sentences drawn only from the provided answers - do not invent details.";

/// Raw answers the summary is assembled from
#[derive(Debug, Clone, Default)]
pub struct SummaryInputs {
    pub opening: String,
    pub problem_framing: String,
    pub objectives: String,
    pub constraints: String,
}

/// Generate the summary through the external model
pub async fn generate_summary(
    gateway: &LlmGateway,
    inputs: &SummaryInputs,
) -> Result<DesignRequestSummary, GatewayError> {
    let payload = json!({
        "opening": inputs.opening,
        "problemFraming": inputs.problem_framing,
        "objectives": inputs.objectives,
        "constraints": inputs.constraints,
    });

    let reply = gateway
        .call(
            SYSTEM_PROMPT,
            &payload.to_string(),
            SUMMARY_TIMEOUT_MS,
            SUMMARY_MAX_TOKENS,
        )
        .await?;

    Ok(DesignRequestSummary {
        problem: str_field(&reply, "problem"),
        desired_outcome: str_field(&reply, "desiredOutcome"),
        users_impacted: str_field(&reply, "usersImpacted"),
        business_value: str_field(&reply, "businessValue"),
        constraints: str_field(&reply, "constraints"),
    })
}

/// Deterministic summary used when the model path is unavailable. Echoes
/// the raw answers so the wizard can still complete.
pub fn placeholder_summary(inputs: &SummaryInputs) -> DesignRequestSummary {
    let problem = if inputs.problem_framing.trim().is_empty() {
        or_placeholder(&inputs.opening)
    } else {
        or_placeholder(&inputs.problem_framing)
    };

    DesignRequestSummary {
        problem,
        desired_outcome: or_placeholder(&inputs.objectives),
        users_impacted: super::FIELD_PLACEHOLDER.to_string(),
        business_value: super::FIELD_PLACEHOLDER.to_string(),
        constraints: or_placeholder(&inputs.constraints),
    }
}
