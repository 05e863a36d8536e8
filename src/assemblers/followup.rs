// Follow-up question generation.
//
// The one assembler without a placeholder: upstream failure propagates to
// the caller, which answers 502 and lets the client fall back to its own
// default prompts.

use super::str_field;
use crate::gateway::{GatewayError, LlmGateway};
use crate::models::FollowUpQuestions;
use serde_json::{json, Value};

/// Deadline for follow-up generation
pub const FOLLOW_UP_TIMEOUT_MS: u64 = 20_000;

const FOLLOW_UP_MAX_TOKENS: u32 = 500;

const SYSTEM_PROMPT: &str = "You are helping a facilitator probe a product design request. \
Given the opening description and stated objectives, reply with a single JSON object, no \
prose, with the fields: \"intro\" (one sentence framing the questions) and \"questions\" \
(an array of 3 to 5 short, pointed follow-up questions).";

/// Generate follow-up questions from the opening and objectives answers
pub async fn generate_follow_ups(
    gateway: &LlmGateway,
    opening: &str,
    objectives: &str,
) -> Result<FollowUpQuestions, GatewayError> {
    let payload = json!({
        "opening": opening,
        "objectives": objectives,
    });

    let reply = gateway
        .call(
            SYSTEM_PROMPT,
            &payload.to_string(),
            FOLLOW_UP_TIMEOUT_MS,
            FOLLOW_UP_MAX_TOKENS,
        )
        .await?;

    Ok(coerce_follow_ups(&reply))
}

fn coerce_follow_ups(reply: &Value) -> FollowUpQuestions {
    let questions = reply["questions"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default();

    FollowUpQuestions {
        intro: str_field(reply, "intro"),
        questions,
    }
}
