// Reference concept generation - a low-fidelity textual UX direction,
// produced whether or not the user asked for a visual mockup

use super::str_field;
use crate::gateway::{GatewayError, LlmGateway};
use crate::models::{DesignRequestSummary, ReferenceConcept};
use serde_json::json;

/// Deadline for concept generation
pub const CONCEPT_TIMEOUT_MS: u64 = 35_000;

const CONCEPT_MAX_TOKENS: u32 = 700;

const SYSTEM_PROMPT: &str = "You are sketching a low-fidelity UX direction for a design request. \
This is a reference concept, explicitly not a final design. Reply with a single JSON object, no \
prose, with exactly these string fields: \"direction\", \"layout\", \"keyComponents\", \
\"visualTone\", \"rationale\".";

/// Generate the reference concept from a completed summary. `skip_visual`
/// marks the branch where the user declined a mockup - the textual concept
/// is still produced for the record, just without any image to pair it to.
pub async fn generate_concept(
    gateway: &LlmGateway,
    summary: &DesignRequestSummary,
    skip_visual: bool,
) -> Result<ReferenceConcept, GatewayError> {
    let payload = json!({
        "summary": summary,
        "visualMockupPlanned": !skip_visual,
    });

    let reply = gateway
        .call(
            SYSTEM_PROMPT,
            &payload.to_string(),
            CONCEPT_TIMEOUT_MS,
            CONCEPT_MAX_TOKENS,
        )
        .await?;

    Ok(ReferenceConcept {
        direction: str_field(&reply, "direction"),
        layout: str_field(&reply, "layout"),
        key_components: str_field(&reply, "keyComponents"),
        visual_tone: str_field(&reply, "visualTone"),
        rationale: str_field(&reply, "rationale"),
    })
}

/// Deterministic concept used when the model path is unavailable
pub fn placeholder_concept(summary: &DesignRequestSummary) -> ReferenceConcept {
    ReferenceConcept {
        direction: format!("A straightforward flow addressing: {}", summary.problem),
        layout: "Single-column layout with one primary action per view.".to_string(),
        key_components: "Intake form, progress indicator, summary card.".to_string(),
        visual_tone: "Neutral and unobtrusive; content first.".to_string(),
        rationale:
            "Generated without AI assistance - a conservative starting point pending a design pass."
                .to_string(),
    }
}
