// Mockup image generation. Inputs are truncated to fixed character budgets
// before prompting, and a failed generation is never retried automatically
// (a retry loop is visible flicker and repeated cost).

use base64::Engine;

use crate::gateway::{GatewayError, LlmGateway};
use crate::models::MockupImage;

/// Deadline for image generation
pub const MOCKUP_TIMEOUT_MS: u64 = 30_000;

/// Character budget for the intent summary input
pub const INTENT_BUDGET: usize = 500;

/// Character budget for the objectives input
pub const OBJECTIVES_BUDGET: usize = 200;

/// Character budget for the final image prompt
pub const PROMPT_BUDGET: usize = 1000;

/// Build the image-generation prompt from the truncated inputs
pub fn build_mockup_prompt(intent_summary: &str, objectives: Option<&str>) -> String {
    let intent = truncate_chars(intent_summary.trim(), INTENT_BUDGET);

    let mut prompt = format!(
        "A clean, low-fidelity UI mockup illustrating this product design request: {}.",
        intent
    );

    if let Some(objectives) = objectives.map(str::trim).filter(|s| !s.is_empty()) {
        let objectives = truncate_chars(objectives, OBJECTIVES_BUDGET);
        prompt.push_str(&format!(" Key objectives: {}.", objectives));
    }

    prompt.push_str(" Wireframe style, neutral colors, no photorealism, no text-heavy panels.");

    truncate_chars(&prompt, PROMPT_BUDGET)
}

/// Generate a mockup image. Accepts either inline base64 or a remote URL
/// from the upstream API; inline payloads are checked to actually decode.
pub async fn generate_mockup(
    gateway: &LlmGateway,
    intent_summary: &str,
    objectives: Option<&str>,
) -> Result<MockupImage, GatewayError> {
    let prompt = build_mockup_prompt(intent_summary, objectives);

    let image = gateway.generate_image(&prompt, MOCKUP_TIMEOUT_MS).await?;

    if let MockupImage::Inline(ref b64) = image {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(b64)
            .map_err(|e| {
                GatewayError::MalformedResponse(format!("Inline image was not valid base64: {}", e))
            })?;
        log::debug!("[mockup] Received inline image payload ({} bytes)", bytes.len());
    }

    Ok(image)
}

/// Truncate on a character boundary, never mid-codepoint
fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
