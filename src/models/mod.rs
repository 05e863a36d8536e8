// Intake wizard models - canonical type definitions shared by the wizard
// state machine, the evaluator, and the HTTP API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Sections
// ============================================================================

/// Enum for the named intake sections that require a free-text answer.
/// Serializes as the human-readable section titles used on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionKind {
    #[serde(rename = "Opening")]
    Opening,
    #[serde(rename = "Objectives and Outcomes")]
    Objectives,
    #[serde(rename = "Constraints and Considerations")]
    Constraints,
}

impl SectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Opening => "Opening",
            SectionKind::Objectives => "Objectives and Outcomes",
            SectionKind::Constraints => "Constraints and Considerations",
        }
    }

    /// All sections in wizard order
    pub fn all() -> [SectionKind; 3] {
        [
            SectionKind::Opening,
            SectionKind::Objectives,
            SectionKind::Constraints,
        ]
    }
}

impl std::fmt::Display for SectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SectionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "opening" => Ok(SectionKind::Opening),
            "objectives and outcomes" => Ok(SectionKind::Objectives),
            "constraints and considerations" => Ok(SectionKind::Constraints),
            _ => Err(format!(
                "Invalid section: '{}'. Expected 'Opening', 'Objectives and Outcomes', or 'Constraints and Considerations'",
                s
            )),
        }
    }
}

// ============================================================================
// Risk Flags
// ============================================================================

/// A qualitative risk indicator attached to a section evaluation.
/// Serializes as the human-readable label; unrecognized labels coming back
/// from the external model are preserved as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RiskFlag {
    IncompleteAnswer,
    SolutionBias,
    MissingMetrics,
    MissingStakeholdersOrDependencies,
    StrategicMisalignment,
    Other(String),
}

impl RiskFlag {
    pub fn as_str(&self) -> &str {
        match self {
            RiskFlag::IncompleteAnswer => "Incomplete Answer",
            RiskFlag::SolutionBias => "Solution Bias",
            RiskFlag::MissingMetrics => "Missing Metrics",
            RiskFlag::MissingStakeholdersOrDependencies => "Missing Stakeholders/Dependencies",
            RiskFlag::StrategicMisalignment => "Strategic Misalignment",
            RiskFlag::Other(s) => s,
        }
    }
}

impl std::fmt::Display for RiskFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<String> for RiskFlag {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Incomplete Answer" => RiskFlag::IncompleteAnswer,
            "Solution Bias" => RiskFlag::SolutionBias,
            "Missing Metrics" => RiskFlag::MissingMetrics,
            "Missing Stakeholders/Dependencies" => RiskFlag::MissingStakeholdersOrDependencies,
            "Strategic Misalignment" => RiskFlag::StrategicMisalignment,
            _ => RiskFlag::Other(s),
        }
    }
}

impl From<RiskFlag> for String {
    fn from(flag: RiskFlag) -> Self {
        flag.as_str().to_string()
    }
}

// ============================================================================
// Section Feedback
// ============================================================================

/// Which path produced a section evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedbackSource {
    #[serde(rename = "external-model")]
    ExternalModel,
    #[serde(rename = "fallback-heuristic")]
    FallbackHeuristic,
}

impl FeedbackSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackSource::ExternalModel => "external-model",
            FeedbackSource::FallbackHeuristic => "fallback-heuristic",
        }
    }
}

/// Result of evaluating one section answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionFeedback {
    /// Free-text coaching message shown under the answer
    pub message: String,
    /// Suggested improvements to the answer
    pub suggestions: Vec<String>,
    /// Signed adjustment to the cumulative risk score, within [-10, 25]
    pub risk_delta: i32,
    /// Qualitative risk flags raised by this evaluation
    pub flags: Vec<RiskFlag>,
    /// Which path produced this feedback
    pub source: FeedbackSource,
    /// Upstream error text when the fallback heuristic was used
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

/// Allowed risk-delta range for a single evaluation
pub const RISK_DELTA_MIN: i32 = -10;
pub const RISK_DELTA_MAX: i32 = 25;

// ============================================================================
// Recommended Action
// ============================================================================

/// Recommended next action derived from the accumulated risk state.
/// Never stored - always recomputed from (score, flags).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecommendedAction {
    BacklogReady,
    ClarificationCallRecommended,
    StrategicReviewRequired,
}

impl RecommendedAction {
    pub fn display_name(&self) -> &'static str {
        match self {
            RecommendedAction::BacklogReady => "Backlog Ready",
            RecommendedAction::ClarificationCallRecommended => "Clarification Call Recommended",
            RecommendedAction::StrategicReviewRequired => "Strategic Review Required",
        }
    }
}

// ============================================================================
// Generated Artifacts
// ============================================================================

/// Structured summary of the design request, generated once per wizard run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignRequestSummary {
    pub problem: String,
    pub desired_outcome: String,
    pub users_impacted: String,
    pub business_value: String,
    pub constraints: String,
}

/// A generated, low-fidelity textual description of a suggested UX
/// direction. Explicitly not a final design.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceConcept {
    pub direction: String,
    pub layout: String,
    pub key_components: String,
    pub visual_tone: String,
    pub rationale: String,
}

/// An AI-generated mockup image, either inline bytes or a remote URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MockupImage {
    /// Base64-encoded image data (without data URL prefix)
    Inline(String),
    /// Remote URL to the generated image
    Url(String),
}

/// Follow-up questions generated from the opening and objectives answers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpQuestions {
    pub intro: String,
    pub questions: Vec<String>,
}

// ============================================================================
// Diagnostics
// ============================================================================

/// Read-only health probe of the external credential and connectivity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticReport {
    /// Whether the API credential is present in the environment
    pub key_set: bool,
    /// Whether the upstream API answered the probe (absent when no key)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reachable: Option<bool>,
    pub message: String,
    pub checked_at: DateTime<Utc>,
}
