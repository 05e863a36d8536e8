// Deterministic fallback scoring used whenever the external model path is
// unavailable. Keyword and length checks only - no hidden randomness, so
// identical (section, input) pairs always produce identical feedback.

use crate::models::{FeedbackSource, RiskFlag, SectionFeedback, SectionKind};
use regex::Regex;
use std::sync::OnceLock;

/// Maximum combined delta the heuristic path may assign for one answer.
/// Deliberately tighter than the external model's 25-point ceiling.
pub const HEURISTIC_DELTA_CAP: i32 = 20;

/// Minimum trimmed length for an opening answer to count as substantive
const OPENING_MIN_LEN: usize = 5;

/// Minimum trimmed length for a section answer to count as substantive
const SECTION_MIN_LEN: usize = 10;

/// Answers shorter than this still get a nudge to add detail
const SECTION_DETAIL_LEN: usize = 50;

static INITIATIVE_KEYWORDS: OnceLock<Regex> = OnceLock::new();
static UI_KEYWORDS: OnceLock<Regex> = OnceLock::new();
static METRIC_KEYWORDS: OnceLock<Regex> = OnceLock::new();
static STAKEHOLDER_KEYWORDS: OnceLock<Regex> = OnceLock::new();

fn initiative_keywords() -> &'static Regex {
    INITIATIVE_KEYWORDS.get_or_init(|| {
        Regex::new(r"(?i)(new|existing|current|initiative|product|redesign|part of)").unwrap()
    })
}

fn ui_keywords() -> &'static Regex {
    UI_KEYWORDS.get_or_init(|| Regex::new(r"(?i)(dashboard|page|screen)").unwrap())
}

fn metric_keywords() -> &'static Regex {
    METRIC_KEYWORDS.get_or_init(|| Regex::new(r"(?i)(metric|percent|time)").unwrap())
}

fn stakeholder_keywords() -> &'static Regex {
    STAKEHOLDER_KEYWORDS.get_or_init(|| Regex::new(r"(?i)(team|stakeholder|dependency)").unwrap())
}

/// Evaluate one section answer with the keyword heuristic. Always succeeds.
pub fn evaluate(section: SectionKind, input: &str) -> SectionFeedback {
    match section {
        SectionKind::Opening => evaluate_opening(input),
        _ => evaluate_section(section, input),
    }
}

fn evaluate_opening(input: &str) -> SectionFeedback {
    let trimmed = input.trim();

    if trimmed.len() < OPENING_MIN_LEN {
        return feedback(
            "Please share a bit more to get started - at minimum the name of the project or initiative.",
            vec!["Add the project name and a one-line description.".to_string()],
            5,
            vec![RiskFlag::IncompleteAnswer],
        );
    }

    if initiative_keywords().is_match(trimmed) {
        feedback(
            "Thanks - that gives us a clear starting point.",
            vec![],
            0,
            vec![],
        )
    } else {
        feedback(
            "Is this a brand-new initiative, or part of an existing product? Knowing which helps frame the request.",
            vec!["State whether this is new or an extension of existing work.".to_string()],
            3,
            vec![],
        )
    }
}

fn evaluate_section(section: SectionKind, input: &str) -> SectionFeedback {
    let trimmed = input.trim();

    // Too-short answers short-circuit: no keyword scoring on a placeholder
    if trimmed.len() < SECTION_MIN_LEN {
        let message = match section {
            SectionKind::Objectives => {
                "Your objectives answer is very brief - please be more specific about the outcomes you expect."
            }
            _ => {
                "Your constraints answer is very brief - please be more specific about what bounds this work."
            }
        };
        return feedback(
            message,
            vec!["Expand this answer to at least a full sentence.".to_string()],
            5,
            vec![RiskFlag::IncompleteAnswer],
        );
    }

    let mut messages: Vec<String> = Vec::new();
    let mut suggestions: Vec<String> = Vec::new();
    let mut flags: Vec<RiskFlag> = Vec::new();
    let mut delta = 0;

    if trimmed.len() < SECTION_DETAIL_LEN {
        messages.push("A sentence or two of extra detail would strengthen this answer.".to_string());
    }

    // Fixed check order: solution bias, then metrics, then stakeholders.
    // The concatenated message must follow this order.
    if ui_keywords().is_match(trimmed) {
        messages.push(
            "This reads like a solution (dashboard/page/screen) rather than a problem. Try restating the underlying need."
                .to_string(),
        );
        suggestions.push("Describe the problem before the interface that solves it.".to_string());
        flags.push(RiskFlag::SolutionBias);
        delta += 5;
    }

    if metric_keywords().is_match(trimmed) {
        messages.push("Good - you've tied this to a measurable outcome.".to_string());
    } else {
        messages.push(
            "How will success be measured? Naming a metric, percentage, or time target makes this actionable."
                .to_string(),
        );
        suggestions.push("Name the metric you want to move and by how much.".to_string());
        flags.push(RiskFlag::MissingMetrics);
        delta += 3;
    }

    if !stakeholder_keywords().is_match(trimmed) {
        messages.push("Which teams, stakeholders, or dependencies does this touch?".to_string());
        suggestions.push("List the teams or dependencies involved.".to_string());
        flags.push(RiskFlag::MissingStakeholdersOrDependencies);
        delta += 2;
    }

    feedback(
        &messages.join(" "),
        suggestions,
        delta.min(HEURISTIC_DELTA_CAP),
        flags,
    )
}

fn feedback(
    message: &str,
    suggestions: Vec<String>,
    risk_delta: i32,
    flags: Vec<RiskFlag>,
) -> SectionFeedback {
    SectionFeedback {
        message: message.to_string(),
        suggestions,
        risk_delta,
        flags,
        source: FeedbackSource::FallbackHeuristic,
        fallback_reason: None,
    }
}
