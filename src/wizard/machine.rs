// Intake wizard state machine.
//
// The run state is an immutable value; `transition` consumes an event and
// returns the next state plus the side-effect commands the driver should
// issue (evaluation and generation calls). All gating rules live here so
// every transition is unit-testable without a rendering surface or network.

use crate::models::{
    DesignRequestSummary, MockupImage, RecommendedAction, ReferenceConcept, SectionFeedback,
    SectionKind,
};
use crate::risk::RiskState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

// ============================================================================
// Steps
// ============================================================================

/// Position in the fixed wizard sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WizardStep {
    Opening,
    Objectives,
    Constraints,
    SummaryGeneration,
    OfferVisual,
    VisualConcept,
    Final,
}

impl WizardStep {
    /// The section answered on this step, if it is an answer-gathering step
    pub fn section(&self) -> Option<SectionKind> {
        match self {
            WizardStep::Opening => Some(SectionKind::Opening),
            WizardStep::Objectives => Some(SectionKind::Objectives),
            WizardStep::Constraints => Some(SectionKind::Constraints),
            _ => None,
        }
    }

    /// Step that answers the given section
    pub fn for_section(section: SectionKind) -> WizardStep {
        match section {
            SectionKind::Opening => WizardStep::Opening,
            SectionKind::Objectives => WizardStep::Objectives,
            SectionKind::Constraints => WizardStep::Constraints,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, WizardStep::Final)
    }
}

// ============================================================================
// Request lifecycle
// ============================================================================

/// Lifecycle tag for one generated artifact, checked before issuing a new
/// call so re-renders cannot spawn duplicate requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestPhase<T> {
    NotStarted,
    InFlight,
    Succeeded(T),
    Failed(String),
}

impl<T> RequestPhase<T> {
    pub fn can_start(&self) -> bool {
        matches!(self, RequestPhase::NotStarted)
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self, RequestPhase::InFlight)
    }

    /// Whether the request has finished, successfully or not
    pub fn is_settled(&self) -> bool {
        matches!(self, RequestPhase::Succeeded(_) | RequestPhase::Failed(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            RequestPhase::Succeeded(v) => Some(v),
            _ => None,
        }
    }
}

impl<T> Default for RequestPhase<T> {
    fn default() -> Self {
        RequestPhase::NotStarted
    }
}

// ============================================================================
// Events and commands
// ============================================================================

/// A user action or async completion fed into the machine
#[derive(Debug, Clone, PartialEq)]
pub enum WizardEvent {
    /// User edited a section answer
    InputChanged { section: SectionKind, text: String },
    /// Primary forward action on an answer-gathering step
    Submit,
    /// Evaluation call completed
    EvaluationSucceeded {
        section: SectionKind,
        feedback: SectionFeedback,
        epoch: u64,
    },
    /// Evaluation call failed; `timed_out` selects the step-local wording
    EvaluationFailed {
        section: SectionKind,
        error: String,
        timed_out: bool,
        epoch: u64,
    },
    SummaryReady {
        summary: DesignRequestSummary,
        epoch: u64,
    },
    SummaryFailed {
        error: String,
        epoch: u64,
    },
    /// Binary choice on the OfferVisual step
    ChooseVisual { wants_visual: bool },
    ConceptReady {
        concept: ReferenceConcept,
        epoch: u64,
    },
    ConceptFailed {
        error: String,
        epoch: u64,
    },
    MockupReady {
        image: MockupImage,
        epoch: u64,
    },
    MockupFailed {
        error: String,
        epoch: u64,
    },
    /// Forward action on the waiting/visual steps
    Advance,
    /// Return to an already-evaluated section (read-only)
    Revisit { section: SectionKind },
    /// Local toggle on the final step; not a state-machine transition
    ToggleDiagnostics,
    /// Clear everything and return to the first step
    Reset,
}

/// Side effect the driver must perform after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardCommand {
    EvaluateSection { section: SectionKind, input: String },
    GenerateSummary,
    GenerateConcept { skip_visual: bool },
    GenerateMockup,
}

/// Step-local error surfaced under the answer box
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepError {
    pub message: String,
    pub timed_out: bool,
}

// ============================================================================
// Run state
// ============================================================================

/// Complete state of one wizard run. Owned by a single session; cloned on
/// every transition, never mutated in place by callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardRunState {
    pub run_id: Uuid,
    /// Incremented on reset; completions carrying a stale epoch are ignored
    pub epoch: u64,
    pub started_at: DateTime<Utc>,
    pub step: WizardStep,
    pub answers: HashMap<SectionKind, String>,
    pub feedback: HashMap<SectionKind, SectionFeedback>,
    /// Section with an evaluation call outstanding, if any
    pub evaluation_in_flight: Option<SectionKind>,
    pub risk: RiskState,
    pub step_error: Option<StepError>,
    pub summary: RequestPhase<DesignRequestSummary>,
    pub concept: RequestPhase<ReferenceConcept>,
    pub mockup: RequestPhase<MockupImage>,
    /// The OfferVisual choice, once made
    pub visual_requested: Option<bool>,
    pub show_diagnostics: bool,
}

impl WizardRunState {
    pub fn new() -> Self {
        Self::with_epoch(0)
    }

    fn with_epoch(epoch: u64) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            epoch,
            started_at: Utc::now(),
            step: WizardStep::Opening,
            answers: HashMap::new(),
            feedback: HashMap::new(),
            evaluation_in_flight: None,
            risk: RiskState::new(),
            step_error: None,
            summary: RequestPhase::NotStarted,
            concept: RequestPhase::NotStarted,
            mockup: RequestPhase::NotStarted,
            visual_requested: None,
            show_diagnostics: false,
        }
    }

    /// Answer text for the current step, trimmed
    pub fn current_input(&self) -> &str {
        self.step
            .section()
            .and_then(|s| self.answers.get(&s))
            .map(|s| s.trim())
            .unwrap_or("")
    }

    pub fn recommended_action(&self) -> RecommendedAction {
        self.risk.recommended_action()
    }

    /// Whether the section's answer is locked (evaluated successfully)
    pub fn is_section_locked(&self, section: SectionKind) -> bool {
        self.feedback.contains_key(&section)
    }
}

impl Default for WizardRunState {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Transition function
// ============================================================================

/// Apply one event to the run state, returning the next state and the
/// commands the driver should issue. Pure: no I/O, no clocks beyond the
/// timestamps already in the state, no randomness outside `Reset`.
pub fn transition(
    state: &WizardRunState,
    event: WizardEvent,
) -> (WizardRunState, Vec<WizardCommand>) {
    let mut next = state.clone();
    let mut commands = Vec::new();

    match event {
        WizardEvent::InputChanged { section, text } => {
            // Answers are immutable once their evaluation succeeded
            if !next.is_section_locked(section) {
                next.answers.insert(section, text);
                next.step_error = None;
            }
        }

        WizardEvent::Submit => {
            if let Some(section) = next.step.section() {
                submit_section(&mut next, &mut commands, section);
            }
        }

        WizardEvent::EvaluationSucceeded {
            section,
            feedback,
            epoch,
        } => {
            if epoch == next.epoch && !next.is_section_locked(section) {
                next.risk.apply_delta(feedback.risk_delta);
                next.risk.merge_flags(&feedback.flags);
                next.feedback.insert(section, feedback);
                next.evaluation_in_flight = None;
                next.step_error = None;
                // Stay on the step: the user advances with another Submit
            }
        }

        WizardEvent::EvaluationFailed {
            section,
            error,
            timed_out,
            epoch,
        } => {
            if epoch == next.epoch && next.evaluation_in_flight == Some(section) {
                next.evaluation_in_flight = None;
                next.step_error = Some(StepError {
                    message: if timed_out {
                        "The AI review timed out. Please try submitting again.".to_string()
                    } else {
                        format!("The AI review failed: {}", error)
                    },
                    timed_out,
                });
            }
        }

        WizardEvent::SummaryReady { summary, epoch } => {
            if epoch == next.epoch && next.summary.is_in_flight() {
                next.summary = RequestPhase::Succeeded(summary);
            }
        }

        WizardEvent::SummaryFailed { error, epoch } => {
            if epoch == next.epoch && next.summary.is_in_flight() {
                next.summary = RequestPhase::Failed(error);
            }
        }

        WizardEvent::ChooseVisual { wants_visual } => {
            if next.step == WizardStep::OfferVisual && next.visual_requested.is_none() {
                next.visual_requested = Some(wants_visual);
                if next.concept.can_start() {
                    next.concept = RequestPhase::InFlight;
                    commands.push(WizardCommand::GenerateConcept {
                        skip_visual: !wants_visual,
                    });
                }
                if wants_visual {
                    next.step = WizardStep::VisualConcept;
                    if next.mockup.can_start() {
                        next.mockup = RequestPhase::InFlight;
                        commands.push(WizardCommand::GenerateMockup);
                    }
                } else {
                    // Image generation is never triggered on the skip branch
                    next.step = WizardStep::Final;
                }
            }
        }

        WizardEvent::ConceptReady { concept, epoch } => {
            if epoch == next.epoch && next.concept.is_in_flight() {
                next.concept = RequestPhase::Succeeded(concept);
            }
        }

        WizardEvent::ConceptFailed { error, epoch } => {
            if epoch == next.epoch && next.concept.is_in_flight() {
                next.concept = RequestPhase::Failed(error);
            }
        }

        WizardEvent::MockupReady { image, epoch } => {
            if epoch == next.epoch && next.mockup.is_in_flight() {
                next.mockup = RequestPhase::Succeeded(image);
            }
        }

        WizardEvent::MockupFailed { error, epoch } => {
            // No automatic retry: the phase settles as Failed for the run
            if epoch == next.epoch && next.mockup.is_in_flight() {
                next.mockup = RequestPhase::Failed(error);
            }
        }

        WizardEvent::Advance => match next.step {
            WizardStep::SummaryGeneration => {
                // Waiting state until the summary view has rendered
                if next.summary.is_settled() {
                    next.step = WizardStep::OfferVisual;
                }
            }
            // Re-entry after a revisit: the recorded choice carries the run
            // forward again without re-issuing any generation commands
            WizardStep::OfferVisual => {
                if let Some(wants_visual) = next.visual_requested {
                    next.step = if wants_visual {
                        WizardStep::VisualConcept
                    } else {
                        WizardStep::Final
                    };
                }
            }
            // Always allowed forward, whether or not generation succeeded
            WizardStep::VisualConcept => {
                next.step = WizardStep::Final;
            }
            _ => {}
        },

        WizardEvent::Revisit { section } => {
            let target = WizardStep::for_section(section);
            // The final step is terminal: only reset and the diagnostics
            // toggle apply there
            if next.step != WizardStep::Final
                && next.is_section_locked(section)
                && next.step != target
            {
                next.step = target;
                next.step_error = None;
            }
        }

        WizardEvent::ToggleDiagnostics => {
            if next.step == WizardStep::Final {
                next.show_diagnostics = !next.show_diagnostics;
            }
        }

        WizardEvent::Reset => {
            next = WizardRunState::with_epoch(state.epoch + 1);
        }
    }

    (next, commands)
}

fn submit_section(
    next: &mut WizardRunState,
    commands: &mut Vec<WizardCommand>,
    section: SectionKind,
) {
    let input = next
        .answers
        .get(&section)
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    if input.is_empty() {
        next.step_error = Some(StepError {
            message: "Please enter an answer before continuing.".to_string(),
            timed_out: false,
        });
        return;
    }

    if next.is_section_locked(section) {
        // Feedback already recorded: this Submit advances without
        // re-evaluating
        advance_from_section(next, commands, section);
        return;
    }

    if next.evaluation_in_flight == Some(section) {
        // One evaluation per step at a time
        return;
    }

    next.step_error = None;
    next.evaluation_in_flight = Some(section);
    commands.push(WizardCommand::EvaluateSection { section, input });
}

fn advance_from_section(
    next: &mut WizardRunState,
    commands: &mut Vec<WizardCommand>,
    section: SectionKind,
) {
    next.step_error = None;
    next.step = match section {
        SectionKind::Opening => WizardStep::Objectives,
        SectionKind::Objectives => WizardStep::Constraints,
        SectionKind::Constraints => WizardStep::SummaryGeneration,
    };

    // Entering the waiting step kicks off summary generation exactly once
    if next.step == WizardStep::SummaryGeneration && next.summary.can_start() {
        next.summary = RequestPhase::InFlight;
        commands.push(WizardCommand::GenerateSummary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FeedbackSource, RiskFlag};

    fn feedback(delta: i32, flags: Vec<RiskFlag>) -> SectionFeedback {
        SectionFeedback {
            message: "feedback".to_string(),
            suggestions: vec![],
            risk_delta: delta,
            flags,
            source: FeedbackSource::FallbackHeuristic,
            fallback_reason: None,
        }
    }

    /// Drive a section from empty to evaluated to advanced
    fn complete_section(
        state: WizardRunState,
        section: SectionKind,
        text: &str,
        delta: i32,
    ) -> WizardRunState {
        let (state, _) = transition(
            &state,
            WizardEvent::InputChanged {
                section,
                text: text.to_string(),
            },
        );
        let (state, cmds) = transition(&state, WizardEvent::Submit);
        assert_eq!(
            cmds,
            vec![WizardCommand::EvaluateSection {
                section,
                input: text.trim().to_string(),
            }]
        );
        let epoch = state.epoch;
        let (state, _) = transition(
            &state,
            WizardEvent::EvaluationSucceeded {
                section,
                feedback: feedback(delta, vec![]),
                epoch,
            },
        );
        let (state, _) = transition(&state, WizardEvent::Submit);
        state
    }

    #[test]
    fn test_empty_input_blocks_submit() {
        let state = WizardRunState::new();
        let (state, cmds) = transition(&state, WizardEvent::Submit);
        assert!(cmds.is_empty());
        assert_eq!(state.step, WizardStep::Opening);
        assert!(state.step_error.is_some());

        // Whitespace-only input is still empty after trimming
        let (state, _) = transition(
            &state,
            WizardEvent::InputChanged {
                section: SectionKind::Opening,
                text: "   ".to_string(),
            },
        );
        let (state, cmds) = transition(&state, WizardEvent::Submit);
        assert!(cmds.is_empty());
        assert!(state.step_error.is_some());
    }

    #[test]
    fn test_first_submit_evaluates_second_advances() {
        let state = WizardRunState::new();
        let (state, _) = transition(
            &state,
            WizardEvent::InputChanged {
                section: SectionKind::Opening,
                text: "Project Nova — new initiative".to_string(),
            },
        );
        let (state, cmds) = transition(&state, WizardEvent::Submit);
        assert_eq!(cmds.len(), 1);
        assert_eq!(state.evaluation_in_flight, Some(SectionKind::Opening));
        assert_eq!(state.step, WizardStep::Opening);

        // A second Submit while the call is outstanding is suppressed
        let (state, cmds) = transition(&state, WizardEvent::Submit);
        assert!(cmds.is_empty());

        let epoch = state.epoch;
        let (state, _) = transition(
            &state,
            WizardEvent::EvaluationSucceeded {
                section: SectionKind::Opening,
                feedback: feedback(0, vec![]),
                epoch,
            },
        );
        // Feedback recorded, still on Opening showing the feedback
        assert_eq!(state.step, WizardStep::Opening);
        assert!(state.evaluation_in_flight.is_none());

        // Next Submit advances without re-evaluating
        let (state, cmds) = transition(&state, WizardEvent::Submit);
        assert!(cmds.is_empty());
        assert_eq!(state.step, WizardStep::Objectives);
    }

    #[test]
    fn test_risk_accumulates_across_sections() {
        let state = WizardRunState::new();
        let state = complete_section(state, SectionKind::Opening, "new product idea", 3);
        assert_eq!(state.risk.score, 3);
        let state = complete_section(
            state,
            SectionKind::Objectives,
            "improve conversion metric by 5 percent",
            5,
        );
        assert_eq!(state.risk.score, 8);
        assert_eq!(state.step, WizardStep::Constraints);
    }

    #[test]
    fn test_answer_locked_after_evaluation() {
        let state = WizardRunState::new();
        let state = complete_section(state, SectionKind::Opening, "new product idea", 0);
        let (state, _) = transition(
            &state,
            WizardEvent::InputChanged {
                section: SectionKind::Opening,
                text: "rewritten".to_string(),
            },
        );
        assert_eq!(
            state.answers.get(&SectionKind::Opening).unwrap(),
            "new product idea"
        );
    }

    #[test]
    fn test_evaluation_failure_blocks_and_reports() {
        let state = WizardRunState::new();
        let (state, _) = transition(
            &state,
            WizardEvent::InputChanged {
                section: SectionKind::Opening,
                text: "something".to_string(),
            },
        );
        let (state, _) = transition(&state, WizardEvent::Submit);
        let epoch = state.epoch;
        let (state, _) = transition(
            &state,
            WizardEvent::EvaluationFailed {
                section: SectionKind::Opening,
                error: "boom".to_string(),
                timed_out: true,
                epoch,
            },
        );
        assert_eq!(state.step, WizardStep::Opening);
        let err = state.step_error.clone().unwrap();
        assert!(err.timed_out);
        assert!(err.message.contains("timed out"));

        // Resubmitting retries the evaluation
        let (state, cmds) = transition(&state, WizardEvent::Submit);
        assert_eq!(cmds.len(), 1);
        assert!(state.step_error.is_none());
    }

    #[test]
    fn test_summary_triggered_once_on_entry() {
        let state = WizardRunState::new();
        let state = complete_section(state, SectionKind::Opening, "new product idea", 0);
        let state = complete_section(state, SectionKind::Objectives, "objectives text here", 0);

        // Completing constraints advances into SummaryGeneration
        let (state, _) = transition(
            &state,
            WizardEvent::InputChanged {
                section: SectionKind::Constraints,
                text: "constraints text here".to_string(),
            },
        );
        let (state, _) = transition(&state, WizardEvent::Submit);
        let epoch = state.epoch;
        let (state, _) = transition(
            &state,
            WizardEvent::EvaluationSucceeded {
                section: SectionKind::Constraints,
                feedback: feedback(0, vec![]),
                epoch,
            },
        );
        let (state, cmds) = transition(&state, WizardEvent::Submit);
        assert_eq!(state.step, WizardStep::SummaryGeneration);
        assert_eq!(cmds, vec![WizardCommand::GenerateSummary]);
        assert!(state.summary.is_in_flight());

        // Cannot advance while the summary is outstanding
        let (state, _) = transition(&state, WizardEvent::Advance);
        assert_eq!(state.step, WizardStep::SummaryGeneration);

        let (state, _) = transition(
            &state,
            WizardEvent::SummaryReady {
                summary: DesignRequestSummary {
                    problem: "p".to_string(),
                    desired_outcome: "o".to_string(),
                    users_impacted: "u".to_string(),
                    business_value: "b".to_string(),
                    constraints: "c".to_string(),
                },
                epoch,
            },
        );
        let (state, _) = transition(&state, WizardEvent::Advance);
        assert_eq!(state.step, WizardStep::OfferVisual);
    }

    fn state_at_offer_visual() -> WizardRunState {
        let state = WizardRunState::new();
        let state = complete_section(state, SectionKind::Opening, "new product idea", 0);
        let state = complete_section(state, SectionKind::Objectives, "objectives text here", 0);
        let state = complete_section(state, SectionKind::Constraints, "constraints text here", 0);
        let epoch = state.epoch;
        let (state, _) = transition(
            &state,
            WizardEvent::SummaryFailed {
                error: "unavailable".to_string(),
                epoch,
            },
        );
        // Failure still settles the waiting state
        let (state, _) = transition(&state, WizardEvent::Advance);
        assert_eq!(state.step, WizardStep::OfferVisual);
        state
    }

    #[test]
    fn test_opt_in_triggers_concept_and_mockup() {
        let state = state_at_offer_visual();
        let (state, cmds) = transition(&state, WizardEvent::ChooseVisual { wants_visual: true });
        assert_eq!(state.step, WizardStep::VisualConcept);
        assert_eq!(
            cmds,
            vec![
                WizardCommand::GenerateConcept { skip_visual: false },
                WizardCommand::GenerateMockup,
            ]
        );

        // Advancing is always allowed, even with both calls outstanding
        let (state, _) = transition(&state, WizardEvent::Advance);
        assert_eq!(state.step, WizardStep::Final);
    }

    #[test]
    fn test_opt_out_triggers_concept_in_skip_mode_only() {
        let state = state_at_offer_visual();
        let (state, cmds) = transition(&state, WizardEvent::ChooseVisual { wants_visual: false });
        assert_eq!(state.step, WizardStep::Final);
        assert_eq!(
            cmds,
            vec![WizardCommand::GenerateConcept { skip_visual: true }]
        );
        assert!(state.mockup.can_start());
    }

    #[test]
    fn test_concept_cannot_fire_for_both_branches() {
        let state = state_at_offer_visual();
        let (state, first) = transition(&state, WizardEvent::ChooseVisual { wants_visual: false });
        assert_eq!(first.len(), 1);
        // A second choice event (stale UI) is a no-op: the step moved on
        // and the choice is already recorded
        let (state, second) = transition(&state, WizardEvent::ChooseVisual { wants_visual: true });
        assert!(second.is_empty());
        assert_eq!(state.step, WizardStep::Final);
        assert_eq!(state.visual_requested, Some(false));
    }

    #[test]
    fn test_mockup_failure_is_not_retried() {
        let state = state_at_offer_visual();
        let (state, _) = transition(&state, WizardEvent::ChooseVisual { wants_visual: true });
        let epoch = state.epoch;
        let (state, _) = transition(
            &state,
            WizardEvent::MockupFailed {
                error: "image generation failed".to_string(),
                epoch,
            },
        );
        assert_eq!(
            state.mockup,
            RequestPhase::Failed("image generation failed".to_string())
        );
        // No event path restarts the mockup within the same run
        let (state, cmds) = transition(&state, WizardEvent::Advance);
        assert!(cmds.is_empty());
        assert_eq!(state.step, WizardStep::Final);
        assert!(!state.mockup.can_start());
    }

    #[test]
    fn test_stale_epoch_completions_are_ignored() {
        let state = WizardRunState::new();
        let (state, _) = transition(
            &state,
            WizardEvent::InputChanged {
                section: SectionKind::Opening,
                text: "something".to_string(),
            },
        );
        let (state, _) = transition(&state, WizardEvent::Submit);
        let stale_epoch = state.epoch;
        let (state, _) = transition(&state, WizardEvent::Reset);
        assert_eq!(state.epoch, stale_epoch + 1);

        // The late-arriving evaluation from before the reset must not land
        let (state, _) = transition(
            &state,
            WizardEvent::EvaluationSucceeded {
                section: SectionKind::Opening,
                feedback: feedback(10, vec![RiskFlag::SolutionBias]),
                epoch: stale_epoch,
            },
        );
        assert_eq!(state.risk.score, 0);
        assert!(state.feedback.is_empty());
    }

    #[test]
    fn test_reset_clears_everything() {
        let state = state_at_offer_visual();
        let (state, _) = transition(&state, WizardEvent::ChooseVisual { wants_visual: false });
        let before_id = state.run_id;
        let (state, cmds) = transition(&state, WizardEvent::Reset);
        assert!(cmds.is_empty());
        assert_eq!(state.step, WizardStep::Opening);
        assert_eq!(state.risk, RiskState::new());
        assert!(state.answers.is_empty());
        assert!(state.feedback.is_empty());
        assert!(state.summary.can_start());
        assert!(state.concept.can_start());
        assert!(state.mockup.can_start());
        assert!(state.visual_requested.is_none());
        assert_ne!(state.run_id, before_id);
    }

    #[test]
    fn test_revisit_is_read_only_navigation() {
        let state = WizardRunState::new();
        let state = complete_section(state, SectionKind::Opening, "new product idea", 0);
        assert_eq!(state.step, WizardStep::Objectives);

        let (state, cmds) = transition(
            &state,
            WizardEvent::Revisit {
                section: SectionKind::Opening,
            },
        );
        assert!(cmds.is_empty());
        assert_eq!(state.step, WizardStep::Opening);

        // Revisiting an unevaluated section is refused
        let (state, _) = transition(
            &state,
            WizardEvent::Revisit {
                section: SectionKind::Constraints,
            },
        );
        assert_eq!(state.step, WizardStep::Opening);
    }

    #[test]
    fn test_revisit_refused_on_final_step() {
        let state = state_at_offer_visual();
        let (state, _) = transition(&state, WizardEvent::ChooseVisual { wants_visual: false });
        assert_eq!(state.step, WizardStep::Final);

        let (state, cmds) = transition(
            &state,
            WizardEvent::Revisit {
                section: SectionKind::Opening,
            },
        );
        assert!(cmds.is_empty());
        assert_eq!(state.step, WizardStep::Final);
    }

    #[test]
    fn test_offer_visual_reentry_follows_recorded_choice() {
        let state = state_at_offer_visual();
        let (state, _) = transition(&state, WizardEvent::ChooseVisual { wants_visual: true });
        assert_eq!(state.step, WizardStep::VisualConcept);

        // Revisit an evaluated section, then walk forward through the
        // locked sections back to the choice step
        let (state, _) = transition(
            &state,
            WizardEvent::Revisit {
                section: SectionKind::Opening,
            },
        );
        assert_eq!(state.step, WizardStep::Opening);
        let (state, _) = transition(&state, WizardEvent::Submit);
        let (state, _) = transition(&state, WizardEvent::Submit);
        let (state, cmds) = transition(&state, WizardEvent::Submit);
        // Summary already settled: re-entering the waiting step issues nothing
        assert!(cmds.is_empty());
        assert_eq!(state.step, WizardStep::SummaryGeneration);
        let (state, _) = transition(&state, WizardEvent::Advance);
        assert_eq!(state.step, WizardStep::OfferVisual);

        // A second choice stays refused, but Advance follows the recorded
        // branch without re-issuing generation commands
        let (state, cmds) = transition(&state, WizardEvent::ChooseVisual { wants_visual: false });
        assert!(cmds.is_empty());
        assert_eq!(state.visual_requested, Some(true));
        let (state, cmds) = transition(&state, WizardEvent::Advance);
        assert!(cmds.is_empty());
        assert_eq!(state.step, WizardStep::VisualConcept);
    }

    #[test]
    fn test_diagnostics_toggle_only_on_final() {
        let state = WizardRunState::new();
        let (state, _) = transition(&state, WizardEvent::ToggleDiagnostics);
        assert!(!state.show_diagnostics);

        let state = state_at_offer_visual();
        let (state, _) = transition(&state, WizardEvent::ChooseVisual { wants_visual: false });
        let (state, _) = transition(&state, WizardEvent::ToggleDiagnostics);
        assert!(state.show_diagnostics);
        let (state, _) = transition(&state, WizardEvent::ToggleDiagnostics);
        assert!(!state.show_diagnostics);
    }

    #[test]
    fn test_step_helpers() {
        assert!(WizardStep::Final.is_terminal());
        assert!(!WizardStep::OfferVisual.is_terminal());
        assert_eq!(
            WizardStep::Objectives.section(),
            Some(SectionKind::Objectives)
        );
        assert_eq!(WizardStep::SummaryGeneration.section(), None);

        let state = WizardRunState::new();
        assert_eq!(state.current_input(), "");
        let (state, _) = transition(
            &state,
            WizardEvent::InputChanged {
                section: SectionKind::Opening,
                text: "  Project Nova  ".to_string(),
            },
        );
        assert_eq!(state.current_input(), "Project Nova");
    }

    #[test]
    fn test_duplicate_evaluation_success_is_ignored() {
        let state = WizardRunState::new();
        let state = complete_section(state, SectionKind::Opening, "new product idea", 5);
        assert_eq!(state.risk.score, 5);
        let epoch = state.epoch;
        // A duplicate success for an already-locked step must not re-apply
        let (state, _) = transition(
            &state,
            WizardEvent::EvaluationSucceeded {
                section: SectionKind::Opening,
                feedback: feedback(5, vec![]),
                epoch,
            },
        );
        assert_eq!(state.risk.score, 5);
    }
}
