// End-to-end wizard runs driven through the pure transition function, with
// the fallback heuristic standing in for the evaluation driver.

use design_intake_lib::evaluator::heuristic;
use design_intake_lib::models::{DesignRequestSummary, RecommendedAction, SectionKind};
use design_intake_lib::wizard::{
    transition, WizardCommand, WizardEvent, WizardRunState, WizardStep,
};

/// Apply every command the way the real driver would, using the heuristic
/// for evaluations and canned results for generation calls.
fn run_commands(state: WizardRunState, commands: Vec<WizardCommand>) -> WizardRunState {
    let mut state = state;
    for command in commands {
        let epoch = state.epoch;
        let event = match command {
            WizardCommand::EvaluateSection { section, input } => WizardEvent::EvaluationSucceeded {
                section,
                feedback: heuristic::evaluate(section, &input),
                epoch,
            },
            WizardCommand::GenerateSummary => WizardEvent::SummaryReady {
                summary: DesignRequestSummary {
                    problem: "Checkout is slow".to_string(),
                    desired_outcome: "Cut checkout time by 20 percent".to_string(),
                    users_impacted: "All shoppers".to_string(),
                    business_value: "Higher conversion".to_string(),
                    constraints: "Q3 launch".to_string(),
                },
                epoch,
            },
            WizardCommand::GenerateConcept { .. } => WizardEvent::ConceptFailed {
                error: "AI unavailable".to_string(),
                epoch,
            },
            WizardCommand::GenerateMockup => WizardEvent::MockupFailed {
                error: "AI unavailable".to_string(),
                epoch,
            },
        };
        let (next, more) = transition(&state, event);
        state = run_commands(next, more);
    }
    state
}

fn answer_and_submit(state: WizardRunState, section: SectionKind, text: &str) -> WizardRunState {
    let (state, _) = transition(
        &state,
        WizardEvent::InputChanged {
            section,
            text: text.to_string(),
        },
    );
    let (state, commands) = transition(&state, WizardEvent::Submit);
    let state = run_commands(state, commands);
    // Second submit advances past the recorded feedback
    let (state, commands) = transition(&state, WizardEvent::Submit);
    run_commands(state, commands)
}

#[test]
fn full_run_with_clean_answers_is_backlog_ready() {
    let state = WizardRunState::new();
    let state = answer_and_submit(state, SectionKind::Opening, "Project Nova — new initiative");
    assert_eq!(state.step, WizardStep::Objectives);

    let state = answer_and_submit(
        state,
        SectionKind::Objectives,
        "Cut checkout completion time by 20 percent for the payments team this quarter",
    );
    assert_eq!(state.step, WizardStep::Constraints);

    let state = answer_and_submit(
        state,
        SectionKind::Constraints,
        "Must ship by Q3; payments team has a hard dependency on the billing migration timeline",
    );
    assert_eq!(state.step, WizardStep::SummaryGeneration);
    assert!(state.summary.is_settled());

    assert_eq!(state.risk.score, 0);
    assert_eq!(state.recommended_action(), RecommendedAction::BacklogReady);

    let (state, _) = transition(&state, WizardEvent::Advance);
    assert_eq!(state.step, WizardStep::OfferVisual);

    // Opt out: concept still generated (skip mode), mockup never requested
    let (state, commands) = transition(&state, WizardEvent::ChooseVisual { wants_visual: false });
    assert_eq!(
        commands,
        vec![WizardCommand::GenerateConcept { skip_visual: true }]
    );
    let state = run_commands(state, commands);
    assert_eq!(state.step, WizardStep::Final);
    assert!(state.mockup.can_start());
}

#[test]
fn weak_answers_accumulate_risk_and_flags() {
    let state = WizardRunState::new();
    // No initiative keyword: +3, no flag
    let state = answer_and_submit(state, SectionKind::Opening, "Checkout revamp");
    assert_eq!(state.risk.score, 3);

    // Solution-biased, no metrics, no stakeholders: +10
    let state = answer_and_submit(state, SectionKind::Objectives, "build a dashboard for ops");
    assert_eq!(state.risk.score, 13);
    assert_eq!(state.risk.flags.len(), 3);

    // Placeholder answer: +5, incomplete flag
    let state = answer_and_submit(state, SectionKind::Constraints, "tbd");
    assert_eq!(state.risk.score, 18);
    assert_eq!(state.risk.flags.len(), 4);

    // Flags present, score under 45: clarification call
    assert_eq!(
        state.recommended_action(),
        RecommendedAction::ClarificationCallRecommended
    );
}

#[test]
fn opt_in_branch_reaches_final_despite_failed_generation() {
    let state = WizardRunState::new();
    let state = answer_and_submit(state, SectionKind::Opening, "Project Nova — new initiative");
    let state = answer_and_submit(
        state,
        SectionKind::Objectives,
        "Cut checkout completion time by 20 percent for the payments team",
    );
    let state = answer_and_submit(
        state,
        SectionKind::Constraints,
        "Q3 deadline with a dependency on the platform team",
    );
    let (state, _) = transition(&state, WizardEvent::Advance);

    let (state, commands) = transition(&state, WizardEvent::ChooseVisual { wants_visual: true });
    assert_eq!(commands.len(), 2);
    let state = run_commands(state, commands);
    assert_eq!(state.step, WizardStep::VisualConcept);
    // Both generations failed in this run; forward progress is unaffected
    let (state, _) = transition(&state, WizardEvent::Advance);
    assert_eq!(state.step, WizardStep::Final);
    assert!(!state.concept.can_start());
    assert!(!state.mockup.can_start());
}

#[test]
fn reset_from_final_returns_to_a_fresh_run() {
    let state = WizardRunState::new();
    let state = answer_and_submit(state, SectionKind::Opening, "Checkout revamp");
    let state = answer_and_submit(state, SectionKind::Objectives, "build a dashboard for ops");
    let state = answer_and_submit(state, SectionKind::Constraints, "tbd");
    let (state, _) = transition(&state, WizardEvent::Advance);
    let (state, _) = transition(&state, WizardEvent::ChooseVisual { wants_visual: false });
    assert_eq!(state.step, WizardStep::Final);
    assert!(state.risk.score > 0);

    let (state, _) = transition(&state, WizardEvent::Reset);
    assert_eq!(state.step, WizardStep::Opening);
    assert_eq!(state.risk.score, 0);
    assert!(state.risk.flags.is_empty());
    assert!(state.answers.is_empty());
    assert!(state.feedback.is_empty());
    assert!(state.summary.can_start());
    assert_eq!(state.recommended_action(), RecommendedAction::BacklogReady);
}

#[test]
fn transition_is_deterministic_for_identical_inputs() {
    let state = WizardRunState::new();
    let event = WizardEvent::InputChanged {
        section: SectionKind::Opening,
        text: "Project Nova".to_string(),
    };
    let (a, a_cmds) = transition(&state, event.clone());
    let (b, b_cmds) = transition(&state, event);
    assert_eq!(a.answers, b.answers);
    assert_eq!(a.step, b.step);
    assert_eq!(a_cmds, b_cmds);
}
