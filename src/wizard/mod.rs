// Wizard state machine - the ordered intake flow, modeled as an immutable
// run state plus a pure transition function

mod machine;

pub use machine::{
    transition, RequestPhase, StepError, WizardCommand, WizardEvent, WizardRunState, WizardStep,
};
