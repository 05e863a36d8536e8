// Clippy allows for reasonable defaults
#![allow(clippy::collapsible_if)] // Separate ifs can be more readable
#![allow(clippy::needless_borrow)] // Explicit borrows can clarify ownership

// Module declarations
pub mod assemblers;
pub mod evaluator;
pub mod gateway;
pub mod models;
pub mod risk;
pub mod server;
pub mod wizard;

// Re-export the core types for embedding the wizard directly
pub use models::*;
pub use risk::{recommended_action, RiskState};
pub use wizard::{
    transition, RequestPhase, WizardCommand, WizardEvent, WizardRunState, WizardStep,
};
