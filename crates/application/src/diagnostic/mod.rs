//! Diagnostic questionnaire: the wizard state machine and its API flow.

mod flow;
mod wizard;

pub use flow::{DiagnosticFlow, PdfReport};
pub use wizard::{DiagnosticWizard, SummaryAxis, SummaryItem, WizardCursor, WizardError};
