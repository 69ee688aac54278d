// Testing module.
// Finds changed tests, classifies them, and runs them with the right tool.

pub mod changes;
pub mod kind;
pub mod runner;

pub use changes::{ChangeSummary, changed_tests};
pub use kind::TestKind;
pub use runner::TestRunner;
