// Extension module.
// Locates modules, themes, and profiles in the local Drupal tree.

pub mod discovery;
pub mod kind;

pub use discovery::{Extension, ExtensionIndex};
pub use kind::ExtensionKind;
