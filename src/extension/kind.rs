// Extension kinds.
// The closed set of installable unit types found in a Drupal tree.

use std::fmt;

/// Type of a Drupal extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExtensionKind {
    Module,
    Theme,
    Profile,
}

impl ExtensionKind {
    /// Lookup order used when only a machine name is known.
    pub const SEARCH_ORDER: [ExtensionKind; 3] = [
        ExtensionKind::Module,
        ExtensionKind::Theme,
        ExtensionKind::Profile,
    ];

    /// Parse the `type` key of an info file.
    pub fn from_info_type(value: &str) -> Option<Self> {
        match value.trim() {
            "module" => Some(ExtensionKind::Module),
            "theme" => Some(ExtensionKind::Theme),
            "profile" => Some(ExtensionKind::Profile),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExtensionKind::Module => "module",
            ExtensionKind::Theme => "theme",
            ExtensionKind::Profile => "profile",
        }
    }
}

impl fmt::Display for ExtensionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
