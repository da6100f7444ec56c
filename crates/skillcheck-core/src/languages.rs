//! Language registry: human-readable language names to judge backend ids.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric language identifier understood by the judge backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageId(pub u32);

impl fmt::Display for LanguageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entry of [`LanguageRegistry::list`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageInfo {
    pub id: LanguageId,
    pub name: String,
    pub display_name: String,
}

/// Judge0 CE language ids, in registration order.
const BUILTIN: &[(&str, u32)] = &[
    ("javascript", 63),
    ("typescript", 74),
    ("python", 71),
    ("cpp", 54),
    ("java", 62),
    ("c", 50),
    ("csharp", 51),
    ("php", 68),
    ("ruby", 72),
    ("go", 60),
    ("rust", 73),
    ("sql", 82),
    ("bash", 46),
    ("html", 43),
];

/// Backend used for any name the registry does not know (JavaScript).
pub const DEFAULT_LANGUAGE_ID: LanguageId = LanguageId(63);

/// Case-insensitive name → backend id lookup table.
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    entries: Vec<(String, LanguageId)>,
    default_id: LanguageId,
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl LanguageRegistry {
    /// The Judge0 CE table.
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN
                .iter()
                .map(|(name, id)| (name.to_string(), LanguageId(*id)))
                .collect(),
            default_id: DEFAULT_LANGUAGE_ID,
        }
    }

    /// Resolve a language name. Unknown names fall back to the default
    /// backend, so the result is always a valid id.
    pub fn resolve(&self, name: &str) -> LanguageId {
        self.lookup(name).unwrap_or_else(|| {
            tracing::debug!(language = name, fallback = %self.default_id, "unknown language, using default backend");
            self.default_id
        })
    }

    /// Strict lookup, `None` for unknown names.
    pub fn lookup(&self, name: &str) -> Option<LanguageId> {
        let needle = name.trim().to_lowercase();
        self.entries
            .iter()
            .find(|(n, _)| *n == needle)
            .map(|(_, id)| *id)
    }

    /// All registered languages in registration order.
    pub fn list(&self) -> Vec<LanguageInfo> {
        self.entries
            .iter()
            .map(|(name, id)| LanguageInfo {
                id: *id,
                name: name.clone(),
                display_name: capitalize(name),
            })
            .collect()
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
