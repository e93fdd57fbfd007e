//! Cache key derivation.
//!
//! Parts are lower-cased and stripped of every non-alphanumeric character,
//! then joined with [`KEY_DELIMITER`] behind a namespace tag:
//! `storefront:ministryoftruth:secret`.
//!
//! Normalization is lossy: `"A B"` and `"AB"` derive the same part. Keys are
//! not length-capped.

use once_cell::sync::Lazy;
use regex::Regex;

/// Separator between namespace and parts.
pub const KEY_DELIMITER: char = ':';

static NON_ALNUM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{N}]+").expect("valid keysafe regex"));

/// Lower-cases `value` and removes every non-alphanumeric character.
pub fn make_keysafe(value: &str) -> String {
    NON_ALNUM_RE.replace_all(value, "").to_lowercase()
}

/// Namespaced key deriver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySpace {
    namespace: &'static str,
}

impl KeySpace {
    pub const fn new(namespace: &'static str) -> Self {
        Self { namespace }
    }

    pub fn namespace(&self) -> &'static str {
        self.namespace
    }

    /// Derives the key for an ordered sequence of parts.
    ///
    /// With no parts the key is the bare namespace.
    pub fn derive<I, S>(&self, parts: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut key = String::from(self.namespace);
        for part in parts {
            key.push(KEY_DELIMITER);
            key.push_str(&make_keysafe(part.as_ref()));
        }
        key
    }
}
