//! core::types
//!
//! Strong types for values that reach a git command line.
//!
//! # Types
//!
//! - [`GitRef`] - A ref (branch, tag, or commit-ish) that passed format checks
//!
//! # Validation
//!
//! Refs arrive from pipeline definitions, which are untrusted. A `GitRef` can
//! only be obtained through [`GitRef::new`], so any `GitRef` handed to a git
//! invocation has already been checked: it cannot be read as an option, and
//! it cannot contain whitespace or revision syntax that would change the
//! meaning of the command.
//!
//! # Examples
//!
//! ```
//! use jobshell::core::types::{check_ref_format, GitRef};
//!
//! assert!(check_ref_format("hello/world"));
//! assert!(!check_ref_format("--option"));
//!
//! let main = GitRef::new("main").unwrap();
//! assert_eq!(main.as_str(), "main");
//! assert!(GitRef::new("two..dots").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    /// The string does not satisfy the ref-format grammar.
    #[error("{name:?} is not a valid git ref format")]
    InvalidRef {
        /// The rejected input, verbatim.
        name: String,
        /// Which rule it broke.
        reason: &'static str,
    },

    /// The string is not a remote location git understands.
    #[error("{url:?} is not a valid git URL: {reason}")]
    InvalidUrl {
        /// The rejected input, verbatim.
        url: String,
        /// Why parsing failed.
        reason: String,
    },
}

/// Characters that may never appear in a ref.
const FORBIDDEN_CHARS: [char; 8] = [' ', '~', '^', ':', '?', '*', '[', '\\'];

/// Check a ref against the ref-naming grammar.
///
/// This is a simplified `git check-ref-format`. It is total: every input,
/// including the empty string, produces an answer.
pub fn check_ref_format(name: &str) -> bool {
    ref_format_violation(name).is_none()
}

/// Return the first rule `name` breaks, if any.
fn ref_format_violation(name: &str) -> Option<&'static str> {
    if name.is_empty() {
        return Some("ref cannot be empty");
    }
    if name == "@" {
        return Some("ref cannot be '@'");
    }
    if name.starts_with('-') {
        return Some("ref cannot start with '-'");
    }
    if name.starts_with('.') || name.ends_with('.') {
        return Some("ref cannot start or end with '.'");
    }
    if name.contains("..") {
        return Some("ref cannot contain '..'");
    }
    if name.ends_with(".lock") {
        return Some("ref cannot end with '.lock'");
    }
    if name.ends_with('/') {
        return Some("ref cannot end with '/'");
    }
    if name.chars().any(|c| c.is_ascii_control()) {
        return Some("ref cannot contain control characters");
    }
    if name.chars().any(|c| FORBIDDEN_CHARS.contains(&c)) {
        return Some("ref cannot contain space, '~', '^', ':', '?', '*', '[' or '\\'");
    }
    if name.split('/').any(|segment| segment == "." || segment == "..") {
        return Some("ref path segments cannot be '.' or '..'");
    }
    None
}

/// A validated git ref.
///
/// # Example
///
/// ```
/// use jobshell::core::types::GitRef;
///
/// let tag = GitRef::new("v1.2.3").unwrap();
/// assert_eq!(tag.to_string(), "v1.2.3");
///
/// let err = GitRef::new("--nope").unwrap_err();
/// assert_eq!(err.to_string(), r#""--nope" is not a valid git ref format"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GitRef(String);

impl GitRef {
    /// Create a new validated ref.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidRef` naming the input if it violates the
    /// ref-format grammar.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        match ref_format_violation(&name) {
            None => Ok(Self(name)),
            Some(reason) => Err(TypeError::InvalidRef { name, reason }),
        }
    }

    /// Get the ref as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for GitRef {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<GitRef> for String {
    fn from(r: GitRef) -> Self {
        r.0
    }
}

impl AsRef<str> for GitRef {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GitRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod check_ref_format {
        use super::*;

        #[test]
        fn truth_table() {
            let table = [
                ("hello", true),
                ("hello-world", true),
                ("hello/world", true),
                ("--option", false),
                (" leadingspace", false),
                ("has space", false),
                ("has~tilde", false),
                ("has^caret", false),
                ("has:colon", false),
                ("has\x07control", false),
                ("has\x7fdel", false),
                ("endswithdot.", false),
                ("two..dots", false),
                ("@", false),
                ("back\\slash", false),
            ];
            for (name, want) in table {
                assert_eq!(check_ref_format(name), want, "check_ref_format({name:?})");
            }
        }

        #[test]
        fn accepts_common_refs() {
            assert!(check_ref_format("main"));
            assert!(check_ref_format("refs/heads/feature/foo"));
            assert!(check_ref_format("v1.2.3"));
            assert!(check_ref_format("HEAD@{1}"));
            assert!(check_ref_format("a1b2c3d4e5f60718293a4b5c6d7e8f9012345678"));
        }

        #[test]
        fn empty_rejected() {
            assert!(!check_ref_format(""));
        }

        #[test]
        fn leading_dot_rejected() {
            assert!(!check_ref_format(".hidden"));
        }

        #[test]
        fn lock_suffix_rejected() {
            assert!(!check_ref_format("branch.lock"));
            assert!(!check_ref_format("refs/heads/x.lock"));
        }

        #[test]
        fn trailing_slash_rejected() {
            assert!(!check_ref_format("branch/"));
        }

        #[test]
        fn glob_and_bracket_rejected() {
            assert!(!check_ref_format("feat*"));
            assert!(!check_ref_format("feat?"));
            assert!(!check_ref_format("feat[1]"));
        }

        #[test]
        fn dot_segments_rejected() {
            assert!(!check_ref_format("a/./b"));
            assert!(!check_ref_format("a/../b"));
        }

        #[test]
        fn newline_rejected() {
            assert!(!check_ref_format("main\n--exec=evil"));
        }
    }

    mod git_ref {
        use super::*;

        #[test]
        fn valid_ref_round_trips() {
            let r = GitRef::new("feature/x").unwrap();
            assert_eq!(r.as_str(), "feature/x");
            assert_eq!(String::from(r), "feature/x");
        }

        #[test]
        fn error_names_the_value() {
            let err = GitRef::new("  --hello").unwrap_err();
            assert_eq!(err.to_string(), r#""  --hello" is not a valid git ref format"#);
        }

        #[test]
        fn error_carries_reason() {
            match GitRef::new("two..dots") {
                Err(TypeError::InvalidRef { reason, .. }) => assert!(reason.contains("..")),
                other => panic!("expected InvalidRef, got {other:?}"),
            }
        }

        #[test]
        fn deserialize_validates() {
            let ok: Result<GitRef, _> = serde_json::from_str(r#""main""#);
            assert!(ok.is_ok());
            let bad: Result<GitRef, _> = serde_json::from_str(r#""-x""#);
            assert!(bad.is_err());
        }
    }
}
