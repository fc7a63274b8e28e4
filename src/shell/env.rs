//! shell::env
//!
//! Per-shell environment variables.
//!
//! Each [`Environment`] is a private snapshot: mutating it never touches the
//! parent process environment, and two shells created from the same process
//! environment do not see each other's changes. On Windows, names are
//! case-insensitive and stored upper-cased.

use std::collections::BTreeMap;

/// An ordered name to value mapping handed to child processes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    /// Create an empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the current process environment.
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped.
    pub fn from_process() -> Self {
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }

    /// Get a variable's value.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(&normalize(name)).map(String::as_str)
    }

    /// Whether a variable is set.
    pub fn exists(&self, name: &str) -> bool {
        self.vars.contains_key(&normalize(name))
    }

    /// Set a variable, returning the previous value.
    pub fn set(&mut self, name: impl AsRef<str>, value: impl Into<String>) -> Option<String> {
        self.vars.insert(normalize(name.as_ref()), value.into())
    }

    /// Remove a variable, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.vars.remove(&normalize(name))
    }

    /// Iterate over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Render as `NAME=value` strings.
    pub fn to_vec(&self) -> Vec<String> {
        self.iter().map(|(k, v)| format!("{k}={v}")).collect()
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Whether no variables are set.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Environment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut env = Environment::new();
        for (k, v) in iter {
            env.set(k, v);
        }
        env
    }
}

#[cfg(windows)]
fn normalize(name: &str) -> String {
    name.to_uppercase()
}

#[cfg(not(windows))]
fn normalize(name: &str) -> String {
    name.to_string()
}
