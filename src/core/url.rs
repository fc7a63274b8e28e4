//! core::url
//!
//! Normalization of the remote locations git accepts.
//!
//! # Forms
//!
//! - Scheme URLs (`ssh://`, `https://`, `file://`, ...) are parsed as-is.
//! - scp-like shorthand (`user@host:path`) becomes `ssh://user@host/path`.
//! - Anything else is a filesystem path and is kept exactly as written.
//!   Absolute paths are shown as `file://` URLs; relative paths have no URL
//!   form and are shown as the path itself.
//!
//! # Example
//!
//! ```
//! use jobshell::core::url::parse_gittable_url;
//!
//! let url = parse_gittable_url("git@github.com:buildkite/agent.git").unwrap();
//! assert_eq!(url.as_str(), "ssh://git@github.com/buildkite/agent.git");
//! assert_eq!(url.host(), "github.com");
//!
//! let local = parse_gittable_url("/srv/git/a/../b").unwrap();
//! assert_eq!(local.as_str(), "file:///srv/git/a/../b");
//! assert_eq!(local.path(), "/srv/git/a/../b");
//! ```

use std::borrow::Cow;

use percent_encoding::percent_decode_str;
use url::Url;

use super::types::TypeError;

/// A parsed and normalized git remote location.
///
/// Only produced by [`parse_gittable_url`], so holding one means the input
/// was recognized.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GitUrl {
    repr: Repr,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Repr {
    Remote(Url),
    /// A filesystem path as written, with its display form.
    Local { path: String, display: String },
}

impl GitUrl {
    /// The URL scheme (`ssh`, `https`, `file`, ...).
    pub fn scheme(&self) -> &str {
        match &self.repr {
            Repr::Remote(url) => url.scheme(),
            Repr::Local { .. } => "file",
        }
    }

    /// The user component, if one was given.
    pub fn user(&self) -> Option<&str> {
        match &self.repr {
            Repr::Remote(url) => Some(url.username()).filter(|u| !u.is_empty()),
            Repr::Local { .. } => None,
        }
    }

    /// The host without any port. Empty for local paths and `file://` URLs.
    pub fn hostname(&self) -> &str {
        match &self.repr {
            Repr::Remote(url) => url.host_str().unwrap_or(""),
            Repr::Local { .. } => "",
        }
    }

    /// The explicit port, if the URL carried one.
    pub fn port(&self) -> Option<u16> {
        match &self.repr {
            Repr::Remote(url) => url.port(),
            Repr::Local { .. } => None,
        }
    }

    /// The host with its explicit port appended (`scm.example:7999`).
    pub fn host(&self) -> String {
        match self.port() {
            Some(port) => format!("{}:{port}", self.hostname()),
            None => self.hostname().to_string(),
        }
    }

    /// The path component, percent-decoded.
    ///
    /// For filesystem paths this is the input unchanged.
    pub fn path(&self) -> Cow<'_, str> {
        match &self.repr {
            Repr::Remote(url) => percent_decode_str(url.path()).decode_utf8_lossy(),
            Repr::Local { path, .. } => Cow::Borrowed(path),
        }
    }

    /// Whether git would reach this remote over ssh.
    pub fn is_ssh(&self) -> bool {
        matches!(self.scheme(), "ssh" | "git+ssh")
    }

    /// Whether this is a filesystem path rather than a URL.
    pub fn is_local_path(&self) -> bool {
        matches!(self.repr, Repr::Local { .. })
    }

    /// The canonical string form.
    pub fn as_str(&self) -> &str {
        match &self.repr {
            Repr::Remote(url) => url.as_str(),
            Repr::Local { display, .. } => display,
        }
    }
}

impl std::fmt::Display for GitUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse any remote form git recognizes into a [`GitUrl`].
///
/// # Errors
///
/// Returns `TypeError::InvalidUrl` for empty input, input containing control
/// characters, and scheme URLs that do not parse.
pub fn parse_gittable_url(raw: &str) -> Result<GitUrl, TypeError> {
    let invalid = |reason: String| TypeError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };

    if raw.trim().is_empty() {
        return Err(invalid("URL cannot be empty".into()));
    }
    if raw.chars().any(|c| c.is_control()) {
        return Err(invalid("URL cannot contain control characters".into()));
    }

    let remote = if has_scheme(raw) {
        raw.to_string()
    } else if let Some((user, host, path)) = split_scp_like(raw) {
        match user {
            Some(user) => format!("ssh://{user}@{host}/{path}"),
            None => format!("ssh://{host}/{path}"),
        }
    } else {
        return Ok(GitUrl {
            repr: Repr::Local {
                path: raw.to_string(),
                display: local_display(raw),
            },
        });
    };

    let url = Url::parse(&remote).map_err(|e| invalid(e.to_string()))?;
    Ok(GitUrl {
        repr: Repr::Remote(url),
    })
}

/// `file://` form of an absolute path; relative paths are returned as-is.
fn local_display(path: &str) -> String {
    let slashed = path.replace('\\', "/");
    if slashed.starts_with('/') {
        format!("file://{slashed}")
    } else if is_drive_absolute(path) {
        format!("file:///{slashed}")
    } else {
        path.to_string()
    }
}

/// `C:\...` or `C:/...`.
fn is_drive_absolute(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && matches!(bytes[2], b'\\' | b'/')
}

/// Whether `raw` starts with `scheme://`.
fn has_scheme(raw: &str) -> bool {
    let Some((scheme, _)) = raw.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Split `[user@]host:path` into its parts.
///
/// Single-character hosts are rejected so that Windows drive letters
/// (`C:\repo`) stay paths.
fn split_scp_like(raw: &str) -> Option<(Option<&str>, &str, &str)> {
    let (head, path) = raw.split_once(':')?;
    let (user, host) = match head.rsplit_once('@') {
        Some((user, host)) => (Some(user), host),
        None => (None, head),
    };
    if host.chars().count() < 2 || host.contains(['/', '\\']) {
        return None;
    }
    if user.is_some_and(|u| u.is_empty() || u.contains(['/', '\\'])) {
        return None;
    }
    let path = path.strip_prefix('/').unwrap_or(path);
    if path.is_empty() {
        return None;
    }
    Some((user, host, path))
}
