//! git::ssh
//!
//! Resolving ssh host aliases to the host and port ssh would connect to.
//!
//! `ssh -G <host>` prints the effective client configuration for a host,
//! after `Host` blocks, `Include`s, and `HostName` aliases are applied.
//! Clients that predate `-G` fail with "unknown option"; for those the host
//! is used as given.

use tokio_util::sync::CancellationToken;

use super::runner::ShellRunner;
use super::GitError;
use crate::core::url::GitUrl;
use crate::shell::ShellError;

const DEFAULT_SSH_PORT: &str = "22";

/// Resolve `host` through the ssh client configuration.
///
/// Returns `hostname` when the effective port is the default, otherwise
/// `hostname:port`. Falls back to `host` unchanged when ssh cannot answer.
///
/// # Errors
///
/// Only cancellation is an error; every other failure degrades to `host`.
pub async fn resolve_host<R: ShellRunner + ?Sized>(
    cancel: &CancellationToken,
    sh: &R,
    host: &str,
) -> Result<String, GitError> {
    if host.is_empty() || host.starts_with('-') {
        tracing::debug!(host, "not resolving host that looks like an option");
        return Ok(host.to_string());
    }

    let output = match sh.run_and_capture(cancel, "ssh", &["-G", host]).await {
        Ok(output) => output,
        Err(e @ ShellError::Cancelled { .. }) => return Err(e.into()),
        Err(e) if cancel.is_cancelled() => return Err(e.into()),
        Err(ShellError::Exit(e)) if e.stderr.contains("unknown option") => {
            tracing::debug!(host, "ssh does not support -G, using host as given");
            return Ok(host.to_string());
        }
        Err(e) => {
            tracing::warn!(host, error = %e, "failed to resolve ssh host, using host as given");
            return Ok(host.to_string());
        }
    };

    let resolved = parse_ssh_config(&output, host);
    if resolved != host {
        tracing::debug!(host, resolved = %resolved, "resolved ssh host alias");
    }
    Ok(resolved)
}

/// The host a remote URL will actually reach over ssh.
///
/// Returns `None` for remotes not reached over ssh. An explicit port in the
/// URL wins over ssh configuration.
pub async fn known_host_for<R: ShellRunner + ?Sized>(
    cancel: &CancellationToken,
    sh: &R,
    url: &GitUrl,
) -> Result<Option<String>, GitError> {
    if !url.is_ssh() {
        return Ok(None);
    }
    if url.port().is_some() {
        return Ok(Some(url.host()));
    }
    resolve_host(cancel, sh, url.hostname()).await.map(Some)
}

/// Extract `hostname[:port]` from `ssh -G` output.
fn parse_ssh_config(output: &str, fallback: &str) -> String {
    let mut hostname = None;
    let mut port = None;
    for line in output.lines() {
        let Some((key, value)) = line.trim().split_once(char::is_whitespace) else {
            continue;
        };
        match key.to_ascii_lowercase().as_str() {
            "hostname" => hostname = Some(value.trim()),
            "port" => port = Some(value.trim()),
            _ => {}
        }
    }

    let hostname = hostname.filter(|h| !h.is_empty()).unwrap_or(fallback);
    match port {
        Some(port) if port != DEFAULT_SSH_PORT && !port.is_empty() => format!("{hostname}:{port}"),
        _ => hostname.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::url::parse_gittable_url;
    use crate::git::mock::{MockResponse, MockShellRunner};

    const ALIAS_OUTPUT: &str =
        "user buildkite\nhostname github.com\nport 22\naddkeystoagent false\nbatchmode no\n";
    const CUSTOM_PORT_OUTPUT: &str =
        "user cool-admin\nhostname rad-git-host.com\nport 443\nsendenv LC_*\n";
    const NO_G_STDERR: &str =
        "unknown option -- G\nusage: ssh [-1246AaCfgKkMNnqsTtVvXxYy] [-b bind_address]\n";

    fn cancel() -> CancellationToken {
        CancellationToken::new()
    }

    #[tokio::test]
    async fn resolves_alias_with_default_port() {
        let sh = MockShellRunner::new();
        sh.respond(MockResponse::Success(ALIAS_OUTPUT.into()));
        let host = resolve_host(&cancel(), &sh, "github.com-alias1").await.unwrap();
        assert_eq!(host, "github.com");
        assert_eq!(sh.calls(), vec![vec!["ssh", "-G", "github.com-alias1"]]);
    }

    #[tokio::test]
    async fn resolves_alias_with_custom_port() {
        let sh = MockShellRunner::new();
        sh.respond(MockResponse::Success(CUSTOM_PORT_OUTPUT.into()));
        let host = resolve_host(&cancel(), &sh, "cool-alias").await.unwrap();
        assert_eq!(host, "rad-git-host.com:443");
    }

    #[tokio::test]
    async fn old_client_returns_host_unchanged() {
        let sh = MockShellRunner::new();
        for host in ["github.com-alias1", "blargh-no-alias.com"] {
            sh.respond(MockResponse::Exit {
                code: 255,
                stderr: NO_G_STDERR.into(),
            });
            assert_eq!(resolve_host(&cancel(), &sh, host).await.unwrap(), host);
        }
        assert_eq!(sh.call_count(), 2);
    }

    #[tokio::test]
    async fn missing_client_returns_host_unchanged() {
        let sh = MockShellRunner::new();
        sh.respond(MockResponse::StartFailure);
        assert_eq!(resolve_host(&cancel(), &sh, "example.com").await.unwrap(), "example.com");
    }

    #[tokio::test]
    async fn option_like_host_is_not_passed_to_ssh() {
        let sh = MockShellRunner::new();
        let host = resolve_host(&cancel(), &sh, "-oProxyCommand=id").await.unwrap();
        assert_eq!(host, "-oProxyCommand=id");
        assert_eq!(sh.call_count(), 0);
    }

    #[tokio::test]
    async fn cancellation_is_an_error() {
        let sh = MockShellRunner::new();
        let token = cancel();
        token.cancel();
        assert!(resolve_host(&token, &sh, "github.com").await.is_err());
    }

    #[test]
    fn parse_ignores_other_keys_and_case() {
        assert_eq!(parse_ssh_config("HostName a.example\nPort 2222\n", "x"), "a.example:2222");
        assert_eq!(parse_ssh_config("user bob\n", "fallback"), "fallback");
        assert_eq!(parse_ssh_config("", "fallback"), "fallback");
    }

    #[tokio::test]
    async fn known_host_for_ssh_url_is_resolved() {
        let sh = MockShellRunner::new();
        sh.respond(MockResponse::Success(ALIAS_OUTPUT.into()));
        let url = parse_gittable_url("git@github.com-alias1:buildkite/agent.git").unwrap();
        let host = known_host_for(&cancel(), &sh, &url).await.unwrap();
        assert_eq!(host.as_deref(), Some("github.com"));
    }

    #[tokio::test]
    async fn known_host_for_explicit_port_skips_ssh() {
        let sh = MockShellRunner::new();
        let url = parse_gittable_url("ssh://git@scm.xxx:7999/yyy/zzz.git").unwrap();
        let host = known_host_for(&cancel(), &sh, &url).await.unwrap();
        assert_eq!(host.as_deref(), Some("scm.xxx:7999"));
        assert_eq!(sh.call_count(), 0);
    }

    #[tokio::test]
    async fn known_host_for_https_is_none() {
        let sh = MockShellRunner::new();
        let url = parse_gittable_url("https://github.com/buildkite/agent.git").unwrap();
        assert_eq!(known_host_for(&cancel(), &sh, &url).await.unwrap(), None);
        assert_eq!(sh.call_count(), 0);
    }
}
