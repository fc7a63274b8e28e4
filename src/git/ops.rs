//! git::ops
//!
//! Argv construction for the git subcommands used to prepare a checkout.
//!
//! # Invariants
//!
//! - Every call is a single argv handed to the runner; nothing is
//!   interpolated into a shell string except the nested command of
//!   [`clean_submodules`], which only ever holds configuration flags and
//!   rejects any token a shell would interpret.
//! - Positional repository and path arguments follow `--`.
//! - A ref is validated before anything is run.

use tokio_util::sync::CancellationToken;

use super::runner::ShellRunner;
use super::GitError;
use crate::core::config::GitConfig;
use crate::core::types::GitRef;

/// `git checkout <flags> <ref>`
pub async fn checkout<R: ShellRunner + ?Sized>(
    cancel: &CancellationToken,
    sh: &R,
    flags: &str,
    reference: &str,
) -> Result<(), GitError> {
    let reference = GitRef::new(reference)?;
    let mut args = vec!["checkout"];
    args.extend(flags.split_whitespace());
    args.push(reference.as_str());
    sh.run(cancel, "git", &args).await?;
    Ok(())
}

/// `git clone <flags> -- <repo> <dir>`
pub async fn clone<R: ShellRunner + ?Sized>(
    cancel: &CancellationToken,
    sh: &R,
    flags: &str,
    repo: &str,
    dir: &str,
) -> Result<(), GitError> {
    let mut args = vec!["clone"];
    args.extend(flags.split_whitespace());
    args.extend(["--", repo, dir]);
    sh.run(cancel, "git", &args).await?;
    Ok(())
}

/// `git clean <flags>`
pub async fn clean<R: ShellRunner + ?Sized>(
    cancel: &CancellationToken,
    sh: &R,
    flags: &str,
) -> Result<(), GitError> {
    let mut args = vec!["clean"];
    args.extend(flags.split_whitespace());
    sh.run(cancel, "git", &args).await?;
    Ok(())
}

/// `git submodule foreach --recursive "git clean <flags>"`
///
/// git runs the nested command through a shell in each submodule, so every
/// flag must be made of characters a shell takes literally.
pub async fn clean_submodules<R: ShellRunner + ?Sized>(
    cancel: &CancellationToken,
    sh: &R,
    flags: &str,
) -> Result<(), GitError> {
    let mut nested = vec!["git", "clean"];
    for flag in flags.split_whitespace() {
        if !is_shell_literal(flag) {
            return Err(GitError::UnsafeFlag {
                flag: flag.to_string(),
            });
        }
        nested.push(flag);
    }
    let nested = nested.join(" ");
    sh.run(cancel, "git", &["submodule", "foreach", "--recursive", &nested])
        .await?;
    Ok(())
}

/// `git fetch <flags> -- <repo> <refs...>`
pub async fn fetch<R: ShellRunner + ?Sized>(
    cancel: &CancellationToken,
    sh: &R,
    flags: &str,
    repo: &str,
    refs: &[&str],
) -> Result<(), GitError> {
    let mut args = vec!["fetch"];
    args.extend(flags.split_whitespace());
    args.extend(["--", repo]);
    args.extend(refs.iter().copied());
    sh.run(cancel, "git", &args).await?;
    Ok(())
}

fn is_shell_literal(token: &str) -> bool {
    !token.is_empty()
        && token.chars().all(|c| {
            c.is_ascii_alphanumeric()
                || matches!(c, '-' | '_' | '=' | '.' | ',' | '/' | ':' | '@' | '+' | '%')
        })
}

/// Git operations bound to a runner and the configured flags.
pub struct Git<'a, R: ShellRunner + ?Sized> {
    sh: &'a R,
    config: &'a GitConfig,
}

impl<'a, R: ShellRunner + ?Sized> Git<'a, R> {
    pub fn new(sh: &'a R, config: &'a GitConfig) -> Self {
        Self { sh, config }
    }

    pub fn config(&self) -> &GitConfig {
        self.config
    }

    pub async fn checkout(
        &self,
        cancel: &CancellationToken,
        reference: &str,
    ) -> Result<(), GitError> {
        checkout(cancel, self.sh, &self.config.checkout_flags, reference).await
    }

    pub async fn clone(
        &self,
        cancel: &CancellationToken,
        repo: &str,
        dir: &str,
    ) -> Result<(), GitError> {
        clone(cancel, self.sh, &self.config.clone_flags, repo, dir).await
    }

    /// Clean the checkout, and its submodules when enabled.
    pub async fn clean(&self, cancel: &CancellationToken) -> Result<(), GitError> {
        clean(cancel, self.sh, &self.config.clean_flags).await?;
        if self.config.submodules {
            clean_submodules(cancel, self.sh, &self.config.clean_flags).await?;
        }
        Ok(())
    }

    pub async fn fetch(
        &self,
        cancel: &CancellationToken,
        repo: &str,
        refs: &[&str],
    ) -> Result<(), GitError> {
        fetch(cancel, self.sh, &self.config.fetch_flags, repo, refs).await
    }

    pub async fn resolve_host(
        &self,
        cancel: &CancellationToken,
        host: &str,
    ) -> Result<String, GitError> {
        super::ssh::resolve_host(cancel, self.sh, host).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::mock::{MockResponse, MockShellRunner};
    use crate::shell::{get_exit_code, is_exit_signaled};

    fn cancel() -> CancellationToken {
        CancellationToken::new()
    }

    mod argv {
        use super::*;

        #[tokio::test]
        async fn checkout_argv() {
            let sh = MockShellRunner::new();
            checkout(&cancel(), &sh, "-f -q", "main").await.unwrap();
            assert_eq!(sh.calls(), vec![vec!["git", "checkout", "-f", "-q", "main"]]);
        }

        #[tokio::test]
        async fn clone_argv() {
            let sh = MockShellRunner::new();
            clone(&cancel(), &sh, "-v --references url", "repo", "dir")
                .await
                .unwrap();
            assert_eq!(
                sh.calls(),
                vec![vec!["git", "clone", "-v", "--references", "url", "--", "repo", "dir"]]
            );
        }

        #[tokio::test]
        async fn clean_argv() {
            let sh = MockShellRunner::new();
            clean(&cancel(), &sh, "--foo --bar").await.unwrap();
            assert_eq!(sh.calls(), vec![vec!["git", "clean", "--foo", "--bar"]]);
        }

        #[tokio::test]
        async fn clean_submodules_argv() {
            let sh = MockShellRunner::new();
            clean_submodules(&cancel(), &sh, "--foo --bar").await.unwrap();
            assert_eq!(
                sh.calls(),
                vec![vec!["git", "submodule", "foreach", "--recursive", "git clean --foo --bar"]]
            );
        }

        #[tokio::test]
        async fn fetch_argv() {
            let sh = MockShellRunner::new();
            fetch(&cancel(), &sh, "--foo --bar", "repo", &["ref1", "ref2"])
                .await
                .unwrap();
            assert_eq!(
                sh.calls(),
                vec![vec!["git", "fetch", "--foo", "--bar", "--", "repo", "ref1", "ref2"]]
            );
        }

        #[tokio::test]
        async fn empty_flags_add_no_arguments() {
            let sh = MockShellRunner::new();
            checkout(&cancel(), &sh, "   ", "v1.0").await.unwrap();
            fetch(&cancel(), &sh, "", "origin", &[]).await.unwrap();
            assert_eq!(
                sh.calls(),
                vec![vec!["git", "checkout", "v1.0"], vec!["git", "fetch", "--", "origin"]]
            );
        }

        #[tokio::test]
        async fn hostile_positionals_stay_positional() {
            let sh = MockShellRunner::new();
            clone(&cancel(), &sh, "-v", "--upload-pack=touch /tmp/pwned", "dir")
                .await
                .unwrap();
            let call = &sh.calls()[0];
            let sep = call.iter().position(|a| a == "--").unwrap();
            assert_eq!(call[sep + 1], "--upload-pack=touch /tmp/pwned");
        }
    }

    mod validation {
        use super::*;

        #[tokio::test]
        async fn option_like_ref_is_rejected_without_running() {
            let sh = MockShellRunner::new();
            let err = checkout(&cancel(), &sh, "", "--nope").await.unwrap_err();
            assert_eq!(err.to_string(), r#""--nope" is not a valid git ref format"#);
            assert_eq!(sh.call_count(), 0);
        }

        #[tokio::test]
        async fn sketchy_ref_is_rejected_without_running() {
            let sh = MockShellRunner::new();
            let err = checkout(&cancel(), &sh, "-f -q", "  --hello").await.unwrap_err();
            assert_eq!(err.to_string(), r#""  --hello" is not a valid git ref format"#);
            assert_eq!(sh.call_count(), 0);
        }

        #[tokio::test]
        async fn every_invalid_ref_spawns_nothing() {
            let sh = MockShellRunner::new();
            for bad in ["", "@", "a..b", "x.lock", "has space", "semi;colon/..", "main/"] {
                assert!(checkout(&cancel(), &sh, "-f", bad).await.is_err(), "{bad:?}");
            }
            assert_eq!(sh.call_count(), 0);
        }

        #[tokio::test]
        async fn nested_shell_rejects_metacharacters() {
            let sh = MockShellRunner::new();
            for bad in ["-fd;rm", "$(id)", "`id`", "-x|sh", "a&b", "'q'", "-f>out"] {
                let err = clean_submodules(&cancel(), &sh, bad).await.unwrap_err();
                assert!(matches!(err, GitError::UnsafeFlag { .. }), "{bad:?}");
            }
            assert_eq!(sh.call_count(), 0);
        }

        #[tokio::test]
        async fn nested_shell_accepts_default_flags() {
            let sh = MockShellRunner::new();
            clean_submodules(&cancel(), &sh, "-ffxdq").await.unwrap();
            assert_eq!(sh.calls()[0][4], "git clean -ffxdq");
        }
    }

    mod errors {
        use super::*;

        #[tokio::test]
        async fn exit_codes_pass_through() {
            let sh = MockShellRunner::new();
            sh.respond(MockResponse::Exit {
                code: 128,
                stderr: "fatal".into(),
            });
            let err = clean(&cancel(), &sh, "-fdq").await.unwrap_err();
            match err {
                GitError::Shell(e) => assert_eq!(get_exit_code(&e), 128),
                other => panic!("expected shell error, got {other:?}"),
            }
        }

        #[tokio::test]
        async fn signals_pass_through() {
            let sh = MockShellRunner::new();
            sh.respond(MockResponse::Signaled);
            let err = fetch(&cancel(), &sh, "-v", "origin", &[]).await.unwrap_err();
            assert!(matches!(err, GitError::Shell(ref e) if is_exit_signaled(e)));
        }
    }

    mod bound {
        use super::*;

        #[tokio::test]
        async fn uses_configured_flags() {
            let sh = MockShellRunner::new();
            let config = GitConfig::default();
            let git = Git::new(&sh, &config);
            git.checkout(&cancel(), "main").await.unwrap();
            git.clean(&cancel()).await.unwrap();
            assert_eq!(
                sh.calls(),
                vec![
                    vec!["git", "checkout", "-f", "main"],
                    vec!["git", "clean", "-ffxdq"],
                    vec!["git", "submodule", "foreach", "--recursive", "git clean -ffxdq"],
                ]
            );
        }

        #[tokio::test]
        async fn submodule_clean_can_be_disabled() {
            let sh = MockShellRunner::new();
            let config = GitConfig {
                submodules: false,
                ..GitConfig::default()
            };
            Git::new(&sh, &config).clean(&cancel()).await.unwrap();
            assert_eq!(sh.call_count(), 1);
        }

        #[tokio::test]
        async fn works_through_a_trait_object() {
            let sh = MockShellRunner::new();
            let runner: &dyn ShellRunner = &sh;
            let config = GitConfig::default();
            Git::new(runner, &config)
                .fetch(&cancel(), "origin", &["main"])
                .await
                .unwrap();
            assert_eq!(
                sh.calls()[0],
                vec!["git", "fetch", "-v", "--prune", "--", "origin", "main"]
            );
        }
    }
}
