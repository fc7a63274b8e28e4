//! Property-based tests for ref validation, URL parsing, and durations.
//!
//! These tests use proptest to verify invariants hold across
//! randomly generated inputs.

use std::time::Duration;

use proptest::prelude::*;

use jobshell::core::duration::{format_duration, round};
use jobshell::core::types::{check_ref_format, GitRef};
use jobshell::core::url::parse_gittable_url;

/// Strategy for characters git allows anywhere in a ref.
fn ref_char() -> impl Strategy<Value = char> {
    prop_oneof![
        prop::char::range('a', 'z'),
        prop::char::range('A', 'Z'),
        prop::char::range('0', '9'),
        Just('-'),
        Just('_'),
    ]
}

/// Strategy for refs made of `/`-separated segments that git accepts.
fn valid_ref() -> impl Strategy<Value = String> {
    prop::collection::vec(
        (prop::char::range('a', 'z'), prop::collection::vec(ref_char(), 0..12)),
        1..4,
    )
    .prop_map(|segments| {
        segments
            .into_iter()
            .map(|(first, rest)| std::iter::once(first).chain(rest).collect::<String>())
            .collect::<Vec<_>>()
            .join("/")
    })
}

proptest! {
    #[test]
    fn check_ref_format_never_panics(name in ".*") {
        let _ = check_ref_format(&name);
    }

    #[test]
    fn validation_agrees_with_check(name in ".{0,40}") {
        prop_assert_eq!(GitRef::new(&name).is_ok(), check_ref_format(&name));
    }

    #[test]
    fn leading_hyphen_is_rejected(rest in ".{0,30}") {
        let name = format!("-{rest}");
        prop_assert!(!check_ref_format(&name));
    }

    #[test]
    fn plain_segments_are_accepted(name in valid_ref()) {
        prop_assert!(check_ref_format(&name), "{name:?} should be valid");
        let git_ref = GitRef::new(&name).unwrap();
        prop_assert_eq!(git_ref.as_str(), name.as_str());
    }

    #[test]
    fn whitespace_is_rejected(
        name in valid_ref(),
        ws in prop_oneof![Just(' '), Just('\t'), Just('\n')],
    ) {
        let with_ws = format!("{name}{ws}x");
        prop_assert!(!check_ref_format(&with_ws));
    }

    #[test]
    fn url_parsing_never_panics(raw in ".{0,60}") {
        let _ = parse_gittable_url(&raw);
    }

    #[test]
    fn scp_form_is_ssh(
        user in "[a-z]{1,8}",
        host in "[a-z]{2,12}\\.com",
        path in "[a-z]{1,8}/[a-z]{1,8}\\.git",
    ) {
        let url = parse_gittable_url(&format!("{user}@{host}:{path}")).unwrap();
        prop_assert!(url.is_ssh());
        prop_assert_eq!(url.hostname(), host.as_str());
        prop_assert_eq!(url.as_str(), format!("ssh://{user}@{host}/{path}"));
    }

    #[test]
    fn rounding_never_increases_precision(nanos in 0u64..10_000_000_000_000) {
        let d = Duration::from_nanos(nanos);
        let once = round(d);
        prop_assert_eq!(round(once), once);
        prop_assert!(!format_duration(once).is_empty());
    }
}
