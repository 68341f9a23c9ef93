//! Repository shorthand expansion
//!
//! Turns terse references such as `alice`, `alice/dots` or `sr.ht/~alice`
//! into clone URLs. Rules are tried in order and the first whole-input match
//! wins; the order matters because patterns overlap (a two-segment name
//! without dots must never be read as `host/user`).

use regex::Regex;
use std::sync::LazyLock;

/// One expansion rule: the input is wrapped as `{prefix}{input}{suffix}`
struct GuessRule {
    pattern: Regex,
    prefix: &'static str,
    suffix: &'static str,
}

impl GuessRule {
    fn new(pattern: &str, prefix: &'static str, suffix: &'static str) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("repository guess pattern is valid"),
            prefix,
            suffix,
        }
    }
}

static GUESS_RULES: LazyLock<Vec<GuessRule>> = LazyLock::new(|| {
    vec![
        // alice
        GuessRule::new(r"^[-0-9A-Za-z]+$", "https://github.com/", "/dotfiles.git"),
        // alice/dots.git
        GuessRule::new(r"^[-0-9A-Za-z]+/[-0-9A-Za-z]+\.git$", "https://github.com/", ""),
        // alice/dots
        GuessRule::new(r"^[-0-9A-Za-z]+/[-0-9A-Za-z]+$", "https://github.com/", ".git"),
        // example.com/alice
        GuessRule::new(r"^[-.0-9A-Za-z]+/[-0-9A-Za-z]+$", "https://", "/dotfiles.git"),
        // example.com/alice/dots
        GuessRule::new(
            r"^[-.0-9A-Za-z]+/[-0-9A-Za-z]+/[-0-9A-Za-z]+$",
            "https://",
            ".git",
        ),
        // example.com/alice/dots.git
        GuessRule::new(
            r"^[-.0-9A-Za-z]+/[-0-9A-Za-z]+/[-0-9A-Za-z]+\.git$",
            "https://",
            "",
        ),
        // sr.ht/~alice
        GuessRule::new(r"^sr\.ht/~[-0-9A-Za-z]+$", "https://git.", "/dotfiles"),
        // sr.ht/~alice/dots
        GuessRule::new(r"^sr\.ht/~[-0-9A-Za-z]+/[-0-9A-Za-z]+$", "https://git.", ""),
    ]
});

/// Guess the clone URL of a user's repository from a shorthand reference.
///
/// Input that matches no rule is assumed to already be a URL and is returned
/// unchanged.
pub fn guess_repo_url(input: &str) -> String {
    GUESS_RULES
        .iter()
        .find(|rule| rule.pattern.is_match(input))
        .map(|rule| format!("{}{}{}", rule.prefix, input, rule.suffix))
        .unwrap_or_else(|| input.to_string())
}
