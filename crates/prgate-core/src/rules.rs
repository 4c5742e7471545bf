use regex::Regex;
use serde::Serialize;

use crate::config::PrGateConfig;
use crate::error::PrGateError;

/// Placeholder in comment templates replaced with the pattern source.
pub const REGEX_PLACEHOLDER: &str = "%regex%";

/// How an empty pattern is quoted in comments.
pub const EMPTY_PATTERN_SOURCE: &str = "(?:)";

/// The three compiled patterns a pull request is checked against.
///
/// Matching is an unanchored search: a pattern passes if it matches anywhere
/// in the text. Use `^`/`$` in the pattern to anchor.
///
/// Patterns use `regex` syntax. There is no look-around or backreferences,
/// and `\d`, `\w` and `\b` are Unicode-aware unless disabled with `(?-u)`.
///
/// # Examples
///
/// ```
/// use prgate_core::RuleSet;
///
/// let rules = RuleSet::new("WIP", ".+", "^WIP:").unwrap();
/// let checks = rules.check("WIP: add feature", "");
/// assert!(checks.trigger_matches);
/// assert!(!checks.body_matches);
/// assert!(checks.title_matches);
/// ```
#[derive(Debug, Clone)]
pub struct RuleSet {
    trigger: Regex,
    body: Regex,
    title: Regex,
}

impl RuleSet {
    /// Compile the trigger, body and title patterns.
    ///
    /// # Errors
    ///
    /// Returns [`PrGateError::Regex`] naming the first pattern that fails to compile.
    pub fn new(trigger: &str, body: &str, title: &str) -> Result<Self, PrGateError> {
        Ok(Self {
            trigger: compile("lint-body-if-pr-title-has-regex", trigger)?,
            body: compile("pr-body-regex", body)?,
            title: compile("pr-title-regex", title)?,
        })
    }

    /// Compile the patterns held by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`PrGateError::Regex`] if any pattern is malformed.
    pub fn from_config(config: &PrGateConfig) -> Result<Self, PrGateError> {
        Self::new(
            &config.lint_body_if_pr_title_has_regex,
            &config.pr_body_regex,
            &config.pr_title_regex,
        )
    }

    /// Pattern that, when it matches the title, requires the body to be linted.
    pub fn trigger(&self) -> &Regex {
        &self.trigger
    }

    /// Pattern the body must match.
    pub fn body(&self) -> &Regex {
        &self.body
    }

    /// Pattern the title must match.
    pub fn title(&self) -> &Regex {
        &self.title
    }

    /// Evaluate all three patterns against a pull request.
    pub fn check(&self, title: &str, body: &str) -> Checks {
        Checks {
            trigger_matches: self.trigger.is_match(title),
            body_matches: self.body.is_match(body),
            title_matches: self.title.is_match(title),
        }
    }
}

fn compile(input: &'static str, pattern: &str) -> Result<Regex, PrGateError> {
    Regex::new(pattern).map_err(|source| PrGateError::Regex { input, source })
}

/// Results of the three pattern tests for one pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Checks {
    /// The trigger pattern matched the title.
    pub trigger_matches: bool,
    /// The body pattern matched the body.
    pub body_matches: bool,
    /// The title pattern matched the title.
    pub title_matches: bool,
}

/// Comment templates with their `%regex%` placeholder already substituted.
///
/// # Examples
///
/// ```
/// use prgate_core::{CommentTemplates, PrGateConfig, RuleSet};
///
/// let mut config = PrGateConfig::default();
/// config.pr_title_regex = "^feat:".into();
/// config.pr_title_regex_failed_comment = "Title must match `%regex%`".into();
///
/// let rules = RuleSet::from_config(&config).unwrap();
/// let templates = CommentTemplates::render(&config, &rules);
/// assert_eq!(templates.title_failed, "Title must match `^feat:`");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentTemplates {
    pub body_failed: String,
    pub body_passed: String,
    pub title_failed: String,
    pub title_passed: String,
}

impl CommentTemplates {
    /// Substitute each template's placeholder with its pattern's source text.
    pub fn render(config: &PrGateConfig, rules: &RuleSet) -> Self {
        let body = pattern_source(rules.body());
        let title = pattern_source(rules.title());
        Self {
            body_failed: substitute_pattern(&config.pr_body_regex_failed_comment, body),
            body_passed: substitute_pattern(&config.pr_body_regex_passed_comment, body),
            title_failed: substitute_pattern(&config.pr_title_regex_failed_comment, title),
            title_passed: substitute_pattern(&config.pr_title_regex_passed_comment, title),
        }
    }
}

/// Source text of `regex` as quoted in comments and logs.
///
/// An empty pattern is shown as `(?:)` so it stays visible.
///
/// # Examples
///
/// ```
/// use prgate_core::rules::pattern_source;
/// use regex::Regex;
///
/// assert_eq!(pattern_source(&Regex::new("^WIP:").unwrap()), "^WIP:");
/// assert_eq!(pattern_source(&Regex::new("").unwrap()), "(?:)");
/// ```
pub fn pattern_source(regex: &Regex) -> &str {
    match regex.as_str() {
        "" => EMPTY_PATTERN_SOURCE,
        source => source,
    }
}

/// Replace the first `%regex%` in `template` with `source`.
///
/// # Examples
///
/// ```
/// use prgate_core::rules::substitute_pattern;
///
/// assert_eq!(substitute_pattern("must match %regex%", "^a"), "must match ^a");
/// assert_eq!(substitute_pattern("no placeholder", "^a"), "no placeholder");
/// ```
pub fn substitute_pattern(template: &str, source: &str) -> String {
    template.replacen(REGEX_PLACEHOLDER, source, 1)
}
