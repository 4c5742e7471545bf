use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PrGateError;

/// Login GitHub Actions uses when a workflow token submits a review.
pub const DEFAULT_BOT_LOGIN: &str = "github-actions[bot]";

/// Input names accepted by [`PrGateConfig::set`], in the order they are
/// documented for the action.
pub const INPUT_KEYS: &[&str] = &[
    "github-token",
    "lint-body-if-pr-title-has-regex",
    "pr-body-regex",
    "pr-title-regex",
    "pr-body-regex-failed-comment",
    "pr-body-regex-passed-comment",
    "pr-title-regex-failed-comment",
    "pr-title-regex-passed-comment",
    "bot-login",
    "api-url",
];

/// Linter configuration loaded from `.prgate.toml` and the environment.
///
/// Supports layered resolution: CLI flags > `INPUT_*` env vars > local config > defaults.
/// Keys use the same kebab-case names as the action inputs.
///
/// Unset patterns are empty, and an empty pattern matches every string.
///
/// # Examples
///
/// ```
/// use prgate_core::PrGateConfig;
///
/// let config = PrGateConfig::default();
/// assert_eq!(config.bot_login, "github-actions[bot]");
/// assert!(config.pr_title_regex.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PrGateConfig {
    /// Token used to authenticate against the GitHub API.
    #[serde(default, skip_serializing)]
    pub github_token: Option<String>,
    /// When this pattern matches the title, the body is linted too.
    #[serde(default)]
    pub lint_body_if_pr_title_has_regex: String,
    /// Pattern the pull request body must match when linted.
    #[serde(default)]
    pub pr_body_regex: String,
    /// Pattern the pull request title must match.
    #[serde(default)]
    pub pr_title_regex: String,
    /// Comment used when the body does not match. `%regex%` is replaced.
    #[serde(default = "default_body_failed_comment")]
    pub pr_body_regex_failed_comment: String,
    /// Comment used when the body matches. `%regex%` is replaced.
    #[serde(default = "default_body_passed_comment")]
    pub pr_body_regex_passed_comment: String,
    /// Comment used when the title does not match. `%regex%` is replaced.
    #[serde(default = "default_title_failed_comment")]
    pub pr_title_regex_failed_comment: String,
    /// Comment used when the title matches. `%regex%` is replaced.
    #[serde(default = "default_title_passed_comment")]
    pub pr_title_regex_passed_comment: String,
    /// Login whose earlier reviews are dismissed before approving.
    #[serde(default = "default_bot_login")]
    pub bot_login: String,
    /// Base URL of the GitHub REST API (for GitHub Enterprise Server).
    #[serde(default)]
    pub api_url: Option<String>,
}

fn default_body_failed_comment() -> String {
    "the PR body does not match the regex `%regex%`.".into()
}

fn default_body_passed_comment() -> String {
    "The PR body matches the regex `%regex%`.".into()
}

fn default_title_failed_comment() -> String {
    "The PR title does not match the regex `%regex%`.".into()
}

fn default_title_passed_comment() -> String {
    "The PR title matches the regex `%regex%`.".into()
}

fn default_bot_login() -> String {
    DEFAULT_BOT_LOGIN.into()
}

impl Default for PrGateConfig {
    fn default() -> Self {
        Self {
            github_token: None,
            lint_body_if_pr_title_has_regex: String::new(),
            pr_body_regex: String::new(),
            pr_title_regex: String::new(),
            pr_body_regex_failed_comment: default_body_failed_comment(),
            pr_body_regex_passed_comment: default_body_passed_comment(),
            pr_title_regex_failed_comment: default_title_failed_comment(),
            pr_title_regex_passed_comment: default_title_passed_comment(),
            bot_login: default_bot_login(),
            api_url: None,
        }
    }
}

impl PrGateConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PrGateError::Io`] if the file cannot be read, or
    /// [`PrGateError::Toml`] if the content is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self, PrGateError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`PrGateError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use prgate_core::PrGateConfig;
    ///
    /// let toml = r#"
    /// pr-title-regex = "^(feat|fix):"
    /// "#;
    /// let config = PrGateConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.pr_title_regex, "^(feat|fix):");
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, PrGateError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Set a single input by its action name.
    ///
    /// # Errors
    ///
    /// Returns [`PrGateError::Config`] for an unknown input name.
    ///
    /// # Examples
    ///
    /// ```
    /// use prgate_core::PrGateConfig;
    ///
    /// let mut config = PrGateConfig::default();
    /// config.set("pr-body-regex", "Closes #\\d+").unwrap();
    /// assert_eq!(config.pr_body_regex, "Closes #\\d+");
    /// assert!(config.set("no-such-input", "x").is_err());
    /// ```
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), PrGateError> {
        let value = value.to_string();
        match key {
            "github-token" => self.github_token = Some(value),
            "lint-body-if-pr-title-has-regex" => self.lint_body_if_pr_title_has_regex = value,
            "pr-body-regex" => self.pr_body_regex = value,
            "pr-title-regex" => self.pr_title_regex = value,
            "pr-body-regex-failed-comment" => self.pr_body_regex_failed_comment = value,
            "pr-body-regex-passed-comment" => self.pr_body_regex_passed_comment = value,
            "pr-title-regex-failed-comment" => self.pr_title_regex_failed_comment = value,
            "pr-title-regex-passed-comment" => self.pr_title_regex_passed_comment = value,
            "bot-login" => self.bot_login = value,
            "api-url" => self.api_url = Some(value),
            other => {
                return Err(PrGateError::Config(format!("unknown input '{other}'")));
            }
        }
        Ok(())
    }

    /// Overlay GitHub Actions inputs read through `lookup`.
    ///
    /// The runner exposes an input named `pr-title-regex` as the variable
    /// `INPUT_PR-TITLE-REGEX`. Values are trimmed, so a YAML block scalar's
    /// trailing newline does not end up in a pattern. Empty values are treated
    /// as unset so that the file and default layers still apply. Returns the
    /// keys that were set.
    ///
    /// # Examples
    ///
    /// ```
    /// use prgate_core::PrGateConfig;
    ///
    /// let mut config = PrGateConfig::default();
    /// let applied = config.apply_inputs(|var| {
    ///     (var == "INPUT_PR-TITLE-REGEX").then(|| "^WIP:".to_string())
    /// });
    /// assert_eq!(applied, vec!["pr-title-regex"]);
    /// assert_eq!(config.pr_title_regex, "^WIP:");
    /// ```
    pub fn apply_inputs<F>(&mut self, lookup: F) -> Vec<&'static str>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut applied = Vec::new();
        for &key in INPUT_KEYS {
            let var = input_env_var(key);
            let Some(value) = lookup(&var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
            else {
                continue;
            };
            // Every key in INPUT_KEYS is accepted by `set`.
            if self.set(key, &value).is_ok() {
                applied.push(key);
            }
        }
        applied
    }

    /// Overlay inputs from the process environment.
    pub fn apply_env(&mut self) -> Vec<&'static str> {
        self.apply_inputs(|var| std::env::var(var).ok())
    }

    /// Resolve the API token: the configured input first, then `GITHUB_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns [`PrGateError::Config`] if neither is set.
    pub fn resolve_token(&self) -> Result<String, PrGateError> {
        if let Some(token) = self.github_token.as_ref().filter(|t| !t.is_empty()) {
            return Ok(token.clone());
        }
        std::env::var("GITHUB_TOKEN")
            .ok()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                PrGateError::Config(
                    "github-token not set. Pass it as an input or set GITHUB_TOKEN".into(),
                )
            })
    }
}

/// Environment variable the Actions runner uses for the input `key`.
///
/// # Examples
///
/// ```
/// use prgate_core::config::input_env_var;
///
/// assert_eq!(input_env_var("pr-body-regex"), "INPUT_PR-BODY-REGEX");
/// ```
pub fn input_env_var(key: &str) -> String {
    format!("INPUT_{}", key.replace(' ', "_").to_uppercase())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = PrGateConfig::default();
        assert!(config.github_token.is_none());
        assert!(config.lint_body_if_pr_title_has_regex.is_empty());
        assert!(config.pr_body_regex.is_empty());
        assert!(config.pr_title_regex.is_empty());
        assert!(config.pr_body_regex_failed_comment.contains("%regex%"));
        assert!(config.pr_title_regex_passed_comment.contains("%regex%"));
        assert_eq!(config.bot_login, DEFAULT_BOT_LOGIN);
        assert!(config.api_url.is_none());
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
lint-body-if-pr-title-has-regex = "WIP"
pr-body-regex = ".+"
pr-title-regex = "^WIP:"
pr-body-regex-failed-comment = "body must match %regex%"
pr-title-regex-passed-comment = "title ok (%regex%)"
bot-login = "lint-bot[bot]"
api-url = "https://ghe.example.com/api/v3"
"#;
        let config = PrGateConfig::from_toml(toml).unwrap();
        assert_eq!(config.lint_body_if_pr_title_has_regex, "WIP");
        assert_eq!(config.pr_body_regex, ".+");
        assert_eq!(config.pr_title_regex, "^WIP:");
        assert_eq!(config.pr_body_regex_failed_comment, "body must match %regex%");
        assert_eq!(config.pr_title_regex_passed_comment, "title ok (%regex%)");
        assert_eq!(config.bot_login, "lint-bot[bot]");
        assert_eq!(
            config.api_url.as_deref(),
            Some("https://ghe.example.com/api/v3")
        );
        assert_eq!(
            config.pr_title_regex_failed_comment,
            default_title_failed_comment()
        );
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = PrGateConfig::from_toml("").unwrap();
        assert_eq!(config.bot_login, DEFAULT_BOT_LOGIN);
        assert_eq!(config.pr_body_regex_passed_comment, default_body_passed_comment());
    }

    #[test]
    fn invalid_toml_returns_error() {
        let result = PrGateConfig::from_toml("{{invalid}}");
        assert!(matches!(result, Err(PrGateError::Toml(_))));
    }

    #[test]
    fn token_is_never_serialized() {
        let config = PrGateConfig {
            github_token: Some("ghp_secret".into()),
            ..PrGateConfig::default()
        };
        let out = toml::to_string(&config).unwrap();
        assert!(!out.contains("ghp_secret"));
    }

    #[test]
    fn inputs_override_file_values_but_skip_empty_ones() {
        let mut config = PrGateConfig::from_toml(
            r#"
pr-title-regex = "^feat"
pr-body-regex = "Closes"
"#,
        )
        .unwrap();
        let env: HashMap<String, String> = [
            ("INPUT_PR-TITLE-REGEX", "^fix"),
            ("INPUT_PR-BODY-REGEX", ""),
            ("INPUT_GITHUB-TOKEN", "ghp_abc"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let applied = config.apply_inputs(|var| env.get(var).cloned());

        assert_eq!(applied, vec!["github-token", "pr-title-regex"]);
        assert_eq!(config.pr_title_regex, "^fix");
        assert_eq!(config.pr_body_regex, "Closes");
        assert_eq!(config.github_token.as_deref(), Some("ghp_abc"));
    }

    #[test]
    fn inputs_are_trimmed_before_use() {
        let mut config = PrGateConfig::default();
        let env: HashMap<String, String> = [
            ("INPUT_PR-TITLE-REGEX", "^WIP:\n"),
            ("INPUT_PR-BODY-REGEX", "  \n"),
            ("INPUT_PR-TITLE-REGEX-FAILED-COMMENT", "  Title must match %regex%\n"),
            ("INPUT_GITHUB-TOKEN", "ghp_abc\n"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let applied = config.apply_inputs(|var| env.get(var).cloned());

        assert_eq!(
            applied,
            vec!["github-token", "pr-title-regex", "pr-title-regex-failed-comment"]
        );
        assert_eq!(config.pr_title_regex, "^WIP:");
        assert!(config.pr_body_regex.is_empty());
        assert_eq!(
            config.pr_title_regex_failed_comment,
            "Title must match %regex%"
        );
        assert_eq!(config.github_token.as_deref(), Some("ghp_abc"));

        let rules = crate::RuleSet::from_config(&config).unwrap();
        assert!(rules.check("WIP: add feature", "").title_matches);
    }

    #[test]
    fn every_input_key_is_settable() {
        let mut config = PrGateConfig::default();
        for key in INPUT_KEYS {
            assert!(config.set(key, "value").is_ok(), "{key} should be accepted");
        }
    }

    #[test]
    fn configured_token_wins_over_environment() {
        let config = PrGateConfig {
            github_token: Some("from-input".into()),
            ..PrGateConfig::default()
        };
        assert_eq!(config.resolve_token().unwrap(), "from-input");
    }
}
