use std::fmt;

use prgate_core::rules::pattern_source;
use prgate_core::{Checks, CommentTemplates, ReviewEvent, RuleSet};
use serde::Serialize;

/// Which review the linter submits for a pull request.
///
/// Exactly one outcome is chosen per run; see [`decide`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    /// Trigger matched, body and title both failed.
    RequestChangesCombined,
    /// Trigger matched and the body failed.
    RequestChangesBody,
    /// The title failed.
    RequestChangesTitle,
    /// Trigger, body and title all matched.
    ApproveCombined,
    /// Title matched; body linting did not apply or passed.
    ApproveTitle,
}

impl Outcome {
    /// Review event submitted for this outcome.
    pub fn event(self) -> ReviewEvent {
        match self {
            Outcome::RequestChangesCombined
            | Outcome::RequestChangesBody
            | Outcome::RequestChangesTitle => ReviewEvent::RequestChanges,
            Outcome::ApproveCombined | Outcome::ApproveTitle => ReviewEvent::Approve,
        }
    }

    /// Approvals clear the bot's earlier blocking reviews first.
    pub fn dismisses_prior_reviews(self) -> bool {
        self.event() == ReviewEvent::Approve
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Outcome::RequestChangesCombined => "request-changes-combined",
            Outcome::RequestChangesBody => "request-changes-body",
            Outcome::RequestChangesTitle => "request-changes-title",
            Outcome::ApproveCombined => "approve-combined",
            Outcome::ApproveTitle => "approve-title",
        };
        f.write_str(s)
    }
}

type Predicate = fn(&Checks) -> bool;

fn body_and_title_fail(c: &Checks) -> bool {
    c.trigger_matches && !c.body_matches && !c.title_matches
}

fn body_fails(c: &Checks) -> bool {
    c.trigger_matches && !c.body_matches
}

fn title_fails(c: &Checks) -> bool {
    !c.title_matches
}

fn body_and_title_pass(c: &Checks) -> bool {
    c.trigger_matches && c.body_matches && c.title_matches
}

fn always(_: &Checks) -> bool {
    true
}

/// Ordered branch table. The first row whose predicate holds wins; the last
/// row always holds.
pub const DECISION_TABLE: &[(Predicate, Outcome)] = &[
    (body_and_title_fail, Outcome::RequestChangesCombined),
    (body_fails, Outcome::RequestChangesBody),
    (title_fails, Outcome::RequestChangesTitle),
    (body_and_title_pass, Outcome::ApproveCombined),
    (always, Outcome::ApproveTitle),
];

/// Select the outcome for a set of pattern results.
///
/// # Examples
///
/// ```
/// use prgate_core::Checks;
/// use prgate_review::decision::{decide, Outcome};
///
/// let checks = Checks { trigger_matches: false, body_matches: true, title_matches: false };
/// assert_eq!(decide(&checks), Outcome::RequestChangesTitle);
/// ```
pub fn decide(checks: &Checks) -> Outcome {
    DECISION_TABLE
        .iter()
        .find(|(predicate, _)| predicate(checks))
        .map(|&(_, outcome)| outcome)
        .unwrap_or(Outcome::ApproveTitle)
}

/// Build the review body for `outcome`.
///
/// `trigger_source` is the source text of the trigger pattern, quoted in the
/// note that explains why the body was linted.
pub fn build_comment(
    outcome: Outcome,
    templates: &CommentTemplates,
    trigger_source: &str,
) -> String {
    let trigger_note = || {
        format!(
            "The PR title matches the regex: {trigger_source},\nand {}",
            templates.body_failed
        )
    };
    match outcome {
        Outcome::RequestChangesCombined => {
            format!("{}\n\nAlso, {}", trigger_note(), templates.title_failed)
        }
        Outcome::RequestChangesBody => trigger_note(),
        Outcome::RequestChangesTitle => templates.title_failed.clone(),
        Outcome::ApproveCombined => {
            format!("{}\n\n{}", templates.title_passed, templates.body_passed)
        }
        Outcome::ApproveTitle => templates.title_passed.clone(),
    }
}

/// A fully evaluated decision: what was checked, what was chosen, and the
/// review that will be submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub checks: Checks,
    pub outcome: Outcome,
    pub event: ReviewEvent,
    pub comment: String,
}

impl Decision {
    /// Evaluate `rules` against a title and body and render the review body.
    ///
    /// # Examples
    ///
    /// ```
    /// use prgate_core::{CommentTemplates, PrGateConfig, ReviewEvent, RuleSet};
    /// use prgate_review::decision::{Decision, Outcome};
    ///
    /// let mut config = PrGateConfig::default();
    /// config.lint_body_if_pr_title_has_regex = "WIP".into();
    /// config.pr_body_regex = ".+".into();
    /// config.pr_title_regex = "^WIP:".into();
    /// let rules = RuleSet::from_config(&config).unwrap();
    /// let templates = CommentTemplates::render(&config, &rules);
    ///
    /// let decision = Decision::evaluate(&rules, &templates, "WIP: add feature", "Closes #3");
    /// assert_eq!(decision.outcome, Outcome::ApproveCombined);
    /// assert_eq!(decision.event, ReviewEvent::Approve);
    /// ```
    pub fn evaluate(
        rules: &RuleSet,
        templates: &CommentTemplates,
        title: &str,
        body: &str,
    ) -> Self {
        let checks = rules.check(title, body);
        let outcome = decide(&checks);
        Self {
            checks,
            outcome,
            event: outcome.event(),
            comment: build_comment(outcome, templates, pattern_source(rules.trigger())),
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = |b: bool| if b { "match" } else { "no match" };
        writeln!(f, "Trigger pattern: {}", mark(self.checks.trigger_matches))?;
        writeln!(f, "Body pattern:    {}", mark(self.checks.body_matches))?;
        writeln!(f, "Title pattern:   {}", mark(self.checks.title_matches))?;
        writeln!(f, "Outcome: {} ({})", self.outcome, self.event)?;
        writeln!(f)?;
        writeln!(f, "{}", self.comment)
    }
}

#[cfg(test)]
mod tests {
    use prgate_core::PrGateConfig;

    use super::*;

    fn checks(trigger: bool, body: bool, title: bool) -> Checks {
        Checks {
            trigger_matches: trigger,
            body_matches: body,
            title_matches: title,
        }
    }

    fn wip_config() -> PrGateConfig {
        PrGateConfig {
            lint_body_if_pr_title_has_regex: "WIP".into(),
            pr_body_regex: ".+".into(),
            pr_title_regex: "^WIP:".into(),
            pr_body_regex_failed_comment: "the body must match `%regex%`".into(),
            pr_body_regex_passed_comment: "Body matches `%regex%`".into(),
            pr_title_regex_failed_comment: "the title must match `%regex%`".into(),
            pr_title_regex_passed_comment: "Title matches `%regex%`".into(),
            ..PrGateConfig::default()
        }
    }

    fn evaluate(config: &PrGateConfig, title: &str, body: &str) -> Decision {
        let rules = RuleSet::from_config(config).unwrap();
        let templates = CommentTemplates::render(config, &rules);
        Decision::evaluate(&rules, &templates, title, body)
    }

    #[test]
    fn every_combination_selects_exactly_one_outcome() {
        let expected = [
            // (trigger, body, title) -> outcome
            ((false, false, false), Outcome::RequestChangesTitle),
            ((false, false, true), Outcome::ApproveTitle),
            ((false, true, false), Outcome::RequestChangesTitle),
            ((false, true, true), Outcome::ApproveTitle),
            ((true, false, false), Outcome::RequestChangesCombined),
            ((true, false, true), Outcome::RequestChangesBody),
            ((true, true, false), Outcome::RequestChangesTitle),
            ((true, true, true), Outcome::ApproveCombined),
        ];
        for ((t, b, ti), outcome) in expected {
            let c = checks(t, b, ti);
            assert_eq!(decide(&c), outcome, "for {c:?}");
            let row = DECISION_TABLE
                .iter()
                .position(|(p, _)| p(&c))
                .expect("table is total");
            assert_eq!(DECISION_TABLE[row].1, outcome);
        }
    }

    #[test]
    fn only_approvals_dismiss_prior_reviews() {
        assert!(Outcome::ApproveCombined.dismisses_prior_reviews());
        assert!(Outcome::ApproveTitle.dismisses_prior_reviews());
        assert!(!Outcome::RequestChangesCombined.dismisses_prior_reviews());
        assert!(!Outcome::RequestChangesBody.dismisses_prior_reviews());
        assert!(!Outcome::RequestChangesTitle.dismisses_prior_reviews());
    }

    #[test]
    fn combined_failure_quotes_both_patterns() {
        let mut config = wip_config();
        config.pr_title_regex = "^feat:".into();
        let decision = evaluate(&config, "WIP add feature", "");

        assert_eq!(decision.outcome, Outcome::RequestChangesCombined);
        assert_eq!(decision.event, ReviewEvent::RequestChanges);
        assert_eq!(
            decision.comment,
            "The PR title matches the regex: WIP,\nand the body must match `.+`\n\n\
             Also, the title must match `^feat:`"
        );
    }

    #[test]
    fn wip_title_with_empty_body_requests_body_changes() {
        let decision = evaluate(&wip_config(), "WIP: add feature", "");

        assert!(decision.checks.trigger_matches);
        assert!(!decision.checks.body_matches);
        assert!(decision.checks.title_matches);
        assert_eq!(decision.outcome, Outcome::RequestChangesBody);
        assert_eq!(
            decision.comment,
            "The PR title matches the regex: WIP,\nand the body must match `.+`"
        );
    }

    #[test]
    fn unset_trigger_is_quoted_as_empty_group() {
        let mut config = wip_config();
        config.lint_body_if_pr_title_has_regex = String::new();
        let decision = evaluate(&config, "WIP: add feature", "");

        assert_eq!(decision.outcome, Outcome::RequestChangesBody);
        assert_eq!(
            decision.comment,
            "The PR title matches the regex: (?:),\nand the body must match `.+`"
        );
    }

    #[test]
    fn failing_title_without_trigger_requests_title_changes() {
        let decision = evaluate(&wip_config(), "add feature", "Closes #3");

        assert_eq!(decision.outcome, Outcome::RequestChangesTitle);
        assert_eq!(decision.comment, "the title must match `^WIP:`");
    }

    #[test]
    fn all_patterns_matching_approves_with_both_comments() {
        let decision = evaluate(&wip_config(), "WIP: add feature", "Closes #3");

        assert_eq!(decision.outcome, Outcome::ApproveCombined);
        assert_eq!(decision.event, ReviewEvent::Approve);
        assert_eq!(decision.comment, "Title matches `^WIP:`\n\nBody matches `.+`");
    }

    #[test]
    fn matching_title_without_trigger_approves_with_title_comment() {
        let mut config = wip_config();
        config.pr_title_regex = "feature".into();
        let decision = evaluate(&config, "add feature", "anything");

        assert!(!decision.checks.trigger_matches);
        assert_eq!(decision.outcome, Outcome::ApproveTitle);
        assert_eq!(decision.comment, "Title matches `feature`");
    }

    #[test]
    fn decision_serializes_camel_case() {
        let decision = evaluate(&wip_config(), "WIP: add feature", "Closes #3");
        let json = serde_json::to_value(&decision).unwrap();
        assert_eq!(json["outcome"], "approve-combined");
        assert_eq!(json["event"], "APPROVE");
        assert_eq!(json["checks"]["triggerMatches"], true);
    }

    #[test]
    fn display_summarizes_checks_and_comment() {
        let decision = evaluate(&wip_config(), "add feature", "");
        let text = decision.to_string();
        assert!(text.contains("Title pattern:   no match"));
        assert!(text.contains("Outcome: request-changes-title (REQUEST_CHANGES)"));
        assert!(text.ends_with("the title must match `^WIP:`\n"));
    }
}
