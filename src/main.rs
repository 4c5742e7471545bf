use std::path::{Path, PathBuf};

use clap::{Args, CommandFactory, Parser, Subcommand};
use miette::{Context, IntoDiagnostic, Result};
use tracing::{debug, error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use prgate_core::{
    CommentTemplates, OutputFormat, PrGateConfig, PullRequestContext, ReviewEvent, RuleSet,
};
use prgate_review::decision::Decision;
use prgate_review::github::{parse_pr_reference, GitHubClient};
use prgate_review::runner::{self, RunOptions, RunReport};

const CONFIG_FILE: &str = ".prgate.toml";

#[derive(Parser)]
#[command(
    name = "prgate",
    version,
    about = "Lint pull request titles and bodies, then approve or request changes",
    long_about = "prgate checks a pull request's title and body against regular expressions\n\
                  and submits a GitHub review: REQUEST_CHANGES when a check fails, APPROVE\n\
                  when they pass. Before approving it dismisses its own earlier blocking reviews.\n\n\
                  Examples:\n  \
                    prgate run                                 Lint the PR of the current workflow run\n  \
                    prgate run --pr acme/site#7 --title 'WIP: x'  Lint a PR outside of Actions\n  \
                    prgate evaluate --title 'feat: x' --body ''   Show the decision without posting\n  \
                    prgate init                                Create a .prgate.toml config file"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (default: .prgate.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Log level filter (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Command {
    /// Lint a pull request and submit the review
    #[command(long_about = "Lint a pull request and submit the review.\n\n\
        Inside GitHub Actions the pull request is read from GITHUB_EVENT_PATH and\n\
        inputs from INPUT_* variables. Outside Actions pass --pr with --title.\n\n\
        Errors are logged and the process exits 0 unless --fail-on-error is set.")]
    Run(RunArgs),
    /// Evaluate a title and body locally without calling GitHub
    Evaluate {
        /// Pull request title
        #[arg(long)]
        title: String,
        /// Pull request body
        #[arg(long, default_value = "")]
        body: String,
        #[command(flatten)]
        patterns: PatternArgs,
    },
    /// Create a default .prgate.toml configuration file
    #[command(long_about = "Create a default .prgate.toml configuration file.\n\n\
        Fails if .prgate.toml already exists.")]
    Init,
    /// Generate shell completion scripts
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Pull request to lint (format: owner/repo#123)
    #[arg(long, requires = "title")]
    pr: Option<String>,
    /// Pull request title (overrides the event payload)
    #[arg(long)]
    title: Option<String>,
    /// Pull request body (overrides the event payload)
    #[arg(long)]
    body: Option<String>,
    #[command(flatten)]
    patterns: PatternArgs,
    /// Login whose earlier reviews are dismissed before approving
    #[arg(long)]
    bot_login: Option<String>,
    /// Decide and print the review without calling GitHub
    #[arg(long)]
    dry_run: bool,
    /// Exit non-zero on errors and when changes are requested
    #[arg(long)]
    fail_on_error: bool,
}

#[derive(Args)]
struct PatternArgs {
    /// Lint the body only when the title matches this regex
    #[arg(long)]
    trigger_regex: Option<String>,
    /// Regex the body must match
    #[arg(long)]
    body_regex: Option<String>,
    /// Regex the title must match
    #[arg(long)]
    title_regex: Option<String>,
}

impl PatternArgs {
    fn apply(&self, config: &mut PrGateConfig) -> Result<()> {
        let overrides = [
            ("lint-body-if-pr-title-has-regex", &self.trigger_regex),
            ("pr-body-regex", &self.body_regex),
            ("pr-title-regex", &self.title_regex),
        ];
        for (key, value) in overrides {
            if let Some(value) = value {
                config.set(key, value)?;
            }
        }
        Ok(())
    }
}

const DEFAULT_CONFIG: &str = r#"# prgate configuration
# Every key can also be set as an action input (INPUT_<KEY> in the environment).
# Patterns use Rust regex syntax and match anywhere unless anchored.

# When the title matches this pattern, the body is linted too.
# lint-body-if-pr-title-has-regex = "WIP"

# pr-body-regex = ".+"
# pr-title-regex = "^(feat|fix|docs|chore)(\\(.+\\))?: "

# Comments posted on the review. %regex% is replaced with the pattern.
# pr-body-regex-failed-comment = "the PR body does not match the regex `%regex%`."
# pr-body-regex-passed-comment = "The PR body matches the regex `%regex%`."
# pr-title-regex-failed-comment = "The PR title does not match the regex `%regex%`."
# pr-title-regex-passed-comment = "The PR title matches the regex `%regex%`."

# Author whose earlier reviews are dismissed before approving.
# bot-login = "github-actions[bot]"

# GitHub Enterprise Server API base.
# api-url = "https://github.example.com/api/v3"
"#;

fn init_tracing(level: &str) {
    let level = if std::env::var("RUNNER_DEBUG").as_deref() == Ok("1") {
        "debug"
    } else {
        level
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn load_config(path: Option<&Path>) -> Result<PrGateConfig> {
    let mut config = match path {
        Some(path) => PrGateConfig::from_file(path)
            .wrap_err(format!("loading {}", path.display()))?,
        None => {
            let default_path = Path::new(CONFIG_FILE);
            if default_path.exists() {
                PrGateConfig::from_file(default_path).wrap_err("loading .prgate.toml")?
            } else {
                PrGateConfig::default()
            }
        }
    };
    let applied = config.apply_env();
    if !applied.is_empty() {
        debug!(inputs = ?applied, "applied action inputs from environment");
    }
    Ok(config)
}

fn resolve_context(args: &RunArgs) -> Result<PullRequestContext> {
    let mut pr = match &args.pr {
        Some(pr_ref) => {
            let (owner, repo, number) = parse_pr_reference(pr_ref)?;
            PullRequestContext {
                owner,
                repo,
                number,
                title: String::new(),
                body: String::new(),
            }
        }
        None => PullRequestContext::from_actions_env()?,
    };
    if let Some(title) = &args.title {
        pr.title = title.clone();
    }
    if let Some(body) = &args.body {
        pr.body = body.clone();
    }
    Ok(pr)
}

async fn lint(config_path: Option<&Path>, args: &RunArgs) -> Result<RunReport> {
    let mut config = load_config(config_path)?;
    args.patterns.apply(&mut config)?;
    if let Some(login) = &args.bot_login {
        config.bot_login = login.clone();
    }

    let rules = RuleSet::from_config(&config)?;
    let templates = CommentTemplates::render(&config, &rules);
    let pr = resolve_context(args)?;
    info!(pr = %pr, "linting pull request");

    if args.dry_run {
        info!("dry run, not submitting a review");
        return Ok(runner::plan(&pr, &rules, &templates));
    }

    let options = RunOptions {
        bot_login: config.bot_login.clone(),
        ..RunOptions::default()
    };
    let api_url = config
        .api_url
        .clone()
        .or_else(|| std::env::var("GITHUB_API_URL").ok());
    let token = config.resolve_token()?;
    let github = GitHubClient::new(&token, api_url.as_deref())?;

    let report = runner::run(&github, &pr, &rules, &templates, &options).await?;
    Ok(report)
}

fn print_report(report: &RunReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report).into_diagnostic()?);
        }
        OutputFormat::Text => {
            println!("Pull request: {}", report.pull_request);
            print!("{}", report.decision);
            if let Some(cleanup) = &report.cleanup {
                println!();
                println!(
                    "Earlier reviews: {} dismissed, {} deleted, {} failed",
                    cleanup.dismissed.len(),
                    cleanup.deleted.len(),
                    cleanup.failed.len()
                );
            }
            if !report.submitted {
                println!("\n(dry run: no review submitted)");
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .expect("miette handler");
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        None => {
            Cli::command().print_help().into_diagnostic()?;
        }
        Some(Command::Run(ref args)) => {
            match lint(cli.config.as_deref(), args).await {
                Ok(report) => {
                    print_report(&report, cli.format)?;
                    if args.fail_on_error && report.decision.event == ReviewEvent::RequestChanges {
                        std::process::exit(1);
                    }
                }
                Err(e) => {
                    error!("action failed with error: {e}");
                    if args.fail_on_error {
                        return Err(e);
                    }
                }
            }
        }
        Some(Command::Evaluate {
            ref title,
            ref body,
            ref patterns,
        }) => {
            let mut config = load_config(cli.config.as_deref())?;
            patterns.apply(&mut config)?;
            let rules = RuleSet::from_config(&config)?;
            let templates = CommentTemplates::render(&config, &rules);
            let decision = Decision::evaluate(&rules, &templates, title, body);

            match cli.format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&decision).into_diagnostic()?
                    );
                }
                OutputFormat::Text => print!("{decision}"),
            }
        }
        Some(Command::Init) => {
            let path = Path::new(CONFIG_FILE);
            if path.exists() {
                miette::bail!(".prgate.toml already exists");
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created .prgate.toml with default configuration");
        }
        Some(Command::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "prgate", &mut std::io::stdout());
        }
    }

    Ok(())
}
