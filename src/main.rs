use std::path::{Path, PathBuf};

use async_trait::async_trait;
use autoassign_core::{
    AssignError, AssigneeMode, AssigneeSubmitter, ConfigLoader, Configuration, FileConfigLoader,
    ReviewSubmitter, TeamMembershipLookup, DEFAULT_CONFIG_PATH,
};
use autoassign_engine::{AutoAssign, RunReport};
use autoassign_github::{GitHubClient, PullRequestApi, PullRequestEvent, RepoConfigLoader};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use miette::{IntoDiagnostic, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "autoassign",
    version,
    about = "Request reviewers and add assignees when a pull request opens",
    long_about = "autoassign picks reviewers and assignees for a pull request from the\n\
                   repository's .github/auto_assign.toml and applies them through the GitHub API.\n\n\
                   Examples:\n  \
                     autoassign run                          Handle $GITHUB_EVENT_PATH\n  \
                     autoassign run --event event.json --dry-run\n  \
                     autoassign check                        Validate .github/auto_assign.toml\n  \
                     autoassign init                         Write a starter configuration"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Handle a pull_request event
    #[command(long_about = "Handle a pull_request event.\n\n\
        Reads the event payload, loads the configuration (from the repository unless\n\
        --config is given), selects reviewers and assignees, and submits them.\n\
        Only the `opened` and `ready_for_review` actions are handled.\n\n\
        Examples:\n  autoassign run\n  autoassign run --event event.json --config auto_assign.toml --dry-run --seed 7")]
    Run {
        /// Event payload file (default: $GITHUB_EVENT_PATH)
        #[arg(long)]
        event: Option<PathBuf>,
        /// Local configuration file instead of the repository's copy
        #[arg(long)]
        config: Option<PathBuf>,
        /// GitHub token (default: $GITHUB_TOKEN or $GH_TOKEN)
        #[arg(long)]
        github_token: Option<String>,
        /// Compute the selection without calling the GitHub API
        #[arg(long)]
        dry_run: bool,
        /// Seed for reviewer sampling, for reproducible picks
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Validate a configuration file
    #[command(long_about = "Validate a configuration file.\n\n\
        Parses the file and runs every check that would abort a run, then prints\n\
        a summary of what a pull request would get.")]
    Check {
        /// Configuration file (default: .github/auto_assign.toml)
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },
    /// Create a default .github/auto_assign.toml
    #[command(long_about = "Create a default .github/auto_assign.toml.\n\n\
        Fails if the file already exists.")]
    Init,
    /// Generate shell completion scripts
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable summary
    Text,
    /// Machine-readable JSON
    Json,
}

const DEFAULT_CONFIG: &str = r#"# autoassign configuration

# Request reviews when a pull request opens
addReviewers = true

# true, false, or "author" to assign the pull request author
addAssignees = false

# Users, or teams written as "org/team_slug"
reviewers = [
  # "reviewerA",
  # "acme/backend",
]

# Number of reviewers to pick; 0 requests everyone
numberOfReviewers = 0

# Assignees to pick from; when omitted, the chosen reviewers are assigned
# assignees = ["maintainerX"]
# numberOfAssignees = 1

# Skip pull requests whose title contains any of these words
skipKeywords = ["wip"]

# Ignore pull requests opened by these users
# skipUsers = ["dependabot[bot]"]

# Add every member of these teams to the reviewer pool
# reviewersInTeams = ["acme/backend"]

# Pick numberOfReviewers from each group instead of the reviewers list
# useReviewGroups = true
# [reviewGroups]
# backend = ["alice", "bob"]
# frontend = ["carol", "dave"]

# useAssigneeGroups = true
# [assigneeGroups]
# leads = ["erin", "frank"]
"#;

/// Stands in for GitHub submissions during `--dry-run`.
struct DryRun;

#[async_trait]
impl ReviewSubmitter for DryRun {
    async fn request_reviewers(
        &self,
        reviewers: &[String],
        team_reviewers: &[String],
    ) -> std::result::Result<(), AssignError> {
        info!(?reviewers, ?team_reviewers, "dry run: would request reviews");
        Ok(())
    }
}

#[async_trait]
impl AssigneeSubmitter for DryRun {
    async fn add_assignees(&self, assignees: &[String]) -> std::result::Result<(), AssignError> {
        info!(?assignees, "dry run: would add assignees");
        Ok(())
    }
}

/// Team lookup used when no GitHub token is available.
struct Offline;

#[async_trait]
impl TeamMembershipLookup for Offline {
    async fn list_members(
        &self,
        org: &str,
        team_slug: &str,
    ) -> std::result::Result<Vec<String>, AssignError> {
        Err(AssignError::TeamNotFound {
            org: org.to_string(),
            team: team_slug.to_string(),
            reason: "no GitHub token available".into(),
        })
    }
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

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("info"),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Run {
            event,
            config,
            github_token,
            dry_run,
            seed,
        } => {
            let event_path = match event {
                Some(path) => path,
                None => std::env::var_os("GITHUB_EVENT_PATH")
                    .map(PathBuf::from)
                    .ok_or_else(|| {
                        miette::miette!(
                            help = "Pass --event or run inside a GitHub Actions workflow",
                            "GITHUB_EVENT_PATH is not set"
                        )
                    })?,
            };
            let event = PullRequestEvent::from_file(&event_path)?;
            let report = if event.is_handled() {
                let client = match GitHubClient::new(github_token.as_deref()) {
                    Ok(client) => Some(client),
                    Err(e) if dry_run && config.is_some() => {
                        warn!("{e}; team expansion is unavailable");
                        None
                    }
                    Err(e) => return Err(e.into()),
                };
                let mut rng = match seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_entropy(),
                };
                run_event(&event, config.as_deref(), client.as_ref(), dry_run, &mut rng).await?
            } else {
                let reason = format!("ignore action {}", event.action);
                info!("{reason}");
                RunReport::Skipped { reason }
            };
            print_output(&report, cli.format, |r| r.to_string())?;
        }
        Command::Check { config } => {
            if !config.exists() {
                return Err(AssignError::FileNotFound(config).into());
            }
            let parsed = Configuration::from_file(&config)?;
            parsed.validate()?;
            print_output(&parsed, cli.format, |c| summarize(&config, c))?;
        }
        Command::Init => {
            let path = Path::new(DEFAULT_CONFIG_PATH);
            if path.exists() {
                miette::bail!("{DEFAULT_CONFIG_PATH} already exists");
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).into_diagnostic()?;
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created {DEFAULT_CONFIG_PATH} with default configuration");
        }
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "autoassign", &mut std::io::stdout());
        }
    }

    Ok(())
}

async fn run_event(
    event: &PullRequestEvent,
    config_path: Option<&Path>,
    client: Option<&GitHubClient>,
    dry_run: bool,
    rng: &mut StdRng,
) -> Result<RunReport> {
    let target = event.target();
    info!(pr = %target, action = %event.action, "handling pull request");

    let loader: Box<dyn ConfigLoader + '_> = match (config_path, client) {
        (Some(path), _) => Box::new(FileConfigLoader::new(path)),
        (None, Some(client)) => Box::new(RepoConfigLoader::new(
            client,
            target.owner.clone(),
            target.repo.clone(),
            DEFAULT_CONFIG_PATH,
        )),
        (None, None) => {
            miette::bail!("a GitHub token is required to load the repository configuration")
        }
    };
    let teams: &dyn TeamMembershipLookup = match client {
        Some(client) => client,
        None => &Offline,
    };

    let report = match client {
        Some(client) if !dry_run => {
            let api = PullRequestApi::new(client, target);
            AutoAssign::new(loader.as_ref(), teams, &api, &api)
                .handle(&event.context(), rng)
                .await?
        }
        _ => {
            AutoAssign::new(loader.as_ref(), teams, &DryRun, &DryRun)
                .handle(&event.context(), rng)
                .await?
        }
    };
    Ok(report)
}

fn print_output<T: Serialize>(
    value: &T,
    format: OutputFormat,
    text: impl Fn(&T) -> String,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
        }
        OutputFormat::Text => print!("{}", text(value)),
    }
    Ok(())
}

fn summarize(path: &Path, config: &Configuration) -> String {
    let count = |n: usize| {
        if n == 0 {
            "everyone".to_string()
        } else {
            n.to_string()
        }
    };
    let mut out = format!("{} is valid\n", path.display());

    let reviewer_source = match &config.review_groups {
        Some(groups) if config.use_review_groups && !groups.is_empty() => {
            format!(
                "{} per group from {} groups",
                count(config.number_of_reviewers),
                groups.len()
            )
        }
        _ => format!(
            "{} of {} candidates",
            count(config.number_of_reviewers),
            config.reviewers.len()
        ),
    };
    if config.add_reviewers {
        out.push_str(&format!("Reviewers: {reviewer_source}\n"));
    } else {
        out.push_str("Reviewers: disabled\n");
    }
    if let Some(teams) = &config.reviewers_in_teams {
        out.push_str(&format!("Team pools: {}\n", teams.join(", ")));
    }

    // validate() has already rejected anything else
    let assignees = match config.add_assignees.mode() {
        Ok(AssigneeMode::Author) => "the pull request author".to_string(),
        Ok(AssigneeMode::Pick) => match (&config.assignee_groups, &config.assignees) {
            (Some(groups), _) if config.use_assignee_groups && !groups.is_empty() => format!(
                "{} per group from {} groups",
                count(config.assignee_count()),
                groups.len()
            ),
            (_, Some(list)) => format!(
                "{} of {} candidates",
                count(config.assignee_count()),
                list.len()
            ),
            _ => "the chosen reviewers".to_string(),
        },
        _ => "disabled".to_string(),
    };
    out.push_str(&format!("Assignees: {assignees}\n"));

    if let Some(keywords) = &config.skip_keywords {
        out.push_str(&format!("Skip keywords: {}\n", keywords.join(", ")));
    }
    if let Some(users) = &config.skip_users {
        out.push_str(&format!("Skip users: {}\n", users.join(", ")));
    }
    out
}
