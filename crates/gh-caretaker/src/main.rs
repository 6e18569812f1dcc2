use anyhow::{Context, Result};
use clap::Parser;
use gh_caretaker::cli::{non_empty, Cli, Command};
use gh_caretaker::{actions, Dispatcher, ProjectScanner, PullRequestScanner, StatusSynchronizer};
use gh_caretaker_config::{format_duration, AppConfig};
use gh_client::{BoardOwner, IssueTracker, OctocrabClient, TokenResolver};
use std::sync::Arc;

mod logger;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env before parsing so its values feed the env-backed flags
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();
    logger::init(cli.verbose);

    match dotenv {
        Ok(path) => log::debug!("Loaded .env file from: {:?}", path),
        Err(_) => log::debug!(".env file not found, will rely on environment variables"),
    }

    log::info!("Starting gh-caretaker {:?}", cli.command);
    run(cli).await
}

fn required<'a>(value: &'a Option<String>, flag: &str) -> Result<&'a str> {
    non_empty(value).with_context(|| format!("--{} is required", flag))
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load(),
    };
    cli.apply_to(&mut config);
    log::debug!("Effective config: {:?}", config);

    let owner = required(&cli.owner, "owner")?;
    let repo = required(&cli.repo, "repo")?;

    let octocrab = gh_client::connect(
        non_empty(&cli.host),
        &TokenResolver::new(cli.token.clone()),
    )
    .await?;
    let tracker: Arc<dyn IssueTracker> = Arc::new(OctocrabClient::new(
        Arc::new(octocrab),
        owner,
        repo,
        BoardOwner::from_is_organization(config.is_organization),
    ));
    let synchronizer = StatusSynchronizer::new(tracker.clone(), config.move_closed);
    let interval = chrono::Duration::from_std(config.stale_interval)
        .context("Stale interval is out of range")?;
    let now = chrono::Utc::now();

    match &cli.command {
        Command::Scan => {
            let status = required(&cli.status_option, "status-option")?;
            let comment = (!config.disable_comments).then(|| config.scan_comment.clone());
            log::info!(
                "Scanning open PRs of {}/{} older than {}",
                owner,
                repo,
                format_duration(config.stale_interval)
            );

            let report = PullRequestScanner::new(
                tracker.clone(),
                synchronizer,
                config.processed_label.clone(),
                interval,
            )
            .with_comment(comment)
            .scan(status, now)
            .await
            .context("Failed to scan pull requests")?;
            log::info!("Scan finished: {}", report);
        }

        Command::PullRequestUpdated {
            pull_request_number,
        } => {
            let status = required(&cli.status_option, "status-option")?;
            let comment = (!config.disable_comments).then(|| config.update_comment_for(status));

            actions::pull_request_updated(
                tracker.as_ref(),
                &synchronizer,
                *pull_request_number,
                status,
                &config.processed_label,
                comment.as_deref(),
            )
            .await
            .with_context(|| format!("Failed to handle update of PR #{}", pull_request_number))?;
        }

        Command::AssignIssue {
            issue_number,
            project_number,
        } => {
            actions::assign_issue(tracker.as_ref(), *issue_number, *project_number)
                .await
                .with_context(|| {
                    format!(
                        "Failed to add issue #{} to project board #{}",
                        issue_number, project_number
                    )
                })?;
        }

        Command::UpdateIssue {
            issue_number,
            project_number,
            from_status_option,
        } => {
            let status = required(&cli.status_option, "status-option")?;

            actions::update_issue(
                tracker.as_ref(),
                &synchronizer,
                *issue_number,
                *project_number,
                status,
                non_empty(from_status_option),
            )
            .await
            .with_context(|| format!("Failed to update issue #{}", issue_number))?;
        }

        Command::Slash {
            pull_request_number,
            actor,
            comment_id,
            comment_body,
        } => {
            let dispatcher = Dispatcher::with_default_handlers(
                tracker.clone(),
                synchronizer,
                config.review_status.clone(),
            );

            dispatcher
                .run(*pull_request_number, actor, comment_id, comment_body)
                .await
                .with_context(|| {
                    format!(
                        "Failed to run slash commands on PR #{}",
                        pull_request_number
                    )
                })?;
        }

        Command::ScanProject {
            project_number,
            from_status_option,
        } => {
            let status = required(&cli.status_option, "status-option")?;

            let report = ProjectScanner::new(tracker.clone(), synchronizer, interval)
                .scan(
                    *project_number,
                    non_empty(from_status_option),
                    status,
                    now,
                )
                .await
                .with_context(|| format!("Failed to scan project board #{}", project_number))?;
            log::info!("Scan finished: {}", report);
        }
    }

    Ok(())
}
