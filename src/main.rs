//! Binary entry point: parse the CLI, wire the collaborators, dispatch.

use clap::Parser;
use console::style;
use git_happens::cli::{Cli, Command, LastTarget};
use git_happens::config::AppConfig;
use git_happens::error::AppError;
use git_happens::services::{
    CredentialService, GitCli, GitLabClient, GitLabClientConfig, OpenAiClient, TerminalPrompter,
};
use git_happens::workflows::{
    browse, deploy, handoff, report, summary, DeploymentQuery, HandoffOptions, IssueFlowOptions,
    IssuePipeline,
};

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", style("✗").red(), e);
        std::process::exit(e.exit_code());
    }
}

fn load_config(cli: &Cli) -> Result<AppConfig, AppError> {
    match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load_default(),
    }
}

fn tracker_for(config: &AppConfig) -> Result<GitLabClient, AppError> {
    let token = CredentialService::get_token(&config.base_url)?;
    GitLabClient::new(GitLabClientConfig {
        base_url: config.base_url.clone(),
        token,
        timeout_secs: 30,
    })
}

fn completion_for(config: &AppConfig) -> Result<OpenAiClient, AppError> {
    let api_key = config
        .ai
        .api_key
        .clone()
        .or_else(|| std::env::var("OPENAI_API_KEY").ok())
        .filter(|k| !k.is_empty())
        .ok_or_else(|| {
            AppError::config("no OpenAI API key; set ai.api_key or OPENAI_API_KEY")
        })?;
    Ok(OpenAiClient::new(api_key, config.ai.model.clone()))
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let vcs = GitCli;
    let prompter = TerminalPrompter;

    match &cli.command {
        Some(Command::Auth { token, forget }) => {
            let config = load_config(&cli)?;
            if *forget {
                CredentialService::delete_token(&config.base_url)?;
                println!("Token removed for {}.", config.base_url);
            } else {
                let token = token
                    .clone()
                    .ok_or_else(|| AppError::invalid_input("pass a token or --forget"))?;
                CredentialService::store_token(&config.base_url, &token)?;
                println!("Token stored for {}.", config.base_url);
            }
            Ok(())
        }

        Some(Command::Open) => {
            let config = load_config(&cli)?;
            let tracker = tracker_for(&config)?;
            browse::run(&tracker, &vcs).await
        }

        Some(Command::Review {
            reviewer,
            auto_merge,
        }) => {
            let config = load_config(&cli)?;
            let tracker = tracker_for(&config)?;
            let completion = completion_for(&config)?;
            handoff::run(
                &tracker,
                &vcs,
                &prompter,
                &completion,
                &HandoffOptions {
                    pick_reviewer: *reviewer,
                    auto_merge: *auto_merge,
                },
            )
            .await
        }

        Some(Command::Summary) => summary::run(&vcs),

        Some(Command::SummaryAi) => {
            let config = load_config(&cli)?;
            let completion = completion_for(&config)?;
            summary::run_ai(&vcs, &completion).await
        }

        Some(Command::Last {
            target: LastTarget::Deploy,
        }) => {
            let config = load_config(&cli)?;
            let tracker = tracker_for(&config)?;
            let project = resolve_project(&cli, &vcs)?;
            let deployment = DeploymentQuery::new(&config, &tracker)
                .find_last(&project)
                .await?;
            deploy::display(deployment.as_ref());
            Ok(())
        }

        Some(Command::Report { text, minutes }) => {
            let config = load_config(&cli)?;
            let tracker = tracker_for(&config)?;
            report::run(&tracker, &vcs, cli.project.as_deref(), text, *minutes).await
        }

        None => {
            if cli.title.is_empty() {
                return Err(AppError::invalid_input(
                    "give an issue title or a subcommand; see --help",
                ));
            }
            let config = load_config(&cli)?;
            let tracker = tracker_for(&config)?;
            let opts = IssueFlowOptions {
                title: cli.title.join(" "),
                project: cli.project.clone(),
                manual_milestone: cli.milestone,
                manual_iteration: cli.iteration,
                skip_milestone: cli.no_milestone,
                skip_iteration: cli.no_iteration,
                skip_epic: cli.no_epic,
                issue_only: cli.issue_only,
                checkout: cli.checkout,
            };
            IssuePipeline::new(&config, &tracker, &vcs, &prompter)
                .run(&opts)
                .await
        }
    }
}

/// Project for project-scoped subcommands: CLI flag, else the origin remote.
fn resolve_project(cli: &Cli, vcs: &GitCli) -> Result<String, AppError> {
    use git_happens::services::git::{project_from_remote_url, Vcs};

    if let Some(project) = &cli.project {
        return Ok(project.clone());
    }
    let remote = vcs.remote_url()?;
    project_from_remote_url(&remote).ok_or_else(|| {
        AppError::invalid_input(format!(
            "cannot derive a project from remote {:?}; pass --project",
            remote
        ))
    })
}
