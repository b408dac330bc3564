use std::process::ExitCode;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use turnstile::config::WaitInput;
use turnstile::github::GitHubClient;
use turnstile::lister::WorkflowResolver;
use turnstile::wait::{ActionsReporter, TokioSleeper, Waiter, escape_command_data};

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr; stdout carries workflow commands and notices.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "turnstile=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Wait failed: {:#}", e);
            println!("::error::{}", escape_command_data(&format!("{:#}", e)));
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let input = WaitInput::from_env().context("invalid action configuration")?;
    tracing::debug!(?input, "Loaded action input");

    let client = GitHubClient::from_token(input.token.clone(), &input.api_url)
        .context("failed to build GitHub client")?;

    let Some(workflow) = client
        .find_workflow(&input.repo, &input.workflow_name)
        .await
        .with_context(|| format!("failed to look up workflow {:?}", input.workflow_name))?
    else {
        tracing::warn!(
            repo = %input.repo,
            workflow = %input.workflow_name,
            "Workflow not found; nothing to wait for"
        );
        return Ok(());
    };

    tracing::info!(
        repo = %input.repo,
        workflow = %workflow,
        run = %input.run_id,
        branch = %input.branch,
        "Waiting for earlier runs"
    );

    let waiter = Waiter::new(
        input.context(workflow),
        client,
        ActionsReporter::new(input.output_path.clone()),
        TokioSleeper,
    );
    let outcome = waiter.wait().await?;

    tracing::info!(?outcome, "Proceeding");
    Ok(())
}
