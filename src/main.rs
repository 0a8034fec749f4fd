//! Newsgen - news to AI image to social media.

use std::future::Future;
use std::path::Path;
use std::process;
use std::time::Duration;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use newsgen::adapters::live::{fetch_bytes, http_client};
use newsgen::cli::{Cli, Command};
use newsgen::config::{self, Config};
use newsgen::context::{RecordingSession, Scope, ServiceContext};
use newsgen::error::{AdapterError, AppError};
use newsgen::logging::init_tracing;
use newsgen::orchestrator::{ContentOrchestrator, RunSummary};
use newsgen::output::{resolve_format, resolve_output_path, save_image, validate_format};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let config_path = config::discover_config_path(cli.config.as_deref());
    let config = Config::resolve(&config_path).map_err(AdapterError::Config)?;

    // Validate arguments before touching any adapter.
    let scope = match &cli.command {
        Command::Run { .. } => Scope::Pipeline,
        Command::Prompt(args) => {
            args.resolve_prompt().map_err(AdapterError::Io)?;
            Scope::Generation
        }
        Command::Image { prompt, output, format } => {
            prompt.resolve_prompt().map_err(AdapterError::Io)?;
            let format = resolve_format(format.as_deref(), output.as_deref());
            validate_format(&format).map_err(AdapterError::InvalidArgument)?;
            Scope::Generation
        }
    };

    let (ctx, recording_session) = build_context(&config, scope)?;
    let orchestrator = ctx.into_orchestrator();

    let result = dispatch(&orchestrator, &config, cli.command).await;

    // Recording adapters hold the recorder until the orchestrator is gone.
    drop(orchestrator);
    if let Some(session) = recording_session {
        match session.finish() {
            Ok(path) => eprintln!("Cassette saved: {}", path.display()),
            Err(e) => eprintln!("Warning: failed to save cassette: {e}"),
        }
    }

    result
}

/// Create the context for the current mode (live / recording / replaying).
fn build_context(
    config: &Config,
    scope: Scope,
) -> Result<(ServiceContext, Option<RecordingSession>), AdapterError> {
    let replay_path = std::env::var("NEWSGEN_REPLAY").ok();
    let is_recording = std::env::var("NEWSGEN_REC").is_ok_and(|v| v == "true" || v == "1");

    if let Some(ref cassette_path) = replay_path {
        info!(cassette = %cassette_path, "Replaying from cassette");
        Ok((ServiceContext::replaying(Path::new(cassette_path))?, None))
    } else if is_recording {
        info!("Recording mode enabled");
        let (ctx, session) = ServiceContext::recording(config, scope)?;
        Ok((ctx, Some(session)))
    } else {
        Ok((ServiceContext::live(config, scope)?, None))
    }
}

async fn dispatch(
    orchestrator: &ContentOrchestrator,
    config: &Config,
    command: Command,
) -> Result<(), AppError> {
    match command {
        Command::Run { timeout } => {
            let publishers: Vec<&str> = orchestrator.publisher_names().collect();
            info!(?publishers, timeout_secs = ?timeout, "Starting content run");
            let cancel = cancel_on_interrupt(timeout.map(Duration::from_secs));
            let summary = orchestrator.generate_content(&cancel).await?;
            print_summary(&summary);
        }
        Command::Prompt(args) => {
            let text = args.resolve_prompt().map_err(AdapterError::Io)?;
            let cancel = cancel_on_interrupt(None);
            let answer = orchestrator.create_prompt(&text, &cancel).await?;
            println!("{answer}");
        }
        Command::Image { prompt, output, format } => {
            let prompt = prompt.resolve_prompt().map_err(AdapterError::Io)?;
            let cancel = cancel_on_interrupt(None);
            let image = orchestrator.generate_image(&prompt, &cancel).await?;
            println!("{image}");

            if output.is_some() || format.is_some() {
                let format = resolve_format(format.as_deref(), output.as_deref());
                let client = http_client(config.http.timeout())?;
                let data = fetch_bytes(&client, image.as_str()).await?;
                let output_path = resolve_output_path(output.as_deref(), &prompt, &format);
                save_image(&data, &format, &output_path)?;
                eprintln!("Saved: {}", output_path.display());
            }
        }
    }
    Ok(())
}

/// A token cancelled by Ctrl-C or, if given, after `timeout`.
fn cancel_on_interrupt(timeout: Option<Duration>) -> CancellationToken {
    cancel_on(tokio::signal::ctrl_c(), timeout)
}

/// A token cancelled when `interrupt` resolves to `Ok` or `timeout` elapses.
///
/// An `Err` from `interrupt` means no handler could be installed. It is
/// logged and never cancels the run.
fn cancel_on<F>(interrupt: F, timeout: Option<Duration>) -> CancellationToken
where
    F: Future<Output = std::io::Result<()>> + Send + 'static,
{
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        let deadline = async {
            match timeout {
                Some(limit) => tokio::time::sleep(limit).await,
                None => std::future::pending::<()>().await,
            }
        };
        let interrupted = async {
            if let Err(e) = interrupt.await {
                warn!(error = %e, "Cannot listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        };
        tokio::select! {
            () = interrupted => warn!("Interrupted, cancelling run"),
            () = deadline => warn!(timeout_secs = timeout.map_or(0, |t| t.as_secs()), "Timeout reached, cancelling run"),
        }
        token.cancel();
    });
    cancel
}

fn print_summary(summary: &RunSummary) {
    eprintln!("Article: {}", summary.article.title);
    eprintln!("Prompt: {}", summary.prompt);
    eprintln!("Image: {}", summary.image);
}
