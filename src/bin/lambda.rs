//! AWS Lambda entrypoint: one full content run per invocation.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use newsgen::config::{self, Config};
use newsgen::context::{Scope, ServiceContext};
use newsgen::logging::init_tracing;

/// Time left for the function to report back after cancelling the run.
const DEADLINE_MARGIN: Duration = Duration::from_millis(500);

#[tokio::main]
async fn main() -> Result<(), Error> {
    let _ = dotenvy::dotenv();
    init_tracing(false);

    let config = Config::resolve(&config::discover_config_path(None))?;
    let config = &config;

    run(service_fn(move |event: LambdaEvent<Value>| async move { handle(config, event).await }))
        .await
}

/// Run the pipeline once, ignoring the event payload.
async fn handle(config: &Config, event: LambdaEvent<Value>) -> Result<Value, Error> {
    let request_id = event.context.request_id.clone();
    let budget = time_until(event.context.deadline).saturating_sub(DEADLINE_MARGIN);
    info!(request_id = %request_id, budget_ms = budget.as_millis(), "Starting content run");

    let orchestrator = ServiceContext::live(config, Scope::Pipeline)?.into_orchestrator();

    let cancel = CancellationToken::new();
    let timer = {
        let token = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(budget).await;
            warn!("Invocation deadline reached, cancelling run");
            token.cancel();
        })
    };
    let result = orchestrator.generate_content(&cancel).await;
    timer.abort();
    let summary = result?;

    Ok(json!({
        "title": summary.article.title,
        "url": summary.article.url,
        "prompt": summary.prompt,
        "image": summary.image,
    }))
}

/// Duration from now until a deadline given in epoch milliseconds.
fn time_until(deadline_ms: u64) -> Duration {
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX));
    Duration::from_millis(deadline_ms.saturating_sub(now_ms))
}
