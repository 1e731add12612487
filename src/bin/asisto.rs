use anyhow::Result;
use asisto::cli;

#[tokio::main]
async fn main() -> Result<()> {
    let action = cli::start()?;
    let outcome = action.execute().await;

    // Flush pending spans before the process exits
    cli::telemetry::shutdown_tracer();

    outcome
}
