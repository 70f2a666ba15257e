use clap::Parser;
use grantwise_lib::bootstrap::{self, tracing::init_tracing_subscriber};
use grantwise_lib::cli::Args;
use tracing::{error, info};

/// Loads the page at the given URL, resumes whatever the handoff store holds
/// and prints each state as JSON.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Before parsing: GRANTWISE_TOKEN may come from .env.
    dotenvy::dotenv().ok();
    let args = Args::parse();
    let settings = bootstrap::load_settings(Some(args.config.as_path()))?;
    init_tracing_subscriber(settings.log_filter.as_deref())?;

    let token = args.token.filter(|t| !t.is_empty());
    let runtime = bootstrap::build_runtime(&settings, args.page_url, token)?;

    let mut states = runtime.events.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(state) = states.recv().await {
            match serde_json::to_string(&state) {
                Ok(line) => println!("{line}"),
                Err(err) => error!(error = %err, "state not serializable"),
            }
        }
    });

    let state = runtime.app.orchestrator.mount().await?;
    info!(?state, "page mounted");
    for url in runtime.location.navigations() {
        println!("navigate: {url}");
    }

    drop(runtime);
    let _ = printer.await;
    Ok(())
}
