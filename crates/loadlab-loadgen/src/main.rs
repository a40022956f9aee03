use tracing::{error, info};

use loadlab_loadgen::client::ApiClient;
use loadlab_loadgen::script::{self, ScriptConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "loadlab_loadgen=info".into()),
        )
        .init();

    let cfg = ScriptConfig::from_env();
    info!("Starting load script against {}", cfg.base_url);

    let client = ApiClient::new(cfg.base_url.clone());
    let report = script::run(&client, &cfg).await;

    if !report.probe_ok {
        error!("Service unreachable; no phases were run");
        std::process::exit(1);
    }

    for phase in &report.phases {
        info!("{}: {} ok, {} failed", phase.name, phase.ok, phase.failed);
    }
    info!(
        "Load script finished: {} phases, {} mixed-load iterations",
        report.completed_phases(),
        report.mixed_iterations
    );

    Ok(())
}
