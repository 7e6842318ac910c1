mod config; // brings `config.rs` in as `crate::config`
mod scenario;

use tracing::{error, info};
use tracing_subscriber::{self, EnvFilter};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    info!("Waymark scenario runner started.");

    // Optional path to a settings file, otherwise config/default.toml
    let path = std::env::args().nth(1);
    let settings = config::load_settings(path.as_deref())?;

    match scenario::run(&settings) {
        Ok(()) => {
            info!("All requests planned.");
            Ok(())
        }
        Err(e) => {
            error!("Scenario failed: {:?}", e);
            Err(e)
        }
    }
}
