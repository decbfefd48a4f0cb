use anyhow::Result;
use clap::Parser;
use robosats_nostr::logging::init_logging;
use robosats_nostr::{Application, Args};
use std::path::PathBuf;
use tracing::error;

const ENV_FILE_VAR: &str = "APP_ENV_FILE";

#[tokio::main]
async fn main() -> Result<()> {
    // Loaded before parsing so clap's env fallbacks see the file's values.
    let env_file = std::env::var_os(ENV_FILE_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".env"));
    let _ = dotenvy::from_path(&env_file);

    let args = Args::parse();
    let _log_guard = init_logging(args.log_dir.as_deref())?;

    let app = Application::init(&args)?;
    if let Err(e) = app.run().await {
        error!("{e:#}");
        return Err(e);
    }
    Ok(())
}
