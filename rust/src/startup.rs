use anyhow::{Context, Result};
use clap::Parser;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config_store::ConfigStore;
use crate::generation::{EndpointKind, GenerationClient, GenerationSettings};
use crate::path_utils::resolve_config_path;
use crate::server::{AppServer, AppState};
use crate::session::Session;

#[derive(Debug, Parser)]
#[command(name = "page_craft", about = "Generate landing pages from a product idea")]
pub struct Args {
    /// Path to pagecraft.toml
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Port to try first, overriding app.server_port
    #[arg(long)]
    pub port: Option<u16>,

    /// Serve the page without opening a window
    #[arg(long)]
    pub headless: bool,
}

pub fn launch(args: &Args, base_dir: &Path) -> Result<AppServer> {
    let config_path = resolve_config_path(args.config.clone(), base_dir);
    let config = ConfigStore::new(config_path.clone())
        .with_context(|| format!("config error: {}", config_path.display()))?;

    let settings = GenerationSettings::resolve(&config, |key| env::var(key).ok());
    info!(
        config = %config_path.display(),
        mode = settings.kind.as_str(),
        endpoint = %settings.endpoint,
        credential = settings.api_key.is_some(),
        "generation endpoint resolved"
    );
    if settings.kind == EndpointKind::Direct && settings.api_key.is_none() {
        warn!(
            env = %config.api_key_env(),
            "direct mode without a credential, every generation will be unauthorized"
        );
    }

    let state = Arc::new(AppState::new(
        Session::default(),
        GenerationClient::new(settings),
    ));
    let preferred_port = args.port.unwrap_or_else(|| config.server_port());
    AppServer::start(state, preferred_port).context("failed to start the local server")
}

#[cfg(test)]
mod tests {
    use super::{launch, Args};
    use clap::Parser;

    #[test]
    fn parses_flags() {
        let args = Args::parse_from([
            "page_craft",
            "--config",
            "a.toml",
            "--port",
            "4100",
            "--headless",
        ]);
        assert_eq!(args.config.as_deref(), Some(std::path::Path::new("a.toml")));
        assert_eq!(args.port, Some(4100));
        assert!(args.headless);
    }

    #[test]
    fn launch_writes_config_and_serves() {
        let mut dir = std::env::temp_dir();
        dir.push(format!("page_craft_launch_{}", std::process::id()));
        std::fs::remove_dir_all(&dir).ok();
        std::fs::create_dir_all(&dir).expect("fixture dir");

        let args = Args {
            config: Some(dir.join("pagecraft.toml")),
            port: Some(0),
            headless: true,
        };
        let server = launch(&args, &dir).expect("launch");
        assert!(dir.join("pagecraft.toml").exists());
        assert_ne!(server.port(), 0);
        assert!(server.url().starts_with("http://127.0.0.1:"));

        drop(server);
        std::fs::remove_dir_all(dir).ok();
    }
}
