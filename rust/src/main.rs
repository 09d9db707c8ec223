#![cfg_attr(
    all(target_os = "windows", not(debug_assertions)),
    windows_subsystem = "windows"
)]

#[cfg(target_os = "windows")]
mod windows_app;

use anyhow::{Context, Result};
use clap::Parser;
use page_craft::logging;
use page_craft::path_utils::get_base_dir;
use page_craft::server::AppServer;
use page_craft::startup::{launch, Args};
use tracing::info;

fn main() -> Result<()> {
    let args = Args::parse();
    let base_dir = get_base_dir();
    let _logging = match logging::init(&base_dir) {
        Ok(context) => Some(context),
        Err(err) => {
            eprintln!("logging disabled: {err:#}");
            None
        }
    };

    let server = launch(&args, &base_dir)?;
    run_ui(server, args.headless)
}

#[cfg(target_os = "windows")]
fn run_ui(server: AppServer, headless: bool) -> Result<()> {
    if headless {
        run_headless(server)
    } else {
        windows_app::run(server)
    }
}

#[cfg(not(target_os = "windows"))]
fn run_ui(server: AppServer, _headless: bool) -> Result<()> {
    run_headless(server)
}

fn run_headless(mut server: AppServer) -> Result<()> {
    let url = server.url();
    info!(%url, "serving without a window, press Ctrl-C to stop");
    println!("AI PageCraft is running at {url}");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build signal runtime")?;
    runtime
        .block_on(tokio::signal::ctrl_c())
        .context("failed to listen for Ctrl-C")?;

    info!("shutdown requested");
    server.stop();
    Ok(())
}
