use anyhow::{Context, Result};
use crossterm::style::Stylize;
use insure_admin::api_client::{ApiClient, SnapshotKind};
use insure_admin::config::Config;
use insure_admin::table_display::print_snapshot;
use insure_admin::ui::app::App;
use insure_admin::utils::{dual_logging, logging};

fn print_help() {
    println!("{}", "insure-admin - micro-insurance admin dashboard".blue().bold());
    println!();
    println!("{}", "Usage:".yellow());
    println!("  insure-admin [OPTIONS]");
    println!();
    println!("{}", "Options:".yellow());
    println!("  {}             - Show this help", "--help".green());
    println!(
        "  {}  - Write a commented config file with defaults",
        "--generate-config".green()
    );
    println!(
        "  {}   - Override the API base URL",
        "--base-url <URL>".green()
    );
    println!(
        "  {}         - Print all monitoring snapshots and exit",
        "--snapshot".green()
    );
    println!();
    println!("{}", "Keys:".yellow());
    println!("  {}    - Switch between monitor and transactions", "F1/F2".green());
    println!("  {}       - Toggle the log pane", "F3".green());
    println!("  {} - Quit", "q/Ctrl+C".green());
    println!();
}

fn generate_config() -> Result<()> {
    let path = Config::get_config_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    std::fs::write(&path, Config::create_default_with_comments())
        .with_context(|| format!("writing {}", path.display()))?;
    println!("Configuration file created at: {:?}", path);
    Ok(())
}

async fn print_snapshots(client: &ApiClient) -> Result<()> {
    let mut failures = 0;
    for kind in SnapshotKind::ALL {
        match client.snapshot(kind).await {
            Ok(snapshot) => print_snapshot(&snapshot),
            Err(e) => {
                failures += 1;
                eprintln!("{}", format!("{}: {:#}", kind.title(), e).red());
            }
        }
    }
    if failures == SnapshotKind::ALL.len() {
        anyhow::bail!("backend at {} did not answer", client.base_url());
    }
    Ok(())
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }
    if args.iter().any(|a| a == "--generate-config") {
        return generate_config();
    }

    let mut config = Config::load()?;
    if let Some(url) = args
        .iter()
        .position(|a| a == "--base-url")
        .and_then(|pos| args.get(pos + 1))
    {
        config.api.base_url = url.clone();
    }
    config.validate()?;

    let logs = logging::init_tracing(&config.logging.level);
    tracing::info!(
        target: "config",
        "API {} (page size {}, debounce {} ms)",
        config.api.base_url,
        config.table.page_size,
        config.search.debounce_ms
    );
    if let Some(dual_logger) = dual_logging::get_dual_logger() {
        eprintln!("Logs: {}", dual_logger.log_path().display());
    }

    let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;

    if args.iter().any(|a| a == "--snapshot") {
        let client = ApiClient::new(&config.api)?;
        return runtime.block_on(print_snapshots(&client));
    }

    // The UI loop is synchronous; background requests and debounce timers
    // are spawned onto the runtime it enters here.
    let _guard = runtime.enter();
    App::new(&config, logs)?.run()
}
