//! dcli entry point

use std::io::{BufRead, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use dcli::api::DiscordClient;
use dcli::bootstrap::{self, Overrides};
use dcli::config::ConfigStore;
use dcli::console::Console;
use dcli::dispatcher::Dispatcher;
use dcli::ui;

#[derive(Parser)]
#[command(name = "dcli")]
#[command(about = "Send and read Discord channel messages from the terminal")]
#[command(version)]
struct Cli {
    /// Discord bot token for this invocation
    #[arg(long, value_name = "TOKEN")]
    token: Option<String>,

    /// Channel ID for this invocation
    #[arg(long, value_name = "CHANNEL_ID")]
    channel_id: Option<String>,

    /// Pick the saved channel to use next time, then exit
    #[arg(long, conflicts_with_all = ["add", "remove"])]
    switch: bool,

    /// Save a new channel, then exit
    #[arg(long, conflicts_with = "remove")]
    add: bool,

    /// Delete a saved channel, then exit
    #[arg(long)]
    remove: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so they never mix with chat output
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(usage_exit_status(&e));
        }
    };

    // Setup Global Ctrl+C handler
    let exit_flag = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
    let r = exit_flag.clone();

    ctrlc::set_handler(move || {
        if r.load(std::sync::atomic::Ordering::SeqCst) {
            println!("\nBye!");
            std::process::exit(0);
        } else {
            println!("\nPress Ctrl+C again to exit (or type /exit)");
            r.store(true, std::sync::atomic::Ordering::SeqCst);

            // Reset flag after 3 seconds
            let r2 = r.clone();
            std::thread::spawn(move || {
                std::thread::sleep(std::time::Duration::from_secs(3));
                r2.store(false, std::sync::atomic::Ordering::SeqCst);
            });
        }
    }).ok();

    let result = run(cli).await;
    if let Err(e) = &result {
        let _ = ui::print_error(&mut std::io::stderr(), &format!("{:#}", e));
    }
    ExitCode::from(exit_status(&result))
}

/// 0 for `--help`/`--version`, 1 for any other argument error.
fn usage_exit_status(err: &clap::Error) -> u8 {
    if err.use_stderr() { 1 } else { 0 }
}

/// 0 on success; 1 on invalid selection, missing config in a one-shot,
/// or any other unrecovered error.
fn exit_status(result: &Result<()>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(_) => 1,
    }
}

/// Run the one-shot flag, if any. `None` means the interactive session runs.
fn run_maintenance<R, O, E>(
    cli: &Cli,
    store: &ConfigStore,
    console: &mut Console<R, O, E>,
) -> Option<Result<()>>
where
    R: BufRead,
    O: Write,
    E: Write,
{
    if cli.add {
        return Some(bootstrap::add_channel(store, console).context("Failed to add channel"));
    }
    if cli.remove {
        return Some(bootstrap::remove_channel(store, console).context("Failed to remove channel"));
    }
    if cli.switch {
        return Some(bootstrap::switch_channel(store, console).context("Failed to switch channel"));
    }
    None
}

async fn run(cli: Cli) -> Result<()> {
    let store = ConfigStore::from_env()?;
    let mut console = Console::stdio();

    if let Some(result) = run_maintenance(&cli, &store, &mut console) {
        return result;
    }

    let overrides = Overrides {
        token: cli.token,
        channel_id: cli.channel_id,
    };
    let mut session = bootstrap::bootstrap(&overrides, &store, &mut console)?;

    // One client per session; dropped with its connections when the loop ends
    let api = DiscordClient::new(&session.token)?;

    let channel = match session.current_channel_name() {
        Some(name) => format!("{} ({})", name, session.current_channel_id),
        None => session.current_channel_id.clone(),
    };
    ui::print_header(console.out(), &channel)?;

    Dispatcher::new(&mut session, &api, &store, &mut console)
        .run()
        .await?;

    Ok(())
}
