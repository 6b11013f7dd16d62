//! Session bootstrap and one-shot channel maintenance.
//!
//! Token and current channel are taken from command-line flags first,
//! then from the saved config, and finally asked for interactively.
//! Anything that had to be asked for is saved before the session starts.

use std::io::{BufRead, Write};

use tracing::{info, warn};

use crate::config::ConfigStore;
use crate::console::Console;
use crate::error::Error;
use crate::session::Session;
use crate::ui;
use crate::Result;

/// Values supplied on the command line for this invocation only.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub token: Option<String>,
    pub channel_id: Option<String>,
}

/// Build the session for the interactive loop.
///
/// A missing or unreadable config is not fatal here; it just means every
/// value has to come from flags or prompts.
pub fn bootstrap<R, O, E>(
    overrides: &Overrides,
    store: &ConfigStore,
    console: &mut Console<R, O, E>,
) -> Result<Session>
where
    R: BufRead,
    O: Write,
    E: Write,
{
    let record = match store.load() {
        Ok(record) => record,
        Err(Error::ConfigMissing(path)) => {
            info!("No config at {:?}, starting fresh", path);
            Default::default()
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            ui::print_warning(console.err(), &format!("Failed to load config: {}", e))?;
            Default::default()
        }
    };

    let mut session = Session::from_record(record);
    let mut prompted = false;

    if let Some(token) = non_empty(overrides.token.as_deref()) {
        session.token = token.to_string();
    }
    if let Some(channel_id) = non_empty(overrides.channel_id.as_deref()) {
        session.current_channel_id = channel_id.to_string();
    }

    if session.token.is_empty() || session.current_channel_id.is_empty() {
        writeln!(console.out(), "Discord Bot Token and Channel ID are required.")?;
    }
    if session.token.is_empty() {
        session.token = console.prompt("Token")?;
        prompted = true;
    }
    if session.current_channel_id.is_empty() {
        session.current_channel_id = console.prompt("Channel ID")?;
        prompted = true;
    }

    if !session.channels.contains_id(&session.current_channel_id) {
        let name = console.prompt("Channel name")?;
        session.channels.add(name, session.current_channel_id.clone());
        prompted = true;
    }

    session.last_used_channel_id = session.current_channel_id.clone();

    if prompted {
        store.save(&session.to_record())?;
        ui::print_success(console.out(), "Config saved successfully.")?;
    }

    Ok(session)
}

/// Prompt for a new channel and save it.
pub fn add_channel<R, O, E>(store: &ConfigStore, console: &mut Console<R, O, E>) -> Result<()>
where
    R: BufRead,
    O: Write,
    E: Write,
{
    let mut session = Session::from_record(store.load()?);

    let id = console.prompt("Channel ID")?;
    let name = console.prompt("Channel name")?;
    session.add_channel(&name, &id, store)?;

    info!("Added channel {} ({})", name, id);
    ui::print_success(console.out(), &format!("Added {} ({})", name, id))?;
    Ok(())
}

/// Pick a saved channel and delete it.
pub fn remove_channel<R, O, E>(store: &ConfigStore, console: &mut Console<R, O, E>) -> Result<()>
where
    R: BufRead,
    O: Write,
    E: Write,
{
    let mut session = Session::from_record(store.load()?);

    let index = pick_channel(&session, console, "Select channel number to remove")?;
    let (name, id) = session.remove_channel(index, store)?;

    info!("Removed channel {} ({})", name, id);
    ui::print_success(console.out(), &format!("Removed {} ({})", name, id))?;
    if session.current_channel_id.is_empty() {
        ui::print_warning(console.out(), "No saved channels left.")?;
    }
    Ok(())
}

/// Pick a saved channel and make it the one used next time.
pub fn switch_channel<R, O, E>(store: &ConfigStore, console: &mut Console<R, O, E>) -> Result<()>
where
    R: BufRead,
    O: Write,
    E: Write,
{
    let mut session = Session::from_record(store.load()?);

    let index = pick_channel(&session, console, "Select channel number")?;
    let (name, id) = session.switch_to(index, store)?;

    info!("Switched to channel {} ({})", name, id);
    ui::print_success(console.out(), &format!("Switched to {} ({})", name, id))?;
    Ok(())
}

fn pick_channel<R, O, E>(session: &Session, console: &mut Console<R, O, E>, label: &str) -> Result<usize>
where
    R: BufRead,
    O: Write,
    E: Write,
{
    if session.channels.is_empty() {
        return Err(Error::InvalidSelection("no saved channels".to_string()));
    }

    writeln!(console.out(), "Saved channels:")?;
    let listing = session.channel_listing();
    ui::print_numbered(console.out(), listing.iter().map(String::as_str))?;

    console.prompt_index(label)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
