//! Command dispatcher: the interactive session loop.
//!
//! Each input line is either a slash command controlling the session or a
//! literal message posted to the current channel. A failing command is
//! reported on the error stream and the loop carries on; only `/exit` or
//! end of input ends the session.

use std::collections::BTreeSet;
use std::io::{BufRead, Write};

use tracing::{debug, info, warn};

use crate::api::ChatApi;
use crate::config::ConfigStore;
use crate::console::Console;
use crate::error::Error;
use crate::session::Session;
use crate::ui;
use crate::Result;

const FIRST_PROMPT: &str = "Enter message (or '/exit' to quit): ";
const PROMPT: &str = "> ";

/// A classified input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// End the session.
    Exit,

    /// Show the available commands.
    Help,

    /// List recent authors, then show one author's messages.
    Get,

    /// Show the current channel.
    Channel,

    /// Pick another saved channel.
    Switch,

    /// Literal text for the current channel. May be empty.
    Message(String),
}

/// Classify a raw input line.
///
/// The first whitespace-delimited token decides; anything that is not a
/// known command, including unknown `/words`, is sent as a message.
pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    let command = line.split_whitespace().next().unwrap_or("").trim();

    match command {
        "/exit" => Command::Exit,
        "/help" => Command::Help,
        "/get" => Command::Get,
        "/channel" => Command::Channel,
        "/switch" => Command::Switch,
        _ => Command::Message(line.to_string()),
    }
}

/// Whether the loop keeps reading after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Terminate,
}

/// Drives one interactive session.
pub struct Dispatcher<'a, A: ChatApi, R, O, E> {
    session: &'a mut Session,
    api: &'a A,
    store: &'a ConfigStore,
    console: &'a mut Console<R, O, E>,
}

impl<'a, A, R, O, E> Dispatcher<'a, A, R, O, E>
where
    A: ChatApi,
    R: BufRead,
    O: Write,
    E: Write,
{
    pub fn new(
        session: &'a mut Session,
        api: &'a A,
        store: &'a ConfigStore,
        console: &'a mut Console<R, O, E>,
    ) -> Self {
        Self {
            session,
            api,
            store,
            console,
        }
    }

    /// Run until `/exit` or end of input.
    pub async fn run(&mut self) -> Result<()> {
        let mut prompt = FIRST_PROMPT;

        loop {
            let Some(line) = self.console.read_line(prompt)? else {
                debug!("End of input");
                break;
            };
            prompt = PROMPT;

            if self.handle_line(&line).await? == Flow::Terminate {
                break;
            }
        }

        info!("Session ended");
        Ok(())
    }

    /// Handle one line. Command failures are reported and swallowed;
    /// only console I/O errors propagate.
    pub async fn handle_line(&mut self, line: &str) -> Result<Flow> {
        let command = parse_command(line);
        debug!("Dispatching {:?}", command);

        let outcome = match command {
            Command::Exit => return Ok(Flow::Terminate),
            Command::Help => self.help(),
            Command::Get => self.get().await,
            Command::Channel => self.show_channel(),
            Command::Switch => self.switch(),
            Command::Message(text) => self.send(&text).await,
        };

        match outcome {
            Ok(()) => Ok(Flow::Continue),
            Err(Error::Io(e)) => Err(Error::Io(e)),
            Err(e) => {
                warn!("Command failed: {}", e);
                self.console.report(&e)?;
                Ok(Flow::Continue)
            }
        }
    }

    fn help(&mut self) -> Result<()> {
        let out = self.console.out();
        writeln!(out, "Commands:")?;
        writeln!(out, "  /get      show recent messages from one author")?;
        writeln!(out, "  /channel  show the current channel")?;
        writeln!(out, "  /switch   switch to another saved channel")?;
        writeln!(out, "  /help     show this help")?;
        writeln!(out, "  /exit     quit")?;
        writeln!(out, "Anything else is sent to the current channel.")?;
        Ok(())
    }

    async fn get(&mut self) -> Result<()> {
        let channel_id = self.session.current_channel_id.clone();

        let messages = self.api.list_recent_messages(&channel_id).await?;
        if messages.is_empty() {
            ui::print_step(self.console.out(), "No recent messages.")?;
            return Ok(());
        }

        let authors: Vec<String> = messages
            .into_iter()
            .map(|m| m.author.username)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        writeln!(self.console.out(), "Recent authors:")?;
        ui::print_numbered(self.console.out(), authors.iter().map(String::as_str))?;

        let index = self.console.prompt_index("Select author number")?;
        if index == 0 || index > authors.len() {
            return Err(Error::InvalidSelection(format!(
                "{} is not between 1 and {}",
                index,
                authors.len()
            )));
        }
        let author = &authors[index - 1];

        let mut selected: Vec<String> = self
            .api
            .list_recent_messages(&channel_id)
            .await?
            .into_iter()
            .filter(|m| &m.author.username == author)
            .map(|m| m.content)
            .collect();

        if selected.is_empty() {
            ui::print_step(self.console.out(), &format!("No recent messages from {}.", author))?;
            return Ok(());
        }

        // The API lists newest first; show oldest first.
        selected.reverse();
        let out = self.console.out();
        for content in &selected {
            writeln!(out, "{}", content)?;
        }
        Ok(())
    }

    fn show_channel(&mut self) -> Result<()> {
        let id = self.session.current_channel_id.clone();
        match self.session.current_channel_name() {
            Some(name) => {
                let msg = format!("Current channel: {} ({})", name, id);
                ui::print_step(self.console.out(), &msg)?;
            }
            None => {
                let msg = format!("Current channel {:?} is not among the saved channels.", id);
                ui::print_warning(self.console.out(), &msg)?;
            }
        }
        Ok(())
    }

    fn switch(&mut self) -> Result<()> {
        if self.session.channels.is_empty() {
            ui::print_warning(self.console.out(), "No saved channels.")?;
            return Ok(());
        }

        let entries = self.session.channel_listing();
        writeln!(self.console.out(), "Saved channels:")?;
        ui::print_numbered(self.console.out(), entries.iter().map(String::as_str))?;

        let index = self.console.prompt_index("Select channel number")?;
        let (name, id) = self.session.switch_to(index, self.store)?;

        info!("Switched to channel {} ({})", name, id);
        ui::print_success(self.console.out(), &format!("Switched to {} ({})", name, id))?;
        Ok(())
    }

    async fn send(&mut self, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            ui::print_warning(self.console.err(), "Cannot send empty message.")?;
            return Ok(());
        }

        self.api
            .post_message(&self.session.current_channel_id, text)
            .await?;
        ui::print_success(self.console.out(), "Message sent successfully!")?;
        Ok(())
    }
}
