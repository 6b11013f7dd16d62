use colored::*;
use std::io::{self, Write};
use terminal_size::{Width, Height, terminal_size};

pub fn print_header(w: &mut impl Write, channel: &str) -> io::Result<()> {
    let (width, _) = terminal_size().unwrap_or((Width(80), Height(24)));
    let width = (width.0 as usize).min(80);

    let line = "─".repeat(width);
    writeln!(w, "{}", line.black().bold())?;

    let name = "dcli".cyan().bold();
    let version = format!("v{}", env!("CARGO_PKG_VERSION")).black().bold();
    writeln!(w, "  {} {}", name, version)?;
    writeln!(w, "  {} {}", "channel:".black().bold(), channel.yellow())?;

    writeln!(w, "{}", line.black().bold())
}

pub fn print_step(w: &mut impl Write, msg: &str) -> io::Result<()> {
    writeln!(w, "  {} {}", "•".green(), msg)
}

pub fn print_success(w: &mut impl Write, msg: &str) -> io::Result<()> {
    writeln!(w, "  {} {}", "✓".green().bold(), msg.green())
}

pub fn print_warning(w: &mut impl Write, msg: &str) -> io::Result<()> {
    writeln!(w, "  {} {}", "⚠️ ".yellow().bold(), msg.yellow())
}

pub fn print_error(w: &mut impl Write, msg: &str) -> io::Result<()> {
    writeln!(w, "  {} {}", "❌".red().bold(), msg.red())
}

/// Numbered listing, starting at 1.
pub fn print_numbered<'a>(
    w: &mut impl Write,
    items: impl IntoIterator<Item = &'a str>,
) -> io::Result<()> {
    for (i, item) in items.into_iter().enumerate() {
        writeln!(w, "  {}. {}", (i + 1).to_string().cyan(), item)?;
    }
    Ok(())
}
