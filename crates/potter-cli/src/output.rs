//! User-facing output on stdout.
//!
//! Logs go to stderr through `tracing`; everything a command reports to the
//! user goes through [`OutputManager`] so that `--quiet`, `--no-color` and
//! `--output-format` are honoured in one place.

use std::io::{self, IsTerminal};
use std::time::Duration;

use console::Term;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use serde::Serialize;

use crate::cli::{GlobalArgs, OutputFormat};
use crate::config::AppConfig;

#[derive(Debug, Clone, Copy)]
enum Tone {
    Success,
    Info,
    Warning,
}

impl Tone {
    fn icon(self) -> &'static str {
        match self {
            Tone::Success => "\u{2713}",
            Tone::Info => "\u{2139}",
            Tone::Warning => "\u{26a0}",
        }
    }

    fn paint(self, icon: &str) -> String {
        match self {
            Tone::Success => icon.green().bold().to_string(),
            Tone::Info => icon.blue().bold().to_string(),
            Tone::Warning => icon.yellow().bold().to_string(),
        }
    }
}

pub struct OutputManager {
    format: OutputFormat,
    quiet: bool,
    color: bool,
    term: Term,
}

impl OutputManager {
    pub fn new(args: &GlobalArgs, config: &AppConfig) -> Self {
        let format = match args.output_format {
            OutputFormat::Auto if io::stdout().is_terminal() => OutputFormat::Human,
            OutputFormat::Auto => OutputFormat::Plain,
            explicit => explicit,
        };
        let color = format == OutputFormat::Human && !args.no_color && !config.output.no_color;

        Self {
            format,
            quiet: args.quiet,
            color,
            term: Term::stdout(),
        }
    }

    /// The effective format; never `Auto`.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn supports_color(&self) -> bool {
        self.color
    }

    /// A bare line. Suppressed by `--quiet`.
    pub fn print(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.term.write_line(msg)
    }

    pub fn success(&self, msg: &str) -> io::Result<()> {
        self.toned(Tone::Success, msg)
    }

    pub fn info(&self, msg: &str) -> io::Result<()> {
        self.toned(Tone::Info, msg)
    }

    pub fn warning(&self, msg: &str) -> io::Result<()> {
        self.toned(Tone::Warning, msg)
    }

    pub fn header(&self, text: &str) -> io::Result<()> {
        if self.color {
            self.print(&text.cyan().bold().to_string())
        } else {
            self.print(text)
        }
    }

    /// Pretty JSON. Not affected by `--quiet`: a pipe asked for a document.
    pub fn json<T: Serialize>(&self, value: &T) -> io::Result<()> {
        let body = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        self.term.write_line(&body)
    }

    /// Spinner for a blocking step. Hidden unless the output is human.
    pub fn spinner(&self, msg: &str) -> ProgressBar {
        if self.quiet || self.format != OutputFormat::Human {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            bar.set_style(style);
        }
        bar.set_message(msg.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar
    }

    fn toned(&self, tone: Tone, msg: &str) -> io::Result<()> {
        let icon = if self.color {
            tone.paint(tone.icon())
        } else {
            tone.icon().to_string()
        };
        self.print(&format!("{icon} {msg}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(quiet: bool, no_color: bool, output_format: OutputFormat) -> OutputManager {
        let args = GlobalArgs {
            verbose: 0,
            quiet,
            no_color,
            config: None,
            output_format,
        };
        OutputManager::new(&args, &AppConfig::default())
    }

    #[test]
    fn quiet_mode_still_succeeds() {
        let out = manager(true, true, OutputFormat::Plain);
        assert!(out.print("hello").is_ok());
        assert!(out.success("done").is_ok());
    }

    #[test]
    fn colour_only_for_human_output() {
        assert!(manager(false, false, OutputFormat::Human).supports_color());
        assert!(!manager(false, true, OutputFormat::Human).supports_color());
        assert!(!manager(false, false, OutputFormat::Plain).supports_color());
        assert!(!manager(false, false, OutputFormat::Json).supports_color());
    }

    #[test]
    fn config_can_disable_colour() {
        let mut config = AppConfig::default();
        config.output.no_color = true;
        let args = GlobalArgs {
            verbose: 0,
            quiet: false,
            no_color: false,
            config: None,
            output_format: OutputFormat::Human,
        };
        assert!(!OutputManager::new(&args, &config).supports_color());
    }

    #[test]
    fn spinner_hidden_outside_human_mode() {
        assert!(manager(false, true, OutputFormat::Json).spinner("working").is_hidden());
    }

    #[test]
    fn explicit_format_is_kept() {
        assert_eq!(manager(false, false, OutputFormat::Json).format(), OutputFormat::Json);
    }
}
