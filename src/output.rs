use std::io::{self, IsTerminal, Stdout, Write};
use std::sync::{Mutex, MutexGuard};

use crossterm::style::Stylize;
use indicatif::{ProgressBar, ProgressStyle};

use crate::domain::{ProductId, ProductRecord};
use crate::harvest::{HarvestEvent, ItemOutcome, ProgressSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Interactive,
    NonInteractive,
}

impl OutputMode {
    /// The progress bar renders on stderr and stays hidden without a terminal
    /// there, so such runs get plain output.
    pub fn detect(non_interactive: bool, stderr_is_terminal: bool) -> Self {
        if non_interactive || !stderr_is_terminal {
            OutputMode::NonInteractive
        } else {
            OutputMode::Interactive
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Notice,
    Error,
}

/// Human readable line for an item outcome. Inserted items have none: their
/// record was already printed when it decoded.
pub fn status_line(id: ProductId, outcome: &ItemOutcome) -> Option<(Tone, String)> {
    match outcome {
        ItemOutcome::AlreadyPresent(_) => Some((
            Tone::Notice,
            format!("{id} was already in the database. Skipping!"),
        )),
        ItemOutcome::Empty => Some((Tone::Notice, format!("{id} was empty. Skipping!"))),
        ItemOutcome::TransportFailed(err) => Some((Tone::Error, capitalize(&err.to_string()))),
        ItemOutcome::DecodeFailed(err) => Some((Tone::Error, err.to_string())),
        ItemOutcome::Inserted(_) => None,
    }
}

pub fn pretty_record(record: &ProductRecord) -> String {
    serde_json::to_string_pretty(record.fields())
        .unwrap_or_else(|err| format!("{} - unprintable record: {err}", record.id()))
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn write_line<W: Write>(out: &Mutex<W>, line: &str) {
    let mut out = lock(out);
    if let Err(err) = writeln!(out, "{line}") {
        tracing::debug!("console write failed: {err}");
    }
}

fn lock<W>(out: &Mutex<W>) -> MutexGuard<'_, W> {
    out.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Progress bar on stderr over the id range; status lines and records go to
/// `out` (stdout by default) while the bar is suspended.
pub struct ConsoleProgress<W: Write = Stdout> {
    bar: ProgressBar,
    out: Mutex<W>,
    colored: bool,
}

impl ConsoleProgress {
    pub fn new(total: u64) -> Self {
        let colored = io::stdout().is_terminal();
        Self {
            colored,
            ..ConsoleProgress::with_writer(total, io::stdout())
        }
    }
}

impl<W: Write> ConsoleProgress<W> {
    /// Uncoloured console writing to `out`.
    pub fn with_writer(total: u64, out: W) -> Self {
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::with_template(
                "{msg} {wide_bar:.cyan/dim} {pos}/{len} {percent}% [{elapsed_precise} < {eta}]",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
        );
        bar.set_message("Downloading...");
        Self {
            bar,
            out: Mutex::new(out),
            colored: false,
        }
    }

    pub fn into_writer(self) -> W {
        self.out
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn print(&self, line: &str) {
        self.bar.suspend(|| write_line(&self.out, line));
    }
}

impl<W: Write> ProgressSink for ConsoleProgress<W> {
    fn event(&self, event: HarvestEvent<'_>) {
        match event {
            HarvestEvent::Started { range } => {
                self.bar.set_length(range.len());
                self.bar.set_position(0);
            }
            HarvestEvent::Decoded { record } => self.print(&pretty_record(record)),
            HarvestEvent::Item { id, outcome } => {
                if let Some((tone, line)) = status_line(id, outcome) {
                    let line = match (self.colored, tone) {
                        (false, _) => line,
                        (true, Tone::Notice) => line.yellow().to_string(),
                        (true, Tone::Error) => line.red().to_string(),
                    };
                    self.print(&line);
                }
                self.bar.inc(1);
            }
            HarvestEvent::Finished => self.bar.finish(),
        }
    }
}

/// Uncoloured status lines, no progress bar.
pub struct PlainOutput<W: Write = Stdout> {
    out: Mutex<W>,
}

impl PlainOutput {
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }
}

impl Default for PlainOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> PlainOutput<W> {
    pub fn with_writer(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_writer(self) -> W {
        self.out
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W: Write> ProgressSink for PlainOutput<W> {
    fn event(&self, event: HarvestEvent<'_>) {
        match event {
            HarvestEvent::Decoded { record } => write_line(&self.out, &pretty_record(record)),
            HarvestEvent::Item { id, outcome } => {
                if let Some((_, line)) = status_line(id, outcome) {
                    write_line(&self.out, &line);
                }
            }
            HarvestEvent::Started { .. } | HarvestEvent::Finished => {}
        }
    }
}
