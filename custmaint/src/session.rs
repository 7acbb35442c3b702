//! Interactive lookup loop
//!
//! Reads one customer ID per line, looks it up and prints the result.
//! `X` (any case) or end of input ends the session.

use std::io::{self, BufRead, Write};

use clap::ValueEnum;
use tracing::{debug, error};

use custfile_engine::{ErrorKind, Record, RecordStore};

const PROMPT: &str = "Enter customer ID (or 'X' to exit): ";
const EXIT_SENTINEL: &str = "X";

/// How found records are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// `Label: value` lines
    #[default]
    Text,
    /// One JSON object per record
    Json,
}

/// Lookup counters for one session
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SessionStats {
    pub lookups: u64,
    pub found: u64,
    pub errors: u64,
}

pub struct Session<'a> {
    store: &'a RecordStore,
    format: OutputFormat,
}

impl<'a> Session<'a> {
    pub fn new(store: &'a RecordStore, format: OutputFormat) -> Self {
        Session { store, format }
    }

    /// Run until the exit sentinel or end of input
    pub fn run<R: BufRead, W: Write>(&self, mut input: R, mut out: W) -> io::Result<SessionStats> {
        let mut stats = SessionStats::default();
        let mut line = String::new();

        loop {
            write!(out, "{}", PROMPT)?;
            out.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                writeln!(out)?;
                break;
            }

            let id = line.trim().to_uppercase();
            if id == EXIT_SENTINEL {
                break;
            }
            if id.is_empty() {
                continue;
            }

            stats.lookups += 1;
            match self.store.fetch(&id) {
                Ok(record) => {
                    stats.found += 1;
                    debug!("Customer {} found", id);
                    self.render(&record, &mut out)?;
                }
                Err(e) => match e.kind() {
                    ErrorKind::NotFound => writeln!(out, "Customer not found.")?,
                    ErrorKind::InvalidIdentifier => writeln!(out, "Invalid customer ID: {}", id)?,
                    _ => {
                        stats.errors += 1;
                        error!("Lookup of {} failed: {}", id, e);
                        writeln!(out, "Error reading customer file: {}", e)?;
                    }
                },
            }
        }

        Ok(stats)
    }

    fn render<W: Write>(&self, record: &Record, out: &mut W) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => {
                writeln!(out)?;
                writeln!(out, "Customer Information:")?;
                for (name, value) in record.iter() {
                    writeln!(out, "{}: {}", label(name), value)?;
                }
                writeln!(out)
            }
            OutputFormat::Json => {
                serde_json::to_writer(&mut *out, record)?;
                writeln!(out)
            }
        }
    }
}

/// Display label for a field name: `id` -> `ID`, `city` -> `City`
fn label(name: &str) -> String {
    if name.len() <= 2 {
        return name.to_uppercase();
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
