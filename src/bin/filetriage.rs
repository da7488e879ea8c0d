//! filetriage command line
//!
//! With a path, prints the full record for that file. Without one, reads
//! newline-delimited paths from stdin and prints one tab-separated summary
//! line per file.
//!
//! Usage:
//!   filetriage [--config FILE] [--json] [--json-logs] [PATH]

use anyhow::{Context, Result};
use clap::Parser;
use filetriage::logging::{init_tracing, init_tracing_json};
use filetriage::{FileInfo, IdentifyConfig, Identifier};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::error;

#[derive(Parser, Debug)]
#[command(name = "filetriage", version, about = "Identify file types for triage")]
struct Args {
    /// JSON configuration file
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the record as JSON instead of debug output
    #[arg(long)]
    json: bool,

    /// Emit logs as JSON on stderr
    #[arg(long = "json-logs")]
    json_logs: bool,

    /// File to identify; paths are read from stdin when omitted
    path: Option<PathBuf>,
}

fn print_record(info: &FileInfo, json: bool) -> Result<()> {
    let mut out = io::stdout().lock();
    if json {
        writeln!(out, "{}", info.to_json_string()?)?;
    } else {
        writeln!(out, "{:#?}", info)?;
    }
    Ok(())
}

/// Path named by one raw stdin line, or `None` for blank lines.
///
/// Lines are bytes, not text: on unix any byte sequence is a valid path.
fn path_from_line(raw: &[u8]) -> Option<PathBuf> {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    let start = raw.iter().position(|b| !b.is_ascii_whitespace()).unwrap_or(raw.len());
    let end = raw.iter().rposition(|b| !b.is_ascii_whitespace()).map_or(start, |i| i + 1);
    let raw = &raw[start..end];
    if raw.is_empty() {
        return None;
    }
    #[cfg(unix)]
    {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;
        Some(PathBuf::from(OsStr::from_bytes(raw)))
    }
    #[cfg(not(unix))]
    {
        match std::str::from_utf8(raw) {
            Ok(s) => Some(PathBuf::from(s)),
            Err(e) => {
                error!(line = %String::from_utf8_lossy(raw), "skipping non-UTF-8 path: {}", e);
                None
            }
        }
    }
}

/// One summary line per path read from `input`. A bad line or a file that
/// fails to identify is logged and skipped.
fn run_batch<R: BufRead, W: Write>(identifier: &Identifier, input: R, mut out: W) -> Result<()> {
    for line in input.split(b'\n') {
        let line = match line {
            Ok(line) => line,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e).context("reading path from stdin"),
        };
        let Some(path) = path_from_line(&line) else {
            continue;
        };
        match identifier.fileinfo(&path) {
            Ok(info) => writeln!(out, "{}", info.summary_line())?,
            Err(e) => error!(path = %path.display(), "failed to identify: {}", e),
        }
    }
    out.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.json_logs {
        init_tracing_json();
    } else {
        init_tracing();
    }

    let config = match &args.config {
        Some(path) => IdentifyConfig::from_path(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => IdentifyConfig::default(),
    };
    let identifier = Identifier::new(config);

    match &args.path {
        Some(path) => {
            let info = identifier
                .fileinfo(path)
                .with_context(|| format!("identifying {}", path.display()))?;
            print_record(&info, args.json)
        }
        None => run_batch(&identifier, io::stdin().lock(), io::stdout().lock()),
    }
}
