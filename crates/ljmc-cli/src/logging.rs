use crate::error::{CliError, Result};
use crate::ui::UiEvent;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::Subscriber;
use tracing_subscriber::{Layer, filter::LevelFilter, fmt, prelude::*, registry::LookupSpan};

const LEVELS: [LevelFilter; 4] = [
    LevelFilter::WARN,
    LevelFilter::INFO,
    LevelFilter::DEBUG,
    LevelFilter::TRACE,
];

/// Console sink. With a UI running, lines go through its channel so they print above the bars.
#[derive(Clone)]
enum ConsoleWriter {
    Ui(mpsc::Sender<UiEvent>),
    Stderr,
}

/// Hands `line` to the UI task, giving it back if the task cannot take it.
fn deliver(sender: &mpsc::Sender<UiEvent>, line: String) -> Option<String> {
    match sender.try_send(UiEvent::Log(line)) {
        Ok(()) => None,
        Err(TrySendError::Full(UiEvent::Log(line)) | TrySendError::Closed(UiEvent::Log(line))) => {
            Some(line)
        }
        Err(_) => None,
    }
}

impl Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let line = String::from_utf8_lossy(buf).into_owned();
        let undelivered = match self {
            ConsoleWriter::Ui(sender) => deliver(sender, line),
            ConsoleWriter::Stderr => Some(line),
        };
        if let Some(line) = undelivered {
            io::stderr().write_all(line.as_bytes())?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

fn level_filter(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::OFF
    } else {
        LEVELS[usize::from(verbosity).min(LEVELS.len() - 1)]
    }
}

/// Plain-text layer for `--log-file`, with thread ids so ensemble chains can be told apart.
fn file_layer<S>(file: File) -> impl Layer<S> + Send + Sync
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_target(true)
}

pub fn setup_logging(
    verbosity: u8,
    quiet: bool,
    log_file: &Option<PathBuf>,
    ui_sender: Option<mpsc::Sender<UiEvent>>,
) -> Result<()> {
    let console = ui_sender.map_or(ConsoleWriter::Stderr, ConsoleWriter::Ui);
    let console_layer = fmt::layer()
        .with_writer(move || console.clone())
        .with_ansi(true)
        .with_target(false)
        .compact();

    let file = log_file
        .as_ref()
        .map(File::create)
        .transpose()
        .map_err(CliError::Io)?;

    tracing_subscriber::registry()
        .with(level_filter(verbosity, quiet))
        .with(console_layer)
        .with(file.map(file_layer))
        .try_init()
        .map_err(|e| CliError::Other(anyhow::anyhow!("Failed to install logger: {}", e)))
}
