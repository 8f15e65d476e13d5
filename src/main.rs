use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use arboard::Clipboard;
use clap::Parser;
use tracing::{error, info};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use dashtable::bulk;
use dashtable::controller::{Command, Controller};
use dashtable::domain::{Effect, Notification, Severity, TabError, TableConfig};
use dashtable::export::ExportPayload;
use dashtable::loader::{expand_path, load_records};
use dashtable::model::TableController;
use dashtable::store::RecordStore;
use dashtable::ui::TableUI;

#[derive(Parser, Debug)]
#[command(version, about = "Browse, filter and bulk-edit a user table in the terminal")]
struct Args {
    /// Record file to load (csv, parquet, arrow). Demo data when omitted.
    #[arg(short, long)]
    data: Option<String>,

    /// Rows per page, snapped to 10, 25, 50 or 100.
    #[arg(short, long, default_value_t = 10)]
    page_size: usize,

    /// Directory exported CSV files are written to.
    #[arg(short, long, default_value = ".")]
    export_dir: String,

    /// Log file, the terminal itself is used by the table.
    #[arg(long, default_value = "dashtable.log")]
    log_file: String,

    /// Log level when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(e) = install_tracing(&args) {
        eprintln!("Error: could not open log file: {e}");
        return ExitCode::FAILURE;
    }

    let result = run(&args);
    ratatui::restore();
    match result {
        Err(e) => {
            error!("Exiting with error: {e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn install_tracing(args: &Args) -> Result<(), TabError> {
    let file = File::create(expand_path(&args.log_file))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .with(ErrorLayer::default())
        .init();
    Ok(())
}

fn run(args: &Args) -> Result<(), TabError> {
    info!("Starting dashtable!");

    let cfg = TableConfig::default()
        .default_page_size(args.page_size)
        .export_dir(expand_path(&args.export_dir));

    let store = match &args.data {
        Some(path) => load_records(&expand_path(path))?,
        None => RecordStore::demo(),
    };

    let mut table = TableController::new(&cfg, store);
    let mut keys = Controller::new(&cfg);
    let mut ui = TableUI::new();
    let mut clipboard: Option<Clipboard> = None;

    let mut terminal = ratatui::init();

    loop {
        ui.expire_notification(Instant::now());
        keys.clamp_cursor(table.render().rows.len());
        terminal.draw(|f| ui.draw(table.render(), &keys, f))?;

        match keys.handle_event(table.render())? {
            Some(Command::Quit) => break,
            Some(Command::Table(message)) => table.update(message),
            Some(Command::CopySelection) => {
                let notification = copy_selection(&table, &mut clipboard, &cfg);
                ui.notify(notification);
            }
            None => {}
        }

        for effect in table.drain_effects() {
            match effect {
                Effect::Notify(notification) => ui.notify(notification),
                Effect::Download(payload) => match deliver(&cfg.export_dir, &payload) {
                    Ok(path) => ui.notify(notice(
                        format!("Exported {} records to {}", payload.records, path.display()),
                        Severity::Success,
                        &cfg,
                    )),
                    Err(e) => {
                        error!("Could not write {}: {e}", payload.filename);
                        ui.notify(notice(
                            format!("Could not write {}: {e}", payload.filename),
                            Severity::Error,
                            &cfg,
                        ));
                    }
                },
            }
        }
    }

    info!("Quitting dashtable");
    Ok(())
}

fn deliver(dir: &Path, payload: &ExportPayload) -> Result<PathBuf, TabError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(&payload.filename);
    fs::write(&path, &payload.content)?;
    info!("Wrote {} records to {}", payload.records, path.display());
    Ok(path)
}

fn copy_selection(table: &TableController, clipboard: &mut Option<Clipboard>, cfg: &TableConfig) -> Notification {
    let Some(payload) = bulk::export_selection(table.store(), table.selection()) else {
        return notice("No records selected", Severity::Warning, cfg);
    };

    if clipboard.is_none() {
        match Clipboard::new() {
            Ok(c) => *clipboard = Some(c),
            Err(e) => {
                error!("Clipboard unavailable: {e:?}");
                return notice("Clipboard is not available", Severity::Warning, cfg);
            }
        }
    }

    match clipboard.as_mut().map(|c| c.set_text(payload.content)) {
        Some(Ok(_)) => notice(
            format!("Copied {} records to the clipboard", payload.records),
            Severity::Success,
            cfg,
        ),
        Some(Err(e)) => {
            error!("Error copying to clipboard: {e:?}");
            notice("Could not copy to the clipboard", Severity::Warning, cfg)
        }
        None => notice("Clipboard is not available", Severity::Warning, cfg),
    }
}

fn notice(message: impl Into<String>, severity: Severity, cfg: &TableConfig) -> Notification {
    Notification {
        message: message.into(),
        severity,
        duration: if severity == Severity::Error {
            cfg.notification_duration + Duration::from_secs(3)
        } else {
            cfg.notification_duration
        },
    }
}
