use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

use polars::prelude::*;
use tracing::{debug, info, warn};

use crate::domain::TabError;
use crate::record::{Record, RecordId, is_valid_revenue};
use crate::store::RecordStore;

#[derive(Debug)]
enum FileType {
    CSV,
    PARQUET,
    ARROW,
}

/// Loads a record file (CSV with header, Parquet or Arrow IPC) into a store.
///
/// Rows that do not form a valid record are skipped with a warning.
pub fn load_records(path: &Path) -> Result<RecordStore, TabError> {
    let file_type = file_type(path)?;
    let frame = match file_type {
        FileType::CSV => load_csv(path)?,
        FileType::PARQUET => load_parquet(path)?,
        FileType::ARROW => load_arrow(path)?,
    };

    let start_time = Instant::now();
    let df = frame.collect()?;

    let ids = match find_column(&df, &["id"]) {
        Some(name) => Some(string_column(&df, &name)?),
        None => None,
    };
    let names = required_column(&df, &["name"])?;
    let emails = required_column(&df, &["email"])?;
    let roles = required_column(&df, &["role"])?;
    let statuses = required_column(&df, &["status"])?;
    let logins = required_column(&df, &["last_login", "last login", "lastlogin"])?;
    let revenues = required_column(&df, &["revenue"])?;

    let mut store = RecordStore::new();
    let mut skipped = 0;
    for row in 0..df.height() {
        let id = match &ids {
            Some(ids) => ids[row].as_deref().and_then(|v| v.trim().parse::<u32>().ok()),
            None => u32::try_from(row + 1).ok(),
        };
        let record = id.and_then(|id| {
            build_record(
                RecordId(id),
                [
                    &names[row],
                    &emails[row],
                    &roles[row],
                    &statuses[row],
                    &logins[row],
                    &revenues[row],
                ],
            )
        });
        if !record.is_some_and(|record| store.insert_record(record)) {
            warn!("Skipping row {} of {}", row + 1, path.display());
            skipped += 1;
        }
    }

    info!(
        "Loaded {} records ({} skipped) from {} in {}ms",
        store.len(),
        skipped,
        path.display(),
        start_time.elapsed().as_millis()
    );
    Ok(store)
}

fn build_record(id: RecordId, fields: [&Option<String>; 6]) -> Option<Record> {
    let [name, email, role, status, last_login, revenue] = fields;
    let revenue = revenue
        .as_deref()?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|r| is_valid_revenue(*r))?;
    Some(Record {
        id,
        name: name.clone()?,
        email: email.clone()?,
        role: role.as_deref()?.parse().ok()?,
        status: status.as_deref()?.parse().ok()?,
        last_login: last_login.clone()?,
        revenue,
    })
}

/// Column names are matched case-insensitively against the accepted aliases.
fn find_column(df: &DataFrame, aliases: &[&str]) -> Option<String> {
    df.get_column_names()
        .into_iter()
        .map(|name| name.as_str())
        .find(|name| aliases.iter().any(|alias| name.eq_ignore_ascii_case(alias)))
        .map(str::to_string)
}

fn required_column(df: &DataFrame, aliases: &[&str]) -> Result<Vec<Option<String>>, TabError> {
    let name = find_column(df, aliases).ok_or_else(|| TabError::MissingColumn(aliases[0].to_string()))?;
    Ok(string_column(df, &name)?)
}

fn string_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, PolarsError> {
    let col = df.column(name)?.cast(&DataType::String)?;
    let series = col.str()?;
    debug!("Column \"{}\" with {} values", name, series.len());
    Ok(series.into_iter().map(|v| v.map(str::to_string)).collect())
}

fn file_type(path: &Path) -> Result<FileType, TabError> {
    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => TabError::FileNotFound,
        ErrorKind::PermissionDenied => TabError::PermissionDenied,
        _ => TabError::IoError(e),
    })?;
    if !metadata.is_file() {
        return Err(TabError::LoadingFailed("Not a file!".into()));
    }
    detect_file_type(path)
}

fn detect_file_type(path: &Path) -> Result<FileType, TabError> {
    match path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_uppercase())
        .as_deref()
    {
        Some("CSV") => Ok(FileType::CSV),
        Some("PARQUET") | Some("PQ") => Ok(FileType::PARQUET),
        Some("ARROW") | Some("IPC") | Some("FEATHER") => Ok(FileType::ARROW),
        _ => Err(TabError::UnknownFileType),
    }
}

fn load_csv(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyCsvReader::new(PlPath::Local(path.into()))
        .with_has_header(true)
        .finish()
}

fn load_parquet(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyFrame::scan_parquet(PlPath::Local(path.into()), ScanArgsParquet::default())
}

fn load_arrow(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyFrame::scan_ipc(
        PlPath::Local(path.into()),
        polars::io::ipc::IpcScanOptions,
        UnifiedScanArgs::default(),
    )
}

/// Expands `~` and environment variables in a user supplied path.
pub fn expand_path(raw: &str) -> PathBuf {
    match shellexpand::full(raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(e) => {
            warn!("Could not expand path {raw}: {e}");
            PathBuf::from(raw)
        }
    }
}
