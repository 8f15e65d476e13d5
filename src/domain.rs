use std::fmt;
use std::io::Error;
use std::path::PathBuf;
use std::time::Duration;

use derive_setters::Setters;
use polars::error::PolarsError;

use crate::export::{ExportPayload, ExportScope};
use crate::filter::FilterCriteria;
use crate::paginate::PageTarget;
use crate::record::{NewRecord, RecordId, RecordPatch};
use crate::sort::SortField;

pub const HELP_TEXT: &str = "\
/        search                     f  filter (role=admin,user status=active min=100 max=900)
c        clear filters              1-6  sort by column (again to flip)
j/k      move cursor                h/l  previous / next page
g/G      first / last page          +/-  page size
space    toggle row                 a    toggle page selection
x        clear selection            t    toggle status of selection
e / E    export selection / all     y    copy selection to clipboard
d        delete selection           ?    help
q        quit                       Esc  close popup / cancel input";

/// Errors of the outer surface: loading record files and terminal I/O.
/// The table engine itself never fails.
#[derive(Debug)]
pub enum TabError {
    IoError(Error),
    PolarsError(PolarsError),
    LoadingFailed(String),
    MissingColumn(String),
    FileNotFound,
    PermissionDenied,
    UnknownFileType,
}

impl fmt::Display for TabError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TabError::IoError(e) => write!(f, "I/O error: {e}"),
            TabError::PolarsError(e) => write!(f, "could not read data: {e}"),
            TabError::LoadingFailed(reason) => write!(f, "loading failed: {reason}"),
            TabError::MissingColumn(name) => write!(f, "missing column \"{name}\""),
            TabError::FileNotFound => f.write_str("file not found"),
            TabError::PermissionDenied => f.write_str("permission denied"),
            TabError::UnknownFileType => f.write_str("unknown file type"),
        }
    }
}

impl std::error::Error for TabError {}

impl From<Error> for TabError {
    fn from(err: Error) -> Self {
        TabError::IoError(err)
    }
}

impl From<PolarsError> for TabError {
    fn from(err: PolarsError) -> Self {
        TabError::PolarsError(err)
    }
}

/// UI intents handled by the table controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    SearchChanged(String),
    SortClicked(SortField),
    FiltersApplied(FilterCriteria),
    FiltersCleared,
    PageSizeChanged(usize),
    PageChanged(PageTarget),
    RowSelectionToggled(RecordId, bool),
    SelectAllToggled(bool),
    SelectionCleared,
    BulkExportRequested(ExportScope),
    BulkStatusToggleRequested,
    /// Carries whether the user confirmed the deletion.
    BulkDeleteRequested(bool),
    RecordAdded(NewRecord),
    RecordUpdated(RecordId, RecordPatch),
    RecordDeleted(RecordId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// User feedback request, shown as a toast or status line.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    pub duration: Duration,
}

/// Side effects the controller asks the presentation layer to carry out.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Notify(Notification),
    Download(ExportPayload),
}

#[derive(Debug, Clone, Setters)]
pub struct TableConfig {
    /// Allowed page sizes, ascending.
    pub page_sizes: Vec<usize>,
    pub default_page_size: usize,
    pub notification_duration: Duration,
    pub event_poll_time: u64,
    pub export_dir: PathBuf,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            page_sizes: vec![10, 25, 50, 100],
            default_page_size: 10,
            notification_duration: Duration::from_millis(5000),
            event_poll_time: 100,
            export_dir: PathBuf::from("."),
        }
    }
}

impl TableConfig {
    /// Nearest allowed page size; ties go to the smaller size.
    pub fn clamp_page_size(&self, requested: usize) -> usize {
        self.page_sizes
            .iter()
            .copied()
            .min_by_key(|&size| (size.abs_diff(requested), size))
            .unwrap_or(requested.max(1))
    }

    /// Next (or previous) allowed page size, staying at the ends.
    pub fn step_page_size(&self, current: usize, up: bool) -> usize {
        let current = self.clamp_page_size(current);
        let pos = self.page_sizes.iter().position(|&s| s == current).unwrap_or(0);
        let next = if up {
            std::cmp::min(pos + 1, self.page_sizes.len().saturating_sub(1))
        } else {
            pos.saturating_sub(1)
        };
        self.page_sizes.get(next).copied().unwrap_or(current)
    }
}
