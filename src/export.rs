use crate::record::Record;

pub const CSV_HEADER: [&str; 6] = ["Name", "Email", "Role", "Status", "Last Login", "Revenue"];

/// Which records an export covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportScope {
    /// Selected records, in store order.
    Selection,
    /// The whole filtered result, in the current sort order.
    All,
}

impl ExportScope {
    pub fn filename(&self) -> &'static str {
        match self {
            ExportScope::Selection => "selected-data.csv",
            ExportScope::All => "table-data.csv",
        }
    }
}

/// A file the presentation side is asked to deliver.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportPayload {
    pub filename: String,
    pub mime_type: &'static str,
    pub content: String,
    pub records: usize,
}

impl ExportPayload {
    pub fn csv<'a>(scope: ExportScope, records: impl IntoIterator<Item = &'a Record>) -> Self {
        let records: Vec<&Record> = records.into_iter().collect();
        Self {
            filename: scope.filename().to_string(),
            mime_type: "text/csv",
            content: format_csv(&records),
            records: records.len(),
        }
    }
}

/// Header line plus one line per record. Fields are written as-is, without
/// quoting, so embedded commas or newlines are not escaped.
pub fn format_csv(records: &[&Record]) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(CSV_HEADER.join(","));
    for record in records {
        lines.push(
            [
                record.name.clone(),
                record.email.clone(),
                record.role.to_string(),
                record.status.to_string(),
                record.last_login.clone(),
                record.revenue.to_string(),
            ]
            .join(","),
        );
    }
    lines.join("\n")
}
