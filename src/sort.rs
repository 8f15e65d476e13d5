use std::cmp::Ordering;
use std::fmt;

use icu_collator::options::{CollatorOptions, Strength};
use icu_collator::CollatorBorrowed;
use tracing::warn;

use crate::record::Record;

thread_local! {
    static COLLATOR: Option<CollatorBorrowed<'static>> = root_collator();
}

fn root_collator() -> Option<CollatorBorrowed<'static>> {
    let mut options = CollatorOptions::default();
    options.strength = Some(Strength::Tertiary);
    match CollatorBorrowed::try_new(Default::default(), options) {
        Ok(collator) => Some(collator),
        Err(e) => {
            warn!("No collation data, falling back to case-folded comparison: {e}");
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    Name,
    Email,
    Role,
    Status,
    LastLogin,
    Revenue,
}

impl SortField {
    /// Columns in display order.
    pub const ALL: [SortField; 6] = [
        SortField::Name,
        SortField::Email,
        SortField::Role,
        SortField::Status,
        SortField::LastLogin,
        SortField::Revenue,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            SortField::Name => "Name",
            SortField::Email => "Email",
            SortField::Role => "Role",
            SortField::Status => "Status",
            SortField::LastLogin => "Last Login",
            SortField::Revenue => "Revenue",
        }
    }

    fn compare(&self, a: &Record, b: &Record) -> Ordering {
        match self {
            SortField::Name => compare_text(&a.name, &b.name),
            SortField::Email => compare_text(&a.email, &b.email),
            SortField::Role => compare_text(a.role.as_str(), b.role.as_str()),
            SortField::Status => compare_text(a.status.as_str(), b.status.as_str()),
            SortField::LastLogin => compare_text(&a.last_login, &b.last_login),
            SortField::Revenue => a.revenue.total_cmp(&b.revenue),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// The single active sort column and its direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            field: SortField::Name,
            direction: SortDirection::Ascending,
        }
    }
}

impl SortSpec {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Header click: same field flips the direction, another field starts ascending.
    pub fn toggle(&mut self, field: SortField) {
        if self.field == field {
            self.direction = self.direction.flipped();
        } else {
            self.field = field;
            self.direction = SortDirection::Ascending;
        }
    }

    fn compare(&self, a: &Record, b: &Record) -> Ordering {
        let ordering = self.field.compare(a, b);
        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Root locale collation at tertiary strength: base letters first, then
/// accents, then case with lower case ahead of upper case.
pub fn compare_text(a: &str, b: &str) -> Ordering {
    COLLATOR.with(|collator| match collator {
        Some(collator) => collator.compare(a, b),
        None => a
            .chars()
            .flat_map(char::to_lowercase)
            .cmp(b.chars().flat_map(char::to_lowercase))
            .then_with(|| b.cmp(a)),
    })
}

/// Returns a sorted copy of `rows`. The sort is stable, equal keys keep their
/// input order in both directions.
pub fn sort<'a>(rows: &[&'a Record], spec: SortSpec) -> Vec<&'a Record> {
    let mut ordered = rows.to_vec();
    ordered.sort_by(|a, b| spec.compare(a, b));
    ordered
}
