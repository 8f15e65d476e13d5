use std::collections::BTreeSet;

use derive_setters::Setters;
use rayon::prelude::*;

use crate::record::{Record, Role, Status};

/// Non-text constraints applied alongside the free-text search.
/// Empty sets and unset bounds do not restrict anything.
#[derive(Debug, Clone, Default, PartialEq, Setters)]
#[setters(prefix = "with_")]
pub struct FilterCriteria {
    pub roles: BTreeSet<Role>,
    pub statuses: BTreeSet<Status>,
    #[setters(strip_option)]
    pub min_revenue: Option<f64>,
    #[setters(strip_option)]
    pub max_revenue: Option<f64>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }

    /// Number of active constraint groups, shown as the filter badge.
    /// Both revenue bounds together count as one group.
    pub fn active_count(&self) -> usize {
        usize::from(!self.roles.is_empty())
            + usize::from(!self.statuses.is_empty())
            + usize::from(self.min_revenue.is_some() || self.max_revenue.is_some())
    }

    pub fn matches(&self, record: &Record) -> bool {
        (self.roles.is_empty() || self.roles.contains(&record.role))
            && (self.statuses.is_empty() || self.statuses.contains(&record.status))
            && self.min_revenue.is_none_or(|min| record.revenue >= min)
            && self.max_revenue.is_none_or(|max| record.revenue <= max)
    }
}

/// Raw state of the filter form. Revenue bounds are kept as typed text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterForm {
    pub roles: BTreeSet<Role>,
    pub statuses: BTreeSet<Status>,
    pub min_revenue: String,
    pub max_revenue: String,
}

impl FilterForm {
    pub fn to_criteria(&self) -> FilterCriteria {
        FilterCriteria {
            roles: self.roles.clone(),
            statuses: self.statuses.clone(),
            min_revenue: parse_revenue_bound(&self.min_revenue),
            max_revenue: parse_revenue_bound(&self.max_revenue),
        }
    }
}

/// Malformed or non-finite input counts as an unset bound.
pub fn parse_revenue_bound(input: &str) -> Option<f64> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Returns the records passing both the search term and the criteria, in
/// their original relative order.
pub fn filter<'a>(records: &'a [Record], term: &str, criteria: &FilterCriteria) -> Vec<&'a Record> {
    let needle = term.to_lowercase();
    records
        .par_iter()
        .filter(|record| needle.is_empty() || record.search_text().contains(&needle))
        .filter(|record| criteria.matches(record))
        .collect()
}
