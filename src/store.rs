use std::collections::HashSet;

use tracing::{debug, trace, warn};

use crate::record::{NewRecord, Record, RecordId, RecordPatch, Role, Status, is_valid_revenue};

/// Owner of the ordered record collection. Identifiers are unique at all times.
#[derive(Debug, Default, Clone)]
pub struct RecordStore {
    records: Vec<Record>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from records, dropping any record whose id is already taken.
    pub fn with_records(records: impl IntoIterator<Item = Record>) -> Self {
        let mut store = Self::new();
        for record in records {
            store.insert_record(record);
        }
        store
    }

    /// Store seeded with the demonstration data set.
    pub fn demo() -> Self {
        Self::with_records(demo_records())
    }

    /// Appends a new record under the next free identifier. Returns `None`
    /// when the revenue is negative or not finite, or when the id space is used up.
    pub fn insert(&mut self, record: NewRecord) -> Option<RecordId> {
        if !is_valid_revenue(record.revenue) {
            warn!("Rejecting record \"{}\" with revenue {}", record.name, record.revenue);
            return None;
        }
        let Some(next) = self.records.iter().map(|r| r.id.0).max().unwrap_or(0).checked_add(1) else {
            warn!("No identifier left for record \"{}\"", record.name);
            return None;
        };
        let id = RecordId(next);
        self.records.push(record.with_id(id));
        debug!("Inserted record {id}");
        Some(id)
    }

    /// Appends a record with its own identifier. Returns false on an id collision.
    pub fn insert_record(&mut self, record: Record) -> bool {
        if self.get(record.id).is_some() {
            trace!("Rejecting duplicate record id {}", record.id);
            return false;
        }
        self.records.push(record);
        true
    }

    pub fn update(&mut self, id: RecordId, patch: &RecordPatch) -> bool {
        match self.get_mut(id) {
            Some(record) => {
                patch.apply(record);
                debug!("Updated record {id}");
                true
            }
            None => false,
        }
    }

    pub fn delete(&mut self, id: RecordId) -> Option<Record> {
        let pos = self.records.iter().position(|r| r.id == id)?;
        debug!("Deleted record {id}");
        Some(self.records.remove(pos))
    }

    /// Removes every record whose id is in `ids`, returning how many went away.
    pub fn delete_ids(&mut self, ids: &HashSet<RecordId>) -> usize {
        let before = self.records.len();
        self.records.retain(|r| !ids.contains(&r.id));
        before - self.records.len()
    }

    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn get_mut(&mut self, id: RecordId) -> Option<&mut Record> {
        self.records.iter_mut().find(|r| r.id == id)
    }

    /// Records in store order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn records_mut(&mut self) -> impl Iterator<Item = &mut Record> {
        self.records.iter_mut()
    }

    pub fn ids(&self) -> impl Iterator<Item = RecordId> + '_ {
        self.records.iter().map(|r| r.id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn demo_records() -> Vec<Record> {
    use Role::*;
    use Status::*;

    let rows = [
        (1, "John Doe", "john@example.com", Admin, Active, "2024-01-15", 12500.0),
        (2, "Jane Smith", "jane@example.com", User, Active, "2024-01-14", 8900.0),
        (3, "Bob Johnson", "bob@example.com", Manager, Inactive, "2024-01-10", 15600.0),
        (4, "Alice Brown", "alice@example.com", User, Active, "2024-01-16", 7200.0),
        (5, "Charlie Wilson", "charlie@example.com", Admin, Active, "2024-01-15", 18900.0),
        (6, "Diana Davis", "diana@example.com", User, Inactive, "2024-01-12", 5400.0),
        (7, "Ethan Moore", "ethan@example.com", Manager, Active, "2024-01-18", 21300.0),
        (8, "Fiona Clark", "fiona@example.com", User, Active, "2024-01-11", 3100.0),
        (9, "George Lewis", "george@example.com", Admin, Inactive, "2024-01-09", 9800.0),
        (10, "Hannah Walker", "hannah@example.com", User, Active, "2024-01-17", 6700.0),
        (11, "Ian Hall", "ian@example.com", Manager, Active, "2024-01-13", 14200.0),
        (12, "Julia Allen", "julia@example.com", User, Inactive, "2024-01-08", 2500.0),
        (13, "Kevin Young", "kevin@example.com", User, Active, "2024-01-19", 11100.0),
        (14, "Laura King", "laura@example.com", Admin, Active, "2024-01-20", 24700.0),
        (15, "Michael Wright", "michael@example.com", Manager, Inactive, "2024-01-07", 16800.0),
        (16, "Nina Scott", "nina@example.com", User, Active, "2024-01-14", 4300.0),
        (17, "Oscar Green", "oscar@example.com", User, Active, "2024-01-16", 8200.0),
        (18, "Paula Adams", "paula@example.com", Manager, Active, "2024-01-12", 19500.0),
        (19, "Quentin Baker", "quentin@example.com", User, Inactive, "2024-01-05", 1900.0),
        (20, "Rachel Nelson", "rachel@example.com", Admin, Active, "2024-01-21", 13400.0),
    ];

    rows.into_iter()
        .map(|(id, name, email, role, status, last_login, revenue)| Record {
            id: RecordId(id),
            name: name.to_string(),
            email: email.to_string(),
            role,
            status,
            last_login: last_login.to_string(),
            revenue,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_record(name: &str) -> NewRecord {
        NewRecord {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            role: Role::User,
            status: Status::Active,
            last_login: "2024-02-01".to_string(),
            revenue: 100.0,
        }
    }

    #[test]
    fn demo_seed_has_twenty_unique_records() {
        let store = RecordStore::demo();
        assert_eq!(store.len(), 20);
        let ids: HashSet<RecordId> = store.ids().collect();
        assert_eq!(ids.len(), 20);
    }

    #[test]
    fn insert_assigns_next_free_id() {
        let mut store = RecordStore::demo();
        store.delete(RecordId(3));
        let id = store.insert(new_record("Zed"));
        assert_eq!(id, Some(RecordId(21)));
        assert_eq!(store.records().last().map(|r| r.id), id);
    }

    #[test]
    fn insert_rejects_invalid_revenue() {
        let mut store = RecordStore::demo();
        for revenue in [-500.0, f64::NAN, f64::INFINITY] {
            let record = NewRecord { revenue, ..new_record("Broke") };
            assert_eq!(store.insert(record), None);
        }
        assert_eq!(store.len(), 20);
        assert!(store.records().iter().all(|r| r.revenue >= 0.0));
    }

    #[test]
    fn insert_rejects_when_ids_run_out() {
        let mut store = RecordStore::new();
        let mut last = RecordStore::demo().records()[0].clone();
        last.id = RecordId(u32::MAX);
        assert!(store.insert_record(last));
        assert_eq!(store.insert(new_record("Zed")), None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn insert_record_rejects_duplicate_id() {
        let mut store = RecordStore::demo();
        let mut duplicate = store.records()[0].clone();
        duplicate.name = "Other".to_string();
        assert!(!store.insert_record(duplicate));
        assert_eq!(store.len(), 20);
    }

    #[test]
    fn update_and_delete_unknown_ids_are_noops() {
        let mut store = RecordStore::demo();
        assert!(!store.update(RecordId(99), &RecordPatch::default().name("x")));
        assert!(store.delete(RecordId(99)).is_none());
        assert_eq!(store.len(), 20);
    }

    #[test]
    fn delete_ids_keeps_order_of_survivors() {
        let mut store = RecordStore::demo();
        let ids: HashSet<RecordId> = [RecordId(1), RecordId(2)].into_iter().collect();
        assert_eq!(store.delete_ids(&ids), 2);
        let first: Vec<u32> = store.ids().take(3).map(|id| id.0).collect();
        assert_eq!(first, vec![3, 4, 5]);
    }
}
