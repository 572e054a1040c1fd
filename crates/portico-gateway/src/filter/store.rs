//! In-memory filter revision store.

use crate::error::{GatewayError, GatewayResult};
use chrono::Utc;
use parking_lot::RwLock;
use portico_kernel::filter::{FilterRecord, FilterRevisionKey, FilterRow, build_id, sort_records};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::sync::Arc;
use tracing::{debug, info};

/// Filter revisions keyed by `(id, revision)`.
///
/// Records are shared as `Arc`s; flag changes made through the store are
/// visible to every holder. The index lock is held for one operation only.
/// Suitable for single-node deployments and tests.
#[derive(Debug, Default)]
pub struct InMemoryFilterStore {
    records: RwLock<BTreeMap<FilterRevisionKey, Arc<FilterRecord>>>,
}

fn revisions_of(id: &str) -> RangeInclusive<FilterRevisionKey> {
    FilterRevisionKey::new(id, i32::MIN)..=FilterRevisionKey::new(id, i32::MAX)
}

impl InMemoryFilterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a record under its own revision.
    ///
    /// Fails with [`GatewayError::DuplicateRevision`] if that revision of the
    /// filter is already stored.
    pub fn save(&self, record: FilterRecord) -> GatewayResult<Arc<FilterRecord>> {
        let key = record.revision_key();
        let mut records = self.records.write();
        if records.contains_key(&key) {
            return Err(GatewayError::DuplicateRevision(key));
        }
        let record = Arc::new(record);
        records.insert(key.clone(), Arc::clone(&record));
        info!(filter = %key, "filter revision saved");
        Ok(record)
    }

    /// Store `row` as the next revision of its filter, dated now unless the
    /// row already carries a creation date.
    pub fn add_revision(&self, row: FilterRow) -> GatewayResult<Arc<FilterRecord>> {
        let mut records = self.records.write();
        let id = build_id(&row.application_name, row.filter_type, &row.name);
        let revision = next_revision_in(&records, &id)?;

        let creation_date = row.creation_date.unwrap_or_else(Utc::now);
        let record = Arc::new(FilterRecord::from_row(
            row.with_revision(revision).with_creation_date(creation_date),
        ));
        let key = record.revision_key();
        records.insert(key.clone(), Arc::clone(&record));
        info!(filter = %key, "filter revision added");
        Ok(record)
    }

    pub fn get(&self, id: &str, revision: i32) -> Option<Arc<FilterRecord>> {
        self.records
            .read()
            .get(&FilterRevisionKey::new(id, revision))
            .cloned()
    }

    /// Every stored revision of a filter, newest revision first.
    pub fn revisions(&self, id: &str) -> Vec<Arc<FilterRecord>> {
        self.records
            .read()
            .range(revisions_of(id))
            .rev()
            .map(|(_, record)| Arc::clone(record))
            .collect()
    }

    /// Highest stored revision of a filter.
    pub fn latest(&self, id: &str) -> Option<Arc<FilterRecord>> {
        self.records
            .read()
            .range(revisions_of(id))
            .next_back()
            .map(|(_, record)| Arc::clone(record))
    }

    /// Revision number [`add_revision`](Self::add_revision) would assign next.
    pub fn next_revision(&self, id: &str) -> GatewayResult<i32> {
        next_revision_in(&self.records.read(), id)
    }

    /// The active revision of a filter, if any.
    pub fn active(&self, id: &str) -> Option<Arc<FilterRecord>> {
        self.find(id, FilterRecord::is_active)
    }

    /// The canary revision of a filter, if any.
    pub fn canary(&self, id: &str) -> Option<Arc<FilterRecord>> {
        self.find(id, FilterRecord::is_canary)
    }

    /// Make one revision the active one.
    ///
    /// Every other revision of the filter is deactivated. The activated
    /// revision leaves canary.
    pub fn activate(&self, id: &str, revision: i32) -> GatewayResult<Arc<FilterRecord>> {
        let records = self.records.write();
        let target = lookup(&records, id, revision)?;
        for (key, record) in records.range(revisions_of(id)) {
            if key.revision != revision && record.swap_active(false) {
                debug!(filter = %key, "filter revision deactivated");
            }
        }
        target.set_canary(false);
        target.set_active(true);
        info!(filter = %target.revision_key(), "filter revision activated");
        Ok(target)
    }

    /// Put one revision on canary. Any other canary revision of the filter
    /// leaves canary; active flags are untouched.
    pub fn set_canary(&self, id: &str, revision: i32) -> GatewayResult<Arc<FilterRecord>> {
        let records = self.records.write();
        let target = lookup(&records, id, revision)?;
        for (key, record) in records.range(revisions_of(id)) {
            if key.revision != revision {
                record.set_canary(false);
            }
        }
        target.set_canary(true);
        info!(filter = %target.revision_key(), "filter revision on canary");
        Ok(target)
    }

    /// Clear both flags on every revision of a filter.
    pub fn deactivate(&self, id: &str) -> GatewayResult<()> {
        let records = self.records.write();
        let mut found = false;
        for (_, record) in records.range(revisions_of(id)) {
            found = true;
            record.set_active(false);
            record.set_canary(false);
        }
        if !found {
            return Err(GatewayError::FilterNotFound(id.to_string()));
        }
        info!(filter = id, "filter deactivated");
        Ok(())
    }

    /// Drop every revision of a filter, returning them newest first.
    pub fn remove(&self, id: &str) -> GatewayResult<Vec<Arc<FilterRecord>>> {
        let mut records = self.records.write();
        let keys: Vec<FilterRevisionKey> = records
            .range(revisions_of(id))
            .map(|(key, _)| key.clone())
            .collect();
        if keys.is_empty() {
            return Err(GatewayError::FilterNotFound(id.to_string()));
        }
        let removed = keys
            .iter()
            .rev()
            .filter_map(|key| records.remove(key))
            .collect();
        info!(filter = id, revisions = keys.len(), "filter removed");
        Ok(removed)
    }

    /// Distinct filter ids, ascending.
    pub fn ids(&self) -> Vec<String> {
        let records = self.records.read();
        let mut ids: Vec<String> = Vec::new();
        for key in records.keys() {
            if ids.last() != Some(&key.id) {
                ids.push(key.id.clone());
            }
        }
        ids
    }

    /// The active revision of every filter, in filter ordering.
    ///
    /// Fails if two active records share a name and one of them is undated.
    pub fn active_filters(&self) -> GatewayResult<Vec<Arc<FilterRecord>>> {
        let mut active: Vec<Arc<FilterRecord>> = self
            .records
            .read()
            .values()
            .filter(|record| record.is_active())
            .cloned()
            .collect();
        sort_records(&mut active)?;
        Ok(active)
    }

    /// What canary hosts run: per filter, the canary revision if there is
    /// one, else the active revision. In filter ordering.
    pub fn canary_filters(&self) -> GatewayResult<Vec<Arc<FilterRecord>>> {
        let records = self.records.read();
        let mut chosen: BTreeMap<&str, Arc<FilterRecord>> = BTreeMap::new();
        for (key, record) in records.iter() {
            if record.is_canary() {
                chosen.insert(&key.id, Arc::clone(record));
            } else if record.is_active() && !chosen.contains_key(key.id.as_str()) {
                chosen.insert(&key.id, Arc::clone(record));
            }
        }
        let mut selected: Vec<Arc<FilterRecord>> = chosen.into_values().collect();
        drop(records);
        sort_records(&mut selected)?;
        Ok(selected)
    }

    /// Number of stored revisions.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    fn find(&self, id: &str, flag: fn(&FilterRecord) -> bool) -> Option<Arc<FilterRecord>> {
        self.records
            .read()
            .range(revisions_of(id))
            .rev()
            .find(|(_, record)| flag(record))
            .map(|(_, record)| Arc::clone(record))
    }
}

fn lookup(
    records: &BTreeMap<FilterRevisionKey, Arc<FilterRecord>>,
    id: &str,
    revision: i32,
) -> GatewayResult<Arc<FilterRecord>> {
    let key = FilterRevisionKey::new(id, revision);
    records
        .get(&key)
        .cloned()
        .ok_or(GatewayError::RevisionNotFound(key))
}

fn next_revision_in(
    records: &BTreeMap<FilterRevisionKey, Arc<FilterRecord>>,
    id: &str,
) -> GatewayResult<i32> {
    match records.range(revisions_of(id)).next_back() {
        None => Ok(1),
        Some((key, _)) => key.revision.checked_add(1).ok_or_else(|| {
            GatewayError::InvalidArgument(format!("revision counter exhausted for {id}"))
        }),
    }
}
