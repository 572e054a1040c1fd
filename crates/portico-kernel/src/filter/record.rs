use super::error::FilterError;
use super::kind::FilterType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

/// Build the revision-independent key of a filter:
/// `application_name:name:filter_type`.
pub fn build_id(application_name: &str, filter_type: FilterType, name: &str) -> String {
    format!("{application_name}:{name}:{filter_type}")
}

// ─────────────────────────────────────────────────────────────────────────────
// Stable identity
// ─────────────────────────────────────────────────────────────────────────────

/// Identity of one revision of a filter.
///
/// Unlike [`FilterRecord`] itself, this key never changes after construction,
/// so it is the value hash maps and ordered maps should be keyed on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FilterRevisionKey {
    /// Revision-independent filter id (see [`build_id`]).
    pub id: String,
    /// Revision number within `id`.
    pub revision: i32,
}

impl FilterRevisionKey {
    pub fn new(id: impl Into<String>, revision: i32) -> Self {
        Self {
            id: id.into(),
            revision,
        }
    }
}

impl fmt::Display for FilterRevisionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.id, self.revision)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Persisted field set
// ─────────────────────────────────────────────────────────────────────────────

/// Flat field set a filter store reads and writes.
///
/// The derived id is not part of the row; it is recomputed when the row is
/// turned back into a [`FilterRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRow {
    /// Tenant / namespace owning the filter.
    pub application_name: String,
    /// Filter name, usually the name of the filter implementation.
    pub name: String,
    /// Pipeline stage.
    pub filter_type: FilterType,
    /// Filter source code.
    pub source_code: String,
    /// Name of the boolean property that force-disables this filter.
    #[serde(default)]
    pub disable_property_name: String,
    /// Ordering hint, interpreted numerically by the pipeline assembler.
    #[serde(default)]
    pub order: String,
    /// Revision number; `0` for records that were never persisted.
    #[serde(default)]
    pub revision: i32,
    /// When this revision was created.
    #[serde(default)]
    pub creation_date: Option<DateTime<Utc>>,
    /// Whether this revision runs on the whole fleet.
    #[serde(default)]
    pub active: bool,
    /// Whether this revision runs on the canary subset.
    #[serde(default)]
    pub canary: bool,
}

impl FilterRow {
    /// Create a row for revision `0` with empty optional fields and both flags off.
    pub fn new(
        application_name: impl Into<String>,
        filter_type: FilterType,
        name: impl Into<String>,
        source_code: impl Into<String>,
    ) -> Self {
        Self {
            application_name: application_name.into(),
            name: name.into(),
            filter_type,
            source_code: source_code.into(),
            disable_property_name: String::new(),
            order: String::new(),
            revision: 0,
            creation_date: None,
            active: false,
            canary: false,
        }
    }

    /// Builder: set the revision number.
    pub fn with_revision(mut self, revision: i32) -> Self {
        self.revision = revision;
        self
    }

    /// Builder: set the creation date.
    pub fn with_creation_date(mut self, creation_date: DateTime<Utc>) -> Self {
        self.creation_date = Some(creation_date);
        self
    }

    /// Builder: set the ordering hint.
    pub fn with_order(mut self, order: impl Into<String>) -> Self {
        self.order = order.into();
        self
    }

    /// Builder: set the disable property name.
    pub fn with_disable_property(mut self, property_name: impl Into<String>) -> Self {
        self.disable_property_name = property_name.into();
        self
    }

    /// Builder: set both runtime flags.
    pub fn with_flags(mut self, active: bool, canary: bool) -> Self {
        self.active = active;
        self.canary = canary;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// FilterRecord
// ─────────────────────────────────────────────────────────────────────────────

/// One revision of a gateway filter.
///
/// Every field except the `active` and `canary` flags is fixed at
/// construction. The flags are atomics so a flag monitor can flip them from
/// any thread while the pipeline assembler reads them, without locking.
///
/// No validation is performed: empty names, non-numeric orders or missing
/// creation dates are all accepted.
///
/// # Equality
///
/// `==` and [`Hash`] compare a *snapshot*: the id, name, source code, type,
/// revision, creation date and the **current** flag values. Flipping a flag on
/// a record already stored as a hash-set element or map key silently changes
/// its hash. Use [`revision_key`](Self::revision_key) for container keys.
///
/// # Ordering
///
/// See [`try_cmp`](Self::try_cmp).
#[derive(Debug, Serialize, Deserialize)]
#[serde(from = "FilterRow", into = "FilterRow")]
pub struct FilterRecord {
    id: String,
    name: String,
    filter_type: FilterType,
    source_code: String,
    disable_property_name: String,
    order: String,
    application_name: String,
    revision: i32,
    creation_date: Option<DateTime<Utc>>,
    active: AtomicBool,
    canary: AtomicBool,
}

impl FilterRecord {
    /// Create a "new" record: revision `0`, no creation date, both flags off.
    ///
    /// This is the shape a freshly compiled filter has before the store
    /// assigns it a revision.
    pub fn new(
        application_name: impl Into<String>,
        filter_type: FilterType,
        name: impl Into<String>,
        source_code: impl Into<String>,
    ) -> Self {
        Self::from_row(FilterRow::new(
            application_name,
            filter_type,
            name,
            source_code,
        ))
    }

    /// Reconstruct a record from its persisted field set.
    pub fn from_row(row: FilterRow) -> Self {
        Self {
            id: build_id(&row.application_name, row.filter_type, &row.name),
            name: row.name,
            filter_type: row.filter_type,
            source_code: row.source_code,
            disable_property_name: row.disable_property_name,
            order: row.order,
            application_name: row.application_name,
            revision: row.revision,
            creation_date: row.creation_date,
            active: AtomicBool::new(row.active),
            canary: AtomicBool::new(row.canary),
        }
    }

    /// Builder: set the ordering hint.
    pub fn with_order(mut self, order: impl Into<String>) -> Self {
        self.order = order.into();
        self
    }

    /// Builder: set the disable property name.
    pub fn with_disable_property(mut self, property_name: impl Into<String>) -> Self {
        self.disable_property_name = property_name.into();
        self
    }

    /// Snapshot this record (current flag values included) into a row.
    pub fn to_row(&self) -> FilterRow {
        FilterRow {
            application_name: self.application_name.clone(),
            name: self.name.clone(),
            filter_type: self.filter_type,
            source_code: self.source_code.clone(),
            disable_property_name: self.disable_property_name.clone(),
            order: self.order.clone(),
            revision: self.revision,
            creation_date: self.creation_date,
            active: self.is_active(),
            canary: self.is_canary(),
        }
    }

    /// Revision-independent key, `application_name:name:filter_type`.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Stable identity of this revision; unaffected by flag flips.
    pub fn revision_key(&self) -> FilterRevisionKey {
        FilterRevisionKey::new(self.id.clone(), self.revision)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    pub fn source_code(&self) -> &str {
        &self.source_code
    }

    /// Name of the external boolean property that force-disables this filter.
    pub fn disable_property_name(&self) -> &str {
        &self.disable_property_name
    }

    /// Raw ordering hint.
    pub fn order(&self) -> &str {
        &self.order
    }

    /// Ordering hint parsed as an integer, or `None` when it is not numeric.
    pub fn parsed_order(&self) -> Option<i32> {
        self.order.trim().parse().ok()
    }

    /// Tenant / namespace of the filter, for gateways serving several
    /// applications from one datastore.
    pub fn application_name(&self) -> &str {
        &self.application_name
    }

    pub fn revision(&self) -> i32 {
        self.revision
    }

    pub fn creation_date(&self) -> Option<DateTime<Utc>> {
        self.creation_date
    }

    /// Whether this revision runs on the whole fleet.
    pub fn is_active(&self) -> bool {
        self.active.load(AtomicOrdering::Acquire)
    }

    /// Whether this revision runs on the canary subset, a separate cluster
    /// where filters are tried before reaching production.
    pub fn is_canary(&self) -> bool {
        self.canary.load(AtomicOrdering::Acquire)
    }

    pub fn set_active(&self, active: bool) {
        self.active.store(active, AtomicOrdering::Release);
    }

    pub fn set_canary(&self, canary: bool) {
        self.canary.store(canary, AtomicOrdering::Release);
    }

    /// Set the active flag and return its previous value.
    pub fn swap_active(&self, active: bool) -> bool {
        self.active.swap(active, AtomicOrdering::AcqRel)
    }

    /// Set the canary flag and return its previous value.
    pub fn swap_canary(&self, canary: bool) -> bool {
        self.canary.swap(canary, AtomicOrdering::AcqRel)
    }

    /// Compare two records.
    ///
    /// - Same `name`: newest `creation_date` first.
    /// - Different `name`: **descending** name order, so `"beta"` sorts
    ///   before `"alpha"`.
    ///
    /// # Errors
    ///
    /// [`FilterError::MissingCreationDate`] when both records share a name
    /// and either one has no creation date. Callers must make sure revisions
    /// are dated before ordering them.
    pub fn try_cmp(&self, other: &FilterRecord) -> Result<Ordering, FilterError> {
        if self.name != other.name {
            return Ok(other.name.cmp(&self.name));
        }
        match (self.creation_date, other.creation_date) {
            (Some(mine), Some(theirs)) => Ok(theirs.cmp(&mine)),
            _ => Err(FilterError::MissingCreationDate {
                name: self.name.clone(),
            }),
        }
    }
}

/// Sort records with [`FilterRecord::try_cmp`].
///
/// The slice is checked before sorting; if any name appears more than once
/// with an undated revision, the slice is left untouched and the error is
/// returned.
pub fn sort_records<T: Borrow<FilterRecord>>(records: &mut [T]) -> Result<(), FilterError> {
    {
        let mut names: HashMap<&str, (usize, bool)> = HashMap::new();
        for record in records.iter() {
            let record = record.borrow();
            let entry = names.entry(record.name()).or_insert((0, false));
            entry.0 += 1;
            entry.1 |= record.creation_date.is_none();
        }
        if let Some((name, _)) = names
            .into_iter()
            .find(|(_, (count, undated))| *count > 1 && *undated)
        {
            return Err(FilterError::MissingCreationDate {
                name: name.to_string(),
            });
        }
    }

    records.sort_by(|a, b| {
        a.borrow()
            .try_cmp(b.borrow())
            .unwrap_or(Ordering::Equal)
    });
    Ok(())
}

impl Clone for FilterRecord {
    /// Copies every field, taking the flags' current values.
    fn clone(&self) -> Self {
        Self::from_row(self.to_row())
    }
}

impl From<FilterRow> for FilterRecord {
    fn from(row: FilterRow) -> Self {
        Self::from_row(row)
    }
}

impl From<FilterRecord> for FilterRow {
    fn from(record: FilterRecord) -> Self {
        record.to_row()
    }
}

impl PartialEq for FilterRecord {
    fn eq(&self, other: &Self) -> bool {
        self.revision == other.revision
            && self.creation_date == other.creation_date
            && self.source_code == other.source_code
            && self.id == other.id
            && self.name == other.name
            && self.filter_type == other.filter_type
            && self.is_active() == other.is_active()
            && self.is_canary() == other.is_canary()
    }
}

impl Eq for FilterRecord {}

impl Hash for FilterRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.name.hash(state);
        self.source_code.hash(state);
        self.filter_type.hash(state);
        self.revision.hash(state);
        self.creation_date.hash(state);
        self.is_active().hash(state);
        self.is_canary().hash(state);
    }
}

impl fmt::Display for FilterRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FilterRecord{{id='{}', name='{}', type={}, revision={}, creation_date=",
            self.id, self.name, self.filter_type, self.revision
        )?;
        match self.creation_date {
            Some(date) => write!(f, "{}", date.to_rfc3339())?,
            None => f.write_str("none")?,
        }
        write!(
            f,
            ", active={}, canary={}, application='{}'}}",
            self.is_active(),
            self.is_canary(),
            self.application_name
        )
    }
}
