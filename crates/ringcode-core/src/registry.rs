//! Number/code assignment registry
//!
//! The engine only ever reads assignments. Ownership of the records (editing,
//! persistence) belongs to the host; [`MemoryRegistry`] is an ordered
//! in-process implementation that hosts can fill from a JSON file.

use std::path::Path;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A number/code assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    /// Row identifier, unique within a registry
    #[serde(default)]
    pub id: u64,
    /// Phone number as entered by the user
    pub number: String,
    /// Characters to play in Morse code
    pub code: String,
    /// Inactive assignments are never matched
    #[serde(default = "default_active")]
    pub active: bool,
    /// Contact name associated with the number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

fn default_active() -> bool {
    true
}

impl AssignmentRecord {
    /// Create an active record without a name
    pub fn new(number: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            id: 0,
            number: number.into(),
            code: code.into(),
            active: true,
            name: None,
        }
    }

    /// Set the contact name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the active flag
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }
}

/// Read access to the assignment registry
#[async_trait]
pub trait AssignmentRegistry: Send + Sync {
    /// All active assignments, in registry order
    async fn active_assignments(&self) -> Result<Vec<AssignmentRecord>>;
}

/// Ordered in-memory registry
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    records: RwLock<Vec<AssignmentRecord>>,
}

impl MemoryRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry from records, assigning ids in order
    pub fn from_records(records: impl IntoIterator<Item = AssignmentRecord>) -> Self {
        let registry = Self::new();
        for record in records {
            registry.insert(record);
        }
        registry
    }

    /// Load records from a JSON array
    pub fn from_json_str(json: &str) -> Result<Self> {
        let records: Vec<AssignmentRecord> = serde_json::from_str(json)?;
        Ok(Self::from_records(records))
    }

    /// Load records from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Write all records (active or not) as a JSON array
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(&*self.records.read())?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Append a record, returning its id.
    ///
    /// A record without an id, or whose id is already taken, gets a fresh one.
    pub fn insert(&self, mut record: AssignmentRecord) -> u64 {
        let mut records = self.records.write();
        if record.id == 0 || records.iter().any(|r| r.id == record.id) {
            record.id = next_free_id(&records);
        }
        let id = record.id;
        records.push(record);
        id
    }

    /// Replace the record with the same id
    pub fn update(&self, record: AssignmentRecord) -> Result<()> {
        let mut records = self.records.write();
        let slot = records
            .iter_mut()
            .find(|r| r.id == record.id)
            .ok_or(Error::AssignmentNotFound { id: record.id })?;
        *slot = record;
        Ok(())
    }

    /// Enable or disable an assignment
    pub fn set_active(&self, id: u64, active: bool) -> Result<()> {
        let mut records = self.records.write();
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(Error::AssignmentNotFound { id })?;
        record.active = active;
        Ok(())
    }

    /// Remove an assignment
    pub fn remove(&self, id: u64) -> Result<AssignmentRecord> {
        let mut records = self.records.write();
        let index = records
            .iter()
            .position(|r| r.id == id)
            .ok_or(Error::AssignmentNotFound { id })?;
        Ok(records.remove(index))
    }

    /// Every record, active or not
    pub fn all(&self) -> Vec<AssignmentRecord> {
        self.records.read().clone()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

/// One past the highest id in use, or the lowest unused id once the highest
/// id is `u64::MAX`
fn next_free_id(records: &[AssignmentRecord]) -> u64 {
    let highest = records.iter().map(|r| r.id).max().unwrap_or(0);
    if let Some(id) = highest.checked_add(1) {
        return id;
    }

    let mut ids: Vec<u64> = records.iter().map(|r| r.id).collect();
    ids.sort_unstable();
    let mut candidate = 1;
    for id in ids {
        if id == candidate {
            candidate += 1;
        } else if id > candidate {
            break;
        }
    }
    candidate
}

#[async_trait]
impl AssignmentRegistry for MemoryRegistry {
    async fn active_assignments(&self) -> Result<Vec<AssignmentRecord>> {
        Ok(self
            .records
            .read()
            .iter()
            .filter(|r| r.active)
            .cloned()
            .collect())
    }
}
