//! Editable column values keyed by a stable row id.
//!
//! The ordered list of rows lives in [`ListEditor`](super::editor::ListEditor); this store only knows ids.
//! Keeping values out of the list means an insertion or removal elsewhere never shifts which values
//! belong to which row.

use std::collections::HashMap;
use std::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
/// Identity of one column row within a form session. Never reused within the session.
pub struct RowId(u64);

impl RowId {
    pub fn new(raw: u64) -> Self {
        RowId(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "col_{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Current values of one row. Setters overwrite without validation.
pub struct FieldHandle {
    name: String,
    column_type: String,
}

impl FieldHandle {
    fn new(name: &str, column_type: &str) -> Self {
        FieldHandle { name: name.to_string(), column_type: column_type.to_string() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_type(&self) -> &str {
        &self.column_type
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_type(&mut self, column_type: impl Into<String>) {
        self.column_type = column_type.into();
    }
}

#[derive(Debug, Default)]
pub struct FieldRegistry {
    fields: HashMap<RowId, FieldHandle>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the handle for `id`, creating it from the initial values only if it does not exist yet.
    /// An existing handle keeps its current values.
    pub fn ensure(&mut self, id: RowId, initial_name: &str, initial_type: &str) -> &mut FieldHandle {
        self.fields
            .entry(id)
            .or_insert_with(|| FieldHandle::new(initial_name, initial_type))
    }

    pub fn get(&self, id: RowId) -> Option<&FieldHandle> {
        self.fields.get(&id)
    }

    pub fn get_mut(&mut self, id: RowId) -> Option<&mut FieldHandle> {
        self.fields.get_mut(&id)
    }

    pub fn remove(&mut self, id: RowId) -> Option<FieldHandle> {
        self.fields.remove(&id)
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }

    pub fn contains(&self, id: RowId) -> bool {
        self.fields.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Ids of every live handle, in no particular order.
    pub fn ids(&self) -> impl Iterator<Item = RowId> + '_ {
        self.fields.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_does_not_reseed_existing_handles() {
        let mut registry = FieldRegistry::new();
        let id = RowId::new(0);
        registry.ensure(id, "", "TEXT").set_name("email");
        registry.ensure(id, "", "TEXT").set_type("VARCHAR");

        let handle = registry.ensure(id, "ignored", "INTEGER");
        assert_eq!(handle.name(), "email");
        assert_eq!(handle.column_type(), "VARCHAR");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn remove_then_ensure_starts_fresh() {
        let mut registry = FieldRegistry::new();
        let id = RowId::new(3);
        registry.ensure(id, "", "TEXT").set_name("stale");
        assert!(registry.remove(id).is_some());
        assert!(registry.remove(id).is_none());

        assert_eq!(registry.ensure(id, "fresh", "DATE").name(), "fresh");
    }

    #[test]
    fn handles_are_independent() {
        let mut registry = FieldRegistry::new();
        let (a, b) = (RowId::new(1), RowId::new(2));
        registry.ensure(a, "", "TEXT");
        registry.ensure(b, "", "TEXT");
        registry.get_mut(a).unwrap().set_name("first");

        assert_eq!(registry.get(b).unwrap().name(), "");
        registry.clear();
        assert!(registry.is_empty());
        assert!(!registry.contains(a));
    }

    #[test]
    fn display_matches_row_key_format() {
        assert_eq!(RowId::new(7).to_string(), "col_7");
    }
}
