use serde::Serialize;
use crate::form::registry::{FieldHandle, FieldRegistry, RowId};

/// Type given to new rows and to rows whose type is blank at submission.
pub const DEFAULT_COLUMN_TYPE: &str = "TEXT";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// One row of the form with its current values.
pub struct ColumnDraft {
    pub id: RowId,
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
}

/// The ordered rows of the column list, kept in step with their [`FieldRegistry`] entries.
///
/// Every id in `rows` has exactly one registry entry and the registry holds nothing else.
#[derive(Debug, Default)]
pub struct ListEditor {
    rows: Vec<RowId>,
    fields: FieldRegistry,
    next_id: u64,
}

impl ListEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an empty row of the default type.
    pub fn add_row(&mut self) -> RowId {
        let id = RowId::new(self.next_id);
        self.next_id += 1;
        self.fields.ensure(id, "", DEFAULT_COLUMN_TYPE);
        self.rows.push(id);
        tracing::trace!(row = %id, rows = self.rows.len(), "added column row");
        return id;
    }

    /// Removes a row and its values. Unknown ids are ignored; returns whether a row was removed.
    pub fn remove_row(&mut self, id: RowId) -> bool {
        let position = match self.rows.iter().position(|row| *row == id) {
            Some(p) => p,
            None => { return false; }
        };
        self.rows.remove(position);
        self.fields.remove(id);
        tracing::trace!(row = %id, rows = self.rows.len(), "removed column row");
        return true;
    }

    /// Row ids in column order.
    pub fn rows(&self) -> &[RowId] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains(&self, id: RowId) -> bool {
        self.rows.contains(&id)
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.fields
    }

    /// Values of a live row.
    pub fn field(&self, id: RowId) -> Option<&FieldHandle> {
        if !self.contains(id) {
            return None;
        }
        self.fields.get(id)
    }

    /// Editable values of a live row. Ids that are not in the list get no handle.
    pub fn field_mut(&mut self, id: RowId) -> Option<&mut FieldHandle> {
        if !self.contains(id) {
            return None;
        }
        Some(self.fields.ensure(id, "", DEFAULT_COLUMN_TYPE))
    }

    /// Joins row order with the current values of each row.
    pub fn snapshot(&self) -> Vec<ColumnDraft> {
        self.rows
            .iter()
            .map(|id| match self.fields.get(*id) {
                Some(handle) => ColumnDraft {
                    id: *id,
                    name: handle.name().to_string(),
                    column_type: handle.column_type().to_string(),
                },
                None => ColumnDraft {
                    id: *id,
                    name: String::new(),
                    column_type: DEFAULT_COLUMN_TYPE.to_string(),
                },
            })
            .collect()
    }

    /// Drops every row and value and restarts id numbering.
    pub fn reset(&mut self) {
        self.rows.clear();
        self.fields.clear();
        self.next_id = 0;
    }
}
