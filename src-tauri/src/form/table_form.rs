use serde::Serialize;
use crate::backend::{Backend, ColumnSpec, CreateTableRequest};
use crate::form::editor::{ColumnDraft, ListEditor, DEFAULT_COLUMN_TYPE};
use crate::form::registry::RowId;
use crate::util::error::{self, ValidationError};

/// State of the create-table form while it is open.
#[derive(Debug, Default)]
pub struct TableForm {
    table_name: String,
    editor: ListEditor,
    busy: bool,
    error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
/// What the frontend needs to render the form.
pub struct TableFormView {
    pub table_name: String,
    pub columns: Vec<ColumnDraft>,
    pub busy: bool,
    pub error: Option<String>,
}

impl TableForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn editor(&self) -> &ListEditor {
        &self.editor
    }

    pub fn columns(&self) -> Vec<ColumnDraft> {
        self.editor.snapshot()
    }

    /// Whether a submission is outstanding. Every mutation is refused while busy.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// The most recent validation or submission error.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn ensure_idle(&self) -> Result<(), error::Error> {
        if self.busy {
            return Err(error::Error::Busy);
        }
        return Ok(());
    }

    pub fn set_table_name(&mut self, name: impl Into<String>) -> Result<(), error::Error> {
        self.ensure_idle()?;
        self.table_name = name.into();
        return Ok(());
    }

    pub fn add_column(&mut self) -> Result<RowId, error::Error> {
        self.ensure_idle()?;
        return Ok(self.editor.add_row());
    }

    /// Removes a column row. Returns false if the row was already gone.
    pub fn remove_column(&mut self, id: RowId) -> Result<bool, error::Error> {
        self.ensure_idle()?;
        return Ok(self.editor.remove_row(id));
    }

    pub fn set_column_name(&mut self, id: RowId, name: impl Into<String>) -> Result<(), error::Error> {
        self.ensure_idle()?;
        match self.editor.field_mut(id) {
            Some(handle) => {
                handle.set_name(name);
                return Ok(());
            },
            None => { return Err(error::Error::UnknownRow(id.get())); }
        }
    }

    pub fn set_column_type(&mut self, id: RowId, column_type: impl Into<String>) -> Result<(), error::Error> {
        self.ensure_idle()?;
        match self.editor.field_mut(id) {
            Some(handle) => {
                handle.set_type(column_type);
                return Ok(());
            },
            None => { return Err(error::Error::UnknownRow(id.get())); }
        }
    }

    /// Checks the form, stopping at the first failed rule.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.table_name.trim().is_empty() {
            return Err(ValidationError::MissingTableName);
        }
        let registry = self.editor.registry();
        let unnamed = self.editor.rows().iter().any(|id| match registry.get(*id) {
            Some(handle) => handle.name().trim().is_empty(),
            None => true,
        });
        if unnamed {
            return Err(ValidationError::MissingColumnName);
        }
        if self.editor.is_empty() {
            return Err(ValidationError::NoColumns);
        }
        return Ok(());
    }

    /// The trimmed request for the current values. Blank types fall back to the default type.
    pub fn request(&self) -> CreateTableRequest {
        CreateTableRequest {
            table_name: self.table_name.trim().to_string(),
            columns: self
                .editor
                .snapshot()
                .into_iter()
                .map(|draft| {
                    let column_type = draft.column_type.trim();
                    ColumnSpec {
                        name: draft.name.trim().to_string(),
                        column_type: (if column_type.is_empty() { DEFAULT_COLUMN_TYPE } else { column_type }).to_string(),
                    }
                })
                .collect(),
        }
    }

    /// Validates the form and, if it passes, enters the busy state and returns the request to send.
    /// A failed validation is recorded as the form's error and leaves everything else untouched.
    pub fn begin_submit(&mut self) -> Result<CreateTableRequest, error::Error> {
        self.ensure_idle()?;
        self.error = None;
        if let Err(e) = self.validate() {
            tracing::debug!(error = %e, "create table form failed validation");
            self.error = Some(e.to_string());
            return Err(e.into());
        }
        self.busy = true;
        return Ok(self.request());
    }

    /// Records a failed submission. The entered values are kept so the user can retry.
    pub fn fail_submit(&mut self, e: &error::Error) {
        self.busy = false;
        self.error = Some(e.to_string());
    }

    /// Clears every value and restarts row numbering.
    pub fn reset(&mut self) {
        self.table_name.clear();
        self.editor.reset();
        self.busy = false;
        self.error = None;
    }

    pub fn view(&self) -> TableFormView {
        TableFormView {
            table_name: self.table_name.clone(),
            columns: self.editor.snapshot(),
            busy: self.busy,
            error: self.error.clone(),
        }
    }
}

/// The create-table form's lifetime: absent while closed, a fresh [`TableForm`] each time it opens.
#[derive(Debug, Default)]
pub struct CreateTableDialog {
    form: Option<TableForm>,
}

impl CreateTableDialog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the form. Opening an already open form keeps its values.
    pub fn open(&mut self) -> &mut TableForm {
        self.form.get_or_insert_with(TableForm::new)
    }

    /// Closes the form and discards its values. Refused while a submission is outstanding.
    pub fn close(&mut self) -> Result<(), error::Error> {
        if let Some(form) = &self.form {
            if form.is_busy() {
                return Err(error::Error::Busy);
            }
        }
        self.form = None;
        return Ok(());
    }

    pub fn is_open(&self) -> bool {
        self.form.is_some()
    }

    pub fn form(&self) -> Option<&TableForm> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Result<&mut TableForm, error::Error> {
        self.form.as_mut().ok_or(error::Error::FormClosed)
    }

    pub fn view(&self) -> Option<TableFormView> {
        self.form.as_ref().map(TableForm::view)
    }

    pub fn begin_submit(&mut self) -> Result<CreateTableRequest, error::Error> {
        return self.form_mut()?.begin_submit();
    }

    /// Applies the backend's answer to a request from [`begin_submit`](Self::begin_submit).
    ///
    /// On success `on_created` receives the table name and the form is cleared and closed. On failure the
    /// error is shown in the still-open form and returned.
    pub fn complete_submit<F: FnOnce(&str)>(&mut self, request: &CreateTableRequest, outcome: Result<(), error::Error>, on_created: F) -> Result<(), error::Error> {
        let form = self.form_mut()?;
        match outcome {
            Ok(()) => {
                tracing::info!(table = %request.table_name, "table created");
                on_created(&request.table_name);
                form.reset();
                self.form = None;
                return Ok(());
            },
            Err(e) => {
                tracing::warn!(table = %request.table_name, error = %e, "create table failed");
                form.fail_submit(&e);
                return Err(e);
            }
        }
    }

    /// Validates, sends the create-table request and applies the outcome. Returns the created table's name.
    pub async fn submit<B: Backend + ?Sized, F: FnOnce(&str)>(&mut self, backend: &B, on_created: F) -> Result<String, error::Error> {
        let request = self.begin_submit()?;
        let outcome = backend.create_table(&request).await;
        self.complete_submit(&request, outcome, on_created)?;
        return Ok(request.table_name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form_with(table_name: &str, columns: &[(&str, &str)]) -> TableForm {
        let mut form = TableForm::new();
        form.set_table_name(table_name).unwrap();
        for (name, column_type) in columns {
            let id = form.add_column().unwrap();
            form.set_column_name(id, *name).unwrap();
            form.set_column_type(id, *column_type).unwrap();
        }
        form
    }

    #[test]
    fn table_name_is_checked_first() {
        let form = form_with("  ", &[("", "TEXT")]);
        assert_eq!(form.validate(), Err(ValidationError::MissingTableName));
    }

    #[test]
    fn column_names_are_checked_before_column_count() {
        assert_eq!(form_with("users", &[("id", "INTEGER"), ("   ", "TEXT")]).validate(), Err(ValidationError::MissingColumnName));
        assert_eq!(form_with("users", &[]).validate(), Err(ValidationError::NoColumns));
        assert_eq!(form_with("users", &[("id", "INTEGER")]).validate(), Ok(()));
    }

    #[test]
    fn request_is_trimmed_and_blank_types_default() {
        let form = form_with(" users ", &[(" id ", " INTEGER "), ("note", "  ")]);
        let request = form.request();
        assert_eq!(request.table_name, "users");
        assert_eq!(request.columns, vec![
            ColumnSpec { name: String::from("id"), column_type: String::from("INTEGER") },
            ColumnSpec { name: String::from("note"), column_type: String::from("TEXT") },
        ]);
    }

    #[test]
    fn busy_form_refuses_edits_and_resubmission() {
        let mut form = form_with("users", &[("id", "INTEGER")]);
        form.begin_submit().unwrap();
        assert!(form.is_busy());
        assert!(matches!(form.add_column(), Err(error::Error::Busy)));
        assert!(matches!(form.set_table_name("x"), Err(error::Error::Busy)));
        assert!(matches!(form.begin_submit(), Err(error::Error::Busy)));

        form.fail_submit(&error::Error::backend("boom"));
        assert!(!form.is_busy());
        assert_eq!(form.error(), Some("boom"));
        assert_eq!(form.table_name(), "users");
    }

    #[test]
    fn new_attempt_replaces_old_message() {
        let mut form = form_with("", &[]);
        assert!(form.begin_submit().is_err());
        assert_eq!(form.error(), Some("Table name required"));

        form.set_table_name("users").unwrap();
        assert!(form.begin_submit().is_err());
        assert_eq!(form.error(), Some("At least one column required"));
    }

    #[test]
    fn editing_a_removed_row_is_an_error() {
        let mut form = TableForm::new();
        let id = form.add_column().unwrap();
        form.remove_column(id).unwrap();
        assert!(matches!(form.set_column_name(id, "x"), Err(error::Error::UnknownRow(_))));
        assert!(form.editor().registry().is_empty());
    }

    #[test]
    fn dialog_lifecycle() {
        let mut dialog = CreateTableDialog::new();
        assert!(!dialog.is_open());
        assert!(matches!(dialog.begin_submit(), Err(error::Error::FormClosed)));

        dialog.open().set_table_name("draft").unwrap();
        dialog.open();
        assert_eq!(dialog.form().unwrap().table_name(), "draft");

        dialog.close().unwrap();
        assert!(dialog.view().is_none());
        assert_eq!(dialog.open().table_name(), "");
    }

    #[test]
    fn dialog_cannot_close_while_busy() {
        let mut dialog = CreateTableDialog::new();
        let form = dialog.open();
        form.set_table_name("users").unwrap();
        let id = form.add_column().unwrap();
        form.set_column_name(id, "id").unwrap();

        let request = dialog.begin_submit().unwrap();
        assert!(matches!(dialog.close(), Err(error::Error::Busy)));

        let mut created = Vec::new();
        dialog.complete_submit(&request, Ok(()), |name| created.push(name.to_string())).unwrap();
        assert_eq!(created, vec![String::from("users")]);
        assert!(!dialog.is_open());
    }
}
