pub mod registry;
pub mod editor;
pub mod table_form;
pub mod user_form;

pub use editor::{ColumnDraft, ListEditor, DEFAULT_COLUMN_TYPE};
pub use registry::{FieldHandle, FieldRegistry, RowId};
pub use table_form::{CreateTableDialog, TableForm, TableFormView};
pub use user_form::{UserForm, UserFormView};
