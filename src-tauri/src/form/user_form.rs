use serde::Serialize;
use crate::backend::{Backend, NewUser};
use crate::util::error::{self, ValidationError};

/// The create-user form. Same busy and error handling as the create-table form.
#[derive(Debug, Default)]
pub struct UserForm {
    username: String,
    email: String,
    busy: bool,
    error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserFormView {
    pub username: String,
    pub email: String,
    pub busy: bool,
    pub error: Option<String>,
}

impl UserForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_username(&mut self, username: impl Into<String>) -> Result<(), error::Error> {
        if self.busy {
            return Err(error::Error::Busy);
        }
        self.username = username.into();
        return Ok(());
    }

    pub fn set_email(&mut self, email: impl Into<String>) -> Result<(), error::Error> {
        if self.busy {
            return Err(error::Error::Busy);
        }
        self.email = email.into();
        return Ok(());
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.username.trim().is_empty() {
            return Err(ValidationError::MissingUsername);
        }
        if self.email.trim().is_empty() {
            return Err(ValidationError::MissingEmail);
        }
        return Ok(());
    }

    pub fn begin_submit(&mut self) -> Result<NewUser, error::Error> {
        if self.busy {
            return Err(error::Error::Busy);
        }
        self.error = None;
        if let Err(e) = self.validate() {
            self.error = Some(e.to_string());
            return Err(e.into());
        }
        self.busy = true;
        return Ok(NewUser {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
        });
    }

    /// Applies the backend's answer. Success clears the form, failure keeps the values and shows the error.
    pub fn complete_submit(&mut self, outcome: Result<(), error::Error>) -> Result<(), error::Error> {
        self.busy = false;
        match outcome {
            Ok(()) => {
                self.username.clear();
                self.email.clear();
                self.error = None;
                return Ok(());
            },
            Err(e) => {
                tracing::warn!(username = %self.username.trim(), error = %e, "create user failed");
                self.error = Some(e.to_string());
                return Err(e);
            }
        }
    }

    pub async fn submit<B: Backend + ?Sized>(&mut self, backend: &B) -> Result<NewUser, error::Error> {
        let new_user = self.begin_submit()?;
        let outcome = backend.create_user(&new_user).await;
        self.complete_submit(outcome)?;
        return Ok(new_user);
    }

    pub fn view(&self) -> UserFormView {
        UserFormView {
            username: self.username.clone(),
            email: self.email.clone(),
            busy: self.busy,
            error: self.error.clone(),
        }
    }
}
