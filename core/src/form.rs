//! Validation for the todo and login forms.
//!
//! Forms arrive as raw strings and optional uploads; `validate` turns them
//! into the typed inputs the client accepts, so a `TodoDraft` can only ever
//! carry a trimmed title, a trimmed description and a PDF within the size cap.

use secrecy::SecretString;
use thiserror::Error;

use crate::types::{Credentials, PdfAttachment, TodoDraft, PDF_CONTENT_TYPE};

/// Largest accepted attachment, 10 MiB.
pub const MAX_ATTACHMENT_BYTES: usize = 10 * 1024 * 1024;

/// User-facing validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Title is required")]
    TitleRequired,
    #[error("Description is required")]
    DescriptionRequired,
    #[error("Only PDF files are allowed.")]
    NotPdf,
    #[error("Max file size is 10MB.")]
    AttachmentTooLarge { size: usize },
    #[error("Email is required")]
    EmailRequired,
    #[error("Password is required")]
    PasswordRequired,
}

/// A file part as received from the browser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// Browsers submit an empty, nameless part when no file was chosen.
    pub fn is_empty(&self) -> bool {
        self.file_name.is_empty() && self.bytes.is_empty()
    }

    fn into_pdf(self) -> Result<PdfAttachment, FormError> {
        if !self.content_type.eq_ignore_ascii_case(PDF_CONTENT_TYPE) {
            return Err(FormError::NotPdf);
        }
        if self.bytes.len() > MAX_ATTACHMENT_BYTES {
            return Err(FormError::AttachmentTooLarge {
                size: self.bytes.len(),
            });
        }
        Ok(PdfAttachment {
            file_name: self.file_name,
            bytes: self.bytes,
        })
    }
}

/// Raw input of the add/edit form.
#[derive(Debug, Clone, Default)]
pub struct TodoForm {
    pub title: String,
    pub description: String,
    pub file: Option<UploadedFile>,
}

impl TodoForm {
    pub fn validate(self) -> Result<TodoDraft, FormError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(FormError::TitleRequired);
        }
        let description = self.description.trim();
        if description.is_empty() {
            return Err(FormError::DescriptionRequired);
        }
        let attachment = match self.file {
            Some(file) if !file.is_empty() => Some(file.into_pdf()?),
            _ => None,
        };
        Ok(TodoDraft {
            title: title.to_string(),
            description: description.to_string(),
            attachment,
        })
    }
}

/// Raw input of the sign-in form.
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(self) -> Result<Credentials, FormError> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(FormError::EmailRequired);
        }
        if self.password.is_empty() {
            return Err(FormError::PasswordRequired);
        }
        Ok(Credentials {
            email: email.to_string(),
            password: SecretString::from(self.password),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn form(title: &str, description: &str, file: Option<UploadedFile>) -> TodoForm {
        TodoForm {
            title: title.to_string(),
            description: description.to_string(),
            file,
        }
    }

    fn pdf(len: usize) -> UploadedFile {
        UploadedFile {
            file_name: "notes.pdf".to_string(),
            content_type: PDF_CONTENT_TYPE.to_string(),
            bytes: vec![b'%'; len],
        }
    }

    #[test]
    fn trims_title_and_description() {
        let draft = form("  Buy milk ", " two litres\n", None).validate().unwrap();
        assert_eq!(draft.title, "Buy milk");
        assert_eq!(draft.description, "two litres");
        assert!(draft.attachment.is_none());
    }

    #[test]
    fn blank_title_is_rejected_first() {
        assert_eq!(form("   ", "", None).validate(), Err(FormError::TitleRequired));
    }

    #[test]
    fn blank_description_is_rejected() {
        assert_eq!(form("Title", " ", None).validate(), Err(FormError::DescriptionRequired));
    }

    #[test]
    fn empty_file_part_means_no_attachment() {
        let draft = form("a", "b", Some(UploadedFile::default())).validate().unwrap();
        assert!(draft.attachment.is_none());
    }

    #[test]
    fn non_pdf_is_rejected() {
        let file = UploadedFile {
            file_name: "cat.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![1, 2, 3],
        };
        let err = form("a", "b", Some(file)).validate().unwrap_err();
        assert_eq!(err, FormError::NotPdf);
        assert_eq!(err.to_string(), "Only PDF files are allowed.");
    }

    #[test]
    fn size_ceiling_is_inclusive() {
        assert!(form("a", "b", Some(pdf(MAX_ATTACHMENT_BYTES))).validate().is_ok());
        let err = form("a", "b", Some(pdf(MAX_ATTACHMENT_BYTES + 1))).validate().unwrap_err();
        assert_eq!(err.to_string(), "Max file size is 10MB.");
    }

    #[test]
    fn pdf_is_carried_into_the_draft() {
        let draft = form("a", "b", Some(pdf(4))).validate().unwrap();
        let attachment = draft.attachment.unwrap();
        assert_eq!(attachment.file_name, "notes.pdf");
        assert_eq!(attachment.bytes.len(), 4);
    }

    #[test]
    fn login_requires_both_fields() {
        let missing_email = LoginForm {
            email: " ".to_string(),
            password: "x".to_string(),
        };
        assert_eq!(missing_email.validate().unwrap_err(), FormError::EmailRequired);

        let missing_password = LoginForm {
            email: "a@b.c".to_string(),
            password: String::new(),
        };
        assert_eq!(missing_password.validate().unwrap_err(), FormError::PasswordRequired);

        let ok = LoginForm {
            email: " a@b.c ".to_string(),
            password: "secret".to_string(),
        }
        .validate()
        .unwrap();
        assert_eq!(ok.email, "a@b.c");
        assert_eq!(ok.password.expose_secret(), "secret");
    }
}
