use thiserror::Error;

use crate::document::DocumentId;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Document not found: {0}")]
    DocumentNotFound(DocumentId),

    #[error("Configuration error: {0}")]
    Config(String),
}
