//! Admin drafts: in-memory page content edited before a bulk save.

pub mod ops;
mod registry;
mod tree;

pub use ops::{DraftOp, ListPath, ParentRef};
pub use registry::{DraftRegistry, SaveReport};
pub use tree::{Draft, DraftView, LinkEntry};

use thiserror::Error;

use crate::content::validate::ValidationError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum DraftError {
    #[error("'{0}' is not an object")]
    NotAnObject(String),

    #[error("'{0}' is not a list")]
    NotAList(String),

    #[error("item '{0}' not found")]
    ItemNotFound(String),

    #[error("item '{0}' already exists")]
    DuplicateItem(String),

    #[error("invalid item: {0}")]
    InvalidItem(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
