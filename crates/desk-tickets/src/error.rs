//! Error taxonomy for record mutations
//!
//! Every failure is a distinct, inspectable variant so an HTTP collaborator
//! can map it to a status code. Field-level authorization denials are not
//! errors; the engine drops those fields from the changeset instead.

use crate::store::StoreError;
use desk_common::DirectoryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TicketError {
    /// Id does not resolve to a live record.
    #[error("record not found")]
    NotFound,

    /// Caller holds no relationship to the record and is not admin.
    #[error("no standing to modify this record")]
    Forbidden,

    /// Invalid referenced user, illegal status transition, or missing
    /// required field on create.
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

impl TicketError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }
}

pub type Result<T> = std::result::Result<T, TicketError>;
