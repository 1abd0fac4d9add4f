//! OpenDesk shared identity domain
//!
//! Common building blocks consumed by every record-kind crate:
//! - Portal roles, users and the per-request `Principal`
//! - The `UserLookup` directory port with an in-memory implementation
//! - The `NotificationSink` port for post-mutation change signals

pub mod directory;
pub mod notify;
pub mod user;

pub use directory::{DirectoryError, InMemoryDirectory, UserLookup};
pub use notify::{
    NotificationSink, NotifyError, NotifyResult, NullSink, RecordAction, RecordEvent,
    RecordingSink,
};
pub use user::{Principal, Role, User, UserId};
