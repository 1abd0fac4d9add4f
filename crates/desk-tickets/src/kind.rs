//! The seam between the generic engine and the four concrete record kinds
//!
//! A kind implements field access, patch introspection/stripping and
//! write-once stamping; everything rule-shaped lives in its static
//! [`KindDescriptor`].

use crate::descriptor::{FieldGroup, KindDescriptor, TimestampSlot};
use crate::error::Result;
use chrono::{DateTime, Utc};
use desk_common::UserId;
use std::fmt;

pub trait TicketKind: Clone + Send + Sync + 'static {
    /// Kind-specific lifecycle status.
    type Status: Copy + Eq + fmt::Debug + Send + Sync + 'static;
    /// Partial update payload; unset fields are absent.
    type Patch: Clone + Send + Sync + 'static;
    /// Creation payload.
    type Create: Clone + Send + Sync + 'static;

    fn descriptor() -> &'static KindDescriptor<Self::Status>;

    fn id(&self) -> i64;
    fn set_id(&mut self, id: i64);
    fn status(&self) -> Self::Status;
    fn set_status(&mut self, status: Self::Status);
    fn originator(&self) -> UserId;
    fn assignee(&self) -> Option<UserId>;
    fn set_assignee(&mut self, user: UserId);
    fn approver(&self) -> Option<UserId> {
        None
    }
    fn set_approver(&mut self, _user: UserId) {}

    fn patch_status(patch: &Self::Patch) -> Option<Self::Status>;
    fn patch_originator(patch: &Self::Patch) -> Option<UserId>;
    fn patch_assignee(patch: &Self::Patch) -> Option<UserId>;
    fn patch_approver(_patch: &Self::Patch) -> Option<UserId> {
        None
    }
    /// Cross-kind reference carried by the patch, if the kind has one.
    fn patch_related(_patch: &Self::Patch) -> Option<i64> {
        None
    }

    /// Blank out every field of `group` the patch carries.
    fn strip_group(patch: &mut Self::Patch, group: FieldGroup);

    /// Merge every surviving field except `status` onto the record. Status
    /// changes and their side effects are the engine's business.
    fn apply(&mut self, patch: &Self::Patch);

    /// Set the slot's timestamp unless it is already set. Slots the kind
    /// does not carry are ignored.
    fn stamp(&mut self, slot: TimestampSlot, at: DateTime<Utc>);

    /// Reject creation payloads missing required fields.
    fn validate_create(req: &Self::Create) -> Result<()>;
    fn create_originator(req: &Self::Create) -> Option<UserId>;
    fn create_assignee(_req: &Self::Create) -> Option<UserId> {
        None
    }
    fn create_approver(_req: &Self::Create) -> Option<UserId> {
        None
    }
    fn create_related(_req: &Self::Create) -> Option<i64> {
        None
    }

    /// Instantiate at the kind's initial status with id 0 (the store
    /// assigns the real id). `area_default` fills the area field when the
    /// payload omits it.
    fn build(
        req: Self::Create,
        originator: UserId,
        area_default: Option<&str>,
        now: DateTime<Utc>,
    ) -> Self;
}
