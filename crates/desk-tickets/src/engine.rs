//! The authorization engine
//!
//! One generic engine drives all four record kinds from their declarative
//! descriptors: it resolves the caller's relationships, filters the
//! proposed changes down to what that caller may apply, validates
//! referenced users, applies side effects (forced transitions, write-once
//! stamps) and persists the merged record in a single save.
//!
//! Field-level denials are not errors: disallowed fields are dropped from
//! the changeset and the remaining subset proceeds, even when empty. Only
//! structural violations (no standing at all, unreachable status, bad
//! referenced user) fail the whole operation.

use crate::descriptor::{FieldGroup, TimestampSlot};
use crate::error::{Result, TicketError};
use crate::kind::TicketKind;
use crate::relationship::resolve;
use crate::store::{RecordStore, StoreResult};
use async_trait::async_trait;
use chrono::Utc;
use desk_common::{NotificationSink, Principal, RecordEvent, Role, User, UserId, UserLookup};
use std::sync::Arc;

/// Existence lookup for cross-kind references (e.g. an incident's related
/// problem). Optional; when absent the reference is accepted as-is.
#[async_trait]
pub trait RelatedLookup: Send + Sync {
    async fn exists(&self, id: i64) -> StoreResult<bool>;
}

#[async_trait]
impl<K: TicketKind> RelatedLookup for crate::store::InMemoryStore<K> {
    async fn exists(&self, id: i64) -> StoreResult<bool> {
        Ok(RecordStore::find(self, id).await?.is_some())
    }
}

/// Generic mutation service for one record kind.
pub struct AuthorizationEngine<K: TicketKind> {
    store: Arc<dyn RecordStore<K>>,
    directory: Arc<dyn UserLookup>,
    related: Option<Arc<dyn RelatedLookup>>,
    sink: Arc<dyn NotificationSink>,
}

impl<K: TicketKind> AuthorizationEngine<K> {
    pub fn new(
        store: Arc<dyn RecordStore<K>>,
        directory: Arc<dyn UserLookup>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self { store, directory, related: None, sink }
    }

    /// Wire the lookup used to validate this kind's cross-kind reference.
    pub fn with_related(mut self, related: Arc<dyn RelatedLookup>) -> Self {
        self.related = Some(related);
        self
    }

    /// Create a record at the kind's initial status.
    ///
    /// End-users always originate their own tickets: when the principal's
    /// role is `user` the originator is forced to the principal, whatever
    /// the payload says. Staff may create on behalf of someone else.
    pub async fn create(&self, principal: &Principal, payload: K::Create) -> Result<K> {
        K::validate_create(&payload)?;
        let desc = K::descriptor();

        let originator = if principal.role == Role::User {
            principal.id
        } else {
            K::create_originator(&payload).unwrap_or(principal.id)
        };
        let owner = self
            .live_user(originator)
            .await?
            .ok_or_else(|| TicketError::bad_request("originator user not found"))?;

        let assignee = K::create_assignee(&payload);
        let approver = K::create_approver(&payload);
        if let Some(id) = assignee {
            self.require_staff(id, "assignee").await?;
        }
        if let Some(id) = approver {
            self.require_staff(id, "approver").await?;
        }
        if let Some(id) = K::create_related(&payload) {
            self.require_related(id).await?;
        }

        let now = Utc::now();
        let mut record = K::build(payload, originator, owner.department.as_deref(), now);
        if let Some(id) = approver {
            record.set_approver(id);
        }
        if let Some(id) = assignee {
            // Same side effects as the first assignment on update.
            record.set_assignee(id);
            record.stamp(TimestampSlot::Assigned, now);
            if let Some(forced) = desc.on_first_assign {
                record.set_status(forced);
                for slot in desc.stamps_on(forced) {
                    record.stamp(slot, now);
                }
            }
        }

        let stored = self.store.insert(record).await?;
        tracing::info!(kind = desc.kind, id = stored.id(), "record created");
        self.notify(RecordEvent::changed(desc.kind, stored.id()));
        Ok(stored)
    }

    /// Apply a partial update on behalf of `principal`.
    pub async fn update(&self, principal: &Principal, id: i64, payload: K::Patch) -> Result<K> {
        let desc = K::descriptor();
        let mut record = self.store.find(id).await?.ok_or(TicketError::NotFound)?;
        let relations = resolve(principal, &record);
        let mut patch = payload;

        if !principal.is_admin() {
            if relations.is_empty() {
                return Err(TicketError::Forbidden);
            }
            K::strip_group(&mut patch, FieldGroup::Identity);
            K::strip_group(&mut patch, FieldGroup::Relationship);
            let general_open =
                relations.is_originator() && record.status() == desc.initial;
            if !general_open {
                K::strip_group(&mut patch, FieldGroup::General);
            }
        }

        let current = record.status();
        let mut next = None;
        if let Some(target) = K::patch_status(&patch) {
            if target != current {
                if desc.is_terminal(current) {
                    return Err(TicketError::BadRequest(format!(
                        "{} {} is in a terminal status and can no longer change",
                        desc.kind, id
                    )));
                }
                let edge = desc.edge(current, target).ok_or_else(|| {
                    TicketError::BadRequest(format!(
                        "illegal status transition for {} {}",
                        desc.kind, id
                    ))
                })?;
                if principal.is_admin() || edge.permits(&relations) {
                    next = Some(target);
                } else {
                    tracing::debug!(
                        kind = desc.kind,
                        id,
                        "status change dropped: caller may not drive this edge"
                    );
                }
            }
        }

        // Closure eligibility is judged against the status this request
        // lands on, not only the stored one.
        let effective = next.unwrap_or(current);
        if !principal.is_admin() {
            let closure_open = if relations.is_self_assigned() {
                desc.is_terminal(effective)
            } else if !relations.is_originator() {
                desc.closure_open_at(effective)
            } else {
                false
            };
            if !closure_open {
                K::strip_group(&mut patch, FieldGroup::Closure);
            }
        }

        // Referenced users, on whatever survived filtering.
        if let Some(user) = K::patch_assignee(&patch) {
            self.require_staff(user, "assignee").await?;
        }
        if let Some(user) = K::patch_approver(&patch) {
            self.require_staff(user, "approver").await?;
        }
        if let Some(user) = K::patch_originator(&patch) {
            self.live_user(user)
                .await?
                .ok_or_else(|| TicketError::bad_request("originator user not found"))?;
        }
        if let Some(related) = K::patch_related(&patch) {
            self.require_related(related).await?;
        }

        let was_unassigned = record.assignee().is_none();
        record.apply(&patch);

        let now = Utc::now();
        if was_unassigned && record.assignee().is_some() {
            record.stamp(TimestampSlot::Assigned, now);
            if next.is_none() && current == desc.initial {
                if let Some(forced) = desc.on_first_assign {
                    tracing::info!(kind = desc.kind, id, "first assignment forces status change");
                    next = Some(forced);
                }
            }
        }
        if let Some(status) = next {
            record.set_status(status);
            for slot in desc.stamps_on(status) {
                record.stamp(slot, now);
            }
            tracing::info!(kind = desc.kind, id, status = ?status, "status changed");
        }

        let saved = self.store.save(record).await?;
        self.notify(RecordEvent::changed(desc.kind, id));
        Ok(saved)
    }

    /// Admin-only soft delete.
    pub async fn remove(&self, principal: &Principal, id: i64) -> Result<()> {
        if !principal.is_admin() {
            return Err(TicketError::Forbidden);
        }
        let desc = K::descriptor();
        if !self.store.soft_delete(id).await? {
            return Err(TicketError::NotFound);
        }
        tracing::info!(kind = desc.kind, id, "record soft-deleted");
        self.notify(RecordEvent::deleted(desc.kind, id));
        Ok(())
    }

    /// Fetch one record, masking records the caller may not see.
    pub async fn get(&self, principal: &Principal, id: i64) -> Result<K> {
        let record = self.store.find(id).await?.ok_or(TicketError::NotFound)?;
        if self.can_view(principal, &record) {
            Ok(record)
        } else {
            // Existence is not disclosed to unrelated end-users.
            Err(TicketError::NotFound)
        }
    }

    /// All records visible to the caller. Staff see every record of the
    /// kind; end-users only what they originate.
    pub async fn list(&self, principal: &Principal) -> Result<Vec<K>> {
        let records = self.store.list().await?;
        Ok(records
            .into_iter()
            .filter(|record| self.can_view(principal, record))
            .collect())
    }

    pub fn can_view(&self, principal: &Principal, record: &K) -> bool {
        match principal.role {
            Role::Admin | Role::Agent => true,
            Role::User => !resolve(principal, record).is_empty(),
        }
    }

    /// Fire-and-forget delivery: a failing sink never fails the mutation
    /// that produced the event.
    fn notify(&self, event: RecordEvent) {
        if let Err(err) = self.sink.emit(&event) {
            tracing::warn!(event = %event.name(), error = %err, "notification dropped");
        }
    }

    async fn live_user(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.directory.find_by_id(id).await?.filter(|user| user.active))
    }

    async fn require_staff(&self, id: UserId, slot: &str) -> Result<()> {
        match self.live_user(id).await? {
            Some(user) if user.role.is_staff() => Ok(()),
            Some(_) => Err(TicketError::BadRequest(format!(
                "{slot} must be an agent or admin"
            ))),
            None => Err(TicketError::BadRequest(format!("{slot} user not found"))),
        }
    }

    async fn require_related(&self, id: i64) -> Result<()> {
        if let Some(related) = &self.related {
            if !related.exists(id).await? {
                return Err(TicketError::bad_request("related record not found"));
            }
        }
        Ok(())
    }
}
