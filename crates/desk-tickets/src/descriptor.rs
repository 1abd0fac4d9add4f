//! Declarative per-kind authorization data
//!
//! Each record kind publishes one static [`KindDescriptor`]: its field
//! groups, its status graph with actor gating, and its timestamp
//! directives. The engine consumes this data; there is no per-kind
//! branching anywhere in the decision path.

use crate::relationship::RelationSet;

/// Mutually exclusive write-permission groups a record's fields fall into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldGroup {
    /// Id, originator reference, creation timestamp. Admin may correct the
    /// originator; nobody else writes these after creation.
    Identity,
    /// Title, description, area, category, priority, related references.
    General,
    /// Assignee / receiver / approver slots. Admin-only.
    Relationship,
    /// The lifecycle status, governed by the transition table.
    Status,
    /// Free-text outcome fields, governed by the closure-editing rule.
    Closure,
}

/// Relationship-derived actor classes a transition edge can be gated on.
/// Admin drives every declared edge and is never listed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActorClass {
    /// Holds the originator reference (and may hold others too).
    Originator,
    /// Holds the assignee/receiver slot without being the originator.
    Assignee,
    /// Holds the approver slot without being the originator.
    Approver,
    /// Originator who also holds the assignee or approver slot.
    SelfAssigned,
}

/// One edge of a kind's status graph.
#[derive(Debug)]
pub struct Transition<S: 'static> {
    pub from: S,
    pub to: S,
    /// Non-admin actor classes permitted to drive this edge.
    pub actors: &'static [ActorClass],
}

impl<S> Transition<S> {
    /// Whether a caller holding `relations` may drive this edge.
    pub fn permits(&self, relations: &RelationSet) -> bool {
        self.actors.iter().any(|actor| match actor {
            ActorClass::Originator => relations.is_originator(),
            ActorClass::Assignee => relations.is_assignee() && !relations.is_originator(),
            ActorClass::Approver => relations.is_approver() && !relations.is_originator(),
            ActorClass::SelfAssigned => relations.is_self_assigned(),
        })
    }
}

/// Write-once timestamp slots. Not every kind carries every slot; stamping
/// a slot the kind does not have is a no-op.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimestampSlot {
    /// Relationship slot went from empty to populated.
    Assigned,
    Resolution,
    Close,
    Approved,
    Implementation,
    Completed,
}

/// Stamp `slot` the first time the record enters one of the `on` statuses.
#[derive(Debug)]
pub struct StampRule<S: 'static> {
    pub on: &'static [S],
    pub slot: TimestampSlot,
}

/// Everything the engine needs to know about one record kind.
#[derive(Debug)]
pub struct KindDescriptor<S: 'static> {
    /// Wire name, e.g. `incident`.
    pub kind: &'static str,
    pub initial: S,
    /// Statuses with no outgoing edges; frozen for every actor.
    pub terminal: &'static [S],
    /// Statuses in which an acting assignee/approver may edit closure fields.
    pub closure_editable: &'static [S],
    pub transitions: &'static [Transition<S>],
    pub stamps: &'static [StampRule<S>],
    /// Status forced when the assignee slot first becomes populated while
    /// the record still sits at `initial`. `None` for approval-driven kinds.
    pub on_first_assign: Option<S>,
}

impl<S: Copy + PartialEq + 'static> KindDescriptor<S> {
    pub fn is_terminal(&self, status: S) -> bool {
        self.terminal.contains(&status)
    }

    pub fn closure_open_at(&self, status: S) -> bool {
        self.closure_editable.contains(&status)
    }

    pub fn edge(&self, from: S, to: S) -> Option<&Transition<S>> {
        self.transitions.iter().find(|t| t.from == from && t.to == to)
    }

    /// Slots stamped on entering `status`.
    pub fn stamps_on(&self, status: S) -> impl Iterator<Item = TimestampSlot> + '_ {
        self.stamps
            .iter()
            .filter(move |rule| rule.on.contains(&status))
            .map(|rule| rule.slot)
    }
}
