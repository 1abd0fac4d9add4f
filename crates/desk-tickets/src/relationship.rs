//! Role-relationship resolution
//!
//! Pure and total: a principal's relationships to a stored record are
//! computed by strict id equality against its user-reference slots.

use crate::kind::TicketKind;
use desk_common::Principal;

/// The named relationships a principal holds to one record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RelationSet {
    originator: bool,
    assignee: bool,
    approver: bool,
}

impl RelationSet {
    pub fn is_empty(&self) -> bool {
        !(self.originator || self.assignee || self.approver)
    }

    pub fn is_originator(&self) -> bool {
        self.originator
    }

    pub fn is_assignee(&self) -> bool {
        self.assignee
    }

    pub fn is_approver(&self) -> bool {
        self.approver
    }

    /// Originator who also holds the assignee or approver slot.
    pub fn is_self_assigned(&self) -> bool {
        self.originator && (self.assignee || self.approver)
    }

    pub fn originator_only() -> Self {
        Self { originator: true, ..Self::default() }
    }

    pub fn assignee_only() -> Self {
        Self { assignee: true, ..Self::default() }
    }

    pub fn approver_only() -> Self {
        Self { approver: true, ..Self::default() }
    }

    pub fn self_assigned() -> Self {
        Self { originator: true, assignee: true, approver: false }
    }
}

/// Resolve the principal's relationships to `record`. An unset slot never
/// matches.
pub fn resolve<K: TicketKind>(principal: &Principal, record: &K) -> RelationSet {
    RelationSet {
        originator: record.originator() == principal.id,
        assignee: record.assignee() == Some(principal.id),
        approver: record.approver() == Some(principal.id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_set() {
        let relations = RelationSet::default();
        assert!(relations.is_empty());
        assert!(!relations.is_self_assigned());
    }

    #[test]
    fn test_self_assigned() {
        assert!(RelationSet::self_assigned().is_self_assigned());
        assert!(!RelationSet::assignee_only().is_self_assigned());
        assert!(!RelationSet::originator_only().is_self_assigned());
    }
}
