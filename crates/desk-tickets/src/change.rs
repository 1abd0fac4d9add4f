//! Change requests: planned modifications moving through an approval
//! pipeline
//!
//! Unlike the other kinds this one has an approver slot, milestone
//! timestamps along the pipeline, and no assignment-forced transition:
//! requested→approved belongs to the approver, not to whoever assigns.

use crate::descriptor::{
    ActorClass::{Approver, Assignee, Originator, SelfAssigned},
    FieldGroup, KindDescriptor, StampRule, TimestampSlot, Transition,
};
use crate::error::{Result, TicketError};
use crate::kind::TicketKind;
use crate::model::{ChangeType, Priority};
use chrono::{DateTime, Utc};
use desk_common::UserId;
use serde::{Deserialize, Serialize};

use self::ChangeStatus::{Approved, Completed, Failed, Implementation, Rejected, Requested};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeStatus {
    #[default]
    Requested,
    Approved,
    Rejected,
    Implementation,
    Completed,
    Failed,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChangeRequest {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub justification: Option<String>,
    pub change_type: ChangeType,
    pub area: String,
    pub priority: Priority,
    pub status: ChangeStatus,
    pub requester_id: UserId,
    pub assigned_id: Option<UserId>,
    pub approver_id: Option<UserId>,
    pub implementation_plan: String,
    pub rollback_plan: String,
    pub request_date: DateTime<Utc>,
    pub approved_date: Option<DateTime<Utc>>,
    pub implementation_date: Option<DateTime<Utc>>,
    pub completed_date: Option<DateTime<Utc>>,
    pub closure_notes: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ChangeRequestPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub justification: Option<String>,
    pub change_type: Option<ChangeType>,
    pub area: Option<String>,
    pub priority: Option<Priority>,
    pub implementation_plan: Option<String>,
    pub rollback_plan: Option<String>,
    pub status: Option<ChangeStatus>,
    pub requester_id: Option<UserId>,
    pub assigned_id: Option<UserId>,
    pub approver_id: Option<UserId>,
    pub closure_notes: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CreateChangeRequest {
    pub title: String,
    pub description: String,
    pub implementation_plan: String,
    pub rollback_plan: String,
    #[serde(default)]
    pub justification: Option<String>,
    #[serde(default)]
    pub change_type: ChangeType,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub requester_id: Option<UserId>,
    #[serde(default)]
    pub assigned_id: Option<UserId>,
    #[serde(default)]
    pub approver_id: Option<UserId>,
    #[serde(default)]
    pub status: Option<ChangeStatus>,
}

impl CreateChangeRequest {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        implementation_plan: impl Into<String>,
        rollback_plan: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            implementation_plan: implementation_plan.into(),
            rollback_plan: rollback_plan.into(),
            justification: None,
            change_type: ChangeType::default(),
            area: None,
            priority: Priority::default(),
            requester_id: None,
            assigned_id: None,
            approver_id: None,
            status: None,
        }
    }
}

static DESCRIPTOR: KindDescriptor<ChangeStatus> = KindDescriptor {
    kind: "change_request",
    initial: Requested,
    terminal: &[Rejected, Completed, Failed],
    // The approved-equivalent branch counts here, unlike the other kinds.
    closure_editable: &[Approved, Rejected, Completed, Failed],
    transitions: &[
        Transition { from: Requested, to: Approved, actors: &[Approver] },
        Transition { from: Requested, to: Rejected, actors: &[Approver, Originator, SelfAssigned] },
        Transition { from: Approved, to: Implementation, actors: &[Assignee, SelfAssigned] },
        Transition { from: Implementation, to: Completed, actors: &[Assignee, SelfAssigned] },
        Transition { from: Implementation, to: Failed, actors: &[Assignee, SelfAssigned] },
    ],
    stamps: &[
        StampRule { on: &[Approved], slot: TimestampSlot::Approved },
        StampRule { on: &[Implementation], slot: TimestampSlot::Implementation },
        StampRule { on: &[Rejected, Completed, Failed], slot: TimestampSlot::Completed },
    ],
    on_first_assign: None,
};

impl TicketKind for ChangeRequest {
    type Status = ChangeStatus;
    type Patch = ChangeRequestPatch;
    type Create = CreateChangeRequest;

    fn descriptor() -> &'static KindDescriptor<ChangeStatus> {
        &DESCRIPTOR
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn status(&self) -> ChangeStatus {
        self.status
    }

    fn set_status(&mut self, status: ChangeStatus) {
        self.status = status;
    }

    fn originator(&self) -> UserId {
        self.requester_id
    }

    fn assignee(&self) -> Option<UserId> {
        self.assigned_id
    }

    fn set_assignee(&mut self, user: UserId) {
        self.assigned_id = Some(user);
    }

    fn approver(&self) -> Option<UserId> {
        self.approver_id
    }

    fn set_approver(&mut self, user: UserId) {
        self.approver_id = Some(user);
    }

    fn patch_status(patch: &ChangeRequestPatch) -> Option<ChangeStatus> {
        patch.status
    }

    fn patch_originator(patch: &ChangeRequestPatch) -> Option<UserId> {
        patch.requester_id
    }

    fn patch_assignee(patch: &ChangeRequestPatch) -> Option<UserId> {
        patch.assigned_id
    }

    fn patch_approver(patch: &ChangeRequestPatch) -> Option<UserId> {
        patch.approver_id
    }

    fn strip_group(patch: &mut ChangeRequestPatch, group: FieldGroup) {
        match group {
            FieldGroup::Identity => {
                patch.requester_id = None;
            }
            FieldGroup::General => {
                patch.title = None;
                patch.description = None;
                patch.justification = None;
                patch.change_type = None;
                patch.area = None;
                patch.priority = None;
                patch.implementation_plan = None;
                patch.rollback_plan = None;
            }
            FieldGroup::Relationship => {
                patch.assigned_id = None;
                patch.approver_id = None;
            }
            FieldGroup::Status => {
                patch.status = None;
            }
            FieldGroup::Closure => {
                patch.closure_notes = None;
            }
        }
    }

    fn apply(&mut self, patch: &ChangeRequestPatch) {
        if let Some(v) = &patch.title {
            self.title = v.clone();
        }
        if let Some(v) = &patch.description {
            self.description = v.clone();
        }
        if let Some(v) = &patch.justification {
            self.justification = Some(v.clone());
        }
        if let Some(v) = patch.change_type {
            self.change_type = v;
        }
        if let Some(v) = &patch.area {
            self.area = v.clone();
        }
        if let Some(v) = patch.priority {
            self.priority = v;
        }
        if let Some(v) = &patch.implementation_plan {
            self.implementation_plan = v.clone();
        }
        if let Some(v) = &patch.rollback_plan {
            self.rollback_plan = v.clone();
        }
        if let Some(v) = patch.requester_id {
            self.requester_id = v;
        }
        if let Some(v) = patch.assigned_id {
            self.assigned_id = Some(v);
        }
        if let Some(v) = patch.approver_id {
            self.approver_id = Some(v);
        }
        if let Some(v) = &patch.closure_notes {
            self.closure_notes = Some(v.clone());
        }
    }

    fn stamp(&mut self, slot: TimestampSlot, at: DateTime<Utc>) {
        let field = match slot {
            TimestampSlot::Approved => &mut self.approved_date,
            TimestampSlot::Implementation => &mut self.implementation_date,
            TimestampSlot::Completed => &mut self.completed_date,
            _ => return,
        };
        if field.is_none() {
            *field = Some(at);
        }
    }

    fn validate_create(req: &CreateChangeRequest) -> Result<()> {
        if req.title.trim().is_empty() {
            return Err(TicketError::bad_request("title is required"));
        }
        if req.description.trim().is_empty() {
            return Err(TicketError::bad_request("description is required"));
        }
        if req.implementation_plan.trim().is_empty() {
            return Err(TicketError::bad_request("implementation plan is required"));
        }
        if req.rollback_plan.trim().is_empty() {
            return Err(TicketError::bad_request("rollback plan is required"));
        }
        Ok(())
    }

    fn create_originator(req: &CreateChangeRequest) -> Option<UserId> {
        req.requester_id
    }

    fn create_assignee(req: &CreateChangeRequest) -> Option<UserId> {
        req.assigned_id
    }

    fn create_approver(req: &CreateChangeRequest) -> Option<UserId> {
        req.approver_id
    }

    fn build(
        req: CreateChangeRequest,
        originator: UserId,
        area_default: Option<&str>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: 0,
            title: req.title,
            description: req.description,
            justification: req.justification,
            change_type: req.change_type,
            area: req
                .area
                .unwrap_or_else(|| area_default.unwrap_or_default().to_string()),
            priority: req.priority,
            status: Requested,
            requester_id: originator,
            assigned_id: None,
            approver_id: None,
            implementation_plan: req.implementation_plan,
            rollback_plan: req.rollback_plan,
            request_date: now,
            approved_date: None,
            implementation_date: None,
            completed_date: None,
            closure_notes: None,
        }
    }
}
