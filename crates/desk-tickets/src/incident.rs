//! Incident records: unplanned service interruptions

use crate::descriptor::{
    ActorClass::{Assignee, Originator, SelfAssigned},
    FieldGroup, KindDescriptor, StampRule, TimestampSlot, Transition,
};
use crate::error::{Result, TicketError};
use crate::kind::TicketKind;
use crate::model::{Category, Priority, RelatedDevice};
use chrono::{DateTime, Utc};
use desk_common::UserId;
use serde::{Deserialize, Serialize};

use self::IncidentStatus::{Canceled, Closed, InProgress, Pending, Resolved};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    #[default]
    Pending,
    InProgress,
    Resolved,
    Closed,
    Canceled,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Incident {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub incident_area: String,
    pub category: Category,
    pub priority: Priority,
    pub status: IncidentStatus,
    pub related_device: RelatedDevice,
    pub reporter_id: UserId,
    pub assigned_id: Option<UserId>,
    pub related_problem_id: Option<i64>,
    pub report_date: DateTime<Utc>,
    pub assigned_date: Option<DateTime<Utc>>,
    pub resolution_date: Option<DateTime<Utc>>,
    pub close_date: Option<DateTime<Utc>>,
    pub closure_notes: Option<String>,
}

/// Partial update. Absent fields are left untouched.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct IncidentPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub incident_area: Option<String>,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub related_device: Option<RelatedDevice>,
    pub related_problem_id: Option<i64>,
    pub status: Option<IncidentStatus>,
    pub reporter_id: Option<UserId>,
    pub assigned_id: Option<UserId>,
    pub closure_notes: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CreateIncident {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub incident_area: Option<String>,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub related_device: RelatedDevice,
    #[serde(default)]
    pub reporter_id: Option<UserId>,
    #[serde(default)]
    pub assigned_id: Option<UserId>,
    #[serde(default)]
    pub related_problem_id: Option<i64>,
    /// Accepted on the wire for client compatibility; creation always
    /// starts at pending.
    #[serde(default)]
    pub status: Option<IncidentStatus>,
}

impl CreateIncident {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        area: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            incident_area: Some(area.into()),
            category: Category::default(),
            priority: Priority::default(),
            related_device: RelatedDevice::default(),
            reporter_id: None,
            assigned_id: None,
            related_problem_id: None,
            status: None,
        }
    }
}

static DESCRIPTOR: KindDescriptor<IncidentStatus> = KindDescriptor {
    kind: "incident",
    initial: Pending,
    terminal: &[Resolved, Closed, Canceled],
    closure_editable: &[Resolved, Closed, Canceled],
    transitions: &[
        Transition { from: Pending, to: InProgress, actors: &[] },
        Transition { from: Pending, to: Resolved, actors: &[Originator, SelfAssigned] },
        Transition { from: Pending, to: Canceled, actors: &[Originator, SelfAssigned] },
        Transition { from: Pending, to: Closed, actors: &[] },
        Transition { from: InProgress, to: Resolved, actors: &[Assignee, SelfAssigned] },
        Transition { from: InProgress, to: Canceled, actors: &[Assignee, SelfAssigned] },
        Transition { from: InProgress, to: Closed, actors: &[] },
    ],
    stamps: &[
        StampRule { on: &[Resolved], slot: TimestampSlot::Resolution },
        StampRule { on: &[Resolved, Closed, Canceled], slot: TimestampSlot::Close },
    ],
    on_first_assign: Some(InProgress),
};

impl TicketKind for Incident {
    type Status = IncidentStatus;
    type Patch = IncidentPatch;
    type Create = CreateIncident;

    fn descriptor() -> &'static KindDescriptor<IncidentStatus> {
        &DESCRIPTOR
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn status(&self) -> IncidentStatus {
        self.status
    }

    fn set_status(&mut self, status: IncidentStatus) {
        self.status = status;
    }

    fn originator(&self) -> UserId {
        self.reporter_id
    }

    fn assignee(&self) -> Option<UserId> {
        self.assigned_id
    }

    fn set_assignee(&mut self, user: UserId) {
        self.assigned_id = Some(user);
    }

    fn patch_status(patch: &IncidentPatch) -> Option<IncidentStatus> {
        patch.status
    }

    fn patch_originator(patch: &IncidentPatch) -> Option<UserId> {
        patch.reporter_id
    }

    fn patch_assignee(patch: &IncidentPatch) -> Option<UserId> {
        patch.assigned_id
    }

    fn patch_related(patch: &IncidentPatch) -> Option<i64> {
        patch.related_problem_id
    }

    fn strip_group(patch: &mut IncidentPatch, group: FieldGroup) {
        match group {
            FieldGroup::Identity => {
                patch.reporter_id = None;
            }
            FieldGroup::General => {
                patch.title = None;
                patch.description = None;
                patch.incident_area = None;
                patch.category = None;
                patch.priority = None;
                patch.related_device = None;
                patch.related_problem_id = None;
            }
            FieldGroup::Relationship => {
                patch.assigned_id = None;
            }
            FieldGroup::Status => {
                patch.status = None;
            }
            FieldGroup::Closure => {
                patch.closure_notes = None;
            }
        }
    }

    fn apply(&mut self, patch: &IncidentPatch) {
        if let Some(v) = &patch.title {
            self.title = v.clone();
        }
        if let Some(v) = &patch.description {
            self.description = v.clone();
        }
        if let Some(v) = &patch.incident_area {
            self.incident_area = v.clone();
        }
        if let Some(v) = patch.category {
            self.category = v;
        }
        if let Some(v) = patch.priority {
            self.priority = v;
        }
        if let Some(v) = patch.related_device {
            self.related_device = v;
        }
        if let Some(v) = patch.related_problem_id {
            self.related_problem_id = Some(v);
        }
        if let Some(v) = patch.reporter_id {
            self.reporter_id = v;
        }
        if let Some(v) = patch.assigned_id {
            self.assigned_id = Some(v);
        }
        if let Some(v) = &patch.closure_notes {
            self.closure_notes = Some(v.clone());
        }
    }

    fn stamp(&mut self, slot: TimestampSlot, at: DateTime<Utc>) {
        let field = match slot {
            TimestampSlot::Assigned => &mut self.assigned_date,
            TimestampSlot::Resolution => &mut self.resolution_date,
            TimestampSlot::Close => &mut self.close_date,
            _ => return,
        };
        if field.is_none() {
            *field = Some(at);
        }
    }

    fn validate_create(req: &CreateIncident) -> Result<()> {
        if req.title.trim().is_empty() {
            return Err(TicketError::bad_request("title is required"));
        }
        if req.description.trim().is_empty() {
            return Err(TicketError::bad_request("description is required"));
        }
        Ok(())
    }

    fn create_originator(req: &CreateIncident) -> Option<UserId> {
        req.reporter_id
    }

    fn create_assignee(req: &CreateIncident) -> Option<UserId> {
        req.assigned_id
    }

    fn create_related(req: &CreateIncident) -> Option<i64> {
        req.related_problem_id
    }

    fn build(
        req: CreateIncident,
        originator: UserId,
        area_default: Option<&str>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: 0,
            title: req.title,
            description: req.description,
            incident_area: req
                .incident_area
                .unwrap_or_else(|| area_default.unwrap_or_default().to_string()),
            category: req.category,
            priority: req.priority,
            status: Pending,
            related_device: req.related_device,
            reporter_id: originator,
            assigned_id: None,
            related_problem_id: req.related_problem_id,
            report_date: now,
            assigned_date: None,
            resolution_date: None,
            close_date: None,
            closure_notes: None,
        }
    }
}
