//! Problem records: root causes behind one or more incidents

use crate::descriptor::{
    ActorClass::{Assignee, Originator, SelfAssigned},
    FieldGroup, KindDescriptor, StampRule, TimestampSlot, Transition,
};
use crate::error::{Result, TicketError};
use crate::kind::TicketKind;
use crate::model::{Category, Priority};
use chrono::{DateTime, Utc};
use desk_common::UserId;
use serde::{Deserialize, Serialize};

use self::ProblemStatus::{Canceled, Closed, InProgress, Pending, Resolved};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemStatus {
    #[default]
    Pending,
    InProgress,
    Resolved,
    Closed,
    Canceled,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Problem {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub problem_area: String,
    pub category: Category,
    pub priority: Priority,
    pub status: ProblemStatus,
    pub cause: String,
    pub reporter_id: UserId,
    pub assigned_id: Option<UserId>,
    /// Outcome write-up; closure-gated together with the notes.
    pub implemented_solution: Option<String>,
    pub report_date: DateTime<Utc>,
    pub assigned_date: Option<DateTime<Utc>>,
    pub resolution_date: Option<DateTime<Utc>>,
    pub close_date: Option<DateTime<Utc>>,
    pub closure_notes: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProblemPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub problem_area: Option<String>,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub cause: Option<String>,
    pub status: Option<ProblemStatus>,
    pub reporter_id: Option<UserId>,
    pub assigned_id: Option<UserId>,
    pub implemented_solution: Option<String>,
    pub closure_notes: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CreateProblem {
    pub title: String,
    pub description: String,
    pub cause: String,
    #[serde(default)]
    pub problem_area: Option<String>,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub reporter_id: Option<UserId>,
    #[serde(default)]
    pub assigned_id: Option<UserId>,
    #[serde(default)]
    pub status: Option<ProblemStatus>,
}

impl CreateProblem {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        cause: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            cause: cause.into(),
            problem_area: None,
            category: Category::default(),
            priority: Priority::default(),
            reporter_id: None,
            assigned_id: None,
            status: None,
        }
    }
}

static DESCRIPTOR: KindDescriptor<ProblemStatus> = KindDescriptor {
    kind: "problem",
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

impl TicketKind for Problem {
    type Status = ProblemStatus;
    type Patch = ProblemPatch;
    type Create = CreateProblem;

    fn descriptor() -> &'static KindDescriptor<ProblemStatus> {
        &DESCRIPTOR
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn status(&self) -> ProblemStatus {
        self.status
    }

    fn set_status(&mut self, status: ProblemStatus) {
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

    fn patch_status(patch: &ProblemPatch) -> Option<ProblemStatus> {
        patch.status
    }

    fn patch_originator(patch: &ProblemPatch) -> Option<UserId> {
        patch.reporter_id
    }

    fn patch_assignee(patch: &ProblemPatch) -> Option<UserId> {
        patch.assigned_id
    }

    fn strip_group(patch: &mut ProblemPatch, group: FieldGroup) {
        match group {
            FieldGroup::Identity => {
                patch.reporter_id = None;
            }
            FieldGroup::General => {
                patch.title = None;
                patch.description = None;
                patch.problem_area = None;
                patch.category = None;
                patch.priority = None;
                patch.cause = None;
            }
            FieldGroup::Relationship => {
                patch.assigned_id = None;
            }
            FieldGroup::Status => {
                patch.status = None;
            }
            FieldGroup::Closure => {
                patch.implemented_solution = None;
                patch.closure_notes = None;
            }
        }
    }

    fn apply(&mut self, patch: &ProblemPatch) {
        if let Some(v) = &patch.title {
            self.title = v.clone();
        }
        if let Some(v) = &patch.description {
            self.description = v.clone();
        }
        if let Some(v) = &patch.problem_area {
            self.problem_area = v.clone();
        }
        if let Some(v) = patch.category {
            self.category = v;
        }
        if let Some(v) = patch.priority {
            self.priority = v;
        }
        if let Some(v) = &patch.cause {
            self.cause = v.clone();
        }
        if let Some(v) = patch.reporter_id {
            self.reporter_id = v;
        }
        if let Some(v) = patch.assigned_id {
            self.assigned_id = Some(v);
        }
        if let Some(v) = &patch.implemented_solution {
            self.implemented_solution = Some(v.clone());
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

    fn validate_create(req: &CreateProblem) -> Result<()> {
        if req.title.trim().is_empty() {
            return Err(TicketError::bad_request("title is required"));
        }
        if req.description.trim().is_empty() {
            return Err(TicketError::bad_request("description is required"));
        }
        if req.cause.trim().is_empty() {
            return Err(TicketError::bad_request("cause is required"));
        }
        Ok(())
    }

    fn create_originator(req: &CreateProblem) -> Option<UserId> {
        req.reporter_id
    }

    fn create_assignee(req: &CreateProblem) -> Option<UserId> {
        req.assigned_id
    }

    fn build(
        req: CreateProblem,
        originator: UserId,
        area_default: Option<&str>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: 0,
            title: req.title,
            description: req.description,
            problem_area: req
                .problem_area
                .unwrap_or_else(|| area_default.unwrap_or_default().to_string()),
            category: req.category,
            priority: req.priority,
            status: Pending,
            cause: req.cause,
            reporter_id: originator,
            assigned_id: None,
            implemented_solution: None,
            report_date: now,
            assigned_date: None,
            resolution_date: None,
            close_date: None,
            closure_notes: None,
        }
    }
}
