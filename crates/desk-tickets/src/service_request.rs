//! Service requests: routine work routed between areas

use crate::descriptor::{
    ActorClass::{Assignee, Originator, SelfAssigned},
    FieldGroup, KindDescriptor, StampRule, TimestampSlot, Transition,
};
use crate::error::{Result, TicketError};
use crate::kind::TicketKind;
use crate::model::Priority;
use chrono::{DateTime, Utc};
use desk_common::UserId;
use serde::{Deserialize, Serialize};

use self::RequestStatus::{Assigned, Canceled, Completed, InProgress, Pending};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    Pending,
    Assigned,
    InProgress,
    Completed,
    Canceled,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub origin_area: String,
    pub destination_area: Option<String>,
    pub priority: Priority,
    pub status: RequestStatus,
    pub requester_id: UserId,
    /// Receiver fills the assignee slot for this kind.
    pub receiver_id: Option<UserId>,
    pub request_date: DateTime<Utc>,
    pub assigned_date: Option<DateTime<Utc>>,
    pub completed_date: Option<DateTime<Utc>>,
    pub post_comments: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ServiceRequestPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub origin_area: Option<String>,
    pub destination_area: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<RequestStatus>,
    pub requester_id: Option<UserId>,
    pub receiver_id: Option<UserId>,
    pub post_comments: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CreateServiceRequest {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub origin_area: Option<String>,
    #[serde(default)]
    pub destination_area: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub requester_id: Option<UserId>,
    #[serde(default)]
    pub receiver_id: Option<UserId>,
    #[serde(default)]
    pub status: Option<RequestStatus>,
}

impl CreateServiceRequest {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            origin_area: None,
            destination_area: None,
            priority: Priority::default(),
            requester_id: None,
            receiver_id: None,
            status: None,
        }
    }
}

static DESCRIPTOR: KindDescriptor<RequestStatus> = KindDescriptor {
    kind: "service_request",
    initial: Pending,
    terminal: &[Completed, Canceled],
    closure_editable: &[Completed, Canceled],
    transitions: &[
        Transition { from: Pending, to: Assigned, actors: &[] },
        Transition { from: Pending, to: Completed, actors: &[Originator, SelfAssigned] },
        Transition { from: Pending, to: Canceled, actors: &[Originator, SelfAssigned] },
        Transition { from: Assigned, to: InProgress, actors: &[Assignee, SelfAssigned] },
        Transition { from: Assigned, to: Completed, actors: &[Assignee, SelfAssigned] },
        Transition { from: Assigned, to: Canceled, actors: &[Assignee, SelfAssigned] },
        Transition { from: InProgress, to: Completed, actors: &[Assignee, SelfAssigned] },
        Transition { from: InProgress, to: Canceled, actors: &[Assignee, SelfAssigned] },
    ],
    stamps: &[StampRule { on: &[Completed, Canceled], slot: TimestampSlot::Completed }],
    on_first_assign: Some(Assigned),
};

impl TicketKind for ServiceRequest {
    type Status = RequestStatus;
    type Patch = ServiceRequestPatch;
    type Create = CreateServiceRequest;

    fn descriptor() -> &'static KindDescriptor<RequestStatus> {
        &DESCRIPTOR
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn status(&self) -> RequestStatus {
        self.status
    }

    fn set_status(&mut self, status: RequestStatus) {
        self.status = status;
    }

    fn originator(&self) -> UserId {
        self.requester_id
    }

    fn assignee(&self) -> Option<UserId> {
        self.receiver_id
    }

    fn set_assignee(&mut self, user: UserId) {
        self.receiver_id = Some(user);
    }

    fn patch_status(patch: &ServiceRequestPatch) -> Option<RequestStatus> {
        patch.status
    }

    fn patch_originator(patch: &ServiceRequestPatch) -> Option<UserId> {
        patch.requester_id
    }

    fn patch_assignee(patch: &ServiceRequestPatch) -> Option<UserId> {
        patch.receiver_id
    }

    fn strip_group(patch: &mut ServiceRequestPatch, group: FieldGroup) {
        match group {
            FieldGroup::Identity => {
                patch.requester_id = None;
            }
            FieldGroup::General => {
                patch.title = None;
                patch.description = None;
                patch.origin_area = None;
                patch.destination_area = None;
                patch.priority = None;
            }
            FieldGroup::Relationship => {
                patch.receiver_id = None;
            }
            FieldGroup::Status => {
                patch.status = None;
            }
            FieldGroup::Closure => {
                patch.post_comments = None;
            }
        }
    }

    fn apply(&mut self, patch: &ServiceRequestPatch) {
        if let Some(v) = &patch.title {
            self.title = v.clone();
        }
        if let Some(v) = &patch.description {
            self.description = v.clone();
        }
        if let Some(v) = &patch.origin_area {
            self.origin_area = v.clone();
        }
        if let Some(v) = &patch.destination_area {
            self.destination_area = Some(v.clone());
        }
        if let Some(v) = patch.priority {
            self.priority = v;
        }
        if let Some(v) = patch.requester_id {
            self.requester_id = v;
        }
        if let Some(v) = patch.receiver_id {
            self.receiver_id = Some(v);
        }
        if let Some(v) = &patch.post_comments {
            self.post_comments = Some(v.clone());
        }
    }

    fn stamp(&mut self, slot: TimestampSlot, at: DateTime<Utc>) {
        let field = match slot {
            TimestampSlot::Assigned => &mut self.assigned_date,
            TimestampSlot::Completed => &mut self.completed_date,
            _ => return,
        };
        if field.is_none() {
            *field = Some(at);
        }
    }

    fn validate_create(req: &CreateServiceRequest) -> Result<()> {
        if req.title.trim().is_empty() {
            return Err(TicketError::bad_request("title is required"));
        }
        if req.description.trim().is_empty() {
            return Err(TicketError::bad_request("description is required"));
        }
        Ok(())
    }

    fn create_originator(req: &CreateServiceRequest) -> Option<UserId> {
        req.requester_id
    }

    fn create_assignee(req: &CreateServiceRequest) -> Option<UserId> {
        req.receiver_id
    }

    fn build(
        req: CreateServiceRequest,
        originator: UserId,
        area_default: Option<&str>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: 0,
            title: req.title,
            description: req.description,
            origin_area: req
                .origin_area
                .unwrap_or_else(|| area_default.unwrap_or_default().to_string()),
            destination_area: req.destination_area,
            priority: req.priority,
            status: Pending,
            requester_id: originator,
            receiver_id: None,
            request_date: now,
            assigned_date: None,
            completed_date: None,
            post_comments: None,
        }
    }
}
