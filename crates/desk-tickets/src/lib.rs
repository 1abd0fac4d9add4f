//! Ticket lifecycle and authorization engine for the service desk portal
//!
//! Four record kinds share one rule engine. Each kind declares its
//! lifecycle as data (a [`KindDescriptor`]: transition graph, actor gates,
//! terminal and closure-editable sets, timestamp rules) and the generic
//! [`AuthorizationEngine`] interprets it: resolving the caller's
//! relationships to the record, silently dropping the parts of a change
//! the caller may not make, rejecting the ones nobody may make, and
//! applying assignment and stamping side effects.
//!
//! Storage, user lookup and change notification are injected ports so the
//! engine runs identically against the in-memory backends used in tests
//! and whatever the deployment wires in.

pub mod change;
pub mod descriptor;
pub mod engine;
pub mod error;
pub mod incident;
pub mod kind;
pub mod model;
pub mod problem;
pub mod relationship;
pub mod service_request;
pub mod store;

pub use change::{ChangeRequest, ChangeRequestPatch, ChangeStatus, CreateChangeRequest};
pub use descriptor::{ActorClass, FieldGroup, KindDescriptor, StampRule, TimestampSlot, Transition};
pub use engine::{AuthorizationEngine, RelatedLookup};
pub use error::{Result, TicketError};
pub use incident::{CreateIncident, Incident, IncidentPatch, IncidentStatus};
pub use kind::TicketKind;
pub use model::{Category, ChangeType, Priority, RelatedDevice};
pub use problem::{CreateProblem, Problem, ProblemPatch, ProblemStatus};
pub use relationship::{resolve, RelationSet};
pub use service_request::{
    CreateServiceRequest, RequestStatus, ServiceRequest, ServiceRequestPatch,
};
pub use store::{InMemoryStore, RecordStore, StoreError, StoreResult};

/// Incident service: the engine specialized to [`Incident`].
pub type IncidentService = AuthorizationEngine<Incident>;
/// Problem service: the engine specialized to [`Problem`].
pub type ProblemService = AuthorizationEngine<Problem>;
/// Change request service: the engine specialized to [`ChangeRequest`].
pub type ChangeRequestService = AuthorizationEngine<ChangeRequest>;
/// Service request service: the engine specialized to [`ServiceRequest`].
pub type ServiceRequestService = AuthorizationEngine<ServiceRequest>;
