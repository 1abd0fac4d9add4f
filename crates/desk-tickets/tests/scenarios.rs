//! End-to-end lifecycle scenarios across the four record kinds, wired the
//! way a deployment would wire them: in-memory store and directory, a
//! recording sink, and cross-kind reference lookup between incidents and
//! problems.

use desk_common::{InMemoryDirectory, Principal, RecordingSink, Role, User};
use desk_tickets::{
    ChangeRequestPatch, ChangeRequestService, ChangeStatus, CreateChangeRequest, CreateIncident,
    CreateProblem, CreateServiceRequest, IncidentPatch, IncidentService, IncidentStatus,
    InMemoryStore, ProblemService, RequestStatus, ServiceRequestPatch, ServiceRequestService,
    TicketError,
};
use std::sync::Arc;

const ADMIN: Principal = Principal { id: 1, role: Role::Admin };
const REPORTER: Principal = Principal { id: 5, role: Role::User };
const AGENT: Principal = Principal { id: 7, role: Role::Agent };
const APPROVER: Principal = Principal { id: 8, role: Role::Agent };

fn directory() -> Arc<InMemoryDirectory> {
    let directory = InMemoryDirectory::new();
    directory.insert(User::new(1, "root@example.com", "Root", Role::Admin));
    directory.insert(
        User::new(5, "dana@example.com", "Dana", Role::User).with_department("Accounting"),
    );
    directory.insert(User::new(7, "gil@example.com", "Gil", Role::Agent));
    directory.insert(User::new(8, "noa@example.com", "Noa", Role::Agent));
    Arc::new(directory)
}

#[tokio::test]
async fn incident_lifecycle_from_report_to_resolution() {
    let sink = Arc::new(RecordingSink::new());
    let service = IncidentService::new(Arc::new(InMemoryStore::new()), directory(), sink.clone());

    let mut req = CreateIncident::new("Printer down", "Lobby printer jams on every job", "Lobby");
    req.priority = desk_tickets::Priority::High;
    req.reporter_id = Some(REPORTER.id);
    let incident = service.create(&ADMIN, req).await.unwrap();
    assert_eq!(incident.status, IncidentStatus::Pending);
    assert_eq!(incident.reporter_id, REPORTER.id);
    assert!(incident.assigned_id.is_none());

    // An agent with no relationship to the record cannot touch it.
    let err = service
        .update(
            &AGENT,
            incident.id,
            IncidentPatch { status: Some(IncidentStatus::Resolved), ..Default::default() },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, TicketError::Forbidden));

    // Admin assigns the agent; assignment forces in_progress and stamps
    // the assignment date.
    let assigned = service
        .update(
            &ADMIN,
            incident.id,
            IncidentPatch { assigned_id: Some(AGENT.id), ..Default::default() },
        )
        .await
        .unwrap();
    assert_eq!(assigned.status, IncidentStatus::InProgress);
    assert!(assigned.assigned_date.is_some());

    // Now the assignee resolves it; both outcome dates stamp once.
    let resolved = service
        .update(
            &AGENT,
            incident.id,
            IncidentPatch {
                status: Some(IncidentStatus::Resolved),
                closure_notes: Some("Cleared the paper path, test page fine".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(resolved.status, IncidentStatus::Resolved);
    assert!(resolved.resolution_date.is_some());
    assert!(resolved.close_date.is_some());

    // Resubmitting the same terminal status is a no-op, not an error, and
    // leaves the original timestamps untouched.
    let again = service
        .update(
            &AGENT,
            incident.id,
            IncidentPatch { status: Some(IncidentStatus::Resolved), ..Default::default() },
        )
        .await
        .unwrap();
    assert_eq!(again.resolution_date, resolved.resolution_date);
    assert_eq!(again.close_date, resolved.close_date);

    assert!(sink.events().iter().all(|e| e.name() == "incident_changed"));
}

#[tokio::test]
async fn incident_relates_to_existing_problem_only() {
    let problem_store: Arc<InMemoryStore<desk_tickets::Problem>> = Arc::new(InMemoryStore::new());
    let problems = ProblemService::new(
        problem_store.clone(),
        directory(),
        Arc::new(RecordingSink::new()),
    );
    let incidents = IncidentService::new(
        Arc::new(InMemoryStore::new()),
        directory(),
        Arc::new(RecordingSink::new()),
    )
    .with_related(problem_store);

    let problem = problems
        .create(
            &ADMIN,
            CreateProblem::new("Nightly outage", "Core switch reboots at 02:00", "Failing PSU"),
        )
        .await
        .unwrap();

    let mut linked = CreateIncident::new("Network drop", "Wifi down since 02:05", "Floor 2");
    linked.related_problem_id = Some(problem.id);
    assert!(incidents.create(&ADMIN, linked).await.is_ok());

    let mut dangling = CreateIncident::new("Network drop", "Wifi down since 02:05", "Floor 2");
    dangling.related_problem_id = Some(9999);
    let err = incidents.create(&ADMIN, dangling).await.unwrap_err();
    assert!(matches!(err, TicketError::BadRequest(_)));
}

#[tokio::test]
async fn change_request_moves_through_the_approval_pipeline() {
    let service = ChangeRequestService::new(
        Arc::new(InMemoryStore::new()),
        directory(),
        Arc::new(RecordingSink::new()),
    );

    let mut req = CreateChangeRequest::new(
        "Upgrade mail server",
        "Move to the new release before support ends",
        "Upgrade in place during the Saturday window",
        "Restore the Friday snapshot",
    );
    req.requester_id = Some(REPORTER.id);
    req.assigned_id = Some(AGENT.id);
    req.approver_id = Some(APPROVER.id);
    let change = service.create(&ADMIN, req).await.unwrap();
    assert_eq!(change.status, ChangeStatus::Requested);
    assert!(change.approved_date.is_none());

    // Only the approver drives requested -> approved; the assignee's
    // attempt is dropped without failing the request.
    let still_requested = service
        .update(
            &AGENT,
            change.id,
            ChangeRequestPatch { status: Some(ChangeStatus::Approved), ..Default::default() },
        )
        .await
        .unwrap();
    assert_eq!(still_requested.status, ChangeStatus::Requested);

    let approved = service
        .update(
            &APPROVER,
            change.id,
            ChangeRequestPatch { status: Some(ChangeStatus::Approved), ..Default::default() },
        )
        .await
        .unwrap();
    assert_eq!(approved.status, ChangeStatus::Approved);
    assert!(approved.approved_date.is_some());

    // No shortcut existed from requested into implementation; from
    // approved the assignee takes over.
    let implementing = service
        .update(
            &AGENT,
            change.id,
            ChangeRequestPatch { status: Some(ChangeStatus::Implementation), ..Default::default() },
        )
        .await
        .unwrap();
    assert_eq!(implementing.status, ChangeStatus::Implementation);
    assert!(implementing.implementation_date.is_some());

    let completed = service
        .update(
            &AGENT,
            change.id,
            ChangeRequestPatch {
                status: Some(ChangeStatus::Completed),
                closure_notes: Some("Upgraded, mail flow verified".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(completed.status, ChangeStatus::Completed);
    assert!(completed.completed_date.is_some());
    assert_eq!(completed.closure_notes.as_deref(), Some("Upgraded, mail flow verified"));
}

#[tokio::test]
async fn change_request_rejects_unreachable_status_for_everyone() {
    let service = ChangeRequestService::new(
        Arc::new(InMemoryStore::new()),
        directory(),
        Arc::new(RecordingSink::new()),
    );
    let change = service
        .create(
            &ADMIN,
            CreateChangeRequest::new(
                "Swap core router",
                "Hardware refresh",
                "Staged swap with dual uplinks",
                "Re-rack the old unit",
            ),
        )
        .await
        .unwrap();

    // requested -> implementation is not an edge; even the admin gets a
    // hard failure rather than a silent drop.
    let err = service
        .update(
            &ADMIN,
            change.id,
            ChangeRequestPatch { status: Some(ChangeStatus::Implementation), ..Default::default() },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, TicketError::BadRequest(_)));
}

#[tokio::test]
async fn requester_can_withdraw_a_pending_change() {
    let service = ChangeRequestService::new(
        Arc::new(InMemoryStore::new()),
        directory(),
        Arc::new(RecordingSink::new()),
    );
    let mut req = CreateChangeRequest::new(
        "Retire legacy VPN",
        "Nobody uses it anymore",
        "Disable accounts, power off",
        "Power back on",
    );
    req.requester_id = Some(REPORTER.id);
    let change = service.create(&ADMIN, req).await.unwrap();

    let withdrawn = service
        .update(
            &REPORTER,
            change.id,
            ChangeRequestPatch { status: Some(ChangeStatus::Rejected), ..Default::default() },
        )
        .await
        .unwrap();
    assert_eq!(withdrawn.status, ChangeStatus::Rejected);
    assert!(withdrawn.completed_date.is_some());
}

#[tokio::test]
async fn service_request_flow_with_receiver() {
    let service = ServiceRequestService::new(
        Arc::new(InMemoryStore::new()),
        directory(),
        Arc::new(RecordingSink::new()),
    );

    // End-user creates their own request; origin area falls back to the
    // requester's department.
    let request = service
        .create(
            &REPORTER,
            CreateServiceRequest::new("New desk phone", "Extension for the new hire"),
        )
        .await
        .unwrap();
    assert_eq!(request.status, RequestStatus::Pending);
    assert_eq!(request.requester_id, REPORTER.id);
    assert_eq!(request.origin_area, "Accounting");

    // Assigning a receiver forces the assigned status.
    let assigned = service
        .update(
            &ADMIN,
            request.id,
            ServiceRequestPatch { receiver_id: Some(AGENT.id), ..Default::default() },
        )
        .await
        .unwrap();
    assert_eq!(assigned.status, RequestStatus::Assigned);
    assert!(assigned.assigned_date.is_some());

    let done = service
        .update(
            &AGENT,
            request.id,
            ServiceRequestPatch {
                status: Some(RequestStatus::Completed),
                post_comments: Some("Phone provisioned and tested".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(done.status, RequestStatus::Completed);
    assert!(done.completed_date.is_some());
    assert_eq!(done.post_comments.as_deref(), Some("Phone provisioned and tested"));

    // Terminal records are frozen for everyone.
    let err = service
        .update(
            &ADMIN,
            request.id,
            ServiceRequestPatch { status: Some(RequestStatus::Pending), ..Default::default() },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, TicketError::BadRequest(_)));
}

#[tokio::test]
async fn self_assigned_agent_drives_their_own_incident() {
    let service = IncidentService::new(
        Arc::new(InMemoryStore::new()),
        directory(),
        Arc::new(RecordingSink::new()),
    );

    // Agent reports their own incident and later gets assigned to it.
    let incident = service
        .create(&AGENT, CreateIncident::new("Console flaky", "Admin console times out", "Ops"))
        .await
        .unwrap();
    assert_eq!(incident.reporter_id, AGENT.id);

    let assigned = service
        .update(
            &ADMIN,
            incident.id,
            IncidentPatch { assigned_id: Some(AGENT.id), ..Default::default() },
        )
        .await
        .unwrap();
    assert_eq!(assigned.status, IncidentStatus::InProgress);

    // Self-assigned closure writing waits for a terminal status; until then
    // the notes are dropped, not rejected.
    let early = service
        .update(
            &AGENT,
            incident.id,
            IncidentPatch { closure_notes: Some("not done yet".into()), ..Default::default() },
        )
        .await
        .unwrap();
    assert!(early.closure_notes.is_none());

    // But the self-assigned reporter does drive the assignee edge, and the
    // closure notes land together with the terminal status.
    let resolved = service
        .update(
            &AGENT,
            incident.id,
            IncidentPatch {
                status: Some(IncidentStatus::Resolved),
                closure_notes: Some("Raised the session timeout".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(resolved.status, IncidentStatus::Resolved);
    assert_eq!(resolved.closure_notes.as_deref(), Some("Raised the session timeout"));
    assert!(resolved.resolution_date.is_some());
}

#[tokio::test]
async fn non_admin_cannot_reassign_the_originator() {
    let service = IncidentService::new(
        Arc::new(InMemoryStore::new()),
        directory(),
        Arc::new(RecordingSink::new()),
    );
    let incident = service
        .create(&REPORTER, CreateIncident::new("Screen cracked", "Dropped the laptop", "Desk 2"))
        .await
        .unwrap();

    // The reporter's attempt to hand the ticket to someone else is ignored;
    // the rest of their patch still applies.
    let updated = service
        .update(
            &REPORTER,
            incident.id,
            IncidentPatch {
                reporter_id: Some(AGENT.id),
                description: Some("Dropped the laptop on the stairs".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.reporter_id, REPORTER.id);
    assert_eq!(updated.description, "Dropped the laptop on the stairs");

    // Same for an acting assignee.
    service
        .update(
            &ADMIN,
            incident.id,
            IncidentPatch { assigned_id: Some(AGENT.id), ..Default::default() },
        )
        .await
        .unwrap();
    let after = service
        .update(
            &AGENT,
            incident.id,
            IncidentPatch { reporter_id: Some(AGENT.id), ..Default::default() },
        )
        .await
        .unwrap();
    assert_eq!(after.reporter_id, REPORTER.id);

    // Admin may correct it, and the new originator must be a real user.
    let corrected = service
        .update(
            &ADMIN,
            incident.id,
            IncidentPatch { reporter_id: Some(APPROVER.id), ..Default::default() },
        )
        .await
        .unwrap();
    assert_eq!(corrected.reporter_id, APPROVER.id);
    let err = service
        .update(
            &ADMIN,
            incident.id,
            IncidentPatch { reporter_id: Some(9999), ..Default::default() },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, TicketError::BadRequest(_)));
}

#[tokio::test]
async fn end_users_only_see_their_own_records() {
    let service = IncidentService::new(
        Arc::new(InMemoryStore::new()),
        directory(),
        Arc::new(RecordingSink::new()),
    );
    let mine = service
        .create(&REPORTER, CreateIncident::new("Slow laptop", "Boot takes ten minutes", "Desk 9"))
        .await
        .unwrap();
    let mut theirs = CreateIncident::new("Badge reader", "Door 3 reader dead", "Entrance");
    theirs.reporter_id = Some(AGENT.id);
    service.create(&ADMIN, theirs).await.unwrap();

    let visible = service.list(&REPORTER).await.unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, mine.id);
    assert_eq!(service.list(&AGENT).await.unwrap().len(), 2);
}
