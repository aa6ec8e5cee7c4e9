use chrono::Utc;
use clubhouse_common::models::{
    ApplicationFilter, ApplicationSortField, ApplicationStatus, SubmitApplicationRequest, User,
    UserRole,
};
use clubhouse_common::pagination::{PageWindow, SortOrder};
use clubhouse_membership::{MembershipError, MembershipService, MemoryStore};
use uuid::Uuid;

fn department() -> Uuid {
    Uuid::from_u128(0xd1)
}

fn session() -> Uuid {
    Uuid::from_u128(0x5e1)
}

fn guest(email: &str) -> User {
    let now = Utc::now();
    User {
        id: Uuid::now_v7(),
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        email: email.into(),
        password_hash: "x".into(),
        phone: None,
        role: UserRole::Guest,
        is_active: true,
        is_verified: true,
        is_deleted: false,
        deleted_at: None,
        created_at: now,
        updated_at: now,
    }
}

fn submission(student_id: &str) -> SubmitApplicationRequest {
    SubmitApplicationRequest {
        student_id: student_id.into(),
        department_id: department(),
        session_id: session(),
        learning_track_id: None,
        phone_number: Some("01700000000".into()),
        profile_image: None,
        motivation: Some("I like compilers".into()),
        interested_areas: vec!["rust".into()],
    }
}

async fn setup() -> (MembershipService<MemoryStore>, MemoryStore, User) {
    let store = MemoryStore::new();
    let user = guest("ada@example.com");
    store.put_user(user.clone()).await;
    (MembershipService::new(store.clone()), store, user)
}

#[tokio::test]
async fn test_scenario_submit_then_approve() {
    let (svc, store, user) = setup().await;

    let application = svc.submit_application(user.id, submission("S1")).await.unwrap();
    assert_eq!(application.status, ApplicationStatus::Pending);
    assert_eq!(store.user(user.id).await.unwrap().role, UserRole::Guest);

    let approved = svc.approve_application(application.id).await.unwrap();
    assert_eq!(approved.status, ApplicationStatus::Approved);
    assert!(approved.reviewed_at.is_some());

    let promoted = store.user(user.id).await.unwrap();
    assert_eq!(promoted.role, UserRole::Member);
    assert_eq!(promoted.phone.as_deref(), Some("01700000000"));

    let members = store.members_of(user.id).await;
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].student_id, "S1");
    assert_eq!(members[0].department_id, department());
}

#[tokio::test]
async fn test_scenario_reject_then_resubmit() {
    let (svc, store, user) = setup().await;

    let first = svc.submit_application(user.id, submission("S1")).await.unwrap();
    let rejected = svc
        .reject_application(first.id, "  Incomplete info ")
        .await
        .unwrap();
    assert_eq!(rejected.status, ApplicationStatus::Rejected);
    assert_eq!(rejected.review_comment.as_deref(), Some("Incomplete info"));
    assert!(rejected.reviewed_at.is_some());

    let mut second = submission("S2");
    second.session_id = Uuid::from_u128(0x5e2);
    let resubmitted = svc.submit_application(user.id, second).await.unwrap();

    assert_eq!(resubmitted.id, first.id);
    assert_eq!(resubmitted.status, ApplicationStatus::Pending);
    assert_eq!(resubmitted.student_id, "S2");
    assert_eq!(resubmitted.session_id, Uuid::from_u128(0x5e2));
    assert!(resubmitted.review_comment.is_none());
    assert!(resubmitted.reviewed_at.is_none());
    assert_eq!(resubmitted.created_at, first.created_at);

    assert_eq!(store.application(first.id).await.unwrap(), resubmitted);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_scenario_concurrent_approvals() {
    let (svc, store, user) = setup().await;
    let application = svc.submit_application(user.id, submission("S1")).await.unwrap();

    let a = tokio::spawn({
        let svc = svc.clone();
        async move { svc.approve_application(application.id).await }
    });
    let b = tokio::spawn({
        let svc = svc.clone();
        async move { svc.approve_application(application.id).await }
    });
    let results = [a.await.unwrap(), b.await.unwrap()];

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    let loser = results.into_iter().find_map(Result::err).unwrap();
    assert!(matches!(
        loser,
        MembershipError::AlreadyReviewed | MembershipError::DuplicateMember
    ));
    assert_eq!(store.members_of(user.id).await.len(), 1);
}

#[tokio::test]
async fn test_one_application_row_per_user() {
    let (svc, store, user) = setup().await;

    for round in 0..4 {
        let application = svc
            .submit_application(user.id, submission(&format!("S{round}")))
            .await
            .unwrap();
        assert!(matches!(
            svc.submit_application(user.id, submission("dup")).await,
            Err(MembershipError::AlreadyPending)
        ));
        svc.reject_application(application.id, "try again").await.unwrap();
        assert_eq!(store.applications_of(user.id).await.len(), 1);
    }
}

#[tokio::test]
async fn test_approve_twice_creates_one_member() {
    let (svc, store, user) = setup().await;
    let application = svc.submit_application(user.id, submission("S1")).await.unwrap();

    svc.approve_application(application.id).await.unwrap();
    let second = svc.approve_application(application.id).await;

    assert!(matches!(second, Err(MembershipError::AlreadyReviewed)));
    assert_eq!(store.members_of(user.id).await.len(), 1);
}

#[tokio::test]
async fn test_failed_member_insert_rolls_back() {
    let (svc, store, user) = setup().await;
    let application = svc.submit_application(user.id, submission("S1")).await.unwrap();

    store.fail_member_inserts(true);
    let result = svc.approve_application(application.id).await;
    assert!(matches!(result, Err(MembershipError::Store(_))));

    assert_eq!(store.user(user.id).await.unwrap().role, UserRole::Guest);
    let untouched = store.application(application.id).await.unwrap();
    assert_eq!(untouched.status, ApplicationStatus::Pending);
    assert!(untouched.reviewed_at.is_none());
    assert!(store.members_of(user.id).await.is_empty());

    store.fail_member_inserts(false);
    svc.approve_application(application.id).await.unwrap();
    assert_eq!(store.user(user.id).await.unwrap().role, UserRole::Member);
}

#[tokio::test]
async fn test_approved_application_cannot_be_resubmitted_or_rejected() {
    let (svc, _store, user) = setup().await;
    let application = svc.submit_application(user.id, submission("S1")).await.unwrap();
    svc.approve_application(application.id).await.unwrap();

    assert!(matches!(
        svc.submit_application(user.id, submission("S9")).await,
        Err(MembershipError::AlreadyApproved)
    ));
    assert!(matches!(
        svc.reject_application(application.id, "late").await,
        Err(MembershipError::AlreadyReviewed)
    ));
}

#[tokio::test]
async fn test_reject_requires_comment() {
    let (svc, store, user) = setup().await;
    let application = svc.submit_application(user.id, submission("S1")).await.unwrap();

    assert!(matches!(
        svc.reject_application(application.id, "   ").await,
        Err(MembershipError::Validation(_))
    ));
    assert_eq!(
        store.application(application.id).await.unwrap().status,
        ApplicationStatus::Pending
    );
}

#[tokio::test]
async fn test_unknown_ids_are_not_found() {
    let (svc, _store, _user) = setup().await;

    assert!(matches!(
        svc.submit_application(Uuid::now_v7(), submission("S1")).await,
        Err(MembershipError::NotFound("User"))
    ));
    assert!(matches!(
        svc.approve_application(Uuid::now_v7()).await,
        Err(MembershipError::NotFound("Application"))
    ));
    assert!(matches!(
        svc.reject_application(Uuid::now_v7(), "no").await,
        Err(MembershipError::NotFound("Application"))
    ));
}

#[tokio::test]
async fn test_submission_requires_verified_active_guest() {
    let store = MemoryStore::new();
    let svc = MembershipService::new(store.clone());

    let mut unverified = guest("u@example.com");
    unverified.is_verified = false;
    let mut deleted = guest("d@example.com");
    deleted.is_deleted = true;
    let mut mentor = guest("m@example.com");
    mentor.role = UserRole::Mentor;
    for user in [&unverified, &deleted, &mentor] {
        store.put_user(user.clone()).await;
    }

    assert!(matches!(
        svc.submit_application(unverified.id, submission("S1")).await,
        Err(MembershipError::Validation(_))
    ));
    assert!(matches!(
        svc.submit_application(deleted.id, submission("S1")).await,
        Err(MembershipError::NotFound(_))
    ));
    assert!(matches!(
        svc.submit_application(mentor.id, submission("S1")).await,
        Err(MembershipError::Validation(_))
    ));
    assert!(matches!(
        svc.submit_application(mentor.id, submission("   ")).await,
        Err(MembershipError::Validation(_))
    ));
}

#[tokio::test]
async fn test_my_application() {
    let (svc, _store, user) = setup().await;
    assert!(matches!(
        svc.my_application(user.id).await,
        Err(MembershipError::NotFound(_))
    ));

    let application = svc.submit_application(user.id, submission("S1")).await.unwrap();
    assert_eq!(svc.my_application(user.id).await.unwrap().id, application.id);
}

#[tokio::test]
async fn test_list_applications_filters_and_paginates() {
    let store = MemoryStore::new();
    let svc = MembershipService::new(store.clone());

    let mut ids = Vec::new();
    for (i, email) in ["a@example.com", "b@example.com", "c@example.com"].iter().enumerate() {
        let mut user = guest(email);
        user.first_name = format!("User{i}");
        store.put_user(user.clone()).await;
        let app = svc
            .submit_application(user.id, submission(&format!("S{i}")))
            .await
            .unwrap();
        ids.push(app.id);
    }
    svc.reject_application(ids[1], "missing info").await.unwrap();

    let pending = ApplicationFilter {
        status: Some(ApplicationStatus::Pending),
        ..Default::default()
    };
    let page = svc.list_applications(&pending, &PageWindow::default()).await.unwrap();
    assert_eq!(page.meta.total, 2);
    assert!(page.data.iter().all(|row| row.application.status == ApplicationStatus::Pending));

    let search = ApplicationFilter {
        search: Some("B@EXAMPLE".into()),
        ..Default::default()
    };
    let page = svc.list_applications(&search, &PageWindow::default()).await.unwrap();
    assert_eq!(page.meta.total, 1);
    assert_eq!(page.data[0].applicant_email, "b@example.com");

    let by_student = ApplicationFilter {
        sort_by: ApplicationSortField::StudentId,
        ..Default::default()
    };
    let window = PageWindow {
        page: 2,
        limit: 2,
        sort_order: SortOrder::Asc,
    };
    let page = svc.list_applications(&by_student, &window).await.unwrap();
    assert_eq!(page.meta.total, 3);
    assert_eq!(page.meta.total_pages, 2);
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].application.student_id, "S2");
}
