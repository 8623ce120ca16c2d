mod common;

use bonafide_backend::dto::bonafide_dto::{CreateBonafideRequest, UpdateBonafideRequest};
use bonafide_backend::model::bonafide_request::RequestStatus;
use bonafide_backend::model::user::UserRole;
use bonafide_backend::repository::bonafide_repo::BonafideRepository;
use bonafide_backend::service::bonafide_service::BonafideService;
use bonafide_backend::util::error::ServiceError;
use bonafide_backend::util::jwt::JwtTokenUtils;
use bson::oid::ObjectId;
use chrono::{DateTime, Duration, Utc};

fn create_dto() -> CreateBonafideRequest {
    serde_json::from_value(common::sample_request_body()).unwrap()
}

fn claims_for(env: &common::TestEnv, user: &bonafide_backend::model::user::User)
    -> bonafide_backend::util::jwt::Claims
{
    let token = env.access_token_for(user);
    env.jwt_utils.validate_access_token(&token).unwrap()
}

#[tokio::test]
async fn test_submit_creates_pending_request_for_owner() {
    let env = common::setup();
    let owner = env
        .register_user("Ravi Kumar", "ravi@example.com", UserRole::User)
        .await;

    let request = env
        .bonafide_service
        .submit(owner.id.unwrap(), create_dto())
        .await
        .unwrap();

    assert_eq!(request.status, RequestStatus::Pending);
    assert_eq!(request.user_id, owner.id.unwrap());
    assert_eq!(request.admin_notes, "");
    assert!(request.approved_by.is_none());
    assert!(request.approved_at.is_none());
    assert!(!request.pdf_generated);
    assert_eq!(request.version, 1);
}

#[tokio::test]
async fn test_submit_trims_string_fields() {
    let env = common::setup();
    let owner = env
        .register_user("Ravi Kumar", "ravi@example.com", UserRole::User)
        .await;

    let mut dto = create_dto();
    dto.student_name = "  Ravi Kumar  ".to_string();
    dto.conduct = " Good ".to_string();
    let request = env
        .bonafide_service
        .submit(owner.id.unwrap(), dto)
        .await
        .unwrap();
    assert_eq!(request.student_name, "Ravi Kumar");
    assert_eq!(request.conduct, "Good");
}

#[tokio::test]
async fn test_approve_stamps_admin_and_time() {
    let env = common::setup();
    let owner = env
        .register_user("Ravi Kumar", "ravi@example.com", UserRole::User)
        .await;
    let admin = env
        .register_user("Admin", "admin@example.com", UserRole::Admin)
        .await;

    let request = env
        .bonafide_service
        .submit(owner.id.unwrap(), create_dto())
        .await
        .unwrap();

    let before = Utc::now() - Duration::seconds(1);
    let approved = env
        .bonafide_service
        .approve(request.id.unwrap(), admin.id.unwrap(), "verified".to_string())
        .await
        .unwrap();

    assert_eq!(approved.status, RequestStatus::Approved);
    assert_eq!(approved.approved_by, Some(admin.id.unwrap()));
    assert_eq!(approved.admin_notes, "verified");
    let approved_at: DateTime<Utc> = DateTime::parse_from_rfc3339(
        approved.approved_at.as_deref().unwrap(),
    )
    .unwrap()
    .with_timezone(&Utc);
    assert!(approved_at >= before);
}

#[tokio::test]
async fn test_reject_stamps_admin_and_time() {
    let env = common::setup();
    let owner = env
        .register_user("Ravi Kumar", "ravi@example.com", UserRole::User)
        .await;
    let admin = env
        .register_user("Admin", "admin@example.com", UserRole::Admin)
        .await;

    let request = env
        .bonafide_service
        .submit(owner.id.unwrap(), create_dto())
        .await
        .unwrap();

    let rejected = env
        .bonafide_service
        .reject(request.id.unwrap(), admin.id.unwrap(), String::new())
        .await
        .unwrap();

    assert_eq!(rejected.status, RequestStatus::Rejected);
    assert_eq!(rejected.approved_by, Some(admin.id.unwrap()));
    // Reject stamps the decision time exactly like approve.
    assert!(rejected.approved_at.is_some());
    assert_eq!(rejected.admin_notes, "");
}

#[tokio::test]
async fn test_decisions_are_terminal() {
    let env = common::setup();
    let owner = env
        .register_user("Ravi Kumar", "ravi@example.com", UserRole::User)
        .await;
    let admin = env
        .register_user("Admin", "admin@example.com", UserRole::Admin)
        .await;

    let request = env
        .bonafide_service
        .submit(owner.id.unwrap(), create_dto())
        .await
        .unwrap();
    let id = request.id.unwrap();
    let admin_id = admin.id.unwrap();

    env.bonafide_service
        .approve(id, admin_id, "first".to_string())
        .await
        .unwrap();

    // A second decision of either kind loses the conditional write.
    let again = env
        .bonafide_service
        .reject(id, admin_id, "second".to_string())
        .await;
    assert!(matches!(again, Err(ServiceError::Conflict(_))));

    let current = env.request_repo.get_by_id(id).await.unwrap();
    assert_eq!(current.status, RequestStatus::Approved);
    assert_eq!(current.admin_notes, "first");
}

#[tokio::test]
async fn test_decide_missing_id_is_not_found() {
    let env = common::setup();
    let admin = env
        .register_user("Admin", "admin@example.com", UserRole::Admin)
        .await;

    let result = env
        .bonafide_service
        .approve(ObjectId::new(), admin.id.unwrap(), String::new())
        .await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn test_get_request_is_owner_or_admin_only() {
    let env = common::setup();
    let owner = env
        .register_user("Ravi Kumar", "ravi@example.com", UserRole::User)
        .await;
    let stranger = env
        .register_user("Sita Devi", "sita@example.com", UserRole::User)
        .await;
    let admin = env
        .register_user("Admin", "admin@example.com", UserRole::Admin)
        .await;

    let request = env
        .bonafide_service
        .submit(owner.id.unwrap(), create_dto())
        .await
        .unwrap();
    let id = request.id.unwrap();

    let own = env
        .bonafide_service
        .get_request(id, &claims_for(&env, &owner))
        .await;
    assert!(own.is_ok());

    let foreign = env
        .bonafide_service
        .get_request(id, &claims_for(&env, &stranger))
        .await;
    assert!(matches!(foreign, Err(ServiceError::Forbidden(_))));

    let as_admin = env
        .bonafide_service
        .get_request(id, &claims_for(&env, &admin))
        .await;
    assert!(as_admin.is_ok());
    // Admin view resolves the owner's display info.
    assert_eq!(
        as_admin.unwrap().user_info.unwrap().email,
        "ravi@example.com"
    );
}

#[tokio::test]
async fn test_get_request_missing_id_is_not_found() {
    let env = common::setup();
    let user = env
        .register_user("Ravi Kumar", "ravi@example.com", UserRole::User)
        .await;

    let result = env
        .bonafide_service
        .get_request(ObjectId::new(), &claims_for(&env, &user))
        .await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn test_my_requests_returns_only_own_with_approver_info() {
    let env = common::setup();
    let owner = env
        .register_user("Ravi Kumar", "ravi@example.com", UserRole::User)
        .await;
    let other = env
        .register_user("Sita Devi", "sita@example.com", UserRole::User)
        .await;
    let admin = env
        .register_user("Admin", "admin@example.com", UserRole::Admin)
        .await;

    let mine = env
        .bonafide_service
        .submit(owner.id.unwrap(), create_dto())
        .await
        .unwrap();
    env.bonafide_service
        .submit(other.id.unwrap(), create_dto())
        .await
        .unwrap();
    env.bonafide_service
        .approve(mine.id.unwrap(), admin.id.unwrap(), "ok".to_string())
        .await
        .unwrap();

    let views = env
        .bonafide_service
        .my_requests(owner.id.unwrap())
        .await
        .unwrap();
    assert_eq!(views.len(), 1);
    let view = &views[0];
    assert_eq!(view.request.user_id, owner.id.unwrap());
    assert_eq!(
        view.approver_info.as_ref().unwrap().email,
        "admin@example.com"
    );
}

#[tokio::test]
async fn test_all_requests_with_status_filter() {
    let env = common::setup();
    let owner = env
        .register_user("Ravi Kumar", "ravi@example.com", UserRole::User)
        .await;
    let admin = env
        .register_user("Admin", "admin@example.com", UserRole::Admin)
        .await;

    let first = env
        .bonafide_service
        .submit(owner.id.unwrap(), create_dto())
        .await
        .unwrap();
    env.bonafide_service
        .submit(owner.id.unwrap(), create_dto())
        .await
        .unwrap();
    env.bonafide_service
        .approve(first.id.unwrap(), admin.id.unwrap(), String::new())
        .await
        .unwrap();

    let all = env.bonafide_service.all_requests(None).await.unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|v| v.user_info.is_some()));

    let pending = env
        .bonafide_service
        .all_requests(Some(RequestStatus::Pending))
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].request.status, RequestStatus::Pending);

    let approved = env
        .bonafide_service
        .all_requests(Some(RequestStatus::Approved))
        .await
        .unwrap();
    assert_eq!(approved.len(), 1);
}

#[tokio::test]
async fn test_update_request_respects_version_and_ownership() {
    let env = common::setup();
    let owner = env
        .register_user("Ravi Kumar", "ravi@example.com", UserRole::User)
        .await;
    let stranger = env
        .register_user("Sita Devi", "sita@example.com", UserRole::User)
        .await;

    let request = env
        .bonafide_service
        .submit(owner.id.unwrap(), create_dto())
        .await
        .unwrap();
    let id = request.id.unwrap();

    let update = UpdateBonafideRequest {
        version: Some(request.version),
        purpose: Some("Scholarship".to_string()),
        student_name: None,
        roll_number: None,
        father_name: None,
        department: None,
        course: None,
        academic_year: None,
        date_of_birth: None,
        conduct: None,
        admin_notes: Some("sneaky note".to_string()),
    };

    // A non-owner cannot update at all.
    let foreign = env
        .bonafide_service
        .update_request(id, &claims_for(&env, &stranger), update.clone())
        .await;
    assert!(matches!(foreign, Err(ServiceError::Forbidden(_))));

    // The owner can, but admin notes are stripped from their payload.
    let updated = env
        .bonafide_service
        .update_request(id, &claims_for(&env, &owner), update.clone())
        .await
        .unwrap();
    assert_eq!(updated.purpose, "Scholarship");
    assert_eq!(updated.admin_notes, "");
    assert_eq!(updated.version, request.version + 1);

    // Replaying the same (now stale) version loses the optimistic check.
    let stale = env
        .bonafide_service
        .update_request(id, &claims_for(&env, &owner), update)
        .await;
    assert!(matches!(stale, Err(ServiceError::Conflict(_))));
}

#[tokio::test]
async fn test_update_after_decision_is_conflict_for_owner() {
    let env = common::setup();
    let owner = env
        .register_user("Ravi Kumar", "ravi@example.com", UserRole::User)
        .await;
    let admin = env
        .register_user("Admin", "admin@example.com", UserRole::Admin)
        .await;

    let request = env
        .bonafide_service
        .submit(owner.id.unwrap(), create_dto())
        .await
        .unwrap();
    let decided = env
        .bonafide_service
        .approve(request.id.unwrap(), admin.id.unwrap(), String::new())
        .await
        .unwrap();

    let update = UpdateBonafideRequest {
        version: Some(decided.version),
        purpose: Some("Too late".to_string()),
        student_name: None,
        roll_number: None,
        father_name: None,
        department: None,
        course: None,
        academic_year: None,
        date_of_birth: None,
        conduct: None,
        admin_notes: None,
    };
    let result = env
        .bonafide_service
        .update_request(request.id.unwrap(), &claims_for(&env, &owner), update)
        .await;
    assert!(matches!(result, Err(ServiceError::Conflict(_))));
}

#[tokio::test]
async fn test_delete_request_owner_or_admin() {
    let env = common::setup();
    let owner = env
        .register_user("Ravi Kumar", "ravi@example.com", UserRole::User)
        .await;
    let stranger = env
        .register_user("Sita Devi", "sita@example.com", UserRole::User)
        .await;
    let admin = env
        .register_user("Admin", "admin@example.com", UserRole::Admin)
        .await;

    let first = env
        .bonafide_service
        .submit(owner.id.unwrap(), create_dto())
        .await
        .unwrap();
    let second = env
        .bonafide_service
        .submit(owner.id.unwrap(), create_dto())
        .await
        .unwrap();

    let foreign = env
        .bonafide_service
        .delete_request(first.id.unwrap(), &claims_for(&env, &stranger))
        .await;
    assert!(matches!(foreign, Err(ServiceError::Forbidden(_))));

    env.bonafide_service
        .delete_request(first.id.unwrap(), &claims_for(&env, &owner))
        .await
        .unwrap();
    env.bonafide_service
        .delete_request(second.id.unwrap(), &claims_for(&env, &admin))
        .await
        .unwrap();

    assert_eq!(env.request_repo.count(None).await.unwrap(), 0);
}

#[tokio::test]
async fn test_certificate_only_for_approved_requests() {
    let env = common::setup();
    let owner = env
        .register_user("Ravi Kumar", "ravi@example.com", UserRole::User)
        .await;
    let admin = env
        .register_user("Admin", "admin@example.com", UserRole::Admin)
        .await;

    let request = env
        .bonafide_service
        .submit(owner.id.unwrap(), create_dto())
        .await
        .unwrap();
    let id = request.id.unwrap();
    let owner_claims = claims_for(&env, &owner);

    let premature = env.bonafide_service.render_certificate(id, &owner_claims).await;
    assert!(matches!(premature, Err(ServiceError::Conflict(_))));

    env.bonafide_service
        .approve(id, admin.id.unwrap(), String::new())
        .await
        .unwrap();

    let document = env
        .bonafide_service
        .render_certificate(id, &owner_claims)
        .await
        .unwrap();
    let text = String::from_utf8(document).unwrap();
    assert!(text.contains("BONAFIDE AND CONDUCT CERTIFICATE"));
    assert!(text.contains("Ravi Kumar"));
    assert!(text.contains("20R01A0501"));

    let reloaded = env.request_repo.get_by_id(id).await.unwrap();
    assert!(reloaded.pdf_generated);
}

#[tokio::test]
async fn test_stats_counts_by_status() {
    let env = common::setup();
    let owner = env
        .register_user("Ravi Kumar", "ravi@example.com", UserRole::User)
        .await;
    let admin = env
        .register_user("Admin", "admin@example.com", UserRole::Admin)
        .await;

    let a = env
        .bonafide_service
        .submit(owner.id.unwrap(), create_dto())
        .await
        .unwrap();
    let b = env
        .bonafide_service
        .submit(owner.id.unwrap(), create_dto())
        .await
        .unwrap();
    env.bonafide_service
        .submit(owner.id.unwrap(), create_dto())
        .await
        .unwrap();

    env.bonafide_service
        .approve(a.id.unwrap(), admin.id.unwrap(), String::new())
        .await
        .unwrap();
    env.bonafide_service
        .reject(b.id.unwrap(), admin.id.unwrap(), String::new())
        .await
        .unwrap();

    let stats = env.bonafide_service.stats().await.unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.approved, 1);
    assert_eq!(stats.rejected, 1);
}
