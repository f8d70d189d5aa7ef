use jiff::Timestamp;
use pretty_assertions::assert_eq;
use serde_json::json;
use server::{ApplicationApi, OpportunityApi, UserApi, VolunteerClient};
use std::time::Duration;
use types::{
    AdminIdentity, AdminSession,
    application::ApplicationStatus,
    opportunity::{Category, ImageUpload, OpportunityDraft, OpportunityStatus},
    user::UserDraft,
};
use url::Url;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, body_partial_json, header, method, path},
};

fn client(server: &MockServer) -> VolunteerClient {
    VolunteerClient::new(Url::parse(&server.uri()).unwrap(), Duration::from_secs(5)).unwrap()
}

fn session() -> AdminSession {
    AdminSession::new(
        AdminIdentity {
            id: "admin-1".into(),
            name: "Meera".into(),
            email: "meera@example.org".into(),
        },
        "token-123".to_string().into(),
        Timestamp::MAX,
    )
}

fn draft() -> OpportunityDraft {
    OpportunityDraft {
        title: "Beach Cleanup".into(),
        organization: "Blue Coast".into(),
        description: "Collect plastic along the shore".into(),
        location: "Juhu Beach".into(),
        date: "2024-06-01".into(),
        start_time: "07:00".into(),
        end_time: "11:00".into(),
        duration: "4 hours".into(),
        volunteers: 12,
        category: Category::Environment,
        skills: "Stamina, Teamwork".into(),
        ..Default::default()
    }
}

fn image() -> ImageUpload {
    ImageUpload {
        file_name: "cleanup.png".into(),
        content_type: "image/png".into(),
        bytes: b"PNGDATA".to_vec(),
    }
}

#[tokio::test]
async fn lists_opportunities_with_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/opportunities"))
        .and(header("authorization", "Bearer token-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "_id": "1", "title": "Tree Planting", "category": "Environment" },
            { "_id": "2", "title": "Reading Club", "category": "Education", "status": "Filled" },
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let opportunities = client(&server)
        .list_opportunities(&session())
        .await
        .unwrap();

    assert_eq!(opportunities.len(), 2);
    assert_eq!(opportunities[1].status, OpportunityStatus::Filled);
}

#[tokio::test]
async fn lists_users_from_trailing_slash_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "_id": "u1", "name": "Asha", "emailid": "asha@example.com", "district": "Pune", "skill": "Cooking" },
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let users = client(&server).list_users(&session()).await.unwrap();
    assert_eq!(users[0].district, "Pune");
}

#[tokio::test]
async fn accepting_sends_exactly_one_status_put() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/applications/7/status"))
        .and(body_json(json!({ "status": "accepted" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "updated" })))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .set_application_status(&session(), "7", ApplicationStatus::Accepted)
        .await
        .unwrap();
}

#[tokio::test]
async fn delete_goes_to_admin_endpoint_with_requester() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/admin/opportunities/42"))
        .and(header("authorization", "Bearer token-123"))
        .and(body_json(json!({ "requesterId": "admin-1" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .delete_opportunity(&session(), "42")
        .await
        .unwrap();
}

#[tokio::test]
async fn rejected_delete_surfaces_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/admin/opportunities/42"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({ "message": "Only admins can delete" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let error = client(&server)
        .delete_opportunity(&session(), "42")
        .await
        .unwrap_err();

    assert_eq!(error.status(), 403);
    assert_eq!(error.to_string(), "Only admins can delete");
}

#[tokio::test]
async fn cancel_puts_requester_to_cancel_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/admin/opportunities/42/cancel"))
        .and(body_json(json!({ "requesterId": "admin-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "Canceled" })))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .cancel_opportunity(&session(), "42")
        .await
        .unwrap();
}

#[tokio::test]
async fn remote_unauthorized_stays_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/applications"))
        .respond_with(ResponseTemplate::new(401).set_body_string("jwt expired"))
        .mount(&server)
        .await;

    let error = client(&server)
        .list_applications(&session())
        .await
        .unwrap_err();

    assert!(error.is_unauthorized());
    assert_eq!(error.to_string(), "Unauthorized");
}

#[tokio::test]
async fn create_with_image_sends_multipart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/opportunities"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "_id": "99",
            "title": "Beach Cleanup",
            "imageUrl": "/uploads/cleanup.png",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let created = client(&server)
        .create_opportunity(&session(), &draft(), Some(&image()))
        .await
        .unwrap();
    assert_eq!(created.id, "99");

    let requests = server.received_requests().await.unwrap();
    let request = &requests[0];
    let content_type = request.headers.get("content-type").unwrap().to_str().unwrap();
    assert!(content_type.starts_with("multipart/form-data"));

    let body = String::from_utf8_lossy(&request.body);
    assert!(body.contains("name=\"image\"; filename=\"cleanup.png\""));
    assert!(body.contains("Content-Type: image/png"));
    assert!(body.contains("PNGDATA"));
    assert!(body.contains("name=\"title\"\r\n\r\nBeach Cleanup\r\n"));
    assert!(body.contains("name=\"volunteers\"\r\n\r\n12\r\n"));
    assert!(!body.contains("name=\"impact\""));
}

#[tokio::test]
async fn create_without_image_is_still_multipart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/opportunities"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({ "_id": "5", "title": "Beach Cleanup" })),
        )
        .mount(&server)
        .await;

    client(&server)
        .create_opportunity(&session(), &draft(), None)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(!body.contains("name=\"image\""));
}

#[tokio::test]
async fn edit_without_image_sends_json() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/opportunities/42"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(json!({
            "title": "Beach Cleanup",
            "volunteers": 12,
            "category": "Environment",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "42",
            "title": "Beach Cleanup",
            "volunteers": 12,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let updated = client(&server)
        .update_opportunity(&session(), "42", &draft(), None)
        .await
        .unwrap();
    assert_eq!(updated.volunteers, 12);
}

#[tokio::test]
async fn edit_sends_a_cleared_address() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/opportunities/42"))
        .and(body_partial_json(json!({
            "address": { "street": "", "city": "", "district": "", "pincode": "", "state": "" },
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "_id": "42", "title": "Beach Cleanup" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .update_opportunity(&session(), "42", &draft(), None)
        .await
        .unwrap();
}

#[tokio::test]
async fn edit_with_image_switches_to_multipart() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/opportunities/42"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "_id": "42", "title": "Beach Cleanup" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .update_opportunity(&session(), "42", &draft(), Some(&image()))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let content_type = requests[0].headers.get("content-type").unwrap().to_str().unwrap();
    assert!(content_type.starts_with("multipart/form-data"));
}

#[tokio::test]
async fn zero_volunteers_never_reaches_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let invalid = OpportunityDraft {
        volunteers: 0,
        ..draft()
    };
    let error = client(&server)
        .create_opportunity(&session(), &invalid, None)
        .await
        .unwrap_err();

    assert_eq!(error.status(), 400);
}

#[tokio::test]
async fn register_and_update_user_send_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/users/register"))
        .and(body_partial_json(json!({ "name": "Ravi", "emailid": "ravi@example.com", "password": "pw" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "message": "registered" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/users/u9"))
        .and(body_json(json!({
            "name": "Ravi",
            "emailid": "ravi@example.com",
            "district": "Nagpur",
            "skill": "Driving",
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut user = UserDraft {
        name: "Ravi".into(),
        email: "ravi@example.com".into(),
        district: "Nagpur".into(),
        skill: "Driving".into(),
        password: "pw".into(),
        confirm_password: "pw".into(),
    };
    let api = client(&server);
    api.register_user(&session(), &user).await.unwrap();

    user.password.clear();
    user.confirm_password.clear();
    api.update_user(&session(), "u9", &user).await.unwrap();
}

#[tokio::test]
async fn delete_user_hits_user_path() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/users/u9"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client(&server).delete_user(&session(), "u9").await.unwrap();
}

#[tokio::test]
async fn ids_stay_inside_their_path_segment() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/applications/a%2F..%2Fb%3Fx=1%23y/status"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .set_application_status(&session(), "a/../b?x=1#y", ApplicationStatus::Accepted)
        .await
        .unwrap();
}

#[tokio::test]
async fn dot_ids_are_rejected_locally() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let api = client(&server);
    for id in ["", ".", ".."] {
        let error = api.delete_user(&session(), id).await.unwrap_err();
        assert_eq!(error.status(), 400);
    }
}

#[tokio::test]
async fn login_returns_grant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/admin/login"))
        .and(body_json(json!({ "email": "meera@example.org", "password": "s3cret" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "jwt-abc",
            "admin": { "_id": "admin-1", "name": "Meera", "email": "meera@example.org" },
            "expiresIn": 3600,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let grant = client(&server)
        .login("meera@example.org", &"s3cret".to_string().into())
        .await
        .unwrap();

    assert_eq!(grant.admin.id, "admin-1");
    assert!(grant.expires_at().unwrap() > Timestamp::now());
}

#[tokio::test]
async fn base_path_is_preserved() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/backend/api/applications"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let base = Url::parse(&format!("{}/backend", server.uri())).unwrap();
    let api = VolunteerClient::new(base, Duration::from_secs(5)).unwrap();

    assert!(api.list_applications(&session()).await.unwrap().is_empty());
}
