//! Contract tests for the remote resource client and the auth endpoints.
//!
//! ## Endpoints Tested
//!
//! | Method | Path | Test |
//! |--------|------|------|
//! | GET | `/api/disputes` | `bearer_*`, `unauthorized_*`, `concurrent_*`, `non_2xx_*`, `malformed_*` |
//! | POST | `/api/auth/login` | `login_*` |
//! | POST | `/api/auth/register` | `register_*` |
//! | PATCH | `/api/auth/profile` | `update_profile_*` |

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use paydesk_client::{
    ClientError, ErrorKind, FileSessionPersistence, MemorySessionPersistence, Navigator,
    PaydeskClient, PaydeskConfig, SessionPersistence, SessionStore,
};
use paydesk_core::{Access, Identity, ProfileUpdate, Role, RoleClaim, Route, UserId};
use reqwest::Method;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Navigator that remembers every navigation it was asked to perform.
#[derive(Default)]
struct RecordingNavigator(Mutex<Vec<Route>>);

impl RecordingNavigator {
    fn routes(&self) -> Vec<Route> {
        self.0.lock().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.0.lock().push(route);
    }
}

fn identity(role: Role) -> Identity {
    Identity {
        id: UserId::new("u1"),
        name: "Ana".to_string(),
        email: "ana@example.com".to_string(),
        role: RoleClaim::from(role),
        location: None,
    }
}

struct Harness {
    client: PaydeskClient,
    navigator: Arc<RecordingNavigator>,
    persistence: Arc<MemorySessionPersistence>,
}

fn harness(server: &MockServer) -> Harness {
    let config =
        PaydeskConfig::local_mock(&format!("{}/api", server.uri()), "/nonexistent/session.json")
            .unwrap();
    let persistence = Arc::new(MemorySessionPersistence::new());
    let session = Arc::new(SessionStore::new(persistence.clone()));
    let navigator = Arc::new(RecordingNavigator::default());
    let client = PaydeskClient::new(&config, session, navigator.clone()).unwrap();
    Harness {
        client,
        navigator,
        persistence,
    }
}

fn signed_in(server: &MockServer, role: Role) -> Harness {
    let h = harness(server);
    h.client.session().establish(
        identity(role),
        Some(paydesk_client::BearerToken::new("tok-123")),
    );
    h
}

// ── Resource client ─────────────────────────────────────────────────────

#[tokio::test]
async fn bearer_token_is_attached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/disputes"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let h = signed_in(&server, Role::Player);
    let body = h
        .client
        .api()
        .request(Method::GET, "disputes", None, &[])
        .await
        .unwrap();
    assert_eq!(body, json!({"success": true}));
}

#[tokio::test]
async fn unauthorized_clears_session_and_redirects_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/disputes"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "jwt expired"})))
        .mount(&server)
        .await;

    let h = signed_in(&server, Role::Admin);
    let err = h
        .client
        .api()
        .request(Method::GET, "disputes", None, &[])
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert!(!h.client.session().is_authenticated());
    assert!(h.client.session().token().is_none());
    assert!(h.persistence.stored().is_none());
    assert_eq!(h.navigator.routes(), vec![Route::Login]);
    assert_eq!(h.client.authorize(Route::Disputes), Access::RedirectLogin);
}

#[tokio::test]
async fn concurrent_rejections_redirect_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/disputes"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(401).set_delay(Duration::from_millis(50)))
        .expect(2)
        .mount(&server)
        .await;

    let h = signed_in(&server, Role::Staff);
    let api = h.client.api();
    let (first, second) = tokio::join!(
        api.request(Method::GET, "disputes", None, &[]),
        api.request(Method::GET, "disputes", None, &[]),
    );

    assert_eq!(first.unwrap_err().kind(), ErrorKind::Unauthorized);
    assert_eq!(second.unwrap_err().kind(), ErrorKind::Unauthorized);
    assert!(!h.client.session().is_authenticated());
    assert_eq!(h.navigator.routes(), vec![Route::Login]);
}

#[tokio::test]
async fn unauthorized_without_token_keeps_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/disputes"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "No token"})))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);
    h.client.session().establish(identity(Role::Player), None);
    let err = h
        .client
        .api()
        .request(Method::GET, "disputes", None, &[])
        .await
        .unwrap_err();

    match err {
        ClientError::Request {
            status, message, ..
        } => {
            assert_eq!(status, Some(401));
            assert_eq!(message, "No token");
        }
        other => panic!("expected request error, got {other:?}"),
    }
    assert!(h.client.session().is_authenticated());
    assert!(h.navigator.routes().is_empty());
}

#[tokio::test]
async fn non_2xx_surfaces_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/disputes"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"success": false, "message": "Invalid dispute"})),
        )
        .mount(&server)
        .await;

    let h = signed_in(&server, Role::Player);
    let err = h
        .client
        .api()
        .request(Method::GET, "disputes", None, &[])
        .await
        .unwrap_err();

    match &err {
        ClientError::Request { status, message, .. } => {
            assert_eq!(*status, Some(400));
            assert_eq!(message, "Invalid dispute");
        }
        other => panic!("expected Request, got {other:?}"),
    }
    assert!(h.client.session().is_authenticated());
    assert!(h.navigator.routes().is_empty());
}

#[tokio::test]
async fn non_2xx_without_message_uses_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/disputes"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>boom</html>"))
        .mount(&server)
        .await;

    let h = signed_in(&server, Role::Player);
    let err = h
        .client
        .api()
        .request(Method::GET, "disputes", None, &[])
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Request failed: 500");
}

#[tokio::test]
async fn malformed_success_body_is_treated_as_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/disputes"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let h = signed_in(&server, Role::Player);
    let body = h
        .client
        .api()
        .request(Method::GET, "disputes", None, &[])
        .await
        .unwrap();
    assert_eq!(body, json!({}));
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    let config = PaydeskConfig::local_mock("http://127.0.0.1:1/api", "/nonexistent/s.json").unwrap();
    let session = Arc::new(SessionStore::in_memory());
    let navigator = Arc::new(RecordingNavigator::default());
    let client = PaydeskClient::new(&config, session, navigator.clone()).unwrap();

    let err = client
        .api()
        .request(Method::GET, "disputes", None, &[])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
    assert!(navigator.routes().is_empty());
}

// ── Auth ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn login_stores_exactly_the_server_identity() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"email": "ana@example.com", "password": "pw"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "token": "tok-abc",
            "user": {
                "_id": "u1",
                "name": "Ana",
                "email": "ana@example.com",
                "role": "SUPPORT",
                "location": "Lisbon"
            }
        })))
        .mount(&server)
        .await;

    let h = harness(&server);
    let returned = h.client.auth().login("ana@example.com", "pw").await.unwrap();

    let stored = h.client.session().identity().unwrap();
    assert_eq!(stored, returned);
    assert_eq!(stored.id, UserId::new("u1"));
    assert_eq!(stored.role(), Some(Role::Support));
    assert_eq!(stored.location.as_deref(), Some("Lisbon"));
    assert_eq!(h.client.session().token().unwrap().expose(), "tok-abc");

    let persisted = h.persistence.stored().unwrap();
    assert_eq!(persisted.identity, stored);
    assert_eq!(persisted.token.as_deref(), Some("tok-abc"));
}

#[tokio::test]
async fn login_with_bad_credentials_is_an_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"success": false, "message": "Invalid credentials"})),
        )
        .mount(&server)
        .await;

    let h = harness(&server);
    let err = h.client.auth().login("ana@example.com", "nope").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Auth);
    assert_eq!(err.user_message(), "Invalid credentials");
    assert!(!h.client.session().is_authenticated());
    assert!(h.navigator.routes().is_empty());
}

#[tokio::test]
async fn login_without_user_is_an_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    let h = harness(&server);
    let err = h.client.auth().login("ana@example.com", "pw").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Auth);
    assert!(!h.client.session().is_authenticated());
}

#[tokio::test]
async fn register_signs_in_as_the_new_account() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .and(body_json(json!({
            "name": "Pia",
            "email": "pia@example.com",
            "password": "pw",
            "role": "PLAYER"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "success": true,
            "token": "tok-new",
            "user": {"_id": "p9", "name": "Pia", "email": "pia@example.com", "role": "PLAYER"}
        })))
        .mount(&server)
        .await;

    let h = harness(&server);
    let who = h
        .client
        .auth()
        .register("Pia", "pia@example.com", "pw", Role::Player)
        .await
        .unwrap();
    assert_eq!(who.id, UserId::new("p9"));
    assert!(h.client.auth().is_authenticated());
}

#[tokio::test]
async fn register_with_blank_name_sends_nothing() {
    let server = MockServer::start().await;
    let h = harness(&server);
    let err = h
        .client
        .auth()
        .register("  ", "pia@example.com", "pw", Role::Player)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn update_profile_replaces_identity() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/auth/profile"))
        .and(header("authorization", "Bearer tok-123"))
        .and(body_json(json!({"location": "Porto"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "user": {
                "_id": "u1",
                "name": "Ana",
                "email": "ana@example.com",
                "role": "PLAYER",
                "location": "Porto"
            }
        })))
        .mount(&server)
        .await;

    let h = signed_in(&server, Role::Player);
    let update = ProfileUpdate {
        location: Some("Porto".to_string()),
        ..ProfileUpdate::default()
    };
    h.client.auth().update_profile(&update).await.unwrap();

    let stored = h.client.session().identity().unwrap();
    assert_eq!(stored.location.as_deref(), Some("Porto"));
    assert_eq!(h.client.session().token().unwrap().expose(), "tok-123");
}

#[tokio::test]
async fn failed_profile_update_leaves_identity_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/auth/profile"))
        .respond_with(
            ResponseTemplate::new(409)
                .set_body_json(json!({"success": false, "message": "Email already in use"})),
        )
        .mount(&server)
        .await;

    let h = signed_in(&server, Role::Player);
    let before = h.client.session().identity();
    let update = ProfileUpdate {
        email: Some("taken@example.com".to_string()),
        ..ProfileUpdate::default()
    };
    let err = h.client.auth().update_profile(&update).await.unwrap_err();

    assert_eq!(err.user_message(), "Email already in use");
    assert_eq!(h.client.session().identity(), before);
}

#[tokio::test]
async fn persisted_session_survives_restart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "token": "tok-file",
            "user": {"_id": "u7", "name": "Rui", "email": "rui@example.com", "role": "AGENT"}
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("session.json");
    let config = PaydeskConfig::local_mock(&format!("{}/api", server.uri()), &file).unwrap();

    let persistence: Arc<dyn SessionPersistence> =
        Arc::new(FileSessionPersistence::new(&config.session_file));
    let session = Arc::new(SessionStore::restore(persistence.clone()));
    let client =
        PaydeskClient::new(&config, session, Arc::new(RecordingNavigator::default())).unwrap();
    client.auth().login("rui@example.com", "pw").await.unwrap();

    let reborn = SessionStore::restore(persistence);
    assert_eq!(reborn.identity().unwrap().role(), Some(Role::Agent));
    assert_eq!(reborn.token().unwrap().expose(), "tok-file");
    assert_eq!(reborn.authorize(Route::AgentPlayers), Access::Allow);
}
