//! Integration tests: bearer tokens, refresh-on-401 and session expiry.

mod support;

use mf_client::api::REFRESH_PATH;
use mf_client::{
    ApiClient, ApiError, MemorySessionStore, Method, RequestBody, SessionStore, StoredSession,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::cell::Cell;
use std::rc::Rc;
use support::{ScriptedTransport, init_logging};

struct Fixture {
    transport: ScriptedTransport,
    store: Rc<MemorySessionStore>,
    redirects: Rc<Cell<u32>>,
    client: ApiClient,
}

fn fixture(session: Option<StoredSession>, transport: ScriptedTransport) -> Fixture {
    init_logging();
    let store = Rc::new(MemorySessionStore::new(session));
    let redirects = Rc::new(Cell::new(0));
    let counter = redirects.clone();
    let client = ApiClient::new(Box::new(transport.clone()), Box::new(store.clone()))
        .on_session_expired(move || counter.set(counter.get() + 1));
    Fixture {
        transport,
        store,
        redirects,
        client,
    }
}

fn signed_in() -> Option<StoredSession> {
    Some(StoredSession::new("old-token", Some("refresh-1".into())))
}

#[test]
fn stored_token_is_attached() {
    let f = fixture(signed_in(), ScriptedTransport::new().reply(200, json!({"ok": true})));
    let body: Value = f.client.get("/memes/mine").unwrap();
    assert_eq!(body, json!({"ok": true}));
    assert_eq!(f.transport.requests()[0].bearer.as_deref(), Some("old-token"));
}

#[test]
fn explicit_token_overrides_store() {
    let f = fixture(signed_in(), ScriptedTransport::new().reply(200, json!({})));
    f.client
        .send(Method::Get, "/auth/me", RequestBody::Empty, Some("fresh"))
        .unwrap();
    assert_eq!(f.transport.requests()[0].bearer.as_deref(), Some("fresh"));
}

#[test]
fn unauthorized_refreshes_once_and_replays() {
    let f = fixture(
        signed_in(),
        ScriptedTransport::new()
            .reply(401, json!({"error": "jwt expired"}))
            .reply(200, json!({"token": "new-token", "refreshToken": "refresh-2"}))
            .reply(200, json!({"id": "m1"})),
    );

    let body: Value = f.client.post("/memes", &json!({"title": "x"})).unwrap();
    assert_eq!(body, json!({"id": "m1"}));

    let requests = f.transport.requests();
    assert_eq!(f.transport.paths(), vec!["/memes", REFRESH_PATH, "/memes"]);
    assert_eq!(requests[1].bearer, None);
    assert_eq!(
        requests[1].body,
        RequestBody::Json(json!({"refreshToken": "refresh-1"}))
    );
    assert_eq!(requests[2].bearer.as_deref(), Some("new-token"));
    assert_eq!(requests[2].body, requests[0].body);

    let stored = f.store.load().unwrap();
    assert_eq!(stored.token, "new-token");
    assert_eq!(stored.refresh_token.as_deref(), Some("refresh-2"));
    assert_eq!(f.redirects.get(), 0);
}

#[test]
fn refresh_without_new_refresh_token_keeps_old_one() {
    let f = fixture(
        signed_in(),
        ScriptedTransport::new()
            .reply(401, json!({}))
            .reply(200, json!({"token": "new-token"}))
            .reply(200, json!([])),
    );
    let _: Value = f.client.get("/memes").unwrap();
    assert_eq!(f.store.load().unwrap().refresh_token.as_deref(), Some("refresh-1"));
}

#[test]
fn failed_refresh_clears_session_and_redirects() {
    let f = fixture(
        signed_in(),
        ScriptedTransport::new()
            .reply(401, json!({}))
            .reply(401, json!({"error": "refresh token revoked"})),
    );
    let err = f.client.get::<Value>("/memes").unwrap_err();
    assert!(matches!(err, ApiError::SessionExpired));
    assert_eq!(f.transport.paths(), vec!["/memes", REFRESH_PATH]);
    assert_eq!(f.store.load(), None);
    assert_eq!(f.redirects.get(), 1);
}

#[test]
fn missing_refresh_token_skips_refresh() {
    let f = fixture(
        Some(StoredSession::new("old-token", None)),
        ScriptedTransport::new().reply(401, json!({})),
    );
    let err = f.client.delete("/memes/1").unwrap_err();
    assert!(matches!(err, ApiError::SessionExpired));
    assert_eq!(f.transport.paths(), vec!["/memes/1"]);
    assert_eq!(f.redirects.get(), 1);
}

#[test]
fn replay_is_not_retried_again() {
    let f = fixture(
        signed_in(),
        ScriptedTransport::new()
            .reply(401, json!({}))
            .reply(200, json!({"token": "new-token"}))
            .reply(401, json!({})),
    );
    let err = f.client.get::<Value>("/memes").unwrap_err();
    assert!(matches!(err, ApiError::SessionExpired));
    assert_eq!(f.transport.remaining(), 0);
    assert_eq!(f.transport.requests().len(), 3);
    assert_eq!(f.store.load(), None);
}

#[test]
fn error_status_carries_backend_message() {
    let f = fixture(
        signed_in(),
        ScriptedTransport::new().reply(422, json!({"message": "Title too long"})),
    );
    let err = f.client.put::<_, Value>("/memes/1", &json!({"title": "…"})).unwrap_err();
    assert_eq!(err.status(), Some(422));
    assert_eq!(err.user_message(), "Title too long");
    assert_eq!(f.redirects.get(), 0);
}

#[test]
fn transport_failure_is_not_a_session_problem() {
    let f = fixture(
        signed_in(),
        ScriptedTransport::new().fail(ApiError::Transport("connection refused".into())),
    );
    let err = f.client.get::<Value>("/memes").unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
    assert!(f.store.load().is_some());
}
