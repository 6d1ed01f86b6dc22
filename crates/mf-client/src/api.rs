//! Authenticated JSON / multipart client.
//!
//! Every request carries the stored bearer token unless the caller passes an
//! explicit one. A 401 triggers exactly one refresh round trip and one
//! replay; if either fails the stored session is cleared, the sign-in hook
//! fires and the call returns [`ApiError::SessionExpired`].

use crate::auth::{SessionStore, StoredSession};
use crate::error::ApiError;
use crate::transport::{ApiRequest, ApiResponse, Method, MultipartForm, RequestBody, Transport};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub const REFRESH_PATH: &str = "/auth/refresh";

const UNAUTHORIZED: u16 = 401;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

pub struct ApiClient {
    transport: Box<dyn Transport>,
    store: Box<dyn SessionStore>,
    on_session_expired: Option<Box<dyn Fn()>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("signed_in", &self.store.load().is_some())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(transport: Box<dyn Transport>, store: Box<dyn SessionStore>) -> Self {
        Self {
            transport,
            store,
            on_session_expired: None,
        }
    }

    /// Called after the session is cleared, e.g. to route to sign-in.
    pub fn on_session_expired(mut self, hook: impl Fn() + 'static) -> Self {
        self.on_session_expired = Some(Box::new(hook));
        self
    }

    pub fn session(&self) -> Option<StoredSession> {
        self.store.load()
    }

    pub fn sign_in(&self, session: &StoredSession) -> std::io::Result<()> {
        self.store.save(session)
    }

    pub fn sign_out(&self) {
        self.store.clear();
    }

    // ─── Typed helpers ───────────────────────────────────────────────────

    pub fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(Method::Get, path, RequestBody::Empty, None)?.json()
    }

    pub fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        self.send(Method::Post, path, json_body(body)?, None)?.json()
    }

    pub fn put<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        self.send(Method::Put, path, json_body(body)?, None)?.json()
    }

    /// Response bodies of deletes are ignored.
    pub fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(Method::Delete, path, RequestBody::Empty, None)
            .map(|_| ())
    }

    pub fn post_multipart<T: DeserializeOwned>(&self, path: &str, form: MultipartForm) -> Result<T, ApiError> {
        self.send(Method::Post, path, RequestBody::Multipart(form), None)?
            .json()
    }

    pub fn put_multipart<T: DeserializeOwned>(&self, path: &str, form: MultipartForm) -> Result<T, ApiError> {
        self.send(Method::Put, path, RequestBody::Multipart(form), None)?
            .json()
    }

    // ─── Core ────────────────────────────────────────────────────────────

    /// Send with the stored token (or `token` if given), handling 401.
    /// Returns the successful response; non-2xx becomes `ApiError::Status`.
    pub fn send(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
        token: Option<&str>,
    ) -> Result<ApiResponse, ApiError> {
        let bearer = match token {
            Some(token) => Some(token.to_string()),
            None => self.store.load().map(|s| s.token),
        };
        let mut request = ApiRequest {
            method,
            path: path.to_string(),
            bearer,
            body,
        };

        let response = self.transport.send(&request)?;
        if response.status != UNAUTHORIZED {
            return response.into_result();
        }

        log::debug!("{path}: unauthorized, refreshing session");
        request.bearer = Some(self.refresh()?);
        let replay = self.transport.send(&request)?;
        if replay.status == UNAUTHORIZED {
            log::warn!("{path}: still unauthorized after refresh");
            return Err(self.expire());
        }
        replay.into_result()
    }

    /// One refresh round trip. On success the new token is stored and
    /// returned; on any failure the session is expired.
    fn refresh(&self) -> Result<String, ApiError> {
        let Some(session) = self.store.load() else {
            return Err(self.expire());
        };
        let Some(refresh_token) = session.refresh_token.clone() else {
            log::debug!("no refresh token stored");
            return Err(self.expire());
        };

        let request = ApiRequest {
            method: Method::Post,
            path: REFRESH_PATH.to_string(),
            bearer: None,
            body: RequestBody::Json(serde_json::json!({ "refreshToken": refresh_token })),
        };
        let refreshed = match self
            .transport
            .send(&request)
            .and_then(ApiResponse::into_result)
            .and_then(|r| r.json::<RefreshResponse>())
        {
            Ok(refreshed) => refreshed,
            Err(e) => {
                log::warn!("session refresh failed: {e}");
                return Err(self.expire());
            }
        };

        let updated = StoredSession {
            user: session.user,
            token: refreshed.token.clone(),
            refresh_token: refreshed.refresh_token.or(session.refresh_token),
        };
        if let Err(e) = self.store.save(&updated) {
            log::warn!("failed to persist refreshed session: {e}");
        }
        Ok(refreshed.token)
    }

    fn expire(&self) -> ApiError {
        self.store.clear();
        if let Some(hook) = &self.on_session_expired {
            hook();
        }
        ApiError::SessionExpired
    }
}

fn json_body<B: Serialize>(body: &B) -> Result<RequestBody, ApiError> {
    serde_json::to_value(body)
        .map(RequestBody::Json)
        .map_err(|e| ApiError::Validation(format!("unserializable request body: {e}")))
}
