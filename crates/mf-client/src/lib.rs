//! Application services around the editor: the authenticated API client,
//! session persistence, AI generation, save-to-collection and the studio
//! flows that tie them to compositing and export.

pub mod api;
pub mod auth;
pub mod collection;
pub mod config;
pub mod error;
pub mod fetch;
pub mod generation;
pub mod notify;
pub mod studio;
pub mod transport;

pub use api::ApiClient;
pub use auth::{FileSessionStore, MemorySessionStore, SessionStore, StoredSession};
pub use config::ClientConfig;
pub use error::{ApiError, ConfigError, FALLBACK_MESSAGE, StudioError};
pub use fetch::HttpImageFetcher;
pub use generation::GenerationRequest;
pub use notify::{Level, LogNotifier, Notification, Notifier, RecordingNotifier};
pub use studio::Studio;
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, MultipartForm, RequestBody, Transport};
