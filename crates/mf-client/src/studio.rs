//! The editor's asynchronous actions: generate a base image, save to the
//! collection, download, share.
//!
//! Each flow either succeeds (and only then touches the session) or turns
//! its error into an error notification and returns it. Flows borrow the
//! studio mutably, so one export cannot start while another is running.

use crate::api::ApiClient;
use crate::collection;
use crate::error::StudioError;
use crate::generation::{self, GenerationRequest};
use crate::notify::{LogNotifier, Notification, Notifier};
use image::RgbaImage;
use mf_core::GeneratedImageMetadata;
use mf_editor::EditorSession;
use mf_render::export::{self, DEFAULT_FILE_NAME, ShareOutcome, ShareSheet};
use mf_render::{Compositor, encode_png};
use std::path::{Path, PathBuf};

pub struct Studio {
    session: EditorSession,
    compositor: Compositor,
    client: ApiClient,
    notifier: Box<dyn Notifier>,
    share_sheet: Option<Box<dyn ShareSheet>>,
    export_dir: PathBuf,
}

impl std::fmt::Debug for Studio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Studio")
            .field("session", &self.session)
            .field("export_dir", &self.export_dir)
            .finish_non_exhaustive()
    }
}

impl Studio {
    /// Notifications go to the log until [`with_notifier`](Self::with_notifier)
    /// installs a UI sink.
    pub fn new(session: EditorSession, compositor: Compositor, client: ApiClient) -> Self {
        Self {
            session,
            compositor,
            client,
            notifier: Box::new(LogNotifier),
            share_sheet: None,
            export_dir: dirs::download_dir().unwrap_or_else(std::env::temp_dir),
        }
    }

    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_share_sheet(mut self, sheet: Box<dyn ShareSheet>) -> Self {
        self.share_sheet = Some(sheet);
        self
    }

    /// Where downloads and share fallbacks are written.
    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = dir.into();
        self
    }

    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut EditorSession {
        &mut self.session
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    // ─── Flows ───────────────────────────────────────────────────────────

    /// Generate a base image and switch the session to it.
    pub fn generate(
        &mut self,
        request: &GenerationRequest,
    ) -> Result<GeneratedImageMetadata, StudioError> {
        let meta = generation::generate(&self.client, request).map_err(|e| self.fail(e.into()))?;
        self.session.apply_generated_image(meta.clone());
        self.notifier
            .notify(Notification::success("Image generated successfully!"));
        Ok(meta)
    }

    /// Render and upload to the user's collection.
    pub fn save(&mut self) -> Result<serde_json::Value, StudioError> {
        let result = self.save_inner();
        let receipt = result.map_err(|e| self.fail(e))?;
        self.notifier
            .notify(Notification::success("Meme saved to your collection!"));
        Ok(receipt)
    }

    fn save_inner(&mut self) -> Result<serde_json::Value, StudioError> {
        let canvas = self.render()?;
        let png = encode_png(&canvas)?;
        let overlays_json = self.session.overlays_json();
        Ok(collection::save_to_collection(
            &self.client,
            png,
            overlays_json,
            self.session.generated(),
        )?)
    }

    /// Render and write a PNG; `path` defaults to `meme.png` in the export
    /// directory.
    pub fn download(&mut self, path: Option<&Path>) -> Result<PathBuf, StudioError> {
        let target = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.export_dir.join(DEFAULT_FILE_NAME));
        let result = self
            .render()
            .and_then(|canvas| Ok(export::download(&canvas, &target)?));
        let written = result.map_err(|e| self.fail(e))?;
        self.notifier.notify(Notification::success("Meme downloaded!"));
        Ok(written)
    }

    /// Render and hand to the share sheet (or open locally).
    pub fn share(&mut self) -> Result<ShareOutcome, StudioError> {
        let result = self.render().and_then(|canvas| {
            Ok(export::share(
                &canvas,
                self.share_sheet.as_deref(),
                &self.export_dir,
            )?)
        });
        let outcome = result.map_err(|e| self.fail(e))?;
        let note = match &outcome {
            ShareOutcome::Shared => Notification::success("Meme shared!"),
            ShareOutcome::OpenedLocally(_) => {
                Notification::info("Sharing isn't available here, so the meme was opened instead.")
            }
        };
        self.notifier.notify(note);
        Ok(outcome)
    }

    /// Composite the current session. Errors on a missing image or a
    /// failed load; never yields a blank canvas.
    pub fn render(&mut self) -> Result<RgbaImage, StudioError> {
        let snapshot = self.session.snapshot()?;
        Ok(self
            .compositor
            .composite(&snapshot.base_image, snapshot.surface, &snapshot.overlays)?)
    }

    fn fail(&self, err: StudioError) -> StudioError {
        log::warn!("studio action failed: {err}");
        self.notifier.notify(Notification::error(err.user_message()));
        err
    }
}
