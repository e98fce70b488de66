/// Session state for the restoration workflow
///
/// A `Session` owns everything the UI displays: the chosen options, the
/// loaded photo, the restored result, and the lifecycle of the single
/// outstanding request. All transitions go through the methods here so the
/// guards (one request in flight, no generation without a photo, stale
/// completions discarded) live in one place and can be unit tested.

use std::path::PathBuf;

use super::options::RestorationOptions;

/// A photo loaded from disk, ready to be sent for restoration
#[derive(Debug, Clone)]
pub struct SourceImage {
    /// Where the photo came from
    pub path: PathBuf,
    /// Sniffed MIME type (image/png, image/jpeg or image/webp)
    pub mime_type: String,
    /// The original file bytes, untouched
    pub bytes: Vec<u8>,
    /// `data:{mime};base64,{payload}` representation of the same bytes
    pub data_url: String,
}

impl SourceImage {
    /// Filename for status messages
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Lifecycle of the outstanding restoration request
///
/// A tagged state instead of a loading flag plus an error string, so
/// combinations like "loading with an error showing" cannot exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestState {
    Idle,
    InFlight { token: u64 },
    Succeeded,
    Failed(String),
}

#[derive(Debug)]
pub struct Session {
    pub options: RestorationOptions,
    pub source: Option<SourceImage>,
    /// PNG bytes returned by the model
    pub restored: Option<Vec<u8>>,
    pub request: RequestState,
    next_token: u64,
}

impl Session {
    pub fn new() -> Self {
        Self {
            options: RestorationOptions::new(),
            source: None,
            restored: None,
            request: RequestState::Idle,
            next_token: 0,
        }
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self.request, RequestState::InFlight { .. })
    }

    /// The generate action is only available with a photo and no request in flight
    pub fn can_generate(&self) -> bool {
        self.source.is_some() && !self.is_in_flight()
    }

    /// Install a freshly loaded photo, clearing any previous result
    pub fn set_source(&mut self, source: SourceImage) {
        self.source = Some(source);
        self.restored = None;
        if !self.is_in_flight() {
            self.request = RequestState::Idle;
        }
    }

    /// Record a failed photo load. The previously loaded photo, if any, stays.
    pub fn fail_upload(&mut self, message: String) {
        if !self.is_in_flight() {
            self.request = RequestState::Failed(message);
        }
    }

    /// Try to start a generation.
    ///
    /// Returns the minted token plus clones of the inputs the remote call
    /// needs, or `None` when the guard rejects: silently while a request is
    /// already in flight, with a visible error when no photo is loaded.
    pub fn begin_generation(&mut self) -> Option<(u64, SourceImage, RestorationOptions)> {
        if self.is_in_flight() {
            return None;
        }
        let Some(source) = self.source.clone() else {
            self.request = RequestState::Failed("Please load a photo first.".to_string());
            return None;
        };

        self.restored = None;
        self.next_token += 1;
        let token = self.next_token;
        self.request = RequestState::InFlight { token };
        Some((token, source, self.options.clone()))
    }

    /// Apply the outcome of a generation.
    ///
    /// Completions carrying a token that no longer matches the in-flight one
    /// (the session was reset meanwhile) are discarded. Returns whether the
    /// outcome was applied.
    pub fn finish_generation(&mut self, token: u64, outcome: Result<Vec<u8>, String>) -> bool {
        if self.request != (RequestState::InFlight { token }) {
            return false;
        }
        match outcome {
            Ok(png_bytes) => {
                self.restored = Some(png_bytes);
                self.request = RequestState::Succeeded;
            }
            Err(message) => {
                self.request = RequestState::Failed(message);
            }
        }
        true
    }

    /// Return to the initial state: default options, no images, no error.
    pub fn reset(&mut self) {
        self.options = RestorationOptions::default();
        self.source = None;
        self.restored = None;
        self.request = RequestState::Idle;
        // next_token deliberately survives a reset so a completion from a
        // superseded generation can never match a newly minted token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::options::Gender;

    fn sample_source() -> SourceImage {
        SourceImage {
            path: PathBuf::from("/photos/grandma.jpg"),
            mime_type: "image/jpeg".to_string(),
            bytes: vec![1, 2, 3],
            data_url: "data:image/jpeg;base64,AQID".to_string(),
        }
    }

    #[test]
    fn test_generate_without_photo_is_rejected_with_error() {
        let mut session = Session::new();
        session.options.gender = Gender::Male;

        assert!(session.begin_generation().is_none());
        assert!(matches!(session.request, RequestState::Failed(_)));
        // options are untouched by the rejection
        assert_eq!(session.options.gender, Gender::Male);
    }

    #[test]
    fn test_generate_while_in_flight_is_rejected_silently() {
        let mut session = Session::new();
        session.set_source(sample_source());

        let (token, _, _) = session.begin_generation().unwrap();
        assert!(session.begin_generation().is_none());
        // still the same request, no error surfaced
        assert_eq!(session.request, RequestState::InFlight { token });
    }

    #[test]
    fn test_success_stores_result() {
        let mut session = Session::new();
        session.set_source(sample_source());

        let (token, _, _) = session.begin_generation().unwrap();
        assert!(session.finish_generation(token, Ok(vec![9, 9])));

        assert_eq!(session.request, RequestState::Succeeded);
        assert_eq!(session.restored.as_deref(), Some(&[9u8, 9][..]));
    }

    #[test]
    fn test_failure_keeps_source_image() {
        let mut session = Session::new();
        session.set_source(sample_source());

        let (token, _, _) = session.begin_generation().unwrap();
        assert!(session.finish_generation(token, Err("boom".to_string())));

        assert_eq!(session.request, RequestState::Failed("boom".to_string()));
        assert!(session.source.is_some());
        assert!(session.restored.is_none());
    }

    #[test]
    fn test_new_generation_clears_previous_result() {
        let mut session = Session::new();
        session.set_source(sample_source());

        let (token, _, _) = session.begin_generation().unwrap();
        session.finish_generation(token, Ok(vec![7]));
        assert!(session.restored.is_some());

        let _ = session.begin_generation().unwrap();
        assert!(session.restored.is_none());
    }

    #[test]
    fn test_reset_returns_to_defaults_from_any_state() {
        let mut session = Session::new();
        session.options.remake_hair = true;
        session.set_source(sample_source());
        let (token, _, _) = session.begin_generation().unwrap();
        session.finish_generation(token, Err("network down".to_string()));

        session.reset();

        assert!(session.options.is_default());
        assert!(session.source.is_none());
        assert!(session.restored.is_none());
        assert_eq!(session.request, RequestState::Idle);
    }

    #[test]
    fn test_stale_completion_after_reset_is_discarded() {
        let mut session = Session::new();
        session.set_source(sample_source());
        let (stale_token, _, _) = session.begin_generation().unwrap();

        session.reset();

        assert!(!session.finish_generation(stale_token, Ok(vec![1])));
        assert!(session.restored.is_none());
        assert_eq!(session.request, RequestState::Idle);
    }

    #[test]
    fn test_stale_token_cannot_collide_with_a_new_generation() {
        let mut session = Session::new();
        session.set_source(sample_source());
        let (stale_token, _, _) = session.begin_generation().unwrap();

        session.reset();
        session.set_source(sample_source());
        let (new_token, _, _) = session.begin_generation().unwrap();

        assert_ne!(stale_token, new_token);
        assert!(!session.finish_generation(stale_token, Ok(vec![1])));
        assert!(session.finish_generation(new_token, Ok(vec![2])));
        assert_eq!(session.restored.as_deref(), Some(&[2u8][..]));
    }

    #[test]
    fn test_upload_failure_keeps_prior_photo() {
        let mut session = Session::new();
        session.set_source(sample_source());

        session.fail_upload("unreadable file".to_string());

        assert!(session.source.is_some());
        assert_eq!(
            session.request,
            RequestState::Failed("unreadable file".to_string())
        );
    }
}
