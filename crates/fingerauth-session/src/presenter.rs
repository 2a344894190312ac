//! Seams to the prompt UI and to the caller waiting for a result.

use fingerauth_protocol::{AuthConfig, AuthError, Color};

/// What the presenter should put on screen for an attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub title: String,
    /// The caller's reason for asking.
    pub reason: String,
    /// Text under the fingerprint image while waiting.
    pub description: String,
    pub cancel_label: String,
    /// Present only when the attempt allows falling back to the device
    /// credential; the presenter shows the button iff this is `Some`.
    pub fallback_label: Option<String>,
    pub image_tint: Color,
}

impl Prompt {
    /// Builds the prompt for a request.
    pub fn for_request(reason: &str, config: &AuthConfig) -> Self {
        Self {
            title: config.title.clone(),
            reason: reason.to_owned(),
            description: config.sensor_description.clone(),
            cancel_label: config.cancel_text.clone(),
            fallback_label: config
                .passcode_fallback
                .then(|| config.fallback_label.clone()),
            image_tint: config.image_color,
        }
    }
}

/// Feedback after a read that didn't match. The attempt continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureNotice {
    /// Replaces the prompt's description.
    pub message: String,
    pub image_tint: Color,
    pub error: AuthError,
}

/// Renders the modal prompt.
///
/// The presenter reports back (shown, hidden, cancel tap, fallback tap)
/// through the controller's event methods; it never decides anything.
pub trait PromptPresenter: Send + 'static {
    /// Put the prompt on screen.
    fn show(&mut self, prompt: &Prompt);

    /// Show feedback for a failed read.
    fn show_failure(&mut self, notice: &FailureNotice);

    /// Take the prompt down.
    fn dismiss(&mut self);
}

/// Receives the terminal outcome of one attempt.
///
/// Each method takes `self: Box<Self>`: delivering an outcome consumes the
/// listener, so a second delivery can't compile. A listener dropped
/// without any call means the attempt was abandoned (request dropped,
/// app backgrounded, host destroyed).
pub trait AuthListener: Send + 'static {
    fn on_authenticated(self: Box<Self>);

    fn on_error(self: Box<Self>, error: AuthError);

    fn on_cancelled(self: Box<Self>);
}
