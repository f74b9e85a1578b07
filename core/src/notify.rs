//! Presenting API failures to the user.

use serde::Deserialize;
use tracing::{error, info, warn};

use crate::error::ApiError;
use crate::http::HttpResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ToastTheme {
    Light,
    Dark,
    #[default]
    Colored,
}

/// Display settings handed to the notification sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToastOptions {
    pub level: ToastLevel,
    pub theme: ToastTheme,
}

impl ToastOptions {
    pub fn error() -> Self {
        Self {
            level: ToastLevel::Error,
            theme: ToastTheme::Colored,
        }
    }
}

/// Where user-visible notifications go.
pub trait Notifier {
    fn notify(&self, message: &str, options: ToastOptions);
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn notify(&self, message: &str, options: ToastOptions) {
        (**self).notify(message, options)
    }
}

/// Sink that emits notifications as `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str, options: ToastOptions) {
        match options.level {
            ToastLevel::Info => info!(target: "toast", "{message}"),
            ToastLevel::Warning => warn!(target: "toast", "{message}"),
            ToastLevel::Error => error!(target: "toast", "{message}"),
        }
    }
}

/// Text shown when the error body has no usable `message`.
pub const MISSING_MESSAGE: &str = "unknown error";

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<serde_json::Value>,
}

impl ErrorBody {
    fn text(&self) -> String {
        match &self.message {
            None | Some(serde_json::Value::Null) => MISSING_MESSAGE.to_string(),
            Some(serde_json::Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
        }
    }
}

/// Turns rejected responses into `"{prefix}: {message}"` error toasts.
#[derive(Debug, Clone)]
pub struct ErrorPresenter<N> {
    sink: N,
    prefix: String,
}

impl<N: Notifier> ErrorPresenter<N> {
    pub fn new(sink: N, prefix: impl Into<String>) -> Self {
        Self {
            sink,
            prefix: prefix.into(),
        }
    }

    /// Read `message` from the JSON body and notify. Strings are shown as-is,
    /// other JSON values in their JSON form, and a missing or null field as
    /// [`MISSING_MESSAGE`]. Only a body that is not a JSON object is an error,
    /// in which case nothing is shown.
    pub fn present(&self, response: &HttpResponse) -> Result<(), ApiError> {
        let body: ErrorBody = response.json()?;
        self.sink
            .notify(&format!("{}: {}", self.prefix, body.text()), ToastOptions::error());
        Ok(())
    }

    /// Present a status error. Errors without a response are handed back.
    pub fn present_error(&self, err: ApiError) -> Result<(), ApiError> {
        let response = err.into_response()?;
        self.present(&response)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Collect(Mutex<Vec<(String, ToastOptions)>>);

    impl Notifier for Collect {
        fn notify(&self, message: &str, options: ToastOptions) {
            self.0.lock().unwrap().push((message.to_string(), options));
        }
    }

    #[test]
    fn present_combines_prefix_and_message() {
        let sink = Collect::default();
        let presenter = ErrorPresenter::new(&sink, "Save failed");
        presenter
            .present(&HttpResponse::new(400, r#"{"message":"bad input"}"#))
            .unwrap();

        let shown = sink.0.lock().unwrap();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].0, "Save failed: bad input");
        assert_eq!(shown[0].1.level, ToastLevel::Error);
        assert_eq!(shown[0].1.theme, ToastTheme::Colored);
    }

    #[test]
    fn unparseable_body_is_an_error_and_shows_nothing() {
        let sink = Collect::default();
        let presenter = ErrorPresenter::new(&sink, "Load failed");

        let err = presenter
            .present(&HttpResponse::new(502, "<html>bad gateway</html>"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
        assert!(sink.0.lock().unwrap().is_empty());
    }

    #[test]
    fn non_string_messages_are_rendered_as_json() {
        let sink = Collect::default();
        let presenter = ErrorPresenter::new(&sink, "Save failed");

        presenter
            .present(&HttpResponse::new(400, r#"{"message":42}"#))
            .unwrap();
        presenter
            .present(&HttpResponse::new(400, r#"{"message":["name required"]}"#))
            .unwrap();

        let shown = sink.0.lock().unwrap();
        assert_eq!(shown[0].0, "Save failed: 42");
        assert_eq!(shown[1].0, r#"Save failed: ["name required"]"#);
    }

    #[test]
    fn missing_message_uses_placeholder() {
        let sink = Collect::default();
        let presenter = ErrorPresenter::new(&sink, "Load failed");

        presenter
            .present(&HttpResponse::new(400, r#"{"error":"x"}"#))
            .unwrap();
        presenter
            .present(&HttpResponse::new(400, r#"{"message":null}"#))
            .unwrap();

        let shown = sink.0.lock().unwrap();
        assert_eq!(shown.len(), 2);
        assert_eq!(shown[0].0, format!("Load failed: {MISSING_MESSAGE}"));
        assert_eq!(shown[1].0, format!("Load failed: {MISSING_MESSAGE}"));
    }

    #[test]
    fn present_error_hands_back_non_status_errors() {
        let sink = Collect::default();
        let presenter = ErrorPresenter::new(&sink, "Delete failed");

        let err = presenter
            .present_error(ApiError::Transport("offline".into()))
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));

        presenter
            .present_error(ApiError::Status(HttpResponse::new(
                404,
                r#"{"message":"not found"}"#,
            )))
            .unwrap();
        assert_eq!(sink.0.lock().unwrap()[0].0, "Delete failed: not found");
    }

    #[test]
    fn tracing_notifier_accepts_every_level() {
        let sink = TracingNotifier;
        sink.notify("hello", ToastOptions::error());
        sink.notify(
            "hello",
            ToastOptions {
                level: ToastLevel::Info,
                theme: ToastTheme::Light,
            },
        );
    }
}
