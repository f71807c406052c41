use async_trait::async_trait;
use shared_types::{SaveConfigRequest, SaveConfigResponse};
use thiserror::Error;

/// Why a config save failed
///
/// `Display` is the text shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaveFailure {
    /// The call itself failed (offline, aborted, unreadable body)
    #[error("Failed saving config: {0}")]
    Transport(String),

    /// Response status outside 200..=299
    #[error("Failed saving config: {status}")]
    HttpError { status: u16 },

    /// Success status, but the server reported `err`
    #[error("{0}")]
    ApplicationError(String),
}

/// Save accepted. Nothing is echoed back; the widget keeps its own value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack;

/// Remote persistence for config files
///
/// One call per request; callers submit sequentially.
#[async_trait(?Send)]
pub trait PersistenceClient {
    async fn submit(&self, request: &SaveConfigRequest) -> Result<Ack, SaveFailure>;
}

/// Map a save endpoint response onto the failure taxonomy.
pub fn interpret_response(status: u16, body: &str) -> Result<Ack, SaveFailure> {
    if !(200..=299).contains(&status) {
        return Err(SaveFailure::HttpError { status });
    }

    let data: SaveConfigResponse = serde_json::from_str(body)
        .map_err(|e| SaveFailure::Transport(format!("failed to parse JSON: {e}")))?;

    match data.error_message() {
        Some(err) => Err(SaveFailure::ApplicationError(err.to_string())),
        None => Ok(Ack),
    }
}

#[cfg(target_arch = "wasm32")]
pub use http::{api_base, HttpPersistenceClient};

#[cfg(target_arch = "wasm32")]
mod http {
    use std::sync::OnceLock;

    use async_trait::async_trait;
    use gloo_net::http::Request;
    use shared_types::{SaveConfigRequest, SAVE_CONFIG_PATH};

    use super::{interpret_response, Ack, PersistenceClient, SaveFailure};

    /// The page is served by the control center itself, so the API lives
    /// on the page origin.
    fn get_api_base() -> String {
        web_sys::window()
            .and_then(|w| w.location().origin().ok())
            .unwrap_or_default()
    }

    static API_BASE_CACHE: OnceLock<String> = OnceLock::new();

    pub fn api_base() -> &'static str {
        API_BASE_CACHE.get_or_init(get_api_base).as_str()
    }

    #[derive(Debug, Clone)]
    pub struct HttpPersistenceClient {
        url: String,
    }

    impl HttpPersistenceClient {
        pub fn new() -> Self {
            Self {
                url: format!("{}{}", api_base(), SAVE_CONFIG_PATH),
            }
        }
    }

    impl Default for HttpPersistenceClient {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait(?Send)]
    impl PersistenceClient for HttpPersistenceClient {
        async fn submit(&self, request: &SaveConfigRequest) -> Result<Ack, SaveFailure> {
            let response = Request::post(&self.url)
                .json(request)
                .map_err(|e| SaveFailure::Transport(format!("request encode failed: {e}")))?
                .send()
                .await
                .map_err(|e| SaveFailure::Transport(format!("request failed: {e}")))?;

            let status = response.status();
            if !response.ok() {
                return Err(SaveFailure::HttpError { status });
            }

            let body = response
                .text()
                .await
                .map_err(|e| SaveFailure::Transport(format!("failed to read body: {e}")))?;

            interpret_response(status, &body)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_ack() {
        assert_eq!(interpret_response(200, "{}"), Ok(Ack));
        assert_eq!(interpret_response(200, r#"{"err":""}"#), Ok(Ack));
    }

    #[test]
    fn err_field_is_application_error() {
        let result = interpret_response(200, r#"{"err":"disk full"}"#);
        assert_eq!(
            result,
            Err(SaveFailure::ApplicationError("disk full".to_string()))
        );
        assert_eq!(result.unwrap_err().to_string(), "disk full");
    }

    #[test]
    fn bad_status_is_http_error_regardless_of_body() {
        let result = interpret_response(500, r#"{"err":"ignored"}"#);
        assert_eq!(result, Err(SaveFailure::HttpError { status: 500 }));
        assert!(result.unwrap_err().to_string().contains("500"));
    }

    #[test]
    fn unparsable_success_body_is_transport_failure() {
        let result = interpret_response(200, "<html>proxy error</html>");
        assert!(matches!(result, Err(SaveFailure::Transport(_))));
    }
}
