use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::wire::{
    ErrorBody, GenerateFormEnvelope, GenerateFormRequest, MeansTestEnvelope, SessionEnvelope,
};
use super::{ApiResult, Collection, CreateSessionRequest, IntakeApi, UpdateStepRequest};
use crate::{
    config::Config,
    domain::{GeneratedForm, MeansTestResult, RecordId, Session, SessionId, SessionPatch, SessionSummary},
    errors::{ApiError, GENERIC_FAILURE_MESSAGE},
    storage::ClientStore,
};

const FALLBACK_STATUS_MESSAGE: &str = "Request failed";

/// Blocking JSON client for the intake REST API.
///
/// Every request carries `Content-Type: application/json`; when the token
/// source holds a token it is sent as `Authorization: Token <token>`. The
/// token is re-read per request so a login picked up mid-run takes effect.
pub struct HttpIntakeClient {
    agent: ureq::Agent,
    base_url: String,
    tokens: Option<Arc<dyn ClientStore>>,
}

impl HttpIntakeClient {
    pub fn new(config: &Config) -> Self {
        let mut builder = ureq::AgentBuilder::new();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        Self {
            agent: builder.build(),
            base_url: config.api_base_url.trim().trim_end_matches('/').to_string(),
            tokens: None,
        }
    }

    pub fn with_token_source(mut self, store: Arc<dyn ClientStore>) -> Self {
        self.tokens = Some(store);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn token(&self) -> Option<String> {
        let store = self.tokens.as_ref()?;
        match store.auth_token() {
            Ok(token) => token.filter(|t| !t.trim().is_empty()),
            Err(err) => {
                warn!(error = %err, "could not read auth token; sending request without it");
                None
            }
        }
    }

    /// Sends one request and returns the raw body, or `None` for 204.
    fn send(&self, method: &str, endpoint: &str, body: Option<&Value>) -> ApiResult<Option<String>> {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut request = self
            .agent
            .request(method, &url)
            .set("Content-Type", "application/json")
            .set("Accept", "application/json");
        if let Some(token) = self.token() {
            request = request.set("Authorization", &format!("Token {token}"));
        }

        debug!(method, url = %url, "sending intake request");
        let result = match body {
            Some(body) => request.send_string(&body.to_string()),
            None => request.call(),
        };

        match result {
            Ok(response) => {
                if response.status() == 204 {
                    return Ok(None);
                }
                response
                    .into_string()
                    .map(Some)
                    .map_err(|err| ApiError::Decode(err.to_string()))
            }
            Err(ureq::Error::Status(status, response)) => {
                let error = error_from_body(status, response.into_string().ok().as_deref());
                debug!(method, url = %url, status, error = %error, "intake request rejected");
                Err(error)
            }
            Err(ureq::Error::Transport(transport)) => {
                Err(ApiError::Transport(transport.to_string()))
            }
        }
    }

    fn json<T: DeserializeOwned>(
        &self,
        method: &str,
        endpoint: &str,
        body: Option<&Value>,
    ) -> ApiResult<T> {
        let text = self.send(method, endpoint, body)?;
        decode(text.as_deref().unwrap_or("null"))
    }

    fn discard(&self, method: &str, endpoint: &str, body: Option<&Value>) -> ApiResult<()> {
        self.send(method, endpoint, body).map(|_| ())
    }
}

fn decode<T: DeserializeOwned>(text: &str) -> ApiResult<T> {
    serde_json::from_str(text).map_err(|err| ApiError::Decode(err.to_string()))
}

fn encode<T: serde::Serialize>(value: &T) -> ApiResult<Value> {
    serde_json::to_value(value).map_err(|err| ApiError::Decode(err.to_string()))
}

/// Maps a non-success response to [`ApiError::Status`].
///
/// The message prefers the body's `message`, then `error`. A JSON body
/// without either keeps the whole body as details (framework field errors
/// arrive that way). A body that is not a JSON object gets the generic
/// message.
pub fn error_from_body(status: u16, body: Option<&str>) -> ApiError {
    let parsed = body.and_then(|text| {
        let value: Value = serde_json::from_str(text).ok()?;
        value.is_object().then_some(value)
    });
    let Some(value) = parsed else {
        return ApiError::Status {
            status,
            message: GENERIC_FAILURE_MESSAGE.to_string(),
            details: None,
        };
    };

    let envelope: ErrorBody = serde_json::from_value(value.clone()).unwrap_or_default();
    let ErrorBody {
        error,
        message,
        details,
    } = envelope;
    let described = message.is_some() || error.is_some();
    let message = message
        .or(error)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_STATUS_MESSAGE.to_string());
    let details = if described { details } else { Some(value) };

    ApiError::Status {
        status,
        message,
        details,
    }
}

impl IntakeApi for HttpIntakeClient {
    fn create_session(&self, request: &CreateSessionRequest) -> ApiResult<Session> {
        let body = encode(request)?;
        let envelope: SessionEnvelope = self.json("POST", "/intake/sessions/", Some(&body))?;
        Ok(envelope.session)
    }

    fn get_session(&self, id: SessionId) -> ApiResult<Session> {
        self.json("GET", &format!("/intake/sessions/{id}/"), None)
    }

    fn update_session(&self, id: SessionId, patch: &SessionPatch) -> ApiResult<Session> {
        let body = encode(patch)?;
        self.json("PATCH", &format!("/intake/sessions/{id}/"), Some(&body))
    }

    fn update_step(&self, id: SessionId, request: &UpdateStepRequest) -> ApiResult<Session> {
        let body = encode(request)?;
        let envelope: SessionEnvelope = self.json(
            "POST",
            &format!("/intake/sessions/{id}/update_step/"),
            Some(&body),
        )?;
        Ok(envelope.session)
    }

    fn complete_session(&self, id: SessionId) -> ApiResult<()> {
        self.discard("POST", &format!("/intake/sessions/{id}/complete/"), None)
    }

    fn calculate_means_test(&self, id: SessionId) -> ApiResult<MeansTestResult> {
        let envelope: MeansTestEnvelope = self.json(
            "POST",
            &format!("/intake/sessions/{id}/calculate_means_test/"),
            None,
        )?;
        Ok(envelope.means_test_result)
    }

    fn preview_form_101(&self, id: SessionId) -> ApiResult<Value> {
        self.json("GET", &format!("/intake/sessions/{id}/preview_form_101/"), None)
    }

    fn session_summary(&self, id: SessionId) -> ApiResult<SessionSummary> {
        self.json("GET", &format!("/intake/sessions/{id}/summary/"), None)
    }

    fn create_record(
        &self,
        collection: Collection,
        session: SessionId,
        body: &Value,
    ) -> ApiResult<Value> {
        let mut body = body.clone();
        match body.as_object_mut() {
            Some(map) => {
                map.insert("session".into(), Value::from(session));
            }
            None => {
                return Err(ApiError::Decode(format!(
                    "record body for {} must be a JSON object",
                    collection.path()
                )))
            }
        }
        self.json("POST", collection.path(), Some(&body))
    }

    fn update_record(
        &self,
        collection: Collection,
        id: RecordId,
        body: &Value,
    ) -> ApiResult<Value> {
        self.json("PATCH", &collection.record_path(id), Some(body))
    }

    fn delete_record(&self, collection: Collection, id: RecordId) -> ApiResult<()> {
        self.discard("DELETE", &collection.record_path(id), None)
    }

    fn generate_form_101(&self, session: SessionId) -> ApiResult<GeneratedForm> {
        let body = encode(&GenerateFormRequest {
            session_id: session,
        })?;
        let envelope: GenerateFormEnvelope =
            self.json("POST", "/forms/generate_form_101/", Some(&body))?;
        Ok(envelope.form)
    }

    fn mark_form_downloaded(&self, form: RecordId) -> ApiResult<()> {
        self.discard("POST", &format!("/forms/{form}/mark_downloaded/"), None)
    }

    fn mark_form_filed(&self, form: RecordId) -> ApiResult<()> {
        self.discard("POST", &format!("/forms/{form}/mark_filed/"), None)
    }
}
