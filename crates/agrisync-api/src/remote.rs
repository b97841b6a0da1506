//! REST implementation of IRemoteApi
//!
//! Maps the calendar service endpoints onto the remote port and normalizes
//! every failure into the two-way taxonomy the orchestrator's queueing
//! policy depends on:
//!
//! - transport errors (DNS, connect, timeout, aborted body) and
//!   retry-worthy statuses (408, 429, 5xx) become [`RemoteError::Network`];
//! - every remaining non-success status becomes [`RemoteError::Rejected`]
//!   with the server's message when one is present.
//!
//! One exception: `DELETE` of an event the server no longer has (404) is a
//! success. Deletion is idempotent end to end.

use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use agrisync_core::domain::calendar::{Calendar, Event};
use agrisync_core::domain::newtypes::{CalendarId, EventId};
use agrisync_core::ports::{IRemoteApi, RemoteError};

use crate::client::ApiClient;

/// Error body shape the calendar service uses for rejections
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// REST adapter implementing the remote API port
pub struct RestRemoteApi {
    client: ApiClient,
}

impl RestRemoteApi {
    /// Creates a new adapter around the given HTTP client
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Returns a reference to the underlying HTTP client
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Sends a request and normalizes transport failures
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<Response, RemoteError> {
        let mut request = self.client.request(method, path);
        if let Some(body) = body {
            request = request.json(body);
        }

        request
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))
    }

    /// Turns a non-success response into the normalized failure outcome
    async fn reject(response: Response) -> RemoteError {
        let status = response.status();

        if is_retryable_status(status) {
            return RemoteError::Network(format!("server returned {status}"));
        }

        let message = match response.text().await {
            Ok(body) => serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or(body),
            Err(_) => String::new(),
        };

        RemoteError::Rejected {
            status: status.as_u16(),
            message,
        }
    }

    /// Parses a success response body into the canonical record
    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, RemoteError> {
        // A mangled body means no definitive server answer reached us;
        // the queue may retry it like any other network-layer fault.
        response
            .json()
            .await
            .map_err(|e| RemoteError::Network(format!("failed to parse response body: {e}")))
    }

    /// Full request/response cycle for endpoints returning a record
    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<T, RemoteError> {
        let response = self.send(method, path, body).await?;

        if response.status().is_success() {
            Self::parse(response).await
        } else {
            Err(Self::reject(response).await)
        }
    }

    fn json_body<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, RemoteError> {
        serde_json::to_value(value)
            .map_err(|e| RemoteError::Network(format!("failed to encode request body: {e}")))
    }
}

/// Statuses that indicate no definitive rejection: worth retrying via the queue
fn is_retryable_status(status: StatusCode) -> bool {
    status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
}

#[async_trait::async_trait]
impl IRemoteApi for RestRemoteApi {
    async fn create_calendar(&self, calendar: &Calendar) -> Result<Calendar, RemoteError> {
        debug!(crop = %calendar.crop, "POST /calendars");
        let body = Self::json_body(calendar)?;
        self.execute(Method::POST, "/calendars", Some(&body)).await
    }

    async fn update_calendar(&self, calendar: &Calendar) -> Result<Calendar, RemoteError> {
        let id = calendar.id.as_ref().ok_or_else(|| RemoteError::Rejected {
            status: 400,
            message: "calendar has no server identifier".to_string(),
        })?;

        debug!(calendar = %id, "PUT /calendars/{{id}}");
        let body = Self::json_body(calendar)?;
        self.execute(Method::PUT, &format!("/calendars/{}", id.as_str()), Some(&body))
            .await
    }

    async fn list_calendars(&self) -> Result<Vec<Calendar>, RemoteError> {
        debug!("GET /calendars");
        self.execute(Method::GET, "/calendars", None).await
    }

    async fn create_event(
        &self,
        calendar_id: &CalendarId,
        event: &Event,
    ) -> Result<Event, RemoteError> {
        debug!(calendar = %calendar_id, kind = %event.kind, "POST /calendars/{{id}}/events");
        let body = Self::json_body(event)?;
        self.execute(
            Method::POST,
            &format!("/calendars/{}/events", calendar_id.as_str()),
            Some(&body),
        )
        .await
    }

    async fn update_event(
        &self,
        calendar_id: &CalendarId,
        event: &Event,
    ) -> Result<Event, RemoteError> {
        let id = event.id.as_ref().ok_or_else(|| RemoteError::Rejected {
            status: 400,
            message: "event has no server identifier".to_string(),
        })?;

        debug!(calendar = %calendar_id, event = %id, "PUT /calendars/{{id}}/events/{{eventId}}");
        let body = Self::json_body(event)?;
        self.execute(
            Method::PUT,
            &format!(
                "/calendars/{}/events/{}",
                calendar_id.as_str(),
                id.as_str()
            ),
            Some(&body),
        )
        .await
    }

    async fn delete_event(
        &self,
        calendar_id: &CalendarId,
        event_id: &EventId,
    ) -> Result<(), RemoteError> {
        debug!(calendar = %calendar_id, event = %event_id, "DELETE /calendars/{{id}}/events/{{eventId}}");

        let response = self
            .send(
                Method::DELETE,
                &format!(
                    "/calendars/{}/events/{}",
                    calendar_id.as_str(),
                    event_id.as_str()
                ),
                None,
            )
            .await?;

        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            return Ok(());
        }

        Err(Self::reject(response).await)
    }
}
