use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use dayplan_core::item::{CreateItem, UpdateItem};
use dayplan_core::user::Registration;
use dayplan_core::{Habit, ItemKey, ItemKind, Task, UserId};
use serde::de::DeserializeOwned;

use crate::client::RetryingClient;
use crate::transport::{ApiRequest, ApiResponse, ReqwestTransport, Transport};
use crate::{ServiceError, TrackerService};

/// HTTP client implementation of TrackerService.
/// Talks to the remote task/habit API.
pub struct HttpService<T = ReqwestTransport> {
    client: RetryingClient<T>,
}

impl HttpService {
    pub fn new(base_url: &str) -> Self {
        Self::with_transport(ReqwestTransport::new(base_url))
    }
}

impl<T: Transport> HttpService<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            client: RetryingClient::new(transport),
        }
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.client = self.client.with_retry_delay(delay);
        self
    }

    pub fn client(&self) -> &RetryingClient<T> {
        &self.client
    }

    async fn get_json<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R, ServiceError> {
        let resp = self.client.send(&request).await?;
        handle_response(resp)
    }

    async fn send_expect_ok(&self, request: ApiRequest) -> Result<(), ServiceError> {
        let resp = self.client.send(&request).await?;
        if resp.is_success() {
            Ok(())
        } else {
            Err(parse_error(&resp))
        }
    }
}

fn handle_response<R: DeserializeOwned>(resp: ApiResponse) -> Result<R, ServiceError> {
    if resp.is_success() {
        resp.json()
    } else {
        Err(parse_error(&resp))
    }
}

/// Map an error status to a `ServiceError`, pulling the server's message out
/// of a `detail` or `error` field when the body is JSON.
fn parse_error(resp: &ApiResponse) -> ServiceError {
    let detail = serde_json::from_str::<serde_json::Value>(&resp.body)
        .ok()
        .and_then(|v| {
            let field = v.get("detail").or_else(|| v.get("error"))?;
            Some(match field.as_str() {
                Some(s) => s.to_string(),
                None => field.to_string(),
            })
        })
        .unwrap_or_else(|| resp.body.trim().to_string());
    let detail = if detail.is_empty() {
        format!("HTTP {}", resp.status)
    } else {
        detail
    };

    match resp.status {
        404 => ServiceError::NotFound(detail),
        400 | 422 => ServiceError::InvalidInput(detail),
        status => ServiceError::Api { status, detail },
    }
}

#[async_trait]
impl<T: Transport> TrackerService for HttpService<T> {
    async fn register(&self, registration: &Registration) -> Result<(), ServiceError> {
        self.send_expect_ok(ApiRequest::post("/api/register").json(registration)?)
            .await
    }

    async fn list_tasks(
        &self,
        user_id: UserId,
        date: Option<NaiveDate>,
    ) -> Result<Vec<Task>, ServiceError> {
        let mut request = ApiRequest::get(format!("/api/tasks/{user_id}"));
        if let Some(date) = date {
            request = request.query("date", date.format("%Y-%m-%d"));
        }
        self.get_json(request).await
    }

    async fn list_habits(&self, user_id: UserId) -> Result<Vec<Habit>, ServiceError> {
        self.get_json(ApiRequest::get(format!("/api/habits/{user_id}")))
            .await
    }

    async fn add_item(&self, kind: ItemKind, input: &CreateItem) -> Result<(), ServiceError> {
        let path = format!("/api/{}/add", kind.collection());
        self.send_expect_ok(ApiRequest::post(path).json(input)?)
            .await
    }

    async fn toggle_item(&self, key: ItemKey) -> Result<(), ServiceError> {
        let path = format!("/api/{}/toggle/{}", key.kind.collection(), key.id);
        self.send_expect_ok(ApiRequest::post(path)).await
    }

    async fn update_item(&self, key: ItemKey, update: &UpdateItem) -> Result<(), ServiceError> {
        let path = format!("/api/{}/update/{}", key.kind.collection(), key.id);
        self.send_expect_ok(ApiRequest::post(path).json(update)?)
            .await
    }

    async fn delete_item(&self, key: ItemKey) -> Result<(), ServiceError> {
        let path = format!("/api/{}/{}", key.kind.collection(), key.id);
        self.send_expect_ok(ApiRequest::delete(path)).await
    }
}
