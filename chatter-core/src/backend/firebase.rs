use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use super::event_stream::EventStreamParser;
use super::tree::{apply_patch, apply_put, snapshot_from_value, TreeEvent};
use super::{BackendEvent, RealtimeBackend, Subscription};
use crate::config::{ChatterConfig, FirebaseConfig};
use crate::error::{ChatterError, ChatterResult, RetryConfig};
use crate::models::NewMessage;

/// Realtime Database over its REST interface. Reads stream as server-sent
/// events; writes are plain JSON requests.
pub struct FirebaseBackend {
    client: Client,
    credentials: FirebaseConfig,
    request_timeout: Duration,
    stream_idle_timeout: Duration,
    retry: RetryConfig,
}

#[derive(Debug, Deserialize)]
struct PushResponse {
    name: String,
}

impl FirebaseBackend {
    pub fn new(config: &ChatterConfig) -> ChatterResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.network.connect_timeout_secs))
            .build()
            .map_err(|e| ChatterError::Internal(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            credentials: config.firebase.clone(),
            request_timeout: Duration::from_secs(config.network.request_timeout_secs),
            stream_idle_timeout: Duration::from_secs(config.network.stream_idle_timeout_secs),
            retry: RetryConfig::for_subscription(config.network.reconnect_max_attempts),
        })
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_stream_idle_timeout(mut self, timeout: Duration) -> Self {
        self.stream_idle_timeout = timeout;
        self
    }

    pub fn credentials(&self) -> &FirebaseConfig {
        &self.credentials
    }

    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}.json",
            self.credentials.database_url.trim().trim_end_matches('/'),
            path.trim_matches('/')
        )
    }

    fn with_auth(&self, request: RequestBuilder) -> RequestBuilder {
        with_auth(request, self.credentials.auth_token.as_deref())
    }
}

fn with_auth(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) if !token.is_empty() => request.query(&[("auth", token)]),
        _ => request,
    }
}

async fn check_status(response: Response) -> ChatterResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or(body);
    Err(ChatterError::from_status(status.as_u16(), message))
}

#[async_trait]
impl RealtimeBackend for FirebaseBackend {
    fn name(&self) -> &str {
        "firebase"
    }

    fn subscribe(&self, path: &str, sink: UnboundedSender<BackendEvent>) -> Subscription {
        let stream = EventStreamTask {
            client: self.client.clone(),
            url: self.url_for(path),
            auth_token: self.credentials.auth_token.clone(),
            idle_timeout: self.stream_idle_timeout,
            retry: self.retry.clone(),
        };
        let handle = tokio::spawn(stream.run(sink));
        Subscription::new(path, handle)
    }

    async fn push(&self, path: &str, message: &NewMessage) -> ChatterResult<String> {
        let url = self.url_for(path);
        debug!(url = %url, "Pushing message");

        let request = self
            .client
            .post(&url)
            .timeout(self.request_timeout)
            .json(message);
        let response = check_status(self.with_auth(request).send().await?).await?;

        let body: PushResponse = response
            .json()
            .await
            .map_err(|e| ChatterError::InvalidPayload(format!("push response: {}", e)))?;
        debug!(key = %body.name, "Message stored");
        Ok(body.name)
    }

    async fn remove(&self, path: &str) -> ChatterResult<()> {
        let url = self.url_for(path);
        info!(url = %url, "Removing collection");

        let request = self.client.delete(&url).timeout(self.request_timeout);
        check_status(self.with_auth(request).send().await?).await?;
        Ok(())
    }
}

enum StreamEnd {
    /// Server revoked the listener; do not reconnect
    Cancelled(String),
    /// Stream dropped or failed; reconnect
    Broken(ChatterError),
    /// Nobody is listening anymore
    SinkClosed,
}

struct EventStreamTask {
    client: Client,
    url: String,
    auth_token: Option<String>,
    /// Longest silence tolerated, both waiting for headers and between chunks
    idle_timeout: Duration,
    retry: RetryConfig,
}

impl EventStreamTask {
    async fn run(self, sink: UnboundedSender<BackendEvent>) {
        let mut attempt: u32 = 0;

        loop {
            if sink.is_closed() {
                return;
            }

            match self.open().await {
                Ok(response) => {
                    info!(url = %self.url, attempt, "Subscription connected");
                    match self.pump(response, &sink, &mut attempt).await {
                        StreamEnd::SinkClosed => return,
                        StreamEnd::Cancelled(reason) => {
                            let err = ChatterError::SubscriptionCancelled(reason);
                            err.log();
                            let _ = sink.send(BackendEvent::Error(err));
                            return;
                        }
                        StreamEnd::Broken(err) => {
                            err.log();
                            if sink.send(BackendEvent::Error(err)).is_err() {
                                return;
                            }
                        }
                    }
                }
                Err(err) => {
                    err.log();
                    let terminal = matches!(err, ChatterError::PermissionDenied(_));
                    if sink.send(BackendEvent::Error(err)).is_err() || terminal {
                        return;
                    }
                }
            }

            if !self.retry.allows_attempt(attempt) {
                warn!(
                    url = %self.url,
                    attempts = attempt,
                    "Giving up on subscription after repeated failures"
                );
                return;
            }

            let delay = self.retry.delay_for_attempt(attempt);
            attempt += 1;
            info!(
                url = %self.url,
                attempt,
                delay_ms = delay.as_millis() as u64,
                "Reconnecting subscription"
            );
            tokio::time::sleep(delay).await;
        }
    }

    async fn open(&self) -> ChatterResult<Response> {
        let request = self
            .client
            .get(&self.url)
            .header(ACCEPT, "text/event-stream");
        let send = with_auth(request, self.auth_token.as_deref()).send();
        let response = tokio::time::timeout(self.idle_timeout, send)
            .await
            .map_err(|_| self.idle_error())??;
        check_status(response).await
    }

    fn idle_error(&self) -> ChatterError {
        warn!(
            url = %self.url,
            idle_ms = self.idle_timeout.as_millis() as u64,
            "Event stream went silent"
        );
        ChatterError::Timeout(self.idle_timeout.as_secs())
    }

    async fn pump(
        &self,
        response: Response,
        sink: &UnboundedSender<BackendEvent>,
        attempt: &mut u32,
    ) -> StreamEnd {
        let mut tree = Value::Null;
        let mut parser = EventStreamParser::new();
        let mut body = response.bytes_stream();

        loop {
            let next = match tokio::time::timeout(self.idle_timeout, body.next()).await {
                Ok(next) => next,
                Err(_) => return StreamEnd::Broken(self.idle_error()),
            };
            let Some(chunk) = next else {
                break;
            };
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => return StreamEnd::Broken(ChatterError::StreamClosed(e.to_string())),
            };

            for event in parser.feed(&chunk) {
                let changed = match TreeEvent::from_server_event(&event) {
                    Ok(TreeEvent::Put { path, data }) => {
                        debug!(path = %path, "put");
                        apply_put(&mut tree, &path, data);
                        true
                    }
                    Ok(TreeEvent::Patch { path, data }) => {
                        debug!(path = %path, "patch");
                        match apply_patch(&mut tree, &path, data) {
                            Ok(()) => true,
                            Err(e) => {
                                warn!("Ignoring malformed patch: {}", e);
                                false
                            }
                        }
                    }
                    Ok(TreeEvent::KeepAlive) => {
                        debug!("keep-alive");
                        false
                    }
                    Ok(TreeEvent::Cancel(reason)) => return StreamEnd::Cancelled(reason),
                    Ok(TreeEvent::AuthRevoked) => {
                        return StreamEnd::Broken(ChatterError::PermissionDenied(
                            "auth token revoked".to_string(),
                        ))
                    }
                    Ok(TreeEvent::Other(name)) => {
                        debug!(event = %name, "Ignoring unknown stream event");
                        false
                    }
                    Err(e) => {
                        warn!("Ignoring malformed stream event: {}", e);
                        false
                    }
                };

                if changed {
                    *attempt = 0;
                    let snapshot = snapshot_from_value(&tree);
                    if sink.send(BackendEvent::Snapshot(snapshot)).is_err() {
                        return StreamEnd::SinkClosed;
                    }
                }
            }
        }

        StreamEnd::Broken(ChatterError::StreamClosed(
            "server closed the event stream".to_string(),
        ))
    }
}
