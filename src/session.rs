//! Server-sent event sessions
//!
//! A [`SessionStream`] announces where the client should POST its JSON-RPC
//! messages, then emits keep-alive comments until it is cancelled or dropped.
//! The heartbeat timer lives inside the stream, so dropping the stream on
//! client disconnect is what stops it.

use std::{
    pin::Pin,
    task::{Context, Poll},
    time::Duration,
};

use axum::response::sse::Event;
use chrono::{DateTime, Utc};
use futures::Stream;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::info;
use uuid::Uuid;

pub const ENDPOINT_EVENT: &str = "endpoint";
pub const KEEPALIVE_COMMENT: &str = "keepalive";

#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
        }
    }

    pub fn endpoint_url(&self, origin: &str) -> String {
        format!(
            "{}/messages?sessionId={}",
            origin.trim_end_matches('/'),
            self.id
        )
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionFrame {
    Endpoint(String),
    KeepAlive,
}

impl SessionFrame {
    pub fn into_event(self) -> Event {
        match self {
            Self::Endpoint(url) => Event::default().event(ENDPOINT_EVENT).data(url),
            Self::KeepAlive => Event::default().comment(KEEPALIVE_COMMENT),
        }
    }
}

pub struct SessionStream {
    session: Session,
    endpoint: Option<String>,
    heartbeat: Option<Interval>,
}

impl SessionStream {
    /// Opens a session whose endpoint event points at `origin`. The first
    /// heartbeat fires one full `heartbeat_every` after opening.
    pub fn open(origin: &str, heartbeat_every: Duration) -> Self {
        let session = Session::new();
        let endpoint = session.endpoint_url(origin);

        let mut heartbeat = interval_at(Instant::now() + heartbeat_every, heartbeat_every);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(session_id = %session.id, endpoint = %endpoint, "sse session opened");

        Self {
            session,
            endpoint: Some(endpoint),
            heartbeat: Some(heartbeat),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Stops the heartbeat and ends the stream. Safe to call repeatedly.
    pub fn cancel(&mut self) {
        self.endpoint = None;
        if self.heartbeat.take().is_some() {
            let lifetime = Utc::now() - self.session.created_at;
            info!(
                session_id = %self.session.id,
                lifetime_ms = lifetime.num_milliseconds(),
                "sse session closed"
            );
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.heartbeat.is_none()
    }
}

impl Stream for SessionStream {
    type Item = SessionFrame;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if let Some(url) = this.endpoint.take() {
            return Poll::Ready(Some(SessionFrame::Endpoint(url)));
        }

        match this.heartbeat.as_mut() {
            Some(heartbeat) => heartbeat
                .poll_tick(cx)
                .map(|_| Some(SessionFrame::KeepAlive)),
            None => Poll::Ready(None),
        }
    }
}

impl Drop for SessionStream {
    fn drop(&mut self) {
        self.cancel();
    }
}
