//! Realtime event channel: a live websocket connection held only while a
//! session exists, delivering server-pushed events that mutate UI state
//! out of band. Connection failures are logged, never surfaced.

use std::collections::HashSet;

use futures_util::StreamExt;
use log::{debug, error, info};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use serde::Deserialize;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::Message;
use url::Url;

use crate::config::Settings;
use crate::session;
use crate::ui::{self, Route};

/// Every event the server pushes over the channel. Frames arrive as
/// `{ "event": "<name>", "data": {...} }`; anything unrecognized decodes
/// to `Unknown` without killing the reader.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    #[serde(rename = "user:online")]
    UserOnline {
        #[serde(rename = "userId")]
        user_id: String,
    },
    #[serde(rename = "user:offline")]
    UserOffline {
        #[serde(rename = "userId")]
        user_id: String,
    },
    #[serde(rename = "notification:new")]
    Notification { message: String },
    #[serde(rename = "system:broadcast")]
    Broadcast {
        message: String,
        #[serde(rename = "type", default)]
        kind: Option<String>,
    },
    #[serde(rename = "auth:forceLogout")]
    ForceLogout {
        #[serde(default)]
        message: Option<String>,
    },
    #[serde(rename = "application:statusUpdated")]
    ApplicationStatusUpdated {
        #[serde(rename = "newStatus")]
        new_status: String,
    },
    #[serde(rename = "document:statusChanged")]
    DocumentStatusChanged {
        #[serde(rename = "newStatus")]
        new_status: String,
    },
    #[serde(rename = "payment:statusUpdate")]
    PaymentStatusUpdate { status: String },
    #[serde(rename = "comment:created")]
    CommentCreated(serde_json::Value),
    #[serde(rename = "application:userTyping")]
    UserTyping(serde_json::Value),
    #[serde(other)]
    Unknown,
}

struct ChannelHandle {
    task: JoinHandle<()>,
}

static CHANNEL: Lazy<Mutex<Option<ChannelHandle>>> = Lazy::new(|| Mutex::new(None));
static ONLINE_USERS: Lazy<Mutex<HashSet<String>>> = Lazy::new(|| Mutex::new(HashSet::new()));

/// Opens the channel, authenticating with the access credential current
/// at open time. Call when the session transitions absent -> present.
pub async fn connect(settings: &Settings) -> anyhow::Result<()> {
    if CHANNEL.lock().is_some() {
        debug!("Realtime channel already connected");
        return Ok(());
    }
    let token = session::access_token()
        .ok_or_else(|| anyhow::anyhow!("realtime channel requires an active session"))?;

    let url = Url::parse(&settings.events.url)?;
    let request = tokio_tungstenite::tungstenite::http::Request::builder()
        .uri(url.as_str())
        .header("Authorization", format!("Bearer {}", token))
        .body(())?;

    let (ws_stream, response) = connect_async(request).await?;
    info!("Realtime channel connected: {}", response.status());

    let (_write, mut read) = ws_stream.split();
    let task = tokio::spawn(async move {
        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => match serde_json::from_str::<ServerEvent>(&text) {
                    Ok(event) => dispatch(event),
                    Err(e) => debug!("Undecodable realtime frame: {}", e),
                },
                Ok(Message::Close(frame)) => {
                    if let Some(reason) = frame {
                        info!("Realtime channel closed: {}", reason);
                    } else {
                        info!("Realtime channel closed");
                    }
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    error!("Realtime channel error: {}", e);
                    break;
                }
            }
        }
        // Presence data is stale once the stream dies.
        ONLINE_USERS.lock().clear();
    });

    *CHANNEL.lock() = Some(ChannelHandle { task });
    Ok(())
}

/// Tears the connection down. Call when the session transitions
/// present -> absent; this is the one explicit resource-release point.
pub fn disconnect() {
    if let Some(handle) = CHANNEL.lock().take() {
        handle.task.abort();
        info!("Realtime channel disconnected");
    }
    ONLINE_USERS.lock().clear();
}

pub fn is_connected() -> bool {
    CHANNEL.lock().is_some()
}

/// Identities currently observed online via presence events.
pub fn online_users() -> Vec<String> {
    let mut users: Vec<String> = ONLINE_USERS.lock().iter().cloned().collect();
    users.sort();
    users
}

/// The single handler for every pushed event. Side effects only; no
/// request/response work happens here.
pub fn dispatch(event: ServerEvent) {
    match event {
        ServerEvent::UserOnline { user_id } => {
            ONLINE_USERS.lock().insert(user_id);
        }
        ServerEvent::UserOffline { user_id } => {
            ONLINE_USERS.lock().remove(&user_id);
        }
        ServerEvent::Notification { message } => ui::toast_info(message),
        ServerEvent::Broadcast { message, kind } => match kind.as_deref() {
            Some("error") => ui::toast_error(message),
            _ => ui::toast_info(message),
        },
        ServerEvent::ForceLogout { message } => {
            ui::toast_error(message.unwrap_or_else(|| "You have been logged out".to_string()));
            // Bypasses the normal teardown path: credentials are dropped
            // immediately, no remote logout call.
            session::clear_local();
            ui::navigate(Route::Login);
        }
        ServerEvent::ApplicationStatusUpdated { new_status } => {
            ui::toast_info(format!("Application status updated to: {}", new_status));
        }
        ServerEvent::DocumentStatusChanged { new_status } => {
            ui::toast_info(format!("Document {}", new_status));
        }
        ServerEvent::PaymentStatusUpdate { status } => {
            ui::toast_info(format!("Payment {}", status));
        }
        // Consumed by the owning view (comment threads, typing
        // indicators); nothing to do generically.
        ServerEvent::CommentCreated(_) | ServerEvent::UserTyping(_) => {}
        ServerEvent::Unknown => debug!("Unhandled realtime event"),
    }
}
