use log::{debug, info, warn};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Targets the client can navigate to. The rendering layer decides what
/// a route means (screen switch, URL change); logic modules only emit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
    Home,
    Assessment,
    AssessmentResults { session_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

/// Everything the logic layer is allowed to ask of the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Toast { level: ToastLevel, message: String },
    Navigate(Route),
}

static UI_SENDER: Lazy<Mutex<Option<UnboundedSender<UiEvent>>>> =
    Lazy::new(|| Mutex::new(None));

/// Attaches a subscriber and returns its receiving end. Replaces any
/// previous subscriber; events emitted with no subscriber attached are
/// logged and dropped so headless use keeps working.
pub fn subscribe() -> UnboundedReceiver<UiEvent> {
    let (tx, rx) = mpsc::unbounded_channel();
    *UI_SENDER.lock() = Some(tx);
    rx
}

pub fn emit(event: UiEvent) {
    let mut guard = UI_SENDER.lock();
    if let Some(sender) = guard.as_ref() {
        if sender.send(event.clone()).is_ok() {
            return;
        }
        // Receiver is gone; fall back to logging from here on.
        *guard = None;
    }
    match event {
        UiEvent::Toast { level, message } => match level {
            ToastLevel::Error => warn!("[toast] {}", message),
            _ => info!("[toast] {}", message),
        },
        UiEvent::Navigate(route) => debug!("[navigate] {:?}", route),
    }
}

pub fn toast_info(message: impl Into<String>) {
    emit(UiEvent::Toast {
        level: ToastLevel::Info,
        message: message.into(),
    });
}

pub fn toast_success(message: impl Into<String>) {
    emit(UiEvent::Toast {
        level: ToastLevel::Success,
        message: message.into(),
    });
}

pub fn toast_error(message: impl Into<String>) {
    emit(UiEvent::Toast {
        level: ToastLevel::Error,
        message: message.into(),
    });
}

pub fn navigate(route: Route) {
    emit(UiEvent::Navigate(route));
}

/// Serializes tests that observe the process-wide bus.
#[cfg(test)]
pub(crate) static TEST_BUS_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
