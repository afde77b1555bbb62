//! A short-lived pending-submission record that survives an auth
//! redirect in the middle of the flow: the wizard parks its payload
//! here, and the completion step replays it once a session exists.

use log::info;

use crate::api::ApiClient;
use crate::error::Result;
use crate::session::{self, persist};
use crate::ui::{self, Route};

use super::{Submission, SubmitAck};

pub fn store(submission: &Submission) {
    persist::write_json(persist::PENDING_ASSESSMENT_FILE, submission);
}

pub fn load() -> Option<Submission> {
    persist::read_json(persist::PENDING_ASSESSMENT_FILE)
}

pub fn clear() {
    persist::remove(persist::PENDING_ASSESSMENT_FILE);
}

pub fn has_pending() -> bool {
    load().is_some()
}

/// Replays a parked submission after the user is back in a session.
/// Re-checks login, discards the record when the user already has a
/// persisted result, otherwise submits it and cleans up. Always ends on
/// a navigation so the flow cannot strand the user here.
pub async fn complete(api: &ApiClient) -> Result<()> {
    if session::current().is_none() {
        ui::toast_error("Please login first");
        ui::navigate(Route::Login);
        return Ok(());
    }

    let Some(pending) = load() else {
        ui::toast_info("No pending assessment found");
        ui::navigate(Route::Home);
        return Ok(());
    };

    match super::results::my_assessment(api).await {
        Ok(Some(_)) => {
            info!("Discarding pending assessment: one already exists");
            ui::toast_info("You already have a completed assessment");
            clear();
            ui::navigate(Route::Home);
            Ok(())
        }
        Ok(None) => match api.post::<SubmitAck, _>("/assessment/submit", &pending).await {
            Ok(ack) => {
                info!("Pending assessment saved as session {}", ack.session_id);
                ui::toast_success("Assessment saved successfully!");
                clear();
                ui::navigate(Route::Home);
                Ok(())
            }
            Err(e) => {
                ui::toast_error("Failed to save assessment");
                ui::navigate(Route::Home);
                Err(e)
            }
        },
        Err(e) => {
            ui::toast_error("Failed to save assessment");
            ui::navigate(Route::Home);
            Err(e)
        }
    }
}
