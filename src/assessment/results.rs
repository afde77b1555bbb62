//! Result retrieval: one fetch per scored session, plus the current
//! user's existing assessment lookup.

use log::info;

use crate::api::ApiClient;
use crate::error::Result;
use crate::ui::{self, Route};

use super::AssessmentResult;

/// Fetches the scored result for `session_id`. Without a session id in
/// context the UI is sent straight back to country selection and no
/// network call is attempted; a failed fetch surfaces a notification and
/// redirects the same way.
pub async fn fetch(api: &ApiClient, session_id: Option<&str>) -> Result<Option<AssessmentResult>> {
    let Some(session_id) = session_id else {
        ui::navigate(Route::Assessment);
        return Ok(None);
    };

    match api
        .get::<AssessmentResult>(&format!("/assessment/results/{}", session_id))
        .await
    {
        Ok(result) => {
            info!(
                "Result for session {}: score {:.0}, {}",
                session_id,
                result.score,
                result.eligibility_status.label()
            );
            Ok(Some(result))
        }
        Err(e) => {
            ui::toast_error("Failed to fetch assessment results");
            ui::navigate(Route::Assessment);
            Err(e)
        }
    }
}

/// The current user's persisted assessment, if one exists.
pub async fn my_assessment(api: &ApiClient) -> Result<Option<AssessmentResult>> {
    api.get_optional("/assessment/my-assessment").await
}
