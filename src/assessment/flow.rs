//! The assessment wizard's state machine: country selection, question
//! retrieval, cursor-based answering, and the atomic scored submission.

use log::{info, warn};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::ApiClient;
use crate::error::{ApiError, Result};
use crate::ui::{self, Route};

use super::{Question, ResponseEntry, Submission, SubmitAck};

/// Where the wizard currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Picking the origin/destination pair; no question list yet.
    CountrySelection,
    /// A non-empty question list is loaded and the cursor is live.
    Questioning,
    /// The fetch succeeded but the pair has no questions; terminal
    /// display state, not an error.
    NoQuestions,
}

/// Outcome of a forward step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Moved,
    /// The cursor was already on the last question; submit instead.
    Submit,
}

pub struct AssessmentFlow {
    from_country: String,
    to_country: String,
    questions: Vec<Question>,
    responses: Vec<ResponseEntry>,
    cursor: usize,
    loaded: bool,
    submitting: bool,
}

impl AssessmentFlow {
    pub fn new() -> Self {
        Self {
            from_country: String::new(),
            to_country: String::new(),
            questions: Vec::new(),
            responses: Vec::new(),
            cursor: 0,
            loaded: false,
            submitting: false,
        }
    }

    pub fn stage(&self) -> Stage {
        if !self.loaded {
            Stage::CountrySelection
        } else if self.questions.is_empty() {
            Stage::NoQuestions
        } else {
            Stage::Questioning
        }
    }

    /// Locks in the country pair. Both sides must be non-empty to leave
    /// country selection; otherwise the validation message is surfaced
    /// and the wizard stays put.
    pub fn begin(&mut self, from_country: &str, to_country: &str) -> bool {
        if from_country.trim().is_empty() || to_country.trim().is_empty() {
            ui::toast_error("Please select both countries");
            return false;
        }
        self.from_country = from_country.trim().to_uppercase();
        self.to_country = to_country.trim().to_uppercase();
        true
    }

    pub fn from_country(&self) -> &str {
        &self.from_country
    }

    pub fn to_country(&self) -> &str {
        &self.to_country
    }

    /// Fetches the question set for the chosen pair and initializes the
    /// response sheet. On failure the wizard conceptually remains in
    /// country selection: no question list is populated.
    pub async fn load_questions(&mut self, api: &ApiClient) -> Result<()> {
        #[derive(Deserialize)]
        struct QuestionsData {
            questions: Vec<Question>,
        }

        let query = [
            ("fromCountry", self.from_country.clone()),
            ("toCountry", self.to_country.clone()),
        ];
        match api
            .get_with_query::<QuestionsData, _>("/assessment/questions", &query)
            .await
        {
            Ok(data) => {
                info!(
                    "Loaded {} questions for {} -> {}",
                    data.questions.len(),
                    self.from_country,
                    self.to_country
                );
                self.init_questions(data.questions);
                Ok(())
            }
            Err(e) => {
                ui::toast_error("Failed to fetch assessment questions");
                Err(e)
            }
        }
    }

    /// Installs a fetched question set: sorted by display order, one
    /// default-answered response per question, cursor reset.
    pub fn init_questions(&mut self, mut questions: Vec<Question>) {
        questions.sort_by_key(|q| q.order);
        self.responses = questions
            .iter()
            .map(|q| ResponseEntry {
                question_id: q.id.clone(),
                question: q.text.clone(),
                answer: false,
                weight: q.weight,
            })
            .collect();
        self.questions = questions;
        self.cursor = 0;
        self.loaded = true;
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.cursor)
    }

    pub fn responses(&self) -> &[ResponseEntry] {
        &self.responses
    }

    /// Overwrites the answer of the matching response. Does not advance
    /// the cursor; every other entry is untouched; an unknown id is a
    /// no-op.
    pub fn answer(&mut self, question_id: &str, value: bool) {
        match self
            .responses
            .iter_mut()
            .find(|r| r.question_id == question_id)
        {
            Some(entry) => entry.answer = value,
            None => warn!("Answer for unknown question {}", question_id),
        }
    }

    /// Steps forward, or signals submission when already on the last
    /// question. The cursor never moves past the end.
    pub fn advance(&mut self) -> Advance {
        if self.questions.is_empty() {
            return Advance::Moved;
        }
        if self.cursor < self.questions.len() - 1 {
            self.cursor += 1;
            Advance::Moved
        } else {
            Advance::Submit
        }
    }

    /// Steps back; no-op on the first question.
    pub fn retreat(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    /// Display progress through the question list, in percent.
    pub fn progress(&self) -> f64 {
        if self.questions.is_empty() {
            return 0.0;
        }
        100.0 * (self.cursor as f64 + 1.0) / self.questions.len() as f64
    }

    /// Bundles the full response sheet under a fresh session id.
    pub fn build_submission(&self) -> Submission {
        Submission {
            session_id: Uuid::new_v4().to_string(),
            from_country: self.from_country.clone(),
            to_country: self.to_country.clone(),
            responses: self.responses.clone(),
        }
    }

    /// Sends the whole sheet as one atomic submission. On success the
    /// UI is pointed at the result keyed by the returned session id; on
    /// failure the cursor stays on the last question so the user can
    /// retry without re-answering. Returns `None` when a submission is
    /// already in flight.
    pub async fn submit(&mut self, api: &ApiClient) -> Result<Option<String>> {
        if self.submitting {
            warn!("Submission already in flight, ignoring");
            return Ok(None);
        }
        self.submitting = true;
        let submission = self.build_submission();
        let outcome = api
            .post::<SubmitAck, _>("/assessment/submit", &submission)
            .await;
        self.submitting = false;

        match outcome {
            Ok(ack) => {
                info!("Assessment submitted as session {}", ack.session_id);
                ui::toast_success("Assessment completed successfully!");
                ui::navigate(Route::AssessmentResults {
                    session_id: ack.session_id.clone(),
                });
                Ok(Some(ack.session_id))
            }
            Err(e) => {
                // Authorization loss redirects to login; park the sheet
                // so the completion step can replay it afterwards.
                if matches!(e, ApiError::Unauthorized(_) | ApiError::RefreshFailed(_)) {
                    super::pending::store(&submission);
                    info!("Parked assessment for completion after sign-in");
                }
                ui::toast_error("Failed to submit assessment");
                Err(e)
            }
        }
    }
}

impl Default for AssessmentFlow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::sample_questions;

    fn questioning_flow() -> AssessmentFlow {
        let mut flow = AssessmentFlow::new();
        assert!(flow.begin("IN", "CA"));
        flow.init_questions(sample_questions());
        flow
    }

    #[test]
    fn test_begin_requires_both_countries() {
        let _serial = crate::ui::TEST_BUS_LOCK.lock();
        let mut flow = AssessmentFlow::new();
        assert!(!flow.begin("", "CA"));
        assert!(!flow.begin("IN", "  "));
        assert_eq!(flow.stage(), Stage::CountrySelection);
        assert!(flow.begin("in", "ca"));
        assert_eq!(flow.from_country(), "IN");
        assert_eq!(flow.to_country(), "CA");
    }

    #[test]
    fn test_init_builds_matching_response_sheet() {
        let flow = questioning_flow();
        assert_eq!(flow.stage(), Stage::Questioning);
        assert_eq!(flow.question_count(), 3);
        assert_eq!(flow.responses().len(), 3);

        // Sorted by display order, and each slot mirrors its question.
        let ids: Vec<&str> = flow
            .responses()
            .iter()
            .map(|r| r.question_id.as_str())
            .collect();
        assert_eq!(ids, vec!["q-employment", "q-funds", "q-travel"]);
        for (question, response) in flow.questions.iter().zip(flow.responses()) {
            assert_eq!(question.id, response.question_id);
            assert_eq!(question.text, response.question);
            assert_eq!(question.weight, response.weight);
            assert!(!response.answer);
        }
    }

    #[test]
    fn test_answer_changes_exactly_one_entry() {
        let mut flow = questioning_flow();
        let before = flow.responses().to_vec();

        flow.answer("q-funds", true);

        let after = flow.responses();
        for (old, new) in before.iter().zip(after) {
            if new.question_id == "q-funds" {
                assert!(new.answer);
            } else {
                assert_eq!(old, new);
            }
        }
        assert_eq!(flow.cursor(), 0);

        // Unknown ids change nothing.
        let before = flow.responses().to_vec();
        flow.answer("q-missing", true);
        assert_eq!(before, flow.responses());
    }

    #[test]
    fn test_advance_stops_at_last_and_signals_submit() {
        let mut flow = questioning_flow();
        assert_eq!(flow.advance(), Advance::Moved);
        assert_eq!(flow.advance(), Advance::Moved);
        assert_eq!(flow.cursor(), 2);
        assert_eq!(flow.advance(), Advance::Submit);
        assert_eq!(flow.cursor(), 2);
        // Asking again keeps signalling submit, never walks off the end.
        assert_eq!(flow.advance(), Advance::Submit);
        assert_eq!(flow.cursor(), 2);
    }

    #[test]
    fn test_retreat_at_zero_is_noop() {
        let mut flow = questioning_flow();
        flow.retreat();
        assert_eq!(flow.cursor(), 0);
        flow.advance();
        flow.retreat();
        assert_eq!(flow.cursor(), 0);
    }

    #[test]
    fn test_progress_is_monotonic_under_advance() {
        let mut flow = questioning_flow();
        let mut last = 0.0;
        loop {
            let progress = flow.progress();
            assert!(progress >= last);
            assert_eq!(
                progress,
                100.0 * (flow.cursor() as f64 + 1.0) / flow.question_count() as f64
            );
            last = progress;
            if flow.advance() == Advance::Submit {
                break;
            }
        }
        assert_eq!(flow.progress().round(), 100.0);
    }

    #[test]
    fn test_empty_question_list_is_terminal_display_state() {
        let mut flow = AssessmentFlow::new();
        assert!(flow.begin("IN", "CA"));
        flow.init_questions(Vec::new());
        assert_eq!(flow.stage(), Stage::NoQuestions);
        assert_eq!(flow.progress(), 0.0);
        assert_eq!(flow.advance(), Advance::Moved);
        assert_eq!(flow.cursor(), 0);
    }

    #[test]
    fn test_submission_bundles_everything_under_fresh_ids() {
        let mut flow = questioning_flow();
        for id in ["q-employment", "q-funds", "q-travel"] {
            flow.answer(id, true);
        }

        let first = flow.build_submission();
        assert_eq!(first.from_country, "IN");
        assert_eq!(first.to_country, "CA");
        assert_eq!(first.responses.len(), 3);
        assert!(first.responses.iter().all(|r| r.answer));
        assert!(Uuid::parse_str(&first.session_id).is_ok());

        // Each submission attempt gets its own id.
        let second = flow.build_submission();
        assert_ne!(first.session_id, second.session_id);
        assert_eq!(first.responses, second.responses);
    }
}
