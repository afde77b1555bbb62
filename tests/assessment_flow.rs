//! End-to-end wizard scenarios over the public API: the full
//! answer-and-advance walkthrough, submission failure behavior, and the
//! result-retrieval redirect rules.

use std::sync::Mutex;

use visapath_lib::assessment::flow::{Advance, AssessmentFlow, Stage};
use visapath_lib::assessment::{Question, QuestionCategory};
use visapath_lib::config::{ApiSettings, EventSettings, Settings, StorageSettings};
use visapath_lib::ui::{self, Route, UiEvent};
use visapath_lib::{assessment, ApiClient};

/// Serializes the tests that observe the process-wide UI bus.
static BUS_GUARD: Mutex<()> = Mutex::new(());

fn question(id: &str, text: &str, order: i32) -> Question {
    Question {
        id: id.to_string(),
        text: text.to_string(),
        category: QuestionCategory::Personal,
        weight: 1.0,
        risk_factor: "low".to_string(),
        help_text: None,
        order,
    }
}

fn three_questions() -> Vec<Question> {
    vec![
        question("q1", "Do you have a valid passport?", 1),
        question("q2", "Do you have a job offer abroad?", 2),
        question("q3", "Can you fund your first year?", 3),
    ]
}

/// Client pointed at a port nothing listens on, so any request fails as
/// a network error without leaving the machine.
fn unreachable_client() -> ApiClient {
    let settings = Settings {
        api: ApiSettings {
            base_url: "http://127.0.0.1:59999/api/v1".to_string(),
            timeout_secs: 2,
            connect_timeout_secs: 1,
        },
        events: EventSettings {
            url: "ws://127.0.0.1:59999/events".to_string(),
        },
        storage: StorageSettings {
            dir: std::env::temp_dir().join("visapath-itest"),
        },
    };
    ApiClient::new(&settings).expect("client construction")
}

fn drain(rx: &mut tokio::sync::mpsc::UnboundedReceiver<UiEvent>) -> Vec<UiEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[test]
fn full_walkthrough_builds_the_expected_submission() {
    let mut flow = AssessmentFlow::new();
    assert!(flow.begin("IN", "CA"));
    flow.init_questions(three_questions());
    assert_eq!(flow.stage(), Stage::Questioning);

    // Answer yes to everything, advancing question by question.
    for expected_cursor in 0..3 {
        assert_eq!(flow.cursor(), expected_cursor);
        let id = flow.current_question().unwrap().id.clone();
        flow.answer(&id, true);
        let advance = flow.advance();
        if expected_cursor < 2 {
            assert_eq!(advance, Advance::Moved);
        } else {
            assert_eq!(advance, Advance::Submit);
        }
    }

    let submission = flow.build_submission();
    assert_eq!(submission.from_country, "IN");
    assert_eq!(submission.to_country, "CA");
    assert_eq!(submission.responses.len(), 3);
    assert!(submission.responses.iter().all(|r| r.answer));
    assert_eq!(
        submission
            .responses
            .iter()
            .map(|r| r.question_id.as_str())
            .collect::<Vec<_>>(),
        vec!["q1", "q2", "q3"]
    );
}

#[test]
fn going_back_rewrites_an_earlier_answer_in_place() {
    let mut flow = AssessmentFlow::new();
    assert!(flow.begin("PH", "AU"));
    flow.init_questions(three_questions());

    flow.answer("q1", true);
    flow.advance();
    flow.answer("q2", true);

    // Second thoughts about the first answer.
    flow.retreat();
    flow.answer("q1", false);

    let answers: Vec<bool> = flow.responses().iter().map(|r| r.answer).collect();
    assert_eq!(answers, vec![false, true, false]);
    assert_eq!(flow.responses().len(), 3);
}

#[tokio::test]
async fn failed_submission_preserves_cursor_and_surfaces_notification() {
    let _serial = BUS_GUARD.lock().unwrap();
    let api = unreachable_client();

    let mut flow = AssessmentFlow::new();
    assert!(flow.begin("IN", "CA"));
    flow.init_questions(three_questions());
    flow.answer("q1", true);
    flow.advance();
    flow.answer("q2", true);
    flow.advance();
    flow.answer("q3", true);
    assert_eq!(flow.advance(), Advance::Submit);

    let mut rx = ui::subscribe();
    let outcome = flow.submit(&api).await;
    assert!(outcome.is_err());

    // Cursor stays on the last question so the user can retry.
    assert_eq!(flow.cursor(), 2);

    let events = drain(&mut rx);
    assert!(events.iter().any(|e| matches!(
        e,
        UiEvent::Toast { message, .. } if message == "Failed to submit assessment"
    )));
    // No navigation happened.
    assert!(!events
        .iter()
        .any(|e| matches!(e, UiEvent::Navigate(_))));

    // A retry is a fresh submission with a fresh session id.
    let first = flow.build_submission();
    let second = flow.build_submission();
    assert_ne!(first.session_id, second.session_id);
}

#[tokio::test]
async fn result_fetch_without_session_id_redirects_without_a_network_call() {
    let _serial = BUS_GUARD.lock().unwrap();
    let api = unreachable_client();

    let mut rx = ui::subscribe();
    let outcome = assessment::results::fetch(&api, None).await;

    // Ok(None), not a network failure: no request was attempted.
    assert!(matches!(outcome, Ok(None)));
    let events = drain(&mut rx);
    assert_eq!(events, vec![UiEvent::Navigate(Route::Assessment)]);
}

#[tokio::test]
async fn failed_result_fetch_notifies_and_redirects_to_the_wizard() {
    let _serial = BUS_GUARD.lock().unwrap();
    let api = unreachable_client();

    let mut rx = ui::subscribe();
    let outcome = assessment::results::fetch(&api, Some("missing-session")).await;
    assert!(outcome.is_err());

    let events = drain(&mut rx);
    assert!(events.iter().any(|e| matches!(
        e,
        UiEvent::Toast { message, .. } if message == "Failed to fetch assessment results"
    )));
    assert!(events
        .iter()
        .any(|e| matches!(e, UiEvent::Navigate(Route::Assessment))));
}
