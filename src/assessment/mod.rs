//! Eligibility assessment data model: the dynamic question set fetched
//! per country pair, the response sheet built from it, and the scored
//! result the platform hands back.

pub mod flow;
pub mod pending;
pub mod results;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionCategory {
    Personal,
    Employment,
    Financial,
    Travel,
    Legal,
    Health,
    Other,
}

/// One question of the fetched set. Immutable once retrieved for a given
/// origin/destination pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "question")]
    pub text: String,
    pub category: QuestionCategory,
    pub weight: f64,
    pub risk_factor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    pub order: i32,
}

/// One answer slot per question, created with a default `false` when the
/// questions arrive and mutated in place as the user answers. The list's
/// length and ordering always match the question list it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEntry {
    pub question_id: String,
    /// Text snapshot taken at fetch time; survives even if the catalog
    /// changes server-side later.
    pub question: String,
    pub answer: bool,
    pub weight: f64,
}

/// The atomic submission payload. Built at submission time, immutable
/// after send; the result is keyed by `session_id` server-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub session_id: String,
    pub from_country: String,
    pub to_country: String,
    pub responses: Vec<ResponseEntry>,
}

/// Acknowledgment for a submission; carries the id the result was
/// persisted under.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAck {
    pub session_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityStatus {
    Eligible,
    PotentiallyEligible,
    NeedsReview,
    NotEligible,
}

impl EligibilityStatus {
    pub fn label(&self) -> &'static str {
        match self {
            EligibilityStatus::Eligible => "Eligible",
            EligibilityStatus::PotentiallyEligible => "Potentially eligible",
            EligibilityStatus::NeedsReview => "Needs review",
            EligibilityStatus::NotEligible => "Not eligible",
        }
    }

    pub fn summary(&self) -> &'static str {
        match self {
            EligibilityStatus::Eligible => {
                "Congratulations! You have strong eligibility for immigration."
            }
            EligibilityStatus::PotentiallyEligible => {
                "You may be eligible with some improvements to your profile."
            }
            EligibilityStatus::NeedsReview => {
                "Your profile needs expert review for the best pathway forward."
            }
            EligibilityStatus::NotEligible => {
                "Your current profile faces significant challenges for immigration."
            }
        }
    }
}

/// Scored outcome, read-only from the client's perspective.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResult {
    pub session_id: String,
    pub score: f64,
    pub risk_level: RiskLevel,
    pub eligibility_status: EligibilityStatus,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub next_steps: Vec<String>,
    pub from_country: String,
    pub to_country: String,
    pub completed_at: DateTime<Utc>,
}

#[cfg(test)]
pub(crate) fn sample_questions() -> Vec<Question> {
    vec![
        Question {
            id: "q-travel".to_string(),
            text: "Have you traveled abroad in the last five years?".to_string(),
            category: QuestionCategory::Travel,
            weight: 2.0,
            risk_factor: "low".to_string(),
            help_text: None,
            order: 3,
        },
        Question {
            id: "q-employment".to_string(),
            text: "Do you currently hold a full-time job?".to_string(),
            category: QuestionCategory::Employment,
            weight: 3.0,
            risk_factor: "medium".to_string(),
            help_text: Some("Include self-employment.".to_string()),
            order: 1,
        },
        Question {
            id: "q-funds".to_string(),
            text: "Can you show sufficient settlement funds?".to_string(),
            category: QuestionCategory::Financial,
            weight: 5.0,
            risk_factor: "high".to_string(),
            help_text: None,
            order: 2,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_decodes_from_api_shape() {
        let body = r#"{
            "_id": "665f1c2ab8d34e0021aa0001",
            "question": "Do you currently hold a full-time job?",
            "category": "employment",
            "weight": 3,
            "riskFactor": "medium",
            "helpText": "Include self-employment.",
            "order": 1
        }"#;
        let question: Question = serde_json::from_str(body).unwrap();
        assert_eq!(question.id, "665f1c2ab8d34e0021aa0001");
        assert_eq!(question.category, QuestionCategory::Employment);
        assert_eq!(question.help_text.as_deref(), Some("Include self-employment."));
    }

    #[test]
    fn test_result_decodes_with_missing_lists() {
        let body = r#"{
            "sessionId": "7e7c7a9e-3d0f-4c58-9a3b-0d4f4f0c2a11",
            "score": 72.5,
            "riskLevel": "medium",
            "eligibilityStatus": "potentially_eligible",
            "fromCountry": "IN",
            "toCountry": "CA",
            "completedAt": "2025-11-03T10:15:30Z"
        }"#;
        let result: AssessmentResult = serde_json::from_str(body).unwrap();
        assert_eq!(result.eligibility_status, EligibilityStatus::PotentiallyEligible);
        assert!(result.recommendations.is_empty());
        assert!(result.next_steps.is_empty());
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&EligibilityStatus::NeedsReview).unwrap(),
            "\"needs_review\""
        );
        assert_eq!(serde_json::to_string(&RiskLevel::Low).unwrap(), "\"low\"");
    }
}
