//! Thin typed surfaces over the authenticated user's resources:
//! applicant profile sections, uploaded documents, family members, and
//! the application-status dashboard list.

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::ApiClient;
use crate::error::Result;
use crate::ui;

/// The named sections of the applicant profile document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    PersonalInfo,
    ContactInfo,
    Education,
    Employment,
    FinancialInfo,
    PassportInfo,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::PersonalInfo => "personalInfo",
            Section::ContactInfo => "contactInfo",
            Section::Education => "education",
            Section::Employment => "employment",
            Section::FinancialInfo => "financialInfo",
            Section::PassportInfo => "passportInfo",
        }
    }
}

/// Sectioned applicant profile. Sections stay loosely typed: their
/// fields are form-defined server-side and the client round-trips them
/// whole.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub personal_info: Option<Value>,
    #[serde(default)]
    pub contact_info: Option<Value>,
    #[serde(default)]
    pub education: Option<Value>,
    #[serde(default)]
    pub employment: Option<Value>,
    #[serde(default)]
    pub financial_info: Option<Value>,
    #[serde(default)]
    pub passport_info: Option<Value>,
    #[serde(default)]
    pub completion_percentage: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub document_type: Option<String>,
    pub status: String,
    #[serde(default)]
    pub uploaded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMember {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub relationship: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    /// Form-defined extras (nationality, passport number, ...) travel
    /// untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub visa_type: Option<String>,
    pub status: String,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

pub async fn get_profile(api: &ApiClient) -> Result<Profile> {
    api.get("/profile").await
}

/// Saves one profile section and returns the updated document.
pub async fn update_section(api: &ApiClient, section: Section, data: &Value) -> Result<Profile> {
    let body = json!({ "section": section.as_str(), "data": data });
    let profile: Profile = api.put("/profile", &body).await?;
    ui::toast_success("Profile updated successfully");
    Ok(profile)
}

pub async fn documents(api: &ApiClient) -> Result<Vec<DocumentRecord>> {
    api.get("/profile/documents").await
}

pub async fn delete_document(api: &ApiClient, id: &str) -> Result<()> {
    let _: Value = api.delete(&format!("/profile/documents/{}", id)).await?;
    info!("Deleted document {}", id);
    ui::toast_success("Document deleted");
    Ok(())
}

pub async fn family_members(api: &ApiClient) -> Result<Vec<FamilyMember>> {
    api.get("/profile/family-members").await
}

/// Creates or updates depending on whether the member already has an id.
pub async fn save_family_member(api: &ApiClient, member: &FamilyMember) -> Result<FamilyMember> {
    let saved = match &member.id {
        Some(id) => {
            api.put(&format!("/profile/family-members/{}", id), member)
                .await?
        }
        None => api.post("/profile/family-members", member).await?,
    };
    ui::toast_success("Family member saved");
    Ok(saved)
}

pub async fn delete_family_member(api: &ApiClient, id: &str) -> Result<()> {
    let _: Value = api
        .delete(&format!("/profile/family-members/{}", id))
        .await?;
    ui::toast_success("Family member removed");
    Ok(())
}

/// The user's applications for the status dashboard.
pub async fn applications(api: &ApiClient) -> Result<Vec<Application>> {
    api.get("/applications").await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_tolerates_sparse_documents() {
        let profile: Profile = serde_json::from_str(r#"{"_id":"p1"}"#).unwrap();
        assert_eq!(profile.id.as_deref(), Some("p1"));
        assert!(profile.personal_info.is_none());
        assert!(profile.completion_percentage.is_none());
    }

    #[test]
    fn test_family_member_round_trips_extras() {
        let body = r#"{
            "_id": "fm1",
            "firstName": "Ravi",
            "lastName": "Patel",
            "relationship": "spouse",
            "nationality": "IN"
        }"#;
        let member: FamilyMember = serde_json::from_str(body).unwrap();
        assert_eq!(member.extra.get("nationality").unwrap(), "IN");

        let back = serde_json::to_value(&member).unwrap();
        assert_eq!(back.get("nationality").unwrap(), "IN");
        assert_eq!(back.get("firstName").unwrap(), "Ravi");
    }

    #[test]
    fn test_new_family_member_serializes_without_id() {
        let member = FamilyMember {
            id: None,
            first_name: "Mira".to_string(),
            last_name: "Patel".to_string(),
            relationship: "child".to_string(),
            date_of_birth: Some("2015-02-11".to_string()),
            extra: serde_json::Map::new(),
        };
        let value = serde_json::to_value(&member).unwrap();
        assert!(value.get("_id").is_none());
        assert_eq!(value.get("dateOfBirth").unwrap(), "2015-02-11");
    }
}
