//! Authentication operations and the user identity model.

use log::info;
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::api::ApiClient;
use crate::error::{ApiError, Result};
use crate::session;
use crate::ui::{self, Route};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Applicant,
    CaseManager,
    Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub is_email_verified: bool,
    #[serde(default)]
    pub is_active: bool,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Registration payload, validated client-side before any request is
/// issued so the form can render field errors without a round trip.
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterData {
    #[validate(email(message = "valid email required"))]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "first name required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "last name required"))]
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// `{ user, accessToken, refreshToken }` returned by login and register.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthData {
    user: User,
    access_token: String,
    refresh_token: String,
}

pub async fn login(api: &ApiClient, email: &str, password: &str) -> Result<User> {
    let body = json!({ "email": email, "password": password });
    let data: AuthData = api.post("/auth/login", &body).await?;

    session::establish(data.user.clone(), data.access_token, data.refresh_token);
    info!("Logged in as {}", data.user.email);
    ui::toast_success("Login successful!");
    // Case-manager and admin surfaces live in the web app; every role
    // lands on the dashboard here.
    ui::navigate(Route::Dashboard);
    Ok(data.user)
}

pub async fn register(api: &ApiClient, data: &RegisterData) -> Result<User> {
    data.validate()
        .map_err(|e| ApiError::Validation { message: e.to_string() })?;

    let created: AuthData = api.post("/auth/register", data).await?;

    session::establish(
        created.user.clone(),
        created.access_token,
        created.refresh_token,
    );
    info!("Registered {}", created.user.email);
    ui::toast_success("Registration successful!");
    ui::navigate(Route::Dashboard);
    Ok(created.user)
}

/// Current identity per the remote service.
pub async fn me(api: &ApiClient) -> Result<User> {
    api.get("/auth/me").await
}

pub async fn change_password(api: &ApiClient, current: &str, new: &str) -> Result<()> {
    let body = json!({ "currentPassword": current, "newPassword": new });
    let _: serde_json::Value = api.put("/auth/change-password", &body).await?;
    ui::toast_success("Password changed successfully");
    Ok(())
}

/// Account-level profile fields (name, phone). Section-level applicant
/// profile data goes through the profile module instead.
pub async fn update_profile(api: &ApiClient, fields: &serde_json::Value) -> Result<User> {
    let user: User = api.put("/auth/update-profile", fields).await?;
    session::update_user(user.clone());
    ui::toast_success("Profile updated successfully");
    Ok(user)
}

#[cfg(test)]
pub(crate) fn test_user() -> User {
    User {
        id: "64b1f0a2c9e77a0012ab34cd".to_string(),
        email: "applicant@example.com".to_string(),
        first_name: "Asha".to_string(),
        last_name: "Patel".to_string(),
        role: Role::Applicant,
        phone: None,
        profile_image: None,
        is_email_verified: true,
        is_active: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_decodes_from_api_shape() {
        let body = r#"{
            "_id": "64b1f0a2c9e77a0012ab34cd",
            "email": "applicant@example.com",
            "firstName": "Asha",
            "lastName": "Patel",
            "role": "applicant",
            "isEmailVerified": true,
            "isActive": true
        }"#;
        let user: User = serde_json::from_str(body).unwrap();
        assert_eq!(user.id, "64b1f0a2c9e77a0012ab34cd");
        assert_eq!(user.role, Role::Applicant);
        assert_eq!(user.full_name(), "Asha Patel");
        assert!(user.phone.is_none());
    }

    #[test]
    fn test_role_wire_names() {
        assert_eq!(
            serde_json::to_string(&Role::CaseManager).unwrap(),
            "\"case_manager\""
        );
        assert_eq!(
            serde_json::from_str::<Role>("\"admin\"").unwrap(),
            Role::Admin
        );
    }

    #[test]
    fn test_register_validation_rejects_bad_input() {
        let base = RegisterData {
            email: "not-an-email".to_string(),
            password: "short".to_string(),
            first_name: String::new(),
            last_name: "Patel".to_string(),
            phone: None,
            role: None,
        };
        let errors = base.validate().unwrap_err();
        let fields: Vec<&str> = errors.field_errors().keys().copied().collect();
        assert!(fields.contains(&"email"));
        assert!(fields.contains(&"password"));
        assert!(fields.contains(&"first_name"));
    }

    #[test]
    fn test_register_serializes_camel_case_without_empty_options() {
        let data = RegisterData {
            email: "applicant@example.com".to_string(),
            password: "correcthorse".to_string(),
            first_name: "Asha".to_string(),
            last_name: "Patel".to_string(),
            phone: None,
            role: None,
        };
        let value = serde_json::to_value(&data).unwrap();
        assert!(value.get("firstName").is_some());
        assert!(value.get("phone").is_none());
        assert!(value.get("role").is_none());
    }
}
