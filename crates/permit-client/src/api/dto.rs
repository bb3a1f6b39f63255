use serde::{Deserialize, Serialize};

use crate::auth::UserProfile;

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyOtpRequest<'a> {
    pub email: &'a str,
    pub otp_code: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResendOtpRequest<'a> {
    pub email: &'a str,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VerifyOtpResponse {
    #[serde(default)]
    pub user: Option<UserProfile>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadResponse {
    pub url: String,
}
