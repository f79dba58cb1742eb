use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ========== USER ==========
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    pub username: String,
    #[serde(rename = "passwordHash")]
    pub password_hash: String,
}

// ========== FILE METADATA ==========
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FileMetadata {
    pub username: String,
    #[serde(rename = "fileName")]
    pub file_name: String,
    #[serde(rename = "fileUrl")]
    pub file_url: String,
    #[serde(rename = "fileSize")]
    pub file_size: u64,
    #[serde(rename = "uploadDate")]
    pub upload_date: String,
    #[serde(rename = "suggestedCategory")]
    pub suggested_category: String,
}

// ========== SESSION ==========
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionPayload {
    pub username: String,
    /// Unix seconds.
    #[serde(rename = "expiresAt")]
    pub expires_at: i64,
}

// ========== REQUESTS ==========
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UploadFileRequest {
    pub file_name: String,
    pub content_type: String,
    pub file_data: String, // base64 encoded
}

// ========== VALIDATION ==========
/// Outcome of validating form-shaped input: per-field errors reported
/// inline, or one message covering the whole action.
#[derive(Debug, PartialEq)]
pub enum ValidationError {
    FieldErrors(HashMap<String, Vec<String>>),
    Message(String),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
