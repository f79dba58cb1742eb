use lambda_http::Error;
use std::env;

/// Immutable process configuration, read once at startup and carried in
/// `AppState`. Nothing else reads the environment after this point.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub region: String,
    pub bucket: String,
    pub users_table: String,
    pub files_table: String,
    pub session_key: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub secure_cookies: bool,
}

fn required(name: &str) -> Result<String, Error> {
    env::var(name).map_err(|_| Error::from(format!("{} must be set", name)))
}

impl AppConfig {
    pub fn from_env() -> Result<Self, Error> {
        let secure_cookies = match env::var("SECURE_COOKIES") {
            Ok(v) => !matches!(v.as_str(), "false" | "0"),
            Err(_) => true,
        };

        Ok(Self {
            region: required("AWS_REGION")?,
            bucket: required("S3_BUCKET_NAME")?,
            users_table: env::var("USERS_TABLE")
                .unwrap_or_else(|_| "FileZenCloudUsers".to_string()),
            files_table: env::var("FILES_TABLE")
                .unwrap_or_else(|_| "FileZenCloudFiles".to_string()),
            session_key: required("SESSION_SECRET_KEY")?,
            gemini_api_key: required("GEMINI_API_KEY")?,
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-2.0-flash".to_string()),
            secure_cookies,
        })
    }
}
