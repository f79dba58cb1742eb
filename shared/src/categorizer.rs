use lambda_http::Error;
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;

const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Description string fed to the model, built from what we know about the
/// file before storing it.
pub fn file_description(file_name: &str, content_type: &str, file_size: usize) -> String {
    format!(
        "Filename: {}, Type: {}, Size: {} bytes",
        file_name, content_type, file_size
    )
}

fn prompt_for(file_description: &str) -> String {
    format!(
        "You are an AI assistant that suggests a category for a given file based on its description.\n\n\
         Description: {}\n\n\
         Reply with a single short category name and nothing else.",
        file_description
    )
}

fn extract_category(response: &GenerateContentResponse) -> Option<String> {
    let text = response
        .candidates
        .as_ref()?
        .first()?
        .content
        .as_ref()?
        .parts
        .as_ref()?
        .first()?
        .text
        .as_ref()?;

    // Models occasionally pad with whitespace or trailing lines; the
    // category is the first non-empty line.
    let category = text.lines().find(|l| !l.trim().is_empty())?.trim();
    if category.is_empty() {
        None
    } else {
        Some(category.to_string())
    }
}

/// Ask the external model for one suggested category. Failure here is fatal
/// to the caller's upload; there is no fallback category.
pub async fn categorize(
    http: &reqwest::Client,
    config: &AppConfig,
    file_description: &str,
) -> Result<String, Error> {
    let url = format!(
        "{}/{}:generateContent",
        GEMINI_ENDPOINT, config.gemini_model
    );

    let request = GenerateContentRequest {
        contents: vec![Content {
            parts: vec![Part {
                text: prompt_for(file_description),
            }],
        }],
    };

    let response = http
        .post(&url)
        .header("x-goog-api-key", &config.gemini_api_key)
        .json(&request)
        .send()
        .await
        .map_err(|e| Error::from(format!("Categorizer request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::from(format!(
            "Categorizer returned status {}",
            status
        )));
    }

    let body: GenerateContentResponse = response
        .json()
        .await
        .map_err(|e| Error::from(format!("Categorizer response unreadable: {}", e)))?;

    extract_category(&body).ok_or_else(|| Error::from("Categorizer returned no category"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_description_format() {
        assert_eq!(
            file_description("photo.png", "image/png", 2048),
            "Filename: photo.png, Type: image/png, Size: 2048 bytes"
        );
    }

    #[test]
    fn test_extract_category_from_response() {
        let body = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "Photos\n"}]}}
            ]
        }"#;
        let response: GenerateContentResponse = serde_json::from_str(body).unwrap();
        assert_eq!(extract_category(&response).unwrap(), "Photos");
    }

    #[test]
    fn test_extract_category_empty_response() {
        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(extract_category(&response).is_none());

        let blank = r#"{"candidates": [{"content": {"parts": [{"text": "  \n "}]}}]}"#;
        let response: GenerateContentResponse = serde_json::from_str(blank).unwrap();
        assert!(extract_category(&response).is_none());
    }
}
