use aws_sdk_dynamodb::Client as DynamoClient;
use aws_sdk_s3::Client as S3Client;
use base64::Engine;
use lambda_http::{http::StatusCode, Body, Error, Response};

use crate::categorizer;
use crate::config::AppConfig;
use crate::metadata;
use crate::s3;
use crate::types::{ErrorResponse, FileMetadata, UploadFileRequest, ValidationError};

/// Server-side upload cap, enforced regardless of any client-side limit.
const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

fn body_str(body: &Body) -> &str {
    match body {
        Body::Text(text) => text,
        Body::Binary(bytes) => std::str::from_utf8(bytes).unwrap_or(""),
        Body::Empty => "",
    }
}

fn json_response(
    status: StatusCode,
    body: serde_json::Value,
) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(body.to_string().into())
        .map_err(Box::new)?)
}

fn error_response(
    status: StatusCode,
    error: &str,
    message: &str,
) -> Result<Response<Body>, Error> {
    let error = ErrorResponse {
        error: error.to_string(),
        message: message.to_string(),
    };
    json_response(status, serde_json::to_value(&error)?)
}

/// Validate an upload before any store write happens.
fn validate_upload(file_name: &str, file_size: usize) -> Result<(), ValidationError> {
    if file_name.is_empty() || file_size == 0 {
        return Err(ValidationError::Message("File is required.".to_string()));
    }
    if file_size > MAX_FILE_SIZE {
        return Err(ValidationError::Message(
            "File size must be less than 10MB.".to_string(),
        ));
    }
    Ok(())
}

fn validation_response(error: ValidationError) -> Result<Response<Body>, Error> {
    match error {
        ValidationError::FieldErrors(fields) => json_response(
            StatusCode::BAD_REQUEST,
            serde_json::json!({"error": fields}),
        ),
        ValidationError::Message(message) => {
            error_response(StatusCode::BAD_REQUEST, "ValidationFailed", &message)
        }
    }
}

/// Upload workflow: validate, categorize, store the object, persist
/// metadata. Any failure after validation collapses into one generic
/// message; no partial-state cleanup is attempted, so an object write that
/// succeeds before a metadata failure leaves the stores diverged.
pub async fn upload(
    dynamo_client: &DynamoClient,
    s3_client: &S3Client,
    http_client: &reqwest::Client,
    config: &AppConfig,
    username: &str,
    body: &Body,
) -> Result<Response<Body>, Error> {
    let request: UploadFileRequest = match serde_json::from_str(body_str(body)) {
        Ok(req) => req,
        Err(e) => {
            tracing::error!("Failed to parse upload body: {}", e);
            return error_response(
                StatusCode::BAD_REQUEST,
                "InvalidRequest",
                &format!("Invalid request body: {}", e),
            );
        }
    };

    let file_bytes = match base64::engine::general_purpose::STANDARD.decode(&request.file_data) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!("Failed to decode upload payload: {}", e);
            return error_response(
                StatusCode::BAD_REQUEST,
                "InvalidRequest",
                "Invalid file data encoding.",
            );
        }
    };

    if let Err(validation) = validate_upload(&request.file_name, file_bytes.len()) {
        return validation_response(validation);
    }

    tracing::info!(
        "Uploading file {} ({} bytes) for user {}",
        request.file_name,
        file_bytes.len(),
        username
    );

    // 1. Get AI category. A categorizer failure is fatal to the upload; we
    // deliberately store no fallback category.
    let description = categorizer::file_description(
        &request.file_name,
        &request.content_type,
        file_bytes.len(),
    );
    let suggested_category =
        match categorizer::categorize(http_client, config, &description).await {
            Ok(category) => category,
            Err(e) => {
                tracing::error!("Categorizer failed: {}", e);
                return error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "UploadFailed",
                    "File upload failed. Please try again.",
                );
            }
        };

    // 2. Upload to S3.
    let file_size = file_bytes.len() as u64;
    let file_url = match s3::put_file(
        s3_client,
        config,
        username,
        &request.file_name,
        &request.content_type,
        file_bytes,
    )
    .await
    {
        Ok(url) => url,
        Err(e) => {
            tracing::error!("Object store write failed: {}", e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "UploadFailed",
                "File upload failed. Please try again.",
            );
        }
    };

    // 3. Save metadata to DynamoDB.
    let meta = FileMetadata {
        username: username.to_string(),
        file_name: request.file_name.clone(),
        file_url,
        file_size,
        upload_date: chrono::Utc::now().to_rfc3339(),
        suggested_category,
    };
    if let Err(e) = metadata::save_file_metadata(dynamo_client, &config.files_table, &meta).await
    {
        tracing::error!("Metadata write failed after object write: {}", e);
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "UploadFailed",
            "File upload failed. Please try again.",
        );
    }

    tracing::info!("Upload complete: {}/{}", username, request.file_name);
    json_response(
        StatusCode::CREATED,
        serde_json::json!({"success": "File uploaded successfully."}),
    )
}

/// List a user's files from the metadata store.
pub async fn list(
    dynamo_client: &DynamoClient,
    config: &AppConfig,
    username: &str,
) -> Result<Response<Body>, Error> {
    match metadata::get_files_for_user(dynamo_client, &config.files_table, username).await {
        Ok(files) => json_response(StatusCode::OK, serde_json::to_value(&files)?),
        Err(e) => {
            tracing::error!("Listing failed for {}: {}", username, e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "ListFailed",
                "Could not load files.",
            )
        }
    }
}

/// Issue a fresh presigned share link (1 hour). No existence check is made;
/// a stale metadata record yields a URL that 404s on use.
pub async fn share(
    s3_client: &S3Client,
    config: &AppConfig,
    username: &str,
    file_name: &str,
) -> Result<Response<Body>, Error> {
    match s3::presign_get(s3_client, config, username, file_name).await {
        Ok(url) => json_response(StatusCode::OK, serde_json::json!({"url": url})),
        Err(e) => {
            tracing::error!("Share failed for {}/{}: {}", username, file_name, e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "ShareFailed",
                "Could not generate share link.",
            )
        }
    }
}

/// Same presigned mechanism as share; the two differ only in caller intent.
pub async fn download(
    s3_client: &S3Client,
    config: &AppConfig,
    username: &str,
    file_name: &str,
) -> Result<Response<Body>, Error> {
    match s3::presign_get(s3_client, config, username, file_name).await {
        Ok(url) => json_response(StatusCode::OK, serde_json::json!({"url": url})),
        Err(e) => {
            tracing::error!("Download failed for {}/{}: {}", username, file_name, e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "DownloadFailed",
                "Could not generate download link.",
            )
        }
    }
}

/// Delete the object, then the metadata record. There is no compensating
/// transaction: if the first delete succeeds and the second fails, the two
/// stores diverge until the user retries.
pub async fn delete(
    dynamo_client: &DynamoClient,
    s3_client: &S3Client,
    config: &AppConfig,
    username: &str,
    file_name: &str,
) -> Result<Response<Body>, Error> {
    if let Err(e) = s3::delete_file(s3_client, config, username, file_name).await {
        tracing::error!("Object delete failed for {}/{}: {}", username, file_name, e);
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "DeleteFailed",
            "File deletion failed.",
        );
    }

    if let Err(e) =
        metadata::delete_file_metadata(dynamo_client, &config.files_table, username, file_name)
            .await
    {
        tracing::error!(
            "Metadata delete failed after object delete for {}/{}: {}",
            username,
            file_name,
            e
        );
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "DeleteFailed",
            "File deletion failed.",
        );
    }

    tracing::info!("Deleted {}/{}", username, file_name);
    json_response(
        StatusCode::OK,
        serde_json::json!({"success": "File deleted."}),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_upload_ok() {
        assert!(validate_upload("photo.png", 2048).is_ok());
        assert!(validate_upload("big.bin", MAX_FILE_SIZE).is_ok());
    }

    #[test]
    fn test_validate_upload_zero_size_rejected() {
        assert_eq!(
            validate_upload("photo.png", 0).unwrap_err(),
            ValidationError::Message("File is required.".to_string())
        );
    }

    #[test]
    fn test_validate_upload_missing_name_rejected() {
        assert_eq!(
            validate_upload("", 2048).unwrap_err(),
            ValidationError::Message("File is required.".to_string())
        );
    }

    #[test]
    fn test_validate_upload_oversize_rejected() {
        assert_eq!(
            validate_upload("big.bin", 11_000_000).unwrap_err(),
            ValidationError::Message("File size must be less than 10MB.".to_string())
        );
        assert_eq!(
            validate_upload("big.bin", MAX_FILE_SIZE + 1).unwrap_err(),
            ValidationError::Message("File size must be less than 10MB.".to_string())
        );
    }
}
