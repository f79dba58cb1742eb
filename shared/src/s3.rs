use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use lambda_http::Error;

use crate::config::AppConfig;

/// Presigned share links stay valid for one hour.
const PRESIGN_EXPIRY_SECS: u64 = 3600;

/// Objects live at `<username>/<fileName>` within the configured bucket.
/// A same-named re-upload silently overwrites the prior object.
pub fn object_key(username: &str, file_name: &str) -> String {
    format!("{}/{}", username, file_name)
}

/// Public-style URL for a stored object, following the bucket/region naming
/// convention.
pub fn object_url(config: &AppConfig, username: &str, file_name: &str) -> String {
    format!(
        "https://{}.s3.{}.amazonaws.com/{}",
        config.bucket,
        config.region,
        object_key(username, file_name)
    )
}

/// Upload a file's bytes and return its public-style URL.
pub async fn put_file(
    client: &S3Client,
    config: &AppConfig,
    username: &str,
    file_name: &str,
    content_type: &str,
    bytes: Vec<u8>,
) -> Result<String, Error> {
    let key = object_key(username, file_name);

    client
        .put_object()
        .bucket(&config.bucket)
        .key(&key)
        .body(ByteStream::from(bytes))
        .content_type(content_type)
        .send()
        .await
        .map_err(|e| Error::from(format!("Failed to upload to S3: {}", e)))?;

    Ok(object_url(config, username, file_name))
}

/// Delete a stored object. Deleting a missing key is not an error in S3.
pub async fn delete_file(
    client: &S3Client,
    config: &AppConfig,
    username: &str,
    file_name: &str,
) -> Result<(), Error> {
    client
        .delete_object()
        .bucket(&config.bucket)
        .key(object_key(username, file_name))
        .send()
        .await
        .map_err(|e| Error::from(format!("Failed to delete from S3: {}", e)))?;
    Ok(())
}

/// Generate a presigned GET URL (expires in 1 hour). No existence check is
/// made first; a stale caller gets a URL that 404s on use.
pub async fn presign_get(
    client: &S3Client,
    config: &AppConfig,
    username: &str,
    file_name: &str,
) -> Result<String, Error> {
    let presigned = client
        .get_object()
        .bucket(&config.bucket)
        .key(object_key(username, file_name))
        .presigned(aws_sdk_s3::presigning::PresigningConfig::expires_in(
            std::time::Duration::from_secs(PRESIGN_EXPIRY_SECS),
        )?)
        .await
        .map_err(|e| Error::from(format!("Failed to generate presigned URL: {}", e)))?;

    Ok(presigned.uri().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        AppConfig {
            region: "ap-southeast-2".to_string(),
            bucket: "filezen-cloud".to_string(),
            users_table: "FileZenCloudUsers".to_string(),
            files_table: "FileZenCloudFiles".to_string(),
            session_key: "k".to_string(),
            gemini_api_key: "k".to_string(),
            gemini_model: "gemini-2.0-flash".to_string(),
            secure_cookies: true,
        }
    }

    #[test]
    fn test_object_key_convention() {
        assert_eq!(object_key("alice", "photo.png"), "alice/photo.png");
    }

    #[test]
    fn test_object_url_convention() {
        assert_eq!(
            object_url(&config(), "alice", "photo.png"),
            "https://filezen-cloud.s3.ap-southeast-2.amazonaws.com/alice/photo.png"
        );
    }
}
