use aws_sdk_dynamodb::{types::AttributeValue, Client as DynamoClient};
use lambda_http::Error;

use crate::types::FileMetadata;

/// Persist a file's metadata record. Same (username, fileName) overwrites
/// the prior record, matching the object store's overwrite semantics.
pub async fn save_file_metadata(
    client: &DynamoClient,
    table_name: &str,
    meta: &FileMetadata,
) -> Result<(), Error> {
    client
        .put_item()
        .table_name(table_name)
        .item("username", AttributeValue::S(meta.username.clone()))
        .item("fileName", AttributeValue::S(meta.file_name.clone()))
        .item("fileUrl", AttributeValue::S(meta.file_url.clone()))
        .item("fileSize", AttributeValue::N(meta.file_size.to_string()))
        .item("uploadDate", AttributeValue::S(meta.upload_date.clone()))
        .item(
            "suggestedCategory",
            AttributeValue::S(meta.suggested_category.clone()),
        )
        .send()
        .await
        .map_err(|e| Error::from(format!("Failed to save file metadata: {}", e)))?;
    Ok(())
}

/// List all file records for a user, via a partition-key query.
pub async fn get_files_for_user(
    client: &DynamoClient,
    table_name: &str,
    username: &str,
) -> Result<Vec<FileMetadata>, Error> {
    let result = client
        .query()
        .table_name(table_name)
        .key_condition_expression("username = :username")
        .expression_attribute_values(":username", AttributeValue::S(username.to_string()))
        .send()
        .await
        .map_err(|e| Error::from(format!("Failed to query file metadata: {}", e)))?;

    let mut files = Vec::new();
    for item in result.items() {
        let file_name = item
            .get("fileName")
            .and_then(|v| v.as_s().ok())
            .map(|s| s.to_string())
            .unwrap_or_default();
        let file_url = item
            .get("fileUrl")
            .and_then(|v| v.as_s().ok())
            .map(|s| s.to_string())
            .unwrap_or_default();
        let file_size = item
            .get("fileSize")
            .and_then(|v| v.as_n().ok())
            .and_then(|n| n.parse::<u64>().ok())
            .unwrap_or(0);
        let upload_date = item
            .get("uploadDate")
            .and_then(|v| v.as_s().ok())
            .map(|s| s.to_string())
            .unwrap_or_default();
        let suggested_category = item
            .get("suggestedCategory")
            .and_then(|v| v.as_s().ok())
            .map(|s| s.to_string())
            .unwrap_or_default();

        files.push(FileMetadata {
            username: username.to_string(),
            file_name,
            file_url,
            file_size,
            upload_date,
            suggested_category,
        });
    }

    Ok(files)
}

/// Delete a file's metadata record.
pub async fn delete_file_metadata(
    client: &DynamoClient,
    table_name: &str,
    username: &str,
    file_name: &str,
) -> Result<(), Error> {
    client
        .delete_item()
        .table_name(table_name)
        .key("username", AttributeValue::S(username.to_string()))
        .key("fileName", AttributeValue::S(file_name.to_string()))
        .send()
        .await
        .map_err(|e| Error::from(format!("Failed to delete file metadata: {}", e)))?;
    Ok(())
}
