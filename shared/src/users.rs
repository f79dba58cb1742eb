use aws_sdk_dynamodb::{types::AttributeValue, Client as DynamoClient};
use lambda_http::Error;

use crate::types::User;

/// Failure modes for the conditional create. The uniqueness conflict is the
/// one case callers must tell apart from plain store failures.
#[derive(Debug)]
pub enum CreateUserError {
    UsernameExists,
    Store(Error),
}

/// Create a user record. The write is conditional on the username not
/// existing, so two concurrent signups for the same name cannot both
/// succeed.
pub async fn create_user(
    client: &DynamoClient,
    table_name: &str,
    user: &User,
) -> Result<(), CreateUserError> {
    let result = client
        .put_item()
        .table_name(table_name)
        .item("username", AttributeValue::S(user.username.clone()))
        .item(
            "passwordHash",
            AttributeValue::S(user.password_hash.clone()),
        )
        .condition_expression("attribute_not_exists(username)")
        .send()
        .await;

    match result {
        Ok(_) => Ok(()),
        Err(e) => {
            let service_err = e.into_service_error();
            if service_err.is_conditional_check_failed_exception() {
                Err(CreateUserError::UsernameExists)
            } else {
                Err(CreateUserError::Store(service_err.into()))
            }
        }
    }
}

/// Look up a user by username. Absent user is `Ok(None)`.
pub async fn get_user(
    client: &DynamoClient,
    table_name: &str,
    username: &str,
) -> Result<Option<User>, Error> {
    let result = client
        .get_item()
        .table_name(table_name)
        .key("username", AttributeValue::S(username.to_string()))
        .send()
        .await?;

    if let Some(item) = result.item() {
        let username = item
            .get("username")
            .and_then(|v| v.as_s().ok())
            .map(|s| s.to_string())
            .unwrap_or_default();
        let password_hash = item
            .get("passwordHash")
            .and_then(|v| v.as_s().ok())
            .map(|s| s.to_string())
            .unwrap_or_default();
        Ok(Some(User {
            username,
            password_hash,
        }))
    } else {
        Ok(None)
    }
}
