use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use aws_sdk_dynamodb::Client as DynamoClient;
use lambda_http::{http::StatusCode, Body, Error, Response};
use password_hash::{PasswordHash, SaltString};
use std::collections::HashMap;

use crate::config::AppConfig;
use crate::session;
use crate::types::{ErrorResponse, LoginRequest, SignupRequest, User, ValidationError};
use crate::users::{self, CreateUserError};

const MIN_USERNAME_LEN: usize = 3;
const MIN_PASSWORD_LEN: usize = 6;

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

/// Session response: the redirect target plus the Set-Cookie that carries
/// (or clears) the session token.
fn session_response(cookie: &str, redirect: &str) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .header("Set-Cookie", cookie)
        .body(
            serde_json::json!({"redirect": redirect})
                .to_string()
                .into(),
        )
        .map_err(Box::new)?)
}

/// Field-level validation for signup input.
fn validate_signup(username: &str, password: &str) -> Result<(), ValidationError> {
    let mut errors: HashMap<String, Vec<String>> = HashMap::new();
    if username.chars().count() < MIN_USERNAME_LEN {
        errors
            .entry("username".to_string())
            .or_default()
            .push("Username must be at least 3 characters".to_string());
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        errors
            .entry("password".to_string())
            .or_default()
            .push("Password must be at least 6 characters".to_string());
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::FieldErrors(errors))
    }
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

fn hash_password(password: &str) -> Result<String, Error> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes)
        .map_err(|e| Error::from(format!("Failed to generate salt: {}", e)))?;
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| Error::from(format!("Failed to encode salt: {}", e)))?;
    let argon2 = Argon2::default();
    let phc = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::from(format!("Failed to hash password: {}", e)))?
        .to_string();
    Ok(phc)
}

fn verify_password(hash: &str, password: &str) -> bool {
    if let Ok(parsed) = PasswordHash::new(hash) {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    } else {
        false
    }
}

/// Handle user signup: validate, conditionally create the record, issue a
/// session.
pub async fn signup(
    client: &DynamoClient,
    config: &AppConfig,
    body: &Body,
) -> Result<Response<Body>, Error> {
    tracing::info!("Signup request received");

    let request: SignupRequest = match serde_json::from_str(body_str(body)) {
        Ok(req) => req,
        Err(e) => {
            tracing::error!("Failed to parse signup body: {}", e);
            return error_response(
                StatusCode::BAD_REQUEST,
                "InvalidRequest",
                &format!("Invalid request body: {}", e),
            );
        }
    };

    if let Err(validation) = validate_signup(&request.username, &request.password) {
        return validation_response(validation);
    }

    let password_hash = match hash_password(&request.password) {
        Ok(h) => h,
        Err(e) => {
            tracing::error!("Password hashing failed: {}", e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "SignupFailed",
                "Registration failed. Please try again.",
            );
        }
    };

    let user = User {
        username: request.username.clone(),
        password_hash,
    };

    match users::create_user(client, &config.users_table, &user).await {
        Ok(()) => {
            tracing::info!("Signup successful for user: {}", request.username);
            let token = session::issue(&request.username, &config.session_key);
            session_response(
                &session::set_cookie(&token, config.secure_cookies),
                "/dashboard",
            )
        }
        Err(CreateUserError::UsernameExists) => {
            error_response(StatusCode::CONFLICT, "Conflict", "Username already exists")
        }
        Err(CreateUserError::Store(e)) => {
            tracing::error!("Signup store error: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "SignupFailed",
                "Registration failed. Please try again.",
            )
        }
    }
}

/// Handle user login. A missing user and a wrong password produce the same
/// generic message.
pub async fn login(
    client: &DynamoClient,
    config: &AppConfig,
    body: &Body,
) -> Result<Response<Body>, Error> {
    tracing::info!("Login request received");

    let request: LoginRequest = match serde_json::from_str(body_str(body)) {
        Ok(req) => req,
        Err(e) => {
            tracing::error!("Failed to parse login body: {}", e);
            return error_response(
                StatusCode::BAD_REQUEST,
                "InvalidRequest",
                &format!("Invalid request body: {}", e),
            );
        }
    };

    let user = match users::get_user(client, &config.users_table, &request.username).await {
        Ok(user) => user,
        Err(e) => {
            tracing::error!("Login store error: {}", e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "LoginFailed",
                "Login failed. Please try again.",
            );
        }
    };

    let authenticated = user
        .as_ref()
        .map(|u| verify_password(&u.password_hash, &request.password))
        .unwrap_or(false);

    if !authenticated {
        return error_response(
            StatusCode::UNAUTHORIZED,
            "AuthenticationFailed",
            "Invalid username or password",
        );
    }

    tracing::info!("Authentication successful for user: {}", request.username);
    let token = session::issue(&request.username, &config.session_key);
    session_response(
        &session::set_cookie(&token, config.secure_cookies),
        "/dashboard",
    )
}

/// Handle logout: clear the cookie. Idempotent, no server state to drop.
pub async fn logout(config: &AppConfig) -> Result<Response<Body>, Error> {
    session_response(&session::clear_cookie(config.secure_cookies), "/login")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_signup_ok() {
        assert!(validate_signup("bob", "secret").is_ok());
    }

    fn field_errors(result: Result<(), ValidationError>) -> HashMap<String, Vec<String>> {
        match result.unwrap_err() {
            ValidationError::FieldErrors(fields) => fields,
            other => panic!("expected field errors, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_signup_short_username() {
        let errors = field_errors(validate_signup("ab", "secret"));
        assert_eq!(
            errors["username"],
            vec!["Username must be at least 3 characters"]
        );
        assert!(!errors.contains_key("password"));
    }

    #[test]
    fn test_validate_signup_short_password() {
        let errors = field_errors(validate_signup("alice", "12345"));
        assert_eq!(
            errors["password"],
            vec!["Password must be at least 6 characters"]
        );
    }

    #[test]
    fn test_validate_signup_both_invalid() {
        let errors = field_errors(validate_signup("a", "b"));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("hunter2!").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(&hash, "hunter2!"));
        assert!(!verify_password(&hash, "hunter3!"));
    }

    #[test]
    fn test_verify_password_bad_hash() {
        assert!(!verify_password("not-a-phc-string", "whatever"));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same-password").unwrap();
        let b = hash_password("same-password").unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_logout_clears_cookie() {
        let config = AppConfig {
            region: "ap-southeast-2".to_string(),
            bucket: "filezen-cloud".to_string(),
            users_table: "FileZenCloudUsers".to_string(),
            files_table: "FileZenCloudFiles".to_string(),
            session_key: "test-signing-key".to_string(),
            gemini_api_key: "test-api-key".to_string(),
            gemini_model: "gemini-2.0-flash".to_string(),
            secure_cookies: true,
        };
        let response = logout(&config).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let cookie = response.headers()["Set-Cookie"].to_str().unwrap();
        assert!(cookie.starts_with("session=deleted;"));
        assert!(cookie.contains("Expires=Thu, 01 Jan 1970"));

        let body = String::from_utf8(response.body().to_vec()).unwrap();
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&body).unwrap()["redirect"],
            "/login"
        );
    }
}
