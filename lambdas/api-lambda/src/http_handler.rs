use filezen_shared::{auth, files, guard, session, AppState};
use lambda_http::{
    http::{Method, StatusCode},
    Body, Error, Request, Response,
};
use std::sync::Arc;

fn method_not_allowed() -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(
            serde_json::json!({"error": "Method not allowed"})
                .to_string()
                .into(),
        )
        .map_err(Box::new)?)
}

fn not_found() -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(serde_json::json!({"error": "Not found"}).to_string().into())
        .map_err(Box::new)?)
}

fn unauthorized() -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::UNAUTHORIZED)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(
            serde_json::json!({"error": "Not authenticated"})
                .to_string()
                .into(),
        )
        .map_err(Box::new)?)
}

/// Main Lambda handler - applies the route guard, then routes requests to
/// auth or file endpoints.
pub(crate) async fn function_handler(
    event: Request,
    state: Arc<AppState>,
) -> Result<Response<Body>, Error> {
    let method = event.method();
    let path = event.uri().path();
    let body = event.body();
    tracing::info!("API invoked - Method: {} Path: {}", method, path);

    // Handle CORS preflight
    if method == "OPTIONS" {
        return Ok(Response::builder()
            .status(StatusCode::OK)
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", "GET,POST,DELETE,OPTIONS")
            .header("Access-Control-Allow-Headers", "Content-Type")
            .body(Body::Empty)
            .map_err(Box::new)?);
    }

    // Route guard runs before anything else, for every request.
    let current_session = session::session_from_headers(event.headers(), &state.config.session_key);
    match guard::check(path, current_session.as_ref()) {
        guard::GuardDecision::RedirectToLogin => return guard::redirect("/login"),
        guard::GuardDecision::RedirectToDashboard => return guard::redirect("/dashboard"),
        guard::GuardDecision::PassThrough => {}
    }

    // Auth endpoints (no session required)
    if path == "/signup" {
        return match method {
            &Method::POST => auth::signup(&state.dynamo_client, &state.config, body).await,
            _ => method_not_allowed(),
        };
    }

    if path == "/login" {
        return match method {
            &Method::POST => auth::login(&state.dynamo_client, &state.config, body).await,
            _ => method_not_allowed(),
        };
    }

    if path == "/logout" {
        return match method {
            &Method::POST => auth::logout(&state.config).await,
            _ => method_not_allowed(),
        };
    }

    // File endpoints: the owning username always comes from the verified
    // session, never from the client.
    if path.starts_with("/files") {
        let Some(session) = current_session else {
            return unauthorized();
        };
        let username = session.username.as_str();
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        return match (method, parts.as_slice()) {
            // GET /files - list user's files
            (&Method::GET, ["files"]) => {
                files::list(&state.dynamo_client, &state.config, username).await
            }
            // POST /files - upload a file
            (&Method::POST, ["files"]) => {
                files::upload(
                    &state.dynamo_client,
                    &state.s3_client,
                    &state.http_client,
                    &state.config,
                    username,
                    body,
                )
                .await
            }
            // GET /files/{name}/share - presigned share link
            (&Method::GET, ["files", file_name, "share"]) => {
                files::share(&state.s3_client, &state.config, username, file_name).await
            }
            // GET /files/{name}/download - presigned download link
            (&Method::GET, ["files", file_name, "download"]) => {
                files::download(&state.s3_client, &state.config, username, file_name).await
            }
            // DELETE /files/{name} - delete object and metadata
            (&Method::DELETE, ["files", file_name]) => {
                files::delete(
                    &state.dynamo_client,
                    &state.s3_client,
                    &state.config,
                    username,
                    file_name,
                )
                .await
            }
            _ => not_found(),
        };
    }

    // No matching route
    tracing::warn!("No route matched - Method: {} Path: {}", method, path);
    not_found()
}

#[cfg(test)]
mod tests {
    use super::*;
    use filezen_shared::config::AppConfig;
    use lambda_http::http::HeaderValue;

    fn test_config() -> AppConfig {
        AppConfig {
            region: "ap-southeast-2".to_string(),
            bucket: "filezen-cloud".to_string(),
            users_table: "FileZenCloudUsers".to_string(),
            files_table: "FileZenCloudFiles".to_string(),
            session_key: "test-signing-key".to_string(),
            gemini_api_key: "test-api-key".to_string(),
            gemini_model: "gemini-2.0-flash".to_string(),
            secure_cookies: false,
        }
    }

    async fn test_state() -> Arc<AppState> {
        let aws_config = aws_config::load_from_env().await;
        AppState::new(
            aws_sdk_dynamodb::Client::new(&aws_config),
            aws_sdk_s3::Client::new(&aws_config),
            reqwest::Client::new(),
            test_config(),
        )
    }

    fn request(method: Method, path: &str) -> Request {
        let mut request = Request::default();
        *request.method_mut() = method;
        *request.uri_mut() = path.parse().unwrap();
        request
    }

    #[tokio::test]
    async fn test_unauthenticated_dashboard_redirects_to_login() {
        let state = test_state().await;
        let response = function_handler(request(Method::GET, "/dashboard"), state)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["Location"], "/login");
    }

    #[tokio::test]
    async fn test_authenticated_login_page_redirects_to_dashboard() {
        let state = test_state().await;
        let token = session::issue("alice", "test-signing-key");
        let mut request = request(Method::GET, "/login");
        request.headers_mut().insert(
            "cookie",
            HeaderValue::from_str(&format!("session={}", token)).unwrap(),
        );
        let response = function_handler(request, state).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["Location"], "/dashboard");
    }

    #[tokio::test]
    async fn test_file_routes_require_session() {
        let state = test_state().await;
        let response = function_handler(request(Method::GET, "/files"), state)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unmatched_route_is_not_found() {
        let state = test_state().await;
        let response = function_handler(request(Method::GET, "/nope"), state)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_login_page_method_routing() {
        let state = test_state().await;
        let response = function_handler(request(Method::DELETE, "/login"), state)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let state = test_state().await;
        let response = function_handler(request(Method::OPTIONS, "/files"), state)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["Access-Control-Allow-Origin"], "*");
    }
}
