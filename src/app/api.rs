// Communication with the hosted backend.
// Auth lives under /auth/v1, the tasks table under /rest/v1/tasks.
use std::cell::RefCell;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use crate::app::config::AppConfig;
use crate::app::models::{NewTask, Session, Task, TaskId, TaskPatch};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    // The backend's own message, surfaced verbatim where the UI shows errors.
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("no active session")]
    NoSession,
    #[error("malformed response from the backend")]
    Malformed,
}

/// The capabilities the rest of the app needs from the backend: the session
/// provider and the tasks table. Screens and the task store take this as an
/// injected dependency instead of reaching for ambient state.
pub trait Remote {
    /// The active session, if any.
    fn get_session(&self) -> Option<Session>;

    /// Create an account. Any session the backend returns is stored.
    fn sign_up(&self, email: &str, password: &str, display_name: &str) -> Result<(), ApiError>;

    /// Exchange credentials for a session.
    fn sign_in(&self, email: &str, password: &str) -> Result<(), ApiError>;

    /// Drop the local session and revoke it server-side.
    fn sign_out(&self) -> Result<(), ApiError>;

    /// All tasks owned by `owner_id`, newest first.
    fn list_tasks(&self, owner_id: &str) -> Result<Vec<Task>, ApiError>;

    /// Insert a task and return the server-assigned record.
    fn insert_task(&self, new_task: &NewTask) -> Result<Task, ApiError>;

    /// Apply a single-field patch to one task.
    fn update_task(&self, id: TaskId, patch: &TaskPatch) -> Result<(), ApiError>;

    /// Remove one task by id.
    fn delete_task(&self, id: TaskId) -> Result<(), ApiError>;
}

pub struct ApiClient {
    http: Client,
    base_url: String,
    api_key: String,
    session: RefCell<Option<Session>>,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
}

// Signup may come back without a token on deployments that require email
// confirmation; the session is only stored when both parts are present.
#[derive(Debug, Deserialize)]
struct AuthResponse {
    access_token: Option<String>,
    user: Option<AuthUser>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
}

impl ApiClient {
    pub fn new(config: &AppConfig) -> Result<ApiClient, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(ApiClient {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            session: RefCell::new(None),
        })
    }

    fn bearer_token(&self) -> Result<String, ApiError> {
        self.session
            .borrow()
            .as_ref()
            .map(|session| session.access_token.clone())
            .ok_or(ApiError::NoSession)
    }

    fn store_session(&self, response: AuthResponse) {
        if let (Some(access_token), Some(user)) = (response.access_token, response.user) {
            *self.session.borrow_mut() = Some(Session {
                user_id: user.id,
                access_token,
            });
        }
    }
}

impl Remote for ApiClient {
    fn get_session(&self) -> Option<Session> {
        self.session.borrow().clone()
    }

    fn sign_up(&self, email: &str, password: &str, display_name: &str) -> Result<(), ApiError> {
        let response = self
            .http
            .post(format!("{}/auth/v1/signup", self.base_url))
            .header("apikey", &self.api_key)
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "data": { "full_name": display_name },
            }))
            .send()?;
        let body: AuthResponse = check(response)?.json()?;
        self.store_session(body);
        Ok(())
    }

    fn sign_in(&self, email: &str, password: &str) -> Result<(), ApiError> {
        let response = self
            .http
            .post(format!(
                "{}/auth/v1/token?grant_type=password",
                self.base_url
            ))
            .header("apikey", &self.api_key)
            .json(&serde_json::json!({
                "email": email,
                "password": password,
            }))
            .send()?;
        let body: AuthResponse = check(response)?.json()?;
        self.store_session(body);
        Ok(())
    }

    // The local session is gone either way; the server call just revokes the token.
    fn sign_out(&self) -> Result<(), ApiError> {
        let session = self.session.borrow_mut().take().ok_or(ApiError::NoSession)?;
        let response = self
            .http
            .post(format!("{}/auth/v1/logout", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(session.access_token)
            .send()?;
        check(response)?;
        Ok(())
    }

    fn list_tasks(&self, owner_id: &str) -> Result<Vec<Task>, ApiError> {
        let token = self.bearer_token()?;
        let owner_filter = format!("eq.{owner_id}");
        let response = self
            .http
            .get(format!("{}/rest/v1/tasks", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .query(&[
                ("select", "*"),
                ("owner_id", owner_filter.as_str()),
                ("order", "created_at.desc"),
            ])
            .send()?;
        let tasks: Vec<Task> = check(response)?.json()?;
        debug!(count = tasks.len(), "fetched tasks");
        Ok(tasks)
    }

    fn insert_task(&self, new_task: &NewTask) -> Result<Task, ApiError> {
        let token = self.bearer_token()?;
        let response = self
            .http
            .post(format!("{}/rest/v1/tasks", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .header("Prefer", "return=representation")
            .json(new_task)
            .send()?;
        let rows: Vec<Task> = check(response)?.json()?;
        rows.into_iter().next().ok_or(ApiError::Malformed)
    }

    fn update_task(&self, id: TaskId, patch: &TaskPatch) -> Result<(), ApiError> {
        let token = self.bearer_token()?;
        let id_filter = format!("eq.{id}");
        let response = self
            .http
            .patch(format!("{}/rest/v1/tasks", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .query(&[("id", id_filter.as_str())])
            .json(patch)
            .send()?;
        check(response)?;
        Ok(())
    }

    fn delete_task(&self, id: TaskId) -> Result<(), ApiError> {
        let token = self.bearer_token()?;
        let id_filter = format!("eq.{id}");
        let response = self
            .http
            .delete(format!("{}/rest/v1/tasks", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .query(&[("id", id_filter.as_str())])
            .send()?;
        check(response)?;
        Ok(())
    }
}

fn check(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let body = response.text().unwrap_or_default();
        Err(rejection(status, &body))
    }
}

// Pull the human-readable message out of an error body. Auth and table errors
// use different field names, so all the known ones are tried.
fn rejection(status: StatusCode, body: &str) -> ApiError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.msg.or(body.message).or(body.error_description))
        .unwrap_or_else(|| format!("request failed with status {status}"));
    ApiError::Rejected {
        status: status.as_u16(),
        message,
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::{Priority, Status};

    #[test]
    fn patch_serializes_only_the_changed_field() {
        let patch = serde_json::to_value(TaskPatch::status(Status::Done)).unwrap();
        assert_eq!(patch, serde_json::json!({ "status": "done" }));

        let patch = serde_json::to_value(TaskPatch::priority(Priority::High)).unwrap();
        assert_eq!(patch, serde_json::json!({ "priority": "high" }));
    }

    #[test]
    fn rejection_surfaces_the_backend_message_verbatim() {
        let err = rejection(
            StatusCode::UNPROCESSABLE_ENTITY,
            "{\"msg\":\"User already registered\"}",
        );
        assert_eq!(err.to_string(), "User already registered");

        let err = rejection(
            StatusCode::BAD_REQUEST,
            "{\"error_description\":\"Invalid login credentials\"}",
        );
        assert_eq!(err.to_string(), "Invalid login credentials");

        let err = rejection(
            StatusCode::CONFLICT,
            "{\"message\":\"duplicate key value violates unique constraint\"}",
        );
        assert_eq!(
            err.to_string(),
            "duplicate key value violates unique constraint"
        );
    }

    #[test]
    fn rejection_without_a_message_falls_back_to_the_status() {
        let err = rejection(StatusCode::BAD_GATEWAY, "<html>nope</html>");
        assert_eq!(err.to_string(), "request failed with status 502 Bad Gateway");
    }

    #[test]
    fn auth_response_without_a_token_stores_no_session() {
        let config = AppConfig::default();
        let client = ApiClient::new(&config).unwrap();
        client.store_session(AuthResponse {
            access_token: None,
            user: Some(AuthUser {
                id: "user-1".to_string(),
            }),
        });
        assert!(client.get_session().is_none());

        client.store_session(AuthResponse {
            access_token: Some("token".to_string()),
            user: Some(AuthUser {
                id: "user-1".to_string(),
            }),
        });
        assert_eq!(client.get_session().unwrap().user_id, "user-1");
    }

    #[test]
    fn table_calls_without_a_session_are_refused_locally() {
        let config = AppConfig::default();
        let client = ApiClient::new(&config).unwrap();
        assert!(matches!(
            client.list_tasks("user-1"),
            Err(ApiError::NoSession)
        ));
        assert!(matches!(client.delete_task(1), Err(ApiError::NoSession)));
    }
}
