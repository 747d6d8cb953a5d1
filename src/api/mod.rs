use crate::config::EnvConfig;
use crate::models::{AuthResponse, LoginRequest, Note, NoteUpload, RegisterRequest};
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub(crate) enum ApiError {
    /// 401/403 on an authenticated call.
    #[error("session rejected by server ({status})")]
    SessionInvalid { status: u16 },

    #[error("request failed ({status}): {}", message.as_deref().unwrap_or("no message"))]
    Rejected { status: u16, message: Option<String> },

    /// Network failure or unreadable response.
    #[error("transport failure: {detail}")]
    Transport { detail: String },
}

impl ApiError {
    fn transport(e: impl std::fmt::Display) -> Self {
        Self::Transport {
            detail: e.to_string(),
        }
    }

    /// Message supplied by the server, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Rejected {
                message: Some(m), ..
            } if !m.trim().is_empty() => Some(m.as_str()),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::SessionInvalid { status } | Self::Rejected { status, .. } => Some(*status),
            Self::Transport { .. } => None,
        }
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

/// Remote StudyHub backend.
pub(crate) trait NotesBackend {
    async fn register(&self, req: &RegisterRequest) -> ApiResult<AuthResponse>;
    async fn login(&self, req: &LoginRequest) -> ApiResult<AuthResponse>;
    async fn list_my_notes(&self, token: &str) -> ApiResult<Vec<Note>>;
    async fn upload_note(&self, token: &str, upload: NoteUpload) -> ApiResult<()>;
    async fn delete_note(&self, token: &str, id: &str) -> ApiResult<()>;
    fn download_url(&self, note: &Note) -> String;
}

#[derive(Clone, Debug)]
pub(crate) struct ApiClient {
    pub(crate) base_url: String,
}

impl ApiClient {
    pub fn new(base_url: String) -> Self {
        Self { base_url }
    }

    pub fn from_config(config: &EnvConfig) -> Self {
        Self::new(config.api_url.clone())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn with_auth_headers(req: reqwest::RequestBuilder, token: &str) -> reqwest::RequestBuilder {
        req.header("Authorization", format!("Bearer {}", token))
    }

    async fn send(&self, req: reqwest::RequestBuilder, authenticated: bool) -> ApiResult<Value> {
        let res = req.send().await.map_err(|e| {
            tracing::error!(error = %e, "request could not be sent");
            ApiError::transport(e)
        })?;

        let status = res.status().as_u16();
        let body = res.text().await.map_err(|e| {
            tracing::error!(status, error = %e, "response body could not be read");
            ApiError::transport(e)
        })?;

        let result = classify_response(status, &body, authenticated);
        match &result {
            Ok(_) => tracing::debug!(status, "request succeeded"),
            Err(ApiError::Transport { detail }) => {
                tracing::error!(status, %detail, "unreadable response")
            }
            Err(e) => tracing::warn!(status, error = %e, "request rejected"),
        }
        result
    }

    async fn auth_request<T: serde::Serialize>(
        &self,
        path: &str,
        body: &T,
    ) -> ApiResult<AuthResponse> {
        let req = reqwest::Client::new().post(self.url(path)).json(body);
        let data = self.send(req, false).await?;
        serde_json::from_value(data).map_err(ApiError::transport)
    }
}

impl NotesBackend for ApiClient {
    async fn register(&self, req: &RegisterRequest) -> ApiResult<AuthResponse> {
        self.auth_request("/auth/register", req).await
    }

    async fn login(&self, req: &LoginRequest) -> ApiResult<AuthResponse> {
        self.auth_request("/auth/login", req).await
    }

    async fn list_my_notes(&self, token: &str) -> ApiResult<Vec<Note>> {
        let req = Self::with_auth_headers(reqwest::Client::new().get(self.url("/notes/mine")), token);
        let data = self.send(req, true).await?;
        Ok(parse_note_list_response(data))
    }

    async fn upload_note(&self, token: &str, upload: NoteUpload) -> ApiResult<()> {
        let NoteUpload {
            title,
            subject,
            tags,
            file,
        } = upload;

        let mut part = reqwest::multipart::Part::bytes(file.bytes).file_name(file.name);
        if !file.mime.is_empty() {
            part = part.mime_str(&file.mime).map_err(ApiError::transport)?;
        }

        let form = reqwest::multipart::Form::new()
            .text("title", title)
            .text("subject", subject)
            .text("tags", tags)
            .part("file", part);

        let req = Self::with_auth_headers(
            reqwest::Client::new().post(self.url("/notes")).multipart(form),
            token,
        );
        self.send(req, true).await.map(|_| ())
    }

    async fn delete_note(&self, token: &str, id: &str) -> ApiResult<()> {
        let path = format!("/notes/{}", urlencoding::encode(id));
        let req = Self::with_auth_headers(reqwest::Client::new().delete(self.url(&path)), token);
        self.send(req, true).await.map(|_| ())
    }

    fn download_url(&self, note: &Note) -> String {
        download_url(&self.base_url, note)
    }
}

/// The note's own file URL when it is absolute, otherwise the backend download route.
pub(crate) fn download_url(base_url: &str, note: &Note) -> String {
    match note.file_path.as_deref().map(str::trim) {
        Some(p) if p.starts_with("https://") || p.starts_with("http://") => p.to_string(),
        _ => format!("{base_url}/notes/download/{}", urlencoding::encode(&note.id)),
    }
}

/// Maps a status code and raw body onto the client's result shape.
pub(crate) fn classify_response(status: u16, body: &str, authenticated: bool) -> ApiResult<Value> {
    if (200..300).contains(&status) {
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        return serde_json::from_str(body).map_err(ApiError::transport);
    }

    if authenticated && (status == 401 || status == 403) {
        return Err(ApiError::SessionInvalid { status });
    }

    let message = serde_json::from_str::<Value>(body).ok().and_then(|v| {
        v.get("message")
            .or_else(|| v.get("error"))
            .and_then(|m| m.as_str())
            .map(|m| m.to_string())
    });

    Err(ApiError::Rejected { status, message })
}

/// Accepts a bare array or `{ "notes": [...] }`; anything else is an empty list.
pub(crate) fn parse_note_list_response(data: Value) -> Vec<Note> {
    let list = match data {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("notes") {
            Some(Value::Array(items)) => items,
            _ => vec![],
        },
        _ => vec![],
    };

    let mut out: Vec<Note> = Vec::with_capacity(list.len());
    for item in list {
        match serde_json::from_value::<Note>(item) {
            Ok(note) if !note.id.trim().is_empty() => out.push(note),
            Ok(_) => tracing::debug!("skipping note without id"),
            Err(e) => tracing::debug!(error = %e, "skipping malformed note"),
        }
    }
    out
}

/// Scripted backend for controller tests; counts calls per operation.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct FakeBackend {
    pub auth_result: std::cell::RefCell<Option<ApiResult<AuthResponse>>>,
    pub list_results: std::cell::RefCell<std::collections::VecDeque<ApiResult<Vec<Note>>>>,
    pub upload_result: std::cell::RefCell<Option<ApiResult<()>>>,
    pub delete_result: std::cell::RefCell<Option<ApiResult<()>>>,
    pub calls: std::cell::RefCell<Vec<String>>,
    pub uploads: std::cell::RefCell<Vec<NoteUpload>>,
}

#[cfg(test)]
impl FakeBackend {
    pub fn count(&self, op: &str) -> usize {
        self.calls.borrow().iter().filter(|c| c.starts_with(op)).count()
    }

    pub fn push_list(&self, result: ApiResult<Vec<Note>>) {
        self.list_results.borrow_mut().push_back(result);
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    fn auth(&self) -> ApiResult<AuthResponse> {
        self.auth_result
            .borrow()
            .clone()
            .unwrap_or(Err(ApiError::transport("no scripted auth response")))
    }
}

#[cfg(test)]
impl NotesBackend for FakeBackend {
    async fn register(&self, req: &RegisterRequest) -> ApiResult<AuthResponse> {
        self.record(format!("register:{}", req.email));
        self.auth()
    }

    async fn login(&self, req: &LoginRequest) -> ApiResult<AuthResponse> {
        self.record(format!("login:{}:{}", req.email, req.password));
        self.auth()
    }

    async fn list_my_notes(&self, token: &str) -> ApiResult<Vec<Note>> {
        self.record(format!("list:{token}"));
        self.list_results
            .borrow_mut()
            .pop_front()
            .unwrap_or(Ok(vec![]))
    }

    async fn upload_note(&self, token: &str, upload: NoteUpload) -> ApiResult<()> {
        self.record(format!("upload:{token}"));
        self.uploads.borrow_mut().push(upload);
        self.upload_result.borrow().clone().unwrap_or(Ok(()))
    }

    async fn delete_note(&self, token: &str, id: &str) -> ApiResult<()> {
        self.record(format!("delete:{token}:{id}"));
        self.delete_result.borrow().clone().unwrap_or(Ok(()))
    }

    fn download_url(&self, note: &Note) -> String {
        download_url("http://backend.test/api", note)
    }
}
