use serde::{Deserialize, Serialize};

/// Backend user record, stored as JSON next to the token.
///
/// Fields the client does not read are kept in `extra` so a re-saved record
/// does not lose them.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(from = "UserRecord")]
pub(crate) struct UserProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub username: String,
    pub email: String,
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Wire shape of a user. Mongo documents may carry both `id` and `_id`, and
/// any string field may be `null`.
#[derive(Deserialize)]
struct UserRecord {
    id: Option<String>,
    #[serde(rename = "_id")]
    mongo_id: Option<String>,
    username: Option<String>,
    email: Option<String>,
    #[serde(rename = "createdAt")]
    created_at: Option<String>,
    #[serde(rename = "created_at")]
    created_at_snake: Option<String>,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

impl From<UserRecord> for UserProfile {
    fn from(raw: UserRecord) -> Self {
        Self {
            id: first_present([raw.id, raw.mongo_id]),
            username: raw.username.unwrap_or_default(),
            email: raw.email.unwrap_or_default(),
            created_at: first_present([raw.created_at, raw.created_at_snake]),
            extra: raw.extra,
        }
    }
}

/// First value that is present and not blank.
fn first_present<const N: usize>(candidates: [Option<String>; N]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .find(|v| !v.trim().is_empty())
}

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Session {
    pub token: Option<String>,
    pub user: Option<UserProfile>,
}

impl Session {
    pub fn new(token: String, user: UserProfile) -> Self {
        Self {
            token: Some(token),
            user: Some(user),
        }
    }

    /// Token and user email are both present and non-empty.
    pub fn is_valid(&self) -> bool {
        let has_token = self.token.as_deref().is_some_and(|t| !t.trim().is_empty());
        let has_email = self
            .user
            .as_ref()
            .is_some_and(|u| !u.email.trim().is_empty());
        has_token && has_email
    }

    /// The bearer token of a valid session.
    pub fn bearer(&self) -> Option<&str> {
        if self.is_valid() {
            self.token.as_deref()
        } else {
            None
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(from = "NoteRecord")]
pub(crate) struct Note {
    pub id: String,
    pub title: String,
    pub subject: String,
    pub tags: Vec<String>,
    #[serde(rename = "filePath", skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

/// Wire shape of a note; tolerant of `null`s and duplicate id keys.
#[derive(Deserialize)]
struct NoteRecord {
    id: Option<String>,
    #[serde(rename = "_id")]
    mongo_id: Option<String>,
    title: Option<String>,
    subject: Option<String>,
    #[serde(default, deserialize_with = "tags_or_default")]
    tags: Vec<String>,
    #[serde(rename = "filePath")]
    file_path: Option<String>,
    #[serde(rename = "file_path")]
    file_path_snake: Option<String>,
    #[serde(rename = "fileUrl")]
    file_url: Option<String>,
}

impl From<NoteRecord> for Note {
    fn from(raw: NoteRecord) -> Self {
        Self {
            id: first_present([raw.id, raw.mongo_id]).unwrap_or_default(),
            title: raw.title.unwrap_or_default(),
            subject: raw.subject.unwrap_or_default(),
            tags: raw.tags,
            file_path: first_present([raw.file_path, raw.file_path_snake, raw.file_url]),
        }
    }
}

/// Accepts `null`, a missing field, or a list of tags; `null` entries are dropped.
fn tags_or_default<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<Option<String>>>::deserialize(deserializer)?
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .collect())
}

#[derive(Serialize, Clone, Debug)]
pub(crate) struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Clone, Debug)]
pub(crate) struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Register and login share one response shape.
#[derive(Deserialize, Clone, Debug)]
pub(crate) struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

/// File bytes read from the upload form's file input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct UploadFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct NoteUpload {
    pub title: String,
    pub subject: String,
    /// Raw comma-separated text; the backend splits it.
    pub tags: String,
    pub file: UploadFile,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_login_response_contract_deserialize() {
        let json = r#"{
            "token": "jwt-token",
            "user": {"_id": "u1", "username": "u", "email": "u@example.com", "createdAt": "2025-11-02T10:00:00.000Z", "role": "student"},
            "message": "Login successful"
        }"#;
        let parsed: AuthResponse = serde_json::from_str(json).expect("auth response should parse");
        assert_eq!(parsed.token, "jwt-token");
        assert_eq!(parsed.user.id.as_deref(), Some("u1"));
        assert_eq!(parsed.user.email, "u@example.com");
        assert_eq!(
            parsed.user.created_at.as_deref(),
            Some("2025-11-02T10:00:00.000Z")
        );
        assert_eq!(parsed.user.extra["role"], "student");
    }

    #[test]
    fn test_user_profile_keeps_unknown_fields_on_reserialize() {
        let user: UserProfile =
            serde_json::from_str(r#"{"username":"A","email":"a@b.com","plan":"free"}"#)
                .expect("user should parse");
        let v = serde_json::to_value(&user).expect("should serialize");
        assert_eq!(v["plan"], "free");
        assert_eq!(v["email"], "a@b.com");
        assert!(v.get("createdAt").is_none());
    }

    #[test]
    fn test_note_accepts_mongo_id_and_null_tags() {
        let note: Note = serde_json::from_str(
            r#"{"_id":"n1","title":"Calc","subject":"Math","tags":null,"filePath":"uploads/calc.pdf"}"#,
        )
        .expect("note should parse");
        assert_eq!(note.id, "n1");
        assert!(note.tags.is_empty());
        assert_eq!(note.file_path.as_deref(), Some("uploads/calc.pdf"));
    }

    #[test]
    fn test_note_missing_tags_defaults_to_empty() {
        let note: Note = serde_json::from_str(r#"{"id":"n2","title":"T"}"#).expect("should parse");
        assert_eq!(note.subject, "");
        assert!(note.tags.is_empty());
    }

    #[test]
    fn test_records_with_both_id_keys_decode() {
        let res: AuthResponse = serde_json::from_value(serde_json::json!({
            "token": "t1",
            "user": {"_id": "u1", "id": "u1", "username": "A", "email": "a@b.com"}
        }))
        .expect("auth response should parse");
        assert_eq!(res.user.id.as_deref(), Some("u1"));
        assert_eq!(res.user.email, "a@b.com");
        assert!(res.user.extra.get("_id").is_none());

        let note: Note =
            serde_json::from_str(r#"{"_id":"n1","id":"n1","title":"Calc"}"#).expect("should parse");
        assert_eq!(note.id, "n1");
        assert_eq!(note.title, "Calc");
    }

    #[test]
    fn test_id_falls_back_to_mongo_id_when_blank() {
        let note: Note =
            serde_json::from_str(r#"{"id":null,"_id":"n7"}"#).expect("should parse");
        assert_eq!(note.id, "n7");
    }

    #[test]
    fn test_note_null_title_and_subject_become_empty() {
        let note: Note = serde_json::from_str(
            r#"{"_id":"n1","title":null,"subject":null,"tags":["exam",null]}"#,
        )
        .expect("should parse");
        assert_eq!(note.title, "");
        assert_eq!(note.subject, "");
        assert_eq!(note.tags, vec!["exam".to_string()]);
    }

    #[test]
    fn test_user_null_fields_and_snake_created_at() {
        let user: UserProfile = serde_json::from_str(
            r#"{"username":null,"email":"a@b.com","created_at":"2024-03-15"}"#,
        )
        .expect("should parse");
        assert_eq!(user.username, "");
        assert_eq!(user.created_at.as_deref(), Some("2024-03-15"));
    }

    #[test]
    fn test_session_validity_requires_token_and_email() {
        let user = UserProfile {
            email: "a@b.com".to_string(),
            ..Default::default()
        };
        assert!(Session::new("t1".to_string(), user.clone()).is_valid());
        assert!(!Session::new("  ".to_string(), user.clone()).is_valid());
        assert!(!Session::new("t1".to_string(), UserProfile::default()).is_valid());
        assert!(!Session::default().is_valid());
        assert_eq!(Session::default().bearer(), None);
        assert_eq!(Session::new("t1".to_string(), user).bearer(), Some("t1"));
    }
}
