use std::path::Path;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::models::{BookingStatus, BookingType, User};

/// Request body for password login.
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for account creation.
#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Provider-issued token exchanged for a session credential.
#[derive(Debug, Serialize)]
pub struct IdentityTokenRequest {
    pub token: String,
}

/// Response returned after login, register or provider exchange.
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct CreateBookingRequest {
    pub event_id: String,
    pub booking_type: BookingType,
}

#[derive(Debug, Serialize)]
pub struct StatusUpdateRequest {
    pub status: BookingStatus,
    pub admin_notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// A file picked for upload (payment proof, event QR code).
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub body: Bytes,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            body: body.into(),
        }
    }

    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let body = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".into());
        let content_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok(Self::new(file_name, content_type, body))
    }

    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_update_serializes_lowercase() {
        let body = StatusUpdateRequest {
            status: BookingStatus::Approved,
            admin_notes: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"status":"approved","admin_notes":null}"#);
    }

    #[test]
    fn booking_request_uses_single_type() {
        let body = CreateBookingRequest {
            event_id: "e-1".into(),
            booking_type: BookingType::default(),
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains(r#""booking_type":"single""#));
    }

    #[tokio::test]
    async fn upload_guesses_image_type_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proof.png");
        tokio::fs::write(&path, b"\x89PNG").await.unwrap();

        let upload = Upload::from_path(&path).await.unwrap();
        assert_eq!(upload.file_name, "proof.png");
        assert_eq!(upload.content_type, "image/png");
        assert!(upload.is_image());
    }
}
