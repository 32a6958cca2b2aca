//! Image upload endpoint.
//!
//! Accepts one multipart field named `file`. The declared content type must be
//! an allowed image type and the bytes must start with that format's
//! signature; size and type are checked before the object store is touched.

use api_types::upload::UploadResponse;
use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

/// Maximum accepted image size (10 MiB).
pub(crate) const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ImageKind {
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl ImageKind {
    fn from_content_type(value: &str) -> Option<Self> {
        let essence = value.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/gif" => Some(Self::Gif),
            "image/webp" => Some(Self::Webp),
            _ => None,
        }
    }

    fn matches_signature(self, data: &[u8]) -> bool {
        match self {
            Self::Jpeg => data.starts_with(&[0xFF, 0xD8, 0xFF]),
            Self::Png => data.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]),
            Self::Gif => data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a"),
            Self::Webp => data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP",
        }
    }

    fn content_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
        }
    }

    fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }
}

fn validate_image(data: &[u8], content_type: Option<&str>) -> Result<ImageKind, ServerError> {
    if data.is_empty() {
        return Err(ServerError::Generic("empty file".to_string()));
    }
    if data.len() > MAX_FILE_SIZE {
        return Err(ServerError::Generic(format!(
            "file too large, maximum size is {}MB",
            MAX_FILE_SIZE / 1024 / 1024
        )));
    }
    let kind = content_type
        .and_then(ImageKind::from_content_type)
        .ok_or_else(|| {
            ServerError::Generic(
                "unsupported file type, allowed: jpeg, png, gif, webp".to_string(),
            )
        })?;
    if !kind.matches_signature(data) {
        return Err(ServerError::Generic(
            "file content does not match its image type".to_string(),
        ));
    }
    Ok(kind)
}

/// `POST /api/admin/upload`
pub async fn upload(
    State(state): State<ServerState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<UploadResponse>), ServerError> {
    let mut multipart = multipart.map_err(|e| ServerError::Generic(e.body_text()))?;
    let mut file: Option<(Vec<u8>, Option<String>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::Generic(format!("invalid multipart request: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field.content_type().map(ToString::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| ServerError::Generic(format!("invalid multipart request: {e}")))?;
        file = Some((data.to_vec(), content_type));
        break;
    }

    let (data, content_type) =
        file.ok_or_else(|| ServerError::Generic("no file provided".to_string()))?;
    let kind = validate_image(&data, content_type.as_deref())?;

    let key = format!(
        "images/{}-{}.{}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4(),
        kind.extension()
    );
    state
        .storage
        .put(&key, &data, kind.content_type())
        .await?;
    tracing::info!(key = %key, size = data.len(), "image uploaded");

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            url: state.storage.public_url(&key),
            key,
            size: data.len(),
            content_type: kind.content_type().to_string(),
        }),
    ))
}
