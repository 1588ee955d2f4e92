//! Request handlers, one module per resource.

pub mod albums;
pub mod musicians;
pub mod ping;
pub mod playlists;
pub mod subscriptions;
pub mod tracks;
pub mod users;

use std::collections::HashMap;

use axum::extract::Multipart;
use cadence_core::error::CoreError;

use crate::error::{AppError, AppResult};

/// Shortest accepted name for tracks, albums and playlists.
pub const MIN_TITLE_LEN: usize = 2;

/// Trim a track/album/playlist name and enforce the minimum length.
pub(crate) fn require_title(name: &str, what: &str) -> AppResult<String> {
    let trimmed = name.trim();
    if trimmed.chars().count() < MIN_TITLE_LEN {
        return Err(CoreError::Validation(format!(
            "{what} name must be at least {MIN_TITLE_LEN} characters"
        ))
        .into());
    }
    Ok(trimmed.to_string())
}

/// A parsed multipart form: the `file` field plus any text fields.
pub(crate) struct Upload {
    pub file: Option<(String, Vec<u8>)>,
    pub fields: HashMap<String, String>,
}

impl Upload {
    /// The uploaded file, or 400 when the form had none.
    pub fn require_file(&mut self) -> AppResult<(String, Vec<u8>)> {
        self.file
            .take()
            .ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))
    }
}

/// Drain a multipart form. Rejections keep their own status, so an
/// oversized body answers 413.
pub(crate) async fn read_upload(mut multipart: Multipart) -> AppResult<Upload> {
    let mut upload = Upload {
        file: None,
        fields: HashMap::new(),
    };

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        if name == "file" {
            let filename = field.file_name().unwrap_or("upload").to_string();
            let data = field.bytes().await?;
            upload.file = Some((filename, data.to_vec()));
        } else {
            let text = field.text().await?;
            upload.fields.insert(name, text);
        }
    }
    Ok(upload)
}
