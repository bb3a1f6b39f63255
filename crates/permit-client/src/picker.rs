//! Filesystem-backed asset picking for non-interactive frontends.

use std::fs;
use std::path::Path;

use permit_form::{AssetPicker, AssetSource, PickResult, StagedAsset};

use crate::error::ClientError;

/// Guesses a MIME type from the file extension.
pub fn mime_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

/// Describes a local file without reading its contents.
pub fn stage_file(path: &Path) -> Result<StagedAsset, ClientError> {
    let display_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let metadata = fs::metadata(path).map_err(|err| ClientError::Asset {
        name: display_name.clone(),
        reason: err.to_string(),
    })?;
    if !metadata.is_file() {
        return Err(ClientError::Asset {
            name: display_name,
            reason: "not a regular file".into(),
        });
    }
    Ok(StagedAsset {
        local_ref: path.display().to_string(),
        mime_type: mime_for(path).to_string(),
        display_name,
        size_bytes: metadata.len(),
    })
}

/// Hands out a fixed list of files once, then reports cancellation.
#[derive(Debug, Default)]
pub struct PathPicker {
    files: Vec<StagedAsset>,
}

impl PathPicker {
    pub fn new(files: Vec<StagedAsset>) -> Self {
        Self { files }
    }

    pub fn from_paths<P: AsRef<Path>>(paths: &[P]) -> Result<Self, ClientError> {
        let files = paths
            .iter()
            .map(|path| stage_file(path.as_ref()))
            .collect::<Result<_, _>>()?;
        Ok(Self::new(files))
    }
}

impl AssetPicker for PathPicker {
    fn pick(&mut self, _source: AssetSource, multiple: bool) -> PickResult {
        if self.files.is_empty() {
            return PickResult::Cancelled;
        }
        let picked = if multiple {
            std::mem::take(&mut self.files)
        } else {
            vec![self.files.remove(0)]
        };
        PickResult::Picked(picked)
    }
}
