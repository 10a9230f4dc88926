use crate::backend::ListingBackend;
use futures::future::join_all;
use serde::Serialize;
use tracing::{info, warn};

/// Object path prefix inside the `properties` bucket
pub const OBJECT_PREFIX: &str = "properties";

/// Message shown when at least one upload failed
pub const UPLOAD_ERROR_MESSAGE: &str = "Erro ao fazer upload das imagens";

/// One selected file
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct UploadOutcome {
    /// Stored paths of the uploads that succeeded, in selection order
    pub paths: Vec<String>,
    /// Original names of the files that failed
    pub failed: Vec<String>,
}

impl UploadOutcome {
    /// One aggregated message for every failed file
    pub fn error_message(&self) -> Option<String> {
        if self.failed.is_empty() {
            None
        } else {
            Some(format!("{}: {}", UPLOAD_ERROR_MESSAGE, self.failed.join(", ")))
        }
    }
}

/// Random numeric object name keeping the original extension
pub fn random_object_name(file_name: &str) -> String {
    let extension = file_name.rsplit('.').next().unwrap_or(file_name);
    format!("{}.{}", rand::random::<f64>(), extension)
}

pub fn object_path(file_name: &str) -> String {
    format!("{}/{}", OBJECT_PREFIX, random_object_name(file_name))
}

/// Upload all files concurrently. Failures do not undo the uploads that succeeded.
pub async fn upload_images(
    backend: &dyn ListingBackend,
    access_token: &str,
    files: Vec<ImageFile>,
) -> UploadOutcome {
    let uploads = files.into_iter().map(|file| async move {
        let path = object_path(&file.file_name);
        let result = backend
            .upload_object(access_token, &path, &file.content_type, file.bytes)
            .await;
        (file.file_name, result)
    });

    let mut outcome = UploadOutcome::default();
    for (file_name, result) in join_all(uploads).await {
        match result {
            Ok(path) => outcome.paths.push(path),
            Err(e) => {
                warn!("Upload of {} failed: {}", file_name, e);
                outcome.failed.push(file_name);
            }
        }
    }

    info!(
        "Uploaded {} images, {} failed",
        outcome.paths.len(),
        outcome.failed.len()
    );
    outcome
}
