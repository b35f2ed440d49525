//! Pre-signed object storage uploads.
//!
//! Two steps: ask the backend for one upload/download URL pair per file
//! name, then `PUT` each file's bytes straight to its upload URL. The
//! transfer is unauthenticated; the pre-signed URL carries the grant.

use super::client::ApiClient;
use super::error::ApiError;
use super::types::{Envelope, PresignRequest, PresignedUrls, UploadTarget};

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// A file ready to be transferred.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
    /// Derived from the name, then the bytes, when `None`.
    pub content_type: Option<String>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
            content_type: None,
        }
    }

    /// Explicit type, else guessed from the file extension, else sniffed
    /// from the content, else octet-stream.
    pub fn content_type(&self) -> String {
        if let Some(explicit) = &self.content_type {
            return explicit.clone();
        }
        mime_guess::from_path(&self.name)
            .first()
            .map(|mime| mime.to_string())
            .or_else(|| infer::get(&self.bytes).map(|kind| kind.mime_type().to_string()))
            .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string())
    }
}

/// POST /api/training/upload-urls
pub async fn get_presigned_urls<S: AsRef<str>>(
    client: &ApiClient,
    file_names: &[S],
) -> Result<Envelope<PresignedUrls>, ApiError> {
    let body = PresignRequest {
        file_names: file_names.iter().map(|n| n.as_ref().to_string()).collect(),
    };
    client.post("/api/training/upload-urls", &body).await
}

/// Transfer one file to its pre-signed URL.
pub async fn upload_to_storage(
    client: &ApiClient,
    presigned_url: &str,
    bytes: Vec<u8>,
    content_type: &str,
) -> Result<(), ApiError> {
    client.put_bytes(presigned_url, bytes, content_type).await
}

/// Presign and upload every file in order. Returns the download URLs in
/// the same order as `files`.
///
/// Stops at the first failed transfer; earlier files stay uploaded.
pub async fn upload_files(client: &ApiClient, files: Vec<UploadFile>) -> Result<Vec<String>, ApiError> {
    if files.is_empty() {
        return Ok(Vec::new());
    }

    let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
    let presigned = get_presigned_urls(client, &names).await?.data;
    let targets = matched_targets(&presigned, files.len())?;

    let mut download_urls = Vec::with_capacity(files.len());
    for (file, target) in files.into_iter().zip(targets) {
        let content_type = file.content_type();
        log::info!("Uploading {} ({}, {} bytes)", file.name, content_type, file.bytes.len());
        upload_to_storage(client, &target.upload_url, file.bytes, &content_type).await?;
        download_urls.push(target.download_url);
    }
    Ok(download_urls)
}

fn matched_targets(presigned: &PresignedUrls, expected: usize) -> Result<Vec<UploadTarget>, ApiError> {
    match presigned.targets() {
        Some(targets) if targets.len() == expected => Ok(targets),
        _ => Err(ApiError::decode(format!(
            "expected {} pre-signed URL pairs, got {} upload and {} download URLs",
            expected,
            presigned.upload_urls.len(),
            presigned.download_urls.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_sniffed_from_bytes() {
        let png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        assert_eq!(UploadFile::new("scan", png).content_type(), "image/png");
        assert_eq!(
            UploadFile::new("notes", vec![1, 2, 3]).content_type(),
            FALLBACK_CONTENT_TYPE
        );
    }

    #[test]
    fn test_content_type_from_extension() {
        let svg = b"<svg xmlns=\"http://www.w3.org/2000/svg\"/>".to_vec();
        assert_eq!(UploadFile::new("diagram.svg", svg).content_type(), "image/svg+xml");
        assert_eq!(
            UploadFile::new("caption.txt", b"a red fox".to_vec()).content_type(),
            "text/plain"
        );
        let png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        assert_eq!(UploadFile::new("a.PNG", png).content_type(), "image/png");
    }

    #[test]
    fn test_explicit_content_type_wins() {
        let mut file = UploadFile::new("a.webp", vec![1, 2, 3]);
        file.content_type = Some("image/webp".to_string());
        assert_eq!(file.content_type(), "image/webp");
    }

    #[test]
    fn test_matched_targets_rejects_count_mismatch() {
        let presigned = PresignedUrls {
            upload_urls: vec!["u1".into()],
            download_urls: vec!["d1".into()],
        };
        assert!(matched_targets(&presigned, 1).is_ok());
        let err = matched_targets(&presigned, 2).unwrap_err();
        assert_eq!(err.kind(), crate::api::ErrorKind::Decode);
    }
}
