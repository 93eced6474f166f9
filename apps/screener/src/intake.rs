//! File intake: classifies uploaded résumés and materializes them as
//! `CandidateFile`s.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bytes::Bytes;
use futures::future::try_join_all;
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::candidate::{CandidateFile, FileKind};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif", "heic", "heif"];

/// A raw upload as received from the client.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Classifies by MIME type first, then by extension. Anything that is not
/// recognisably a PDF or an image is treated as text.
pub fn classify(file_name: &str, content_type: Option<&str>) -> FileKind {
    let mime = content_type.unwrap_or_default().to_ascii_lowercase();
    if mime == "application/pdf" {
        return FileKind::Pdf;
    }
    if mime.starts_with("image/") {
        return FileKind::Image;
    }

    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    if extension == "pdf" {
        FileKind::Pdf
    } else if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        FileKind::Image
    } else {
        FileKind::Text
    }
}

fn mime_for(kind: FileKind, file_name: &str, content_type: Option<&str>) -> Option<String> {
    let declared = content_type
        .filter(|ct| !ct.is_empty() && *ct != "application/octet-stream")
        .map(String::from);
    match kind {
        FileKind::Pdf => Some("application/pdf".to_string()),
        FileKind::Image => declared.filter(|ct| ct.starts_with("image/")).or_else(|| {
            let ext = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
            Some(match ext.as_str() {
                "jpg" | "jpeg" => "image/jpeg".to_string(),
                other => format!("image/{other}"),
            })
        }),
        FileKind::Text => declared.or_else(|| Some("text/plain".to_string())),
    }
}

/// Materializes one upload.
pub fn materialize(upload: Upload) -> Result<CandidateFile, AppError> {
    if upload.data.is_empty() {
        return Err(AppError::Validation(format!(
            "File '{}' is empty",
            upload.file_name
        )));
    }

    let content_type = upload.content_type.as_deref();
    let kind = classify(&upload.file_name, content_type);
    let content = match kind {
        FileKind::Text => String::from_utf8(upload.data.to_vec()).map_err(|_| {
            AppError::Validation(format!(
                "File '{}' is not valid UTF-8 text",
                upload.file_name
            ))
        })?,
        FileKind::Image | FileKind::Pdf => BASE64.encode(&upload.data),
    };

    debug!(
        "Materialized '{}' as {:?} ({} bytes)",
        upload.file_name,
        kind,
        upload.data.len()
    );

    Ok(CandidateFile {
        id: Uuid::new_v4(),
        kind,
        mime_type: mime_for(kind, &upload.file_name, content_type),
        display_name: upload.file_name,
        content,
    })
}

/// Decodes every upload concurrently. The output keeps submission order.
pub async fn intake_all(uploads: Vec<Upload>) -> Result<Vec<CandidateFile>, AppError> {
    let tasks = uploads.into_iter().map(|upload| async move {
        tokio::task::spawn_blocking(move || materialize(upload))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("file decoding task failed: {e}")))?
    });
    try_join_all(tasks).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, content_type: Option<&str>, data: &[u8]) -> Upload {
        Upload {
            file_name: name.to_string(),
            content_type: content_type.map(String::from),
            data: Bytes::copy_from_slice(data),
        }
    }

    #[test]
    fn test_classify_by_mime_type() {
        assert_eq!(classify("x", Some("application/pdf")), FileKind::Pdf);
        assert_eq!(classify("x", Some("image/jpeg")), FileKind::Image);
        assert_eq!(classify("x", Some("text/plain")), FileKind::Text);
    }

    #[test]
    fn test_classify_falls_back_to_extension() {
        assert_eq!(classify("cv.PDF", None), FileKind::Pdf);
        assert_eq!(classify("scan.jpeg", Some("application/octet-stream")), FileKind::Image);
        assert_eq!(classify("notes.md", None), FileKind::Text);
        assert_eq!(classify("README", None), FileKind::Text);
    }

    #[test]
    fn test_text_upload_keeps_raw_content() {
        let file = materialize(upload("a.txt", Some("text/plain"), "Olá, mundo".as_bytes())).unwrap();
        assert_eq!(file.kind, FileKind::Text);
        assert_eq!(file.content, "Olá, mundo");
        assert_eq!(file.display_name, "a.txt");
    }

    #[test]
    fn test_binary_upload_is_base64() {
        let file = materialize(upload("cv.pdf", None, b"%PDF-1.4")).unwrap();
        assert_eq!(file.kind, FileKind::Pdf);
        assert_eq!(file.content, "JVBERi0xLjQ=");
        assert_eq!(file.mime_type.as_deref(), Some("application/pdf"));
    }

    #[test]
    fn test_image_mime_inferred_from_extension() {
        let file = materialize(upload("photo.JPG", None, &[0xff, 0xd8, 0xff])).unwrap();
        assert_eq!(file.kind, FileKind::Image);
        assert_eq!(file.mime_type.as_deref(), Some("image/jpeg"));
    }

    #[test]
    fn test_invalid_utf8_text_rejected() {
        let err = materialize(upload("a.txt", None, &[0xff, 0xfe, 0x00])).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_empty_upload_rejected() {
        assert!(materialize(upload("a.txt", None, b"")).is_err());
    }

    #[tokio::test]
    async fn test_intake_all_preserves_order_and_unique_ids() {
        let uploads = (0..8)
            .map(|i| upload(&format!("cv-{i}.txt"), None, format!("candidate {i}").as_bytes()))
            .collect();
        let files = intake_all(uploads).await.unwrap();

        assert_eq!(files.len(), 8);
        for (i, file) in files.iter().enumerate() {
            assert_eq!(file.display_name, format!("cv-{i}.txt"));
        }
        let mut ids: Vec<_> = files.iter().map(|f| f.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 8);
    }

    #[tokio::test]
    async fn test_intake_all_fails_on_any_bad_file() {
        let uploads = vec![upload("ok.txt", None, b"fine"), upload("bad.txt", None, b"")];
        assert!(intake_all(uploads).await.is_err());
    }
}
