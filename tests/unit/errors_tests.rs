/*!
 * Tests for error types and their status mapping
 */

use chapterpress::errors::{AppError, AttachmentError, ExportError, ProviderError, StorageError};

#[test]
fn test_exportError_statusCode_shouldMapFailureKinds() {
    assert_eq!(ExportError::ProjectNotFound("p".to_string()).status_code(), 404);
    assert_eq!(
        ExportError::Abstract(ProviderError::ConnectionError("down".to_string())).status_code(),
        502
    );
    assert_eq!(
        ExportError::Storage(StorageError::RequestFailed("timeout".to_string())).status_code(),
        502
    );
    assert_eq!(ExportError::Pdf("broken".to_string()).status_code(), 500);
    assert_eq!(ExportError::Store(anyhow::anyhow!("locked")).status_code(), 500);
}

#[test]
fn test_exportError_fromConversions_shouldWrapSources() {
    let from_provider: ExportError = ProviderError::ParseError("empty".to_string()).into();
    assert!(matches!(from_provider, ExportError::Abstract(_)));

    let from_storage: ExportError = StorageError::ApiError {
        status_code: 403,
        message: "denied".to_string(),
    }
    .into();
    assert_eq!(from_storage.to_string(), "Upload failed: Storage responded with error: 403 - denied");

    let from_store: ExportError = anyhow::anyhow!("disk I/O error").into();
    assert!(matches!(from_store, ExportError::Store(_)));
}

#[test]
fn test_attachmentError_display_shouldDescribeCause() {
    assert!(AttachmentError::Status(404).to_string().contains("404"));
    assert!(!AttachmentError::Empty.to_string().is_empty());
}

#[test]
fn test_appError_fromConversions_shouldWrapSources() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.json");
    assert!(matches!(AppError::from(io), AppError::File(_)));

    let export = AppError::from(ExportError::Docx("zip".to_string()));
    assert!(export.to_string().contains("zip"));

    assert!(matches!(AppError::from(anyhow::anyhow!("other")), AppError::Unknown(_)));
}
