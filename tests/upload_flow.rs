use std::sync::Arc;

use newsdesk::document::{BlockKind, BlockType};
use newsdesk::editor::{BlockCursor, EditAction, EditorSession, UploadEvent, UploadStatus};
use newsdesk::storage::{
    AssetFile, CONTENT_BUCKET, LocalObjectStore, MAX_UPLOAD_BYTES, UploadError, Uploader,
    ValidationError, upload_asset,
};

const PUBLIC_URL: &str = "http://localhost:8080/storage";

fn png(name: &str, size: u64) -> AssetFile {
    AssetFile::new(name, "image/png", vec![0x89; usize::try_from(size).unwrap()])
}

#[test]
fn test_upload_at_exact_limit_is_stored() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalObjectStore::new(dir.path(), CONTENT_BUCKET, PUBLIC_URL);

    let uploaded =
        upload_asset(&store, &png("big photo.png", MAX_UPLOAD_BYTES), MAX_UPLOAD_BYTES, 1_700_000_000_000)
            .unwrap();
    assert_eq!(uploaded.path, "1700000000000-big-photo.png");
    assert_eq!(
        uploaded.url,
        "http://localhost:8080/storage/news-content/1700000000000-big-photo.png"
    );
    let stored = std::fs::metadata(store.dir().join(&uploaded.path)).unwrap();
    assert_eq!(stored.len(), MAX_UPLOAD_BYTES);
}

#[test]
fn test_upload_one_byte_over_limit_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalObjectStore::new(dir.path(), CONTENT_BUCKET, PUBLIC_URL);

    let err = upload_asset(&store, &png("big.png", MAX_UPLOAD_BYTES + 1), MAX_UPLOAD_BYTES, 1)
        .unwrap_err();
    assert!(matches!(err, UploadError::Validation(ValidationError::TooLarge { .. })));
    assert_eq!(err.user_message(), "Images must be 5 MB or smaller.");
    assert!(!store.dir().exists(), "nothing may be written for a rejected file");
}

#[test]
fn test_non_image_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalObjectStore::new(dir.path(), CONTENT_BUCKET, PUBLIC_URL);
    let pdf = AssetFile::new("minutes.pdf", "application/pdf", vec![1, 2, 3]);

    let err = upload_asset(&store, &pdf, MAX_UPLOAD_BYTES, 1).unwrap_err();
    assert!(matches!(err, UploadError::Validation(ValidationError::NotAnImage { .. })));
}

#[test]
fn test_same_name_and_timestamp_does_not_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalObjectStore::new(dir.path(), CONTENT_BUCKET, PUBLIC_URL);

    upload_asset(&store, &png("a.png", 3), MAX_UPLOAD_BYTES, 5).unwrap();
    let err = upload_asset(&store, &png("a.png", 4), MAX_UPLOAD_BYTES, 5).unwrap_err();
    assert!(matches!(err, UploadError::Storage(_)));
    let stored = std::fs::read(store.dir().join("5-a.png")).unwrap();
    assert_eq!(stored.len(), 3, "first upload must survive");
}

#[test]
fn test_editor_inserts_uploaded_image_at_cursor() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(LocalObjectStore::new(dir.path(), CONTENT_BUCKET, PUBLIC_URL));
    let uploader = Uploader::new(store.clone(), MAX_UPLOAD_BYTES);
    let mut session = EditorSession::open("# Title\n\nIntro paragraph").with_uploader(uploader);
    let heading = session.document().blocks()[0].id;

    session
        .apply(EditAction::SetCursor(BlockCursor::new(heading, 5)))
        .unwrap();
    session.begin_upload(png("photo.png", 16)).unwrap();
    assert!(session.is_uploading());
    assert_eq!(
        session.status(),
        &UploadStatus::Uploading {
            name: "photo.png".to_string()
        }
    );

    // Editing continues while the upload runs.
    session.apply(EditAction::InsertText("!".into())).unwrap();
    assert_eq!(
        session.begin_upload(png("second.png", 16)),
        Err(UploadError::Busy)
    );
    assert!(
        matches!(session.status(), UploadStatus::Uploading { name } if name == "photo.png"),
        "a rejected second upload must not replace the running one"
    );

    let event = session.wait_for_upload().unwrap();
    let UploadEvent::Inserted { block, url } = event else {
        panic!("expected an inserted image, got {event:?}");
    };
    assert!(url.starts_with("http://localhost:8080/storage/news-content/"));
    assert!(url.ends_with("-photo.png"));
    assert_eq!(session.document().position(block), Some(1));
    assert!(matches!(
        &session.document().blocks()[1].kind,
        BlockKind::Image { alt, .. } if alt == "photo.png"
    ));
    assert!(!session.is_uploading());
    assert_eq!(session.status(), &UploadStatus::Idle);
    assert!(session.markdown().starts_with("# Title!\n\n![photo.png](http://localhost:8080/storage/news-content/"));
    assert!(session.markdown().ends_with("\n\nIntro paragraph\n"));

    let stored = std::fs::read_dir(store.dir()).unwrap().count();
    assert_eq!(stored, 1);
}

#[test]
fn test_editor_failed_upload_leaves_document_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(LocalObjectStore::new(dir.path(), CONTENT_BUCKET, PUBLIC_URL));
    let mut session =
        EditorSession::open("Body").with_uploader(Uploader::new(store, MAX_UPLOAD_BYTES));
    let before = session.markdown().to_string();

    let err = session
        .begin_upload(AssetFile::new("notes.txt", "text/plain", vec![1]))
        .unwrap_err();
    assert!(matches!(err, UploadError::Validation(ValidationError::NotAnImage { .. })));
    assert_eq!(
        session.status(),
        &UploadStatus::Failed {
            message: "Please choose an image file.".to_string()
        }
    );
    assert!(!session.is_uploading());
    assert_eq!(session.markdown(), before);
}

#[test]
fn test_upload_into_empty_paragraph_replaces_it() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(LocalObjectStore::new(dir.path(), CONTENT_BUCKET, PUBLIC_URL));
    let mut session =
        EditorSession::open("").with_uploader(Uploader::new(store, MAX_UPLOAD_BYTES));
    session.begin_upload(png("cover.jpg", 8)).unwrap();
    session.wait_for_upload().unwrap();

    let kinds: Vec<_> = session.document().kinds().collect();
    assert!(matches!(kinds[0], BlockKind::Image { .. }));
    assert!(kinds[1].is_blank_paragraph(), "a paragraph follows for typing");

    session
        .apply(EditAction::SetBlockType(BlockType::Quote))
        .unwrap();
    session.apply(EditAction::InsertText("Caption".into())).unwrap();
    assert!(session.markdown().ends_with(")\n\n> Caption\n"));
}
