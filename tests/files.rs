mod common;

use common::storage;
use rust_uniadmin::config::AppConfig;
use rust_uniadmin::services::files::upload::discard_upload;

#[tokio::test]
async fn test_file_lookup_by_token() {
    let storage = storage().await;
    let file = storage
        .create_file("tok-123", "letter.pdf", "tok-123.pdf", 2048, "application/pdf", None)
        .await
        .unwrap();
    assert_eq!(file.download_token, "tok-123");

    let found = storage.get_file_by_token("tok-123").await.unwrap().unwrap();
    assert_eq!(found.original_name, "letter.pdf");
    assert_eq!(found.file_size, 2048);
    assert!(storage.get_file_by_token("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_discarded_upload_leaves_nothing_behind() {
    let storage = storage().await;
    let upload_dir = std::path::Path::new(&AppConfig::get().upload.dir).to_path_buf();
    std::fs::create_dir_all(&upload_dir).unwrap();

    let token = uuid::Uuid::new_v4().simple().to_string();
    let stored_name = format!("{token}.pdf");
    let path = upload_dir.join(&stored_name);
    std::fs::write(&path, b"%PDF-1.5").unwrap();
    storage
        .create_file(&token, "letter.pdf", &stored_name, 8, "application/pdf", None)
        .await
        .unwrap();

    discard_upload(&storage, &token).await;

    assert!(storage.get_file_by_token(&token).await.unwrap().is_none());
    assert!(!path.exists());
    assert!(!storage.delete_file(&token).await.unwrap());

    // 未登记的 token 直接忽略
    discard_upload(&storage, "never-uploaded").await;
}
