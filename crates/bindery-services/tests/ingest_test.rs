//! Integration tests for the book asset workflow: create and replace on both
//! upload methods, cover degradation, ownership, and read delivery.

mod helpers;

use bindery_core::models::BookChanges;
use bindery_core::{AppError, UploadMethod};
use bindery_db::CatalogRepository;
use bindery_services::{
    ArtifactDelivery, AssetBackends, AssetStore, BookAssetService, CoverHost, LocalAssetStore,
};
use bytes::Bytes;
use helpers::fakes::{MemoryCatalog, StubCoverHost};
use helpers::fixtures::{draft, epub_declared, epub_inline, pdf_cover, png_cover};
use helpers::{harness, harness_without_bucket_covers, local_only_harness, test_settings};
use std::sync::Arc;
use uuid::Uuid;

#[tokio::test]
async fn test_local_create_stores_bytes_and_fills_file_info() {
    let h = harness();
    let author = Uuid::new_v4();

    let outcome = h
        .service
        .create_asset(
            author,
            UploadMethod::Local,
            draft("Dune"),
            epub_inline(500_000),
            None,
        )
        .await
        .expect("create should succeed");

    let book = &outcome.book;
    assert!(outcome.upload_grant.is_none());
    assert_eq!(book.author_id, author);
    assert_eq!(book.upload_method, UploadMethod::Local);
    assert_eq!(book.file_info.id, format!("{}-dune.epub", book.id));
    assert_eq!(book.file_info.size, "500 KB");
    assert_eq!(book.slug, format!("dune-{}", book.id));

    // The record and the bytes agree.
    let stored = h.local.object(&book.file_info.id).expect("bytes on disk");
    assert_eq!(stored.len(), 500_000);
    assert_eq!(h.catalog.get(book.id).expect("persisted").file_info, book.file_info);
}

#[tokio::test]
async fn test_remote_create_issues_grant_without_server_write() {
    let h = harness();
    let author = Uuid::new_v4();

    let outcome = h
        .service
        .create_asset(
            author,
            UploadMethod::Remote,
            draft("Dune"),
            epub_declared(500_000),
            None,
        )
        .await
        .expect("create should succeed");

    let grant = outcome.upload_grant.expect("remote create returns a grant");
    assert_eq!(
        grant.url,
        format!("https://grants.test/{}", outcome.assigned_key)
    );

    // The record points at the object optimistically; no bytes reached the
    // server side.
    assert_eq!(h.remote.object_count(), 0);
    assert_eq!(h.remote.granted_keys(), vec![outcome.assigned_key.clone()]);
    let book = h.catalog.get(outcome.book.id).expect("persisted");
    assert_eq!(book.file_info.id, outcome.assigned_key);
    assert_eq!(book.file_info.size, "500 KB");
}

#[tokio::test]
async fn test_create_rejects_wrong_content_type() {
    let h = harness();

    let mut upload = epub_inline(1024);
    upload.content_type = "application/pdf".to_string();
    let result = h
        .service
        .create_asset(Uuid::new_v4(), UploadMethod::Local, draft("Dune"), upload, None)
        .await;

    assert!(matches!(result, Err(AppError::InvalidAsset(_))));
    assert_eq!(h.catalog.count(), 0);
    assert_eq!(h.local.object_count(), 0);
}

#[tokio::test]
async fn test_create_rejects_empty_file() {
    let h = harness();

    let result = h
        .service
        .create_asset(
            Uuid::new_v4(),
            UploadMethod::Local,
            draft("Dune"),
            epub_inline(0),
            None,
        )
        .await;

    assert!(matches!(result, Err(AppError::InvalidAsset(_))));
    assert_eq!(h.catalog.count(), 0);
}

#[tokio::test]
async fn test_create_rejects_unconfigured_method() {
    let h = local_only_harness();

    let result = h
        .service
        .create_asset(
            Uuid::new_v4(),
            UploadMethod::Remote,
            draft("Dune"),
            epub_declared(1024),
            None,
        )
        .await;

    match result {
        Err(AppError::InvalidAsset(msg)) => assert!(msg.contains("remote")),
        other => panic!("expected InvalidAsset, got {:?}", other.map(|o| o.book.id)),
    }
    assert_eq!(h.catalog.count(), 0);
}

#[tokio::test]
async fn test_create_attaches_cover_through_cdn() {
    let h = harness();

    let outcome = h
        .service
        .create_asset(
            Uuid::new_v4(),
            UploadMethod::Local,
            draft("Dune"),
            epub_inline(1024),
            Some(png_cover()),
        )
        .await
        .expect("create should succeed");

    let book = &outcome.book;
    let expected_hint = format!("{}-dune.png", book.id);
    assert_eq!(
        h.cdn_covers.uploaded(),
        vec![(expected_hint.clone(), "image/png".to_string())]
    );
    let cover = book.cover.as_ref().expect("cover attached");
    assert_eq!(cover.id, format!("cover-{}", expected_hint));
    assert!(h.bucket_covers.uploaded().is_empty());
}

#[tokio::test]
async fn test_remote_create_covers_go_to_public_bucket() {
    let h = harness();

    let outcome = h
        .service
        .create_asset(
            Uuid::new_v4(),
            UploadMethod::Remote,
            draft("Dune"),
            epub_declared(1024),
            Some(png_cover()),
        )
        .await
        .expect("create should succeed");

    assert!(outcome.book.cover.is_some());
    assert_eq!(h.bucket_covers.uploaded().len(), 1);
    assert!(h.cdn_covers.uploaded().is_empty());
}

#[tokio::test]
async fn test_create_survives_cover_host_outage() {
    let h = harness();
    h.cdn_covers.set_fail_upload(true);

    let outcome = h
        .service
        .create_asset(
            Uuid::new_v4(),
            UploadMethod::Local,
            draft("Dune"),
            epub_inline(1024),
            Some(png_cover()),
        )
        .await
        .expect("cover failure must not fail the create");

    assert!(outcome.book.cover.is_none());
    assert!(h.local.object(&outcome.book.file_info.id).is_some());
    assert_eq!(h.catalog.count(), 1);
}

#[tokio::test]
async fn test_create_skips_non_image_cover() {
    let h = harness();

    let outcome = h
        .service
        .create_asset(
            Uuid::new_v4(),
            UploadMethod::Local,
            draft("Dune"),
            epub_inline(1024),
            Some(pdf_cover()),
        )
        .await
        .expect("bad cover must not fail the create");

    assert!(outcome.book.cover.is_none());
    assert!(h.cdn_covers.uploaded().is_empty());
}

#[tokio::test]
async fn test_remote_cover_without_public_bucket_degrades() {
    let h = harness_without_bucket_covers();

    let outcome = h
        .service
        .create_asset(
            Uuid::new_v4(),
            UploadMethod::Remote,
            draft("Dune"),
            epub_declared(1024),
            Some(png_cover()),
        )
        .await
        .expect("missing cover host must not fail the create");

    assert!(outcome.book.cover.is_none());
    assert!(outcome.upload_grant.is_some());
}

#[tokio::test]
async fn test_local_replace_retires_old_artifact() {
    let h = harness();
    let author = Uuid::new_v4();
    let created = h
        .service
        .create_asset(
            author,
            UploadMethod::Local,
            draft("Dune"),
            epub_inline(2048),
            None,
        )
        .await
        .expect("create");
    let old_key = created.book.file_info.id.clone();

    let replaced = h
        .service
        .replace_asset(
            author,
            created.book.id,
            None,
            BookChanges {
                title: Some("Dune Messiah".to_string()),
            },
            Some(epub_inline(4096)),
            None,
        )
        .await
        .expect("replace should succeed");

    let book = &replaced.book;
    assert_eq!(book.title, "Dune Messiah");
    assert_eq!(book.slug, format!("dune-messiah-{}", book.id));
    assert_eq!(book.file_info.id, format!("{}-dune-messiah.epub", book.id));
    assert_eq!(book.file_info.size, "4.10 KB");

    assert_eq!(h.local.deleted_keys(), vec![old_key.clone()]);
    assert!(h.local.object(&old_key).is_none());
    assert_eq!(
        h.local.object(&book.file_info.id).expect("new bytes").len(),
        4096
    );
}

#[tokio::test]
async fn test_local_replace_same_title_reuses_key() {
    let h = harness();
    let author = Uuid::new_v4();
    let created = h
        .service
        .create_asset(
            author,
            UploadMethod::Local,
            draft("Dune"),
            epub_inline(2048),
            None,
        )
        .await
        .expect("create");

    let replaced = h
        .service
        .replace_asset(
            author,
            created.book.id,
            None,
            BookChanges::default(),
            Some(epub_inline(4096)),
            None,
        )
        .await
        .expect("replace");

    // Same id and title derive the same key; the delete-then-write sequence
    // leaves exactly the new bytes behind.
    assert_eq!(replaced.book.file_info.id, created.book.file_info.id);
    assert_eq!(h.local.object_count(), 1);
    assert_eq!(
        h.local
            .object(&replaced.book.file_info.id)
            .expect("bytes")
            .len(),
        4096
    );
}

#[tokio::test]
async fn test_local_replace_fails_when_old_file_missing() {
    let h = harness();
    let author = Uuid::new_v4();
    let created = h
        .service
        .create_asset(
            author,
            UploadMethod::Local,
            draft("Dune"),
            epub_inline(2048),
            None,
        )
        .await
        .expect("create");
    let old_key = created.book.file_info.id.clone();
    h.local.remove_object(&old_key);

    let result = h
        .service
        .replace_asset(
            author,
            created.book.id,
            None,
            BookChanges::default(),
            Some(epub_inline(4096)),
            None,
        )
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    // No new write happened and the record is untouched.
    assert_eq!(h.local.object_count(), 0);
    let book = h.catalog.get(created.book.id).expect("record kept");
    assert_eq!(book.file_info, created.book.file_info);
}

#[tokio::test]
async fn test_local_replace_without_bytes_leaves_old_artifact_in_place() {
    let h = harness();
    let author = Uuid::new_v4();
    let created = h
        .service
        .create_asset(
            author,
            UploadMethod::Local,
            draft("Dune"),
            epub_inline(2048),
            None,
        )
        .await
        .expect("create");

    // Declared-only metadata fits the remote method, not this local record.
    let result = h
        .service
        .replace_asset(
            author,
            created.book.id,
            None,
            BookChanges::default(),
            Some(epub_declared(4096)),
            None,
        )
        .await;

    assert!(matches!(result, Err(AppError::InvalidAsset(_))));
    // Rejected before the retire step: the old bytes are still there.
    assert!(h.local.object(&created.book.file_info.id).is_some());
    assert!(h.local.deleted_keys().is_empty());
}

#[tokio::test]
async fn test_remote_create_rejects_inline_bytes() {
    let h = harness();

    let result = h
        .service
        .create_asset(
            Uuid::new_v4(),
            UploadMethod::Remote,
            draft("Dune"),
            epub_inline(2048),
            None,
        )
        .await;

    assert!(matches!(result, Err(AppError::InvalidAsset(_))));
    assert!(h.remote.granted_keys().is_empty());
    assert_eq!(h.catalog.count(), 0);
}

#[tokio::test]
async fn test_local_replace_write_failure_after_retire_surfaces() {
    let h = harness();
    let author = Uuid::new_v4();
    let created = h
        .service
        .create_asset(
            author,
            UploadMethod::Local,
            draft("Dune"),
            epub_inline(2048),
            None,
        )
        .await
        .expect("create");
    h.local.set_fail_place(true);

    let result = h
        .service
        .replace_asset(
            author,
            created.book.id,
            None,
            BookChanges::default(),
            Some(epub_inline(4096)),
            None,
        )
        .await;

    // The old bytes are gone and the write failed; the error must reach the
    // caller while the record keeps naming the old key.
    assert!(matches!(result, Err(AppError::Storage(_))));
    assert_eq!(h.local.object_count(), 0);
    let book = h.catalog.get(created.book.id).expect("record kept");
    assert_eq!(book.file_info.id, created.book.file_info.id);
}

#[tokio::test]
async fn test_remote_replace_continues_past_delete_failure() {
    let h = harness();
    let author = Uuid::new_v4();
    let created = h
        .service
        .create_asset(
            author,
            UploadMethod::Remote,
            draft("Dune"),
            epub_declared(500_000),
            None,
        )
        .await
        .expect("create");
    let old_key = created.book.file_info.id.clone();
    h.remote.set_fail_delete(true);

    let replaced = h
        .service
        .replace_asset(
            author,
            created.book.id,
            None,
            BookChanges {
                title: Some("Dune Messiah".to_string()),
            },
            Some(epub_declared(700_000)),
            None,
        )
        .await
        .expect("remote replace tolerates a failed delete");

    assert_eq!(h.remote.deleted_keys(), vec![old_key]);
    let grant = replaced.upload_grant.expect("new grant issued");
    assert!(grant.url.contains("dune-messiah"));
    assert_eq!(replaced.book.file_info.size, "700 KB");
}

#[tokio::test]
async fn test_replace_rejects_method_change() {
    let h = harness();
    let author = Uuid::new_v4();
    let created = h
        .service
        .create_asset(
            author,
            UploadMethod::Local,
            draft("Dune"),
            epub_inline(2048),
            None,
        )
        .await
        .expect("create");

    let result = h
        .service
        .replace_asset(
            author,
            created.book.id,
            Some(UploadMethod::Remote),
            BookChanges::default(),
            Some(epub_declared(4096)),
            None,
        )
        .await;

    assert!(matches!(result, Err(AppError::InvalidAsset(_))));
    // Rejected before any storage work.
    assert!(h.local.deleted_keys().is_empty());
    assert!(h.remote.granted_keys().is_empty());
}

#[tokio::test]
async fn test_replace_cover_destroys_old_then_uploads_new() {
    let h = harness();
    let author = Uuid::new_v4();
    let created = h
        .service
        .create_asset(
            author,
            UploadMethod::Local,
            draft("Dune"),
            epub_inline(2048),
            Some(png_cover()),
        )
        .await
        .expect("create");
    let old_cover = created.book.cover.clone().expect("cover attached");

    let replaced = h
        .service
        .replace_asset(
            author,
            created.book.id,
            None,
            BookChanges::default(),
            None,
            Some(png_cover()),
        )
        .await
        .expect("cover-only replace");

    assert_eq!(h.cdn_covers.destroyed(), vec![old_cover.id]);
    assert_eq!(h.cdn_covers.uploaded().len(), 2);
    assert!(replaced.book.cover.is_some());
    // The primary artifact was not touched.
    assert_eq!(replaced.book.file_info, created.book.file_info);
    assert!(h.local.deleted_keys().is_empty());
}

#[tokio::test]
async fn test_failed_replacement_cover_keeps_previous_pointer() {
    let h = harness();
    let author = Uuid::new_v4();
    let created = h
        .service
        .create_asset(
            author,
            UploadMethod::Local,
            draft("Dune"),
            epub_inline(2048),
            Some(png_cover()),
        )
        .await
        .expect("create");
    let old_cover = created.book.cover.clone().expect("cover attached");
    h.cdn_covers.set_fail_upload(true);

    let replaced = h
        .service
        .replace_asset(
            author,
            created.book.id,
            None,
            BookChanges::default(),
            None,
            Some(png_cover()),
        )
        .await
        .expect("cover failure must not fail the replace");

    // Destroy ran, the new upload failed, and the record still carries the
    // previous handle rather than none at all.
    assert_eq!(h.cdn_covers.destroyed(), vec![old_cover.id.clone()]);
    assert_eq!(replaced.book.cover, Some(old_cover));
}

#[tokio::test]
async fn test_destroy_failure_does_not_block_cover_swap() {
    let h = harness();
    let author = Uuid::new_v4();
    let created = h
        .service
        .create_asset(
            author,
            UploadMethod::Local,
            draft("Dune"),
            epub_inline(2048),
            Some(png_cover()),
        )
        .await
        .expect("create");
    h.cdn_covers.set_fail_destroy(true);

    let replaced = h
        .service
        .replace_asset(
            author,
            created.book.id,
            None,
            BookChanges::default(),
            None,
            Some(png_cover()),
        )
        .await
        .expect("destroy failure must not fail the replace");

    assert!(replaced.book.cover.is_some());
    assert_eq!(h.cdn_covers.uploaded().len(), 2);
}

#[tokio::test]
async fn test_title_only_replace_touches_no_storage() {
    let h = harness();
    let author = Uuid::new_v4();
    let created = h
        .service
        .create_asset(
            author,
            UploadMethod::Local,
            draft("Dune"),
            epub_inline(2048),
            None,
        )
        .await
        .expect("create");

    let replaced = h
        .service
        .replace_asset(
            author,
            created.book.id,
            None,
            BookChanges {
                title: Some("Children of Dune".to_string()),
            },
            None,
            None,
        )
        .await
        .expect("metadata-only replace");

    let book = &replaced.book;
    assert_eq!(book.title, "Children of Dune");
    assert_eq!(book.slug, format!("children-of-dune-{}", book.id));
    // The artifact stays under its original key.
    assert_eq!(book.file_info, created.book.file_info);
    assert!(h.local.deleted_keys().is_empty());
    assert_eq!(h.local.object_count(), 1);
}

#[tokio::test]
async fn test_empty_replace_skips_catalog_write() {
    let h = harness();
    let author = Uuid::new_v4();
    let created = h
        .service
        .create_asset(
            author,
            UploadMethod::Local,
            draft("Dune"),
            epub_inline(2048),
            None,
        )
        .await
        .expect("create");

    let replaced = h
        .service
        .replace_asset(
            author,
            created.book.id,
            None,
            BookChanges::default(),
            None,
            None,
        )
        .await
        .expect("no-op replace");

    assert_eq!(replaced.book.updated_at, created.book.updated_at);
}

#[tokio::test]
async fn test_non_owner_reads_as_not_found() {
    let h = harness();
    let owner = Uuid::new_v4();
    let created = h
        .service
        .create_asset(
            owner,
            UploadMethod::Local,
            draft("Dune"),
            epub_inline(2048),
            None,
        )
        .await
        .expect("create");

    let intruder = Uuid::new_v4();
    let replace = h
        .service
        .replace_asset(
            intruder,
            created.book.id,
            None,
            BookChanges {
                title: Some("Hijacked".to_string()),
            },
            None,
            None,
        )
        .await;
    assert!(matches!(replace, Err(AppError::NotFound(_))));

    let access = h.service.access_url(intruder, created.book.id).await;
    assert!(matches!(access, Err(AppError::NotFound(_))));

    // Metadata reads carry no ownership requirement.
    let book = h.service.fetch_book(created.book.id).await.expect("fetch");
    assert_eq!(book.title, "Dune");
}

#[tokio::test]
async fn test_deliver_local_serves_bytes() {
    let h = harness();
    let author = Uuid::new_v4();
    let created = h
        .service
        .create_asset(
            author,
            UploadMethod::Local,
            draft("Dune"),
            epub_inline(2048),
            None,
        )
        .await
        .expect("create");

    let delivery = h
        .service
        .deliver_artifact(author, created.book.id)
        .await
        .expect("deliver");

    match delivery {
        ArtifactDelivery::Bytes { book, data } => {
            assert_eq!(book.id, created.book.id);
            assert_eq!(data, Bytes::from(vec![0x50; 2048]));
        }
        ArtifactDelivery::Redirect { url } => panic!("expected bytes, got redirect to {}", url),
    }
}

#[tokio::test]
async fn test_deliver_remote_redirects_to_signed_url() {
    let h = harness();
    let author = Uuid::new_v4();
    let created = h
        .service
        .create_asset(
            author,
            UploadMethod::Remote,
            draft("Dune"),
            epub_declared(2048),
            None,
        )
        .await
        .expect("create");

    let delivery = h
        .service
        .deliver_artifact(author, created.book.id)
        .await
        .expect("deliver");

    match delivery {
        ArtifactDelivery::Redirect { url } => {
            assert_eq!(url, format!("https://reads.test/{}", created.assigned_key));
        }
        ArtifactDelivery::Bytes { .. } => panic!("expected redirect, got bytes"),
    }

    let access = h
        .service
        .access_url(author, created.book.id)
        .await
        .expect("access url");
    assert!(access.expires_at.is_some());
}

#[tokio::test]
async fn test_local_workflow_against_filesystem_store() {
    let temp = tempfile::tempdir().expect("tempdir");
    let store = LocalAssetStore::new(temp.path(), "http://localhost:4000/files".to_string())
        .await
        .expect("local store");
    let catalog = MemoryCatalog::new();
    let covers = StubCoverHost::new();
    let backends = AssetBackends::new(Some(Arc::new(store) as Arc<dyn AssetStore>), None)
        .expect("backends");
    let service = BookAssetService::new(
        catalog.clone() as Arc<dyn CatalogRepository>,
        backends,
        covers as Arc<dyn CoverHost>,
        None,
        test_settings(),
    );

    let author = Uuid::new_v4();
    let created = service
        .create_asset(
            author,
            UploadMethod::Local,
            draft("Dune"),
            epub_inline(2048),
            None,
        )
        .await
        .expect("create");
    let old_path = temp.path().join(&created.book.file_info.id);
    assert!(old_path.exists());

    let replaced = service
        .replace_asset(
            author,
            created.book.id,
            None,
            BookChanges {
                title: Some("Dune Messiah".to_string()),
            },
            Some(epub_inline(4096)),
            None,
        )
        .await
        .expect("replace");

    assert!(!old_path.exists());
    let new_path = temp.path().join(&replaced.book.file_info.id);
    assert!(new_path.exists());
    assert_eq!(std::fs::metadata(&new_path).expect("metadata").len(), 4096);
}
