//! Integration tests for the delete workflows

mod common;

use common::{admin, auth, author, book_draft, Harness, ROOT};
use folio::adapters::blob_store::BlobCall;
use folio::core::assets::BlobTarget;
use folio::domain::{CategoryDraft, ErrorKind, ResourceId, Role, SlotName};

fn id(value: &str) -> ResourceId {
    ResourceId::new(value).unwrap()
}

#[tokio::test]
async fn test_one_failed_blob_delete_does_not_stop_the_others() {
    let h = Harness::new().await;
    let category = h.seed_category("c1", "admin-1", "ab12").await;
    h.seed_book("b1", "author-1", &category, &["g1"]).await;
    h.blobs.fail_delete_of("r2");

    let report = h.manager.delete_book(&id("b1"), &author()).await.unwrap();

    let flags: Vec<bool> = report.outcomes.iter().take(3).map(|o| o.ok).collect();
    assert_eq!(flags, vec![true, false, true]);
    assert_eq!(report.outcomes[0].target, BlobTarget::Object("r1".to_string()));
    assert_eq!(report.outcomes[2].target, BlobTarget::Object("g1".to_string()));
    assert!(report.document_removed);
    assert!(!report.is_clean());
    assert!(h.stored_book("b1").await.is_none());
}

#[tokio::test]
async fn test_delete_removes_subtree_prefix_and_folder() {
    let h = Harness::new().await;
    let category = h.seed_category("c1", "admin-1", "ab12").await;
    h.seed_book("b1", "author-1", &category, &[]).await;

    let report = h.manager.delete_book(&id("b1"), &author()).await.unwrap();

    let subtree = format!("{ROOT}/Categories/ab12/Books/fb1");
    assert_eq!(report.folder.as_str(), subtree);
    let calls = h.blobs.calls().await;
    assert!(calls.contains(&BlobCall::DeleteByPrefix(subtree.clone())));
    assert_eq!(calls.last(), Some(&BlobCall::DeleteFolder(subtree)));
    assert!(report.is_clean());
    assert_eq!(report.cascaded_documents, 0);
}

#[tokio::test]
async fn test_blob_phase_failures_never_fail_the_workflow() {
    let h = Harness::new().await;
    let category = h.seed_category("c1", "admin-1", "ab12").await;
    h.seed_book("b1", "author-1", &category, &[]).await;
    h.blobs.fail_every_delete();
    h.blobs.fail_prefix_deletes();

    let report = h.manager.delete_book(&id("b1"), &author()).await.unwrap();
    assert!(report.document_removed);
    assert_eq!(report.failures().len(), 3);
}

#[tokio::test]
async fn test_document_delete_failure_is_surfaced() {
    let h = Harness::new().await;
    let category = h.seed_category("c1", "admin-1", "ab12").await;
    h.seed_book("b1", "author-1", &category, &[]).await;
    h.documents.fail_delete();

    let err = h.manager.delete_book(&id("b1"), &author()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UpstreamFailure);
    // blobs were still attempted first
    assert_eq!(h.blobs.delete_attempts().await.len(), 2);
}

#[tokio::test]
async fn test_non_owner_delete_is_forbidden_without_mutations() {
    let h = Harness::new().await;
    let category = h.seed_category("c1", "admin-1", "ab12").await;
    h.seed_book("b1", "author-1", &category, &[]).await;

    for caller in [auth("author-2", Role::Author), auth("reader", Role::User)] {
        let err = h.manager.delete_book(&id("b1"), &caller).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }
    let err = h
        .manager
        .delete_category(&category.id, &auth("admin-2", Role::Admin))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    assert_eq!(h.blobs.mutation_count().await, 0);
    assert_eq!(h.documents.writes(), 0);
    assert!(h.stored_book("b1").await.is_some());
}

#[tokio::test]
async fn test_delete_missing_resource_is_not_found() {
    let h = Harness::new().await;
    let err = h.manager.delete_book(&id("ghost"), &author()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(h.blobs.mutation_count().await, 0);
}

#[tokio::test]
async fn test_category_delete_cascades_books_and_assets() {
    let h = Harness::new().await;
    let category = h
        .manager
        .create_category(CategoryDraft::new("Fiction"), &admin(), h.batch(&[SlotName::Image]))
        .await
        .unwrap();
    for title in ["Dune", "Hyperion"] {
        h.manager
            .create_book(
                book_draft(&category.resource.id, title),
                &author(),
                h.batch(&[SlotName::Cover, SlotName::Document, SlotName::Gallery]),
            )
            .await
            .unwrap();
    }
    assert_eq!(h.blobs.objects().await.len(), 7);

    let report = h
        .manager
        .delete_category(&category.resource.id, &admin())
        .await
        .unwrap();

    assert_eq!(report.folder, category.folder);
    assert_eq!(report.cascaded_documents, 2);
    assert!(report.document_removed);
    assert_eq!(h.documents.len("books").await, 0);
    assert_eq!(h.documents.len("categories").await, 0);
    assert!(h.blobs.objects().await.is_empty());
}

#[tokio::test]
async fn test_super_admin_may_delete_any_category() {
    let h = Harness::new().await;
    let category = h.seed_category("c1", "admin-1", "ab12").await;

    let report = h
        .manager
        .delete_category(&category.id, &auth("root", Role::SuperAdmin))
        .await
        .unwrap();
    assert!(report.document_removed);
    assert_eq!(
        report.outcomes[0].target,
        BlobTarget::Object(category.image.remote_id.clone())
    );
}
