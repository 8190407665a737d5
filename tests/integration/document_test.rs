//! Integration tests for document reads, lookups, and versioned writes.

mod helpers;

use serde_json::json;

use doctree_core::error::ErrorKind;
use doctree_core::traits::Repository;
use doctree_core::types::pagination::PageRequest;
use doctree_entity::node::{CasOutcome, DocWrite, NewNode, SourceScope};
use doctree_service::ListQuery;

use helpers::TestStore;

#[tokio::test]
async fn test_read_by_id_and_jrn() {
    let Some(store) = TestStore::new().await else {
        return;
    };

    let folder = store.folder("Folder").await;
    let doc = store.document_in(folder.id, "Doc").await;

    assert_eq!(store.docs.read_by_id(doc.id).await.unwrap(), Some(doc.clone()));
    assert_eq!(store.docs.read_by_jrn(&doc.jrn).await.unwrap(), Some(doc.clone()));
    assert_eq!(store.docs.read_by_jrn("jrn:docs:document/nope").await.unwrap(), None);

    let many = store
        .docs
        .read_many_by_jrns(&[folder.jrn.clone(), doc.jrn.clone(), "jrn:missing".to_string()])
        .await
        .unwrap();
    let mut ids: Vec<i64> = many.iter().map(|n| n.id).collect();
    ids.sort();
    assert_eq!(ids, vec![folder.id, doc.id]);
    assert!(store.docs.read_many_by_jrns(&[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_repository_trait_reads() {
    let Some(store) = TestStore::new().await else {
        return;
    };

    let folder = store.folder("Folder").await;
    let repo = store.node_repo.as_ref();

    let found = Repository::find_by_id(repo, &folder.id).await.unwrap();
    assert_eq!(found.as_ref(), Some(&folder));
    let many = Repository::find_many(repo, &[folder.id, i64::MAX]).await.unwrap();
    assert_eq!(many, vec![folder]);
    assert!(Repository::count(repo).await.unwrap() >= 1);

    let page = Repository::find_all(repo, &PageRequest::new(1, 5)).await.unwrap();
    assert!(page.items.len() <= 5);
    assert!(page.total_items >= 1);
}

#[tokio::test]
async fn test_duplicate_jrn_is_a_conflict() {
    let Some(store) = TestStore::new().await else {
        return;
    };

    let jrn = format!("jrn:docs:document/{}", helpers::unique("dup"));
    let new = NewNode {
        jrn: Some(jrn.clone()),
        ..NewNode::document("Dup", "")
    };
    store.create(new.clone()).await;
    let err = store
        .tree
        .create(new.in_space(store.space_id))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn test_list_hides_internal_namespace() {
    let Some(store) = TestStore::new().await else {
        return;
    };

    let visible = store.folder("Visible").await;
    let internal = store
        .create(NewNode {
            jrn: Some(format!(
                "{}{}",
                store.config.internal_jrn_prefix,
                helpers::unique("root")
            )),
            ..NewNode::folder("Internal")
        })
        .await;
    let trashed = store.folder("Trashed").await;
    store.tree.soft_delete(trashed.id).await.unwrap();

    let page = PageRequest::new(1, 50);
    let default_query = ListQuery {
        space_id: Some(store.space_id),
        ..Default::default()
    };
    let listed = store.docs.list(&default_query, &page).await.unwrap();
    assert_eq!(listed.total_items, 1);
    assert_eq!(listed.items[0].id, visible.id);

    let with_internal = ListQuery {
        include_internal: true,
        ..default_query.clone()
    };
    let listed = store.docs.list(&with_internal, &page).await.unwrap();
    assert_eq!(listed.total_items, 2);

    let internal_only = ListQuery {
        jrn_prefix: Some(internal.jrn.clone()),
        ..default_query
    };
    let listed = store.docs.list(&internal_only, &page).await.unwrap();
    assert_eq!(listed.items.iter().map(|n| n.id).collect::<Vec<_>>(), vec![internal.id]);
}

#[tokio::test]
async fn test_list_paginates_in_path_order() {
    let Some(store) = TestStore::new().await else {
        return;
    };

    for slug in ["c", "a", "b"] {
        store
            .create(NewNode::folder(slug).with_slug(helpers::unique(slug)))
            .await;
    }
    let query = ListQuery {
        space_id: Some(store.space_id),
        ..Default::default()
    };

    let first = store.docs.list(&query, &PageRequest::new(1, 2)).await.unwrap();
    assert_eq!(first.total_items, 3);
    assert_eq!(first.items.len(), 2);
    assert!(first.has_next);
    assert!(first.items[0].path < first.items[1].path);

    let second = store.docs.list(&query, &PageRequest::new(2, 2)).await.unwrap();
    assert_eq!(second.items.len(), 1);
    assert!(!second.has_next);
    assert!(first.items[1].path < second.items[0].path);
}

#[tokio::test]
async fn test_update_doc_applies_only_newer_versions() {
    let Some(store) = TestStore::new().await else {
        return;
    };

    let folder = store.folder("Folder").await;
    let doc = store.document_in(folder.id, "Doc").await;

    let write = DocWrite::next_content(&doc, "second draft");
    let updated = store.docs.update_doc(doc.id, &write).await.unwrap().unwrap();
    assert_eq!(updated.version, 2);
    assert_eq!(updated.content, "second draft");

    let stale = DocWrite {
        content: "stale".to_string(),
        ..write.clone()
    };
    assert_eq!(store.docs.update_doc(doc.id, &stale).await.unwrap(), None);
    assert_eq!(store.reload(doc.id).await.content, "second draft");

    let jump = DocWrite {
        version: 10,
        ..DocWrite::next_content(&updated, "jumped")
    };
    assert_eq!(store.docs.update_doc(doc.id, &jump).await.unwrap().unwrap().version, 10);
}

#[tokio::test]
async fn test_update_doc_if_version_succeeds_once() {
    let Some(store) = TestStore::new().await else {
        return;
    };

    let folder = store.folder("Folder").await;
    let doc = store.document_in(folder.id, "Doc").await;
    let write = DocWrite::next_content(&doc, "edited");

    let outcome = store.docs.update_doc_if_version(doc.id, 1, &write).await.unwrap();
    let updated = outcome.into_node().unwrap();
    assert_eq!(updated.version, 2);
    assert_eq!(updated.content, "edited");

    let again = store.docs.update_doc_if_version(doc.id, 1, &write).await.unwrap();
    assert_eq!(again, CasOutcome::Conflict);
    assert_eq!(store.reload(doc.id).await.version, 2);

    let missing = store.docs.update_doc_if_version(i64::MAX, 1, &write).await.unwrap();
    assert!(missing.is_conflict());
}

#[tokio::test]
async fn test_concurrent_compare_and_swap_has_one_winner() {
    let Some(store) = TestStore::new().await else {
        return;
    };

    let folder = store.folder("Folder").await;
    let doc = store.document_in(folder.id, "Doc").await;

    let mut handles = Vec::new();
    for i in 0..4 {
        let docs = store.docs.clone();
        let write = DocWrite::next_content(&doc, format!("writer {i}"));
        let id = doc.id;
        handles.push(tokio::spawn(async move {
            docs.update_doc_if_version(id, 1, &write).await
        }));
    }

    let mut winners = 0;
    for handle in handles {
        if !handle.await.unwrap().unwrap().is_conflict() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);
    assert_eq!(store.reload(doc.id).await.version, 2);
}

#[tokio::test]
async fn test_rename_title_only() {
    let Some(store) = TestStore::new().await else {
        return;
    };

    let folder = store.folder("Old Name").await;
    let renamed = store.docs.rename_title_only(folder.id, "New Name").await.unwrap();
    assert_eq!(renamed.title(), Some("New Name"));
    assert_eq!(renamed.slug, folder.slug);
    assert_eq!(renamed.path, folder.path);
    assert_eq!(renamed.jrn, folder.jrn);
    assert_eq!(renamed.version, folder.version + 1);

    let err = store.docs.rename_title_only(folder.id, "  ").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    let err = store.docs.rename_title_only(i64::MAX, "X").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_find_by_exact_folder_name() {
    let Some(store) = TestStore::new().await else {
        return;
    };

    let name = helpers::unique("Reports");
    let folder = store.folder(&name).await;
    store.document_in(folder.id, &name).await;

    let found = store
        .docs
        .find_by_exact_folder_name(Some(store.space_id), &name)
        .await
        .unwrap();
    assert_eq!(found.map(|n| n.id), Some(folder.id));
    assert_eq!(
        store
            .docs
            .find_by_exact_folder_name(Some(store.space_id), &name.to_lowercase())
            .await
            .unwrap(),
        None
    );

    store.tree.soft_delete(folder.id).await.unwrap();
    assert_eq!(
        store.docs.find_by_exact_folder_name(None, &name).await.unwrap(),
        None
    );
}

#[tokio::test]
async fn test_find_by_source_path() {
    let Some(store) = TestStore::new().await else {
        return;
    };

    let file = format!("{}.md", helpers::unique("intro"));
    let path = format!("repo/docs/{file}");
    let doc = store
        .create(NewNode {
            source_metadata: Some(json!({ "path": &path, "integrationId": 42 })),
            ..NewNode::document("Intro", "imported")
        })
        .await;

    let exact = store.docs.find_by_source_path(&path, None).await.unwrap();
    assert_eq!(exact.map(|n| n.id), Some(doc.id));

    let moved_root = format!("mirror/{file}");
    let by_name = store.docs.find_by_source_path(&moved_root, None).await.unwrap();
    assert_eq!(by_name.map(|n| n.id), Some(doc.id));

    let scoped = SourceScope { integration_id: 42 };
    let found = store.docs.find_by_source_path(&path, Some(scoped)).await.unwrap();
    assert_eq!(found.map(|n| n.id), Some(doc.id));

    let other = SourceScope { integration_id: 43 };
    assert_eq!(store.docs.find_by_source_path(&path, Some(other)).await.unwrap(), None);
    assert_eq!(
        store.docs.find_by_source_path(&moved_root, Some(other)).await.unwrap(),
        None
    );
    assert_eq!(store.docs.find_by_source_path("", None).await.unwrap(), None);
}
