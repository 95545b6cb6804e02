use folio::FolioError;
use folio::admin::{
    AdminController, AdminView, EditorView, GalleryTile, ListView, LoginForm, Notice,
    ThumbnailView,
};
use folio::gateway::{GatewayCall, MemoryBackend, MemoryStore, Operation};
use folio::media::LocalFile;
use folio_schema::{ProjectFields, ProjectId, ProjectRow};
use serde_json::json;
use std::sync::Arc;

const EMAIL: &str = "owner@example.com";
const PASSWORD: &str = "correct horse";

fn store() -> MemoryStore {
    MemoryStore::new().with_user(EMAIL, PASSWORD)
}

fn image(name: &str) -> LocalFile {
    LocalFile::new(name, None, format!("bytes of {name}"))
}

fn images(n: usize) -> Vec<LocalFile> {
    (0..n).map(|i| image(&format!("shot-{i}.jpg"))).collect()
}

fn fields(title: &str) -> ProjectFields {
    ProjectFields {
        title: Some(title.to_string()),
        ..ProjectFields::default()
    }
}

fn seed(store: &MemoryStore, value: serde_json::Value) -> ProjectRow {
    store.seed(serde_json::from_value(value).expect("parse seed row"))
}

async fn signed_in(store: &MemoryStore) -> (Arc<MemoryBackend>, AdminController) {
    let backend = Arc::new(store.backend());
    let mut controller = AdminController::new(backend.clone());
    controller.start().await;
    controller
        .login(LoginForm {
            email: EMAIL.to_string(),
            password: PASSWORD.to_string(),
        })
        .await
        .expect("sign in");
    store.clear_calls();
    (backend, controller)
}

fn editor(controller: &AdminController) -> EditorView {
    match controller.view() {
        AdminView::Dashboard(dashboard) => dashboard.editor.expect("editor is open"),
        AdminView::Login { .. } => panic!("expected the dashboard"),
    }
}

#[tokio::test]
async fn wrong_password_keeps_the_login_form_with_the_backend_message() {
    let store = store();
    let mut controller = AdminController::new(Arc::new(store.backend()));
    controller.start().await;

    let err = controller
        .login(LoginForm {
            email: EMAIL.to_string(),
            password: "wrong".to_string(),
        })
        .await
        .expect_err("bad credentials should fail");

    assert!(matches!(err, FolioError::Auth { .. }));
    assert!(!controller.is_authenticated());
    assert_eq!(
        controller.view(),
        AdminView::Login {
            error: Some("Invalid login credentials".to_string())
        }
    );
    assert_eq!(store.operations(), vec![Operation::SignIn]);
}

#[tokio::test]
async fn signing_in_loads_the_list_newest_first() {
    let store = store();
    seed(&store, json!({ "id": 1, "title": "Older", "launched_on": "2023-01" }));
    seed(&store, json!({ "id": 2, "title": "Newer", "is_featured": true }));

    let (_backend, controller) = signed_in(&store).await;

    let AdminView::Dashboard(dashboard) = controller.view() else {
        panic!("expected the dashboard");
    };
    assert_eq!(dashboard.user.as_deref(), Some(EMAIL));
    let ListView::Items(items) = dashboard.list else {
        panic!("expected list items");
    };
    let summary: Vec<_> = items
        .iter()
        .map(|item| (item.title.as_str(), item.meta.as_str()))
        .collect();
    assert_eq!(summary, vec![("Newer", "Featured"), ("Older", "2023-01")]);
}

#[tokio::test]
async fn create_with_thumbnail_and_two_gallery_files_reopens_on_the_saved_row() {
    let store = store();
    let (_backend, mut controller) = signed_in(&store).await;

    controller.open_new();
    assert_eq!(editor(&controller).heading, "New project");
    assert!(!editor(&controller).can_delete);

    controller.choose_thumbnail(Some(image("Cover.PNG")));
    controller.choose_gallery(vec![image("one.jpg"), image("two")]);
    assert_eq!(controller.live_previews(), 3);

    let row = controller.submit(fields("Kiln")).await.expect("create");

    let thumbnail = row.thumbnail_url.clone().expect("thumbnail path");
    assert!(thumbnail.starts_with("project-1/thumbnail-"));
    assert!(thumbnail.ends_with(".png"));
    assert_eq!(row.gallery_urls.len(), 2);
    assert!(row.gallery_urls[0].starts_with("project-1/gallery-0-"));
    assert!(row.gallery_urls[0].ends_with(".jpg"));
    assert!(row.gallery_urls[1].starts_with("project-1/gallery-1-"));
    assert!(row.gallery_urls[1].ends_with(".jpg"));

    assert_eq!(
        store.operations(),
        vec![
            Operation::Insert,
            Operation::Upload,
            Operation::Update,
            Operation::Upload,
            Operation::Upload,
            Operation::Update,
        ]
    );
    let Some(GatewayCall::Insert(insert)) = store.calls().into_iter().next() else {
        panic!("expected the insert first");
    };
    assert!(insert.gallery_urls.is_empty());
    assert_eq!(store.blob_paths().len(), 3);
    assert_eq!(store.project(&row.id), Some(row.clone()));

    assert_eq!(controller.current_project(), Some(&row));
    assert_eq!(controller.projects().first(), Some(&row));
    assert!(controller.pending().is_empty());
    assert_eq!(controller.live_previews(), 0);

    let view = editor(&controller);
    assert_eq!(view.heading, "Editing: Kiln");
    assert_eq!(view.notice, Some(Notice::Success("Project created.".to_string())));
    assert!(view.can_delete);
    assert!(matches!(
        view.thumbnail,
        ThumbnailView::Stored { ref url, .. } if url == &format!("memory://project-images/{thumbnail}")
    ));
    assert_eq!(view.gallery.len(), 2);
    assert!(
        view.gallery
            .iter()
            .all(|tile| matches!(tile, GalleryTile::Stored { .. }))
    );
}

#[tokio::test]
async fn create_without_media_is_a_single_insert() {
    let store = store();
    let (_backend, mut controller) = signed_in(&store).await;

    controller.open_new();
    let row = controller.submit(fields("Plain")).await.expect("create");

    assert_eq!(store.operations(), vec![Operation::Insert]);
    assert_eq!(row.thumbnail_url, None);
    assert!(row.gallery_urls.is_empty());
}

#[tokio::test]
async fn removing_a_and_adding_one_saves_b_then_the_new_path() {
    let store = store();
    seed(
        &store,
        json!({ "id": 1, "title": "Pond", "gallery_urls": ["a.jpg", "b.jpg"] }),
    );
    store.seed_blob("a.jpg");
    store.seed_blob("b.jpg");
    let (_backend, mut controller) = signed_in(&store).await;

    controller.open_project(&ProjectId::new("1")).expect("open");
    assert!(controller.remove_gallery_image("a.jpg"));
    assert_eq!(controller.choose_gallery(vec![image("c.webp")]).len(), 1);

    let row = controller
        .submit(fields("Pond"))
        .await
        .expect("save");

    assert_eq!(row.gallery_urls.len(), 2);
    assert_eq!(row.gallery_urls[0], "b.jpg");
    assert!(row.gallery_urls[1].starts_with("project-1/gallery-1-"));
    assert!(row.gallery_urls[1].ends_with(".webp"));

    let calls = store.calls();
    assert!(matches!(
        &calls[0],
        GatewayCall::Remove { paths } if paths == &vec!["a.jpg".to_string()]
    ));
    assert!(matches!(&calls[1], GatewayCall::Upload { path, .. } if path == &row.gallery_urls[1]));
    assert!(matches!(&calls[2], GatewayCall::Update { patch, .. }
        if patch.gallery_urls.as_ref() == Some(&row.gallery_urls)
            && patch.fields.as_ref().and_then(|f| f.title.as_deref()) == Some("Pond")
            && patch.thumbnail_url.is_none()));
    assert_eq!(calls.len(), 3);

    assert!(!store.has_blob("a.jpg"));
    assert_eq!(controller.projects()[0], row);
    assert_eq!(
        editor(&controller).notice,
        Some(Notice::Success("Project saved.".to_string()))
    );
}

#[tokio::test]
async fn removing_the_same_image_twice_is_idempotent() {
    let store = store();
    seed(&store, json!({ "id": 1, "gallery_urls": ["a.jpg", "b.jpg"] }));
    let (_backend, mut controller) = signed_in(&store).await;
    controller.open_project(&ProjectId::new("1")).expect("open");

    assert!(controller.remove_gallery_image("a.jpg"));
    assert!(!controller.remove_gallery_image("a.jpg"));
    assert!(!controller.remove_gallery_image("not-in-gallery.jpg"));
    assert_eq!(controller.pending().removals().len(), 1);

    let view = editor(&controller);
    assert_eq!(view.gallery.len(), 1);
    assert_eq!(view.remaining_slots, 9);
    // Nothing reaches the backend before save.
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn nine_files_with_two_existing_accepts_eight() {
    let store = store();
    seed(&store, json!({ "id": 1, "gallery_urls": ["a.jpg", "b.jpg"] }));
    let (_backend, mut controller) = signed_in(&store).await;
    controller.open_project(&ProjectId::new("1")).expect("open");

    let accepted = controller.choose_gallery(images(9));

    assert_eq!(accepted.len(), 8);
    assert_eq!(controller.pending().gallery().len(), 8);
    assert_eq!(controller.live_previews(), 8);
    assert_eq!(editor(&controller).remaining_slots, 0);
    assert!(controller.choose_gallery(images(1)).is_empty());
}

#[tokio::test]
async fn edit_result_never_exceeds_ten_images() {
    let store = store();
    let existing: Vec<String> = (0..10).map(|i| format!("project-1/old-{i}.jpg")).collect();
    seed(&store, json!({ "id": 1, "gallery_urls": existing }));
    let (_backend, mut controller) = signed_in(&store).await;
    controller.open_project(&ProjectId::new("1")).expect("open");

    controller.remove_gallery_image("project-1/old-3.jpg");
    controller.remove_gallery_image("project-1/old-7.jpg");
    assert_eq!(controller.choose_gallery(images(5)).len(), 2);

    let row = controller.submit(fields("Full")).await.expect("save");

    assert_eq!(row.gallery_urls.len(), 10);
    let survivors: Vec<String> = existing
        .iter()
        .filter(|p| !p.ends_with("old-3.jpg") && !p.ends_with("old-7.jpg"))
        .cloned()
        .collect();
    assert_eq!(row.gallery_urls[..8], survivors[..]);
    assert!(row.gallery_urls[8].starts_with("project-1/gallery-8-"));
    assert!(row.gallery_urls[9].starts_with("project-1/gallery-9-"));
}

#[tokio::test]
async fn replacing_the_thumbnail_removes_the_previous_object() {
    let store = store();
    seed(
        &store,
        json!({ "id": 1, "title": "Kiln", "thumbnail_url": "project-1/thumbnail-old.png" }),
    );
    store.seed_blob("project-1/thumbnail-old.png");
    let (_backend, mut controller) = signed_in(&store).await;
    controller.open_project(&ProjectId::new("1")).expect("open");

    let preview = controller
        .choose_thumbnail(Some(image("new.png")))
        .expect("preview");
    assert!(matches!(
        editor(&controller).thumbnail,
        ThumbnailView::Pending { preview: p, .. } if p == preview
    ));

    let row = controller.submit(fields("Kiln")).await.expect("save");

    let thumbnail = row.thumbnail_url.expect("thumbnail");
    assert!(thumbnail.starts_with("project-1/thumbnail-"));
    assert_ne!(thumbnail, "project-1/thumbnail-old.png");
    assert!(!store.has_blob("project-1/thumbnail-old.png"));
    assert!(store.has_blob(&thumbnail));
    assert_eq!(
        store.operations(),
        vec![Operation::Upload, Operation::Remove, Operation::Update]
    );
}

#[tokio::test]
async fn absolute_url_thumbnails_are_never_sent_to_storage_removal() {
    let store = store();
    seed(
        &store,
        json!({ "id": 1, "thumbnail_url": "https://cdn.example.com/legacy.png" }),
    );
    let (_backend, mut controller) = signed_in(&store).await;
    controller.open_project(&ProjectId::new("1")).expect("open");
    controller.choose_thumbnail(Some(image("new.png")));

    controller.submit(fields("Legacy")).await.expect("save");

    assert_eq!(
        store.operations(),
        vec![Operation::Upload, Operation::Update]
    );
}

#[tokio::test]
async fn a_failed_upload_aborts_the_save_and_keeps_everything_pending() {
    let store = store();
    let original = seed(&store, json!({ "id": 1, "title": "Pond", "gallery_urls": ["a.jpg"] }));
    let (_backend, mut controller) = signed_in(&store).await;
    controller.open_project(&ProjectId::new("1")).expect("open");
    controller.choose_gallery(images(2));
    store.fail_next(
        Operation::Upload,
        FolioError::storage("The object exceeded the maximum allowed size"),
    );

    let err = controller
        .submit(fields("Renamed"))
        .await
        .expect_err("upload failure should abort");

    assert_eq!(err.surfaced_kind(), folio::error::ErrorKind::Data);
    assert_eq!(store.operations(), vec![Operation::Upload]);
    assert_eq!(store.project(&original.id), Some(original.clone()));
    assert_eq!(controller.projects()[0], original);
    assert_eq!(controller.pending().gallery().len(), 2);

    let view = editor(&controller);
    assert_eq!(
        view.notice,
        Some(Notice::Error(
            "The object exceeded the maximum allowed size".to_string()
        ))
    );
    // The typed-in title survives the failed save.
    assert_eq!(view.fields.title.as_deref(), Some("Renamed"));
}

#[tokio::test]
async fn a_failed_media_step_after_insert_binds_the_editor_to_the_new_row() {
    let store = store();
    let (_backend, mut controller) = signed_in(&store).await;
    controller.open_new();
    controller.choose_thumbnail(Some(image("cover.png")));
    store.fail_next(Operation::Upload, FolioError::storage("bucket not found"));

    controller
        .submit(fields("Half"))
        .await
        .expect_err("thumbnail upload should fail");

    let rows = store.projects();
    assert_eq!(rows.len(), 1);
    let id = rows[0].id.clone();
    assert_eq!(controller.projects().len(), 1);
    assert_eq!(controller.current_project().map(|row| row.id.clone()), Some(id.clone()));
    assert!(controller.pending().thumbnail().is_some());
    assert!(editor(&controller).can_delete);

    store.clear_calls();
    let saved = controller.submit(fields("Half")).await.expect("retry");

    // The retry edits the row it created instead of inserting another.
    assert_eq!(store.projects().len(), 1);
    assert_eq!(saved.id, id);
    assert_eq!(store.operations(), vec![Operation::Upload, Operation::Update]);
    let thumbnail = saved.thumbnail_url.clone().expect("thumbnail attached");
    assert!(thumbnail.starts_with(&format!("project-{}/thumbnail-", id.as_str())));
    assert_eq!(controller.projects()[0], saved);
}

#[tokio::test]
async fn delete_removes_the_row_then_all_four_objects() {
    let store = store();
    seed(&store, json!({ "id": 9, "title": "Other" }));
    seed(
        &store,
        json!({
            "id": 1,
            "title": "Doomed",
            "thumbnail_url": "project-1/thumbnail-x.png",
            "gallery_urls": ["project-1/g0.jpg", "project-1/g1.jpg", "project-1/g2.jpg"]
        }),
    );
    for path in [
        "project-1/thumbnail-x.png",
        "project-1/g0.jpg",
        "project-1/g1.jpg",
        "project-1/g2.jpg",
    ] {
        store.seed_blob(path);
    }
    let (_backend, mut controller) = signed_in(&store).await;
    controller.open_project(&ProjectId::new("1")).expect("open");

    assert!(controller.delete(true).await.expect("delete"));

    let calls = store.calls();
    assert!(matches!(&calls[0], GatewayCall::Delete { id } if id.as_str() == "1"));
    assert!(matches!(&calls[1], GatewayCall::Remove { paths } if paths.len() == 4));
    assert_eq!(calls.len(), 2);
    assert!(store.blob_paths().is_empty());
    assert_eq!(store.project(&ProjectId::new("1")), None);

    let ids: Vec<_> = controller.projects().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["9"]);
    assert!(!controller.is_editor_open());
}

#[tokio::test]
async fn delete_needs_confirmation_and_an_open_project() {
    let store = store();
    seed(&store, json!({ "id": 1 }));
    let (_backend, mut controller) = signed_in(&store).await;

    controller.open_new();
    assert!(!controller.delete(true).await.expect("no-op"));

    controller.open_project(&ProjectId::new("1")).expect("open");
    assert!(!controller.delete(false).await.expect("no-op"));
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn cleanup_failure_after_delete_is_not_surfaced() {
    let store = store();
    seed(&store, json!({ "id": 1, "thumbnail_url": "project-1/t.png" }));
    let (_backend, mut controller) = signed_in(&store).await;
    controller.open_project(&ProjectId::new("1")).expect("open");
    store.fail_next(Operation::Remove, FolioError::storage("storage is down"));

    assert!(controller.delete(true).await.expect("delete"));
    assert!(controller.projects().is_empty());
    assert_eq!(controller.notice(), None);
}

#[tokio::test]
async fn a_rejected_delete_keeps_the_project_and_explains_why() {
    let store = store();
    seed(&store, json!({ "id": 1, "thumbnail_url": "project-1/t.png" }));
    let (_backend, mut controller) = signed_in(&store).await;
    controller.open_project(&ProjectId::new("1")).expect("open");
    store.fail_next(Operation::Delete, FolioError::data(""));

    controller.delete(true).await.expect_err("delete should fail");

    assert_eq!(store.operations(), vec![Operation::Delete]);
    assert_eq!(controller.projects().len(), 1);
    assert_eq!(
        editor(&controller).notice,
        Some(Notice::Error("Failed to delete.".to_string()))
    );
}

#[tokio::test]
async fn cancel_and_switching_projects_release_every_preview() {
    let store = store();
    seed(&store, json!({ "id": 1 }));
    seed(&store, json!({ "id": 2 }));
    let (_backend, mut controller) = signed_in(&store).await;

    controller.open_project(&ProjectId::new("1")).expect("open");
    controller.choose_thumbnail(Some(image("t.png")));
    controller.choose_gallery(images(3));
    assert_eq!(controller.live_previews(), 4);

    controller.open_project(&ProjectId::new("2")).expect("open");
    assert_eq!(controller.live_previews(), 0);
    assert!(controller.pending().is_empty());

    controller.choose_gallery(images(2));
    controller.cancel();
    assert_eq!(controller.live_previews(), 0);
    assert!(!controller.is_editor_open());
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn removing_a_pending_upload_only_touches_local_state() {
    let store = store();
    let (_backend, mut controller) = signed_in(&store).await;
    controller.open_new();
    let previews = controller.choose_gallery(images(3));

    assert!(controller.remove_pending_upload(previews[0]));
    assert!(controller.preview(previews[0]).is_none());
    assert!(controller.preview(previews[1]).is_some());
    assert_eq!(editor(&controller).gallery.len(), 2);
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn losing_the_session_returns_to_the_login_form() {
    let store = store();
    seed(&store, json!({ "id": 1 }));
    let (backend, mut controller) = signed_in(&store).await;
    controller.open_project(&ProjectId::new("1")).expect("open");
    controller.choose_gallery(images(1));

    backend.end_session();
    controller.sync_session();

    assert_eq!(controller.view(), AdminView::Login { error: None });
    assert!(!controller.is_editor_open());
    assert_eq!(controller.live_previews(), 0);
}

#[tokio::test]
async fn sign_out_always_ends_the_session() {
    let store = store();
    let (_backend, mut controller) = signed_in(&store).await;
    store.fail_next(Operation::SignOut, FolioError::auth("network down"));

    controller.sign_out().await;

    assert!(!controller.is_authenticated());
    assert_eq!(store.operations(), vec![Operation::SignOut]);
}

#[tokio::test]
async fn failed_refresh_shows_the_list_failure() {
    let store = store();
    let (_backend, mut controller) = signed_in(&store).await;
    store.fail_next(Operation::List, FolioError::data("relation does not exist"));

    controller.refresh().await.expect_err("list should fail");

    let AdminView::Dashboard(dashboard) = controller.view() else {
        panic!("expected the dashboard");
    };
    assert_eq!(dashboard.list, ListView::Failed);
}
