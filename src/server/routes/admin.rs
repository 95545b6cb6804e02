use crate::FolioError;
use crate::admin::{
    AdminController, DeleteForm, LoginForm, ProjectForm, UNTITLED, render_admin,
    render_delete_confirm,
};
use crate::media::{LocalFile, PreviewId};
use crate::server::guards::admin_session::AdminSession;
use crate::server::router::FolioState;
use axum::{
    Form, Router,
    extract::{Multipart, Path, multipart::MultipartError},
    http::{HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use folio_schema::ProjectId;
use tokio::sync::MutexGuard;
use tracing::{debug, warn};

const ADMIN_HOME: &str = "/admin";

pub fn router() -> Router<FolioState> {
    Router::new()
        .route("/admin", get(dashboard))
        .route("/admin/login", post(login))
        .route("/admin/signout", post(sign_out))
        .route("/admin/refresh", post(refresh))
        .route("/admin/new", post(open_new))
        .route("/admin/projects/{id}", get(open_project))
        .route("/admin/cancel", post(cancel))
        .route("/admin/delete", get(confirm_delete).post(delete))
        .route("/admin/save", post(save))
        .route("/admin/thumbnail", post(thumbnail))
        .route("/admin/gallery", post(gallery))
        .route("/admin/gallery/remove", post(remove_gallery_image))
        .route("/admin/pending/{preview}/remove", post(remove_pending_upload))
        .route("/admin/previews/{preview}", get(preview))
}

fn back_to_dashboard() -> Redirect {
    Redirect::to(ADMIN_HOME)
}

/// Everything the editor form posts; every editor button submits the whole form.
#[derive(Debug, Default)]
struct EditorSubmission {
    form: ProjectForm,
    thumbnail: Option<LocalFile>,
    gallery: Vec<LocalFile>,
    path: Option<String>,
}

fn bad_multipart(err: MultipartError) -> FolioError {
    FolioError::InvalidRequest(err.body_text())
}

async fn read_editor_form(mut multipart: Multipart) -> Result<EditorSubmission, FolioError> {
    let mut submission = EditorSubmission::default();
    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "thumbnail" | "gallery" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(bad_multipart)?;
                // An empty file input still posts a nameless, empty part.
                if bytes.is_empty() {
                    continue;
                }
                let file = LocalFile::new(file_name, content_type.as_deref(), bytes);
                if name == "thumbnail" {
                    submission.thumbnail = Some(file);
                } else {
                    submission.gallery.push(file);
                }
            }
            "path" => submission.path = Some(field.text().await.map_err(bad_multipart)?),
            other => {
                let value = field.text().await.map_err(bad_multipart)?;
                if !submission.form.set(other, value) {
                    debug!(field = other, "Ignoring editor form field");
                }
            }
        }
    }
    Ok(submission)
}

/// Carries unsaved inputs and freshly chosen files over into the controller.
fn absorb(controller: &mut AdminController, submission: &mut EditorSubmission) {
    controller.update_draft(submission.form.clone().into_fields());
    if let Some(file) = submission.thumbnail.take() {
        controller.choose_thumbnail(Some(file));
    }
    let files = std::mem::take(&mut submission.gallery);
    if !files.is_empty() {
        controller.choose_gallery(files);
    }
}

/// GET /admin
pub async fn dashboard(session: AdminSession) -> Response {
    let html = {
        let mut controller = session.controller.lock().await;
        controller.sync_session();
        render_admin(&controller.view())
    };
    session.respond(Html(html))
}

/// POST /admin/login
pub async fn login(session: AdminSession, Form(form): Form<LoginForm>) -> Response {
    {
        let mut controller = session.controller.lock().await;
        controller.sync_session();
        // A rejected sign-in is shown inline on the login form.
        let _ = controller.login(form).await;
    }
    session.respond(back_to_dashboard())
}

/// POST /admin/signout
pub async fn sign_out(session: AdminSession) -> Response {
    session.controller.lock().await.sign_out().await;
    session.respond(back_to_dashboard())
}

/// Locks the controller if its page session is signed in.
async fn signed_in(session: &AdminSession) -> Option<MutexGuard<'_, AdminController>> {
    let mut controller = session.controller.lock().await;
    controller.sync_session();
    controller.is_authenticated().then_some(controller)
}

/// POST /admin/refresh
pub async fn refresh(session: AdminSession) -> Response {
    if let Some(mut controller) = signed_in(&session).await {
        // Failure is shown in the list.
        let _ = controller.refresh().await;
    }
    session.respond(back_to_dashboard())
}

/// POST /admin/new
pub async fn open_new(session: AdminSession) -> Response {
    if let Some(mut controller) = signed_in(&session).await {
        controller.open_new();
    }
    session.respond(back_to_dashboard())
}

/// GET /admin/projects/{id}
pub async fn open_project(session: AdminSession, Path(id): Path<String>) -> Response {
    let result = match signed_in(&session).await {
        Some(mut controller) => controller.open_project(&ProjectId::new(id)),
        None => Ok(()),
    };
    match result {
        Ok(()) => session.respond(back_to_dashboard()),
        Err(err) => session.respond(err),
    }
}

/// POST /admin/cancel
pub async fn cancel(session: AdminSession) -> Response {
    if let Some(mut controller) = signed_in(&session).await {
        controller.cancel();
    }
    session.respond(back_to_dashboard())
}

/// GET /admin/delete
///
/// Asks for confirmation before anything is deleted.
pub async fn confirm_delete(session: AdminSession) -> Response {
    let title = signed_in(&session).await.and_then(|controller| {
        controller
            .current_project()
            .map(|row| row.title_or(UNTITLED).to_string())
    });
    match title {
        Some(title) => session.respond(Html(render_delete_confirm(&title))),
        None => session.respond(back_to_dashboard()),
    }
}

/// POST /admin/delete
pub async fn delete(session: AdminSession, Form(form): Form<DeleteForm>) -> Response {
    if let Some(mut controller) = signed_in(&session).await {
        // Failure is shown inline in the editor.
        let _ = controller.delete(form.confirmed()).await;
    }
    session.respond(back_to_dashboard())
}

/// POST /admin/save (multipart)
pub async fn save(session: AdminSession, multipart: Multipart) -> Response {
    let mut submission = match read_editor_form(multipart).await {
        Ok(submission) => submission,
        Err(err) => return session.respond(err),
    };
    if let Some(mut controller) = signed_in(&session).await {
        absorb(&mut controller, &mut submission);
        let fields = submission.form.clone().into_fields();
        // Failure is shown inline in the editor.
        let _ = controller.submit(fields).await;
    }
    session.respond(back_to_dashboard())
}

/// POST /admin/thumbnail (multipart)
///
/// Posting without a file clears the pending thumbnail.
pub async fn thumbnail(session: AdminSession, multipart: Multipart) -> Response {
    let mut submission = match read_editor_form(multipart).await {
        Ok(submission) => submission,
        Err(err) => return session.respond(err),
    };
    if let Some(mut controller) = signed_in(&session).await {
        if submission.thumbnail.is_none() {
            controller.choose_thumbnail(None);
        }
        absorb(&mut controller, &mut submission);
    }
    session.respond(back_to_dashboard())
}

/// POST /admin/gallery (multipart)
pub async fn gallery(session: AdminSession, multipart: Multipart) -> Response {
    let mut submission = match read_editor_form(multipart).await {
        Ok(submission) => submission,
        Err(err) => return session.respond(err),
    };
    if let Some(mut controller) = signed_in(&session).await {
        absorb(&mut controller, &mut submission);
    }
    session.respond(back_to_dashboard())
}

/// POST /admin/gallery/remove (multipart, `path`)
pub async fn remove_gallery_image(session: AdminSession, multipart: Multipart) -> Response {
    let mut submission = match read_editor_form(multipart).await {
        Ok(submission) => submission,
        Err(err) => return session.respond(err),
    };
    if let Some(mut controller) = signed_in(&session).await {
        absorb(&mut controller, &mut submission);
        match submission.path.as_deref() {
            Some(path) if controller.remove_gallery_image(path) => {
                debug!(path, "Gallery image marked for removal");
            }
            Some(path) => debug!(path, "Gallery image already marked or unknown"),
            None => warn!("Gallery removal posted without a path"),
        }
    }
    session.respond(back_to_dashboard())
}

/// POST /admin/pending/{preview}/remove (multipart)
pub async fn remove_pending_upload(
    session: AdminSession,
    Path(preview): Path<String>,
    multipart: Multipart,
) -> Response {
    let Ok(preview) = preview.parse::<PreviewId>() else {
        return session.respond(StatusCode::NOT_FOUND);
    };
    let mut submission = match read_editor_form(multipart).await {
        Ok(submission) => submission,
        Err(err) => return session.respond(err),
    };
    if let Some(mut controller) = signed_in(&session).await {
        absorb(&mut controller, &mut submission);
        controller.remove_pending_upload(preview);
    }
    session.respond(back_to_dashboard())
}

/// GET /admin/previews/{preview}
///
/// Serves a pending file back to the browser until it is uploaded or discarded.
pub async fn preview(session: AdminSession, Path(preview): Path<String>) -> Response {
    let file = match preview.parse::<PreviewId>() {
        Ok(id) => session.controller.lock().await.preview(id).cloned(),
        Err(_) => None,
    };
    let Some(file) = file else {
        return session.respond(StatusCode::NOT_FOUND.into_response());
    };

    let mut resp = (
        [
            (header::CONTENT_TYPE, file.content_type().to_string()),
            (header::CACHE_CONTROL, "no-store".to_string()),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff".to_string()),
        ],
        file.bytes().clone(),
    )
        .into_response();
    if !renders_inline(file.content_type()) {
        resp.headers_mut()
            .insert(header::CONTENT_DISPOSITION, HeaderValue::from_static("attachment"));
    }
    session.respond(resp)
}

/// Raster images are shown in place; anything else the browser could execute is downloaded.
fn renders_inline(content_type: &str) -> bool {
    content_type.starts_with("image/") && !content_type.starts_with("image/svg")
}
