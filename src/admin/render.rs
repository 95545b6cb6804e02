use super::view::{
    AdminView, DashboardView, EditorView, GalleryTile, ListView, ThumbnailView,
};
use super::{
    DELETE_CONFIRMATION, FETCHING_PROJECTS, LOAD_FAILED, NO_GALLERY_IMAGES, NO_PROJECTS,
    NONE_SELECTED, Notice,
};
use crate::html::{document, escape};
use folio_schema::ProjectFields;

const TITLE: &str = "Projects admin";

pub fn render_admin(view: &AdminView) -> String {
    let body = match view {
        AdminView::Login { error } => render_login(error.as_deref()),
        AdminView::Dashboard(dashboard) => render_dashboard(dashboard),
    };
    document(TITLE, &body)
}

/// Confirmation step in front of a delete.
pub fn render_delete_confirm(title: &str) -> String {
    let body = format!(
        "<section class=\"admin__confirm\">\n<h2>{}</h2>\n<p>{}</p>\n\
         <form method=\"post\" action=\"/admin/delete\">\n\
         <button type=\"submit\" name=\"confirm\" value=\"yes\">Delete</button>\n\
         <a href=\"/admin\">Keep it</a>\n</form>\n</section>",
        escape(title),
        DELETE_CONFIRMATION
    );
    document(TITLE, &body)
}

fn render_login(error: Option<&str>) -> String {
    let mut out = String::from(
        "<section class=\"admin__auth\" data-admin-auth>\n<h1>Sign in</h1>\n\
         <form id=\"admin-login-form\" method=\"post\" action=\"/admin/login\">\n\
         <label>Email <input type=\"email\" name=\"email\" autocomplete=\"username\" required></label>\n\
         <label>Password <input type=\"password\" name=\"password\" autocomplete=\"current-password\" required></label>\n\
         <button type=\"submit\">Sign in</button>\n</form>\n",
    );
    if let Some(error) = error {
        out.push_str(&format!(
            "<p class=\"admin__error\" data-admin-error>{}</p>\n",
            escape(error)
        ));
    }
    out.push_str("</section>");
    out
}

fn render_dashboard(view: &DashboardView) -> String {
    let mut out = String::from("<section class=\"admin__dashboard\" data-admin-dashboard>\n");
    out.push_str("<header class=\"admin__toolbar\">\n");
    if let Some(user) = &view.user {
        out.push_str(&format!(
            "<span class=\"admin__user\">{}</span>\n",
            escape(user)
        ));
    }
    for (action, label) in [
        ("/admin/new", "Add project"),
        ("/admin/refresh", "Refresh"),
        ("/admin/signout", "Sign out"),
    ] {
        out.push_str(&format!(
            "<form method=\"post\" action=\"{action}\"><button type=\"submit\">{label}</button></form>\n"
        ));
    }
    out.push_str("</header>\n");

    out.push_str("<nav class=\"admin__list\" data-admin-projects>\n");
    match &view.list {
        ListView::Loading => out.push_str(&empty_note(FETCHING_PROJECTS)),
        ListView::Failed => out.push_str(&empty_note(LOAD_FAILED)),
        ListView::Empty => out.push_str(&empty_note(NO_PROJECTS)),
        ListView::Items(items) => {
            for item in items {
                let class = if item.active {
                    "admin__list-item is-active"
                } else {
                    "admin__list-item"
                };
                out.push_str(&format!(
                    "<a class=\"{class}\" href=\"/admin/projects/{id}\" data-project-id=\"{id}\">\
                     <h3>{}</h3><span>{}</span></a>\n",
                    escape(&item.title),
                    escape(&item.meta),
                    id = escape(item.id.as_str()),
                ));
            }
        }
    }
    out.push_str("</nav>\n");

    if let Some(editor) = &view.editor {
        out.push_str(&render_editor(editor));
    }
    out.push_str("</section>");
    out
}

fn empty_note(message: &str) -> String {
    format!("<p class=\"admin__empty\">{}</p>\n", escape(message))
}

fn render_editor(view: &EditorView) -> String {
    let mut out = String::from("<section class=\"admin__editor\" data-admin-editor>\n");
    out.push_str(&format!(
        "<h2 data-admin-editor-title>{}</h2>\n",
        escape(&view.heading)
    ));

    match &view.notice {
        Some(Notice::Error(message)) => out.push_str(&format!(
            "<p class=\"admin__error\" data-admin-editor-error>{}</p>\n",
            escape(message)
        )),
        Some(Notice::Success(message)) => out.push_str(&format!(
            "<p class=\"admin__success\" data-admin-editor-success>{}</p>\n",
            escape(message)
        )),
        None => {}
    }

    out.push_str(
        "<form id=\"admin-project-form\" method=\"post\" action=\"/admin/save\" \
         enctype=\"multipart/form-data\">\n",
    );
    if let Some(id) = &view.project_id {
        out.push_str(&format!(
            "<input type=\"hidden\" name=\"id\" value=\"{}\">\n",
            escape(id.as_str())
        ));
    }
    out.push_str(&render_fields(&view.fields));

    out.push_str("<fieldset class=\"admin__thumbnail\">\n<legend>Thumbnail</legend>\n");
    out.push_str("<div data-admin-thumbnail-preview>");
    match &view.thumbnail {
        ThumbnailView::None => out.push_str(NONE_SELECTED),
        ThumbnailView::Stored { url, alt } => out.push_str(&format!(
            "<img src=\"{}\" alt=\"{}\">",
            escape(url),
            escape(alt)
        )),
        ThumbnailView::Pending { preview, alt } => out.push_str(&format!(
            "<img src=\"/admin/previews/{preview}\" alt=\"{}\">",
            escape(alt)
        )),
    }
    out.push_str("</div>\n");
    out.push_str(
        "<input type=\"file\" name=\"thumbnail\" accept=\"image/*\">\n\
         <button type=\"submit\" formaction=\"/admin/thumbnail\">Set thumbnail</button>\n\
         </fieldset>\n",
    );

    out.push_str("<fieldset class=\"admin__gallery\">\n<legend>Gallery</legend>\n");
    out.push_str("<div data-admin-gallery>\n");
    if view.gallery.is_empty() {
        out.push_str(&format!(
            "<div class=\"admin__empty\">{NO_GALLERY_IMAGES}</div>\n"
        ));
    }
    for tile in &view.gallery {
        let (src, alt, action, extra) = match tile {
            GalleryTile::Stored { path, url, alt } => (
                escape(url).into_owned(),
                escape(alt).into_owned(),
                "/admin/gallery/remove".to_string(),
                format!(" name=\"path\" value=\"{}\"", escape(path)),
            ),
            GalleryTile::Pending { preview, name } => (
                format!("/admin/previews/{preview}"),
                escape(name).into_owned(),
                format!("/admin/pending/{preview}/remove"),
                String::new(),
            ),
        };
        out.push_str(&format!(
            "<div class=\"admin__gallery-item\"><img src=\"{src}\" alt=\"{alt}\">\
             <button type=\"submit\" class=\"admin__gallery-remove\" formaction=\"{action}\"{extra}>×</button></div>\n"
        ));
    }
    out.push_str("</div>\n");
    if view.remaining_slots > 0 {
        out.push_str(&format!(
            "<input type=\"file\" name=\"gallery\" accept=\"image/*\" multiple>\n\
             <button type=\"submit\" formaction=\"/admin/gallery\">Add images</button>\n\
             <small>{} more allowed</small>\n",
            view.remaining_slots
        ));
    }
    out.push_str("</fieldset>\n");

    out.push_str(
        "<div class=\"admin__actions\">\n\
         <button type=\"submit\">Save</button>\n\
         <button type=\"submit\" formaction=\"/admin/cancel\" formnovalidate data-admin-cancel>Cancel</button>\n",
    );
    if view.can_delete {
        out.push_str("<a href=\"/admin/delete\" data-admin-delete>Delete</a>\n");
    }
    out.push_str("</div>\n</form>\n</section>\n");
    out
}

fn render_fields(fields: &ProjectFields) -> String {
    let text = |value: &Option<String>| escape(value.as_deref().unwrap_or_default()).into_owned();
    let checked = if fields.is_featured { " checked" } else { "" };
    format!(
        "<label>Title <input type=\"text\" name=\"title\" value=\"{}\"></label>\n\
         <label>Summary <textarea name=\"summary\">{}</textarea></label>\n\
         <label>Tech stack <input type=\"text\" name=\"tech_stack\" value=\"{}\"></label>\n\
         <label>Launched on <input type=\"text\" name=\"launched_on\" value=\"{}\"></label>\n\
         <label>Link <input type=\"url\" name=\"cta_url\" value=\"{}\"></label>\n\
         <label><input type=\"checkbox\" name=\"is_featured\" value=\"on\"{checked}> Featured</label>\n",
        text(&fields.title),
        text(&fields.summary),
        text(&fields.tech_stack),
        text(&fields.launched_on),
        text(&fields.cta_url),
    )
}
