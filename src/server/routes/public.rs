use crate::gallery::Mount;
use crate::server::router::FolioState;
use axum::{Router, extract::State, response::Html, routing::get};

pub fn router() -> Router<FolioState> {
    Router::new()
        .route("/", get(index))
        .route("/featured", get(featured))
}

/// GET /
///
/// Featured and all-projects mounts.
pub async fn index(State(state): State<FolioState>) -> Html<String> {
    let page = state.gallery.hydrate(&[Mount::Featured, Mount::All]).await;
    Html(page.render())
}

/// GET /featured
pub async fn featured(State(state): State<FolioState>) -> Html<String> {
    let page = state.gallery.hydrate(&[Mount::Featured]).await;
    Html(page.render())
}
