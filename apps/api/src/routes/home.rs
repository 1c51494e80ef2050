use axum::response::Html;

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// GET /
/// Static chat page. It only talks to `/chat`; no answer logic lives in the page.
pub async fn home_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}
