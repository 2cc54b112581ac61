use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use leptos::prelude::*;

use super::views::{render_error, render_json_table, render_page};
use super::AppState;
use crate::client::HotelApiClient;
use crate::models::Resource;

pub(crate) async fn resource_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Response {
    let now = chrono::Utc::now().with_timezone(&state.timezone);

    let resource = match Resource::from_path(&name) {
        Some(r) => r,
        None => {
            let body = render_error(format!("Unknown resource '{name}'"));
            return (StatusCode::NOT_FOUND, Html(render_page("Not Found", now, body)))
                .into_response();
        }
    };

    let table_html = match HotelApiClient::connect(&state.config.api).await {
        Ok(api) => match api.list(resource).await {
            Ok(rows) => {
                let total = format!("{} record(s)", rows.len());
                let table = render_json_table(&rows);
                view! {
                    <p class="summary">{total}</p>
                    <div inner_html=table />
                }
                .to_html()
            }
            Err(e) => render_error(format!("Failed to fetch {}: {e:#}", resource)),
        },
        Err(e) => render_error(format!("Backend unavailable: {e:#}")),
    };

    Html(render_page(resource.title(), now, table_html)).into_response()
}
