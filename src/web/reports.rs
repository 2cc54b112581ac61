use axum::extract::State;
use axum::response::Html;
use leptos::prelude::*;

use super::dashboard::monthly_overview;
use super::views::{render_error, render_monthly_table, render_page};
use super::AppState;
use crate::client::HotelApiClient;
use crate::projection::WINDOW;

/// Printable monthly reservations report.
pub(crate) async fn reports_handler(State(state): State<AppState>) -> Html<String> {
    let now = chrono::Utc::now().with_timezone(&state.timezone);

    let api = match HotelApiClient::connect(&state.config.api).await {
        Ok(c) => c,
        Err(e) => {
            let body = render_error(format!("Backend unavailable: {e:#}"));
            return Html(render_page("Reservations Report", now, body));
        }
    };

    let overview = monthly_overview(&api).await;
    let table_html = match overview.error {
        Some(err) => render_error(err),
        None => render_monthly_table(&overview.history, overview.projection.as_ref()),
    };
    let total: u64 = overview.history.iter().map(|m| u64::from(m.count)).sum();
    let summary = format!(
        "{} month(s), {} reservation(s) in total",
        overview.history.len(),
        total
    );
    let method = format!(
        "The projected month is the mean of the last {} months, rounded half up.",
        WINDOW
    );

    let body = view! {
        <section>
            <p class="summary">{summary}</p>
            <div inner_html=table_html />
            <p class="footnote">{method}</p>
        </section>
    }
    .to_html();

    Html(render_page("Reservations Report", now, body))
}
