use axum::extract::State;
use axum::response::Html;
use leptos::prelude::*;
use tracing::warn;

use super::views::{render_error, render_monthly_chart, render_page};
use super::AppState;
use crate::client::HotelApiClient;
use crate::models::Resource;
use crate::projection::{self, MonthlyCount, ProjectedMonth};

pub(super) struct Counter {
    pub(super) resource: Resource,
    pub(super) count: Option<usize>,
}

pub(super) struct MonthlyOverview {
    pub(super) history: Vec<MonthlyCount>,
    pub(super) projection: Option<ProjectedMonth>,
    pub(super) error: Option<String>,
}

/// History plus projection, with fetch failures kept for display.
pub(super) async fn monthly_overview(api: &HotelApiClient) -> MonthlyOverview {
    match api.reservations_per_month().await {
        Ok(history) => {
            let projection = projection::project_next_month(&history);
            MonthlyOverview {
                history,
                projection,
                error: None,
            }
        }
        Err(e) => MonthlyOverview {
            history: vec![],
            projection: None,
            error: Some(format!("Failed to fetch reservations per month: {e:#}")),
        },
    }
}

pub(crate) async fn dashboard_handler(State(state): State<AppState>) -> Html<String> {
    let cfg = &state.config;
    let now = chrono::Utc::now().with_timezone(&state.timezone);

    let api = match HotelApiClient::connect(&cfg.api).await {
        Ok(c) => c,
        Err(e) => {
            let body = render_error(format!("Backend unavailable: {e:#}"));
            return Html(render_page("Dashboard", now, body));
        }
    };

    let mut counters: Vec<Counter> = Vec::new();
    for resource in Resource::ALL {
        let count = match api.list(resource).await {
            Ok(rows) => Some(rows.len()),
            Err(e) => {
                warn!("Dashboard: counting {} failed: {:#}", resource, e);
                None
            }
        };
        counters.push(Counter { resource, count });
    }

    let overview = monthly_overview(&api).await;

    let counters_html = render_counters(&counters);
    let chart_html = match overview.error {
        Some(err) => render_error(err),
        None => render_monthly_chart(&overview.history, overview.projection.as_ref()),
    };

    let body = view! {
        <section>
            <h2>"Overview"</h2>
            <div inner_html=counters_html />
        </section>
        <section>
            <h2>"Reservations per Month"</h2>
            <div inner_html=chart_html />
        </section>
    }
    .to_html();

    Html(render_page("Dashboard", now, body))
}

fn render_counters(counters: &[Counter]) -> String {
    let cards_html: String = counters
        .iter()
        .map(|c| {
            let href = format!("/resources/{}", c.resource.path());
            let title = c.resource.title();
            let value = c.count.map(|n| n.to_string()).unwrap_or_else(|| "—".into());
            view! {
                <a class="counter" href=href>
                    <span class="counter-value">{value}</span>
                    <span class="counter-label">{title}</span>
                </a>
            }
            .to_html()
        })
        .collect();

    view! { <div class="counters" inner_html=cards_html /> }.to_html()
}
