use chrono::DateTime;
use chrono_tz::Tz;
use leptos::prelude::*;

use crate::models::Resource;
use crate::projection::{MonthlyCount, ProjectedMonth};

const STYLE: &str = include_str!("../style.css");

pub(super) fn render_page(title: &str, now: DateTime<Tz>, body_html: String) -> String {
    let page_title = format!("{title} · Hotel Admin");
    let heading = title.to_string();
    let now = now.format("%Y-%m-%d %H:%M:%S %Z").to_string();
    let nav_html = render_nav();

    view! {
        <html lang="en">
            <head>
                <meta charset="utf-8" />
                <meta name="viewport" content="width=device-width, initial-scale=1" />
                <title>{page_title}</title>
                <style>{STYLE}</style>
            </head>
            <body>
                <nav class="no-print" inner_html=nav_html />
                <h1>{heading}</h1>
                <p class="timestamp">"Updated: " {now}</p>
                <div inner_html=body_html />
            </body>
        </html>
    }
    .to_html()
}

fn render_nav() -> String {
    let fixed = [
        ("/", "Dashboard"),
        ("/calendar", "Calendar"),
        ("/reports", "Reports"),
    ];
    let mut links: Vec<(String, &'static str)> = fixed
        .iter()
        .map(|(href, label)| (href.to_string(), *label))
        .collect();
    links.extend(
        Resource::ALL
            .iter()
            .map(|r| (format!("/resources/{}", r.path()), r.title())),
    );

    links
        .into_iter()
        .map(|(href, label)| view! { <a href=href>{label}</a> }.to_html())
        .collect()
}

pub(super) fn render_error(message: String) -> String {
    view! { <div class="error">{message}</div> }.to_html()
}

/// Plain-text form of a JSON cell.
pub(super) fn cell_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.trim().to_string(),
        serde_json::Value::Bool(b) => (if *b { "yes" } else { "no" }).to_string(),
        other => other.to_string(),
    }
}

/// Column names in first-seen order across all rows.
pub(super) fn columns(rows: &[serde_json::Value]) -> Vec<String> {
    let mut cols: Vec<String> = Vec::new();
    for row in rows {
        if let Some(obj) = row.as_object() {
            for key in obj.keys() {
                if !cols.contains(key) {
                    cols.push(key.clone());
                }
            }
        }
    }
    cols
}

pub(super) fn render_json_table(rows: &[serde_json::Value]) -> String {
    if rows.is_empty() {
        return view! { <p class="empty">"No records."</p> }.to_html();
    }

    let cols = columns(rows);
    let header_html: String = cols
        .iter()
        .map(|c| {
            let c = c.clone();
            view! { <th>{c}</th> }.to_html()
        })
        .collect();

    let rows_html: String = rows
        .iter()
        .map(|row| {
            let cells_html: String = cols
                .iter()
                .map(|c| {
                    let text = row.get(c).map(cell_text).unwrap_or_default();
                    view! { <td>{text}</td> }.to_html()
                })
                .collect();
            view! { <tr inner_html=cells_html /> }.to_html()
        })
        .collect();

    view! {
        <table>
            <thead>
                <tr inner_html=header_html />
            </thead>
            <tbody inner_html=rows_html />
        </table>
    }
    .to_html()
}

/// Bar length in percent of the largest value.
pub(super) fn bar_width(count: u32, max: u32) -> u32 {
    if max == 0 {
        return 0;
    }
    ((u64::from(count) * 100) / u64::from(max)) as u32
}

/// Horizontal bar chart of monthly reservations, the projection drawn last.
pub(super) fn render_monthly_chart(
    history: &[MonthlyCount],
    projection: Option<&ProjectedMonth>,
) -> String {
    if history.is_empty() {
        return view! { <p class="empty">"No reservation history yet."</p> }.to_html();
    }

    let max = history
        .iter()
        .map(|m| m.count)
        .chain(projection.map(|p| p.count))
        .max()
        .unwrap_or(0);

    let bars = history
        .iter()
        .map(|m| (m.month.to_string(), m.count, "bar"))
        .chain(projection.map(|p| (p.month.to_string(), p.count, "bar projected")));

    let rows_html: String = bars
        .map(|(label, count, css)| {
            let style = format!("width: {}%", bar_width(count, max));
            let count = count.to_string();
            view! {
                <div class="chart-row">
                    <span class="chart-label">{label}</span>
                    <span class="chart-track"><span class=css style=style></span></span>
                    <span class="chart-value">{count}</span>
                </div>
            }
            .to_html()
        })
        .collect();

    view! { <div class="chart" inner_html=rows_html /> }.to_html()
}

/// Month, count and kind rows for the printable report.
pub(super) fn render_monthly_table(
    history: &[MonthlyCount],
    projection: Option<&ProjectedMonth>,
) -> String {
    if history.is_empty() {
        return view! { <p class="empty">"No reservation history yet."</p> }.to_html();
    }

    let rows_html: String = history
        .iter()
        .map(|m| (m.month.to_string(), m.count, "observed", "status-booked"))
        .chain(projection.map(|p| (p.month.to_string(), p.count, "projected", "status-pending")))
        .map(|(month, count, kind, css)| {
            let count = count.to_string();
            view! {
                <tr>
                    <td>{month}</td>
                    <td class="capacity">{count}</td>
                    <td class=css>{kind}</td>
                </tr>
            }
            .to_html()
        })
        .collect();

    view! {
        <table>
            <thead>
                <tr><th>"Month"</th><th>"Reservations"</th><th>"Kind"</th></tr>
            </thead>
            <tbody inner_html=rows_html />
        </table>
    }
    .to_html()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&json!(null)), "");
        assert_eq!(cell_text(&json!(" Suite ")), "Suite");
        assert_eq!(cell_text(&json!(true)), "yes");
        assert_eq!(cell_text(&json!(120.5)), "120.5");
        assert_eq!(cell_text(&json!({"id": 1})), r#"{"id":1}"#);
    }

    #[test]
    fn test_columns_union() {
        let rows = vec![json!({"id": 1, "name": "A"}), json!({"id": 2, "stars": 4})];
        let cols = columns(&rows);
        assert_eq!(cols.len(), 3);
        assert!(cols.contains(&"stars".to_string()));
    }

    #[test]
    fn test_bar_width() {
        assert_eq!(bar_width(0, 0), 0);
        assert_eq!(bar_width(10, 20), 50);
        assert_eq!(bar_width(20, 20), 100);
        assert_eq!(bar_width(u32::MAX, u32::MAX), 100);
    }

    #[test]
    fn test_chart_includes_projection() {
        let history: Vec<MonthlyCount> =
            serde_json::from_str(r#"[{"month":"01/2025","count":10},{"month":"02/2025","count":20}]"#)
                .unwrap();
        let projection = crate::projection::project_next_month(&history);
        let html = render_monthly_chart(&history, projection.as_ref());
        assert!(html.contains("01/2025"));
        assert!(html.contains("03/2025"));
        assert!(html.contains("bar projected"));
    }

    #[test]
    fn test_empty_history_renders_placeholder() {
        assert!(render_monthly_chart(&[], None).contains("No reservation history"));
        assert!(render_monthly_table(&[], None).contains("No reservation history"));
    }

    #[test]
    fn test_table_escapes_cells() {
        let html = render_json_table(&[json!({"name": "<script>"})]);
        assert!(!html.contains("<script>"));
    }
}
