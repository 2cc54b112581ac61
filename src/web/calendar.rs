use axum::extract::{Query, State};
use axum::response::Html;
use chrono::{Datelike, NaiveDate};
use leptos::prelude::*;
use serde::Deserialize;

use super::views::{cell_text, render_error, render_page};
use super::AppState;
use crate::calendar::{to_calendar_blocks, CalendarBlock, MonthGrid};
use crate::client::HotelApiClient;
use crate::models::Resource;

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

#[derive(Debug, Deserialize)]
pub(crate) struct CalendarQuery {
    room: Option<String>,
    /// `YYYY-MM`, defaults to the current month.
    month: Option<String>,
}

/// First day of a `YYYY-MM` month.
pub(super) fn parse_month(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d").ok()
}

fn room_id(room: &serde_json::Value) -> Option<String> {
    room.get("id")
        .or_else(|| room.get("roomId"))
        .map(cell_text)
        .filter(|id| !id.is_empty())
}

fn room_label(room: &serde_json::Value) -> Option<String> {
    ["number", "roomNumber", "name"]
        .iter()
        .find_map(|k| room.get(*k))
        .map(cell_text)
}

pub(crate) async fn calendar_handler(
    State(state): State<AppState>,
    Query(query): Query<CalendarQuery>,
) -> Html<String> {
    let cfg = &state.config;
    let now = chrono::Utc::now().with_timezone(&state.timezone);
    let month_start = query
        .month
        .as_deref()
        .and_then(parse_month)
        .or_else(|| now.date_naive().with_day(1))
        .unwrap_or_else(|| now.date_naive());

    let api = match HotelApiClient::connect(&cfg.api).await {
        Ok(c) => c,
        Err(e) => {
            let body = render_error(format!("Backend unavailable: {e:#}"));
            return Html(render_page("Booking Calendar", now, body));
        }
    };

    let rooms_html = match api.list(Resource::Rooms).await {
        Ok(rooms) => render_room_links(&rooms, query.room.as_deref(), month_start),
        Err(e) => render_error(format!("Failed to fetch rooms: {e:#}")),
    };

    let calendar_html = match query.room.as_deref() {
        None => view! { <p class="empty">"Select a room to see its occupied dates."</p> }.to_html(),
        Some(room) => match api.occupied_dates(room).await {
            Err(e) => render_error(format!("Failed to fetch occupied dates for room {room}: {e:#}")),
            Ok(intervals) => match to_calendar_blocks(&intervals, &cfg.display.block_color)
                .map_err(anyhow::Error::from)
                .and_then(|blocks| {
                    let grid =
                        MonthGrid::build(month_start.year(), month_start.month(), &blocks)?;
                    Ok((blocks, grid))
                }) {
                Ok((blocks, grid)) => render_room_calendar(room, &grid, &blocks),
                Err(e) => render_error(format!("Cannot build calendar for room {room}: {e:#}")),
            },
        },
    };

    let body = view! {
        <section class="no-print">
            <h2>"Rooms"</h2>
            <div inner_html=rooms_html />
        </section>
        <section>
            <div inner_html=calendar_html />
        </section>
    }
    .to_html();

    Html(render_page("Booking Calendar", now, body))
}

fn render_room_links(rooms: &[serde_json::Value], selected: Option<&str>, month: NaiveDate) -> String {
    if rooms.is_empty() {
        return view! { <p class="empty">"No rooms."</p> }.to_html();
    }
    let month = month.format("%Y-%m").to_string();

    let links_html: String = rooms
        .iter()
        .filter_map(|r| room_id(r).map(|id| (room_label(r).unwrap_or_else(|| id.clone()), id)))
        .map(|(label, id)| {
            let css = if selected == Some(id.as_str()) {
                "room selected"
            } else {
                "room"
            };
            let href = format!(
                "/calendar?room={}&month={}",
                urlencoding::encode(&id),
                month
            );
            view! { <a class=css href=href>{label}</a> }.to_html()
        })
        .collect();

    view! { <div class="rooms" inner_html=links_html /> }.to_html()
}

fn render_room_calendar(room: &str, grid: &MonthGrid, blocks: &[CalendarBlock]) -> String {
    let title = format!("Room {} · {}", room, grid.first.format("%B %Y"));
    let room_q = urlencoding::encode(room).into_owned();
    let nav_href = |d: Option<NaiveDate>| {
        d.map(|d| format!("/calendar?room={}&month={}", room_q, d.format("%Y-%m")))
            .unwrap_or_else(|| "#".to_string())
    };
    let prev_href = nav_href(grid.previous_month());
    let next_href = nav_href(grid.next_month());
    let summary = format!("{} occupied day(s) this month", grid.occupied_days());

    let head_html: String = WEEKDAYS
        .iter()
        .map(|d| view! { <th>{*d}</th> }.to_html())
        .collect();

    let weeks_html: String = grid
        .weeks
        .iter()
        .map(|week| {
            let cells_html: String = week
                .iter()
                .map(|cell| match cell {
                    None => view! { <td class="day outside"></td> }.to_html(),
                    Some(day) => {
                        let css = if day.occupied { "day occupied" } else { "day" };
                        let style = if day.occupied {
                            blocks
                                .iter()
                                .find(|b| b.covers(day.date))
                                .map(|b| format!("background: {}", b.color))
                                .unwrap_or_default()
                        } else {
                            String::new()
                        };
                        let num = day.date.day().to_string();
                        view! { <td class=css style=style>{num}</td> }.to_html()
                    }
                })
                .collect();
            view! { <tr inner_html=cells_html /> }.to_html()
        })
        .collect();

    let blocks_html = render_blocks_table(blocks);

    view! {
        <h2>{title}</h2>
        <p class="month-nav no-print">
            <a href=prev_href>"« Previous"</a>
            " "
            <a href=next_href>"Next »"</a>
        </p>
        <p class="summary">{summary}</p>
        <table class="month-grid">
            <thead><tr inner_html=head_html /></thead>
            <tbody inner_html=weeks_html />
        </table>
        <h3>"Occupied Ranges"</h3>
        <div inner_html=blocks_html />
    }
    .to_html()
}

fn render_blocks_table(blocks: &[CalendarBlock]) -> String {
    if blocks.is_empty() {
        return view! { <p class="empty">"No occupied dates."</p> }.to_html();
    }

    let rows_html: String = blocks
        .iter()
        .map(|b| {
            let id = b.id.to_string();
            let start = b.start.to_string();
            // shown inclusive, as the backend reports it
            let last = b.end.pred_opt().unwrap_or(b.end).to_string();
            let (css, note) = if b.end <= b.start {
                ("status-error", "ends before it starts")
            } else {
                ("status-booked", "")
            };
            view! {
                <tr>
                    <td>{id}</td>
                    <td>{start}</td>
                    <td>{last}</td>
                    <td class=css>{note}</td>
                </tr>
            }
            .to_html()
        })
        .collect();

    view! {
        <table>
            <thead>
                <tr><th>"#"</th><th>"From"</th><th>"To"</th><th>"Note"</th></tr>
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
    fn test_parse_month() {
        assert_eq!(parse_month("2025-06"), NaiveDate::from_ymd_opt(2025, 6, 1));
        assert_eq!(parse_month("2025-13"), None);
        assert_eq!(parse_month("june"), None);
    }

    #[test]
    fn test_room_id_and_label() {
        let room = json!({"id": 7, "number": "101"});
        assert_eq!(room_id(&room).as_deref(), Some("7"));
        assert_eq!(room_label(&room).as_deref(), Some("101"));
        assert_eq!(room_id(&json!({"number": "101"})), None);
    }

    #[test]
    fn test_room_calendar_marks_occupied_days() {
        let intervals = vec![crate::calendar::OccupiedInterval {
            start: NaiveDate::from_ymd_opt(2025, 6, 29).unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
        }];
        let blocks = to_calendar_blocks(&intervals, "#ff0000").unwrap();
        let grid = MonthGrid::build(2025, 6, &blocks).unwrap();
        let html = render_room_calendar("101", &grid, &blocks);
        assert_eq!(html.matches("day occupied").count(), 2);
        assert!(html.contains("background: #ff0000"));
        assert!(html.contains("month=2025-07"));
    }
}
