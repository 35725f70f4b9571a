//! Plain-text rendering of messages, charts and session lists.

use chrono::Local;
use nlq_core::chart::{CartesianChart, ChartProjection, PieChart, Row, display_value, project};
use nlq_core::session_label;
use nlq_types::{ChartDescriptor, DisplayMessage, Session};

const USER_PREFIX: &str = "you";
const ASSISTANT_PREFIX: &str = "nlq";

/// Render one chat turn.
///
/// Chart replies show the chart followed by the analysis text, if any.
pub fn message(msg: &DisplayMessage) -> String {
    let time = msg.timestamp.with_timezone(&Local).format("%H:%M");
    if msg.is_user() {
        return format!("[{time}] {USER_PREFIX}> {}", msg.content);
    }

    match msg.chart() {
        Some(descriptor) => {
            let mut out = format!("[{time}] {ASSISTANT_PREFIX}>\n{}", chart(descriptor));
            if let Some(analysis) = msg.analysis.as_deref().filter(|a| !a.is_empty()) {
                out.push_str("\n\n");
                out.push_str(analysis);
            }
            out
        }
        None => format!("[{time}] {ASSISTANT_PREFIX}> {}", msg.content),
    }
}

pub fn chart(descriptor: &ChartDescriptor) -> String {
    let projection = project(descriptor);
    match &projection {
        ChartProjection::Pie(p) => pie(p),
        ChartProjection::Bar(c) => table("Bar chart", c),
        ChartProjection::Line(c) => table("Line chart", c),
        ChartProjection::Area(c) => table("Area chart", c),
        ChartProjection::Unsupported { .. } => projection.placeholder().unwrap_or_default(),
    }
}

fn pie(p: &PieChart) -> String {
    let mut lines = vec![format!("Pie chart ({} by {})", p.value_key, p.name_key)];
    if p.slices.is_empty() {
        lines.push("  (no data)".to_owned());
        return lines.join("\n");
    }
    let width = p.slices.iter().map(|s| s.label.chars().count()).max().unwrap_or(0);
    for slice in &p.slices {
        lines.push(format!(
            "  {:<width$}  {}",
            slice.label,
            display_value(&serde_json::Value::from(slice.value))
        ));
    }
    lines.join("\n")
}

fn table(title: &str, c: &CartesianChart) -> String {
    let mut header = vec![c.x_axis_key.clone()];
    header.extend(c.series.iter().map(|s| s.name.clone()));

    let body: Vec<Vec<String>> = c
        .rows
        .iter()
        .map(|row| {
            let mut cells = vec![cell(row, &c.x_axis_key)];
            cells.extend(c.series.iter().map(|s| cell(row, &s.data_key)));
            cells
        })
        .collect();

    let mut lines = vec![title.to_owned()];
    if body.is_empty() {
        lines.push("  (no data)".to_owned());
        return lines.join("\n");
    }

    let widths: Vec<usize> = (0..header.len())
        .map(|i| {
            body.iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(header[i].chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let format_row = |cells: &[String]| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{cell:<w$}"))
            .collect();
        format!("  {}", padded.join(" | ").trim_end())
    };

    lines.push(format_row(header.as_slice()));
    lines.push(format!(
        "  {}",
        widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("-+-")
    ));
    lines.extend(body.iter().map(|r| format_row(r.as_slice())));
    lines.join("\n")
}

fn cell(row: &Row, key: &str) -> String {
    row.get(key).map(display_value).unwrap_or_default()
}

/// Numbered session list; the current session is marked with `*`.
pub fn session_list(sessions: &[Session], current: Option<&str>) -> String {
    if sessions.is_empty() {
        return "No sessions yet.".to_owned();
    }
    sessions
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let marker = if current == Some(s.session_id.as_str()) { '*' } else { ' ' };
            format!(
                "{marker} {:>2}. {}  ({})",
                i + 1,
                session_label(&s.session_id),
                s.session_id
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
