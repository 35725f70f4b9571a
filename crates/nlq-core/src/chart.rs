//! Chart projection.
//!
//! [`project`] turns a [`ChartDescriptor`] into draw-ready rows plus per-kind
//! series configuration. Two stages:
//!
//! 1. **Coercion**: every field of every `values` row is passed through
//!    [`coerce_value`], so numeric-looking text becomes a number. Labels that
//!    happen to look numeric are converted too.
//! 2. **Strategy**: the chart kind picks pie / bar / line / area rules, with
//!    the `xAxisKey → nameKey` and `yAxisKey → valueKey` fallbacks.
//!
//! Projection never fails. Unknown kinds produce
//! [`ChartProjection::Unsupported`], and malformed data degrades to empty rows.

use nlq_types::{ChartData, ChartDescriptor, ChartKind};
use serde::Serialize;
use serde_json::{Map, Number, Value};

/// Series colors, assigned by index and cycling.
pub const PALETTE: [&str; 10] = [
    "#13285a", "#2563eb", "#7c3aed", "#db2777", "#ea580c", "#16a34a", "#0891b2", "#4f46e5",
    "#c026d3", "#059669",
];

/// Fill opacity of the single area series.
pub const AREA_FILL_OPACITY: f32 = 0.3;

/// One coerced data row.
pub type Row = Map<String, Value>;

pub fn palette_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub data_key: String,
    /// Legend label.
    pub name: String,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_opacity: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub name: String,
    pub value: f64,
    /// Whole-percent share of the total.
    pub percent: i64,
    /// `"<name> (<percent>%)"`.
    pub label: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieChart {
    pub name_key: String,
    pub value_key: String,
    pub rows: Vec<Row>,
    pub slices: Vec<PieSlice>,
}

/// Shared shape of bar, line and area charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartesianChart {
    pub x_axis_key: String,
    pub rows: Vec<Row>,
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ChartProjection {
    Pie(PieChart),
    Bar(CartesianChart),
    Line(CartesianChart),
    Area(CartesianChart),
    Unsupported { chart_type: String },
}

impl ChartProjection {
    /// Placeholder text for kinds with no rendering strategy.
    pub fn placeholder(&self) -> Option<String> {
        match self {
            ChartProjection::Unsupported { chart_type } => {
                Some(format!("Unsupported chart type: {chart_type}"))
            }
            _ => None,
        }
    }
}

/// Project a chart descriptor for drawing.
pub fn project(descriptor: &ChartDescriptor) -> ChartProjection {
    let Some(kind) = descriptor.kind() else {
        return ChartProjection::Unsupported {
            chart_type: descriptor.chart_type.clone(),
        };
    };

    let data = descriptor.chart_data();
    let rows = coerce_rows(&data.values);

    match kind {
        ChartKind::Pie => ChartProjection::Pie(pie(&data, rows)),
        ChartKind::Bar => {
            let explicit: Option<Vec<Series>> = data.bars.as_ref().map(|bars| {
                bars.iter()
                    .enumerate()
                    .map(|(i, b)| {
                        explicit_series(i, &b.data_key, b.fill.as_deref(), b.name.as_deref())
                    })
                    .collect()
            });
            ChartProjection::Bar(cartesian(&data, rows, explicit, None))
        }
        ChartKind::Line => {
            let explicit: Option<Vec<Series>> = data.lines.as_ref().map(|lines| {
                lines
                    .iter()
                    .enumerate()
                    .map(|(i, l)| {
                        explicit_series(i, &l.data_key, l.stroke.as_deref(), l.name.as_deref())
                    })
                    .collect()
            });
            ChartProjection::Line(cartesian(&data, rows, explicit, None))
        }
        ChartKind::Area => {
            ChartProjection::Area(cartesian(&data, rows, None, Some(AREA_FILL_OPACITY)))
        }
    }
}

fn pie(data: &ChartData, rows: Vec<Row>) -> PieChart {
    let values: Vec<f64> = rows
        .iter()
        .map(|row| row.get(&data.value_key).and_then(Value::as_f64).unwrap_or(0.0))
        .collect();
    let total: f64 = values.iter().sum();

    let slices = rows
        .iter()
        .zip(&values)
        .enumerate()
        .map(|(i, (row, &value))| {
            let share = if total == 0.0 { 0.0 } else { value / total };
            let percent = (share * 100.0).round() as i64;
            let name = row.get(&data.name_key).map(display_value).unwrap_or_default();
            PieSlice {
                label: format!("{name} ({percent}%)"),
                name,
                value,
                percent,
                color: palette_color(i).to_owned(),
            }
        })
        .collect();

    PieChart {
        name_key: data.name_key.clone(),
        value_key: data.value_key.clone(),
        rows,
        slices,
    }
}

fn cartesian(
    data: &ChartData,
    rows: Vec<Row>,
    explicit: Option<Vec<Series>>,
    fill_opacity: Option<f32>,
) -> CartesianChart {
    let x_axis_key = or_fallback(data.x_axis_key.as_deref(), &data.name_key);
    let series = explicit.unwrap_or_else(|| {
        let data_key = or_fallback(data.y_axis_key.as_deref(), &data.value_key);
        vec![Series {
            name: data_key.clone(),
            data_key,
            color: palette_color(0).to_owned(),
            fill_opacity,
        }]
    });
    CartesianChart {
        x_axis_key,
        rows,
        series,
    }
}

fn explicit_series(index: usize, data_key: &str, color: Option<&str>, name: Option<&str>) -> Series {
    Series {
        data_key: data_key.to_owned(),
        name: or_fallback(name, data_key),
        color: or_fallback(color, palette_color(index)),
        fill_opacity: None,
    }
}

/// `preferred` unless it is missing or empty.
fn or_fallback(preferred: Option<&str>, fallback: &str) -> String {
    preferred
        .filter(|s| !s.is_empty())
        .unwrap_or(fallback)
        .to_owned()
}

// ── Coercion ──────────────────────────────────────────────────────────────────

pub fn coerce_rows(rows: &[Row]) -> Vec<Row> {
    rows.iter().map(coerce_row).collect()
}

pub fn coerce_row(row: &Row) -> Row {
    row.iter()
        .map(|(k, v)| (k.clone(), coerce_value(v)))
        .collect()
}

/// Numeric-looking text becomes a number; everything else is returned as-is.
pub fn coerce_value(value: &Value) -> Value {
    let Value::String(text) = value else {
        return value.clone();
    };
    match parse_float_prefix(text) {
        Some(f) if f.is_finite() => number_value(f),
        _ => value.clone(),
    }
}

/// Parse the longest leading decimal literal of `s`, ignoring leading
/// whitespace and any trailing garbage (`"12 patients"` → `12`).
///
/// Returns `None` when no digits lead the string. `"Infinity"` (optionally
/// signed) yields an infinite value.
pub fn parse_float_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    if s[end..].starts_with("Infinity") {
        let negative = bytes.first() == Some(&b'-');
        return Some(if negative { f64::NEG_INFINITY } else { f64::INFINITY });
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }
    if digits == 0 {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().ok()
}

/// Largest integer an IEEE double represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

fn number_value(f: f64) -> Value {
    if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER {
        return Value::from(f as i64);
    }
    Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
}

/// Render a row value the way a label shows it.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER => format!("{}", f as i64),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn descriptor(chart_type: &str, data: Value) -> ChartDescriptor {
        ChartDescriptor {
            chart_type: chart_type.into(),
            data,
        }
    }

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    // ── Coercion ──────────────────────────────────────────────────────────────

    #[test]
    fn parse_float_prefix_follows_leading_literal() {
        assert_eq!(parse_float_prefix("42"), Some(42.0));
        assert_eq!(parse_float_prefix("  3.5"), Some(3.5));
        assert_eq!(parse_float_prefix("-0.25kg"), Some(-0.25));
        assert_eq!(parse_float_prefix("12 patients"), Some(12.0));
        assert_eq!(parse_float_prefix(".5"), Some(0.5));
        assert_eq!(parse_float_prefix("5."), Some(5.0));
        assert_eq!(parse_float_prefix("1e3"), Some(1000.0));
        assert_eq!(parse_float_prefix("1e"), Some(1.0));
        assert_eq!(parse_float_prefix("2E-2x"), Some(0.02));
        assert_eq!(parse_float_prefix("0x1F"), Some(0.0));
        assert_eq!(parse_float_prefix("2024-01"), Some(2024.0));
        assert_eq!(parse_float_prefix("-Infinity"), Some(f64::NEG_INFINITY));
        assert_eq!(parse_float_prefix("Female"), None);
        assert_eq!(parse_float_prefix(""), None);
        assert_eq!(parse_float_prefix("."), None);
        assert_eq!(parse_float_prefix("-"), None);
        assert_eq!(parse_float_prefix("e5"), None);
    }

    #[test]
    fn coerce_value_converts_text_only() {
        assert_eq!(coerce_value(&json!("10")), json!(10));
        assert_eq!(coerce_value(&json!("2.5")), json!(2.5));
        assert_eq!(coerce_value(&json!("Male")), json!("Male"));
        assert_eq!(coerce_value(&json!("Infinity")), json!("Infinity"));
        assert_eq!(coerce_value(&json!(7)), json!(7));
        assert_eq!(coerce_value(&json!(null)), json!(null));
        assert_eq!(coerce_value(&json!(true)), json!(true));
    }

    #[test]
    fn coercion_applies_to_every_field() {
        let coerced = coerce_row(&row(json!({"year": "2023", "count": "14", "label": "Q1"})));
        assert_eq!(coerced["year"], json!(2023));
        assert_eq!(coerced["count"], json!(14));
        assert_eq!(coerced["label"], json!("Q1"));
    }

    #[test]
    fn coercion_is_idempotent() {
        let rows = vec![
            row(json!({"a": "1", "b": "x", "c": 3.25, "d": "7 days", "e": null, "f": "-4e2"})),
            row(json!({"a": "  9", "b": "", "c": "0.1"})),
        ];
        let once = coerce_rows(&rows);
        let twice = coerce_rows(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn display_value_prints_integers_without_fraction() {
        assert_eq!(display_value(&json!(2023)), "2023");
        assert_eq!(display_value(&json!(2.5)), "2.5");
        assert_eq!(display_value(&json!("F")), "F");
        assert_eq!(display_value(&json!(null)), "");
    }

    // ── Pie ───────────────────────────────────────────────────────────────────

    #[test]
    fn pie_percentages_sum_to_hundred() {
        let projection = project(&descriptor(
            "PieChart",
            json!({
                "nameKey": "name",
                "valueKey": "value",
                "values": [
                    {"name": "A", "value": 10},
                    {"name": "B", "value": "30"},
                    {"name": "C", "value": 60}
                ]
            }),
        ));
        let ChartProjection::Pie(pie) = projection else {
            panic!("expected pie");
        };
        let labels: Vec<_> = pie.slices.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, ["A (10%)", "B (30%)", "C (60%)"]);
        assert_eq!(pie.slices.iter().map(|s| s.percent).sum::<i64>(), 100);
        assert_eq!(pie.rows[1]["value"], json!(30));
    }

    #[test]
    fn pie_colors_cycle_through_palette() {
        let values: Vec<Value> = (0..12).map(|i| json!({"n": format!("s{i}"), "v": 1})).collect();
        let ChartProjection::Pie(pie) = project(&descriptor(
            "PieChart",
            json!({"nameKey": "n", "valueKey": "v", "values": values}),
        )) else {
            panic!("expected pie");
        };
        assert_eq!(pie.slices[0].color, PALETTE[0]);
        assert_eq!(pie.slices[9].color, PALETTE[9]);
        assert_eq!(pie.slices[10].color, PALETTE[0]);
        assert_eq!(pie.slices[11].color, PALETTE[1]);
    }

    #[test]
    fn pie_rounds_to_whole_percent() {
        let ChartProjection::Pie(pie) = project(&descriptor(
            "PieChart",
            json!({"nameKey": "n", "valueKey": "v", "values": [
                {"n": "a", "v": 1}, {"n": "b", "v": 1}, {"n": "c", "v": 1}
            ]}),
        )) else {
            panic!("expected pie");
        };
        assert!(pie.slices.iter().all(|s| s.percent == 33));
        assert_eq!(pie.slices[0].label, "a (33%)");
    }

    #[test]
    fn pie_with_zero_total_does_not_divide_by_zero() {
        let ChartProjection::Pie(pie) = project(&descriptor(
            "PieChart",
            json!({"nameKey": "n", "valueKey": "v", "values": [{"n": "a", "v": "none"}]}),
        )) else {
            panic!("expected pie");
        };
        assert_eq!(pie.slices[0].label, "a (0%)");
        assert_eq!(pie.slices[0].value, 0.0);
    }

    // ── Bar / line / area ─────────────────────────────────────────────────────

    #[test]
    fn bar_single_series_uses_key_fallbacks() {
        let ChartProjection::Bar(bar) = project(&descriptor(
            "BarChart",
            json!({"nameKey": "dept", "valueKey": "visits", "values": [{"dept": "ER", "visits": "5"}]}),
        )) else {
            panic!("expected bar");
        };
        assert_eq!(bar.x_axis_key, "dept");
        assert_eq!(bar.series.len(), 1);
        assert_eq!(bar.series[0].data_key, "visits");
        assert_eq!(bar.series[0].color, PALETTE[0]);
        assert_eq!(bar.rows[0]["visits"], json!(5));
    }

    #[test]
    fn explicit_axis_keys_win_unless_empty() {
        let ChartProjection::Line(line) = project(&descriptor(
            "LineChart",
            json!({"nameKey": "n", "valueKey": "v", "xAxisKey": "month", "yAxisKey": "total", "values": []}),
        )) else {
            panic!("expected line");
        };
        assert_eq!(line.x_axis_key, "month");
        assert_eq!(line.series[0].data_key, "total");

        let ChartProjection::Line(line) = project(&descriptor(
            "LineChart",
            json!({"nameKey": "n", "valueKey": "v", "xAxisKey": "", "yAxisKey": "", "values": []}),
        )) else {
            panic!("expected line");
        };
        assert_eq!(line.x_axis_key, "n");
        assert_eq!(line.series[0].data_key, "v");
    }

    #[test]
    fn explicit_bars_use_own_style_or_palette() {
        let ChartProjection::Bar(bar) = project(&descriptor(
            "BarChart",
            json!({
                "nameKey": "m", "valueKey": "v", "values": [],
                "bars": [
                    {"dataKey": "inpatient", "fill": "#000000", "name": "Inpatient"},
                    {"dataKey": "outpatient"},
                    {"dataKey": "virtual", "fill": "", "name": ""}
                ]
            }),
        )) else {
            panic!("expected bar");
        };
        assert_eq!(bar.series.len(), 3);
        assert_eq!(bar.series[0].color, "#000000");
        assert_eq!(bar.series[0].name, "Inpatient");
        assert_eq!(bar.series[1].color, PALETTE[1]);
        assert_eq!(bar.series[1].name, "outpatient");
        assert_eq!(bar.series[2].color, PALETTE[2]);
        assert_eq!(bar.series[2].name, "virtual");
    }

    #[test]
    fn line_ignores_bars_and_bar_ignores_lines() {
        let data = json!({
            "nameKey": "m", "valueKey": "v", "values": [],
            "bars": [{"dataKey": "a"}, {"dataKey": "b"}],
            "lines": [{"dataKey": "c", "stroke": "#111111"}]
        });
        let ChartProjection::Line(line) = project(&descriptor("LineChart", data.clone())) else {
            panic!("expected line");
        };
        assert_eq!(line.series.len(), 1);
        assert_eq!(line.series[0].data_key, "c");
        assert_eq!(line.series[0].color, "#111111");

        let ChartProjection::Bar(bar) = project(&descriptor("BarChart", data)) else {
            panic!("expected bar");
        };
        assert_eq!(bar.series.len(), 2);
    }

    #[test]
    fn area_is_single_translucent_series() {
        let ChartProjection::Area(area) = project(&descriptor(
            "AreaChart",
            json!({
                "nameKey": "day", "valueKey": "admissions", "values": [{"day": "Mon", "admissions": 3}],
                "lines": [{"dataKey": "ignored"}]
            }),
        )) else {
            panic!("expected area");
        };
        assert_eq!(area.series.len(), 1);
        assert_eq!(area.series[0].data_key, "admissions");
        assert_eq!(area.series[0].fill_opacity, Some(AREA_FILL_OPACITY));
        assert_eq!(area.x_axis_key, "day");
    }

    // ── Degradation ───────────────────────────────────────────────────────────

    #[test]
    fn unknown_kind_is_placeholder() {
        let projection = project(&descriptor("ScatterChart", json!({"values": [1, 2]})));
        assert_eq!(
            projection,
            ChartProjection::Unsupported {
                chart_type: "ScatterChart".into()
            }
        );
        assert_eq!(
            projection.placeholder().as_deref(),
            Some("Unsupported chart type: ScatterChart")
        );
    }

    #[test]
    fn malformed_data_projects_to_empty_chart() {
        let ChartProjection::Bar(bar) = project(&descriptor("BarChart", json!("garbage"))) else {
            panic!("expected bar");
        };
        assert!(bar.rows.is_empty());
        assert_eq!(bar.series[0].data_key, "");
    }

    #[test]
    fn projection_serializes_with_kind_tag() {
        let json = serde_json::to_value(project(&descriptor("Nope", json!({})))).unwrap();
        assert_eq!(json["kind"], "unsupported");
        assert_eq!(json["chart_type"], "Nope");
    }
}
