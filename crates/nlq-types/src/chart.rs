//! Chart payloads as emitted by the webhook.
//!
//! A [`ChartDescriptor`] keeps `data` as the JSON value it arrived as. Shape
//! problems are only discovered when the payload is projected for drawing, and
//! [`ChartData::from_value`] extracts whatever is usable without failing.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

/// Chart kind tags understood by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum ChartKind {
    #[strum(serialize = "PieChart")]
    Pie,
    #[strum(serialize = "BarChart")]
    Bar,
    #[strum(serialize = "LineChart")]
    Line,
    #[strum(serialize = "AreaChart")]
    Area,
}

/// `{type, data}` pair describing one chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDescriptor {
    #[serde(rename = "type")]
    pub chart_type: String,
    pub data: Value,
}

impl ChartDescriptor {
    /// Parsed kind, or `None` when the renderer has no strategy for it.
    pub fn kind(&self) -> Option<ChartKind> {
        self.chart_type.parse().ok()
    }

    pub fn chart_data(&self) -> ChartData {
        ChartData::from_value(&self.data)
    }
}

/// One explicit line series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineSpec {
    pub data_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// One explicit bar series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarSpec {
    pub data_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Typed view of a chart's `data` object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    #[serde(default)]
    pub name_key: String,
    #[serde(default)]
    pub value_key: String,
    #[serde(default)]
    pub values: Vec<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_axis_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_axis_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines: Option<Vec<LineSpec>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bars: Option<Vec<BarSpec>>,
}

impl ChartData {
    /// Extract a [`ChartData`] from an arbitrary JSON value.
    ///
    /// Missing or mistyped keys fall back to empty defaults; `values` entries
    /// that are not objects become empty rows so indices stay aligned.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        let values = obj
            .get("values")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .map(|item| item.as_object().cloned().unwrap_or_default())
                    .collect()
            })
            .unwrap_or_default();

        let lines = series_list(obj, "lines").map(|entries| {
            entries
                .into_iter()
                .map(|e| LineSpec {
                    data_key: string_field(e, "dataKey").unwrap_or_default(),
                    stroke: string_field(e, "stroke"),
                    name: string_field(e, "name"),
                })
                .collect()
        });

        let bars = series_list(obj, "bars").map(|entries| {
            entries
                .into_iter()
                .map(|e| BarSpec {
                    data_key: string_field(e, "dataKey").unwrap_or_default(),
                    fill: string_field(e, "fill"),
                    name: string_field(e, "name"),
                })
                .collect()
        });

        Self {
            name_key: string_field(obj, "nameKey").unwrap_or_default(),
            value_key: string_field(obj, "valueKey").unwrap_or_default(),
            values,
            x_axis_key: string_field(obj, "xAxisKey"),
            y_axis_key: string_field(obj, "yAxisKey"),
            lines,
            bars,
        }
    }
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_owned)
}

fn series_list<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<Vec<&'a Map<String, Value>>> {
    let items = obj.get(key)?.as_array()?;
    Some(items.iter().filter_map(Value::as_object).collect())
}
