//! Chart markup for a chart.js canvas.
//!
//! Only [`ChartKind::Line`] produces output; the remaining kinds share the
//! same input shape and render nothing until they are implemented.

use dioxus::prelude::*;
use serde::Serialize;
use tracing::debug;

use super::to_html;

const PALETTE: [(u8, u8, u8); 5] = [
    (148, 159, 177),
    (77, 83, 96),
    (212, 204, 197),
    (226, 234, 233),
    (247, 70, 74),
];
const FALLBACK_COLOR: (u8, u8, u8) = (226, 234, 233);
const POINT_STROKE: &str = "rgba(255, 255, 255, 1)";

pub const LINE_CANVAS_ID: &str = "lineChart";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    Line,
    Bar,
    Pie,
    Polar,
    Radar,
    Doughnut,
}

impl ChartKind {
    pub const ALL: [ChartKind; 6] = [
        ChartKind::Line,
        ChartKind::Bar,
        ChartKind::Pie,
        ChartKind::Polar,
        ChartKind::Radar,
        ChartKind::Doughnut,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ChartKind::Line => "line",
            ChartKind::Bar => "bar",
            ChartKind::Pie => "pie",
            ChartKind::Polar => "polar",
            ChartKind::Radar => "radar",
            ChartKind::Doughnut => "doughnut",
        }
    }
}

/// A keyed series; values are plotted in insertion order.
pub type Series = Vec<(String, f64)>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Series>,
}

impl ChartData {
    pub fn new(labels: Vec<String>) -> Self {
        Self {
            labels,
            datasets: Vec::new(),
        }
    }

    pub fn with_series(mut self, series: Series) -> Self {
        self.datasets.push(series);
        self
    }

    fn max_value(&self) -> Option<f64> {
        self.datasets
            .iter()
            .flat_map(|series| series.iter().map(|(_, value)| *value))
            .filter(|value| value.is_finite())
            .reduce(f64::max)
    }
}

/// `rgba(...)` colour for the series at `index`. Indexes past the palette use
/// the fallback colour.
pub fn series_color(index: usize, opacity: f64) -> String {
    let (r, g, b) = PALETTE.get(index).copied().unwrap_or(FALLBACK_COLOR);
    format!("rgba({r}, {g}, {b}, {opacity})")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineSeries {
    pub fill_color: String,
    pub stroke_color: String,
    pub point_color: String,
    pub point_stroke_color: String,
    pub data: Vec<f64>,
}

/// Two-tick axis from zero to the largest value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartScale {
    pub scale_override: bool,
    pub scale_steps: u32,
    pub scale_step_width: u64,
    pub scale_start_value: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineChart {
    pub labels: Vec<String>,
    pub datasets: Vec<LineSeries>,
    #[serde(skip)]
    pub scale: ChartScale,
}

impl LineChart {
    /// `None` when there is no value to plot.
    pub fn build(data: &ChartData) -> Option<Self> {
        let max_value = data.max_value()?;

        let datasets = data
            .datasets
            .iter()
            .enumerate()
            .map(|(index, series)| LineSeries {
                fill_color: series_color(index, 0.5),
                stroke_color: series_color(index, 1.0),
                point_color: series_color(index, 1.0),
                point_stroke_color: POINT_STROKE.to_string(),
                data: series.iter().map(|(_, value)| *value).collect(),
            })
            .collect();

        Some(Self {
            labels: data.labels.clone(),
            datasets,
            scale: ChartScale {
                scale_override: true,
                scale_steps: 1,
                scale_step_width: max_value.abs().trunc() as u64,
                scale_start_value: 0,
            },
        })
    }

    fn script(&self) -> Option<String> {
        let data = script_json(self)?;
        let options = script_json(&self.scale)?;
        Some(format!(
            "(function() {{\n\
             var data = {data};\n\
             var options = {options};\n\
             var ctx = document.getElementById(\"{LINE_CANVAS_ID}\").getContext(\"2d\");\n\
             new Chart(ctx).Line(data, options);\n\
             }})();"
        ))
    }
}

/// JSON safe to inline in a `<script>` body: `</` cannot close the tag.
fn script_json<T: Serialize>(value: &T) -> Option<String> {
    serde_json::to_string(value)
        .ok()
        .map(|json| json.replace("</", "<\\/"))
}

/// Render `data` as the given chart kind.
pub fn render(kind: ChartKind, data: &ChartData) -> Option<String> {
    match kind {
        ChartKind::Line => render_line(data),
        ChartKind::Bar
        | ChartKind::Pie
        | ChartKind::Polar
        | ChartKind::Radar
        | ChartKind::Doughnut => {
            debug!(kind = kind.as_str(), "chart kind has no renderer");
            None
        }
    }
}

fn render_line(data: &ChartData) -> Option<String> {
    let chart = LineChart::build(data)?;
    let script = chart.script()?;

    Some(to_html(rsx! {
        canvas {
            id: LINE_CANVAS_ID,
            width: "960",
            height: "300",
            style: "display:block; clear:both;",
        }
        script { dangerous_inner_html: "{script}" }
    }))
}
