//! Chart adapter.
//!
//! Chart descriptions arrive as serialized plotly figures. The adapter never looks
//! inside `data` or `layout`; it clears the target region and hands both to the
//! plotting capability with fixed options.

use crate::model::VisualizationSet;
use crate::page::{anchors, Page};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A parsed chart description: the `data` and `layout` members of a plotly figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDescription {
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub layout: Value,
}

impl ChartDescription {
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotConfig {
    pub responsive: bool,
    pub display_mode_bar: bool,
}

/// Options used for every chart.
pub const PLOT_CONFIG: PlotConfig = PlotConfig {
    responsive: true,
    display_mode_bar: true,
};

/// What the plotting capability was asked to draw into a region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotCall {
    pub data: Value,
    pub layout: Value,
    pub config: PlotConfig,
}

impl PlotCall {
    /// `layout.title`, which plotly writes either as a string or as `{text: ...}`.
    pub fn title(&self) -> Option<&str> {
        match self.layout.get("title")? {
            Value::String(s) => Some(s.as_str()),
            other => other.get("text").and_then(Value::as_str),
        }
    }

    pub fn traces(&self) -> &[Value] {
        self.data.as_array().map(Vec::as_slice).unwrap_or(&[])
    }
}

/// External plotting capability, keyed by region id.
pub trait Plotting {
    fn clear_region(&mut self, region_id: &str);
    fn new_plot(&mut self, region_id: &str, data: Value, layout: Value, config: PlotConfig);
}

impl Plotting for Page {
    fn clear_region(&mut self, region_id: &str) {
        self.clear(region_id);
    }

    fn new_plot(&mut self, region_id: &str, data: Value, layout: Value, config: PlotConfig) {
        self.set_plot(region_id, PlotCall { data, layout, config });
    }
}

pub fn render_chart(plotter: &mut impl Plotting, region_id: &str, chart: ChartDescription) {
    plotter.clear_region(region_id);
    plotter.new_plot(region_id, chart.data, chart.layout, PLOT_CONFIG);
}

/// The three charts of one analysis result, parsed up front so a malformed chart
/// fails the whole response before anything is drawn.
#[derive(Debug, Clone)]
pub struct ChartSet {
    pub sentiment: ChartDescription,
    pub entity: ChartDescription,
    pub source: ChartDescription,
}

impl ChartSet {
    pub fn from_visualizations(v: &VisualizationSet) -> Result<Self, ChartParseError> {
        let parse = |region: &'static str, raw: &str| {
            ChartDescription::parse(raw).map_err(|source| ChartParseError { region, source })
        };
        Ok(Self {
            sentiment: parse(anchors::SENTIMENT_CHART, &v.sentiment_chart)?,
            entity: parse(anchors::ENTITY_CHART, &v.entity_chart)?,
            source: parse(anchors::SOURCE_CHART, &v.source_chart)?,
        })
    }

    pub fn render(self, plotter: &mut impl Plotting) {
        render_chart(plotter, anchors::SENTIMENT_CHART, self.sentiment);
        render_chart(plotter, anchors::ENTITY_CHART, self.entity);
        render_chart(plotter, anchors::SOURCE_CHART, self.source);
    }
}

#[derive(Debug, thiserror::Error)]
#[error("chart for {region} is not a valid figure: {source}")]
pub struct ChartParseError {
    pub region: &'static str,
    #[source]
    pub source: serde_json::Error,
}
