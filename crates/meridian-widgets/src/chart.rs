//! Insights doughnut chart configuration.

use serde_json::{json, Value};

/// A doughnut chart described declaratively for the charting library.
#[derive(Debug, Clone, PartialEq)]
pub struct DoughnutChart {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub colors: Vec<String>,
    pub border_width: u32,
    pub border_color: String,
    /// Inner radius as a percentage of the outer one
    pub cutout: u8,
}

impl DoughnutChart {
    /// Enquiry breakdown shown on `#insightsDoughnutChart`.
    pub fn insights() -> Self {
        let slices = [
            ("All Other Queries", 12.02, "#FFA726"),
            ("New Car Inquiry", 40.0, "#66BB6A"),
            ("Used Cars Inquiry", 20.0, "#29B6F6"),
            ("Bookings", 19.0, "#AB47BC"),
            ("Service and Parts", 9.0, "#FF7043"),
            ("Finance and Lease", 0.98, "#EC407A"),
        ];

        Self {
            labels: slices.iter().map(|s| s.0.to_string()).collect(),
            values: slices.iter().map(|s| s.1).collect(),
            colors: slices.iter().map(|s| s.2.to_string()).collect(),
            border_width: 2,
            border_color: "#1c1c1c".to_string(),
            cutout: 50,
        }
    }

    /// Tooltip text for one slice.
    pub fn tooltip(label: &str, value: f64) -> String {
        format!("{label}: {value}%")
    }

    /// Label drawn on top of a slice.
    pub fn data_label(value: f64) -> String {
        format!("{value:.1}%")
    }

    /// Chart configuration object.
    pub fn to_config(&self) -> Value {
        json!({
            "type": "doughnut",
            "data": {
                "labels": self.labels,
                "datasets": [{
                    "data": self.values,
                    "backgroundColor": self.colors,
                    "borderWidth": self.border_width,
                    "borderColor": self.border_color,
                }],
            },
            "options": {
                "responsive": false,
                "plugins": {
                    "legend": {
                        "display": true,
                        "position": "bottom",
                        "labels": { "color": "#111" },
                    },
                    "tooltip": { "enabled": true },
                    "datalabels": {
                        "color": "#fff",
                        "font": { "weight": "bold", "size": 16 },
                    },
                },
                "cutout": format!("{}%", self.cutout),
            },
        })
    }
}

/// Draws the chart once, the first time enough of it is visible.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartTrigger {
    threshold: f64,
    drawn: bool,
}

impl ChartTrigger {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            drawn: false,
        }
    }

    /// Returns true exactly once, when `ratio` first reaches the threshold.
    pub fn observe(&mut self, ratio: f64) -> bool {
        if self.drawn || ratio < self.threshold {
            return false;
        }
        self.drawn = true;
        true
    }
}

impl Default for ChartTrigger {
    fn default() -> Self {
        Self::new(0.3)
    }
}
