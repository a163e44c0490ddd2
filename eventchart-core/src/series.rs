use serde::{Deserialize, Serialize};

/// A chart point. `t` is epoch milliseconds on every path except the
/// zero-filled point of a failed event bucket, which carries epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub t: i64,
    pub y: f64,
}

impl DataPoint {
    pub fn new(t: i64, y: f64) -> Self {
        Self { t, y }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesStyle {
    pub color: String, // palette name, resolved by the frontend
    pub border_width: u16,
    pub fill: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub label: String,
    pub style: SeriesStyle,
    pub data: Vec<DataPoint>,
}

impl Series {
    pub fn alerts(data: Vec<DataPoint>) -> Self {
        Self {
            label: "Alerts".into(),
            style: SeriesStyle { color: "flame_pea".into(), border_width: 2, fill: false },
            data,
        }
    }

    pub fn events(data: Vec<DataPoint>) -> Self {
        Self {
            label: "Events".into(),
            style: SeriesStyle { color: "dodger_blue".into(), border_width: 1, fill: false },
            data,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// largest finite y, if any
    pub fn max_y(&self) -> Option<f64> {
        self.data
            .iter()
            .map(|p| p.y)
            .filter(|y| y.is_finite())
            .fold(None, |acc, y| Some(acc.map_or(y, |m: f64| m.max(y))))
    }
}
