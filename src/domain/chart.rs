//! Chart configuration: which series go on which axis and how they look.

use serde::Serialize;

/// One of the four vertical value axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AxisSlot {
    /// Primary axis, adjacent to the plot on the left.
    Left,
    /// Adjacent to the plot on the right.
    Right,
    /// Offset further out on the left.
    LeftOuter,
    /// Offset further out on the right.
    RightOuter,
}

impl AxisSlot {
    pub const ALL: [AxisSlot; 4] = [
        AxisSlot::Left,
        AxisSlot::Right,
        AxisSlot::LeftOuter,
        AxisSlot::RightOuter,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DashStyle {
    Solid,
    Dash,
    Dot,
    DashDot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// CSS hex form, e.g. `#00bfff`.
    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AxisSpec {
    pub slot: AxisSlot,
    pub title: String,
}

/// How one series is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceSpec {
    /// Name of the series this trace draws (the loader's output name).
    pub series: String,
    pub label: String,
    pub color: Rgb,
    pub dash: DashStyle,
    pub width: u32,
    pub axis: AxisSlot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub x_title: String,
    pub axes: Vec<AxisSpec>,
    pub traces: Vec<TraceSpec>,
    pub width: u32,
    pub height: u32,
}

impl ChartSpec {
    pub fn axis_title(&self, slot: AxisSlot) -> &str {
        self.axes
            .iter()
            .find(|a| a.slot == slot)
            .map(|a| a.title.as_str())
            .unwrap_or("")
    }

    pub fn traces_on(&self, slot: AxisSlot) -> impl Iterator<Item = &TraceSpec> {
        self.traces.iter().filter(move |t| t.axis == slot)
    }

    /// Axes that actually carry at least one trace, in drawing order.
    pub fn used_axes(&self) -> Vec<AxisSlot> {
        AxisSlot::ALL
            .into_iter()
            .filter(|slot| self.traces.iter().any(|t| t.axis == *slot))
            .collect()
    }
}
