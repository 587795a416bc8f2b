//! Mức zoom đặt sẵn và giữ vị trí cuộn khi đổi zoom.

use serde::{Deserialize, Serialize};
use tracing::trace;

/// Mức zoom có tên.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ZoomLevel {
    pub label: String,
    pub day_width: f64,
}

impl ZoomLevel {
    pub fn new(label: impl Into<String>, day_width: f64) -> Self {
        Self {
            label: label.into(),
            day_width,
        }
    }

    /// Các mức mặc định, mịn nhất trước.
    pub fn defaults() -> Vec<ZoomLevel> {
        vec![
            ZoomLevel::new("Day", 40.0),
            ZoomLevel::new("Week", 12.0),
            ZoomLevel::new("Month", 4.0),
            ZoomLevel::new("Quarter", 1.5),
            ZoomLevel::new("Year", 0.5),
        ]
    }

    /// Tìm theo nhãn, không phân biệt hoa thường.
    pub fn find<'a>(levels: &'a [ZoomLevel], label: &str) -> Option<&'a ZoomLevel> {
        levels
            .iter()
            .find(|level| level.label.eq_ignore_ascii_case(label.trim()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

/// Mức gần nhất rộng hơn (`In`) hoặc hẹp hơn (`Out`) hẳn so với `current`.
/// Trả `None` khi đã ở đầu dải.
pub fn step_zoom(levels: &[ZoomLevel], current: f64, direction: ZoomDirection) -> Option<f64> {
    let widths = levels.iter().map(|level| level.day_width);
    match direction {
        ZoomDirection::In => widths.filter(|width| *width > current).reduce(f64::min),
        ZoomDirection::Out => widths.filter(|width| *width < current).reduce(f64::max),
    }
}

/// Điểm của khung nhìn được giữ cố định khi zoom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoomAnchor {
    #[default]
    Left,
    Center,
}

/// Trạng thái cuộn ngang của khung chứa, đo sau khi nội dung đã đổi cỡ
/// theo zoom mới.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollMetrics {
    pub scroll_left: f64,
    pub scroll_width: f64,
    pub client_width: f64,
}

impl ScrollMetrics {
    pub fn max_scroll(&self) -> f64 {
        (self.scroll_width - self.client_width).max(0.0)
    }
}

/// Vị trí cuộn giữ điểm neo trên cùng nội dung sau khi nhân `zoom_factor`.
pub fn rescale_scroll_offset(metrics: ScrollMetrics, zoom_factor: f64, anchor: ZoomAnchor) -> f64 {
    let anchor_offset = match anchor {
        ZoomAnchor::Left => 0.0,
        ZoomAnchor::Center => metrics.client_width / 2.0,
    };
    let content_position = metrics.scroll_left + anchor_offset;
    let target = content_position * zoom_factor - anchor_offset;

    target.clamp(0.0, metrics.max_scroll())
}

/// Ghi nhớ `day_width` quan sát gần nhất của một timeline.
#[derive(Debug, Clone, Default)]
pub struct ZoomTracker {
    previous: Option<f64>,
    anchor: ZoomAnchor,
}

impl ZoomTracker {
    pub fn new(anchor: ZoomAnchor) -> Self {
        Self {
            previous: None,
            anchor,
        }
    }

    pub fn previous(&self) -> Option<f64> {
        self.previous
    }

    /// Quên giá trị đã giữ, như khi mount lại.
    pub fn reset(&mut self) {
        self.previous = None;
    }

    /// Ghi nhận `day_width` và trả vị trí cuộn mới nếu zoom đã đổi kể từ
    /// lần quan sát trước. Độ rộng không dương hoặc không hữu hạn bị bỏ qua.
    pub fn observe(&mut self, day_width: f64, metrics: ScrollMetrics) -> Option<f64> {
        if !day_width.is_finite() || day_width <= 0.0 {
            return None;
        }

        let previous = self.previous.replace(day_width)?;
        if previous == day_width {
            return None;
        }

        let factor = day_width / previous;
        let offset = rescale_scroll_offset(metrics, factor, self.anchor);
        if !offset.is_finite() {
            return None;
        }

        trace!(
            previous,
            day_width,
            factor,
            offset,
            "đã tính lại vị trí cuộn"
        );
        Some(offset)
    }
}
