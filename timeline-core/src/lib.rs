//! Logic lõi dàn trang các thanh timeline theo khoảng ngày.
//!
//! Mỗi nhóm được xếp vào các cột không chồng lấn, và lưới lịch nhiều năm
//! được quy đổi ra toạ độ pixel.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub mod geometry;
pub mod grouping;
pub mod interval;
pub mod placement;
pub mod zoom;

pub use geometry::{
    canvas_width, clamp_progress, layout_groups, GroupLayout, ItemLayout, Ruler, RulerSegment,
    TimelineLayout,
};
pub use grouping::{group_items, FieldAccessor, UNGROUPED};
pub use interval::{
    date_ranges_overlap, days_in_month, display_interval, display_interval_at, duration_in_days,
    max_overlap_cardinality,
};
pub use placement::{column_count, find_placement, place_items, Placement};
pub use zoom::{
    rescale_scroll_offset, step_zoom, ScrollMetrics, ZoomAnchor, ZoomDirection, ZoomLevel,
    ZoomTracker,
};

/// Cấu hình kích thước lưới và các thanh.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelineConfig {
    /// Số pixel cho một ngày. Tham số zoom duy nhất.
    pub day_width: f64,
    /// Độ rộng cột nhãn cố định bên trái lưới.
    pub sidebar_width: f64,
    /// Chiều cao một cột (làn) trong nhóm.
    pub cell_height: f64,
    /// Khoảng cách dọc giữa hai nhóm.
    pub group_gap: f64,
    pub year_row_height: f64,
    pub month_row_height: f64,
    pub day_row_height: f64,
    /// Các mức zoom đặt sẵn, mịn nhất trước.
    pub zoom_levels: Vec<ZoomLevel>,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            day_width: 12.0,
            sidebar_width: 200.0,
            cell_height: 32.0,
            group_gap: 16.0,
            year_row_height: 24.0,
            month_row_height: 24.0,
            day_row_height: 20.0,
            zoom_levels: ZoomLevel::defaults(),
        }
    }
}

impl TimelineConfig {
    /// Tổng chiều cao ba dải năm, tháng, ngày.
    pub fn header_height(&self) -> f64 {
        self.year_row_height + self.month_row_height + self.day_row_height
    }

    /// Từ chối các giá trị làm lưới suy biến.
    pub fn validate(&self) -> Result<(), TimelineError> {
        if !self.day_width.is_finite() || self.day_width <= 0.0 {
            return Err(TimelineError::InvalidConfig(format!(
                "day_width phải là số dương, nhận {}",
                self.day_width
            )));
        }

        let sizes = [
            ("sidebar_width", self.sidebar_width),
            ("cell_height", self.cell_height),
            ("group_gap", self.group_gap),
            ("year_row_height", self.year_row_height),
            ("month_row_height", self.month_row_height),
            ("day_row_height", self.day_row_height),
        ];
        for (name, value) in sizes {
            if !value.is_finite() || value < 0.0 {
                return Err(TimelineError::InvalidConfig(format!(
                    "{name} không được âm, nhận {value}"
                )));
            }
        }

        if let Some(level) = self
            .zoom_levels
            .iter()
            .find(|level| !level.day_width.is_finite() || level.day_width <= 0.0)
        {
            return Err(TimelineError::InvalidConfig(format!(
                "mức zoom {} có day_width không hợp lệ {}",
                level.label, level.day_width
            )));
        }

        Ok(())
    }

    /// Chuyển `day_width` sang mức zoom có tên tương ứng.
    pub fn apply_zoom(&mut self, label: &str) -> Result<(), TimelineError> {
        let level = ZoomLevel::find(&self.zoom_levels, label)
            .ok_or_else(|| TimelineError::UnknownZoom(label.to_string()))?;
        self.day_width = level.day_width;
        Ok(())
    }
}

/// Cấu hình từng phần, ghép lên [`TimelineConfig::default`].
///
/// Nhận cả khoá snake_case lẫn camelCase.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimelineConfigPatch {
    #[serde(alias = "dayWidth")]
    pub day_width: Option<f64>,
    #[serde(alias = "sidebarWidth")]
    pub sidebar_width: Option<f64>,
    #[serde(alias = "cellHeight")]
    pub cell_height: Option<f64>,
    #[serde(alias = "groupGap")]
    pub group_gap: Option<f64>,
    #[serde(alias = "yearRowHeight")]
    pub year_row_height: Option<f64>,
    #[serde(alias = "monthRowHeight")]
    pub month_row_height: Option<f64>,
    #[serde(alias = "dayRowHeight")]
    pub day_row_height: Option<f64>,
    #[serde(alias = "zoomLevels")]
    pub zoom_levels: Option<Vec<ZoomLevel>>,
}

impl TimelineConfigPatch {
    pub fn apply_to(self, base: &mut TimelineConfig) {
        if let Some(value) = self.day_width {
            base.day_width = value;
        }
        if let Some(value) = self.sidebar_width {
            base.sidebar_width = value;
        }
        if let Some(value) = self.cell_height {
            base.cell_height = value;
        }
        if let Some(value) = self.group_gap {
            base.group_gap = value;
        }
        if let Some(value) = self.year_row_height {
            base.year_row_height = value;
        }
        if let Some(value) = self.month_row_height {
            base.month_row_height = value;
        }
        if let Some(value) = self.day_row_height {
            base.day_row_height = value;
        }
        if let Some(levels) = self.zoom_levels {
            base.zoom_levels = levels;
        }
    }
}

impl From<TimelineConfigPatch> for TimelineConfig {
    fn from(patch: TimelineConfigPatch) -> Self {
        let mut base = TimelineConfig::default();
        patch.apply_to(&mut base);
        base
    }
}

/// Một thanh trên timeline, có ngày bắt đầu và kết thúc.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimelineItem {
    pub id: String,
    pub name: String,
    #[serde(alias = "start_date")]
    pub start_date: NaiveDate,
    #[serde(alias = "end_date")]
    pub end_date: NaiveDate,
    /// Phần trăm hoàn thành, kẹp về `0..=100` khi dàn trang.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    /// Trường mở rộng, giữ nguyên.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl TimelineItem {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            start_date,
            end_date,
            progress: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// Nhóm có tên. Cột được gán riêng trong từng nhóm.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelineGroup {
    pub title: String,
    pub items: Vec<TimelineItem>,
}

impl TimelineGroup {
    pub fn new(title: impl Into<String>, items: Vec<TimelineItem>) -> Self {
        Self {
            title: title.into(),
            items,
        }
    }
}

/// Phạm vi ngang của lưới: các năm liên tiếp, bắt đầu từ `start_month`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimelineInterval {
    pub years: Vec<i32>,
    /// Tháng (đếm từ 0) của năm đầu tiên nơi lưới bắt đầu.
    pub start_month: u32,
}

impl TimelineInterval {
    /// Ngày đầu tiên được vẽ trên lưới.
    pub fn origin(&self) -> Option<NaiveDate> {
        let year = *self.years.first()?;
        NaiveDate::from_ymd_opt(year, self.start_month + 1, 1)
    }
}

/// Lỗi khi đọc dữ liệu hoặc kiểm tra cấu hình.
#[derive(Debug, thiserror::Error)]
pub enum TimelineError {
    #[error("Dữ liệu đầu vào thiếu thông tin tối thiểu")]
    MissingData,
    #[error("Không đọc được dữ liệu: {0}")]
    Parse(String),
    #[error("Mục {id} kết thúc trước khi bắt đầu")]
    InvalidRange { id: String },
    #[error("Trùng id mục: {0}")]
    DuplicateId(String),
    #[error("Cấu hình không hợp lệ: {0}")]
    InvalidConfig(String),
    #[error("Không có mức zoom: {0}")]
    UnknownZoom(String),
}
