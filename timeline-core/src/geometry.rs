//! Toạ độ pixel cho lưới lịch và các thanh đặt trên đó.

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::interval::{days_in_month, duration_in_days, interval_of, max_overlap_cardinality};
use crate::placement::{column_count, place_items};
use crate::{TimelineConfig, TimelineGroup, TimelineInterval};

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Độ rộng canvas: tổng số ngày nhân `day_width`, cộng cột nhãn.
///
/// Năm đầu bắt đầu từ `start_month`, các năm sau từ tháng Một.
pub fn canvas_width(years: &[i32], start_month: u32, day_width: f64, sidebar_width: f64) -> f64 {
    let days: u32 = years
        .iter()
        .enumerate()
        .map(|(index, &year)| {
            let first_month = if index == 0 { start_month } else { 0 };
            (first_month..12)
                .map(|month| days_in_month(year, month))
                .sum::<u32>()
        })
        .sum();

    f64::from(days) * day_width + sidebar_width
}

/// Kẹp phần trăm hoàn thành về `0..=100`. NaN tính là 0.
pub fn clamp_progress(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 100.0)
}

/// Một ô nhãn trên thước, toạ độ tính từ gốc lưới.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RulerSegment {
    pub label: String,
    pub left: f64,
    pub width: f64,
}

/// Các dải năm, tháng, ngày phía trên lưới.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Ruler {
    pub years: Vec<RulerSegment>,
    pub months: Vec<RulerSegment>,
    pub days: Vec<RulerSegment>,
}

impl Ruler {
    pub fn build(interval: &TimelineInterval, day_width: f64) -> Self {
        let mut ruler = Ruler::default();
        let mut offset_days: u32 = 0;

        for (index, &year) in interval.years.iter().enumerate() {
            let first_month = if index == 0 { interval.start_month } else { 0 };
            let year_start = offset_days;

            for month in first_month..12 {
                let length = days_in_month(year, month);
                ruler.months.push(RulerSegment {
                    label: MONTH_LABELS[month as usize].to_string(),
                    left: f64::from(offset_days) * day_width,
                    width: f64::from(length) * day_width,
                });
                for day in 1..=length {
                    ruler.days.push(RulerSegment {
                        label: day.to_string(),
                        left: f64::from(offset_days + day - 1) * day_width,
                        width: day_width,
                    });
                }
                offset_days += length;
            }

            ruler.years.push(RulerSegment {
                label: year.to_string(),
                left: f64::from(year_start) * day_width,
                width: f64::from(offset_days - year_start) * day_width,
            });
        }

        ruler
    }
}

/// Toạ độ của một thanh.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemLayout {
    pub id: String,
    pub name: String,
    pub column: usize,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub left: f64,
    pub width: f64,
    pub top: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
}

/// Khối dọc dành cho một nhóm.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupLayout {
    pub title: String,
    pub top: f64,
    pub height: f64,
    /// Số mục đồng thời lớn nhất; quyết định `height`.
    pub cardinality: usize,
    /// Số cột thực tế sau khi gán.
    pub columns: usize,
    pub items: Vec<ItemLayout>,
}

/// Toàn bộ dữ liệu lớp hiển thị cần để vẽ một timeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelineLayout {
    pub interval: TimelineInterval,
    pub day_width: f64,
    pub sidebar_width: f64,
    pub header_height: f64,
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub groups: Vec<GroupLayout>,
    pub ruler: Ruler,
}

impl TimelineLayout {
    pub fn item_count(&self) -> usize {
        self.groups.iter().map(|group| group.items.len()).sum()
    }

    pub fn find_item(&self, id: &str) -> Option<&ItemLayout> {
        self.groups
            .iter()
            .flat_map(|group| group.items.iter())
            .find(|item| item.id == id)
    }
}

/// Dàn trang mọi nhóm trên một lưới chung trải hết các mục.
pub fn layout_groups(groups: &[TimelineGroup], config: &TimelineConfig) -> TimelineLayout {
    let interval = interval_of(
        groups.iter().flat_map(|group| group.items.iter()),
        Local::now().year(),
    );
    let origin = interval.origin();
    let day_width = config.day_width;
    let header_height = config.header_height();

    debug!(
        groups = groups.len(),
        years = interval.years.len(),
        start_month = interval.start_month,
        day_width,
        "đang dàn trang timeline"
    );

    let mut cursor = header_height;
    let mut group_layouts = Vec::with_capacity(groups.len());

    for (index, group) in groups.iter().enumerate() {
        if index > 0 {
            cursor += config.group_gap;
        }

        let placements = place_items(&group.items);
        let cardinality = max_overlap_cardinality(&group.items);
        let columns = column_count(&placements);

        if columns > cardinality {
            warn!(
                group = %group.title,
                columns,
                cardinality,
                "số cột vượt chiều cao dành sẵn, mục chạm biên bị tràn"
            );
        }

        let items = placements
            .iter()
            .map(|placement| {
                let offset_days = origin
                    .map(|origin| (placement.start_date - origin).num_days())
                    .unwrap_or(0);
                ItemLayout {
                    id: placement.item.id.clone(),
                    name: placement.item.name.clone(),
                    column: placement.column,
                    start_date: placement.start_date,
                    end_date: placement.end_date,
                    left: offset_days as f64 * day_width,
                    width: duration_in_days(placement.start_date, placement.end_date) as f64
                        * day_width,
                    top: cursor + placement.column as f64 * config.cell_height,
                    progress: placement.item.progress.map(clamp_progress),
                }
            })
            .collect();

        let height = cardinality as f64 * config.cell_height;
        group_layouts.push(GroupLayout {
            title: group.title.clone(),
            top: cursor,
            height,
            cardinality,
            columns,
            items,
        });
        cursor += height;
    }

    TimelineLayout {
        canvas_width: canvas_width(
            &interval.years,
            interval.start_month,
            day_width,
            config.sidebar_width,
        ),
        canvas_height: cursor,
        ruler: Ruler::build(&interval, day_width),
        interval,
        day_width,
        sidebar_width: config.sidebar_width,
        header_height,
        groups: group_layouts,
    }
}
