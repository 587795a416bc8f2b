//! Gán cột kiểu first-fit cho các mục theo khoảng ngày.
//!
//! Mục được xử lý theo thứ tự ngày bắt đầu, mỗi mục vào cột thấp nhất chưa
//! có mục xung đột. Phép thử ở đây là chặt: mục bắt đầu đúng ngày mục khác
//! kết thúc vẫn xung đột, trong khi
//! [`max_overlap_cardinality`](crate::max_overlap_cardinality) coi cặp đó là
//! nối tiếp. Chiều cao nhóm lấy theo hàm sau, nên nhóm có mục chạm biên có
//! thể dùng nhiều cột hơn phần được dành sẵn.

use chrono::NaiveDate;
use serde::Serialize;

use crate::TimelineItem;

/// Cột được chọn cho một mục.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement<'a> {
    pub column: usize,
    pub item: &'a TimelineItem,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Cột thấp nhất mà `new_start..=new_end` không đụng mục nào đã đặt.
///
/// Bên gọi phải truyền mục đã sắp theo ngày bắt đầu; hàm này không sắp xếp.
pub fn find_placement(
    existing: &[Placement<'_>],
    new_start: NaiveDate,
    new_end: NaiveDate,
) -> usize {
    let Some(max_column) = existing.iter().map(|placement| placement.column).max() else {
        return 0;
    };

    (0..=max_column)
        .find(|&column| {
            existing
                .iter()
                .filter(|placement| placement.column == column)
                .all(|placement| new_end < placement.start_date || new_start > placement.end_date)
        })
        .unwrap_or(max_column + 1)
}

/// Sắp `items` theo ngày bắt đầu (ổn định) rồi đặt lần lượt.
pub fn place_items(items: &[TimelineItem]) -> Vec<Placement<'_>> {
    let mut ordered: Vec<&TimelineItem> = items.iter().collect();
    ordered.sort_by_key(|item| item.start_date);

    let mut placements = Vec::with_capacity(ordered.len());
    for item in ordered {
        let column = find_placement(&placements, item.start_date, item.end_date);
        placements.push(Placement {
            column,
            item,
            start_date: item.start_date,
            end_date: item.end_date,
        });
    }
    placements
}

/// Số cột đang dùng.
pub fn column_count(placements: &[Placement<'_>]) -> usize {
    placements
        .iter()
        .map(|placement| placement.column + 1)
        .max()
        .unwrap_or(0)
}
