//! Tiện ích lịch và khoảng ngày.

use std::cmp::Ordering;

use chrono::{Datelike, Local, NaiveDate};

use crate::{TimelineInterval, TimelineItem};

/// Số ngày của tháng (đếm từ 0). Tháng vượt quá 12 được chuyển sang
/// năm sau.
pub fn days_in_month(year: i32, month0: u32) -> u32 {
    let year = year + (month0 / 12) as i32;
    let month = month0 % 12 + 1;

    let first = NaiveDate::from_ymd_opt(year, month, 1);
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };

    match (first, next) {
        (Some(first), Some(next)) => (next - first).num_days() as u32,
        _ => 0,
    }
}

/// Số ngày lịch trong `start..=end`. Khoảng một ngày dài 1 ngày.
pub fn duration_in_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

/// Đúng trừ khi một khoảng kết thúc hẳn trước khi khoảng kia bắt đầu.
/// Hai khoảng chung một đầu mút được coi là chồng lấn.
pub fn date_ranges_overlap(
    start1: NaiveDate,
    end1: NaiveDate,
    start2: NaiveDate,
    end2: NaiveDate,
) -> bool {
    !(end1 < start2 || start1 > end2)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum EdgeKind {
    // Kết thúc xếp trước bắt đầu khi cùng ngày.
    End,
    Start,
}

/// Số mục đồng thời lớn nhất. Không nhỏ hơn 1.
pub fn max_overlap_cardinality(items: &[TimelineItem]) -> usize {
    let mut edges: Vec<(NaiveDate, EdgeKind)> = items
        .iter()
        .flat_map(|item| {
            [
                (item.start_date, EdgeKind::Start),
                (item.end_date, EdgeKind::End),
            ]
        })
        .collect();

    edges.sort_by(|a, b| match a.0.cmp(&b.0) {
        Ordering::Equal => a.1.cmp(&b.1),
        other => other,
    });

    let mut active: i64 = 0;
    let mut peak: i64 = 0;
    for (_, kind) in edges {
        match kind {
            EdgeKind::Start => active += 1,
            EdgeKind::End => active -= 1,
        }
        peak = peak.max(active);
    }

    peak.max(1) as usize
}

/// Các năm và tháng bắt đầu mà `items` trải qua; rỗng thì lấy năm hiện
/// tại theo giờ địa phương.
pub fn display_interval(items: &[TimelineItem]) -> TimelineInterval {
    display_interval_at(items, Local::now().year())
}

/// Như [`display_interval`] nhưng truyền năm dự phòng.
pub fn display_interval_at(items: &[TimelineItem], current_year: i32) -> TimelineInterval {
    interval_of(items, current_year)
}

pub(crate) fn interval_of<'a>(
    items: impl IntoIterator<Item = &'a TimelineItem>,
    current_year: i32,
) -> TimelineInterval {
    let mut items = items.into_iter();
    let Some(first) = items.next() else {
        return TimelineInterval {
            years: vec![current_year],
            start_month: 0,
        };
    };

    // So sánh chặt: giữ mục xuất hiện đầu tiên khi bằng nhau.
    let mut earliest = first;
    let mut latest = first;
    for item in items {
        if item.start_date < earliest.start_date {
            earliest = item;
        }
        if item.end_date > latest.end_date {
            latest = item;
        }
    }

    let first_year = earliest.start_date.year();
    let last_year = latest.end_date.year().max(first_year);

    TimelineInterval {
        years: (first_year..=last_year).collect(),
        start_month: earliest.start_date.month0(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn item(id: &str, start: NaiveDate, end: NaiveDate) -> TimelineItem {
        TimelineItem::new(id, id, start, end)
    }

    #[test]
    fn february_respects_leap_years() {
        assert_eq!(days_in_month(2024, 1), 29);
        assert_eq!(days_in_month(2023, 1), 28);
        assert_eq!(days_in_month(1900, 1), 28);
        assert_eq!(days_in_month(2000, 1), 29);
        assert_eq!(days_in_month(2024, 11), 31);
    }

    #[test]
    fn month_index_rolls_over() {
        assert_eq!(days_in_month(2023, 13), days_in_month(2024, 1));
    }

    #[test]
    fn duration_counts_both_endpoints() {
        assert_eq!(duration_in_days(date(2024, 1, 1), date(2024, 1, 1)), 1);
        assert_eq!(duration_in_days(date(2024, 1, 1), date(2024, 12, 31)), 366);
    }

    #[test]
    fn shared_endpoint_overlaps() {
        assert!(date_ranges_overlap(
            date(2024, 1, 1),
            date(2024, 1, 5),
            date(2024, 1, 5),
            date(2024, 1, 9)
        ));
        assert!(!date_ranges_overlap(
            date(2024, 1, 1),
            date(2024, 1, 5),
            date(2024, 1, 6),
            date(2024, 1, 9)
        ));
    }

    #[test]
    fn overlap_is_symmetric() {
        let days: Vec<NaiveDate> = (1..=6).map(|d| date(2024, 3, d)).collect();
        for &s1 in &days {
            for &e1 in days.iter().filter(|e| **e >= s1) {
                for &s2 in &days {
                    for &e2 in days.iter().filter(|e| **e >= s2) {
                        assert_eq!(
                            date_ranges_overlap(s1, e1, s2, e2),
                            date_ranges_overlap(s2, e2, s1, e1)
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn empty_cardinality_is_one() {
        assert_eq!(max_overlap_cardinality(&[]), 1);
    }

    #[test]
    fn overlapping_pair_has_cardinality_two() {
        let items = [
            item("a", date(2024, 1, 1), date(2024, 1, 10)),
            item("b", date(2024, 1, 5), date(2024, 1, 15)),
        ];
        assert_eq!(max_overlap_cardinality(&items), 2);
    }

    #[test]
    fn adjacent_items_do_not_stack() {
        let items = [
            item("a", date(2024, 1, 1), date(2024, 1, 5)),
            item("b", date(2024, 1, 6), date(2024, 1, 10)),
        ];
        assert_eq!(max_overlap_cardinality(&items), 1);
    }

    #[test]
    fn same_day_end_and_start_is_not_concurrent() {
        let items = [
            item("a", date(2024, 1, 1), date(2024, 1, 5)),
            item("b", date(2024, 1, 5), date(2024, 1, 10)),
        ];
        assert_eq!(max_overlap_cardinality(&items), 1);
    }

    #[test]
    fn nested_ranges_accumulate() {
        let items = [
            item("a", date(2024, 1, 1), date(2024, 3, 1)),
            item("b", date(2024, 1, 10), date(2024, 2, 1)),
            item("c", date(2024, 1, 20), date(2024, 1, 25)),
            item("d", date(2024, 2, 10), date(2024, 2, 20)),
        ];
        assert_eq!(max_overlap_cardinality(&items), 3);
    }

    #[test]
    fn empty_interval_falls_back_to_current_year() {
        let interval = display_interval_at(&[], 2026);
        assert_eq!(interval.years, vec![2026]);
        assert_eq!(interval.start_month, 0);

        let live = display_interval(&[]);
        assert_eq!(live.years, vec![Local::now().year()]);
    }

    #[test]
    fn interval_fills_intermediate_years() {
        let items = [
            item("late", date(2025, 2, 1), date(2026, 8, 1)),
            item("early", date(2022, 4, 15), date(2022, 5, 1)),
        ];
        let interval = display_interval_at(&items, 2000);
        assert_eq!(interval.years, vec![2022, 2023, 2024, 2025, 2026]);
        assert_eq!(interval.start_month, 3);
    }
}
