//! Chia mục thành nhóm theo một trường được khai báo kiểu.

use std::str::FromStr;

use serde_json::Value;

use crate::{TimelineError, TimelineGroup, TimelineItem};

/// Tên nhóm cho các mục thiếu trường dùng để nhóm.
pub const UNGROUPED: &str = "Ungrouped";

/// Trường dùng để nhóm hoặc gắn nhãn mục.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldAccessor {
    Id,
    Name,
    Extension(String),
}

impl FieldAccessor {
    pub fn key(&self, item: &TimelineItem) -> String {
        match self {
            FieldAccessor::Id => item.id.clone(),
            FieldAccessor::Name => item.name.clone(),
            FieldAccessor::Extension(field) => match item.extra.get(field) {
                None | Some(Value::Null) => UNGROUPED.to_string(),
                Some(Value::String(text)) => text.clone(),
                Some(other) => other.to_string(),
            },
        }
    }
}

impl FromStr for FieldAccessor {
    type Err = TimelineError;

    fn from_str(field: &str) -> Result<Self, Self::Err> {
        let field = field.trim();
        match field {
            "" => Err(TimelineError::Parse("tên trường rỗng".to_string())),
            "id" => Ok(FieldAccessor::Id),
            "name" => Ok(FieldAccessor::Name),
            other => Ok(FieldAccessor::Extension(other.to_string())),
        }
    }
}

/// Chia `items` theo `key`. Nhóm giữ thứ tự khoá xuất hiện lần đầu; mục
/// trong nhóm giữ thứ tự đầu vào.
pub fn group_items<F>(items: Vec<TimelineItem>, key: F) -> Vec<TimelineGroup>
where
    F: Fn(&TimelineItem) -> String,
{
    let mut groups: Vec<TimelineGroup> = Vec::new();
    for item in items {
        let title = key(&item);
        match groups.iter_mut().find(|group| group.title == title) {
            Some(group) => group.items.push(item),
            None => groups.push(TimelineGroup::new(title, vec![item])),
        }
    }
    groups
}
