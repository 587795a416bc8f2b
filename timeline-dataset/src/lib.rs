//! JSON dataset to [`TimelineLayout`] converter.
//!
//! Accepts either a bare array of items or an object carrying an `items`
//! array and an optional `groupBy` field name.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, NaiveDate};
use serde_json::{Map, Value};
use timeline_core::{
    group_items, layout_groups, FieldAccessor, TimelineConfig, TimelineError, TimelineGroup,
    TimelineItem, TimelineLayout,
};
use tracing::{debug, info};

/// Title of the single group used when no grouping field is given.
pub const DEFAULT_GROUP: &str = "All";

const ID_FIELDS: &[&str] = &["id", "key"];
const NAME_FIELDS: &[&str] = &["name", "title", "label"];
const START_FIELDS: &[&str] = &["startDate", "start_date", "start"];
const END_FIELDS: &[&str] = &["endDate", "end_date", "end"];

/// Validated items plus the grouping field named by the document, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub items: Vec<TimelineItem>,
    pub group_by: Option<String>,
}

impl Dataset {
    /// Split the items into groups. `None` puts everything in one group.
    pub fn group(self, accessor: Option<&FieldAccessor>) -> Vec<TimelineGroup> {
        match accessor {
            Some(accessor) => group_items(self.items, |item| accessor.key(item)),
            None => vec![TimelineGroup::new(DEFAULT_GROUP, self.items)],
        }
    }
}

/// Parse a dataset from a JSON string.
pub fn parse_dataset_str(dataset_json: &str) -> Result<Dataset, TimelineError> {
    let value: Value =
        serde_json::from_str(dataset_json).map_err(|err| TimelineError::Parse(err.to_string()))?;
    parse_dataset_value(&value)
}

/// Parse a dataset from a `serde_json::Value`.
pub fn parse_dataset_value(document: &Value) -> Result<Dataset, TimelineError> {
    let (entries, group_by) = match document {
        Value::Array(entries) => (entries, None),
        Value::Object(obj) => {
            let entries = obj
                .get("items")
                .and_then(Value::as_array)
                .ok_or(TimelineError::MissingData)?;
            let group_by = obj
                .get("groupBy")
                .or_else(|| obj.get("group_by"))
                .and_then(Value::as_str)
                .map(str::to_string);
            (entries, group_by)
        }
        _ => {
            return Err(TimelineError::Parse(
                "Cần một mảng mục hoặc một object có mảng items".to_string(),
            ))
        }
    };

    let mut seen = HashSet::with_capacity(entries.len());
    let mut items = Vec::with_capacity(entries.len());

    for (index, entry) in entries.iter().enumerate() {
        let item = parse_item(entry, index)?;
        if item.start_date > item.end_date {
            return Err(TimelineError::InvalidRange { id: item.id });
        }
        if !seen.insert(item.id.clone()) {
            return Err(TimelineError::DuplicateId(item.id));
        }
        items.push(item);
    }

    debug!(items = items.len(), group_by = ?group_by, "parsed dataset");
    Ok(Dataset { items, group_by })
}

/// Parse and lay out a dataset from a JSON string.
///
/// `group_by` overrides the field named inside the document.
pub fn layout_dataset_str(
    dataset_json: &str,
    group_by: Option<&str>,
    config: &TimelineConfig,
) -> Result<TimelineLayout, TimelineError> {
    let value: Value =
        serde_json::from_str(dataset_json).map_err(|err| TimelineError::Parse(err.to_string()))?;
    layout_dataset_value(&value, group_by, config)
}

/// Parse and lay out a dataset from a `serde_json::Value`.
pub fn layout_dataset_value(
    document: &Value,
    group_by: Option<&str>,
    config: &TimelineConfig,
) -> Result<TimelineLayout, TimelineError> {
    config.validate()?;

    let dataset = parse_dataset_value(document)?;
    let accessor = group_by
        .map(str::to_string)
        .or_else(|| dataset.group_by.clone())
        .map(|field| field.parse::<FieldAccessor>())
        .transpose()?;

    let groups = dataset.group(accessor.as_ref());
    let layout = layout_groups(&groups, config);

    info!(
        groups = layout.groups.len(),
        items = layout.item_count(),
        canvas_width = layout.canvas_width,
        canvas_height = layout.canvas_height,
        "timeline layout ready"
    );
    Ok(layout)
}

fn parse_item(entry: &Value, index: usize) -> Result<TimelineItem, TimelineError> {
    let obj = entry
        .as_object()
        .ok_or_else(|| TimelineError::Parse(format!("Mục #{index} không phải object")))?;

    let id = first_field(obj, ID_FIELDS)
        .and_then(scalar_text)
        .ok_or_else(|| TimelineError::Parse(format!("Mục #{index} không có id")))?;

    let name = first_field(obj, NAME_FIELDS)
        .and_then(scalar_text)
        .unwrap_or_else(|| id.clone());

    let period = obj.get("period").and_then(Value::as_object);
    let start_date = extract_date(obj, START_FIELDS)
        .or_else(|| period.and_then(|period| extract_date(period, &["start"])))
        .ok_or_else(|| TimelineError::Parse(format!("Mục {id} thiếu ngày bắt đầu hợp lệ")))?;
    let end_date = extract_date(obj, END_FIELDS)
        .or_else(|| period.and_then(|period| extract_date(period, &["end"])))
        .ok_or_else(|| TimelineError::Parse(format!("Mục {id} thiếu ngày kết thúc hợp lệ")))?;

    let progress = obj.get("progress").and_then(Value::as_f64);

    let known: HashSet<&str> = ID_FIELDS
        .iter()
        .chain(NAME_FIELDS)
        .chain(START_FIELDS)
        .chain(END_FIELDS)
        .chain(&["period", "progress"])
        .copied()
        .collect();
    let extra: BTreeMap<String, Value> = obj
        .iter()
        .filter(|(key, _)| !known.contains(key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Ok(TimelineItem {
        id,
        name,
        start_date,
        end_date,
        progress,
        extra,
    })
}

fn first_field<'a>(obj: &'a Map<String, Value>, fields: &[&str]) -> Option<&'a Value> {
    fields.iter().find_map(|field| obj.get(*field))
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn extract_date(obj: &Map<String, Value>, fields: &[&str]) -> Option<NaiveDate> {
    fields
        .iter()
        .filter_map(|field| obj.get(*field).and_then(Value::as_str))
        .find_map(parse_date)
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .map(|dt| dt.date_naive())
                .ok()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_bare_array() {
        let dataset = parse_dataset_value(&json!([
            {"id": "a", "name": "Alpha", "startDate": "2024-01-01", "endDate": "2024-01-03"}
        ]))
        .unwrap();
        assert_eq!(dataset.items.len(), 1);
        assert_eq!(dataset.group_by, None);
    }

    #[test]
    fn reads_period_and_rfc3339_dates() {
        let dataset = parse_dataset_value(&json!({
            "items": [
                {
                    "id": 7,
                    "title": "Launch",
                    "period": {"start": "2024-03-01T08:00:00+07:00", "end": "2024-03-02"}
                }
            ]
        }))
        .unwrap();
        let item = &dataset.items[0];
        assert_eq!(item.id, "7");
        assert_eq!(item.name, "Launch");
        assert_eq!(
            item.start_date,
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
        assert!(item.extra.is_empty());
    }

    #[test]
    fn keeps_unknown_fields_as_extensions() {
        let dataset = parse_dataset_value(&json!([
            {"id": "a", "start": "2024-01-01", "end": "2024-01-02", "team": "web", "progress": 30}
        ]))
        .unwrap();
        let item = &dataset.items[0];
        assert_eq!(item.name, "a");
        assert_eq!(item.progress, Some(30.0));
        assert_eq!(item.extra.get("team"), Some(&json!("web")));
        assert_eq!(item.extra.len(), 1);
    }

    #[test]
    fn rejects_reversed_range() {
        let err = parse_dataset_value(&json!([
            {"id": "a", "startDate": "2024-02-01", "endDate": "2024-01-01"}
        ]))
        .unwrap_err();
        assert!(matches!(err, TimelineError::InvalidRange { id } if id == "a"));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = parse_dataset_value(&json!([
            {"id": "a", "startDate": "2024-01-01", "endDate": "2024-01-02"},
            {"id": "a", "startDate": "2024-01-03", "endDate": "2024-01-04"}
        ]))
        .unwrap_err();
        assert!(matches!(err, TimelineError::DuplicateId(id) if id == "a"));
    }

    #[test]
    fn rejects_missing_dates_and_items() {
        assert!(matches!(
            parse_dataset_value(&json!([{"id": "a", "startDate": "soon"}])),
            Err(TimelineError::Parse(_))
        ));
        assert!(matches!(
            parse_dataset_value(&json!({"groupBy": "team"})),
            Err(TimelineError::MissingData)
        ));
        assert!(matches!(
            parse_dataset_str("not json"),
            Err(TimelineError::Parse(_))
        ));
    }

    #[test]
    fn argument_overrides_document_grouping() {
        let document = json!({
            "groupBy": "team",
            "items": [
                {"id": "a", "startDate": "2024-01-01", "endDate": "2024-01-02",
                 "team": "web", "owner": "kim"},
                {"id": "b", "startDate": "2024-01-01", "endDate": "2024-01-02",
                 "team": "api", "owner": "kim"}
            ]
        });
        let config = TimelineConfig::default();

        let by_team = layout_dataset_value(&document, None, &config).unwrap();
        assert_eq!(by_team.groups.len(), 2);

        let by_owner = layout_dataset_value(&document, Some("owner"), &config).unwrap();
        assert_eq!(by_owner.groups.len(), 1);
        assert_eq!(by_owner.groups[0].title, "kim");
        assert_eq!(by_owner.groups[0].columns, 2);
    }

    #[test]
    fn ungrouped_dataset_uses_single_group() {
        let layout = layout_dataset_str(
            r#"[{"id": "a", "startDate": "2024-01-01", "endDate": "2024-01-02"}]"#,
            None,
            &TimelineConfig::default(),
        )
        .unwrap();
        assert_eq!(layout.groups.len(), 1);
        assert_eq!(layout.groups[0].title, DEFAULT_GROUP);
    }

    #[test]
    fn invalid_config_is_rejected_before_parsing() {
        let config = TimelineConfig {
            day_width: -1.0,
            ..TimelineConfig::default()
        };
        assert!(matches!(
            layout_dataset_str("[]", None, &config),
            Err(TimelineError::InvalidConfig(_))
        ));
    }
}
