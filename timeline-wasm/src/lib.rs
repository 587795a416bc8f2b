//! Cầu nối WASM <-> JavaScript, không phụ thuộc framework giao diện.

use serde::Deserialize;
use serde_wasm_bindgen::{from_value, to_value};
use timeline_core::{
    step_zoom, ScrollMetrics, TimelineConfig, TimelineConfigPatch, TimelineError, ZoomAnchor,
    ZoomDirection, ZoomLevel, ZoomTracker,
};
use wasm_bindgen::prelude::*;

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct JsLayoutOptions {
    #[serde(default)]
    group_by: Option<String>,
    #[serde(default)]
    zoom: Option<String>,
    #[serde(flatten)]
    config: TimelineConfigPatch,
}

impl JsLayoutOptions {
    fn into_config(self) -> Result<(TimelineConfig, Option<String>), TimelineError> {
        let mut config = TimelineConfig::from(self.config);
        if let Some(zoom) = self.zoom.as_deref() {
            config.apply_zoom(zoom)?;
        }
        Ok((config, self.group_by))
    }
}

/// Dàn trang dataset (mảng mục hoặc `{ items, groupBy }`).
#[wasm_bindgen(js_name = layoutTimeline)]
pub fn layout_timeline(dataset: JsValue, options: Option<JsValue>) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let dataset_value = from_value::<serde_json::Value>(dataset)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được JSON dataset: {err}")))?;

    let options = match options {
        Some(js_options) => from_value::<JsLayoutOptions>(js_options)
            .map_err(|err| JsValue::from_str(&format!("Không đọc được tùy chọn: {err}")))?,
        None => JsLayoutOptions::default(),
    };

    let (config, group_by) = options
        .into_config()
        .map_err(|err| JsValue::from_str(&format_timeline_error(err)))?;

    let layout =
        timeline_dataset::layout_dataset_value(&dataset_value, group_by.as_deref(), &config)
            .map_err(|err| JsValue::from_str(&format_timeline_error(err)))?;

    to_value(&layout)
        .map_err(|err| JsValue::from_str(&format!("Không serialize được layout: {err}")))
}

/// Giữ vị trí cuộn ổn định khi một timeline đổi zoom.
#[wasm_bindgen]
pub struct ZoomController {
    tracker: ZoomTracker,
    levels: Vec<ZoomLevel>,
}

#[wasm_bindgen]
impl ZoomController {
    #[wasm_bindgen(constructor)]
    pub fn new(anchor_center: bool) -> ZoomController {
        let anchor = if anchor_center {
            ZoomAnchor::Center
        } else {
            ZoomAnchor::Left
        };
        ZoomController {
            tracker: ZoomTracker::new(anchor),
            levels: ZoomLevel::defaults(),
        }
    }

    /// Gọi sau mỗi lần render với kích thước hiện tại của khung chứa.
    /// Trả vị trí cuộn cần đặt nếu zoom đã đổi.
    pub fn observe(
        &mut self,
        day_width: f64,
        scroll_left: f64,
        scroll_width: f64,
        client_width: f64,
    ) -> Option<f64> {
        self.tracker.observe(
            day_width,
            ScrollMetrics {
                scroll_left,
                scroll_width,
                client_width,
            },
        )
    }

    /// `day_width` của mức zoom kế tiếp so với giá trị quan sát gần nhất.
    pub fn step(&self, zoom_in: bool) -> Option<f64> {
        let direction = if zoom_in {
            ZoomDirection::In
        } else {
            ZoomDirection::Out
        };
        step_zoom(&self.levels, self.tracker.previous()?, direction)
    }

    pub fn reset(&mut self) {
        self.tracker.reset();
    }
}

fn format_timeline_error(err: TimelineError) -> String {
    format!("Timeline error: {err}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_merge_zoom_and_overrides() {
        let options: JsLayoutOptions = serde_json::from_str(
            r#"{"groupBy": "team", "zoom": "week", "cell_height": 40}"#,
        )
        .unwrap();
        let (config, group_by) = options.into_config().unwrap();
        assert_eq!(group_by.as_deref(), Some("team"));
        assert_eq!(config.day_width, 12.0);
        assert_eq!(config.cell_height, 40.0);
    }

    #[test]
    fn options_accept_camel_case_config_keys() {
        let options: JsLayoutOptions = serde_json::from_str(
            r#"{"groupBy": "team", "cellHeight": 40, "dayWidth": 3, "sidebarWidth": 0}"#,
        )
        .unwrap();
        let (config, group_by) = options.into_config().unwrap();
        assert_eq!(group_by.as_deref(), Some("team"));
        assert_eq!(config.cell_height, 40.0);
        assert_eq!(config.day_width, 3.0);
        assert_eq!(config.sidebar_width, 0.0);
    }

    #[test]
    fn unknown_zoom_is_reported() {
        let options: JsLayoutOptions = serde_json::from_str(r#"{"zoom": "decade"}"#).unwrap();
        let err = options.into_config().unwrap_err();
        assert_eq!(
            format_timeline_error(err),
            "Timeline error: Không có mức zoom: decade"
        );
    }

    #[test]
    fn controller_tracks_its_own_zoom() {
        let mut controller = ZoomController::new(false);
        assert_eq!(controller.observe(10.0, 100.0, 5000.0, 500.0), None);
        assert_eq!(controller.observe(20.0, 100.0, 5000.0, 500.0), Some(200.0));
        controller.reset();
        assert_eq!(controller.observe(40.0, 100.0, 5000.0, 500.0), None);
    }

    #[test]
    fn controller_ignores_nan_width() {
        let mut controller = ZoomController::new(true);
        assert_eq!(controller.observe(10.0, 100.0, 5000.0, 500.0), None);
        assert_eq!(controller.observe(f64::NAN, 100.0, 5000.0, 500.0), None);
        assert_eq!(controller.observe(20.0, 100.0, 5000.0, 500.0), Some(450.0));
    }

    #[test]
    fn controller_steps_between_presets() {
        let mut controller = ZoomController::new(false);
        assert_eq!(controller.step(true), None);

        controller.observe(12.0, 0.0, 5000.0, 500.0);
        assert_eq!(controller.step(true), Some(40.0));
        assert_eq!(controller.step(false), Some(4.0));

        controller.observe(0.5, 0.0, 5000.0, 500.0);
        assert_eq!(controller.step(false), None);
    }
}
