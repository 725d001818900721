use std::{fs, path::Path};

use anyhow::{ensure, Context, Result};
use gaius_core::Coordinate;
use gaius_system_builder::{BuilderInput, Hotkey};
use gaius_system_camera::{CameraInput, ZoomKey};
use glam::Vec2;
use serde::Deserialize;

const DEFAULT_FRAME_SECONDS: f32 = 1.0 / 60.0;

/// One recorded frame of pointer, hotkey and camera input.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Frame {
    #[serde(default)]
    cursor: Option<[i32; 2]>,
    #[serde(default)]
    confirm: bool,
    #[serde(default)]
    hotkey: Option<Hotkey>,
    #[serde(default)]
    pan: Option<[f32; 2]>,
    #[serde(default)]
    scroll: f32,
    #[serde(default)]
    zoom: Option<ZoomDirection>,
    #[serde(default)]
    dt: Option<f32>,
    #[serde(default)]
    toggle_overlay: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ZoomDirection {
    In,
    Out,
}

impl Frame {
    pub(crate) fn builder_input(&self) -> BuilderInput {
        BuilderInput::new(
            self.cursor.map(|[x, z]| Coordinate::new(x, z)),
            self.confirm,
            self.hotkey,
        )
    }

    pub(crate) fn camera_input(&self) -> CameraInput {
        CameraInput {
            axis: self.pan.map_or(Vec2::ZERO, Vec2::from),
            scroll: self.scroll,
            zoom_key: self.zoom.map(|zoom| match zoom {
                ZoomDirection::In => ZoomKey::In,
                ZoomDirection::Out => ZoomKey::Out,
            }),
            ..CameraInput::default()
        }
    }

    pub(crate) fn seconds(&self) -> f32 {
        self.dt.unwrap_or(DEFAULT_FRAME_SECONDS)
    }

    /// Whether the debug overlay key was pressed on this frame.
    pub(crate) fn toggles_overlay(&self) -> bool {
        self.toggle_overlay
    }
}

/// Reads a JSON array of frames from `path`.
pub(crate) fn load(path: &Path) -> Result<Vec<Frame>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read script {}", path.display()))?;
    parse(&text).with_context(|| format!("failed to parse script {}", path.display()))
}

fn parse(text: &str) -> Result<Vec<Frame>> {
    let frames: Vec<Frame> = serde_json::from_str(text)?;
    for (index, frame) in frames.iter().enumerate() {
        if let Some(dt) = frame.dt {
            ensure!(
                dt.is_finite() && dt > 0.0,
                "frame {index} has non-positive duration {dt}"
            );
        }
    }
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_default_missing_fields() {
        let frames = parse(r#"[{ "cursor": [2, 3], "hotkey": "Z" }, { "confirm": true }]"#)
            .expect("valid script");

        assert_eq!(frames.len(), 2);
        assert_eq!(
            frames[0].builder_input(),
            BuilderInput::new(Some(Coordinate::new(2, 3)), false, Some(Hotkey::Z))
        );
        assert_eq!(frames[1].builder_input(), BuilderInput::new(None, true, None));
        assert!((frames[1].seconds() - DEFAULT_FRAME_SECONDS).abs() < f32::EPSILON);
    }

    #[test]
    fn camera_fields_map_to_rig_input() {
        let frames = parse(r#"[{ "pan": [1.0, -0.5], "scroll": 0.25, "zoom": "out", "dt": 0.5 }]"#)
            .expect("valid script");

        let input = frames[0].camera_input();
        assert_eq!(input.axis, Vec2::new(1.0, -0.5));
        assert_eq!(input.zoom_key, Some(ZoomKey::Out));
        assert!((frames[0].seconds() - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn non_positive_durations_are_rejected() {
        for script in [
            r#"[{ "dt": -0.5, "pan": [1.0, 0.0] }]"#,
            r#"[{ "confirm": true }, { "dt": 0.0 }]"#,
        ] {
            assert!(parse(script).is_err(), "script accepted: {script}");
        }
        assert!(parse(r#"[{ "dt": 0.25 }]"#).is_ok());
    }

    #[test]
    fn overlay_toggle_defaults_off() {
        let frames = parse(r#"[{}, { "toggle_overlay": true }]"#).expect("valid script");
        assert!(!frames[0].toggles_overlay());
        assert!(frames[1].toggles_overlay());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(parse(r#"[{ "cursr": [0, 0] }]"#).is_err());
    }
}
