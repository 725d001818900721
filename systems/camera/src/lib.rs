#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Camera rig system: keyboard panning, drag panning and clamped zoom.
//!
//! The rig only computes where the camera should be; the host applies the
//! resulting position and field of view to its own camera.

use glam::{Vec2, Vec3};

/// Zoom at which panning runs at the configured base speed.
const REFERENCE_ZOOM: f32 = 45.0;
/// Fraction of a key press applied to the zoom per frame.
const ZOOM_KEY_STEP: f32 = 0.5;
/// Rate at which the field of view converges on the zoom.
const FIELD_OF_VIEW_EASING: f32 = 5.0;

/// Tunable parameters of the camera rig.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraConfig {
    /// Base speed of drag panning.
    pub drag_speed: f32,
    /// Base speed of keyboard panning.
    pub key_speed: f32,
    /// Lowest reachable zoom.
    pub min_zoom: f32,
    /// Highest reachable zoom.
    pub max_zoom: f32,
    /// Zoom change per scroll unit.
    pub zoom_speed: f32,
    /// Zoom the rig starts with.
    pub initial_zoom: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            drag_speed: 2.4,
            key_speed: 30.0,
            min_zoom: 10.0,
            max_zoom: 60.0,
            zoom_speed: 20.0,
            initial_zoom: 30.0,
        }
    }
}

/// Direction of a discrete zoom key press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZoomKey {
    /// Narrows the view.
    In,
    /// Widens the view.
    Out,
}

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CameraInput {
    /// Horizontal and vertical pan axes in `-1.0..=1.0`.
    pub axis: Vec2,
    /// Whether the drag button went down on this frame.
    pub drag_started: bool,
    /// Whether the drag button is held on this frame.
    pub drag_held: bool,
    /// Pointer position in screen space.
    pub cursor: Vec2,
    /// Scroll wheel delta.
    pub scroll: f32,
    /// Zoom key pressed on this frame.
    pub zoom_key: Option<ZoomKey>,
}

/// Camera position and zoom state driven by per-frame input.
#[derive(Clone, Debug)]
pub struct CameraRig {
    config: CameraConfig,
    position: Vec3,
    zoom: f32,
    field_of_view: f32,
    drag_anchor: Option<Vec2>,
}

impl CameraRig {
    /// Creates a rig at `position` with the configured initial zoom.
    #[must_use]
    pub fn new(config: CameraConfig, position: Vec3) -> Self {
        let zoom = config.initial_zoom.clamp(config.min_zoom, config.max_zoom);
        Self {
            config,
            position,
            zoom,
            field_of_view: zoom,
            drag_anchor: None,
        }
    }

    /// Current camera position.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Target zoom.
    #[must_use]
    pub const fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Field of view easing towards the zoom.
    #[must_use]
    pub const fn field_of_view(&self) -> f32 {
        self.field_of_view
    }

    /// Advances the rig by one frame of `dt` seconds.
    pub fn update(&mut self, input: &CameraInput, dt: f32) {
        self.pan(input, dt);
        self.apply_zoom(input, dt);
    }

    /// Debug description used by the overlay.
    #[must_use]
    pub fn describe(&self) -> String {
        format!(
            "Zoom={}, x={:.1}, z={:.1}",
            self.zoom, self.position.x, self.position.z
        )
    }

    fn zoom_scaled(&self, speed: f32) -> f32 {
        speed * (self.zoom / REFERENCE_ZOOM)
    }

    fn pan(&mut self, input: &CameraInput, dt: f32) {
        let key_speed = self.zoom_scaled(self.config.key_speed) * dt;
        if input.axis != Vec2::ZERO {
            self.position += Vec3::new(input.axis.x * key_speed, 0.0, input.axis.y * key_speed);
        }

        let drag_speed = self.zoom_scaled(self.config.drag_speed) * dt;
        if input.drag_started {
            self.drag_anchor = Some(input.cursor);
        } else if input.drag_held {
            if let Some(anchor) = self.drag_anchor {
                let delta = input.cursor - anchor;
                self.position += Vec3::new(-delta.x * drag_speed, 0.0, -delta.y * drag_speed);
            }
            self.drag_anchor = Some(input.cursor);
        } else {
            self.drag_anchor = None;
        }
    }

    fn apply_zoom(&mut self, input: &CameraInput, dt: f32) {
        let (min, max) = (self.config.min_zoom, self.config.max_zoom);
        if input.scroll != 0.0 {
            self.zoom = (self.zoom - input.scroll * self.config.zoom_speed).clamp(min, max);
        }

        let step = match input.zoom_key {
            Some(ZoomKey::Out) => ZOOM_KEY_STEP,
            Some(ZoomKey::In) => -ZOOM_KEY_STEP,
            None => 0.0,
        };
        if step != 0.0 {
            self.zoom = (self.zoom + step * self.config.zoom_speed).clamp(min, max);
        }

        let t = (dt * FIELD_OF_VIEW_EASING).clamp(0.0, 1.0);
        self.field_of_view += (self.zoom - self.field_of_view) * t;
    }
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new(CameraConfig::default(), Vec3::ZERO)
    }
}
