#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frame statistics and call log collected for the debug overlay.

mod call_log;

use std::collections::VecDeque;

use serde::Serialize;

pub use call_log::{CallLog, CallLogLayer, CALL_LOG_LEN};

/// Number of samples retained per history.
pub const HISTORY_LEN: usize = 60;

/// Colour band the overlay uses for a statistic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    /// Healthy.
    Green,
    /// Degraded.
    Yellow,
    /// Poor.
    Red,
}

impl Band {
    /// Band for a frames-per-second reading.
    #[must_use]
    pub const fn for_fps(fps: u32) -> Self {
        if fps < 30 {
            Self::Red
        } else if fps < 60 {
            Self::Yellow
        } else {
            Self::Green
        }
    }

    /// Band for a frame time reading in milliseconds.
    #[must_use]
    pub const fn for_frame_ms(frame_ms: u32) -> Self {
        if frame_ms > 32 {
            Self::Red
        } else if frame_ms > 16 {
            Self::Yellow
        } else {
            Self::Green
        }
    }

    /// Overlay colour name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Red => "red",
        }
    }
}

/// Rolling history of one statistic plus its session extremes.
#[derive(Clone, Debug, Default)]
pub struct SampleHistory {
    samples: VecDeque<u32>,
    current: Option<u32>,
    min: Option<u32>,
    max: Option<u32>,
}

impl SampleHistory {
    /// Records a sample, evicting the oldest once the history is full.
    pub fn push(&mut self, sample: u32) {
        self.current = Some(sample);
        self.min = Some(self.min.map_or(sample, |min| min.min(sample)));
        self.max = Some(self.max.map_or(sample, |max| max.max(sample)));

        if self.samples.len() == HISTORY_LEN {
            let _ = self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Most recent sample.
    #[must_use]
    pub const fn current(&self) -> Option<u32> {
        self.current
    }

    /// Lowest sample of the session.
    #[must_use]
    pub const fn min(&self) -> Option<u32> {
        self.min
    }

    /// Highest sample of the session.
    #[must_use]
    pub const fn max(&self) -> Option<u32> {
        self.max
    }

    /// Integer mean of the retained positive samples.
    #[must_use]
    pub fn average(&self) -> Option<u32> {
        let (sum, count) = self
            .samples
            .iter()
            .filter(|sample| **sample > 0)
            .fold((0_u64, 0_u64), |(sum, count), sample| {
                (sum + u64::from(*sample), count + 1)
            });
        if count == 0 {
            return None;
        }
        u32::try_from(sum / count).ok()
    }

    /// Retained samples, oldest first.
    pub fn samples(&self) -> impl Iterator<Item = u32> + '_ {
        self.samples.iter().copied()
    }
}

/// Serializable view of the profiler state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProfilerSummary {
    /// Latest frames per second.
    pub fps: Option<u32>,
    /// Session minimum frames per second.
    pub min_fps: Option<u32>,
    /// Session maximum frames per second.
    pub max_fps: Option<u32>,
    /// Mean frames per second over the history.
    pub avg_fps: Option<u32>,
    /// Band of the latest frames per second.
    pub fps_band: Option<Band>,
    /// Latest frame time in milliseconds.
    pub frame_ms: Option<u32>,
    /// Session minimum frame time.
    pub min_frame_ms: Option<u32>,
    /// Session maximum frame time.
    pub max_frame_ms: Option<u32>,
    /// Mean frame time over the history.
    pub avg_frame_ms: Option<u32>,
    /// Band of the latest frame time.
    pub frame_ms_band: Option<Band>,
}

/// Host-supplied descriptions substituted into the overlay template.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OverlayContext {
    /// Description of the selected cell.
    pub grid_selected: String,
    /// Description of the hovered cell.
    pub grid_hovered: String,
    /// Description of the camera rig.
    pub camera: String,
    /// Name of whatever the pointer ray last hit.
    pub raycast_hit: String,
}

/// Collects frame statistics for the debug overlay.
#[derive(Clone, Debug)]
pub struct Profiler {
    enabled: bool,
    fps: SampleHistory,
    frame_ms: SampleHistory,
}

impl Default for Profiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Profiler {
    /// Creates an enabled profiler with empty histories.
    #[must_use]
    pub fn new() -> Self {
        Self {
            enabled: true,
            fps: SampleHistory::default(),
            frame_ms: SampleHistory::default(),
        }
    }

    /// Whether the overlay is shown and frames are sampled.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Shows or hides the overlay.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Flips the overlay on or off, returning the new state.
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        self.enabled
    }

    /// Records one frame that took `dt` seconds.
    ///
    /// Ignored while the overlay is hidden. Non-positive durations carry no
    /// information and are ignored as well.
    pub fn record_frame(&mut self, dt: f32) {
        if !self.enabled || dt <= 0.0 || !dt.is_finite() {
            return;
        }
        self.fps.push(truncate(1.0 / dt));
        self.frame_ms.push(truncate(dt * 1000.0));
    }

    /// Frames-per-second history.
    #[must_use]
    pub const fn fps(&self) -> &SampleHistory {
        &self.fps
    }

    /// Frame time history in milliseconds.
    #[must_use]
    pub const fn frame_ms(&self) -> &SampleHistory {
        &self.frame_ms
    }

    /// Snapshot of every statistic.
    #[must_use]
    pub fn summary(&self) -> ProfilerSummary {
        ProfilerSummary {
            fps: self.fps.current(),
            min_fps: self.fps.min(),
            max_fps: self.fps.max(),
            avg_fps: self.fps.average(),
            fps_band: self.fps.current().map(Band::for_fps),
            frame_ms: self.frame_ms.current(),
            min_frame_ms: self.frame_ms.min(),
            max_frame_ms: self.frame_ms.max(),
            avg_frame_ms: self.frame_ms.average(),
            frame_ms_band: self.frame_ms.current().map(Band::for_frame_ms),
        }
    }

    /// Substitutes `{placeholder}` tokens in `template`.
    ///
    /// Unset statistics render as `-1`, matching the overlay's convention for
    /// missing readings.
    #[must_use]
    pub fn format(&self, template: &str, context: &OverlayContext) -> String {
        let summary = self.summary();
        let fps = summary.fps.map_or(-1, i64::from);
        let frame_ms = summary.frame_ms.map_or(-1, i64::from);
        let replacements = [
            ("{minFPS}", render(summary.min_fps)),
            ("{maxFPS}", render(summary.max_fps)),
            ("{avgFPS}", render(summary.avg_fps)),
            ("{fps}", format!("{fps:<6}")),
            (
                "{fpsColor}",
                summary.fps_band.unwrap_or(Band::Red).as_str().to_owned(),
            ),
            ("{minFrameTime}", render(summary.min_frame_ms)),
            ("{maxFrameTime}", render(summary.max_frame_ms)),
            ("{avgFrameTime}", render(summary.avg_frame_ms)),
            ("{frameTime}", format!("{:<6}", format!("{frame_ms}ms"))),
            (
                "{frameTimeColor}",
                summary
                    .frame_ms_band
                    .unwrap_or(Band::Green)
                    .as_str()
                    .to_owned(),
            ),
            ("{gridSelected}", context.grid_selected.clone()),
            ("{gridHovered}", context.grid_hovered.clone()),
            ("{camera}", context.camera.clone()),
            ("{raycastHit}", context.raycast_hit.clone()),
        ];

        replacements
            .iter()
            .fold(template.to_owned(), |text, (token, value)| {
                text.replace(token, value)
            })
    }

    /// Overlay text, or `None` while the overlay is hidden.
    #[must_use]
    pub fn overlay(&self, template: &str, context: &OverlayContext) -> Option<String> {
        self.enabled.then(|| self.format(template, context))
    }
}

fn truncate(value: f32) -> u32 {
    // Saturating float to int conversion.
    value as u32
}

fn render(value: Option<u32>) -> String {
    value.map_or_else(|| "-1".to_owned(), |value| value.to_string())
}
