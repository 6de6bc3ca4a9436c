//! Two-finger pinch-zoom and twist-rotate interpretation.
//!
//! The interpreter consumes touch frames (the set of currently active touch
//! points) and emits zoom and rotation values relative to a baseline taken
//! when the gesture started.
//!
//! # Gesture lifetime
//!
//! - A [`GestureSession`] starts on the frame where the touch count goes from
//!   fewer than two to exactly two. That frame only records baselines.
//! - Every later two-point frame emits values relative to those baselines.
//! - Frames with more than two points emit nothing but keep the session.
//! - Dropping below two points ends the session. Nothing carries over into
//!   the next gesture.
//!
//! # Coordinate System
//!
//! Touch points are in screen space, y growing downward. Angles come from
//! `atan2(dy, dx)` in degrees, so a clockwise twist on screen is a positive
//! rotation, matching the renderer.

use serde::{Deserialize, Serialize};

use crate::config::CropConfig;
use crate::geometry::clamp_zoom;

/// A single active touch in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TouchPoint {
    pub x: f64,
    pub y: f64,
}

impl TouchPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &TouchPoint) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Angle of the vector to `other`, in degrees.
    pub fn angle_to(&self, other: &TouchPoint) -> f64 {
        (other.y - self.y).atan2(other.x - self.x).to_degrees()
    }
}

/// Baselines captured at the start of a two-finger gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSession {
    pub initial_distance: f64,
    pub initial_angle: f64,
    pub baseline_zoom: f64,
    pub baseline_rotation: f64,
}

/// Which gesture branches are active and their limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSettings {
    pub enabled: bool,
    pub enable_pinch_zoom: bool,
    pub enable_touch_rotation: bool,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Multiplier applied to the twist angle.
    pub rotation_sensitivity: f64,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            enable_pinch_zoom: true,
            enable_touch_rotation: true,
            min_zoom: 1.0,
            max_zoom: 3.0,
            rotation_sensitivity: 1.0,
        }
    }
}

impl From<&CropConfig> for GestureSettings {
    fn from(config: &CropConfig) -> Self {
        Self {
            enabled: config.enable_pinch_zoom || config.enable_touch_rotation,
            enable_pinch_zoom: config.enable_pinch_zoom,
            enable_touch_rotation: config.enable_touch_rotation,
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            rotation_sensitivity: config.rotation_sensitivity,
        }
    }
}

/// Values emitted for one frame. Both may be present.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GestureUpdate {
    pub zoom: Option<f64>,
    /// Not wrapped into `[0, 360)`.
    pub rotation: Option<f64>,
}

impl GestureUpdate {
    pub fn is_empty(&self) -> bool {
        self.zoom.is_none() && self.rotation.is_none()
    }
}

/// Stateful translator from touch frames to zoom/rotation values.
#[derive(Debug, Clone, Default)]
pub struct GestureInterpreter {
    settings: GestureSettings,
    session: Option<GestureSession>,
    prev_count: usize,
}

impl GestureInterpreter {
    pub fn new(settings: GestureSettings) -> Self {
        Self {
            settings,
            session: None,
            prev_count: 0,
        }
    }

    pub fn settings(&self) -> &GestureSettings {
        &self.settings
    }

    /// Replace the settings. A live session keeps its baselines.
    pub fn set_settings(&mut self, settings: GestureSettings) {
        self.settings = settings;
    }

    /// The live gesture session, if any.
    pub fn session(&self) -> Option<&GestureSession> {
        self.session.as_ref()
    }

    /// Forget any live gesture.
    pub fn cancel(&mut self) {
        self.session = None;
        self.prev_count = 0;
    }

    /// Process one touch frame.
    ///
    /// `current_zoom` and `current_rotation` are only read when a gesture
    /// starts, to seed its baselines.
    pub fn on_frame(
        &mut self,
        touches: &[TouchPoint],
        current_zoom: f64,
        current_rotation: f64,
    ) -> GestureUpdate {
        if !self.settings.enabled {
            self.cancel();
            return GestureUpdate::default();
        }

        let count = touches.len();
        let prev_count = std::mem::replace(&mut self.prev_count, count);

        if count < 2 {
            if self.session.take().is_some() {
                log::trace!("Gesture ended");
            }
            return GestureUpdate::default();
        }
        if count > 2 {
            return GestureUpdate::default();
        }

        let (first, second) = (&touches[0], &touches[1]);

        if prev_count < 2 {
            let session = GestureSession {
                initial_distance: first.distance_to(second),
                initial_angle: first.angle_to(second),
                baseline_zoom: current_zoom,
                baseline_rotation: current_rotation,
            };
            log::trace!("Gesture started: {session:?}");
            self.session = Some(session);
            return GestureUpdate::default();
        }

        match self.session {
            Some(session) => self.emit(&session, first, second),
            None => GestureUpdate::default(),
        }
    }

    fn emit(&self, session: &GestureSession, first: &TouchPoint, second: &TouchPoint) -> GestureUpdate {
        let settings = &self.settings;
        let mut update = GestureUpdate::default();

        if settings.enable_pinch_zoom && session.initial_distance > 0.0 {
            let scale = first.distance_to(second) / session.initial_distance;
            if scale.is_finite() {
                update.zoom = Some(clamp_zoom(
                    session.baseline_zoom * scale,
                    settings.min_zoom,
                    settings.max_zoom,
                ));
            }
        }

        if settings.enable_touch_rotation {
            let delta = wrap_angle_delta(first.angle_to(second) - session.initial_angle);
            update.rotation =
                Some(session.baseline_rotation + delta * settings.rotation_sensitivity);
        }

        update
    }
}

/// Wrap an angle difference into `(-180, 180]`.
pub fn wrap_angle_delta(mut delta: f64) -> f64 {
    if !delta.is_finite() {
        return 0.0;
    }
    while delta > 180.0 {
        delta -= 360.0;
    }
    while delta <= -180.0 {
        delta += 360.0;
    }
    delta
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(list: &[(f64, f64)]) -> Vec<TouchPoint> {
        list.iter().map(|&(x, y)| TouchPoint::new(x, y)).collect()
    }

    fn interpreter() -> GestureInterpreter {
        GestureInterpreter::new(GestureSettings::default())
    }

    #[test]
    fn test_pinch_zoom_scenario() {
        let mut gi = interpreter();

        let start = gi.on_frame(&pts(&[(0.0, 0.0), (100.0, 0.0)]), 1.0, 0.0);
        assert!(start.is_empty());
        assert_eq!(gi.session().unwrap().initial_distance, 100.0);

        let update = gi.on_frame(&pts(&[(0.0, 0.0), (200.0, 0.0)]), 1.0, 0.0);
        assert_eq!(update.zoom, Some(2.0));

        let update = gi.on_frame(&pts(&[(0.0, 0.0), (500.0, 0.0)]), 2.0, 0.0);
        assert_eq!(update.zoom, Some(3.0));
    }

    #[test]
    fn test_baselines_only_read_at_start() {
        let mut gi = interpreter();
        gi.on_frame(&pts(&[(0.0, 0.0), (100.0, 0.0)]), 1.5, 10.0);

        // Later current values are ignored
        let update = gi.on_frame(&pts(&[(0.0, 0.0), (100.0, 0.0)]), 2.9, 99.0);
        assert_eq!(update.zoom, Some(1.5));
        assert_eq!(update.rotation, Some(10.0));
    }

    #[test]
    fn test_twist_rotation() {
        let mut gi = interpreter();
        gi.on_frame(&pts(&[(0.0, 0.0), (100.0, 0.0)]), 1.0, 30.0);

        let update = gi.on_frame(&pts(&[(0.0, 0.0), (0.0, 100.0)]), 1.0, 30.0);
        assert!((update.rotation.unwrap() - 120.0).abs() < 1e-9);
        assert_eq!(update.zoom, Some(1.0));
    }

    #[test]
    fn test_rotation_is_not_normalized() {
        let mut gi = interpreter();
        gi.on_frame(&pts(&[(0.0, 0.0), (100.0, 0.0)]), 1.0, 350.0);

        let update = gi.on_frame(&pts(&[(0.0, 0.0), (0.0, 100.0)]), 1.0, 0.0);
        assert!((update.rotation.unwrap() - 440.0).abs() < 1e-9);
    }

    #[test]
    fn test_angle_wraps_across_pi() {
        let mut gi = interpreter();
        // 170 degrees to -170 degrees is a 20 degree clockwise twist
        let a = 170f64.to_radians();
        let b = (-170f64).to_radians();
        gi.on_frame(&pts(&[(0.0, 0.0), (a.cos(), a.sin())]), 1.0, 0.0);
        let update = gi.on_frame(&pts(&[(0.0, 0.0), (b.cos(), b.sin())]), 1.0, 0.0);
        assert!((update.rotation.unwrap() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotation_sensitivity() {
        let mut gi = GestureInterpreter::new(GestureSettings {
            rotation_sensitivity: 0.5,
            ..GestureSettings::default()
        });
        gi.on_frame(&pts(&[(0.0, 0.0), (100.0, 0.0)]), 1.0, 0.0);
        let update = gi.on_frame(&pts(&[(0.0, 0.0), (0.0, 100.0)]), 1.0, 0.0);
        assert!((update.rotation.unwrap() - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_branches_gated_independently() {
        let mut gi = GestureInterpreter::new(GestureSettings {
            enable_pinch_zoom: false,
            ..GestureSettings::default()
        });
        gi.on_frame(&pts(&[(0.0, 0.0), (100.0, 0.0)]), 1.0, 0.0);
        let update = gi.on_frame(&pts(&[(0.0, 0.0), (200.0, 0.0)]), 1.0, 0.0);
        assert_eq!(update.zoom, None);
        assert_eq!(update.rotation, Some(0.0));

        let mut gi = GestureInterpreter::new(GestureSettings {
            enable_touch_rotation: false,
            ..GestureSettings::default()
        });
        gi.on_frame(&pts(&[(0.0, 0.0), (100.0, 0.0)]), 1.0, 0.0);
        let update = gi.on_frame(&pts(&[(0.0, 0.0), (200.0, 0.0)]), 1.0, 0.0);
        assert_eq!(update.zoom, Some(2.0));
        assert_eq!(update.rotation, None);
    }

    #[test]
    fn test_disabled_interpreter_keeps_no_session() {
        let mut gi = GestureInterpreter::new(GestureSettings {
            enabled: false,
            ..GestureSettings::default()
        });
        gi.on_frame(&pts(&[(0.0, 0.0), (100.0, 0.0)]), 1.0, 0.0);
        assert!(gi.session().is_none());
        assert!(gi
            .on_frame(&pts(&[(0.0, 0.0), (200.0, 0.0)]), 1.0, 0.0)
            .is_empty());
    }

    #[test]
    fn test_lifting_a_finger_ends_session() {
        let mut gi = interpreter();
        gi.on_frame(&pts(&[(0.0, 0.0), (100.0, 0.0)]), 1.0, 0.0);
        gi.on_frame(&pts(&[(0.0, 0.0)]), 1.0, 0.0);
        assert!(gi.session().is_none());

        // A new gesture takes fresh baselines
        let start = gi.on_frame(&pts(&[(0.0, 0.0), (50.0, 0.0)]), 2.0, 0.0);
        assert!(start.is_empty());
        let update = gi.on_frame(&pts(&[(0.0, 0.0), (75.0, 0.0)]), 2.0, 0.0);
        assert_eq!(update.zoom, Some(3.0));
        assert_eq!(gi.session().unwrap().baseline_zoom, 2.0);
    }

    #[test]
    fn test_three_points_pause_without_resetting() {
        let mut gi = interpreter();
        gi.on_frame(&pts(&[(0.0, 0.0), (100.0, 0.0)]), 1.0, 0.0);

        let update = gi.on_frame(&pts(&[(0.0, 0.0), (150.0, 0.0), (9.0, 9.0)]), 1.0, 0.0);
        assert!(update.is_empty());
        assert!(gi.session().is_some());

        // Back to two points: continues against the original baselines
        let update = gi.on_frame(&pts(&[(0.0, 0.0), (150.0, 0.0)]), 1.0, 0.0);
        assert_eq!(update.zoom, Some(1.5));
    }

    #[test]
    fn test_zero_initial_distance_emits_no_zoom() {
        let mut gi = interpreter();
        gi.on_frame(&pts(&[(5.0, 5.0), (5.0, 5.0)]), 1.0, 0.0);
        let update = gi.on_frame(&pts(&[(0.0, 0.0), (100.0, 0.0)]), 1.0, 0.0);
        assert_eq!(update.zoom, None);
        assert!(update.rotation.is_some());
    }

    #[test]
    fn test_single_moving_point_does_nothing() {
        let mut gi = interpreter();
        assert!(gi.on_frame(&pts(&[(0.0, 0.0)]), 1.0, 0.0).is_empty());
        assert!(gi.on_frame(&pts(&[(10.0, 0.0)]), 1.0, 0.0).is_empty());
        assert!(gi.session().is_none());
    }

    #[test]
    fn test_settings_from_config() {
        let mut config = CropConfig::default();
        config.enable_pinch_zoom = false;
        config.enable_touch_rotation = false;
        config.rotation_sensitivity = 2.0;
        let settings = GestureSettings::from(&config);
        assert!(!settings.enabled);
        assert_eq!(settings.rotation_sensitivity, 2.0);
        assert_eq!((settings.min_zoom, settings.max_zoom), (1.0, 3.0));
    }

    #[test]
    fn test_wrap_angle_delta() {
        assert_eq!(wrap_angle_delta(180.0), 180.0);
        assert_eq!(wrap_angle_delta(-180.0), 180.0);
        assert_eq!(wrap_angle_delta(-340.0), 20.0);
        assert_eq!(wrap_angle_delta(350.0), -10.0);
        assert_eq!(wrap_angle_delta(f64::NAN), 0.0);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn point() -> impl Strategy<Value = TouchPoint> {
        (-1000.0f64..1000.0, -1000.0f64..1000.0).prop_map(|(x, y)| TouchPoint::new(x, y))
    }

    proptest! {
        #[test]
        fn prop_wrapped_delta_in_range(delta in -720.0f64..720.0) {
            let wrapped = wrap_angle_delta(delta);
            prop_assert!(wrapped > -180.0 && wrapped <= 180.0);
        }

        /// Emitted zoom always respects the configured bounds.
        #[test]
        fn prop_zoom_within_bounds(
            start in (point(), point()),
            moves in prop::collection::vec((point(), point()), 1..8),
            baseline in 0.1f64..10.0,
        ) {
            let mut gi = GestureInterpreter::new(GestureSettings::default());
            gi.on_frame(&[start.0, start.1], baseline, 0.0);
            for (a, b) in moves {
                if let Some(zoom) = gi.on_frame(&[a, b], baseline, 0.0).zoom {
                    prop_assert!((1.0..=3.0).contains(&zoom));
                }
            }
        }

        /// At most one session, and only while exactly two points were last seen
        /// or more than two interrupt a live one.
        #[test]
        fn prop_session_requires_two_points(counts in prop::collection::vec(0usize..4, 1..20)) {
            let mut gi = GestureInterpreter::new(GestureSettings::default());
            let all = [
                TouchPoint::new(0.0, 0.0),
                TouchPoint::new(10.0, 0.0),
                TouchPoint::new(0.0, 10.0),
            ];
            for count in counts {
                gi.on_frame(&all[..count], 1.0, 0.0);
                if count < 2 {
                    prop_assert!(gi.session().is_none());
                }
            }
        }
    }
}
