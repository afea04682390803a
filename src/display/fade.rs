// SPDX-License-Identifier: MPL-2.0

//! Cross-fade state machine for panel rotation.
//!
//! The rotation timer only ever calls [`PanelRotation::begin_fade`]; the
//! render loop advances the animation with [`PanelRotation::tick`] once per
//! frame. The panel index advances exactly when the fade-out completes, so
//! the old panel is never visible at the new index.
//!
//! `Idle -> FadingOut -> (advance index) -> FadingIn -> Idle`

use super::panel::Panel;
use std::time::Duration;

/// Duration of each half of the cross-fade.
pub const FADE_DURATION: Duration = Duration::from_millis(600);

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    /// Opacity runs 1 -> 0 as `progress` runs 0 -> 1
    FadingOut { progress: f64 },
    /// Opacity runs 0 -> 1 as `progress` runs 0 -> 1
    FadingIn { progress: f64 },
}

/// Tracks the active panel and the fade transition between panels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelRotation {
    active: Panel,
    phase: Phase,
}

impl Default for PanelRotation {
    fn default() -> Self {
        Self {
            active: Panel::ROTATION[0],
            phase: Phase::Idle,
        }
    }
}

impl PanelRotation {
    /// The panel currently being rendered.
    pub fn active(&self) -> Panel {
        self.active
    }

    /// Opacity to composite the active panel with, in [0, 1].
    pub fn opacity(&self) -> f64 {
        match self.phase {
            Phase::Idle => 1.0,
            Phase::FadingOut { progress } => (1.0 - progress).clamp(0.0, 1.0),
            Phase::FadingIn { progress } => progress.clamp(0.0, 1.0),
        }
    }

    /// Whether a fade is in flight and frames should keep coming.
    pub fn animating(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// Start a fade-out of the active panel. Ignored while a fade is
    /// already running, so an early rotation tick cannot skip a panel.
    pub fn begin_fade(&mut self) {
        if self.phase == Phase::Idle {
            self.phase = Phase::FadingOut { progress: 0.0 };
        }
    }

    /// Advance the animation by one frame's elapsed time.
    pub fn tick(&mut self, elapsed: Duration) {
        let step = elapsed.as_secs_f64() / FADE_DURATION.as_secs_f64();
        match self.phase {
            Phase::Idle => {}
            Phase::FadingOut { progress } => {
                let progress = progress + step;
                if progress >= 1.0 {
                    self.active = self.active.next();
                    self.phase = Phase::FadingIn { progress: 0.0 };
                } else {
                    self.phase = Phase::FadingOut { progress };
                }
            }
            Phase::FadingIn { progress } => {
                let progress = progress + step;
                if progress >= 1.0 {
                    self.phase = Phase::Idle;
                } else {
                    self.phase = Phase::FadingIn { progress };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Run one complete fade-out + fade-in at 60 fps.
    fn run_full_fade(rotation: &mut PanelRotation) {
        rotation.begin_fade();
        let frame = Duration::from_millis(16);
        for _ in 0..100 {
            rotation.tick(frame);
            if !rotation.animating() {
                return;
            }
        }
        panic!("fade did not complete");
    }

    #[test]
    fn test_three_fades_return_to_start() {
        let mut rotation = PanelRotation::default();
        let start = rotation.active();
        for _ in 0..3 {
            run_full_fade(&mut rotation);
        }
        assert_eq!(rotation.active(), start);
    }

    #[test]
    fn test_index_advances_on_fade_out_completion() {
        let mut rotation = PanelRotation::default();
        rotation.begin_fade();
        // Just shy of fade-out completion: index unchanged
        rotation.tick(Duration::from_millis(599));
        assert_eq!(rotation.active(), Panel::Temperature);
        // Crossing the boundary advances and starts the fade-in
        rotation.tick(Duration::from_millis(2));
        assert_eq!(rotation.active(), Panel::Clock);
        assert!(rotation.animating());
    }

    #[test]
    fn test_opacity_stays_in_unit_range() {
        let mut rotation = PanelRotation::default();
        assert_eq!(rotation.opacity(), 1.0);
        rotation.begin_fade();
        let frame = Duration::from_millis(16);
        for _ in 0..100 {
            rotation.tick(frame);
            let opacity = rotation.opacity();
            assert!((0.0..=1.0).contains(&opacity), "opacity {opacity} out of range");
        }
        assert_eq!(rotation.opacity(), 1.0);
    }

    #[test]
    fn test_begin_fade_is_ignored_mid_fade() {
        let mut rotation = PanelRotation::default();
        rotation.begin_fade();
        rotation.tick(Duration::from_millis(300));
        let before = rotation;
        rotation.begin_fade();
        assert_eq!(rotation, before);
    }

    #[test]
    fn test_idle_tick_is_a_no_op() {
        let mut rotation = PanelRotation::default();
        rotation.tick(Duration::from_secs(5));
        assert_eq!(rotation, PanelRotation::default());
        assert!(!rotation.animating());
    }
}
