//! Frame-by-frame simulation of a gesture on a manual clock.

use std::fmt;
use std::time::Duration;

use overscroll_config::Config;
use serde::Serialize;

use crate::animation::Clock;
use crate::scroller::{Mode, OverScroller, Phase};

/// Gesture that starts a simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Scroll {
        start: f64,
        delta: f64,
        /// Uses the configured duration when unset.
        duration_ms: Option<u64>,
    },
    Fling {
        start: f64,
        velocity: f64,
        min: f64,
        max: f64,
        /// Uses the configured overscroll when unset.
        over: Option<f64>,
    },
    SpringBack {
        start: f64,
        min: f64,
        max: f64,
    },
}

/// What drives the position during a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FrameKind {
    Scroll,
    Spline,
    Ballistic,
    Cubic,
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            FrameKind::Scroll => "scroll",
            FrameKind::Spline => "spline",
            FrameKind::Ballistic => "ballistic",
            FrameKind::Cubic => "cubic",
        })
    }
}

/// One evaluated animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Frame {
    pub time_ms: i64,
    pub kind: FrameKind,
    pub position: f64,
    pub velocity: f64,
    pub overscrolled: bool,
    pub finished: bool,
}

/// Runs a scroller on its own clock, one fixed-length frame at a time.
///
/// Iterating yields every frame in which the animation was running, the last one being the frame
/// that finished it.
#[derive(Debug)]
pub struct Simulation {
    clock: Clock,
    scroller: OverScroller,
    frame: Duration,
}

impl Simulation {
    pub fn new(config: &Config, frame: Duration) -> Self {
        let mut clock = Clock::with_time(Duration::ZERO);
        clock.set_rate(1. / config.scroller.slowdown.0.max(0.001));
        clock.set_complete_instantly(config.debug.complete_instantly);

        let scroller = OverScroller::new(clock.clone(), &config.scroller);

        Self {
            clock,
            scroller,
            frame,
        }
    }

    pub fn scroller(&self) -> &OverScroller {
        &self.scroller
    }

    /// Starts a gesture.
    ///
    /// Returns `false` if the gesture does not animate at all.
    pub fn start(&mut self, gesture: Gesture) -> bool {
        match gesture {
            Gesture::Scroll {
                start,
                delta,
                duration_ms,
            } => match duration_ms {
                Some(duration) => self
                    .scroller
                    .start_scroll_with_duration(start, delta, duration),
                None => self.scroller.start_scroll(start, delta),
            },
            Gesture::Fling {
                start,
                velocity,
                min,
                max,
                over,
            } => match self.scroller.fling_velocity().clamp(velocity) {
                Some(velocity) => match over {
                    Some(over) => self
                        .scroller
                        .fling_with_overshoot(start, velocity, min, max, over),
                    None => self.scroller.fling(start, velocity, min, max),
                },
                None => {
                    warn!("velocity {velocity} is too slow to fling, springing back instead");
                    return self.scroller.spring_back(start, min, max);
                }
            },
            Gesture::SpringBack { start, min, max } => {
                return self.scroller.spring_back(start, min, max);
            }
        }

        true
    }

    fn frame_kind(&self) -> FrameKind {
        match (self.scroller.mode(), self.scroller.phase()) {
            (Mode::Scroll, _) => FrameKind::Scroll,
            (Mode::Fling, Phase::Spline { .. }) => FrameKind::Spline,
            (Mode::Fling, Phase::Ballistic { .. }) => FrameKind::Ballistic,
            (Mode::Fling, Phase::Cubic { .. }) => FrameKind::Cubic,
        }
    }
}

impl Iterator for Simulation {
    type Item = Frame;

    fn next(&mut self) -> Option<Self::Item> {
        let _span = tracy_client::span!("Simulation::next");

        if !self.scroller.compute_scroll_offset() {
            return None;
        }

        let frame = Frame {
            time_ms: self.clock.now_ms(),
            kind: self.frame_kind(),
            position: self.scroller.current_position(),
            velocity: self.scroller.current_velocity(),
            overscrolled: self.scroller.is_overscrolled(),
            finished: self.scroller.is_finished(),
        };

        self.clock.advance(self.frame);
        Some(frame)
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::*;

    fn simulation() -> Simulation {
        Simulation::new(&Config::default(), Duration::from_millis(16))
    }

    #[test]
    fn spring_back_frames() {
        let mut sim = simulation();
        assert!(sim.start(Gesture::SpringBack {
            start: 120.,
            min: 0.,
            max: 100.,
        }));

        let frames: Vec<_> = sim.collect();
        let last = frames.last().unwrap();
        assert!(last.finished);
        assert_eq!(last.position, 100.);
        assert!(frames.iter().all(|f| f.kind == FrameKind::Cubic));
        assert!(frames[..frames.len() - 1].iter().all(|f| f.overscrolled));
    }

    #[test]
    fn spring_back_in_range_has_no_frames() {
        let mut sim = simulation();
        assert!(!sim.start(Gesture::SpringBack {
            start: 50.,
            min: 0.,
            max: 100.,
        }));
        assert_eq!(sim.count(), 0);
    }

    #[test]
    fn slow_fling_springs_back() {
        let mut sim = simulation();
        assert!(!sim.start(Gesture::Fling {
            start: 50.,
            velocity: 10.,
            min: 0.,
            max: 100.,
            over: None,
        }));
        assert!(sim.scroller().is_finished());
    }

    #[test]
    fn fast_fling_is_clamped() {
        let mut sim = simulation();
        assert!(sim.start(Gesture::Fling {
            start: 0.,
            velocity: 1e6,
            min: -1e9,
            max: 1e9,
            over: None,
        }));
        assert_eq!(sim.scroller().current_velocity(), 8000.);
    }

    #[test]
    fn slowdown() {
        let mut config = Config::default();
        config.scroller.slowdown = overscroll_config::FloatOrInt(2.);

        let mut sim = Simulation::new(&config, Duration::from_millis(50));
        sim.start(Gesture::Scroll {
            start: 0.,
            delta: 10.,
            duration_ms: Some(100),
        });

        // 100 ms of animation time take 200 ms of frames.
        assert_eq!(sim.count(), 5);
    }

    #[test]
    fn complete_instantly() {
        let mut config = Config::default();
        config.debug.complete_instantly = true;

        let mut sim = Simulation::new(&config, Duration::from_millis(16));
        sim.start(Gesture::Fling {
            start: 0.,
            velocity: 3000.,
            min: 0.,
            max: 100.,
            over: None,
        });

        let frames: Vec<_> = sim.collect();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].position, 100.);
    }

    #[test]
    fn frame_kind_display_pads() {
        assert_eq!(format!("[{:<6}]", FrameKind::Cubic), "[cubic ]");
    }

    #[test]
    fn frame_serialization() {
        let frame = Frame {
            time_ms: 16,
            kind: FrameKind::Ballistic,
            position: 101.5,
            velocity: -20.,
            overscrolled: true,
            finished: false,
        };
        assert_snapshot!(
            serde_json::to_string(&frame).unwrap(),
            @r#"{"time_ms":16,"kind":"ballistic","position":101.5,"velocity":-20.0,"overscrolled":true,"finished":false}"#
        );
    }
}
