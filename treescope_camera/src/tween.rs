// Copyright 2025 the Treescope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-driven pose tweens and their completion signals.
//!
//! A [`Tween`] never reads a clock. The host feeds elapsed time through
//! [`Tween::advance`], and the camera resolves the tween's completion signal
//! once it reaches its end.

use alloc::rc::Rc;
use core::cell::RefCell;
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll, Waker};
use core::time::Duration;

use crate::pose::CameraPose;

/// Iterations of the bisection that inverts a cubic Bézier timing curve.
const BEZIER_STEPS: usize = 40;

/// Timing curve mapping linear progress `t ∈ [0, 1]` to eased progress.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Easing {
    /// Constant velocity.
    Linear,
    /// CSS-style `cubic-bezier(x1, y1, x2, y2)` with endpoints `(0, 0)` and `(1, 1)`.
    ///
    /// `x1` and `x2` must lie in `[0, 1]` for the curve to be a function of time.
    CubicBezier {
        /// First control point, x.
        x1: f64,
        /// First control point, y.
        y1: f64,
        /// Second control point, x.
        x2: f64,
        /// Second control point, y.
        y2: f64,
    },
}

impl Default for Easing {
    fn default() -> Self {
        Self::EASE_IN_OUT
    }
}

impl Easing {
    /// The standard `ease-in-out` curve, `cubic-bezier(0.42, 0, 0.58, 1)`.
    pub const EASE_IN_OUT: Self = Self::CubicBezier {
        x1: 0.42,
        y1: 0.0,
        x2: 0.58,
        y2: 1.0,
    };

    /// Eased progress at linear progress `t`, clamped to `[0, 1]`.
    #[must_use]
    pub fn apply(&self, t: f64) -> f64 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match *self {
            Self::Linear => t,
            Self::CubicBezier { x1, y1, x2, y2 } => {
                if t == 0.0 || t == 1.0 {
                    return t;
                }
                let (mut lo, mut hi) = (0.0, 1.0);
                let mut s = t;
                for _ in 0..BEZIER_STEPS {
                    s = (lo + hi) / 2.0;
                    if bezier(s, x1, x2) < t {
                        lo = s;
                    } else {
                        hi = s;
                    }
                }
                bezier(s, y1, y2)
            }
        }
    }
}

/// One coordinate of a cubic Bézier with endpoints 0 and 1.
fn bezier(s: f64, c1: f64, c2: f64) -> f64 {
    let r = 1.0 - s;
    3.0 * r * r * s * c1 + 3.0 * r * s * s * c2 + s * s * s
}

/// Interpolation from one pose to another over a fixed duration.
#[derive(Clone, Debug, PartialEq)]
pub struct Tween {
    from: CameraPose,
    to: CameraPose,
    duration: Duration,
    elapsed: Duration,
    easing: Easing,
}

impl Tween {
    /// Creates a tween that has not started yet.
    #[must_use]
    pub fn new(from: CameraPose, to: CameraPose, duration: Duration, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: Duration::ZERO,
            easing,
        }
    }

    /// Adds `dt` to the elapsed time and returns the pose at the new time.
    pub fn advance(&mut self, dt: Duration) -> CameraPose {
        self.elapsed = self.elapsed.saturating_add(dt);
        self.sample()
    }

    /// Pose at the current elapsed time. Exactly the end pose once finished.
    #[must_use]
    pub fn sample(&self) -> CameraPose {
        if self.is_finished() {
            return self.to;
        }
        let t = self.elapsed.as_secs_f64() / self.duration.as_secs_f64();
        self.from.lerp(&self.to, self.easing.apply(t))
    }

    /// Whether the elapsed time has reached the duration.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// The end pose.
    #[must_use]
    pub fn target(&self) -> CameraPose {
        self.to
    }

    /// Total duration.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

/// How a tween stopped.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum TweenOutcome {
    /// Ran to its end pose.
    Finished,
    /// Replaced by a newer command's tween before finishing.
    Superseded,
}

#[derive(Debug, Default)]
struct SignalState {
    outcome: Option<TweenOutcome>,
    waker: Option<Waker>,
}

/// One-shot completion flag shared between a registered tween and the task awaiting it.
#[derive(Clone, Debug, Default)]
pub(crate) struct Signal(Rc<RefCell<SignalState>>);

impl Signal {
    /// Sets the outcome and wakes the waiting task. Later calls are ignored.
    pub(crate) fn resolve(&self, outcome: TweenOutcome) {
        let waker = {
            let mut state = self.0.borrow_mut();
            if state.outcome.is_some() {
                return;
            }
            state.outcome = Some(outcome);
            state.waker.take()
        };
        if let Some(waker) = waker {
            waker.wake();
        }
    }

    pub(crate) fn wait(&self) -> TweenDone {
        TweenDone(self.clone())
    }
}

/// Future that resolves when its [`Signal`] does.
#[derive(Debug)]
pub(crate) struct TweenDone(Signal);

impl Future for TweenDone {
    type Output = TweenOutcome;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut state = (self.0).0.borrow_mut();
        match state.outcome {
            Some(outcome) => Poll::Ready(outcome),
            None => {
                state.waker = Some(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn ease_in_out_is_symmetric_and_monotone() {
        let e = Easing::EASE_IN_OUT;
        assert_eq!(e.apply(0.0), 0.0);
        assert_eq!(e.apply(1.0), 1.0);
        assert!((e.apply(0.5) - 0.5).abs() < 1e-9);
        for i in 1..50 {
            let t = f64::from(i) / 50.0;
            assert!((e.apply(t) + e.apply(1.0 - t) - 1.0).abs() < 1e-9);
            assert!(e.apply(t) >= e.apply(t - 0.02));
        }
        // Slow start, slow end.
        assert!(e.apply(0.1) < 0.1);
        assert!(e.apply(0.9) > 0.9);
    }

    #[test]
    fn easing_clamps_input() {
        assert_eq!(Easing::Linear.apply(-1.0), 0.0);
        assert_eq!(Easing::Linear.apply(2.0), 1.0);
        assert_eq!(Easing::EASE_IN_OUT.apply(f64::NAN), 0.0);
    }

    #[test]
    fn tween_snaps_to_target() {
        let to = CameraPose::new(100.0, -40.0, 2.0);
        let mut tween = Tween::new(CameraPose::OVERVIEW, to, ms(100), Easing::EASE_IN_OUT);
        let mid = tween.advance(ms(50));
        assert!((mid.x - 50.0).abs() < 1e-6);
        assert!(!tween.is_finished());
        assert_eq!(tween.advance(ms(70)), to);
        assert!(tween.is_finished());
    }

    #[test]
    fn zero_duration_is_already_finished() {
        let to = CameraPose::new(1.0, 2.0, 3.0);
        let tween = Tween::new(CameraPose::OVERVIEW, to, Duration::ZERO, Easing::Linear);
        assert!(tween.is_finished());
        assert_eq!(tween.sample(), to);
    }

    #[test]
    fn signal_resolves_once() {
        let signal = Signal::default();
        let done = signal.wait();
        signal.resolve(TweenOutcome::Superseded);
        signal.resolve(TweenOutcome::Finished);
        assert_eq!(
            futures::executor::block_on(done),
            TweenOutcome::Superseded
        );
    }
}
