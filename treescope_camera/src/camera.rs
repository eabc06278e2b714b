// Copyright 2025 the Treescope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The camera state machine.

use alloc::rc::Rc;
use alloc::string::String;
use core::cell::RefCell;
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};
use core::time::Duration;

use kurbo::{Point, Size};
use smallvec::SmallVec;
use tracing::{debug, trace, warn};
use treescope_layout::{LayoutIx, LayoutResult};

use crate::navigation::{DefaultPolicy, Navigation, NavigationPolicy, ancestry};
use crate::pose::{CameraMode, CameraPose};
use crate::transform::{CanvasGeometry, clamp, zoom_about};
use crate::tween::{Easing, Signal, Tween, TweenDone, TweenOutcome};

/// Tunables for camera transitions.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CameraConfig {
    /// Fraction of the tighter canvas dimension a focused node box fills.
    pub focus_fill: f64,
    /// Scale multiplier for the ease-out phase of a focus transition.
    pub ease_out_factor: f64,
    /// Lower bound for the ease-out scale.
    pub min_scale: f64,
    /// Upper bound for the ease-out scale.
    pub max_scale: f64,
    /// Duration of [`Phase::EaseOut`].
    pub ease_out_duration: Duration,
    /// Duration of [`Phase::Cross`].
    pub cross_duration: Duration,
    /// Duration of [`Phase::Settle`].
    pub settle_duration: Duration,
    /// Duration of [`Phase::Overview`], and of a recenter in overview mode.
    pub overview_duration: Duration,
    /// Duration of a recenter in focus mode.
    pub recenter_duration: Duration,
    /// Per-component distance under which two poses count as equal.
    pub tolerance: f64,
    /// Timing curve for every tween.
    pub easing: Easing,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            focus_fill: 0.55,
            ease_out_factor: 0.8,
            min_scale: 0.45,
            max_scale: 2.5,
            ease_out_duration: Duration::from_millis(450),
            cross_duration: Duration::from_millis(550),
            settle_duration: Duration::from_millis(550),
            overview_duration: Duration::from_millis(600),
            recenter_duration: Duration::from_millis(550),
            tolerance: 1e-2,
            easing: Easing::EASE_IN_OUT,
        }
    }
}

/// Starting state of a [`Camera`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CameraInit {
    /// Start in overview.
    #[default]
    Overview,
    /// Start focused on a node; `None` means the root.
    Focus {
        /// The node to start on.
        start_id: Option<String>,
    },
}

impl CameraInit {
    /// Start in overview.
    #[must_use]
    pub fn overview() -> Self {
        Self::Overview
    }

    /// Start focused on `id`.
    #[must_use]
    pub fn focus(id: impl Into<String>) -> Self {
        Self::Focus {
            start_id: Some(id.into()),
        }
    }
}

/// The step a running transition is in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Zooming out about the screen center.
    EaseOut,
    /// Panning to the midpoint between source and target.
    Cross,
    /// Zooming in to center the target.
    Settle,
    /// Returning to the overview pose.
    Overview,
    /// Realigning with the current mode after an input changed.
    Recenter,
}

/// How a camera command ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Transition {
    /// The command ran to its end and committed its mode.
    Completed,
    /// A newer command took over before this one finished.
    Superseded,
    /// Nothing needed to move.
    Unchanged,
}

/// Point-in-time copy of the camera's observable state.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraSnapshot {
    /// Live pose.
    pub pose: CameraPose,
    /// Committed mode.
    pub mode: CameraMode,
    /// Mode the newest command is heading to.
    pub intent: CameraMode,
    /// Id of the most recent focus target, until an overview transition ends.
    pub pending_target: Option<String>,
    /// Phase of the running tween, if any.
    pub phase: Option<Phase>,
    /// Padded-space point under the canvas center.
    pub world_center: Point,
}

#[derive(Debug)]
struct Active {
    tween: Tween,
    signal: Signal,
    phase: Phase,
    generation: u64,
}

#[derive(Debug)]
struct State {
    config: CameraConfig,
    layout: Rc<LayoutResult>,
    canvas: Size,
    pose: CameraPose,
    mode: CameraMode,
    intent: CameraMode,
    pending_target: Option<String>,
    active: Option<Active>,
    generation: u64,
}

impl State {
    fn geometry(&self) -> CanvasGeometry {
        CanvasGeometry::with_canvas(&self.layout, self.canvas)
    }

    fn focus_scale(&self) -> f64 {
        self.geometry().focus_scale(self.config.focus_fill)
    }

    /// Resolves `id` against the layout, falling back to the root.
    fn resolve(&self, id: Option<&str>) -> Option<LayoutIx> {
        if self.layout.is_empty() {
            return None;
        }
        match id.map(|id| (id, self.layout.index_of(id))) {
            Some((_, Some(ix))) => Some(ix),
            Some((id, None)) => {
                trace!(id, "node not found in layout; using the root");
                Some(LayoutIx::ROOT)
            }
            None => Some(LayoutIx::ROOT),
        }
    }

    fn id_at(&self, ix: LayoutIx) -> String {
        self.layout
            .node(ix)
            .map(|n| n.id.clone())
            .unwrap_or_default()
    }

    fn position_at(&self, ix: LayoutIx) -> Point {
        self.layout.node(ix).map_or(Point::ZERO, |n| n.position)
    }

    /// The committed focus, or the root in overview.
    fn current(&self) -> Option<LayoutIx> {
        self.resolve(self.mode.focused_id())
    }

    fn focus_pose(&self, ix: LayoutIx) -> CameraPose {
        self.geometry()
            .center_on(self.position_at(ix), self.focus_scale())
    }

    /// Where the pose should rest for the current intent, with the intent
    /// rewritten to a node that exists.
    fn settle_intent(&mut self) -> Option<CameraPose> {
        match self.intent.clone() {
            CameraMode::Overview => Some(CameraPose::OVERVIEW),
            CameraMode::Focus(id) => {
                let ix = self.resolve(Some(&id))?;
                if self.layout.index_of(&id).is_none() {
                    warn!(id = %id, "focused node not in layout; falling back to the root");
                }
                self.intent = CameraMode::Focus(self.id_at(ix));
                Some(self.focus_pose(ix))
            }
        }
    }

    fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Replaces any running tween with one from the live pose to `to`.
    fn start_tween(
        &mut self,
        generation: u64,
        phase: Phase,
        to: CameraPose,
        duration: Duration,
    ) -> TweenDone {
        if let Some(previous) = self.active.take() {
            debug!(
                phase = ?previous.phase,
                generation = previous.generation,
                "superseding running tween"
            );
            previous.signal.resolve(TweenOutcome::Superseded);
        }
        let signal = Signal::default();
        let done = signal.wait();
        let tween = Tween::new(self.pose, to, duration, self.config.easing);
        debug!(?phase, generation, x = to.x, y = to.y, scale = to.scale, "phase start");
        if tween.is_finished() {
            self.pose = to;
            signal.resolve(TweenOutcome::Finished);
        } else {
            self.active = Some(Active {
                tween,
                signal,
                phase,
                generation,
            });
        }
        done
    }
}

/// Camera over one [`LayoutResult`] drawn on one canvas.
///
/// `Camera` is a cheap handle; clones share the same state. Commands
/// ([`focus_node`](Self::focus_node), [`zoom_to_overview`](Self::zoom_to_overview),
/// [`recenter`](Self::recenter), …) return futures that take effect when
/// first polled and resolve when their last tween ends. The camera owns no
/// executor and no clock: the host polls the futures on its own executor and
/// calls [`advance`](Self::advance) once per frame.
///
/// When a command starts while another is still running, the newer one wins.
/// The older command's current tween stops where it is and its future
/// resolves to [`Transition::Superseded`] without committing its mode.
///
/// ```rust
/// use core::time::Duration;
/// use futures::executor::LocalPool;
/// use futures::task::LocalSpawnExt;
/// use treescope_camera::{Camera, CameraConfig, CameraInit, CameraMode};
/// use treescope_layout::{LayoutConfig, LayoutResult, RawNode};
///
/// let raw = RawNode::new("root", "Home").with_child(RawNode::new("about", "About"));
/// let layout = LayoutResult::from_raw(&raw, &LayoutConfig::default()).unwrap();
/// let camera = Camera::new(layout, CameraConfig::default(), CameraInit::overview());
///
/// let mut pool = LocalPool::new();
/// pool.spawner()
///     .spawn_local({
///         let command = camera.focus_node("about");
///         async move {
///             command.await;
///         }
///     })
///     .unwrap();
///
/// loop {
///     pool.run_until_stalled();
///     if !camera.is_animating() {
///         break;
///     }
///     camera.advance(Duration::from_millis(16));
/// }
/// assert_eq!(camera.mode(), CameraMode::Focus("about".into()));
/// ```
#[derive(Clone, Debug)]
pub struct Camera {
    state: Rc<RefCell<State>>,
}

impl Camera {
    /// Creates a camera drawing `layout` on a canvas of the layout's own size.
    pub fn new(
        layout: impl Into<Rc<LayoutResult>>,
        config: CameraConfig,
        init: CameraInit,
    ) -> Self {
        let layout = layout.into();
        let canvas = layout.canvas_size();
        Self::with_canvas(layout, canvas, config, init)
    }

    /// Creates a camera drawing `layout` on a canvas of size `canvas`.
    ///
    /// The initial pose is set directly: the overview pose, or the start
    /// node centered at the focus scale.
    pub fn with_canvas(
        layout: impl Into<Rc<LayoutResult>>,
        canvas: Size,
        config: CameraConfig,
        init: CameraInit,
    ) -> Self {
        let mut state = State {
            config,
            layout: layout.into(),
            canvas,
            pose: CameraPose::OVERVIEW,
            mode: CameraMode::Overview,
            intent: CameraMode::Overview,
            pending_target: None,
            active: None,
            generation: 0,
        };
        if let CameraInit::Focus { start_id } = init {
            match state.resolve(start_id.as_deref()) {
                Some(ix) => {
                    let missing = start_id
                        .as_deref()
                        .filter(|id| state.layout.index_of(id).is_none());
                    if let Some(id) = missing {
                        warn!(id, "start node not in layout; starting on the root");
                    }
                    let id = state.id_at(ix);
                    state.pose = state.focus_pose(ix);
                    state.mode = CameraMode::Focus(id.clone());
                    state.intent = CameraMode::Focus(id);
                }
                None => warn!("cannot start focused on an empty layout; starting in overview"),
            }
        }
        debug!(mode = ?state.mode, pose = ?state.pose, "camera mounted");
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// Runs the three-phase focus transition to the node with `target`.
    ///
    /// An unknown `target` falls back to the current node. Focusing the node
    /// that is already focused still runs every phase.
    pub fn focus_node(&self, target: &str) -> impl Future<Output = Transition> + use<> {
        let camera = self.clone();
        let target = String::from(target);
        async move { camera.run_focus(target).await }
    }

    /// Sets overview mode and animates to the overview pose.
    pub fn zoom_to_overview(&self) -> impl Future<Output = Transition> + use<> {
        let camera = self.clone();
        async move { camera.run_overview().await }
    }

    /// Animates to the resting pose of the current mode if the live pose is elsewhere.
    ///
    /// A running command is always superseded, and the mode it was heading
    /// for is committed once the recenter ends.
    pub fn recenter(&self) -> impl Future<Output = Transition> + use<> {
        let camera = self.clone();
        async move { camera.run_recenter().await }
    }

    /// Replaces the canvas size now and recenters.
    pub fn resize(&self, canvas: Size) -> impl Future<Output = Transition> + use<> {
        self.state.borrow_mut().canvas = canvas;
        debug!(width = canvas.width, height = canvas.height, "canvas resized");
        self.recenter()
    }

    /// Replaces the layout now and recenters.
    ///
    /// If the focused node is missing from the new layout, focus moves to its root.
    pub fn set_layout<L: Into<Rc<LayoutResult>>>(
        &self,
        layout: L,
    ) -> impl Future<Output = Transition> + use<L> {
        let layout = layout.into();
        debug!(nodes = layout.len(), "layout replaced");
        self.state.borrow_mut().layout = layout;
        self.recenter()
    }

    /// Focuses the node `navigation` leads to from the current node, using [`DefaultPolicy`].
    pub fn navigate(&self, navigation: Navigation) -> impl Future<Output = Transition> + use<> {
        self.navigate_with(&DefaultPolicy::default(), navigation)
    }

    /// Focuses the node `navigation` leads to under `policy`.
    ///
    /// The target is chosen when this is called. With nowhere to go, the
    /// future resolves to [`Transition::Unchanged`].
    pub fn navigate_with(
        &self,
        policy: &dyn NavigationPolicy,
        navigation: Navigation,
    ) -> impl Future<Output = Transition> + use<> {
        let target = {
            let state = self.state.borrow();
            state
                .current()
                .and_then(|origin| policy.next(&state.layout, origin, navigation))
                .map(|ix| state.id_at(ix))
        };
        if target.is_none() {
            debug!(?navigation, "no navigation target");
        }
        self.focus_optional(target)
    }

    /// Focuses the node under the screen point `point`, if any.
    pub fn focus_at_screen(&self, point: Point) -> impl Future<Output = Transition> + use<> {
        let target = {
            let state = self.state.borrow();
            let padded = state.pose.screen_to_world(point);
            state.layout.hit_test(padded).map(|ix| state.id_at(ix))
        };
        if target.is_none() {
            trace!(x = point.x, y = point.y, "no node under screen point");
        }
        self.focus_optional(target)
    }

    fn focus_optional(&self, target: Option<String>) -> impl Future<Output = Transition> + use<> {
        let camera = self.clone();
        async move {
            match target {
                Some(target) => camera.run_focus(target).await,
                None => Transition::Unchanged,
            }
        }
    }

    /// Moves the running tween forward by `dt` and returns the live pose.
    ///
    /// A tween that reaches its end wakes the command awaiting it; that
    /// command starts its next phase the next time the host polls it.
    pub fn advance(&self, dt: Duration) -> CameraPose {
        let mut state = self.state.borrow_mut();
        let Some(mut active) = state.active.take() else {
            return state.pose;
        };
        let pose = active.tween.advance(dt);
        state.pose = pose;
        if active.tween.is_finished() {
            drop(state);
            trace!(phase = ?active.phase, generation = active.generation, "tween finished");
            active.signal.resolve(TweenOutcome::Finished);
        } else {
            state.active = Some(active);
        }
        pose
    }

    async fn run_focus(&self, target: String) -> Transition {
        let begun = {
            let mut state = self.state.borrow_mut();
            state.current().map(|src| {
                let dst = match state.layout.index_of(&target) {
                    Some(dst) => dst,
                    None => {
                        warn!(id = %target, "focus target not found; staying on the current node");
                        src
                    }
                };
                let dst_id = state.id_at(dst);
                let generation = state.next_generation();
                debug!(from = %state.id_at(src), to = %dst_id, generation, "focus transition");
                state.pending_target = Some(dst_id.clone());
                state.intent = CameraMode::Focus(dst_id.clone());
                (generation, state.position_at(src), state.position_at(dst), dst_id)
            })
        };
        let Some((generation, src, dst, dst_id)) = begun else {
            debug!(id = %target, "focus requested on an empty layout");
            return Transition::Unchanged;
        };

        let outcome = self
            .run_phase(generation, Phase::EaseOut, |state| {
                let pose = state.pose;
                let config = &state.config;
                let center = state.geometry().world_at_center(&pose);
                let to_scale = clamp(
                    pose.scale * config.ease_out_factor,
                    config.min_scale,
                    config.max_scale,
                );
                (
                    zoom_about(pose.pan(), pose.scale, to_scale, center),
                    config.ease_out_duration,
                )
            })
            .await;
        if outcome == TweenOutcome::Superseded {
            return Transition::Superseded;
        }

        let outcome = self
            .run_phase(generation, Phase::Cross, |state| {
                let mid = src.midpoint(dst);
                (
                    state.geometry().center_on(mid, state.pose.scale),
                    state.config.cross_duration,
                )
            })
            .await;
        if outcome == TweenOutcome::Superseded {
            return Transition::Superseded;
        }

        let outcome = self
            .run_phase(generation, Phase::Settle, |state| {
                (
                    state.geometry().center_on(dst, state.focus_scale()),
                    state.config.settle_duration,
                )
            })
            .await;
        if outcome == TweenOutcome::Superseded {
            return Transition::Superseded;
        }

        self.commit(generation, |state| {
            state.mode = CameraMode::Focus(dst_id);
        })
    }

    async fn run_overview(&self) -> Transition {
        let generation = {
            let mut state = self.state.borrow_mut();
            state.mode = CameraMode::Overview;
            state.intent = CameraMode::Overview;
            state.next_generation()
        };
        let outcome = self
            .run_phase(generation, Phase::Overview, |state| {
                (CameraPose::OVERVIEW, state.config.overview_duration)
            })
            .await;
        if outcome == TweenOutcome::Superseded {
            return Transition::Superseded;
        }
        self.commit(generation, |state| state.pending_target = None)
    }

    async fn run_recenter(&self) -> Transition {
        let begun = {
            let mut state = self.state.borrow_mut();
            match state.settle_intent() {
                None => None,
                Some(expected)
                    if state.active.is_none()
                        && state.pose.approx_eq(&expected, state.config.tolerance) =>
                {
                    state.mode = state.intent.clone();
                    if state.mode.is_overview() {
                        state.pending_target = None;
                    }
                    None
                }
                Some(expected) => {
                    let duration = match state.intent {
                        CameraMode::Overview => state.config.overview_duration,
                        CameraMode::Focus(_) => state.config.recenter_duration,
                    };
                    Some((state.next_generation(), expected, duration))
                }
            }
        };
        let Some((generation, expected, duration)) = begun else {
            trace!("recenter not needed");
            return Transition::Unchanged;
        };
        let outcome = self
            .run_phase(generation, Phase::Recenter, |_| (expected, duration))
            .await;
        if outcome == TweenOutcome::Superseded {
            return Transition::Superseded;
        }
        self.commit(generation, |state| {
            state.mode = state.intent.clone();
            if state.mode.is_overview() {
                state.pending_target = None;
            }
        })
    }

    /// Starts one tween planned from the live state, unless a newer command exists.
    fn run_phase(
        &self,
        generation: u64,
        phase: Phase,
        plan: impl FnOnce(&State) -> (CameraPose, Duration),
    ) -> PhaseWait {
        let mut state = self.state.borrow_mut();
        if state.generation != generation {
            return PhaseWait::Stale;
        }
        let (to, duration) = plan(&state);
        PhaseWait::Running(state.start_tween(generation, phase, to, duration))
    }

    fn commit(&self, generation: u64, apply: impl FnOnce(&mut State)) -> Transition {
        let mut state = self.state.borrow_mut();
        if state.generation != generation {
            return Transition::Superseded;
        }
        apply(&mut state);
        debug!(mode = ?state.mode, generation, "transition complete");
        Transition::Completed
    }

    /// Live pose.
    #[must_use]
    pub fn pose(&self) -> CameraPose {
        self.state.borrow().pose
    }

    /// Committed mode.
    #[must_use]
    pub fn mode(&self) -> CameraMode {
        self.state.borrow().mode.clone()
    }

    /// Mode the newest command is heading to; equal to [`mode`](Self::mode) at rest.
    #[must_use]
    pub fn intent(&self) -> CameraMode {
        self.state.borrow().intent.clone()
    }

    /// Id of the committed focus, or of the root in overview.
    ///
    /// `None` only for an empty layout.
    #[must_use]
    pub fn focused_id(&self) -> Option<String> {
        let state = self.state.borrow();
        state.current().map(|ix| state.id_at(ix))
    }

    /// Id of the most recent focus target, cleared when an overview transition ends.
    #[must_use]
    pub fn pending_target(&self) -> Option<String> {
        self.state.borrow().pending_target.clone()
    }

    /// Phase of the running tween.
    #[must_use]
    pub fn phase(&self) -> Option<Phase> {
        self.state.borrow().active.as_ref().map(|a| a.phase)
    }

    /// Whether a tween is running.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.state.borrow().active.is_some()
    }

    /// The layout being shown.
    #[must_use]
    pub fn layout(&self) -> Rc<LayoutResult> {
        Rc::clone(&self.state.borrow().layout)
    }

    /// Canvas size.
    #[must_use]
    pub fn canvas(&self) -> Size {
        self.state.borrow().canvas
    }

    /// Configuration.
    #[must_use]
    pub fn config(&self) -> CameraConfig {
        self.state.borrow().config
    }

    /// Inputs of the transform math for the current layout and canvas.
    #[must_use]
    pub fn geometry(&self) -> CanvasGeometry {
        self.state.borrow().geometry()
    }

    /// Root-to-focus path of layout indices.
    #[must_use]
    pub fn breadcrumbs(&self) -> SmallVec<[LayoutIx; 8]> {
        let state = self.state.borrow();
        state
            .current()
            .map(|ix| ancestry(&state.layout, ix))
            .unwrap_or_default()
    }

    /// Everything a renderer or debug overlay reads in one borrow.
    #[must_use]
    pub fn snapshot(&self) -> CameraSnapshot {
        let state = self.state.borrow();
        CameraSnapshot {
            pose: state.pose,
            mode: state.mode.clone(),
            intent: state.intent.clone(),
            pending_target: state.pending_target.clone(),
            phase: state.active.as_ref().map(|a| a.phase),
            world_center: state.geometry().world_at_center(&state.pose),
        }
    }
}

/// Wait for one phase: either its tween, or an immediate stale result.
enum PhaseWait {
    Running(TweenDone),
    Stale,
}

impl Future for PhaseWait {
    type Output = TweenOutcome;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.get_mut() {
            Self::Running(done) => Pin::new(done).poll(cx),
            Self::Stale => Poll::Ready(TweenOutcome::Superseded),
        }
    }
}
