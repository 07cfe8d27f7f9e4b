use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, trace};

use super::direction::{Axis, Direction, DirectionFilter};
use super::policy::{
    DoubleTouchAction, GesturePolicy, LongPressAction, MultiTapAction, PanAction, PinchAction,
    SwipeAction,
};
use super::types::{GesturePhase, GestureSample, Point, RawGesture, UnitPoint, Vector};
use crate::jump::JumpDirection;

/// Center dead band used by the multi-tap side test on compact layouts.
const COMPACT_MID_PADDING: f64 = 20.0;
const REGULAR_MID_PADDING: f64 = 50.0;

/// Which family of handlers a new gesture is dispatched to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandlerContext {
    Default,
    /// Gestures are locked; only the configured lock toggle gets through.
    Locked,
    /// A scrub owned by someone else is in progress; new gestures are inert.
    Scrubbing,
}

/// Snapshot of the presentation and media facts the router needs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RouteContext {
    pub overlay_visible: bool,
    pub supplement_presented: bool,
    pub is_compact_layout: bool,
    pub is_gesture_locked: bool,
    pub is_scrubbing: bool,
    pub is_live_stream: bool,
}

impl RouteContext {
    pub fn handler_context(&self) -> HandlerContext {
        if self.is_gesture_locked {
            HandlerContext::Locked
        } else if self.is_scrubbing {
            HandlerContext::Scrubbing
        } else {
            HandlerContext::Default
        }
    }
}

/// Domain action derived from a raw gesture.
#[derive(Clone, Debug, PartialEq)]
pub enum GestureIntent {
    /// Single tap: flip the overlay, or dismiss a drawer on regular layouts.
    ToggleOverlay,
    HideOverlay,
    /// A continuous gesture started; auto-hide should hold off.
    InteractionBegan,
    InteractionEnded,
    /// `window` overrides the accumulator's default burst window.
    Jump {
        direction: JumpDirection,
        window: Option<Duration>,
    },
    ScrubBegan {
        started_with_overlay: bool,
    },
    ScrubMoved {
        axis: Axis,
        sample: GestureSample,
        damping: f64,
    },
    ScrubEnded {
        started_with_overlay: bool,
    },
    /// Offset from the level at gesture start, before clamping.
    AdjustBrightness {
        delta: f64,
    },
    AdjustVolume {
        delta: f64,
    },
    SupplementDrag {
        sample: GestureSample,
    },
    SetAspectFill(bool),
    ToggleAspectFill,
    ToggleGestureLock,
    TogglePlayPause,
    /// A gesture arrived while locked.
    GesturesLocked,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Routing {
    Accepted(Vec<GestureIntent>),
    /// The gesture started in a filtered-out direction and is handed back to
    /// the host recognizer. Later phases of the same gesture stay rejected.
    Rejected,
}

impl Routing {
    fn inert() -> Self {
        Routing::Accepted(Vec::new())
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Routing::Rejected)
    }

    pub fn intents(&self) -> &[GestureIntent] {
        match self {
            Routing::Accepted(intents) => intents,
            Routing::Rejected => &[],
        }
    }

    pub fn into_intents(self) -> Vec<GestureIntent> {
        match self {
            Routing::Accepted(intents) => intents,
            Routing::Rejected => Vec::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum PanHandler {
    Rejected,
    Locked,
    Inert,
    Swipe { did_swipe: bool },
    Scrub { damping: f64 },
    Brightness,
    Volume,
    SupplementDrag,
}

#[derive(Clone, Copy, Debug)]
struct ActivePan {
    direction: Direction,
    handler: PanHandler,
    started_with_overlay: bool,
    is_live_stream: bool,
}

#[derive(Clone, Copy, Debug)]
struct TapRecord {
    is_left: bool,
    at: Instant,
}

/// Turns raw recognizer output into [`GestureIntent`]s.
///
/// Pan handlers are chosen once, at `Began`, and stay fixed until the
/// gesture ends, so a pan that started a scrub keeps scrubbing even though
/// the context switches to [`HandlerContext::Scrubbing`] underneath it.
#[derive(Debug)]
pub struct GestureActionRouter {
    policy: GesturePolicy,
    pan_filter: DirectionFilter,
    tap_window: Duration,
    active_pan: Option<ActivePan>,
    last_tap: Option<TapRecord>,
}

impl GestureActionRouter {
    pub fn new(policy: GesturePolicy, pan_filter: DirectionFilter, tap_window: Duration) -> Self {
        Self {
            policy,
            pan_filter,
            tap_window,
            active_pan: None,
            last_tap: None,
        }
    }

    pub fn policy(&self) -> &GesturePolicy {
        &self.policy
    }

    pub fn set_policy(&mut self, policy: GesturePolicy) {
        self.policy = policy;
    }

    pub fn pan_filter(&self) -> DirectionFilter {
        self.pan_filter
    }

    /// Direction of the pan in progress, if any.
    pub fn active_pan_direction(&self) -> Option<Direction> {
        self.active_pan.map(|pan| pan.direction)
    }

    pub fn route(&mut self, raw: &RawGesture, ctx: &RouteContext) -> Routing {
        let routing = match raw {
            RawGesture::Pan {
                phase, velocity, ..
            } => self.route_pan(*phase, *velocity, raw.sample(), ctx),
            RawGesture::Pinch { phase, scale, .. } => self.route_pinch(*phase, *scale, ctx),
            RawGesture::Tap {
                count,
                location,
                unit_point,
            } => self.route_tap(*count, *location, *unit_point, ctx),
            RawGesture::LongPress { phase, .. } => self.route_long_press(*phase, ctx),
        };
        trace!(?raw, ?routing, "gesture routed");
        routing
    }

    fn route_pan(
        &mut self,
        phase: GesturePhase,
        velocity: Vector,
        sample: GestureSample,
        ctx: &RouteContext,
    ) -> Routing {
        let mut intents = Vec::new();
        if phase == GesturePhase::Began {
            if let Some(abandoned) = self.active_pan.take() {
                debug!(handler = ?abandoned.handler, "pan began before the previous one ended");
                intents.extend(Self::closing_intents(&abandoned));
            }
            let pan = self.begin_pan(velocity, sample.unit_point, ctx);
            self.active_pan = Some(pan);
            if pan.handler == PanHandler::Rejected {
                debug!(direction = ?pan.direction, filter = ?self.pan_filter, "pan rejected");
                // The abandoned pan still has to release its holds.
                if intents.is_empty() {
                    return Routing::Rejected;
                }
                return Routing::Accepted(intents);
            }
        }

        let Some(mut pan) = self.active_pan else {
            return Routing::inert();
        };

        let terminal = phase.is_terminal();
        if terminal {
            self.active_pan = None;
        }

        match pan.handler {
            PanHandler::Rejected => return Routing::Rejected,
            PanHandler::Inert => return Routing::Accepted(intents),
            PanHandler::Locked => {
                if phase == GesturePhase::Began {
                    intents.push(GestureIntent::GesturesLocked);
                }
                return Routing::Accepted(intents);
            }
            _ => {}
        }

        if phase == GesturePhase::Began {
            intents.push(GestureIntent::InteractionBegan);
        }

        match &mut pan.handler {
            PanHandler::Swipe { did_swipe } => {
                if !*did_swipe
                    && sample.velocity.max_magnitude() >= self.policy.swipe_min_velocity
                    && sample.translation.max_magnitude() >= self.policy.swipe_min_translation
                {
                    *did_swipe = true;
                    if !pan.is_live_stream {
                        let direction = match pan.direction {
                            Direction::Left => JumpDirection::Backward,
                            _ => JumpDirection::Forward,
                        };
                        intents.push(GestureIntent::Jump {
                            direction,
                            window: None,
                        });
                    }
                }
            }
            PanHandler::Scrub { damping } => {
                let axis = pan.direction.axis();
                if phase == GesturePhase::Began {
                    intents.push(GestureIntent::ScrubBegan {
                        started_with_overlay: pan.started_with_overlay,
                    });
                }
                if terminal {
                    intents.push(GestureIntent::ScrubEnded {
                        started_with_overlay: pan.started_with_overlay,
                    });
                } else {
                    intents.push(GestureIntent::ScrubMoved {
                        axis,
                        sample,
                        damping: *damping,
                    });
                }
            }
            PanHandler::Brightness if !terminal => {
                intents.push(GestureIntent::AdjustBrightness {
                    delta: self.level_delta(&sample, pan.direction.axis()),
                });
            }
            PanHandler::Volume if !terminal => {
                intents.push(GestureIntent::AdjustVolume {
                    delta: self.level_delta(&sample, pan.direction.axis()),
                });
            }
            PanHandler::SupplementDrag => {
                intents.push(GestureIntent::SupplementDrag { sample });
            }
            _ => {}
        }

        if terminal {
            intents.push(GestureIntent::InteractionEnded);
        } else {
            self.active_pan = Some(pan);
        }

        Routing::Accepted(intents)
    }

    fn begin_pan(&self, velocity: Vector, start: UnitPoint, ctx: &RouteContext) -> ActivePan {
        let direction = Direction::from_velocity(velocity);
        let mut pan = ActivePan {
            direction,
            handler: PanHandler::Inert,
            started_with_overlay: ctx.overlay_visible,
            is_live_stream: ctx.is_live_stream,
        };

        pan.handler = match ctx.handler_context() {
            _ if !self.pan_filter.allows(direction) => PanHandler::Rejected,
            HandlerContext::Locked => PanHandler::Locked,
            HandlerContext::Scrubbing => PanHandler::Inert,
            HandlerContext::Default if ctx.supplement_presented => PanHandler::SupplementDrag,
            HandlerContext::Default => {
                if direction.is_horizontal() && self.policy.horizontal_swipe != SwipeAction::None {
                    PanHandler::Swipe { did_swipe: false }
                } else {
                    self.pan_handler_for(direction, start, ctx)
                }
            }
        };
        pan
    }

    /// Intents that release an unfinished pan, as if it had been cancelled.
    fn closing_intents(pan: &ActivePan) -> Vec<GestureIntent> {
        match pan.handler {
            PanHandler::Rejected | PanHandler::Locked | PanHandler::Inert => Vec::new(),
            PanHandler::Scrub { .. } => vec![
                GestureIntent::ScrubEnded {
                    started_with_overlay: pan.started_with_overlay,
                },
                GestureIntent::InteractionEnded,
            ],
            _ => vec![GestureIntent::InteractionEnded],
        }
    }

    fn pan_handler_for(
        &self,
        direction: Direction,
        start: UnitPoint,
        ctx: &RouteContext,
    ) -> PanHandler {
        let action = if direction.is_horizontal() {
            self.policy.horizontal_pan
        } else if start.x < 0.5 {
            self.policy.vertical_pan_left
        } else {
            self.policy.vertical_pan_right
        };

        match (action, ctx.is_live_stream) {
            (PanAction::None, _)
            | (PanAction::Scrub, true)
            | (PanAction::SlowScrub, true) => PanHandler::SupplementDrag,
            (PanAction::Scrub, false) => PanHandler::Scrub { damping: 1.0 },
            (PanAction::SlowScrub, false) => PanHandler::Scrub {
                damping: self.policy.slow_scrub_damping,
            },
            (PanAction::Brightness, _) => PanHandler::Brightness,
            (PanAction::Volume, _) => PanHandler::Volume,
        }
    }

    fn level_delta(&self, sample: &GestureSample, axis: Axis) -> f64 {
        sample.signed_translation(axis) / self.policy.level_sensitivity
    }

    fn route_pinch(&mut self, phase: GesturePhase, scale: f64, ctx: &RouteContext) -> Routing {
        match ctx.handler_context() {
            HandlerContext::Locked => {
                if phase == GesturePhase::Began && self.policy.pinch != PinchAction::None {
                    Routing::Accepted(vec![GestureIntent::GesturesLocked])
                } else {
                    Routing::inert()
                }
            }
            HandlerContext::Scrubbing => Routing::inert(),
            HandlerContext::Default => match self.policy.pinch {
                PinchAction::AspectFill if phase == GesturePhase::Ended && scale != 1.0 => {
                    Routing::Accepted(vec![GestureIntent::SetAspectFill(scale > 1.0)])
                }
                _ => Routing::inert(),
            },
        }
    }

    fn route_tap(
        &mut self,
        count: u32,
        location: Point,
        unit_point: UnitPoint,
        ctx: &RouteContext,
    ) -> Routing {
        match count {
            0 => Routing::inert(),
            1 => self.route_single_tap(location, unit_point, ctx),
            _ => self.route_double_touch(ctx),
        }
    }

    fn route_single_tap(
        &mut self,
        location: Point,
        unit_point: UnitPoint,
        ctx: &RouteContext,
    ) -> Routing {
        match ctx.handler_context() {
            HandlerContext::Locked => {
                return Routing::Accepted(vec![GestureIntent::GesturesLocked]);
            }
            HandlerContext::Scrubbing => return Routing::inert(),
            HandlerContext::Default => {}
        }

        if ctx.supplement_presented {
            self.last_tap = None;
            return Routing::Accepted(vec![GestureIntent::ToggleOverlay]);
        }

        if self.policy.multi_tap == MultiTapAction::None || ctx.is_live_stream {
            return Routing::Accepted(vec![GestureIntent::ToggleOverlay]);
        }

        let width = if unit_point.x > 0.0 {
            location.x / unit_point.x
        } else {
            0.0
        };
        let padding = if ctx.is_compact_layout {
            COMPACT_MID_PADDING
        } else {
            REGULAR_MID_PADDING
        };
        let is_left = location.x < width / 2.0 - padding;
        let now = Instant::now();

        let repeated = self
            .last_tap
            .is_some_and(|last| last.is_left == is_left && now - last.at <= self.tap_window);
        self.last_tap = Some(TapRecord { is_left, at: now });

        if !repeated {
            return Routing::Accepted(vec![GestureIntent::ToggleOverlay]);
        }

        let direction = if is_left {
            JumpDirection::Backward
        } else {
            JumpDirection::Forward
        };
        Routing::Accepted(vec![
            GestureIntent::HideOverlay,
            GestureIntent::Jump {
                direction,
                window: Some(self.tap_window),
            },
        ])
    }

    fn route_double_touch(&mut self, ctx: &RouteContext) -> Routing {
        let locked = ctx.handler_context() == HandlerContext::Locked;
        if ctx.handler_context() == HandlerContext::Scrubbing {
            return Routing::inert();
        }

        let intent = match self.policy.double_touch {
            DoubleTouchAction::None => return Routing::inert(),
            DoubleTouchAction::GestureLock => GestureIntent::ToggleGestureLock,
            _ if locked => GestureIntent::GesturesLocked,
            DoubleTouchAction::AspectFill => GestureIntent::ToggleAspectFill,
            DoubleTouchAction::PausePlay => GestureIntent::TogglePlayPause,
        };
        Routing::Accepted(vec![intent])
    }

    fn route_long_press(&mut self, phase: GesturePhase, ctx: &RouteContext) -> Routing {
        if phase != GesturePhase::Began {
            return Routing::inert();
        }
        match self.policy.long_press {
            LongPressAction::GestureLock => {
                Routing::Accepted(vec![GestureIntent::ToggleGestureLock])
            }
            LongPressAction::None if ctx.is_gesture_locked => {
                Routing::Accepted(vec![GestureIntent::GesturesLocked])
            }
            LongPressAction::None => Routing::inert(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router(policy: GesturePolicy, filter: DirectionFilter) -> GestureActionRouter {
        GestureActionRouter::new(policy, filter, Duration::from_millis(350))
    }

    fn pan(phase: GesturePhase, translation: (f64, f64), velocity: (f64, f64)) -> RawGesture {
        pan_at(phase, translation, velocity, UnitPoint::new(0.75, 0.5))
    }

    fn pan_at(
        phase: GesturePhase,
        translation: (f64, f64),
        velocity: (f64, f64),
        unit_point: UnitPoint,
    ) -> RawGesture {
        RawGesture::Pan {
            phase,
            translation: Vector::new(translation.0, translation.1),
            velocity: Vector::new(velocity.0, velocity.1),
            location: Point::new(unit_point.x * 1000.0, unit_point.y * 500.0),
            unit_point,
        }
    }

    fn tap(x: f64) -> RawGesture {
        RawGesture::Tap {
            count: 1,
            location: Point::new(x, 250.0),
            unit_point: UnitPoint::new(x / 1000.0, 0.5),
        }
    }

    #[test]
    fn horizontal_filter_accepts_leftward_pan() {
        let mut router = router(GesturePolicy::default(), DirectionFilter::Horizontal);
        let routing = router.route(
            &pan(GesturePhase::Began, (0.0, 0.0), (-50.0, 5.0)),
            &RouteContext::default(),
        );

        assert!(!routing.is_rejected());
        assert_eq!(router.active_pan_direction(), Some(Direction::Left));
    }

    #[test]
    fn vertical_filter_rejects_leftward_pan_for_its_lifetime() {
        let mut router = router(GesturePolicy::default(), DirectionFilter::Vertical);
        let ctx = RouteContext::default();

        assert!(router.route(&pan(GesturePhase::Began, (0.0, 0.0), (-50.0, 5.0)), &ctx).is_rejected());
        // Direction is fixed at began; later movement cannot rescue the gesture.
        assert!(router.route(&pan(GesturePhase::Changed, (0.0, 90.0), (0.0, 400.0)), &ctx).is_rejected());
        assert!(router.route(&pan(GesturePhase::Ended, (0.0, 90.0), (0.0, 0.0)), &ctx).is_rejected());
        assert_eq!(router.active_pan_direction(), None);

        // The next gesture is classified afresh.
        assert!(!router.route(&pan(GesturePhase::Began, (0.0, 0.0), (0.0, 50.0)), &ctx).is_rejected());
    }

    #[test]
    fn filtered_pan_is_rejected_even_while_locked() {
        let mut router = router(GesturePolicy::default(), DirectionFilter::Vertical);
        let locked = RouteContext {
            is_gesture_locked: true,
            ..Default::default()
        };

        let routing = router.route(&pan(GesturePhase::Began, (0.0, 0.0), (-50.0, 5.0)), &locked);
        assert!(routing.is_rejected());
    }

    #[test]
    fn new_pan_releases_an_unfinished_scrub() {
        let mut router = router(GesturePolicy::default(), DirectionFilter::All);
        let ctx = RouteContext::default();

        router.route(&pan(GesturePhase::Began, (0.0, 0.0), (300.0, 0.0)), &ctx);
        router.route(&pan(GesturePhase::Changed, (50.0, 0.0), (300.0, 0.0)), &ctx);

        // The end of the first pan never arrives.
        let scrubbing = RouteContext {
            is_scrubbing: true,
            ..Default::default()
        };
        let next = router.route(&pan(GesturePhase::Began, (0.0, 0.0), (300.0, 0.0)), &scrubbing);
        assert_eq!(
            next.intents(),
            &[
                GestureIntent::ScrubEnded {
                    started_with_overlay: false
                },
                GestureIntent::InteractionEnded,
            ]
        );

        let ended = router.route(&pan(GesturePhase::Ended, (0.0, 0.0), (0.0, 0.0)), &scrubbing);
        assert!(ended.intents().is_empty());
        assert_eq!(router.active_pan_direction(), None);
    }

    #[test]
    fn rejected_pan_still_releases_the_one_it_replaced() {
        let mut router = router(GesturePolicy::default(), DirectionFilter::Horizontal);
        let ctx = RouteContext::default();

        router.route(&pan(GesturePhase::Began, (0.0, 0.0), (300.0, 0.0)), &ctx);
        let next = router.route(&pan(GesturePhase::Began, (0.0, 0.0), (0.0, 300.0)), &ctx);
        assert!(!next.is_rejected());
        assert_eq!(
            next.intents(),
            &[
                GestureIntent::ScrubEnded {
                    started_with_overlay: false
                },
                GestureIntent::InteractionEnded,
            ]
        );
        assert!(router.route(&pan(GesturePhase::Changed, (0.0, 40.0), (0.0, 300.0)), &ctx).is_rejected());
    }

    // Arbitrary tie-break: a zero-velocity start counts as vertical.
    #[test]
    fn zero_velocity_pan_is_vertical() {
        let mut horizontal = router(GesturePolicy::default(), DirectionFilter::Horizontal);
        let began = pan(GesturePhase::Began, (0.0, 0.0), (0.0, 0.0));
        assert!(horizontal.route(&began, &RouteContext::default()).is_rejected());

        let mut vertical = router(GesturePolicy::default(), DirectionFilter::Vertical);
        assert!(!vertical.route(&began, &RouteContext::default()).is_rejected());
        assert_eq!(vertical.active_pan_direction(), Some(Direction::Up));
    }

    #[test]
    fn horizontal_pan_scrubs_with_interaction_brackets() {
        let mut router = router(GesturePolicy::default(), DirectionFilter::All);
        let ctx = RouteContext {
            overlay_visible: false,
            ..Default::default()
        };

        let began = router
            .route(&pan(GesturePhase::Began, (0.0, 0.0), (300.0, 10.0)), &ctx)
            .into_intents();
        assert_eq!(began[0], GestureIntent::InteractionBegan);
        assert_eq!(
            began[1],
            GestureIntent::ScrubBegan {
                started_with_overlay: false
            }
        );
        assert!(matches!(
            began[2],
            GestureIntent::ScrubMoved {
                axis: Axis::Horizontal,
                damping,
                ..
            } if damping == 1.0
        ));

        // Context flips to scrubbing mid-gesture; the pan keeps its handler.
        let scrubbing = RouteContext {
            is_scrubbing: true,
            overlay_visible: true,
            ..Default::default()
        };
        let changed = router
            .route(&pan(GesturePhase::Changed, (120.0, 0.0), (300.0, 0.0)), &scrubbing)
            .into_intents();
        assert!(matches!(changed.as_slice(), [GestureIntent::ScrubMoved { .. }]));

        let ended = router
            .route(&pan(GesturePhase::Ended, (120.0, 0.0), (0.0, 0.0)), &scrubbing)
            .into_intents();
        assert_eq!(
            ended,
            vec![
                GestureIntent::ScrubEnded {
                    started_with_overlay: false
                },
                GestureIntent::InteractionEnded,
            ]
        );
    }

    #[test]
    fn slow_scrub_uses_damping_and_live_streams_never_scrub() {
        let policy = GesturePolicy {
            horizontal_pan: PanAction::SlowScrub,
            ..Default::default()
        };
        let mut router = router(policy, DirectionFilter::All);
        let began = router
            .route(&pan(GesturePhase::Began, (0.0, 0.0), (300.0, 0.0)), &RouteContext::default())
            .into_intents();
        assert!(began.iter().any(|intent| matches!(
            intent,
            GestureIntent::ScrubMoved { damping, .. } if (*damping - 0.1).abs() < f64::EPSILON
        )));
        router.route(&pan(GesturePhase::Cancelled, (0.0, 0.0), (0.0, 0.0)), &RouteContext::default());

        let live = RouteContext {
            is_live_stream: true,
            ..Default::default()
        };
        let began = router
            .route(&pan(GesturePhase::Began, (0.0, 0.0), (300.0, 0.0)), &live)
            .into_intents();
        assert!(!began.iter().any(|intent| matches!(intent, GestureIntent::ScrubBegan { .. })));
        assert!(began.iter().any(|intent| matches!(intent, GestureIntent::SupplementDrag { .. })));
    }

    #[test]
    fn vertical_pan_side_selects_brightness_or_volume() {
        let mut router = router(GesturePolicy::default(), DirectionFilter::All);
        let ctx = RouteContext::default();

        router.route(
            &pan_at(GesturePhase::Began, (0.0, 0.0), (0.0, -200.0), UnitPoint::new(0.2, 0.5)),
            &ctx,
        );
        let changed = router
            .route(
                &pan_at(GesturePhase::Changed, (0.0, -150.0), (0.0, -200.0), UnitPoint::new(0.2, 0.2)),
                &ctx,
            )
            .into_intents();
        assert_eq!(changed, vec![GestureIntent::AdjustBrightness { delta: 0.5 }]);
        router.route(&pan(GesturePhase::Ended, (0.0, -150.0), (0.0, 0.0)), &ctx);

        router.route(
            &pan_at(GesturePhase::Began, (0.0, 0.0), (0.0, 200.0), UnitPoint::new(0.8, 0.5)),
            &ctx,
        );
        let changed = router
            .route(&pan(GesturePhase::Changed, (0.0, 60.0), (0.0, 200.0)), &ctx)
            .into_intents();
        assert_eq!(changed, vec![GestureIntent::AdjustVolume { delta: -0.2 }]);
    }

    #[test]
    fn swipe_jumps_once_per_gesture() {
        let policy = GesturePolicy {
            horizontal_swipe: SwipeAction::Jump,
            ..Default::default()
        };
        let mut router = router(policy, DirectionFilter::All);
        let ctx = RouteContext::default();

        router.route(&pan(GesturePhase::Began, (0.0, 0.0), (-1500.0, 0.0)), &ctx);
        let first = router
            .route(&pan(GesturePhase::Changed, (-90.0, 0.0), (-1500.0, 0.0)), &ctx)
            .into_intents();
        let second = router
            .route(&pan(GesturePhase::Changed, (-200.0, 0.0), (-1500.0, 0.0)), &ctx)
            .into_intents();

        assert_eq!(
            first,
            vec![GestureIntent::Jump {
                direction: JumpDirection::Backward,
                window: None
            }]
        );
        assert!(second.is_empty());
    }

    #[test]
    fn locked_gestures_report_once_and_lock_toggle_passes() {
        let mut router = router(GesturePolicy::default(), DirectionFilter::All);
        let locked = RouteContext {
            is_gesture_locked: true,
            ..Default::default()
        };

        let began = router.route(&pan(GesturePhase::Began, (0.0, 0.0), (300.0, 0.0)), &locked);
        assert_eq!(began.intents(), &[GestureIntent::GesturesLocked]);
        let changed = router.route(&pan(GesturePhase::Changed, (50.0, 0.0), (300.0, 0.0)), &locked);
        assert!(changed.intents().is_empty());

        assert_eq!(router.route(&tap(500.0), &locked).intents(), &[GestureIntent::GesturesLocked]);

        let long_press = RawGesture::LongPress {
            phase: GesturePhase::Began,
            location: Point::new(500.0, 250.0),
            unit_point: UnitPoint::CENTER,
        };
        assert_eq!(
            router.route(&long_press, &locked).intents(),
            &[GestureIntent::ToggleGestureLock]
        );
    }

    #[test]
    fn long_press_only_acts_on_began() {
        let mut router = router(GesturePolicy::default(), DirectionFilter::All);
        let ended = RawGesture::LongPress {
            phase: GesturePhase::Ended,
            location: Point::new(500.0, 250.0),
            unit_point: UnitPoint::CENTER,
        };
        assert!(router.route(&ended, &RouteContext::default()).intents().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_taps_on_one_side_jump() {
        let mut router = router(GesturePolicy::default(), DirectionFilter::All);
        let ctx = RouteContext::default();

        assert_eq!(router.route(&tap(900.0), &ctx).intents(), &[GestureIntent::ToggleOverlay]);
        tokio::time::advance(Duration::from_millis(200)).await;
        assert_eq!(
            router.route(&tap(880.0), &ctx).intents(),
            &[
                GestureIntent::HideOverlay,
                GestureIntent::Jump {
                    direction: JumpDirection::Forward,
                    window: Some(Duration::from_millis(350)),
                },
            ]
        );

        // Other side starts over.
        assert_eq!(router.route(&tap(100.0), &ctx).intents(), &[GestureIntent::ToggleOverlay]);

        // Too slow.
        tokio::time::advance(Duration::from_millis(500)).await;
        assert_eq!(router.route(&tap(120.0), &ctx).intents(), &[GestureIntent::ToggleOverlay]);
    }

    #[test]
    fn single_tap_with_supplement_goes_to_coordinator() {
        let mut router = router(GesturePolicy::default(), DirectionFilter::All);
        let ctx = RouteContext {
            supplement_presented: true,
            ..Default::default()
        };
        assert_eq!(router.route(&tap(900.0), &ctx).intents(), &[GestureIntent::ToggleOverlay]);
        assert_eq!(router.route(&tap(900.0), &ctx).intents(), &[GestureIntent::ToggleOverlay]);
    }

    #[test]
    fn double_touch_actions() {
        let double = RawGesture::Tap {
            count: 2,
            location: Point::new(500.0, 250.0),
            unit_point: UnitPoint::CENTER,
        };
        let locked = RouteContext {
            is_gesture_locked: true,
            ..Default::default()
        };

        let mut inert = router(GesturePolicy::inert(), DirectionFilter::All);
        assert!(inert.route(&double, &RouteContext::default()).intents().is_empty());

        let mut pause = router(
            GesturePolicy {
                double_touch: DoubleTouchAction::PausePlay,
                ..Default::default()
            },
            DirectionFilter::All,
        );
        assert_eq!(
            pause.route(&double, &RouteContext::default()).intents(),
            &[GestureIntent::TogglePlayPause]
        );
        assert_eq!(pause.route(&double, &locked).intents(), &[GestureIntent::GesturesLocked]);

        let mut lock = router(
            GesturePolicy {
                double_touch: DoubleTouchAction::GestureLock,
                ..Default::default()
            },
            DirectionFilter::All,
        );
        assert_eq!(lock.route(&double, &locked).intents(), &[GestureIntent::ToggleGestureLock]);
    }

    #[test]
    fn pinch_decides_aspect_fill_on_end() {
        let mut router = router(GesturePolicy::default(), DirectionFilter::Vertical);
        let pinch = |phase, scale| RawGesture::Pinch {
            phase,
            scale,
            velocity: 0.0,
            location: Point::new(500.0, 250.0),
            unit_point: UnitPoint::CENTER,
        };
        let ctx = RouteContext::default();

        // Pinches ignore the pan direction filter.
        assert!(router.route(&pinch(GesturePhase::Began, 1.0), &ctx).intents().is_empty());
        assert!(router.route(&pinch(GesturePhase::Changed, 1.4), &ctx).intents().is_empty());
        assert_eq!(
            router.route(&pinch(GesturePhase::Ended, 1.4), &ctx).intents(),
            &[GestureIntent::SetAspectFill(true)]
        );
        assert_eq!(
            router.route(&pinch(GesturePhase::Ended, 0.7), &ctx).intents(),
            &[GestureIntent::SetAspectFill(false)]
        );
    }

    #[test]
    fn inert_policy_does_nothing_for_pans() {
        let mut router = router(GesturePolicy::inert(), DirectionFilter::All);
        let began = router
            .route(&pan(GesturePhase::Began, (0.0, 0.0), (300.0, 0.0)), &RouteContext::default())
            .into_intents();
        // `none` hands the pan to the drawer, matching the player's behaviour.
        assert!(matches!(
            began.as_slice(),
            [GestureIntent::InteractionBegan, GestureIntent::SupplementDrag { .. }]
        ));
    }
}
