//! Gesture classification and routing
//!
//! Raw recognizer events come in as [`RawGesture`]; the
//! [`GestureActionRouter`] turns them into [`GestureIntent`]s according to
//! the configured [`GesturePolicy`] and the current [`HandlerContext`].

pub mod direction;
pub mod policy;
pub mod router;
pub mod types;

pub use direction::{Axis, Direction, DirectionFilter};
pub use policy::{
    DoubleTouchAction, GesturePolicy, LongPressAction, MultiTapAction, PanAction,
    PinchAction, SwipeAction,
};
pub use router::{GestureActionRouter, GestureIntent, HandlerContext, RouteContext, Routing};
pub use types::{GesturePhase, GestureSample, Point, RawGesture, UnitPoint, Vector};
