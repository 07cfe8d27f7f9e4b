use serde::{Deserialize, Serialize};

/// What a continuous pan controls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanAction {
    #[default]
    None,
    Scrub,
    SlowScrub,
    Brightness,
    Volume,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwipeAction {
    #[default]
    None,
    Jump,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiTapAction {
    #[default]
    None,
    Jump,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoubleTouchAction {
    #[default]
    None,
    AspectFill,
    GestureLock,
    PausePlay,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LongPressAction {
    #[default]
    None,
    GestureLock,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinchAction {
    #[default]
    None,
    AspectFill,
}

/// User-configurable mapping from gesture kinds to actions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GesturePolicy {
    pub horizontal_pan: PanAction,
    /// Vertical pans starting on the left half of the view.
    pub vertical_pan_left: PanAction,
    /// Vertical pans starting on the right half of the view.
    pub vertical_pan_right: PanAction,
    pub horizontal_swipe: SwipeAction,
    pub multi_tap: MultiTapAction,
    pub double_touch: DoubleTouchAction,
    pub long_press: LongPressAction,
    pub pinch: PinchAction,
    /// Scrub speed multiplier used by [`PanAction::SlowScrub`].
    pub slow_scrub_damping: f64,
    /// Points of travel that map to a full 0..1 brightness/volume range.
    pub level_sensitivity: f64,
    pub swipe_min_velocity: f64,
    pub swipe_min_translation: f64,
}

impl Default for GesturePolicy {
    fn default() -> Self {
        Self {
            horizontal_pan: PanAction::Scrub,
            vertical_pan_left: PanAction::Brightness,
            vertical_pan_right: PanAction::Volume,
            horizontal_swipe: SwipeAction::None,
            multi_tap: MultiTapAction::Jump,
            double_touch: DoubleTouchAction::None,
            long_press: LongPressAction::GestureLock,
            pinch: PinchAction::AspectFill,
            slow_scrub_damping: 0.1,
            level_sensitivity: 300.0,
            swipe_min_velocity: 1_200.0,
            swipe_min_translation: 80.0,
        }
    }
}

impl GesturePolicy {
    /// Policy with every gesture inert; handy as a base for tests and
    /// embedders that opt in one action at a time.
    pub fn inert() -> Self {
        Self {
            horizontal_pan: PanAction::None,
            vertical_pan_left: PanAction::None,
            vertical_pan_right: PanAction::None,
            horizontal_swipe: SwipeAction::None,
            multi_tap: MultiTapAction::None,
            double_touch: DoubleTouchAction::None,
            long_press: LongPressAction::None,
            pinch: PinchAction::None,
            ..Self::default()
        }
    }
}
