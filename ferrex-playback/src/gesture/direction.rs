use serde::{Deserialize, Serialize};

use super::types::Vector;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    Horizontal,
    Vertical,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Classify a pan from its initial velocity.
    ///
    /// The dominant axis wins; on a tie (including a zero velocity) the pan
    /// is vertical because the comparison is strict. A zero vertical
    /// component then resolves to `Up`.
    pub fn from_velocity(velocity: Vector) -> Self {
        if velocity.y.abs() < velocity.x.abs() {
            if velocity.x > 0.0 {
                Direction::Right
            } else {
                Direction::Left
            }
        } else if velocity.y > 0.0 {
            Direction::Down
        } else {
            Direction::Up
        }
    }

    pub fn axis(self) -> Axis {
        match self {
            Direction::Left | Direction::Right => Axis::Horizontal,
            Direction::Up | Direction::Down => Axis::Vertical,
        }
    }

    pub fn is_horizontal(self) -> bool {
        self.axis() == Axis::Horizontal
    }

    pub fn is_vertical(self) -> bool {
        self.axis() == Axis::Vertical
    }
}

/// Set of directions a gesture may start in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectionFilter {
    Up,
    Down,
    Left,
    Right,
    Horizontal,
    Vertical,
    #[default]
    All,
    AllButDown,
}

impl DirectionFilter {
    pub fn allows(self, direction: Direction) -> bool {
        match self {
            DirectionFilter::Up => direction == Direction::Up,
            DirectionFilter::Down => direction == Direction::Down,
            DirectionFilter::Left => direction == Direction::Left,
            DirectionFilter::Right => direction == Direction::Right,
            DirectionFilter::Horizontal => direction.is_horizontal(),
            DirectionFilter::Vertical => direction.is_vertical(),
            DirectionFilter::All => true,
            DirectionFilter::AllButDown => direction != Direction::Down,
        }
    }
}
