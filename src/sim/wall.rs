//! Wall segments
//!
//! A wall is plain data. Hazard, bounce and vertical effect are independent
//! decorations; which combinations actually appear is decided by the
//! generator, not enforced here.

use serde::{Deserialize, Serialize};

use super::rect::Rect;

/// Stable identity of a generated wall within one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WallId(pub u32);

/// Which column a wall belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WallSide {
    Left,
    Right,
}

impl WallSide {
    pub fn opposite(self) -> Self {
        match self {
            WallSide::Left => WallSide::Right,
            WallSide::Right => WallSide::Left,
        }
    }

    /// Horizontal direction pointing away from this column into the play area
    pub fn inward(self) -> f32 {
        match self {
            WallSide::Left => 1.0,
            WallSide::Right => -1.0,
        }
    }
}

/// Decoration carried by special walls. Has no effect on physics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VerticalEffect {
    #[default]
    Normal,
    LiftUp,
    FastDown,
}

/// How the player is expected to reach a wall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Approach {
    /// First wall, jumped to from the floor
    Ground,
    /// Jump across from the opposite column
    Lateral,
    /// Jump out and double-jump back to the same column
    SameSide,
}

/// One vertical wall segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub id: WallId,
    pub side: WallSide,
    pub rect: Rect,
    pub has_spikes: bool,
    pub is_bounce: bool,
    pub vertical_effect: VerticalEffect,
    pub approach: Approach,
    /// Expected contact point, measured up from the wall's bottom edge
    pub contact_height: f32,
    /// Planned rise above the previous contact point (0 for the first wall)
    pub rise: f32,
}

impl Wall {
    /// Current world y of the expected contact point
    #[inline]
    pub fn contact_y(&self) -> f32 {
        self.rect.y + self.contact_height
    }

    /// x of the face the player touches
    #[inline]
    pub fn inner_face_x(&self) -> f32 {
        match self.side {
            WallSide::Left => self.rect.right(),
            WallSide::Right => self.rect.x,
        }
    }

    /// Walls the player can attach to (bounce walls repel instead)
    #[inline]
    pub fn is_sticky(&self) -> bool {
        !self.is_bounce
    }
}
