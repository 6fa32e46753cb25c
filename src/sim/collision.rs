//! Contact tests and collision response for the player body
//!
//! Walls only ever touch the player from the side, so everything here is
//! one-dimensional along x once the vertical spans are known to intersect.

use super::rect::Rect;
use super::wall::{Wall, WallSide};

/// Whether `body` touches `wall` on the wall's inward face.
///
/// Strict overlap counts, and so does a horizontal gap up to `tolerance`
/// as long as the vertical spans intersect. Near-misses latch on rather
/// than dropping the player.
pub fn touches_wall(body: &Rect, wall: &Wall, tolerance: f32) -> bool {
    if body.overlaps(&wall.rect) {
        return true;
    }
    if !body.overlaps_vertically(&wall.rect) {
        return false;
    }
    let gap = match wall.side {
        WallSide::Left => body.x - wall.rect.right(),
        WallSide::Right => wall.rect.x - body.right(),
    };
    (0.0..=tolerance).contains(&gap)
}

/// x that puts `body` flush against the wall's inward face
pub fn flush_x(body: &Rect, wall: &Wall) -> f32 {
    match wall.side {
        WallSide::Left => wall.rect.right(),
        WallSide::Right => wall.rect.x - body.w,
    }
}

/// Push result for a bounce wall
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BounceResult {
    /// Corrected x for the body
    pub x: f32,
    /// Horizontal direction of the new velocity
    pub dir: f32,
}

/// Resolve an overlap with a bounce wall: flush outside its inward face,
/// heading back into the play area. `None` when there is no overlap.
pub fn bounce_off(body: &Rect, wall: &Wall) -> Option<BounceResult> {
    if !wall.is_bounce || !body.overlaps(&wall.rect) {
        return None;
    }
    Some(BounceResult {
        x: flush_x(body, wall),
        dir: wall.side.inward(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::wall::{Approach, VerticalEffect, WallId};

    fn wall(side: WallSide, bounce: bool) -> Wall {
        let x = match side {
            WallSide::Left => 30.0,
            WallSide::Right => 440.0,
        };
        Wall {
            id: WallId(7),
            side,
            rect: Rect::new(x, 100.0, 10.0, 160.0),
            has_spikes: false,
            is_bounce: bounce,
            vertical_effect: VerticalEffect::Normal,
            approach: Approach::Lateral,
            contact_height: 112.0,
            rise: 0.0,
        }
    }

    #[test]
    fn test_touch_with_tolerance() {
        let w = wall(WallSide::Right, false);
        // 1.5 units short of the face
        let near = Rect::new(440.0 - 24.0 - 1.5, 150.0, 24.0, 24.0);
        assert!(touches_wall(&near, &w, 2.0));
        assert!(!touches_wall(&near, &w, 1.0));
        // Far away
        let far = Rect::new(300.0, 150.0, 24.0, 24.0);
        assert!(!touches_wall(&far, &w, 2.0));
    }

    #[test]
    fn test_touch_requires_vertical_overlap() {
        let w = wall(WallSide::Left, false);
        let above = Rect::new(40.0, 261.0, 24.0, 24.0);
        assert!(!touches_wall(&above, &w, 2.0));
    }

    #[test]
    fn test_flush_positions() {
        let body = Rect::new(0.0, 150.0, 24.0, 24.0);
        assert_eq!(flush_x(&body, &wall(WallSide::Left, false)), 40.0);
        assert_eq!(flush_x(&body, &wall(WallSide::Right, false)), 416.0);
    }

    #[test]
    fn test_bounce_only_on_bounce_walls() {
        let body = Rect::new(35.0, 150.0, 24.0, 24.0);
        assert!(bounce_off(&body, &wall(WallSide::Left, false)).is_none());
        let hit = bounce_off(&body, &wall(WallSide::Left, true)).unwrap();
        assert_eq!(hit.x, 40.0);
        assert_eq!(hit.dir, 1.0);
    }
}
