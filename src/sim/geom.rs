//! Axis-aligned boxes and platform landing
//!
//! World space is y-up with the floor at y = 0. Bodies are anchored at
//! their feet (bottom-center), which keeps landing math trivial.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (min = bottom-left corner)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    /// Box standing on `feet` (bottom-center anchor)
    pub fn from_feet(feet: Vec2, w: f32, h: f32) -> Self {
        Self::new(feet.x - w / 2.0, feet.y, w, h)
    }

    /// Box centered on `center`
    pub fn from_center(center: Vec2, w: f32, h: f32) -> Self {
        Self::new(center.x - w / 2.0, center.y - h / 2.0, w, h)
    }

    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }

    pub fn top(&self) -> f32 {
        self.min.y + self.size.y
    }

    /// Strict overlap (touching edges do not count)
    pub fn overlaps(&self, other: &Rect) -> bool {
        let a_max = self.max();
        let b_max = other.max();
        self.min.x < b_max.x && a_max.x > other.min.x && self.min.y < b_max.y && a_max.y > other.min.y
    }

    pub fn contains(&self, p: Vec2) -> bool {
        let max = self.max();
        p.x >= self.min.x && p.x <= max.x && p.y >= self.min.y && p.y <= max.y
    }

    /// Distance from `p` to the nearest point of this box (0 inside)
    pub fn distance_to(&self, p: Vec2) -> f32 {
        let clamped = p.clamp(self.min, self.max());
        (p - clamped).length()
    }
}

/// Result of resolving a falling body against one-way platforms
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landing {
    /// Height the feet were snapped to
    pub surface_y: f32,
    /// True if the surface is the floor rather than a platform
    pub floor: bool,
}

/// Snap a falling body onto the first surface its feet crossed this step
///
/// Platforms are one-way: only their top face collides, and only when
/// the feet were at or above it on the previous step. The highest crossed
/// surface wins so fast falls never tunnel through a stack.
pub fn resolve_landing(
    prev_feet_y: f32,
    feet: Vec2,
    half_width: f32,
    platforms: &[Rect],
) -> Option<Landing> {
    let mut best: Option<Landing> = None;

    for platform in platforms {
        let top = platform.top();
        let max_x = platform.max().x;
        let horizontally_over = feet.x + half_width > platform.min.x && feet.x - half_width < max_x;
        if horizontally_over && prev_feet_y >= top && feet.y <= top {
            if best.is_none_or(|b| top > b.surface_y) {
                best = Some(Landing {
                    surface_y: top,
                    floor: false,
                });
            }
        }
    }

    if best.is_none() && feet.y <= 0.0 {
        best = Some(Landing {
            surface_y: 0.0,
            floor: true,
        });
    }

    best
}

/// True if a body at `feet` is standing on a platform or the floor
pub fn is_supported(feet: Vec2, half_width: f32, platforms: &[Rect]) -> bool {
    if feet.y <= 0.0 {
        return true;
    }
    platforms.iter().any(|p| {
        (feet.y - p.top()).abs() < 0.5 && feet.x + half_width > p.min.x && feet.x - half_width < p.max().x
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_excludes_touching_edges() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        let c = Rect::new(9.0, 9.0, 10.0, 10.0);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&a));
    }

    #[test]
    fn test_landing_on_platform_from_above() {
        let platforms = [Rect::new(100.0, 80.0, 120.0, 16.0)];
        let landing = resolve_landing(100.0, Vec2::new(150.0, 97.0), 14.0, &platforms);
        assert_eq!(landing, None);

        let landing = resolve_landing(100.0, Vec2::new(150.0, 92.0), 14.0, &platforms);
        assert_eq!(
            landing,
            Some(Landing {
                surface_y: 96.0,
                floor: false
            })
        );
    }

    #[test]
    fn test_platforms_are_one_way() {
        let platforms = [Rect::new(100.0, 80.0, 120.0, 16.0)];
        // Jumping up through the platform from below never lands
        assert_eq!(resolve_landing(50.0, Vec2::new(150.0, 90.0), 14.0, &platforms), None);
    }

    #[test]
    fn test_fast_fall_lands_on_highest_platform() {
        let platforms = [
            Rect::new(0.0, 40.0, 200.0, 10.0),
            Rect::new(0.0, 100.0, 200.0, 10.0),
        ];
        let landing = resolve_landing(200.0, Vec2::new(50.0, -20.0), 14.0, &platforms).unwrap();
        assert_eq!(landing.surface_y, 110.0);
    }

    #[test]
    fn test_floor_catches_everything_else() {
        let landing = resolve_landing(5.0, Vec2::new(5000.0, -3.0), 14.0, &[]).unwrap();
        assert!(landing.floor);
        assert_eq!(landing.surface_y, 0.0);
        assert!(is_supported(Vec2::new(0.0, 0.0), 14.0, &[]));
    }
}
