// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hit testing and heading projection.

use kurbo::{Point, Rect, Vec2};

/// Parameters for aim prediction.
#[derive(Clone, Copy, Debug)]
pub struct AimParams {
    /// How long an armed guard suppresses hover changes on other triggers, in milliseconds.
    pub guard_ms: u64,
    /// Extra vertical reach above and below the surface, as a multiple of the trigger height.
    ///
    /// A heading that meets the surface's near edge within
    /// `[surface.y0 - pad, surface.y1 + pad]` where `pad = trigger.height() * band_ratio`
    /// counts as aiming at the surface.
    pub band_ratio: f64,
    /// Minimum smoothed displacement (in local units) before a heading is trusted.
    ///
    /// Below this the pointer is considered stationary and
    /// [`fallback_heading`] is used instead.
    pub min_motion: f64,
}

impl Default for AimParams {
    fn default() -> Self {
        Self {
            guard_ms: 600,
            band_ratio: 1.0,
            min_motion: 2.0,
        }
    }
}

/// Which side of its trigger a submenu surface sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// Surface opens to the right (the usual left-to-right placement).
    Right,
    /// Surface opens to the left (right-to-left, or flipped for lack of space).
    Left,
}

impl Side {
    /// Derive the side from the trigger and surface rectangles.
    pub fn of(trigger: Rect, surface: Rect) -> Self {
        if surface.center().x >= trigger.center().x {
            Self::Right
        } else {
            Self::Left
        }
    }

    /// The x coordinate of the surface edge that faces the trigger.
    pub fn near_edge(self, surface: Rect) -> f64 {
        match self {
            Self::Right => surface.x0,
            Self::Left => surface.x1,
        }
    }
}

/// Inclusive point-in-rectangle test.
///
/// Unlike [`Rect::contains`], points on the far edges count as inside; a pointer
/// resting on the last pixel column of a trigger is still over it.
pub fn point_in_rect(pt: Point, rect: Rect) -> bool {
    pt.x >= rect.x0 && pt.x <= rect.x1 && pt.y >= rect.y0 && pt.y <= rect.y1
}

/// Heading used when the pointer has not moved enough to estimate one.
///
/// Points from the trigger's center to the midpoint of the surface's near edge.
pub fn fallback_heading(trigger: Rect, surface: Rect) -> Vec2 {
    let side = Side::of(trigger, surface);
    let target = Point::new(side.near_edge(surface), (surface.y0 + surface.y1) * 0.5);
    target - trigger.center()
}

/// Returns `true` if moving from `origin` along `heading` reaches the surface.
///
/// The heading is projected forward to the surface's near edge; the crossing
/// must fall inside the surface's vertical extent widened by
/// [`AimParams::band_ratio`] trigger heights. An origin already inside the
/// surface always counts as a hit.
pub fn heading_crosses_surface(
    origin: Point,
    heading: Vec2,
    trigger: Rect,
    surface: Rect,
    params: &AimParams,
) -> bool {
    if point_in_rect(origin, surface) {
        return true;
    }
    let side = Side::of(trigger, surface);
    let dx = side.near_edge(surface) - origin.x;

    let t = if dx == 0.0 {
        0.0
    } else {
        if heading.x == 0.0 || (heading.x > 0.0) != (dx > 0.0) {
            return false;
        }
        dx / heading.x
    };
    if !t.is_finite() || t < 0.0 {
        return false;
    }

    let y = origin.y + heading.y * t;
    let pad = trigger.height() * params.band_ratio.max(0.0);
    y >= surface.y0 - pad && y <= surface.y1 + pad
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trigger() -> Rect {
        Rect::new(0.0, 40.0, 100.0, 60.0)
    }

    fn submenu() -> Rect {
        Rect::new(100.0, 0.0, 250.0, 200.0)
    }

    #[test]
    fn inclusive_edges() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(point_in_rect(Point::new(10.0, 10.0), r));
        assert!(point_in_rect(Point::new(0.0, 0.0), r));
        assert!(!point_in_rect(Point::new(10.01, 5.0), r));
    }

    #[test]
    fn side_follows_surface_position() {
        assert_eq!(Side::of(trigger(), submenu()), Side::Right);
        let left = Rect::new(-150.0, 0.0, 0.0, 200.0);
        assert_eq!(Side::of(trigger(), left), Side::Left);
        assert_eq!(Side::Left.near_edge(left), 0.0);
    }

    #[test]
    fn heading_toward_surface_hits() {
        let params = AimParams::default();
        let origin = Point::new(90.0, 50.0);
        assert!(heading_crosses_surface(
            origin,
            Vec2::new(1.0, 0.5),
            trigger(),
            submenu(),
            &params
        ));
    }

    #[test]
    fn heading_away_misses() {
        let params = AimParams::default();
        let origin = Point::new(90.0, 50.0);
        assert!(!heading_crosses_surface(
            origin,
            Vec2::new(-1.0, 0.0),
            trigger(),
            submenu(),
            &params
        ));
        // Mostly vertical motion overshoots the band before reaching the edge.
        assert!(!heading_crosses_surface(
            origin,
            Vec2::new(0.01, 5.0),
            trigger(),
            submenu(),
            &params
        ));
    }

    #[test]
    fn band_widens_with_trigger_height() {
        let small = Rect::new(100.0, 40.0, 250.0, 60.0);
        let origin = Point::new(90.0, 50.0);
        // Crosses x = 100 at y = 75: 15 units below the surface.
        let heading = Vec2::new(1.0, 2.5);
        let tight = AimParams {
            band_ratio: 0.5,
            ..AimParams::default()
        };
        assert!(!heading_crosses_surface(origin, heading, trigger(), small, &tight));
        assert!(heading_crosses_surface(
            origin,
            heading,
            trigger(),
            small,
            &AimParams::default()
        ));
    }

    #[test]
    fn origin_inside_surface_counts() {
        assert!(heading_crosses_surface(
            Point::new(120.0, 10.0),
            Vec2::ZERO,
            trigger(),
            submenu(),
            &AimParams::default()
        ));
    }

    #[test]
    fn fallback_points_at_near_edge_midpoint() {
        let h = fallback_heading(trigger(), submenu());
        assert_eq!(h, Vec2::new(50.0, 50.0));
    }
}
