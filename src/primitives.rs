//! Shared hand and tick primitives.
//!
//! All angles are in degrees, 0° pointing right and growing clockwise on a
//! Y-down surface, the same convention the hands and ticks are built in.

use embedded_graphics::prelude::Point;

use crate::clock::ClockState;
use crate::style::HourHandMode;

/// Number of per-minute tick marks around the dial.
pub const TICK_COUNT: usize = 60;
/// Number of numeral labels.
pub const LABEL_COUNT: usize = 12;

// Degrees between two adjacent ticks / labels
const DEG_PER_TICK: f32 = 6.0;
const DEG_PER_LABEL: f32 = 30.0;
// Hands and labels are built pointing right, 12 o'clock is a quarter turn back
const TOP_OFFSET: f32 = -90.0;

/// A point on the drawing surface, in sub-pixel precision.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PointF {
    pub x: f32,
    pub y: f32,
}

impl PointF {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Rotate around the origin.
    pub fn rotated(self, deg: f32) -> Self {
        let rad = deg.to_radians();
        let (s, c) = (libm::sinf(rad), libm::cosf(rad));
        Self {
            x: self.x * c - self.y * s,
            y: self.x * s + self.y * c,
        }
    }

    /// Translate by `origin`.
    #[inline]
    pub fn offset(self, origin: PointF) -> Self {
        Self::new(self.x + origin.x, self.y + origin.y)
    }

    /// Snap to the pixel grid.
    #[inline]
    pub fn to_point(self) -> Point {
        Point::new(libm::roundf(self.x) as i32, libm::roundf(self.y) as i32)
    }

    pub fn distance(self, other: PointF) -> f32 {
        libm::hypotf(self.x - other.x, self.y - other.y)
    }
}

/// Rotate a center-relative point by `deg` and place it around `center`.
#[inline]
pub fn rotate_about(p: PointF, center: PointF, deg: f32) -> PointF {
    p.rotated(deg).offset(center)
}

/// Point at distance `r` from `center` in direction `deg`.
#[inline]
pub fn polar(center: PointF, r: f32, deg: f32) -> PointF {
    rotate_about(PointF::new(r, 0.0), center, deg)
}

#[inline]
pub fn tick_angle(index: usize) -> f32 {
    index as f32 * DEG_PER_TICK
}

/// Label `0` ("12") sits at the top.
#[inline]
pub fn label_angle(index: usize) -> f32 {
    index as f32 * DEG_PER_LABEL + TOP_OFFSET
}

/// Visual tier of a per-minute tick mark.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TickTier {
    Minor,
    Mid,
    Major,
}

impl TickTier {
    pub fn for_index(index: usize) -> Self {
        if index % 15 == 0 {
            TickTier::Major
        } else if index % 5 == 0 {
            TickTier::Mid
        } else {
            TickTier::Minor
        }
    }
}

/// Closed quadrilateral pointing right: wide base behind the center, narrower
/// tip at `length`. A zero `tip_half` collapses the tip into a point.
pub fn tapered_quad(length: f32, tail: f32, base_half: f32, tip_half: f32) -> [PointF; 4] {
    [
        PointF::new(-tail, -base_half),
        PointF::new(length, -tip_half),
        PointF::new(length, tip_half),
        PointF::new(-tail, base_half),
    ]
}

/// Rotation of each hand for a given time.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HandAngles {
    pub hour: f32,
    pub minute: f32,
    pub second: f32,
}

impl HandAngles {
    pub fn for_state(state: ClockState, mode: HourHandMode) -> Self {
        let hour = match mode {
            // Jumps once per hour
            HourHandMode::Snapping => state.hour() as f32 * 30.0,
            HourHandMode::Continuous => {
                (state.hour() as f32 * 60.0 + state.minute() as f32) * 0.5
            }
        };
        Self {
            hour: hour + TOP_OFFSET,
            minute: state.minute() as f32 * DEG_PER_TICK + TOP_OFFSET,
            second: state.second() as f32 * DEG_PER_TICK + TOP_OFFSET,
        }
    }
}

/// Stroke width in whole pixels; anything visible is at least one pixel wide.
#[inline]
pub fn stroke_px(width: f32) -> u32 {
    if width <= 0.0 {
        0
    } else {
        (libm::roundf(width) as u32).max(1)
    }
}
