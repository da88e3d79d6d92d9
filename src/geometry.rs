//! Layout engine: every measurement of the dial derived from the surface size.
//!
//! `compute_geometry` is pure. It is called once per resize and its result is
//! read-only afterwards; a new size produces a brand new `Geometry`.

use heapless::Vec;

use crate::primitives::{
    label_angle, polar, tapered_quad, tick_angle, PointF, TickTier, LABEL_COUNT, TICK_COUNT,
};
use crate::style::{HandShapeKind, HandStyle, StyleVariant, TickStyle};

/// Numerals in dial order, "12" at the top.
pub const NUMERALS: [&str; LABEL_COUNT] =
    ["12", "1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11"];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Hand {
    Hour,
    Minute,
    Second,
}

impl Hand {
    /// Paint order.
    pub const ALL: [Hand; 3] = [Hand::Hour, Hand::Minute, Hand::Second];
}

/// Outline of a hand relative to the center, pointing right.
#[derive(Clone, Debug, PartialEq)]
pub enum HandOutline {
    Stroke { from: PointF, to: PointF, width: f32 },
    /// Closed polygon, last point joins the first.
    Polygon(Vec<PointF, 4>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct HandGeometry {
    pub hand: Hand,
    /// Reach from the center, whole pixels.
    pub length: f32,
    pub outline: HandOutline,
}

impl HandGeometry {
    /// Width of the hand's stroke if it is a line.
    pub fn stroke_width(&self) -> Option<f32> {
        match self.outline {
            HandOutline::Stroke { width, .. } => Some(width),
            HandOutline::Polygon(_) => None,
        }
    }
}

/// One tick mark in surface coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TickSegment {
    pub index: usize,
    pub angle: f32,
    pub tier: TickTier,
    pub start: PointF,
    pub end: PointF,
    pub width: f32,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LabelAnchor {
    pub text: &'static str,
    pub position: PointF,
}

/// Decorative ring painted over the center after `after` is drawn.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HubRing {
    pub after: Hand,
    pub radius: f32,
    pub stroke_width: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Geometry {
    pub width: i32,
    pub height: i32,
    pub radius: f32,
    pub center: PointF,
    pub label_radius: Option<f32>,
    /// Hour, minute, second.
    pub hands: [HandGeometry; 3],
    pub ticks: Vec<TickSegment, TICK_COUNT>,
    pub labels: Vec<LabelAnchor, LABEL_COUNT>,
    pub hubs: Vec<HubRing, 2>,
}

impl Geometry {
    /// Nothing visible can be drawn.
    pub fn is_degenerate(&self) -> bool {
        self.radius <= 0.0
    }

    pub fn hand(&self, hand: Hand) -> &HandGeometry {
        &self.hands[hand as usize]
    }
}

/// Dial radius for a surface, taken from the shorter side.
pub fn dial_radius(width: i32, height: i32, base_ratio: f32) -> f32 {
    if width <= 0 || height <= 0 {
        return 0.0;
    }
    (width.min(height) as f32 / 2.0) * base_ratio
}

pub fn compute_geometry(width: i32, height: i32, variant: &StyleVariant) -> Geometry {
    let radius = dial_radius(width, height, variant.base_ratio);
    let center = PointF::new(
        libm::roundf(width.max(0) as f32 / 2.0),
        libm::roundf(height.max(0) as f32 / 2.0),
    );

    let hands = [
        hand_geometry(Hand::Hour, &variant.hour, radius),
        hand_geometry(Hand::Minute, &variant.minute, radius),
        hand_geometry(Hand::Second, &variant.second, radius),
    ];

    let ticks = tick_segments(&variant.ticks, center, radius);

    let label_radius = variant.numerals.map(|n| radius * n.label_ratio);
    let mut labels = Vec::new();
    if let Some(r) = label_radius {
        for (i, text) in NUMERALS.into_iter().enumerate() {
            let _ = labels.push(LabelAnchor {
                text,
                position: polar(center, r, label_angle(i)),
            });
        }
    }

    let mut hubs = Vec::new();
    if let Some(hub) = variant.hub {
        let outer = radius * hub.ring_ratio;
        let stroke = radius * hub.stroke_ratio;
        let _ = hubs.push(HubRing {
            after: Hand::Minute,
            radius: outer,
            stroke_width: stroke,
        });
        // Cut out by the inner ring, stroked as wide as the second hand
        let _ = hubs.push(HubRing {
            after: Hand::Second,
            radius: outer - stroke,
            stroke_width: hands[Hand::Second as usize]
                .stroke_width()
                .unwrap_or(stroke),
        });
    }

    Geometry {
        width,
        height,
        radius,
        center,
        label_radius,
        hands,
        ticks,
        labels,
        hubs,
    }
}

fn hand_geometry(hand: Hand, style: &HandStyle, radius: f32) -> HandGeometry {
    let length = libm::roundf(radius * style.length_ratio);
    let outline = match style.shape {
        HandShapeKind::Line {
            tail_ratio,
            width_ratio,
        } => HandOutline::Stroke {
            from: PointF::new(-radius * tail_ratio, 0.0),
            to: PointF::new(length, 0.0),
            width: radius * width_ratio,
        },
        HandShapeKind::TaperedQuad {
            tail_ratio,
            base_half_ratio,
            tip_half_ratio,
        } => {
            let quad = tapered_quad(
                length,
                radius * tail_ratio,
                radius * base_half_ratio,
                radius * tip_half_ratio,
            );
            HandOutline::Polygon(Vec::from_slice(&quad).unwrap_or_default())
        }
    };
    HandGeometry {
        hand,
        length,
        outline,
    }
}

fn tick_segments(style: &TickStyle, center: PointF, radius: f32) -> Vec<TickSegment, TICK_COUNT> {
    let normal = radius * style.stroke_ratio;
    let rim = radius;
    let minor_start = rim - radius * style.minor_length_ratio;
    let mid_start = minor_start - radius * style.mid_extension_ratio;
    let major_start = radius * style.major_reach_ratio;

    let mut ticks = Vec::new();
    for index in 0..TICK_COUNT {
        let tier = TickTier::for_index(index);
        let (inner, width) = match tier {
            TickTier::Minor => (minor_start, normal * style.minor_width_factor),
            TickTier::Mid => (mid_start, normal * style.mid_width_factor),
            TickTier::Major => (major_start, normal),
        };
        let angle = tick_angle(index);
        let _ = ticks.push(TickSegment {
            index,
            angle,
            tier,
            start: polar(center, inner, angle),
            end: polar(center, rim, angle),
            width,
        });
    }
    ticks
}
