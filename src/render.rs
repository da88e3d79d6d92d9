//! Dial painting.
//!
//! This module provides:
//! - `paint_dial` for the static layer (background, ticks, numerals)
//! - `paint_hands` for the per-tick overlay (hands and hub rings)
//!
//! Both work on any embedded-graphics `DrawTarget<Color = Rgb565>`, so the
//! offscreen raster and the host surface share one code path.

use embedded_graphics::{
    mono_font::{
        ascii::{FONT_10X20, FONT_6X10},
        MonoFont, MonoTextStyle,
    },
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{Circle, Line, PrimitiveStyle, Triangle},
    text::{Alignment, Baseline, Text, TextStyleBuilder},
};

use crate::config::StyleParams;
use crate::geometry::{Geometry, Hand, HandGeometry, HandOutline, HubRing};
use crate::primitives::{rotate_about, stroke_px, HandAngles, PointF};

// Dials smaller than this get the small numeral font
const LARGE_FONT_MIN_RADIUS: f32 = 80.0;

/// Paint background, ticks and numerals. Cost is O(ticks + labels); meant to
/// run once per resize into the static layer.
pub fn paint_dial<D>(
    target: &mut D,
    geometry: &Geometry,
    style: &StyleParams,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    target.clear(style.background)?;
    if geometry.is_degenerate() {
        return Ok(());
    }

    for tick in &geometry.ticks {
        stroke_segment(target, tick.start, tick.end, tick.width, style.tick)?;
    }

    if !geometry.labels.is_empty() {
        let char_style = MonoTextStyle::new(label_font(geometry.radius), style.tick);
        let text_style = TextStyleBuilder::new()
            .alignment(Alignment::Center)
            .baseline(Baseline::Middle)
            .build();
        for label in &geometry.labels {
            Text::with_text_style(label.text, label.position.to_point(), char_style, text_style)
                .draw(target)?;
        }
    }
    Ok(())
}

/// Paint the three hands at `angles`, each followed by the hub rings that
/// mask its base. Later shapes cover earlier ones at the center.
pub fn paint_hands<D>(
    target: &mut D,
    geometry: &Geometry,
    style: &StyleParams,
    angles: HandAngles,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    if geometry.is_degenerate() {
        return Ok(());
    }

    for hand in Hand::ALL {
        let angle = match hand {
            Hand::Hour => angles.hour,
            Hand::Minute => angles.minute,
            Hand::Second => angles.second,
        };
        let color = hand_color(style, hand);
        paint_hand(target, geometry.hand(hand), geometry.center, angle, color)?;

        for hub in geometry.hubs.iter().filter(|h| h.after == hand) {
            paint_hub(target, hub, geometry.center, style.background, color)?;
        }
    }
    Ok(())
}

pub fn hand_color(style: &StyleParams, hand: Hand) -> Rgb565 {
    match hand {
        Hand::Hour => style.hour,
        Hand::Minute => style.minute,
        Hand::Second => style.second,
    }
}

fn paint_hand<D>(
    target: &mut D,
    hand: &HandGeometry,
    center: PointF,
    angle: f32,
    color: Rgb565,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    match &hand.outline {
        HandOutline::Stroke { from, to, width } => stroke_segment(
            target,
            rotate_about(*from, center, angle),
            rotate_about(*to, center, angle),
            *width,
            color,
        ),
        HandOutline::Polygon(points) => {
            if points.len() < 3 {
                return Ok(());
            }
            let fill = PrimitiveStyle::with_fill(color);
            let anchor = rotate_about(points[0], center, angle).to_point();
            // Fan out from the first vertex; hand outlines are convex
            for pair in points[1..].windows(2) {
                Triangle::new(
                    anchor,
                    rotate_about(pair[0], center, angle).to_point(),
                    rotate_about(pair[1], center, angle).to_point(),
                )
                .into_styled(fill)
                .draw(target)?;
            }
            Ok(())
        }
    }
}

fn paint_hub<D>(
    target: &mut D,
    hub: &HubRing,
    center: PointF,
    background: Rgb565,
    ring: Rgb565,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let diameter = libm::roundf(hub.radius * 2.0);
    if diameter < 1.0 {
        return Ok(());
    }
    let circle = Circle::with_center(center.to_point(), diameter as u32);
    circle
        .into_styled(PrimitiveStyle::with_fill(background))
        .draw(target)?;

    let stroke = stroke_px(hub.stroke_width);
    if stroke > 0 {
        circle
            .into_styled(PrimitiveStyle::with_stroke(ring, stroke))
            .draw(target)?;
    }
    Ok(())
}

fn stroke_segment<D>(
    target: &mut D,
    start: PointF,
    end: PointF,
    width: f32,
    color: Rgb565,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let px = stroke_px(width);
    if px == 0 {
        return Ok(());
    }
    Line::new(start.to_point(), end.to_point())
        .into_styled(PrimitiveStyle::with_stroke(color, px))
        .draw(target)
}

fn label_font(radius: f32) -> &'static MonoFont<'static> {
    if radius < LARGE_FONT_MIN_RADIUS {
        &FONT_6X10
    } else {
        &FONT_10X20
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ClockState;
    use crate::framebuffer::Framebuffer;
    use crate::geometry::compute_geometry;
    use crate::style::{HourHandMode, StyleVariant};

    fn dial(variant: &StyleVariant) -> (Geometry, Framebuffer, StyleParams) {
        let style = StyleParams::default();
        let g = compute_geometry(200, 200, variant);
        let mut fb = Framebuffer::try_new(200, 200, Rgb565::BLUE).unwrap();
        paint_dial(&mut fb, &g, &style).unwrap();
        (g, fb, style)
    }

    #[test]
    fn dial_has_background_and_ticks() {
        let (g, fb, _) = dial(&StyleVariant::TAPERED);
        assert_eq!(fb.count(Rgb565::BLUE), 0);
        assert!(fb.count(Rgb565::WHITE) > 0);
        // the 3 o'clock major tick crosses the horizontal through the center
        let x = (g.center.x + g.radius * 0.93) as u32;
        assert_eq!(fb.pixel(x, g.center.y as u32), Some(Rgb565::WHITE));
        // the dial center stays clear
        assert_eq!(fb.pixel(100, 100), Some(Rgb565::BLACK));
    }

    #[test]
    fn numerals_add_ink() {
        let (_, bare, _) = dial(&StyleVariant {
            numerals: None,
            ..StyleVariant::CLASSIC
        });
        let (_, labelled, _) = dial(&StyleVariant::CLASSIC);
        assert!(labelled.count(Rgb565::WHITE) > bare.count(Rgb565::WHITE));
    }

    fn any_in_row(
        fb: &Framebuffer,
        y: u32,
        xs: core::ops::RangeInclusive<u32>,
        c: Rgb565,
    ) -> bool {
        xs.into_iter().any(|x| fb.pixel(x, y) == Some(c))
    }

    #[test]
    fn second_hand_points_down_at_thirty() {
        let (g, mut fb, style) = dial(&StyleVariant::TAPERED);
        let angles = HandAngles::for_state(ClockState::new(0, 0, 30), HourHandMode::Snapping);
        paint_hands(&mut fb, &g, &style, angles).unwrap();
        let cx = g.center.x as u32;
        let below = (g.center.y + g.radius * 0.6) as u32;
        assert!(any_in_row(&fb, below, cx - 2..=cx + 2, Rgb565::RED));
        // hour and minute hands both point up at 12:00
        let above = (g.center.y - g.radius * 0.6) as u32;
        assert_eq!(fb.pixel(cx, above), Some(Rgb565::WHITE));
        assert!(!any_in_row(&fb, above, cx - 2..=cx + 2, Rgb565::RED));
    }

    #[test]
    fn hub_ring_drawn_over_center() {
        let angles = HandAngles::for_state(ClockState::new(2, 20, 40), HourHandMode::Snapping);
        let (g, mut fb, style) = dial(&StyleVariant::TAPERED);
        paint_hands(&mut fb, &g, &style, angles).unwrap();
        // straight up, 5px out: inside the minute hub ring, clear of every hand
        let (x, y) = (g.center.x as u32, g.center.y as u32 - 5);
        assert_eq!(fb.pixel(x, y), Some(style.minute));

        let (g, mut fb, style) = dial(&StyleVariant {
            hub: None,
            ..StyleVariant::TAPERED
        });
        paint_hands(&mut fb, &g, &style, angles).unwrap();
        assert_eq!(fb.pixel(x, y), Some(style.background));
    }

    #[test]
    fn degenerate_geometry_paints_no_hands() {
        let style = StyleParams::default();
        let g = compute_geometry(0, 0, &StyleVariant::TAPERED);
        let mut fb = Framebuffer::try_new(4, 4, Rgb565::BLUE).unwrap();
        let angles = HandAngles::for_state(ClockState::default(), HourHandMode::Snapping);
        paint_hands(&mut fb, &g, &style, angles).unwrap();
        assert_eq!(fb.count(Rgb565::BLUE), 16);
    }
}
