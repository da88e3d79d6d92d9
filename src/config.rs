//! Colors, face configuration and the fallback size used when the host
//! layout does not constrain the face.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::RgbColor;

use crate::style::StyleVariant;

/// Side of the default square face, in device-independent units.
pub const DEFAULT_SIDE_DP: u32 = 250;

/// Flat colors of the dial.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StyleParams {
    pub background: Rgb565,
    pub hour: Rgb565,
    pub minute: Rgb565,
    pub second: Rgb565,
    /// Tick marks and numerals.
    pub tick: Rgb565,
}

impl Default for StyleParams {
    fn default() -> Self {
        Self {
            background: Rgb565::BLACK,
            hour: Rgb565::WHITE,
            minute: Rgb565::WHITE,
            second: Rgb565::RED,
            tick: Rgb565::WHITE,
        }
    }
}

/// Face configuration, read-only once the face is built.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ClockConfig {
    pub variant: StyleVariant,
    pub style: StyleParams,
    /// Pixels per device-independent unit.
    pub density: f32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            variant: StyleVariant::default(),
            style: StyleParams::default(),
            density: 1.0,
        }
    }
}

impl ClockConfig {
    pub fn with_variant(mut self, variant: StyleVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_style(mut self, style: StyleParams) -> Self {
        self.style = style;
        self
    }

    pub fn with_background_color(mut self, color: Rgb565) -> Self {
        self.style.background = color;
        self
    }

    pub fn with_hour_color(mut self, color: Rgb565) -> Self {
        self.style.hour = color;
        self
    }

    pub fn with_minute_color(mut self, color: Rgb565) -> Self {
        self.style.minute = color;
        self
    }

    pub fn with_second_color(mut self, color: Rgb565) -> Self {
        self.style.second = color;
        self
    }

    pub fn with_tick_color(mut self, color: Rgb565) -> Self {
        self.style.tick = color;
        self
    }

    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    /// Desired side of the face when unconstrained, in pixels.
    pub fn default_side_px(&self) -> u32 {
        (DEFAULT_SIDE_DP as f32 * self.density) as u32
    }

    /// Size the face asks for under the given constraints.
    pub fn measure(&self, width: SizeConstraint, height: SizeConstraint) -> (u32, u32) {
        let side = self.default_side_px();
        (resolve_size(side, width), resolve_size(side, height))
    }
}

/// Size constraint handed down by the host layout.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SizeConstraint {
    Exactly(u32),
    AtMost(u32),
    Unspecified,
}

/// Reconcile a desired size with a constraint.
pub fn resolve_size(desired: u32, constraint: SizeConstraint) -> u32 {
    match constraint {
        SizeConstraint::Exactly(n) => n,
        SizeConstraint::AtMost(n) => desired.min(n),
        SizeConstraint::Unspecified => desired,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_colors() {
        let s = StyleParams::default();
        assert_eq!(s.background, Rgb565::BLACK);
        assert_eq!(s.second, Rgb565::RED);
        assert_eq!(s.hour, Rgb565::WHITE);
        assert_eq!(s.minute, Rgb565::WHITE);
        assert_eq!(s.tick, Rgb565::WHITE);
    }

    #[test]
    fn builder_overrides_single_color() {
        let cfg = ClockConfig::default().with_second_color(Rgb565::GREEN);
        assert_eq!(cfg.style.second, Rgb565::GREEN);
        assert_eq!(cfg.style.minute, Rgb565::WHITE);
    }

    #[test]
    fn measure_falls_back_to_square() {
        let cfg = ClockConfig::default().with_density(2.0);
        assert_eq!(
            cfg.measure(SizeConstraint::Unspecified, SizeConstraint::Unspecified),
            (500, 500)
        );
        assert_eq!(
            cfg.measure(SizeConstraint::AtMost(320), SizeConstraint::Exactly(100)),
            (320, 100)
        );
        assert_eq!(resolve_size(250, SizeConstraint::AtMost(900)), 250);
    }
}
