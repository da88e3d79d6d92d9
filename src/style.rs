//! Dial style variants.
//!
//! Every distance on the dial is a fixed fraction of the dial radius. The
//! fractions below are hand-tuned design constants and are kept verbatim.

/// How a hand is outlined, pointing right at angle 0.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum HandShapeKind {
    /// Straight stroke from `-tail` to the hand length.
    Line { tail_ratio: f32, width_ratio: f32 },
    /// Closed quadrilateral, wider at the base than at the tip.
    TaperedQuad {
        tail_ratio: f32,
        base_half_ratio: f32,
        tip_half_ratio: f32,
    },
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HandStyle {
    pub length_ratio: f32,
    pub shape: HandShapeKind,
}

impl HandStyle {
    pub const fn line(length_ratio: f32, tail_ratio: f32, width_ratio: f32) -> Self {
        Self {
            length_ratio,
            shape: HandShapeKind::Line {
                tail_ratio,
                width_ratio,
            },
        }
    }

    pub const fn quad(
        length_ratio: f32,
        tail_ratio: f32,
        base_half_ratio: f32,
        tip_half_ratio: f32,
    ) -> Self {
        Self {
            length_ratio,
            shape: HandShapeKind::TaperedQuad {
                tail_ratio,
                base_half_ratio,
                tip_half_ratio,
            },
        }
    }
}

/// Tick mark proportions.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TickStyle {
    /// Width of a major (hour) tick.
    pub stroke_ratio: f32,
    pub minor_width_factor: f32,
    pub mid_width_factor: f32,
    /// Minor ticks run inward from the rim by this much.
    pub minor_length_ratio: f32,
    /// Mid ticks reach this much further inward than minor ones.
    pub mid_extension_ratio: f32,
    /// Major ticks run from the rim to this radius.
    pub major_reach_ratio: f32,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NumeralStyle {
    pub label_ratio: f32,
}

/// Center hub ring drawn over the hand bases.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HubStyle {
    pub ring_ratio: f32,
    pub stroke_ratio: f32,
}

/// Hour hand placement. `Snapping` ignores the minutes, which is how the
/// dial has always looked; `Continuous` creeps between hours.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum HourHandMode {
    #[default]
    Snapping,
    Continuous,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StyleVariant {
    /// Fraction of half the shorter surface side used as dial radius.
    pub base_ratio: f32,
    pub hour: HandStyle,
    pub minute: HandStyle,
    pub second: HandStyle,
    pub ticks: TickStyle,
    pub numerals: Option<NumeralStyle>,
    pub hub: Option<HubStyle>,
    pub hour_mode: HourHandMode,
}

const STANDARD_TICKS: TickStyle = TickStyle {
    stroke_ratio: 0.04,
    minor_width_factor: 0.4,
    mid_width_factor: 0.7,
    minor_length_ratio: 0.06649,
    mid_extension_ratio: 0.0133,
    major_reach_ratio: 0.87,
};

const STANDARD_HUB: HubStyle = HubStyle {
    ring_ratio: 0.04988,
    stroke_ratio: 0.02779,
};

const TAPERED_SECOND: HandStyle = HandStyle::line(0.839, 0.19948, 0.019948);

impl StyleVariant {
    /// Tapered rectangular-tip hands, ticks only, hub rings.
    pub const TAPERED: StyleVariant = StyleVariant {
        base_ratio: 0.917,
        hour: HandStyle::quad(0.687, 0.1662, 0.03324, 0.019948),
        minute: HandStyle::quad(0.801, 0.183, 0.0265, 0.0133),
        second: TAPERED_SECOND,
        ticks: STANDARD_TICKS,
        numerals: None,
        hub: Some(STANDARD_HUB),
        hour_mode: HourHandMode::Snapping,
    };

    /// Plain line hands with numerals.
    pub const CLASSIC: StyleVariant = StyleVariant {
        base_ratio: 0.7,
        hour: HandStyle::line(0.53, 0.0, 0.05),
        minute: HandStyle::line(0.75, 0.0, 0.035),
        second: HandStyle::line(0.9, 0.15, 0.015),
        ticks: TickStyle {
            major_reach_ratio: 0.9,
            ..STANDARD_TICKS
        },
        numerals: Some(NumeralStyle { label_ratio: 0.75 }),
        hub: None,
        hour_mode: HourHandMode::Snapping,
    };

    /// Pointed hands with numerals and hub rings.
    pub const POINTED: StyleVariant = StyleVariant {
        base_ratio: 0.917,
        hour: HandStyle::quad(0.6, 0.1, 0.04, 0.0),
        minute: HandStyle::quad(0.8, 0.12, 0.03, 0.0),
        second: TAPERED_SECOND,
        ticks: STANDARD_TICKS,
        numerals: Some(NumeralStyle { label_ratio: 0.72 }),
        hub: Some(STANDARD_HUB),
        hour_mode: HourHandMode::Snapping,
    };

    pub const fn with_hour_mode(mut self, hour_mode: HourHandMode) -> Self {
        self.hour_mode = hour_mode;
        self
    }
}

impl Default for StyleVariant {
    fn default() -> Self {
        StyleVariant::TAPERED
    }
}
