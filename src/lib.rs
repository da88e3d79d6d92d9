#![cfg_attr(not(any(test, feature = "std")), no_std)]

//! Analog clock face for embedded-graphics surfaces.
//!
//! The dial geometry is derived from the surface size alone, painted once
//! per resize into an offscreen static layer, and every second only the
//! hands are repainted on top of it.

extern crate alloc;

pub mod clock;
pub mod config;
pub mod error;
pub mod face;
pub mod framebuffer;
pub mod geometry;
pub mod primitives;
pub mod render;
pub mod style;
pub mod ticker;

pub use clock::{ClockState, FixedClock, SharedClock, WallClock, WallTime};
pub use config::{ClockConfig, SizeConstraint, StyleParams};
pub use error::ClockError;
pub use face::{ClockFace, ClockView, Phase, Scene};
pub use framebuffer::Framebuffer;
pub use geometry::{compute_geometry, Geometry};
pub use style::{HourHandMode, StyleVariant};
pub use ticker::{PollTicker, TickSource, TickerSlot};

cfg_if::cfg_if! {
    if #[cfg(feature = "std")] {
        pub use clock::SystemClock;
        pub use ticker::ThreadTicker;

        /// Face showing local time, ticking on its own thread.
        pub type SystemClockFace = ClockFace<SystemClock, ThreadTicker>;

        pub fn system_face(config: ClockConfig) -> SystemClockFace {
            ClockFace::new(config, SystemClock, ThreadTicker)
        }
    }
}
