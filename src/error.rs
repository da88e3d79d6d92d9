//! Error type shared by the clock face, the raster and the tickers.

use core::fmt;

/// Errors surfaced to the host. Degenerate surface sizes are not errors,
/// they produce a blank face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockError {
    /// The offscreen static layer could not be allocated.
    RasterAlloc { width: u32, height: u32 },
    /// A pixel buffer does not match the dimensions it was paired with.
    OutOfBounds,
    /// The platform refused to start a ticker.
    TickerSpawn,
}

impl fmt::Display for ClockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClockError::RasterAlloc { width, height } => {
                write!(f, "failed to allocate {}x{} static layer", width, height)
            }
            ClockError::OutOfBounds => f.write_str("pixel buffer does not match raster size"),
            ClockError::TickerSpawn => f.write_str("failed to start second ticker"),
        }
    }
}

impl core::error::Error for ClockError {}
