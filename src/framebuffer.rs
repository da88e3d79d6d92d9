// Offscreen RGB565 raster used as the static layer of the dial.
//
// Implements `DrawTarget<Rgb565>` so the same painting code works against the
// raster and against the host's final surface. Storage is one u16 per pixel,
// row-major, native endian.

use alloc::vec::Vec;
use core::convert::Infallible;

use embedded_graphics::{
    pixelcolor::{raw::RawU16, Rgb565},
    prelude::*,
    primitives::Rectangle,
};

use crate::error::ClockError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    w: u32,
    h: u32,
    fb: Vec<u16>,
}

impl Framebuffer {
    /// Allocate a `width` x `height` raster filled with `color`.
    ///
    /// Allocation failure is reported instead of aborting so the caller can
    /// keep showing its previous frame.
    pub fn try_new(width: u32, height: u32, color: Rgb565) -> Result<Self, ClockError> {
        let len = (width as usize)
            .checked_mul(height as usize)
            .ok_or(ClockError::RasterAlloc { width, height })?;

        let mut fb = Vec::new();
        fb.try_reserve_exact(len)
            .map_err(|_| ClockError::RasterAlloc { width, height })?;
        fb.resize(len, color.into_storage());

        Ok(Self { w: width, h: height, fb })
    }

    /// Wrap existing pixel storage.
    pub fn from_vec(width: u32, height: u32, fb: Vec<u16>) -> Result<Self, ClockError> {
        // Validate FB size matches WxH
        let expected = (width as usize) * (height as usize);
        if fb.len() != expected {
            return Err(ClockError::OutOfBounds);
        }
        Ok(Self { w: width, h: height, fb })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.w
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.h
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fb.is_empty()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb565> {
        if x >= self.w || y >= self.h {
            return None;
        }
        let raw = self.fb[(y as usize) * (self.w as usize) + (x as usize)];
        Some(Rgb565::from(RawU16::new(raw)))
    }

    #[inline]
    pub fn pixels(&self) -> &[u16] {
        &self.fb
    }

    /// Raw native-endian bytes, e.g. for handing to a display driver.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.fb)
    }

    /// Number of pixels equal to `color`.
    pub fn count(&self, color: Rgb565) -> usize {
        let raw = color.into_storage();
        self.fb.iter().filter(|&&px| px == raw).count()
    }

    /// Fill a clipped rectangle with a solid color.
    pub fn fill_rect_solid(&mut self, area: &Rectangle, color: Rgb565) {
        let inter = area.intersection(&self.bounding_box());
        if inter.size.width == 0 || inter.size.height == 0 {
            return;
        }
        let fbw = self.w as usize;
        let x0 = inter.top_left.x as usize;
        let y0 = inter.top_left.y as usize;
        let row_w = inter.size.width as usize;
        let color16 = color.into_storage();
        for ry in 0..(inter.size.height as usize) {
            let base = (y0 + ry) * fbw + x0;
            self.fb[base..base + row_w].fill(color16);
        }
    }

    /// Copy the whole raster onto `target` with its top-left at the origin.
    pub fn blit<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        if self.fb.is_empty() {
            return Ok(());
        }
        let area = Rectangle::new(Point::zero(), Size::new(self.w, self.h));
        target.fill_contiguous(
            &area,
            self.fb.iter().map(|&raw| Rgb565::from(RawU16::new(raw))),
        )
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        Size::new(self.w, self.h)
    }
}

impl DrawTarget for Framebuffer {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Rgb565>>,
    {
        let fbw = self.w as usize;
        for Pixel(p, c) in pixels {
            if p.x < 0 || p.y < 0 {
                continue;
            }
            let (x, y) = (p.x as u32, p.y as u32);
            if x >= self.w || y >= self.h {
                continue;
            }
            self.fb[(y as usize) * fbw + (x as usize)] = c.into_storage();
        }
        Ok(())
    }

    // Row streaming for blits and large fills
    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Rgb565>,
    {
        let inter = area.intersection(&self.bounding_box());
        if inter.size.width == 0 || inter.size.height == 0 {
            return Ok(());
        }

        let area_w = area.size.width as usize;
        let take = inter.size.width as usize;
        let left_skip = (inter.top_left.x - area.top_left.x).max(0) as usize;
        let right_skip = area_w.saturating_sub(left_skip + take);
        let top_skip = (inter.top_left.y - area.top_left.y).max(0) as usize;

        let fbw = self.w as usize;
        let x0 = inter.top_left.x as usize;
        let y0 = inter.top_left.y as usize;
        let mut it = colors.into_iter();

        // Skip rows above the intersection
        for _ in 0..top_skip * area_w {
            let _ = it.next();
        }

        for ry in 0..(inter.size.height as usize) {
            for _ in 0..left_skip {
                let _ = it.next();
            }
            let dst = (y0 + ry) * fbw + x0;
            for (px, c) in self.fb[dst..dst + take].iter_mut().zip(it.by_ref()) {
                *px = c.into_storage();
            }
            for _ in 0..right_skip {
                let _ = it.next();
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        self.fill_rect_solid(area, color);
        Ok(())
    }

    fn clear(&mut self, color: Rgb565) -> Result<(), Self::Error> {
        self.fb.fill(color.into_storage());
        Ok(())
    }
}
