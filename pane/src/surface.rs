//! Pixel surfaces.
//!
//! A `Surface` is a rectangle of packed `0xAARRGGBB` words addressed by row
//! stride. It wraps either an owned buffer (`Surface<Vec<u32>>`, used for
//! off-screen scroll caches) or a caller-supplied one
//! (`Surface<&mut [u32]>`, the frame handed over by the display).
//!
//! Every drawing operation clips to the surface bounds. Coordinates outside
//! the surface are silently dropped, never an error.

use crate::error::{PaneError, Result};
use crate::font::Glyph;
use crate::primitives::{Color, Point, Rect};

/// A rectangular pixel buffer with a stride.
#[derive(Debug, Clone)]
pub struct Surface<P = Vec<u32>> {
    width: u32,
    height: u32,
    stride: u32,
    pixels: P,
}

impl Surface<Vec<u32>> {
    /// Allocate a zeroed surface, reporting allocation failure instead of aborting.
    pub fn try_new(width: u32, height: u32) -> Result<Self> {
        let alloc_err = || PaneError::Allocation { width, height };
        let len = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(alloc_err)?;

        let mut pixels = Vec::new();
        pixels.try_reserve_exact(len).map_err(|_| alloc_err())?;
        pixels.resize(len, 0);

        Ok(Self {
            width,
            height,
            stride: width,
            pixels,
        })
    }

    /// Borrow this owned surface as a mutable view.
    pub fn as_view_mut(&mut self) -> Surface<&mut [u32]> {
        Surface {
            width: self.width,
            height: self.height,
            stride: self.stride,
            pixels: &mut self.pixels,
        }
    }

    /// Take the raw pixel words.
    pub fn into_pixels(self) -> Vec<u32> {
        self.pixels
    }
}

impl<P: AsRef<[u32]>> Surface<P> {
    /// Wrap an existing buffer with `stride == width`.
    pub fn from_buffer(pixels: P, width: u32, height: u32) -> Result<Self> {
        Self::with_stride(pixels, width, height, width)
    }

    /// Wrap an existing buffer whose rows are `stride` words apart.
    pub fn with_stride(pixels: P, width: u32, height: u32, stride: u32) -> Result<Self> {
        let len = pixels.as_ref().len();
        let needed = if height == 0 {
            0
        } else {
            (height as usize - 1) * stride as usize + width as usize
        };
        if stride < width || len < needed {
            return Err(PaneError::BufferSize { width, height, len });
        }
        Ok(Self {
            width,
            height,
            stride,
            pixels,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn stride(&self) -> u32 {
        self.stride
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width as i32, self.height as i32)
    }

    /// Read one pixel, `None` outside the surface.
    #[inline]
    pub fn pixel(&self, x: i32, y: i32) -> Option<u32> {
        let idx = self.index(x, y)?;
        self.pixels.as_ref().get(idx).copied()
    }

    /// One row of pixels (`width` words).
    pub fn row(&self, y: u32) -> &[u32] {
        if y >= self.height {
            return &[];
        }
        let start = (y * self.stride) as usize;
        &self.pixels.as_ref()[start..start + self.width as usize]
    }

    /// The pixel words as bytes, for handing to a transport.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.pixels.as_ref())
    }

    /// Raw backing storage (may include stride padding).
    pub fn pixels(&self) -> &[u32] {
        self.pixels.as_ref()
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(y as usize * self.stride as usize + x as usize)
    }
}

impl<P: AsRef<[u32]> + AsMut<[u32]>> Surface<P> {
    /// Fill the whole surface.
    pub fn clear(&mut self, color: Color) {
        let bounds = self.bounds();
        self.fill_rect(bounds, color);
    }

    /// Fill a rectangle, clipped to the surface.
    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        let Some(clip) = rect.intersection(&self.bounds()) else {
            return;
        };
        let packed = color.pack();
        let stride = self.stride as usize;
        let pixels = self.pixels.as_mut();
        for y in clip.y..clip.bottom() {
            let start = y as usize * stride + clip.x as usize;
            pixels[start..start + clip.width as usize].fill(packed);
        }
    }

    /// Draw a 1-pixel outline along the inside of `rect`.
    pub fn stroke_rect(&mut self, rect: Rect, color: Color) {
        if rect.is_empty() {
            return;
        }
        let Rect { x, y, width, height } = rect;
        self.fill_rect(Rect::new(x, y, width, 1), color); // Top
        self.fill_rect(Rect::new(x, y + height - 1, width, 1), color); // Bottom
        self.fill_rect(Rect::new(x, y, 1, height), color); // Left
        self.fill_rect(Rect::new(x + width - 1, y, 1, height), color); // Right
    }

    /// Overwrite one pixel. Out-of-bounds writes are dropped.
    #[inline]
    pub fn put_pixel(&mut self, x: i32, y: i32, color: Color) {
        if let Some(idx) = self.index(x, y) {
            self.pixels.as_mut()[idx] = color.pack();
        }
    }

    /// Blend `color` over one pixel with coverage `alpha`.
    #[inline]
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Color, alpha: u8) {
        if alpha == 0 {
            return;
        }
        if let Some(idx) = self.index(x, y) {
            let pixels = self.pixels.as_mut();
            let dst = Color::unpack(pixels[idx]);
            pixels[idx] = color.blend_over(dst, alpha).pack();
        }
    }

    /// Stamp a glyph's coverage bitmap with its top-left corner at `origin`.
    pub fn blend_mask(&mut self, glyph: &Glyph, origin: Point, color: Color) {
        for row in 0..glyph.height {
            for col in 0..glyph.width {
                let alpha = glyph.alpha(col, row);
                self.blend_pixel(origin.x + col as i32, origin.y + row as i32, color, alpha);
            }
        }
    }

    /// Copy `rows` rows of `src`, starting at source row `src_y`, so that
    /// the first copied row lands at `dst`. Clipped against both surfaces.
    pub fn blit_rows<Q: AsRef<[u32]>>(&mut self, src: &Surface<Q>, src_y: i32, rows: i32, dst: Point) {
        // Source region in source coordinates, moved into destination space.
        let region = Rect::new(0, src_y, src.width as i32, rows);
        let Some(region) = region.intersection(&src.bounds()) else {
            return;
        };
        let offset = Point::new(dst.x, dst.y - src_y);
        let Some(target) = region.translate(offset).intersection(&self.bounds()) else {
            return;
        };

        let dst_stride = self.stride as usize;
        let src_stride = src.stride as usize;
        let width = target.width as usize;
        let src_pixels = src.pixels.as_ref();
        let dst_pixels = self.pixels.as_mut();

        for y in target.y..target.bottom() {
            let sy = (y - offset.y) as usize;
            let sx = (target.x - offset.x) as usize;
            let s = sy * src_stride + sx;
            let d = y as usize * dst_stride + target.x as usize;
            dst_pixels[d..d + width].copy_from_slice(&src_pixels[s..s + width]);
        }
    }

    /// Copy all of `src` with its top-left corner at `dst`.
    pub fn copy_from<Q: AsRef<[u32]>>(&mut self, src: &Surface<Q>, dst: Point) {
        self.blit_rows(src, 0, src.height as i32, dst);
    }
}
