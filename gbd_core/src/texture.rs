//! Pools of GPU surfaces that cache rendered tiles between frames.
use crate::common::image::RgbaBuffer;
use crate::palette::Palette;
use crate::tile::TilePixels;
use crate::tile::TILE_DIM;

/// Abstract interface for a GPU-resident image that can be filled from a CPU
/// pixel buffer. Implemented on egui textures by the UI crate and on plain
/// buffers in tests.
pub trait Surface {
    /// Handle needed to allocate surfaces, e.g. an egui context. Cloned into
    /// each pool.
    type Context: Clone;

    fn create(context: &Self::Context, label: &str, size: [usize; 2]) -> Self;

    fn upload(&mut self, image: &RgbaBuffer);
}

/// Renders a decoded tile through a palette into an RGBA buffer, scaled up
/// by integer nearest-neighbor replication.
pub fn tile_to_rgba(pixels: &TilePixels, palette: &Palette, scale: usize) -> RgbaBuffer {
    let size = TILE_DIM * scale;
    let mut image = RgbaBuffer::new(size, size);
    for y in 0..TILE_DIM {
        for x in 0..TILE_DIM {
            let index = pixels.pixel(x, y).min(3) as usize;
            let color = palette.0[index];
            for sy in 0..scale {
                for sx in 0..scale {
                    image.set_pixel((x * scale + sx, y * scale + sy), color);
                }
            }
        }
    }
    image
}

/// Fixed grid of pre-allocated surfaces with per-entry dirty flags.
///
/// Surfaces are allocated once per (rows, cols, scale) configuration and
/// updated in place afterwards, so UI-side handles stay stable across
/// frames. Entries start out dirty and [TexturePool::update_at] only uploads
/// pixel data while the entry is dirty.
pub struct TexturePool<S: Surface> {
    context: S::Context,
    label: String,
    rows: usize,
    cols: usize,
    scale: usize,
    surfaces: Vec<S>,
    dirty: Vec<bool>,
}

impl<S: Surface> TexturePool<S> {
    pub fn new(context: S::Context, label: &str) -> Self {
        Self {
            context,
            label: label.to_string(),
            rows: 0,
            cols: 0,
            scale: 0,
            surfaces: Vec::new(),
            dirty: Vec::new(),
        }
    }

    pub fn is_initialized(&self) -> bool {
        !self.surfaces.is_empty()
    }

    /// Allocates the pool for the given configuration. Idempotent: if the
    /// configuration is unchanged the existing surfaces and dirty state are
    /// kept. Returns true if the pool was (re)allocated.
    pub fn reinitialize_if_needed(&mut self, rows: usize, cols: usize, scale: usize) -> bool {
        if self.is_initialized() && self.rows == rows && self.cols == cols && self.scale == scale {
            return false;
        }
        self.clear();
        self.rows = rows;
        self.cols = cols;
        self.scale = scale;
        let size = [TILE_DIM * scale, TILE_DIM * scale];
        self.surfaces = (0..rows * cols)
            .map(|i| S::create(&self.context, &format!("{}_{}", self.label, i), size))
            .collect();
        self.dirty = vec![true; rows * cols];
        true
    }

    fn index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.rows && col < self.cols).then(|| row * self.cols + col)
    }

    /// Uploads `image` into the surface at (row, col) if it is marked dirty,
    /// then returns the stable surface handle. None if out of range.
    pub fn update_at(&mut self, row: usize, col: usize, image: &RgbaBuffer) -> Option<&S> {
        let index = self.index(row, col)?;
        if self.dirty[index] {
            self.surfaces[index].upload(image);
            self.dirty[index] = false;
        }
        Some(&self.surfaces[index])
    }

    pub fn surface(&self, row: usize, col: usize) -> Option<&S> {
        Some(&self.surfaces[self.index(row, col)?])
    }

    /// Out-of-range entries report dirty so callers always render them.
    pub fn is_dirty(&self, row: usize, col: usize) -> bool {
        match self.index(row, col) {
            Some(index) => self.dirty[index],
            None => true,
        }
    }

    pub fn mark_dirty(&mut self, row: usize, col: usize) {
        if let Some(index) = self.index(row, col) {
            self.dirty[index] = true;
        }
    }

    pub fn mark_all_dirty(&mut self) {
        self.dirty.fill(true);
    }

    /// Releases all surfaces. Safe to call on an empty pool.
    pub fn clear(&mut self) {
        self.surfaces.clear();
        self.dirty.clear();
        self.rows = 0;
        self.cols = 0;
        self.scale = 0;
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn scale(&self) -> usize {
        self.scale
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::common::image::Rgba32;
    use crate::palette::DMG_PALETTE;
    use crate::tile::decode_tile;
    use crate::tile::TILE_BYTES;

    #[derive(Clone, Default)]
    struct TestContext(Rc<Cell<u64>>);

    struct TestSurface {
        id: u64,
        uploads: usize,
        pixels: Vec<u8>,
    }

    impl Surface for TestSurface {
        type Context = TestContext;

        fn create(context: &TestContext, _label: &str, _size: [usize; 2]) -> Self {
            context.0.set(context.0.get() + 1);
            Self {
                id: context.0.get(),
                uploads: 0,
                pixels: Vec::new(),
            }
        }

        fn upload(&mut self, image: &RgbaBuffer) {
            self.uploads += 1;
            self.pixels = image.as_raw().to_vec();
        }
    }

    fn checker_image() -> RgbaBuffer {
        let mut bank = vec![0_u8; TILE_BYTES];
        bank[0] = 0xAA;
        bank[1] = 0xAA;
        tile_to_rgba(&decode_tile(&bank, 0), &DMG_PALETTE, 1)
    }

    #[test]
    fn scaling_replicates_pixels() {
        let mut bank = vec![0_u8; TILE_BYTES];
        bank[0] = 0x80; // pixel (0, 0) is color 1
        let image = tile_to_rgba(&decode_tile(&bank, 0), &DMG_PALETTE, 2);
        assert_eq!(image.size(), [16, 16]);
        assert_eq!(image.pixel((0, 0)), DMG_PALETTE.0[1]);
        assert_eq!(image.pixel((1, 1)), DMG_PALETTE.0[1]);
        assert_eq!(image.pixel((2, 0)), DMG_PALETTE.0[0]);
    }

    #[test]
    fn reinitialize_is_idempotent() {
        let mut pool: TexturePool<TestSurface> = TexturePool::new(TestContext::default(), "test");
        assert!(pool.reinitialize_if_needed(2, 3, 1));
        let first_id = pool.surface(0, 0).unwrap().id;
        assert!(!pool.reinitialize_if_needed(2, 3, 1));
        assert_eq!(pool.surface(0, 0).unwrap().id, first_id);
        // Changing the configuration reallocates
        assert!(pool.reinitialize_if_needed(2, 3, 2));
        assert_ne!(pool.surface(0, 0).unwrap().id, first_id);
    }

    #[test]
    fn update_preserves_handles() {
        let mut pool: TexturePool<TestSurface> = TexturePool::new(TestContext::default(), "test");
        pool.reinitialize_if_needed(1, 2, 1);
        let image = checker_image();
        let id = pool.update_at(0, 1, &image).unwrap().id;
        pool.mark_all_dirty();
        assert_eq!(pool.update_at(0, 1, &image).unwrap().id, id);
    }

    #[test]
    fn upload_only_happens_while_dirty() {
        let mut pool: TexturePool<TestSurface> = TexturePool::new(TestContext::default(), "test");
        pool.reinitialize_if_needed(1, 1, 1);
        let image = checker_image();
        assert!(pool.is_dirty(0, 0));
        pool.update_at(0, 0, &image);
        assert!(!pool.is_dirty(0, 0));
        pool.update_at(0, 0, &image);
        assert_eq!(pool.surface(0, 0).unwrap().uploads, 1);
        pool.mark_dirty(0, 0);
        pool.update_at(0, 0, &image);
        assert_eq!(pool.surface(0, 0).unwrap().uploads, 2);
    }

    #[test]
    fn out_of_range_lookups() {
        let mut pool: TexturePool<TestSurface> = TexturePool::new(TestContext::default(), "test");
        pool.reinitialize_if_needed(2, 2, 1);
        assert!(pool.surface(2, 0).is_none());
        assert!(pool.surface(0, 2).is_none());
        assert!(pool.is_dirty(5, 5));
        assert!(pool.update_at(2, 0, &checker_image()).is_none());
    }

    #[test]
    fn clear_is_idempotent() {
        let mut pool: TexturePool<TestSurface> = TexturePool::new(TestContext::default(), "test");
        pool.reinitialize_if_needed(2, 2, 1);
        pool.clear();
        assert!(!pool.is_initialized());
        pool.clear();
        assert!(!pool.is_initialized());
        assert!(pool.surface(0, 0).is_none());
    }

    #[test]
    fn color_index_renders_through_palette() {
        let mut bank = vec![0_u8; TILE_BYTES];
        bank[0] = 0xFF;
        bank[1] = 0xFF; // row 0 all color 3
        let image = tile_to_rgba(&decode_tile(&bank, 0), &DMG_PALETTE, 1);
        assert_eq!(image.pixel((0, 0)), Rgba32([0, 0, 0, 255]));
        assert_eq!(image.pixel((0, 1)), Rgba32([255, 255, 255, 255]));
    }
}
