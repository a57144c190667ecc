//! Color formats shared by the decoder, palette tables and renderers.
use intbits::Bits;

/// RGB format used by CGB palette memory, 5 bits per channel.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb15(pub u16);

impl Rgb15 {
    pub fn r(&self) -> u8 {
        self.0.bits(0..=4) as u8
    }

    pub fn g(&self) -> u8 {
        self.0.bits(5..=9) as u8
    }

    pub fn b(&self) -> u8 {
        self.0.bits(10..=14) as u8
    }
}

/// 32-bit RGBA format used on modern machines for interop with egui.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rgba32(pub [u8; 4]);

impl From<Rgb15> for Rgba32 {
    fn from(value: Rgb15) -> Self {
        Self([expand5(value.r()), expand5(value.g()), expand5(value.b()), 255])
    }
}

/// Expands a 5-bit channel to 8 bits by replicating the top bits into the low
/// end, so 0b11111 maps to exactly 255.
pub fn expand5(value: u8) -> u8 {
    (value << 3) | (value >> 2)
}

/// CPU-side RGBA8 pixel buffer used to fill GPU surfaces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RgbaBuffer {
    size: [usize; 2],
    pixels: Vec<u8>,
}

impl RgbaBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            size: [width, height],
            pixels: vec![0; width * height * 4],
        }
    }

    pub fn size(&self) -> [usize; 2] {
        self.size
    }

    pub fn set_pixel(&mut self, index: (usize, usize), value: Rgba32) {
        let offset = (index.1 * self.size[0] + index.0) * 4;
        self.pixels[offset..offset + 4].copy_from_slice(&value.0);
    }

    pub fn pixel(&self, index: (usize, usize)) -> Rgba32 {
        let offset = (index.1 * self.size[0] + index.0) * 4;
        let mut value = [0; 4];
        value.copy_from_slice(&self.pixels[offset..offset + 4]);
        Rgba32(value)
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn expand5_endpoints() {
        assert_eq!(expand5(0), 0);
        assert_eq!(expand5(31), 255);
        assert_eq!(expand5(16), 132);
    }

    #[test]
    fn expand5_replicates_top_bits() {
        for value in 0..=31_u8 {
            assert_eq!(expand5(value), (value << 3) | (value >> 2));
            if value > 0 {
                assert!(expand5(value) > expand5(value - 1));
            }
        }
    }

    #[test]
    fn rgb15_channel_extraction() {
        // White
        assert_eq!(Rgba32::from(Rgb15(0x7FFF)), Rgba32([255, 255, 255, 255]));
        // Pure red in the low 5 bits
        assert_eq!(Rgba32::from(Rgb15(0x001F)), Rgba32([255, 0, 0, 255]));
        // Pure blue in the high 5 bits
        assert_eq!(Rgba32::from(Rgb15(0x7C00)), Rgba32([0, 0, 255, 255]));
    }

    #[test]
    fn buffer_pixel_round_trip() {
        let mut buffer = RgbaBuffer::new(4, 2);
        buffer.set_pixel((3, 1), Rgba32([1, 2, 3, 4]));
        assert_eq!(buffer.pixel((3, 1)), Rgba32([1, 2, 3, 4]));
        assert_eq!(buffer.pixel((0, 0)), Rgba32([0, 0, 0, 0]));
    }
}
