//! Solid colour buffer backing the per-output curtain.
//!
//! The rendering engine only needs the colour, the size and a commit counter
//! telling it when the content changed; everything else is owned by the view
//! the buffer is attached to.

use smithay::utils::{Logical, Size};

/// Straight-alpha RGBA colour with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };

    /// Decode a packed `0xAARRGGBB` value.
    pub fn from_argb(argb: u32) -> Self {
        let channel = |shift: u32| ((argb >> shift) & 0xff) as f32 / 255.0;
        Color {
            r: channel(16),
            g: channel(8),
            b: channel(0),
            a: channel(24),
        }
    }

    pub fn to_argb(self) -> u32 {
        let channel = |value: f32| (value.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.a) << 24) | (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }

    pub fn is_opaque(self) -> bool {
        self.a >= 1.0
    }
}

/// A buffer that renders as a solid color.
#[derive(Debug, Clone, Default)]
pub struct SolidColorBuffer {
    size: Size<i32, Logical>,
    commit: u64,
    color: Color,
}

impl SolidColorBuffer {
    pub fn new(size: impl Into<Size<i32, Logical>>, color: Color) -> Self {
        SolidColorBuffer {
            size: size.into(),
            commit: 0,
            color,
        }
    }

    /// Resize the buffer.
    pub fn resize(&mut self, size: impl Into<Size<i32, Logical>>) {
        let size = size.into();
        if size != self.size {
            self.size = size;
            self.commit += 1;
        }
    }

    pub fn set_color(&mut self, color: Color) {
        if color != self.color {
            self.color = color;
            self.commit += 1;
        }
    }

    /// Force a new commit without changing visible properties.
    pub fn touch(&mut self) {
        self.commit += 1;
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn size(&self) -> Size<i32, Logical> {
        self.size
    }

    pub fn commit(&self) -> u64 {
        self.commit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argb_decodes_channels() {
        let color = Color::from_argb(0x80ff_0040);
        assert_eq!(color.r, 1.0);
        assert_eq!(color.g, 0.0);
        assert!((color.b - 64.0 / 255.0).abs() < f32::EPSILON);
        assert!(!color.is_opaque());
        assert_eq!(color.to_argb(), 0x80ff_0040);
        assert!(Color::from_argb(0xff00_0000).is_opaque());
    }

    #[test]
    fn commit_only_moves_on_visible_change() {
        let mut buffer = SolidColorBuffer::new((100, 50), Color::BLACK);
        buffer.resize((100, 50));
        buffer.set_color(Color::BLACK);
        assert_eq!(buffer.commit(), 0);

        buffer.resize((200, 50));
        buffer.set_color(Color::from_argb(0xffff_ffff));
        assert_eq!(buffer.commit(), 2);

        buffer.touch();
        assert_eq!(buffer.commit(), 3);
        assert_eq!(buffer.size(), Size::from((200, 50)));
    }
}
