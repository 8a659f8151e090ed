use serde::{Deserialize, Serialize};

/// Pixel canvas size of a rendered panel layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Smallest integer viewport covering `width` x `height` pixels.
    #[must_use]
    pub fn covering(width: f64, height: f64) -> Self {
        Self {
            width: ceil_to_u32(width),
            height: ceil_to_u32(height),
        }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }
}

fn ceil_to_u32(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.ceil().min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}
