//! Drawing surface dimensions and the projection scale derived from them

use crate::config::TorusParams;

/// Current surface size plus the projection scale K1 that depends on it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    width: u32,
    height: u32,
    k1: f32,
    /// Vertical scale applied to projected y (terminal cells are ~2x taller than wide)
    cell_aspect: f32,
}

impl Viewport {
    pub fn new(width: u32, height: u32, params: &TorusParams) -> Self {
        let mut viewport = Self {
            width: 0,
            height: 0,
            k1: 0.0,
            cell_aspect: 1.0,
        };
        viewport.resize(width, height, params);
        viewport
    }

    pub fn with_cell_aspect(mut self, cell_aspect: f32) -> Self {
        self.cell_aspect = cell_aspect;
        self
    }

    /// Apply a new size and recompute K1. Returns true if the size changed.
    pub fn resize(&mut self, width: u32, height: u32, params: &TorusParams) -> bool {
        let changed = width != self.width || height != self.height;
        self.width = width;
        self.height = height;
        self.k1 = projection_scale(width, params);
        changed
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn k1(&self) -> f32 {
        self.k1
    }

    pub fn cell_aspect(&self) -> f32 {
        self.cell_aspect
    }

    /// Zero-width or zero-height surfaces render nothing
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// K1 = width * K2 * 3 / (8 * (R1 + R2))
pub fn projection_scale(width: u32, params: &TorusParams) -> f32 {
    width as f32 * params.k2 * 3.0 / (8.0 * (params.r1 + params.r2))
}
