//! Per-frame depth buffer keyed on inverse depth (larger = closer)

/// One `ooz` value per pixel, row-major. Storage is reused across frames;
/// contents are reset at the start of each one.
pub struct DepthBuffer {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl DepthBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width as usize * height as usize],
        }
    }

    /// Zero every entry, reallocating only when the size changed
    pub fn reset(&mut self, width: u32, height: u32) {
        let len = width as usize * height as usize;
        self.width = width;
        self.height = height;
        self.data.clear();
        self.data.resize(len, 0.0);
    }

    /// Flat index of (x, y), or None outside the buffer
    pub fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    #[cfg(test)]
    pub fn get(&self, x: i64, y: i64) -> Option<f32> {
        self.index(x, y).map(|i| self.data[i])
    }

    /// Store `ooz` at (x, y) if it is strictly closer than what is there.
    /// Returns true when the sample won.
    pub fn test_and_set(&mut self, x: i64, y: i64, ooz: f32) -> bool {
        match self.index(x, y) {
            Some(i) if ooz > self.data[i] => {
                self.data[i] = ooz;
                true
            }
            _ => false,
        }
    }

    #[cfg(test)]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}
