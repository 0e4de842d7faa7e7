//! Drawing surfaces the rasterizer paints into

use image::GrayImage;

/// Anything the rasterizer can clear and paint greyscale pixels on
pub trait Surface {
    /// Current size in pixels (or cells)
    fn size(&self) -> (u32, u32);

    /// Blank the whole surface
    fn clear(&mut self);

    /// Paint one pixel. Callers only pass in-bounds coordinates.
    fn set_pixel(&mut self, x: u32, y: u32, grey: u8);
}

/// In-memory greyscale canvas; a pixel is either untouched or holds its grey level
#[derive(Clone, PartialEq)]
pub struct GreyCanvas {
    width: u32,
    height: u32,
    pixels: Vec<Option<u8>>,
}

impl GreyCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![None; width as usize * height as usize],
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels = vec![None; width as usize * height as usize];
    }

    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    /// Coordinates of every painted pixel, row-major
    pub fn painted(&self) -> impl Iterator<Item = (u32, u32, u8)> + '_ {
        let width = self.width.max(1);
        self.pixels
            .iter()
            .enumerate()
            .filter_map(move |(i, p)| p.map(|g| (i as u32 % width, i as u32 / width, g)))
    }

    pub fn painted_count(&self) -> usize {
        self.pixels.iter().filter(|p| p.is_some()).count()
    }

    /// Flatten onto a black background
    pub fn to_image(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            image::Luma([self.get(x, y).unwrap_or(0)])
        })
    }

    /// Render as text using a luminance ramp, one character per pixel
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width as usize + 1) * self.height as usize);
        for y in 0..self.height {
            let row: String = (0..self.width)
                .map(|x| self.get(x, y).map(luminance_char).unwrap_or(' '))
                .collect();
            out.push_str(row.trim_end());
            out.push('\n');
        }
        out
    }
}

impl Surface for GreyCanvas {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.pixels.fill(None);
    }

    fn set_pixel(&mut self, x: u32, y: u32, grey: u8) {
        if x < self.width && y < self.height {
            self.pixels[y as usize * self.width as usize + x as usize] = Some(grey);
        }
    }
}

/// Classic donut luminance ramp, darkest to brightest
pub const LUMINANCE_CHARS: [char; 12] = ['.', ',', '-', '~', ':', ';', '=', '!', '*', '#', '$', '@'];

/// Pick the ramp character for a grey level
pub fn luminance_char(grey: u8) -> char {
    let idx = grey as usize * LUMINANCE_CHARS.len() / 256;
    LUMINANCE_CHARS[idx.min(LUMINANCE_CHARS.len() - 1)]
}
