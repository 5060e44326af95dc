//! Procedural RGBA8 textures: crate checkerboard, ground tiles and the sky
//! gradient cube map.

use cubescene_math::Vector3;
use serde::{Deserialize, Serialize};

/// Errors from texture generation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextureError {
    #[error("texture size must be non-zero")]
    EmptySize,
    #[error("{cells} cells do not fit in a {size}px texture")]
    TooManyCells { size: u32, cells: u32 },
}

/// Tightly packed RGBA8 image, rows top to bottom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TextureImage {
    pub fn new(width: u32, height: u32) -> Result<Self, TextureError> {
        if width == 0 || height == 0 {
            return Err(TextureError::EmptySize);
        }
        Ok(Self {
            width,
            height,
            pixels: vec![0; (width * height * 4) as usize],
        })
    }

    fn index(&self, x: u32, y: u32) -> usize {
        ((y * self.width + x) * 4) as usize
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.index(x, y);
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let i = self.index(x, y);
        self.pixels[i..i + 4].copy_from_slice(&rgba);
    }

    /// Bytes per row, for GPU uploads.
    pub fn row_pitch(&self) -> u32 {
        self.width * 4
    }
}

fn check_cells(size: u32, cells: u32) -> Result<(), TextureError> {
    if size == 0 {
        return Err(TextureError::EmptySize);
    }
    if cells == 0 || cells > size {
        return Err(TextureError::TooManyCells { size, cells });
    }
    Ok(())
}

/// `cells × cells` checkerboard alternating `a` and `b`, starting with `a` top-left.
pub fn checkerboard(size: u32, cells: u32, a: [u8; 4], b: [u8; 4]) -> Result<TextureImage, TextureError> {
    check_cells(size, cells)?;
    let mut img = TextureImage::new(size, size)?;
    for y in 0..size {
        for x in 0..size {
            let cx = x * cells / size;
            let cy = y * cells / size;
            img.set_pixel(x, y, if (cx + cy) % 2 == 0 { a } else { b });
        }
    }
    Ok(img)
}

/// Checkerboard with a dark frame around the edge, used on the cubes.
pub fn crate_texture(size: u32) -> Result<TextureImage, TextureError> {
    let mut img = checkerboard(size, 4, [214, 178, 120, 255], [178, 138, 84, 255])?;
    let border = (size / 16).max(1);
    let frame = [92, 64, 36, 255];
    for y in 0..size {
        for x in 0..size {
            if x < border || y < border || x >= size - border || y >= size - border {
                img.set_pixel(x, y, frame);
            }
        }
    }
    Ok(img)
}

/// `tiles × tiles` grid of `base` tiles separated by one-pixel `line` grout.
pub fn ground_tiles(size: u32, tiles: u32, base: [u8; 4], line: [u8; 4]) -> Result<TextureImage, TextureError> {
    check_cells(size, tiles)?;
    let mut img = TextureImage::new(size, size)?;
    let edge = |v: u32| (v * tiles) % size < tiles;
    for y in 0..size {
        for x in 0..size {
            img.set_pixel(x, y, if edge(x) || edge(y) { line } else { base });
        }
    }
    Ok(img)
}

fn to_rgba8(c: [f32; 3]) -> [u8; 4] {
    let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    [q(c[0]), q(c[1]), q(c[2]), 255]
}

fn lerp3(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [0, 1, 2].map(|i| a[i] * (1.0 - t) + b[i] * t)
}

/// Vertical sky gradient: horizon at y = 0 blending to zenith above and nadir below.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkyGradient {
    pub zenith: [f32; 3],
    pub horizon: [f32; 3],
    pub nadir: [f32; 3],
}

impl Default for SkyGradient {
    fn default() -> Self {
        Self {
            zenith: [0.18, 0.36, 0.70],
            horizon: [0.62, 0.74, 0.86],
            nadir: [0.30, 0.30, 0.28],
        }
    }
}

/// Six square faces in +X, -X, +Y, -Y, +Z, -Z order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkyCubemap {
    pub size: u32,
    pub faces: [TextureImage; 6],
}

impl SkyCubemap {
    /// All faces concatenated, layer after layer.
    pub fn layer_major_bytes(&self) -> Vec<u8> {
        self.faces
            .iter()
            .flat_map(|f| f.pixels.iter().copied())
            .collect()
    }
}

/// Direction through texel coordinates `(u, v)` in `-1..1` of a cube face.
fn face_direction(face: usize, u: f32, v: f32) -> Vector3 {
    match face {
        0 => Vector3::new(1.0, -v, -u),
        1 => Vector3::new(-1.0, -v, u),
        2 => Vector3::new(u, 1.0, v),
        3 => Vector3::new(u, -1.0, -v),
        4 => Vector3::new(u, -v, 1.0),
        _ => Vector3::new(-u, -v, -1.0),
    }
}

impl SkyGradient {
    /// Sky color seen along `direction`.
    pub fn color(&self, direction: Vector3) -> [f32; 3] {
        let t = direction.normalize().y;
        if t >= 0.0 {
            lerp3(self.horizon, self.zenith, t)
        } else {
            lerp3(self.horizon, self.nadir, -t)
        }
    }

    pub fn cubemap(&self, size: u32) -> Result<SkyCubemap, TextureError> {
        let face = |index: usize| -> Result<TextureImage, TextureError> {
            let mut img = TextureImage::new(size, size)?;
            for y in 0..size {
                for x in 0..size {
                    let u = 2.0 * (x as f32 + 0.5) / size as f32 - 1.0;
                    let v = 2.0 * (y as f32 + 0.5) / size as f32 - 1.0;
                    img.set_pixel(x, y, to_rgba8(self.color(face_direction(index, u, v))));
                }
            }
            Ok(img)
        };
        Ok(SkyCubemap {
            size,
            faces: [face(0)?, face(1)?, face(2)?, face(3)?, face(4)?, face(5)?],
        })
    }
}
