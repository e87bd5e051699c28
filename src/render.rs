//! Drawing surfaces for the analysis overlay.
//!
//! [`Renderer`] is the capability set the [`Visualizer`](crate::Visualizer)
//! needs. [`CanvasRenderer`] paints into an RGBA buffer; [`RecordingRenderer`]
//! only records the calls, which is what tests use.

use image::imageops::{self, FilterType};
use image::{Pixel, RgbaImage};

use crate::font;
use crate::types::Point;

pub type Color = image::Rgba<u8>;

/// An axis-aligned rectangle defined by top-left corner, width, and height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Corners in drawing order, closed back onto the first one.
    fn outline(&self) -> [Point; 5] {
        [
            Point::new(self.x, self.y),
            Point::new(self.right(), self.y),
            Point::new(self.right(), self.bottom()),
            Point::new(self.x, self.bottom()),
            Point::new(self.x, self.y),
        ]
    }
}

/// A 2D drawing surface of fixed pixel dimensions.
///
/// Surfaces are not shareable: callers must serialize access per instance,
/// which `&mut self` enforces.
pub trait Renderer {
    /// Surface width and height in pixels.
    fn size(&self) -> (u32, u32);

    fn clear(&mut self);

    /// Draw `image` stretched to `width` x `height` at the origin.
    fn draw_image(&mut self, image: &RgbaImage, width: u32, height: u32);

    fn draw_polyline(&mut self, points: &[Point], width: f32, color: Color);

    /// Draw each point as a filled dot.
    fn draw_points(&mut self, points: &[Point], radius: f32, color: Color);

    fn fill_rect(&mut self, rect: Rect, color: Color);

    fn stroke_rect(&mut self, rect: Rect, width: f32, color: Color);

    /// Draw a single line of text with its top-left corner at `origin`.
    fn draw_text(&mut self, text: &str, origin: Point, size: f32, color: Color);
}

/// Renderer backed by an in-memory RGBA image. Colors are alpha-blended.
pub struct CanvasRenderer {
    canvas: RgbaImage,
}

impl CanvasRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            canvas: RgbaImage::new(width, height),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.canvas
    }

    pub fn into_image(self) -> RgbaImage {
        self.canvas
    }

    fn blend(&mut self, x: i32, y: i32, color: Color) {
        let (w, h) = self.canvas.dimensions();
        if x >= 0 && x < w as i32 && y >= 0 && y < h as i32 {
            self.canvas.get_pixel_mut(x as u32, y as u32).blend(&color);
        }
    }

    /// Blend every pixel once, so translucent strokes don't darken where
    /// segments overlap.
    fn blend_mask(&mut self, mut pixels: Vec<(i32, i32)>, color: Color) {
        pixels.sort_unstable();
        pixels.dedup();
        for (x, y) in pixels {
            self.blend(x, y, color);
        }
    }
}

impl Renderer for CanvasRenderer {
    fn size(&self) -> (u32, u32) {
        self.canvas.dimensions()
    }

    fn clear(&mut self) {
        for p in self.canvas.pixels_mut() {
            *p = image::Rgba([0, 0, 0, 0]);
        }
    }

    fn draw_image(&mut self, image: &RgbaImage, width: u32, height: u32) {
        if image.dimensions() == (width, height) {
            imageops::replace(&mut self.canvas, image, 0, 0);
        } else {
            let resized = imageops::resize(image, width, height, FilterType::Triangle);
            imageops::replace(&mut self.canvas, &resized, 0, 0);
        }
    }

    fn draw_polyline(&mut self, points: &[Point], width: f32, color: Color) {
        let radius = stroke_radius(width);
        let bounds = Bounds::around(self.canvas.dimensions(), radius);
        let mut mask = Vec::new();
        for pair in points.windows(2) {
            if let Some((from, to)) = bounds.clip_segment(pair[0], pair[1]) {
                line_pixels(&mut mask, from, to, radius);
            }
        }
        if let [only] = points {
            if bounds.contains(*only) {
                disc_pixels(&mut mask, *only, radius);
            }
        }
        self.blend_mask(mask, color);
    }

    fn draw_points(&mut self, points: &[Point], radius: f32, color: Color) {
        let radius = radius.round().max(0.0) as i32;
        let bounds = Bounds::around(self.canvas.dimensions(), radius);
        for p in points.iter().filter(|p| bounds.contains(**p)) {
            let mut mask = Vec::new();
            disc_pixels(&mut mask, *p, radius);
            self.blend_mask(mask, color);
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let (w, h) = self.canvas.dimensions();
        let x0 = rect.x.round().clamp(0.0, w as f32) as i32;
        let y0 = rect.y.round().clamp(0.0, h as f32) as i32;
        let x1 = rect.right().round().clamp(0.0, w as f32) as i32;
        let y1 = rect.bottom().round().clamp(0.0, h as f32) as i32;
        for y in y0..y1 {
            for x in x0..x1 {
                self.blend(x, y, color);
            }
        }
    }

    fn stroke_rect(&mut self, rect: Rect, width: f32, color: Color) {
        self.draw_polyline(&rect.outline(), width, color);
    }

    fn draw_text(&mut self, text: &str, origin: Point, size: f32, color: Color) {
        let scale = font::scale_for(size) as i32;
        let advance = font::advance(scale as u32) as i32;
        let ox = origin.x.round() as i32;
        let oy = origin.y.round() as i32;

        for (i, c) in text.chars().enumerate() {
            let gx = ox + i as i32 * advance;
            for (row, bits) in font::glyph(c).iter().enumerate() {
                for col in 0..font::GLYPH_WIDTH as i32 {
                    if bits & (0b100u8 >> col) == 0 {
                        continue;
                    }
                    for dy in 0..scale {
                        for dx in 0..scale {
                            self.blend(gx + col * scale + dx, oy + row as i32 * scale + dy, color);
                        }
                    }
                }
            }
        }
    }
}

/// Surface rectangle grown by a stroke margin, in surface coordinates.
#[derive(Debug, Clone, Copy)]
struct Bounds {
    min: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    fn around((width, height): (u32, u32), radius: i32) -> Self {
        let margin = (radius + 1) as f32;
        Self {
            min: -margin,
            max_x: width as f32 + margin,
            max_y: height as f32 + margin,
        }
    }

    fn contains(&self, p: Point) -> bool {
        p.x >= self.min && p.x <= self.max_x && p.y >= self.min && p.y <= self.max_y
    }

    /// Liang-Barsky clipping. `None` when the segment misses the bounds or
    /// has a non-finite endpoint.
    fn clip_segment(&self, from: Point, to: Point) -> Option<(Point, Point)> {
        if !(from.x.is_finite() && from.y.is_finite() && to.x.is_finite() && to.y.is_finite()) {
            return None;
        }

        let d = to - from;
        let mut t0 = 0.0f32;
        let mut t1 = 1.0f32;
        let edges = [
            (-d.x, from.x - self.min),
            (d.x, self.max_x - from.x),
            (-d.y, from.y - self.min),
            (d.y, self.max_y - from.y),
        ];
        for (p, q) in edges {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
            } else {
                let t = q / p;
                if p < 0.0 {
                    t0 = t0.max(t);
                } else {
                    t1 = t1.min(t);
                }
                if t0 > t1 {
                    return None;
                }
            }
        }

        // Clamp again: t * d can land a hair outside in f32.
        let clamp = |p: Point| {
            Point::new(
                p.x.clamp(self.min, self.max_x),
                p.y.clamp(self.min, self.max_y),
            )
        };
        Some((clamp(from + d * t0), clamp(from + d * t1)))
    }
}

fn stroke_radius(width: f32) -> i32 {
    ((width - 1.0) / 2.0).round().max(0.0) as i32
}

fn disc_pixels(out: &mut Vec<(i32, i32)>, center: Point, radius: i32) {
    let cx = center.x.round() as i32;
    let cy = center.y.round() as i32;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                out.push((cx + dx, cy + dy));
            }
        }
    }
}

/// Bresenham line, stamped with a disc of `radius` at each step. Endpoints
/// must already be clipped to the surface.
fn line_pixels(out: &mut Vec<(i32, i32)>, from: Point, to: Point, radius: i32) {
    let (x0, y0) = (from.x.round() as i32, from.y.round() as i32);
    let (x1, y1) = (to.x.round() as i32, to.y.round() as i32);

    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx - dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        disc_pixels(out, Point::new(x as f32, y as f32), radius);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x += sx;
        }
        if e2 < dx {
            err += dx;
            y += sy;
        }
    }
}

/// A single recorded renderer call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    Image { width: u32, height: u32 },
    Polyline { points: Vec<Point>, width: f32, color: Color },
    Points { points: Vec<Point>, radius: f32, color: Color },
    FillRect { rect: Rect, color: Color },
    StrokeRect { rect: Rect, width: f32, color: Color },
    Text { text: String, origin: Point, size: f32, color: Color },
}

/// Renderer that records calls instead of painting.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    width: u32,
    height: u32,
    commands: Vec<DrawCommand>,
}

impl RecordingRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Text of every recorded `draw_text` call, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Renderer for RecordingRenderer {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.commands.push(DrawCommand::Clear);
    }

    fn draw_image(&mut self, _image: &RgbaImage, width: u32, height: u32) {
        self.commands.push(DrawCommand::Image { width, height });
    }

    fn draw_polyline(&mut self, points: &[Point], width: f32, color: Color) {
        self.commands.push(DrawCommand::Polyline {
            points: points.to_vec(),
            width,
            color,
        });
    }

    fn draw_points(&mut self, points: &[Point], radius: f32, color: Color) {
        self.commands.push(DrawCommand::Points {
            points: points.to_vec(),
            radius,
            color,
        });
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    fn stroke_rect(&mut self, rect: Rect, width: f32, color: Color) {
        self.commands.push(DrawCommand::StrokeRect { rect, width, color });
    }

    fn draw_text(&mut self, text: &str, origin: Point, size: f32, color: Color) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            origin,
            size,
            color,
        });
    }
}
