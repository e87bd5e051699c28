use image::RgbaImage;

use crate::config::{OverlayConfig, Rgba};
use crate::render::{Color, Rect, Renderer};
use crate::types::{AnalysisResult, DentalProportions, FaceShape, Keypoint, Midline, Point};

const INFO_BOX_ORIGIN: Point = Point::new(10.0, 10.0);
const INFO_BOX_PADDING: f32 = 10.0;

/// Paints the analyzed image and its overlay onto a [`Renderer`].
#[derive(Debug, Clone, Default)]
pub struct Visualizer {
    overlay: OverlayConfig,
}

/// Maps keypoint (image) coordinates onto the surface the image is stretched to.
#[derive(Debug, Clone, Copy)]
struct Viewport {
    sx: f32,
    sy: f32,
}

impl Viewport {
    fn new(image: &RgbaImage, surface: (u32, u32)) -> Self {
        let (iw, ih) = image.dimensions();
        let scale = |surface: u32, image: u32| {
            if image == 0 {
                1.0
            } else {
                surface as f32 / image as f32
            }
        };
        Self {
            sx: scale(surface.0, iw),
            sy: scale(surface.1, ih),
        }
    }

    fn map(&self, p: Point) -> Point {
        Point::new(p.x * self.sx, p.y * self.sy)
    }
}

fn color(rgba: Rgba) -> Color {
    image::Rgba(rgba)
}

impl Visualizer {
    pub fn new(overlay: OverlayConfig) -> Self {
        Self { overlay }
    }

    /// Draw `image` stretched over the whole surface, then the analysis
    /// overlay. Failed analyses get the plain image only.
    pub fn render<R: Renderer + ?Sized>(
        &self,
        renderer: &mut R,
        image: &RgbaImage,
        result: &AnalysisResult,
    ) {
        let (width, height) = renderer.size();
        renderer.clear();
        renderer.draw_image(image, width, height);

        let Some((midline, face_shape, proportions)) = result.measurements() else {
            return;
        };
        let viewport = Viewport::new(image, (width, height));

        self.draw_midline(renderer, midline, viewport);
        if let Some(landmarks) = &result.landmarks {
            self.draw_landmarks(renderer, landmarks, viewport);
        }
        self.draw_proportions(renderer, proportions, viewport);
        self.draw_info(renderer, face_shape, proportions);
    }

    fn draw_midline<R: Renderer + ?Sized>(&self, renderer: &mut R, midline: &Midline, viewport: Viewport) {
        let (Some(&first), Some(&last)) = (midline.points.first(), midline.points.last()) else {
            return;
        };

        let mut line = Vec::with_capacity(midline.points.len() + 2);
        let length = first.distance(&last);
        let direction = if length > 0.0 {
            let d = last - first;
            Some(Point::new(d.x / length, d.y / length))
        } else {
            None
        };

        if let Some(dir) = direction {
            line.push(first - dir * self.overlay.midline_extension);
        }
        line.extend(midline.points.iter().copied());
        if let Some(dir) = direction {
            line.push(last + dir * self.overlay.midline_extension);
        }

        let line: Vec<Point> = line.into_iter().map(|p| viewport.map(p)).collect();
        renderer.draw_polyline(&line, self.overlay.line_width, color(self.overlay.midline_color));
    }

    fn draw_landmarks<R: Renderer + ?Sized>(
        &self,
        renderer: &mut R,
        landmarks: &[Keypoint],
        viewport: Viewport,
    ) {
        let points: Vec<Point> = landmarks.iter().map(|kp| viewport.map(kp.point())).collect();
        renderer.draw_points(&points, self.overlay.point_radius, color(self.overlay.point_color));
    }

    /// Six mirrored tooth rectangles centered horizontally, plus their bounds.
    fn draw_proportions<R: Renderer + ?Sized>(
        &self,
        renderer: &mut R,
        proportions: &DentalProportions,
        viewport: Viewport,
    ) {
        let (width, height) = renderer.size();
        let cx = width as f32 / 2.0;
        let cy = height as f32 * self.overlay.band_center_y;
        let th = self.overlay.tooth_height;
        let top = cy - th / 2.0;

        let central = proportions.central_incisors_width * viewport.sx;
        let lateral = proportions.lateral_incisors_width * viewport.sx;
        let canine = proportions.canines_width * viewport.sx;

        let teeth = [
            (0.0, central, self.overlay.central_color),
            (central, lateral, self.overlay.lateral_color),
            (central + lateral, canine, self.overlay.canine_color),
        ];
        for (offset, tooth, rgba) in teeth {
            renderer.fill_rect(Rect::new(cx - offset - tooth, top, tooth, th), color(rgba));
            renderer.fill_rect(Rect::new(cx + offset, top, tooth, th), color(rgba));
        }

        let span = proportions.half_span() * viewport.sx;
        renderer.stroke_rect(
            Rect::new(cx - span, top, span * 2.0, th),
            1.0,
            color(self.overlay.band_outline_color),
        );
    }

    fn draw_info<R: Renderer + ?Sized>(
        &self,
        renderer: &mut R,
        face_shape: &FaceShape,
        proportions: &DentalProportions,
    ) {
        let lines = info_lines(face_shape, proportions);
        let size = self.overlay.text_size;
        let line_height = size * 1.6;
        let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let char_width = crate::font::advance(crate::font::scale_for(size)) as f32;

        let background = Rect::new(
            INFO_BOX_ORIGIN.x,
            INFO_BOX_ORIGIN.y,
            longest as f32 * char_width + INFO_BOX_PADDING * 2.0,
            lines.len() as f32 * line_height + INFO_BOX_PADDING * 2.0 - (line_height - size),
        );
        renderer.fill_rect(background, color(self.overlay.info_background));

        for (i, text) in lines.iter().enumerate() {
            let origin = Point::new(
                INFO_BOX_ORIGIN.x + INFO_BOX_PADDING,
                INFO_BOX_ORIGIN.y + INFO_BOX_PADDING + i as f32 * line_height,
            );
            renderer.draw_text(text, origin, size, color(self.overlay.info_text_color));
        }
    }
}

/// Text shown in the overlay info box.
pub fn info_lines(face_shape: &FaceShape, proportions: &DentalProportions) -> Vec<String> {
    vec![
        format!("Face shape: {}", face_shape.shape),
        format!("Confidence: {:.0}%", face_shape.confidence * 100.0),
        format!("Central incisor: {:.1} mm", proportions.central_incisors_width),
        format!("Lateral incisor: {:.1} mm", proportions.lateral_incisors_width),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{CanvasRenderer, DrawCommand, RecordingRenderer};
    use crate::types::ShapeKind;

    fn sample_result() -> AnalysisResult {
        let midline = Midline {
            points: vec![Point::new(320.0, 100.0), Point::new(320.0, 200.0), Point::new(320.0, 300.0)],
            angle: 90.0,
            confidence: 0.95,
        };
        let face_shape = FaceShape::from_ratio(1.0);
        let proportions = DentalProportions {
            central_incisors_width: 6.4,
            lateral_incisors_width: 4.4,
            canines_width: 3.6,
            confidence: 0.68,
        };
        let landmarks = vec![Keypoint::new("chin", 320.0, 300.0), Keypoint::new("noseTip", 320.0, 200.0)];
        AnalysisResult::success(midline, face_shape, proportions, landmarks)
    }

    #[test]
    fn failed_analysis_draws_image_only() {
        let mut rec = RecordingRenderer::new(640, 480);
        let image = RgbaImage::new(640, 480);
        Visualizer::default().render(&mut rec, &image, &AnalysisResult::failure("no face"));

        assert_eq!(
            rec.commands(),
            &[DrawCommand::Clear, DrawCommand::Image { width: 640, height: 480 }]
        );
    }

    #[test]
    fn overlay_draw_order() {
        let mut rec = RecordingRenderer::new(640, 480);
        let image = RgbaImage::new(640, 480);
        Visualizer::default().render(&mut rec, &image, &sample_result());

        let kinds: Vec<&str> = rec
            .commands()
            .iter()
            .map(|c| match c {
                DrawCommand::Clear => "clear",
                DrawCommand::Image { .. } => "image",
                DrawCommand::Polyline { .. } => "polyline",
                DrawCommand::Points { .. } => "points",
                DrawCommand::FillRect { .. } => "fill",
                DrawCommand::StrokeRect { .. } => "stroke",
                DrawCommand::Text { .. } => "text",
            })
            .collect();

        assert_eq!(
            kinds,
            vec![
                "clear", "image", "polyline", "points", "fill", "fill", "fill", "fill", "fill",
                "fill", "stroke", "fill", "text", "text", "text", "text",
            ]
        );
    }

    #[test]
    fn midline_is_extended_both_ways() {
        let mut rec = RecordingRenderer::new(640, 480);
        let image = RgbaImage::new(640, 480);
        Visualizer::default().render(&mut rec, &image, &sample_result());

        let DrawCommand::Polyline { points, .. } = &rec.commands()[2] else {
            panic!("expected midline polyline");
        };
        assert_eq!(points.len(), 5);
        assert_eq!(points[0], Point::new(320.0, 50.0));
        assert_eq!(points[4], Point::new(320.0, 350.0));
    }

    #[test]
    fn keypoints_follow_image_stretch() {
        let mut rec = RecordingRenderer::new(640, 480);
        let image = RgbaImage::new(320, 240);
        Visualizer::default().render(&mut rec, &image, &sample_result());

        let DrawCommand::Points { points, .. } = &rec.commands()[3] else {
            panic!("expected keypoint dots");
        };
        assert_eq!(points[0], Point::new(640.0, 600.0));
    }

    #[test]
    fn proportion_band_is_mirrored_around_center() {
        let mut rec = RecordingRenderer::new(640, 480);
        let image = RgbaImage::new(640, 480);
        Visualizer::default().render(&mut rec, &image, &sample_result());

        let rects: Vec<Rect> = rec.commands()[4..10]
            .iter()
            .map(|c| match c {
                DrawCommand::FillRect { rect, .. } => *rect,
                other => panic!("unexpected command {:?}", other),
            })
            .collect();

        for pair in rects.chunks(2) {
            let (left, right) = (pair[0], pair[1]);
            assert!((left.width - right.width).abs() < 1e-5);
            assert!(((320.0 - left.right()) - (right.x - 320.0)).abs() < 1e-4);
            assert!((left.center().y - 336.0).abs() < 1e-4);
        }
        assert!((rects[0].width - 6.4).abs() < 1e-5);
        assert!((rects[2].width - 4.4).abs() < 1e-5);
        assert!((rects[4].width - 3.6).abs() < 1e-5);

        let DrawCommand::StrokeRect { rect, .. } = &rec.commands()[10] else {
            panic!("expected band outline");
        };
        assert!((rect.width - 2.0 * 14.4).abs() < 1e-4);
        assert!((rect.center().x - 320.0).abs() < 1e-4);
    }

    #[test]
    fn info_box_text() {
        let mut rec = RecordingRenderer::new(640, 480);
        let image = RgbaImage::new(640, 480);
        Visualizer::default().render(&mut rec, &image, &sample_result());

        assert_eq!(
            rec.texts(),
            vec![
                "Face shape: round",
                "Confidence: 80%",
                "Central incisor: 6.4 mm",
                "Lateral incisor: 4.4 mm",
            ]
        );
    }

    #[test]
    fn render_does_not_touch_result() {
        let result = sample_result();
        let before = result.clone();
        let mut canvas = CanvasRenderer::new(64, 48);
        Visualizer::default().render(&mut canvas, &RgbaImage::new(64, 48), &result);
        assert_eq!(result, before);
        assert_eq!(result.face_shape.unwrap().shape, ShapeKind::Round);
    }

    #[test]
    fn canvas_overlay_paints_midline_color() {
        let mut source = RgbaImage::new(320, 240);
        for p in source.pixels_mut() {
            *p = image::Rgba([0, 0, 0, 255]);
        }
        let midline = Midline {
            points: vec![Point::new(250.0, 100.0), Point::new(250.0, 180.0)],
            angle: 90.0,
            confidence: 0.8,
        };
        let result = AnalysisResult::success(
            midline,
            FaceShape::unknown(),
            DentalProportions::zero(),
            Vec::new(),
        );

        let mut canvas = CanvasRenderer::new(320, 240);
        Visualizer::default().render(&mut canvas, &source, &result);

        let on_line = canvas.image().get_pixel(250, 140);
        assert!(on_line[0] > 100, "midline should tint the image red: {:?}", on_line);
        // Extension reaches 50 units above the first point.
        assert!(canvas.image().get_pixel(250, 60)[0] > 100);
        let off_line = canvas.image().get_pixel(300, 140);
        assert_eq!(off_line[0], 0);
    }
}
