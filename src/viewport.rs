//! Fitting the image into a display canvas and mapping clicks back.
//!
//! [`crate::controller::Controller::click_canvas`] routes canvas clicks
//! through [`FitTransform`]; GUI hosts can use it directly for drawing.

/// Aspect-preserving fit of an image into a canvas, centered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitTransform {
    pub image_width: usize,
    pub image_height: usize,
    /// Size of the scaled image on the canvas.
    pub display_width: usize,
    pub display_height: usize,
    /// Canvas position of the scaled image's top-left corner.
    pub offset_x: i64,
    pub offset_y: i64,
}

impl FitTransform {
    /// Fit an image into a canvas.
    ///
    /// The image fills the canvas height when the canvas is relatively wider
    /// than the image, otherwise its width. Canvases of 1 px or less (not yet
    /// laid out) show the image unscaled.
    pub fn fit(
        image_width: usize,
        image_height: usize,
        canvas_width: usize,
        canvas_height: usize,
    ) -> Self {
        let (display_width, display_height) =
            if canvas_width > 1 && canvas_height > 1 && image_width > 0 && image_height > 0 {
                let image_ratio = image_width as f64 / image_height as f64;
                let canvas_ratio = canvas_width as f64 / canvas_height as f64;
                if canvas_ratio > image_ratio {
                    (
                        (canvas_height as f64 * image_ratio) as usize,
                        canvas_height,
                    )
                } else {
                    (
                        canvas_width,
                        (canvas_width as f64 / image_ratio) as usize,
                    )
                }
            } else {
                (image_width, image_height)
            };

        Self {
            image_width,
            image_height,
            display_width,
            display_height,
            offset_x: (canvas_width / 2) as i64 - (display_width / 2) as i64,
            offset_y: (canvas_height / 2) as i64 - (display_height / 2) as i64,
        }
    }

    /// Image pixel under a canvas position, `None` outside the drawn image.
    pub fn canvas_to_image(&self, cx: f64, cy: f64) -> Option<(usize, usize)> {
        if self.display_width == 0 || self.display_height == 0 {
            return None;
        }
        let u = (cx - self.offset_x as f64) / self.display_width as f64;
        let v = (cy - self.offset_y as f64) / self.display_height as f64;
        if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) {
            return None;
        }
        let x = (u * self.image_width as f64) as usize;
        let y = (v * self.image_height as f64) as usize;
        Some((x.min(self.image_width - 1), y.min(self.image_height - 1)))
    }

    /// Canvas position of the centre of image pixel (x, y).
    pub fn image_to_canvas(&self, x: usize, y: usize) -> (f64, f64) {
        let sx = self.display_width as f64 / self.image_width.max(1) as f64;
        let sy = self.display_height as f64 / self.image_height.max(1) as f64;
        (
            self.offset_x as f64 + (x as f64 + 0.5) * sx,
            self.offset_y as f64 + (y as f64 + 0.5) * sy,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wide_canvas_fits_height() {
        let t = FitTransform::fit(400, 200, 800, 200);
        assert_eq!((t.display_width, t.display_height), (400, 200));
        assert_eq!((t.offset_x, t.offset_y), (200, 0));
    }

    #[test]
    fn test_tall_canvas_fits_width() {
        let t = FitTransform::fit(400, 200, 800, 600);
        assert_eq!((t.display_width, t.display_height), (800, 400));
        assert_eq!((t.offset_x, t.offset_y), (0, 100));
    }

    #[test]
    fn test_unlaid_canvas_keeps_size() {
        let t = FitTransform::fit(64, 32, 1, 1);
        assert_eq!((t.display_width, t.display_height), (64, 32));
    }

    #[test]
    fn test_click_mapping() {
        let t = FitTransform::fit(100, 50, 800, 600);
        // Scale 8x, image drawn at y = 100..500
        assert_eq!(t.canvas_to_image(0.0, 100.0), Some((0, 0)));
        assert_eq!(t.canvas_to_image(799.9, 499.9), Some((99, 49)));
        assert_eq!(t.canvas_to_image(400.0, 50.0), None);
        assert_eq!(t.canvas_to_image(-1.0, 200.0), None);
    }

    #[test]
    fn test_pixel_centres_round_trip() {
        let t = FitTransform::fit(37, 23, 640, 480);
        for &(x, y) in &[(0usize, 0usize), (36, 22), (18, 11), (5, 20)] {
            let (cx, cy) = t.image_to_canvas(x, y);
            assert_eq!(t.canvas_to_image(cx, cy), Some((x, y)));
        }
    }
}
