/// Axis-aligned face location in frame pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds a box from float corner coordinates, clamped to the frame.
    ///
    /// Returns `None` when nothing of the box lies inside the frame.
    pub fn from_corners(
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        frame_width: u32,
        frame_height: u32,
    ) -> Option<Self> {
        let fw = frame_width as f64;
        let fh = frame_height as f64;
        let left = x1.max(0.0).min(fw).round();
        let top = y1.max(0.0).min(fh).round();
        let right = x2.max(0.0).min(fw).round();
        let bottom = y2.max(0.0).min(fh).round();
        if right <= left || bottom <= top {
            return None;
        }
        Some(Self::new(
            left as u32,
            top as u32,
            (right - left) as u32,
            (bottom - top) as u32,
        ))
    }

    /// Intersection of this box with a `frame_width` x `frame_height` frame.
    pub fn clamp_to(&self, frame_width: u32, frame_height: u32) -> Option<Self> {
        let x1 = self.x.min(frame_width);
        let y1 = self.y.min(frame_height);
        let x2 = self.x.saturating_add(self.width).min(frame_width);
        let y2 = self.y.saturating_add(self.height).min(frame_height);
        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        Some(Self::new(x1, y1, x2 - x1, y2 - y1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_clamp_inside_is_unchanged() {
        let b = BoundingBox::new(10, 10, 20, 20);
        assert_eq!(b.clamp_to(100, 100), Some(b));
    }

    #[test]
    fn test_clamp_trims_overhang() {
        let b = BoundingBox::new(90, 95, 20, 20);
        assert_eq!(b.clamp_to(100, 100), Some(BoundingBox::new(90, 95, 10, 5)));
    }

    #[test]
    fn test_clamp_outside_is_none() {
        let b = BoundingBox::new(120, 10, 20, 20);
        assert_eq!(b.clamp_to(100, 100), None);
    }

    #[test]
    fn test_from_corners_clamps_negative_origin() {
        let b = BoundingBox::from_corners(-10.0, -5.0, 30.0, 40.0, 100, 100).unwrap();
        assert_eq!(b, BoundingBox::new(0, 0, 30, 40));
    }

    #[rstest]
    #[case::inverted(50.0, 50.0, 40.0, 60.0)]
    #[case::off_right(150.0, 10.0, 200.0, 20.0)]
    #[case::zero_height(10.0, 20.0, 30.0, 20.0)]
    fn test_from_corners_degenerate(
        #[case] x1: f64,
        #[case] y1: f64,
        #[case] x2: f64,
        #[case] y2: f64,
    ) {
        assert!(BoundingBox::from_corners(x1, y1, x2, y2, 100, 100).is_none());
    }
}
