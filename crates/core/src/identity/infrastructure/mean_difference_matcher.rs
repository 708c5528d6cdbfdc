use crate::identity::domain::similarity_matcher::SimilarityMatcher;
use crate::shared::constants::{DEFAULT_SIMILARITY_THRESHOLD, SIMILARITY_CANONICAL_SIZE};
use crate::shared::face_image::{EncodingError, FaceImage};

/// Pixel-space similarity: resample both faces to 50x50 and compare the
/// mean absolute difference over every channel of every pixel.
///
/// Two faces are similar when the mean is strictly below `threshold`.
#[derive(Clone, Copy, Debug)]
pub struct MeanDifferenceMatcher {
    threshold: f64,
}

impl MeanDifferenceMatcher {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Mean absolute channel difference of the two canonical images, 0..=255.
    pub fn mean_difference(&self, a: &FaceImage, b: &FaceImage) -> Result<f64, EncodingError> {
        let a = a.canonical(SIMILARITY_CANONICAL_SIZE)?;
        let b = b.canonical(SIMILARITY_CANONICAL_SIZE)?;
        Ok(mean_abs_diff(a.as_raw(), b.as_raw()))
    }
}

impl Default for MeanDifferenceMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_SIMILARITY_THRESHOLD)
    }
}

impl SimilarityMatcher for MeanDifferenceMatcher {
    fn similar(&self, a: &FaceImage, b: &FaceImage) -> Result<bool, EncodingError> {
        Ok(self.mean_difference(a, b)? < self.threshold)
    }
}

fn mean_abs_diff(a: &[u8], b: &[u8]) -> f64 {
    if a.is_empty() {
        return 0.0;
    }
    let total: u64 = a
        .iter()
        .zip(b)
        .map(|(&x, &y)| u64::from(x.abs_diff(y)))
        .sum();
    total as f64 / a.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn solid(value: u8, w: u32, h: u32) -> FaceImage {
        FaceImage::new(vec![value; (w * h * 3) as usize], w, h).unwrap()
    }

    fn gradient(w: u32, h: u32) -> FaceImage {
        let mut data = Vec::with_capacity((w * h * 3) as usize);
        for y in 0..h {
            for x in 0..w {
                let v = ((x + y) * 255 / (w + h)) as u8;
                data.extend_from_slice(&[v, v / 2, 255 - v]);
            }
        }
        FaceImage::new(data, w, h).unwrap()
    }

    #[test]
    fn test_identical_faces_are_similar() {
        let m = MeanDifferenceMatcher::default();
        let face = gradient(64, 64);
        assert_relative_eq!(m.mean_difference(&face, &face).unwrap(), 0.0);
        assert!(m.similar(&face, &face).unwrap());
    }

    #[rstest]
    #[case(100, 119, true)]
    #[case(100, 120, false)]
    #[case(100, 80, false)]
    #[case(0, 255, false)]
    #[case(42, 42, true)]
    fn test_threshold_is_strict(#[case] a: u8, #[case] b: u8, #[case] expected: bool) {
        let m = MeanDifferenceMatcher::default();
        assert_eq!(m.similar(&solid(a, 30, 30), &solid(b, 30, 30)).unwrap(), expected);
    }

    fn brightened(face: &FaceImage, delta: u8) -> FaceImage {
        let data = face.data().iter().map(|v| v.saturating_add(delta)).collect();
        FaceImage::new(data, face.width(), face.height()).unwrap()
    }

    fn checker(w: u32, h: u32, cell: u32) -> FaceImage {
        let mut data = Vec::with_capacity((w * h * 3) as usize);
        for y in 0..h {
            for x in 0..w {
                let v = if (x / cell + y / cell) % 2 == 0 { 40 } else { 210 };
                data.extend_from_slice(&[v, 255 - v, v / 3]);
            }
        }
        FaceImage::new(data, w, h).unwrap()
    }

    #[rstest]
    #[case(gradient(40, 70), solid(128, 55, 33))]
    #[case(gradient(64, 64), brightened(&gradient(64, 64), 19))]
    #[case(gradient(64, 64), brightened(&gradient(64, 64), 21))]
    #[case(gradient(23, 91), brightened(&gradient(120, 45), 20))]
    #[case(checker(50, 50, 5), checker(73, 29, 7))]
    #[case(checker(16, 16, 2), solid(125, 16, 16))]
    #[case(solid(0, 1, 1), solid(255, 300, 2))]
    fn test_is_symmetric(#[case] a: FaceImage, #[case] b: FaceImage) {
        let m = MeanDifferenceMatcher::default();
        assert_relative_eq!(
            m.mean_difference(&a, &b).unwrap(),
            m.mean_difference(&b, &a).unwrap()
        );
        assert_eq!(m.similar(&a, &b).unwrap(), m.similar(&b, &a).unwrap());
    }

    #[test]
    fn test_is_not_transitive() {
        let m = MeanDifferenceMatcher::default();
        let (a, b, c) = (solid(0, 20, 20), solid(15, 20, 20), solid(30, 20, 20));
        assert!(m.similar(&a, &b).unwrap());
        assert!(m.similar(&b, &c).unwrap());
        assert!(!m.similar(&a, &c).unwrap());
    }

    #[test]
    fn test_different_sizes_compare_after_resampling() {
        let m = MeanDifferenceMatcher::default();
        assert!(m.similar(&solid(90, 10, 80), &solid(95, 300, 200)).unwrap());
    }

    #[test]
    fn test_custom_threshold() {
        let m = MeanDifferenceMatcher::new(5.0);
        assert!(!m.similar(&solid(100, 20, 20), &solid(110, 20, 20)).unwrap());
    }
}
