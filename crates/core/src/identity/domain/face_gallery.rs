use crate::identity::domain::face_identity::FaceIdentity;
use crate::identity::domain::identity_hasher::IdentityHasher;
use crate::identity::domain::similarity_matcher::SimilarityMatcher;
use crate::shared::face_image::{EncodingError, FaceImage};

/// A face that made it into the gallery, together with its identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GalleryEntry {
    face: FaceImage,
    identity: FaceIdentity,
}

impl GalleryEntry {
    pub fn new(face: FaceImage, identity: FaceIdentity) -> Self {
        Self { face, identity }
    }

    pub fn face(&self) -> &FaceImage {
        &self.face
    }

    pub fn identity(&self) -> &FaceIdentity {
        &self.identity
    }
}

/// Append-only collection of distinct faces seen during a session.
///
/// A candidate is admitted when no existing entry is similar to it. The
/// comparison runs against the stored pixels, never against identities,
/// and scans in insertion order. Entries are never reordered or removed,
/// so any earlier view of the gallery is a prefix of every later one.
///
/// Growth is unbounded. Each admit costs one comparison per entry.
pub struct FaceGallery {
    entries: Vec<GalleryEntry>,
    matcher: Box<dyn SimilarityMatcher>,
    hasher: IdentityHasher,
}

impl FaceGallery {
    pub fn new(matcher: Box<dyn SimilarityMatcher>, hasher: IdentityHasher) -> Self {
        Self {
            entries: Vec::new(),
            matcher,
            hasher,
        }
    }

    /// Try to add `face`. Returns the new entry, or `None` when an
    /// existing entry is similar enough to count as the same face.
    pub fn admit(&mut self, face: FaceImage) -> Result<Option<GalleryEntry>, EncodingError> {
        if self.contains_similar(&face)? {
            return Ok(None);
        }
        let identity = self.hasher.hash(&face)?;
        let entry = GalleryEntry::new(face, identity);
        self.entries.push(entry.clone());
        log::debug!(
            "Gallery admitted {} (size {})",
            entry.identity(),
            self.entries.len()
        );
        Ok(Some(entry))
    }

    /// Whether any stored face is similar to `face`. Stops at the first match.
    pub fn contains_similar(&self, face: &FaceImage) -> Result<bool, EncodingError> {
        for entry in &self.entries {
            if self.matcher.similar(face, entry.face())? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn entries(&self) -> &[GalleryEntry] {
        &self.entries
    }

    /// Owned copy of the current entries, safe to hand to another thread.
    pub fn snapshot(&self) -> Vec<GalleryEntry> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::infrastructure::mean_difference_matcher::MeanDifferenceMatcher;

    fn solid(value: u8, w: u32, h: u32) -> FaceImage {
        FaceImage::new(vec![value; (w * h * 3) as usize], w, h).unwrap()
    }

    fn gallery() -> FaceGallery {
        FaceGallery::new(
            Box::new(MeanDifferenceMatcher::default()),
            IdentityHasher::new(),
        )
    }

    /// Matcher that calls everything distinct.
    struct NeverSimilar;

    impl SimilarityMatcher for NeverSimilar {
        fn similar(&self, _a: &FaceImage, _b: &FaceImage) -> Result<bool, EncodingError> {
            Ok(false)
        }
    }

    #[test]
    fn test_empty_gallery_admits_first_face() {
        let mut gallery = gallery();
        assert!(gallery.is_empty());
        let entry = gallery.admit(solid(100, 40, 40)).unwrap();
        assert!(entry.is_some());
        assert_eq!(gallery.len(), 1);
    }

    #[test]
    fn test_similar_face_is_rejected() {
        let mut gallery = gallery();
        gallery.admit(solid(100, 40, 40)).unwrap();
        assert!(gallery.admit(solid(110, 60, 30)).unwrap().is_none());
        assert_eq!(gallery.len(), 1);
    }

    #[test]
    fn test_distinct_face_is_admitted() {
        let mut gallery = gallery();
        gallery.admit(solid(50, 40, 40)).unwrap();
        let entry = gallery.admit(solid(200, 40, 40)).unwrap().unwrap();
        assert_eq!(gallery.len(), 2);
        assert_eq!(gallery.entries()[1], entry);
    }

    #[test]
    fn test_entry_identity_matches_hasher() {
        let mut gallery = gallery();
        let face = solid(77, 30, 30);
        let entry = gallery.admit(face.clone()).unwrap().unwrap();
        assert_eq!(entry.identity(), &IdentityHasher::new().hash(&face).unwrap());
        assert_eq!(entry.face(), &face);
    }

    #[test]
    fn test_identical_faces_may_both_be_admitted_when_matcher_allows() {
        // Same identity twice is possible; the gallery only consults similarity
        let mut gallery = FaceGallery::new(Box::new(NeverSimilar), IdentityHasher::new());
        gallery.admit(solid(10, 20, 20)).unwrap();
        gallery.admit(solid(10, 20, 20)).unwrap();
        assert_eq!(gallery.len(), 2);
        assert_eq!(gallery.entries()[0].identity(), gallery.entries()[1].identity());
    }

    #[test]
    fn test_rejection_uses_stored_entries_not_chain() {
        // 0 admitted, 15 is similar to 0 and rejected, 30 is not similar to 0
        // so it is admitted even though it is similar to the rejected 15
        let mut gallery = gallery();
        gallery.admit(solid(0, 20, 20)).unwrap();
        assert!(gallery.admit(solid(15, 20, 20)).unwrap().is_none());
        assert!(gallery.admit(solid(30, 20, 20)).unwrap().is_some());
        assert_eq!(gallery.len(), 2);
    }

    #[test]
    fn test_earlier_snapshot_is_prefix_of_later() {
        let mut gallery = gallery();
        gallery.admit(solid(0, 20, 20)).unwrap();
        let before = gallery.snapshot();
        gallery.admit(solid(100, 20, 20)).unwrap();
        gallery.admit(solid(5, 20, 20)).unwrap();
        gallery.admit(solid(200, 20, 20)).unwrap();
        let after = gallery.snapshot();
        assert_eq!(after.len(), 3);
        assert_eq!(&after[..before.len()], &before[..]);
    }
}
