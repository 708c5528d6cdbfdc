pub mod face_gallery;
pub mod face_identity;
pub mod identity_hasher;
pub mod similarity_matcher;
pub mod target_watcher;
