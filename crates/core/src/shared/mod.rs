pub mod bounding_box;
pub mod constants;
pub mod face_image;
pub mod frame;
pub mod settings;
