pub mod encrypted_face;
pub mod export_sink;
