#[cfg(feature = "onnx")]
pub mod onnx_yolo_detector;
