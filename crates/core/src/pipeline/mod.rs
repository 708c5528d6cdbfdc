pub mod export_faces_use_case;
pub mod frame_processor;
pub mod pipeline_logger;
pub mod target_source;
pub mod watch_session_use_case;
