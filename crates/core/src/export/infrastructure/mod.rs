pub mod directory_export_sink;
