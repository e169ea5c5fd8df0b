pub mod decode_ahead_scan_executor;
pub mod onnx_scan_components;
pub mod sequential_scan_executor;
