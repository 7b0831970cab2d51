pub mod capture_source;
pub mod chunk_sink;
pub mod session_delegate;
