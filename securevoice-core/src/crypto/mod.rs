pub mod codec;
pub mod key;
