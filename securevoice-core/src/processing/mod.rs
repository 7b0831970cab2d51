pub mod level;
pub mod wav_format;
