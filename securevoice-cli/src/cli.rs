use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Encrypted point-to-point audio streaming.
#[derive(Debug, Parser)]
#[command(name = "securevoice", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Read raw PCM from stdin, encrypt it and stream it to a receiver.
    Send(SendArgs),
    /// Accept one sender and write the decrypted PCM to stdout.
    Receive(ReceiveArgs),
    /// Decrypt a saved recording into a playable WAV file.
    Decrypt(DecryptArgs),
    /// Print a fresh random key as hex.
    Keygen,
}

#[derive(Debug, Args)]
pub struct KeyArgs {
    /// Pre-shared AES-128 key, 32 hex characters.
    #[arg(long, env = "SECUREVOICE_KEY", hide_env_values = true)]
    pub key: String,
}

#[derive(Debug, Args)]
pub struct FormatArgs {
    /// Sample rate of the raw PCM in Hz.
    #[arg(long, default_value_t = 44100)]
    pub sample_rate: u32,

    /// Channel count of the raw PCM.
    #[arg(long, default_value_t = 1)]
    pub channels: u16,

    /// Bits per sample of the raw PCM.
    #[arg(long, default_value_t = 16)]
    pub bit_depth: u16,
}

#[derive(Debug, Args)]
pub struct SendArgs {
    /// Receiver address (host:port).
    #[arg(long, default_value = securevoice_core::models::config::DEFAULT_ADDRESS)]
    pub address: String,

    #[command(flatten)]
    pub key: KeyArgs,

    #[command(flatten)]
    pub format: FormatArgs,

    /// Bytes of PCM per chunk (one frame on the wire).
    #[arg(long, default_value_t = 2048)]
    pub chunk_size: usize,

    /// Give up connecting after this many seconds.
    #[arg(long)]
    pub connect_timeout_secs: Option<u64>,

    /// Also save everything sent to this encrypted recording.
    #[arg(long)]
    pub record: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ReceiveArgs {
    /// Address to listen on (host:port).
    #[arg(long, default_value = securevoice_core::models::config::DEFAULT_ADDRESS)]
    pub address: String,

    #[command(flatten)]
    pub key: KeyArgs,

    #[command(flatten)]
    pub format: FormatArgs,

    /// Largest frame accepted from the sender, in bytes (0 = unlimited).
    #[arg(long, default_value_t = securevoice_core::models::config::DEFAULT_MAX_FRAME_SIZE)]
    pub max_frame_size: usize,
}

#[derive(Debug, Args)]
pub struct DecryptArgs {
    /// Encrypted recording (.enc) to read.
    pub input: PathBuf,

    /// WAV file to write.
    pub output: PathBuf,

    #[command(flatten)]
    pub key: KeyArgs,

    #[command(flatten)]
    pub format: FormatArgs,
}
