mod cli;
mod delegate;
mod io;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;

use securevoice_core::storage::{metadata, playback};
use securevoice_core::{
    AudioFormat, CryptoCodec, FileCodec, ReceiverSession, Recorder, SenderSession, Session,
    SessionDelegate, SessionKey, StreamConfiguration, Termination,
};

use crate::cli::{Cli, Command, DecryptArgs, FormatArgs, KeyArgs, ReceiveArgs, SendArgs};
use crate::delegate::LogDelegate;
use crate::io::{ReaderSource, WriterSink};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Command::Send(args) => send(args),
        Command::Receive(args) => receive(args),
        Command::Decrypt(args) => decrypt(args),
        Command::Keygen => {
            println!("{}", SessionKey::generate().to_hex());
            Ok(())
        }
    }
}

fn codec(args: &KeyArgs) -> Result<CryptoCodec> {
    let key = SessionKey::from_hex(&args.key).context("invalid --key / SECUREVOICE_KEY")?;
    Ok(CryptoCodec::new(key))
}

fn audio_format(args: &FormatArgs) -> AudioFormat {
    AudioFormat {
        sample_rate: args.sample_rate,
        channels: args.channels,
        bit_depth: args.bit_depth,
    }
}

fn send(args: SendArgs) -> Result<()> {
    if args.chunk_size == 0 {
        return Err(anyhow!("chunk size must be positive"));
    }

    let codec = codec(&args.key)?;
    let delegate: Arc<dyn SessionDelegate> = Arc::new(LogDelegate);
    let config = StreamConfiguration {
        connect_timeout: args.connect_timeout_secs.map(Duration::from_secs),
        audio: audio_format(&args.format),
        ..StreamConfiguration::with_address(&args.address)
    };

    let capture = ReaderSource::new(std::io::stdin(), args.chunk_size);
    let mut sender = SenderSession::new(config.clone(), codec.clone(), capture);
    sender.set_delegate(Arc::clone(&delegate));

    let recorder = args.record.as_ref().map(|_| {
        let mut recorder = Recorder::new(FileCodec::new(codec.clone()), config.audio);
        recorder.set_delegate(Arc::clone(&delegate));
        recorder.enable();
        recorder
    });
    if let Some(ref recorder) = recorder {
        sender = sender.with_recorder(recorder.clone());
    }

    let outcome = Session::from(sender).run();

    // Save whatever was captured even if the stream failed part-way.
    if let (Some(recorder), Some(path)) = (recorder, args.record.as_ref()) {
        match recorder.disable(path)? {
            Some(result) => metadata::write_metadata(&result.metadata, path)?,
            None => log::warn!("Nothing was captured; no recording written"),
        }
    }

    report(outcome)
}

fn receive(args: ReceiveArgs) -> Result<()> {
    let codec = codec(&args.key)?;
    let config = StreamConfiguration {
        max_frame_size: (args.max_frame_size > 0).then_some(args.max_frame_size),
        audio: audio_format(&args.format),
        ..StreamConfiguration::with_address(&args.address)
    };

    let sink = WriterSink::new(std::io::stdout());
    let mut receiver = ReceiverSession::new(config, codec, sink);
    receiver.set_delegate(Arc::new(LogDelegate));

    report(Session::from(receiver).run())
}

fn decrypt(args: DecryptArgs) -> Result<()> {
    let codec = FileCodec::new(codec(&args.key)?);
    let format = audio_format(&args.format);
    let bytes = playback::decrypt_to_wav(&codec, &args.input, &args.output, &format)
        .with_context(|| format!("failed to decrypt {}", args.input.display()))?;
    println!("{} bytes of audio written to {}", bytes, args.output.display());
    Ok(())
}

fn report(outcome: Result<Termination, securevoice_core::StreamError>) -> Result<()> {
    let termination = outcome.context("session failed")?;
    log::debug!("session ended: {:?}", termination);
    Ok(())
}
