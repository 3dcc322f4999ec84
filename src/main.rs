//! Replay binary for captured ADB client streams.
//!
//! Decodes a byte stream step by step from the device side and prints one
//! line per decoded message.

mod cli;

use std::{
    path::{Path, PathBuf},
    process::ExitCode,
    time::Duration,
};

use adbwire::{
    DecoderConfig, DeviceDecoder, Result, SendTarget, SinkClose, SyncRequest,
};
use clap::Parser;
use cli::{Cli, Step};
use tokio::io::AsyncRead;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, error_type = e.error_type(), "replay failed");
            eprintln!("adbwire: {e}");
            ExitCode::FAILURE
        }
    }
}

fn decoder_config(cli: &Cli) -> DecoderConfig {
    let mut config = DecoderConfig::default().with_max_packet_length(cli.max_packet_length);
    if let Some(max) = cli.max_message_length {
        config = config.with_max_message_length(max);
    }
    if let Some(ms) = cli.read_timeout_ms {
        config = config.with_read_timeout(Duration::from_millis(ms));
    }
    if cli.legacy_sink_close {
        config = config.with_sink_close(SinkClose::AfterFirstChunk);
    }
    config
}

async fn run(cli: Cli) -> Result<()> {
    let config = decoder_config(&cli);
    let input: Box<dyn AsyncRead + Unpin> = match &cli.input {
        Some(path) => Box::new(tokio::fs::File::open(path).await?),
        None => Box::new(tokio::io::stdin()),
    };
    let mut decoder = DeviceDecoder::with_config(input, config);
    replay(&mut decoder, &cli.steps, &cli.output_dir).await?;
    tracing::info!(consumed = decoder.source().consumed(), "replay complete");
    Ok(())
}

async fn replay<R>(decoder: &mut DeviceDecoder<R>, steps: &[Step], output_dir: &Path) -> Result<()>
where
    R: AsyncRead + Unpin,
{
    // Path of the most recent push request, used to name the next file.
    let mut pushed: Option<String> = None;
    let mut files = 0usize;

    for step in steps {
        let line = match step {
            Step::Command => format!("command {}", decoder.receive_command().await?),
            Step::Stat => format!("stat {}", decoder.receive_stat().await?),
            Step::StatV2 => format!("stat-v2 {}", decoder.receive_stat_v2().await?),
            Step::List => format!("list {}", decoder.receive_list().await?),
            Step::ListV2 => format!("list-v2 {}", decoder.receive_list_v2().await?),
            Step::Send => {
                let payload = decoder.receive_send().await?;
                pushed = Some(push_path(&payload));
                format!("send {payload}")
            }
            Step::SendV2 => {
                let request = decoder.receive_send_v2().await?;
                let line = format!(
                    "send-v2 {} mode={:o} flags={:#x}",
                    request.path, request.mode, request.flags
                );
                pushed = Some(request.path);
                line
            }
            Step::Recv => format!("recv {}", decoder.receive_recv().await?),
            Step::RecvV2 => format!("recv-v2 {}", decoder.receive_recv_v2().await?),
            Step::Sync => {
                let request = decoder.receive_sync_request().await?;
                match &request {
                    SyncRequest::Send(payload) => pushed = Some(push_path(payload)),
                    SyncRequest::SendV2(send) => pushed = Some(send.path.clone()),
                    _ => {}
                }
                format!("sync {request:?}")
            }
            Step::File => {
                let target = output_dir.join(file_name(pushed.take().as_deref(), files));
                files += 1;
                let sink = tokio::fs::File::create(&target).await?;
                decoder.receive_file(sink).await?;
                format!("file {}", target.display())
            }
            Step::Stdin => format!("stdin {:?}", decoder.receive_shell_v2_stdin().await?),
            Step::StdinClose => {
                decoder.receive_shell_v2_stdin_close().await?;
                "stdin-close".to_owned()
            }
            Step::Shell => {
                let packet = decoder.receive_shell_v2_packet().await?;
                format!("shell {} {} bytes", packet.id, packet.payload.len())
            }
        };
        println!("{line}");
    }
    Ok(())
}

fn push_path(payload: &str) -> String {
    SendTarget::parse(payload).map_or_else(|| payload.to_owned(), |target| target.path)
}

/// Name a received file after the last path component of its push request.
fn file_name(pushed: Option<&str>, index: usize) -> PathBuf {
    pushed
        .and_then(|path| Path::new(path).file_name())
        .map_or_else(|| PathBuf::from(format!("file-{index}.bin")), PathBuf::from)
}
