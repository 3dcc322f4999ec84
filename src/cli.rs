//! Command line interface for the `adbwire` replay binary.
//!
//! The binary reads a captured client-to-device byte stream and decodes it
//! step by step, printing one line per message.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// One decode operation applied to the captured stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Step {
    /// Legacy hex-length service command.
    Command,
    /// `STAT` request.
    Stat,
    /// `LST2` request.
    StatV2,
    /// `LIST` request.
    List,
    /// `LIS2` request.
    ListV2,
    /// `SEND` request.
    Send,
    /// `SND2` handshake.
    SendV2,
    /// `RECV` request.
    Recv,
    /// `RCV2` request.
    RecvV2,
    /// Any sync request, dispatched on its tag.
    Sync,
    /// Chunked file body written to the output directory.
    File,
    /// Shell v2 stdin packet.
    Stdin,
    /// Shell v2 stdin-close packet.
    StdinClose,
    /// Any shell v2 packet.
    Shell,
}

/// Command line arguments for the `adbwire` binary.
#[derive(Debug, Parser)]
#[command(
    name = "adbwire",
    version,
    about = "Decode a captured ADB client stream from the device side"
)]
pub struct Cli {
    /// Decode steps, applied in order.
    #[arg(value_enum, required = true)]
    pub steps: Vec<Step>,

    /// Captured stream; reads stdin when omitted.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Directory for files received by `file` steps.
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Largest accepted file chunk, in bytes.
    #[arg(long, default_value_t = 64 * 1024)]
    pub max_packet_length: usize,

    /// Reject commands and sync payloads longer than this many bytes.
    #[arg(long)]
    pub max_message_length: Option<usize>,

    /// Fail any read that stalls longer than this many milliseconds.
    #[arg(long)]
    pub read_timeout_ms: Option<u64>,

    /// Close the file sink after the first chunk, rejecting later chunks.
    #[arg(long)]
    pub legacy_sink_close: bool,
}
