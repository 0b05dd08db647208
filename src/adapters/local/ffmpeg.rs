use crate::ports::transcoder::TranscodeExecutor;
use async_trait::async_trait;
use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::process::Output;
use tokio::process::Command as TokioCommand;

/// Spawns the `ffmpeg` binary to produce a VOD style HLS rendition.
#[derive(Clone, Debug)]
pub struct FfmpegExecutor {
    bin: String,
    segment_seconds: u32,
}

impl FfmpegExecutor {
    pub fn new(bin: impl Into<String>, segment_seconds: u32) -> Self {
        Self {
            bin: bin.into(),
            segment_seconds,
        }
    }

    /// Baseline profile, fixed segment length, every segment kept in the playlist.
    pub fn hls_args(&self, input: &Path, playlist: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-i".into(), input.into()];
        args.extend(
            [
                "-profile:v",
                "baseline",
                "-level",
                "3.0",
                "-start_number",
                "0",
                "-hls_time",
            ]
            .map(OsString::from),
        );
        args.push(self.segment_seconds.to_string().into());
        args.extend(["-hls_list_size", "0", "-f", "hls"].map(OsString::from));
        args.push(playlist.into());
        args
    }
}

#[async_trait]
impl TranscodeExecutor for FfmpegExecutor {
    async fn run_hls_transcode(&self, input: &Path, playlist: &Path) -> io::Result<Output> {
        TokioCommand::new(&self.bin)
            .args(self.hls_args(input, playlist))
            .output()
            .await
    }
}
