use crate::ports::transcoder::TranscodeExecutor;
use std::path::Path;
use tracing::{error, info};

/// Run one HLS conversion to completion. Failures are logged, never retried,
/// and whatever partial output the transcoder left behind stays on disk.
pub async fn convert_to_hls(
    executor: &dyn TranscodeExecutor,
    input: &Path,
    playlist: &Path,
) -> bool {
    match executor.run_hls_transcode(input, playlist).await {
        Ok(output) if output.status.success() => {
            info!(input = %input.display(), playlist = %playlist.display(), "HLS conversion finished");
            true
        }
        Ok(output) => {
            error!(
                input = %input.display(),
                status = %output.status,
                "FFmpeg error: {}",
                String::from_utf8_lossy(&output.stderr)
            );
            false
        }
        Err(e) => {
            error!(input = %input.display(), "Conversion error: {}", e);
            false
        }
    }
}
