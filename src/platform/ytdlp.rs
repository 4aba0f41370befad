use std::{ffi::OsString, path::Path, process::Stdio, time::Duration};

use async_trait::async_trait;
use tokio::process::Command;

use crate::config::DownloadConfig;

use super::{traits::MediaExtractor, DownloadedFile, MediaKind, PlatformError, VideoInfo};

const PRINT_TEMPLATE: &str = "after_move:%(vcodec)s|%(filepath)s";
const STDERR_TAIL: usize = 500;

/// Runs the `yt-dlp` executable as a child process.
#[derive(Clone, Debug)]
pub struct YtDlp {
    binary: OsString,
    extract_timeout: Duration,
    download_timeout: Duration,
}

impl YtDlp {
    pub fn new(binary: impl Into<OsString>, extract_timeout: Duration, download_timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            extract_timeout,
            download_timeout,
        }
    }

    pub fn from_config(config: &DownloadConfig) -> Self {
        Self::new(
            config.ytdlp_path.clone(),
            Duration::from_secs(config.extract_timeout_secs),
            Duration::from_secs(config.download_timeout_secs),
        )
    }

    async fn run(&self, args: Vec<OsString>, timeout: Duration) -> Result<String, PlatformError> {
        debug!("Running {:?} {:?}", self.binary, args);

        let child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(PlatformError::Spawn)?;

        // dropping the future on timeout kills the child
        let output = tokio::time::timeout(timeout, child.wait_with_output())
            .await
            .map_err(|_| PlatformError::Timeout(timeout.as_secs()))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            let tail_start = stderr
                .char_indices()
                .rev()
                .nth(STDERR_TAIL)
                .map(|(idx, _)| idx)
                .unwrap_or(0);

            return Err(PlatformError::ExitStatus {
                code: output.status.code(),
                stderr: stderr[tail_start..].to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl MediaExtractor for YtDlp {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn fetch_info(&self, url: &str) -> Result<VideoInfo, PlatformError> {
        let args = ["-J", "--skip-download", "--no-playlist", "--no-warnings", "--", url]
            .into_iter()
            .map(OsString::from)
            .collect();

        let stdout = self.run(args, self.extract_timeout).await?;
        let info = serde_json::from_str::<VideoInfo>(&stdout)?;

        info!(
            "Fetched info for {}: {} formats",
            url,
            info.formats.len()
        );

        Ok(info)
    }

    async fn download(&self, url: &str, format_id: &str, target_dir: &Path) -> Result<DownloadedFile, PlatformError> {
        let output_template = target_dir.join("%(title)s.%(ext)s").into_os_string();

        let args = vec![
            OsString::from("-f"),
            OsString::from(format_id),
            OsString::from("-o"),
            output_template,
            OsString::from("--no-playlist"),
            OsString::from("--no-warnings"),
            OsString::from("--no-progress"),
            OsString::from("--print"),
            OsString::from(PRINT_TEMPLATE),
            OsString::from("--no-simulate"),
            OsString::from("--"),
            OsString::from(url),
        ];

        let stdout = self.run(args, self.download_timeout).await?;
        let file = parse_download_output(&stdout)?;

        if !tokio::fs::try_exists(&file.path).await? {
            return Err(PlatformError::UnexpectedOutput(format!(
                "reported file {} does not exist",
                file.path.display()
            )));
        }

        info!("Downloaded {} [{}] to {}", url, format_id, file.path.display());

        Ok(file)
    }
}

/// Reads the `vcodec|filepath` line printed after the final move.
pub(crate) fn parse_download_output(stdout: &str) -> Result<DownloadedFile, PlatformError> {
    let line = stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .ok_or_else(|| PlatformError::UnexpectedOutput("no file path printed".into()))?;

    let (vcodec, path) = line
        .split_once('|')
        .ok_or_else(|| PlatformError::UnexpectedOutput(line.to_string()))?;

    if path.is_empty() {
        return Err(PlatformError::UnexpectedOutput(line.to_string()));
    }

    let kind = match vcodec {
        "none" => MediaKind::Audio,
        _ => MediaKind::Video,
    };

    Ok(DownloadedFile {
        path: path.into(),
        kind,
    })
}
