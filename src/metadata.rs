use crate::types::CaptionResult;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;

/// Something that stores caption fields inside an image file.
#[allow(async_fn_in_trait)]
pub trait MetadataSink {
    async fn write_metadata(&self, image_path: &Path, caption: &CaptionResult)
        -> Result<(), MetadataError>;
}

/// Writes captions with `exiftool`, in place and without a backup copy.
#[derive(Debug, Clone)]
pub struct ExifToolWriter {
    binary: PathBuf,
}

impl Default for ExifToolWriter {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("exiftool"),
        }
    }
}

impl ExifToolWriter {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

impl MetadataSink for ExifToolWriter {
    async fn write_metadata(
        &self,
        image_path: &Path,
        caption: &CaptionResult,
    ) -> Result<(), MetadataError> {
        if !image_path.is_file() {
            return Err(MetadataError::NotFound(image_path.to_path_buf()));
        }

        let output = Command::new(&self.binary)
            .args(exiftool_args(image_path, caption))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| MetadataError::Spawn {
                binary: self.binary.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            let detail = if stderr.trim().is_empty() {
                stdout.trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            return Err(MetadataError::NonZeroExit {
                status: output.status,
                stderr: detail,
            });
        }

        if !stderr.trim().is_empty() {
            tracing::warn!(file = %image_path.display(), "exiftool: {}", stderr.trim());
        }
        tracing::debug!(file = %image_path.display(), "exiftool: {}", stdout.trim());

        Ok(())
    }
}

/// Arguments for one exiftool run writing `caption` into `image_path`.
///
/// List-valued tags are cleared first so repeated runs replace rather than
/// append. The path is passed through untouched, so file names that are
/// not valid UTF-8 still reach exiftool intact.
pub fn exiftool_args(image_path: &Path, caption: &CaptionResult) -> Vec<OsString> {
    let mut tags = vec![
        "-overwrite_original".to_string(),
        "-charset".to_string(),
        "iptc=UTF8".to_string(),
        "-IPTC:CodedCharacterSet=UTF8".to_string(),
    ];

    for tag in ["XMP-dc:Title", "XMP-photoshop:Headline", "IPTC:Headline", "IPTC:ObjectName"] {
        tags.push(format!("-{}={}", tag, caption.title));
    }

    for tag in ["XMP-dc:Description", "IPTC:Caption-Abstract", "EXIF:ImageDescription"] {
        tags.push(format!("-{}={}", tag, caption.description));
    }

    if let Some(primary) = caption.categories.first() {
        tags.push(format!("-XMP-photoshop:Category={}", primary));
    }
    push_list(&mut tags, "XMP-photoshop:SupplementalCategories", &caption.categories);
    push_list(&mut tags, "IPTC:SupplementalCategories", &caption.categories);

    push_list(&mut tags, "XMP-dc:Subject", &caption.keywords);
    push_list(&mut tags, "IPTC:Keywords", &caption.keywords);

    let mut args: Vec<OsString> = tags.into_iter().map(OsString::from).collect();
    args.push(image_path.as_os_str().to_os_string());
    args
}

fn push_list(args: &mut Vec<String>, tag: &str, values: &[String]) {
    args.push(format!("-{}=", tag));
    for value in values {
        args.push(format!("-{}+={}", tag, value));
    }
}

/// Errors that can occur while writing metadata.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("image not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to run {}: {source}", .binary.display())]
    Spawn {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("exiftool exited with {status}: {stderr}")]
    NonZeroExit { status: ExitStatus, stderr: String },
}
