use crate::captioner::CaptionError;
use base64::{engine::general_purpose, Engine as _};
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Resolution EPS artwork is rasterised at before upload.
pub const EPS_RENDER_DPI: u32 = 150;

/// An image ready to be sent inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub mime_type: &'static str,
    pub data_b64: String,
}

/// How a file extension is turned into an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Bytes are sent as-is with this MIME type.
    Raster(&'static str),
    /// PostScript that has to be rendered to PNG first.
    PostScript,
}

/// Classify a path by extension.
pub fn source_kind(path: &Path) -> Option<SourceKind> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let kind = match ext.as_str() {
        "eps" | "epsf" | "ps" => SourceKind::PostScript,
        "png" => SourceKind::Raster("image/png"),
        "jpg" | "jpeg" => SourceKind::Raster("image/jpeg"),
        "webp" => SourceKind::Raster("image/webp"),
        "heic" => SourceKind::Raster("image/heic"),
        "heif" => SourceKind::Raster("image/heif"),
        _ => return None,
    };
    Some(kind)
}

/// Load a file as an inline image payload.
///
/// EPS is rendered to PNG with Ghostscript (`-dEPSCrop`, so the bounding
/// box decides the canvas); raster formats are read directly.
///
/// # Errors
///
/// Returns an error if:
/// - The file does not exist
/// - The extension is not a supported image type
/// - The file cannot be read or Ghostscript fails
pub async fn load_image(path: &Path, ghostscript: &Path) -> Result<ImagePayload, CaptionError> {
    if !path.is_file() {
        return Err(CaptionError::ImageNotFound(path.to_path_buf()));
    }

    let kind = source_kind(path).ok_or_else(|| {
        CaptionError::ImageRead(format!("{}: unsupported image type", path.display()))
    })?;

    let (mime_type, bytes) = match kind {
        SourceKind::Raster(mime) => {
            let bytes = tokio::fs::read(path)
                .await
                .map_err(|e| CaptionError::ImageRead(format!("{}: {}", path.display(), e)))?;
            (mime, bytes)
        }
        SourceKind::PostScript => ("image/png", render_eps(path, ghostscript).await?),
    };

    Ok(ImagePayload {
        mime_type,
        data_b64: general_purpose::STANDARD.encode(&bytes),
    })
}

/// Ghostscript arguments that render `path` as a single PNG on stdout.
///
/// The path is kept as an `OsString` so non-UTF-8 file names survive.
pub fn ghostscript_args(path: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = [
        "-q",
        "-dSAFER",
        "-dBATCH",
        "-dNOPAUSE",
        "-dEPSCrop",
        "-dTextAlphaBits=4",
        "-dGraphicsAlphaBits=4",
        "-sDEVICE=png16m",
    ]
    .into_iter()
    .map(OsString::from)
    .collect();
    args.push(format!("-r{}", EPS_RENDER_DPI).into());
    args.push("-sOutputFile=-".into());
    args.push(path.as_os_str().to_os_string());
    args
}

async fn render_eps(path: &Path, ghostscript: &Path) -> Result<Vec<u8>, CaptionError> {
    tracing::debug!(file = %path.display(), "rendering EPS with ghostscript");

    let output = Command::new(ghostscript)
        .args(ghostscript_args(path))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| CaptionError::Render(format!("cannot run {}: {}", ghostscript.display(), e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CaptionError::Render(format!(
            "{} exited with {}: {}",
            ghostscript.display(),
            output.status,
            stderr.trim()
        )));
    }

    if !output.stdout.starts_with(b"\x89PNG") {
        return Err(CaptionError::Render(format!(
            "{} produced no PNG for {}",
            ghostscript.display(),
            path.display()
        )));
    }

    Ok(output.stdout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;
    use std::path::PathBuf;

    #[test]
    fn classifies_extensions() {
        assert_eq!(
            source_kind(Path::new("art/vector.EPS")),
            Some(SourceKind::PostScript)
        );
        assert_eq!(
            source_kind(Path::new("photo.jpeg")),
            Some(SourceKind::Raster("image/jpeg"))
        );
        assert_eq!(source_kind(Path::new("notes.txt")), None);
        assert_eq!(source_kind(Path::new("anim.gif")), None);
        assert_eq!(source_kind(Path::new("no_extension")), None);
    }

    #[test]
    fn ghostscript_writes_png_to_stdout() {
        let args = ghostscript_args(Path::new("/stock/a.eps"));
        for flag in ["-dEPSCrop", "-sDEVICE=png16m", "-sOutputFile=-", "-r150"] {
            assert!(args.iter().any(|a| a == flag), "missing {}", flag);
        }
        assert_eq!(args.last(), Some(&OsString::from("/stock/a.eps")));
    }

    #[cfg(unix)]
    #[test]
    fn ghostscript_gets_non_utf8_path_unchanged() {
        use std::os::unix::ffi::OsStrExt;

        let path = Path::new(std::ffi::OsStr::from_bytes(b"/stock/caf\xE9.eps"));
        let args = ghostscript_args(path);
        assert_eq!(args.last().map(|a| a.as_os_str()), Some(path.as_os_str()));
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let err = load_image(Path::new("/definitely/not/here.eps"), Path::new("gs"))
            .await
            .unwrap_err();
        assert!(matches!(err, CaptionError::ImageNotFound(p) if p == PathBuf::from("/definitely/not/here.eps")));
    }

    #[tokio::test]
    async fn raster_is_read_and_encoded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.png");
        std::fs::write(&path, b"\x89PNGfake").unwrap();

        let payload = load_image(&path, Path::new("gs")).await.unwrap();
        assert_eq!(payload.mime_type, "image/png");
        assert_eq!(payload.data_b64, general_purpose::STANDARD.encode(b"\x89PNGfake"));
    }

    #[tokio::test]
    async fn unsupported_type_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        std::fs::write(&path, b"hello").unwrap();

        let err = load_image(&path, Path::new("gs")).await.unwrap_err();
        assert!(matches!(err, CaptionError::ImageRead(_)));
    }

    #[tokio::test]
    async fn missing_ghostscript_is_a_render_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("art.eps");
        std::fs::write(&path, b"%!PS-Adobe-3.0 EPSF-3.0\n").unwrap();

        let err = load_image(&path, Path::new("/no/such/gs-binary"))
            .await
            .unwrap_err();
        assert!(matches!(err, CaptionError::Render(_)));
    }
}
