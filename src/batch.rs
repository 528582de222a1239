use crate::captioner::ImageCaptioner;
use crate::metadata::MetadataSink;
use crate::types::{BatchOptions, BatchReport, CaptionOutput};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

const RULE_WIDTH: usize = 50;

/// Caption every file in order, writing metadata when enabled.
///
/// Each file gets exactly one attempt. A failure is logged and counted and
/// the loop moves on to the next file.
pub async fn run_batch<C, M>(
    captioner: &C,
    writer: &M,
    paths: &[PathBuf],
    options: &BatchOptions,
) -> BatchReport
where
    C: ImageCaptioner,
    M: MetadataSink,
{
    let pb = progress_bar(paths.len(), options.show_progress);
    let mut report = BatchReport::default();

    for path in paths {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        pb.set_message(name.clone());

        let output = match captioner.caption_image(path).await {
            Ok(output) => output,
            Err(e) => {
                pb.suspend(|| tracing::error!("[ERROR] {}: {}", name, e));
                report.failed += 1;
                pb.inc(1);
                continue;
            }
        };

        pb.suspend(|| println!("{}", render_output(&output)));

        if options.write_metadata {
            match output.result() {
                Some(caption) => match writer.write_metadata(path, caption).await {
                    Ok(()) => {
                        pb.suspend(|| tracing::info!("[DONE] metadata written to '{}'", name));
                    }
                    Err(e) => {
                        pb.suspend(|| {
                            tracing::error!("[ERROR] failed to write metadata for {}: {}", name, e)
                        });
                        report.failed += 1;
                        pb.inc(1);
                        continue;
                    }
                },
                None => pb.suspend(|| {
                    tracing::warn!(
                        "[WARN] response for {} did not follow the template; metadata not written",
                        name
                    )
                }),
            }
        }

        report.succeeded += 1;
        pb.inc(1);
    }

    pb.finish_with_message("Done");
    tracing::info!(
        succeeded = report.succeeded,
        failed = report.failed,
        "batch finished"
    );

    report
}

/// Caption output framed between rules, as printed to the terminal.
pub fn render_output(output: &CaptionOutput) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let body = match output {
        CaptionOutput::Text { raw, .. } => raw.clone(),
        CaptionOutput::Structured(result) => {
            serde_json::to_string_pretty(result).unwrap_or_else(|_| format!("{:?}", result))
        }
    };
    format!("\n{rule}\n{body}\n{rule}")
}

fn progress_bar(len: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-"),
    );
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CaptionResult;

    #[test]
    fn render_text_output() {
        let out = CaptionOutput::Text {
            raw: "Title: X".into(),
            parsed: None,
        };
        let rendered = render_output(&out);
        let rule = "=".repeat(50);
        assert_eq!(rendered, format!("\n{rule}\nTitle: X\n{rule}"));
    }

    #[test]
    fn render_structured_output_as_json() {
        let out = CaptionOutput::Structured(CaptionResult {
            title: "T".into(),
            description: "D".into(),
            categories: vec!["Nature".into()],
            keywords: vec!["k".into()],
        });
        let rendered = render_output(&out);
        assert!(rendered.contains("\"title\": \"T\""));
        assert!(rendered.contains("\"keywords\""));
    }
}
