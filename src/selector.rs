//! Candidate listing and the interactive file prompt.
//!
//! Files are offered newest first. The prompts read from any [`BufRead`]
//! and write to any [`Write`], so the binary wires them to stdin/stdout
//! while tests feed them scripted input.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// A file offered to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// File name shown in the prompt
    pub name: String,
    /// Full path handed to the captioner
    pub path: PathBuf,
    /// Last modification time
    pub modified: SystemTime,
}

/// List the `limit` most recently modified files in `dir` with the given
/// extension, newest first.
///
/// The directory is created when it does not exist yet, so a first run
/// leaves behind the folder the user is expected to fill.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created or read
/// - No file matches the extension
pub fn list_candidates(
    dir: &Path,
    extension: &str,
    limit: usize,
) -> Result<Vec<Candidate>, SelectError> {
    fs::create_dir_all(dir).map_err(|source| SelectError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let wanted = extension.trim_start_matches('.');
    let entries = fs::read_dir(dir).map_err(|source| SelectError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut candidates: Vec<Candidate> = entries
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let path = entry.path();
            let ext = path.extension()?.to_str()?;
            if !ext.eq_ignore_ascii_case(wanted) {
                return None;
            }
            // Follows symlinks, unlike `DirEntry::metadata`.
            let meta = fs::metadata(&path).ok()?;
            if !meta.is_file() {
                return None;
            }
            let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            let name = path.file_name()?.to_string_lossy().into_owned();
            Some(Candidate {
                name,
                path,
                modified,
            })
        })
        .collect();

    // Newest first; ties broken by name so the order is stable.
    candidates.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.name.cmp(&b.name)));
    candidates.truncate(limit);

    if candidates.is_empty() {
        return Err(SelectError::NoCandidates {
            dir: dir.to_path_buf(),
            extension: wanted.to_string(),
        });
    }

    tracing::debug!(
        dir = %dir.display(),
        offered = candidates.len(),
        "listed candidate files"
    );

    Ok(candidates)
}

/// Ask for exactly one file. An empty answer picks the first (newest)
/// entry; end of input means no selection.
pub fn prompt_single<R: BufRead, W: Write>(
    candidates: &[Candidate],
    mut input: R,
    mut output: W,
) -> io::Result<Option<PathBuf>> {
    if candidates.is_empty() {
        return Ok(None);
    }

    render_choices(candidates, "Select filename", &mut output)?;

    loop {
        write!(output, "Enter a number [1]: ")?;
        output.flush()?;

        let Some(line) = read_answer(&mut input)? else {
            return Ok(None);
        };

        if line.is_empty() {
            return Ok(Some(candidates[0].path.clone()));
        }

        match line.parse::<usize>() {
            Ok(n) if (1..=candidates.len()).contains(&n) => {
                return Ok(Some(candidates[n - 1].path.clone()));
            }
            _ => writeln!(
                output,
                "Please enter a number between 1 and {}.",
                candidates.len()
            )?,
        }
    }
}

/// Ask for any number of files. Accepts `1,3`, ranges like `2-4`, or `all`.
/// An empty answer or end of input selects nothing.
pub fn prompt_multi<R: BufRead, W: Write>(
    candidates: &[Candidate],
    mut input: R,
    mut output: W,
) -> io::Result<Vec<PathBuf>> {
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    render_choices(candidates, "Select filenames", &mut output)?;

    loop {
        write!(output, "Enter numbers (e.g. 1,3 or 1-3, 'all'): ")?;
        output.flush()?;

        let Some(line) = read_answer(&mut input)? else {
            return Ok(Vec::new());
        };

        match parse_selection(&line, candidates.len()) {
            Ok(indices) => {
                return Ok(indices
                    .into_iter()
                    .map(|i| candidates[i].path.clone())
                    .collect());
            }
            Err(e) => writeln!(output, "{}", e)?,
        }
    }
}

/// Parse a multi-select answer into sorted, deduplicated zero-based indices.
///
/// # Errors
///
/// Returns [`SelectError::InvalidChoice`] for anything that is not a number,
/// a range, or `all`, and for numbers outside `1..=count`.
pub fn parse_selection(answer: &str, count: usize) -> Result<Vec<usize>, SelectError> {
    let answer = answer.trim();
    if answer.is_empty() {
        return Ok(Vec::new());
    }
    if answer.eq_ignore_ascii_case("all") || answer == "*" {
        return Ok((0..count).collect());
    }

    let mut picked = vec![false; count];

    for part in answer.split([',', ' ']).map(str::trim).filter(|p| !p.is_empty()) {
        let (lo, hi) = match part.split_once('-') {
            Some((a, b)) => (parse_index(a, count)?, parse_index(b, count)?),
            None => {
                let n = parse_index(part, count)?;
                (n, n)
            }
        };
        if lo > hi {
            return Err(SelectError::InvalidChoice(format!(
                "Range '{}' runs backwards.",
                part
            )));
        }
        for slot in &mut picked[lo - 1..hi] {
            *slot = true;
        }
    }

    Ok(picked
        .iter()
        .enumerate()
        .filter_map(|(i, on)| on.then_some(i))
        .collect())
}

fn parse_index(raw: &str, count: usize) -> Result<usize, SelectError> {
    match raw.trim().parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => Ok(n),
        _ => Err(SelectError::InvalidChoice(format!(
            "'{}' is not a number between 1 and {}.",
            raw.trim(),
            count
        ))),
    }
}

fn render_choices<W: Write>(candidates: &[Candidate], title: &str, output: &mut W) -> io::Result<()> {
    writeln!(output, "? {}", title)?;
    for (i, c) in candidates.iter().enumerate() {
        writeln!(output, "  {}) {}", i + 1, c.name)?;
    }
    Ok(())
}

fn read_answer<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Errors that can occur while listing or selecting files.
#[derive(Debug, thiserror::Error)]
pub enum SelectError {
    #[error("Cannot access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("No .{extension} files found in {}", .dir.display())]
    NoCandidates { dir: PathBuf, extension: String },

    #[error("{0}")]
    InvalidChoice(String),
}
