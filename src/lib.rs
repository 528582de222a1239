//! # stock-keyworder
//!
//! Caption stock images with Gemini and write the result back into the file.
//!
//! ## Features
//!
//! - **File selection**: the newest files in a stock folder, picked from an
//!   interactive single or multi-select prompt
//! - **Captioning** through Gemini `generateContent`, either as a
//!   five-field text template or as strict JSON constrained by a response
//!   schema with a fixed category list
//! - **EPS support**: vector artwork is rasterised with Ghostscript before
//!   upload
//! - **Metadata write-back** with `exiftool` (title, description,
//!   categories, keywords) in place, without backup files
//! - **Per-file isolation**: a failing file is logged and the batch moves on
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stock_keyworder::{
//!     run_batch, BatchOptions, ExifToolWriter, GeminiCaptioner, KeyworderConfig,
//! };
//! use std::path::PathBuf;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = KeyworderConfig::from_env()?;
//!     let writer = ExifToolWriter::new(&config.exiftool);
//!     let captioner = GeminiCaptioner::new(config)?;
//!
//!     let files = vec![PathBuf::from("../stock/artwork.eps")];
//!     let report = run_batch(&captioner, &writer, &files, &BatchOptions::default()).await;
//!     println!("{} ok, {} failed", report.succeeded, report.failed);
//!     Ok(())
//! }
//! ```
//!
//! ## Response parsing
//!
//! ```rust
//! use stock_keyworder::{parse_json_caption, parse_text_caption};
//!
//! let json = r#"{"title": "Sunset", "description": "Warm sky", "categories": ["Nature", "Holidays"], "keywords": ["sun"]}"#;
//! assert_eq!(parse_json_caption(json).unwrap().title, "Sunset");
//!
//! let text = "Title: Sunset\nDescription: Warm sky\nCategory 1: Nature\nCategory 2: Holidays\nTags: sun, sky";
//! assert_eq!(parse_text_caption(text).unwrap().keywords, vec!["sun", "sky"]);
//! ```

pub mod batch;
pub mod captioner;
pub mod config;
pub mod image;
pub mod metadata;
pub mod parser;
pub mod prompt;
pub mod selector;
pub mod types;

// Re-export main types at crate root
pub use batch::{render_output, run_batch};
pub use captioner::{CaptionError, GeminiCaptioner, ImageCaptioner};
pub use config::{ConfigError, KeyworderConfig};
pub use image::{load_image, ImagePayload};
pub use metadata::{exiftool_args, ExifToolWriter, MetadataError, MetadataSink};
pub use parser::{parse_json_caption, parse_text_caption, ParseError};
pub use selector::{list_candidates, prompt_multi, prompt_single, Candidate, SelectError};
pub use types::{
    BatchOptions, BatchReport, CaptionOutput, CaptionResult, ResponseMode, StockCategory,
};
