use serde::{Deserialize, Serialize};
use std::fmt;

/// Metadata returned by the captioning model for one image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionResult {
    /// Short SEO title
    pub title: String,
    /// Keyword-rich description
    pub description: String,
    /// Stock categories (two from the fixed list in JSON mode)
    pub categories: Vec<String>,
    /// Lowercase search keywords
    pub keywords: Vec<String>,
}

/// What one captioning call produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptionOutput {
    /// Plain text in the five-field template, with a best-effort parse of
    /// its fields when the template was followed.
    Text {
        raw: String,
        parsed: Option<CaptionResult>,
    },
    /// Strict JSON parsed into the four metadata fields.
    Structured(CaptionResult),
}

impl CaptionOutput {
    /// The parsed fields, if any.
    pub fn result(&self) -> Option<&CaptionResult> {
        match self {
            CaptionOutput::Text { parsed, .. } => parsed.as_ref(),
            CaptionOutput::Structured(result) => Some(result),
        }
    }
}

/// How the model is asked to answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseMode {
    /// Free text following the Title/Description/Category/Tags template.
    Text,
    /// A JSON object constrained by a response schema.
    #[default]
    Json,
}

impl std::str::FromStr for ResponseMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(ResponseMode::Text),
            "json" => Ok(ResponseMode::Json),
            other => Err(format!("unknown response mode '{}' (expected text or json)", other)),
        }
    }
}

impl fmt::Display for ResponseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseMode::Text => write!(f, "text"),
            ResponseMode::Json => write!(f, "json"),
        }
    }
}

/// The fixed stock-platform category list offered to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockCategory {
    Abstract,
    AnimalsWildlife,
    Arts,
    BackgroundsTextures,
    BeautyFashion,
    BuildingsLandmarks,
    BusinessFinance,
    Celebrities,
    Education,
    FoodAndDrink,
    HealthcareMedical,
    Holidays,
    Industrial,
    Interiors,
    Miscellaneous,
    Nature,
    Objects,
    ParksOutdoor,
    People,
    Religion,
    Science,
    SignsSymbols,
    SportsRecreation,
    Technology,
    Transportation,
    Vintage,
}

impl StockCategory {
    pub const ALL: [StockCategory; 26] = [
        StockCategory::Abstract,
        StockCategory::AnimalsWildlife,
        StockCategory::Arts,
        StockCategory::BackgroundsTextures,
        StockCategory::BeautyFashion,
        StockCategory::BuildingsLandmarks,
        StockCategory::BusinessFinance,
        StockCategory::Celebrities,
        StockCategory::Education,
        StockCategory::FoodAndDrink,
        StockCategory::HealthcareMedical,
        StockCategory::Holidays,
        StockCategory::Industrial,
        StockCategory::Interiors,
        StockCategory::Miscellaneous,
        StockCategory::Nature,
        StockCategory::Objects,
        StockCategory::ParksOutdoor,
        StockCategory::People,
        StockCategory::Religion,
        StockCategory::Science,
        StockCategory::SignsSymbols,
        StockCategory::SportsRecreation,
        StockCategory::Technology,
        StockCategory::Transportation,
        StockCategory::Vintage,
    ];

    /// Label as the stock platform spells it.
    pub fn label(self) -> &'static str {
        match self {
            StockCategory::Abstract => "Abstract",
            StockCategory::AnimalsWildlife => "Animals/Wildlife",
            StockCategory::Arts => "The Arts",
            StockCategory::BackgroundsTextures => "Backgrounds/Textures",
            StockCategory::BeautyFashion => "Beauty/Fashion",
            StockCategory::BuildingsLandmarks => "Buildings/Landmarks",
            StockCategory::BusinessFinance => "Business/Finance",
            StockCategory::Celebrities => "Celebrities",
            StockCategory::Education => "Education",
            StockCategory::FoodAndDrink => "Food and drink",
            StockCategory::HealthcareMedical => "Healthcare/Medical",
            StockCategory::Holidays => "Holidays",
            StockCategory::Industrial => "Industrial",
            StockCategory::Interiors => "Interiors",
            StockCategory::Miscellaneous => "Miscellaneous",
            StockCategory::Nature => "Nature",
            StockCategory::Objects => "Objects",
            StockCategory::ParksOutdoor => "Parks/Outdoor",
            StockCategory::People => "People",
            StockCategory::Religion => "Religion",
            StockCategory::Science => "Science",
            StockCategory::SignsSymbols => "Signs/Symbols",
            StockCategory::SportsRecreation => "Sports/Recreation",
            StockCategory::Technology => "Technology",
            StockCategory::Transportation => "Transportation",
            StockCategory::Vintage => "Vintage",
        }
    }

    /// All labels in list order.
    pub fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|c| c.label()).collect()
    }

    /// Case-insensitive lookup by label.
    pub fn from_label(label: &str) -> Option<Self> {
        let wanted = label.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.label().eq_ignore_ascii_case(wanted))
    }
}

impl fmt::Display for StockCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-run options for the batch loop.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Write parsed fields back with the metadata tool
    pub write_metadata: bool,
    /// Draw a progress bar over the loop
    pub show_progress: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            write_metadata: true,
            show_progress: true,
        }
    }
}

impl BatchOptions {
    pub fn write_metadata(mut self, enabled: bool) -> Self {
        self.write_metadata = enabled;
        self
    }

    pub fn show_progress(mut self, enabled: bool) -> Self {
        self.show_progress = enabled;
        self
    }
}

/// Outcome counts for one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_mode_parses_case_insensitively() {
        assert_eq!("JSON".parse::<ResponseMode>().unwrap(), ResponseMode::Json);
        assert_eq!("text".parse::<ResponseMode>().unwrap(), ResponseMode::Text);
        assert!("yaml".parse::<ResponseMode>().is_err());
    }

    #[test]
    fn default_mode_is_json() {
        assert_eq!(ResponseMode::default(), ResponseMode::Json);
    }

    #[test]
    fn category_lookup_by_label() {
        assert_eq!(
            StockCategory::from_label("food and drink"),
            Some(StockCategory::FoodAndDrink)
        );
        assert_eq!(
            StockCategory::from_label(" Technology "),
            Some(StockCategory::Technology)
        );
        assert_eq!(StockCategory::from_label("Cats"), None);
    }

    #[test]
    fn labels_cover_every_category() {
        let labels = StockCategory::labels();
        assert_eq!(labels.len(), StockCategory::ALL.len());
        assert_eq!(labels[0], "Abstract");
    }

    #[test]
    fn text_output_without_parse_has_no_result() {
        let out = CaptionOutput::Text {
            raw: "hello".into(),
            parsed: None,
        };
        assert!(out.result().is_none());
    }
}
