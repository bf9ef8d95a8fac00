//! Maps measurement filenames to their lighting-condition label.

use crate::error::LuxmapError;
use luxmap_schemas::label::MeasurementLabel;
use regex::Regex;
use std::sync::OnceLock;

/// Ordered `(label, pattern)` table. Patterns are tried in `MeasurementLabel::ALL`
/// order and the first match wins.
pub struct Classifier {
    patterns: Vec<(MeasurementLabel, Regex)>,
}

impl Classifier {
    pub fn new() -> Result<Self, LuxmapError> {
        let patterns = MeasurementLabel::ALL
            .iter()
            .map(|&label| {
                let pattern = format!(r"^.*{}\..*$", regex::escape(label.token()));
                Ok((label, Regex::new(&pattern)?))
            })
            .collect::<Result<Vec<_>, LuxmapError>>()?;
        Ok(Self { patterns })
    }

    pub fn classify(&self, file_name: &str) -> Option<MeasurementLabel> {
        self.patterns
            .iter()
            .find(|(_, pattern)| pattern.is_match(file_name))
            .map(|(label, _)| *label)
    }

    pub fn labels(&self) -> impl Iterator<Item = MeasurementLabel> + '_ {
        self.patterns.iter().map(|(label, _)| *label)
    }
}

/// Shared classifier built on first use.
pub fn classifier() -> Result<&'static Classifier, LuxmapError> {
    static CLASSIFIER: OnceLock<Classifier> = OnceLock::new();
    if let Some(c) = CLASSIFIER.get() {
        return Ok(c);
    }
    let built = Classifier::new()?;
    Ok(CLASSIFIER.get_or_init(|| built))
}

pub fn classify(file_name: &str) -> Result<Option<MeasurementLabel>, LuxmapError> {
    Ok(classifier()?.classify(file_name))
}
