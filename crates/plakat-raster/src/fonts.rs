//! Font catalog and text measurement.
//!
//! Fonts are registered per family and weight from raw TTF/OTF bytes.
//! Measurement is behind a trait so interaction code and the pixel
//! pipeline can share one notion of text extent, whether it comes from
//! the character-count heuristic or from real glyph metrics.

use fontdue::{Font, FontSettings};
use kurbo::Size;
use plakat_core::layers::{
    FontFamily, FontWeight, LINE_GAP, TEXT_PADDING, approximate_text_size, split_lines,
};
use std::collections::HashMap;
use thiserror::Error;

/// Font registration errors.
#[derive(Debug, Error)]
pub enum FontError {
    #[error("Font parse failed for {family:?}/{weight:?}: {reason}")]
    Parse {
        family: FontFamily,
        weight: FontWeight,
        reason: &'static str,
    },
}

/// Registered fonts, keyed by family and weight.
#[derive(Default)]
pub struct FontCatalog {
    fonts: HashMap<(FontFamily, FontWeight), Font>,
}

impl FontCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register font bytes for a family and weight.
    pub fn register(
        &mut self,
        family: FontFamily,
        weight: FontWeight,
        bytes: &[u8],
    ) -> Result<(), FontError> {
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|reason| FontError::Parse { family, weight, reason })?;
        self.fonts.insert((family, weight), font);
        Ok(())
    }

    /// Look up a font. A missing bold falls back to the regular weight of
    /// the same family; a missing family is a miss.
    pub fn get(&self, family: FontFamily, weight: FontWeight) -> Option<&Font> {
        self.fonts
            .get(&(family, weight))
            .or_else(|| self.fonts.get(&(family, FontWeight::Regular)))
    }

    /// Whether any font is registered for a family.
    pub fn has_family(&self, family: FontFamily) -> bool {
        self.get(family, FontWeight::Regular).is_some()
    }

    /// Number of registered fonts.
    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

/// Text extent measurement.
pub trait TextMeasure {
    /// Measure the footprint of content at a font size, in logical units.
    fn measure(
        &self,
        content: &str,
        font_size: f64,
        family: FontFamily,
        weight: FontWeight,
    ) -> Size;
}

/// Character-count heuristic. Matches the extent interaction code uses
/// for hit testing, so what you grab is what you measured.
#[derive(Default)]
pub struct HeuristicMeasure;

impl TextMeasure for HeuristicMeasure {
    fn measure(&self, content: &str, font_size: f64, _: FontFamily, _: FontWeight) -> Size {
        approximate_text_size(content, font_size)
    }
}

/// Glyph-metrics measurement backed by a catalog. Falls back to the
/// heuristic when the requested family has no registered font.
pub struct MetricsMeasure<'a> {
    catalog: &'a FontCatalog,
}

impl<'a> MetricsMeasure<'a> {
    pub fn new(catalog: &'a FontCatalog) -> Self {
        Self { catalog }
    }
}

impl TextMeasure for MetricsMeasure<'_> {
    fn measure(
        &self,
        content: &str,
        font_size: f64,
        family: FontFamily,
        weight: FontWeight,
    ) -> Size {
        let Some(font) = self.catalog.get(family, weight) else {
            return approximate_text_size(content, font_size);
        };

        let px = font_size as f32;
        let lines = split_lines(content);
        let widest = lines
            .iter()
            .map(|line| {
                line.chars()
                    .map(|ch| font.metrics(ch, px).advance_width as f64)
                    .sum::<f64>()
            })
            .fold(0.0_f64, f64::max);
        let line_count = lines.len() as f64;
        let height = line_count * font_size + (line_count - 1.0) * LINE_GAP + TEXT_PADDING;
        Size::new((widest + TEXT_PADDING).max(1.0), height)
    }
}
