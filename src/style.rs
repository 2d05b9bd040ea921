//! Page Styling - Fixed Element Mapping
//!
//! The element set is small and closed, so the mapping is an enumerated
//! table rather than open dispatch.

use serde::{Deserialize, Serialize};

/// Page canvas, in layout units.
pub const PAGE_WIDTH: f32 = 103.0;
pub const PAGE_HEIGHT: f32 = 160.0;
/// Inner padding on all four sides.
pub const PAGE_PADDING: f32 = 4.0;
/// Gap between the body area and the page footer.
pub const FOOTER_GAP: f32 = 2.0;

/// Block-level element kinds the renderer distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Heading1,
    Heading3,
    Heading4,
    Paragraph,
    ListItem,
    /// Anything without a dedicated mapping passes through unstyled.
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Regular,
    Bold,
}

impl FontWeight {
    /// CSS numeric weight. The bold face ships at 800, matching the
    /// embedded font pair.
    pub fn numeric_value(&self) -> u16 {
        match self {
            FontWeight::Regular => 400,
            FontWeight::Bold => 800,
        }
    }
}

/// The three fixed font size tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeTier {
    Base,
    Lg,
    Xl,
}

impl SizeTier {
    pub fn px(&self) -> f32 {
        match self {
            SizeTier::Base => 4.5,
            SizeTier::Lg => 5.5,
            SizeTier::Xl => 6.0,
        }
    }
}

/// Presentation rule for one block row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockStyle {
    pub size: SizeTier,
    pub weight: FontWeight,
    pub margin_bottom: f32,
    pub bullet: bool,
}

impl BlockKind {
    /// The fixed kind -> presentation table.
    pub fn style(&self) -> BlockStyle {
        match self {
            BlockKind::Heading1 => BlockStyle {
                size: SizeTier::Xl,
                weight: FontWeight::Bold,
                margin_bottom: 2.0,
                bullet: false,
            },
            BlockKind::Heading3 => BlockStyle {
                size: SizeTier::Lg,
                weight: FontWeight::Bold,
                margin_bottom: 2.0,
                bullet: false,
            },
            BlockKind::Heading4 => BlockStyle {
                size: SizeTier::Base,
                weight: FontWeight::Bold,
                margin_bottom: 0.0,
                bullet: false,
            },
            BlockKind::Paragraph => BlockStyle {
                size: SizeTier::Base,
                weight: FontWeight::Regular,
                margin_bottom: 2.0,
                bullet: false,
            },
            BlockKind::ListItem => BlockStyle {
                size: SizeTier::Base,
                weight: FontWeight::Regular,
                margin_bottom: 2.0,
                bullet: true,
            },
            BlockKind::Plain => BlockStyle {
                size: SizeTier::Base,
                weight: FontWeight::Regular,
                margin_bottom: 0.0,
                bullet: false,
            },
        }
    }
}

impl BlockStyle {
    /// Baseline-to-baseline distance.
    pub fn line_height(&self) -> f32 {
        self.size.px() * 1.2
    }

    /// Flat per-character advance. Verdana averages roughly 0.60 em
    /// regular and 0.65 em bold; exact shaping lived in the original
    /// rasterizer and is approximated here.
    pub fn char_advance(&self) -> f32 {
        let em = self.size.px();
        match self.weight {
            FontWeight::Regular => em * 0.60,
            FontWeight::Bold => em * 0.65,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_table_matches_contract() {
        let h1 = BlockKind::Heading1.style();
        assert_eq!(h1.size, SizeTier::Xl);
        assert_eq!(h1.weight, FontWeight::Bold);
        assert_eq!(h1.margin_bottom, 2.0);

        let h3 = BlockKind::Heading3.style();
        assert_eq!(h3.size, SizeTier::Lg);
        assert_eq!(h3.weight, FontWeight::Bold);

        let h4 = BlockKind::Heading4.style();
        assert_eq!(h4.size, SizeTier::Base);
        assert_eq!(h4.weight, FontWeight::Bold);
        assert_eq!(h4.margin_bottom, 0.0);

        let p = BlockKind::Paragraph.style();
        assert_eq!(p.size, SizeTier::Base);
        assert_eq!(p.weight, FontWeight::Regular);
        assert!(!p.bullet);

        let li = BlockKind::ListItem.style();
        assert!(li.bullet);
        assert_eq!(li.size, SizeTier::Base);

        let plain = BlockKind::Plain.style();
        assert_eq!(plain.weight, FontWeight::Regular);
        assert_eq!(plain.margin_bottom, 0.0);
        assert!(!plain.bullet);
    }

    #[test]
    fn size_tiers() {
        assert_eq!(SizeTier::Base.px(), 4.5);
        assert_eq!(SizeTier::Lg.px(), 5.5);
        assert_eq!(SizeTier::Xl.px(), 6.0);
    }

    #[test]
    fn numeric_weights() {
        assert_eq!(FontWeight::Regular.numeric_value(), 400);
        assert_eq!(FontWeight::Bold.numeric_value(), 800);
    }

    #[test]
    fn bold_advance_is_wider() {
        let regular = BlockKind::Paragraph.style();
        let bold = BlockKind::Heading4.style();
        assert!(bold.char_advance() > regular.char_advance());
    }
}
