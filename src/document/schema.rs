//! Declarative template schema.
//!
//! The schema is plain data: the validator iterates these rule lists
//! generically, so a new template variant or required phrase is a data change.

use serde::Serialize;

/// Which official template a document was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TemplateKind {
    Food,
    Beverage,
}

impl TemplateKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Beverage => "beverage",
        }
    }
}

/// A sentinel phrase whose presence identifies a template variant.
#[derive(Debug, Clone)]
pub struct VariantRule {
    pub sentinel: &'static str,
    pub kind: TemplateKind,
}

/// A required phrase and the logical element it stands for.
///
/// Error messages name the element, not the raw phrase.
#[derive(Debug, Clone)]
pub struct PhraseRule {
    pub phrase: &'static str,
    pub element: &'static str,
}

/// An ordered group of required phrases reported under one heading.
#[derive(Debug, Clone)]
pub struct RuleGroup {
    /// Prefix for every error raised by this group.
    pub label: &'static str,
    pub rules: Vec<PhraseRule>,
}

/// Structural schema every submitted document must satisfy.
#[derive(Debug, Clone)]
pub struct TemplateSchema {
    /// Mutually exclusive variant sentinels, checked in order.
    pub variants: Vec<VariantRule>,
    /// Header elements, form fields, then SOP elements.
    pub groups: Vec<RuleGroup>,
    /// Phrase separating the fixed scaffold from submitted content.
    pub boundary_marker: &'static str,
    /// Minimum length of the trimmed document text, in characters.
    pub min_text_chars: usize,
    /// Minimum length of the trimmed content after the boundary marker.
    pub min_content_chars: usize,
}

const fn rule(phrase: &'static str, element: &'static str) -> PhraseRule {
    PhraseRule { phrase, element }
}

impl TemplateSchema {
    /// The official menu design brief template.
    pub fn standard() -> Self {
        Self {
            variants: vec![
                VariantRule {
                    sentinel: "PROJECT DESIGN DETAILS",
                    kind: TemplateKind::Food,
                },
                VariantRule {
                    sentinel: "BEVERAGE DESIGN DETAILS",
                    kind: TemplateKind::Beverage,
                },
            ],
            groups: vec![
                RuleGroup {
                    label: "Missing header element",
                    rules: vec![
                        rule("DESIGN BRIEF", "Design brief title"),
                        rule("SUBMISSION GUIDELINES", "Submission guidelines section"),
                    ],
                },
                RuleGroup {
                    label: "Missing required form field",
                    rules: vec![
                        rule("PROJECT NAME", "Project name"),
                        rule("PROPERTY", "Property"),
                        rule("SIZE (PIXELS = WEB) OR (INCHES = PRINT)", "Size"),
                        rule("ORIENTATION (PORTRAIT OR LANDSCAPE)", "Orientation"),
                        rule("DATE NEEDED", "Date needed"),
                    ],
                },
                RuleGroup {
                    label: "Missing SOP element",
                    rules: vec![
                        rule("STANDARD OPERATING PROCEDURE", "SOP section header"),
                        rule("Step 1:", "SOP step 1"),
                        rule("Step 2:", "SOP step 2"),
                        rule("Step 3:", "SOP step 3"),
                    ],
                },
            ],
            boundary_marker: "Please drop the menu content below on page 2",
            min_text_chars: 500,
            min_content_chars: 50,
        }
    }

    /// First variant whose sentinel appears in `text`.
    pub fn detect_variant(&self, text: &str) -> Option<TemplateKind> {
        self.variants
            .iter()
            .find(|v| text.contains(v.sentinel))
            .map(|v| v.kind)
    }

    /// Every phrase the standard check set looks for, in check order.
    pub fn required_phrases(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.groups
            .iter()
            .flat_map(|g| g.rules.iter().map(|r| r.phrase))
    }
}
