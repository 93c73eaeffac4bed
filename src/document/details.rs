//! Project details and menu content read back out of a filled-in template.
//!
//! Works on flattened document text, where every table cell is its own
//! line: a form-field value is the line after its label.

use serde::Serialize;

use crate::document::schema::{TemplateKind, TemplateSchema};

/// Standalone heading that opens the menu section of the beverage template.
pub const MENU_HEADING: &str = "MENU";

/// Instruction text repeated around the menu section; never menu content.
const INSTRUCTION: &str = "Please drop the menu content below";

/// Form-field values from the project table. Missing fields are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectDetails {
    pub project_name: String,
    pub property: String,
    pub size: String,
    pub orientation: String,
    pub date_needed: String,
}

impl ProjectDetails {
    fn slot(&mut self, label: &str) -> Option<&mut String> {
        match label {
            "PROJECT NAME" => Some(&mut self.project_name),
            "PROPERTY" => Some(&mut self.property),
            "SIZE (PIXELS = WEB) OR (INCHES = PRINT)" => Some(&mut self.size),
            "ORIENTATION (PORTRAIT OR LANDSCAPE)" => Some(&mut self.orientation),
            "DATE NEEDED" => Some(&mut self.date_needed),
            _ => None,
        }
    }

    fn is_label(line: &str) -> bool {
        Self::default().slot(line).is_some()
    }

    /// Read field values from flattened text. The first filled value of a
    /// label wins; a label followed by another label has an empty value.
    pub fn from_text(text: &str) -> Self {
        let lines: Vec<&str> = text.lines().map(str::trim).collect();
        let mut details = Self::default();

        for (idx, label) in lines.iter().enumerate() {
            let value = match lines.get(idx + 1) {
                Some(next) if !Self::is_label(next) => *next,
                _ => "",
            };
            if let Some(slot) = details.slot(label) {
                if slot.is_empty() {
                    *slot = value.to_string();
                }
            }
        }
        details
    }
}

/// Everything read back from a submitted document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDetails {
    pub template: Option<TemplateKind>,
    pub project_details: ProjectDetails,
    /// Cleaned menu content; `None` when no boundary line was found.
    pub menu_content: Option<String>,
}

impl DocumentDetails {
    pub fn from_text(schema: &TemplateSchema, text: &str) -> Self {
        Self {
            template: schema.detect_variant(text),
            project_details: ProjectDetails::from_text(text),
            menu_content: menu_content(text, schema.boundary_marker),
        }
    }
}

/// Menu lines after the first boundary line.
///
/// The boundary is the first line containing `marker` or consisting of
/// [`MENU_HEADING`]. Instruction lines and further `MENU` headings are
/// skipped and trailing blank lines dropped; other lines are kept verbatim.
pub fn menu_content(text: &str, marker: &str) -> Option<String> {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.iter().position(|line| {
        let line = line.trim();
        line == MENU_HEADING || line.contains(marker)
    })?;

    let mut menu: Vec<&str> = lines[start + 1..]
        .iter()
        .copied()
        .filter(|line| {
            let line = line.trim();
            line != MENU_HEADING && !line.contains(INSTRUCTION)
        })
        .collect();
    while menu.last().is_some_and(|line| line.trim().is_empty()) {
        menu.pop();
    }

    Some(menu.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILLED: &str = "\
PROJECT DESIGN DETAILS
PROJECT NAME
Spring Brunch Launch
PROPERTY
 Harbor Hotel
SIZE (PIXELS = WEB) OR (INCHES = PRINT)
8.5 x 11
ORIENTATION (PORTRAIT OR LANDSCAPE)
Portrait
DATE NEEDED

Please drop the menu content below on page 2
MENU
STARTERS
  Charred leeks, hazelnut romesco

MAINS
Hanger steak


";

    #[test]
    fn reads_value_after_each_label() {
        let details = ProjectDetails::from_text(FILLED);
        assert_eq!(
            details,
            ProjectDetails {
                project_name: "Spring Brunch Launch".into(),
                property: "Harbor Hotel".into(),
                size: "8.5 x 11".into(),
                orientation: "Portrait".into(),
                date_needed: String::new(),
            }
        );
    }

    #[test]
    fn label_followed_by_label_is_empty() {
        let details = ProjectDetails::from_text("PROJECT NAME\nPROPERTY\nHarbor Hotel");
        assert_eq!(details.project_name, "");
        assert_eq!(details.property, "Harbor Hotel");
    }

    #[test]
    fn first_filled_value_wins() {
        let details = ProjectDetails::from_text("PROPERTY\nHarbor Hotel\nPROPERTY\nAnnex");
        assert_eq!(details.property, "Harbor Hotel");
    }

    #[test]
    fn labels_must_fill_the_line() {
        let details = ProjectDetails::from_text("The PROPERTY team\nHarbor Hotel");
        assert_eq!(details, ProjectDetails::default());
    }

    #[test]
    fn menu_content_skips_headings_and_trailing_blanks() {
        let schema = TemplateSchema::standard();
        assert_eq!(
            menu_content(FILLED, schema.boundary_marker).as_deref(),
            Some("STARTERS\n  Charred leeks, hazelnut romesco\n\nMAINS\nHanger steak")
        );
    }

    #[test]
    fn menu_heading_alone_opens_content() {
        let text = "BEVERAGE DESIGN DETAILS\nMENU\nPlease drop the menu content below\nNegroni\nSpritz\n";
        assert_eq!(menu_content(text, "unused marker").as_deref(), Some("Negroni\nSpritz"));
    }

    #[test]
    fn no_boundary_means_no_menu_content() {
        assert_eq!(menu_content("Just some text\nMore text", "marker"), None);
    }

    #[test]
    fn document_details_combines_both() {
        let details = DocumentDetails::from_text(&TemplateSchema::standard(), FILLED);
        assert_eq!(details.template, Some(TemplateKind::Food));
        assert_eq!(details.project_details.orientation, "Portrait");
        assert!(details.menu_content.unwrap().starts_with("STARTERS"));

        let json = serde_json::to_value(
            DocumentDetails::from_text(&TemplateSchema::standard(), "nothing here"),
        )
        .unwrap();
        assert_eq!(json["template"], serde_json::Value::Null);
        assert_eq!(json["projectDetails"]["project_name"], "");
        assert_eq!(json["menuContent"], serde_json::Value::Null);
    }
}
