//! Mix report rendering
//!
//! Produces a single self-contained HTML document (inline styles, no external
//! assets). Output depends only on the record and the optional code image, so
//! rendering the same record twice yields the same bytes.

use html_escape::encode_text;

use super::code::CompactCode;
use super::MixRecord;
use crate::inference::Feature;

#[derive(Debug, Clone, Copy, Default)]
pub struct ReportRenderer;

impl ReportRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Render a record on its own. Never touches the code encoder.
    pub fn render(&self, record: &MixRecord) -> String {
        self.render_document(record, None)
    }

    /// Render a record with its scannable code embedded as a PNG data URI.
    pub fn render_with_code(&self, record: &MixRecord, code: &CompactCode) -> String {
        self.render_document(record, Some(code))
    }

    fn render_document(&self, record: &MixRecord, code: Option<&CompactCode>) -> String {
        let name = encode_text(&record.name);
        let project = encode_text(&record.project);
        let location = encode_text(&record.location);
        let identifier = record.identifier();
        let generated = record.timestamp_label();

        let composition_rows: String = record
            .features
            .composition()
            .map(|(feature, value)| {
                format!(
                    "<tr><th>{}</th><td>{} {}</td></tr>\n",
                    feature.label(),
                    format_quantity(value),
                    feature.unit()
                )
            })
            .collect();

        let notes_block = match record.notes.as_deref() {
            Some(notes) => format!(
                "<section class=\"notes\">\n<h2>Notes</h2>\n<p>{}</p>\n</section>\n",
                encode_text(notes).replace('\n', "<br>\n")
            ),
            None => String::new(),
        };

        let code_block = match code.and_then(|c| c.to_data_uri().ok()) {
            Some(uri) => format!(
                "<section class=\"code\">\n<img src=\"{}\" alt=\"Scannable mix code\" width=\"180\" height=\"180\">\n</section>\n",
                uri
            ),
            None => String::new(),
        };

        format!(
            r####"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Mix Report | {name}</title>
<style>
    body {{ font-family: -apple-system, "Segoe UI", Helvetica, Arial, sans-serif; color: #1f2933; margin: 0; padding: 32px; background: #f5f7fa; }}
    header {{ background: #243b53; color: #fff; padding: 20px 24px; border-radius: 8px 8px 0 0; }}
    header h1 {{ margin: 0 0 4px 0; font-size: 22px; }}
    .ident {{ background: #fff; padding: 16px 24px; border-bottom: 1px solid #d9e2ec; }}
    .ident table {{ border-collapse: collapse; }}
    .ident th {{ text-align: left; padding: 4px 16px 4px 0; color: #627d98; font-weight: 600; }}
    .panels {{ display: flex; gap: 16px; background: #fff; padding: 16px 24px; }}
    .panel {{ flex: 1; border: 1px solid #d9e2ec; border-radius: 6px; padding: 12px 16px; }}
    .panel h2 {{ font-size: 15px; text-transform: uppercase; letter-spacing: 1px; color: #486581; margin-top: 0; }}
    .panel table {{ width: 100%; border-collapse: collapse; }}
    .panel th {{ text-align: left; font-weight: 500; padding: 4px 0; }}
    .panel td {{ text-align: right; padding: 4px 0; font-family: "SF Mono", Menlo, monospace; }}
    .strength {{ font-size: 32px; font-weight: 300; color: #0b6e4f; }}
    .notes, .code {{ background: #fff; padding: 12px 24px; }}
    .notes h2 {{ font-size: 15px; color: #486581; }}
    footer {{ background: #fff; padding: 12px 24px; border-radius: 0 0 8px 8px; color: #829ab1; font-size: 12px; }}
</style>
</head>
<body>
<header>
<h1>Concrete Mix Report</h1>
<div>{name}</div>
</header>
<section class="ident">
<table>
<tr><th>Mix Name</th><td>{name}</td></tr>
<tr><th>Project</th><td>{project}</td></tr>
<tr><th>Location</th><td>{location}</td></tr>
<tr><th>Mix ID</th><td>{identifier}</td></tr>
<tr><th>Generated</th><td>{generated}</td></tr>
</table>
</section>
<div class="panels">
<section class="panel">
<h2>Mix Composition</h2>
<table>
{composition_rows}</table>
</section>
<section class="panel">
<h2>Strength Properties</h2>
<table>
<tr><th>Predicted Strength</th><td class="strength">{strength}</td></tr>
<tr><th>Curing Age</th><td>{age} {age_unit}</td></tr>
</table>
</section>
</div>
{notes_block}{code_block}<footer>Predicted compressive strength from a pre-fitted regression model. Verify against cylinder or cube tests before use.</footer>
</body>
</html>
"####,
            name = name,
            project = project,
            location = location,
            identifier = identifier,
            generated = generated,
            composition_rows = composition_rows,
            strength = record.formatted_strength(),
            age = record.age_days(),
            age_unit = Feature::Age.unit(),
            notes_block = notes_block,
            code_block = code_block,
        )
    }
}

/// Whole numbers without decimals, otherwise up to two places.
/// Shortest text that reads back as the same value: `300`, `2.456`.
fn format_quantity(value: f64) -> String {
    format!("{}", value)
}
