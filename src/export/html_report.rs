//! HTML report page generation.
//!
//! The page is a fixed template asset with a single placeholder; rendering
//! means serialising the document to JSON and substituting it into the
//! template's data block. Everything interactive (filters, sorting, search,
//! row caps) runs client-side in the page's own script, so the renderer
//! never filters or reorders anything.

use crate::core::document::ReportDocument;
use crate::util::error::{BlueBoxError, Result};

/// The report page template, compiled into the binary.
const TEMPLATE: &str = include_str!("../../assets/report_template.html");

/// Placeholder inside the template's `<script type="application/json">`
/// block that receives the serialised document.
const DATA_PLACEHOLDER: &str = "__REPORT_DATA__";

/// Render the document into the self-contained report page.
pub fn render_report(document: &ReportDocument) -> Result<String> {
    if !TEMPLATE.contains(DATA_PLACEHOLDER) {
        return Err(BlueBoxError::Render(
            "report template is missing its data placeholder".into(),
        ));
    }

    let json = serde_json::to_string(document)?;
    let json = escape_inline_json(&json);
    Ok(TEMPLATE.replacen(DATA_PLACEHOLDER, &json, 1))
}

/// Make a JSON string safe to embed inside an HTML `<script>` block.
///
/// `</` becomes `<\/` (a legal JSON escape for `/`), so no value can smuggle
/// a `</script>` terminator into the page; `<!--` becomes `\u003c!--` so a
/// value cannot open an HTML comment inside script data. Both rewrites
/// leave the JSON semantically identical.
pub fn escape_inline_json(json: &str) -> String {
    json.replace("</", "<\\/").replace("<!--", "\\u003c!--")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::document::{CategorisedEvents, ReportDocument, RunMetadata};
    use crate::core::event_record::{Category, EventRecord};
    use crate::core::hardware::HardwareProfile;
    use chrono::Utc;

    fn doc_with_message(message: &str) -> ReportDocument {
        let mut events = CategorisedEvents::default();
        events.application.push(EventRecord {
            category: Category::Application,
            log_name: "Application".into(),
            time_created: Utc::now(),
            level: "Error".into(),
            event_id: 1000,
            provider: "Application Error".into(),
            task: None,
            record_id: None,
            message: message.into(),
        });
        ReportDocument::assemble(
            RunMetadata {
                generated_at: Utc::now(),
                machine_name: None,
                user_name: None,
                start_time: None,
                end_time: None,
                event_ids: None,
                max_events: 2000,
                include_warnings: false,
                errors: Vec::new(),
            },
            events,
            HardwareProfile::default(),
            Vec::new(),
        )
    }

    #[test]
    fn test_escape_neutralises_closing_script() {
        let escaped = escape_inline_json(r#"{"Message":"bad </script><script>alert(1)"}"#);
        assert!(!escaped.contains("</script>"));
        assert!(escaped.contains(r"<\/script>"));
    }

    #[test]
    fn test_escape_neutralises_comment_open() {
        let escaped = escape_inline_json(r#"{"Message":"x <!-- y"}"#);
        assert!(!escaped.contains("<!--"));
        assert!(escaped.contains(r"\u003c!--"));
    }

    #[test]
    fn test_escape_is_still_valid_json() {
        let original = r#"{"Message":"</script> and <!-- here"}"#;
        let escaped = escape_inline_json(original);
        let value: serde_json::Value = serde_json::from_str(&escaped).unwrap();
        assert_eq!(value["Message"], "</script> and <!-- here");
    }

    #[test]
    fn test_render_embeds_document() {
        let html = render_report(&doc_with_message("disk failure imminent")).unwrap();
        assert!(html.contains("disk failure imminent"));
        assert!(!html.contains(DATA_PLACEHOLDER));
    }

    #[test]
    fn test_render_never_emits_embedded_terminator() {
        let html = render_report(&doc_with_message("</script><b>injected</b>")).unwrap();
        let data_block = html
            .split("<script type=\"application/json\"")
            .nth(1)
            .and_then(|rest| rest.split("</script>").next())
            .unwrap();
        assert!(!data_block.contains("</script>"));
        assert!(data_block.contains(r"<\/script>"));
    }

    #[test]
    fn test_template_row_caps_match_constants() {
        use crate::util::constants::{REPORT_APP_ROW_CAP, REPORT_EVENT_ROW_CAP};

        assert!(TEMPLATE.contains(&format!("EVENT_ROW_CAP = {REPORT_EVENT_ROW_CAP}")));
        assert!(TEMPLATE.contains(&format!("APP_ROW_CAP = {REPORT_APP_ROW_CAP}")));
    }
}
