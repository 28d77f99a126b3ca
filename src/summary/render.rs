//! Markdown, JSON and CSV renderings of a summary

use crate::summary::SummaryResult;

pub const CSV_HEADER: &str = "File,Summary,Action,Owner,Due";

/// Render a result as Markdown
pub fn to_markdown(result: &SummaryResult, title: Option<&str>) -> String {
    let mut output = String::new();
    if let Some(title) = title {
        output.push_str(&format!("# {}\n\n", title));
    }

    if !result.parse_succeeded {
        output.push_str("> The model reply could not be parsed; showing it unchanged.\n\n");
        output.push_str(result.summary_text.trim());
        output.push('\n');
        return output;
    }

    output.push_str("## Summary\n\n");
    output.push_str(result.summary_text.trim());
    output.push_str("\n\n## Action Items\n\n");

    if result.action_items.is_empty() {
        output.push_str("None\n");
        return output;
    }

    for item in &result.action_items {
        output.push_str("- ");
        if let Some(owner) = &item.owner {
            output.push_str(&format!("**{}**: ", owner));
        }
        output.push_str(&item.description);
        if let Some(due) = &item.due_hint {
            output.push_str(&format!(" _(due {})_", due));
        }
        output.push('\n');
    }

    output
}

/// Render a result as pretty-printed JSON
pub fn to_json(result: &SummaryResult) -> serde_json::Result<String> {
    serde_json::to_string_pretty(result)
}

/// Render results as CSV, one row per action item
///
/// A result without action items still produces one row so the file and its
/// summary are not lost.
pub fn to_csv<'a, I>(results: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a SummaryResult)>,
{
    let mut output = String::from(CSV_HEADER);
    output.push_str("\r\n");

    for (file, result) in results {
        if result.action_items.is_empty() {
            push_row(&mut output, &[file, &result.summary_text, "", "", ""]);
            continue;
        }
        for item in &result.action_items {
            push_row(
                &mut output,
                &[
                    file,
                    &result.summary_text,
                    &item.description,
                    item.owner.as_deref().unwrap_or(""),
                    item.due_hint.as_deref().unwrap_or(""),
                ],
            );
        }
    }

    output
}

fn push_row(output: &mut String, fields: &[&str]) {
    let row = fields
        .iter()
        .map(|field| csv_field(field))
        .collect::<Vec<_>>()
        .join(",");
    output.push_str(&row);
    output.push_str("\r\n");
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::ActionItem;

    fn sample() -> SummaryResult {
        SummaryResult::structured(
            "Ship by Friday.",
            vec![
                ActionItem::new("owns deploy script").with_owner("Bob"),
                ActionItem::new("update docs, again").with_due_hint("2025-03-01"),
            ],
        )
    }

    #[test]
    fn markdown_lists_items_with_owner_and_due() {
        let md = to_markdown(&sample(), Some("Weekly Sync"));
        assert!(md.starts_with("# Weekly Sync\n\n## Summary\n\nShip by Friday.\n"));
        assert!(md.contains("- **Bob**: owns deploy script\n"));
        assert!(md.contains("- update docs, again _(due 2025-03-01)_\n"));
    }

    #[test]
    fn markdown_flags_degraded_result() {
        let md = to_markdown(&SummaryResult::degraded("free text"), None);
        assert!(md.contains("could not be parsed"));
        assert!(md.ends_with("free text\n"));
        assert!(!md.contains("## Action Items"));
    }

    #[test]
    fn csv_quotes_and_expands_rows() {
        let result = sample();
        let empty = SummaryResult::structured("Nothing \"major\".", Vec::new());
        let csv = to_csv([("a.txt", &result), ("b.vtt", &empty)]);

        let rows: Vec<_> = csv.split("\r\n").collect();
        assert_eq!(rows[0], CSV_HEADER);
        assert_eq!(rows[1], "a.txt,Ship by Friday.,owns deploy script,Bob,");
        assert_eq!(rows[2], "a.txt,Ship by Friday.,\"update docs, again\",,2025-03-01");
        assert_eq!(rows[3], "b.vtt,\"Nothing \"\"major\"\".\",,,");
        assert_eq!(rows[4], "");
    }

    #[test]
    fn json_matches_result_shape() {
        let json = to_json(&sample()).unwrap();
        let back: SummaryResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sample());
        assert!(json.contains("\"dueHint\": null"));
    }
}
