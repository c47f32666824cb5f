use websift_core::EnrichedResult;

/// Render enriched results as one markdown document, the shape both the
/// web UI and the MCP tool hand back.
pub fn render_markdown(results: &[EnrichedResult]) -> String {
    let mut out = String::new();
    for r in results {
        out.push_str(&format!("## {}\n\n", r.title));
        out.push_str(&format!("**Link:** {}\n\n", r.url));
        if !r.snippet.is_empty() {
            out.push_str(&format!("**Snippet:** {}\n\n", r.snippet));
        }
        if let Some(summary) = &r.summary {
            out.push_str(&format!("**Summary:** {summary}\n\n"));
        }
        if let Some(reason) = &r.fetch_error {
            out.push_str(&format!("_Could not fetch this page: {reason}_\n\n"));
        } else {
            out.push_str("**Full Content:**\n\n");
            out.push_str(r.content.trim_end());
            out.push_str("\n\n");
        }
        out.push_str("---\n\n");
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use websift_core::SearchHit;

    fn hit() -> SearchHit {
        SearchHit {
            title: "Example".to_string(),
            url: "https://example.com/".to_string(),
            snippet: "a snippet".to_string(),
        }
    }

    #[test]
    fn renders_title_link_snippet_and_content() {
        let r = EnrichedResult::from_hit(&hit(), "# Example\n\nbody text\n".to_string());
        let md = render_markdown(&[r]);
        assert!(md.starts_with("## Example\n"));
        assert!(md.contains("**Link:** https://example.com/"));
        assert!(md.contains("**Snippet:** a snippet"));
        assert!(md.contains("**Full Content:**\n\n# Example\n\nbody text"));
        assert!(md.ends_with("---"));
    }

    #[test]
    fn renders_summary_when_present() {
        let mut r = EnrichedResult::from_hit(&hit(), "long content".to_string());
        r.summary = Some("the gist".to_string());
        let md = render_markdown(&[r]);
        assert!(md.contains("**Summary:** the gist"));
        assert!(md.contains("**Full Content:**"));
    }

    #[test]
    fn renders_fetch_failures_as_a_note_instead_of_content() {
        let r = EnrichedResult::degraded(&hit(), "HTTP 500".to_string());
        let md = render_markdown(&[r]);
        assert!(md.contains("_Could not fetch this page: HTTP 500_"));
        assert!(!md.contains("**Full Content:**"));
    }

    #[test]
    fn empty_input_renders_empty_document() {
        assert_eq!(render_markdown(&[]), "");
    }
}
