//! Renders a classified change record into one changelog bullet line.

use regex_lite::Regex;

use crate::models::{ChangeRecord, RenderedEntry};

/// Render one record into its literal changelog line.
///
/// Description preference order:
/// 1. An explicit changelog excerpt in the PR body: a heading containing
///    the word "changelog" (any case), followed by content up to the next
///    heading or end of text, used verbatim after trimming.
/// 2. The PR title, with any conventional-commit prefix (`feat:`, `fix:`,
///    ...) and any leading `**bold**` template remnant stripped.
/// 3. If nothing usable survives, the whole-line fallback
///    `PR #<id> (<url>)`, which embeds the link and skips the suffix.
pub fn render(record: &ChangeRecord) -> RenderedEntry {
    if let Some(excerpt) = changelog_excerpt(&record.body) {
        return RenderedEntry {
            id: record.id,
            line: format!("{} ([#{}]({}))", excerpt, record.id, record.url),
        };
    }

    let title = cleaned_title(&record.title);
    let line = if title.is_empty() {
        format!("PR #{} ({})", record.id, record.url)
    } else {
        format!("{} ([#{}]({}))", title, record.id, record.url)
    };

    RenderedEntry {
        id: record.id,
        line,
    }
}

/// Extract the explicit changelog excerpt from a PR body, if present.
///
/// The excerpt is everything between a heading whose text contains the
/// word "changelog" and the next heading (or end of body).
fn changelog_excerpt(body: &str) -> Option<String> {
    let lines: Vec<&str> = body.lines().collect();
    let heading = lines.iter().position(|line| {
        let line = line.trim_start();
        line.starts_with('#') && line.to_lowercase().contains("changelog")
    })?;

    let content: Vec<&str> = lines[heading + 1..]
        .iter()
        .take_while(|line| !line.trim_start().starts_with('#'))
        .copied()
        .collect();

    let content = content.join("\n").trim().to_string();
    if content.is_empty() {
        None
    } else {
        Some(content)
    }
}

/// Strip conventional-commit prefixes and bold template remnants from a title.
fn cleaned_title(title: &str) -> String {
    let prefix = Regex::new(r"(?i)^(feat|fix|docs|style|refactor|perf|test|chore)(\(.*?\))?!?:\s*")
        .unwrap_or_else(|e| unreachable!("invalid prefix pattern: {e}"));
    let bold = Regex::new(r"^\*\*.*?\*\*\s*")
        .unwrap_or_else(|e| unreachable!("invalid bold pattern: {e}"));

    let title = title.trim();
    let title = prefix.replace(title, "");
    let title = bold.replace(&title, "");
    title.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64, title: &str, body: &str) -> ChangeRecord {
        ChangeRecord {
            id,
            title: title.to_string(),
            body: body.to_string(),
            labels: vec![],
            url: format!("https://github.com/acme/widget/pull/{}", id),
        }
    }

    #[test]
    fn test_title_with_conventional_prefix() {
        let entry = render(&record(42, "feat: add cache eviction", ""));
        assert_eq!(
            entry.line,
            "add cache eviction ([#42](https://github.com/acme/widget/pull/42))"
        );
    }

    #[test]
    fn test_scoped_prefix_is_stripped() {
        let entry = render(&record(7, "fix(parser): handle empty input", ""));
        assert!(entry.line.starts_with("handle empty input ([#7]("));
    }

    #[test]
    fn test_bold_template_remnant_is_stripped() {
        let entry = render(&record(9, "**Description** improve error messages", ""));
        assert!(entry.line.starts_with("improve error messages ([#9]("));
    }

    #[test]
    fn test_excerpt_wins_over_title() {
        let body = "Long description here.\n\n## Changelog\nImproves latency by 3x\n## Notes\nother stuff";
        let entry = render(&record(13, "perf: rework hot loop", body));
        assert_eq!(
            entry.line,
            "Improves latency by 3x ([#13](https://github.com/acme/widget/pull/13))"
        );
    }

    #[test]
    fn test_excerpt_at_end_of_body() {
        let body = "## Changelog\nAdds a streaming decoder";
        let entry = render(&record(5, "title", body));
        assert!(entry.line.starts_with("Adds a streaming decoder ([#5]("));
    }

    #[test]
    fn test_empty_excerpt_falls_back_to_title() {
        let body = "## Changelog\n\n## Notes\ndetails";
        let entry = render(&record(8, "docs: clarify readme", body));
        assert!(entry.line.starts_with("clarify readme ([#8]("));
    }

    #[test]
    fn test_whole_line_fallback_when_title_empties_out() {
        let entry = render(&record(3, "chore: ", ""));
        assert_eq!(
            entry.line,
            "PR #3 (https://github.com/acme/widget/pull/3)"
        );
    }

    #[test]
    fn test_plain_title_unchanged() {
        let entry = render(&record(11, "Support TLS 1.3", ""));
        assert_eq!(
            entry.line,
            "Support TLS 1.3 ([#11](https://github.com/acme/widget/pull/11))"
        );
    }
}
