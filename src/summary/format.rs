use regex::Regex;
use std::sync::OnceLock;

pub const NO_SUMMARY: &str = "<p>요약 정보가 없습니다.</p>";

struct Patterns {
    h4: Regex,
    h5: Regex,
    h6: Regex,
    list_item: Regex,
    strong: Regex,
    wrapped_item: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let compile = |pattern: &str| Regex::new(pattern).expect("summary pattern is valid");
        // CRLF mode: `.` stops at \r as well as \n, and `$` matches before either.
        Patterns {
            h4: compile(r"(?mR)^#\s+(.+)$"),
            h5: compile(r"(?mR)^##\s+(.+)$"),
            h6: compile(r"(?mR)^###\s+(.+)$"),
            list_item: compile(r"(?mR)^-\s+(.+)$"),
            strong: compile(r"(?R)\*\*(.+?)\*\*"),
            wrapped_item: compile(r"(?R)<li>(.+?)</li>"),
        }
    })
}

/// Turns a markdown-ish summary into the small markup vocabulary the result
/// panel understands (`p h4 h5 h6 ul li strong`).
///
/// This is a fixed sequence of substitutions, not a markdown parser. The
/// order matters: the `#` heading rule runs first and its `\s+` may cross a
/// newline, so `"#\n## x"` becomes a level-4 heading containing `"## x"`.
/// List items are wrapped in `<ul>` one by one, and only when the text had no
/// `<ul>` before the wrapping pass.
pub fn format_summary(summary: Option<&str>) -> String {
    let text = match summary {
        Some(text) if !text.is_empty() => text,
        _ => return NO_SUMMARY.to_string(),
    };
    let p = patterns();

    let formatted = p.h4.replace_all(text, "<h4>${1}</h4>").into_owned();
    let formatted = p.h5.replace_all(&formatted, "<h5>${1}</h5>").into_owned();
    let formatted = p.h6.replace_all(&formatted, "<h6>${1}</h6>").into_owned();
    let formatted = p.list_item.replace_all(&formatted, "<li>${1}</li>").into_owned();
    let formatted = formatted.replace("\n\n", "</p><p>");
    let formatted = p.strong.replace_all(&formatted, "<strong>${1}</strong>").into_owned();

    let formatted = if formatted.contains("<ul>") {
        formatted
    } else {
        p.wrapped_item.replace_all(&formatted, "<ul>${0}</ul>").into_owned()
    };

    format!("<p>{}</p>", formatted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_or_absent_summary_gives_placeholder() {
        assert_eq!(format_summary(None), NO_SUMMARY);
        assert_eq!(format_summary(Some("")), NO_SUMMARY);
    }

    #[test]
    fn heading_and_list_item() {
        assert_eq!(
            format_summary(Some("# Title\n- item")),
            "<p><h4>Title</h4>\n<ul><li>item</li></ul></p>"
        );
    }

    #[test]
    fn three_heading_weights() {
        assert_eq!(
            format_summary(Some("# One\n## Two\n### Three")),
            "<p><h4>One</h4>\n<h5>Two</h5>\n<h6>Three</h6></p>"
        );
    }

    #[test]
    fn first_heading_rule_can_swallow_the_next_line() {
        assert_eq!(format_summary(Some("#\n## Sub")), "<p><h4>## Sub</h4></p>");
    }

    #[test]
    fn each_list_item_is_wrapped_separately() {
        assert_eq!(
            format_summary(Some("- a\n- b")),
            "<p><ul><li>a</li></ul>\n<ul><li>b</li></ul></p>"
        );
    }

    #[test]
    fn existing_list_container_disables_wrapping() {
        assert_eq!(
            format_summary(Some("<ul>\n- a")),
            "<p><ul>\n<li>a</li></p>"
        );
    }

    #[test]
    fn paragraphs_and_bold() {
        assert_eq!(
            format_summary(Some("intro\n\n**Key** point")),
            "<p>intro</p><p><strong>Key</strong> point</p>"
        );
    }

    #[test]
    fn bold_inside_list_item() {
        assert_eq!(
            format_summary(Some("- **Controllers**: 3")),
            "<p><ul><li><strong>Controllers</strong>: 3</li></ul></p>"
        );
    }

    #[test]
    fn markers_without_space_are_left_alone() {
        assert_eq!(format_summary(Some("-item\n#tag")), "<p>-item\n#tag</p>");
    }

    #[test]
    fn carriage_returns_stay_outside_tags() {
        assert_eq!(
            format_summary(Some("# Title\r\n- item")),
            "<p><h4>Title</h4>\r\n<ul><li>item</li></ul></p>"
        );
    }
}
