//! HTML to plain text extraction

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Node, Selector};

static BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("body").expect("valid selector"));

/// Elements whose text never reaches the reader
const HIDDEN: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Elements that end a line of text
const BLOCKS: &[&str] = &[
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "li", "tr", "section", "article", "header",
    "footer", "blockquote", "pre", "br", "ul", "ol", "table",
];

/// Table cells and list-like elements separated by a space
const CELLS: &[&str] = &["td", "th", "dt", "dd"];

/// Extract the visible text of an HTML document.
///
/// Only the `<body>` is kept when one is present. Entities are decoded by the
/// parser, and block-level elements become line breaks so paragraphs stay
/// separated.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let root = document
        .select(&BODY)
        .next()
        .unwrap_or_else(|| document.root_element());

    let mut raw = String::new();
    collect_text(root, &mut raw);

    raw.lines()
        .map(compact_ws)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                let Some(child) = ElementRef::wrap(child) else {
                    continue;
                };
                let name = child.value().name();
                if HIDDEN.contains(&name) {
                    continue;
                }

                collect_text(child, out);

                if BLOCKS.contains(&name) {
                    out.push('\n');
                } else if CELLS.contains(&name) {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}

fn compact_ws(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_scripts_and_tags() {
        let html = r#"
            <html><head><title>T</title><style>p { color: red; }</style></head>
            <body>
                <h1>Title</h1>
                <script>var x = 1;</script>
                <p>First <b>bold</b> paragraph.</p>
                <p>Second paragraph.</p>
            </body></html>
        "#;

        let text = html_to_text(html);

        assert!(text.contains("Title"));
        assert!(text.contains("First bold paragraph."));
        assert!(text.contains("Second paragraph."));
        assert!(!text.contains("var x"));
        assert!(!text.contains("color: red"));
        assert!(!text.contains('<'));
    }

    #[test]
    fn test_paragraphs_on_separate_lines() {
        let text = html_to_text("<body><p>One</p><p>Two</p></body>");
        assert_eq!(text, "One\nTwo");
    }

    #[test]
    fn test_decodes_entities() {
        let text = html_to_text("<p>Fish &amp; chips &lt;3&nbsp;today</p>");
        assert_eq!(text, "Fish & chips <3 today");
    }

    #[test]
    fn test_decodes_accented_and_numeric_entities() {
        let text = html_to_text(
            "<body><p>Informa&ccedil;&atilde;o &#8212; caf&eacute; &#x27;ok&#x27;</p></body>",
        );
        assert_eq!(text, "Informação — café 'ok'");
    }

    #[test]
    fn test_comments_and_noscript_dropped() {
        let text = html_to_text("<body><!-- hidden --><noscript>enable js</noscript><p>shown</p></body>");
        assert_eq!(text, "shown");
    }

    #[test]
    fn test_table_cells_stay_apart() {
        let text = html_to_text("<table><tr><td>a</td><td>b</td></tr><tr><td>c</td></tr></table>");
        assert_eq!(text, "a b\nc");
    }

    #[test]
    fn test_plain_fragment_without_body() {
        assert_eq!(html_to_text("just text"), "just text");
    }
}
