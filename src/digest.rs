//! HTML description to Markdown-like digest.
//!
//! Episode descriptions arrive as arbitrary HTML. The digest keeps the
//! structure a compact preview can show (paragraphs, headings, emphasis,
//! lists, quotes, links) and drops everything else. Anchors become
//! `[label](href)` where the label is the anchor's `title` attribute, or its
//! visible text when there is no title.

use scraper::{ElementRef, Html, Node};

/// Convert an HTML description to a digest. Absent or empty input yields an
/// empty string.
pub fn to_digest(html: Option<&str>) -> String {
    let Some(html) = html.filter(|h| !h.trim().is_empty()) else {
        return String::new();
    };

    let fragment = Html::parse_fragment(html);
    let raw = convert_children(fragment.root_element());
    normalize(&raw)
}

// ============================================================================
// Tree walk
// ============================================================================

fn convert_children(el: ElementRef<'_>) -> String {
    let mut out = String::new();
    for child in el.children() {
        match child.value() {
            Node::Text(text) => {
                let text = escape_inline(&collapse_whitespace(text));
                if at_line_start(&out) {
                    let body = text.trim_start();
                    out.push_str(&text[..text.len() - body.len()]);
                    out.push_str(&escape_block_start(body));
                } else {
                    out.push_str(&text);
                }
            }
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    out.push_str(&convert_element(child_el));
                }
            }
            _ => {}
        }
    }
    out
}

fn convert_element(el: ElementRef<'_>) -> String {
    let name = el.value().name();
    match name {
        "script" | "style" | "head" | "title" | "noscript" | "iframe" | "template" => {
            String::new()
        }
        "p" | "div" | "section" | "article" | "header" | "footer" | "main" | "aside"
        | "figure" | "figcaption" | "table" | "tr" | "dl" | "dt" | "dd" | "details"
        | "summary" => block(convert_children(el).trim()),
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = name[1..].parse::<usize>().unwrap_or(1);
            let text = single_line(&convert_children(el));
            if text.is_empty() {
                String::new()
            } else {
                block(&format!("{} {}", "#".repeat(level), text))
            }
        }
        "br" => "\\\n".to_string(),
        "hr" => block("* * *"),
        "strong" | "b" => wrap_inline(&convert_children(el), "**"),
        "em" | "i" => wrap_inline(&convert_children(el), "_"),
        "code" | "kbd" | "samp" => {
            let code = collapse_whitespace(&el.text().collect::<String>());
            let code = code.trim();
            if code.is_empty() {
                String::new()
            } else {
                format!("`{}`", code.replace('`', "'"))
            }
        }
        "pre" => {
            let code = el.text().collect::<String>();
            let code = code.trim_matches('\n');
            if code.trim().is_empty() {
                String::new()
            } else {
                block(&format!("```\n{}\n```", code))
            }
        }
        "a" => convert_anchor(el),
        "img" => convert_image(el),
        "ul" | "ol" => convert_list(el, name == "ol"),
        "blockquote" => {
            let inner = normalize(&convert_children(el));
            if inner.is_empty() {
                return String::new();
            }
            let quoted: Vec<String> = inner
                .lines()
                .map(|line| {
                    if line.is_empty() {
                        ">".to_string()
                    } else {
                        format!("> {}", line)
                    }
                })
                .collect();
            block(&quoted.join("\n"))
        }
        _ => convert_children(el),
    }
}

fn convert_anchor(el: ElementRef<'_>) -> String {
    let title = el
        .value()
        .attr("title")
        .map(|t| collapse_whitespace(t).trim().to_string())
        .filter(|t| !t.is_empty());

    let label = match title {
        Some(title) => escape_inline(&title),
        None => single_line(&convert_children(el)),
    };
    if label.is_empty() {
        return String::new();
    }

    match el.value().attr("href").map(str::trim).filter(|h| !h.is_empty()) {
        Some(href) if href.contains([' ', '(', ')']) => format!("[{}](<{}>)", label, href),
        Some(href) => format!("[{}]({})", label, href),
        None => label,
    }
}

fn convert_image(el: ElementRef<'_>) -> String {
    let Some(src) = el.value().attr("src").map(str::trim).filter(|s| !s.is_empty()) else {
        return String::new();
    };
    let alt = el
        .value()
        .attr("alt")
        .map(|a| escape_inline(collapse_whitespace(a).trim()))
        .unwrap_or_default();
    format!("![{}]({})", alt, src)
}

fn convert_list(el: ElementRef<'_>, ordered: bool) -> String {
    let mut number = el
        .value()
        .attr("start")
        .and_then(|s| s.trim().parse::<usize>().ok())
        .unwrap_or(1);

    let mut items = Vec::new();
    for item in el.children().filter_map(ElementRef::wrap) {
        if item.value().name() != "li" {
            continue;
        }
        let body = normalize(&convert_children(item));
        let marker = if ordered {
            let m = format!("{}. ", number);
            number += 1;
            m
        } else {
            "- ".to_string()
        };
        // Continuation lines sit under the item text so nested lists nest
        let indent = " ".repeat(marker.len());
        let mut entry = marker;
        for (i, line) in body.lines().filter(|l| !l.trim().is_empty()).enumerate() {
            if i > 0 {
                entry.push('\n');
                entry.push_str(&indent);
            }
            entry.push_str(line);
        }
        items.push(entry);
    }

    if items.is_empty() {
        String::new()
    } else {
        block(&items.join("\n"))
    }
}

// ============================================================================
// Text helpers
// ============================================================================

fn block(content: &str) -> String {
    if content.is_empty() {
        String::new()
    } else {
        format!("\n\n{}\n\n", content)
    }
}

/// Wrap inline content in a delimiter, keeping surrounding spaces outside so
/// the Markdown stays valid (`** x**` is not bold).
fn wrap_inline(content: &str, delimiter: &str) -> String {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return content.to_string();
    }
    let lead = if content.starts_with(char::is_whitespace) { " " } else { "" };
    let trail = if content.ends_with(char::is_whitespace) { " " } else { "" };
    format!("{}{}{}{}{}", lead, delimiter, trimmed, delimiter, trail)
}

fn single_line(content: &str) -> String {
    collapse_whitespace(&content.replace("\\\n", " "))
        .trim()
        .to_string()
}

/// Collapse runs of HTML whitespace into a single space.
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

fn escape_inline(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '*' | '_' | '`' | '[' | ']' | '<' | '&') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// True when text pushed next would begin a Markdown line.
fn at_line_start(out: &str) -> bool {
    let rest = out.trim_end_matches(' ');
    rest.is_empty() || rest.ends_with('\n')
}

/// Escape characters that would turn the start of a line into a heading,
/// quote, list item, rule, fence or setext underline.
fn escape_block_start(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some('#') | Some('>') | Some('=') => format!("\\{}", text),
        Some('-') if chars.next().map_or(true, |c| c == '-' || c.is_whitespace()) => {
            format!("\\{}", text)
        }
        Some('+') if chars.next().map_or(true, char::is_whitespace) => format!("\\{}", text),
        Some('~') if text.starts_with("~~~") => format!("\\{}", text),
        Some(c) if c.is_ascii_digit() => {
            let digits = text.chars().take_while(char::is_ascii_digit).count();
            let rest = &text[digits..];
            if matches!(rest, "." | ")") || rest.starts_with(". ") || rest.starts_with(") ") {
                format!("{}\\{}", &text[..digits], rest)
            } else {
                text.to_string()
            }
        }
        _ => text.to_string(),
    }
}

/// Trim lines, collapse inner space runs, drop blank runs longer than one
/// line, and trim the result. Lines inside code fences are kept verbatim
/// apart from trailing whitespace, and nested list items keep their indent.
fn normalize(raw: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut in_fence = false;
    let mut blank_run = 0;

    for line in raw.lines() {
        if line.trim() == "```" {
            in_fence = !in_fence;
            lines.push("```".to_string());
            blank_run = 0;
            continue;
        }
        if in_fence {
            lines.push(line.trim_end().to_string());
            continue;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        let indent = " ".repeat(list_indent(line));
        lines.push(format!("{}{}", indent, collapse_whitespace(trimmed)));
    }

    lines.join("\n").trim_matches('\n').to_string()
}

/// Leading spaces before a list marker. Markers that came from text are
/// escaped, so an unescaped one was emitted by `convert_list`.
fn list_indent(line: &str) -> usize {
    let body = line.trim_start_matches(' ');
    let digits = body.chars().take_while(char::is_ascii_digit).count();
    if body.starts_with("- ") || (digits > 0 && body[digits..].starts_with(". ")) {
        line.len() - body.len()
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_input() {
        assert_eq!(to_digest(None), "");
        assert_eq!(to_digest(Some("")), "");
        assert_eq!(to_digest(Some("   \n ")), "");
    }

    #[test]
    fn test_plain_text_passes_through() {
        assert_eq!(to_digest(Some("Just text")), "Just text");
    }

    #[test]
    fn test_anchor_prefers_title_attribute() {
        let html = "<p>Hi <a href='x' title='Site'>there</a></p>";
        assert_eq!(to_digest(Some(html)), "Hi [Site](x)");
    }

    #[test]
    fn test_anchor_uses_text_without_title() {
        let html = r#"<p>See <a href="https://example.com">the show notes</a>.</p>"#;
        assert_eq!(
            to_digest(Some(html)),
            "See [the show notes](https://example.com)."
        );
    }

    #[test]
    fn test_anchor_without_label_is_dropped() {
        let html = r#"<p>Empty <a href="https://example.com"></a>link</p>"#;
        assert_eq!(to_digest(Some(html)), "Empty link");
    }

    #[test]
    fn test_paragraphs_and_headings() {
        let html = "<h2>Episode 12</h2><p>First   line</p>\n\n<p>Second</p>";
        assert_eq!(
            to_digest(Some(html)),
            "## Episode 12\n\nFirst line\n\nSecond"
        );
    }

    #[test]
    fn test_emphasis() {
        let html = "<p>This is <strong>bold</strong> and <em> italic </em>.</p>";
        assert_eq!(to_digest(Some(html)), "This is **bold** and _italic_ .");
    }

    #[test]
    fn test_lists() {
        let html = "<ul><li>one</li><li>two</li></ul><ol start=\"3\"><li>three</li></ol>";
        assert_eq!(to_digest(Some(html)), "- one\n- two\n\n3. three");
    }

    #[test]
    fn test_line_breaks_and_quotes() {
        let html = "<p>a<br>b</p><blockquote><p>quoted</p></blockquote>";
        assert_eq!(to_digest(Some(html)), "a\\\nb\n\n> quoted");
    }

    #[test]
    fn test_scripts_and_styles_dropped() {
        let html = "<style>p{color:red}</style><p>kept</p><script>alert(1)</script>";
        assert_eq!(to_digest(Some(html)), "kept");
    }

    #[test]
    fn test_entities_decoded_and_markdown_escaped() {
        let html = "<p>Tom &amp; Jerry *not bold* [x]</p>";
        assert_eq!(
            to_digest(Some(html)),
            "Tom \\& Jerry \\*not bold\\* \\[x\\]"
        );
    }

    #[test]
    fn test_block_start_escaped() {
        assert_eq!(to_digest(Some("<p># not a heading</p>")), "\\# not a heading");
        assert_eq!(to_digest(Some("<p>1. not a list</p>")), "1\\. not a list");
        assert_eq!(to_digest(Some("<p>- dash</p>")), "\\- dash");
    }

    #[test]
    fn test_angle_brackets_and_ampersands_escaped() {
        assert_eq!(
            to_digest(Some("<p>Use &lt;Vec&gt; here</p>")),
            "Use \\<Vec> here"
        );
        assert_eq!(
            to_digest(Some("<p>AT&amp;amp;T &amp;copy; 2024</p>")),
            "AT\\&amp;T \\&copy; 2024"
        );
    }

    #[test]
    fn test_line_starts_after_breaks_escaped() {
        let html = "<p>Intro<br># 5 things<br>- not a list</p>";
        assert_eq!(
            to_digest(Some(html)),
            "Intro\\\n\\# 5 things\\\n\\- not a list"
        );
        assert_eq!(to_digest(Some("<p>Title<br>===</p>")), "Title\\\n\\===");
        assert_eq!(to_digest(Some("<p>a<br>---</p>")), "a\\\n\\---");
    }

    #[test]
    fn test_list_item_starts_escaped() {
        let html = "<ul><li># tag</li><li>1. x</li></ul>";
        assert_eq!(to_digest(Some(html)), "- \\# tag\n- 1\\. x");
    }

    #[test]
    fn test_wrapped_list_keeps_markers() {
        let html = "<div><ul><li>x</li></ul></div>";
        assert_eq!(to_digest(Some(html)), "- x");
    }

    #[test]
    fn test_nested_lists_indent() {
        let html = "<ul><li>a<ul><li>b</li></ul></li><li>c</li></ul>";
        assert_eq!(to_digest(Some(html)), "- a\n  - b\n- c");
        let html = "<ol><li>a<ol><li>b</li></ol></li></ol>";
        assert_eq!(to_digest(Some(html)), "1. a\n   1. b");
    }

    #[test]
    fn test_image_keeps_alt() {
        let html = r#"<p><img src="cover.png" alt="Cover art"></p>"#;
        assert_eq!(to_digest(Some(html)), "![Cover art](cover.png)");
        assert_eq!(to_digest(Some("<img alt=\"no src\">")), "");
    }

    #[test]
    fn test_pre_keeps_indentation() {
        let html = "<pre>fn main() {\n    run();\n}</pre>";
        assert_eq!(
            to_digest(Some(html)),
            "```\nfn main() {\n    run();\n}\n```"
        );
    }
}
