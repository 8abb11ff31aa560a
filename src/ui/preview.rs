//! Styled rendering of episode digests.
//!
//! Digests are markdown produced by `crate::digest`. The list shows a short,
//! compact preview: no blank lines between blocks, links reduced to their
//! label, and images to a placeholder.

use crate::theme::StyleMap;
use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use ratatui::text::{Line, Span};

const ELLIPSIS: &str = "…";

/// Convert a digest to at most `max_lines` styled lines.
///
/// When the digest is cut short, the last kept line ends with an ellipsis.
pub fn render_digest(md: &str, theme: &StyleMap, max_lines: usize) -> Vec<Line<'static>> {
    if max_lines == 0 || md.trim().is_empty() {
        return Vec::new();
    }

    let body = theme.resolve("digest_body");
    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut spans: Vec<Span<'static>> = Vec::with_capacity(4);

    let mut heading = false;
    let mut strong = false;
    let mut emphasis = false;
    let mut link = false;
    let mut code_block = false;
    let mut quote_depth = 0usize;
    let mut image_alt: Option<String> = None;
    // Counters for open lists; `None` for bullets
    let mut lists: Vec<Option<u64>> = Vec::new();

    let flush = |spans: &mut Vec<Span<'static>>, lines: &mut Vec<Line<'static>>| {
        if !spans.is_empty() {
            lines.push(Line::from(std::mem::take(spans)));
        }
    };

    for event in Parser::new(md) {
        if lines.len() > max_lines {
            break;
        }
        match event {
            Event::Start(Tag::Heading { .. }) => heading = true,
            Event::End(TagEnd::Heading { .. }) => {
                heading = false;
                flush(&mut spans, &mut lines);
            }
            Event::Start(Tag::Paragraph) => {
                if quote_depth > 0 && spans.is_empty() {
                    spans.push(Span::styled("│ ", theme.resolve("digest_quote")));
                }
            }
            Event::End(TagEnd::Paragraph) => flush(&mut spans, &mut lines),
            Event::Start(Tag::BlockQuote { .. }) => quote_depth += 1,
            Event::End(TagEnd::BlockQuote { .. }) => {
                quote_depth = quote_depth.saturating_sub(1);
            }
            Event::Start(Tag::CodeBlock(_)) => code_block = true,
            Event::End(TagEnd::CodeBlock) => code_block = false,
            Event::Start(Tag::List(start)) => {
                flush(&mut spans, &mut lines);
                lists.push(start);
            }
            Event::End(TagEnd::List(_)) => {
                lists.pop();
            }
            Event::Start(Tag::Item) => {
                flush(&mut spans, &mut lines);
                let indent = "  ".repeat(lists.len().saturating_sub(1));
                let marker = match lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{}{}. ", indent, n);
                        *n += 1;
                        marker
                    }
                    _ => format!("{}• ", indent),
                };
                spans.push(Span::styled(marker, body));
            }
            Event::End(TagEnd::Item) => flush(&mut spans, &mut lines),
            Event::Start(Tag::Strong) => strong = true,
            Event::End(TagEnd::Strong) => strong = false,
            Event::Start(Tag::Emphasis) => emphasis = true,
            Event::End(TagEnd::Emphasis) => emphasis = false,
            Event::Start(Tag::Link { .. }) => link = true,
            Event::End(TagEnd::Link) => link = false,
            Event::Start(Tag::Image { .. }) => image_alt = Some(String::new()),
            Event::End(TagEnd::Image) => {
                let alt = image_alt.take().unwrap_or_default();
                let label = if alt.is_empty() {
                    "[Image]".to_string()
                } else {
                    format!("[Image: {}]", alt)
                };
                spans.push(Span::styled(label, theme.resolve("digest_image")));
            }
            Event::Text(text) => {
                if let Some(alt) = image_alt.as_mut() {
                    alt.push_str(&text);
                    continue;
                }
                if code_block {
                    // One line per source line
                    for code_line in text.lines() {
                        lines.push(Line::from(Span::styled(
                            code_line.to_string(),
                            theme.resolve("digest_code"),
                        )));
                    }
                    continue;
                }
                let style = if heading {
                    theme.resolve("digest_heading")
                } else if link {
                    theme.resolve("digest_link")
                } else if quote_depth > 0 {
                    theme.resolve("digest_quote")
                } else if strong {
                    theme.resolve("digest_strong")
                } else if emphasis {
                    theme.resolve("digest_emphasis")
                } else {
                    body
                };
                let style = if strong && emphasis {
                    style.patch(theme.resolve("digest_emphasis"))
                } else {
                    style
                };
                spans.push(Span::styled(text.into_string(), style));
            }
            Event::Code(code) => {
                spans.push(Span::styled(code.into_string(), theme.resolve("digest_code")));
            }
            Event::SoftBreak => spans.push(Span::styled(" ", body)),
            Event::HardBreak => flush(&mut spans, &mut lines),
            Event::Rule => {
                flush(&mut spans, &mut lines);
                lines.push(Line::from(Span::styled("───", theme.resolve("digest_quote"))));
            }
            _ => {}
        }
    }
    flush(&mut spans, &mut lines);

    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            let style = last.spans.last().map(|s| s.style).unwrap_or_default();
            last.spans.push(Span::styled(ELLIPSIS, style));
        }
    }
    lines
}
