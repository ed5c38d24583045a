//! Markdown rendering for display.

use chrono::{DateTime, Utc};
use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};
use serde::Serialize;

use super::{Message, MessageRole};

/// A message as sent to the page: raw text plus rendered HTML.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedMessage {
    pub role: MessageRole,
    pub content: String,
    /// `content` rendered as Markdown. Raw HTML in the source is escaped.
    pub html: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Message> for RenderedMessage {
    fn from(msg: &Message) -> Self {
        Self {
            role: msg.role,
            content: msg.content.clone(),
            html: markdown_to_html(&msg.content),
            created_at: msg.created_at,
        }
    }
}

/// Render Markdown to HTML that is safe to insert into the page.
///
/// Embedded HTML is emitted as text and links or images with a scheme other
/// than http, https, or mailto point nowhere.
pub fn markdown_to_html(input: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    let parser = Parser::new_ext(input, options).map(sanitize);
    let mut output = String::new();
    html::push_html(&mut output, parser);
    output
}

fn sanitize(event: Event<'_>) -> Event<'_> {
    match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        other => other,
    }
}

fn safe_url(url: CowStr<'_>) -> CowStr<'_> {
    let scheme = url
        .trim_start()
        .split_once(':')
        .map(|(scheme, _)| scheme.to_ascii_lowercase());

    match scheme.as_deref() {
        None | Some("http" | "https" | "mailto") => url,
        // A colon after a path, query, or fragment start is not a scheme.
        Some(s) if s.contains(['/', '?', '#']) => url,
        Some(_) => CowStr::Borrowed("#"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_common_markdown() {
        let html = markdown_to_html("# Title\n\n**bold** and `code`\n\n- one\n- two");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<strong>bold</strong>"));
        assert!(html.contains("<code>code</code>"));
        assert!(html.contains("<li>one</li>"));
    }

    #[test]
    fn test_fenced_code_block() {
        let html = markdown_to_html("```rust\nfn main() {}\n```");
        assert!(html.contains("<pre><code class=\"language-rust\">"));
    }

    #[test]
    fn test_raw_html_is_escaped() {
        let html = markdown_to_html("<script>alert(1)</script>\n\nhi <b onclick=\"x()\">there</b>");
        assert!(!html.contains("<script>"));
        assert!(!html.contains("<b "));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_unsafe_link_schemes_are_neutralized() {
        let html = markdown_to_html("[x](javascript:alert(1)) [y](https://example.com) [z](/docs/a:b)");
        assert!(!html.contains("javascript:"));
        assert!(html.contains("href=\"#\""));
        assert!(html.contains("href=\"https://example.com\""));
        assert!(html.contains("href=\"/docs/a:b\""));
    }

    #[test]
    fn test_rendered_message_keeps_raw_text() {
        let msg = Message::assistant("*hi*");
        let rendered = RenderedMessage::from(&msg);
        assert_eq!(rendered.role, MessageRole::Assistant);
        assert_eq!(rendered.content, "*hi*");
        assert_eq!(rendered.html.trim(), "<p><em>hi</em></p>");
        assert_eq!(rendered.created_at, msg.created_at);
    }
}
