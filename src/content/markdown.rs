//! Markdown rendering with syntax highlighting and a table of contents

use std::collections::HashSet;

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

/// Paragraph text replaced by the rendered table of contents
const TOC_MARKER: &str = "[TOC]";

/// A heading collected for the table of contents
#[derive(Debug, Clone, PartialEq, Eq)]
struct TocEntry {
    level: u8,
    id: String,
    title: String,
}

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    line_numbers: bool,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::with_options("base16-ocean.dark", false)
    }

    /// Create with custom settings
    pub fn with_options(theme: &str, line_numbers: bool) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: theme.to_string(),
            line_numbers,
        }
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> String {
        // Fenced code blocks are part of CommonMark; the rest are opt-in
        let options = Options::ENABLE_TABLES | Options::ENABLE_HEADING_ATTRIBUTES;
        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();
        let mut code_block: Option<(Option<String>, String)> = None;

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => {
                            info.split_whitespace().next().map(str::to_string)
                        }
                        CodeBlockKind::Indented => None,
                    };
                    code_block = Some((lang, String::new()));
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((lang, code)) = code_block.take() {
                        let highlighted = self.highlight_code(&code, lang.as_deref());
                        events.push(Event::Html(CowStr::from(highlighted)));
                    }
                }
                Event::Text(text) => match code_block.as_mut() {
                    Some((_, code)) => code.push_str(&text),
                    None => events.push(Event::Text(text)),
                },
                _ => events.push(event),
            }
        }

        let toc = assign_heading_ids(&mut events);
        let events = replace_toc_marker(events, &toc);

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");

        // Try to find syntax for the language
        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next());

        let highlighted = theme.and_then(|theme| {
            highlighted_html_for_string(code, &self.syntax_set, syntax, theme).ok()
        });

        match highlighted {
            Some(highlighted) if self.line_numbers => {
                format!(
                    r#"<div class="codehilite">{}</div>"#,
                    self.add_line_numbers(&highlighted, lang)
                )
            }
            Some(highlighted) => format!(r#"<div class="codehilite">{}</div>"#, highlighted),
            None => {
                // Fallback to plain code block
                format!(
                    r#"<div class="codehilite"><pre><code class="language-{}">{}</code></pre></div>"#,
                    html_escape(lang),
                    html_escape(code)
                )
            }
        }
    }

    /// Add line numbers to highlighted code
    fn add_line_numbers(&self, code: &str, lang: &str) -> String {
        let lines: Vec<&str> = code.lines().collect();

        let gutter = (1..=lines.len())
            .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code">{}</td></tr></table></figure>"#,
            html_escape(lang),
            gutter,
            lines.join("\n")
        )
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Give every heading an id and return them in document order.
///
/// Explicit `{#id}` attributes are kept; other headings get a slug of their
/// text, suffixed with `_1`, `_2`, ... when already taken.
fn assign_heading_ids(events: &mut [Event]) -> Vec<TocEntry> {
    let mut used: HashSet<String> = events
        .iter()
        .filter_map(|event| match event {
            Event::Start(Tag::Heading { id: Some(id), .. }) => Some(id.to_string()),
            _ => None,
        })
        .collect();

    let mut toc = Vec::new();
    for i in 0..events.len() {
        let (level, explicit) = match &events[i] {
            Event::Start(Tag::Heading { level, id, .. }) => (*level, id.clone()),
            _ => continue,
        };

        let title = heading_text(&events[i + 1..]);
        let id = match explicit {
            Some(id) => id.to_string(),
            None => unique_id(&title, &mut used),
        };

        if let Event::Start(Tag::Heading { id: slot, .. }) = &mut events[i] {
            *slot = Some(CowStr::from(id.clone()));
        }

        toc.push(TocEntry {
            level: heading_depth(level),
            id,
            title,
        });
    }

    toc
}

/// Plain text of the heading that starts right before `events`
fn heading_text(events: &[Event]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::End(TagEnd::Heading(_)) => break,
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            _ => {}
        }
    }
    text.trim().to_string()
}

fn unique_id(title: &str, used: &mut HashSet<String>) -> String {
    let base = match slug::slugify(title) {
        s if s.is_empty() => "section".to_string(),
        s => s,
    };

    let mut candidate = base.clone();
    let mut n = 1;
    while used.contains(&candidate) {
        candidate = format!("{}_{}", base, n);
        n += 1;
    }
    used.insert(candidate.clone());
    candidate
}

fn heading_depth(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Replace paragraphs holding only the `[TOC]` marker with the rendered table
fn replace_toc_marker<'a>(events: Vec<Event<'a>>, toc: &[TocEntry]) -> Vec<Event<'a>> {
    let mut output = Vec::with_capacity(events.len());
    let mut i = 0;

    while i < events.len() {
        if let Event::Start(Tag::Paragraph) = events[i] {
            let close = events[i..]
                .iter()
                .position(|e| matches!(e, Event::End(TagEnd::Paragraph)))
                .map(|offset| i + offset);

            if let Some(close) = close {
                if is_toc_marker(&events[i + 1..close]) {
                    output.push(Event::Html(CowStr::from(render_toc(toc))));
                    i = close + 1;
                    continue;
                }
            }
        }

        output.push(events[i].clone());
        i += 1;
    }

    output
}

fn is_toc_marker(inner: &[Event]) -> bool {
    let mut text = String::new();
    for event in inner {
        match event {
            Event::Text(t) => text.push_str(t),
            _ => return false,
        }
    }
    text.trim() == TOC_MARKER
}

fn render_toc(toc: &[TocEntry]) -> String {
    let mut html = String::from("<div class=\"toc\">\n");
    let mut open: Vec<u8> = Vec::new();

    for entry in toc {
        while open.last().is_some_and(|&level| level > entry.level) {
            html.push_str("</li>\n</ul>\n");
            open.pop();
        }

        match open.last() {
            Some(&level) if level == entry.level => html.push_str("</li>\n"),
            _ => {
                html.push_str("<ul>\n");
                open.push(entry.level);
            }
        }

        html.push_str(&format!(
            "<li><a href=\"#{}\">{}</a>",
            html_escape(&entry.id),
            html_escape(&entry.title)
        ));
    }

    while open.pop().is_some() {
        html.push_str("</li>\n</ul>\n");
    }

    html.push_str("</div>\n");
    html
}

/// Simple HTML escaping
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
