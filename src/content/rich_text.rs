//! Prismic structured text and its plain-text / HTML renderings

use serde::{Deserialize, Serialize};

use crate::helpers::html_escape;

/// Structured text as delivered by the CMS: an ordered list of typed blocks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RichText(pub Vec<RichTextBlock>);

impl RichText {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn blocks(&self) -> &[RichTextBlock] {
        &self.0
    }
}

/// A single block (paragraph, heading, list item, image...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichTextBlock {
    #[serde(rename = "type")]
    pub kind: BlockKind,

    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub spans: Vec<Span>,

    /// Image source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Image alternative text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oembed: Option<Embed>,
}

impl RichTextBlock {
    /// A block with text and no spans
    pub fn new(kind: BlockKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            spans: Vec::new(),
            url: None,
            alt: None,
            oembed: None,
        }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(BlockKind::Paragraph, text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockKind {
    Paragraph,
    Heading1,
    Heading2,
    Heading3,
    Heading4,
    Heading5,
    Heading6,
    Preformatted,
    ListItem,
    OListItem,
    Image,
    Embed,
    #[serde(other)]
    Unknown,
}

impl BlockKind {
    fn tag(self) -> &'static str {
        match self {
            BlockKind::Heading1 => "h1",
            BlockKind::Heading2 => "h2",
            BlockKind::Heading3 => "h3",
            BlockKind::Heading4 => "h4",
            BlockKind::Heading5 => "h5",
            BlockKind::Heading6 => "h6",
            BlockKind::Preformatted => "pre",
            BlockKind::ListItem | BlockKind::OListItem => "li",
            _ => "p",
        }
    }
}

/// Inline formatting over a character range of a block's text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,

    #[serde(rename = "type")]
    pub kind: SpanKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<SpanData>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpanKind {
    Strong,
    Em,
    Hyperlink,
    Label,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpanData {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

/// oEmbed payload of an embed block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Embed {
    #[serde(default)]
    pub embed_url: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub provider_name: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
}

/// Converts rich text into the two forms the pages need
pub trait RichTextRenderer: Send + Sync {
    /// Plain text, used for word counting
    fn to_plain_text(&self, text: &RichText) -> String;

    /// Markup with every text run escaped, used for display
    fn to_safe_html(&self, text: &RichText) -> String;
}

/// Renderer following Prismic's own serialization rules
#[derive(Debug, Clone, Copy, Default)]
pub struct PrismicRichText;

impl RichTextRenderer for PrismicRichText {
    fn to_plain_text(&self, text: &RichText) -> String {
        as_text(text, " ")
    }

    fn to_safe_html(&self, text: &RichText) -> String {
        as_html(text)
    }
}

/// Join the text of every block with `separator`
pub fn as_text(text: &RichText, separator: &str) -> String {
    text.blocks()
        .iter()
        .map(|block| block.text.as_str())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Render blocks to HTML, grouping consecutive list items into lists
pub fn as_html(text: &RichText) -> String {
    let mut html = String::new();
    let mut open_list: Option<BlockKind> = None;

    for block in text.blocks() {
        let list_kind = match block.kind {
            BlockKind::ListItem | BlockKind::OListItem => Some(block.kind),
            _ => None,
        };

        if open_list != list_kind {
            if let Some(kind) = open_list {
                html.push_str(list_close(kind));
            }
            if let Some(kind) = list_kind {
                html.push_str(list_open(kind));
            }
            open_list = list_kind;
        }

        html.push_str(&render_block(block));
    }

    if let Some(kind) = open_list {
        html.push_str(list_close(kind));
    }

    html
}

fn list_open(kind: BlockKind) -> &'static str {
    if kind == BlockKind::OListItem {
        "<ol>"
    } else {
        "<ul>"
    }
}

fn list_close(kind: BlockKind) -> &'static str {
    if kind == BlockKind::OListItem {
        "</ol>"
    } else {
        "</ul>"
    }
}

fn render_block(block: &RichTextBlock) -> String {
    match block.kind {
        BlockKind::Image => {
            let src = block.url.as_deref().unwrap_or_default();
            let alt = block.alt.as_deref().unwrap_or_default();
            format!(
                r#"<p class="block-img"><img src="{}" alt="{}" /></p>"#,
                html_escape(src),
                html_escape(alt)
            )
        }
        BlockKind::Embed => match &block.oembed {
            // Provider markup is passed through untouched
            Some(embed) => format!(
                r#"<div data-oembed="{}" data-oembed-type="{}" data-oembed-provider="{}">{}</div>"#,
                html_escape(&embed.embed_url),
                html_escape(&embed.kind),
                html_escape(embed.provider_name.as_deref().unwrap_or_default()),
                embed.html.as_deref().unwrap_or_default()
            ),
            None => String::new(),
        },
        kind => {
            let tag = kind.tag();
            format!("<{tag}>{}</{tag}>", render_spans(&block.text, &block.spans))
        }
    }
}

/// Apply inline spans to `text`, escaping every character.
///
/// Offsets count UTF-16 code units, as the CMS computes them. Overlapping
/// spans are closed and reopened so the output stays well nested.
fn render_spans(text: &str, spans: &[Span]) -> String {
    let chars: Vec<char> = text.chars().collect();
    let offsets = utf16_offsets(&chars);

    let mut ordered: Vec<CharSpan> = spans
        .iter()
        .filter_map(|span| {
            let start = char_index(&offsets, span.start)?;
            let end = char_index(&offsets, span.end)?;
            (start < end).then_some(CharSpan { start, end, span })
        })
        .collect();
    ordered.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut html = String::with_capacity(text.len());
    let mut open: Vec<CharSpan> = Vec::new();
    let mut pending = ordered.into_iter().peekable();

    for i in 0..=chars.len() {
        let mut reopen = Vec::new();
        while open.iter().any(|s| s.end <= i) {
            if let Some(open_span) = open.pop() {
                html.push_str(close_tag(open_span.span));
                if open_span.end > i {
                    reopen.push(open_span);
                }
            }
        }
        for open_span in reopen.into_iter().rev() {
            html.push_str(&open_tag(open_span.span));
            open.push(open_span);
        }

        while let Some(open_span) = pending.next_if(|s| s.start == i) {
            html.push_str(&open_tag(open_span.span));
            open.push(open_span);
        }

        if let Some(&c) = chars.get(i) {
            match c {
                '\n' => html.push_str("<br />"),
                c => html.push_str(&html_escape(c.encode_utf8(&mut [0; 4]))),
            }
        }
    }

    html
}

/// A span with its bounds converted to character indices
#[derive(Clone, Copy)]
struct CharSpan<'a> {
    start: usize,
    end: usize,
    span: &'a Span,
}

/// UTF-16 offset of every character boundary, the text length included
fn utf16_offsets(chars: &[char]) -> Vec<usize> {
    let mut offsets = Vec::with_capacity(chars.len() + 1);
    let mut offset = 0;
    offsets.push(offset);
    for c in chars {
        offset += c.len_utf16();
        offsets.push(offset);
    }
    offsets
}

/// Character index of a UTF-16 offset. An offset inside a surrogate pair
/// snaps to the end of that character; offsets past the text are rejected.
fn char_index(offsets: &[usize], utf16: usize) -> Option<usize> {
    let index = offsets.partition_point(|&o| o < utf16);
    (index < offsets.len()).then_some(index)
}

fn open_tag(span: &Span) -> String {
    let data = span.data.clone().unwrap_or_default();
    match span.kind {
        SpanKind::Strong => "<strong>".to_string(),
        SpanKind::Em => "<em>".to_string(),
        SpanKind::Hyperlink => {
            let href = html_escape(data.url.as_deref().unwrap_or("#"));
            match data.target {
                Some(target) => format!(
                    r#"<a href="{}" target="{}" rel="noopener">"#,
                    href,
                    html_escape(&target)
                ),
                None => format!(r#"<a href="{}">"#, href),
            }
        }
        SpanKind::Label => format!(
            r#"<span class="{}">"#,
            html_escape(data.label.as_deref().unwrap_or_default())
        ),
        SpanKind::Unknown => "<span>".to_string(),
    }
}

fn close_tag(span: &Span) -> &'static str {
    match span.kind {
        SpanKind::Strong => "</strong>",
        SpanKind::Em => "</em>",
        SpanKind::Hyperlink => "</a>",
        SpanKind::Label | SpanKind::Unknown => "</span>",
    }
}
