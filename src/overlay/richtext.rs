//! Structured rich-text model used while a page is in edit mode.
//!
//! Page markup is parsed into ordered segments: opaque markup (tags,
//! comments, `<style>` blocks) and styled text runs. Inline formatting tags
//! (`<b>`, `<strong>`, `<em>`, `<sub>`, ...) are folded into the run styles,
//! so formatting commands work the same on generated and edited markup.
//! Offsets in a [`Selection`] count characters of the visible text only,
//! as returned by [`RichText::plain_text`].

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

const BLOCK_TAGS: [&str; 13] = [
    "p", "div", "td", "th", "li", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "header",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum InlineStyle {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Subscript,
    Superscript,
}

impl InlineStyle {
    const ALL: [InlineStyle; 6] = [
        InlineStyle::Bold,
        InlineStyle::Italic,
        InlineStyle::Underline,
        InlineStyle::Strikethrough,
        InlineStyle::Subscript,
        InlineStyle::Superscript,
    ];

    fn from_tag(name: &str) -> Option<Self> {
        match name {
            "b" | "strong" => Some(InlineStyle::Bold),
            "i" | "em" => Some(InlineStyle::Italic),
            "u" | "ins" => Some(InlineStyle::Underline),
            "s" | "strike" | "del" => Some(InlineStyle::Strikethrough),
            "sub" => Some(InlineStyle::Subscript),
            "sup" => Some(InlineStyle::Superscript),
            _ => None,
        }
    }

    /// Tag emitted when serializing.
    fn tag(&self) -> &'static str {
        match self {
            InlineStyle::Bold => "strong",
            InlineStyle::Italic => "em",
            InlineStyle::Underline => "u",
            InlineStyle::Strikethrough => "s",
            InlineStyle::Subscript => "sub",
            InlineStyle::Superscript => "sup",
        }
    }

    fn index(&self) -> usize {
        match self {
            InlineStyle::Bold => 0,
            InlineStyle::Italic => 1,
            InlineStyle::Underline => 2,
            InlineStyle::Strikethrough => 3,
            InlineStyle::Subscript => 4,
            InlineStyle::Superscript => 5,
        }
    }
}

/// Character formatting of one text run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Style {
    flags: [bool; 6],
}

impl Style {
    pub fn has(&self, style: InlineStyle) -> bool {
        self.flags[style.index()]
    }

    /// Subscript and superscript exclude each other.
    pub fn set(&mut self, style: InlineStyle, on: bool) {
        self.flags[style.index()] = on;
        if on {
            match style {
                InlineStyle::Subscript => self.flags[InlineStyle::Superscript.index()] = false,
                InlineStyle::Superscript => self.flags[InlineStyle::Subscript.index()] = false,
                _ => {}
            }
        }
    }

    fn from_depths(depths: &[usize; 6]) -> Self {
        let mut style = Style::default();
        for inline in InlineStyle::ALL {
            if depths[inline.index()] > 0 {
                style.set(inline, true);
            }
        }
        style
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    pub fn css(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "justify",
        }
    }
}

/// Toolbar command applied to the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatCommand {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Subscript,
    Superscript,
    Align { alignment: Alignment },
}

impl From<InlineStyle> for FormatCommand {
    fn from(style: InlineStyle) -> Self {
        match style {
            InlineStyle::Bold => FormatCommand::Bold,
            InlineStyle::Italic => FormatCommand::Italic,
            InlineStyle::Underline => FormatCommand::Underline,
            InlineStyle::Strikethrough => FormatCommand::Strikethrough,
            InlineStyle::Subscript => FormatCommand::Subscript,
            InlineStyle::Superscript => FormatCommand::Superscript,
        }
    }
}

impl FormatCommand {
    fn inline(&self) -> Option<InlineStyle> {
        match self {
            FormatCommand::Bold => Some(InlineStyle::Bold),
            FormatCommand::Italic => Some(InlineStyle::Italic),
            FormatCommand::Underline => Some(InlineStyle::Underline),
            FormatCommand::Strikethrough => Some(InlineStyle::Strikethrough),
            FormatCommand::Subscript => Some(InlineStyle::Subscript),
            FormatCommand::Superscript => Some(InlineStyle::Superscript),
            FormatCommand::Align { .. } => None,
        }
    }
}

/// Character range over the visible text, end exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }

    pub fn caret(at: usize) -> Self {
        Self { start: at, end: at }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    fn clamp(self, len: usize) -> Self {
        Selection::new(self.start.min(len), self.end.min(len))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagKind {
    Open,
    Close,
    SelfClosing,
}

#[derive(Debug, Clone, PartialEq)]
struct Tag {
    raw: String,
    name: String,
    kind: TagKind,
    align: Option<Alignment>,
}

impl Tag {
    fn parse(raw: &str) -> Self {
        let inner = raw.trim_start_matches('<');
        let (kind, inner) = match inner.strip_prefix('/') {
            Some(rest) => (TagKind::Close, rest),
            None if raw.ends_with("/>") => (TagKind::SelfClosing, inner),
            None => (TagKind::Open, inner),
        };
        let name = inner
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        Tag {
            raw: raw.to_string(),
            name,
            kind,
            align: None,
        }
    }

    fn is_block(&self) -> bool {
        BLOCK_TAGS.contains(&self.name.as_str())
    }

    fn render(&self) -> String {
        match self.align {
            Some(alignment) => with_alignment(&self.raw, alignment),
            None => self.raw.clone(),
        }
    }
}

/// Rewrite an opening tag so its inline style ends with the alignment.
fn with_alignment(raw: &str, alignment: Alignment) -> String {
    let declaration = format!("text-align: {}", alignment.css());
    let lower = raw.to_ascii_lowercase();

    if let Some(at) = lower.find(" style=\"") {
        let value_start = at + " style=\"".len();
        let value_end = raw[value_start..]
            .find('"')
            .map(|i| value_start + i)
            .unwrap_or(raw.len());
        let mut declarations = raw[value_start..value_end]
            .split(';')
            .map(str::trim)
            .filter(|d| !d.is_empty() && !d.to_ascii_lowercase().starts_with("text-align"))
            .collect::<Vec<_>>()
            .join("; ");
        if !declarations.is_empty() {
            declarations.push_str("; ");
        }
        declarations.push_str(&declaration);
        format!("{}{}{}", &raw[..value_start], declarations, &raw[value_end..])
    } else {
        let insert_at = if raw.ends_with("/>") {
            raw.len() - 2
        } else if raw.ends_with('>') {
            raw.len() - 1
        } else {
            raw.len()
        };
        format!(
            "{} style=\"{}\"{}",
            raw[..insert_at].trim_end(),
            declaration,
            &raw[insert_at..]
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    /// Comments, doctype, `<style>`/`<script>` elements.
    Raw(String),
    Tag(Tag),
    Text { text: String, style: Style },
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(at) = rest.find('&') {
        out.push_str(&rest[..at]);
        rest = &rest[at..];
        let decoded = rest.find(';').filter(|end| *end <= 10).and_then(|end| {
            let entity = &rest[1..end];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" | "#39" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                "middot" => Some('\u{b7}'),
                "ndash" => Some('\u{2013}'),
                "copy" => Some('\u{a9}'),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|d| d.parse().ok()))
                    .and_then(char::from_u32),
            };
            ch.map(|c| (c, end))
        });
        match decoded {
            Some((ch, end)) => {
                out.push(ch);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn encode_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '\u{b7}' => out.push_str("&middot;"),
            _ => out.push(ch),
        }
    }
    out
}

fn starts_tag(rest: &str) -> bool {
    rest.starts_with('<')
        && rest[1..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '/' || c == '!')
}

/// Editable page content.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RichText {
    segments: Vec<Segment>,
}

impl RichText {
    pub fn parse(markup: &str) -> Self {
        let mut doc = RichText::default();
        let mut depths = [0usize; 6];
        let mut rest = markup;

        while !rest.is_empty() {
            if rest.starts_with("<!--") {
                let end = rest.find("-->").map(|i| i + 3).unwrap_or(rest.len());
                doc.segments.push(Segment::Raw(rest[..end].to_string()));
                rest = &rest[end..];
                continue;
            }
            if starts_tag(rest) {
                let end = rest.find('>').map(|i| i + 1).unwrap_or(rest.len());
                let raw = &rest[..end];
                if raw.starts_with("<!") {
                    doc.segments.push(Segment::Raw(raw.to_string()));
                    rest = &rest[end..];
                    continue;
                }
                let tag = Tag::parse(raw);

                if tag.kind == TagKind::Open && (tag.name == "style" || tag.name == "script") {
                    let closing = format!("</{}", tag.name);
                    let lower = rest.to_ascii_lowercase();
                    let stop = lower[end..]
                        .find(&closing)
                        .map(|i| end + i)
                        .and_then(|i| rest[i..].find('>').map(|j| i + j + 1))
                        .unwrap_or(rest.len());
                    doc.segments.push(Segment::Raw(rest[..stop].to_string()));
                    rest = &rest[stop..];
                    continue;
                }

                if let Some(inline) = InlineStyle::from_tag(&tag.name) {
                    let depth = &mut depths[inline.index()];
                    match tag.kind {
                        TagKind::Open => *depth += 1,
                        TagKind::Close => *depth = depth.saturating_sub(1),
                        TagKind::SelfClosing => {}
                    }
                } else {
                    doc.segments.push(Segment::Tag(tag));
                }
                rest = &rest[end..];
                continue;
            }

            let from = if rest.starts_with('<') { 1 } else { 0 };
            let stop = rest[from..]
                .find('<')
                .map(|i| i + from)
                .unwrap_or(rest.len());
            doc.push_text(decode_entities(&rest[..stop]), Style::from_depths(&depths));
            rest = &rest[stop..];
        }
        doc
    }

    fn push_text(&mut self, text: String, style: Style) {
        if text.is_empty() {
            return;
        }
        if let Some(Segment::Text {
            text: previous,
            style: previous_style,
        }) = self.segments.last_mut()
        {
            if *previous_style == style {
                previous.push_str(&text);
                return;
            }
        }
        self.segments.push(Segment::Text { text, style });
    }

    /// Visible text; selection offsets index into this.
    pub fn plain_text(&self) -> String {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn text_len(&self) -> usize {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Text { text, .. } => char_len(text),
                _ => 0,
            })
            .sum()
    }

    /// Serialize back to markup.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Raw(raw) => out.push_str(raw),
                Segment::Tag(tag) => out.push_str(&tag.render()),
                Segment::Text { text, style } => {
                    let active: Vec<InlineStyle> = InlineStyle::ALL
                        .into_iter()
                        .filter(|inline| style.has(*inline))
                        .collect();
                    for inline in &active {
                        out.push('<');
                        out.push_str(inline.tag());
                        out.push('>');
                    }
                    out.push_str(&encode_text(text));
                    for inline in active.iter().rev() {
                        out.push_str("</");
                        out.push_str(inline.tag());
                        out.push('>');
                    }
                }
            }
        }
        out
    }

    /// Apply a toolbar command. Returns the selection to restore.
    pub fn apply(&mut self, command: FormatCommand, selection: Selection) -> Selection {
        let selection = selection.clamp(self.text_len());
        match command {
            FormatCommand::Align { alignment } => self.align(alignment, selection),
            other => {
                if let Some(inline) = other.inline() {
                    self.toggle(inline, selection);
                }
            }
        }
        selection
    }

    /// Replace the selected text (or insert at the caret). Returns the
    /// selection covering the new text.
    pub fn replace_text(&mut self, selection: Selection, replacement: &str) -> Selection {
        let selection = selection.clamp(self.text_len());
        self.split_at(selection.start);
        self.split_at(selection.end);

        let selected = self.selected(selection);
        match selected.first() {
            Some(&first) => {
                for &index in &selected[1..] {
                    if let Segment::Text { text, .. } = &mut self.segments[index] {
                        text.clear();
                    }
                }
                if let Segment::Text { text, .. } = &mut self.segments[first] {
                    *text = replacement.to_string();
                }
            }
            None => {
                let (index, style) = self.insertion_point(selection.start);
                self.segments.insert(
                    index,
                    Segment::Text {
                        text: replacement.to_string(),
                        style,
                    },
                );
            }
        }
        self.normalize();
        Selection::new(selection.start, selection.start + char_len(replacement))
    }

    /// Word-processor toggle: remove the style when every selected
    /// character has it, otherwise add it everywhere in the selection.
    fn toggle(&mut self, inline: InlineStyle, selection: Selection) {
        if selection.is_collapsed() {
            return;
        }
        self.split_at(selection.start);
        self.split_at(selection.end);

        let selected = self.selected(selection);
        if selected.is_empty() {
            return;
        }
        let all_styled = selected.iter().all(|&index| {
            matches!(&self.segments[index], Segment::Text { style, .. } if style.has(inline))
        });
        for index in selected {
            if let Segment::Text { style, .. } = &mut self.segments[index] {
                style.set(inline, !all_styled);
            }
        }
        self.normalize();
    }

    /// Set the alignment of the innermost block around each selected run.
    fn align(&mut self, alignment: Alignment, selection: Selection) {
        let mut open_blocks: Vec<(usize, String)> = Vec::new();
        let mut targets: Vec<usize> = Vec::new();
        let mut pos = 0;

        for (index, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Tag(tag) if tag.is_block() => match tag.kind {
                    TagKind::Open => open_blocks.push((index, tag.name.clone())),
                    TagKind::Close => {
                        if let Some(at) = open_blocks.iter().rposition(|(_, name)| *name == tag.name) {
                            open_blocks.truncate(at);
                        }
                    }
                    TagKind::SelfClosing => {}
                },
                Segment::Text { text, .. } => {
                    let len = char_len(text);
                    let touches = if selection.is_collapsed() {
                        selection.start >= pos && selection.start <= pos + len
                    } else {
                        pos < selection.end && pos + len > selection.start
                    };
                    if touches && !text.trim().is_empty() {
                        if let Some((block, _)) = open_blocks.last() {
                            if !targets.contains(block) {
                                targets.push(*block);
                            }
                        }
                    }
                    pos += len;
                }
                _ => {}
            }
        }

        for index in targets {
            if let Segment::Tag(tag) = &mut self.segments[index] {
                tag.align = Some(alignment);
            }
        }
    }

    /// Ensure a run boundary at a character offset.
    fn split_at(&mut self, offset: usize) {
        let mut pos = 0;
        for index in 0..self.segments.len() {
            if let Segment::Text { text, style } = &self.segments[index] {
                let len = char_len(text);
                if offset > pos && offset < pos + len {
                    let at = byte_offset(text, offset - pos);
                    let head = text[..at].to_string();
                    let tail = text[at..].to_string();
                    let style = *style;
                    self.segments[index] = Segment::Text { text: head, style };
                    self.segments
                        .insert(index + 1, Segment::Text { text: tail, style });
                    return;
                }
                pos += len;
            }
        }
    }

    /// Indices of the runs lying inside the selection. Call after splitting.
    fn selected(&self, selection: Selection) -> Vec<usize> {
        let mut pos = 0;
        let mut indices = Vec::new();
        for (index, segment) in self.segments.iter().enumerate() {
            if let Segment::Text { text, .. } = segment {
                let len = char_len(text);
                if len > 0 && pos >= selection.start && pos + len <= selection.end {
                    indices.push(index);
                }
                pos += len;
            }
        }
        indices
    }

    /// Where to insert text typed at a caret, and with which style.
    fn insertion_point(&self, offset: usize) -> (usize, Style) {
        let mut pos = 0;
        for (index, segment) in self.segments.iter().enumerate() {
            if let Segment::Text { text, style } = segment {
                let len = char_len(text);
                if offset == pos {
                    return (index, *style);
                }
                if offset <= pos + len {
                    return (index + 1, *style);
                }
                pos += len;
            }
        }
        (self.segments.len(), Style::default())
    }

    /// Drop empty runs and merge neighbours with the same style.
    fn normalize(&mut self) {
        let segments = std::mem::take(&mut self.segments);
        for segment in segments {
            match segment {
                Segment::Text { text, style } => self.push_text(text, style),
                other => self.segments.push(other),
            }
        }
    }
}
