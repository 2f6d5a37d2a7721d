use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// `h4`, `h5` or `h6`
    Heading(u8),
    ListItem,
    Text,
    /// Gap between paragraphs
    Spacer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub bold: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub spans: Vec<Span>,
}

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"<(/?)(p|h4|h5|h6|ul|li|strong)>").expect("markup tag pattern is valid")
    })
}

struct BlockBuilder {
    blocks: Vec<Block>,
    kind: BlockKind,
    spans: Vec<Span>,
    bold: bool,
}

impl BlockBuilder {
    fn new() -> Self {
        Self {
            blocks: Vec::new(),
            kind: BlockKind::Text,
            spans: Vec::new(),
            bold: false,
        }
    }

    /// Line breaks inside a block flow together as single spaces.
    fn push_text(&mut self, text: &str) {
        let collapsed = collapse_whitespace(text);
        let text = if self.spans.is_empty() {
            collapsed.trim_start()
        } else {
            collapsed.as_str()
        };
        if !text.is_empty() {
            self.spans.push(Span {
                text: text.to_string(),
                bold: self.bold,
            });
        }
    }

    fn end_line(&mut self) {
        let mut spans = std::mem::take(&mut self.spans);
        while let Some(last) = spans.last_mut() {
            last.text.truncate(last.text.trim_end().len());
            if !last.text.is_empty() {
                break;
            }
            spans.pop();
        }
        if !spans.is_empty() {
            self.blocks.push(Block {
                kind: self.kind,
                spans,
            });
        }
    }

    fn start(&mut self, kind: BlockKind) {
        self.end_line();
        self.kind = kind;
    }

    fn paragraph_break(&mut self) {
        self.start(BlockKind::Text);
        if matches!(self.blocks.last(), Some(block) if block.kind != BlockKind::Spacer) {
            self.blocks.push(Block {
                kind: BlockKind::Spacer,
                spans: Vec::new(),
            });
        }
    }

    fn finish(mut self) -> Vec<Block> {
        self.end_line();
        while matches!(self.blocks.last(), Some(block) if block.kind == BlockKind::Spacer) {
            self.blocks.pop();
        }
        self.blocks
    }
}

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

/// Splits formatter output into display blocks. Anything that is not one of
/// the known tags is kept as literal text.
pub fn parse_markup(markup: &str) -> Vec<Block> {
    let mut builder = BlockBuilder::new();
    let mut last = 0;

    for caps in tag_pattern().captures_iter(markup) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        builder.push_text(&markup[last..whole.start()]);
        last = whole.end();

        let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        match (name.as_str(), closing) {
            ("p", _) => builder.paragraph_break(),
            ("strong", closing) => builder.bold = !closing,
            ("li", false) => builder.start(BlockKind::ListItem),
            ("h4", false) => builder.start(BlockKind::Heading(4)),
            ("h5", false) => builder.start(BlockKind::Heading(5)),
            ("h6", false) => builder.start(BlockKind::Heading(6)),
            _ => builder.start(BlockKind::Text),
        }
    }
    builder.push_text(&markup[last..]);
    builder.finish()
}
