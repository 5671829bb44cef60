use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};

use super::document::{Block, PacketDocument};
use super::RenderError;

// US Letter, in points
const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;
const MARGIN: i64 = 72;
const TEXT_WIDTH: i64 = PAGE_WIDTH - 2 * MARGIN;

const REGULAR: &str = "F1";
const BOLD: &str = "F2";

/// A run of text in a single font
#[derive(Debug, Clone, PartialEq)]
struct Span {
    font: &'static str,
    text: String,
}

#[derive(Debug, Clone, Copy)]
struct Style {
    size: i64,
    leading: i64,
    space_before: i64,
    space_after: i64,
    centered: bool,
}

impl Style {
    const fn body() -> Self {
        Self {
            size: 11,
            leading: 15,
            space_before: 0,
            space_after: 2,
            centered: false,
        }
    }
}

fn block_layout(block: &Block) -> Option<(Style, Vec<Span>)> {
    let span = |font, text: &str| Span {
        font,
        text: text.to_string(),
    };

    let laid_out = match block {
        Block::Title(text) => (
            Style {
                size: 24,
                leading: 30,
                space_after: 24,
                centered: true,
                ..Style::body()
            },
            vec![span(BOLD, text)],
        ),
        Block::Heading { level, text } => {
            let size = if *level <= 1 { 16 } else { 14 };
            (
                Style {
                    size,
                    leading: size + 4,
                    space_before: 12,
                    space_after: 10,
                    ..Style::body()
                },
                vec![span(BOLD, text)],
            )
        }
        Block::Field { label, value } => (
            Style::body(),
            vec![span(BOLD, &format!("{}:", label)), span(REGULAR, value)],
        ),
        Block::Label(text) => (Style::body(), vec![span(BOLD, text)]),
        Block::Bullet(text) => (Style::body(), vec![span(REGULAR, &format!("\u{2022} {}", text))]),
        Block::Footer(text) => (
            Style {
                size: 10,
                leading: 14,
                centered: true,
                ..Style::body()
            },
            vec![span(REGULAR, text)],
        ),
        Block::Spacer | Block::PageBreak => return None,
    };

    Some(laid_out)
}

/// Approximate Helvetica advance of one character at size 1, in thousandths
fn char_advance(font: &str) -> i64 {
    if font == BOLD {
        580
    } else {
        530
    }
}

/// Approximate Helvetica advance width, in thousandths of a point
fn text_width(text: &str, font: &str, size: i64) -> i64 {
    text.chars().count() as i64 * size * char_advance(font)
}

/// Cut a word wider than the line into pieces that each fit on one line
fn split_word(word: &str, font: &str, size: i64, max_width: i64) -> Vec<String> {
    if text_width(word, font, size) <= max_width {
        return vec![word.to_string()];
    }

    let per_line = (max_width / (size * char_advance(font))).max(1) as usize;
    let chars: Vec<char> = word.chars().collect();
    chars
        .chunks(per_line)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Greedy word wrap across spans, keeping each word's font
fn wrap(spans: &[Span], size: i64, max_width: i64) -> Vec<Vec<Span>> {
    let max_width = max_width * 1000;
    let mut lines: Vec<Vec<Span>> = Vec::new();
    let mut line: Vec<Span> = Vec::new();
    let mut width = 0;

    for span in spans {
        for word in span.text.split_whitespace() {
            for (i, piece) in split_word(word, span.font, size, max_width)
                .into_iter()
                .enumerate()
            {
                // Pieces of a split word continue on their own line
                if i > 0 && !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                    width = 0;
                }

                let mut text = if line.is_empty() {
                    piece.clone()
                } else {
                    format!(" {}", piece)
                };
                let mut text_w = text_width(&text, span.font, size);

                if !line.is_empty() && width + text_w > max_width {
                    lines.push(std::mem::take(&mut line));
                    text = piece;
                    text_w = text_width(&text, span.font, size);
                    width = 0;
                }
                width += text_w;

                match line.last_mut() {
                    Some(last) if last.font == span.font => last.text.push_str(&text),
                    _ => line.push(Span {
                        font: span.font,
                        text,
                    }),
                }
            }
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Map text to WinAnsiEncoding bytes for the standard Type1 fonts
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{20AC}' => 0x80,
            c if (c as u32) < 0x80 || (0xA0..=0xFF).contains(&(c as u32)) => c as u8,
            _ => b'?',
        })
        .collect()
}

/// Accumulates page content streams while tracking the vertical cursor
struct PageWriter {
    pages: Vec<Vec<Operation>>,
    current: Vec<Operation>,
    y: i64,
}

impl PageWriter {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Vec::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn new_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
        self.y = PAGE_HEIGHT - MARGIN;
    }

    fn at_page_top(&self) -> bool {
        self.y == PAGE_HEIGHT - MARGIN
    }

    fn advance(&mut self, amount: i64) {
        if !self.at_page_top() {
            self.y -= amount;
        }
    }

    fn write_line(&mut self, line: &[Span], style: Style) {
        if self.y - style.leading < MARGIN {
            self.new_page();
        }
        self.y -= style.leading;

        let x = if style.centered {
            let width: i64 = line
                .iter()
                .map(|s| text_width(&s.text, s.font, style.size))
                .sum();
            ((PAGE_WIDTH - width / 1000) / 2).max(MARGIN)
        } else {
            MARGIN
        };

        self.current.push(Operation::new("BT", vec![]));
        self.current.push(Operation::new(
            "Td",
            vec![Object::Integer(x), Object::Integer(self.y)],
        ));
        for span in line {
            self.current.push(Operation::new(
                "Tf",
                vec![
                    Object::Name(span.font.as_bytes().to_vec()),
                    Object::Integer(style.size),
                ],
            ));
            self.current.push(Operation::new(
                "Tj",
                vec![Object::String(
                    encode_win_ansi(&span.text),
                    StringFormat::Literal,
                )],
            ));
        }
        self.current.push(Operation::new("ET", vec![]));
    }

    fn finish(mut self) -> Vec<Vec<Operation>> {
        if !self.current.is_empty() || self.pages.is_empty() {
            self.pages.push(self.current);
        }
        self.pages
    }
}

fn layout(document: &PacketDocument) -> Vec<Vec<Operation>> {
    let mut writer = PageWriter::new();

    for block in &document.blocks {
        match block {
            Block::PageBreak => writer.new_page(),
            Block::Spacer => writer.advance(Style::body().leading),
            _ => {
                if let Some((style, spans)) = block_layout(block) {
                    writer.advance(style.space_before);
                    for line in wrap(&spans, style.size, TEXT_WIDTH) {
                        writer.write_line(&line, style);
                    }
                    writer.y -= style.space_after;
                }
            }
        }
    }

    writer.finish()
}

/// Encode a packet as a PDF document
pub fn render_pdf(document: &PacketDocument) -> Result<Vec<u8>, RenderError> {
    let pages = layout(document);

    let mut pdf = Document::with_version("1.5");
    let pages_id = pdf.new_object_id();

    let regular_id = pdf.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = pdf.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = pdf.add_object(dictionary! {
        "Font" => dictionary! {
            REGULAR => regular_id,
            BOLD => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations };
        let content_id = pdf.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = pdf.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    pdf.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(PAGE_WIDTH),
                Object::Integer(PAGE_HEIGHT),
            ],
        }),
    );

    let info_id = pdf.add_object(dictionary! {
        "Title" => Object::string_literal(document.title.as_str()),
        "Producer" => Object::string_literal("grant-match"),
    });
    let catalog_id = pdf.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    pdf.trailer.set("Root", catalog_id);
    pdf.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    pdf.save_to(&mut bytes)?;
    Ok(bytes)
}
