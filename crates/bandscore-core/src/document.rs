//! Model feedback as a downloadable document.
//!
//! The model replies in Markdown. Only two block kinds survive conversion:
//! headings (with their level) and paragraphs. List items and code blocks
//! become paragraphs; inline markup is dropped and only its text is kept.

use pulldown_cmark::{Event, Parser, Tag, TagEnd};

use bandscore_types::task::TaskVariant;

/// Title used for the downloadable feedback report.
pub const REPORT_TITLE: &str = "IELTS Writing Feedback";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, text: String },
    Paragraph(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    blocks: Vec<Block>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Parse Markdown into heading and paragraph blocks.
    pub fn from_markdown(markdown: &str) -> Self {
        let mut doc = Self::new();
        let mut buf = String::new();
        let mut heading: Option<u8> = None;

        for event in Parser::new(markdown) {
            match event {
                Event::Start(Tag::Heading { level, .. }) => {
                    doc.flush_paragraph(&mut buf);
                    heading = Some(level as u8);
                }
                Event::End(TagEnd::Heading(_)) => {
                    let text = buf.trim().to_string();
                    buf.clear();
                    if let Some(level) = heading.take() {
                        if !text.is_empty() {
                            doc.push(Block::Heading { level, text });
                        }
                    }
                }
                Event::Start(Tag::Paragraph | Tag::Item | Tag::CodeBlock(_))
                | Event::End(TagEnd::Paragraph | TagEnd::Item | TagEnd::CodeBlock) => {
                    doc.flush_paragraph(&mut buf);
                }
                Event::Text(text) | Event::Code(text) => buf.push_str(&text),
                Event::SoftBreak => buf.push(' '),
                Event::HardBreak => buf.push('\n'),
                _ => {}
            }
        }
        doc.flush_paragraph(&mut buf);
        doc
    }

    fn flush_paragraph(&mut self, buf: &mut String) {
        let text = buf.trim();
        if !text.is_empty() {
            self.blocks.push(Block::Paragraph(text.to_string()));
        }
        buf.clear();
    }

    /// Standalone HTML page. All text is escaped.
    pub fn to_html(&self, title: &str) -> String {
        let mut out = String::new();
        out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
        out.push_str(&format!("<title>{}</title>\n", escape_html(title)));
        out.push_str(
            "<style>body{font-family:sans-serif;max-width:48rem;margin:2rem auto;line-height:1.5}</style>\n",
        );
        out.push_str("</head>\n<body>\n");
        for block in &self.blocks {
            match block {
                Block::Heading { level, text } => {
                    let level = (*level).clamp(1, 6);
                    out.push_str(&format!("<h{level}>{}</h{level}>\n", escape_html(text)));
                }
                Block::Paragraph(text) => {
                    let escaped = escape_html(text).replace('\n', "<br>\n");
                    out.push_str(&format!("<p>{escaped}</p>\n"));
                }
            }
        }
        out.push_str("</body>\n</html>\n");
        out
    }

    /// Blocks separated by blank lines, headings without markers.
    pub fn to_plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(|block| match block {
                Block::Heading { text, .. } | Block::Paragraph(text) => text.as_str(),
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// The downloadable report: a title, the task and word count, then the
/// model feedback.
pub fn feedback_report(variant: TaskVariant, word_count: usize, feedback: &str) -> Document {
    let mut doc = Document::new();
    doc.push(Block::Heading {
        level: 1,
        text: REPORT_TITLE.to_string(),
    });
    doc.push(Block::Paragraph(format!(
        "{} response, {word_count} words",
        variant.label()
    )));
    doc.blocks.extend(Document::from_markdown(feedback).blocks);
    doc
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headings_keep_level() {
        let doc = Document::from_markdown("# Feedback\n\n### Lexical Resource\n\nGood range.");
        assert_eq!(
            doc.blocks(),
            &[
                Block::Heading {
                    level: 1,
                    text: "Feedback".to_string()
                },
                Block::Heading {
                    level: 3,
                    text: "Lexical Resource".to_string()
                },
                Block::Paragraph("Good range.".to_string()),
            ]
        );
    }

    #[test]
    fn test_list_items_become_paragraphs() {
        let md = "- **Task Response**: addresses the task, 7\n- **Coherence & Cohesion**: logical, 6\n";
        let doc = Document::from_markdown(md);
        assert_eq!(
            doc.blocks(),
            &[
                Block::Paragraph("Task Response: addresses the task, 7".to_string()),
                Block::Paragraph("Coherence & Cohesion: logical, 6".to_string()),
            ]
        );
    }

    #[test]
    fn test_soft_breaks_join_lines() {
        let doc = Document::from_markdown("first line\nsecond line\n\nnext paragraph");
        assert_eq!(doc.blocks().len(), 2);
        assert_eq!(doc.blocks()[0], Block::Paragraph("first line second line".to_string()));
    }

    #[test]
    fn test_empty_input() {
        assert!(Document::from_markdown("").is_empty());
        assert!(Document::from_markdown("\n\n   \n").is_empty());
    }

    #[test]
    fn test_html_escapes_text() {
        let mut doc = Document::new();
        doc.push(Block::Heading {
            level: 2,
            text: "A <b> & C".to_string(),
        });
        doc.push(Block::Paragraph("use \"quotes\"".to_string()));

        let html = doc.to_html("Report <1>");
        assert!(html.contains("<title>Report &lt;1&gt;</title>"));
        assert!(html.contains("<h2>A &lt;b&gt; &amp; C</h2>"));
        assert!(html.contains("<p>use &quot;quotes&quot;</p>"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn test_feedback_report_layout() {
        let doc = feedback_report(TaskVariant::Task2, 262, "## Overall\n\nSolid essay.");
        assert_eq!(doc.blocks().len(), 4);
        assert_eq!(
            doc.blocks()[0],
            Block::Heading {
                level: 1,
                text: REPORT_TITLE.to_string()
            }
        );
        assert_eq!(
            doc.blocks()[1],
            Block::Paragraph("Task 2 response, 262 words".to_string())
        );
        assert_eq!(doc.blocks()[3], Block::Paragraph("Solid essay.".to_string()));
    }

    #[test]
    fn test_plain_text() {
        let doc = Document::from_markdown("## Overall\n\n**Final band score**: 6.5");
        assert_eq!(doc.to_plain_text(), "Overall\n\nFinal band score: 6.5");
    }
}
