use crate::models::Block;
use serde::Serialize;

const WORDS_PER_MINUTE: f64 = 200.0;

/// URL-friendly anchor: `"Why Rust?  It's fast"` → `"why-rust-its-fast"`.
pub fn slugify(text: &str) -> String {
    let mut dashed = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.trim().to_lowercase().chars() {
        if c.is_whitespace() {
            if !in_space {
                dashed.push('-');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            dashed.push(c);
        }
    }

    let mut slug = String::with_capacity(dashed.len());
    for c in dashed.chars() {
        if c == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(c);
    }
    slug
}

fn extract_text(children: &[Block], out: &mut String) {
    for child in children {
        if let Some(text) = child.text.as_deref().filter(|t| !t.is_empty()) {
            out.push_str(text);
            out.push(' ');
        }
        extract_text(&child.children, out);
    }
}

/// Plain text of a rich-text body, whitespace collapsed.
pub fn blocks_to_text(blocks: &[Block]) -> String {
    let mut text = String::new();
    for block in blocks {
        extract_text(&block.children, &mut text);
        if matches!(block.kind.as_str(), "paragraph" | "heading" | "list") {
            text.push('\n');
        }
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    pub id: String,
    pub text: String,
    pub level: u8,
}

/// H2/H3 headings, anchored by their slug.
pub fn table_of_contents(blocks: &[Block]) -> Vec<TocEntry> {
    blocks
        .iter()
        .filter(|b| b.kind == "heading")
        .filter_map(|b| match b.level {
            Some(level @ (2 | 3)) => Some((b, level)),
            _ => None,
        })
        .map(|(b, level)| {
            let text: String = b
                .children
                .iter()
                .map(|c| c.text.as_deref().unwrap_or(""))
                .collect();
            TocEntry {
                id: slugify(&text),
                text,
                level,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadingTime {
    pub words: usize,
    pub minutes: u32,
    pub text: String,
}

pub fn reading_time(text: &str) -> ReadingTime {
    let words = text.split_whitespace().count();
    let minutes = (words as f64 / WORDS_PER_MINUTE * 100.0).round() / 100.0;
    let minutes = minutes.ceil() as u32;
    ReadingTime {
        words,
        minutes,
        text: format!("{} min read", minutes),
    }
}
