use std::io::{self, Write};

use crossterm::{
    cursor,
    style::{Attribute, Print, SetAttribute},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

mod events;
mod kitty;
pub mod paint;

pub use events::{EventMapper, InputMode, UiEvent};
pub use kitty::{DrawParams, ImageSlot, KittyRenderer};

pub fn write_status_line<W: Write>(writer: &mut W, label: &str) -> io::Result<()> {
    write!(writer, "{}", label)?;
    writer.flush()
}

pub fn print_at<W: Write>(writer: &mut W, col: u16, row: u16, content: &str) -> io::Result<()> {
    crossterm::queue!(writer, cursor::MoveTo(col, row), Print(content))
}

pub fn print_inverted<W: Write>(writer: &mut W, col: u16, row: u16, content: &str) -> io::Result<()> {
    crossterm::queue!(
        writer,
        cursor::MoveTo(col, row),
        SetAttribute(Attribute::Reverse),
        Print(content),
        SetAttribute(Attribute::Reset)
    )
}

pub fn truncate_with_ellipsis(text: &str, width: usize) -> String {
    let mut out = if text.width() > width {
        let budget = if width <= 3 { width } else { width - 3 };
        let mut truncated = String::new();
        let mut used = 0;
        for ch in text.chars() {
            let ch_width = ch.width().unwrap_or(0);
            if used + ch_width > budget {
                break;
            }
            truncated.push(ch);
            used += ch_width;
        }
        if width > 3 {
            truncated.push_str("...");
        }
        truncated
    } else {
        text.to_string()
    };
    let used = out.width();
    if used < width {
        out.push_str(&" ".repeat(width - used));
    }
    out
}

// Widths are terminal cells, so wide CJK characters count twice.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_width = 0usize;

    for word in text.split_whitespace() {
        let word_width = word.width();
        let sep_width = usize::from(!line.is_empty());
        if line_width + sep_width + word_width <= width {
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
            line_width += sep_width + word_width;
            continue;
        }

        if !line.is_empty() {
            lines.push(std::mem::take(&mut line));
            line_width = 0;
        }
        if word_width <= width {
            line.push_str(word);
            line_width = word_width;
            continue;
        }

        for ch in word.chars() {
            let ch_width = ch.width().unwrap_or(0);
            if line_width + ch_width > width && !line.is_empty() {
                lines.push(std::mem::take(&mut line));
                line_width = 0;
            }
            line.push(ch);
            line_width += ch_width;
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}
