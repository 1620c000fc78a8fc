// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Terminal output for the ftrie CLI.
//!
//! Plain ANSI colors, boxes for `inspect`, aligned columns for query
//! results. Colors are off when stdout is not a TTY or `NO_COLOR` is set.

use std::sync::OnceLock;

// Width between │ and │, border chars excluded.
pub const BOX_WIDTH: usize = 64;

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";
pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const BLUE: &str = "\x1b[34m";
pub const CYAN: &str = "\x1b[36m";
pub const GRAY: &str = "\x1b[90m";

static COLORS: OnceLock<bool> = OnceLock::new();

/// Whether to emit escape codes (cached).
pub fn use_colors() -> bool {
    *COLORS.get_or_init(|| {
        std::env::var_os("NO_COLOR").is_none() && atty::is(atty::Stream::Stdout)
    })
}

/// Wrap `text` in `styles` when colors are on.
pub fn styled(styles: &[&str], text: &str) -> String {
    if use_colors() {
        format!("{}{}{}", styles.concat(), text, RESET)
    } else {
        text.to_string()
    }
}

/// Visible length, ANSI escapes excluded.
pub fn visible_len(s: &str) -> usize {
    let mut in_escape = false;
    let mut len = 0;
    for c in s.chars() {
        if c == '\x1b' {
            in_escape = true;
        } else if in_escape && c == 'm' {
            in_escape = false;
        } else if !in_escape {
            len += 1;
        }
    }
    len
}

fn border(s: &str) -> String {
    styled(&[GRAY], s)
}

/// ┌─ LABEL ──────┐
pub fn section_top(label: &str) {
    let remaining = BOX_WIDTH.saturating_sub(visible_len(label) + 3);
    println!(
        "{}{} {}",
        border("┌─ "),
        styled(&[BOLD, CYAN], label),
        border(&format!("{}┐", "─".repeat(remaining)))
    );
}

/// │ content      │
pub fn row(content: &str) {
    let pad = BOX_WIDTH.saturating_sub(visible_len(content) + 1);
    println!("{} {}{}{}", border("│"), content, " ".repeat(pad), border("│"));
}

/// └──────────────┘
pub fn section_bot() {
    println!("{}", border(&format!("└{}┘", "─".repeat(BOX_WIDTH))));
}

/// A `label  value` row with the label dimmed.
pub fn field(label: &str, value: &str) {
    row(&format!("{} {}", pad_right(&styled(&[DIM], label), 14), value));
}

pub fn pad_left(s: &str, width: usize) -> String {
    let visible = visible_len(s);
    if visible >= width {
        s.to_string()
    } else {
        format!("{}{}", " ".repeat(width - visible), s)
    }
}

pub fn pad_right(s: &str, width: usize) -> String {
    let visible = visible_len(s);
    if visible >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - visible))
    }
}

/// Human-readable byte count.
pub fn format_size(bytes: u64) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / 1024.0 / 1024.0)
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}

/// Edit distance, green for exact matches and warmer as it grows.
pub fn distance_badge(distance: usize) -> String {
    let color = match distance {
        0 => GREEN,
        1 => YELLOW,
        _ => RED,
    };
    styled(&[color], &format!("d={}", distance))
}

/// A token as text, lossy for bytes that are not UTF-8.
pub fn token(bytes: &[u8]) -> String {
    styled(&[BOLD, BLUE], &String::from_utf8_lossy(bytes))
}

/// Elapsed time with a color for how it feels.
pub fn timing_ms(value: f64) -> String {
    let color = if value < 5.0 {
        GREEN
    } else if value < 50.0 {
        YELLOW
    } else {
        RED
    };
    styled(&[color], &format!("{:.3} ms", value))
}
