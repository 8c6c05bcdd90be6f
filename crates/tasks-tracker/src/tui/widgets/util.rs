use std::borrow::Cow;

use ratatui::{layout::Rect, style::Color};
use tasks_tracker_core::DisplayMeta;
use unicode_segmentation::UnicodeSegmentation;

pub(in crate::tui) fn truncate_with_ellipsis(input: &str, max_graphemes: usize) -> Cow<'_, str> {
    const ELLIPSIS: &str = "...";
    const ELLIPSIS_GRAPHEMES: usize = 3;

    if max_graphemes == 0 {
        return Cow::Owned(String::new());
    }

    let grapheme_count = input.graphemes(true).count();
    if grapheme_count <= max_graphemes {
        return Cow::Borrowed(input);
    }

    if max_graphemes <= ELLIPSIS_GRAPHEMES {
        return Cow::Owned(input.graphemes(true).take(max_graphemes).collect());
    }

    let mut truncated: String = input.graphemes(true).take(max_graphemes - ELLIPSIS_GRAPHEMES).collect();
    truncated.push_str(ELLIPSIS);
    Cow::Owned(truncated)
}

/// Parse `#rrggbb`; anything else renders with the terminal default.
pub(in crate::tui) fn hex_color(hex: &str) -> Color {
    let Some(digits) = hex.strip_prefix('#') else {
        return Color::Reset;
    };
    if digits.len() != 6 {
        return Color::Reset;
    }
    let channel = |range: std::ops::Range<usize>| digits.get(range).and_then(|part| u8::from_str_radix(part, 16).ok());
    match (channel(0..2), channel(2..4), channel(4..6)) {
        (Some(r), Some(g), Some(b)) => Color::Rgb(r, g, b),
        _ => Color::Reset,
    }
}

/// `icon label` for a status or priority.
pub(in crate::tui) fn badge(meta: DisplayMeta) -> String {
    format!("{} {}", meta.icon, meta.label)
}

/// Centre a box of `percent` of `area`, clamped to `min` and to the area itself.
pub(in crate::tui) fn popup_area(area: Rect, percent: (u16, u16), min: (u16, u16)) -> Rect {
    let width = (area.width.saturating_mul(percent.0) / 100).max(min.0).min(area.width);
    let height = (area.height.saturating_mul(percent.1) / 100).max(min.1).min(area.height);
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    }
}

/// Box of fixed size anchored below `anchor`, kept inside `bounds`.
pub(in crate::tui) fn dropdown_area(bounds: Rect, anchor: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(bounds.width);
    let height = height.min(bounds.height);
    let max_x = bounds.x + bounds.width - width;
    let max_y = bounds.y + bounds.height - height;
    Rect {
        x: anchor.x.min(max_x),
        y: (anchor.y + anchor.height).min(max_y),
        width,
        height,
    }
}
