//! Fixed-grid page layout, in PDF points with the origin at the bottom left

/// Left margin of every line
pub const LEFT_MARGIN: f32 = 40.0;

/// Baseline of the first line on a page
pub const TOP_BASELINE: f32 = 800.0;

/// Vertical distance between baselines
pub const LINE_STEP: f32 = 14.0;

/// A new page starts once the cursor drops below this
pub const BOTTOM_MARGIN: f32 = 40.0;

/// Longer lines are cut to this many characters
pub const MAX_LINE_CHARS: usize = 110;

/// Lines that fit between the top baseline and the bottom margin
pub const LINES_PER_PAGE: usize = 55;

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub x: f32,
    pub y: f32,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub lines: Vec<PlacedLine>,
}

/// Place every line of `text` on fixed-size pages.
///
/// Empty input still produces one page holding one empty line.
pub fn layout(text: &str) -> Vec<Page> {
    let mut pages = Vec::new();
    let mut current = Page::default();
    let mut y = TOP_BASELINE;

    for line in text.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        current.lines.push(PlacedLine {
            x: LEFT_MARGIN,
            y,
            text: line.chars().take(MAX_LINE_CHARS).collect(),
        });

        y -= LINE_STEP;
        if y < BOTTOM_MARGIN {
            pages.push(std::mem::take(&mut current));
            y = TOP_BASELINE;
        }
    }

    if !current.lines.is_empty() {
        pages.push(current);
    }

    pages
}
