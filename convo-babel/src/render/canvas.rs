//! Paginated drawing surface
//!
//! The renderer never computes page positions itself. It sets a style, asks the
//! canvas to draw text or rules, and moves the cursor; the canvas wraps lines,
//! inserts page breaks when a line would cross the bottom margin, and records
//! the result as [`DrawOp`]s per page.
//!
//! Coordinates are top-down: `y` grows from the top edge of the page, the way
//! the cursor moves. The PDF assembler flips them into PDF user space.

use super::metrics::{text_width, wrap_lines};
use super::style::{Color, PageGeometry, TextStyle};
use crate::error::RenderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
}

/// Placement of a text block.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextOptions {
    /// Left indent from the margin, applied to every wrapped line.
    pub indent: f32,
    pub align: Align,
}

impl TextOptions {
    pub fn indented(indent: f32) -> Self {
        Self {
            indent,
            align: Align::Left,
        }
    }

    pub fn centered() -> Self {
        Self {
            indent: 0.0,
            align: Align::Center,
        }
    }
}

/// One recorded drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// A single, already wrapped line of text.
    Text {
        x: f32,
        baseline: f32,
        text: String,
        style: TextStyle,
    },
    /// A stroked line, dashed when `dash` is set (equal dash and gap).
    Line {
        from: (f32, f32),
        to: (f32, f32),
        width: f32,
        color: Color,
        dash: Option<f32>,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

impl Page {
    /// Text of every line drawn on this page, in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            DrawOp::Line { .. } => None,
        })
    }
}

/// Cursor and style of one render invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutState {
    pub style: TextStyle,
    pub page: usize,
    pub y: f32,
}

/// Snapshot taken by [`Canvas::checkpoint`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Checkpoint {
    pages: usize,
    ops: usize,
    state: LayoutState,
}

pub trait Canvas {
    /// Discard everything and start a fresh first page.
    fn begin(&mut self, geometry: PageGeometry, style: TextStyle);

    fn add_page(&mut self);

    fn style(&self) -> TextStyle;

    fn set_style(&mut self, style: TextStyle);

    /// Draw wrapped text at the cursor in the current style, breaking pages
    /// as needed. The cursor ends below the last line.
    fn text(&mut self, text: &str, options: TextOptions) -> Result<(), RenderError>;

    /// Advance the cursor by `lines` lines of the current style.
    fn move_down(&mut self, lines: f32);

    /// Dashed horizontal line across the content width at the cursor.
    fn dashed_rule(&mut self, width: f32, color: Color, dash: f32);

    /// Space between the cursor and the bottom edge of the page.
    fn remaining_height(&self) -> f32;

    fn checkpoint(&self) -> Checkpoint;

    /// Drop everything drawn since `checkpoint` and restore its state.
    fn rollback(&mut self, checkpoint: Checkpoint);

    fn finish(self) -> Vec<Page>
    where
        Self: Sized;
}

/// In-memory [`Canvas`] recording draw operations per page.
#[derive(Debug, Clone)]
pub struct PageCanvas {
    geometry: PageGeometry,
    pages: Vec<Page>,
    state: LayoutState,
}

impl PageCanvas {
    pub fn new(geometry: PageGeometry, style: TextStyle) -> Self {
        let mut canvas = Self {
            geometry,
            pages: Vec::new(),
            state: LayoutState {
                style,
                page: 0,
                y: geometry.margin,
            },
        };
        canvas.begin(geometry, style);
        canvas
    }

    pub fn geometry(&self) -> PageGeometry {
        self.geometry
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn state(&self) -> LayoutState {
        self.state
    }

    fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }
}

impl Canvas for PageCanvas {
    fn begin(&mut self, geometry: PageGeometry, style: TextStyle) {
        self.geometry = geometry;
        self.pages = vec![Page::default()];
        self.state = LayoutState {
            style,
            page: 0,
            y: geometry.margin,
        };
    }

    fn add_page(&mut self) {
        self.pages.push(Page::default());
        self.state.page = self.pages.len() - 1;
        self.state.y = self.geometry.margin;
    }

    fn style(&self) -> TextStyle {
        self.state.style
    }

    fn set_style(&mut self, style: TextStyle) {
        self.state.style = style;
    }

    fn text(&mut self, text: &str, options: TextOptions) -> Result<(), RenderError> {
        let content_width = self.geometry.content_width();
        let available = content_width - options.indent;
        let style = self.state.style;
        if available < style.size {
            return Err(RenderError::NoRoomForText {
                indent: options.indent,
                available: content_width,
            });
        }
        if text.is_empty() {
            return Ok(());
        }

        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        let line_height = style.line_height();
        let left = self.geometry.margin + options.indent;

        for line in wrap_lines(&normalized, style.font, style.size, available) {
            if self.state.y + line_height > self.geometry.bottom()
                && self.state.y > self.geometry.margin
            {
                self.add_page();
            }
            if !line.is_empty() {
                let x = match options.align {
                    Align::Left => left,
                    Align::Center => {
                        let width = text_width(&line, style.font, style.size);
                        left + ((available - width) / 2.0).max(0.0)
                    }
                };
                let baseline = self.state.y + style.font.ascent() * style.size;
                self.push(DrawOp::Text {
                    x,
                    baseline,
                    text: line,
                    style,
                });
            }
            self.state.y += line_height;
        }

        Ok(())
    }

    fn move_down(&mut self, lines: f32) {
        self.state.y += lines * self.state.style.line_height();
    }

    fn dashed_rule(&mut self, width: f32, color: Color, dash: f32) {
        if self.state.y > self.geometry.bottom() {
            self.add_page();
        }
        let y = self.state.y;
        self.push(DrawOp::Line {
            from: (self.geometry.margin, y),
            to: (self.geometry.width - self.geometry.margin, y),
            width,
            color,
            dash: Some(dash),
        });
    }

    fn remaining_height(&self) -> f32 {
        self.geometry.height - self.state.y
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            pages: self.pages.len(),
            ops: self.pages.last().map_or(0, |p| p.ops.len()),
            state: self.state,
        }
    }

    fn rollback(&mut self, checkpoint: Checkpoint) {
        self.pages.truncate(checkpoint.pages.max(1));
        if let Some(page) = self.pages.last_mut() {
            page.ops.truncate(checkpoint.ops);
        }
        self.state = checkpoint.state;
    }

    fn finish(self) -> Vec<Page> {
        self.pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::style::{Font, RenderStyle};

    fn canvas() -> PageCanvas {
        PageCanvas::new(PageGeometry::LETTER, RenderStyle::default().body())
    }

    fn all_texts(canvas: &PageCanvas) -> Vec<String> {
        canvas
            .pages()
            .iter()
            .flat_map(|p| p.texts().map(str::to_string))
            .collect()
    }

    #[test]
    fn starts_with_one_page_at_top_margin() {
        let c = canvas();
        assert_eq!(c.pages().len(), 1);
        assert_eq!(c.state().y, 50.0);
        assert_eq!(c.remaining_height(), 742.0);
    }

    #[test]
    fn text_advances_cursor_per_line() {
        let mut c = canvas();
        c.text("one\ntwo", TextOptions::default()).unwrap();
        assert_eq!(all_texts(&c), vec!["one", "two"]);
        let expected = 50.0 + 2.0 * 12.0 * Font::Regular.line_height_factor();
        assert!((c.state().y - expected).abs() < 1e-3);
    }

    #[test]
    fn indent_applies_to_every_wrapped_line() {
        let mut c = canvas();
        c.set_style(RenderStyle::default().code());
        let long = "word ".repeat(40);
        c.text(&long, TextOptions::indented(20.0)).unwrap();
        let xs: Vec<f32> = c.pages()[0]
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { x, .. } => Some(*x),
                _ => None,
            })
            .collect();
        assert!(xs.len() > 1);
        assert!(xs.iter().all(|x| *x == 70.0));
    }

    #[test]
    fn centered_text_is_offset() {
        let mut c = canvas();
        c.text("Title", TextOptions::centered()).unwrap();
        match &c.pages()[0].ops[0] {
            DrawOp::Text { x, .. } => assert!(*x > 250.0 && *x < 306.0, "x = {x}"),
            other => panic!("unexpected op {other:?}"),
        }
    }

    #[test]
    fn breaks_page_before_crossing_bottom_margin() {
        let mut c = canvas();
        let text = vec!["line"; 80].join("\n");
        c.text(&text, TextOptions::default()).unwrap();
        assert!(c.pages().len() >= 2);
        for page in c.pages() {
            for op in &page.ops {
                if let DrawOp::Text { baseline, .. } = op {
                    assert!(*baseline < 742.0);
                }
            }
        }
        assert_eq!(c.state().page, c.pages().len() - 1);
    }

    #[test]
    fn indent_without_room_is_an_error() {
        let mut c = canvas();
        let err = c.text("x", TextOptions::indented(600.0)).unwrap_err();
        assert_eq!(
            err,
            RenderError::NoRoomForText {
                indent: 600.0,
                available: 512.0
            }
        );
        assert!(c.pages()[0].ops.is_empty());
    }

    #[test]
    fn empty_text_draws_nothing() {
        let mut c = canvas();
        c.text("", TextOptions::default()).unwrap();
        assert!(c.pages()[0].ops.is_empty());
        assert_eq!(c.state().y, 50.0);
    }

    #[test]
    fn rollback_discards_ops_and_pages() {
        let mut c = canvas();
        c.text("keep", TextOptions::default()).unwrap();
        let checkpoint = c.checkpoint();
        c.set_style(RenderStyle::default().code());
        c.text(&vec!["drop"; 100].join("\n"), TextOptions::default())
            .unwrap();
        assert!(c.pages().len() > 1);

        c.rollback(checkpoint);
        assert_eq!(c.pages().len(), 1);
        assert_eq!(all_texts(&c), vec!["keep"]);
        assert_eq!(c.style(), RenderStyle::default().body());
    }

    #[test]
    fn dashed_rule_spans_content_width() {
        let mut c = canvas();
        c.dashed_rule(1.0, Color::GREY, 5.0);
        assert_eq!(
            c.pages()[0].ops[0],
            DrawOp::Line {
                from: (50.0, 50.0),
                to: (562.0, 50.0),
                width: 1.0,
                color: Color::GREY,
                dash: Some(5.0),
            }
        );
    }
}
