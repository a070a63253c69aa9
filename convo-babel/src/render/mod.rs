//! Paginated document rendering
//!
//! This is the core of the PDF export: a token sequence per message goes in, a
//! list of pages with positioned drawing operations comes out.
//!
//! Layers, bottom-up:
//!
//! - [`style`]: fonts, colors, page geometry and the [`RenderStyle`] table
//! - [`metrics`]: AFM glyph widths, WinAnsi encoding, line wrapping
//! - [`canvas`]: the [`Canvas`] trait and the recording [`PageCanvas`], which
//!   owns the cursor, the current style and pagination
//! - [`renderer`]: [`DocumentRenderer`], mapping tokens onto canvas calls and
//!   recovering from per-message failures
//!
//! Nothing here knows about PDF syntax. The pages are turned into bytes by the
//! pdf format's assembler.

pub mod canvas;
pub mod metrics;
pub mod renderer;
pub mod style;

pub use canvas::{Align, Canvas, Checkpoint, DrawOp, LayoutState, Page, PageCanvas, TextOptions};
pub use renderer::{DocumentHeader, DocumentRenderer, MessageOutcome, RenderReport};
pub use style::{Color, Font, PageGeometry, RenderStyle, TextStyle};
