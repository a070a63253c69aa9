//! Fonts, colors and the style table driving the renderer.
//!
//! Defaults mirror the look of the original Gemini export: 12pt Helvetica
//! body text, role-colored labels, Courier for code and tables.

use serde::{Deserialize, Serialize};

/// The four base-14 faces the renderer draws with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Font {
    Regular,
    Bold,
    Oblique,
    Mono,
}

impl Font {
    pub const ALL: [Font; 4] = [Font::Regular, Font::Bold, Font::Oblique, Font::Mono];

    /// PostScript name of the standard Type1 font.
    pub fn base_font(&self) -> &'static str {
        match self {
            Font::Regular => "Helvetica",
            Font::Bold => "Helvetica-Bold",
            Font::Oblique => "Helvetica-Oblique",
            Font::Mono => "Courier",
        }
    }

    /// Name under which the font is registered in page resources.
    pub fn resource_name(&self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
            Font::Oblique => "F3",
            Font::Mono => "F4",
        }
    }

    /// Line height as a multiple of the font size.
    pub fn line_height_factor(&self) -> f32 {
        match self {
            Font::Mono => 1.055,
            _ => 1.156,
        }
    }

    /// Distance from the top of a line to the baseline, in em.
    pub fn ascent(&self) -> f32 {
        match self {
            Font::Mono => 0.629,
            _ => 0.718,
        }
    }
}

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    pub const BLACK: Color = Color(0, 0, 0);
    pub const BLUE: Color = Color(0, 0, 255);
    pub const RED: Color = Color(255, 0, 0);
    pub const GREY: Color = Color(128, 128, 128);
    pub const ORANGE: Color = Color(255, 165, 0);

    /// Components scaled to the 0..=1 range PDF operators expect.
    pub fn unit_rgb(&self) -> [f32; 3] {
        [
            self.0 as f32 / 255.0,
            self.1 as f32 / 255.0,
            self.2 as f32 / 255.0,
        ]
    }
}

impl From<[u8; 3]> for Color {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Color(r, g, b)
    }
}

/// Font, size and fill color of drawn text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font: Font,
    pub size: f32,
    pub color: Color,
}

impl TextStyle {
    pub fn new(font: Font, size: f32, color: Color) -> Self {
        Self { font, size, color }
    }

    pub fn line_height(&self) -> f32 {
        self.size * self.font.line_height_factor()
    }
}

/// Physical page: size and uniform margin, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl PageGeometry {
    /// US Letter with 50pt margins.
    pub const LETTER: PageGeometry = PageGeometry {
        width: 612.0,
        height: 792.0,
        margin: 50.0,
    };

    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    /// Lowest y (top-down) a line may reach.
    pub fn bottom(&self) -> f32 {
        self.height - self.margin
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::LETTER
    }
}

/// Every size, color, spacing and marker the renderer uses.
///
/// Spacings are in lines of the style current when they are applied.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderStyle {
    pub size_normal: f32,
    pub size_code: f32,
    pub size_table: f32,
    pub size_title: f32,
    pub size_meta: f32,
    pub heading_base: f32,
    pub heading_step: f32,
    pub heading_min: f32,

    pub color_user: Color,
    pub color_assistant: Color,
    pub color_default: Color,
    pub color_meta: Color,
    pub color_alert: Color,

    pub indent: f32,
    pub list_indent_factor: f32,
    pub line_spacing: f32,
    pub paragraph_spacing: f32,
    pub heading_spacing: f32,
    pub label_spacing: f32,
    pub list_item_spacing: f32,
    pub rule_spacing: f32,
    pub header_spacing: f32,

    pub rule_width: f32,
    pub rule_dash: f32,
    /// Fallback blocks start a new page when less than this is left (pt).
    pub error_break_threshold: f32,

    pub table_separator: String,
    pub bullet: String,
    pub error_marker: String,
    pub content_unavailable: String,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            size_normal: 12.0,
            size_code: 10.0,
            size_table: 9.0,
            size_title: 16.0,
            size_meta: 10.0,
            heading_base: 16.0,
            heading_step: -1.0,
            heading_min: 10.0,

            color_user: Color::BLUE,
            color_assistant: Color::RED,
            color_default: Color::BLACK,
            color_meta: Color::GREY,
            color_alert: Color::ORANGE,

            indent: 20.0,
            list_indent_factor: 15.0,
            line_spacing: 0.25,
            paragraph_spacing: 1.5,
            heading_spacing: 0.3,
            label_spacing: 0.5,
            list_item_spacing: 0.1,
            rule_spacing: 0.5,
            header_spacing: 2.0,

            rule_width: 1.0,
            rule_dash: 5.0,
            error_break_threshold: 100.0,

            table_separator: " | ".to_string(),
            bullet: "\u{2022}".to_string(),
            error_marker: "[Msg Render Error]".to_string(),
            content_unavailable: "[Content unavailable]".to_string(),
        }
    }
}

impl RenderStyle {
    /// Body text: regular face, normal size, default color.
    pub fn body(&self) -> TextStyle {
        TextStyle::new(Font::Regular, self.size_normal, self.color_default)
    }

    pub fn code(&self) -> TextStyle {
        TextStyle::new(Font::Mono, self.size_code, self.color_default)
    }

    pub fn table(&self) -> TextStyle {
        TextStyle::new(Font::Mono, self.size_table, self.color_default)
    }

    pub fn quote(&self) -> TextStyle {
        TextStyle::new(Font::Oblique, self.size_normal, self.color_default)
    }

    /// `max(min, base + step * (depth - 1) + 2)`, bold.
    pub fn heading(&self, depth: u8) -> TextStyle {
        let level = f32::from(depth.max(1)) - 1.0;
        let size = (self.heading_base + self.heading_step * level + 2.0).max(self.heading_min);
        TextStyle::new(Font::Bold, size, self.color_default)
    }

    pub fn role_color(&self, role: crate::transcript::Role) -> Color {
        match role {
            crate::transcript::Role::User => self.color_user,
            crate::transcript::Role::Assistant => self.color_assistant,
        }
    }
}
