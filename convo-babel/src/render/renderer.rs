//! Token sequence → drawing operations
//!
//! Each message is rendered as a colored role label followed by its body
//! tokens. A body that fails to lay out is rolled back and replaced by an
//! alert marker plus the raw text in Courier; the next message renders as if
//! nothing happened.

use super::canvas::{Canvas, TextOptions};
use super::style::{Font, RenderStyle, TextStyle};
use crate::error::RenderError;
use crate::markdown::{tokenize, Token};
use crate::normalize::RichTextNormalizer;
use crate::transcript::{Role, Turn};
use tracing::{debug, info, warn};

/// Lines shown centered above the first message.
#[derive(Debug, Clone, Copy)]
pub struct DocumentHeader<'h> {
    pub title: &'h str,
    pub url: &'h str,
    pub generated_on: &'h str,
}

/// How a single message ended up on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageOutcome {
    Rendered,
    /// The body failed and was replaced by the plain-text fallback.
    Recovered(RenderError),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderReport {
    pub messages: usize,
    /// Index of each recovered message with the failure behind it.
    pub recovered: Vec<(usize, RenderError)>,
}

pub struct DocumentRenderer<'a> {
    style: &'a RenderStyle,
    normalizer: &'a dyn RichTextNormalizer,
}

impl<'a> DocumentRenderer<'a> {
    pub fn new(style: &'a RenderStyle, normalizer: &'a dyn RichTextNormalizer) -> Self {
        Self { style, normalizer }
    }

    pub fn render_document(
        &self,
        canvas: &mut dyn Canvas,
        header: &DocumentHeader<'_>,
        turns: &[Turn],
    ) -> Result<RenderReport, RenderError> {
        self.render_header(canvas, header)?;

        let mut report = RenderReport::default();
        for (index, turn) in turns.iter().enumerate() {
            if let MessageOutcome::Recovered(error) = self.render_message(canvas, turn) {
                report.recovered.push((index, error));
            }
            report.messages += 1;
        }

        info!(
            "Rendered {} messages ({} recovered)",
            report.messages,
            report.recovered.len()
        );
        Ok(report)
    }

    pub fn render_header(
        &self,
        canvas: &mut dyn Canvas,
        header: &DocumentHeader<'_>,
    ) -> Result<(), RenderError> {
        let style = self.style;
        canvas.set_style(TextStyle::new(
            Font::Bold,
            style.size_title,
            style.color_default,
        ));
        canvas.text(header.title, TextOptions::centered())?;

        canvas.set_style(TextStyle::new(
            Font::Regular,
            style.size_meta,
            style.color_default,
        ));
        canvas.text(header.url, TextOptions::centered())?;
        canvas.text(
            &format!("Generated on {}", header.generated_on),
            TextOptions::centered(),
        )?;
        canvas.move_down(style.header_spacing);
        canvas.set_style(style.body());
        Ok(())
    }

    /// Label, body and trailing spacing of one turn. Never fails: body errors
    /// are recovered in place.
    pub fn render_message(&self, canvas: &mut dyn Canvas, turn: &Turn) -> MessageOutcome {
        let style = self.style;
        canvas.set_style(TextStyle::new(
            Font::Bold,
            style.size_normal,
            style.role_color(turn.role),
        ));
        let label = canvas.text(turn.role.label(), TextOptions::default());
        canvas.set_style(style.body());
        canvas.move_down(style.label_spacing);
        let after_label = canvas.checkpoint();

        let outcome = match label.and_then(|()| self.render_body(canvas, turn)) {
            Ok(()) => MessageOutcome::Rendered,
            Err(error) => {
                warn!("{} message failed to render, using plain text: {error}", turn.role);
                canvas.rollback(after_label);
                if let Err(fallback) = self.render_fallback(canvas, turn) {
                    warn!("Plain-text fallback failed as well: {fallback}");
                }
                MessageOutcome::Recovered(error)
            }
        };

        canvas.set_style(style.body());
        canvas.move_down(style.paragraph_spacing);
        outcome
    }

    fn render_body(&self, canvas: &mut dyn Canvas, turn: &Turn) -> Result<(), RenderError> {
        let source = self.markdown_source(turn);
        let tokens = tokenize(&source);
        debug!("{} message: {} tokens", turn.role, tokens.len());

        for token in &tokens {
            self.render_token(canvas, token)?;
            canvas.set_style(self.style.body());
        }
        Ok(())
    }

    /// Markdown the body is rendered from: user text as typed, assistant
    /// markup normalized, falling back to the plain text.
    pub fn markdown_source(&self, turn: &Turn) -> String {
        match turn.role {
            Role::User => turn.text.clone(),
            Role::Assistant => {
                let converted = turn
                    .markup
                    .as_deref()
                    .map(|markup| self.normalizer.convert(markup))
                    .unwrap_or_default();
                if converted.trim().is_empty() {
                    debug!("No usable markup, rendering plain text");
                    turn.text.clone()
                } else {
                    converted
                }
            }
        }
    }

    fn render_fallback(&self, canvas: &mut dyn Canvas, turn: &Turn) -> Result<(), RenderError> {
        let style = self.style;
        if canvas.remaining_height() < style.error_break_threshold {
            canvas.add_page();
        }

        canvas.set_style(TextStyle::new(
            Font::Regular,
            style.size_normal,
            style.color_alert,
        ));
        canvas.text(&style.error_marker, TextOptions::default())?;

        canvas.set_style(style.code());
        let content = if turn.text.is_empty() {
            style.content_unavailable.as_str()
        } else {
            turn.text.as_str()
        };
        canvas.text(content, TextOptions::default())?;
        canvas.move_down(style.paragraph_spacing / 2.0);
        Ok(())
    }

    pub fn render_token(&self, canvas: &mut dyn Canvas, token: &Token) -> Result<(), RenderError> {
        let style = self.style;
        match token {
            Token::Heading { depth, text } => {
                canvas.set_style(style.heading(*depth));
                canvas.text(text, TextOptions::default())?;
                canvas.move_down(style.heading_spacing);
                canvas.set_style(style.body());
            }
            Token::Paragraph { text } => self.paragraph(canvas, text)?,
            Token::List {
                ordered,
                start,
                depth,
                items,
            } => {
                canvas.set_style(style.body());
                let indent = *depth as f32 * style.list_indent_factor;
                for (offset, item) in items.iter().enumerate() {
                    let marker = if *ordered {
                        format!("{}. ", start + offset)
                    } else {
                        format!("{} ", style.bullet)
                    };
                    let checkbox = match item.checked {
                        Some(true) => "[x] ",
                        Some(false) => "[ ] ",
                        None => "",
                    };
                    canvas.text(
                        &format!("{marker}{checkbox}{}", item.text),
                        TextOptions::indented(indent),
                    )?;
                    canvas.move_down(style.list_item_spacing);
                }
                canvas.move_down(style.line_spacing);
            }
            Token::Code { text, .. } => {
                canvas.set_style(style.code());
                canvas.text(
                    &text.replace("\r\n", "\n"),
                    TextOptions::indented(style.indent),
                )?;
                canvas.move_down(style.line_spacing);
            }
            Token::Blockquote { text } => {
                canvas.set_style(style.quote());
                canvas.text(text, TextOptions::indented(style.indent))?;
                canvas.move_down(style.line_spacing);
                canvas.set_style(style.body());
            }
            Token::Table { header, rows } => {
                canvas.set_style(style.table());
                let head = header.join(&style.table_separator);
                if !head.is_empty() {
                    canvas.text(&head, TextOptions::default())?;
                    canvas.text(&"-".repeat(head.chars().count()), TextOptions::default())?;
                }
                let body = rows
                    .iter()
                    .map(|row| row.join(&style.table_separator))
                    .collect::<Vec<_>>()
                    .join("\n");
                canvas.text(&body, TextOptions::default())?;
                canvas.set_style(style.body());
                canvas.move_down(style.line_spacing);
            }
            Token::Rule => {
                canvas.move_down(style.rule_spacing);
                canvas.dashed_rule(style.rule_width, style.color_meta, style.rule_dash);
                canvas.move_down(style.rule_spacing);
            }
            Token::RawMarkup { text } => {
                canvas.set_style(style.code());
                canvas.text(text, TextOptions::default())?;
                canvas.move_down(style.line_spacing);
            }
            Token::Space => {}
            Token::Other {
                text: Some(text), ..
            } if !text.is_empty() => self.paragraph(canvas, text)?,
            Token::Other { kind, .. } => debug!("Skipping empty {kind} block"),
        }
        Ok(())
    }

    fn paragraph(&self, canvas: &mut dyn Canvas, text: &str) -> Result<(), RenderError> {
        canvas.set_style(self.style.body());
        canvas.text(text, TextOptions::default())?;
        canvas.move_down(self.style.line_spacing);
        Ok(())
    }
}
