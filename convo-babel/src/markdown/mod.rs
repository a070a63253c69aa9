//! Markdown tokenizing
//!
//! Message bodies arrive as markdown (either typed by the user or produced by
//! the [`crate::normalize`] step) and are classified into block [`Token`]s that
//! the renderer maps onto drawing operations.
//!
//! # Library Choice
//!
//! Parsing is delegated to `comrak` with the GFM table, tasklist,
//! strikethrough and autolink extensions. We never hand-parse markdown; this
//! module only adapts the comrak AST into the flat token sequence.
//!
//! # Token Mapping
//!
//! | Comrak node        | Token                                      |
//! |--------------------|--------------------------------------------|
//! | Heading            | `Heading { depth, text }`                  |
//! | Paragraph          | `Paragraph { text }`                       |
//! | List / Item        | `List { ordered, start, depth, items }`    |
//! | TaskItem           | list item with `checked: Some(_)`          |
//! | CodeBlock          | `Code { lang, text }`                      |
//! | BlockQuote         | `Blockquote { text }`                      |
//! | Table              | `Table { header, rows }`                   |
//! | ThematicBreak      | `Rule`                                     |
//! | HtmlBlock          | `RawMarkup { text }`                       |
//! | 2+ blank lines     | `Space`                                    |
//! | anything else      | `Other { kind, text }`                     |

pub mod token;
pub mod tokenizer;

pub use token::{ListItem, Token};
pub use tokenizer::tokenize;
