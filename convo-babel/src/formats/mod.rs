//! Format implementations
//!
//! Each submodule implements [`crate::format::Format`] for one representation
//! of a conversation:
//!
//! | Format | Parse | Serialize | Notes                                   |
//! |--------|-------|-----------|-----------------------------------------|
//! | html   | yes   | no        | saved share page, selector driven       |
//! | json   | yes   | yes       | `{ title, url, messages }` data export  |
//! | pdf    | no    | yes       | rendered document, `pdf-export` feature |

pub mod html;
pub mod json;
#[cfg(feature = "pdf-export")]
pub mod pdf;

pub use html::HtmlFormat;
pub use json::JsonFormat;
#[cfg(feature = "pdf-export")]
pub use pdf::PdfFormat;
