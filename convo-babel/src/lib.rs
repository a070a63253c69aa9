//! Conversation transcript export
//!
//!     This crate turns a captured conversation (a saved share page, or a previously exported
//!     data file) into a downloadable artifact: a JSON data file or a paginated PDF.
//!
//!     This is a pure lib, that is, it powers the convo cli but is shell agnostic: nothing here
//!     prints, reads env vars or decides where files go. Callers hand in an extractor and get an
//!     [`Artifact`] back.
//!
//! Architecture
//!
//!     The pipeline, leaves first:
//!
//!     Extractor → (per turn) Normalizer → Tokenizer → Renderer → Assembler → delivery
//!
//!     - extract: pulls ordered turns, title and url out of a source document
//!     - normalize: rich markup (HTML) → markdown, tables kept as GFM pipe tables
//!     - markdown: markdown → flat sequence of typed block tokens
//!     - render: tokens → positioned drawing operations on paginated pages (the core)
//!     - formats/pdf/assembler: pages → PDF bytes
//!
//!     The file structure :
//!     .
//!     ├── error.rs                # ExportError (fatal) and RenderError (per message)
//!     ├── transcript.rs           # Role, Turn, Transcript
//!     ├── sanitize.rs             # title sanitization and artifact names
//!     ├── dom                     # html5ever helpers and a small selector engine
//!     ├── extract                 # share page and JSON extractors
//!     ├── normalize               # RichTextNormalizer, HTML → markdown via comrak
//!     ├── markdown                # Token model and comrak based tokenizer
//!     ├── render                  # style, metrics, canvas, renderer
//!     ├── format.rs               # Format trait definition
//!     ├── registry.rs             # FormatRegistry for discovery and selection
//!     ├── formats
//!     │   ├── html                # parse only
//!     │   ├── json                # parse and serialize
//!     │   └── pdf                 # serialize only, `pdf-export` feature
//!     └── export.rs               # Exporter: guard, extract, check, serialize, name
//!
//! Testing
//!     tests
//!     └── <area>
//!         ├── <testname>.rs
//!         └── fixtures
//!
//!     Note that rust does not by default discover tests in subdirectories, so we need to include these
//!     in the mod.
//!
//! Failure Model
//!
//!     A message whose body cannot be laid out is rolled back and rendered as plain text after an
//!     alert marker; the rest of the document is unaffected. Everything else that goes wrong
//!     (no turns, a format compiled out, an unwritable output) halts the attempt and no artifact
//!     is produced.
//!
//! Library Choices
//!
//!     Markdown parsing and serialization is comrak's, HTML parsing is html5ever's and PDF object
//!     writing is lopdf's. What lives here is the adaptation between them and the layout rules.
//!
pub mod dom;
pub mod error;
pub mod export;
pub mod extract;
pub mod format;
pub mod formats;
pub mod markdown;
pub mod normalize;
pub mod registry;
pub mod render;
pub mod sanitize;
pub mod transcript;

pub use error::{ExportError, RenderError};
pub use export::{Artifact, ExportGuard, Exporter};
pub use extract::{ExtractSelectors, TranscriptExtractor};
pub use format::{ExportContext, Format, ParseOptions, SerializedDocument};
pub use markdown::{tokenize, Token};
pub use normalize::{HtmlToMarkdown, RichTextNormalizer};
pub use registry::FormatRegistry;
pub use render::{PageGeometry, RenderStyle};
pub use sanitize::{sanitize_title, TitleRules};
pub use transcript::{Role, Transcript, Turn};
