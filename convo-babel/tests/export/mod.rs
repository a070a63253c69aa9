//! End to end export tests
//!
//! Share page or in-memory transcript in, artifact bytes out.

mod json;
#[cfg(feature = "pdf-export")]
mod pdf;
