//! Rendering through the public API
//!
//! These drive [`DocumentRenderer`] with a [`PageCanvas`] directly, the way
//! the pdf format does, and inspect the recorded draw operations.

mod recovery;
