//! Date text normalization for display.
//!
//! Record fields arrive in mixed shapes (ISO timestamps, `DD/MM/YYYY` manual
//! entry, free-form imports). Everything that parses is rendered as
//! `DD-MM-YYYY`; everything else passes through untouched.

pub mod normalizer;

pub use normalizer::*;
