//! Per-document-type translators.
//!
//! Each translator composes the mapping resolver and the dedup guard with a
//! registry write and a mirror update, and returns the registry's response
//! body. Errors are converted into structured per-document results at the
//! dispatch boundary in `bundle`.

mod bundle;
mod encounter;
mod episode;
mod observation;
mod patient;
