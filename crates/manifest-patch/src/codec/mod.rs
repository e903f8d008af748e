//! Codecs for patch scripts.

pub mod json;
