//! # Texmouth standard library extensions
//!
//! This crate contains data structures and algorithms used in the Texmouth
//! project that are not specific to TeX.

pub mod algorithms;
pub mod collections;
