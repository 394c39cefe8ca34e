//! Internal modules ported from external libraries.
//!
//! These modules contain code adapted from:
//! - scipy: Euclidean distance and linear sum assignment

pub mod scipy;
