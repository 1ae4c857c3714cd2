//! User-agent classification.
//!
//! A small heuristic over raw `User-Agent` strings: ordered substring checks,
//! first match wins. It is not a user-agent grammar parser and crafted
//! strings can be misclassified.

pub mod classifier;

pub use classifier::{classify, Browser, Classification, OperatingSystem};
