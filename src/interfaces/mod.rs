//! Presentation-facing adapters. The CSV surface feeds the demo binary.

pub mod csv;
