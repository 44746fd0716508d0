//! Application layer containing the core business logic orchestration.
//!
//! This module defines the `OrderEngine` which acts as the single writer of
//! product stock, order lines, and order totals. Every mutating operation
//! runs as one unit of work against the storage ports.

pub mod engine;
