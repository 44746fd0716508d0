//! Domain model: entities, value objects, and the storage ports they flow
//! through. Nothing in here touches a concrete backend.

pub mod catalog;
pub mod money;
pub mod order;
pub mod ports;
