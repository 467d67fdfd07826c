//! Report export for printing and external tools.

mod inventory;

pub use inventory::*;
