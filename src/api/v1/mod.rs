//! Lead endpoint handlers.

mod leads;

#[cfg(test)]
mod leads_test;

pub use leads::*;
