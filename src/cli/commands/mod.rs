pub mod leads;
pub mod migrate;
pub mod serve;
