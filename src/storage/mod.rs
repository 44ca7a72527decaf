// src/storage/mod.rs
// =============================================================================
// This module keeps analysed pages in memory between the first scrape and
// later pagination requests.
//
// Nothing is persisted: a restart forgets every request ID.
// =============================================================================

mod memory;

pub use memory::SessionRegistry;
