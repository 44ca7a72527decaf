// src/storage/memory.rs
// =============================================================================
// In-memory storage for analysed pages, so later pagination requests can
// find a page again by its request ID.
//
// Layout:
// - ResultStore: one map of request ID -> PageAnalysis
// - SessionRegistry: session key -> ResultStore, created on first use
//
// Both sit behind reader/writer locks: lookups share the lock, inserts take
// it exclusively. Nothing is ever evicted, so memory grows with every scrape
// for as long as the process runs.
//
// Rust concepts:
// - Arc: shared ownership of a store between the registry and callers
// - RwLock: many readers or one writer
// =============================================================================

use chrono::Local;
use parking_lot::RwLock;
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;

use crate::models::PageAnalysis;

// Request IDs look like "20240131235959-a1B2c3D4"
const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";
const SUFFIX_LEN: usize = 8;

// Stored pages for one session
#[derive(Debug, Default)]
pub struct ResultStore {
    records: RwLock<HashMap<String, PageAnalysis>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Stores an analysis under a fresh request ID and returns the ID
    //
    // A clash with an existing ID would overwrite it. With 62^8 possible
    // suffixes per second this is treated as impossible and not checked.
    pub fn put(&self, analysis: PageAnalysis) -> String {
        let id = generate_id();
        self.records.write().insert(id.clone(), analysis);
        tracing::debug!(request_id = %id, "stored page analysis");
        id
    }

    // Looks up a stored analysis
    //
    // Returns a copy: callers probe links on their copy and the stored
    // snapshot stays exactly as the scrape produced it.
    pub fn get(&self, id: &str) -> Option<PageAnalysis> {
        self.records.read().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }
}

// All session partitions
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Arc<ResultStore>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // Returns the store for `session`, creating it on first use
    //
    // Two callers racing on an unseen key both end up with the same store:
    // the second one to take the write lock finds the first one's entry.
    pub fn for_session(&self, session: &str) -> Arc<ResultStore> {
        if let Some(store) = self.sessions.read().get(session) {
            return Arc::clone(store);
        }

        let mut sessions = self.sessions.write();
        let store = sessions.entry(session.to_string()).or_insert_with(|| {
            tracing::debug!(session, "created session store");
            Arc::new(ResultStore::new())
        });
        Arc::clone(store)
    }

    // Drops every session and its records
    #[cfg(test)]
    pub fn clear(&self) {
        self.sessions.write().clear();
    }
}

// Builds a request ID: local timestamp (to the second) + "-" + random suffix
pub fn generate_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(char::from)
        .collect();
    format!("{}-{}", Local::now().format(TIMESTAMP_FORMAT), suffix)
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why parking_lot instead of std::sync::RwLock?
//    - parking_lot locks don't get "poisoned" when a thread panics
//    - So read()/write() return the guard directly, no Result to unwrap
//
// 2. What is the read-then-write pattern in for_session?
//    - Most calls find an existing store with just the shared read lock
//    - Only a miss takes the exclusive write lock
//    - entry().or_insert_with() re-checks under the write lock, so a store
//      created by another thread in between is reused, not replaced
//
// 3. What is thread_rng()?
//    - A random number generator local to the current thread
//    - Each thread has its own, so concurrent callers never share state
// -----------------------------------------------------------------------------
