//! Storage adapters
//!
//! - [`InMemoryCache`]: the fast cache, with per-entry TTL
//! - [`InMemoryRecordStore`]: process-local durable tables, optionally seeded
//!   from a JSON file
//! - [`SupabaseRecordStore`]: durable tables over the PostgREST API

mod memory_cache;
mod memory_store;
mod supabase;

pub use memory_cache::InMemoryCache;
pub use memory_store::InMemoryRecordStore;
pub use supabase::SupabaseRecordStore;
