// Service exports
pub mod memory;
pub mod store;
pub mod supabase;

pub use memory::MemoryStore;
pub use store::{ProfileStore, MatchLog, FileStore, IdentityProvider, StoreError};
pub use supabase::{SupabaseClient, SupabaseTables, SupabaseError};
