pub mod whitelist;

pub use whitelist::{KeyLayout, MemoryWhitelistStore, WhitelistStore};
