pub mod r#trait {
    pub use super::trait_::*;
}
#[path = "trait.rs"]
mod trait_;
pub mod key;
pub mod memory;

pub use key::KeyLayout;
pub use memory::{MemoryWhitelistStore, PURGE_EVERY_WRITES};
pub use r#trait::WhitelistStore;

#[cfg(test)]
mod tests;
