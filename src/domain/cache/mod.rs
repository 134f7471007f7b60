//! Cache domain - response entries, key derivation and the backend contract

mod backend;
mod entry;
mod key;

pub use backend::KvBackend;
pub use entry::CacheEntry;
pub use key::{
    derive_key, embedding_key, prompt_key, strip_embedding_prefix, EMBEDDING_KEY_PREFIX,
    PROMPT_KEY_PREFIX,
};

#[cfg(test)]
pub use backend::mock::MockKvBackend;
