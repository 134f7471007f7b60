//! Byte-oriented key/value backend beneath the cache stores

use std::collections::BTreeMap;
use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::DomainError;

/// Durable key/value engine shared by the response, prompt and embedding namespaces
#[async_trait]
pub trait KvBackend: Send + Sync + Debug {
    /// Writes a value, replacing any previous one
    async fn set(&self, key: &str, value: &[u8]) -> Result<(), DomainError>;

    /// Reads a value; absence is not an error
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, DomainError>;

    /// Deletes a value, returning whether it existed
    async fn delete(&self, key: &str) -> Result<bool, DomainError>;

    /// Returns every entry whose key starts with `prefix`, ordered by key
    async fn scan_prefix(&self, prefix: &str) -> Result<BTreeMap<String, Vec<u8>>, DomainError>;

    /// Counts the entries whose key starts with `prefix`
    async fn count_prefix(&self, prefix: &str) -> Result<usize, DomainError> {
        Ok(self.scan_prefix(prefix).await?.len())
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Mock backend for testing; fails every call once an error is set
    #[derive(Debug, Default)]
    pub struct MockKvBackend {
        entries: Mutex<HashMap<String, Vec<u8>>>,
        error: Mutex<Option<String>>,
    }

    impl MockKvBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_entry(self, key: &str, value: impl Into<Vec<u8>>) -> Self {
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.into());
            self
        }

        pub fn with_error(self, error: impl Into<String>) -> Self {
            *self.error.lock().unwrap() = Some(error.into());
            self
        }

        pub fn contains(&self, key: &str) -> bool {
            self.entries.lock().unwrap().contains_key(key)
        }

        fn check_error(&self) -> Result<(), DomainError> {
            if let Some(error) = self.error.lock().unwrap().clone() {
                return Err(DomainError::storage(error));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl KvBackend for MockKvBackend {
        async fn set(&self, key: &str, value: &[u8]) -> Result<(), DomainError> {
            self.check_error()?;
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_vec());
            Ok(())
        }

        async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, DomainError> {
            self.check_error()?;
            Ok(self.entries.lock().unwrap().get(key).cloned())
        }

        async fn delete(&self, key: &str) -> Result<bool, DomainError> {
            self.check_error()?;
            Ok(self.entries.lock().unwrap().remove(key).is_some())
        }

        async fn scan_prefix(
            &self,
            prefix: &str,
        ) -> Result<BTreeMap<String, Vec<u8>>, DomainError> {
            self.check_error()?;
            Ok(self
                .entries
                .lock()
                .unwrap()
                .iter()
                .filter(|(key, _)| key.starts_with(prefix))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect())
        }
    }
}
