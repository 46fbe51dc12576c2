use super::{IIdempotencyRepo, IdempotencyKey};
use std::sync::Mutex;

pub struct InMemoryIdempotencyRepo {
    keys: Mutex<Vec<IdempotencyKey>>,
}

impl InMemoryIdempotencyRepo {
    pub fn new() -> Self {
        Self {
            keys: Mutex::new(Vec::new()),
        }
    }
}

impl Default for InMemoryIdempotencyRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IIdempotencyRepo for InMemoryIdempotencyRepo {
    async fn insert(&self, key: &IdempotencyKey) -> anyhow::Result<()> {
        let mut keys = self.keys.lock().unwrap();
        keys.push(key.clone());
        Ok(())
    }

    async fn exists(&self, key: &str) -> bool {
        let keys = self.keys.lock().unwrap();
        keys.iter().any(|k| k.key == key)
    }
}
