mod model;

pub use model::SelectionEntry;

use chrono::{Duration, Utc};
use rand::{distributions::Alphanumeric, Rng};

use crate::storage::MemoryCache;

pub const TOKEN_LEN: usize = 8;

/// Maps short opaque tokens to the link they were rendered for, so a button
/// payload can carry the token instead of the whole URL.
#[derive(Clone)]
pub struct SelectionService {
    entries: MemoryCache<String, SelectionEntry>,
}

impl SelectionService {
    pub fn new() -> Self {
        info!("Initializing selection service");
        Self {
            entries: MemoryCache::new(256),
        }
    }

    /// Stores `url` under a freshly generated token. Every call yields a new token,
    /// even for a URL that is already stored.
    pub fn put(&self, url: &str) -> String {
        loop {
            let token = generate_token();
            let entry = SelectionEntry {
                url: url.to_string(),
                created_at: Utc::now(),
            };
            if self.entries.set_if_absent(token.clone(), entry) {
                return token;
            }
            warn!("selection token collision on {}, regenerating", token);
        }
    }

    pub fn resolve(&self, token: &str) -> Option<String> {
        self.entries.get(&token.to_string()).map(|entry| entry.url)
    }

    pub fn remove(&self, token: &str) {
        self.entries.del(&token.to_string());
    }

    /// Evicts tokens created more than `ttl` ago.
    pub fn purge_older_than(&self, ttl: Duration) -> usize {
        let Some(cutoff) = Utc::now().checked_sub_signed(ttl) else {
            return 0;
        };
        self.entries.retain(|_, entry| entry.created_at > cutoff)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl Default for SelectionService {
    fn default() -> Self {
        Self::new()
    }
}

fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}
