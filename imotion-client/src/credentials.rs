//! Round-robin API credential rotation
//!
//! The service rate-limits per key, so requests are spread across every
//! configured key in a fixed cyclic order. There is no fallback: a key that
//! fails still gets its turn on the next cycle.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{ClientError, Result};

/// Non-empty set of interchangeable API keys with a rotation cursor
pub struct Credentials {
    keys: Vec<String>,
    cursor: AtomicUsize,
}

impl Credentials {
    /// Builds a credential set, ignoring blank keys
    ///
    /// # Errors
    /// Returns [`ClientError::Config`] if no usable key remains.
    pub fn new<I, S>(keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keys: Vec<String> = keys
            .into_iter()
            .map(|k| k.as_ref().trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();

        if keys.is_empty() {
            return Err(ClientError::Config(
                "at least one API key is required".to_string(),
            ));
        }

        Ok(Self {
            keys,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Returns the key for the next call and advances the cursor
    pub fn next_key(&self) -> &str {
        let len = self.keys.len();
        let (Ok(index) | Err(index)) =
            self.cursor
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |c| Some((c + 1) % len));
        tracing::trace!("Using API key slot {}/{}", index + 1, len);
        &self.keys[index]
    }

    /// Number of configured keys
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("keys", &format_args!("<{} redacted>", self.keys.len()))
            .field("cursor", &self.cursor.load(Ordering::SeqCst))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_set() {
        assert!(Credentials::new(Vec::<String>::new()).is_err());
        assert!(Credentials::new(["", "  "]).is_err());
    }

    #[test]
    fn test_round_robin_visits_every_key_once_per_cycle() {
        let creds = Credentials::new(["a", "b", "c"]).unwrap();
        let first: Vec<_> = (0..3).map(|_| creds.next_key().to_string()).collect();
        assert_eq!(first, vec!["a", "b", "c"]);

        let second: Vec<_> = (0..3).map(|_| creds.next_key().to_string()).collect();
        assert_eq!(second, first);
    }

    #[test]
    fn test_cycle_starts_from_current_cursor() {
        let creds = Credentials::new(["a", "b", "c"]).unwrap();
        creds.next_key();

        let window: Vec<_> = (0..3).map(|_| creds.next_key().to_string()).collect();
        assert_eq!(window, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_independent_sets_do_not_share_cursor() {
        let one = Credentials::new(["a", "b"]).unwrap();
        let two = Credentials::new(["a", "b"]).unwrap();
        one.next_key();
        assert_eq!(two.next_key(), "a");
    }

    #[test]
    fn test_debug_redacts_keys() {
        let creds = Credentials::new(["secret-key"]).unwrap();
        assert!(!format!("{:?}", creds).contains("secret-key"));
    }
}
