//! Memoizing wrapper around an extractor.

use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Mutex;

use rust_decimal::Decimal;
use tracing::debug;

use super::{Result, TransactionExtractor};
use crate::models::record::TransactionRecord;

const DEFAULT_CAPACITY: usize = 1024;

#[derive(Debug)]
struct CacheEntry {
    text: String,
    /// Serialized form, so `200.0` and `200.000` are different keys.
    prior_balance: Option<[u8; 16]>,
    result: Result<TransactionRecord>,
}

/// Caches results by input text and prior balance.
///
/// A hit is only returned when the stored text and balance equal the request
/// exactly, scale included, so a hash collision just costs a full parse. Once `capacity`
/// entries are stored new results are no longer inserted.
#[derive(Debug)]
pub struct CachedExtractor<E> {
    inner: E,
    entries: Mutex<HashMap<u64, CacheEntry>>,
    capacity: usize,
}

impl<E: TransactionExtractor> CachedExtractor<E> {
    pub fn new(inner: E) -> Self {
        Self::with_capacity(inner, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(inner: E, capacity: usize) -> Self {
        Self {
            inner,
            entries: Mutex::new(HashMap::new()),
            capacity,
        }
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    /// Number of cached results.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, key: u64, text: &str, prior_balance: Option<Decimal>) -> Option<Result<TransactionRecord>> {
        let entries = self.entries.lock().ok()?;
        entries
            .get(&key)
            .filter(|entry| entry.text == text && entry.prior_balance == prior_balance.map(|b| b.serialize()))
            .map(|entry| entry.result.clone())
    }

    fn store(&self, key: u64, text: &str, prior_balance: Option<Decimal>, result: &Result<TransactionRecord>) {
        let Ok(mut entries) = self.entries.lock() else {
            return;
        };
        if entries.len() >= self.capacity && !entries.contains_key(&key) {
            return;
        }
        entries.insert(
            key,
            CacheEntry {
                text: text.to_string(),
                prior_balance: prior_balance.map(|b| b.serialize()),
                result: result.clone(),
            },
        );
    }
}

impl<E: TransactionExtractor> TransactionExtractor for CachedExtractor<E> {
    fn extract(&self, text: &str, prior_balance: Option<Decimal>) -> Result<TransactionRecord> {
        let key = cache_key(text, prior_balance);

        if let Some(result) = self.lookup(key, text, prior_balance) {
            debug!("Cache hit for {:016x}", key);
            return result;
        }

        let result = self.inner.extract(text, prior_balance);
        self.store(key, text, prior_balance, &result);
        result
    }
}

fn cache_key(text: &str, prior_balance: Option<Decimal>) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    prior_balance.map(|b| b.serialize()).hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Extractor;
    use std::cell::Cell;
    use std::str::FromStr;

    const TEXT: &str = "Date: 2025-01-05\nDescription: TEA\nAmount: -5.00\nBalance: 95.00";

    struct Counting {
        inner: Extractor,
        calls: Cell<usize>,
    }

    impl TransactionExtractor for Counting {
        fn extract(&self, text: &str, prior_balance: Option<Decimal>) -> Result<TransactionRecord> {
            self.calls.set(self.calls.get() + 1);
            self.inner.extract(text, prior_balance)
        }
    }

    fn counting() -> Counting {
        Counting { inner: Extractor::default(), calls: Cell::new(0) }
    }

    #[test]
    fn test_cached_matches_uncached() {
        let plain = Extractor::default();
        let cached = CachedExtractor::new(Extractor::default());
        let prior = Some(Decimal::from_str("100.00").unwrap());

        for _ in 0..2 {
            assert_eq!(cached.extract(TEXT, prior), plain.extract(TEXT, prior));
            assert_eq!(cached.extract(TEXT, None), plain.extract(TEXT, None));
            assert_eq!(cached.extract("", None), plain.extract("", None));
        }
        assert_eq!(cached.len(), 3);
    }

    #[test]
    fn test_hit_skips_inner() {
        let cached = CachedExtractor::new(counting());
        cached.extract(TEXT, None).unwrap();
        cached.extract(TEXT, None).unwrap();
        assert_eq!(cached.inner().calls.get(), 1);
    }

    #[test]
    fn test_prior_balance_is_part_of_key() {
        let cached = CachedExtractor::new(counting());
        let ok = cached.extract(TEXT, Some(Decimal::from_str("100.00").unwrap()));
        let mismatch = cached.extract(TEXT, Some(Decimal::from_str("500.00").unwrap()));

        assert!(ok.is_ok());
        assert_eq!(mismatch.unwrap_err().kind(), "balanceMismatch");
        assert_eq!(cached.inner().calls.get(), 2);
    }

    #[test]
    fn test_prior_balance_scale_is_kept() {
        let plain = Extractor::default();
        let cached = CachedExtractor::new(counting());
        let coarse = Some(Decimal::from_str("200.0").unwrap());
        let fine = Some(Decimal::from_str("200.000").unwrap());

        let first = cached.extract(TEXT, fine).unwrap_err();
        let second = cached.extract(TEXT, coarse).unwrap_err();

        assert_eq!(first.to_string(), plain.extract(TEXT, fine).unwrap_err().to_string());
        assert_eq!(second.to_string(), plain.extract(TEXT, coarse).unwrap_err().to_string());
        assert_ne!(first.to_string(), second.to_string());
        assert_eq!(cached.inner().calls.get(), 2);
    }

    #[test]
    fn test_capacity_bound() {
        let cached = CachedExtractor::with_capacity(counting(), 1);
        cached.extract(TEXT, None).unwrap();
        cached.extract("Date: 2025-01-06\nDescription: BUN\nAmount: -2.00", None).unwrap();
        assert_eq!(cached.len(), 1);
    }
}
