//! Card selection.
//!
//! The daily pick is a pure function of `(day, user)`: the pair is folded into
//! a 64-bit seed, so no per-user storage is needed to hand out the same card all
//! day long.

use chrono::{NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::catalog::{CardId, Catalog};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SelectError {
    #[error("no cards are loaded")]
    EmptyCatalog,
}

/// Seed text for a daily pick: `YYYYMMDD` followed by the decimal user id.
pub fn daily_seed(day: NaiveDate, user_id: i64) -> String {
    format!("{}{}", day.format("%Y%m%d"), user_id)
}

/// Polynomial string hash (`h = h * 31 + c`), wrapping on overflow.
pub fn seed_hash(seed: &str) -> i64 {
    seed.chars()
        .fold(0i64, |hash, c| hash.wrapping_mul(31).wrapping_add(c as i64))
}

/// Index of today's card for `user_id` in a catalog of `len` entries.
pub fn daily_index(len: usize, day: NaiveDate, user_id: i64) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let seed = seed_hash(&daily_seed(day, user_id));
    let mut rng = StdRng::seed_from_u64(seed as u64);
    Some(rng.random_range(0..len))
}

/// The card `user_id` gets on `day`. Same inputs, same card.
pub fn select_daily(
    catalog: &Catalog,
    user_id: i64,
    day: NaiveDate,
) -> Result<CardId, SelectError> {
    daily_index(catalog.len(), day, user_id)
        .and_then(|index| catalog.get(index))
        .ok_or(SelectError::EmptyCatalog)
}

/// A card drawn from a generator seeded with the current time.
pub fn select_random(catalog: &Catalog) -> Result<CardId, SelectError> {
    if catalog.is_empty() {
        return Err(SelectError::EmptyCatalog);
    }
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let mut rng = StdRng::seed_from_u64(nanos as u64);
    let index = rng.random_range(0..catalog.len());
    catalog.get(index).ok_or(SelectError::EmptyCatalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn catalog(n: u32) -> Catalog {
        Catalog::from_entries("images", (1..=n).map(|i| i * 10).collect())
    }

    #[test]
    fn test_daily_seed_format() {
        assert_eq!(daily_seed(day(2024, 3, 5), 42), "2024030542");
        assert_eq!(daily_seed(day(2024, 12, 31), -1001), "20241231-1001");
    }

    #[test]
    fn test_seed_hash_small_values() {
        assert_eq!(seed_hash(""), 0);
        assert_eq!(seed_hash("a"), 97);
        assert_eq!(seed_hash("ab"), 97 * 31 + 98);
        assert_eq!(seed_hash("2"), 50);
    }

    #[test]
    fn test_seed_hash_overflowing_vectors() {
        // Both seeds overflow i64; values follow two's-complement wraparound.
        let group = daily_seed(day(2024, 12, 31), -1001234567890);
        assert_eq!(group, "20241231-1001234567890");
        assert_eq!(seed_hash(&group), 3731048318097002302);

        let user = daily_seed(day(2025, 6, 1), 12345);
        assert_eq!(seed_hash(&user), 3751683115860129323);
    }

    #[test]
    fn test_daily_is_deterministic() {
        let catalog = catalog(50);
        let today = day(2025, 6, 1);
        let first = select_daily(&catalog, 123456789, today).unwrap();
        let second = select_daily(&catalog, 123456789, today).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_daily_result_is_in_catalog() {
        let catalog = catalog(7);
        for user in 0..200 {
            let index = daily_index(catalog.len(), day(2025, 1, 15), user).unwrap();
            assert!(index < catalog.len());
            let id = select_daily(&catalog, user, day(2025, 1, 15)).unwrap();
            assert!(catalog.contains(id));
        }
    }

    #[test]
    fn test_daily_users_mostly_diverge() {
        let catalog = catalog(100);
        let today = day(2025, 9, 9);
        let same = (0..200i64)
            .filter(|&u| {
                select_daily(&catalog, u, today).unwrap()
                    == select_daily(&catalog, u + 1000, today).unwrap()
            })
            .count();
        assert!(same < 100, "{} of 200 pairs coincided", same);
    }

    #[test]
    fn test_daily_days_mostly_diverge() {
        let catalog = catalog(100);
        let start = day(2025, 1, 1);
        let first = select_daily(&catalog, 77, start).unwrap();
        let same = (1..60)
            .filter(|&offset| {
                let d = start + chrono::Duration::days(offset);
                select_daily(&catalog, 77, d).unwrap() == first
            })
            .count();
        assert!(same < 30);
    }

    #[test]
    fn test_single_entry_catalog_always_picks_it() {
        let catalog = Catalog::from_entries("images", vec![5]);
        assert_eq!(select_daily(&catalog, 1, day(2025, 2, 2)), Ok(5));
        assert_eq!(select_random(&catalog), Ok(5));
    }

    #[test]
    fn test_empty_catalog_is_an_error() {
        let catalog = Catalog::from_entries("images", Vec::new());
        assert_eq!(
            select_daily(&catalog, 1, day(2025, 2, 2)),
            Err(SelectError::EmptyCatalog)
        );
        assert_eq!(select_random(&catalog), Err(SelectError::EmptyCatalog));
        assert_eq!(daily_index(0, day(2025, 2, 2), 1), None);
    }

    #[test]
    fn test_random_result_is_in_catalog() {
        let catalog = catalog(13);
        for _ in 0..100 {
            let id = select_random(&catalog).unwrap();
            assert!(catalog.contains(id));
        }
    }
}
