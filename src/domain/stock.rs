//! Stock number generation
//!
//! Variants carry a human-readable stock number: the creation date followed
//! by a random six-digit token, e.g. `20260828-048213`. The date prefix makes
//! codes sortable at a glance; the `stock_number` column's unique index is
//! what actually guarantees uniqueness.

use chrono::Utc;
use rand::Rng;

/// Generate a date-prefixed stock number for a new product variant.
pub fn generate() -> String {
    let date = Utc::now().format("%Y%m%d");
    let token: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{}-{:06}", date, token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format() {
        let stock = generate();
        let (date, token) = stock.split_once('-').expect("missing separator");
        assert_eq!(date.len(), 8);
        assert!(date.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(token.len(), 6);
        assert!(token.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_date_prefix_is_today() {
        let stock = generate();
        let today = Utc::now().format("%Y%m%d").to_string();
        assert!(stock.starts_with(&today));
    }
}
