//! Random six-digit ticket numbers.

use bid_lotto_shared::{TICKET_NUMBER_DIGITS, TICKET_NUMBER_SPACE};
use rand::Rng;
use std::collections::HashSet;

use crate::error::AppError;

/// Format a value in `0..TICKET_NUMBER_SPACE` as a zero-padded ticket number.
pub fn format_number(value: u32) -> String {
    format!("{:0width$}", value, width = TICKET_NUMBER_DIGITS)
}

/// Draw `count` distinct ticket numbers by rejection sampling, in draw order.
pub fn unique_numbers<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Result<Vec<String>, AppError> {
    if count > TICKET_NUMBER_SPACE as usize {
        return Err(AppError::Validation(format!(
            "Cannot generate {} distinct numbers from a space of {}",
            count, TICKET_NUMBER_SPACE
        )));
    }

    let mut seen = HashSet::with_capacity(count);
    let mut numbers = Vec::with_capacity(count);

    while numbers.len() < count {
        let value = rng.gen_range(0..TICKET_NUMBER_SPACE);
        if seen.insert(value) {
            numbers.push(format_number(value));
        }
    }

    Ok(numbers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn numbers_are_zero_padded() {
        assert_eq!(format_number(42), "000042");
        assert_eq!(format_number(999_999), "999999");
    }

    #[test]
    fn generates_requested_count_of_distinct_numbers() {
        let mut rng = StdRng::seed_from_u64(7);
        let numbers = unique_numbers(&mut rng, 500).unwrap();

        assert_eq!(numbers.len(), 500);
        let distinct: HashSet<_> = numbers.iter().collect();
        assert_eq!(distinct.len(), 500);
        assert!(numbers
            .iter()
            .all(|n| n.len() == TICKET_NUMBER_DIGITS && n.chars().all(|c| c.is_ascii_digit())));
    }

    #[test]
    fn zero_count_is_empty() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(unique_numbers(&mut rng, 0).unwrap().is_empty());
    }

    #[test]
    fn rejects_count_beyond_number_space() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(unique_numbers(&mut rng, TICKET_NUMBER_SPACE as usize + 1).is_err());
    }
}
