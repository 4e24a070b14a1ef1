use rand::Rng;
use rand::distr::{Alphanumeric, SampleString};

/// Length of the SSH password generated when none is given on the command line.
pub const DEFAULT_PASSWORD_LENGTH: usize = 16;

/// Generate a password of `len` characters drawn uniformly from `[a-zA-Z0-9]`.
///
/// The random source is passed in so callers can use the thread-local CSPRNG
/// while tests use a seeded generator.
pub fn generate_password<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    Alphanumeric.sample_string(rng, len)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_length_and_alphabet() {
        let mut rng = rand::rng();
        for len in 0..=64 {
            let password = generate_password(&mut rng, len);
            assert_eq!(password.len(), len);
            assert!(password.chars().all(|c| c.is_ascii_alphanumeric()), "{password}");
        }
    }

    #[test]
    fn test_reproducible_with_seed() {
        let a = generate_password(&mut StdRng::seed_from_u64(42), DEFAULT_PASSWORD_LENGTH);
        let b = generate_password(&mut StdRng::seed_from_u64(42), DEFAULT_PASSWORD_LENGTH);
        assert_eq!(a, b);

        let c = generate_password(&mut StdRng::seed_from_u64(43), DEFAULT_PASSWORD_LENGTH);
        assert_ne!(a, c);
    }

    #[test]
    fn test_covers_alphabet() {
        // 62 symbols over 10k draws; missing any one of them is vanishingly unlikely
        let password = generate_password(&mut StdRng::seed_from_u64(0), 10_000);
        for c in ('a'..='z').chain('A'..='Z').chain('0'..='9') {
            assert!(password.contains(c), "missing {c}");
        }
    }
}
