//! Random city names for populations that are not given one.

use rand::Rng;

const NAME_LENGTH: usize = 5;
const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

/// Five random lowercase letters.
pub fn generate_city_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..NAME_LENGTH)
        .map(|_| char::from(ALPHABET[rng.random_range(0..ALPHABET.len())]))
        .collect()
}

/// Draws names until one is not rejected by `is_taken`.
pub fn generate_unique_city_name<R, F>(rng: &mut R, is_taken: F) -> String
where
    R: Rng + ?Sized,
    F: Fn(&str) -> bool,
{
    loop {
        let name = generate_city_name(rng);
        if !is_taken(&name) {
            return name;
        }
    }
}
