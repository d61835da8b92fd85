use rand::{rngs::StdRng, seq::SliceRandom, Rng, RngCore, SeedableRng};

const TOKEN_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

#[derive(Debug, Clone)]
pub struct RngState {
    rng: StdRng,
}

impl RngState {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self::from_seed(rand::random())
    }

    pub fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    /// Independent stream derived from this one.
    pub fn fork(&mut self) -> Self {
        Self::from_seed(self.next_u64())
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }

    /// Upper-case alphanumeric token, used for room codes.
    pub fn token(&mut self, len: usize) -> String {
        (0..len)
            .map(|_| TOKEN_ALPHABET[self.rng.gen_range(0..TOKEN_ALPHABET.len())] as char)
            .collect()
    }
}
