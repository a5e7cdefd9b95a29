//! The shoe a single game draws from. Rather than shuffling a concrete deck up
//! front, the shoe samples ranks uniformly and tracks how many copies of each
//! rank are already out across both hands, rejecting any rank that has hit its
//! cap. One shoe is scoped to one game, it is never shared between tables.

use crate::card::Rank;
use rand::Rng;

/// How many copies of each rank one game may draw.
pub const RANK_COPIES: u8 = 4;

/// Struct tracking the number of copies of each rank drawn so far in one game.
#[derive(Debug)]
pub struct Shoe {
    counts: [u8; 13],
}

impl Shoe {
    /// Associated function to create a fresh `Shoe` with no cards drawn.
    pub fn new() -> Shoe {
        Shoe { counts: [0; 13] }
    }

    /// Method for drawing a uniformly random rank that has not been exhausted.
    /// Resamples while the sampled rank already has `RANK_COPIES` copies out,
    /// then records the draw and returns the rank.
    pub fn draw<R: Rng>(&mut self, rng: &mut R) -> Rank {
        // A single game draws nowhere near 52 cards, so an exhausted shoe means
        // the shoe was reused across games. Fail loudly instead of spinning.
        assert!(
            self.counts.iter().any(|&c| c < RANK_COPIES),
            "shoe exhausted, every rank has {} copies out",
            RANK_COPIES
        );
        loop {
            let rank: Rank = rng.gen_range(1..=13);
            let slot = &mut self.counts[(rank - 1) as usize];
            if *slot < RANK_COPIES {
                *slot += 1;
                return rank;
            }
        }
    }

    /// Getter method for the number of copies of `rank` drawn so far.
    pub fn drawn(&self, rank: Rank) -> u8 {
        self.counts[(rank - 1) as usize]
    }

    /// Method for the total number of cards drawn from this shoe.
    pub fn total_drawn(&self) -> u32 {
        self.counts.iter().map(|&c| c as u32).sum()
    }
}

impl Default for Shoe {
    fn default() -> Self {
        Shoe::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn draws_never_exceed_the_per_rank_cap() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut shoe = Shoe::new();
        for _ in 0..44 {
            let rank = shoe.draw(&mut rng);
            assert!((1..=13).contains(&rank));
            assert!(shoe.drawn(rank) <= RANK_COPIES);
        }
        assert_eq!(shoe.total_drawn(), 44);
    }

    #[test]
    fn rejection_sampling_finds_the_last_remaining_rank() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut shoe = Shoe::new();
        for _ in 0..51 {
            shoe.draw(&mut rng);
        }
        // Exactly one rank has a copy left, the next draw must return it.
        let remaining: Vec<Rank> = (1..=13).filter(|&r| shoe.drawn(r) < RANK_COPIES).collect();
        assert_eq!(remaining.len(), 1);
        assert_eq!(shoe.draw(&mut rng), remaining[0]);
        assert_eq!(shoe.total_drawn(), 52);
    }

    #[test]
    #[should_panic(expected = "shoe exhausted")]
    fn drawing_from_an_exhausted_shoe_panics() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut shoe = Shoe::new();
        for _ in 0..53 {
            shoe.draw(&mut rng);
        }
    }
}
