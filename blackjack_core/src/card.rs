//! The card and hand model. Only a card's rank matters for scoring, so suits are
//! never modeled, a card is just its rank and a hand is the ordered list of ranks
//! in the order they were drawn.

use lazy_static::lazy_static;
use std::collections::HashMap;

/// A card's face value, 1 through 13. Rank 1 is an ace, ranks 11, 12 and 13 are
/// the jack, queen and king.
pub type Rank = u8;

/// Highest total a hand can hold without busting.
pub const BUST_LIMIT: u32 = 21;

lazy_static! {
    /// Map from rank to the short symbol used when rendering a hand.
    static ref CARD_SYMBOLS: HashMap<Rank, &'static str> = HashMap::from([
        (1, "A"),
        (2, "2"),
        (3, "3"),
        (4, "4"),
        (5, "5"),
        (6, "6"),
        (7, "7"),
        (8, "8"),
        (9, "9"),
        (10, "10"),
        (11, "J"),
        (12, "Q"),
        (13, "K"),
    ]);

    /// Map from rank to the card's full name, used when narrating a draw.
    static ref CARD_NAMES: HashMap<Rank, &'static str> = HashMap::from([
        (1, "Ace"),
        (2, "Two"),
        (3, "Three"),
        (4, "Four"),
        (5, "Five"),
        (6, "Six"),
        (7, "Seven"),
        (8, "Eight"),
        (9, "Nine"),
        (10, "Ten"),
        (11, "Jack"),
        (12, "Queen"),
        (13, "King"),
    ]);
}

/// Function for getting the display symbol of a rank, e.g. `A` or `10` or `K`.
pub fn card_symbol(rank: Rank) -> &'static str {
    CARD_SYMBOLS[&rank]
}

/// Function for getting the full name of a rank, e.g. `Ace` or `King`.
pub fn card_name(rank: Rank) -> &'static str {
    CARD_NAMES[&rank]
}

/// Function for computing the best total of a hand.
///
/// Ranks are visited in descending order so the high cards are summed first and
/// aces come last. An ace counts as 1 whenever 11 would bust the hand, and the
/// 11 value is only ever used when the hand holds exactly one ace, a hand with
/// two or more aces values every one of them at 1. That undercounts some
/// multi-ace soft totals (two aces and a nine comes out as 11, not 21) but it is
/// the behavior every game in production has settled against, so it stays.
pub fn hand_total(hand: &[Rank]) -> u32 {
    let mut ranks = hand.to_vec();
    ranks.sort_unstable_by(|a, b| b.cmp(a));
    let num_aces = hand.iter().filter(|&&r| r == 1).count();

    let mut total = 0;
    for rank in ranks {
        total += match rank {
            1 if total + 11 > BUST_LIMIT => 1,
            1 if num_aces == 1 => 11,
            1 => 1,
            r if r > 10 => 10,
            r => r as u32,
        };
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_without_aces_are_plain_sums() {
        assert_eq!(hand_total(&[2, 3, 4]), 9);
        assert_eq!(hand_total(&[10, 9]), 19);
        // Face cards are all worth ten
        assert_eq!(hand_total(&[11, 12, 13]), 30);
        assert_eq!(hand_total(&[13, 5]), 15);
    }

    #[test]
    fn single_ace_counts_as_eleven_when_it_fits() {
        assert_eq!(hand_total(&[1, 10]), 21);
        assert_eq!(hand_total(&[1, 5]), 16);
        assert_eq!(hand_total(&[1, 13]), 21);
    }

    #[test]
    fn single_ace_falls_back_to_one_when_eleven_busts() {
        assert_eq!(hand_total(&[1, 10, 5]), 16);
        assert_eq!(hand_total(&[1, 13, 12]), 21);
    }

    #[test]
    fn multi_ace_hands_value_every_ace_at_one() {
        // The single-soft-ace rule: with more than one ace in the hand the
        // eleven branch is never taken, so a pair of aces is 2, not 12 or 22.
        assert_eq!(hand_total(&[1, 1]), 2);
        assert_eq!(hand_total(&[1, 1, 9]), 11);
        assert_eq!(hand_total(&[1, 1, 1]), 3);
        assert_eq!(hand_total(&[1, 1, 13, 9]), 21);
    }

    #[test]
    fn a_total_never_busts_from_aces_alone() {
        let hand = [1, 1, 1, 1];
        assert!(hand_total(&hand) <= BUST_LIMIT);
    }

    #[test]
    fn symbols_and_names_cover_every_rank() {
        for rank in 1..=13 {
            assert!(!card_symbol(rank).is_empty());
            assert!(!card_name(rank).is_empty());
        }
        assert_eq!(card_symbol(1), "A");
        assert_eq!(card_symbol(10), "10");
        assert_eq!(card_name(13), "King");
    }
}
