//! The blackjack game state machine. One `BlackjackGame` is one live round:
//! it owns both hands and the shoe, walks `PlayerTurn -> DealerTurn -> Complete`,
//! narrates every step as a rendered chat frame, and computes the settlement once
//! the dealer has finished. The session registry owns every live instance, nothing
//! else holds one past a single action call.

use crate::card::{card_name, card_symbol, hand_total, Rank, BUST_LIMIT};
use crate::shoe::Shoe;
use crate::GameError;
use serde::{Deserialize, Serialize};

/// Highest total the dealer keeps drawing on. At 17 or better the dealer stands.
pub const DEALER_DRAW_LIMIT: u32 = 16;

/// Enum for the phase a game is in. Construction deals both hands and enters
/// `PlayerTurn` directly, there is no separate dealt state to observe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum GamePhase {
    /// Waiting on the player to hit or stand.
    PlayerTurn,
    /// The player busted or stood, the dealer's automatic play is owed.
    DealerTurn,
    /// The dealer has finished, the game can be settled.
    Complete,
}

/// Enum for the player-facing result of a settled game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    Win,
    Loss,
    Push,
}

/// Struct for the net credit delta of a finished game. `amount` is the single
/// ledger adjustment to apply: zero on a push, twice the wager on a win and the
/// negated wager on a loss. The wager is never debited up front, so this delta
/// is the only balance mutation a game ever causes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Settlement {
    pub amount: i64,
    pub outcome: GameOutcome,
}

/// Struct for a single live round of blackjack.
#[derive(Debug)]
pub struct BlackjackGame {
    pub game_id: u64,
    /// Channel the game was started from, kept so the front end can route frames.
    pub channel_id: u64,
    /// Display handle of the owning player, shown in every rendered frame.
    pub player_tag: String,
    pub player_hand: Vec<Rank>,
    pub dealer_hand: Vec<Rank>,
    pub wager: i64,
    shoe: Shoe,
    player_status: String,
    dealer_status: String,
    phase: GamePhase,
}

impl BlackjackGame {
    /// Associated function to create a new `BlackjackGame`. Deals two cards to
    /// the player and two to the dealer, interleaved player/dealer/player/dealer
    /// from a fresh shoe, and enters the player's turn. Rejects a wager of zero
    /// or less; the affordability check against the ledger is the caller's job.
    pub fn new(
        game_id: u64,
        channel_id: u64,
        player_tag: &str,
        wager: i64,
    ) -> Result<BlackjackGame, GameError> {
        if wager <= 0 {
            return Err(GameError::InvalidWager(wager));
        }

        let mut shoe = Shoe::new();
        let mut rng = rand::thread_rng();
        let mut player_hand = Vec::new();
        let mut dealer_hand = Vec::new();
        for i in 0..4 {
            let card = shoe.draw(&mut rng);
            if i % 2 == 0 {
                player_hand.push(card);
            } else {
                dealer_hand.push(card);
            }
        }

        Ok(BlackjackGame {
            game_id,
            channel_id,
            player_tag: player_tag.to_string(),
            player_hand,
            dealer_hand,
            wager,
            shoe,
            player_status: "Started game".to_string(),
            dealer_status: String::new(),
            phase: GamePhase::PlayerTurn,
        })
    }

    /// Getter method for the game's current phase.
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Method for drawing one card into the player's hand. Valid only during the
    /// player's turn. Busting is the one transition that happens without an
    /// explicit stand: if the draw pushes the hand past the limit the narration
    /// gains ", went bust" and the game moves straight to the dealer's turn.
    pub fn draw_player_card(&mut self) -> Result<(), GameError> {
        if self.phase != GamePhase::PlayerTurn {
            return Err(GameError::InvalidStateTransition {
                action: "hit",
                phase: self.phase,
            });
        }

        let card = self.shoe.draw(&mut rand::thread_rng());
        self.player_hand.push(card);
        self.player_status = format!("Drew a {}", card_name(card));

        if hand_total(&self.player_hand) > BUST_LIMIT {
            self.player_status.push_str(", went bust");
            self.phase = GamePhase::DealerTurn;
        }
        Ok(())
    }

    /// Method for ending the player's turn voluntarily. Valid only during the
    /// player's turn.
    pub fn stand(&mut self) -> Result<(), GameError> {
        if self.phase != GamePhase::PlayerTurn {
            return Err(GameError::InvalidStateTransition {
                action: "stand",
                phase: self.phase,
            });
        }
        self.player_status = "stand".to_string();
        self.phase = GamePhase::DealerTurn;
        Ok(())
    }

    /// Method for running the dealer's entire automatic turn. Valid exactly once,
    /// at entry to the dealer's turn. Returns one rendered frame per step for the
    /// caller to display with whatever pacing it likes:
    /// first the hole-card reveal (no draw), then one frame per draw while the
    /// dealer's total stays at or under `DEALER_DRAW_LIMIT`, ending on either a
    /// bust or a stand. Afterwards the game is `Complete` and can be settled.
    pub fn take_dealer_turn(&mut self) -> Result<Vec<String>, GameError> {
        if self.phase != GamePhase::DealerTurn {
            return Err(GameError::InvalidStateTransition {
                action: "take the dealer turn",
                phase: self.phase,
            });
        }

        let mut steps = Vec::new();
        self.dealer_status = "Revealed hand".to_string();
        steps.push(self.render());

        loop {
            if hand_total(&self.dealer_hand) <= DEALER_DRAW_LIMIT {
                self.draw_dealer_card();
                steps.push(self.render());
                if hand_total(&self.dealer_hand) > BUST_LIMIT {
                    break;
                }
            } else {
                self.dealer_status = "stand".to_string();
                steps.push(self.render());
                break;
            }
        }

        self.phase = GamePhase::Complete;
        Ok(steps)
    }

    fn draw_dealer_card(&mut self) {
        let card = self.shoe.draw(&mut rand::thread_rng());
        self.dealer_hand.push(card);
        self.dealer_status = format!("Drew a {}", card_name(card));
        if hand_total(&self.dealer_hand) > BUST_LIMIT {
            self.dealer_status.push_str(", went bust");
        }
    }

    /// Method for computing the settlement of a finished game. Valid only once
    /// the dealer's turn has run to completion.
    ///
    /// Equal totals push, and so does a double bust: when both hands go over the
    /// limit the bet is returned, the dealer does not win ties of that kind here.
    /// A win pays out twice the wager, a loss costs the wager.
    pub fn determine_game(&self) -> Result<Settlement, GameError> {
        if self.phase != GamePhase::Complete {
            return Err(GameError::InvalidStateTransition {
                action: "settle",
                phase: self.phase,
            });
        }

        let player_total = hand_total(&self.player_hand);
        let dealer_total = hand_total(&self.dealer_hand);

        let amount = if dealer_total == player_total {
            0
        } else if dealer_total > BUST_LIMIT && player_total > BUST_LIMIT {
            0
        } else if dealer_total > BUST_LIMIT {
            self.wager * 2
        } else if player_total > BUST_LIMIT {
            -self.wager
        } else if player_total > dealer_total {
            self.wager * 2
        } else {
            -self.wager
        };

        let outcome = match amount {
            0 => GameOutcome::Push,
            a if a > 0 => GameOutcome::Win,
            _ => GameOutcome::Loss,
        };
        Ok(Settlement { amount, outcome })
    }

    /// Method for rendering the full game state as one chat frame. The player's
    /// hand and total are always face up; the dealer shows only the first card
    /// until the dealer's turn starts, the rest render as `*****` placeholders
    /// and the dealer's total is withheld.
    pub fn render(&self) -> String {
        let mut frame = format!("{}'s Hand: \n", self.player_tag);
        frame.push_str(&self.render_hand(&self.player_hand, false));
        frame.push_str("\nLast Action: ");
        frame.push_str(&self.player_status);
        frame.push_str("\n\nDealer's Hand: \n");
        frame.push_str(&self.render_hand(&self.dealer_hand, true));
        frame.push_str("\nLast Action: ");
        frame.push_str(&self.dealer_status);
        frame
    }

    fn render_hand(&self, hand: &[Rank], is_dealer: bool) -> String {
        let dealer_revealed = self.phase != GamePhase::PlayerTurn;
        let mut s = String::new();
        for (i, &card) in hand.iter().enumerate() {
            if is_dealer && i >= 1 && !dealer_revealed {
                s.push_str("*****  ");
            } else {
                s.push_str(&format!("**{}**  ", card_symbol(card)));
            }
        }
        s.push_str("\nTotal: ");
        if !is_dealer || dealer_revealed {
            s.push_str(&hand_total(hand).to_string());
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_game(wager: i64) -> BlackjackGame {
        BlackjackGame::new(1, 42, "@tester", wager).unwrap()
    }

    /// Helper that plays a game through the dealer's turn and then replaces both
    /// hands, so settlement rules can be pinned against exact totals.
    fn settled_game(player_hand: Vec<Rank>, dealer_hand: Vec<Rank>) -> BlackjackGame {
        let mut game = new_game(10);
        if game.phase() == GamePhase::PlayerTurn {
            game.stand().unwrap();
        }
        game.take_dealer_turn().unwrap();
        game.player_hand = player_hand;
        game.dealer_hand = dealer_hand;
        game
    }

    #[test]
    fn dealing_gives_each_side_two_cards() {
        let game = new_game(10);
        assert_eq!(game.player_hand.len(), 2);
        assert_eq!(game.dealer_hand.len(), 2);
        assert_eq!(game.shoe.total_drawn(), 4);
        assert_eq!(game.phase(), GamePhase::PlayerTurn);
    }

    #[test]
    fn a_nonpositive_wager_is_rejected() {
        assert_eq!(
            BlackjackGame::new(1, 42, "@tester", 0).unwrap_err(),
            GameError::InvalidWager(0)
        );
        assert_eq!(
            BlackjackGame::new(1, 42, "@tester", -5).unwrap_err(),
            GameError::InvalidWager(-5)
        );
    }

    #[test]
    fn the_dealers_hole_card_is_hidden_until_their_turn() {
        let mut game = new_game(10);
        let frame = game.render();
        assert!(frame.contains("*****"));
        assert!(frame.contains("@tester's Hand: "));
        assert!(frame.contains("Last Action: Started game"));

        game.stand().unwrap();
        let frame = game.render();
        assert!(!frame.contains("*****"));
    }

    #[test]
    fn busting_moves_to_the_dealer_turn_without_a_stand() {
        let mut game = new_game(10);
        // Hitting forever must eventually bust, the total grows on every draw.
        while game.phase() == GamePhase::PlayerTurn {
            game.draw_player_card().unwrap();
        }
        assert!(hand_total(&game.player_hand) > BUST_LIMIT);
        assert!(game.player_status.ends_with(", went bust"));
        assert_eq!(game.phase(), GamePhase::DealerTurn);
    }

    #[test]
    fn the_dealer_draws_to_seventeen_or_bust() {
        for _ in 0..50 {
            let mut game = new_game(10);
            game.stand().unwrap();
            let steps = game.take_dealer_turn().unwrap();

            // At least the reveal frame and one terminal frame.
            assert!(steps.len() >= 2);
            assert!(steps[0].contains("Revealed hand"));

            let total = hand_total(&game.dealer_hand);
            assert!(total > DEALER_DRAW_LIMIT);
            // Every draw was taken at 16 or below.
            if game.dealer_hand.len() > 2 {
                let before_last = &game.dealer_hand[..game.dealer_hand.len() - 1];
                assert!(hand_total(before_last) <= DEALER_DRAW_LIMIT);
            }
            assert_eq!(game.phase(), GamePhase::Complete);
            if total > BUST_LIMIT {
                assert!(steps.last().unwrap().contains(", went bust"));
            } else {
                assert!(steps.last().unwrap().contains("Last Action: stand"));
            }
        }
    }

    #[test]
    fn actions_outside_the_player_turn_are_rejected() {
        let mut game = new_game(10);
        game.stand().unwrap();
        assert!(matches!(
            game.draw_player_card(),
            Err(GameError::InvalidStateTransition { action: "hit", .. })
        ));
        assert!(matches!(
            game.stand(),
            Err(GameError::InvalidStateTransition {
                action: "stand",
                ..
            })
        ));
    }

    #[test]
    fn the_dealer_turn_runs_exactly_once() {
        let mut game = new_game(10);
        assert!(game.take_dealer_turn().is_err());
        game.stand().unwrap();
        assert!(game.take_dealer_turn().is_ok());
        assert!(game.take_dealer_turn().is_err());
    }

    #[test]
    fn settling_before_the_dealer_finishes_is_rejected() {
        let game = new_game(10);
        assert!(matches!(
            game.determine_game(),
            Err(GameError::InvalidStateTransition {
                action: "settle",
                ..
            })
        ));
    }

    #[test]
    fn settlement_pays_double_on_a_win() {
        let game = settled_game(vec![10, 10], vec![10, 9]);
        assert_eq!(
            game.determine_game().unwrap(),
            Settlement {
                amount: 20,
                outcome: GameOutcome::Win
            }
        );
    }

    #[test]
    fn settlement_costs_the_wager_on_a_loss() {
        let game = settled_game(vec![10, 10, 2], vec![10, 9]);
        assert_eq!(
            game.determine_game().unwrap(),
            Settlement {
                amount: -10,
                outcome: GameOutcome::Loss
            }
        );

        let game = settled_game(vec![10, 7], vec![10, 9]);
        assert_eq!(game.determine_game().unwrap().amount, -10);
    }

    #[test]
    fn a_double_bust_is_a_push() {
        let game = settled_game(vec![10, 10, 2], vec![10, 9, 4]);
        assert_eq!(
            game.determine_game().unwrap(),
            Settlement {
                amount: 0,
                outcome: GameOutcome::Push
            }
        );
    }

    #[test]
    fn equal_totals_push() {
        let game = settled_game(vec![10, 8], vec![9, 9]);
        assert_eq!(
            game.determine_game().unwrap(),
            Settlement {
                amount: 0,
                outcome: GameOutcome::Push
            }
        );
    }

    #[test]
    fn a_dealer_bust_pays_the_surviving_player() {
        let game = settled_game(vec![10, 8], vec![10, 9, 5]);
        assert_eq!(
            game.determine_game().unwrap(),
            Settlement {
                amount: 20,
                outcome: GameOutcome::Win
            }
        );
    }
}
