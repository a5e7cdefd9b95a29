//! Core engine for the chat casino's blackjack tables. This crate holds the pure
//! in-memory game logic: the card and hand model, the per-game shoe, the game state
//! machine and the session registry that maps each player to at most one live game.
//! The front end (command parsing, message pacing, persistence) lives in the
//! `blackjack_bot` crate and talks to this one through `SessionRegistry` and the
//! `CreditLedger` trait.

pub mod card;
pub mod game;
pub mod ledger;
pub mod session;
pub mod shoe;

pub mod prelude {
    pub use crate::card::{card_name, card_symbol, hand_total, Rank};
    pub use crate::game::{BlackjackGame, GameOutcome, GamePhase, Settlement};
    pub use crate::ledger::{CreditLedger, InMemoryLedger, STARTING_CREDITS};
    pub use crate::session::{PlayerAction, SessionRegistry, Transcript};
    pub use crate::shoe::Shoe;
    pub use crate::GameError;
}

use crate::game::GamePhase;
use std::error::Error;
use std::fmt::Display;

/// Enum for every rejection the core reports to its caller. All of these are
/// recoverable, the dispatcher is expected to render them back to the player
/// rather than crash. The only fatal condition in the whole core is shoe
/// exhaustion, which is asserted in `shoe::Shoe::draw` instead of surfaced here
/// since no single game can draw enough cards to reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// A wager of zero or less was placed.
    InvalidWager(i64),
    /// The player's ledger balance cannot cover the wager.
    InsufficientBalance { required: i64, available: i64 },
    /// The player already has a game in flight.
    AlreadyInGame(String),
    /// The player has no game in flight.
    NotInGame(String),
    /// An action was attempted in a phase that does not allow it.
    InvalidStateTransition {
        action: &'static str,
        phase: GamePhase,
    },
    /// The balance store behind `CreditLedger` failed.
    Ledger(String),
}

impl Display for GameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameError::InvalidWager(wager) => {
                write!(f, "{} is not a valid bet, bets must be positive", wager)
            }
            GameError::InsufficientBalance {
                required,
                available,
            } => write!(
                f,
                "not enough credits to place bet, needed {} but only {} available",
                required, available
            ),
            GameError::AlreadyInGame(player) => {
                write!(f, "player {} already has a game in progress", player)
            }
            GameError::NotInGame(player) => {
                write!(f, "player {} has no game in progress", player)
            }
            GameError::InvalidStateTransition { action, phase } => {
                write!(f, "cannot {} during the {:?} phase", action, phase)
            }
            GameError::Ledger(msg) => write!(f, "ledger error: {}", msg),
        }
    }
}

impl Error for GameError {}
