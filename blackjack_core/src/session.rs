//! The session registry: the single shared map from player identity to that
//! player's one live game. Every mutation of a game flows through here, under
//! one lock, so two near-simultaneous deals from the same player can never both
//! create a game. The registry also carries the one dispatch function the front
//! end calls with a parsed `PlayerAction`.

use crate::game::{BlackjackGame, GamePhase, Settlement};
use crate::ledger::CreditLedger;
use crate::GameError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Enum for the actions a player command can resolve to. `Deal` opens a session,
/// the other two act on the session already in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerAction {
    Deal { wager: i64 },
    Hit,
    Stand,
}

/// Struct for the result of one dispatched action: the ordered frames to show
/// the player (the caller decides the pacing between them) and, once the round
/// has ended, the settlement that was applied.
#[derive(Clone, Debug)]
pub struct Transcript {
    pub frames: Vec<String>,
    pub round_over: bool,
    pub settlement: Option<Settlement>,
}

/// Struct mapping each player identity to at most one live `BlackjackGame`.
/// The registry exclusively owns every live game.
pub struct SessionRegistry {
    games: Mutex<HashMap<String, BlackjackGame>>,
    next_game_id: AtomicU64,
}

impl SessionRegistry {
    /// Associated function to create a new, empty `SessionRegistry`.
    pub fn new() -> SessionRegistry {
        SessionRegistry {
            games: Mutex::new(HashMap::new()),
            next_game_id: AtomicU64::new(1),
        }
    }

    /// Method for opening a new game for `player_id` and dealing its hands.
    /// Returns the first rendered frame. Rejects the deal if the player already
    /// has a game in flight; that check and the insertion happen under one lock.
    /// The wager-affordability check is the caller's job (see `dispatch`), the
    /// registry never touches the ledger here.
    pub fn start_game(
        &self,
        player_id: &str,
        player_tag: &str,
        channel_id: u64,
        wager: i64,
    ) -> Result<String, GameError> {
        let mut games = self.games.lock().unwrap();
        if games.contains_key(player_id) {
            return Err(GameError::AlreadyInGame(player_id.to_string()));
        }
        let game_id = self.next_game_id.fetch_add(1, Ordering::Relaxed);
        let game = BlackjackGame::new(game_id, channel_id, player_tag, wager)?;
        let frame = game.render();
        games.insert(player_id.to_string(), game);
        Ok(frame)
    }

    /// Method for checking whether a player currently has a game in flight.
    pub fn in_game(&self, player_id: &str) -> bool {
        self.games.lock().unwrap().contains_key(player_id)
    }

    /// Method for the number of live sessions.
    pub fn active_games(&self) -> usize {
        self.games.lock().unwrap().len()
    }

    /// Method for looking at a player's live game without taking it out of the
    /// registry. The closure runs under the registry lock, keep it short.
    pub fn with_game<T>(
        &self,
        player_id: &str,
        f: impl FnOnce(&BlackjackGame) -> T,
    ) -> Result<T, GameError> {
        let games = self.games.lock().unwrap();
        let game = games
            .get(player_id)
            .ok_or_else(|| GameError::NotInGame(player_id.to_string()))?;
        Ok(f(game))
    }

    /// Method for re-rendering a player's current game state.
    pub fn render_game(&self, player_id: &str) -> Result<String, GameError> {
        self.with_game(player_id, |game| game.render())
    }

    /// Method for applying a mid-round action to a player's game. A hit that
    /// does not bust produces a single frame; a stand or a bust also runs the
    /// dealer's whole automatic turn, so the transcript carries every dealer
    /// frame and `round_over` is set. The settlement itself is left to
    /// `settle` / `dispatch`.
    pub fn apply_action(
        &self,
        player_id: &str,
        action: PlayerAction,
    ) -> Result<Transcript, GameError> {
        let mut games = self.games.lock().unwrap();
        let game = games
            .get_mut(player_id)
            .ok_or_else(|| GameError::NotInGame(player_id.to_string()))?;

        match action {
            PlayerAction::Deal { .. } => {
                // A deal can never act on a live session.
                return Err(GameError::AlreadyInGame(player_id.to_string()));
            }
            PlayerAction::Hit => game.draw_player_card()?,
            PlayerAction::Stand => game.stand()?,
        }

        let mut frames = vec![game.render()];
        let mut round_over = false;
        if game.phase() == GamePhase::DealerTurn {
            frames.extend(game.take_dealer_turn()?);
            round_over = true;
        }
        Ok(Transcript {
            frames,
            round_over,
            settlement: None,
        })
    }

    /// Method for settling and removing a player's finished game. Rejects the
    /// call while the dealer still owes their turn, leaving the game in place;
    /// on success the session is gone and the settlement is returned for the
    /// caller to apply to the ledger.
    pub fn settle(&self, player_id: &str) -> Result<Settlement, GameError> {
        let mut games = self.games.lock().unwrap();
        let game = games
            .get(player_id)
            .ok_or_else(|| GameError::NotInGame(player_id.to_string()))?;
        let settlement = game.determine_game()?;
        games.remove(player_id);
        Ok(settlement)
    }

    /// Method for dropping a player's session no matter what state it is in.
    /// Does nothing if the player has no session, abandoning twice is fine.
    pub fn end_game(&self, player_id: &str) {
        self.games.lock().unwrap().remove(player_id);
    }

    /// Method for running one player command end to end: the wager check and
    /// deal for `Deal`, the hand action plus the dealer's turn for `Hit` and
    /// `Stand`, and, when the round ends, settlement applied straight to
    /// `ledger` and the session removed.
    pub fn dispatch(
        &self,
        ledger: &dyn CreditLedger,
        player_id: &str,
        player_tag: &str,
        channel_id: u64,
        action: PlayerAction,
    ) -> Result<Transcript, GameError> {
        match action {
            PlayerAction::Deal { wager } => {
                if wager <= 0 {
                    return Err(GameError::InvalidWager(wager));
                }
                let available = ledger.balance(player_id)?;
                if available < wager {
                    return Err(GameError::InsufficientBalance {
                        required: wager,
                        available,
                    });
                }
                let frame = self.start_game(player_id, player_tag, channel_id, wager)?;
                Ok(Transcript {
                    frames: vec![frame],
                    round_over: false,
                    settlement: None,
                })
            }
            PlayerAction::Hit | PlayerAction::Stand => {
                let mut transcript = self.apply_action(player_id, action)?;
                if transcript.round_over {
                    let settlement = self.settle(player_id)?;
                    ledger.adjust(player_id, settlement.amount)?;
                    transcript.settlement = Some(settlement);
                }
                Ok(transcript)
            }
        }
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        SessionRegistry::new()
    }
}
