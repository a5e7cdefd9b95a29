//! The credit-ledger contract the core settles against, plus an in-memory
//! implementation. The persistent store lives outside this crate (the bot keeps
//! accounts in a JSON file), the core only ever sees this trait.

use crate::GameError;
use std::collections::HashMap;
use std::sync::Mutex;

/// Credits granted to an account the first time it is touched.
pub const STARTING_CREDITS: i64 = 10;

/// Trait for the balance store that game settlements are applied against.
/// Accounts are created lazily: reading or adjusting an unknown player first
/// creates the account with `STARTING_CREDITS` (or the store's own default).
pub trait CreditLedger {
    /// Required method, returns the player's current credit balance.
    fn balance(&self, player_id: &str) -> Result<i64, GameError>;

    /// Required method, applies `delta` to the player's balance and returns the
    /// new balance. `delta` may be negative; balances are allowed to go negative
    /// too, the wager-affordability check happens before a game starts.
    fn adjust(&self, player_id: &str, delta: i64) -> Result<i64, GameError>;
}

/// Struct for a ledger held entirely in memory. Used by the core's own tests
/// and handy for embedders that do not need persistence.
pub struct InMemoryLedger {
    credits: Mutex<HashMap<String, i64>>,
    starting_credits: i64,
}

impl InMemoryLedger {
    /// Associated function to create a new `InMemoryLedger` with the standard
    /// starting balance for new accounts.
    pub fn new() -> InMemoryLedger {
        InMemoryLedger::with_starting_credits(STARTING_CREDITS)
    }

    /// Associated function to create a ledger that seeds new accounts with a
    /// custom starting balance.
    pub fn with_starting_credits(starting_credits: i64) -> InMemoryLedger {
        InMemoryLedger {
            credits: Mutex::new(HashMap::new()),
            starting_credits,
        }
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        InMemoryLedger::new()
    }
}

impl CreditLedger for InMemoryLedger {
    fn balance(&self, player_id: &str) -> Result<i64, GameError> {
        let mut credits = self.credits.lock().unwrap();
        Ok(*credits
            .entry(player_id.to_string())
            .or_insert(self.starting_credits))
    }

    fn adjust(&self, player_id: &str, delta: i64) -> Result<i64, GameError> {
        let mut credits = self.credits.lock().unwrap();
        let balance = credits
            .entry(player_id.to_string())
            .or_insert(self.starting_credits);
        *balance += delta;
        Ok(*balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_accounts_start_with_the_default_credits() {
        let ledger = InMemoryLedger::new();
        assert_eq!(ledger.balance("alice").unwrap(), STARTING_CREDITS);
    }

    #[test]
    fn adjustments_accumulate() {
        let ledger = InMemoryLedger::with_starting_credits(100);
        assert_eq!(ledger.adjust("bob", 20).unwrap(), 120);
        assert_eq!(ledger.adjust("bob", -50).unwrap(), 70);
        assert_eq!(ledger.balance("bob").unwrap(), 70);
        // Other accounts are untouched
        assert_eq!(ledger.balance("carol").unwrap(), 100);
    }
}
