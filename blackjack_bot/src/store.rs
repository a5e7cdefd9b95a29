//! File-backed player accounts. One JSON file maps each player id to their
//! credits and the unix time of their last daily claim, the same three columns
//! the casino has always kept per player. The whole map is rewritten after
//! every mutation; account counts are tiny so that is plenty.

use blackjack_core::ledger::{CreditLedger, STARTING_CREDITS};
use blackjack_core::GameError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds a player must wait between daily claims.
pub const DAILY_COOLDOWN_SECS: u64 = 86400;

/// One row of the accounts file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub credits: i64,
    /// Unix time of the last daily claim. New accounts start the clock at
    /// creation, so the first daily unlocks a day later.
    pub daily_reset: u64,
}

/// Enum for the result of a daily claim.
#[derive(Debug, PartialEq, Eq)]
pub enum DailyStatus {
    /// Credits granted and the cooldown restarted.
    Granted(i64),
    /// Still cooling down, with the remaining wait.
    Wait { hours: u64, minutes: u64 },
}

/// Struct for a ledger persisted as a JSON file of player records.
pub struct JsonLedger {
    path: PathBuf,
    records: Mutex<HashMap<String, PlayerRecord>>,
}

impl JsonLedger {
    /// Associated function to open the ledger at `path`, loading any existing
    /// accounts. A missing file is an empty ledger, not an error.
    pub fn open(path: &Path) -> Result<JsonLedger, GameError> {
        let records = if path.exists() {
            let raw = fs::read_to_string(path).map_err(|e| GameError::Ledger(e.to_string()))?;
            serde_json::from_str(&raw).map_err(|e| GameError::Ledger(e.to_string()))?
        } else {
            HashMap::new()
        };
        Ok(JsonLedger {
            path: path.to_path_buf(),
            records: Mutex::new(records),
        })
    }

    /// Method for making sure a player has an account, creating one with the
    /// starting credits if needed. Returns whether an account was created, so
    /// the front end can welcome first-time players.
    pub fn ensure_account(&self, player_id: &str) -> Result<bool, GameError> {
        let mut records = self.records.lock().unwrap();
        if records.contains_key(player_id) {
            return Ok(false);
        }
        records.insert(
            player_id.to_string(),
            PlayerRecord {
                credits: STARTING_CREDITS,
                daily_reset: unix_now(),
            },
        );
        self.save(&records)?;
        Ok(true)
    }

    /// Method for claiming the daily allowance: a random 5 to 25 credits once
    /// per cooldown window.
    pub fn claim_daily(&self, player_id: &str) -> Result<DailyStatus, GameError> {
        use rand::Rng;

        let mut records = self.records.lock().unwrap();
        let now = unix_now();
        let record = records
            .entry(player_id.to_string())
            .or_insert(PlayerRecord {
                credits: STARTING_CREDITS,
                daily_reset: now,
            });

        let elapsed = now.saturating_sub(record.daily_reset);
        if elapsed >= DAILY_COOLDOWN_SECS {
            let amount = rand::thread_rng().gen_range(5..=25);
            record.credits += amount;
            record.daily_reset = now;
            self.save(&records)?;
            Ok(DailyStatus::Granted(amount))
        } else {
            let remaining = DAILY_COOLDOWN_SECS - elapsed;
            let hours = remaining / 3600;
            let minutes = (remaining - hours * 3600) / 60;
            Ok(DailyStatus::Wait { hours, minutes })
        }
    }

    fn save(&self, records: &HashMap<String, PlayerRecord>) -> Result<(), GameError> {
        let raw = serde_json::to_string_pretty(records)
            .map_err(|e| GameError::Ledger(e.to_string()))?;
        fs::write(&self.path, raw).map_err(|e| GameError::Ledger(e.to_string()))
    }
}

impl CreditLedger for JsonLedger {
    fn balance(&self, player_id: &str) -> Result<i64, GameError> {
        let mut records = self.records.lock().unwrap();
        if let Some(record) = records.get(player_id) {
            return Ok(record.credits);
        }
        let record = PlayerRecord {
            credits: STARTING_CREDITS,
            daily_reset: unix_now(),
        };
        let credits = record.credits;
        records.insert(player_id.to_string(), record);
        self.save(&records)?;
        Ok(credits)
    }

    fn adjust(&self, player_id: &str, delta: i64) -> Result<i64, GameError> {
        let mut records = self.records.lock().unwrap();
        let now = unix_now();
        let record = records
            .entry(player_id.to_string())
            .or_insert(PlayerRecord {
                credits: STARTING_CREDITS,
                daily_reset: now,
            });
        record.credits += delta;
        let credits = record.credits;
        self.save(&records)?;
        Ok(credits)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before the unix epoch")
        .as_secs()
}
