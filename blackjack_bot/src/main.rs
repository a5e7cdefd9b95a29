//! Console front end for the blackjack tables. Stands in for the chat platform:
//! it reads commands from stdin, routes them through the session registry and
//! prints every transcript frame with a pacing delay, the way the chat client
//! would edit one message per dealer step.

mod store;

use blackjack_core::prelude::*;
use clap::Parser;
use rand::Rng;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use store::{DailyStatus, JsonLedger};

/// The console is a single channel, so every game routes here.
const CHANNEL_ID: u64 = 0;

#[derive(Parser)]
#[command(name = "blackjack_bot")]
#[command(about = "Play the casino's blackjack tables from a console")]
struct Cli {
    /// Path of the JSON file holding player accounts
    #[arg(long, default_value = "credits.json")]
    data_file: PathBuf,

    /// Milliseconds to pause between dealer-turn frames
    #[arg(long, default_value_t = 2000)]
    pacing_ms: u64,

    /// Player handle to play as
    #[arg(long, default_value = "player")]
    player: String,
}

fn main() {
    let cli = Cli::parse();

    let ledger = match JsonLedger::open(&cli.data_file) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };
    let registry = SessionRegistry::new();
    let player_id = cli.player.clone();
    let player_tag = format!("@{}", cli.player);

    match ledger.ensure_account(&player_id) {
        Ok(true) => println!(
            "An account has been created for you! You have {} credits and your \
             daily will reset in 24 hours. If you run out of credits you can try \
             begging.",
            STARTING_CREDITS
        ),
        Ok(false) => {}
        Err(e) => eprintln!("error: {e}"),
    }

    print_help();

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("error: {e}");
                break;
            }
        };
        let mut tokens = line.split_whitespace();
        let command = match tokens.next() {
            Some(c) => c,
            None => continue,
        };

        match command {
            "deal" => match tokens.next().and_then(|t| t.parse::<i64>().ok()) {
                Some(bet) => run_action(
                    &registry,
                    &ledger,
                    &player_id,
                    &player_tag,
                    cli.pacing_ms,
                    PlayerAction::Deal { wager: bet },
                ),
                None => println!("Please enter a valid bet!"),
            },
            "hit" => run_action(
                &registry,
                &ledger,
                &player_id,
                &player_tag,
                cli.pacing_ms,
                PlayerAction::Hit,
            ),
            "stand" => run_action(
                &registry,
                &ledger,
                &player_id,
                &player_tag,
                cli.pacing_ms,
                PlayerAction::Stand,
            ),
            "credits" => match ledger.balance(&player_id) {
                Ok(credits) => println!("{} you have: {} Credits!", player_tag, credits),
                Err(e) => eprintln!("error: {e}"),
            },
            "daily" => match ledger.claim_daily(&player_id) {
                Ok(DailyStatus::Granted(amount)) => {
                    println!(
                        "{} Congratulations! you have gained: {} Credits!",
                        player_tag, amount
                    );
                }
                Ok(DailyStatus::Wait { hours, minutes }) => {
                    println!(
                        "{} you have {} hours and {} minutes until your next daily!",
                        player_tag, hours, minutes
                    );
                }
                Err(e) => eprintln!("error: {e}"),
            },
            "beg" => beg(&ledger, &player_id, &player_tag),
            "games" | "help" => print_help(),
            "quit" => break,
            other => println!("Unknown command: {}. Try 'help'.", other),
        }
        io::stdout().flush().ok();
    }

    // A half-played game is simply abandoned, same as walking away mid hand.
    registry.end_game(&player_id);
}

/// Function for running one game action end to end and printing the transcript.
/// Frames after the first are paced out so the dealer's turn reads like the
/// original message edits did.
fn run_action(
    registry: &SessionRegistry,
    ledger: &JsonLedger,
    player_id: &str,
    player_tag: &str,
    pacing_ms: u64,
    action: PlayerAction,
) {
    match registry.dispatch(ledger, player_id, player_tag, CHANNEL_ID, action) {
        Ok(transcript) => {
            for (i, frame) in transcript.frames.iter().enumerate() {
                if i > 0 {
                    thread::sleep(Duration::from_millis(pacing_ms));
                }
                println!("{frame}\n");
            }
            if let Some(settlement) = transcript.settlement {
                match settlement.outcome {
                    GameOutcome::Push => println!(
                        "{} you drawed! Your bet has been returned",
                        player_tag
                    ),
                    GameOutcome::Win => println!(
                        "{} Congratulations! you have gained: {} Credits!",
                        player_tag, settlement.amount
                    ),
                    GameOutcome::Loss => println!(
                        "{} you have lost: {} Credits! Better luck next time!",
                        player_tag, -settlement.amount
                    ),
                }
            }
        }
        Err(GameError::InsufficientBalance { .. }) => {
            println!("Not enough credits to place bet!")
        }
        Err(GameError::InvalidWager(_)) => println!("Please enter a valid bet!"),
        Err(e) => println!("{e}"),
    }
}

/// Function for the long-shot begging command: roughly a 1 in 21 chance of a
/// small grant.
fn beg(ledger: &JsonLedger, player_id: &str, player_tag: &str) {
    let mut rng = rand::thread_rng();
    if rng.gen_range(50..=70) == 69 {
        let amount = rng.gen_range(1..=5);
        match ledger.adjust(player_id, amount) {
            Ok(_) => println!(
                "{} Congratulations! you have gained: {} Credits!",
                player_tag, amount
            ),
            Err(e) => eprintln!("error: {e}"),
        }
    } else {
        println!("No credits for you!");
    }
}

fn print_help() {
    println!(
        "Here is the available game commands I have:\n\
         \n**General**:\n\
         credits - See how many credits you have.\n\
         daily - claim your daily allowance.\n\
         beg - beg for a chance to recieve some credits.\n\
         \n**Blackjack**\n\
         deal <bet> - deals your hand and starts the game.\n\
         hit - add another card to your hand\n\
         stand - end your turn\n\
         quit - leave the table\n"
    );
}
