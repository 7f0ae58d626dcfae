//! Operator prompts.
//!
//! All stdin reads go through `spawn_blocking` so a waiting prompt never
//! blocks the runtime — the cancel prompt in particular must stay a
//! cancellable suspend point for the race coordinator.

use std::io::{self, Write};

use anyhow::Result;
use fxo_core::config::AppConfig;
use fxo_core::config::InstrumentConfig;
use fxo_core::types::Side;

/// What the operator wants to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    LimitEntry,
    MarketEntry,
    ChangeSlPips,
}

/// Print a prompt and read one trimmed line from stdin.
pub async fn async_input(prompt: &str) -> Result<String> {
    let prompt = prompt.to_string();
    let line = tokio::task::spawn_blocking(move || -> io::Result<String> {
        print!("{prompt}");
        io::stdout().flush()?;
        let mut line = String::new();
        io::stdin().read_line(&mut line)?;
        Ok(line.trim().to_string())
    })
    .await??;
    Ok(line)
}

pub async fn prompt_risk() -> Result<f64> {
    loop {
        let input = async_input("Enter risk % for session: ").await?;
        match input.parse::<f64>() {
            Ok(risk) if risk > 0.0 => return Ok(risk),
            _ => println!("Invalid risk. Enter a positive number."),
        }
    }
}

pub async fn prompt_primary_account() -> Result<bool> {
    loop {
        let input = async_input("Account ([1] primary, [2] secondary): ").await?;
        match input.as_str() {
            "1" => return Ok(true),
            "2" => return Ok(false),
            _ => println!("Enter 1 or 2."),
        }
    }
}

pub async fn prompt_instrument(config: &AppConfig) -> Result<(String, InstrumentConfig)> {
    loop {
        let alias = async_input("Enter instrument: ").await?.to_ascii_uppercase();
        if let Some(instrument) = config.instrument(&alias) {
            return Ok((alias, instrument.clone()));
        }
        println!("Invalid instrument. Valid instruments:");
        for (name, inst) in &config.instruments {
            println!("  {name} -> symbol {}, pip value {}", inst.symbol, inst.pip_value);
        }
    }
}

pub async fn prompt_side() -> Result<Side> {
    loop {
        let input = async_input("Enter position (long -> l | short -> s): ").await?;
        if let Some(side) = Side::from_input(&input) {
            return Ok(side);
        }
        println!("Invalid position. Enter l for long or s for short.");
    }
}

pub async fn prompt_sl_pips() -> Result<f64> {
    loop {
        let input = async_input("Enter stop-loss pips: ").await?;
        match input.parse::<f64>() {
            Ok(pips) if pips > 0.0 => return Ok(pips),
            _ => println!("Invalid stop-loss. Enter a positive number."),
        }
    }
}

pub async fn prompt_action() -> Result<Action> {
    loop {
        let input =
            async_input("1: [LIMIT ENTRY]\n2: [MARKET ENTRY]\n3: [CHANGE SL PIPS]\nEnter (1, 2 or 3): ")
                .await?;
        match input.as_str() {
            "1" => return Ok(Action::LimitEntry),
            "2" => return Ok(Action::MarketEntry),
            "3" => return Ok(Action::ChangeSlPips),
            _ => println!("Invalid input. Please enter 1, 2, or 3."),
        }
    }
}

/// Resolves only when the operator asks to cancel the pending order.
/// Any other input re-prompts; the future is dropped by the race
/// coordinator when the poll wins first.
pub async fn wait_for_cancel() {
    loop {
        match async_input("1: [CANCEL LIMIT ORDER] ").await {
            Ok(input) if input == "1" => return,
            Ok(_) => continue,
            // stdin is gone; park forever and let the poll side win
            Err(_) => std::future::pending::<()>().await,
        }
    }
}
