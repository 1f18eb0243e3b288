//! Prompts
//!
//! Interactive terminal prompts for the customize and revert flows.
//! Uses the `dialoguer` crate for input handling.

use anyhow::Result;
use colored::Colorize;
use dialoguer::{Input, Password};

/// Prompt for a multiline instruction. The user types lines and finishes
/// with an empty line; an entirely empty instruction restarts the prompt.
pub fn prompt_instruction(label: &str) -> Result<String> {
    println!();
    println!("  {}", label.white());
    println!(
        "{}",
        "  Type your instruction, then press Enter on an empty line to finish:".dimmed()
    );
    println!();

    loop {
        let mut lines: Vec<String> = Vec::new();
        loop {
            let line: String = Input::new()
                .with_prompt("  ")
                .allow_empty(true)
                .interact_text()?;
            if line.is_empty() {
                break;
            }
            lines.push(line);
        }

        let result = lines.join("\n").trim().to_string();
        if !result.is_empty() {
            return Ok(result);
        }
        println!("{}", "  An instruction is required. Try again.".yellow());
    }
}

/// Prompt for a secret value with hidden input.
/// Repeats until a non-empty value is entered.
pub fn prompt_secret(label: &str) -> Result<String> {
    loop {
        let value: String = Password::new()
            .with_prompt(format!("  {} {}", "\u{2192}".cyan(), label.white()))
            .allow_empty_password(true)
            .interact()?;

        let trimmed = value.trim().to_string();
        if !trimmed.is_empty() {
            return Ok(trimmed);
        }
        println!("{}", "  This field is required.".yellow());
    }
}
