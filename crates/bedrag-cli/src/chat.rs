//! Turn-by-turn chat with a foundation model

use colored::*;
use std::io::{BufRead, Write};
use std::sync::Arc;
use tracing::debug;

use bedrag_bedrock::FoundationModel;
use bedrag_core::{GenerationResult, Generator, Prompt, Result};

use crate::ui::{format_generation_stats, prompt_line, read_input_with_history};

const EXIT_WORDS: [&str; 3] = ["exit", "quit", "salir"];

/// Whether the input ends the conversation
pub fn is_exit_command(input: &str) -> bool {
    let input = input.trim();
    EXIT_WORDS.iter().any(|word| input.eq_ignore_ascii_case(word))
}

/// Parse a 1-based menu choice into an index below `count`
pub fn parse_selection(input: &str, count: usize) -> Option<usize> {
    match input.trim().parse::<usize>() {
        Ok(n) if n >= 1 && n <= count => Some(n - 1),
        _ => None,
    }
}

/// Numbered model list for the selection prompt
pub fn format_model_list(models: &[FoundationModel]) -> String {
    models
        .iter()
        .enumerate()
        .map(|(i, model)| {
            if model.provider_name.is_empty() {
                format!("  {}. {}", i + 1, model.model_id)
            } else {
                format!("  {}. {} ({})", i + 1, model.model_id, model.provider_name)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Ask the user to pick a model until a valid choice or end of input
pub fn select_model<R: BufRead, W: Write>(
    models: &[FoundationModel],
    input: &mut R,
    out: &mut W,
) -> Result<Option<FoundationModel>> {
    if models.is_empty() {
        writeln!(out, "{} No on-demand chat models are available", "✗".red())?;
        return Ok(None);
    }

    writeln!(out, "{}", "Available models:".bold())?;
    writeln!(out, "{}", format_model_list(models))?;

    while let Some(choice) = prompt_line(input, out, &format!("Select a model (1-{}):", models.len()))? {
        if is_exit_command(&choice) {
            return Ok(None);
        }
        match parse_selection(&choice, models.len()) {
            Some(index) => return Ok(Some(models[index].clone())),
            None => writeln!(out, "{} Invalid selection: {}", "✗".red(), choice)?,
        }
    }
    Ok(None)
}

/// What a single chat turn produced
#[derive(Debug)]
pub enum ChatTurn {
    Exit,
    Skipped,
    Reply(GenerationResult),
}

/// A conversation with one model; each turn is sent on its own
pub struct ChatSession {
    generator: Arc<dyn Generator>,
    max_tokens: u32,
    history: Vec<String>,
}

impl ChatSession {
    pub fn new(generator: Arc<dyn Generator>, max_tokens: u32) -> Self {
        Self {
            generator,
            max_tokens,
            history: Vec::new(),
        }
    }

    pub fn model_id(&self) -> &str {
        self.generator.model_id()
    }

    pub async fn turn(&self, input: &str) -> Result<ChatTurn> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(ChatTurn::Skipped);
        }
        if is_exit_command(input) {
            return Ok(ChatTurn::Exit);
        }

        debug!(model_id = self.model_id(), chars = input.len(), "chat turn");
        let generation = self
            .generator
            .generate(&Prompt::new(input), self.max_tokens)
            .await?;
        Ok(ChatTurn::Reply(generation))
    }

    /// Converse on the terminal until an exit word or end of input
    pub async fn run(&mut self) -> Result<()> {
        println!(
            "{} Chatting with {}. Type exit, quit or salir to finish.",
            "→".green(),
            self.model_id().bold()
        );

        loop {
            let Some(line) = read_input_with_history("you>", &mut self.history)? else {
                break;
            };
            match self.turn(&line).await {
                Ok(ChatTurn::Exit) => break,
                Ok(ChatTurn::Skipped) => continue,
                Ok(ChatTurn::Reply(generation)) => {
                    println!("{} {}", "model>".blue().bold(), generation.text);
                    println!("{}", format_generation_stats(&generation).dimmed());
                }
                // A failed turn does not end the conversation
                Err(e) => println!("{} {}", "✗".red(), e),
            }
        }

        println!("{}", "Goodbye!".green());
        Ok(())
    }
}
