//! UI utilities for the CLI

use colored::*;
use crossterm::{
    event::{self, Event, KeyCode},
    terminal::{disable_raw_mode, enable_raw_mode, size},
};
use std::io::{self, BufRead, IsTerminal, Write};
use std::time::Duration;

use bedrag_core::{Document, GenerationResult, Result, RetrievalResult};

/// Display startup banner
pub fn display_banner(subtitle: &str) {
    let terminal_width = size().map(|(w, _)| w as usize).unwrap_or(80);
    let banner_width = std::cmp::min(67, terminal_width.saturating_sub(4)).max(40);
    let inner = banner_width - 2;

    let top_border = format!("┌{}┐", "─".repeat(inner));
    let bottom_border = format!("└{}┘", "─".repeat(inner));
    let empty_line = format!("│{}│", " ".repeat(inner));

    println!();
    println!("{}", top_border.blue());
    println!("{}", empty_line.blue());
    let title = "bedrag - RAG over Amazon Bedrock";
    println!(
        "{}{}{}{}",
        "│  ".blue(),
        title.blue().bold(),
        " ".repeat(inner.saturating_sub(title.chars().count() + 2)),
        "│".blue()
    );
    println!(
        "{}{}{}{}",
        "│  ".blue(),
        subtitle.dimmed(),
        " ".repeat(inner.saturating_sub(subtitle.chars().count() + 2)),
        "│".blue()
    );
    println!("{}", empty_line.blue());
    println!("{}", bottom_border.blue());
    println!();
}

/// Menu of the interactive RAG session
pub fn print_menu<W: Write>(out: &mut W) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "Options:".bold())?;
    writeln!(out, "  {} Query with RAG (shows retrieved documents)", "1.".green())?;
    writeln!(out, "  {} Query without RAG", "2.".green())?;
    writeln!(out, "  {} Compare RAG vs no RAG", "3.".green())?;
    writeln!(out, "  {} Add documents", "4.".green())?;
    writeln!(out, "  {} View current documents", "5.".green())?;
    writeln!(out, "  {} Exit", "6.".green())?;
    Ok(())
}

/// Read one trimmed line; `None` at end of input
pub fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Print a label and read the reply
pub fn prompt_line<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    label: &str,
) -> Result<Option<String>> {
    write!(out, "{} ", label.cyan().bold())?;
    out.flush()?;
    read_line(input)
}

/// Handle input with history navigation (↑/↓), Esc clears the line.
///
/// Falls back to a plain line read when stdin is not a terminal. Returns
/// `None` at end of piped input.
pub fn read_input_with_history(label: &str, history: &mut Vec<String>) -> Result<Option<String>> {
    if !io::stdin().is_terminal() {
        let line = read_line(&mut io::stdin().lock())?;
        if let Some(line) = &line {
            if !line.is_empty() {
                history.push(line.clone());
            }
        }
        return Ok(line);
    }

    enable_raw_mode()?;
    let result = edit_line(label, history);
    disable_raw_mode()?;
    println!();

    let input = result?;
    if !input.is_empty() {
        history.push(input.clone());
    }
    Ok(Some(input))
}

fn edit_line(label: &str, history: &[String]) -> Result<String> {
    let mut input = String::new();
    let mut history_index: Option<usize> = None;
    let prefix = label.green().bold();

    print!("{} ", prefix);
    io::stdout().flush()?;

    loop {
        let Event::Key(key_event) = event::read()? else {
            continue;
        };
        match key_event.code {
            KeyCode::Enter => return Ok(input.trim().to_string()),
            KeyCode::Esc => return Ok(String::new()),
            KeyCode::Char(c) => input.push(c),
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Up if !history.is_empty() => {
                let index = match history_index {
                    None => history.len() - 1,
                    Some(idx) => idx.saturating_sub(1),
                };
                history_index = Some(index);
                input = history[index].clone();
            }
            KeyCode::Down => {
                if let Some(idx) = history_index {
                    if idx + 1 < history.len() {
                        history_index = Some(idx + 1);
                        input = history[idx + 1].clone();
                    } else {
                        history_index = None;
                        input.clear();
                    }
                }
            }
            _ => continue,
        }
        // Redraw the whole line; clears leftovers of a longer previous entry
        print!("\r\x1b[2K{} {}", prefix, input);
        io::stdout().flush()?;
    }
}

/// Ranked list of retrieved documents
pub fn format_sources(sources: &RetrievalResult) -> String {
    if sources.is_empty() {
        return "  (no documents retrieved)".to_string();
    }
    sources
        .iter()
        .enumerate()
        .map(|(i, hit)| {
            format!(
                "  {}. [{:.3}] {}: {}",
                i + 1,
                hit.score,
                hit.document.id,
                hit.document.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Stored documents in insertion order
pub fn format_documents(documents: &[Document]) -> String {
    if documents.is_empty() {
        return "  (the knowledge base is empty)".to_string();
    }
    documents
        .iter()
        .enumerate()
        .map(|(i, doc)| format!("  {}. {}: {}", i + 1, doc.id, doc.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One-line summary of model, token usage and latency
pub fn format_generation_stats(generation: &GenerationResult) -> String {
    let mut parts = vec![generation.model_id.clone()];
    if let Some(usage) = generation.usage {
        parts.push(format!(
            "{} in / {} out tokens",
            usage.input_tokens, usage.output_tokens
        ));
    }
    if let Some(latency) = generation.latency {
        parts.push(format_latency(latency));
    }
    parts.join(" · ")
}

fn format_latency(latency: Duration) -> String {
    if latency.as_secs() >= 1 {
        format!("{:.1} s", latency.as_secs_f64())
    } else {
        format!("{} ms", latency.as_millis())
    }
}
