//! Menu-driven RAG session

use colored::*;
use std::io::{self, BufRead, Write};

use bedrag_core::{Result, VectorStore};
use bedrag_rag::{user_document, Answer, Comparison, DocumentIndexer, RagPipeline};

use crate::ui::{format_documents, format_generation_stats, format_sources, print_menu, prompt_line};

const DONE_MARKER: &str = "DONE";

/// Interactive session over a pipeline and the indexer feeding its store
pub struct InteractiveSession {
    pipeline: RagPipeline,
    indexer: DocumentIndexer,
}

impl InteractiveSession {
    pub fn new(pipeline: RagPipeline, indexer: DocumentIndexer) -> Self {
        Self { pipeline, indexer }
    }

    /// Run on stdin/stdout until the user exits or input ends
    pub async fn run(&self) -> Result<()> {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut out = io::stdout();
        self.run_with(&mut input, &mut out).await
    }

    pub async fn run_with<R: BufRead, W: Write>(&self, input: &mut R, out: &mut W) -> Result<()> {
        loop {
            print_menu(out)?;
            let Some(choice) = prompt_line(input, out, "Select an option (1-6):")? else {
                break;
            };

            match choice.as_str() {
                "1" => {
                    if let Some(query) = read_query(input, out)? {
                        let outcome = self.pipeline.answer_with_rag(&query).await;
                        write_answer(out, "RAG response", &outcome, true)?;
                    }
                }
                "2" => {
                    if let Some(query) = read_query(input, out)? {
                        let outcome = self.pipeline.answer_without_rag(&query).await;
                        write_answer(out, "Response without RAG", &outcome, false)?;
                    }
                }
                "3" => {
                    if let Some(query) = read_query(input, out)? {
                        let comparison = self.pipeline.compare(&query).await;
                        write_comparison(out, &comparison)?;
                    }
                }
                "4" => self.add_documents(input, out).await?,
                "5" => {
                    let documents = self.pipeline.store().documents().await?;
                    writeln!(out, "\n{} ({})", "Current documents".bold(), documents.len())?;
                    writeln!(out, "{}", format_documents(&documents))?;
                }
                "6" => {
                    writeln!(out, "{}", "Goodbye!".green())?;
                    break;
                }
                "" => continue,
                other => {
                    writeln!(out, "{} Invalid option: {}", "✗".red(), other)?;
                }
            }
        }
        Ok(())
    }

    async fn add_documents<R: BufRead, W: Write>(&self, input: &mut R, out: &mut W) -> Result<()> {
        writeln!(
            out,
            "Enter documents, one per line. Type {} on its own line to finish.",
            DONE_MARKER.bold()
        )?;

        let mut documents = Vec::new();
        while let Some(line) = prompt_line(input, out, ">")? {
            if line.eq_ignore_ascii_case(DONE_MARKER) {
                break;
            }
            if !line.is_empty() {
                documents.push(user_document(&line));
            }
        }

        if documents.is_empty() {
            writeln!(out, "No documents added.")?;
            return Ok(());
        }

        let result = self.indexer.index_documents(documents).await;
        writeln!(
            out,
            "{} Added {} document(s)",
            "✓".green(),
            result.documents_indexed
        )?;
        for error in &result.errors {
            writeln!(out, "  {} {}", "✗".red(), error)?;
        }
        Ok(())
    }
}

fn read_query<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<Option<String>> {
    let query = prompt_line(input, out, "Enter your question:")?;
    Ok(query.filter(|q| !q.is_empty()))
}

fn write_answer<W: Write>(
    out: &mut W,
    title: &str,
    outcome: &Result<Answer>,
    show_sources: bool,
) -> Result<()> {
    writeln!(out, "\n{}", title.bold().underline())?;
    match outcome {
        Ok(answer) => {
            if show_sources {
                writeln!(out, "{}", "Retrieved documents:".dimmed())?;
                writeln!(out, "{}", format_sources(&answer.sources))?;
                writeln!(out)?;
            }
            writeln!(out, "{}", answer.text())?;
            writeln!(out, "{}", format_generation_stats(&answer.generation).dimmed())?;
        }
        Err(e) => writeln!(out, "{} {}", "✗".red(), e)?,
    }
    Ok(())
}

fn write_comparison<W: Write>(out: &mut W, comparison: &Comparison) -> Result<()> {
    writeln!(out, "\n{} {}", "Question:".bold(), comparison.query)?;
    write_answer(out, "With RAG", &comparison.with_rag, true)?;
    write_answer(out, "Without RAG", &comparison.without_rag, false)?;
    Ok(())
}
