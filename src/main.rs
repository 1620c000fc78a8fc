// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

use std::cell::RefCell;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use ftrie::{BuildOutcome, DocId, Hit, Index, IndexBuilder, IndexConfig, PostingsList};

mod cli;
use cli::display::{self, styled, BOLD, DIM, GREEN};
use cli::{Cli, Commands};

/// One line of `ftrie build` input.
#[derive(Deserialize)]
struct Document {
    id: DocId,
    text: String,
}

/// One token in wildcard and fuzzy output.
#[derive(Serialize)]
struct TermRow {
    token: String,
    postings: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    distance: Option<usize>,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Build {
            input,
            output,
            config,
            memory_limit,
            quiet,
        } => run_build(&input, &output, config.as_deref(), memory_limit, quiet),
        Commands::Lookup { index, term, json } => run_lookup(&index, &term, json),
        Commands::Wildcard {
            index,
            pattern,
            limit,
            json,
        } => run_wildcard(&index, &pattern, limit, json),
        Commands::Fuzzy {
            index,
            term,
            k,
            limit,
            json,
        } => run_fuzzy(&index, &term, k, limit, json),
        Commands::Phrase {
            index,
            text,
            limit,
            json,
        } => run_phrase(&index, &text, limit, json),
        Commands::Inspect {
            index,
            top,
            verify,
            json,
        } => run_inspect(&index, top, verify, json),
    };

    if let Err(e) = result {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ftrie=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn open_input(path: &Path) -> Result<Box<dyn BufRead>, String> {
    if path.as_os_str() == "-" {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    let file = File::open(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    Ok(Box::new(BufReader::new(file)))
}

/// JSON-lines documents, parsed as the builder pulls them.
///
/// The first bad line stops the stream: its error is kept and the build is
/// cancelled, so nothing half-built is left behind.
struct DocumentLines<'a> {
    lines: io::Lines<Box<dyn BufRead>>,
    path: &'a Path,
    line: usize,
    error: &'a RefCell<Option<String>>,
    cancel: &'a AtomicBool,
}

impl Iterator for DocumentLines<'_> {
    type Item = (DocId, String);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = self.lines.next()?;
            self.line += 1;
            let parsed = line
                .map_err(|e| format!("{}: {}", self.path.display(), e))
                .and_then(|line| {
                    if line.trim().is_empty() {
                        return Ok(None);
                    }
                    serde_json::from_str::<Document>(&line)
                        .map(Some)
                        .map_err(|e| format!("{}:{}: {}", self.path.display(), self.line, e))
                });
            match parsed {
                Ok(Some(doc)) => return Some((doc.id, doc.text)),
                Ok(None) => continue,
                Err(e) => {
                    *self.error.borrow_mut() = Some(e);
                    self.cancel.store(true, Ordering::Relaxed);
                    return None;
                }
            }
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{}", json);
    Ok(())
}

fn run_build(
    input: &Path,
    output: &Path,
    config: Option<&Path>,
    memory_limit: Option<usize>,
    quiet: bool,
) -> Result<(), String> {
    let mut config = match config {
        Some(path) => IndexConfig::from_json_file(path).map_err(|e| e.to_string())?,
        None => IndexConfig::default(),
    };
    if let Some(bytes) = memory_limit {
        config = config.with_memory_limit(bytes);
    }

    let error = RefCell::new(None);
    let cancel = AtomicBool::new(false);
    let docs = DocumentLines {
        lines: open_input(input)?.lines(),
        path: input,
        line: 0,
        error: &error,
        cancel: &cancel,
    };

    let builder = IndexBuilder::new(config)
        .map_err(|e| e.to_string())?
        .cancel_flag(&cancel);
    #[cfg(feature = "progress")]
    let builder = if quiet {
        builder
    } else {
        builder.observer(cli::progress::ProgressObserver::new())
    };
    #[cfg(not(feature = "progress"))]
    let _ = quiet;

    let started = Instant::now();
    let outcome = builder.build(output, docs).map_err(|e| e.to_string())?;
    if let Some(e) = error.take() {
        return Err(e);
    }
    let summary = match outcome {
        BuildOutcome::Completed(summary) => summary,
        BuildOutcome::Cancelled => return Err("build cancelled".into()),
    };
    let elapsed = started.elapsed().as_secs_f64() * 1000.0;

    display::section_top("BUILD");
    display::field("output", &output.display().to_string());
    display::field("documents", &format!("{} ({} ids)", summary.documents, summary.doc_count));
    display::field("tokens", &summary.token_count.to_string());
    display::field("nodes", &summary.node_count.to_string());
    display::field("postings", &summary.posting_count.to_string());
    display::field("partials", &summary.partials.to_string());
    display::field("time", &display::timing_ms(elapsed));
    display::section_bot();
    Ok(())
}

fn open(dir: &Path) -> Result<Index, String> {
    Index::open(dir).map_err(|e| e.to_string())
}

fn print_postings(postings: &PostingsList) {
    let mut docs = postings.chunk_by(|a, b| a.doc == b.doc).peekable();
    if docs.peek().is_none() {
        println!("{}", styled(&[DIM], "no matches"));
    }
    for run in docs {
        let offsets: Vec<String> = run.iter().map(|p| p.offset.to_string()).collect();
        println!(
            "{}  {}",
            display::pad_left(&styled(&[BOLD], &run[0].doc.to_string()), 8),
            offsets.join(", ")
        );
    }
}

fn run_lookup(dir: &Path, term: &str, json: bool) -> Result<(), String> {
    let index = open(dir)?;
    let started = Instant::now();
    let postings = index.lookup(term).map_err(|e| e.to_string())?;
    let elapsed = started.elapsed().as_secs_f64() * 1000.0;
    if json {
        return print_json(&postings);
    }
    print_postings(&postings);
    eprintln!(
        "{} postings in {}",
        postings.len(),
        display::timing_ms(elapsed)
    );
    Ok(())
}

fn print_terms(rows: &[TermRow], total: usize, elapsed: f64) {
    for row in rows {
        let distance = row.distance.map(display::distance_badge).unwrap_or_default();
        println!(
            "{}  {}  {}",
            display::pad_right(&display::token(row.token.as_bytes()), 24),
            display::pad_left(&row.postings.to_string(), 8),
            distance
        );
    }
    if total > rows.len() {
        println!("{}", styled(&[DIM], &format!("… {} more", total - rows.len())));
    }
    eprintln!("{} tokens in {}", total, display::timing_ms(elapsed));
}

fn run_wildcard(dir: &Path, pattern: &str, limit: usize, json: bool) -> Result<(), String> {
    let index = open(dir)?;
    let started = Instant::now();
    let terms = index.wildcard_terms(pattern).map_err(|e| e.to_string())?;
    let elapsed = started.elapsed().as_secs_f64() * 1000.0;

    let rows: Vec<TermRow> = terms
        .iter()
        .take(limit)
        .map(|t| TermRow {
            token: String::from_utf8_lossy(&t.token).into_owned(),
            postings: t.postings.count,
            distance: None,
        })
        .collect();
    if json {
        return print_json(&rows);
    }
    print_terms(&rows, terms.len(), elapsed);
    Ok(())
}

fn run_fuzzy(dir: &Path, term: &str, k: Option<usize>, limit: usize, json: bool) -> Result<(), String> {
    let index = open(dir)?;
    let started = Instant::now();
    let mut matches = index.fuzzy_terms(term, k).map_err(|e| e.to_string())?;
    let elapsed = started.elapsed().as_secs_f64() * 1000.0;

    matches.sort_by(|a, b| a.distance().cmp(&b.distance()).then_with(|| a.token.cmp(&b.token)));
    let rows: Vec<TermRow> = matches
        .iter()
        .take(limit)
        .map(|m| TermRow {
            token: String::from_utf8_lossy(&m.token).into_owned(),
            postings: m.postings.count,
            distance: Some(m.distance()),
        })
        .collect();
    if json {
        return print_json(&rows);
    }
    print_terms(&rows, matches.len(), elapsed);
    Ok(())
}

fn run_phrase(dir: &Path, text: &str, limit: usize, json: bool) -> Result<(), String> {
    let index = open(dir)?;
    let started = Instant::now();
    let hits = index.phrase(text).map_err(|e| e.to_string())?;
    let elapsed = started.elapsed().as_secs_f64() * 1000.0;

    let shown: Vec<&Hit> = hits.iter().take(limit).collect();
    if json {
        return print_json(&shown);
    }
    if hits.is_empty() {
        println!("{}", styled(&[DIM], "no matches"));
    }
    for hit in &shown {
        let spans: Vec<String> = hit
            .spans
            .iter()
            .map(|s| format!("{}..{}", s.start, s.end))
            .collect();
        println!(
            "{}  {}",
            display::pad_left(&styled(&[BOLD], &hit.doc.to_string()), 8),
            spans.join(", ")
        );
    }
    eprintln!("{} documents in {}", hits.len(), display::timing_ms(elapsed));
    Ok(())
}

fn run_inspect(dir: &Path, top: usize, verify: bool, json: bool) -> Result<(), String> {
    let index = open(dir)?;
    if verify {
        index.verify().map_err(|e| e.to_string())?;
    }
    let stats = index.stats(top).map_err(|e| e.to_string())?;
    if json {
        return print_json(&stats);
    }

    let options = index.tokenizer().options();
    display::section_top("INDEX");
    display::field("directory", &dir.display().to_string());
    display::field("tokens", &stats.token_count.to_string());
    display::field("nodes", &stats.node_count.to_string());
    display::field("postings", &stats.posting_count.to_string());
    display::field("documents", &stats.doc_count.to_string());
    display::field(
        "tokenizer",
        &format!(
            "{:?}, diacritics {}, stemming {} ({:?}), max {}",
            options.case,
            if options.diacritics { "kept" } else { "stripped" },
            if options.stemming { "on" } else { "off" },
            options.language,
            options.max_token_len
        ),
    );
    if verify {
        display::field("checksums", &styled(&[GREEN], "ok"));
    }
    display::section_bot();

    display::section_top("FILES");
    for file in &stats.files {
        display::field(file.name, &display::pad_left(&display::format_size(file.bytes), 10));
    }
    display::field("total", &display::pad_left(&display::format_size(stats.total_bytes()), 10));
    display::section_bot();

    if !stats.top_tokens.is_empty() {
        display::section_top("TOP TOKENS");
        for t in &stats.top_tokens {
            display::row(&format!(
                "{} {}",
                display::pad_right(&display::token(t.token.as_bytes()), 24),
                display::pad_left(&t.count.to_string(), 10)
            ));
        }
        display::section_bot();
    }
    Ok(())
}
