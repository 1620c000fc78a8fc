// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Progress bars for `ftrie build`.

use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use ftrie::build::{BuildObserver, BuildSummary};

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{spinner:.cyan} {prefix:<10} [{bar:40.cyan/dim}] {pos}/{len} {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("━━╸")
}

/// Input is streamed, so indexing has no known total.
fn count_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {prefix:<10} {pos} docs ({per_sec}) {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// A spinner while indexing, a bar once a merge starts.
pub struct ProgressObserver {
    multi: MultiProgress,
    index: ProgressBar,
    merge: Option<ProgressBar>,
    flushed: usize,
}

impl ProgressObserver {
    pub fn new() -> Self {
        let multi = MultiProgress::new();
        let index = multi.add(ProgressBar::new_spinner());
        index.set_style(count_style());
        index.set_prefix("Indexing");
        index.enable_steady_tick(Duration::from_millis(100));
        Self {
            multi,
            index,
            merge: None,
            flushed: 0,
        }
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl BuildObserver for ProgressObserver {
    fn documents_indexed(&mut self, documents: u64) {
        self.index.set_position(documents);
    }

    fn partial_flushed(&mut self, number: usize, tokens: u32) {
        self.flushed = number + 1;
        self.index
            .set_message(format!("partial {} ({} tokens)", number, tokens));
    }

    fn merge_started(&mut self, partials: usize, tokens: u64) {
        self.index
            .finish_with_message(format!("{} partial indexes", self.flushed));
        let merge = self.multi.add(ProgressBar::new(tokens));
        merge.set_style(bar_style());
        merge.set_prefix("Merging");
        merge.set_message(format!("{} partials", partials));
        self.merge = Some(merge);
    }

    fn merge_progress(&mut self, done: u64, _total: u64) {
        if let Some(merge) = &self.merge {
            merge.set_position(done);
        }
    }

    fn finished(&mut self, summary: &BuildSummary) {
        let message = format!("{} tokens", summary.token_count);
        match &self.merge {
            Some(merge) => merge.finish_with_message(message),
            None => self.index.finish_with_message(message),
        }
    }
}
