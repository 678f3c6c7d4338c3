//! Line-oriented collaborators for the terminal.
use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicUsize, Ordering};

use ingest_core::{Notifier, ProgressReporter, Selector};
use ingest_logging::{ingest_info, ingest_warn};

pub struct TerminalUi {
    /// Select every candidate and the first priority without asking.
    assume_yes: bool,
    total: AtomicUsize,
}

impl TerminalUi {
    pub fn new(assume_yes: bool) -> Self {
        Self {
            assume_yes,
            total: AtomicUsize::new(0),
        }
    }

    fn ask(&self, prompt: &str) -> Option<String> {
        let mut stderr = io::stderr().lock();
        let _ = write!(stderr, "{prompt}");
        let _ = stderr.flush();
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }
}

impl Selector for TerminalUi {
    fn select(&self, labels: &[String]) -> Vec<usize> {
        if self.assume_yes {
            return (0..labels.len()).collect();
        }
        for (idx, label) in labels.iter().enumerate() {
            eprintln!("{:>4}  {}", idx + 1, label);
        }
        self.ask("Select items (e.g. 1,3-5 or all; empty to cancel): ")
            .map(|answer| parse_selection(&answer, labels.len()))
            .unwrap_or_default()
    }

    fn choose(&self, prompt: &str, options: &[String]) -> Option<usize> {
        if self.assume_yes {
            return (!options.is_empty()).then_some(0);
        }
        eprintln!("{prompt}");
        for (idx, option) in options.iter().enumerate() {
            eprintln!("{:>4}  {}", idx + 1, option);
        }
        let answer = self.ask("> ")?;
        let choice = answer.parse::<usize>().ok()?;
        (1..=options.len()).contains(&choice).then(|| choice - 1)
    }
}

impl ProgressReporter for TerminalUi {
    fn start(&self, label: &str, total: usize) {
        self.total.store(total, Ordering::Relaxed);
        eprintln!("{label}");
    }

    fn update(&self, current: usize) {
        eprintln!("[{}/{}]", current, self.total.load(Ordering::Relaxed));
    }

    fn finish(&self) {
        self.total.store(0, Ordering::Relaxed);
    }
}

impl Notifier for TerminalUi {
    fn info(&self, message: &str) {
        ingest_info!("{}", message);
        println!("{message}");
    }

    fn warn(&self, message: &str) {
        ingest_warn!("{}", message);
        eprintln!("warning: {message}");
    }
}

/// Parse `1,3-5`, `all` or `*` into zero-based indices below `len`.
/// Unparsable parts are ignored.
pub fn parse_selection(input: &str, len: usize) -> Vec<usize> {
    let input = input.trim();
    if input.eq_ignore_ascii_case("all") || input == "*" {
        return (0..len).collect();
    }
    let mut chosen = Vec::new();
    for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (start, end) = match part.split_once('-') {
            Some((a, b)) => (a.trim().parse::<usize>(), b.trim().parse::<usize>()),
            None => (part.parse::<usize>(), part.parse::<usize>()),
        };
        let (Ok(start), Ok(end)) = (start, end) else {
            continue;
        };
        for n in start.max(1)..=end.min(len) {
            if !chosen.contains(&(n - 1)) {
                chosen.push(n - 1);
            }
        }
    }
    chosen
}
