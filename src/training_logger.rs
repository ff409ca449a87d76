//! Training Logger
//!
//! Logs training metrics to a CSV file and the console. The CSV can be loaded
//! into a spreadsheet or plotting tool to compare runs.
//!
//! ## CSV Format
//!
//! - `step`: Optimizer step number
//! - `epoch`: Epoch the step belongs to (1-based)
//! - `elapsed_seconds`: Time since training started
//! - `learning_rate`: Current learning rate
//! - `train_loss`: Mean training loss since the previous log line
//! - `val_loss`: Validation loss (empty when there is no validation set)
//! - `train_perplexity`: exp(train_loss)
//! - `val_perplexity`: exp(val_loss)
//! - `grad_norm`: Gradient norm of the latest step, before clipping
//!
//! ## Perplexity
//!
//! For skip-gram, perplexity is roughly "how many context words the model is
//! still choosing between". Random guessing over a vocabulary of V words
//! gives a perplexity of V; it can never reach 1 because a word genuinely
//! has many possible neighbours.
//!
//! ## Example
//!
//! ```rust,no_run
//! use skipgram::{StepMetrics, TrainingLogger};
//!
//! let mut logger = TrainingLogger::new("training_log.csv")?;
//! logger.log(&StepMetrics {
//!     step: 100,
//!     epoch: 1,
//!     learning_rate: 0.01,
//!     train_loss: 3.2,
//!     val_loss: Some(3.4),
//!     grad_norm: 0.8,
//! })?;
//! # Ok::<(), std::io::Error>(())
//! ```

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

/// Metrics for one log line
#[derive(Clone, Debug, PartialEq)]
pub struct StepMetrics {
    pub step: usize,
    pub epoch: usize,
    pub learning_rate: f32,
    pub train_loss: f32,
    pub val_loss: Option<f32>,
    pub grad_norm: f32,
}

/// Training logger for tracking metrics over time
///
/// # Fields
///
/// - `log_file`: Output CSV file
/// - `start_time`: When training started (for elapsed time calculation)
/// - `last_log_time`: Last log timestamp (for step timing)
pub struct TrainingLogger {
    log_file: File,
    start_time: Instant,
    last_log_time: Instant,
}

impl TrainingLogger {
    /// Create a CSV log file with headers and start the clock
    pub fn new<P: AsRef<Path>>(log_path: P) -> std::io::Result<Self> {
        let mut log_file = File::create(log_path)?;

        writeln!(
            log_file,
            "step,epoch,elapsed_seconds,learning_rate,train_loss,val_loss,train_perplexity,val_perplexity,grad_norm"
        )?;

        let now = Instant::now();
        Ok(Self {
            log_file,
            start_time: now,
            last_log_time: now,
        })
    }

    /// Write one CSV row and print a summary line
    pub fn log(&mut self, metrics: &StepMetrics) -> std::io::Result<()> {
        let elapsed = self.start_time.elapsed().as_secs_f32();
        let train_perplexity = metrics.train_loss.exp();

        let (val_loss, val_perplexity) = match metrics.val_loss {
            Some(loss) => (format!("{:.4}", loss), format!("{:.2}", loss.exp())),
            None => (String::new(), String::new()),
        };

        writeln!(
            self.log_file,
            "{},{},{:.2},{:.6},{:.4},{},{:.2},{},{:.4}",
            metrics.step,
            metrics.epoch,
            elapsed,
            metrics.learning_rate,
            metrics.train_loss,
            val_loss,
            train_perplexity,
            val_perplexity,
            metrics.grad_norm
        )?;

        // Flush so a crashed run keeps its log
        self.log_file.flush()?;

        let step_time = self.last_log_time.elapsed().as_secs_f32();
        match metrics.val_loss {
            Some(val) => println!(
                "Step {:5} | Epoch {:3} | Time: {:7.1}s (+{:.1}s) | Train: {:.4} | Val: {:.4} | Perplexity: {:.2}",
                metrics.step, metrics.epoch, elapsed, step_time, metrics.train_loss, val, val.exp()
            ),
            None => println!(
                "Step {:5} | Epoch {:3} | Time: {:7.1}s (+{:.1}s) | Train: {:.4} | Perplexity: {:.2}",
                metrics.step, metrics.epoch, elapsed, step_time, metrics.train_loss, train_perplexity
            ),
        }

        self.last_log_time = Instant::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_header_and_rows() {
        let path = std::env::temp_dir().join(format!("skipgram_log_{}.csv", std::process::id()));
        {
            let mut logger = TrainingLogger::new(&path).unwrap();
            logger
                .log(&StepMetrics {
                    step: 10,
                    epoch: 1,
                    learning_rate: 0.01,
                    train_loss: 2.0,
                    val_loss: Some(2.5),
                    grad_norm: 0.5,
                })
                .unwrap();
            logger
                .log(&StepMetrics {
                    step: 20,
                    epoch: 1,
                    learning_rate: 0.01,
                    train_loss: 1.5,
                    val_loss: None,
                    grad_norm: 0.25,
                })
                .unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        let lines: Vec<&str> = contents.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("step,epoch,"));
        assert!(lines[1].starts_with("10,1,"));
        assert!(lines[1].contains(",2.0000,2.5000,7.39,12.18,0.5000"));
        // Missing validation loss leaves empty fields
        assert!(lines[2].ends_with(",1.5000,,4.48,,0.2500"));
    }
}
