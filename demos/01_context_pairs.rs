//! Context Pair Demonstration
//!
//! Shows how skip-gram turns a token sequence into (center, context) training
//! pairs, and how the window size controls how many pairs come out.
//!
//! Run with: `cargo run --example 01_context_pairs`

use skipgram::{context_pairs, generate_pairs, pair_count, ContextPair, ContextWindow};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Skip-gram Context Pairs ===\n");

    // ========================================================================
    // 1. A tiny sequence
    // ========================================================================
    println!("{}", "=".repeat(70));
    println!("1. Pairs for a short sequence");
    println!("{}", "=".repeat(70));

    let sequence = [10, 11, 12, 13];
    for window in 0..=2 {
        let pairs = generate_pairs(&sequence, window)?;
        let shown: Vec<(usize, usize)> = pairs.iter().map(|p| p.as_tuple()).collect();
        println!("\n  window={} -> {} pairs", window, pairs.len());
        println!("  {:?}", shown);
    }

    // ========================================================================
    // 2. Where each pair comes from
    // ========================================================================
    println!("\n{}", "=".repeat(70));
    println!("2. Walking the window");
    println!("{}", "=".repeat(70));
    println!();

    let window = 1i64;
    for (i, &center) in sequence.iter().enumerate() {
        let lo = i as i64 - window;
        let hi = i as i64 + window;
        let contexts: Vec<usize> = (lo..=hi)
            .filter(|&j| j != i as i64 && j >= 0 && (j as usize) < sequence.len())
            .map(|j| sequence[j as usize])
            .collect();
        println!(
            "  i={} center={} scans [{}, {}] -> contexts {:?}",
            i, center, lo, hi, contexts
        );
    }

    // ========================================================================
    // 3. How pair counts grow
    // ========================================================================
    println!("\n{}", "=".repeat(70));
    println!("3. Pair counts by window size (sequence of 1000 tokens)");
    println!("{}", "=".repeat(70));
    println!();

    for radius in [1, 2, 5, 10] {
        let count = pair_count(1000, ContextWindow::from_radius(radius));
        println!("  window={:2} -> {:6} pairs (~{:.1} per token)", radius, count, count as f32 / 1000.0);
    }

    // ========================================================================
    // 4. Lazy iteration
    // ========================================================================
    println!("\n{}", "=".repeat(70));
    println!("4. Lazy iteration");
    println!("{}", "=".repeat(70));
    println!();

    let long: Vec<usize> = (0..1_000_000).collect();
    let mut iter = context_pairs(&long, ContextWindow::new(5)?);
    println!("  {} pairs available without allocating them", iter.len());
    println!("  first three: {:?}", (0..3).filter_map(|_| iter.next()).collect::<Vec<_>>());

    // ========================================================================
    // 5. Saving pairs
    // ========================================================================
    println!("\n{}", "=".repeat(70));
    println!("5. Pairs as JSON");
    println!("{}", "=".repeat(70));
    println!();

    let pairs = generate_pairs(&sequence, 1)?;
    let json = serde_json::to_string(&pairs)?;
    println!("  {}", json);
    let restored: Vec<ContextPair> = serde_json::from_str(&json)?;
    println!("  read back {} pairs, identical: {}", restored.len(), restored == pairs);

    // ========================================================================
    // 6. Invalid input
    // ========================================================================
    println!("\n{}", "=".repeat(70));
    println!("6. Negative windows are rejected");
    println!("{}", "=".repeat(70));
    println!();

    match generate_pairs(&sequence, -1) {
        Ok(_) => println!("  unexpected success"),
        Err(e) => println!("  generate_pairs(.., -1) -> error: {}", e),
    }

    Ok(())
}
