//! Weather example: a two-state chain with a symbolic parameter
//!
//! This example demonstrates:
//! - Building a chain from symbolic transitions
//! - Printing the balance equations
//! - Solving exactly and in floating point
//! - Exporting the transition matrix as CSV
//!
//! Run with `RUST_LOG=zzmarkov=debug` to see the solver events.

use tracing_subscriber::EnvFilter;
use zzmarkov::*;

fn main() -> Result<(), ChainError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("zzmarkov=warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut chain = MarkovChain::new();
    chain.add_symbol("p", 0.9)?;

    // Sunny days stay sunny with probability p
    chain.add_transition("Sunny", "Sunny", "p");
    chain.add_transition("Sunny", "Rainy", "1-p");
    chain.add_transition("Rainy", "Sunny", 0.5);
    chain.add_transition("Rainy", "Rainy", 0.5);

    println!("=== Chain ===");
    print!("{}", chain);

    println!("\n=== Balance Equations ===");
    for equation in chain.equations() {
        println!("  {}", equation);
    }

    println!("\n=== Stationary Distribution (exact) ===");
    let exact = chain.solve()?;
    for (label, probability) in exact.iter() {
        let fraction = exact.fraction(label).map(|r| r.to_string()).unwrap_or_default();
        println!("  {}: {:.6} ({})", label, probability, fraction);
    }

    println!("\n=== Stationary Distribution (float) ===");
    print!("{}", chain.solve_with(&SolveOptions::floating())?);

    println!("\n=== Transition Matrix ===");
    print!("{}", chain.transition_matrix(false)?);
    print!("{}", chain.transition_matrix(true)?);

    Ok(())
}
