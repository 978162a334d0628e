//! Queue example: a tandem of two bounded queues over tuple states
//!
//! This example demonstrates:
//! - Composite `(n1, n2)` states and their pretty labels
//! - Rates given as symbols
//! - Deriving a performance metric from the distribution

use zzmarkov::*;

const CAPACITY: i64 = 2;

fn main() -> Result<(), ChainError> {
    let mut chain = MarkovChain::new();
    chain.add_symbols([("lambda", 1.0), ("mu1", 2.0), ("mu2", 3.0)])?;

    for n1 in 0..=CAPACITY {
        for n2 in 0..=CAPACITY {
            let state = State::tuple([n1, n2]);
            chain.add_state(state.clone());

            // Arrival to the first queue
            if n1 < CAPACITY {
                chain.add_transition(state.clone(), State::tuple([n1 + 1, n2]), "lambda");
            }
            // Service at the first queue moves a job downstream
            if n1 > 0 && n2 < CAPACITY {
                chain.add_transition(state.clone(), State::tuple([n1 - 1, n2 + 1]), "mu1");
            }
            // Departure from the second queue
            if n2 > 0 {
                chain.add_transition(state, State::tuple([n1, n2 - 1]), "mu2");
            }
        }
    }

    println!("{} states, {} links", chain.state_count(), chain.link_count());

    let distribution = chain.solve()?;
    println!("\n=== Stationary Distribution ===");
    for state in chain.states() {
        let label = state.pretty_label();
        let probability = distribution.get(&label).unwrap_or_default();
        println!("  {} {}: {:.6}", state, label, probability);
    }

    // Mean number of jobs in the system
    let mean_jobs: f64 = chain
        .states()
        .iter()
        .filter_map(|state| match state.value() {
            StateValue::Tuple(items) => {
                let jobs: i64 = items.iter().sum();
                distribution
                    .get(&state.pretty_label())
                    .map(|p| jobs as f64 * p)
            }
            StateValue::Label(_) => None,
        })
        .sum();
    println!("\nMean jobs in system: {:.6}", mean_jobs);

    Ok(())
}
