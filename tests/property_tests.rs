use proptest::prelude::*;
use zzmarkov::*;

fn birth_death(rates: &[(u32, u32)], reverse: bool) -> MarkovChain {
    let mut links = Vec::new();
    for (i, (up, down)) in rates.iter().enumerate() {
        let n = i as i64;
        links.push((State::tuple([n]), State::tuple([n + 1]), *up as f64));
        links.push((State::tuple([n + 1]), State::tuple([n]), *down as f64));
    }
    if reverse {
        links.reverse();
    }

    let mut chain = MarkovChain::new();
    for (tail, head, weight) in links {
        chain.add_transition(tail, head, weight);
    }
    chain
}

proptest! {
    #[test]
    fn solution_is_normalized(rates in prop::collection::vec((1u32..20, 1u32..20), 1..6)) {
        let distribution = birth_death(&rates, false).solve().unwrap();
        prop_assert_eq!(distribution.len(), rates.len() + 1);
        prop_assert!((distribution.total() - 1.0).abs() < 1e-9);
        prop_assert!(distribution.iter().all(|(_, p)| p >= 0.0));
    }

    #[test]
    fn insertion_order_does_not_matter(rates in prop::collection::vec((1u32..20, 1u32..20), 1..6)) {
        let forward = birth_death(&rates, false);
        let backward = birth_death(&rates, true);

        let forward_equations: Vec<String> = forward.equations().iter().map(|e| e.state.to_string()).collect();
        let backward_equations: Vec<String> = backward.equations().iter().map(|e| e.state.to_string()).collect();
        prop_assert_eq!(forward_equations, backward_equations);
        prop_assert_eq!(forward.solve().unwrap(), backward.solve().unwrap());
    }

    #[test]
    fn matrix_rows_are_normalized(rates in prop::collection::vec((1u32..20, 1u32..20), 1..6)) {
        let matrix = birth_death(&rates, false).transition_matrix(true).unwrap();
        for row in 0..matrix.size() {
            let sum = matrix.row_sum(row).unwrap();
            prop_assert!((sum - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn states_are_sorted(names in prop::collection::vec("[A-Za-z][A-Za-z0-9]{0,6}", 1..10)) {
        let mut chain = MarkovChain::new();
        for name in &names {
            chain.add_state(name.as_str());
        }
        let states = chain.states();
        prop_assert!(states.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn prefixed_symbols_are_distinct(suffix in 0u32..1000, short in 1.0f64..10.0, long in 10.0f64..20.0) {
        let longer = format!("m{}", suffix);
        let mut symbols = SymbolTable::new();
        symbols.set("m", short).unwrap();
        symbols.set(longer.as_str(), long).unwrap();

        let evaluator = Evaluator::new(&symbols);
        let value = evaluator.evaluate(&Weight::from(longer)).unwrap();
        prop_assert!((value - long).abs() < 1e-9);
    }
}
