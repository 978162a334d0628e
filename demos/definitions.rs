//! Definitions example: building chains from text documents
//!
//! This example demonstrates:
//! - Parsing each supported definition format
//! - Picking a format by name
//! - Reporting definition errors

use zzmarkov::*;

const CHAIN_YAML: &str = "
chain:
  - { from: Idle, to: Busy, value: lambda }
  - { from: Busy, to: Idle, value: mu }
symbols:
  lambda: 0.4
  mu: '0.6'
";

const MATRIX_YAML: &str = "
states: [S0, S1, S2]
initial: S0
transitions:
  S0: { S0: 0.5, S1: 0.5 }
  S1: { S2: 1.0 }
  S2: { S0: 1.0 }
";

const DOT: &str = r#"
digraph {
    S0 -> S1 [label="0.3"]
    S0 -> S0 [label=0.7]
    S1 -> S0
}
"#;

const CSV: &str = ",A,B,C\nA,0,1,0\nB,0,0,1\nC,1,0,0\n";

fn main() -> Result<(), DefinitionError> {
    let documents = [
        ("chain", CHAIN_YAML),
        ("matrix", MATRIX_YAML),
        ("dot", DOT),
        ("csv", CSV),
    ];

    for (name, content) in documents {
        let format: DefinitionFormat = name.parse()?;
        let chain = format.parse(content)?;
        println!("=== {} ({} states, {} links) ===", format, chain.state_count(), chain.link_count());
        print!("{}", chain.solve()?);
        println!();
    }

    println!("=== Errors ===");
    if let Err(e) = DefinitionFormat::Dot.parse("digraph { }") {
        println!("  {}", e);
    }
    if let Err(e) = "graphml".parse::<DefinitionFormat>() {
        println!("  {}", e);
    }
    if let Err(e) = DefinitionFormat::from_extension("txt") {
        println!("  {}", e);
    }

    Ok(())
}
