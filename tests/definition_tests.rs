use approx::assert_abs_diff_eq;
use std::path::PathBuf;
use zzmarkov::definition::load_file;
use zzmarkov::*;

fn write_temp(name: &str, content: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("zzmarkov-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn assert_weather(chain: &MarkovChain) {
    let distribution = chain.solve().unwrap();
    assert_abs_diff_eq!(distribution.get("Sunny").unwrap(), 5.0 / 6.0, epsilon = 1e-9);
    assert_abs_diff_eq!(distribution.get("Rainy").unwrap(), 1.0 / 6.0, epsilon = 1e-9);
}

/// Test that every encoding of the weather chain solves identically.
#[test]
fn test_all_formats_agree() {
    let chain_yaml = "
chain:
  - { from: Sunny, to: Sunny, value: p }
  - { from: Sunny, to: Rainy, value: 1-p }
  - { from: Rainy, to: Sunny, value: 0.5 }
  - { from: Rainy, to: Rainy, value: 0.5 }
symbols:
  p: 0.9
";
    let matrix_json = r#"{
        "states": ["Sunny", "Rainy"],
        "initial": "Sunny",
        "transitions": {
            "Sunny": {"Sunny": 0.9, "Rainy": 0.1},
            "Rainy": {"Sunny": 0.5, "Rainy": 0.5}
        }
    }"#;
    let dot = "digraph {\n  Sunny -> Sunny [label=0.9]\n  Sunny -> Rainy [label=0.1]\n  Rainy -> Sunny [label=0.5]\n  Rainy -> Rainy [label=0.5]\n}\n";
    let csv = ",Sunny,Rainy\nSunny,0.9,0.1\nRainy,0.5,0.5\n";

    let chains = [
        DefinitionFormat::Chain.parse(chain_yaml).unwrap(),
        DefinitionFormat::Matrix.parse(matrix_json).unwrap(),
        DefinitionFormat::Dot.parse(dot).unwrap(),
        DefinitionFormat::Csv.parse(csv).unwrap(),
    ];
    for chain in &chains {
        assert_eq!(chain.state_count(), 2);
        assert_eq!(chain.link_count(), 4);
        assert_weather(chain);
    }
}

/// Test loading files with the format chosen by extension.
#[test]
fn test_load_file_by_extension() {
    let yaml = write_temp(
        "weather.yml",
        "chain:\n  - {from: Sunny, to: Rainy, value: 0.1}\n  - {from: Rainy, to: Sunny, value: 0.5}\n",
    );
    let gv = write_temp("weather.gv", "Sunny -> Rainy [label=0.1]\nRainy -> Sunny [label=0.5]\n");

    for path in [yaml, gv] {
        let chain = load_file(&path).unwrap();
        let distribution = chain.solve().unwrap();
        assert_eq!(distribution.fraction("Sunny"), Ratio::new(5, 6));
    }
}

/// Test that matrix documents are only used when asked for.
#[test]
fn test_matrix_format_is_explicit() {
    let path = write_temp(
        "matrix.json",
        r#"{"states": ["A", "B"], "transitions": {"A": {"B": 1}, "B": {"A": 1}}}"#,
    );

    assert!(matches!(load_file(&path), Err(DefinitionError::Malformed { format: "chain", .. })));

    let chain = DefinitionFormat::Matrix.load_file(&path).unwrap();
    assert_eq!(chain.solve().unwrap().get("A"), Some(0.5));
}

/// Test that an unknown extension is rejected before reading.
#[test]
fn test_unsupported_extension() {
    match load_file("chain.txt") {
        Err(DefinitionError::UnsupportedExtension { extension }) => assert_eq!(extension, ".txt"),
        other => panic!("Expected UnsupportedExtension, got {:?}", other),
    }
}

/// Test CSV cells holding symbolic rates.
#[test]
fn test_csv_symbolic_cells() {
    let csv = ",Idle,Busy\nIdle,,lambda\nBusy,mu,\n";
    let mut chain = DefinitionFormat::Csv.parse(csv).unwrap();
    chain.add_symbols([("lambda", 1.0), ("mu", 3.0)]).unwrap();

    let distribution = chain.solve().unwrap();
    assert_eq!(distribution.fraction("Idle"), Ratio::new(3, 4));
}

/// Test that well-formed documents describing invalid chains keep the
/// chain error.
#[test]
fn test_chain_error_passes_through() {
    let err = DefinitionFormat::Chain
        .parse("chain: []\nsymbols: { 'not valid': 1 }\n")
        .unwrap_err();
    assert!(matches!(err, DefinitionError::Chain(ChainError::InvalidSymbol { .. })));
}
