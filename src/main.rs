//! mathprose - describe MathML formulas in Russian prose

use std::fs;
use std::process::ExitCode;

use clap::Parser;
use serde::Deserialize;

use mathprose::{describe, normalize};

#[derive(Parser)]
#[command(name = "mathprose")]
#[command(version, about = "Describes MathML formulas in Russian prose", long_about = None)]
#[command(after_help = "EXAMPLES:
    mathprose dataset.json           Compare produced descriptions against the dataset
    mathprose dataset.json --tree    Also dump each normalized tree")]
struct Cli {
    /// JSON dataset: an array of {"mathml", "description"} records
    #[arg(value_name = "DATASET")]
    dataset: String,

    /// Dump the normalized tree for each record
    #[arg(short, long)]
    tree: bool,
}

/// One dataset record: the input markup and the description a human
/// wrote for it.
#[derive(Deserialize)]
struct Record {
    mathml: String,
    description: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let data = fs::read_to_string(&cli.dataset).map_err(|e| e.to_string())?;
    let records: Vec<Record> = serde_json::from_str(&data).map_err(|e| e.to_string())?;

    for (i, record) in records.iter().enumerate() {
        println!("{}) MathML: {}", i + 1, record.mathml);
        match normalize(&record.mathml) {
            Ok(tree) => {
                if cli.tree {
                    print!("{}", tree.dump());
                }
                println!("Expected: {}", record.description);
                println!("Produced: {}", describe(&tree, true));
            }
            // A bad record is reported but does not stop the run.
            Err(e) => println!("Parse failed: {e}"),
        }
        println!();
    }

    Ok(())
}
