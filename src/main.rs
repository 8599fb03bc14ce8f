use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use log::info;

use trisat::feeder::{LiteralFeeder, RandomizedFeeder, SimpleFeeder, VsidsFeeder};
use trisat::valuation::Valuation;
use trisat::{cnf, solve, Status};

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum Heuristic {
    #[default]
    Simple,
    Random,
    Vsids,
}

/// A head/tail watched-literal DPLL SAT solver.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// DIMACS CNF file to solve. Reads standard input if omitted.
    instance: Option<PathBuf>,

    /// Decision heuristic to drive the search with.
    #[arg(long, value_enum, default_value_t = Heuristic::Simple)]
    heuristic: Heuristic,

    /// Seed for the randomized and VSIDS-like heuristics.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Emit `c` comment lines with solver progress.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| {
            use std::io::Write;
            writeln!(buf, "c {}", record.args())
        })
        .init();

    let formula = match &cli.instance {
        Some(path) => cnf::load_from_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => {
            let mut contents = String::new();
            std::io::stdin()
                .read_to_string(&mut contents)
                .context("failed to read standard input")?;
            cnf::parse(&contents).context("failed to parse standard input as DIMACS CNF")?
        }
    };

    let num_variables = formula.num_variables();
    let mut store = formula.into_clause_store();
    let mut valuation = Valuation::new(num_variables);

    info!("solving a formula with {num_variables} variables and {} clauses", store.len());

    let mut feeder: Box<dyn LiteralFeeder> = match cli.heuristic {
        Heuristic::Simple => Box::new(SimpleFeeder::new(num_variables)),
        Heuristic::Random => Box::new(RandomizedFeeder::new(num_variables, cli.seed)),
        Heuristic::Vsids => Box::new(VsidsFeeder::new(num_variables, &store, cli.seed)),
    };

    let result = solve(&mut store, &mut valuation, feeder.as_mut());

    match result.status {
        Status::Satisfiable => {
            println!("s SATISFIED");
            print!("v");
            for literal in result.model.expect("SAT result always carries a model") {
                print!(" {literal}");
            }
            println!();
        }
        Status::Unsatisfiable => {
            println!("s UNSATISFIED");
        }
        Status::Unknown => {
            println!("s UNKNOWN");
        }
    }

    Ok(())
}
