use std::io::Read;
use std::process;

use cube_recon::turn::TurnSequence;
use cube_recon::{logger, AnalysisRequest, Result};
use rand::thread_rng;

const USAGE: &str = "usage: recon [analyze | optimize | scramble [length]]

analyze and optimize read a JSON request on stdin:
  { scramble, solution, method_id, methods, phases, config? }";

fn analyze(with_alternatives: bool) -> Result<String> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    let request: AnalysisRequest = serde_json::from_str(&input)?;
    let analysis = request.analyze(with_alternatives)?;
    Ok(serde_json::to_string_pretty(&analysis)?)
}

fn main() {
    if let Err(err) = logger::init() {
        eprintln!("{}", err);
    }
    let args: Vec<String> = std::env::args().skip(1).collect();
    let output = match args.first().map(String::as_str) {
        None | Some("analyze") => analyze(false),
        Some("optimize") => analyze(true),
        Some("scramble") => {
            let len = match args.get(1).map(|l| l.parse::<usize>()) {
                None => 25,
                Some(Ok(len)) => len,
                Some(Err(err)) => {
                    eprintln!("bad length: {}\n{}", err, USAGE);
                    process::exit(2);
                }
            };
            Ok(TurnSequence::random_scramble(&mut thread_rng(), len).to_string())
        }
        Some(_) => {
            eprintln!("{}", USAGE);
            process::exit(2);
        }
    };
    match output {
        Ok(output) => println!("{}", output),
        Err(err) => {
            eprintln!("{}", err);
            process::exit(1);
        }
    }
}
