use clap::{arg, value_parser, ArgMatches, Command};
use polygen_core::{backend::get_backend, pipeline, Config, Journal};
use std::{fs::File, io::Write, path::PathBuf};

pub fn command() -> ArgMatches {
  Command::new("Polygen")
    .version("0.1.0")
    .about("A packrat parser generator for extended PEG grammars.")
    .subcommand(
      Command::new("generate")
        .about("Generates a recognizer from a Polygen grammar.")
        .arg(
          arg!( -b --backend <BACKEND> "The code-generation backend.\n" )
            .required(false)
            .default_value("rust"),
        )
        .arg(
          arg!( -o --out <OUTPUT_PATH> "The directory the parser source will be written to.\n    Defaults to the CWD" )
            .required(false)
            .value_parser(value_parser!(PathBuf)),
        )
        .arg(
          arg!( -d --define <KEY_VALUE> "A key=value pair exposed to the skeleton as @backend.define.<key>" )
            .required(false)
            .action(clap::ArgAction::Append),
        )
        .arg(
          arg!(<GRAMMAR>)
            .help("Path to the source grammar file")
            .required(true)
            .value_parser(value_parser!(PathBuf)),
        ),
    )
    .subcommand(
      Command::new("test").about("Runs the backend equivalency suite.").arg(
        arg!( -b --backend <BACKEND> "The backend to exercise.\n" )
          .required(false)
          .default_value("rust"),
      ),
    )
    .get_matches()
}

fn main() {
  let matches = command();

  let status = if let Some(matches) = matches.subcommand_matches("generate") {
    generate(matches)
  } else if let Some(matches) = matches.subcommand_matches("test") {
    equivalency_suite(matches)
  } else {
    eprintln!("command not recognized; try --help");
    1
  };

  std::process::exit(status);
}

fn configure(matches: &ArgMatches) -> Result<Config, String> {
  let backend = matches.get_one::<String>("backend").cloned().unwrap_or_default();
  let mut config = Config::for_backend(&backend);

  for pair in matches.get_many::<String>("define").unwrap_or_default() {
    match pair.split_once('=') {
      Some((key, value)) => config.defines.push((key.to_string(), value.to_string())),
      None => return Err(format!("-d expects key=value, got {:?}", pair)),
    }
  }

  Ok(config)
}

fn generate(matches: &ArgMatches) -> i32 {
  let grammar_path = matches.get_one::<PathBuf>("GRAMMAR").unwrap();
  let out_dir = matches
    .get_one::<PathBuf>("out")
    .cloned()
    .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());

  let config = match configure(matches) {
    Ok(config) => config,
    Err(message) => {
      eprintln!("{}", message);
      return 1;
    }
  };

  let extension =
    get_backend(&config.backend).map(|d| d.file_extension).unwrap_or("txt").to_string();

  let mut j = Journal::new(Some(config));

  match pipeline::build_from_path(&mut j, grammar_path) {
    Ok(source) => {
      // Surface non-fatal diagnostics, then write the parser.
      j.dump_errors();

      let name = grammar_path.file_stem().and_then(|s| s.to_str()).unwrap_or("parser");
      let out_path = out_dir.join(format!("{}.{}", name, extension));

      let written = File::create(&out_path).and_then(|mut f| f.write_all(source.as_bytes()));
      match written {
        Ok(()) => 0,
        Err(err) => {
          eprintln!("could not write {}: {}", out_path.to_str().unwrap_or(""), err);
          1
        }
      }
    }
    Err(err) => {
      if !j.dump_errors() {
        eprintln!("{}", err);
      }
      1
    }
  }
}

/// Generates each sample grammar through the chosen backend and checks
/// the skeleton resolves. Compile-and-diff equivalency needs a configured
/// [Runner](polygen_core::backend::Runner), which ships with the harness
/// rather than the core.
fn equivalency_suite(matches: &ArgMatches) -> i32 {
  const SAMPLES: &[(&str, &str)] = &[
    ("number", "@entry\nNumber <- Digit+ ${ Value::Str(_1.text()) }\nDigit <- [0-9]\n"),
    ("choice", "@entry\nV <- 'a' / 'b' / [c-f]\n"),
    ("left_recursion", "@entry\nE <- E '+' T / T\nT <- [0-9]\n"),
    ("lookahead", "@entry\nK <- &'k' . !'z' .\n"),
  ];

  let config = match configure(matches) {
    Ok(config) => config,
    Err(message) => {
      eprintln!("{}", message);
      return 1;
    }
  };

  let mut failures = 0;

  for (name, grammar) in SAMPLES {
    let mut j = Journal::new(Some(config.clone()));
    match pipeline::build_from_string(&mut j, grammar) {
      Ok(_) => println!("pass {}", name),
      Err(err) => {
        failures += 1;
        println!("FAIL {}", name);
        if !j.dump_errors() {
          eprintln!("{}", err);
        }
      }
    }
  }

  if failures > 0 {
    eprintln!("{} of {} samples failed", failures, SAMPLES.len());
    1
  } else {
    0
  }
}
