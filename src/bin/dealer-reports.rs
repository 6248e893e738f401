use std::env;
use std::path::PathBuf;
use std::process;

use chrono::{Local, NaiveDate};
use dealer_reports::{run_report, ReportConfig, ReportKind};

fn print_usage() {
    let kinds: Vec<&str> = ReportKind::ALL.iter().map(|k| k.name()).collect();
    eprintln!(
        "Usage: dealer-reports <report> [--config FILE] [--data-dir DIR] \
         [--output-dir DIR] [--as-of YYYY-MM-DD]"
    );
    eprintln!("       dealer-reports --schema");
    eprintln!();
    eprintln!("Reports: {}", kinds.join(", "));
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config      JSON configuration file (see --schema)");
    eprintln!("  --data-dir    Root of the input layout (default: ../data)");
    eprintln!("  --output-dir  Where date-stamped report folders are written (default: .)");
    eprintln!("  --as-of       Report date (default: today)");
    eprintln!();
    eprintln!("Log level is controlled by RUST_LOG (default: info).");
}

fn fail(message: &str) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    if args[1] == "--schema" {
        match ReportConfig::schema_as_json() {
            Ok(schema) => println!("{}", schema),
            Err(e) => fail(&e.to_string()),
        }
        return;
    }

    let report = &args[1];
    let mut config_path: Option<PathBuf> = None;
    let mut data_dir: Option<PathBuf> = None;
    let mut output_dir: Option<PathBuf> = None;
    let mut as_of: NaiveDate = Local::now().date_naive();

    let mut i = 2;
    while i < args.len() {
        let value = args.get(i + 1);
        match (args[i].as_str(), value) {
            ("--config", Some(v)) => config_path = Some(PathBuf::from(v)),
            ("--data-dir", Some(v)) => data_dir = Some(PathBuf::from(v)),
            ("--output-dir", Some(v)) => output_dir = Some(PathBuf::from(v)),
            ("--as-of", Some(v)) => {
                as_of = NaiveDate::parse_from_str(v, "%Y-%m-%d")
                    .unwrap_or_else(|_| fail("--as-of requires a date like 2024-10-31"));
            }
            ("--config" | "--data-dir" | "--output-dir" | "--as-of", None) => {
                fail(&format!("{} requires a value", args[i]))
            }
            (other, _) => {
                print_usage();
                fail(&format!("Unknown argument: {}", other));
            }
        }
        i += 2;
    }

    let mut config = match config_path {
        Some(path) => ReportConfig::from_json_file(&path)
            .unwrap_or_else(|e| fail(&format!("Failed to load {}: {}", path.display(), e))),
        None => ReportConfig::default(),
    };
    if let Some(dir) = data_dir {
        config.inputs = dealer_reports::InputFiles::under(&dir);
    }
    if let Some(dir) = output_dir {
        config.output_dir = dir;
    }

    match run_report(report, &config, as_of) {
        Ok(output) => {
            for file in &output.files {
                println!("{}", file.display());
            }
        }
        Err(e) => fail(&e.to_string()),
    }
}
