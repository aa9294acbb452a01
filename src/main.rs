use clap::{Arg, Command};
use lox::{Diagnostics, Interpreter};
use std::fs;
use std::path::Path;
use std::process::ExitCode;

// sysexits.h conventions
const EX_USAGE: u8 = 64;
const EX_DATAERR: u8 = 65;
const EX_SOFTWARE: u8 = 70;
const EX_IOERR: u8 = 74;

fn main() -> ExitCode {
    init_tracing();

    let matches = Command::new("lox")
        .about("A tree-walking interpreter for a small Lox dialect")
        .arg(
            Arg::new("file")
                .help("The script file to execute")
                .value_name("FILE")
                .index(1),
        )
        .arg(
            Arg::new("interactive")
                .short('i')
                .long("interactive")
                .help("Start in interactive REPL mode")
                .conflicts_with("file")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("plain")
                .long("plain")
                .help("Print diagnostics as single '[line N]' lines")
                .action(clap::ArgAction::SetTrue),
        )
        .try_get_matches();

    let matches = match matches {
        Ok(matches) => matches,
        Err(error) => {
            let _ = error.print();
            return if error.use_stderr() {
                ExitCode::from(EX_USAGE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    let plain = matches.get_flag("plain");

    match matches.get_one::<String>("file") {
        Some(file_path) => run_file(file_path, plain),
        None => match lox::start_repl(plain) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error reading input: {}", e);
                ExitCode::from(EX_IOERR)
            }
        },
    }
}

fn run_file(path: &str, plain: bool) -> ExitCode {
    let path = Path::new(path);

    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", path.display(), e);
            return ExitCode::from(EX_IOERR);
        }
    };

    let mut diagnostics = Diagnostics::new();
    let mut interpreter = Interpreter::new();
    lox::run_source(&source, &mut interpreter, &mut diagnostics);

    let filename = path.to_string_lossy();
    if let Err(e) = diagnostics.flush(&source, Some(&filename), plain) {
        eprintln!("Error writing diagnostics: {}", e);
    }

    if diagnostics.had_syntax_error() {
        ExitCode::from(EX_DATAERR)
    } else if diagnostics.had_runtime_error() {
        ExitCode::from(EX_SOFTWARE)
    } else {
        ExitCode::SUCCESS
    }
}

/// Log to stderr when `RUST_LOG` is set, e.g. `RUST_LOG=lox=trace`.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true),
            )
            .with(EnvFilter::from_default_env())
            .init();
    }
}
