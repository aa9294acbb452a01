use crate::runner::Session;
use std::io::{self, BufRead, Write};

/// Interactive loop over stdin. Definitions persist between lines; bare
/// expressions have their value echoed.
pub fn start(plain: bool) -> io::Result<()> {
    println!("lox {}", env!("CARGO_PKG_VERSION"));
    println!("Type 'exit' or press Ctrl+D to quit");
    println!();

    let mut session = Session::new();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            // EOF reached (Ctrl+D or piped input ended)
            println!();
            break;
        };
        let line = line?;
        let line = line.trim();

        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }

        if let Some(value) = session.run_entry(line) {
            println!("{}", value);
        }
        session.diagnostics_mut().flush(line, None, plain)?;
    }

    Ok(())
}
