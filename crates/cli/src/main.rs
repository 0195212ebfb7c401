//! Perfgate CLI entry point.

fn main() {
    perfgate_cli::init_tracing();
    match perfgate_cli::run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(2);
        }
    }
}
