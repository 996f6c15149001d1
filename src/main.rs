//! Rugo entry point.

fn main() {
    env_logger::init();

    if let Err(e) = rugo::cli::run_cli() {
        log::error!("{}", e);
        eprintln!("{}", rugo::style::bold_red(&format!("error: {}", e)));
        std::process::exit(1);
    }
}
