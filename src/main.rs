use leakscope::cli::{Args, Command};
use std::process;

/// Log level when RUST_LOG is unset
fn default_log_filter(args: &Args) -> &'static str {
    if args.verbose {
        "debug"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    }
}

fn main() {
    let args = Args::parse_args();

    env_logger::init_from_env(env_logger::Env::new().default_filter_or(default_log_filter(&args)));
    log::debug!("{} v{}", leakscope::NAME, leakscope::VERSION);

    let command = Command::from_args(args);
    process::exit(command.run());
}
