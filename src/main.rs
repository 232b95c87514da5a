use wave_bridge::cli;

fn main() {
    // Logging is initialized inside the CLI once the config is known
    let code = cli::process_cli();
    std::process::exit(code);
}
