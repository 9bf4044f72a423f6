fn main() {
    if let Err(e) = docscope_cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
