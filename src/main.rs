fn main() {
    if let Err(err) = tactics_diagram::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
