fn main() {
    if let Err(err) = sheet_sync::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
