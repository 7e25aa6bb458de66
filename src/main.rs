fn main() {
    if let Err(err) = production_import::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
