fn main() {
    if let Err(err) = piq::run() {
        eprintln!("{}", piq::format_error(&err));
        std::process::exit(1);
    }
}
