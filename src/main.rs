fn main() {
    if let Err(err) = dyndiag::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
