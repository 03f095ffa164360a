fn main() {
    if let Err(err) = charging_sessions::app::run_api() {
        eprintln!("api startup failed: {err}");
        std::process::exit(1);
    }
}
