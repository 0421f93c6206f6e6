fn main() {
    if let Err(err) = saveguard_lib::run() {
        log::error!("{err:#}");
        std::process::exit(1);
    }
}
