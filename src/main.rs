mod app;

use splinepond::config::Options;

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    log::info!("splinepond v{} starting", env!("CARGO_PKG_VERSION"));

    let options = Options::load_from_file(&Options::config_path());
    log::debug!("{options:?}");

    match app::run(options) {
        Ok(_) => log::info!("Exited cleanly"),
        Err(err) => {
            log::error!("{err:#}");
            std::process::exit(1);
        }
    };
}
