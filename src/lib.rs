// syno-thumbs - Synology @eaDir thumbnail generator

pub mod constants;
pub mod error;
pub mod tools;
pub mod metadata;
pub mod thumbs;
pub mod jobs;
pub mod discover;
pub mod driver;

/// Log to stderr. `RUST_LOG` wins over the debug switch.
pub fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}
