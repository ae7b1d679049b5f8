use std::fs::File;
use std::path::Path;

use env_logger::{Builder, Env, Target};
use log::LevelFilter;

/// Initializes the global logger.
///
/// The filter comes from `RUST_LOG`, defaulting to info. With a
/// `log_file` the output is piped there, since stderr would draw over
/// the raw-mode terminal. If that file cannot be created, the reason is
/// printed and no logger is installed. Call this before raw mode starts.
pub fn init(log_file: Option<&Path>) {
    let env = Env::default().default_filter_or(LevelFilter::Info.to_string());
    let mut builder = Builder::from_env(env);

    if let Some(path) = log_file {
        let Some(file) = open_log_file(path) else { return };
        builder.target(Target::Pipe(Box::new(file)));
    }

    // `try_init` only fails if a logger was already set.
    let _ = builder.try_init();
}

fn open_log_file(path: &Path) -> Option<File> {
    match File::create(path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("cannot create log file {}: {e}; logging disabled", path.display());
            None
        }
    }
}
