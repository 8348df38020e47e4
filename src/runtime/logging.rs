use std::fs::{self, OpenOptions};

use crate::config::{self, LoggingSettings};

/// Send `log` output to a file, since the TUI owns the terminal.
///
/// `RUST_LOG` overrides `logging.level`. Any failure leaves logging disabled
/// rather than stopping the player.
pub fn init(settings: &LoggingSettings) {
    let Some(path) = settings.file.clone().or_else(config::default_log_path) else {
        return;
    };
    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            eprintln!("reprise: cannot create log dir {}: {e}", parent.display());
            return;
        }
    }
    let file = match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("reprise: cannot open log file {}: {e}", path.display());
            return;
        }
    };

    let env = env_logger::Env::default().default_filter_or(settings.level.as_str());
    let _ = env_logger::Builder::from_env(env)
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init();
}
