use std::env;
use tracing::{info, warn};

/// Moves into the directory of the binary so `config.toml` and `metrics.json` live next to it.
pub fn set_dir() {
    match env::current_exe() {
        Ok(path) => match path.parent() {
            Some(parent) => {
                if let Err(err) = env::set_current_dir(parent) {
                    warn!("Couldn't change the current directory: {}", err);
                }
            }
            None => warn!("Couldn't get the directory of the exe"),
        },
        Err(err) => warn!("Couldn't get the location of the exe: {}", err),
    }
    match env::current_dir() {
        Ok(dir) => info!(
            "All the files and all will be put in or read from: {}",
            dir.display()
        ),
        Err(err) => warn!("Couldn't even get the current directory: {}", err),
    }
}
