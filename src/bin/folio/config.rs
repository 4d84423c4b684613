use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};

use folio::config::{read_config, Config};

use crate::CFG_FILE_NAME;

/// Next to the executable, then the current dir, then the user config dir.
fn get_config_path() -> Option<PathBuf> {
    let exe_dir = env::current_exe().ok()
        .and_then(|exe| exe.parent().map(|p| p.to_path_buf()));
    let candidates = [
        exe_dir,
        env::current_dir().ok(),
        dirs::config_dir(),
    ];

    candidates.into_iter()
        .flatten()
        .map(|dir| dir.join(CFG_FILE_NAME))
        .find(|path| path.exists())
}

fn default_log_location() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("Folio").join("log").join("server.log"))
}

pub(crate) fn open_config(cfg_path: Option<PathBuf>) -> Result<Config> {
    let config_path = match cfg_path {
        Some(path) => path,
        None => get_config_path().ok_or_else(|| anyhow!("Could not find Folio configuration"))?,
    };

    if let Ok(cur_dir) = env::current_dir() {
        println!("Current dir: {}", cur_dir.display());
    }
    println!("Reading config from {}", config_path.display());
    let mut config = read_config(&config_path)
        .with_context(|| format!("Unable to load {}", config_path.display()))?;

    if let Some(mut log) = config.log {
        if log.location.is_none() {
            log.location = default_log_location();
        }
        match log.location {
            Some(ref location) => println!("Log enabled. Files will be written in {}", location.display()),
            None => println!("Log enabled. No cache dir found, using stdout"),
        }
        config.log = Some(log);
    } else {
        println!("Log disabled. Using stdout");
    }

    Ok(config)
}
