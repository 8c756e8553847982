use std::{fs, path::Path};

use crate::paths::{CONFIG_FILE, EXCLUDE_FILE};
use crate::{info, warn};

const STOCK_CONFIG: &str = r##"# Taskbar appearance presets.
# accent: normal | opaque | clear | blur | fluent | backdrop
# color:  "#RRGGBB" or "#AARRGGBB" (opacity: 0-255 overrides the alpha)
appearance:
  regular:
    accent: clear
    color: "#00000000"
  maximised:
    accent: blur
    color: "#AA000000"
  start:
    accent: normal
    color: "#00000000"
  cortana:
    accent: normal
    color: "#00000000"
  timeline:
    accent: normal
    color: "#00000000"

features:
  maximised:
    enabled: true
    regular_on_peek: true
  peek:
    mode: dynamic        # disabled | enabled | dynamic
    only_main: true
  start: true
  cortana: true
  timeline: true

runtime:
  sleep_time_ms: 10
  recompute_every: 10
  fluent_min_build: 17063

verbose: false
"##;

const STOCK_EXCLUDE: &str = r#"# Windows that never count as maximised.
class: []
title: []   # substring match
file: []    # process file name, case-insensitive
"#;

/// Creates the configuration folder and writes stock files that are
/// missing. Existing files are never touched.
pub fn scaffold(config_dir: &Path) {
    if let Err(e) = fs::create_dir_all(config_dir) {
        warn!("[BOOTSTRAP] Failed to create {}: {e}", config_dir.display());
        return;
    }

    scaffold_file(config_dir, CONFIG_FILE, STOCK_CONFIG);
    scaffold_file(config_dir, EXCLUDE_FILE, STOCK_EXCLUDE);
}

fn scaffold_file(config_dir: &Path, name: &str, content: &str) {
    let path = config_dir.join(name);
    if path.exists() {
        return;
    }

    match fs::write(&path, content) {
        Ok(_) => info!("[BOOTSTRAP] Created {}", path.display()),
        Err(e) => warn!("[BOOTSTRAP] Failed to create {}: {e}", path.display()),
    }
}
