use std::path::PathBuf;

pub const APP_NAME: &str = "TaskbarTint";
pub const CONFIG_FILE: &str = "config.yaml";
pub const EXCLUDE_FILE: &str = "exclude.yaml";

pub fn roaming_app_data() -> Option<PathBuf> {
    // Primary (set for every interactive Windows session)
    if let Ok(app_data) = std::env::var("APPDATA") {
        return Some(PathBuf::from(app_data));
    }

    // Fallback (service accounts / stripped environments)
    let profile = std::env::var("USERPROFILE")
        .or_else(|_| std::env::var("HOME"))
        .ok()?;
    Some(PathBuf::from(profile).join("AppData").join("Roaming"))
}

/// `%APPDATA%\TaskbarTint`, or a folder next to the executable when the
/// environment gives no hint at all.
pub fn config_dir() -> PathBuf {
    if let Some(app_data) = roaming_app_data() {
        return app_data.join(APP_NAME);
    }

    match std::env::current_exe() {
        Ok(path) => path
            .parent()
            .map(|p| p.join(APP_NAME))
            .unwrap_or_else(|| PathBuf::from(APP_NAME)),
        Err(_) => PathBuf::from(APP_NAME),
    }
}

pub fn config_file() -> PathBuf {
    config_dir().join(CONFIG_FILE)
}

pub fn exclude_file() -> PathBuf {
    config_dir().join(EXCLUDE_FILE)
}
