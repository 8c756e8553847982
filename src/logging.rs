use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Sender},
        OnceLock,
    },
    thread,
};

use crate::paths::config_dir;

/* =========================
   GLOBAL STATE
   ========================= */

static VERBOSE: AtomicBool = AtomicBool::new(false);
static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();
static LOG_TX: OnceLock<Sender<String>> = OnceLock::new();

/* =========================
   PUBLIC API
   ========================= */

/// Starts the background writer. Calling it twice keeps the first writer.
pub fn init(verbose: bool) {
    VERBOSE.store(verbose, Ordering::Relaxed);
    if LOG_TX.get().is_some() {
        return;
    }

    let path = log_path().clone();
    let (tx, rx) = mpsc::channel::<String>();
    if LOG_TX.set(tx).is_err() {
        return;
    }

    thread::spawn(move || {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }

        let Ok(mut file) = OpenOptions::new().create(true).append(true).open(&path) else {
            return;
        };

        while let Ok(line) = rx.recv() {
            let _ = writeln!(file, "{line}");
            let _ = file.flush();
        }
    });
}

pub fn set_debug(verbose: bool) {
    VERBOSE.store(verbose, Ordering::Relaxed);
}

#[inline]
pub fn should_log(level: &str) -> bool {
    if !VERBOSE.load(Ordering::Relaxed) {
        return level == "WARN" || level == "ERROR";
    }
    true
}

pub fn log_file() -> &'static PathBuf {
    log_path()
}

/* =========================
   INTERNAL
   ========================= */

#[inline]
pub fn enqueue(level: &str, msg: String) {
    if let Some(tx) = LOG_TX.get() {
        let ts = timestamp();
        let _ = tx.send(format!("{ts} [{level}] {msg}"));
    }
}

fn timestamp() -> String {
    let now = chrono::Local::now();
    now.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

/* =========================
   MACROS
   ========================= */

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {{
        if $crate::logging::should_log("INFO") {
            $crate::logging::enqueue(
                "INFO",
                format!($($arg)*)
            );
        }
    }};
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {{
        $crate::logging::enqueue(
            "WARN",
            format!($($arg)*)
        );
    }};
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {{
        $crate::logging::enqueue(
            "ERROR",
            format!($($arg)*)
        );
    }};
}

/* =========================
   PATH
   ========================= */

fn log_path() -> &'static PathBuf {
    LOG_PATH.get_or_init(|| config_dir().join("taskbar-tint.log"))
}
