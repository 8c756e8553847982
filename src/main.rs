#![windows_subsystem = "windows"]

use std::process::ExitCode;

use taskbar_tint::{
	bootstrap,
	data_loaders::{blacklist::Blacklist, config::TintConfig},
	error, info, logging, paths, warn,
};

pub const DEBUG_NAME: &str = "TASKBAR-TINT";

fn load_config() -> TintConfig {
	let config_path = paths::config_file();
	match TintConfig::load(&config_path) {
		Some(config) => {
			info!("[{}] Config loaded from {}", DEBUG_NAME, config_path.display());
			config
		}
		None => {
			warn!(
				"[{}] Could not read {}; using built-in defaults",
				DEBUG_NAME,
				config_path.display()
			);
			TintConfig::default()
		}
	}
}

fn load_blacklist() -> Blacklist {
	let exclude_path = paths::exclude_file();
	Blacklist::load(&exclude_path).unwrap_or_else(|| {
		warn!(
			"[{}] Could not read {}; no windows excluded",
			DEBUG_NAME,
			exclude_path.display()
		);
		Blacklist::default()
	})
}

fn main() -> ExitCode {
	logging::init(false);
	std::panic::set_hook(Box::new(|panic_info| {
		error!("[{}] Panic: {}", DEBUG_NAME, panic_info);
	}));

	bootstrap::scaffold(&paths::config_dir());

	let config = load_config();
	logging::set_debug(config.verbose);
	let blacklist = load_blacklist();

	info!("!---------- [{}] Starting ----------!", DEBUG_NAME);
	info!("[{}] Logging to {}", DEBUG_NAME, logging::log_file().display());

	run(config, blacklist)
}

#[cfg(windows)]
fn run(config: TintConfig, blacklist: Blacklist) -> ExitCode {
	use std::{sync::Arc, time::Duration};

	use taskbar_tint::{
		engine::Engine,
		scheduler::Worker,
		win32::{
			events::{run_message_loop, EventBridge},
			init_com_multithreaded,
			native::NativeShell,
		},
	};

	init_com_multithreaded();

	let interval = Duration::from_millis(config.runtime.sleep_time_ms);
	let threshold = config.runtime.recompute_every;
	let engine = Arc::new(Engine::new(NativeShell::new(), config, blacklist));

	let bridge = match EventBridge::install(Arc::clone(&engine)) {
		Ok(bridge) => bridge,
		Err(e) => {
			error!("[{}] Failed to install event sources: {}", DEBUG_NAME, e);
			return ExitCode::FAILURE;
		}
	};

	let worker = match Worker::spawn(Arc::clone(&engine), interval, threshold) {
		Ok(worker) => worker,
		Err(e) => {
			error!("[{}] Failed to start worker thread: {}", DEBUG_NAME, e);
			return ExitCode::FAILURE;
		}
	};

	run_message_loop();

	info!("[{}] Shutting down", DEBUG_NAME);
	worker.stop();
	engine.restore_all();
	drop(bridge);

	ExitCode::SUCCESS
}

#[cfg(not(windows))]
fn run(_config: TintConfig, _blacklist: Blacklist) -> ExitCode {
	error!("[{}] Taskbar compositing is only available on Windows", DEBUG_NAME);
	eprintln!("taskbar-tint only runs on Windows");
	ExitCode::FAILURE
}
