//! Keeps every taskbar on the appearance that matches what is on screen.
//!
//! The worker thread drives [`scheduler::DebounceScheduler`], which scans
//! windows, runs [`decision::decide`] and pushes the result through the
//! [`dispatcher::Dispatcher`]. OS events mutate the shared
//! [`engine::Engine`] from the event thread.

pub mod appearance;
pub mod bootstrap;
pub mod data_loaders;
pub mod decision;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod logging;
pub mod paths;
pub mod registry;
pub mod scanner;
pub mod scheduler;
pub mod shell;
pub mod utility;

#[cfg(windows)]
pub mod win32;

#[cfg(test)]
mod testing;
