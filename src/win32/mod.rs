//! Windows implementation of the shell boundary and the OS event sources.

pub mod events;
pub mod native;
pub mod start_menu;

use windows::Win32::System::Com::{CoInitializeEx, COINIT_APARTMENTTHREADED, COINIT_MULTITHREADED};

use crate::warn;

/// Multi-threaded apartment for the event thread, so the start menu sink
/// gets its callbacks without a dedicated pump.
pub fn init_com_multithreaded() {
    let hr = unsafe { CoInitializeEx(None, COINIT_MULTITHREADED) };
    if let Err(e) = hr.ok() {
        warn!("[COM] CoInitializeEx(MTA) failed: {e:?}");
    }
}

pub fn init_com_apartment() {
    let hr = unsafe { CoInitializeEx(None, COINIT_APARTMENTTHREADED) };
    if let Err(e) = hr.ok() {
        warn!("[COM] CoInitializeEx(STA) failed: {e:?}");
    }
}
