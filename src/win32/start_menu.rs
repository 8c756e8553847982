use std::sync::Arc;

use windows::{
    core::{implement, Result, BOOL},
    Win32::{
        Graphics::Gdi::HMONITOR,
        System::Com::{CoCreateInstance, CLSCTX_ALL},
        UI::Shell::{
            AppVisibility, IAppVisibility, IAppVisibilityEvents, IAppVisibilityEvents_Impl,
            MONITOR_APP_VISIBILITY,
        },
    },
};

use super::native::NativeShell;
use crate::{engine::Engine, info, warn};

#[implement(IAppVisibilityEvents)]
struct LauncherSink {
    engine: Arc<Engine<NativeShell>>,
}

impl IAppVisibilityEvents_Impl for LauncherSink_Impl {
    fn AppVisibilityOnMonitorChanged(
        &self,
        _hmonitor: HMONITOR,
        _previousmode: MONITOR_APP_VISIBILITY,
        _currentmode: MONITOR_APP_VISIBILITY,
    ) -> Result<()> {
        Ok(())
    }

    fn LauncherVisibilityChange(&self, currentvisiblestate: BOOL) -> Result<()> {
        self.engine.set_start_opened(currentvisiblestate.as_bool());
        Ok(())
    }
}

/// Keeps the start menu visibility sink registered until dropped.
pub struct StartMenuSubscription {
    app_visibility: IAppVisibility,
    cookie: u32,
}

impl StartMenuSubscription {
    pub fn register(engine: Arc<Engine<NativeShell>>) -> Option<Self> {
        let app_visibility: IAppVisibility = match unsafe { CoCreateInstance(&AppVisibility, None, CLSCTX_ALL) } {
            Ok(app_visibility) => app_visibility,
            Err(e) => {
                warn!("[START] AppVisibility unavailable: {e:?}");
                return None;
            }
        };

        let sink: IAppVisibilityEvents = LauncherSink { engine }.into();
        match unsafe { app_visibility.Advise(&sink) } {
            Ok(cookie) => {
                info!("[START] Start menu visibility sink registered");
                Some(Self { app_visibility, cookie })
            }
            Err(e) => {
                warn!("[START] Failed to register app visibility sink: {e:?}");
                None
            }
        }
    }
}

impl Drop for StartMenuSubscription {
    fn drop(&mut self) {
        if let Err(e) = unsafe { self.app_visibility.Unadvise(self.cookie) } {
            warn!("[START] Failed to unregister app visibility sink: {e:?}");
        }
    }
}
