/*!
 * Desktop Context
 * Wires the subsystems together and owns the bootstrap sequence
 */

use crate::api::{register_core, ApiContext, ApiRegistry, CoreServices};
use crate::config::Config;
use crate::core::types::{DesktopResult, Viewport};
use crate::handler::{DemoHandler, Handler, UserInfo};
use crate::settings::SettingsManager;
use crate::vfs::{
    ApplicationsFs, Dispatcher, MemStore, Mount, MountFlags, MountRegistry, PackageRegistry,
};
use crate::wm::{load_session, save_session, AppRegistry, LaunchRequest, WindowManager};
use log::{info, warn};
use std::sync::Arc;

/// The assembled desktop core
///
/// Construction goes through [`DesktopBuilder`]; the default wiring is a
/// demo handler, an in-memory `home://` store and the synthetic
/// `applications://` mount.
pub struct Desktop {
    config: Config,
    settings: Arc<SettingsManager>,
    handler: Arc<dyn Handler>,
    dispatcher: Arc<Dispatcher>,
    wm: Arc<WindowManager>,
    apps: Arc<AppRegistry>,
    packages: Arc<PackageRegistry>,
    api: Arc<ApiRegistry>,
}

impl Desktop {
    pub fn builder() -> DesktopBuilder {
        DesktopBuilder::default()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn settings(&self) -> &Arc<SettingsManager> {
        &self.settings
    }

    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn mounts(&self) -> &Arc<MountRegistry> {
        self.dispatcher.registry()
    }

    pub fn wm(&self) -> &Arc<WindowManager> {
        &self.wm
    }

    pub fn apps(&self) -> &Arc<AppRegistry> {
        &self.apps
    }

    pub fn packages(&self) -> &Arc<PackageRegistry> {
        &self.packages
    }

    pub fn api(&self) -> &Arc<ApiRegistry> {
        &self.api
    }

    /// Call context for the current session
    pub fn api_context(&self) -> ApiContext {
        ApiContext::from_handler(&self.handler)
    }

    pub fn current_user(&self) -> Option<UserInfo> {
        self.handler.current_user()
    }

    /// Capture and persist the running session
    pub fn save_session(&self) -> DesktopResult<()> {
        save_session(&self.apps, &self.wm, &self.settings)?;
        Ok(())
    }

    /// Launch requests recorded by the last session capture
    pub fn restore_session(&self) -> Vec<LaunchRequest> {
        load_session(&self.settings)
    }

    /// End the session: capture it when asked, then force-close every
    /// window. Veto listeners cannot block teardown here.
    pub fn logout(&self, save: bool) -> DesktopResult<()> {
        if save {
            self.save_session()?;
        }
        for window in self.wm.live_windows() {
            let wid = window.read().wid();
            if let Err(e) = self.wm.close_window(wid, true) {
                warn!("Window {} did not close on logout: {}", wid, e);
            }
        }
        self.handler.logout(save)?;
        Ok(())
    }
}

/// Step-wise desktop construction
pub struct DesktopBuilder {
    config: Config,
    handler: Option<Arc<dyn Handler>>,
    viewport: Viewport,
    extra_mounts: Vec<Mount>,
}

impl Default for DesktopBuilder {
    fn default() -> Self {
        Self {
            config: Config::default(),
            handler: None,
            viewport: Viewport::default(),
            extra_mounts: Vec::new(),
        }
    }
}

impl DesktopBuilder {
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handler = Some(handler);
        self
    }

    #[must_use]
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    /// Register an additional mount at build time
    #[must_use]
    pub fn with_mount(mut self, mount: Mount) -> Self {
        self.extra_mounts.push(mount);
        self
    }

    pub fn build(self) -> DesktopResult<Desktop> {
        let handler: Arc<dyn Handler> = match self.handler {
            Some(handler) => handler,
            None => Arc::new(DemoHandler::new()),
        };
        handler.init()?;

        let settings = Arc::new(SettingsManager::new());
        settings.set_handler(Arc::clone(&handler));

        let packages = Arc::new(PackageRegistry::new());
        let mounts = Arc::new(MountRegistry::new());
        mounts.register(Mount::new(
            "Applications",
            "applications",
            MountFlags {
                read_only: true,
                special: true,
                visible: true,
                ..Default::default()
            },
            Arc::new(ApplicationsFs::new("applications", Arc::clone(&packages))),
        ))?;
        mounts.register(Mount::new(
            "Home",
            "home",
            MountFlags {
                searchable: true,
                visible: true,
                ..Default::default()
            },
            Arc::new(MemStore::new("home")),
        ))?;
        for mount in self.extra_mounts {
            mounts.register(mount)?;
        }
        let dispatcher = Arc::new(Dispatcher::new(mounts));

        let wm = Arc::new(WindowManager::new(self.viewport));
        let apps = Arc::new(AppRegistry::new());

        let api = Arc::new(ApiRegistry::new());
        register_core(
            &self.config,
            &api,
            CoreServices {
                handler: Arc::clone(&handler),
                settings: Arc::clone(&settings),
                dispatcher: Arc::clone(&dispatcher),
                packages: Arc::clone(&packages),
            },
        );

        info!(
            "Desktop assembled: {} mount(s), {} API method(s)",
            dispatcher.registry().len(),
            api.len()
        );
        Ok(Desktop {
            config: self.config,
            settings,
            handler,
            dispatcher,
            wm,
            apps,
            packages,
            api,
        })
    }
}
