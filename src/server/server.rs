use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::logger::*;
use crate::server::SessionSweeper;
use crate::settings::{CookieMode, Settings, Urls};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Process-wide state shared by every request handler. Created once at
/// startup; sessions live only as long as this value.
pub struct Server {
    pub session_service: Arc<dyn SessionService>,
    pub identity_provider: Arc<dyn IdentityProvider>,
    pub cookie_mode: CookieMode,
    pub urls: Arc<Urls>,
    pub frontend_origin: String,
    sweeper_handle: Mutex<Option<JoinHandle<()>>>,
    cancel: CancellationToken,
}

impl Server {
    pub fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        Self::try_with_clock(settings, Arc::new(SystemClock))
    }

    /// Must be called from within a tokio runtime; spawns the sweeper.
    pub fn try_with_clock(settings: &Settings, clock: Arc<dyn Clock>) -> anyhow::Result<Self> {
        let frontend_origin = settings.urls.frontend_origin()?;

        let session_store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
        let session_service: Arc<dyn SessionService> = Arc::new(SessionManager::new(
            session_store,
            clock,
            settings.session.ttls()?,
        ));

        let identity_provider: Arc<dyn IdentityProvider> = match settings.auth.backend.as_str() {
            "fake" => Arc::new(FakeIdentityProvider::new(
                settings.auth.placeholder_user.clone(),
            )),
            other => return Err(anyhow::anyhow!("Unknown auth backend: {}", other)),
        };

        let cancel = CancellationToken::new();
        let sweeper = SessionSweeper::new(
            session_service.clone(),
            Duration::from_secs(settings.session.cleanup_interval_secs),
            cancel.clone(),
        );
        let sweeper_handle = tokio::spawn(async move { sweeper.run().await });

        info!(
            access_ttl_secs = settings.session.access_ttl_secs,
            refresh_ttl_secs = settings.session.refresh_ttl_secs,
            cookie_mode = ?settings.cookie.mode,
            "server started"
        );

        Ok(Self {
            session_service,
            identity_provider,
            cookie_mode: settings.cookie.mode,
            urls: Arc::new(settings.urls.clone()),
            frontend_origin,
            sweeper_handle: Mutex::new(Some(sweeper_handle)),
            cancel,
        })
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");

        self.cancel.cancel();

        let handle = self
            .sweeper_handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            let r = handle.await;
            info!("sweeper handle dropped: {:?}", r);
        }

        let remaining = self.session_service.session_count().await;
        info!(remaining, "in-memory sessions discarded");
    }
}
