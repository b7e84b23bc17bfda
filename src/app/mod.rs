pub mod serve;

// re-export
pub use serve::serve;

use std::{net::SocketAddr, sync::Arc};

use derive_more::Deref;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::{
    config::AppConfig, store_client::StoreClient, templ_manager::TemplateManager, EmailClient,
    Result,
};

// ###################################
// ->  Structs
// ###################################
pub struct App {
    pub app_state: AppState,
    pub listener: TcpListener,
}
impl App {
    pub fn new(app_state: AppState, listener: TcpListener) -> Self {
        App {
            app_state,
            listener,
        }
    }

    /// Builds the shared state from `config` and binds the listener.
    ///
    /// Missing provider credentials are not fatal here: without an email credential the
    /// signup route answers with a configuration error, without store settings the insert is skipped.
    pub async fn build_from_config(config: AppConfig) -> Result<Self> {
        let AppConfig {
            net_config,
            email_config,
            store_config,
        } = config;

        let tm = TemplateManager::init()?;

        let email_timeout = email_config.timeout();
        let email_client = match email_config.auth_token {
            Some(auth_token) => Some(EmailClient::new(
                &email_config.api_url,
                email_config.sender,
                auth_token,
                email_timeout,
            )?),
            None => {
                warn!(
                    "{:<20} - No email provider credential, signups will fail",
                    "app"
                );
                None
            }
        };

        let store_timeout = store_config.timeout();
        let store_client = match (store_config.url, store_config.api_key) {
            (Some(url), Some(api_key)) => Some(StoreClient::new(
                url,
                api_key,
                &store_config.table,
                store_timeout,
            )?),
            _ => {
                info!("{:<20} - No store configured, signups won't be recorded", "app");
                None
            }
        };

        let app_state = AppState::new(InternalState {
            templ_mgr: tm,
            email_client,
            store_client,
            welcome_subject: email_config.subject,
            notify_addr: email_config.notify_addr,
            product_name: email_config.product_name,
            site_url: email_config.site_url,
        });

        let addr = SocketAddr::from((net_config.host, net_config.app_port));
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        info!("{:<20} - {}", "Listening on:", addr);

        let app = App::new(app_state, listener);
        Ok(app)
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }
}

#[derive(Debug)]
pub struct InternalState {
    pub templ_mgr: TemplateManager,
    pub email_client: Option<EmailClient>,
    pub store_client: Option<StoreClient>,
    pub welcome_subject: String,
    pub notify_addr: Option<String>,
    pub product_name: String,
    pub site_url: String,
}

/// Application state containing all global data. Read-only once built.
/// It implements `Deref` to easily access the fields on `InternalState`
/// Uses an `Arc` so it can be cloned around.
#[derive(Clone, Debug, Deref)]
pub struct AppState(Arc<InternalState>);

impl AppState {
    pub fn new(internal_state: InternalState) -> Self {
        AppState(Arc::new(internal_state))
    }
}
