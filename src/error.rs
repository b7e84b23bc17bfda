use crate::{config, email_client, store_client, templ_manager, web};

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("web error: {0}")]
    Web(#[from] web::Error),
    #[error("email client error: {0}")]
    EmailClient(#[from] email_client::Error),
    #[error("store client error: {0}")]
    StoreClient(#[from] store_client::Error),
    #[error("template manager error: {0}")]
    Template(#[from] templ_manager::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
