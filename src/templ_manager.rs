use tera::{Context, Tera};
use tracing::info;

const WELCOME_HTML: &str = "email/welcome.html";
const SIGNUP_NOTICE_TXT: &str = "email/signup_notice.txt";

/// Owns the email templates. They are compiled into the binary so the service
/// does not depend on its working directory at runtime.
#[derive(Debug)]
pub struct TemplateManager {
    tera: Tera,
}

impl TemplateManager {
    pub fn init() -> Result<Self> {
        info!(
            "{:<20} - Initializing the Template manager",
            "templ manager"
        );
        let mut tera = Tera::default();
        tera.add_raw_templates([
            (
                WELCOME_HTML,
                include_str!("../templates/email/welcome.html"),
            ),
            (
                SIGNUP_NOTICE_TXT,
                include_str!("../templates/email/signup_notice.txt"),
            ),
        ])?;

        Ok(Self { tera })
    }

    /// Renders the HTML welcome email sent to every new signup.
    pub fn render_welcome(&self, product_name: &str, site_url: &str) -> Result<String> {
        let site_host = site_url
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/');

        let mut ctx = Context::new();
        ctx.insert("product_name", product_name);
        ctx.insert("site_url", site_url);
        ctx.insert("site_host", site_host);

        let out = self.tera.render(WELCOME_HTML, &ctx)?;
        Ok(out)
    }

    /// Renders the plain-text notice for the operator inbox.
    pub fn render_signup_notice(
        &self,
        product_name: &str,
        email: &str,
        timestamp: &str,
    ) -> Result<String> {
        let mut ctx = Context::new();
        ctx.insert("product_name", product_name);
        ctx.insert("email", email);
        ctx.insert("timestamp", timestamp);

        let out = self.tera.render(SIGNUP_NOTICE_TXT, &ctx)?;
        Ok(out)
    }

    #[cfg(test)]
    fn tera(&self) -> &Tera {
        &self.tera
    }
}

// ###################################
// ->   ERROR & RESULT
// ###################################
pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("templating error: {0}")]
    Tera(#[from] tera::Error),
}
