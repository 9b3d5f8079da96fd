// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use empaque_model::QuotationRequest;
use std::fmt::{Display, Formatter};
use tokio::sync::Mutex;
use tracing::info;

#[derive(Debug)]
pub struct MailError(pub String);

impl Display for MailError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "mail error: {}", self.0)
    }
}

impl std::error::Error for MailError {}

#[async_trait]
pub trait QuotationMailer: Send + Sync + 'static {
    async fn send(&self, recipient: &str, quotation: &QuotationRequest) -> Result<(), MailError>;
}

/// Renders the quotation email body. Plain HTML table, one row per cart
/// line, contact block on top.
#[must_use]
pub fn render_quotation_html(quotation: &QuotationRequest) -> String {
    let contact = &quotation.contact;
    let mut html = String::with_capacity(1024);
    html.push_str("<h2>Nueva solicitud de cotizaci&oacute;n</h2>");
    html.push_str(&format!(
        "<p><b>Nombre:</b> {} {}<br><b>RUT:</b> {}<br><b>Tel&eacute;fono:</b> {}<br><b>Email:</b> {}</p>",
        escape(&contact.first_name),
        escape(&contact.last_name),
        contact.rut,
        contact.phone,
        escape(contact.email.as_str()),
    ));
    html.push_str(
        "<table border=\"1\" cellpadding=\"6\"><tr><th>Producto</th><th>Categor&iacute;a</th>\
         <th>Tama&ntilde;o</th><th>Cantidad</th></tr>",
    );
    for item in &quotation.items {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&item.name),
            escape(&item.category),
            escape(item.selected_size.as_deref().unwrap_or("-")),
            item.quantity,
        ));
    }
    html.push_str("</table>");
    html
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Posts the rendered email to an HTTP mail relay.
pub struct HttpQuotationMailer {
    client: reqwest::Client,
    relay_url: String,
    token: Option<String>,
}

impl HttpQuotationMailer {
    #[must_use]
    pub fn new(relay_url: String, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            relay_url,
            token,
        }
    }
}

#[async_trait]
impl QuotationMailer for HttpQuotationMailer {
    async fn send(&self, recipient: &str, quotation: &QuotationRequest) -> Result<(), MailError> {
        let body = serde_json::json!({
            "to": recipient,
            "replyTo": quotation.contact.email.as_str(),
            "subject": format!(
                "Cotizacion de {} {} ({})",
                quotation.contact.first_name, quotation.contact.last_name, quotation.contact.rut
            ),
            "html": render_quotation_html(quotation),
        });
        let mut req = self.client.post(&self.relay_url).json(&body);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await.map_err(|e| MailError(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(MailError(format!("relay returned status {}", resp.status())));
        }
        Ok(())
    }
}

/// Logs instead of sending. The development default when no relay is
/// configured; also what integration tests assert against.
#[derive(Default)]
pub struct LogOnlyMailer {
    pub sent: Mutex<Vec<String>>,
    pub fail_sends: std::sync::atomic::AtomicBool,
}

#[async_trait]
impl QuotationMailer for LogOnlyMailer {
    async fn send(&self, recipient: &str, quotation: &QuotationRequest) -> Result<(), MailError> {
        if self.fail_sends.load(std::sync::atomic::Ordering::Relaxed) {
            return Err(MailError("relay unavailable".to_string()));
        }
        let html = render_quotation_html(quotation);
        info!(
            recipient,
            rut = %quotation.contact.rut,
            items = quotation.items.len(),
            "quotation mail (log only)"
        );
        self.sent.lock().await.push(html);
        Ok(())
    }
}
