use crate::config::EmailConfig;
use crate::signals::Signal;
use anyhow::{Result, anyhow};
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use log::info;

/// Delivers buy signals to the operator
pub trait Notifier {
    fn notify(&self, signal: &Signal) -> Result<()>;
}

impl<T: Notifier + ?Sized> Notifier for Box<T> {
    fn notify(&self, signal: &Signal) -> Result<()> {
        (**self).notify(signal)
    }
}

pub fn subject_line(signal: &Signal) -> String {
    format!("ETF BUY: {}", signal.instrument)
}

/// Plain-text email to the configured address over SMTP with STARTTLS
pub struct EmailNotifier {
    mailbox: Mailbox,
    transport: SmtpTransport,
}

impl EmailNotifier {
    pub fn new(config: &EmailConfig) -> Result<Self> {
        let address = config
            .address
            .as_deref()
            .ok_or_else(|| anyhow!("email address is not configured"))?;
        let password = config
            .password
            .as_deref()
            .ok_or_else(|| anyhow!("email password is not configured"))?;

        let mailbox: Mailbox = address.parse()?;
        let transport = SmtpTransport::starttls_relay(&config.smtp_server)?
            .port(config.smtp_port)
            .credentials(Credentials::new(address.to_string(), password.to_string()))
            .build();

        info!(
            "Email notifications to {} via {}:{}",
            address, config.smtp_server, config.smtp_port
        );

        Ok(Self { mailbox, transport })
    }

    pub fn build_message(&self, signal: &Signal) -> Result<Message> {
        let message = Message::builder()
            .from(self.mailbox.clone())
            .to(self.mailbox.clone())
            .subject(subject_line(signal))
            .header(ContentType::TEXT_PLAIN)
            .body(signal.to_string())?;
        Ok(message)
    }
}

impl Notifier for EmailNotifier {
    fn notify(&self, signal: &Signal) -> Result<()> {
        let message = self.build_message(signal)?;
        self.transport.send(&message)?;
        info!("Sent buy email for {}", signal.instrument);
        Ok(())
    }
}

/// Used when no email credentials are configured
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, signal: &Signal) -> Result<()> {
        info!("{}", signal);
        Ok(())
    }
}
