//! Error alert mails.
//!
//! One mail per ERROR event. Inside a tokio runtime delivery runs on the
//! blocking pool so an SMTP exchange never stalls a worker; outside one it
//! runs inline. Delivery failures are reported on stderr and never propagate
//! into the caller that logged the event.

use std::fmt;
use std::sync::Arc;

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

use common::{AppError, AppResult, MailSettings, ERROR_MAIL_SUBJECT};

use super::format_event;

/// Anything that can deliver a built message.
pub trait Mailer: Send + Sync {
    fn deliver(&self, message: &Message) -> Result<(), String>;
}

impl<T> Mailer for T
where
    T: lettre::Transport + Send + Sync,
    T::Error: fmt::Display,
{
    fn deliver(&self, message: &Message) -> Result<(), String> {
        self.send(message).map(|_| ()).map_err(|e| e.to_string())
    }
}

/// Mails log records to the administrator.
#[derive(Clone)]
pub struct MailHandler {
    inner: Arc<Inner>,
}

struct Inner {
    mailer: Box<dyn Mailer>,
    mailhost: (String, u16),
    sender: Mailbox,
    recipients: Vec<Mailbox>,
    subject: String,
    credentials: Option<(String, Option<String>)>,
    secure: bool,
}

impl MailHandler {
    /// Build a handler delivering through SMTP.
    ///
    /// Credentials are attached only when a username is configured, and
    /// STARTTLS is required only when credentials are attached and TLS is
    /// enabled. Nothing connects until the first record is sent.
    pub fn from_settings(mail: &MailSettings) -> AppResult<Self> {
        let credentials = credentials(mail);
        let secure = credentials.is_some() && mail.use_tls;

        let builder = if secure {
            SmtpTransport::starttls_relay(&mail.server).map_err(|e| {
                AppError::mail_handler(format!("TLS setup for {} failed: {}", mail.server, e))
            })?
        } else {
            SmtpTransport::builder_dangerous(mail.server.as_str())
        };

        let mut builder = builder.port(mail.port);
        if let Some((username, password)) = &credentials {
            builder = builder.credentials(Credentials::new(
                username.clone(),
                password.clone().unwrap_or_default(),
            ));
        }

        Self::build(mail, builder.build(), credentials, secure)
    }

    /// Build a handler delivering through a custom mailer.
    pub fn with_mailer(mail: &MailSettings, mailer: impl Mailer + 'static) -> AppResult<Self> {
        let credentials = credentials(mail);
        let secure = credentials.is_some() && mail.use_tls;
        Self::build(mail, mailer, credentials, secure)
    }

    fn build(
        mail: &MailSettings,
        mailer: impl Mailer + 'static,
        credentials: Option<(String, Option<String>)>,
        secure: bool,
    ) -> AppResult<Self> {
        let sender: Mailbox = mail.sender.parse().map_err(|e| {
            AppError::mail_handler(format!("invalid sender '{}': {}", mail.sender, e))
        })?;

        let recipients = mail
            .admin
            .iter()
            .map(|admin| {
                admin.parse::<Mailbox>().map_err(|e| {
                    AppError::mail_handler(format!("invalid admin address '{}': {}", admin, e))
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Self {
            inner: Arc::new(Inner {
                mailer: Box::new(mailer),
                mailhost: (mail.server.clone(), mail.port),
                sender,
                recipients,
                subject: format!("{}{}", mail.subject_prefix, ERROR_MAIL_SUBJECT),
                credentials,
                secure,
            }),
        })
    }

    pub fn mailhost(&self) -> (&str, u16) {
        (&self.inner.mailhost.0, self.inner.mailhost.1)
    }

    pub fn sender(&self) -> &Mailbox {
        &self.inner.sender
    }

    pub fn recipients(&self) -> &[Mailbox] {
        &self.inner.recipients
    }

    pub fn subject(&self) -> &str {
        &self.inner.subject
    }

    /// `(username, password)` when a username is configured.
    pub fn credentials(&self) -> Option<(&str, Option<&str>)> {
        self.inner
            .credentials
            .as_ref()
            .map(|(user, pass)| (user.as_str(), pass.as_deref()))
    }

    /// Whether delivery upgrades the connection with STARTTLS.
    pub fn is_secure(&self) -> bool {
        self.inner.secure
    }

    /// Send one record. Returns the delivery error, if any.
    pub fn send_record(&self, text: &str) -> Result<(), String> {
        if self.inner.recipients.is_empty() {
            return Err("no administrator address configured".to_string());
        }

        let mut builder = Message::builder()
            .from(self.inner.sender.clone())
            .subject(self.inner.subject.clone())
            .header(ContentType::TEXT_PLAIN);
        for to in &self.inner.recipients {
            builder = builder.to(to.clone());
        }

        let message = builder.body(text.to_string()).map_err(|e| e.to_string())?;
        self.inner.mailer.deliver(&message)
    }

    fn report(&self, text: &str) {
        // Logging through tracing here would re-enter this layer
        if let Err(e) = self.send_record(text) {
            eprintln!("mail handler: failed to send error alert: {}", e);
        }
    }
}

fn credentials(mail: &MailSettings) -> Option<(String, Option<String>)> {
    mail.username
        .as_ref()
        .map(|user| (user.clone(), mail.password.clone()))
}

impl fmt::Debug for MailHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailHandler")
            .field("mailhost", &self.inner.mailhost)
            .field("sender", &self.inner.sender.to_string())
            .field("recipients", &self.inner.recipients.len())
            .field("subject", &self.inner.subject)
            .field("credentials", &self.credentials().map(|(user, _)| user))
            .field("secure", &self.inner.secure)
            .finish()
    }
}

impl<S: Subscriber> Layer<S> for MailHandler {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() > Level::ERROR {
            return;
        }

        let text = format_event(event);
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let handler = self.clone();
                runtime.spawn_blocking(move || handler.report(&text));
            }
            Err(_) => self.report(&text),
        }
    }
}
