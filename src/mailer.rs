use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

use crate::config::Args;
use crate::templates::RenderedEmail;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("smtp error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("smtp server did not accept the connection test")]
    Unreachable,
}

// Rendered message plus its recipient
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub to: String,
    pub content: RenderedEmail,
}

#[async_trait]
pub trait MailRelay: Send + Sync {
    async fn send(&self, mail: OutgoingEmail) -> Result<(), RelayError>;

    // Open a connection and authenticate without sending anything
    async fn verify(&self) -> Result<(), RelayError>;
}

pub struct SmtpRelay {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpRelay {
    // Must run inside a Tokio runtime, the pooled transport spawns its reaper on it
    pub fn new(args: &Args) -> Result<Self, RelayError> {
        let address: Address = args.from_email.parse()?;
        let from = Mailbox::new(Some(args.from_name.clone()), address);

        let params = TlsParameters::builder(args.smtp_host.clone())
            .dangerous_accept_invalid_certs(args.smtp_accept_invalid_certs)
            .build()?;
        let tls = match args.smtp_port {
            465 => Tls::Wrapper(params),
            587 => Tls::Required(params),
            _ => Tls::Opportunistic(params),
        };

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&args.smtp_host)
            .port(args.smtp_port)
            .tls(tls);
        if !args.smtp_user.is_empty() {
            builder = builder.credentials(Credentials::new(
                args.smtp_user.clone(),
                args.smtp_password.clone(),
            ));
        }

        Ok(Self { transport: builder.build(), from })
    }

    fn build_message(&self, mail: OutgoingEmail) -> Result<Message, RelayError> {
        let to: Mailbox = mail.to.parse()?;
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(mail.content.subject)
            .multipart(MultiPart::alternative_plain_html(mail.content.text, mail.content.html))?;
        Ok(message)
    }
}

#[async_trait]
impl MailRelay for SmtpRelay {
    async fn send(&self, mail: OutgoingEmail) -> Result<(), RelayError> {
        let message = self.build_message(mail)?;
        let response = self.transport.send(message).await?;
        tracing::debug!(code = %response.code(), "relay accepted message");
        Ok(())
    }

    async fn verify(&self) -> Result<(), RelayError> {
        if self.transport.test_connection().await? {
            Ok(())
        } else {
            Err(RelayError::Unreachable)
        }
    }
}
