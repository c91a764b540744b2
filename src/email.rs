//! 邮件发送（密码重置）

use lettre::{
    AsyncFileTransport, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use std::path::Path;
use tracing::{info, warn};

use crate::config::{EmailConfig, EmailTransportKind};
use crate::errors::{NotaDezError, Result};
use crate::utils::reset_token::reset_link;

pub struct EmailService {
    transport: EmailTransport,
    from_email: String,
    from_name: String,
    reset_base_url: String,
    reset_ttl_minutes: i64,
}

enum EmailTransport {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    File(AsyncFileTransport<Tokio1Executor>),
}

impl EmailService {
    pub fn new(config: &EmailConfig) -> Result<Self> {
        let transport = match config.transport {
            EmailTransportKind::Smtp => {
                let smtp = &config.smtp;
                if !smtp.use_tls {
                    warn!("SMTP TLS is disabled");
                }

                let builder = if smtp.use_tls {
                    AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)
                        .map_err(|e| NotaDezError::email(format!("create SMTP transport: {e}")))?
                } else {
                    AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&smtp.host)
                };

                let builder = if smtp.username.is_empty() {
                    builder.port(smtp.port)
                } else {
                    builder
                        .port(smtp.port)
                        .credentials(Credentials::new(smtp.username.clone(), smtp.password.clone()))
                };

                EmailTransport::Smtp(builder.build())
            }
            EmailTransportKind::File => {
                let dir = Path::new(&config.file_path);
                if !dir.exists() {
                    std::fs::create_dir_all(dir)?;
                }
                EmailTransport::File(AsyncFileTransport::<Tokio1Executor>::new(dir))
            }
        };

        Ok(Self {
            transport,
            from_email: config.from_email.clone(),
            from_name: config.from_name.clone(),
            reset_base_url: config.reset_base_url.clone(),
            reset_ttl_minutes: config.reset_token_ttl_minutes,
        })
    }

    pub async fn send_password_reset_email(
        &self,
        to_email: &str,
        to_name: &str,
        token: &str,
    ) -> Result<()> {
        let link = reset_link(&self.reset_base_url, token);
        let body = password_reset_body(to_name, &link, self.reset_ttl_minutes);

        self.send_email(to_email, to_name, "Recuperação de senha - NotaDez", body)
            .await?;
        info!("Password reset email sent to {}", to_email);
        Ok(())
    }

    async fn send_email(
        &self,
        to_email: &str,
        to_name: &str,
        subject: &str,
        body: String,
    ) -> Result<()> {
        let from = Mailbox::new(
            Some(self.from_name.clone()),
            self.from_email
                .parse()
                .map_err(|e| NotaDezError::email(format!("parse from address: {e}")))?,
        );
        let to = Mailbox::new(
            Some(to_name.to_string()).filter(|n| !n.trim().is_empty()),
            to_email
                .parse()
                .map_err(|e| NotaDezError::email(format!("parse recipient address: {e}")))?,
        );

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(body)
            .map_err(|e| NotaDezError::email(format!("build email message: {e}")))?;

        match &self.transport {
            EmailTransport::Smtp(smtp) => {
                smtp.send(message)
                    .await
                    .map_err(|e| NotaDezError::email(format!("send SMTP email: {e}")))?;
            }
            EmailTransport::File(file) => {
                file.send(message)
                    .await
                    .map_err(|e| NotaDezError::email(format!("write email file: {e}")))?;
            }
        }

        Ok(())
    }
}

fn password_reset_body(to_name: &str, link: &str, ttl_minutes: i64) -> String {
    let validity = if ttl_minutes % 60 == 0 {
        match ttl_minutes / 60 {
            1 => "1 hora".to_string(),
            hours => format!("{hours} horas"),
        }
    } else {
        format!("{ttl_minutes} minutos")
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Recuperação de senha</title>
</head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
        <h2>Recuperação de senha</h2>
        <p>Olá, {to_name}!</p>
        <p>Recebemos um pedido para redefinir a sua senha no NotaDez.</p>
        <p><a href="{link}">Redefinir senha</a></p>
        <p>Se o botão não funcionar, copie este endereço no navegador:</p>
        <p>{link}</p>
        <p><strong>O link é válido por {validity}.</strong></p>
        <p style="font-size: 12px; color: #666;">Se você não fez este pedido, ignore esta mensagem.</p>
    </div>
</body>
</html>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SmtpConfig;

    fn file_config(dir: &Path) -> EmailConfig {
        EmailConfig {
            transport: EmailTransportKind::File,
            smtp: SmtpConfig {
                host: "localhost".into(),
                port: 587,
                username: String::new(),
                password: String::new(),
                use_tls: true,
            },
            file_path: dir.to_string_lossy().into_owned(),
            from_name: "NotaDez".into(),
            from_email: "no-reply@notadez.local".into(),
            reset_base_url: "http://localhost:3000/pages/recuperar-senha.html".into(),
            reset_token_ttl_minutes: 60,
        }
    }

    #[test]
    fn test_body_contains_link_and_validity() {
        let body = password_reset_body("Ana", "http://x/reset?token=ab", 60);
        assert!(body.contains("Olá, Ana!"));
        assert!(body.contains(r#"href="http://x/reset?token=ab""#));
        assert!(body.contains("1 hora"));

        assert!(password_reset_body("Ana", "l", 30).contains("30 minutos"));
        assert!(password_reset_body("Ana", "l", 120).contains("2 horas"));
    }

    #[tokio::test]
    async fn test_file_transport_writes_message() {
        let dir = std::env::temp_dir().join(format!(
            "notadez-email-test-{}",
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        let service = EmailService::new(&file_config(&dir)).unwrap();

        service
            .send_password_reset_email("ana@example.com", "Ana", "deadbeef")
            .await
            .unwrap();

        let written = std::fs::read_dir(&dir).unwrap().count();
        assert!(written >= 1);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_invalid_recipient_is_email_error() {
        let dir = std::env::temp_dir().join("notadez-email-test-invalid");
        let service = EmailService::new(&file_config(&dir)).unwrap();
        let err = service
            .send_password_reset_email("not-an-address", "Ana", "t")
            .await
            .unwrap_err();
        assert!(matches!(err, NotaDezError::Email(_)));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
