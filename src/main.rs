use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use order_reminder_hub::config::{Config, MailProvider};
use order_reminder_hub::email::{PostmarkClient, Sender, SmtpMailer};
use order_reminder_hub::orderspace::Client;
use order_reminder_hub::routes::{router, AppState};
use order_reminder_hub::services::{ReminderScheduler, ReminderService};
use order_reminder_hub::{db, email};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,order_reminder_hub=debug")),
        )
        .init();

    let config = Config::from_env()?;

    let pool = db::connect(config.database_url.as_deref()).await?;

    let client = Client::new(
        config.orderspace_client_id.clone(),
        config.orderspace_client_secret.clone(),
        pool.clone(),
    )?;

    let mailer: Arc<dyn Sender> = match &config.mail_provider {
        MailProvider::Postmark { server_token } => {
            tracing::info!("sending mail via postmark");
            Arc::new(PostmarkClient::new(server_token.clone()).map_err(mail_setup_error)?)
        }
        MailProvider::Smtp { host, port } => {
            tracing::info!(host = %host, port, "sending mail via smtp relay");
            Arc::new(SmtpMailer::new(host, *port).map_err(mail_setup_error)?)
        }
    };

    let service = ReminderService::new(
        pool.clone(),
        client.clone(),
        mailer,
        config.mail_from.clone(),
        config.preview_recipient.clone(),
    );

    let scheduler = ReminderScheduler::start(service.clone());

    let app = router(AppState { client, service });

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown().await;
    Ok(())
}

fn mail_setup_error(e: email::MailError) -> anyhow::Error {
    anyhow::anyhow!("mail provider setup failed: {e}")
}

async fn shutdown_signal() {
    use tokio::signal;
    let ctrl_c = async {
        signal::ctrl_c().await.ok();
    };
    #[cfg(unix)]
    let term = async {
        if let Ok(mut s) = signal::unix::signal(signal::unix::SignalKind::terminate()) {
            s.recv().await;
        }
    };
    #[cfg(not(unix))]
    let term = std::future::pending::<()>();
    tokio::select! { _ = ctrl_c => {}, _ = term => {} }
}
