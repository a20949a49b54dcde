use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use hwb_core::{config::Config, messaging::notifier::Notifier, poller::Poller};
use hwb_practicum::PracticumClient;
use hwb_telegram::TelegramMessenger;

#[tokio::main]
async fn main() -> Result<(), hwb_core::Error> {
    hwb_core::logging::init("hwb")?;

    let cfg = match Config::load() {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            tracing::error!("{e}. Shutting down.");
            std::process::exit(1);
        }
    };
    tracing::debug!("config = {cfg:?}");

    let api = Arc::new(PracticumClient::new(&cfg)?);
    let messenger = TelegramMessenger::from_token(cfg.telegram_token.clone());
    messenger.log_identity().await;

    let notifier = Notifier::new(Arc::new(messenger), cfg.telegram_chat_id);
    let mut poller = Poller::new(&cfg, api, notifier);

    let cancel = CancellationToken::new();
    tokio::spawn(shutdown_on_signal(cancel.clone()));

    tracing::info!(endpoint = %cfg.endpoint, "hwb started");
    poller.run(&cancel).await;

    Ok(())
}

async fn shutdown_on_signal(cancel: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                tracing::warn!("cannot listen for SIGTERM: {e}");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    tracing::info!("shutdown signal received");
    cancel.cancel();
}
