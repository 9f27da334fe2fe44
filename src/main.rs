#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

mod config;

use config::Config;
use session::PortSession;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    simple_logger::init_with_level(config.log.level.as_level())?;

    if config.ports.is_empty() {
        log::warn!("no ports configured, nothing to bind");
        return Ok(());
    }

    let mut sessions = Vec::with_capacity(config.ports.len());
    for port in &config.ports {
        let session = PortSession::open(port.bind, config.session.to_session_config()).await?;
        log::info!("{}: bound {}", port.name, session.local_addr());

        let name = port.name.clone();
        session.set_message_callback(move |msg| {
            log::debug!("{name}: received {msg:?}");
        });

        sessions.push(session);
    }

    tokio::signal::ctrl_c().await?;
    log::info!("shutting down");

    for session in sessions {
        session.stop().await;
    }

    Ok(())
}
