use sessionpair::api;
use sessionpair::logger::*;
use sessionpair::server::*;
use sessionpair::settings::*;
use std::fs;
use std::sync::Arc;
use tokio::signal;

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!("could not register SIGINT handler: {}", e);
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let dotenv_path = dotenvy::dotenv().ok();
    let logger = Logger::new_bootstrap();
    if let Some(path) = dotenv_path {
        debug!(?path, "loaded environment file");
    }

    let project_settings = parse_settings(cli.settings.as_deref())?;
    info!(?project_settings);
    logger.reload_from_config(&LogConfig::from(&project_settings.log))?;

    let address: std::net::SocketAddr = project_settings.http.address.parse()?;

    let server = Arc::new(Server::try_new(&project_settings)?);
    let routes = api::routes(server.clone());

    match project_settings.http.tls_paths() {
        Some((cert_path, key_path)) => {
            if !fs::metadata(cert_path)?.is_file() {
                return Err(anyhow::anyhow!(
                    "TLS cert is not a regular file: {:?}",
                    cert_path
                ));
            }
            if !fs::metadata(key_path)?.is_file() {
                return Err(anyhow::anyhow!(
                    "TLS key is not a regular file: {:?}",
                    key_path
                ));
            }
            info!(%address, "listening with TLS");
            warp::serve(routes)
                .tls()
                .cert_path(cert_path)
                .key_path(key_path)
                .bind_with_graceful_shutdown(address, shutdown_signal())
                .1
                .await;
        }
        None => {
            let (bound, serving) =
                warp::serve(routes).try_bind_with_graceful_shutdown(address, shutdown_signal())?;
            info!(address = %bound, "listening");
            serving.await;
        }
    }

    let shutdown_timeout = std::time::Duration::from_secs(10);
    match tokio::time::timeout(shutdown_timeout, server.shutdown()).await {
        Ok(_) => info!("server shutdown successfully"),
        Err(_) => error!("server shutdown timed out"),
    }

    Ok(())
}
