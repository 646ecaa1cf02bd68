use rootward_infrastructure::dns::server::DnsServerHandler;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tracing::{error, info};

const RECV_BUFFER_SIZE: usize = 4096;

/// Binds the listener and serves until SIGINT/SIGTERM. Each datagram is
/// handled on its own task so a slow recursion never blocks the loop.
pub async fn run_udp_server(bind_addr: &str, handler: DnsServerHandler) -> anyhow::Result<()> {
    let socket = Arc::new(UdpSocket::bind(bind_addr).await?);
    let handler = Arc::new(handler);

    info!(bind_address = %bind_addr, "DNS server listening");

    tokio::select! {
        _ = serve(socket, handler) => {}
        _ = shutdown_signal() => {
            info!("shutdown signal received");
        }
    }
    Ok(())
}

async fn serve(socket: Arc<UdpSocket>, handler: Arc<DnsServerHandler>) {
    let mut recv_buf = [0u8; RECV_BUFFER_SIZE];

    loop {
        let (n, client) = match socket.recv_from(&mut recv_buf).await {
            Ok(received) => received,
            Err(e) => {
                error!(error = %e, "UDP recv error");
                continue;
            }
        };

        let query = recv_buf[..n].to_vec();
        let handler = handler.clone();
        let socket = socket.clone();
        tokio::spawn(async move {
            if let Some(response) = handler.handle(&query).await {
                if let Err(e) = socket.send_to(&response, client).await {
                    error!(error = %e, client = %client, "failed to send response");
                }
            }
        });
    }
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => {}
            _ = term.recv() => {}
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
    }
}
