//! # Raw ESC/POS TCP Transport
//!
//! Network receipt printers accept a plain TCP connection (conventionally on
//! port 9100) and treat every byte received as printer input. This listener
//! does the same: each connection gets its own [`Assembler`], so printer
//! state never leaks between tills.
//!
//! ```text
//! till ──TCP──► read 4 KiB ──► Assembler::on_chunk ──► publish(block)
//!                  │ EOF or read error
//!                  └──────────► Assembler::on_end ───► publish(block), log remainder
//! ```

use std::net::SocketAddr;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::net::TcpListener;

use crate::error::PrinterError;
use crate::protocol::{Assembler, Block};

/// Default raw printing port
pub const DEFAULT_PORT: u16 = 9100;

/// Read buffer size per connection (bytes)
const READ_CHUNK_SIZE: usize = 4096;

/// # Raw ESC/POS Listener
///
/// ## Example
///
/// ```no_run
/// use virtual_printer::transport::EscPosListener;
///
/// # async fn example() -> Result<(), virtual_printer::PrinterError> {
/// let listener = EscPosListener::bind("0.0.0.0:9100", None).await?;
/// listener.run(|block| println!("{block:?}")).await?;
/// # Ok(())
/// # }
/// ```
pub struct EscPosListener {
    listener: TcpListener,
    max_buffer: Option<usize>,
}

impl EscPosListener {
    /// Bind the listener.
    ///
    /// - `max_buffer`: per-connection cap on bytes held for an incomplete
    ///   command, `None` for unbounded
    pub async fn bind(addr: &str, max_buffer: Option<usize>) -> Result<Self, PrinterError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| PrinterError::Transport(format!("Failed to bind to {}: {}", addr, e)))?;
        Ok(Self {
            listener,
            max_buffer,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, PrinterError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections forever, decoding each on its own task.
    pub async fn run<F>(self, publish: F) -> Result<(), PrinterError>
    where
        F: Fn(Block) + Clone + Send + Sync + 'static,
    {
        loop {
            let (stream, peer) = self
                .listener
                .accept()
                .await
                .map_err(|e| PrinterError::Transport(format!("Accept failed: {}", e)))?;

            let publish = publish.clone();
            let max_buffer = self.max_buffer;
            tokio::spawn(async move {
                let peer = peer.to_string();
                if let Err(e) = handle_connection(stream, &peer, max_buffer, &publish).await {
                    log::error!("Error reading from {}: {}", peer, e);
                }
            });
        }
    }
}

/// Decode one connection until EOF.
///
/// Returns the number of bytes received.
pub async fn handle_connection<R, F>(
    mut reader: R,
    peer: &str,
    max_buffer: Option<usize>,
    publish: &F,
) -> Result<usize, PrinterError>
where
    R: AsyncRead + Unpin,
    F: Fn(Block),
{
    log::info!("New connection from {}", peer);

    let mut assembler = match max_buffer {
        Some(limit) => Assembler::with_limit(limit),
        None => Assembler::new(),
    };
    let mut buf = vec![0u8; READ_CHUNK_SIZE];
    let mut total = 0;

    let outcome = loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => break Ok(total),
            Ok(n) => n,
            Err(e) => {
                log::warn!("Connection from {} failed after {} bytes: {}", peer, total, e);
                break Err(e);
            }
        };
        total += n;
        for block in assembler.on_chunk(&buf[..n]) {
            publish(block);
        }
    };

    // Whatever arrived before a reset is still a complete job.
    let finish = assembler.on_end();
    for block in finish.blocks {
        publish(block);
    }
    if let Some(remainder) = finish.remainder {
        log::warn!("Connection from {}: {}", peer, remainder);
    }

    log::info!("Connection from {} closed ({} bytes)", peer, total);
    Ok(outcome?)
}
