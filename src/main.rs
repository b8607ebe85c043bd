//! # Virtual Printer CLI
//!
//! Command-line interface for the virtual ESC/POS receipt printer.
//!
//! ## Usage
//!
//! ```bash
//! # Pose as a network printer (ePOS on :8080, raw ESC/POS on :9100)
//! virtual-printer serve --http-port 8080 --recall
//!
//! # Decode a captured print job
//! virtual-printer decode job.bin --png-dir images/
//!
//! # Decode a hex dump
//! virtual-printer decode --hex job.txt
//!
//! # Write a sample receipt and send it to a running server
//! virtual-printer demo --out demo.bin && nc localhost 9100 < demo.bin
//! ```

use clap::{Parser, Subcommand};
use env_logger::Env;
use log::LevelFilter;
use std::io::Write;
use std::path::{Path, PathBuf};

use virtual_printer::{
    PrinterError,
    epos,
    preview::{self, WireBlock},
    protocol::{Alignment, Assembler, Block, commands},
    server::{self, ServerConfig},
};

/// Virtual Printer - ESC/POS receipt printer emulator
#[derive(Parser, Debug)]
#[command(name = "virtual-printer")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Accept print jobs over ePOS-Print and raw TCP, stream blocks to viewers
    Serve {
        /// Interface to listen on
        #[arg(long, default_value = "0.0.0.0")]
        hostname: String,

        /// Port for the ePOS-Print endpoint and viewer stream
        #[arg(long, default_value_t = 80, value_parser = clap::value_parser!(u16).range(1..))]
        http_port: u16,

        /// Port for raw ESC/POS connections
        #[arg(long, default_value_t = 9100, value_parser = clap::value_parser!(u16).range(1..))]
        escpos_port: u16,

        /// Re-send the most recent image to all viewers when one sends a message
        #[arg(long)]
        recall: bool,

        /// Discard buffered input beyond this many bytes per connection
        #[arg(long, value_name = "BYTES")]
        max_buffer: Option<usize>,
    },

    /// Decode a captured ESC/POS stream and print one JSON block per line
    Decode {
        /// Captured stream (raw bytes, or hex text with --hex)
        file: PathBuf,

        /// Input is hex text
        #[arg(long)]
        hex: bool,

        /// Feed the stream in chunks of this many bytes
        #[arg(long, default_value_t = 4096, value_parser = clap::value_parser!(u64).range(1..))]
        chunk_size: u64,

        /// Also write image blocks as PNG files into this directory
        #[arg(long, value_name = "DIR")]
        png_dir: Option<PathBuf>,
    },

    /// Write a sample receipt stream
    Demo {
        /// Output file (defaults to stdout)
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
}

fn main() {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .format_timestamp(None)
        .parse_env(Env::new().filter("VIRTUAL_PRINTER_LOG"))
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), PrinterError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            hostname,
            http_port,
            escpos_port,
            recall,
            max_buffer,
        } => {
            let config = ServerConfig {
                hostname,
                http_port,
                escpos_port,
                recall,
                max_buffer,
            };
            tokio::runtime::Runtime::new()?.block_on(server::serve(config))?;
        }
        Commands::Decode {
            file,
            hex,
            chunk_size,
            png_dir,
        } => {
            let raw = std::fs::read(&file)?;
            let data = if hex {
                epos::decode_hex(&String::from_utf8_lossy(&raw))?
            } else {
                raw
            };
            decode_file(&data, chunk_size as usize, png_dir.as_deref())?;
        }
        Commands::Demo { out } => {
            let data = demo_receipt();
            match out {
                Some(path) => {
                    std::fs::write(&path, &data)?;
                    log::info!("Wrote {} bytes to {}", data.len(), path.display());
                }
                None => std::io::stdout().write_all(&data)?,
            }
        }
    }

    Ok(())
}

/// Decode a stream chunk by chunk, printing blocks as they complete.
fn decode_file(data: &[u8], chunk_size: usize, png_dir: Option<&Path>) -> Result<(), PrinterError> {
    if let Some(dir) = png_dir {
        std::fs::create_dir_all(dir)?;
    }

    let mut assembler = Assembler::new();
    let mut stdout = std::io::stdout().lock();
    let mut images = 0;

    let mut emit = |block: Block| -> Result<(), PrinterError> {
        if let (Some(dir), Block::Image(image)) = (png_dir, &block) {
            images += 1;
            let path = dir.join(format!("image-{:03}.png", images));
            match preview::encode_png(image) {
                Ok(png) => std::fs::write(&path, png)?,
                Err(e) => log::warn!("Skipping {}: {}", path.display(), e),
            }
        }

        let line = match WireBlock::from_block(&block) {
            Ok(wire) => wire.to_json()?,
            Err(_) => serde_json::to_string(&block)?,
        };
        writeln!(stdout, "{}", line)?;
        Ok(())
    };

    for chunk in data.chunks(chunk_size) {
        for block in assembler.on_chunk(chunk) {
            emit(block)?;
        }
    }

    let finish = assembler.on_end();
    for block in finish.blocks {
        emit(block)?;
    }
    if let Some(remainder) = finish.remainder {
        eprintln!("Warning: {}", remainder);
    }

    Ok(())
}

/// Build a short receipt exercising text styles, an image and a cut.
fn demo_receipt() -> Vec<u8> {
    let mut data = Vec::new();
    data.extend(commands::init());
    data.extend(commands::code_table(18));

    data.extend(commands::align(Alignment::Center));
    data.extend(commands::char_size(0x11));
    data.extend(commands::emphasized(true));
    data.extend(commands::text("Kavárna U Dvou Koček\n"));
    data.extend(commands::emphasized(false));
    data.extend(commands::char_size(0x00));
    data.extend(commands::text("Náměstí Míru 12, Brno\n"));

    data.extend(commands::align(Alignment::Left));
    data.extend(commands::feed(24));
    data.extend(commands::text("Espresso            2 x 45,00\n"));
    data.extend(commands::text("Koláč               1 x 38,00\n"));
    data.extend(commands::underline(1));
    data.extend(commands::text("Celkem                 128,00 Kč\n"));
    data.extend(commands::underline(0));

    data.extend(commands::align(Alignment::Center));
    data.extend(commands::raster(2, 8, &checkerboard(2, 8)));
    data.extend(commands::bit_image(0, 16, &checkerboard(16, 1)));
    data.extend(commands::reverse(true));
    data.extend(commands::text(" Děkujeme! \n"));
    data.extend(commands::reverse(false));

    data.extend(commands::barcode_height(60));
    data.extend(commands::barcode(4, b"CZ-0042"));
    data.extend(commands::feed(48));
    data.extend(commands::cut(commands::CutType::Partial));
    data.extend(commands::pulse(0, 25, 250));
    data
}

/// 1-bit checkerboard raster, MSB first.
fn checkerboard(width_bytes: usize, height: usize) -> Vec<u8> {
    (0..height)
        .flat_map(|y| std::iter::repeat_n(if y % 2 == 0 { 0xAA } else { 0x55 }, width_bytes))
        .collect()
}
