//! # PXX Encoder
//!
//! Builds PXX frames at the module's frame rate and hands them to the
//! transmission path.
//!
//! # Control Flow
//!
//! 1. **Initialization**
//!    - Load configuration (first argument, or `config/default.toml`)
//!    - Set up logging with tracing subscriber (and an optional log file)
//!    - Select the transport configured for the module
//!
//! 2. **Main Loop**
//!    - Build one frame per period (9 ms, or 4 ms at high frequency)
//!    - UART: queue the frame for the serial writer task
//!    - Pulse / software-timed serial: these need timer or DMA hardware, so
//!      the physical buffer is only logged
//!    - Handle Ctrl+C for graceful shutdown
//!
//! A frame that cannot be queued in time is dropped, never truncated.

use anyhow::Result;
use bytes::Bytes;
use std::fmt::Debug;
use tokio::sync::mpsc;
use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pxx_encoder::config::{Config, LoggingConfig, TransportKind};
use pxx_encoder::pxx::frame::FrameBuilder;
use pxx_encoder::pxx::transport::{PwmPxxTransport, PxxTransport, SerialPxxTransport, UartPxxTransport};
use pxx_encoder::serial::ModuleSerial;

/// Configuration file used when none is given
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Log file name prefix inside `logging.log_dir`
const LOG_FILE_NAME: &str = "pxx-encoder.log";

/// Number of frames between status log messages
const LOG_INTERVAL_FRAMES: u64 = 1000;

/// Frames that may wait for the serial writer
const FRAME_QUEUE_DEPTH: usize = 2;

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&config_path)?;

    let _log_guard = init_logging(&config.logging);

    info!("PXX Encoder v{} starting...", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration loaded from {} ({:?} transport, {} ms period)",
        config_path,
        config.pxx.transport,
        config.period_ms()
    );

    match config.pxx.transport {
        TransportKind::Uart => run_uart(&config).await,
        TransportKind::SerialBits => {
            run_without_output(&config, FrameBuilder::new(SerialPxxTransport::serial())).await
        }
        TransportKind::Pwm => {
            let transport = PwmPxxTransport::pwm(config.half_period_us());
            run_without_output(&config, FrameBuilder::new(transport)).await
        }
    }
}

/// Initialize the tracing subscriber
///
/// `RUST_LOG` overrides the configured level. The returned guard must be kept
/// alive for the file writer to flush.
fn init_logging(logging: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer());

    match &logging.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        None => {
            registry.init();
            None
        }
    }
}

/// Build UART frames and hand them to a serial writer task
async fn run_uart(config: &Config) -> Result<()> {
    let mut serial = ModuleSerial::open_with_paths(
        &[config.serial.port.as_str()],
        config.baud_rate(),
        config.serial.timeout_ms,
    )?;

    let (tx, mut rx) = mpsc::channel::<Bytes>(FRAME_QUEUE_DEPTH);

    let writer = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if let Err(e) = serial.send_frame(&frame).await {
                warn!("Failed to send frame: {}", e);
            }
        }
        serial.frames_sent()
    });

    let mut builder = FrameBuilder::new(UartPxxTransport::new());
    let template = config.frame_template();
    let mut ticker = interval(Duration::from_millis(config.period_ms() as u64));
    let mut dropped: u64 = 0;

    info!("Starting PXX frame loop at {} ms", config.period_ms());
    info!("Press Ctrl+C to exit");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let mut frame = template.clone();
                frame.bank = config.bank_for_frame(builder.frames_built());

                if !queue_frame(&tx, builder.build(&frame)) {
                    dropped += 1;
                    debug!("Serial writer busy, dropping frame");
                }

                if builder.frames_built() % LOG_INTERVAL_FRAMES == 0 {
                    info!("Built {} frames ({} dropped)", builder.frames_built(), dropped);
                }
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    drop(tx);
    let sent = writer.await?;
    info!("Total frames sent: {} (built {}, dropped {})", sent, builder.frames_built(), dropped);

    Ok(())
}

/// Queue a finished frame for the writer task; false if the queue is full
fn queue_frame(tx: &mpsc::Sender<Bytes>, frame: &[u8]) -> bool {
    tx.try_send(Bytes::copy_from_slice(frame)).is_ok()
}

/// Build frames for a transport that needs timer/DMA hardware, logging them
async fn run_without_output<T>(config: &Config, mut builder: FrameBuilder<T>) -> Result<()>
where
    T: PxxTransport,
    T::Element: Debug,
{
    let template = config.frame_template();
    let mut ticker = interval(Duration::from_millis(config.period_ms() as u64));

    warn!("{:?} output needs timer hardware; frames are only logged", config.pxx.transport);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let mut frame = template.clone();
                frame.bank = config.bank_for_frame(builder.frames_built());

                let elements = builder.build(&frame);
                debug!("Frame ({} elements): {:?}", elements.len(), elements);

                if builder.frames_built() % LOG_INTERVAL_FRAMES == 0 {
                    info!("Built {} frames", builder.frames_built());
                }
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                info!("Total frames built: {}", builder.frames_built());
                break;
            }
        }
    }

    Ok(())
}
