mod config;
mod http;
mod metrics;
mod netaddr;
mod provider;
mod snapshot;
mod units;

use axum::serve;
use clap::{Parser, ValueEnum};
use config::Config;
use metrics::Metrics;
use provider::observed::ObservedProvider;
use provider::system::SysinfoProvider;
use provider::Provider;
use snapshot::SnapshotRequest;
use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "hostsnap")]
#[command(version)]
struct Cli {
    /// YAML config; built-in defaults are used when omitted.
    #[arg(long)]
    config: Option<String>,
    #[arg(long)]
    print_default_config: bool,
    /// Print a single snapshot as JSON and exit instead of serving HTTP.
    #[arg(long, value_enum)]
    once: Option<SnapshotKind>,
    #[arg(long, required_if_eq("once", "process"))]
    pid: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SnapshotKind {
    Host,
    Cpu,
    Load,
    Memory,
    Disk,
    Process,
}

impl SnapshotKind {
    fn request(self, pid: Option<u32>) -> SnapshotRequest {
        match self {
            Self::Host => SnapshotRequest::Host,
            Self::Cpu => SnapshotRequest::Cpu,
            Self::Load => SnapshotRequest::Load,
            Self::Memory => SnapshotRequest::Memory,
            Self::Disk => SnapshotRequest::Disk,
            Self::Process => SnapshotRequest::Process(pid.unwrap_or_default()),
        }
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();
    if cli.print_default_config {
        println!("{}", Config::example_yaml());
        return;
    }

    let cfg = match &cli.config {
        Some(path) => match Config::load_from_file(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                error!(error = %err, "не удалось загрузить конфигурацию");
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };

    let metrics = match Metrics::new() {
        Ok(m) => m,
        Err(err) => {
            error!(error = %err, "не удалось инициализировать метрики");
            std::process::exit(1);
        }
    };
    let provider: Arc<dyn Provider> = Arc::new(ObservedProvider::new(
        SysinfoProvider::new(),
        metrics.clone(),
    ));

    if let Some(kind) = cli.once {
        let request = kind.request(cli.pid);
        let options = cfg.snapshot_options();
        let bytes = match tokio::task::spawn_blocking(move || {
            request.build(provider.as_ref(), &options)
        })
        .await
        {
            Ok(bytes) => bytes,
            Err(err) => {
                error!(error = %err, "задача сборки снимка завершилась аварийно");
                std::process::exit(1);
            }
        };
        let mut stdout = std::io::stdout().lock();
        if let Err(err) = stdout.write_all(&bytes).and_then(|_| stdout.write_all(b"\n")) {
            error!(error = %err, "не удалось вывести снимок");
            std::process::exit(1);
        }
        return;
    }

    info!(
        listen = %cfg.listen,
        cpu_sample_window = %humantime::format_duration(cfg.cpu_sample_window),
        temperature_sensor_key = %cfg.temperature_sensor_key,
        "запуск hostsnap"
    );

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let http_task = {
        let cfg = cfg.clone();
        tokio::spawn(async move {
            let app = http::build_router(metrics, provider, cfg.snapshot_options());
            let addr: SocketAddr = match cfg.listen.parse() {
                Ok(addr) => addr,
                Err(err) => {
                    error!(error = %err, listen = %cfg.listen, "некорректный адрес listen");
                    return;
                }
            };

            let listener = match TcpListener::bind(addr).await {
                Ok(l) => l,
                Err(err) => {
                    error!(error = %err, "не удалось запустить HTTP-сервер");
                    return;
                }
            };

            let server = serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.changed().await;
            });

            if let Err(err) = server.await {
                error!(error = %err, "ошибка HTTP-сервера");
            }
        })
    };

    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "не удалось дождаться Ctrl+C");
    }
    info!("получен Ctrl+C, выполняется остановка");

    let _ = shutdown_tx.send(true);
    let _ = http_task.await;
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
