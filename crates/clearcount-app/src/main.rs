//! # clearcount
//!
//! CLEARCOUNT 바이너리 진입점.
//! 설정 로드, 어댑터 조립, 재시작 감독 기동 후 stdin 명령 루프를 돈다.
//! stdout은 명령 출력 전용이고 로그는 stderr 또는 `--log-file`로 간다.

use anyhow::{Context, Result};
use clap::Parser;
use clearcount_app::command::Command;
use clearcount_app::controller::Controller;
use clearcount_app::engine::EnginePorts;
use clearcount_app::supervisor::{fault_channel, Supervisor};
use clearcount_core::config_manager::ConfigManager;
use clearcount_core::ports::clock::SystemClock;
use clearcount_monitor::process::WindowDiscovery;
use clearcount_storage::counter_file::FileCounterStore;
use clearcount_vision::capture::WindowCapture;
use parking_lot::Mutex;
use std::fs::OpenOptions;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// CLEARCOUNT 코스 클리어 카운터
///
/// 여러 플레이어 창을 감시해 코스 클리어/스킵 횟수를 텍스트 파일로 기록한다.
#[derive(Parser, Debug)]
#[command(name = "clearcount")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 설정 파일 경로 (기본: 플랫폼 설정 디렉토리의 config.json)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// 카운터 파일 디렉토리 (설정값보다 우선)
    #[arg(long)]
    counter_dir: Option<PathBuf>,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', default_value = "warn")]
    log_level: String,

    /// 로그 파일 경로 (기본: stderr)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// 시작 시 카운터 자동 시작 안 함
    #[arg(long)]
    no_autostart: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args)?;

    let config = match &args.config {
        Some(path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    }
    .context("설정 로드 실패")?;
    info!("설정 파일: {}", config.config_path().display());

    let counter_dir = match args.counter_dir.clone() {
        Some(dir) => dir,
        None => config.counter_dir().context("카운터 디렉토리 결정 실패")?,
    };
    let store = FileCounterStore::new(counter_dir).context("카운터 저장소 초기화 실패")?;

    let (listener, faults) = fault_channel();
    let ports = EnginePorts {
        frames: Arc::new(WindowCapture::new()),
        discovery: Arc::new(WindowDiscovery::new()),
        store: Arc::new(store),
        clock: Arc::new(SystemClock),
        listener: Some(Arc::new(listener)),
    };

    let controller = Arc::new(Mutex::new(Controller::new(config, ports)));
    Supervisor::new(Arc::clone(&controller), faults)
        .spawn()
        .context("재시작 감독 스레드 생성 실패")?;

    print_banner();

    if !args.no_autostart {
        output(&controller.lock().execute(Command::Start));
    }

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("입력 읽기 실패")?;
        let text = match line.parse::<Command>() {
            Ok(command) => controller.lock().execute(command),
            Err(e) => e.to_string(),
        };
        output(&text);

        if controller.lock().should_quit() {
            return Ok(());
        }
    }

    // 입력 종료 (EOF) = quit
    warn!("입력 종료, 카운터 정지");
    controller.lock().execute(Command::Quit);
    Ok(())
}

/// 로깅 초기화. `RUST_LOG`가 있으면 그쪽이 우선.
fn init_tracing(args: &Args) -> Result<()> {
    let level = &args.log_level;
    let log_filter = format!(
        "clearcount={level},clearcount_app={level},clearcount_core={level},clearcount_vision={level},clearcount_monitor={level},clearcount_storage={level}"
    );
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter));

    match &args.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("로그 파일 열기 실패: {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .init();
        }
    }
    Ok(())
}

/// 명령 출력 (빈 줄로 구분)
fn output(text: &str) {
    println!("{text}\n");
}

/// 배너 출력
fn print_banner() {
    println!();
    println!("╔══════════════════════════════════════════╗");
    println!("║                                          ║");
    println!("║   CLEARCOUNT  v{:<26}║", env!("CARGO_PKG_VERSION"));
    println!("║   course clear / skip counter            ║");
    println!("║                                          ║");
    println!("╚══════════════════════════════════════════╝");
    println!();
    println!("Type 'help' for list of commands.");
    println!();
}
