//! 카운터 컨트롤러.
//!
//! 현재 엔진 인스턴스를 소유하고 콘솔 명령을 엔진 조작으로 바꾼다.
//! 명령 결과는 콘솔에 그대로 출력할 텍스트로 돌려준다.
//! 재시작 감독도 같은 컨트롤러 잠금을 통해 엔진을 교체한다.

use clearcount_core::config::AppConfig;
use clearcount_core::config_manager::ConfigManager;
use clearcount_core::error::CoreError;
use std::fmt::Write as _;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::command::{help_text, Command};
use crate::engine::{EnginePorts, EngineSettings, PollingEngine};

/// 카운터 컨트롤러
pub struct Controller {
    config: ConfigManager,
    ports: EnginePorts,
    engine: Option<PollingEngine>,
    /// 마지막으로 만든 엔진 번호
    generation: u64,
    quit: bool,
}

impl Controller {
    /// 새 컨트롤러 생성 (엔진 없음)
    pub fn new(config: ConfigManager, ports: EnginePorts) -> Self {
        Self {
            config,
            ports,
            engine: None,
            generation: 0,
            quit: false,
        }
    }

    /// 명령 실행 후 출력 텍스트 반환
    pub fn execute(&mut self, command: Command) -> String {
        debug!("명령 실행: {:?}", command);
        match command {
            Command::Start => self.start(),
            Command::Stop => self.stop(),
            Command::Reset => self.reset(),
            Command::Refresh => self.refresh(),
            Command::Set { slot, score } => self.set_score(slot, score),
            Command::Skip { slot, skips } => self.set_skips(slot, skips),
            Command::Swap { left, right } => self.swap(left, right),
            Command::Status => self.status(),
            Command::Quit => self.quit(),
            Command::Help => help_text(),
        }
    }

    /// `quit` 명령을 받았는지
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// 엔진이 폴링 중인지
    pub fn is_running(&self) -> bool {
        self.engine.as_ref().is_some_and(PollingEngine::is_running)
    }

    /// 현재 엔진 번호 (엔진이 없으면 `None`)
    pub fn current_generation(&self) -> Option<u64> {
        self.engine.as_ref().map(PollingEngine::generation)
    }

    /// 현재 엔진
    pub fn engine(&self) -> Option<&PollingEngine> {
        self.engine.as_ref()
    }

    /// 설정된 재시작 지연
    pub fn restart_delay(&self) -> Duration {
        self.config.get().restart_delay()
    }

    /// 장애가 난 엔진을 새 엔진으로 교체.
    ///
    /// 이미 교체되었거나 정지된 엔진의 통지면 아무것도 하지 않고 `None`.
    /// 새 엔진이 시작하지 못해도 보관해 두어 그 장애 통지로 다시 재시도한다.
    pub fn restart_after_fault(&mut self, generation: u64) -> Option<String> {
        if self.current_generation() != Some(generation) {
            debug!("엔진 #{generation} 장애 통지 무시 (이미 교체됨)");
            return None;
        }

        self.stop_engine();
        match self.start_engine() {
            Ok(true) => Some("Counter restarted.".to_string()),
            Ok(false) => Some("Unable to restart counter, retrying.".to_string()),
            Err(e) => {
                error!("엔진 재시작 실패: {e}");
                Some("Unable to restart counter.".to_string())
            }
        }
    }

    // ============================================================
    // 명령
    // ============================================================

    fn start(&mut self) -> String {
        if self.is_running() {
            return "Counter already running.".to_string();
        }

        self.stop_engine();
        match self.start_engine() {
            Ok(true) => "Counter started.".to_string(),
            Ok(false) => {
                self.stop_engine();
                "Unable to start counter.".to_string()
            }
            Err(e) => {
                error!("엔진 시작 실패: {e}");
                self.stop_engine();
                "Unable to start counter.".to_string()
            }
        }
    }

    fn stop(&mut self) -> String {
        let was_running = self.is_running();
        // 재시도 중인 엔진도 함께 정리 (대기 중인 재시작 취소)
        self.stop_engine();
        if was_running {
            "Counter stopped.".to_string()
        } else {
            "Counter not running.".to_string()
        }
    }

    fn reset(&mut self) -> String {
        self.stop_engine();
        match self.start_engine() {
            Ok(true) => "Counter reset.".to_string(),
            Ok(false) | Err(_) => {
                self.stop_engine();
                "Unable to reset counter.".to_string()
            }
        }
    }

    fn refresh(&mut self) -> String {
        let Some(engine) = self.engine.as_ref() else {
            return "Counter must be started before refreshing windows.".to_string();
        };

        match engine.refresh_handles() {
            Ok(reassigned) => {
                info!("창 재탐색 완료: {reassigned}개 슬롯 재할당");
                "Handles refreshed.".to_string()
            }
            Err(e) => {
                warn!("창 재탐색 실패: {e}");
                "Unable to refresh handles.".to_string()
            }
        }
    }

    fn set_score(&mut self, slot: usize, score: i64) -> String {
        let Some(engine) = self.running_engine() else {
            return "Counter must be started before setting clears.".to_string();
        };
        match engine.set_score(slot, score) {
            Ok(()) => format!("Player {slot} clears set to {score}."),
            Err(e) => slot_error(e),
        }
    }

    fn set_skips(&mut self, slot: usize, skips: u32) -> String {
        let Some(engine) = self.running_engine() else {
            return "Counter must be started before setting skips.".to_string();
        };
        match engine.set_skip_count(slot, skips) {
            Ok(()) => format!("Player {slot} skips set to {skips}."),
            Err(e) => slot_error(e),
        }
    }

    fn swap(&mut self, left: usize, right: usize) -> String {
        let Some(engine) = self.running_engine() else {
            return "Counter must be started before swapping windows.".to_string();
        };
        match engine.swap(left, right) {
            Ok(()) => format!("Players {left} and {right} swapped."),
            Err(e) => slot_error(e),
        }
    }

    fn status(&self) -> String {
        let mut out = String::from("Status ----------------");
        let Some(engine) = self.running_engine() else {
            out.push_str("\nCounter stopped.");
            return out;
        };

        out.push_str("\nCounter running.");
        for (slot, snapshot) in engine.snapshots().iter().enumerate() {
            let window = match snapshot.handle {
                Some(handle) => self
                    .ports
                    .discovery
                    .describe(handle)
                    .unwrap_or_else(|| format!("<closed {handle}>")),
                None => "<none>".to_string(),
            };
            let _ = write!(
                out,
                "\nPlayer {slot} window: {window} (clears {}, skips {})",
                snapshot.score, snapshot.skips
            );
        }
        out
    }

    fn quit(&mut self) -> String {
        self.stop_engine();
        self.quit = true;
        info!("종료 요청");
        "Goodbye.".to_string()
    }

    // ============================================================
    // 엔진 관리
    // ============================================================

    fn running_engine(&self) -> Option<&PollingEngine> {
        self.engine.as_ref().filter(|e| e.is_running())
    }

    /// 현재 설정으로 새 엔진을 만들어 시작. 폴링 상태가 됐는지 반환.
    fn start_engine(&mut self) -> Result<bool, CoreError> {
        let config = self.current_config();
        self.generation += 1;

        let mut engine = PollingEngine::new(
            self.generation,
            EngineSettings::from_config(&config),
            self.ports.clone(),
        );
        engine.start()?;

        let running = engine.is_running();
        if !running {
            warn!(
                "엔진 #{} 시작 불가: 슬롯 {:?} 창 없음",
                self.generation,
                engine.unresolved_slot()
            );
        }
        self.engine = Some(engine);
        Ok(running)
    }

    fn stop_engine(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            engine.stop();
        }
    }

    /// 설정 파일을 다시 읽는다. 실패하면 마지막으로 유효했던 설정 사용.
    fn current_config(&self) -> AppConfig {
        if let Err(e) = self.config.reload() {
            warn!("설정 재로드 실패, 이전 설정 사용: {e}");
        }
        self.config.get()
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.stop_engine();
    }
}

fn slot_error(e: CoreError) -> String {
    match e {
        CoreError::InvalidSlot { slot, slot_count } => {
            format!("Invalid player {slot}: expected 0..{slot_count}.")
        }
        other => format!("Command failed: {other}"),
    }
}
