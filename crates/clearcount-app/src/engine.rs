//! 라운드로빈 폴링 엔진.
//!
//! 사이클마다 슬롯 하나를 방문해 창을 캡처하고, 코스 클리어/스킵 화면을 판정해
//! 슬롯 카운터를 갱신한다. 폴링 스레드와 제어 명령은 엔진 전체 잠금 하나를 공유한다.
//!
//! 사이클 단위 실패(캡처 실패 등)는 로그만 남기고 다음 사이클로 넘어간다.
//! 엔진 전체가 동작할 수 없을 때만 `EngineListener`에 통지한다.

use clearcount_core::config::{AppConfig, RegionsConfig};
use clearcount_core::error::CoreError;
use clearcount_core::models::slot::{
    score_counter_name, skip_counter_name, SlotSnapshot, SlotState, SourceHandle,
};
use clearcount_core::ports::capture::FrameSource;
use clearcount_core::ports::clock::Clock;
use clearcount_core::ports::discovery::SourceDiscovery;
use clearcount_core::ports::listener::{EngineFault, EngineListener};
use clearcount_core::ports::storage::CounterStore;
use clearcount_vision::detector::{CourseDetector, Observation};
use parking_lot::Mutex;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// 엔진 설정 (생성 시점에 고정)
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// 감시할 프로세스 이름
    pub process_name: String,
    /// 슬롯 수
    pub source_count: usize,
    /// 사이클 주기 (1 / target_fps)
    pub cycle_period: Duration,
    /// 같은 슬롯 연속 감지 최소 간격
    pub debounce: Duration,
    /// 스킵에도 디바운스 적용
    pub gate_skips: bool,
    /// 마지막 저장값에서 이어서 세기
    pub resume_counters: bool,
    /// 패널티 없는 스킵 수
    pub free_skips: u32,
    /// 허용 초과 스킵마다 점수에 더할 값
    pub skip_penalty: i64,
    /// 감지 영역
    pub regions: RegionsConfig,
}

impl EngineSettings {
    /// 앱 설정에서 엔진 설정 추출
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            process_name: config.engine.process_name.clone(),
            source_count: config.engine.source_count,
            cycle_period: config.cycle_period(),
            debounce: config.debounce_interval(),
            gate_skips: config.engine.gate_skips,
            resume_counters: config.engine.resume_counters,
            free_skips: config.scoring.free_skips,
            skip_penalty: config.scoring.skip_penalty,
            regions: config.regions.clone(),
        }
    }
}

/// 엔진이 사용하는 외부 협력자 묶음
#[derive(Clone)]
pub struct EnginePorts {
    pub frames: Arc<dyn FrameSource>,
    pub discovery: Arc<dyn SourceDiscovery>,
    pub store: Arc<dyn CounterStore>,
    pub clock: Arc<dyn Clock>,
    pub listener: Option<Arc<dyn EngineListener>>,
}

/// 한 사이클의 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// 아무것도 감지되지 않음
    Idle { slot: usize },
    /// 슬롯에 바인딩된 소스 없음
    NoSource { slot: usize },
    /// 캡처 실패 (카운터 변경 없음)
    CaptureFailed { slot: usize },
    /// 캡처/판정 중 패닉 (감지 없음으로 처리)
    Panicked { slot: usize },
    /// 감지됐지만 디바운스 간격 내라 무시
    Debounced { slot: usize },
    /// 코스 클리어 → 점수 +1
    Cleared { slot: usize, score: i64 },
    /// 스킵 → 스킵 +1 (허용 초과 시 패널티 적용)
    Skipped {
        slot: usize,
        skips: u32,
        score: i64,
        penalized: bool,
    },
}

/// 잠금으로 보호되는 엔진 상태
struct EngineState {
    slots: Vec<SlotState>,
    /// 다음 사이클에 방문할 슬롯
    cursor: usize,
}

/// 폴링 스레드와 제어 명령이 공유하는 엔진 본체
struct EngineCore {
    generation: u64,
    settings: EngineSettings,
    detector: CourseDetector,
    ports: EnginePorts,
    /// 생성 시 핸들을 찾지 못한 첫 슬롯
    unresolved: Option<usize>,
    running: AtomicBool,
    state: Mutex<EngineState>,
}

/// 폴링 엔진
pub struct PollingEngine {
    core: Arc<EngineCore>,
    worker: Option<JoinHandle<()>>,
}

impl PollingEngine {
    /// 새 엔진 생성 (정지 상태).
    ///
    /// 소스 탐색은 여기서 한 번만 수행한다. 핸들이 모자라도 생성은 성공하며,
    /// 그 경우 `start()` 후 루프가 첫 확인에서 종료되고 장애가 통지된다.
    pub fn new(generation: u64, settings: EngineSettings, ports: EnginePorts) -> Self {
        let handles = match ports.discovery.enumerate(&settings.process_name) {
            Ok(handles) => handles,
            Err(e) => {
                warn!("소스 탐색 실패: {e}");
                Vec::new()
            }
        };

        let slots: Vec<SlotState> = (0..settings.source_count)
            .map(|i| {
                let (score, skips) = if settings.resume_counters {
                    (
                        load_counter(ports.store.as_ref(), &score_counter_name(i)),
                        u32::try_from(load_counter(ports.store.as_ref(), &skip_counter_name(i)))
                            .unwrap_or(0),
                    )
                } else {
                    (0, 0)
                };
                SlotState::new(handles.get(i).copied(), score, skips)
            })
            .collect();

        let unresolved = slots.iter().position(|s| s.handle.is_none());

        // 오버레이가 시작값을 바로 보도록 초기 카운터 기록
        for (i, slot) in slots.iter().enumerate() {
            persist_counter(ports.store.as_ref(), &score_counter_name(i), slot.score);
            persist_counter(
                ports.store.as_ref(),
                &skip_counter_name(i),
                i64::from(slot.skips),
            );
        }

        info!(
            "엔진 #{generation} 생성: '{}' 슬롯 {}개, 탐색된 창 {}개",
            settings.process_name,
            settings.source_count,
            handles.len()
        );

        let detector = CourseDetector::new(&settings.regions);
        Self {
            core: Arc::new(EngineCore {
                generation,
                settings,
                detector,
                ports,
                unresolved,
                running: AtomicBool::new(false),
                state: Mutex::new(EngineState { slots, cursor: 0 }),
            }),
            worker: None,
        }
    }

    /// 엔진 인스턴스 번호
    pub fn generation(&self) -> u64 {
        self.core.generation
    }

    /// 슬롯 수
    pub fn slot_count(&self) -> usize {
        self.core.settings.source_count
    }

    /// 생성 시 핸들을 찾지 못한 첫 슬롯
    pub fn unresolved_slot(&self) -> Option<usize> {
        self.core.unresolved
    }

    /// 폴링 스레드 시작.
    ///
    /// 모든 슬롯에 핸들이 있을 때만 `Running`이 된다.
    pub fn start(&mut self) -> Result<(), CoreError> {
        if self.worker.is_some() {
            return Ok(());
        }

        self.core
            .running
            .store(self.core.unresolved.is_none(), Ordering::SeqCst);

        let core = Arc::clone(&self.core);
        let handle = thread::Builder::new()
            .name(format!("clearcount-engine-{}", self.core.generation))
            .spawn(move || run_loop(core))?;

        self.worker = Some(handle);
        Ok(())
    }

    /// 폴링 중인지
    pub fn is_running(&self) -> bool {
        self.core.running.load(Ordering::SeqCst)
    }

    /// 정지 요청 후 폴링 스레드 종료 대기.
    ///
    /// 진행 중인 캡처는 끝까지 수행된다.
    pub fn stop(&mut self) {
        self.core.running.store(false, Ordering::SeqCst);

        if let Some(handle) = self.worker.take() {
            if handle.thread().id() == thread::current().id() {
                return;
            }
            if handle.join().is_err() {
                warn!("엔진 #{} 스레드 join 실패", self.core.generation);
            }
            debug!("엔진 #{} 정지", self.core.generation);
        }
    }

    /// 사이클 하나 실행 (잠금 획득 → 커서 이동 → 캡처/판정/갱신 → 잠금 해제).
    ///
    /// 폴링 스레드가 주기적으로 호출한다. 슬립은 하지 않는다.
    pub fn run_cycle(&self) -> CycleOutcome {
        self.core.run_cycle()
    }

    // ============================================================
    // 제어 명령
    // ============================================================

    /// 슬롯 점수 덮어쓰기
    pub fn set_score(&self, slot: usize, score: i64) -> Result<(), CoreError> {
        let mut state = self.core.state.lock();
        let target = slot_mut(&mut state.slots, slot)?;
        target.score = score;
        self.core.persist(&score_counter_name(slot), score);
        info!("슬롯 {slot} 점수 설정: {score}");
        Ok(())
    }

    /// 슬롯 스킵 수 덮어쓰기 (점수는 변경하지 않음)
    pub fn set_skip_count(&self, slot: usize, skips: u32) -> Result<(), CoreError> {
        let mut state = self.core.state.lock();
        let target = slot_mut(&mut state.slots, slot)?;
        target.skips = skips;
        self.core.persist(&skip_counter_name(slot), i64::from(skips));
        info!("슬롯 {slot} 스킵 수 설정: {skips}");
        Ok(())
    }

    /// 두 슬롯의 핸들 교환. 카운터는 슬롯에 남는다.
    pub fn swap(&self, left: usize, right: usize) -> Result<(), CoreError> {
        let mut state = self.core.state.lock();
        let count = state.slots.len();
        for slot in [left, right] {
            if slot >= count {
                return Err(CoreError::InvalidSlot {
                    slot,
                    slot_count: count,
                });
            }
        }

        let left_handle = state.slots[left].handle;
        state.slots[left].handle = state.slots[right].handle;
        state.slots[right].handle = left_handle;
        info!("슬롯 {left} ↔ {right} 창 교환");
        Ok(())
    }

    /// 슬롯 핸들 조회. 범위 밖이면 `None`.
    pub fn handle(&self, slot: usize) -> Option<SourceHandle> {
        self.core.state.lock().slots.get(slot).and_then(|s| s.handle)
    }

    /// 슬롯 점수
    pub fn score(&self, slot: usize) -> Result<i64, CoreError> {
        self.snapshot(slot).map(|s| s.score)
    }

    /// 슬롯 스킵 수
    pub fn skip_count(&self, slot: usize) -> Result<u32, CoreError> {
        self.snapshot(slot).map(|s| s.skips)
    }

    /// 슬롯 스냅샷
    pub fn snapshot(&self, slot: usize) -> Result<SlotSnapshot, CoreError> {
        let state = self.core.state.lock();
        state
            .slots
            .get(slot)
            .map(SlotState::snapshot)
            .ok_or(CoreError::InvalidSlot {
                slot,
                slot_count: state.slots.len(),
            })
    }

    /// 전체 슬롯 스냅샷 (한 번의 잠금으로 일관된 상태)
    pub fn snapshots(&self) -> Vec<SlotSnapshot> {
        self.core
            .state
            .lock()
            .slots
            .iter()
            .map(SlotState::snapshot)
            .collect()
    }

    /// 끊긴 핸들을 새로 탐색된 창으로 교체.
    ///
    /// 다시 발견된 핸들은 자기 슬롯을 유지하고, 새 핸들은 유효하지 않은 첫 슬롯부터
    /// 탐색 순서대로 채운다. 채워지지 않은 슬롯은 기존 핸들을 그대로 둔다.
    /// 반환값은 새 핸들을 받은 슬롯 수.
    pub fn refresh_handles(&self) -> Result<usize, CoreError> {
        let discovered = self
            .core
            .ports
            .discovery
            .enumerate(&self.core.settings.process_name)?;

        let mut state = self.core.state.lock();
        for slot in state.slots.iter_mut() {
            slot.valid = false;
        }

        let mut fresh: Vec<SourceHandle> = Vec::new();
        for handle in discovered {
            match state.slots.iter_mut().find(|s| s.handle == Some(handle)) {
                Some(slot) => slot.valid = true,
                None if !fresh.contains(&handle) => fresh.push(handle),
                None => {}
            }
        }

        let mut reassigned = 0;
        for handle in fresh {
            let Some((index, slot)) = state.slots.iter_mut().enumerate().find(|(_, s)| !s.valid)
            else {
                debug!("남는 슬롯 없음, 창 {handle} 무시");
                break;
            };
            info!("슬롯 {index} 창 재할당: {:?} → {handle}", slot.handle);
            slot.handle = Some(handle);
            slot.valid = true;
            reassigned += 1;
        }

        Ok(reassigned)
    }
}

impl Drop for PollingEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

impl EngineCore {
    fn run_cycle(&self) -> CycleOutcome {
        let mut state = self.state.lock();
        if state.slots.is_empty() {
            return CycleOutcome::NoSource { slot: 0 };
        }
        let index = state.cursor;
        // 방문 중 패닉이 나도 다음 사이클은 다음 슬롯
        state.cursor = (index + 1) % state.slots.len();

        let visited = panic::catch_unwind(AssertUnwindSafe(|| {
            self.visit(&mut state.slots[index], index)
        }));
        visited.unwrap_or_else(|payload| {
            error!(
                "슬롯 {index} 처리 중 패닉 (감지 없음으로 처리): {}",
                panic_message(payload.as_ref())
            );
            CycleOutcome::Panicked { slot: index }
        })
    }

    /// 슬롯 하나 방문 (잠금 보유 상태)
    fn visit(&self, slot: &mut SlotState, index: usize) -> CycleOutcome {
        let Some(handle) = slot.handle else {
            return CycleOutcome::NoSource { slot: index };
        };

        let frame = match self.ports.frames.capture(handle) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("슬롯 {index} 캡처 실패 (다음 사이클 재시도): {e}");
                return CycleOutcome::CaptureFailed { slot: index };
            }
        };

        let now = self.ports.clock.now();
        match self.detector.observe(&frame) {
            Observation::CourseClear => {
                if !slot.debounce_elapsed(now, self.settings.debounce) {
                    return CycleOutcome::Debounced { slot: index };
                }
                self.apply_clear(slot, index, now)
            }
            Observation::CourseExit => {
                if self.settings.gate_skips && !slot.debounce_elapsed(now, self.settings.debounce)
                {
                    return CycleOutcome::Debounced { slot: index };
                }
                self.apply_skip(slot, index, now)
            }
            Observation::Nothing => CycleOutcome::Idle { slot: index },
        }
    }

    fn apply_clear(&self, slot: &mut SlotState, index: usize, now: Instant) -> CycleOutcome {
        slot.score = slot.score.saturating_add(1);
        slot.last_transition = Some(now);
        self.persist(&score_counter_name(index), slot.score);

        info!("슬롯 {index} 코스 클리어 (점수 {})", slot.score);
        CycleOutcome::Cleared {
            slot: index,
            score: slot.score,
        }
    }

    fn apply_skip(&self, slot: &mut SlotState, index: usize, now: Instant) -> CycleOutcome {
        slot.skips = slot.skips.saturating_add(1);
        slot.last_transition = Some(now);
        self.persist(&skip_counter_name(index), i64::from(slot.skips));

        let penalized = slot.skips > self.settings.free_skips;
        if penalized {
            slot.score = slot.score.saturating_add(self.settings.skip_penalty);
            slot.last_transition = Some(self.ports.clock.now());
            self.persist(&score_counter_name(index), slot.score);
        }

        info!(
            "슬롯 {index} 코스 스킵 (스킵 {}, 점수 {}{})",
            slot.skips,
            slot.score,
            if penalized { ", 패널티 적용" } else { "" }
        );
        CycleOutcome::Skipped {
            slot: index,
            skips: slot.skips,
            score: slot.score,
            penalized,
        }
    }

    fn persist(&self, name: &str, value: i64) {
        persist_counter(self.ports.store.as_ref(), name, value);
    }

    fn notify(&self, fault: EngineFault) {
        match &self.ports.listener {
            Some(listener) => listener.on_engine_fault(self.generation, fault),
            None => debug!("장애 수신자 없음: {fault}"),
        }
    }
}

/// 폴링 스레드 본체
fn run_loop(core: Arc<EngineCore>) {
    if let Some(slot) = core.unresolved {
        error!("엔진 #{} 시작 불가: 슬롯 {slot} 창 없음", core.generation);
        core.notify(EngineFault::UnresolvedSource { slot });
        return;
    }

    info!(
        "엔진 #{} 폴링 시작: 사이클 {}ms",
        core.generation,
        core.settings.cycle_period.as_millis()
    );

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        while core.running.load(Ordering::SeqCst) {
            let started = Instant::now();
            let outcome = core.run_cycle();
            debug!("사이클: {:?}", outcome);

            // 작업이 주기를 넘겼으면 바로 다음 사이클
            if let Some(remaining) = core.settings.cycle_period.checked_sub(started.elapsed()) {
                thread::sleep(remaining);
            }
        }
    }));

    match result {
        Ok(()) => info!("엔진 #{} 폴링 종료", core.generation),
        Err(payload) => {
            core.running.store(false, Ordering::SeqCst);
            let reason = panic_message(payload.as_ref());
            error!("엔진 #{} 폴링 루프 비정상 종료: {reason}", core.generation);
            core.notify(EngineFault::LoopExited(reason));
        }
    }
}

fn slot_mut(slots: &mut [SlotState], slot: usize) -> Result<&mut SlotState, CoreError> {
    let slot_count = slots.len();
    slots
        .get_mut(slot)
        .ok_or(CoreError::InvalidSlot { slot, slot_count })
}

/// 카운터 기록. 실패는 로그만 남긴다 (메모리 값이 기준).
fn persist_counter(store: &dyn CounterStore, name: &str, value: i64) {
    if let Err(e) = store.persist(name, value) {
        warn!("카운터 기록 실패 (무시): {e}");
    }
}

/// 저장된 카운터 로드. 없거나 읽을 수 없으면 0.
fn load_counter(store: &dyn CounterStore, name: &str) -> i64 {
    match store.load(name) {
        Ok(value) => value.unwrap_or(0),
        Err(e) => {
            warn!("카운터 로드 실패, 0부터 시작: {e}");
            0
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "알 수 없는 패닉".to_string()
    }
}
