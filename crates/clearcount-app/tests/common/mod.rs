//! 통합 테스트 공용 가짜 협력자.
//!
//! 스크립트 프레임 소스, 고정 창 탐색기, 인메모리 카운터 저장소, 수동 시계.

#![allow(dead_code)]

use clearcount_app::engine::{EnginePorts, EngineSettings, PollingEngine};
use clearcount_core::config::RegionsConfig;
use clearcount_core::config_manager::ConfigManager;
use clearcount_core::error::CoreError;
use clearcount_core::models::frame::{ColorRange, Frame, Rect, RegionProfile};
use clearcount_core::models::slot::SourceHandle;
use clearcount_core::ports::capture::FrameSource;
use clearcount_core::ports::clock::Clock;
use clearcount_core::ports::discovery::SourceDiscovery;
use clearcount_core::ports::listener::{EngineFault, EngineListener};
use clearcount_core::ports::storage::CounterStore;
use image::Rgb;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

const YELLOW: Rgb<u8> = Rgb([250, 220, 40]);
const DARK: Rgb<u8> = Rgb([20, 20, 20]);
const BLUE: Rgb<u8> = Rgb([30, 60, 200]);

/// 창에 보이는 화면
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scene {
    /// 플레이 중 (감지 없음)
    Playing,
    /// 코스 클리어 배너
    Clear,
    /// 일시정지 메뉴 + 코스 나가기 선택
    Exit,
    /// 클리어 배너와 나가기 메뉴가 동시에
    ClearAndExit,
    /// 캡처 실패 (창 닫힘)
    Closed,
    /// 캡처 중 패닉
    Panic,
}

/// 40x40 테스트 프레임의 감지 영역
pub fn test_regions() -> RegionsConfig {
    RegionsConfig {
        course_clear: RegionProfile {
            rect: Rect::new(20, 0, 20, 10),
            range: ColorRange::new([200, 160, 0], [255, 230, 90]),
            threshold: 0.5,
        },
        pause_menu: RegionProfile {
            rect: Rect::new(0, 10, 10, 30),
            range: ColorRange::new([0, 0, 0], [60, 60, 60]),
            threshold: 0.5,
        },
        exit_course: RegionProfile {
            rect: Rect::new(10, 30, 10, 10),
            range: ColorRange::new([0, 0, 150], [80, 100, 255]),
            threshold: 0.5,
        },
    }
}

/// 화면 그리기
pub fn paint(scene: Scene) -> Frame {
    let (clear, pause) = match scene {
        Scene::Clear => (true, false),
        Scene::Exit => (false, true),
        Scene::ClearAndExit => (true, true),
        _ => (false, false),
    };
    // 나가기 버튼은 메뉴가 열렸을 때만 선택 색(파랑)
    let exit = pause;

    Frame::from_fn(40, 40, |x, y| {
        if clear && (20..40).contains(&x) && y < 10 {
            YELLOW
        } else if pause && x < 10 && (10..40).contains(&y) {
            DARK
        } else if !exit && (10..20).contains(&x) && (30..40).contains(&y) {
            DARK
        } else {
            BLUE
        }
    })
}

/// 테스트용 엔진 설정: 디바운스 10초, 무료 스킵 1, 패널티 -1
pub fn test_settings(source_count: usize) -> EngineSettings {
    EngineSettings {
        process_name: "vlc.exe".to_string(),
        source_count,
        cycle_period: Duration::from_millis(1),
        debounce: Duration::from_secs(10),
        gate_skips: false,
        resume_counters: false,
        free_skips: 1,
        skip_penalty: -1,
        regions: test_regions(),
    }
}

/// `dir/config.json`에 테스트 설정을 기록한 설정 관리자
pub fn test_config(dir: &Path, source_count: usize) -> ConfigManager {
    let config = ConfigManager::with_path(dir.join("config.json")).unwrap();
    config
        .update_with(|c| {
            c.engine.source_count = source_count;
            c.engine.target_fps = 1000.0;
            c.regions = test_regions();
            c.supervisor.restart_delay_ms = 10;
        })
        .unwrap();
    config
}

/// 핸들별 화면을 돌려주는 프레임 소스
#[derive(Default)]
pub struct ScriptedFrames {
    scenes: Mutex<HashMap<SourceHandle, Scene>>,
    captures: AtomicUsize,
}

impl ScriptedFrames {
    pub fn show(&self, handle: u32, scene: Scene) {
        self.scenes.lock().insert(SourceHandle(handle), scene);
    }

    pub fn capture_count(&self) -> usize {
        self.captures.load(Ordering::SeqCst)
    }
}

impl FrameSource for ScriptedFrames {
    fn capture(&self, handle: SourceHandle) -> Result<Frame, CoreError> {
        self.captures.fetch_add(1, Ordering::SeqCst);
        let scene = self
            .scenes
            .lock()
            .get(&handle)
            .copied()
            .unwrap_or(Scene::Playing);
        match scene {
            Scene::Closed => Err(CoreError::CaptureFailed(format!("창 {handle} 없음"))),
            Scene::Panic => panic!("캡처 드라이버 충돌"),
            other => Ok(paint(other)),
        }
    }
}

/// 설정된 핸들 목록을 돌려주는 탐색기
#[derive(Default)]
pub struct FixedDiscovery {
    handles: Mutex<Vec<SourceHandle>>,
    fail: AtomicBool,
}

impl FixedDiscovery {
    pub fn with_handles(handles: &[u32]) -> Self {
        let discovery = Self::default();
        discovery.set_handles(handles);
        discovery
    }

    pub fn set_handles(&self, handles: &[u32]) {
        *self.handles.lock() = handles.iter().copied().map(SourceHandle).collect();
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl SourceDiscovery for FixedDiscovery {
    fn enumerate(&self, _process_name: &str) -> Result<Vec<SourceHandle>, CoreError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(CoreError::Discovery("창 목록 조회 실패".to_string()));
        }
        Ok(self.handles.lock().clone())
    }

    fn describe(&self, handle: SourceHandle) -> Option<String> {
        self.handles
            .lock()
            .contains(&handle)
            .then(|| format!("VLC #{}", handle.0))
    }
}

/// 인메모리 카운터 저장소
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, i64>>,
    writes: AtomicUsize,
    fail: AtomicBool,
}

impl MemoryStore {
    pub fn value(&self, name: &str) -> Option<i64> {
        self.values.lock().get(name).copied()
    }

    pub fn preset(&self, name: &str, value: i64) {
        self.values.lock().insert(name.to_string(), value);
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl CounterStore for MemoryStore {
    fn persist(&self, name: &str, value: i64) -> Result<(), CoreError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(CoreError::Persistence {
                name: name.to_string(),
                message: "디스크 가득 참".to_string(),
            });
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.values.lock().insert(name.to_string(), value);
        Ok(())
    }

    fn load(&self, name: &str) -> Result<Option<i64>, CoreError> {
        Ok(self.value(name))
    }
}

/// 수동으로 진행시키는 시계
pub struct ManualClock {
    base: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.offset.lock() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + *self.offset.lock()
    }
}

/// 장애 통지 기록
#[derive(Default)]
pub struct RecordingListener {
    faults: Mutex<Vec<(u64, EngineFault)>>,
}

impl RecordingListener {
    pub fn faults(&self) -> Vec<(u64, EngineFault)> {
        self.faults.lock().clone()
    }
}

impl EngineListener for RecordingListener {
    fn on_engine_fault(&self, generation: u64, fault: EngineFault) {
        self.faults.lock().push((generation, fault));
    }
}

/// 가짜 협력자 묶음
pub struct Harness {
    pub frames: Arc<ScriptedFrames>,
    pub discovery: Arc<FixedDiscovery>,
    pub store: Arc<MemoryStore>,
    pub clock: Arc<ManualClock>,
    pub listener: Arc<RecordingListener>,
}

impl Harness {
    pub fn new(handles: &[u32]) -> Self {
        Self {
            frames: Arc::new(ScriptedFrames::default()),
            discovery: Arc::new(FixedDiscovery::with_handles(handles)),
            store: Arc::new(MemoryStore::default()),
            clock: Arc::new(ManualClock::new()),
            listener: Arc::new(RecordingListener::default()),
        }
    }

    pub fn ports(&self) -> EnginePorts {
        EnginePorts {
            frames: self.frames.clone(),
            discovery: self.discovery.clone(),
            store: self.store.clone(),
            clock: self.clock.clone(),
            listener: Some(self.listener.clone()),
        }
    }

    /// 정지 상태 엔진 (사이클은 `run_cycle()`로 직접 구동)
    pub fn engine(&self, settings: EngineSettings) -> PollingEngine {
        PollingEngine::new(1, settings, self.ports())
    }
}

/// 조건이 참이 될 때까지 대기 (최대 2초)
pub fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    condition()
}
