//! 애플리케이션 설정 구조체.
//!
//! 감시 대상 프로세스, 슬롯 수, 폴링 주기, 감지 영역/색 범위/임계값,
//! 스킵 규칙, 카운터 저장 위치, 재시작 정책을 정의한다.
//! 모든 필드에 serde 기본값이 있어 일부만 적힌 설정 파일도 로드된다.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::CoreError;
use crate::models::frame::{ColorRange, Rect, RegionProfile};

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// 폴링 엔진 설정
    #[serde(default)]
    pub engine: EngineConfig,
    /// 점수/스킵 규칙
    #[serde(default)]
    pub scoring: ScoringConfig,
    /// 감지 영역 프로파일
    #[serde(default)]
    pub regions: RegionsConfig,
    /// 카운터 저장소 설정
    #[serde(default)]
    pub storage: StorageConfig,
    /// 재시작 정책
    #[serde(default)]
    pub supervisor: SupervisorConfig,
}

// ============================================================
// 엔진 설정
// ============================================================

/// 폴링 엔진 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// 감시할 프로세스 이름 (대소문자 무시)
    #[serde(default = "default_process_name")]
    pub process_name: String,
    /// 슬롯(감시 창) 수
    #[serde(default = "default_source_count")]
    pub source_count: usize,
    /// 초당 사이클 수 (한 사이클에 슬롯 하나)
    #[serde(default = "default_target_fps")]
    pub target_fps: f64,
    /// 같은 슬롯에서 연속 감지 사이 최소 간격 (초)
    #[serde(default = "default_debounce_secs")]
    pub debounce_secs: f64,
    /// 스킵 감지에도 디바운스 적용 여부
    #[serde(default)]
    pub gate_skips: bool,
    /// 엔진 시작 시 마지막 저장값에서 이어서 셀지 여부 (false면 0부터)
    #[serde(default)]
    pub resume_counters: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            process_name: default_process_name(),
            source_count: default_source_count(),
            target_fps: default_target_fps(),
            debounce_secs: default_debounce_secs(),
            gate_skips: false,
            resume_counters: false,
        }
    }
}

// ============================================================
// 점수 규칙
// ============================================================

/// 점수/스킵 규칙
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// 패널티 없이 허용되는 스킵 수
    #[serde(default = "default_free_skips")]
    pub free_skips: u32,
    /// 허용 스킵 초과 시 점수에 더할 값 (보통 음수)
    #[serde(default = "default_skip_penalty")]
    pub skip_penalty: i64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            free_skips: default_free_skips(),
            skip_penalty: default_skip_penalty(),
        }
    }
}

// ============================================================
// 감지 영역
// ============================================================

/// 감지 영역 프로파일 묶음.
///
/// 색 범위는 RGB 순서. 기본값은 1280x720 캡처 기준.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionsConfig {
    /// 코스 클리어 배너
    #[serde(default = "default_course_clear")]
    pub course_clear: RegionProfile,
    /// 일시정지 메뉴 패널
    #[serde(default = "default_pause_menu")]
    pub pause_menu: RegionProfile,
    /// "코스 나가기" 선택 버튼
    #[serde(default = "default_exit_course")]
    pub exit_course: RegionProfile,
}

impl Default for RegionsConfig {
    fn default() -> Self {
        Self {
            course_clear: default_course_clear(),
            pause_menu: default_pause_menu(),
            exit_course: default_exit_course(),
        }
    }
}

// ============================================================
// 저장소 / 재시작
// ============================================================

/// 카운터 저장소 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// 카운터 파일 디렉토리 (None이면 플랫폼 데이터 디렉토리)
    #[serde(default)]
    pub counter_dir: Option<PathBuf>,
}

/// 재시작 정책
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisorConfig {
    /// 엔진 장애 후 재생성까지 대기 (밀리초)
    #[serde(default = "default_restart_delay_ms")]
    pub restart_delay_ms: u64,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            restart_delay_ms: default_restart_delay_ms(),
        }
    }
}

// ============================================================
// AppConfig impl
// ============================================================

impl AppConfig {
    /// 기본 설정값 반환
    pub fn default_config() -> Self {
        Self::default()
    }

    /// 사이클 주기 (1 / target_fps)
    pub fn cycle_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.engine.target_fps)
    }

    /// 디바운스 간격
    pub fn debounce_interval(&self) -> Duration {
        Duration::from_secs_f64(self.engine.debounce_secs)
    }

    /// 재시작 대기 시간
    pub fn restart_delay(&self) -> Duration {
        Duration::from_millis(self.supervisor.restart_delay_ms)
    }

    /// 설정값 검증
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.engine.process_name.trim().is_empty() {
            return Err(validation("engine.process_name", "비어 있음"));
        }
        if self.engine.source_count == 0 {
            return Err(validation("engine.source_count", "1 이상이어야 함"));
        }
        if !(self.engine.target_fps.is_finite() && self.engine.target_fps > 0.0) {
            return Err(validation("engine.target_fps", "0보다 커야 함"));
        }
        if !(self.engine.debounce_secs.is_finite() && self.engine.debounce_secs >= 0.0) {
            return Err(validation("engine.debounce_secs", "0 이상이어야 함"));
        }
        // Duration으로 표현 못 하는 값은 변환 시 패닉
        if Duration::try_from_secs_f64(1.0 / self.engine.target_fps).is_err() {
            return Err(validation("engine.target_fps", "사이클 주기가 너무 김"));
        }
        if Duration::try_from_secs_f64(self.engine.debounce_secs).is_err() {
            return Err(validation("engine.debounce_secs", "값이 너무 큼"));
        }

        for (name, profile) in [
            ("regions.course_clear", &self.regions.course_clear),
            ("regions.pause_menu", &self.regions.pause_menu),
            ("regions.exit_course", &self.regions.exit_course),
        ] {
            if !(0.0..=1.0).contains(&profile.threshold) {
                return Err(validation(name, "threshold는 0.0 ~ 1.0"));
            }
            if !profile.range.is_well_formed() {
                return Err(validation(name, "lower가 upper보다 큰 채널이 있음"));
            }
            if profile.rect.w == 0 || profile.rect.h == 0 {
                return Err(validation(name, "영역 크기가 0"));
            }
        }

        Ok(())
    }
}

fn validation(field: &str, message: &str) -> CoreError {
    CoreError::Validation {
        field: field.to_string(),
        message: message.to_string(),
    }
}

// ============================================================
// 기본값 함수
// ============================================================

fn default_process_name() -> String {
    "vlc.exe".to_string()
}
fn default_source_count() -> usize {
    2
}
fn default_target_fps() -> f64 {
    30.0
}
fn default_debounce_secs() -> f64 {
    10.0
}
fn default_free_skips() -> u32 {
    1
}
fn default_skip_penalty() -> i64 {
    -1
}
fn default_restart_delay_ms() -> u64 {
    1_000
}
fn default_course_clear() -> RegionProfile {
    RegionProfile {
        rect: Rect::new(440, 300, 400, 60),
        range: ColorRange::new([200, 160, 0], [255, 230, 90]),
        threshold: 0.35,
    }
}
fn default_pause_menu() -> RegionProfile {
    RegionProfile {
        rect: Rect::new(0, 80, 320, 560),
        range: ColorRange::new([0, 0, 0], [60, 60, 60]),
        threshold: 0.6,
    }
}
fn default_exit_course() -> RegionProfile {
    RegionProfile {
        rect: Rect::new(40, 520, 240, 50),
        range: ColorRange::new([220, 200, 0], [255, 255, 120]),
        threshold: 0.3,
    }
}
