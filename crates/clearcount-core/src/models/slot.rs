//! 슬롯(감시 대상 창) 상태 모델.
//!
//! 엔진 인스턴스마다 슬롯 수는 생성 시점에 고정되며,
//! 슬롯은 추가/삭제되지 않고 내용만 변경된다.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

/// 점수 카운터 파일 이름 접두사
pub const SCORE_COUNTER_PREFIX: &str = "player_";

/// 스킵 카운터 파일 이름 접두사
pub const SKIP_COUNTER_PREFIX: &str = "skip_";

/// 불투명 소스 핸들 (플랫폼 창 ID)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceHandle(pub u32);

impl fmt::Display for SourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

/// 슬롯 상태
#[derive(Debug, Clone)]
pub struct SlotState {
    /// 바인딩된 소스 (없을 수 있음)
    pub handle: Option<SourceHandle>,
    /// 클리어 점수 (스킵 패널티로 음수 가능)
    pub score: i64,
    /// 스킵 횟수
    pub skips: u32,
    /// 마지막 클리어/스킵 감지 시각 (디바운스 기준)
    pub last_transition: Option<Instant>,
    /// 핸들 재할당 중에만 쓰는 임시 플래그
    pub valid: bool,
}

impl SlotState {
    /// 새 슬롯 상태 생성
    pub fn new(handle: Option<SourceHandle>, score: i64, skips: u32) -> Self {
        Self {
            handle,
            score,
            skips,
            last_transition: None,
            valid: false,
        }
    }

    /// 마지막 감지 이후 `interval`보다 오래 지났는지.
    /// 감지 이력이 없으면 항상 통과.
    pub fn debounce_elapsed(&self, now: Instant, interval: std::time::Duration) -> bool {
        match self.last_transition {
            Some(last) => now.saturating_duration_since(last) > interval,
            None => true,
        }
    }

    /// 상태 조회용 스냅샷
    pub fn snapshot(&self) -> SlotSnapshot {
        SlotSnapshot {
            handle: self.handle,
            score: self.score,
            skips: self.skips,
        }
    }
}

/// 슬롯 읽기 전용 스냅샷 (status 출력용)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSnapshot {
    pub handle: Option<SourceHandle>,
    pub score: i64,
    pub skips: u32,
}

/// 슬롯의 점수 카운터 이름 (예: "player_0")
pub fn score_counter_name(slot: usize) -> String {
    format!("{SCORE_COUNTER_PREFIX}{slot}")
}

/// 슬롯의 스킵 카운터 이름 (예: "skip_0")
pub fn skip_counter_name(slot: usize) -> String {
    format!("{SKIP_COUNTER_PREFIX}{slot}")
}
