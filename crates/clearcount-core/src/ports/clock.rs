//! 단조 시계 포트.
//!
//! 디바운스 판정에 쓰이는 시각을 주입받아 테스트에서 시간을 제어한다.

use std::time::Instant;

/// 단조 시계
pub trait Clock: Send + Sync {
    /// 현재 시각
    fn now(&self) -> Instant;
}

/// 시스템 단조 시계
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}
