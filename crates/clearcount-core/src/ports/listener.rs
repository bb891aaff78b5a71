//! 엔진 장애 통지 포트.
//!
//! 엔진 전체가 더 이상 동작할 수 없을 때만 호출된다.
//! 사이클 단위 실패(캡처 실패 등)는 통지하지 않는다.

use std::fmt;

/// 엔진 치명적 장애
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineFault {
    /// 생성 시 소스 핸들을 찾지 못한 슬롯이 있음
    UnresolvedSource { slot: usize },
    /// 폴링 루프가 예기치 않게 종료됨
    LoopExited(String),
}

impl fmt::Display for EngineFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineFault::UnresolvedSource { slot } => {
                write!(f, "슬롯 {slot}의 소스 창을 찾을 수 없음")
            }
            EngineFault::LoopExited(reason) => write!(f, "폴링 루프 비정상 종료: {reason}"),
        }
    }
}

/// 엔진 장애 수신자 (재시작 정책 담당)
pub trait EngineListener: Send + Sync {
    /// 엔진 장애 통지. `generation`은 장애가 난 엔진 인스턴스 번호.
    ///
    /// 폴링 스레드에서 호출되므로 블로킹 작업을 하지 않아야 한다.
    fn on_engine_fault(&self, generation: u64, fault: EngineFault);
}
