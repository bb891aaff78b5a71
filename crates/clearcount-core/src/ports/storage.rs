//! 카운터 저장 포트.
//!
//! 구현: `clearcount-storage` crate (텍스트 파일)

use crate::error::CoreError;

/// 이름 → 정수 카운터 저장소.
///
/// 호출자는 `persist` 실패를 로그만 남기고 무시한다 (메모리 값이 기준).
pub trait CounterStore: Send + Sync {
    /// 카운터 값 기록
    fn persist(&self, name: &str, value: i64) -> Result<(), CoreError>;

    /// 마지막으로 기록된 값. 기록이 없으면 `None`.
    fn load(&self, name: &str) -> Result<Option<i64>, CoreError>;
}
