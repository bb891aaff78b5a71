//! CLEARCOUNT 핵심 에러 타입.
//!
//! 모든 어댑터 crate는 이 타입을 그대로 반환한다.
//! 바이너리 최상위에서만 `anyhow`로 감싼다.

use thiserror::Error;

/// 코어 레이어 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// JSON 직렬화/역직렬화 실패
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 설정값 오류
    #[error("설정 에러: {0}")]
    Config(String),

    /// 필드 유효성 검증 실패
    #[error("유효성 검증 실패: {field}: {message}")]
    Validation {
        /// 검증 실패한 필드명
        field: String,
        /// 실패 사유
        message: String,
    },

    /// 슬롯 인덱스 범위 초과 (상태 변경 없음)
    #[error("잘못된 슬롯: {slot} (슬롯 수 {slot_count})")]
    InvalidSlot {
        /// 요청된 슬롯 인덱스
        slot: usize,
        /// 엔진의 슬롯 수
        slot_count: usize,
    },

    /// 프레임 캡처 실패 (일시적, 다음 사이클에 복구)
    #[error("캡처 실패: {0}")]
    CaptureFailed(String),

    /// 소스 탐색 실패
    #[error("소스 탐색 실패: {0}")]
    Discovery(String),

    /// 카운터 저장 실패
    #[error("카운터 저장 실패: {name}: {message}")]
    Persistence {
        /// 카운터 이름 (예: "player_0")
        name: String,
        /// 실패 사유
        message: String,
    },

    /// 내부 에러 (예상치 못한 상황)
    #[error("내부 에러: {0}")]
    Internal(String),

    /// I/O 에러
    #[error("I/O 에러: {0}")]
    Io(#[from] std::io::Error),
}
