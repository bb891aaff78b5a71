//! CLEARCOUNT 도메인 모델.
//!
//! 캡처 프레임/영역 기하 정보와 슬롯(감시 대상 창) 상태를 정의한다.

pub mod frame;
pub mod slot;
