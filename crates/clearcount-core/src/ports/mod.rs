//! 포트 인터페이스 (trait).
//!
//! Hexagonal Architecture의 포트 레이어.
//! 각 어댑터 crate가 이 trait들을 구현하며,
//! `clearcount-app`에서 `Arc<dyn T>`로 와이어링한다.
//!
//! 폴링 엔진은 전용 스레드에서 블로킹으로 동작하므로
//! 모든 포트는 동기 trait이다.

pub mod capture;
pub mod clock;
pub mod discovery;
pub mod listener;
pub mod storage;
