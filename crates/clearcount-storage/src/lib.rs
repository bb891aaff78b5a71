//! # clearcount-storage
//!
//! 카운터 저장소 어댑터.
//! 슬롯별 점수/스킵 수를 스트림 오버레이가 읽는 텍스트 파일로 기록한다.

pub mod counter_file;
