//! # clearcount-vision
//!
//! 영역 색상 판정 크레이트.
//! 창 캡처, 고정 영역 색 범위 비율 판정, 코스 클리어/스킵 화면 분류를 담당한다.

pub mod capture;
pub mod classifier;
pub mod detector;
