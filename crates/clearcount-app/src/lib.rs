//! # clearcount-app
//!
//! 폴링 엔진, 컨트롤러, 재시작 감독, 콘솔 명령 프로토콜.
//! 바이너리(`main.rs`)는 여기 구성 요소를 플랫폼 어댑터와 조립만 한다.

pub mod command;
pub mod controller;
pub mod engine;
pub mod supervisor;
