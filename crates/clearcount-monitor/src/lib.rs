//! # clearcount-monitor
//!
//! 소스 탐색 어댑터.
//! 실행 중인 프로세스 중 이름이 일치하는 것을 찾고(sysinfo),
//! 각 프로세스가 소유한 창 하나를 감시 대상 핸들로 반환한다(xcap).

pub mod process;
