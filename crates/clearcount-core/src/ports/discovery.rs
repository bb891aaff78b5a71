//! 소스(창) 탐색 포트.
//!
//! 구현: `clearcount-monitor` crate (sysinfo + xcap)

use crate::error::CoreError;
use crate::models::slot::SourceHandle;

/// 프로세스 이름으로 감시 대상 창 핸들을 탐색
pub trait SourceDiscovery: Send + Sync {
    /// 현재 유효한 핸들 목록. 순서는 운영체제 열거 순서를 따르며 보장되지 않는다.
    fn enumerate(&self, process_name: &str) -> Result<Vec<SourceHandle>, CoreError>;

    /// 핸들의 표시용 이름 (창 제목). 찾을 수 없으면 `None`.
    fn describe(&self, handle: SourceHandle) -> Option<String>;
}
