//! 프로세스 기반 창 탐색.
//!
//! `SourceDiscovery` 포트 구현.

use clearcount_core::error::CoreError;
use clearcount_core::models::slot::SourceHandle;
use clearcount_core::ports::discovery::SourceDiscovery;
use std::collections::HashSet;
use std::sync::Mutex;
use sysinfo::System;
use tracing::debug;
use xcap::Window;

/// 탐색용 창 요약 (소유 프로세스, 창 ID)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowEntry {
    pub pid: u32,
    pub id: u32,
}

/// 창 탐색기: `SourceDiscovery` 포트 구현
pub struct WindowDiscovery {
    sys: Mutex<System>,
}

impl WindowDiscovery {
    /// 새 창 탐색기 생성
    pub fn new() -> Self {
        Self {
            sys: Mutex::new(System::new()),
        }
    }

    /// 이름이 일치하는 프로세스 PID 목록 (PID 오름차순)
    fn matching_pids(&self, process_name: &str) -> Result<Vec<u32>, CoreError> {
        let mut sys = self
            .sys
            .lock()
            .map_err(|e| CoreError::Internal(format!("시스템 잠금 실패: {e}")))?;
        sys.refresh_processes(sysinfo::ProcessesToUpdate::All, true);

        let mut pids: Vec<u32> = sys
            .processes()
            .values()
            .filter(|p| process_name_matches(&p.name().to_string_lossy(), process_name))
            .map(|p| p.pid().as_u32())
            .collect();
        pids.sort_unstable();
        Ok(pids)
    }

    /// 현재 표시 중인 (최소화되지 않은) 창 목록
    fn visible_windows() -> Result<Vec<WindowEntry>, CoreError> {
        let windows =
            Window::all().map_err(|e| CoreError::Discovery(format!("창 목록 조회 실패: {e}")))?;

        Ok(windows
            .iter()
            .filter(|w| !w.is_minimized().unwrap_or(true))
            .filter_map(|w| {
                Some(WindowEntry {
                    pid: w.pid().ok()?,
                    id: w.id().ok()?,
                })
            })
            .collect())
    }
}

impl Default for WindowDiscovery {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceDiscovery for WindowDiscovery {
    fn enumerate(&self, process_name: &str) -> Result<Vec<SourceHandle>, CoreError> {
        let pids = self.matching_pids(process_name)?;
        if pids.is_empty() {
            debug!("'{process_name}' 프로세스 없음");
            return Ok(Vec::new());
        }

        let windows = Self::visible_windows()?;
        let handles = first_window_per_process(&pids, &windows);

        debug!(
            "'{process_name}' 프로세스 {}개, 창 {}개 탐색",
            pids.len(),
            handles.len()
        );
        Ok(handles)
    }

    fn describe(&self, handle: SourceHandle) -> Option<String> {
        Window::all()
            .ok()?
            .into_iter()
            .find(|w| w.id().map(|id| id == handle.0).unwrap_or(false))
            .and_then(|w| w.title().ok())
    }
}

/// 프로세스 이름 비교: 대소문자 무시, `.exe` 확장자 유무 무시
pub fn process_name_matches(candidate: &str, wanted: &str) -> bool {
    fn stem(name: &str) -> String {
        let lower = name.trim().to_lowercase();
        match lower.strip_suffix(".exe") {
            Some(s) => s.to_string(),
            None => lower,
        }
    }

    !wanted.trim().is_empty() && stem(candidate) == stem(wanted)
}

/// 프로세스마다 첫 번째 창 하나씩, 프로세스 순서대로.
///
/// 창이 없는 프로세스는 건너뛴다.
pub fn first_window_per_process(pids: &[u32], windows: &[WindowEntry]) -> Vec<SourceHandle> {
    let mut seen: HashSet<u32> = HashSet::new();

    pids.iter()
        .filter(|pid| seen.insert(**pid))
        .filter_map(|pid| windows.iter().find(|w| w.pid == *pid))
        .map(|w| SourceHandle(w.id))
        .collect()
}
