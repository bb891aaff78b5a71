//! 창 캡처.
//!
//! xcap 기반 개별 창 캡처. `FrameSource` 포트 구현.

use clearcount_core::error::CoreError;
use clearcount_core::models::frame::Frame;
use clearcount_core::models::slot::SourceHandle;
use clearcount_core::ports::capture::FrameSource;
use image::DynamicImage;
use tracing::debug;
use xcap::Window;

/// 창 캡처: xcap 기반
pub struct WindowCapture;

impl WindowCapture {
    /// 새 캡처 인스턴스 생성
    pub fn new() -> Self {
        Self
    }

    /// 핸들(창 ID)에 해당하는 창 조회
    fn find_window(handle: SourceHandle) -> Result<Window, CoreError> {
        let windows = Window::all()
            .map_err(|e| CoreError::CaptureFailed(format!("창 목록 조회 실패: {e}")))?;

        windows
            .into_iter()
            .find(|w| w.id().map(|id| id == handle.0).unwrap_or(false))
            .ok_or_else(|| CoreError::CaptureFailed(format!("창 {handle} 없음 (닫힘)")))
    }
}

impl Default for WindowCapture {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for WindowCapture {
    fn capture(&self, handle: SourceHandle) -> Result<Frame, CoreError> {
        let window = Self::find_window(handle)?;

        if window.is_minimized().unwrap_or(false) {
            return Err(CoreError::CaptureFailed(format!("창 {handle} 최소화됨")));
        }

        let image = window
            .capture_image()
            .map_err(|e| CoreError::CaptureFailed(format!("창 {handle} 캡처 실패: {e}")))?;

        debug!("창 캡처 완료: {handle} {}x{}", image.width(), image.height());

        // 알파 채널 제거 (RGBA → RGB)
        Ok(DynamicImage::ImageRgba8(image).to_rgb8())
    }
}
