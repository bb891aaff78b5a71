//! 프레임 캡처 포트.
//!
//! 구현: `clearcount-vision` crate (xcap)

use crate::error::CoreError;
use crate::models::frame::Frame;
use crate::models::slot::SourceHandle;

/// 소스 핸들로 창 이미지를 캡처
pub trait FrameSource: Send + Sync {
    /// 창 하나를 RGB 프레임으로 캡처.
    ///
    /// 핸들이 더 이상 유효하지 않으면 `CoreError::CaptureFailed`.
    fn capture(&self, handle: SourceHandle) -> Result<Frame, CoreError>;
}
