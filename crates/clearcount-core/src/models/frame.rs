//! 프레임 및 감지 영역 모델.
//!
//! 캡처된 창 이미지는 RGB 3채널 버퍼(`image::RgbImage`)로 다룬다.
//! 영역/색 범위/임계값은 설정 파일에서 그대로 역직렬화된다.

use image::RgbImage;
use serde::{Deserialize, Serialize};

/// 캡처 프레임 (height × width × 3)
pub type Frame = RgbImage;

/// 직사각형 영역 (픽셀 단위, 프레임 좌상단 기준)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// 프레임 크기에 맞게 잘라낸 영역. 겹치는 부분이 없으면 `None`.
    pub fn clip(&self, width: u32, height: u32) -> Option<Rect> {
        if self.x >= width || self.y >= height {
            return None;
        }
        let w = self.w.min(width - self.x);
        let h = self.h.min(height - self.y);
        if w == 0 || h == 0 {
            return None;
        }
        Some(Rect::new(self.x, self.y, w, h))
    }
}

/// 채널별 색 범위 (양 끝 포함)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorRange {
    /// 채널별 하한 (R, G, B)
    pub lower: [u8; 3],
    /// 채널별 상한 (R, G, B)
    pub upper: [u8; 3],
}

impl ColorRange {
    pub fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { lower, upper }
    }

    /// 모든 채널이 범위 안에 있는지
    #[inline]
    pub fn contains(&self, pixel: [u8; 3]) -> bool {
        (0..3).all(|c| self.lower[c] <= pixel[c] && pixel[c] <= self.upper[c])
    }

    /// 하한이 상한을 넘는 채널이 없는지
    pub fn is_well_formed(&self) -> bool {
        (0..3).all(|c| self.lower[c] <= self.upper[c])
    }
}

/// 감지 영역 프로파일: 영역 + 색 범위 + 일치 비율 임계값
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionProfile {
    /// 검사할 영역
    pub rect: Rect,
    /// 일치로 판정할 색 범위
    #[serde(flatten)]
    pub range: ColorRange,
    /// 일치 픽셀 비율 임계값 (0.0 ~ 1.0, 초과해야 일치)
    pub threshold: f32,
}
