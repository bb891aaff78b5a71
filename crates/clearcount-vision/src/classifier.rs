//! 영역 색상 분류기.
//!
//! 프레임의 고정 영역을 잘라 채널별 색 범위 마스크를 만들고,
//! 범위 안 픽셀 비율이 임계값을 넘는지 판정한다.
//! 순수 함수: 부작용 없음, 같은 프레임이면 항상 같은 결과.

use clearcount_core::models::frame::{ColorRange, Frame, Rect, RegionProfile};

/// RGB 채널 수
const CHANNELS: usize = 3;

/// 영역 안에서 색 범위에 드는 픽셀 비율 (0.0 ~ 1.0).
///
/// 영역은 프레임 경계에 맞게 잘린다. 겹치는 부분이 없으면 `None`.
pub fn match_ratio(frame: &Frame, rect: Rect, range: &ColorRange) -> Option<f32> {
    let clipped = rect.clip(frame.width(), frame.height())?;

    // 행 단위 바이트 슬라이스 직접 접근 (get_pixel() 생략)
    let raw = frame.as_raw();
    let stride = frame.width() as usize * CHANNELS;
    let x0 = clipped.x as usize * CHANNELS;
    let x1 = x0 + clipped.w as usize * CHANNELS;

    let mut matched = 0u64;
    for y in clipped.y..clipped.y + clipped.h {
        let row = y as usize * stride;
        matched += raw[row + x0..row + x1]
            .chunks_exact(CHANNELS)
            .filter(|px| range.contains([px[0], px[1], px[2]]))
            .count() as u64;
    }

    let total = clipped.w as u64 * clipped.h as u64;
    Some(matched as f32 / total as f32)
}

/// 영역 일치 판정.
///
/// 프레임이 없거나 영역이 비어 있으면 `false` (에러 없음).
/// 일치 비율이 `threshold`를 **초과**해야 `true`.
pub fn matches(frame: Option<&Frame>, rect: Rect, range: &ColorRange, threshold: f32) -> bool {
    let Some(frame) = frame else {
        return false;
    };

    match match_ratio(frame, rect, range) {
        Some(ratio) => ratio > threshold,
        None => false,
    }
}

/// 프로파일 단위 영역 일치 판정
pub fn profile_matches(frame: Option<&Frame>, profile: &RegionProfile) -> bool {
    matches(frame, profile.rect, &profile.range, profile.threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    const RED: ColorRange = ColorRange {
        lower: [200, 0, 0],
        upper: [255, 50, 50],
    };

    /// 왼쪽 `red_cols` 열만 빨간색인 프레임
    fn half_red(width: u32, height: u32, red_cols: u32) -> Frame {
        Frame::from_fn(width, height, |x, _| {
            if x < red_cols {
                Rgb([230, 10, 10])
            } else {
                Rgb([20, 20, 20])
            }
        })
    }

    #[test]
    fn ratio_counts_in_range_pixels() {
        let frame = half_red(10, 10, 4);
        let ratio = match_ratio(&frame, Rect::new(0, 0, 10, 10), &RED).unwrap();
        assert!((ratio - 0.4).abs() < 1e-6);
    }

    #[test]
    fn ratio_only_looks_inside_region() {
        let frame = half_red(10, 10, 4);
        let ratio = match_ratio(&frame, Rect::new(0, 2, 4, 3), &RED).unwrap();
        assert_eq!(ratio, 1.0);

        let ratio = match_ratio(&frame, Rect::new(4, 0, 6, 10), &RED).unwrap();
        assert_eq!(ratio, 0.0);
    }

    #[test]
    fn threshold_is_strict() {
        let frame = half_red(10, 10, 5);
        let rect = Rect::new(0, 0, 10, 10);
        assert!(!matches(Some(&frame), rect, &RED, 0.5));
        assert!(matches(Some(&frame), rect, &RED, 0.49));
    }

    #[test]
    fn missing_frame_never_matches() {
        assert!(!matches(None, Rect::new(0, 0, 10, 10), &RED, 0.0));
    }

    #[test]
    fn region_outside_frame_never_matches() {
        let frame = half_red(10, 10, 10);
        assert!(!matches(Some(&frame), Rect::new(20, 20, 5, 5), &RED, 0.0));
        assert!(match_ratio(&frame, Rect::new(20, 20, 5, 5), &RED).is_none());
    }

    #[test]
    fn region_is_clipped_to_frame() {
        // 오른쪽으로 넘치는 영역 → 프레임 안쪽 5열만 계산
        let frame = half_red(10, 4, 10);
        let ratio = match_ratio(&frame, Rect::new(5, 0, 100, 4), &RED).unwrap();
        assert_eq!(ratio, 1.0);
    }

    #[test]
    fn empty_frame_never_matches() {
        let frame = Frame::new(0, 0);
        assert!(!matches(Some(&frame), Rect::new(0, 0, 1, 1), &RED, 0.0));
    }

    #[test]
    fn profile_wrapper_uses_profile_fields() {
        let frame = half_red(10, 10, 8);
        let profile = RegionProfile {
            rect: Rect::new(0, 0, 10, 10),
            range: RED,
            threshold: 0.75,
        };
        assert!(profile_matches(Some(&frame), &profile));
    }
}
