//! 코스 상태 감지기.
//!
//! 세 영역(코스 클리어 배너, 일시정지 메뉴, 코스 나가기 버튼)을
//! 각각의 색 범위/임계값으로 판정해 프레임 하나를 분류한다.

use clearcount_core::config::RegionsConfig;
use clearcount_core::models::frame::{Frame, RegionProfile};
use tracing::trace;

use crate::classifier::profile_matches;

/// 프레임 분류 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// 코스 클리어 화면
    CourseClear,
    /// 일시정지 메뉴에서 "코스 나가기" 선택 중 (스킵)
    CourseExit,
    /// 해당 없음
    Nothing,
}

/// 코스 상태 감지기
#[derive(Debug, Clone)]
pub struct CourseDetector {
    course_clear: RegionProfile,
    pause_menu: RegionProfile,
    exit_course: RegionProfile,
}

impl CourseDetector {
    /// 설정의 영역 프로파일로 감지기 생성
    pub fn new(regions: &RegionsConfig) -> Self {
        Self {
            course_clear: regions.course_clear,
            pause_menu: regions.pause_menu,
            exit_course: regions.exit_course,
        }
    }

    /// 코스 클리어 배너가 보이는지
    pub fn course_cleared(&self, frame: &Frame) -> bool {
        profile_matches(Some(frame), &self.course_clear)
    }

    /// 일시정지 메뉴와 코스 나가기 버튼이 동시에 보이는지
    pub fn course_exited(&self, frame: &Frame) -> bool {
        profile_matches(Some(frame), &self.pause_menu)
            && profile_matches(Some(frame), &self.exit_course)
    }

    /// 프레임 분류. 코스 클리어가 보이면 스킵 판정은 하지 않는다.
    pub fn observe(&self, frame: &Frame) -> Observation {
        let observation = if self.course_cleared(frame) {
            Observation::CourseClear
        } else if self.course_exited(frame) {
            Observation::CourseExit
        } else {
            Observation::Nothing
        };
        trace!("프레임 분류: {:?}", observation);
        observation
    }
}
