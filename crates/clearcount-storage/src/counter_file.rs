//! 텍스트 파일 카운터 저장소.
//!
//! 카운터 하나당 파일 하나: `<base_dir>/<name>.txt`, 내용은 10진수 값만.
//! 오버레이가 반쯤 쓰인 파일을 읽지 않도록 임시 파일에 쓴 뒤 rename 한다.

use clearcount_core::error::CoreError;
use clearcount_core::ports::storage::CounterStore;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 카운터 파일 확장자
const COUNTER_EXTENSION: &str = "txt";

/// 텍스트 파일 카운터 저장소: `CounterStore` 포트 구현
#[derive(Debug, Clone)]
pub struct FileCounterStore {
    /// 카운터 파일 디렉토리
    base_dir: PathBuf,
}

impl FileCounterStore {
    /// 새 저장소 생성 (디렉토리가 없으면 생성)
    pub fn new(base_dir: PathBuf) -> Result<Self, CoreError> {
        fs::create_dir_all(&base_dir).map_err(|e| CoreError::Persistence {
            name: base_dir.display().to_string(),
            message: format!("카운터 디렉토리 생성 실패: {e}"),
        })?;

        info!("카운터 저장소 초기화: {}", base_dir.display());
        Ok(Self { base_dir })
    }

    /// 카운터 디렉토리
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// 카운터 파일 경로
    pub fn counter_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(format!("{name}.{COUNTER_EXTENSION}"))
    }
}

impl CounterStore for FileCounterStore {
    fn persist(&self, name: &str, value: i64) -> Result<(), CoreError> {
        let path = self.counter_path(name);
        let tmp_path = self.base_dir.join(format!(".{name}.{COUNTER_EXTENSION}.tmp"));

        let to_err = |e: std::io::Error| CoreError::Persistence {
            name: name.to_string(),
            message: e.to_string(),
        };

        fs::write(&tmp_path, value.to_string()).map_err(to_err)?;
        fs::rename(&tmp_path, &path).map_err(to_err)?;

        debug!("카운터 기록: {name} = {value}");
        Ok(())
    }

    fn load(&self, name: &str) -> Result<Option<i64>, CoreError> {
        let path = self.counter_path(name);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(CoreError::Persistence {
                    name: name.to_string(),
                    message: e.to_string(),
                })
            }
        };

        content
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|e| CoreError::Persistence {
                name: name.to_string(),
                message: format!("숫자가 아님 '{}': {e}", content.trim()),
            })
    }
}
