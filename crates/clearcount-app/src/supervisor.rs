//! 엔진 재시작 감독.
//!
//! 엔진 장애 통지를 채널로 받아, 지연 후 컨트롤러를 통해 새 엔진으로 교체한다.
//! `stop`/`quit`으로 엔진이 없어지거나 이미 교체된 엔진의 통지는 무시된다.

use clearcount_core::ports::listener::{EngineFault, EngineListener};
use crossbeam::channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{error, info};

use crate::controller::Controller;

/// 장애 통지 메시지
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultNotice {
    pub generation: u64,
    pub fault: EngineFault,
}

/// 채널 기반 `EngineListener`: 폴링 스레드에서 블로킹 없이 전달만 한다
#[derive(Debug, Clone)]
pub struct ChannelListener {
    tx: Sender<FaultNotice>,
}

impl EngineListener for ChannelListener {
    fn on_engine_fault(&self, generation: u64, fault: EngineFault) {
        error!("엔진 #{generation} 장애: {fault}");
        if self.tx.send(FaultNotice { generation, fault }).is_err() {
            error!("재시작 감독이 종료되어 장애 통지 전달 불가");
        }
    }
}

/// 장애 통지 채널 생성
pub fn fault_channel() -> (ChannelListener, Receiver<FaultNotice>) {
    let (tx, rx) = unbounded();
    (ChannelListener { tx }, rx)
}

/// 재시작 감독
pub struct Supervisor {
    controller: Arc<Mutex<Controller>>,
    rx: Receiver<FaultNotice>,
}

impl Supervisor {
    pub fn new(controller: Arc<Mutex<Controller>>, rx: Receiver<FaultNotice>) -> Self {
        Self { controller, rx }
    }

    /// 통지 하나 처리. 콘솔에 출력할 메시지들을 반환.
    ///
    /// 지연 대기 중에는 컨트롤러 잠금을 잡지 않는다.
    pub fn handle(&self, notice: &FaultNotice) -> Vec<String> {
        let delay = {
            let controller = self.controller.lock();
            if controller.current_generation() != Some(notice.generation) {
                return Vec::new();
            }
            controller.restart_delay()
        };

        let mut messages = vec![format!(
            "Counter error, attempting to restart in {:.1} seconds...",
            delay.as_secs_f64()
        )];

        thread::sleep(delay);

        if let Some(message) = self.controller.lock().restart_after_fault(notice.generation) {
            messages.push(message);
        }
        messages
    }

    /// 채널이 닫힐 때까지 통지 처리
    pub fn run(self, mut output: impl FnMut(&str)) {
        info!("재시작 감독 시작");
        for notice in self.rx.iter() {
            for message in self.handle(&notice) {
                output(&message);
            }
        }
        info!("재시작 감독 종료");
    }

    /// 별도 스레드에서 실행 (출력은 stdout)
    pub fn spawn(self) -> std::io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("clearcount-supervisor".to_string())
            .spawn(move || self.run(|message| println!("{message}\n")))
    }
}
