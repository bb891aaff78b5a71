//! 콘솔 명령 프로토콜.
//!
//! 한 줄 입력을 `Command`로 파싱한다. 명령 목록은 `COMMANDS` 테이블 하나로 관리하며
//! `help` 출력도 이 테이블에서 만든다.

use std::fmt::Write as _;
use std::str::FromStr;
use thiserror::Error;

/// 명령 정의 (이름, 사용법, 설명)
#[derive(Debug, Clone, Copy)]
pub struct CommandSpec {
    pub name: &'static str,
    pub usage: &'static str,
    pub description: &'static str,
}

/// 지원 명령 테이블 (help 출력 순서)
pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "start",
        usage: "start",
        description: "Start the counter.",
    },
    CommandSpec {
        name: "stop",
        usage: "stop",
        description: "Stop the counter.",
    },
    CommandSpec {
        name: "reset",
        usage: "reset",
        description: "Restart the counter with fresh values.",
    },
    CommandSpec {
        name: "refresh",
        usage: "refresh",
        description: "Rebind players to currently open windows.",
    },
    CommandSpec {
        name: "set",
        usage: "set <player> <score>",
        description: "Set the clear count of a player.",
    },
    CommandSpec {
        name: "skip",
        usage: "skip <player> <count>",
        description: "Set the skip count of a player.",
    },
    CommandSpec {
        name: "swap",
        usage: "swap <player> <player>",
        description: "Swap the windows of two players.",
    },
    CommandSpec {
        name: "status",
        usage: "status",
        description: "Show counter state and player windows.",
    },
    CommandSpec {
        name: "quit",
        usage: "quit",
        description: "Stop the counter and exit.",
    },
    CommandSpec {
        name: "help",
        usage: "help",
        description: "Show this list.",
    },
];

/// 콘솔 명령
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    Reset,
    Refresh,
    Set { slot: usize, score: i64 },
    Skip { slot: usize, skips: u32 },
    Swap { left: usize, right: usize },
    Status,
    Quit,
    Help,
}

/// 명령 파싱 에러
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Empty input. Type 'help' for list of commands.")]
    Empty,

    #[error("Invalid input '{0}'. Type 'help' for list of commands.")]
    Unknown(String),

    #[error("Invalid arguments. Usage: {usage}")]
    InvalidArguments { usage: &'static str },
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let lowered = line.trim().to_lowercase();
        let mut words = lowered.split_whitespace();
        let name = words.next().ok_or(CommandError::Empty)?;
        let args: Vec<&str> = words.collect();

        let spec = COMMANDS
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| CommandError::Unknown(name.to_string()))?;
        let invalid = || CommandError::InvalidArguments { usage: spec.usage };

        match (spec.name, args.as_slice()) {
            ("start", []) => Ok(Command::Start),
            ("stop", []) => Ok(Command::Stop),
            ("reset", []) => Ok(Command::Reset),
            ("refresh", []) => Ok(Command::Refresh),
            ("status", []) => Ok(Command::Status),
            ("quit", []) => Ok(Command::Quit),
            ("help", []) => Ok(Command::Help),
            ("set", [slot, score]) => Ok(Command::Set {
                slot: slot.parse().map_err(|_| invalid())?,
                score: score.parse().map_err(|_| invalid())?,
            }),
            ("skip", [slot, skips]) => Ok(Command::Skip {
                slot: slot.parse().map_err(|_| invalid())?,
                skips: skips.parse().map_err(|_| invalid())?,
            }),
            ("swap", [left, right]) => Ok(Command::Swap {
                left: left.parse().map_err(|_| invalid())?,
                right: right.parse().map_err(|_| invalid())?,
            }),
            _ => Err(invalid()),
        }
    }
}

/// `help` 출력 본문
pub fn help_text() -> String {
    let width = COMMANDS.iter().map(|c| c.usage.len()).max().unwrap_or(0);
    let mut out = String::from("Commands ----------------");
    for spec in COMMANDS {
        let _ = write!(out, "\n  {:<width$}  {}", spec.usage, spec.description);
    }
    out
}
