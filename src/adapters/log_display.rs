//! Log-backed display adapter.
//!
//! Implements [`DisplayPort`] by writing each laid-out line to the logger.
//! A panel driver would implement the same trait and draw the lines.

use log::info;

use crate::app::ports::DisplayPort;
use crate::display::DisplayLines;

#[derive(Default)]
pub struct LogDisplay {
    frames: u32,
}

impl LogDisplay {
    pub fn new() -> Self {
        Self { frames: 0 }
    }

    /// Number of frames rendered since boot.
    pub fn frames(&self) -> u32 {
        self.frames
    }
}

impl DisplayPort for LogDisplay {
    fn render(&mut self, lines: &DisplayLines) {
        self.frames = self.frames.wrapping_add(1);
        info!("DISP  | frame {}", self.frames);
        for line in lines {
            info!("DISP  | {}", line);
        }
    }
}
