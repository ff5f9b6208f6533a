pub mod oled;

use chrono::Local;
use tracing::trace;

use crate::render::face::Face;
use crate::render::frame::Frame;
use crate::render::layout::layout_lines;

/// A physical panel that can take one full-frame repaint.
pub trait DisplayDevice {
    fn draw(&mut self, frame: &Frame) -> anyhow::Result<()>;
}

/// What the poll loop talks to when a screen is attached.
pub trait StatusSink {
    fn render(&mut self, status: &str) -> anyhow::Result<()>;
}

/// Two-line status screen: the current time on top, a caller-supplied
/// status string below. Every call repaints from scratch.
pub struct StatusScreen<D> {
    device: D,
    face: Face,
    width: u32,
    height: u32,
}

impl<D: DisplayDevice> StatusScreen<D> {
    pub fn new(device: D, face: Face, width: u32, height: u32) -> Self {
        StatusScreen {
            device,
            face,
            width,
            height,
        }
    }
}

impl<D: DisplayDevice> StatusSink for StatusScreen<D> {
    fn render(&mut self, status: &str) -> anyhow::Result<()> {
        let lines = [
            Local::now().format("%d %b, %H:%M:%S").to_string(),
            status.to_string(),
        ];

        let mut frame = Frame::new(self.width, self.height);
        let anchors = layout_lines(&self.face, &lines);
        for (line, anchor) in lines.iter().zip(anchors) {
            trace!(line = %line, ?anchor, "drawing line");
            self.face.draw_line(&mut frame, line, anchor);
        }

        self.device.draw(&frame)
    }
}
