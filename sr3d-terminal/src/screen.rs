//! Terminal pixel surface using half-block cells.

use std::io::{stdout, Write};

use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    QueueableCommand,
};
use sr3d_core::{FrameBuffer, Rgb, Screen, ScreenError};

/// Presents an RGB buffer in the terminal. Each cell shows two vertically
/// stacked pixels through the upper half block, so one terminal row
/// carries two pixel rows.
pub struct TermScreen {
    width: usize,
    height: usize,
}

impl TermScreen {
    /// Surface covering `cols` x `rows` terminal cells, i.e. a pixel
    /// buffer of `cols` x `rows * 2`.
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            width: cols as usize,
            height: rows as usize * 2,
        }
    }
}

fn cell_color(pixel: Rgb) -> Color {
    Color::Rgb {
        r: pixel[0],
        g: pixel[1],
        b: pixel[2],
    }
}

impl Screen for TermScreen {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn draw(&mut self, buffer: &FrameBuffer) -> Result<(), ScreenError> {
        if buffer.width() != self.width || buffer.height() != self.height {
            return Err(ScreenError::DimensionMismatch {
                buffer_width: buffer.width(),
                buffer_height: buffer.height(),
                screen_width: self.width,
                screen_height: self.height,
            });
        }

        let mut out = stdout();
        out.queue(cursor::MoveTo(0, 0))?;
        for y in (0..self.height).step_by(2) {
            for x in 0..self.width {
                let upper = buffer.get(x, y);
                let lower = if y + 1 < self.height {
                    buffer.get(x, y + 1)
                } else {
                    [0, 0, 0]
                };
                out.queue(SetForegroundColor(cell_color(upper)))?;
                out.queue(SetBackgroundColor(cell_color(lower)))?;
                out.queue(Print('\u{2580}'))?;
            }
            // Raw mode needs the explicit carriage return; skip the break
            // after the bottom row so the screen does not scroll.
            if y + 2 < self.height {
                out.queue(Print("\r\n"))?;
            }
        }
        out.queue(ResetColor)?;
        out.flush()?;
        Ok(())
    }
}
