//! Text rendering of the beam and ball.
//!
//! Each frame is a single line: the beam drawn as `=` across a fixed number
//! of columns, the ball as `o` at its position along the beam, and the beam
//! angle. Frames overwrite each other with a carriage return until
//! [`TextRenderer::finish`] ends the line.

use std::io::Write;

use crate::error::PhysicsError;
use crate::simulator::Simulator;

const DEFAULT_COLUMNS: usize = 61;

pub struct TextRenderer {
    columns: usize,
    out: Box<dyn Write + Send>,
    line_open: bool,
}

impl TextRenderer {
    #[must_use]
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
            out,
            line_open: false,
        }
    }

    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Builds the frame for the simulator's current state.
    #[must_use]
    pub fn frame(&self, sim: &Simulator) -> String {
        let mut cells = vec!['='; self.columns];
        let status = match sim.ball_on_beam() {
            Some(ball) if !ball.is_off_beam() => {
                let t = (ball.offset / ball.half_length + 1.0) * 0.5;
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let col = (t * (self.columns - 1) as f32).round() as usize;
                cells[col.min(self.columns - 1)] = 'o';
                "on beam"
            }
            Some(_) => "off beam",
            None => "no ball",
        };
        let beam: String = cells.into_iter().collect();
        format!(
            "[{beam}] θ={:+.3} rad  {status}",
            sim.actuator().angle
        )
    }

    /// Draws one frame.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::Render`] if the output cannot be written.
    pub fn draw(&mut self, sim: &Simulator) -> Result<(), PhysicsError> {
        let frame = self.frame(sim);
        write!(self.out, "\r{frame}").map_err(PhysicsError::Render)?;
        self.line_open = true;
        self.out.flush().map_err(PhysicsError::Render)
    }

    /// Terminates the frame line if one was drawn since the last call.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::Render`] if the output cannot be written.
    pub fn finish(&mut self) -> Result<(), PhysicsError> {
        if !self.line_open {
            return Ok(());
        }
        self.line_open = false;
        writeln!(self.out).map_err(PhysicsError::Render)?;
        self.out.flush().map_err(PhysicsError::Render)
    }
}
