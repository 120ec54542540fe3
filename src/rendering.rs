use std::f64::consts::TAU;
use std::io::{self, Write};

use crossterm::{
    cursor::MoveTo,
    execute,
    style::{ResetColor, SetBackgroundColor, SetForegroundColor},
};
use log::info;

use crate::types::{Rgb, Vector2D};

/// Drawing surface the game renders into once per frame.
pub trait Renderer {
    fn clear(&mut self, color: Rgb);
    fn draw_circle_outline(&mut self, center: Vector2D, radius: f64, color: Rgb, line_width: u16);
    fn draw_polygon_outline(&mut self, points: &[Vector2D], color: Rgb, line_width: u16);
    fn present(&mut self) -> io::Result<()>;
}

// --- ScreenBuffer for headless rendering ---
pub struct ScreenBuffer {
    pub buffer: Vec<Vec<char>>,
    pub width: u16,
    pub height: u16,
    pub cursor_x: u16,
    pub cursor_y: u16,
    pub log_frames: bool,
}

impl ScreenBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        ScreenBuffer {
            buffer: vec![vec![' '; width as usize]; height as usize],
            width,
            height,
            cursor_x: 0,
            cursor_y: 0,
            log_frames: false,
        }
    }

    pub fn move_to(&mut self, x: u16, y: u16) {
        self.cursor_x = x;
        self.cursor_y = y;
    }

    pub fn write_str(&mut self, s: &str) {
        for c in s.chars() {
            if self.cursor_y < self.height && self.cursor_x < self.width {
                self.buffer[self.cursor_y as usize][self.cursor_x as usize] = c;
            }
            self.cursor_x = self.cursor_x.saturating_add(1);
        }
    }

    pub fn row(&self, y: u16) -> String {
        self.buffer.get(y as usize).map(|row| row.iter().collect()).unwrap_or_default()
    }

    pub fn print_to_log(&self) {
        info!("--- Screen Buffer ---");
        for y in 0..self.height {
            info!("{}", self.row(y));
        }
        info!("---------------------");
    }
}

// --- OutputTarget enum to handle stdout or ScreenBuffer ---
pub enum OutputTarget {
    Stdout(io::Stdout),
    ScreenBuffer(ScreenBuffer),
}

impl OutputTarget {
    pub fn execute_move_to(&mut self, command: MoveTo) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => execute!(s, command),
            OutputTarget::ScreenBuffer(sb) => {
                sb.move_to(command.0, command.1);
                Ok(())
            }
        }
    }

    pub fn execute_other_command(&mut self, command: impl crossterm::Command) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => execute!(s, command),
            OutputTarget::ScreenBuffer(_) => Ok(()), // Headless buffers have no colors
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputTarget::Stdout(s) => s.write(buf),
            OutputTarget::ScreenBuffer(sb) => {
                sb.write_str(&String::from_utf8_lossy(buf));
                Ok(buf.len())
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => s.flush(),
            OutputTarget::ScreenBuffer(_) => Ok(()),
        }
    }
}

const CIRCLE_CHAR: char = 'o';
const EDGE_CHAR: char = '#';

/// Character grid that scales world coordinates onto terminal cells.
///
/// A cell is the only stroke width a terminal has, so `line_width` is
/// accepted for the contract but does not thicken lines.
pub struct TerminalCanvas {
    pub grid: Vec<Vec<char>>,
    pub columns: u16,
    pub rows: u16,
    world_width: f64,
    world_height: f64,
    background: Rgb,
    foreground: Rgb,
    target: OutputTarget,
}

impl TerminalCanvas {
    pub fn new(
        target: OutputTarget,
        columns: u16,
        rows: u16,
        world_width: f64,
        world_height: f64,
    ) -> Self {
        TerminalCanvas {
            grid: vec![vec![' '; columns as usize]; rows as usize],
            columns,
            rows,
            world_width,
            world_height,
            background: Rgb::BLACK,
            foreground: Rgb::WHITE,
            target,
        }
    }

    #[cfg(test)]
    pub fn target(&self) -> &OutputTarget {
        &self.target
    }

    fn cell_size(&self) -> (f64, f64) {
        (self.world_width / self.columns.max(1) as f64, self.world_height / self.rows.max(1) as f64)
    }

    /// World point to fractional cell coordinates.
    fn to_cell(&self, point: Vector2D) -> (f64, f64) {
        let (cell_w, cell_h) = self.cell_size();
        (point.x / cell_w, point.y / cell_h)
    }

    fn plot(&mut self, column: f64, row: f64, c: char) {
        let (x, y) = (column.floor(), row.floor());
        if x < 0.0 || y < 0.0 || x >= self.columns as f64 || y >= self.rows as f64 {
            return;
        }
        self.grid[y as usize][x as usize] = c;
    }

    fn draw_line(&mut self, from: Vector2D, to: Vector2D, c: char) {
        let (x0, y0) = self.to_cell(from);
        let (x1, y1) = self.to_cell(to);
        let steps = (x1 - x0).abs().max((y1 - y0).abs()).ceil().max(1.0);
        // Guard against absurd spans from far off-screen points.
        let steps = steps.min(4.0 * (self.columns as f64 + self.rows as f64)) as usize;
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            self.plot(x0 + (x1 - x0) * t, y0 + (y1 - y0) * t, c);
        }
    }

    fn set_colors(&mut self, background: Rgb, foreground: Rgb) {
        self.background = background;
        self.foreground = foreground;
    }
}

impl Renderer for TerminalCanvas {
    fn clear(&mut self, color: Rgb) {
        self.background = color;
        for row in &mut self.grid {
            row.fill(' ');
        }
    }

    fn draw_circle_outline(&mut self, center: Vector2D, radius: f64, color: Rgb, _line_width: u16) {
        self.set_colors(self.background, color);
        let (cell_w, cell_h) = self.cell_size();
        let radius_cells = (radius / cell_w).max(radius / cell_h);
        let samples = ((TAU * radius_cells * 2.0).ceil() as usize).clamp(8, 512);
        for i in 0..samples {
            let angle = TAU * i as f64 / samples as f64;
            let point = center.add(Vector2D::new(angle.cos(), angle.sin()).scale(radius));
            let (x, y) = self.to_cell(point);
            self.plot(x, y, CIRCLE_CHAR);
        }
    }

    fn draw_polygon_outline(&mut self, points: &[Vector2D], color: Rgb, _line_width: u16) {
        self.set_colors(self.background, color);
        for (i, &from) in points.iter().enumerate() {
            let to = points[(i + 1) % points.len()];
            self.draw_line(from, to, EDGE_CHAR);
        }
    }

    fn present(&mut self) -> io::Result<()> {
        self.target.execute_other_command(SetBackgroundColor(self.background.into()))?;
        self.target.execute_other_command(SetForegroundColor(self.foreground.into()))?;
        for y in 0..self.rows {
            self.target.execute_move_to(MoveTo(0, y))?;
            let line: String = self.grid[y as usize].iter().collect();
            write!(self.target, "{}", line)?;
        }
        self.target.execute_other_command(ResetColor)?;
        self.target.flush()?;

        if let OutputTarget::ScreenBuffer(sb) = &self.target {
            if sb.log_frames {
                sb.print_to_log();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headless(columns: u16, rows: u16) -> TerminalCanvas {
        let target = OutputTarget::ScreenBuffer(ScreenBuffer::new(columns, rows));
        TerminalCanvas::new(target, columns, rows, 100.0, 50.0)
    }

    fn screen(canvas: &TerminalCanvas) -> &ScreenBuffer {
        match canvas.target() {
            OutputTarget::ScreenBuffer(sb) => sb,
            OutputTarget::Stdout(_) => panic!("expected a screen buffer"),
        }
    }

    #[test]
    fn circle_outline_lands_on_the_scaled_grid() {
        // 10x10 world units per cell.
        let mut canvas = headless(10, 5);
        canvas.clear(Rgb::BLACK);
        canvas.draw_circle_outline(Vector2D::new(50.0, 25.0), 15.0, Rgb::WHITE, 2);

        // Rightmost and leftmost points of the circle.
        assert_eq!(canvas.grid[2][6], CIRCLE_CHAR);
        assert_eq!(canvas.grid[2][3], CIRCLE_CHAR);
        // Centre stays empty.
        assert_eq!(canvas.grid[2][5], ' ');
    }

    #[test]
    fn off_screen_shapes_are_clipped() {
        let mut canvas = headless(10, 5);
        canvas.draw_circle_outline(Vector2D::new(-200.0, -200.0), 20.0, Rgb::WHITE, 2);
        let segment = [Vector2D::new(-500.0, 0.0), Vector2D::new(-400.0, 10.0)];
        canvas.draw_polygon_outline(&segment, Rgb::WHITE, 2);
        assert!(canvas.grid.iter().flatten().all(|&c| c == ' '));
    }

    #[test]
    fn polygon_edges_are_closed() {
        let mut canvas = headless(10, 5);
        let square = [
            Vector2D::new(5.0, 5.0),
            Vector2D::new(95.0, 5.0),
            Vector2D::new(95.0, 45.0),
            Vector2D::new(5.0, 45.0),
        ];
        canvas.draw_polygon_outline(&square, Rgb::WHITE, 2);
        assert!(canvas.grid[0].iter().all(|&c| c == EDGE_CHAR));
        assert!(canvas.grid[4].iter().all(|&c| c == EDGE_CHAR));
        // Closing edge back to the first point.
        assert_eq!(canvas.grid[2][0], EDGE_CHAR);
        assert_eq!(canvas.grid[2][5], ' ');
    }

    #[test]
    fn present_copies_the_grid_into_the_screen_buffer() {
        let mut canvas = headless(10, 5);
        canvas.draw_circle_outline(Vector2D::new(50.0, 25.0), 15.0, Rgb::WHITE, 2);
        canvas.present().unwrap();
        assert_eq!(screen(&canvas).row(2), canvas.grid[2].iter().collect::<String>());

        canvas.clear(Rgb::BLACK);
        canvas.present().unwrap();
        assert_eq!(screen(&canvas).row(2), " ".repeat(10));
    }
}
