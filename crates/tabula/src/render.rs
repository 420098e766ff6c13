//! Printable area and tab-separated output

use crate::sheet::{CellView, Sheet};
use std::io::{self, Write};
use tabula_core::{Position, Size};

impl Sheet {
    /// Extent of the printable area
    ///
    /// The area always starts at A1 and reaches the highest populated row and
    /// column, so a sheet whose only cell is at (3, 5) prints 4 rows of 6
    /// columns. An empty sheet has size 0x0.
    pub fn printable_size(&self) -> Size {
        self.positions().fold(Size::new(0, 0), |size, pos| {
            Size::new(size.rows.max(pos.row + 1), size.cols.max(pos.col + 1))
        })
    }

    /// Write every cell value of the printable area
    pub fn render_values<W: Write>(&self, out: &mut W) -> io::Result<()> {
        self.render(out, |view, out| write!(out, "{}", view.value()))
    }

    /// Write every cell text of the printable area
    pub fn render_texts<W: Write>(&self, out: &mut W) -> io::Result<()> {
        self.render(out, |view, out| out.write_all(view.text().as_bytes()))
    }

    /// Rendered values as a string
    pub fn values_to_string(&self) -> String {
        let mut out = Vec::new();
        // Writing into a Vec cannot fail
        let _ = self.render_values(&mut out);
        String::from_utf8_lossy(&out).into_owned()
    }

    /// Rendered texts as a string
    pub fn texts_to_string(&self) -> String {
        let mut out = Vec::new();
        let _ = self.render_texts(&mut out);
        String::from_utf8_lossy(&out).into_owned()
    }

    fn render<W, F>(&self, out: &mut W, mut cell: F) -> io::Result<()>
    where
        W: Write,
        F: FnMut(CellView<'_>, &mut W) -> io::Result<()>,
    {
        let size = self.printable_size();
        if size.is_empty() {
            return Ok(());
        }

        for row in 0..size.rows {
            for col in 0..size.cols {
                if col > 0 {
                    out.write_all(b"\t")?;
                }
                if let Some(view) = self.view(Position::new(row, col)) {
                    cell(view, out)?;
                }
            }
            out.write_all(b"\n")?;
        }

        Ok(())
    }
}
