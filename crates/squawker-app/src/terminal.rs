use std::io::{self, Write};

use tracing::warn;

use squawker_client::SquawkView;
use squawker_types::RowViewModel;

/// Prints each published list to stdout. With `redraw` set the screen is
/// cleared first so only the latest list is visible.
pub struct TerminalView {
    redraw: bool,
}

impl TerminalView {
    pub fn once() -> Self {
        Self { redraw: false }
    }

    pub fn live() -> Self {
        Self { redraw: true }
    }
}

impl SquawkView for TerminalView {
    fn show(&mut self, rows: &[RowViewModel]) {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        if self.redraw {
            // clear screen, cursor home
            let _ = write!(out, "\x1b[2J\x1b[H");
        }
        if let Err(e) = render_rows(rows, &mut out).and_then(|_| out.flush()) {
            warn!("Failed to draw squawk list: {}", e);
        }
    }
}

pub fn render_rows(rows: &[RowViewModel], out: &mut impl Write) -> io::Result<()> {
    if rows.is_empty() {
        writeln!(out, "No squawks yet. Follow someone with `squawker follow <author>`.")?;
        return Ok(());
    }

    for row in rows {
        writeln!(out, "[{}] {} {}", row.avatar, row.author, row.date_label)?;
        for line in row.message.lines() {
            writeln!(out, "    {}", line)?;
        }
        writeln!(out)?;
    }
    Ok(())
}
