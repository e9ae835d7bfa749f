use tokio::sync::{mpsc, watch};

use squawker_types::RowViewModel;

/// Where a refreshed list ends up. Each call replaces the whole list.
pub trait SquawkView: Send + 'static {
    fn show(&mut self, rows: &[RowViewModel]);
}

impl SquawkView for watch::Sender<Vec<RowViewModel>> {
    fn show(&mut self, rows: &[RowViewModel]) {
        self.send_replace(rows.to_vec());
    }
}

/// Every published list is queued; nothing is coalesced.
impl SquawkView for mpsc::UnboundedSender<Vec<RowViewModel>> {
    fn show(&mut self, rows: &[RowViewModel]) {
        let _ = self.send(rows.to_vec());
    }
}
