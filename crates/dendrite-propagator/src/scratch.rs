//! Per-step scratch buffers shared between pipeline stages.
//!
//! [`StepScratch`] is allocated once per run and reset at the start of
//! every step, so the hot loop performs no allocation after the first
//! step. It carries the information that flows between propagators but
//! is not a per-cell field: the interface worklist, the cells captured
//! this step, the pending solute transfer, the diffusion back buffer, and
//! the step's maximum interface velocity.

/// Disjoint views used by growth kinetics, from
/// [`StepScratch::capture_buffers`].
pub struct CaptureBuffers<'a> {
    /// Interface worklist (read-only).
    pub interface_cells: &'a [usize],
    /// Cells captured this step.
    pub captured_cells: &'a mut Vec<usize>,
    /// Pending solute transfer.
    pub solute_transfer: &'a mut [f64],
}

/// Reusable per-step working memory.
#[derive(Clone, Debug)]
pub struct StepScratch {
    interface_cells: Vec<usize>,
    captured_cells: Vec<usize>,
    solute_transfer: Vec<f64>,
    back_buffer: Vec<f64>,
    max_velocity: f64,
}

impl StepScratch {
    /// Allocate buffers for a grid of `cell_count` cells.
    pub fn new(cell_count: usize) -> Self {
        Self {
            interface_cells: Vec::new(),
            captured_cells: Vec::new(),
            solute_transfer: vec![0.0; cell_count],
            back_buffer: vec![0.0; cell_count],
            max_velocity: 0.0,
        }
    }

    /// Clear all per-step outputs. Capacity is retained.
    pub fn reset(&mut self) {
        self.interface_cells.clear();
        self.captured_cells.clear();
        self.solute_transfer.fill(0.0);
        self.max_velocity = 0.0;
    }

    /// Interface cells of the current step, ascending by flat index.
    pub fn interface_cells(&self) -> &[usize] {
        &self.interface_cells
    }

    /// Mutable interface worklist, filled by the classifier.
    pub fn interface_cells_mut(&mut self) -> &mut Vec<usize> {
        &mut self.interface_cells
    }

    /// Cells captured during the current step.
    pub fn captured_cells(&self) -> &[usize] {
        &self.captured_cells
    }

    /// Mutable capture list, filled by growth kinetics.
    pub fn captured_cells_mut(&mut self) -> &mut Vec<usize> {
        &mut self.captured_cells
    }

    /// Pending per-cell concentration change from solute rejection.
    ///
    /// Entries sum to zero; the transport stage applies them before
    /// diffusing.
    pub fn solute_transfer(&self) -> &[f64] {
        &self.solute_transfer
    }

    /// Mutable solute transfer buffer.
    pub fn solute_transfer_mut(&mut self) -> &mut [f64] {
        &mut self.solute_transfer
    }

    /// Read the worklist while recording captures and solute transfer.
    pub fn capture_buffers(&mut self) -> CaptureBuffers<'_> {
        CaptureBuffers {
            interface_cells: &self.interface_cells,
            captured_cells: &mut self.captured_cells,
            solute_transfer: &mut self.solute_transfer,
        }
    }

    /// Split access to the transfer buffer (read) and the back buffer
    /// (write) for a double-buffered update.
    pub fn transfer_and_back_buffer(&mut self) -> (&[f64], &mut Vec<f64>) {
        (&self.solute_transfer, &mut self.back_buffer)
    }

    /// Largest interface velocity recorded this step.
    pub fn max_velocity(&self) -> f64 {
        self.max_velocity
    }

    /// Record the step's maximum interface velocity.
    pub fn set_max_velocity(&mut self, v: f64) {
        self.max_velocity = v;
    }
}
