/// Default palette cycled through by successive marker sets, so that each
/// experimental set is visually distinct without per-set configuration.
pub const MARKER_PALETTE: [[u8; 3]; 6] = [
    [255, 255, 255],
    [245, 66, 53],
    [232, 30, 99],
    [33, 149, 245],
    [76, 176, 79],
    [103, 56, 182],
];

/// Rotating palette cursor, owned by the orchestrator so that independent
/// playback runs start from the same color.
#[derive(Clone, Debug, Default)]
pub struct ColorCycle {
    next: usize,
}

impl ColorCycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_color(&mut self) -> [u8; 3] {
        let color = MARKER_PALETTE[self.next];
        self.next = (self.next + 1) % MARKER_PALETTE.len();
        color
    }
}
