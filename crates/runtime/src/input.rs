/// Sequence number of a discrete input event (pointer move, click, toggle).
///
/// This is the timebase of the controller: every transition runs to completion
/// within one input, so the sequence is enough to order and replay them.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InputSeq {
    /// 0-based input index.
    pub index: u64,
}

impl InputSeq {
    pub fn new(index: u64) -> Self {
        Self { index }
    }

    pub fn next(self) -> Self {
        Self::new(self.index + 1)
    }
}
