use crate::shared::frame::Frame;

/// Result of asking a [`FrameSource`] for the next frame.
#[derive(Debug)]
pub enum Acquisition {
    Frame(Frame),
    /// No frame this tick. The session skips the tick and carries on.
    Unavailable,
    /// A finite source has nothing left. Live devices never report this.
    EndOfStream,
}

/// Delivers frames one at a time, in arrival order.
pub trait FrameSource: Send {
    fn acquire(&mut self) -> Acquisition;

    /// Releases any resources held by the source.
    fn close(&mut self);
}
