use crate::Slot;

/// Per-frame state threaded into every pass: the frame counter, the
/// ping-pong flag selecting which slot of double-buffered resources is
/// written this frame, and whether history must be treated as undefined.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameContext {
    frame: u64,
    ping_pong: bool,
    first_frame: bool,
}

impl FrameContext {
    pub fn new(frame: u64, ping_pong: bool, first_frame: bool) -> Self {
        Self {
            frame,
            ping_pong,
            first_frame,
        }
    }

    /// Returns the context of the very first frame.
    pub fn first() -> Self {
        Self::new(0, false, true)
    }

    /// Moves onto the next frame, toggling the ping-pong flag.
    pub fn advance(&mut self) {
        *self = self.next();
    }

    pub fn next(self) -> Self {
        Self {
            frame: self.frame + 1,
            ping_pong: !self.ping_pong,
            first_frame: false,
        }
    }

    /// Makes the next rendered frame discard all history, e.g. after a
    /// camera cut.
    pub fn reset(&mut self) {
        self.first_frame = true;
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Returns the frame counter as seen by shaders.
    pub fn num_frames(&self) -> u32 {
        self.frame as u32
    }

    pub fn ping_pong(&self) -> bool {
        self.ping_pong
    }

    pub fn is_first_frame(&self) -> bool {
        self.first_frame
    }

    /// Returns whether bind groups should use their alternate (`b`) variant.
    pub fn is_alternate(&self) -> bool {
        self.ping_pong
    }

    /// Slot written by this frame.
    pub fn curr_slot(&self) -> Slot {
        Slot::from_ping_pong(self.ping_pong)
    }

    /// Slot written by the previous frame, read by this one.
    pub fn prev_slot(&self) -> Slot {
        self.curr_slot().other()
    }
}

impl Default for FrameContext {
    fn default() -> Self {
        Self::first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_alternate() {
        let mut ctx = FrameContext::first();

        for _ in 0..10 {
            let curr = ctx.curr_slot();

            assert_ne!(curr, ctx.prev_slot());

            ctx.advance();

            assert_eq!(curr, ctx.prev_slot());
        }

        assert_eq!(10, ctx.frame());
        assert!(!ctx.is_first_frame());
    }

    #[test]
    fn reset() {
        let mut ctx = FrameContext::first().next();

        ctx.reset();

        assert!(ctx.is_first_frame());
        assert_eq!(1, ctx.frame());
        assert!(!ctx.next().is_first_frame());
    }
}
