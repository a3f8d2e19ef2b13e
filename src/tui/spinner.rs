use crate::app::SPINNER_FRAME_COUNT;

const FRAMES: [char; SPINNER_FRAME_COUNT] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Braille frame for a tick counter; any index is accepted.
pub fn frame(idx: usize) -> char {
    FRAMES[idx % FRAMES.len()]
}
