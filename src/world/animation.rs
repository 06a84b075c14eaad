use crate::world::texture::TextureId;

/// Shortest frame delay accepted by `Animation::new`.
const MIN_DELAY: f32 = 1e-3;

/// One frame of a flip-book animation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    pub tex: TextureId,
    pub delay: f32, // seconds this frame stays up
}

/// Flip-book over bank textures.
///
/// Time only moves when the owner calls [`Animation::advance`], so the same
/// sequence replays identically under the fixed-rate sim.
#[derive(Clone, Debug, PartialEq)]
pub struct Animation {
    frames: Vec<Frame>,
    repeat: bool,
    pointer: usize,
    elapsed: f32,
}

impl Animation {
    /// A single frame that never changes.
    pub fn still(tex: TextureId) -> Self {
        Self {
            frames: vec![Frame {
                tex,
                delay: f32::INFINITY,
            }],
            repeat: false,
            pointer: 0,
            elapsed: 0.0,
        }
    }

    /// Frames with individual delays.  An empty list degrades to a still
    /// of the fallback texture.
    pub fn new(frames: Vec<Frame>, repeat: bool) -> Self {
        if frames.is_empty() {
            return Self::still(crate::world::texture::NO_TEXTURE);
        }
        let frames = frames
            .into_iter()
            .map(|f| Frame {
                delay: f.delay.max(MIN_DELAY),
                ..f
            })
            .collect();
        Self {
            frames,
            repeat,
            pointer: 0,
            elapsed: 0.0,
        }
    }

    /// Evenly timed frames at `fps` frames per second.
    pub fn with_fps(textures: &[TextureId], fps: f32, repeat: bool) -> Self {
        let delay = if fps > 0.0 { 1.0 / fps } else { f32::INFINITY };
        Self::new(
            textures.iter().map(|&tex| Frame { tex, delay }).collect(),
            repeat,
        )
    }

    #[inline]
    pub fn current(&self) -> TextureId {
        self.frames[self.pointer].tex
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Move the clock forward by `dt` seconds, stepping over as many frames
    /// as the elapsed time covers.  A non-repeating animation holds its last
    /// frame.
    pub fn advance(&mut self, dt: f32) {
        if self.finished() {
            return;
        }
        self.elapsed += dt;
        while self.elapsed >= self.frames[self.pointer].delay {
            self.elapsed -= self.frames[self.pointer].delay;
            if self.pointer + 1 < self.frames.len() {
                self.pointer += 1;
            } else if self.repeat {
                self.pointer = 0;
            } else {
                self.elapsed = 0.0;
                break;
            }
        }
    }

    pub fn reset(&mut self) {
        self.pointer = 0;
        self.elapsed = 0.0;
    }

    /// True once a non-repeating animation sits on its last frame.
    pub fn finished(&self) -> bool {
        !self.repeat && self.pointer == self.frames.len() - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeats_and_wraps() {
        let mut a = Animation::with_fps(&[1, 2, 3], 10.0, true);
        assert_eq!(a.current(), 1);
        a.advance(0.15);
        assert_eq!(a.current(), 2);
        a.advance(0.2);
        assert_eq!(a.current(), 1);
    }

    #[test]
    fn non_repeating_holds_last_frame() {
        let mut a = Animation::with_fps(&[4, 5], 2.0, false);
        a.advance(10.0);
        assert_eq!(a.current(), 5);
        assert!(a.finished());
        a.reset();
        assert_eq!(a.current(), 4);
        assert!(!a.finished());
    }

    #[test]
    fn still_never_moves() {
        let mut a = Animation::still(9);
        a.advance(1e6);
        assert_eq!(a.current(), 9);
    }

    #[test]
    fn per_frame_delays() {
        let frames = vec![
            Frame { tex: 1, delay: 0.5 },
            Frame { tex: 2, delay: 0.1 },
        ];
        let mut a = Animation::new(frames, true);
        a.advance(0.4);
        assert_eq!(a.current(), 1);
        a.advance(0.15);
        assert_eq!(a.current(), 2);
    }
}
