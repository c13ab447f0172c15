// src/engine/fade.rs
//! Fade lifecycle state machine.
//!
//! Drives the global opacity through appearance and disappearance
//! transitions. A fade-out reaching zero opacity is terminal for the current
//! run; the engine halts and notifies the host.

use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FadeDirection {
    /// No transition in progress; opacity is stable.
    None,
    In,
    Out,
}

/// Outcome of advancing the fade for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FadeTick {
    /// No transition running; opacity unchanged.
    Steady,
    /// A transition is in progress.
    Fading,
    /// The fade-out just reached zero opacity. Terminal for this run.
    Finished,
}

#[derive(Debug)]
pub struct Fade {
    direction: FadeDirection,
    opacity: f32,
    started: Option<Instant>,
    /// Opacity captured when the current fade-out began. A stop arriving
    /// mid fade-in continues downward from wherever the opacity was.
    from: f32,
}

impl Fade {
    pub fn new() -> Self {
        Self {
            direction: FadeDirection::None,
            opacity: 0.0,
            started: None,
            from: 0.0,
        }
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn direction(&self) -> FadeDirection {
        self.direction
    }

    /// Begin fading in from fully transparent.
    pub fn begin_in(&mut self, now: Instant) {
        self.direction = FadeDirection::In;
        self.started = Some(now);
        self.opacity = 0.0;
    }

    /// Begin fading out from the current opacity, whatever it is.
    pub fn begin_out(&mut self, now: Instant) {
        self.from = self.opacity;
        self.direction = FadeDirection::Out;
        self.started = Some(now);
    }

    /// Advance the transition to `now`. Opacity moves along a cubic
    /// ease-out curve and always stays within `[0, 1]`.
    pub fn advance(&mut self, now: Instant, duration: Duration) -> FadeTick {
        let Some(started) = self.started else {
            return FadeTick::Steady;
        };
        if self.direction == FadeDirection::None {
            return FadeTick::Steady;
        }

        let elapsed = now.saturating_duration_since(started);
        let progress = if duration.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f32() / duration.as_secs_f32()).clamp(0.0, 1.0)
        };
        let eased = ease_out(progress);

        match self.direction {
            FadeDirection::In => {
                self.opacity = eased;
                if progress >= 1.0 {
                    self.opacity = 1.0;
                    self.direction = FadeDirection::None;
                }
                FadeTick::Fading
            }
            FadeDirection::Out => {
                self.opacity = self.from * (1.0 - eased);
                if progress >= 1.0 {
                    self.opacity = 0.0;
                    self.direction = FadeDirection::None;
                    FadeTick::Finished
                } else {
                    FadeTick::Fading
                }
            }
            FadeDirection::None => FadeTick::Steady,
        }
    }
}

/// Cubic ease-out: fast start, settles gently near completion.
fn ease_out(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DURATION: Duration = Duration::from_millis(300);

    fn at(base: Instant, ms: u64) -> Instant {
        base + Duration::from_millis(ms)
    }

    #[test]
    fn fade_in_is_monotonic_and_bounded() {
        let base = Instant::now();
        let mut fade = Fade::new();
        fade.begin_in(base);

        let mut previous = fade.opacity();
        for ms in (0..=300).step_by(10) {
            fade.advance(at(base, ms), DURATION);
            let opacity = fade.opacity();
            assert!((0.0..=1.0).contains(&opacity));
            assert!(opacity >= previous, "opacity regressed during fade-in");
            previous = opacity;
        }
        assert_eq!(fade.opacity(), 1.0);
        assert_eq!(fade.direction(), FadeDirection::None);
    }

    #[test]
    fn fade_out_is_monotonic_and_terminal() {
        let base = Instant::now();
        let mut fade = Fade::new();
        fade.begin_in(base);
        fade.advance(at(base, 300), DURATION);

        fade.begin_out(at(base, 1000));
        let mut previous = fade.opacity();
        let mut finished = false;
        for ms in (1000..=1300).step_by(10) {
            let tick = fade.advance(at(base, ms), DURATION);
            let opacity = fade.opacity();
            assert!((0.0..=1.0).contains(&opacity));
            assert!(opacity <= previous, "opacity rose during fade-out");
            previous = opacity;
            if tick == FadeTick::Finished {
                finished = true;
            }
        }
        assert!(finished);
        assert_eq!(fade.opacity(), 0.0);
    }

    #[test]
    fn stop_mid_fade_in_continues_from_current_opacity() {
        let base = Instant::now();
        let mut fade = Fade::new();
        fade.begin_in(base);

        // Halfway through the fade-in
        fade.advance(at(base, 150), DURATION);
        let mid = fade.opacity();
        assert!(mid > 0.0 && mid < 1.0);

        fade.begin_out(at(base, 150));
        assert_eq!(fade.direction(), FadeDirection::Out);

        // Immediately after the stop the opacity is still where it was,
        // not reset to 1 first.
        fade.advance(at(base, 150), DURATION);
        assert!((fade.opacity() - mid).abs() < 1e-6);

        fade.advance(at(base, 160), DURATION);
        assert!(fade.opacity() <= mid);
    }

    #[test]
    fn idle_fade_reports_steady() {
        let base = Instant::now();
        let mut fade = Fade::new();
        assert_eq!(fade.advance(base, DURATION), FadeTick::Steady);
        assert_eq!(fade.opacity(), 0.0);
    }

    #[test]
    fn completed_fade_in_holds_at_full_opacity() {
        let base = Instant::now();
        let mut fade = Fade::new();
        fade.begin_in(base);
        fade.advance(at(base, 400), DURATION);
        assert_eq!(fade.advance(at(base, 800), DURATION), FadeTick::Steady);
        assert_eq!(fade.opacity(), 1.0);
    }
}
