//! # Animation Lifecycle
//!
//! An animation has no stored state enum. Its state at any instant is
//! derived from three timestamps:
//!
//! ```text
//!   played            paused             stopped / played + duration*repeats
//!     │                  │                    │
//! ────┼──────────────────┼────────────────────┼─────────► time
//! Scheduled │  Playing   │      Paused        │  Stopped
//! ```
//!
//! `play()`, `pause()` and `stop()` are plain timestamp writes, so calling
//! them out of order still lands in one of the four states.

use tessera_core::Nanoseconds;

use super::flags::AnimationFlags;

/// Lifecycle state of an animation at a given time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimationState {
    /// `played` is still in the future.
    Scheduled,
    /// Running and not paused.
    Playing,
    /// Paused before all repeats finished. Progress is frozen at the pause.
    Paused,
    /// Stopped explicitly or all repeats finished.
    Stopped,
}

/// Timing fields of a single animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Animation {
    duration: Nanoseconds,
    played: Nanoseconds,
    paused: Nanoseconds,
    stopped: Nanoseconds,
    repeat_count: u32,
    flags: AnimationFlags,
}

impl Animation {
    /// Creates an animation played at `played`, never paused or stopped.
    ///
    /// # Arguments
    ///
    /// * `played` - Time the first repeat starts
    /// * `duration` - Length of one repeat, must be positive
    /// * `repeat_count` - Number of repeats, `0` repeats forever
    /// * `flags` - Behavior flags
    ///
    /// # Panics
    ///
    /// Panics if `duration` is not positive.
    #[must_use]
    pub fn new(
        played: Nanoseconds,
        duration: Nanoseconds,
        repeat_count: u32,
        flags: AnimationFlags,
    ) -> Self {
        assert!(
            duration > Nanoseconds::ZERO,
            "Animation::new(): expected a positive duration, got {duration}"
        );
        Self {
            duration,
            played,
            paused: Nanoseconds::MAX,
            stopped: Nanoseconds::MAX,
            repeat_count,
            flags,
        }
    }

    /// Length of one repeat.
    #[inline]
    #[must_use]
    pub const fn duration(&self) -> Nanoseconds {
        self.duration
    }

    /// Time the animation was played, adjusted for time spent paused.
    #[inline]
    #[must_use]
    pub const fn played(&self) -> Nanoseconds {
        self.played
    }

    /// Time the animation was paused, [`Nanoseconds::MAX`] if never.
    #[inline]
    #[must_use]
    pub const fn paused(&self) -> Nanoseconds {
        self.paused
    }

    /// Time the animation was stopped, [`Nanoseconds::MAX`] if never.
    #[inline]
    #[must_use]
    pub const fn stopped(&self) -> Nanoseconds {
        self.stopped
    }

    /// Number of repeats, `0` for infinite.
    #[inline]
    #[must_use]
    pub const fn repeat_count(&self) -> u32 {
        self.repeat_count
    }

    /// Behavior flags.
    #[inline]
    #[must_use]
    pub const fn flags(&self) -> AnimationFlags {
        self.flags
    }

    pub(crate) fn set_repeat_count(&mut self, repeat_count: u32) {
        self.repeat_count = repeat_count;
    }

    pub(crate) fn set_flags(&mut self, flags: AnimationFlags) {
        self.flags = flags;
    }

    /// State at `now`. See [`state_of()`].
    #[inline]
    #[must_use]
    pub fn state(&self, now: Nanoseconds) -> AnimationState {
        state_of(self, now)
    }

    /// Progress at `now`. See [`factor()`].
    #[inline]
    #[must_use]
    pub fn factor(&self, now: Nanoseconds) -> f32 {
        factor(self, now, state_of(self, now))
    }

    /// Plays the animation at `at`.
    ///
    /// If the animation is paused at `at`, playback resumes where it was
    /// paused. Otherwise it restarts from the beginning at `at`. Any pending
    /// pause or stop is cleared.
    pub fn play(&mut self, at: Nanoseconds) {
        if state_of(self, at) == AnimationState::Paused {
            let elapsed = self.paused.max(self.played) - self.played;
            self.played = at - elapsed;
        } else {
            self.played = at;
        }
        self.paused = Nanoseconds::MAX;
        self.stopped = Nanoseconds::MAX;
    }

    /// Pauses the animation at `at`.
    pub fn pause(&mut self, at: Nanoseconds) {
        self.paused = at;
    }

    /// Stops the animation at `at`.
    ///
    /// A stop time at or before `played` predates the play and is ignored.
    pub fn stop(&mut self, at: Nanoseconds) {
        self.stopped = at;
    }
}

/// Computes the lifecycle state of `animation` at `now`.
///
/// - `played > now` is [`Scheduled`](AnimationState::Scheduled).
/// - Not yet stopped and repeats not exhausted at `min(paused, now)` is
///   [`Playing`](AnimationState::Playing) if `paused > now`, otherwise
///   [`Paused`](AnimationState::Paused).
/// - Everything else is [`Stopped`](AnimationState::Stopped).
///
/// A `stopped` time at or before `played` is treated as never stopped.
/// The result never regresses as `now` increases.
#[must_use]
pub fn state_of(animation: &Animation, now: Nanoseconds) -> AnimationState {
    if animation.played > now {
        return AnimationState::Scheduled;
    }

    let stopped = if animation.stopped <= animation.played {
        Nanoseconds::MAX
    } else {
        animation.stopped
    };

    // Wide arithmetic so long durations times large repeat counts can't overflow
    let repeats_left = animation.repeat_count == 0 || {
        let end = i128::from(animation.played.as_nanos())
            + i128::from(animation.duration.as_nanos()) * i128::from(animation.repeat_count);
        end > i128::from(animation.paused.min(now).as_nanos())
    };

    if stopped > now && repeats_left {
        if animation.paused > now {
            AnimationState::Playing
        } else {
            AnimationState::Paused
        }
    } else {
        AnimationState::Stopped
    }
}

/// Computes the progress of `animation` within its current repeat.
///
/// `state` is expected to be `state_of(animation, now)`.
///
/// - [`Scheduled`](AnimationState::Scheduled) is exactly `0.0`.
/// - [`Playing`](AnimationState::Playing) is `((now - played) mod duration) / duration`.
/// - [`Paused`](AnimationState::Paused) is the same evaluated at the pause time.
/// - [`Stopped`](AnimationState::Stopped) is exactly `1.0`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn factor(animation: &Animation, now: Nanoseconds, state: AnimationState) -> f32 {
    let at = match state {
        AnimationState::Scheduled => return 0.0,
        AnimationState::Stopped => return 1.0,
        AnimationState::Playing => now,
        // A pause placed before `played` freezes progress at the start
        AnimationState::Paused => animation.paused.max(animation.played),
    };

    let elapsed = i128::from(at.as_nanos()) - i128::from(animation.played.as_nanos());
    let duration = i128::from(animation.duration.as_nanos());
    let within = elapsed.rem_euclid(duration);
    (within as f64 / duration as f64) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn secs(secs: f64) -> Nanoseconds {
        Nanoseconds::from_secs_f64(secs)
    }

    fn one_shot() -> Animation {
        Animation::new(Nanoseconds::ZERO, secs(1.0), 1, AnimationFlags::empty())
    }

    #[test]
    fn test_playing_from_played_instant() {
        let animation = one_shot();
        assert_eq!(animation.state(Nanoseconds::ZERO), AnimationState::Playing);
        assert_eq!(animation.factor(Nanoseconds::ZERO), 0.0);
        assert!((animation.factor(secs(0.5)) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_scheduled_before_played() {
        let animation = Animation::new(secs(2.0), secs(1.0), 1, AnimationFlags::empty());
        assert_eq!(animation.state(secs(1.0)), AnimationState::Scheduled);
        assert_eq!(animation.factor(secs(1.0)), 0.0);
    }

    #[test]
    fn test_stopped_after_last_repeat() {
        let animation = Animation::new(Nanoseconds::ZERO, secs(1.0), 3, AnimationFlags::empty());
        assert_eq!(animation.state(secs(2.999)), AnimationState::Playing);
        assert_eq!(animation.state(secs(3.0)), AnimationState::Stopped);
        assert_eq!(animation.factor(secs(3.0)), 1.0);
    }

    #[test]
    fn test_factor_wraps_per_repeat() {
        let animation = Animation::new(Nanoseconds::ZERO, secs(1.0), 0, AnimationFlags::empty());
        assert_eq!(animation.state(secs(1000.25)), AnimationState::Playing);
        assert!((animation.factor(secs(1000.25)) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_pause_freezes_factor() {
        let mut animation = one_shot();
        animation.pause(secs(0.3));
        assert_eq!(animation.state(secs(0.2)), AnimationState::Playing);
        assert_eq!(animation.state(secs(0.3)), AnimationState::Paused);
        assert!((animation.factor(secs(0.9)) - 0.3).abs() < 1e-6);
        // Still paused long after the original end
        assert_eq!(animation.state(secs(50.0)), AnimationState::Paused);
    }

    #[test]
    fn test_pause_after_end_is_stopped() {
        let mut animation = one_shot();
        animation.pause(secs(1.5));
        assert_eq!(animation.state(secs(2.0)), AnimationState::Stopped);
    }

    #[test]
    fn test_resume_preserves_progress() {
        let mut animation = one_shot();
        animation.play(Nanoseconds::ZERO);
        animation.pause(secs(0.3));
        animation.play(secs(1.0));
        assert_eq!(animation.played(), secs(0.7));
        assert_eq!(animation.paused(), Nanoseconds::MAX);
        assert_eq!(animation.state(secs(1.0)), AnimationState::Playing);
        assert!((animation.factor(secs(1.0)) - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_second_play_without_pause_restarts() {
        let mut animation = one_shot();
        animation.play(secs(0.4));
        animation.play(secs(0.6));
        assert_eq!(animation.played(), secs(0.6));
        assert_eq!(animation.factor(secs(0.6)), 0.0);
    }

    #[test]
    fn test_play_after_stop_restarts() {
        let mut animation = one_shot();
        animation.stop(secs(0.5));
        assert_eq!(animation.state(secs(0.5)), AnimationState::Stopped);
        animation.play(secs(2.0));
        assert_eq!(animation.state(secs(2.5)), AnimationState::Playing);
        assert!((animation.factor(secs(2.5)) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_stop_before_played_is_ignored() {
        let mut animation = Animation::new(secs(2.0), secs(1.0), 1, AnimationFlags::empty());
        animation.stop(secs(1.0));
        assert_eq!(animation.state(secs(2.5)), AnimationState::Playing);
    }

    #[test]
    fn test_future_stop_schedules_stop() {
        let mut animation =
            Animation::new(Nanoseconds::ZERO, secs(1.0), 0, AnimationFlags::empty());
        animation.stop(secs(5.0));
        assert_eq!(animation.state(secs(4.9)), AnimationState::Playing);
        assert_eq!(animation.state(secs(5.0)), AnimationState::Stopped);
    }

    #[test]
    fn test_pause_before_played_freezes_at_start() {
        let mut animation = Animation::new(secs(1.0), secs(1.0), 1, AnimationFlags::empty());
        animation.pause(secs(0.5));
        assert_eq!(animation.state(secs(1.5)), AnimationState::Paused);
        assert_eq!(animation.factor(secs(1.5)), 0.0);
    }

    #[test]
    #[should_panic(expected = "expected a positive duration")]
    fn test_zero_duration_panics() {
        let _ = Animation::new(Nanoseconds::ZERO, Nanoseconds::ZERO, 1, AnimationFlags::empty());
    }

    fn rank(state: AnimationState) -> u8 {
        match state {
            AnimationState::Scheduled => 0,
            AnimationState::Playing => 1,
            AnimationState::Paused => 2,
            AnimationState::Stopped => 3,
        }
    }

    prop_compose! {
        fn arb_animation()(
            played in -1_000i64..1_000,
            duration in 1i64..500,
            repeat_count in 0u32..4,
            paused in proptest::option::of(-1_000i64..3_000),
            stopped in proptest::option::of(-1_000i64..3_000),
        ) -> Animation {
            let mut animation = Animation::new(
                Nanoseconds::new(played),
                Nanoseconds::new(duration),
                repeat_count,
                AnimationFlags::empty(),
            );
            if let Some(paused) = paused {
                animation.pause(Nanoseconds::new(paused));
            }
            if let Some(stopped) = stopped {
                animation.stop(Nanoseconds::new(stopped));
            }
            animation
        }
    }

    proptest! {
        #[test]
        fn state_never_regresses(
            animation in arb_animation(),
            start in -2_000i64..4_000,
            steps in 1usize..60,
        ) {
            let mut previous = animation.state(Nanoseconds::new(start));
            for step in 1..=steps {
                let now = Nanoseconds::new(start + step as i64 * 37);
                let state = animation.state(now);
                prop_assert!(rank(state) >= rank(previous), "{:?} -> {:?}", previous, state);
                previous = state;
            }
        }

        #[test]
        fn factor_within_bounds(animation in arb_animation(), now in -2_000i64..4_000) {
            let now = Nanoseconds::new(now);
            let state = animation.state(now);
            let factor = animation.factor(now);
            prop_assert!((0.0..=1.0).contains(&factor));
            match state {
                AnimationState::Scheduled => prop_assert_eq!(factor, 0.0),
                AnimationState::Stopped => prop_assert_eq!(factor, 1.0),
                AnimationState::Playing | AnimationState::Paused => {}
            }
        }
    }
}
