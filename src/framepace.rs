use std::time::{Duration, Instant};

/// Frame timing for the interactive loop: a monotonic clock for the
/// scheduler, an FPS readout and an optional framerate cap.
pub struct FramePacer {
    epoch: Instant,
    instants: [Instant; 2],
    current: usize,
    target_framerate: Option<u32>,
}

impl FramePacer {
    pub fn new(target_framerate: Option<u32>) -> Self {
        let now = Instant::now();
        Self {
            epoch: now,
            instants: [now; 2],
            current: 0,
            target_framerate: target_framerate.filter(|&fps| fps > 0),
        }
    }

    /// Seconds since the pacer was created.
    pub fn now(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    pub fn frametime(&self) -> f32 {
        self.instants[self.current].elapsed().as_secs_f32()
    }

    pub fn framerate(&self) -> f32 {
        1.0 / self.frametime().max(f32::EPSILON)
    }

    pub fn target_framerate(&self) -> Option<u32> {
        self.target_framerate
    }

    pub fn begin_frame(&mut self) {
        self.instants[self.next()] = Instant::now();
    }

    pub fn end_frame(&mut self) {
        if let Some(fps) = self.target_framerate {
            const ACCURACY: f32 = 0.0001; // 100 microseconds
            let limit_frametime = 1.0 / fps as f32;
            let sleep_time = limit_frametime - self.frametime() - ACCURACY;

            if sleep_time > 0.0 {
                std::thread::sleep(Duration::from_secs_f32(sleep_time));

                while self.frametime() < limit_frametime {
                    std::thread::yield_now();
                }
            }
        }

        self.current = self.next();
    }

    fn next(&self) -> usize {
        (self.current + 1) % 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_framerate_is_uncapped() {
        assert_eq!(FramePacer::new(Some(0)).target_framerate(), None);
        assert_eq!(FramePacer::new(Some(30)).target_framerate(), Some(30));
    }

    #[test]
    fn clock_is_monotonic() {
        let pacer = FramePacer::new(None);
        let a = pacer.now();
        let b = pacer.now();
        assert!(b >= a);
        assert!(a >= 0.0);
    }

    #[test]
    fn capped_frame_takes_at_least_the_frame_budget() {
        let mut pacer = FramePacer::new(Some(200));
        pacer.begin_frame();
        let start = Instant::now();
        pacer.end_frame();
        assert!(start.elapsed() >= Duration::from_millis(4));
    }
}
