//! Polyline of a single flight.
//!
//! A trajectory only grows: segments are appended in time order while the
//! rocket flies and the whole path is dropped when the next flight starts.

use bevy::math::DVec2;

use crate::physics::Segment;
use crate::types::RocketState;

/// Ordered segments of one flight.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Trajectory {
    segments: Vec<Segment>,
}

impl Trajectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a segment.
    ///
    /// The segment must start where the previous one ended.
    pub fn push(&mut self, segment: Segment) {
        debug_assert!(
            self.segments
                .last()
                .is_none_or(|last| last.end.time <= segment.start.time),
            "segments must be appended in time order"
        );
        self.segments.push(segment);
    }

    pub(crate) fn clear(&mut self) {
        self.segments.clear();
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Vertices of the polyline: the start point followed by every segment end.
    pub fn points(&self) -> impl Iterator<Item = DVec2> + '_ {
        self.segments
            .first()
            .map(|first| first.start.pos)
            .into_iter()
            .chain(self.segments.iter().map(|s| s.end.pos))
    }

    /// State at the end of the last segment.
    pub fn last_state(&self) -> Option<&RocketState> {
        self.segments.last().map(|s| &s.end)
    }

    pub fn start_time(&self) -> Option<f64> {
        self.segments.first().map(|s| s.start.time)
    }

    pub fn end_time(&self) -> Option<f64> {
        self.segments.last().map(|s| s.end.time)
    }

    /// Simulated time covered by the flight.
    pub fn duration(&self) -> f64 {
        match (self.start_time(), self.end_time()) {
            (Some(start), Some(end)) => end - start,
            _ => 0.0,
        }
    }

    /// Distance flown along the polyline.
    pub fn length(&self) -> f64 {
        self.segments.iter().map(Segment::length).sum()
    }

    /// Sum of the curvature errors of all segments.
    pub fn cumulative_error(&self) -> f64 {
        self.segments.iter().map(|s| s.error).sum()
    }

    pub fn mean_error(&self) -> f64 {
        if self.segments.is_empty() {
            0.0
        } else {
            self.cumulative_error() / self.segments.len() as f64
        }
    }

    /// Rocket position at `time`, or `None` outside the flight.
    pub fn position_at(&self, time: f64) -> Option<DVec2> {
        let (start, end) = (self.start_time()?, self.end_time()?);
        if !(start..=end).contains(&time) {
            return None;
        }
        // First segment ending at or after `time`
        let index = self
            .segments
            .partition_point(|s| s.end.time < time)
            .min(self.segments.len() - 1);
        Some(self.segments[index].position_at(time))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn segment(t0: f64, t1: f64, x0: f64, x1: f64, error: f64) -> Segment {
        Segment {
            start: RocketState {
                distance: x0,
                ..RocketState::in_flight(DVec2::new(x0, 0.0), DVec2::X, t0)
            },
            end: RocketState {
                distance: x1,
                ..RocketState::in_flight(DVec2::new(x1, 0.0), DVec2::X, t1)
            },
            dt: t1 - t0,
            error,
        }
    }

    fn sample() -> Trajectory {
        let mut trajectory = Trajectory::new();
        trajectory.push(segment(1.0, 2.0, 0.0, 1.0, 0.1));
        trajectory.push(segment(2.0, 4.0, 1.0, 5.0, 0.3));
        trajectory.push(segment(4.0, 5.0, 5.0, 6.0, 0.2));
        trajectory
    }

    #[test]
    fn test_empty_trajectory() {
        let trajectory = Trajectory::new();
        assert!(trajectory.is_empty());
        assert_eq!(trajectory.points().count(), 0);
        assert_eq!(trajectory.position_at(0.0), None);
        assert_eq!(trajectory.duration(), 0.0);
        assert_eq!(trajectory.mean_error(), 0.0);
    }

    #[test]
    fn test_summary_queries() {
        let trajectory = sample();
        assert_eq!(trajectory.len(), 3);
        assert_eq!(trajectory.start_time(), Some(1.0));
        assert_eq!(trajectory.end_time(), Some(5.0));
        assert_relative_eq!(trajectory.duration(), 4.0);
        assert_relative_eq!(trajectory.length(), 6.0);
        assert_relative_eq!(trajectory.cumulative_error(), 0.6);
        assert_relative_eq!(trajectory.mean_error(), 0.2);
        assert_eq!(trajectory.last_state().map(|s| s.pos.x), Some(6.0));
    }

    #[test]
    fn test_points_include_start() {
        let xs: Vec<f64> = sample().points().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 1.0, 5.0, 6.0]);
    }

    #[test]
    fn test_position_at_segment_times() {
        let trajectory = sample();
        for segment in trajectory.segments() {
            assert_eq!(trajectory.position_at(segment.start.time), Some(segment.start.pos));
            assert_eq!(trajectory.position_at(segment.end.time), Some(segment.end.pos));
        }
    }

    #[test]
    fn test_position_at_interpolates() {
        let trajectory = sample();
        let pos = trajectory.position_at(3.0).unwrap();
        assert_relative_eq!(pos.x, 3.0);
        let pos = trajectory.position_at(4.5).unwrap();
        assert_relative_eq!(pos.x, 5.5);
    }

    #[test]
    fn test_position_outside_flight() {
        let trajectory = sample();
        assert_eq!(trajectory.position_at(0.5), None);
        assert_eq!(trajectory.position_at(5.5), None);
    }

    #[test]
    fn test_clear() {
        let mut trajectory = sample();
        assert_eq!(trajectory.len(), 3);

        trajectory.clear();
        assert!(trajectory.is_empty());
        assert_eq!(trajectory.end_time(), None);
        assert_eq!(trajectory.length(), 0.0);
    }
}
