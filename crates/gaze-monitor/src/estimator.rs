//! Gaze deviation estimation
//!
//! Pure per-frame geometry: eye centers from the two selected eye regions,
//! compared horizontally against a pixel threshold. Temporal behavior
//! (hysteresis, persistence under missing evidence) lives in the state
//! machine, not here.

use detection::Region;

/// Center point of an eye region, in frame pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeCenter {
    pub x: f32,
    pub y: f32,
}

impl From<&Region> for EyeCenter {
    fn from(region: &Region) -> Self {
        let (x, y) = region.center();
        Self { x, y }
    }
}

/// Pick the (left, right) eye candidates from a detection batch.
///
/// Positional heuristic: sort ascending by x and take the two smallest.
/// This is not an identity classification — with spurious candidates or
/// non-level eyes the assignment can be wrong, and that failure mode is
/// kept as-is rather than papered over with tracking.
pub fn select_eye_pair(candidates: &[Region]) -> Option<(Region, Region)> {
    if candidates.len() < 2 {
        return None;
    }
    let mut sorted: Vec<Region> = candidates.to_vec();
    sorted.sort_by_key(|r| r.x);
    Some((sorted[0], sorted[1]))
}

/// Per-frame deviation estimator
#[derive(Debug, Clone)]
pub struct GazeEstimator {
    threshold_px: f32,
}

impl GazeEstimator {
    pub fn new(threshold_px: f32) -> Self {
        Self { threshold_px }
    }

    /// True iff the left eye center sits more than `threshold_px` left of
    /// the right eye center: `left.x < right.x - threshold`.
    pub fn deviation(&self, left: &Region, right: &Region) -> bool {
        let left = EyeCenter::from(left);
        let right = EyeCenter::from(right);
        let limit = right.x - self.threshold_px;
        tracing::debug!(
            left_x = left.x,
            right_x = right.x,
            delta = right.x - left.x,
            "Evaluated eye centers"
        );
        left.x < limit
    }

    /// Evaluate one frame's eye candidates.
    ///
    /// `None` means no signal for this frame (fewer than two eyes); the
    /// caller must leave the alert state untouched.
    pub fn evaluate(&self, candidates: &[Region]) -> Option<bool> {
        let (left, right) = select_eye_pair(candidates)?;
        Some(self.deviation(&left, &right))
    }
}

impl Default for GazeEstimator {
    /// Default 20 px threshold
    fn default() -> Self {
        Self::new(20.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eye_at_center_x(cx: u32) -> Region {
        // 20x20 region whose center lands on (cx, 50)
        Region::new(cx - 10, 40, 20, 20)
    }

    #[test]
    fn deviated_when_left_center_clears_threshold() {
        // left x=60, right x=100, threshold 20: 60 < 80
        let estimator = GazeEstimator::new(20.0);
        assert!(estimator.deviation(&eye_at_center_x(60), &eye_at_center_x(100)));
    }

    #[test]
    fn centered_when_within_threshold() {
        // left x=90, right x=100: 90 < 80 is false
        let estimator = GazeEstimator::new(20.0);
        assert!(!estimator.deviation(&eye_at_center_x(90), &eye_at_center_x(100)));
    }

    #[test]
    fn boundary_is_strict() {
        // left x=80, right x=100: 80 < 80 is false
        let estimator = GazeEstimator::new(20.0);
        assert!(!estimator.deviation(&eye_at_center_x(80), &eye_at_center_x(100)));
    }

    #[test]
    fn fewer_than_two_candidates_is_no_signal() {
        let estimator = GazeEstimator::default();
        assert_eq!(estimator.evaluate(&[]), None);
        assert_eq!(estimator.evaluate(&[eye_at_center_x(60)]), None);
    }

    #[test]
    fn selection_takes_two_smallest_x() {
        let spurious = eye_at_center_x(160);
        let left = eye_at_center_x(60);
        let right = eye_at_center_x(100);
        let (a, b) = select_eye_pair(&[spurious, right, left]).unwrap();
        assert_eq!(a, left);
        assert_eq!(b, right);
    }

    #[test]
    fn evaluate_combines_selection_and_threshold() {
        let estimator = GazeEstimator::new(20.0);
        let signal = estimator.evaluate(&[eye_at_center_x(100), eye_at_center_x(60)]);
        assert_eq!(signal, Some(true));
    }
}
