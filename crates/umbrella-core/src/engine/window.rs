use super::config::SamplingConfig;
use std::path::{Path, PathBuf};

/// One sampling point along the pulled coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub index: usize,
    /// Umbrella reference distance, in nm.
    pub position: f64,
}

impl Window {
    pub fn dir_name(&self) -> String {
        format!("run-{}", self.index)
    }

    pub fn dir_in(&self, root: &Path) -> PathBuf {
        root.join(self.dir_name())
    }
}

impl SamplingConfig {
    /// Distance between neighbouring windows.
    pub fn stride(&self) -> f64 {
        (self.max_distance - self.min_distance) / self.windows as f64
    }

    /// The windows in increasing order. Positions are computed from the lower bound
    /// rather than accumulated, so rounding does not drift along the coordinate.
    pub fn all_windows(&self) -> Vec<Window> {
        let stride = self.stride();
        (0..self.windows)
            .map(|index| Window {
                index,
                position: self.min_distance + index as f64 * stride,
            })
            .collect()
    }
}
