use serde::{Deserialize, Serialize};

/// Render detail preset. Ordered from cheapest to most detailed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualQuality {
    Low,
    Medium,
    High,
    Ultra,
}

impl VisualQuality {
    pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::Ultra];

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Ultra => "Ultra",
        }
    }

    pub fn parse_cli(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "med" | "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "ultra" => Some(Self::Ultra),
            _ => None,
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    /// One step cheaper, saturating at `Low`.
    pub fn lower(self) -> Self {
        Self::ALL[self.index().saturating_sub(1)]
    }

    /// One step richer, saturating at `Ultra`.
    pub fn higher(self) -> Self {
        Self::ALL[(self.index() + 1).min(Self::ALL.len() - 1)]
    }

    /// Discs stacked to fake a bubble's radial gradient.
    pub fn gradient_rings(self) -> usize {
        [2, 4, 6, 10][self.index()]
    }

    /// (rings, slices) for scene spheres.
    pub fn sphere_detail(self) -> (usize, usize) {
        [(6, 6), (8, 10), (12, 16), (16, 24)][self.index()]
    }

    pub fn cloud_puffs(self) -> usize {
        [3, 5, 7, 9][self.index()]
    }
}

/// Frame-time driven quality governor. Drops a step after a short run of slow
/// frames, climbs back only after a long run of fast ones, and never exceeds
/// `ceiling`.
#[derive(Clone, Debug)]
pub struct AutoQuality {
    ceiling: VisualQuality,
    target_ms: f32,
    degrade_after: u32,
    upgrade_after: u32,
    slow_streak: u32,
    fast_streak: u32,
}

impl AutoQuality {
    pub fn new(ceiling: VisualQuality, target_ms: f32) -> Self {
        Self {
            ceiling,
            target_ms,
            degrade_after: 6,
            upgrade_after: 110,
            slow_streak: 0,
            fast_streak: 0,
        }
    }

    pub fn with_streaks(mut self, degrade_after: u32, upgrade_after: u32) -> Self {
        self.degrade_after = degrade_after.max(1);
        self.upgrade_after = upgrade_after.max(1);
        self
    }

    pub fn ceiling(&self) -> VisualQuality {
        self.ceiling
    }

    /// A quality picked by hand becomes the new ceiling; the governor only
    /// steps down from it and climbs back up to it.
    pub fn set_ceiling(&mut self, ceiling: VisualQuality) {
        self.ceiling = ceiling;
        self.slow_streak = 0;
        self.fast_streak = 0;
    }

    pub fn observe(&mut self, current: VisualQuality, frame_ms: f32) -> VisualQuality {
        let current = current.min(self.ceiling);

        if frame_ms > self.target_ms * 1.08 {
            self.slow_streak += 1;
            self.fast_streak = 0;
        } else if frame_ms < self.target_ms * 0.75 {
            self.fast_streak += 1;
            self.slow_streak = 0;
        } else {
            self.slow_streak = 0;
            self.fast_streak = 0;
        }

        if self.slow_streak >= self.degrade_after {
            self.slow_streak = 0;
            current.lower()
        } else if self.fast_streak >= self.upgrade_after {
            self.fast_streak = 0;
            current.higher().min(self.ceiling)
        } else {
            current
        }
    }
}
