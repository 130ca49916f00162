/// Group digits in threes: `1234567` -> `"1,234,567"`.
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Number that glides linearly to each new target over a fixed duration.
#[derive(Clone, Debug)]
pub struct AnimatedCounter {
    from: f32,
    to: f32,
    elapsed: f32,
    duration: f32,
}

impl AnimatedCounter {
    /// Starts at zero, like a freshly mounted counter.
    pub fn new(target: f32, duration: f32) -> Self {
        Self {
            from: 0.0,
            to: target,
            elapsed: 0.0,
            duration: duration.max(0.0),
        }
    }

    /// Retarget from wherever the counter currently is.
    pub fn set_target(&mut self, target: f32) {
        if target == self.to {
            return;
        }
        self.from = self.value();
        self.to = target;
        self.elapsed = 0.0;
    }

    pub fn update(&mut self, dt: f32) {
        self.elapsed = (self.elapsed + dt.max(0.0)).min(self.duration);
    }

    pub fn value(&self) -> f32 {
        if self.duration <= 0.0 {
            return self.to;
        }
        let t = (self.elapsed / self.duration).clamp(0.0, 1.0);
        self.from + (self.to - self.from) * t
    }

    pub fn display(&self) -> String {
        format_thousands(self.value().max(0.0).round() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_grouping() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1000), "1,000");
        assert_eq!(format_thousands(123456), "123,456");
        assert_eq!(format_thousands(1234567), "1,234,567");
    }

    #[test]
    fn counter_reaches_target_after_duration() {
        let mut c = AnimatedCounter::new(1000.0, 1.0);
        assert_eq!(c.value(), 0.0);
        c.update(0.5);
        assert!((c.value() - 500.0).abs() < 1e-3);
        c.update(2.0);
        assert_eq!(c.value(), 1000.0);
        assert_eq!(c.display(), "1,000");
    }

    #[test]
    fn retarget_starts_from_current_value() {
        let mut c = AnimatedCounter::new(1000.0, 1.0);
        c.update(0.25);
        c.set_target(0.0);
        assert!((c.value() - 250.0).abs() < 1e-3);
        c.update(0.5);
        assert!((c.value() - 125.0).abs() < 1e-3);
    }

    #[test]
    fn zero_duration_snaps() {
        let c = AnimatedCounter::new(42.0, 0.0);
        assert_eq!(c.value(), 42.0);
    }
}
