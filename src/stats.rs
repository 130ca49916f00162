//! Rolling samples for the growth graph.

/// Ring buffer that stores the last N samples of a metric.
pub struct RingBuffer {
    data: Vec<f32>,
    head: usize,
    len: usize,
}

impl RingBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![0.0; capacity.max(1)],
            head: 0,
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn push(&mut self, value: f32) {
        let capacity = self.capacity();
        self.data[self.head] = value;
        self.head = (self.head + 1) % capacity;
        self.len = (self.len + 1).min(capacity);
    }

    /// Samples in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        let capacity = self.capacity();
        let start = if self.len < capacity { 0 } else { self.head };
        (0..self.len).map(move |i| self.data[(start + i) % capacity])
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn last(&self) -> Option<f32> {
        if self.len == 0 {
            return None;
        }
        let capacity = self.capacity();
        Some(self.data[(self.head + capacity - 1) % capacity])
    }

    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }
}

/// Displayed vs target growth, sampled once per smoothing tick, plus the live
/// particle count sampled per frame.
pub struct GrowthHistory {
    pub displayed: RingBuffer,
    pub target: RingBuffer,
    pub particles: RingBuffer,
}

impl GrowthHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            displayed: RingBuffer::new(capacity),
            target: RingBuffer::new(capacity),
            particles: RingBuffer::new(capacity),
        }
    }

    /// Record `ticks` growth samples (one per smoothing step that fired).
    pub fn record(&mut self, ticks: u32, displayed: f32, target: f32, particle_count: usize) {
        for _ in 0..ticks {
            self.displayed.push(displayed);
            self.target.push(target);
        }
        self.particles.push(particle_count as f32);
    }

    pub fn clear(&mut self) {
        self.displayed.clear();
        self.target.clear();
        self.particles.clear();
    }
}
