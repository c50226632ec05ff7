/// Running minimum / maximum of a numeric stream.
///
/// `swap` exchanges the two extremes. The decimator seeds each envelope cell with the
/// swapped extremes of the previous cell, so a freshly swapped value may briefly have
/// `min > max` until the first `update`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MinMax<T> {
    pub min: T,
    pub max: T,
}
impl<T: Copy + PartialOrd> MinMax<T> {
    pub fn new(value: T) -> Self {
        Self {
            min: value,
            max: value,
        }
    }
    pub fn reset(&mut self, value: T) {
        self.min = value;
        self.max = value;
    }
    pub fn update(&mut self, value: T) {
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
    }
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.min, &mut self.max);
    }
    pub fn swapped(mut self) -> Self {
        self.swap();
        self
    }
    pub fn contains(&self, value: T) -> bool {
        self.min <= value && value <= self.max
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn tracks_extremes() {
        let mut mm = MinMax::new(3.0f32);
        for v in [5.0, -1.0, 2.0] {
            mm.update(v);
        }
        assert_eq!(mm.min, -1.0);
        assert_eq!(mm.max, 5.0);
        assert!(mm.contains(0.0));
        mm.reset(7.0);
        assert_eq!(mm, MinMax { min: 7.0, max: 7.0 });
    }
    #[test]
    fn swapped_seed_widens_toward_previous_cell() {
        // Previous cell spanned 0..=10, new samples rise above it.
        let mut mm = MinMax { min: 0, max: 10 }.swapped();
        assert_eq!(mm.min, 10);
        assert_eq!(mm.max, 0);
        for v in 11..=20 {
            mm.update(v);
        }
        assert_eq!(mm, MinMax { min: 10, max: 20 });
    }
}
