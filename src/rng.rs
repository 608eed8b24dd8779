#[derive(Clone, Debug)]
pub struct Rng {
    seed: u32,
}

impl Rng {
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    pub fn next_f32(&mut self) -> f32 {
        self.seed = self.seed.wrapping_add(0x6d2b79f5);
        let mut t = self.seed;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        let out = t ^ (t >> 14);
        (out as f64 / 4_294_967_296.0) as f32
    }

    pub fn int(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        let span = (max - min + 1) as f32;
        (min + (self.next_f32() * span).floor() as i32).min(max)
    }

    pub fn pick_index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        (self.next_f32() * len as f32).floor().min((len - 1) as f32) as usize
    }

    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        items.get(self.pick_index(items.len()))
    }

    pub fn cell(&mut self, cols: i32, rows: i32) -> (i32, i32) {
        (self.int(0, cols - 1), self.int(0, rows - 1))
    }
}

#[cfg(test)]
mod tests {
    use super::Rng;

    #[test]
    fn same_seed_yields_same_sequence() {
        let mut a = Rng::new(7);
        let mut b = Rng::new(7);
        for _ in 0..64 {
            assert_eq!(a.next_f32().to_bits(), b.next_f32().to_bits());
        }
    }

    #[test]
    fn int_stays_within_inclusive_bounds() {
        let mut rng = Rng::new(99);
        let mut seen_min = false;
        let mut seen_max = false;
        for _ in 0..2_000 {
            let value = rng.int(1, 3);
            assert!((1..=3).contains(&value));
            seen_min |= value == 1;
            seen_max |= value == 3;
        }
        assert!(seen_min && seen_max);
    }

    #[test]
    fn pick_index_covers_every_slot() {
        let mut rng = Rng::new(5);
        let mut hits = [0usize; 4];
        for _ in 0..4_000 {
            hits[rng.pick_index(4)] += 1;
        }
        assert!(hits.iter().all(|count| *count > 800));
    }

    #[test]
    fn pick_on_empty_slice_is_none() {
        let mut rng = Rng::new(1);
        let empty: [u8; 0] = [];
        assert!(rng.pick(&empty).is_none());
    }

    #[test]
    fn cell_is_inside_grid() {
        let mut rng = Rng::new(12);
        for _ in 0..1_000 {
            let (i, j) = rng.cell(20, 15);
            assert!((0..20).contains(&i));
            assert!((0..15).contains(&j));
        }
    }
}
