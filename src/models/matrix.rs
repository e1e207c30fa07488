const WORD_BITS: usize = 64;

/// Binarized image (true = ink), packed into 64-bit words.
///
/// Every row starts on a word boundary so rectangular regions can be counted
/// with word masks instead of per-pixel lookups. Bits past `width` in a row
/// are never set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitMatrix {
    width: usize,
    height: usize,
    stride: usize,
    words: Vec<u64>,
}

impl BitMatrix {
    /// All-white matrix of the given size
    pub fn new(width: usize, height: usize) -> Self {
        let stride = width.div_ceil(WORD_BITS);
        Self {
            width,
            height,
            stride,
            words: vec![0; stride * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn locate(&self, x: usize, y: usize) -> Option<(usize, u64)> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((y * self.stride + x / WORD_BITS, 1u64 << (x % WORD_BITS)))
    }

    /// Cell at (x, y); out of range reads as white
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.locate(x, y)
            .is_some_and(|(word, mask)| self.words[word] & mask != 0)
    }

    /// Set cell at (x, y); out of range writes are ignored
    pub fn set(&mut self, x: usize, y: usize, value: bool) {
        if let Some((word, mask)) = self.locate(x, y) {
            if value {
                self.words[word] |= mask;
            } else {
                self.words[word] &= !mask;
            }
        }
    }

    /// Ink cells in the whole matrix
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Ink cells inside `[x0, x1) x [y0, y1)`, clipped to the matrix
    pub fn count_ones_in(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> usize {
        let x1 = x1.min(self.width);
        let y1 = y1.min(self.height);
        if x0 >= x1 || y0 >= y1 {
            return 0;
        }
        (y0..y1).map(|y| self.row_ones(y, x0, x1)).sum()
    }

    // Requires x0 < x1 <= width
    fn row_ones(&self, y: usize, x0: usize, x1: usize) -> usize {
        let row = &self.words[y * self.stride..(y + 1) * self.stride];
        let first = x0 / WORD_BITS;
        let last = (x1 - 1) / WORD_BITS;
        let mut count = 0;
        for (i, &word) in row.iter().enumerate().take(last + 1).skip(first) {
            let mut word = word;
            if i == first {
                word &= u64::MAX << (x0 % WORD_BITS);
            }
            let end = x1 - i * WORD_BITS;
            if end < WORD_BITS {
                word &= (1u64 << end) - 1;
            }
            count += word.count_ones() as usize;
        }
        count
    }
}

impl Default for BitMatrix {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_count(m: &BitMatrix, x0: usize, y0: usize, x1: usize, y1: usize) -> usize {
        let mut n = 0;
        for y in y0..y1 {
            for x in x0..x1 {
                n += m.get(x, y) as usize;
            }
        }
        n
    }

    #[test]
    fn test_set_get_clear() {
        let mut m = BitMatrix::new(70, 2);
        m.set(69, 1, true);
        m.set(0, 0, true);
        assert!(m.get(69, 1));
        assert!(m.get(0, 0));
        assert!(!m.get(68, 1));
        m.set(69, 1, false);
        assert!(!m.get(69, 1));
        assert_eq!(m.count_ones(), 1);
    }

    #[test]
    fn test_out_of_range_is_white() {
        let mut m = BitMatrix::new(4, 4);
        m.set(4, 0, true);
        m.set(0, 9, true);
        assert!(!m.get(4, 0));
        assert_eq!(m.count_ones(), 0);
    }

    #[test]
    fn test_region_counts_cross_words() {
        // 130 columns spans three words per row
        let mut m = BitMatrix::new(130, 5);
        for y in 0..5 {
            for x in (y..130).step_by(3) {
                m.set(x, y, true);
            }
        }
        for &(x0, y0, x1, y1) in &[
            (0, 0, 130, 5),
            (1, 1, 64, 4),
            (63, 0, 65, 5),
            (64, 2, 128, 3),
            (100, 0, 500, 500),
            (127, 4, 130, 5),
        ] {
            assert_eq!(
                m.count_ones_in(x0, y0, x1, y1),
                naive_count(&m, x0, y0, x1.min(130), y1.min(5)),
                "region {x0},{y0}..{x1},{y1}"
            );
        }
        assert_eq!(m.count_ones(), m.count_ones_in(0, 0, 130, 5));
    }

    #[test]
    fn test_empty_regions() {
        let m = BitMatrix::new(10, 10);
        assert_eq!(m.count_ones_in(5, 5, 5, 10), 0);
        assert_eq!(m.count_ones_in(20, 0, 30, 10), 0);
        assert!(BitMatrix::default().is_empty());
    }
}
