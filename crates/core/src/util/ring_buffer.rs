/// Fixed-capacity FIFO that evicts the oldest entry once full.
#[derive(Clone, Debug)]
pub struct RingBuffer<T> {
    buf: Vec<Option<T>>,
    head: usize,
    len: usize,
}

impl<T> RingBuffer<T> {
    /// Callers validate `capacity` beforehand (see `TrackerConfig::new`); zero is clamped to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut buf = Vec::with_capacity(capacity);
        buf.resize_with(capacity, || None);
        Self {
            buf,
            head: 0,
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Appends `value`, returning the evicted oldest entry when the buffer was full.
    pub fn push(&mut self, value: T) -> Option<T> {
        let cap = self.capacity();
        let idx = (self.head + self.len) % cap;

        if self.len < cap {
            self.buf[idx] = Some(value);
            self.len += 1;
            None
        } else {
            let evicted = self.buf[self.head].take();
            self.buf[self.head] = Some(value);
            self.head = (self.head + 1) % cap;
            evicted
        }
    }

    pub fn get(&self, index_from_oldest: usize) -> Option<&T> {
        if index_from_oldest >= self.len {
            return None;
        }
        let idx = (self.head + index_from_oldest) % self.capacity();
        self.buf[idx].as_ref()
    }

    pub fn last(&self) -> Option<&T> {
        self.len.checked_sub(1).and_then(|i| self.get(i))
    }

    pub fn clear(&mut self) {
        self.buf.iter_mut().for_each(|slot| *slot = None);
        self.head = 0;
        self.len = 0;
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        (0..self.len).filter_map(move |i| self.get(i))
    }

    /// The most recent `n` entries, still ordered oldest to newest.
    pub fn newest(&self, n: usize) -> impl Iterator<Item = &T> {
        let skip = self.len.saturating_sub(n);
        (skip..self.len).filter_map(move |i| self.get(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_buffer_evicts_oldest() {
        let mut rb = RingBuffer::new(3);
        assert!(rb.is_empty());
        assert_eq!(rb.last(), None);

        assert_eq!(rb.push(1), None);
        assert_eq!(rb.push(2), None);
        assert_eq!(rb.push(3), None);
        assert_eq!(rb.len(), 3);
        assert_eq!(rb.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);

        assert_eq!(rb.push(4), Some(1));
        assert_eq!(rb.iter().copied().collect::<Vec<_>>(), vec![2, 3, 4]);
        assert_eq!(rb.last(), Some(&4));
    }

    #[test]
    fn newest_returns_tail_in_order() {
        let mut rb = RingBuffer::new(4);
        for v in 1..=6 {
            rb.push(v);
        }
        assert_eq!(rb.newest(2).copied().collect::<Vec<_>>(), vec![5, 6]);
        assert_eq!(rb.newest(10).copied().collect::<Vec<_>>(), vec![3, 4, 5, 6]);
        assert_eq!(rb.newest(0).count(), 0);
    }

    #[test]
    fn clear_resets_to_empty() {
        let mut rb = RingBuffer::new(2);
        rb.push("a");
        rb.push("b");
        rb.push("c");
        rb.clear();
        assert!(rb.is_empty());
        assert_eq!(rb.capacity(), 2);

        rb.push("d");
        assert_eq!(rb.iter().copied().collect::<Vec<_>>(), vec!["d"]);
    }

    #[test]
    fn zero_capacity_holds_one() {
        let mut rb = RingBuffer::new(0);
        rb.push(1);
        assert_eq!(rb.push(2), Some(1));
        assert_eq!(rb.len(), 1);
    }
}
