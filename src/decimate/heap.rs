use std::{cmp::Ordering, ops::Range};

/// Binary min-heap over partially ordered items. Incomparable items, such as
/// ones containing NaN, are treated as equal.
pub(crate) struct Heap<T>
where
    T: Copy + PartialOrd,
{
    items: Vec<T>,
}

fn parent(index: usize) -> Option<usize> {
    if index > 0 {
        Some((index - 1) >> 1)
    } else {
        None
    }
}

fn children(index: usize) -> Range<usize> {
    let off = index << 1;
    (off + 1)..(off + 3)
}

fn is_less<T: PartialOrd>(a: &T, b: &T) -> bool {
    matches!(a.partial_cmp(b), Some(Ordering::Less))
}

impl<T> Heap<T>
where
    T: Copy + PartialOrd,
{
    pub fn new() -> Self {
        Heap { items: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Heap {
            items: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    fn sift_up(&mut self, mut index: usize) {
        let item = self.items[index];
        while let Some(pi) = parent(index) {
            if !is_less(&item, &self.items[pi]) {
                break;
            }
            self.items[index] = self.items[pi];
            index = pi;
        }
        self.items[index] = item;
    }

    fn sift_down(&mut self, mut index: usize) {
        let item = self.items[index];
        let len = self.items.len();
        loop {
            // Smallest child, if any.
            let child = children(index)
                .filter(|ci| *ci < len)
                .reduce(|best, ci| {
                    if is_less(&self.items[ci], &self.items[best]) {
                        ci
                    } else {
                        best
                    }
                });
            match child {
                Some(ci) if is_less(&self.items[ci], &item) => {
                    self.items[index] = self.items[ci];
                    index = ci;
                }
                _ => break,
            }
        }
        self.items[index] = item;
    }

    pub fn push(&mut self, val: T) {
        self.items.push(val);
        self.sift_up(self.items.len() - 1);
    }

    /// Remove and return the smallest item.
    pub fn pop(&mut self) -> Option<T> {
        let last = self.items.pop()?;
        match self.items.first_mut() {
            Some(first) => {
                let top = std::mem::replace(first, last);
                self.sift_down(0);
                Some(top)
            }
            None => Some(last),
        }
    }
}

impl<T> Default for Heap<T>
where
    T: Copy + PartialOrd,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::Heap;
    use proptest::prelude::*;

    #[test]
    fn t_heap_order() {
        let mut heap = Heap::new();
        for x in [5, 3, 8, 1, 9, 2, 7] {
            heap.push(x);
        }
        assert_eq!(7, heap.len());
        let mut out = Vec::new();
        while let Some(x) = heap.pop() {
            out.push(x);
        }
        assert_eq!(vec![1, 2, 3, 5, 7, 8, 9], out);
        assert!(heap.is_empty());
        assert_eq!(None, heap.pop());
    }

    #[test]
    fn t_heap_tuples() {
        let mut heap = Heap::with_capacity(4);
        heap.push((1.0, 3u32));
        heap.push((0.5, 7u32));
        heap.push((1.0, 2u32));
        heap.push((0.5, 1u32));
        assert_eq!(Some((0.5, 1)), heap.pop());
        assert_eq!(Some((0.5, 7)), heap.pop());
        assert_eq!(Some((1.0, 2)), heap.pop());
        heap.clear();
        assert!(heap.is_empty());
    }

    proptest! {
        #[test]
        fn t_heap_sorts(values in prop::collection::vec(-1000.0..1000.0f64, 0..200)) {
            let mut heap = Heap::new();
            for v in &values {
                heap.push(*v);
            }
            let mut expected = values.clone();
            expected.sort_by(|a, b| a.total_cmp(b));
            let mut actual = Vec::with_capacity(values.len());
            while let Some(v) = heap.pop() {
                actual.push(v);
            }
            prop_assert_eq!(expected, actual);
        }
    }
}
