use super::ReplacementPolicy;
use crate::coremap::{FrameIndex, Residents};

/// Exact LRU. Frames form a doubly linked recency list stored as index
/// arrays: `head` is the most recently used frame, `tail` the victim.
#[derive(Debug, Default)]
pub struct LruPolicy {
    next: Vec<Option<usize>>,
    prev: Vec<Option<usize>>,
    linked: Vec<bool>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl LruPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames from most to least recently used
    pub fn recency_order(&self) -> Vec<FrameIndex> {
        let mut order = Vec::new();
        let mut cur = self.head;
        while let Some(f) = cur {
            order.push(FrameIndex(f));
            cur = self.next[f];
        }
        order
    }

    fn unlink(&mut self, f: usize) {
        let (prev, next) = (self.prev[f], self.next[f]);
        match prev {
            Some(p) => self.next[p] = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.prev[n] = prev,
            None => self.tail = prev,
        }
        self.prev[f] = None;
        self.next[f] = None;
        self.linked[f] = false;
    }

    fn push_front(&mut self, f: usize) {
        self.prev[f] = None;
        self.next[f] = self.head;
        match self.head {
            Some(h) => self.prev[h] = Some(f),
            None => self.tail = Some(f),
        }
        self.head = Some(f);
        self.linked[f] = true;
    }
}

impl ReplacementPolicy for LruPolicy {
    fn init(&mut self, memsize: usize) {
        self.next = vec![None; memsize];
        self.prev = vec![None; memsize];
        self.linked = vec![false; memsize];
        self.head = None;
        self.tail = None;
    }

    fn reference(&mut self, frame: FrameIndex) {
        let f = frame.0;
        if f >= self.linked.len() {
            return;
        }
        if self.linked[f] {
            if self.head == Some(f) {
                return;
            }
            self.unlink(f);
        }
        self.push_front(f);
    }

    fn evict(&mut self, _residents: &mut Residents<'_>) -> Option<FrameIndex> {
        let victim = self.tail?;
        self.unlink(victim);
        Some(FrameIndex(victim))
    }

    fn cleanup(&mut self) {
        self.init(0);
    }

    fn name(&self) -> &'static str {
        "lru"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coremap::Coremap;
    use crate::pagetable::PageTable;

    fn evict(policy: &mut LruPolicy) -> Option<usize> {
        let cm = Coremap::new(0);
        let mut pt = PageTable::new();
        policy.evict(&mut Residents::new(&cm, &mut pt)).map(|f| f.0)
    }

    fn touch(policy: &mut LruPolicy, frames: &[usize]) {
        for &f in frames {
            policy.reference(FrameIndex(f));
        }
    }

    #[test]
    fn test_empty_list_has_no_victim() {
        let mut policy = LruPolicy::new();
        policy.init(3);
        assert_eq!(evict(&mut policy), None);
    }

    #[test]
    fn test_evicts_least_recent() {
        let mut policy = LruPolicy::new();
        policy.init(3);
        touch(&mut policy, &[0, 1, 2]);
        assert_eq!(evict(&mut policy), Some(0));
        assert_eq!(evict(&mut policy), Some(1));
        assert_eq!(evict(&mut policy), Some(2));
        assert_eq!(evict(&mut policy), None);
    }

    #[test]
    fn test_reference_moves_to_front() {
        let mut policy = LruPolicy::new();
        policy.init(4);
        touch(&mut policy, &[0, 1, 2, 3]);

        // middle, tail, head
        touch(&mut policy, &[2, 0, 0]);
        let order: Vec<usize> = policy.recency_order().iter().map(|f| f.0).collect();
        assert_eq!(order, vec![0, 2, 3, 1]);
        assert_eq!(evict(&mut policy), Some(1));
    }

    #[test]
    fn test_single_element() {
        let mut policy = LruPolicy::new();
        policy.init(2);
        touch(&mut policy, &[1, 1]);
        assert_eq!(policy.recency_order(), vec![FrameIndex(1)]);
        assert_eq!(evict(&mut policy), Some(1));
        assert!(policy.recency_order().is_empty());

        // Evicted frame relinks cleanly
        touch(&mut policy, &[1, 0]);
        assert_eq!(evict(&mut policy), Some(1));
    }

    #[test]
    fn test_cleanup_forgets_everything() {
        let mut policy = LruPolicy::new();
        policy.init(2);
        touch(&mut policy, &[0, 1]);
        policy.cleanup();
        assert_eq!(evict(&mut policy), None);
    }
}
