//! Bounded candidate pool shared by construction and search.
//!
//! The pool is a `Vec` kept sorted by `(distance, id)`. With the pool sizes
//! used in practice (tens to a few hundred) binary-search insertion into a
//! contiguous array beats a pair of heaps: the best unexpanded entry is found
//! by scanning forward from a cursor, and eviction is a `truncate`.

/// A pool entry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbor {
    pub id: u32,
    pub distance: f32,
    pub visited: bool,
}

impl Neighbor {
    #[inline]
    pub fn new(id: u32, distance: f32) -> Self {
        Self {
            id,
            distance,
            visited: false,
        }
    }

    /// Total order used everywhere in the crate: distance, then id.
    #[inline]
    pub fn cmp_rank(&self, other: &Self) -> std::cmp::Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then(self.id.cmp(&other.id))
    }
}

/// Sorted, capacity-bounded working set of candidates.
#[derive(Clone, Debug)]
pub struct CandidatePool {
    entries: Vec<Neighbor>,
    capacity: usize,
    /// No unvisited entry sits before this index.
    cursor: usize,
}

impl CandidatePool {
    /// Create an empty pool holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity + 1),
            capacity,
            cursor: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert a candidate, evicting the worst entry on overflow.
    ///
    /// Returns the insertion position, or `None` when the candidate was
    /// rejected (pool full and the candidate is not better than the worst
    /// entry, or the id is already present).
    pub fn insert(&mut self, id: u32, distance: f32) -> Option<usize> {
        let candidate = Neighbor::new(id, distance);
        if self.capacity == 0 {
            return None;
        }
        if self.entries.len() == self.capacity {
            if let Some(worst) = self.entries.last() {
                if candidate.cmp_rank(worst).is_ge() {
                    return None;
                }
            }
        }

        let pos = self
            .entries
            .partition_point(|e| e.cmp_rank(&candidate).is_lt());
        if self.contains_near(pos, id, distance) {
            return None;
        }

        self.entries.insert(pos, candidate);
        if self.entries.len() > self.capacity {
            self.entries.truncate(self.capacity);
        }
        if pos < self.cursor {
            self.cursor = pos;
        }
        Some(pos)
    }

    /// Duplicate ids always carry identical distances, so only the run of
    /// equal-distance entries around `pos` has to be checked.
    fn contains_near(&self, pos: usize, id: u32, distance: f32) -> bool {
        let same = |e: &Neighbor| e.distance.total_cmp(&distance).is_eq();
        self.entries[pos..]
            .iter()
            .take_while(|e| same(e))
            .any(|e| e.id == id)
            || self.entries[..pos]
                .iter()
                .rev()
                .take_while(|e| same(e))
                .any(|e| e.id == id)
    }

    /// Mark the closest unvisited entry as visited and return it.
    pub fn next_unvisited(&mut self) -> Option<Neighbor> {
        while self.cursor < self.entries.len() {
            let entry = &mut self.entries[self.cursor];
            self.cursor += 1;
            if !entry.visited {
                entry.visited = true;
                return Some(*entry);
            }
        }
        None
    }

    /// Entries in ascending `(distance, id)` order.
    #[inline]
    pub fn as_slice(&self) -> &[Neighbor] {
        &self.entries
    }

    /// The `k` best entries as `(id, distance)`.
    pub fn top_k(&self, k: usize) -> Vec<(u32, f32)> {
        self.entries
            .iter()
            .take(k)
            .map(|e| (e.id, e.distance))
            .collect()
    }
}

/// Generation-stamped visited set.
///
/// `clear()` bumps a generation counter instead of zeroing the array, so a
/// set can be reused across many traversals of the same graph.
#[derive(Debug, Clone)]
pub struct VisitedSet {
    data: Vec<u16>,
    generation: u16,
}

impl VisitedSet {
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![0u16; capacity],
            generation: 1,
        }
    }

    /// Reset the set. Full memset only every 65534 calls.
    pub fn clear(&mut self) {
        if self.generation == u16::MAX {
            self.data.fill(0);
            self.generation = 1;
        } else {
            self.generation += 1;
        }
    }

    /// Mark `id` as visited. Returns `true` if it was not visited before.
    #[inline]
    pub fn insert(&mut self, id: u32) -> bool {
        let slot = &mut self.data[id as usize];
        if *slot == self.generation {
            false
        } else {
            *slot = self.generation;
            true
        }
    }}
