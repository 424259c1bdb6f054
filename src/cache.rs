//! Set-associative cache: fixed-capacity sets of lines, LRU replacement via an
//! inverted usage counter, and the non-linear probe sequence the reference
//! simulator uses to decide which slot a miss lands in.

use crate::addr::Geometry;

/// Result of a single cache access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessOutcome {
    Hit,
    Miss,
}

/// A single storage slot within a set.
#[derive(Clone, Debug)]
struct Line {
    valid: bool,
    tag: u64,
    /// 0 while invalid. Once touched, counts cycles since last use (1 is
    /// most-recently-used, increasing means older; not a timestamp).
    usage: u64,
}

impl Line {
    fn empty() -> Self {
        Self {
            valid: false,
            tag: 0,
            usage: 0,
        }
    }
}

/// One set of `ways` lines, probed starting at `tag mod ways`.
struct Set {
    lines: Vec<Line>,
    num_items: usize,
}

impl Set {
    fn new(ways: usize) -> Self {
        Self {
            lines: (0..ways).map(|_| Line::empty()).collect(),
            num_items: 0,
        }
    }

    fn ways(&self) -> usize {
        self.lines.len()
    }

    /// Promote the line at `index` to most-recently-used; age every other
    /// already-touched line in the set by one.
    fn touch(&mut self, index: usize) {
        for (i, line) in self.lines.iter_mut().enumerate() {
            if i == index {
                line.usage = 1;
            } else if line.usage > 0 {
                line.usage += 1;
            }
        }
    }

    /// Index of the line with the highest `usage` (ties broken by lowest
    /// index). Only meaningful once the set is full.
    fn victim(&self) -> usize {
        let mut victim = 0;
        let mut max = 0u64;
        for (i, line) in self.lines.iter().enumerate() {
            if line.usage > max {
                max = line.usage;
                victim = i;
            }
        }
        victim
    }

    /// Probe the set for `tag`, installing it on a miss per the reference
    /// simulator's exact slot-selection rules, and update LRU state.
    fn access(&mut self, tag: u64, is_prefetch: bool) -> AccessOutcome {
        let ways = self.ways();
        let start = (tag % ways as u64) as usize;

        let mut index = start;
        let mut hit = false;

        if self.lines[start].valid && self.lines[start].tag == tag {
            hit = true;
        } else if self.lines[start].valid {
            let mut found = false;
            for i in 1..ways {
                let idx = (start + i) % ways;
                if self.lines[idx].valid && self.lines[idx].tag == tag {
                    index = idx;
                    hit = true;
                    found = true;
                    break;
                }
            }
            if !found {
                if self.num_items < ways {
                    // Empty-slot search begins at offset 1, not 0: the start
                    // slot is already known valid in this branch.
                    for i in 1..ways {
                        let idx = (start + i) % ways;
                        if !self.lines[idx].valid {
                            self.lines[idx].valid = true;
                            self.lines[idx].tag = tag;
                            self.num_items += 1;
                            index = idx;
                            break;
                        }
                    }
                } else {
                    let victim = self.victim();
                    self.lines[victim].tag = tag;
                    index = victim;
                }
            }
        } else {
            self.lines[start].valid = true;
            self.lines[start].tag = tag;
            self.num_items += 1;
            index = start;
        }

        // A prefetch that hits leaves LRU state untouched; every other path
        // (demand hit, demand miss, prefetch miss) promotes the line.
        if !(is_prefetch && hit) {
            self.touch(index);
        }

        if hit {
            AccessOutcome::Hit
        } else {
            AccessOutcome::Miss
        }
    }
}

/// One level of the cache hierarchy: geometry plus a fixed array of sets.
pub struct Cache {
    sets: Vec<Set>,
    geometry: Geometry,
    block_size: u64,
}

impl Cache {
    pub fn new(geometry: Geometry, num_sets: usize, lines_per_set: usize, block_size: u64) -> Self {
        assert!(num_sets > 0, "cache must have at least one set");
        assert!(lines_per_set > 0, "cache must have at least one way");
        Self {
            sets: (0..num_sets).map(|_| Set::new(lines_per_set)).collect(),
            geometry,
            block_size,
        }
    }

    pub fn block_size(&self) -> u64 {
        self.block_size
    }

    /// Decode `addr` against this level's geometry and probe the matching set.
    pub fn access(&mut self, addr: u64, is_prefetch: bool) -> AccessOutcome {
        let (tag, set_index) = self.geometry.decode(addr);
        self.sets[set_index as usize].access(tag, is_prefetch)
    }
}
