//! Two-level access protocol: drives L1 then L2 on each trace event, issues
//! next-line L2 prefetch on a prefetch-configured miss, and accumulates the
//! memory-traffic counters for both configurations side by side.

use log::{debug, trace};

use crate::cache::{AccessOutcome, Cache};
use crate::config::CacheGeometryArgs;
use crate::error::SimError;
use crate::metrics::Counters;
use crate::trace::{Op, TraceEvent};

/// One L1+L2 cache hierarchy and its counters, either the no-prefetch or
/// the with-prefetch configuration.
pub struct Hierarchy {
    l1: Cache,
    l2: Cache,
    prefetch_enabled: bool,
    pub counters: Counters,
}

impl Hierarchy {
    pub fn new(l1: &CacheGeometryArgs, l2: &CacheGeometryArgs, prefetch_enabled: bool) -> Self {
        Self {
            l1: Cache::new(l1.geometry, l1.num_sets, l1.lines_per_set, l1.block_size),
            l2: Cache::new(l2.geometry, l2.num_sets, l2.lines_per_set, l2.block_size),
            prefetch_enabled,
            counters: Counters::new(),
        }
    }

    /// Next-line prefetch: speculatively bring `addr + L2.blockSize` into L2.
    /// Only a prefetch miss counts toward `memoryReads`; the L2 hit/miss
    /// counters are untouched by prefetch traffic.
    fn prefetch_step(&mut self, addr: u64) {
        let next_addr = addr + self.l2.block_size();
        if self.l2.access(next_addr, true) == AccessOutcome::Miss {
            self.counters.memory_reads += 1;
        }
    }

    fn read(&mut self, addr: u64) {
        if self.l1.access(addr, false) == AccessOutcome::Hit {
            self.counters.l1_hits += 1;
            return;
        }
        self.counters.l1_misses += 1;

        if self.l2.access(addr, false) == AccessOutcome::Hit {
            self.counters.l2_hits += 1;
        } else {
            self.counters.l2_misses += 1;
            self.counters.memory_reads += 1;
            if self.prefetch_enabled {
                self.prefetch_step(addr);
            }
        }
    }

    /// Write-allocate + write-through at every level: a write that hits
    /// writes through to that level; a write that misses both levels
    /// allocates in L2 (a memory read) and writes through (a memory write).
    fn write(&mut self, addr: u64) {
        if self.l1.access(addr, false) == AccessOutcome::Hit {
            self.counters.l1_hits += 1;
            self.counters.memory_writes += 1;
            return;
        }
        self.counters.l1_misses += 1;

        if self.l2.access(addr, false) == AccessOutcome::Hit {
            self.counters.l2_hits += 1;
            self.counters.memory_writes += 1;
        } else {
            self.counters.l2_misses += 1;
            self.counters.memory_reads += 1;
            self.counters.memory_writes += 1;
            if self.prefetch_enabled {
                self.prefetch_step(addr);
            }
        }
    }

    fn access(&mut self, event: &TraceEvent) {
        match event.op {
            Op::Read => self.read(event.addr),
            Op::Write => self.write(event.addr),
        }
    }
}

/// Drives a trace through both configurations, no-prefetch and
/// with-prefetch, sharing input but keeping independent caches and counters.
pub struct Simulator {
    no_prefetch: Hierarchy,
    with_prefetch: Hierarchy,
}

impl Simulator {
    pub fn new(l1: &CacheGeometryArgs, l2: &CacheGeometryArgs) -> Self {
        Self {
            no_prefetch: Hierarchy::new(l1, l2, false),
            with_prefetch: Hierarchy::new(l1, l2, true),
        }
    }

    /// Consume trace events until the underlying iterator is exhausted,
    /// driving both configurations for each one. Returns the first error the
    /// trace source reports (I/O failure, malformed line, missing sentinel).
    pub fn run<I>(&mut self, events: I) -> Result<u64, SimError>
    where
        I: IntoIterator<Item = Result<TraceEvent, SimError>>,
    {
        let mut processed = 0u64;
        for event in events {
            let event = event?;
            trace!("event {processed}: {:?} {:#x}", event.op, event.addr);
            self.no_prefetch.access(&event);
            self.with_prefetch.access(&event);
            processed += 1;
        }
        debug!("processed {processed} trace events");
        Ok(processed)
    }

    pub fn counters(&self) -> (&Counters, &Counters) {
        (&self.no_prefetch.counters, &self.with_prefetch.counters)
    }
}
