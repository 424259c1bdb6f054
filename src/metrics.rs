//! Counters for one cache-hierarchy configuration, and the reporter that
//! prints them in the fixed order the driver expects.

use std::fmt;

/// The six monotonically non-decreasing counters tracked per configuration.
#[derive(Clone, Default, Debug)]
pub struct Counters {
    pub memory_reads: u64,
    pub memory_writes: u64,
    pub l1_hits: u64,
    pub l1_misses: u64,
    pub l2_hits: u64,
    pub l2_misses: u64,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }
}

impl fmt::Display for Counters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Memory reads: {}", self.memory_reads)?;
        writeln!(f, "Memory writes: {}", self.memory_writes)?;
        writeln!(f, "L1 cache hits: {}", self.l1_hits)?;
        writeln!(f, "L1 cache misses: {}", self.l1_misses)?;
        writeln!(f, "L2 cache hits: {}", self.l2_hits)?;
        write!(f, "L2 cache misses: {}", self.l2_misses)
    }
}

/// Emit both configurations' counter blocks in the fixed order: `No Prefetch`
/// then `With Prefetch`.
pub fn report(no_prefetch: &Counters, with_prefetch: &Counters) -> String {
    format!(
        "No Prefetch\n{}\nWith Prefetch\n{}\n",
        no_prefetch, with_prefetch
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_emits_six_labeled_lines() {
        let mut c = Counters::new();
        c.memory_reads = 1;
        c.memory_writes = 2;
        c.l1_hits = 3;
        c.l1_misses = 4;
        c.l2_hits = 5;
        c.l2_misses = 6;
        let text = c.to_string();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Memory reads: 1",
                "Memory writes: 2",
                "L1 cache hits: 3",
                "L1 cache misses: 4",
                "L2 cache hits: 5",
                "L2 cache misses: 6",
            ]
        );
    }

    #[test]
    fn report_labels_both_configurations_in_order() {
        let text = report(&Counters::new(), &Counters::new());
        let no_prefetch_pos = text.find("No Prefetch").unwrap();
        let with_prefetch_pos = text.find("With Prefetch").unwrap();
        assert!(no_prefetch_pos < with_prefetch_pos);
    }
}
