//! CLI argument surface and the validated cache geometry derived from it.
//!
//! [`Cli`] is the raw, parser-level view of the nine positional arguments
//! (arity and usage text are `clap`'s problem); [`CacheGeometryArgs`] is the
//! validated, immutable snapshot the rest of the simulator consumes; it can
//! only be constructed through [`CacheGeometryArgs::try_new`], which runs
//! every check in SPEC_FULL.md §7. An instance that exists is known-valid.

use std::path::PathBuf;

use clap::Parser;

use crate::addr::Geometry;
use crate::error::SimError;

/// Two-level set-associative cache simulator with next-line L2 prefetch.
#[derive(Debug, Parser)]
#[command(name = "cachesim2", about, version)]
pub struct Cli {
    /// L1 cache size in bytes (power of two).
    pub l1_cache_size: i64,
    /// L1 associativity: "direct", "assoc", or "assoc:N".
    pub l1_assoc: String,
    /// L1 replacement policy; must be "lru".
    pub l1_replace_policy: String,
    /// L1 block size in bytes (power of two, <= l1_cache_size).
    pub l1_block_size: i64,

    /// L2 cache size in bytes (power of two).
    pub l2_cache_size: i64,
    /// L2 associativity: "direct", "assoc", or "assoc:N".
    pub l2_assoc: String,
    /// L2 replacement policy; must be "lru".
    pub l2_replace_policy: String,
    /// L2 block size in bytes (power of two, <= l2_cache_size).
    pub l2_block_size: i64,

    /// Path to the trace file.
    pub trace_file: PathBuf,
}

fn is_power_of_two(n: i64) -> bool {
    n > 0 && (n as u64).is_power_of_two()
}

/// Fully validated geometry for one cache level, ready to build a [`crate::cache::Cache`].
#[derive(Debug, Clone, Copy)]
pub struct CacheGeometryArgs {
    pub cache_size: u64,
    pub block_size: u64,
    pub lines_per_set: usize,
    pub num_sets: usize,
    pub geometry: Geometry,
}

impl CacheGeometryArgs {
    pub fn try_new(
        cache_size: i64,
        assoc: &str,
        policy: &str,
        block_size: i64,
    ) -> Result<Self, SimError> {
        if !is_power_of_two(cache_size) {
            return Err(SimError::SizeNotPowerOfTwo(cache_size));
        }
        if policy != "lru" {
            return Err(SimError::UnsupportedPolicy(policy.to_string()));
        }
        if !is_power_of_two(block_size) {
            return Err(SimError::BlockSizeNotPowerOfTwo(block_size));
        }
        if block_size > cache_size {
            return Err(SimError::BlockSizeExceedsCacheSize {
                block_size,
                cache_size,
            });
        }

        let lines_per_set = resolve_associativity(assoc, cache_size, block_size)?;

        let cache_size = cache_size as u64;
        let block_size = block_size as u64;
        let num_sets = (cache_size / (block_size * lines_per_set as u64)) as usize;

        let block_offset_bits = block_size.trailing_zeros();
        let set_index_bits = (num_sets as u64).trailing_zeros();
        let tag_bits = 48 - block_offset_bits - set_index_bits;

        debug_assert_eq!(cache_size, block_size * lines_per_set as u64 * num_sets as u64);

        Ok(Self {
            cache_size,
            block_size,
            lines_per_set,
            num_sets,
            geometry: Geometry::new(block_offset_bits, set_index_bits, tag_bits),
        })
    }
}

/// The three associativity grammars accepted on the command line. All three
/// reduce to a `lines_per_set` count once resolved against `(cache_size,
/// block_size)`; the set/line code path never branches on this enum again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AssociativityMode {
    Direct,
    Full,
    NWay(usize),
}

/// Parse "direct" / "assoc" / "assoc:N" into an [`AssociativityMode`].
fn parse_associativity(assoc: &str) -> Result<AssociativityMode, SimError> {
    if assoc == "direct" {
        return Ok(AssociativityMode::Direct);
    }
    if assoc == "assoc" {
        return Ok(AssociativityMode::Full);
    }
    match assoc.split_once(':') {
        Some(("assoc", n_str)) => {
            let n: i64 = n_str
                .parse()
                .map_err(|_| SimError::InvalidAssociativity(assoc.to_string()))?;
            if !is_power_of_two(n) {
                return Err(SimError::AssociativityNotPowerOfTwo(n));
            }
            Ok(AssociativityMode::NWay(n as usize))
        }
        _ => Err(SimError::InvalidAssociativity(assoc.to_string())),
    }
}

/// Resolve a parsed mode into the `lines_per_set` count the cache needs.
fn resolve_associativity(assoc: &str, cache_size: i64, block_size: i64) -> Result<usize, SimError> {
    match parse_associativity(assoc)? {
        AssociativityMode::Direct => Ok(1),
        AssociativityMode::Full => Ok((cache_size / block_size) as usize),
        AssociativityMode::NWay(n) => Ok(n),
    }
}

/// Fully validated configuration for both levels plus the trace file path.
pub struct Config {
    pub l1: CacheGeometryArgs,
    pub l2: CacheGeometryArgs,
    pub trace_path: PathBuf,
}

impl Config {
    pub fn try_from_cli(cli: &Cli) -> Result<Self, SimError> {
        let l1 = CacheGeometryArgs::try_new(
            cli.l1_cache_size,
            &cli.l1_assoc,
            &cli.l1_replace_policy,
            cli.l1_block_size,
        )?;
        let l2 = CacheGeometryArgs::try_new(
            cli.l2_cache_size,
            &cli.l2_assoc,
            &cli.l2_replace_policy,
            cli.l2_block_size,
        )?;
        Ok(Self {
            l1,
            l2,
            trace_path: cli.trace_file.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_mapped_geometry() {
        let g = CacheGeometryArgs::try_new(32, "direct", "lru", 16).unwrap();
        assert_eq!(g.lines_per_set, 1);
        assert_eq!(g.num_sets, 2);
        assert_eq!(g.geometry.block_offset_bits, 4);
        assert_eq!(g.geometry.set_index_bits, 1);
        assert_eq!(g.geometry.tag_bits, 43);
    }

    #[test]
    fn fully_associative_geometry() {
        let g = CacheGeometryArgs::try_new(64, "assoc", "lru", 16).unwrap();
        assert_eq!(g.lines_per_set, 4);
        assert_eq!(g.num_sets, 1);
        assert_eq!(g.geometry.set_index_bits, 0);
    }

    #[test]
    fn n_way_geometry() {
        let g = CacheGeometryArgs::try_new(64, "assoc:2", "lru", 16).unwrap();
        assert_eq!(g.lines_per_set, 2);
        assert_eq!(g.num_sets, 2);
    }

    #[test]
    fn block_size_equal_to_cache_size_degenerates_to_one_set_one_line() {
        let g = CacheGeometryArgs::try_new(16, "direct", "lru", 16).unwrap();
        assert_eq!(g.num_sets, 1);
        assert_eq!(g.lines_per_set, 1);
    }

    #[test]
    fn rejects_non_power_of_two_size() {
        assert!(CacheGeometryArgs::try_new(48, "direct", "lru", 16).is_err());
    }

    #[test]
    fn rejects_block_size_exceeding_cache_size() {
        assert!(CacheGeometryArgs::try_new(16, "direct", "lru", 32).is_err());
    }

    #[test]
    fn rejects_unknown_policy() {
        assert!(CacheGeometryArgs::try_new(32, "direct", "fifo", 16).is_err());
    }

    #[test]
    fn rejects_non_power_of_two_n_way() {
        assert!(CacheGeometryArgs::try_new(64, "assoc:3", "lru", 16).is_err());
    }

    #[test]
    fn rejects_malformed_assoc_string() {
        assert!(CacheGeometryArgs::try_new(64, "assoc:", "lru", 16).is_err());
        assert!(CacheGeometryArgs::try_new(64, "bogus", "lru", 16).is_err());
    }

    #[test]
    fn parses_all_three_associativity_grammars() {
        assert_eq!(parse_associativity("direct").unwrap(), AssociativityMode::Direct);
        assert_eq!(parse_associativity("assoc").unwrap(), AssociativityMode::Full);
        assert_eq!(
            parse_associativity("assoc:8").unwrap(),
            AssociativityMode::NWay(8)
        );
    }
}
