use core::fmt;
use core::ops::{Add, AddAssign};
use std::collections::BTreeMap;
use std::io::Read;
use std::thread;

use serde::{Deserialize, Serialize};

use crate::{
    DecodedValue, Error, FloatFormat, FormatRegistry, Result, decode, encode_decoded,
    to_binary_string,
};

// ───────────────────────────── Reference tables ─────────────────────────────

/// One row of an externally generated decode table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    pub bits: u32,
    pub binary: String,
    /// A decimal literal, or one of `NaN`, `Infinity`, `-Infinity`, `-0`.
    pub decimal: String,
}

/// Format name → every row the oracle produced for it.
pub type ReferenceTables = BTreeMap<String, Vec<ReferenceEntry>>;

pub fn parse_reference_tables(json: &str) -> Result<ReferenceTables> {
    Ok(serde_json::from_str(json)?)
}

pub fn load_reference_tables(reader: impl Read) -> Result<ReferenceTables> {
    Ok(serde_json::from_reader(reader)?)
}

/// Parses a reference decimal. Sentinels become tags; `-0` keeps its sign.
pub fn parse_reference_decimal(token: &str) -> Result<DecodedValue> {
    match token.trim() {
        "NaN" => Ok(DecodedValue::NaN),
        "Infinity" => Ok(DecodedValue::PositiveInfinity),
        "-Infinity" => Ok(DecodedValue::NegativeInfinity),
        "-0" => Ok(DecodedValue::Finite(-0.0)),
        t => t
            .parse::<f64>()
            .map(DecodedValue::from_f64)
            .map_err(|_| Error::InvalidReference(token.to_owned())),
    }
}

// ───────────────────────────────── Options ──────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Formats up to this width are round-tripped over every pattern.
    pub exhaustive_max_bits: u32,
    /// Patterns sampled from each wider format; 0 skips those formats.
    pub sample_budget: u64,
    pub max_reference_mismatches_logged: usize,
    pub max_round_trip_mismatches_logged: usize,
    /// Worker threads for round-tripping; 0 uses the available parallelism.
    pub threads: usize,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            exhaustive_max_bits: 16,
            sample_budget: 65_536,
            max_reference_mismatches_logged: 10,
            max_round_trip_mismatches_logged: 5,
            threads: 0,
        }
    }
}

// ───────────────────────────────── Reports ──────────────────────────────────

/// Pass/fail tally. Adding reports is associative and commutative, so
/// partial tallies may be combined in any order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckReport {
    pub passed: u64,
    pub failed: u64,
}

impl CheckReport {
    pub fn total(&self) -> u64 { self.passed + self.failed }

    pub fn is_clean(&self) -> bool { self.failed == 0 }
}

impl Add for CheckReport {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self { passed: self.passed + rhs.passed, failed: self.failed + rhs.failed }
    }
}

impl AddAssign for CheckReport {
    fn add_assign(&mut self, rhs: Self) { *self = *self + rhs; }
}

impl core::iter::Sum for CheckReport {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} passed", self.passed, self.total())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceMismatch {
    pub bits: u32,
    pub binary: String,
    pub expected: String,
    /// `None` when the pattern could not be decoded at all.
    pub decoded: Option<DecodedValue>,
}

impl fmt::Display for ReferenceMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bits={} (0x{:X}) expected={} decoded=", self.binary, self.bits, self.expected)?;
        match self.decoded {
            Some(value) => write!(f, "{value}"),
            None => f.write_str("<out of range>"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoundTripMismatch {
    pub bits: u32,
    pub decoded: DecodedValue,
    pub reencoded: u32,
    pub redecoded: Option<DecodedValue>,
}

impl fmt::Display for RoundTripMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "bits=0x{:X} decoded={} re-encoded=0x{:X}",
            self.bits, self.decoded, self.reencoded
        )?;
        if let Some(value) = self.redecoded {
            write!(f, " re-decoded={value}")?;
        }
        Ok(())
    }
}

/// How much of a format's pattern space the round-trip check covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coverage {
    Exhaustive,
    Sampled(u64),
    Skipped,
}

impl fmt::Display for Coverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhaustive => f.write_str("exhaustive"),
            Self::Sampled(n) => write!(f, "sampled {n}"),
            Self::Skipped => f.write_str("skipped"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormatReport {
    pub name: String,
    /// `None` when the oracle has no table for this format.
    pub reference: Option<CheckReport>,
    pub reference_mismatches: Vec<ReferenceMismatch>,
    pub round_trip: CheckReport,
    pub round_trip_mismatches: Vec<RoundTripMismatch>,
    pub coverage: Coverage,
}

impl FormatReport {
    pub fn failed(&self) -> u64 {
        self.reference.map_or(0, |r| r.failed) + self.round_trip.failed
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationSummary {
    pub formats: Vec<FormatReport>,
}

impl ValidationSummary {
    pub fn reference(&self) -> CheckReport {
        self.formats.iter().filter_map(|f| f.reference).sum()
    }

    pub fn round_trip(&self) -> CheckReport {
        self.formats.iter().map(|f| f.round_trip).sum()
    }

    pub fn is_success(&self) -> bool {
        self.formats.iter().all(|f| f.failed() == 0)
    }
}

impl fmt::Display for ValidationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<10} {:<24} {}", "format", "reference", "round-trip")?;
        for report in &self.formats {
            let reference = report
                .reference
                .map_or_else(|| "no table".to_owned(), |r| r.to_string());
            writeln!(
                f,
                "{:<10} {:<24} {} ({})",
                report.name, reference, report.round_trip, report.coverage
            )?;
        }
        let failed = self.reference().failed + self.round_trip().failed;
        if failed == 0 {
            write!(f, "PASS: reference {}, round-trip {}", self.reference(), self.round_trip())
        } else {
            write!(f, "FAIL: {failed} mismatches")
        }
    }
}

// ────────────────────────────────── Checks ──────────────────────────────────

/// Decodes every reference row and compares it against the oracle's value,
/// tag for tag and distinguishing `-0` from `+0`. The row's `binary` column
/// must also match the pattern's rendering.
pub fn check_reference(
    name: &str,
    format: &FloatFormat,
    entries: &[ReferenceEntry],
    max_logged: usize,
) -> (CheckReport, Vec<ReferenceMismatch>) {
    let mut report = CheckReport::default();
    let mut mismatches = Vec::new();

    for entry in entries {
        let decoded = decode(entry.bits, format).ok();
        let matches = match (parse_reference_decimal(&entry.decimal), decoded) {
            (Ok(expected), Some(actual)) => {
                actual.is_identical(expected)
                    && to_binary_string(entry.bits, format)
                        .is_ok_and(|binary| binary == entry.binary)
            }
            _ => false,
        };
        if matches {
            report.passed += 1;
            continue;
        }
        report.failed += 1;
        if mismatches.len() < max_logged {
            let mismatch = ReferenceMismatch {
                bits: entry.bits,
                binary: entry.binary.clone(),
                expected: entry.decimal.clone(),
                decoded,
            };
            log::warn!("{name}: reference mismatch: {mismatch}");
            mismatches.push(mismatch);
        }
    }

    (report, mismatches)
}

/// Decodes and re-encodes one pattern. NaN patterns only need to come back
/// as some NaN.
pub fn round_trip(bits: u32, format: &FloatFormat) -> Result<Option<RoundTripMismatch>> {
    let decoded = decode(bits, format)?;
    let reencoded = encode_decoded(decoded, format);
    if decoded.is_nan() {
        let redecoded = decode(reencoded, format)?;
        if redecoded.is_nan() {
            return Ok(None);
        }
        return Ok(Some(RoundTripMismatch { bits, decoded, reencoded, redecoded: Some(redecoded) }));
    }
    if reencoded == bits {
        Ok(None)
    } else {
        Ok(Some(RoundTripMismatch { bits, decoded, reencoded, redecoded: None }))
    }
}

/// Round-trips a format exhaustively or over a deterministic sample,
/// depending on its width and `options`.
pub fn check_round_trip(
    name: &str,
    format: &FloatFormat,
    options: &ValidationOptions,
) -> (CheckReport, Vec<RoundTripMismatch>, Coverage) {
    let patterns = PatternSet::plan(format, options);
    if patterns.coverage == Coverage::Skipped {
        log::info!("{name}: round-trip skipped ({} bits)", format.total_bits());
        return (CheckReport::default(), Vec::new(), Coverage::Skipped);
    }

    let limit = options.max_round_trip_mismatches_logged;
    let len = patterns.len();
    let threads = match options.threads {
        0 => thread::available_parallelism().map_or(1, |n| n.get()),
        n => n,
    }
    .clamp(1, len.max(1) as usize) as u64;

    let partials: Vec<(CheckReport, Vec<RoundTripMismatch>)> = thread::scope(|scope| {
        let workers: Vec<_> = (0..threads)
            .map(|k| {
                let patterns = &patterns;
                let range = (k * len / threads)..((k + 1) * len / threads);
                scope.spawn(move || round_trip_range(name, format, patterns, range, limit))
            })
            .collect();
        workers
            .into_iter()
            .map(|worker| worker.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
            .collect()
    });

    let mut report = CheckReport::default();
    let mut mismatches = Vec::new();
    for (partial, found) in partials {
        report += partial;
        mismatches.extend(found);
    }
    mismatches.sort_by_key(|m| m.bits);
    mismatches.dedup_by_key(|m| m.bits);
    mismatches.truncate(limit);
    for mismatch in &mismatches {
        log::warn!("{name}: round-trip mismatch: {mismatch}");
    }

    (report, mismatches, patterns.coverage)
}

fn round_trip_range(
    name: &str,
    format: &FloatFormat,
    patterns: &PatternSet,
    range: core::ops::Range<u64>,
    limit: usize,
) -> (CheckReport, Vec<RoundTripMismatch>) {
    let mut report = CheckReport::default();
    let mut mismatches = Vec::new();
    for index in range {
        let bits = patterns.get(index);
        match round_trip(bits, format) {
            Ok(None) => report.passed += 1,
            Ok(Some(mismatch)) => {
                report.failed += 1;
                if mismatches.len() < limit {
                    mismatches.push(mismatch);
                }
            }
            Err(err) => {
                report.failed += 1;
                log::warn!("{name}: round-trip of 0x{bits:X} failed: {err}");
            }
        }
    }
    (report, mismatches)
}

/// The patterns a round-trip check visits, addressable by index so workers
/// can split the work without materializing it.
struct PatternSet {
    coverage: Coverage,
    count: u64,
    budget: u64,
    edges: Vec<u32>,
}

impl PatternSet {
    fn plan(format: &FloatFormat, options: &ValidationOptions) -> Self {
        let count = format.pattern_count();
        let exhaustive = format.total_bits() <= options.exhaustive_max_bits
            || options.sample_budget >= count;
        if exhaustive {
            return Self { coverage: Coverage::Exhaustive, count, budget: 0, edges: Vec::new() };
        }
        if options.sample_budget == 0 {
            return Self { coverage: Coverage::Skipped, count, budget: 0, edges: Vec::new() };
        }

        let sign = format.sign_mask();
        let max = format.max_finite_bits();
        let mut edges = vec![0, sign, 1, sign | 1, max, sign | max];
        edges.extend(format.canonical_nan_bits());
        edges.extend(format.infinity_bits(false));
        edges.extend(format.infinity_bits(true));
        let budget = options.sample_budget;
        edges.sort_unstable();
        edges.dedup();
        edges.retain(|&bits| !Self::is_sampled(count, budget, bits));
        Self {
            coverage: Coverage::Sampled(budget + edges.len() as u64),
            count,
            budget,
            edges,
        }
    }

    fn len(&self) -> u64 {
        match self.coverage {
            Coverage::Exhaustive => self.count,
            Coverage::Sampled(n) => n,
            Coverage::Skipped => 0,
        }
    }

    fn get(&self, index: u64) -> u32 {
        match self.coverage {
            Coverage::Exhaustive => index as u32,
            _ if index < self.budget => Self::sample(self.count, self.budget, index),
            _ => self.edges[(index - self.budget) as usize],
        }
    }

    /// Evenly spaced strides with a scrambled offset inside each, so low
    /// mantissa bits vary too. Sample `index` always lies in
    /// `[stride_start(index), stride_start(index + 1))`.
    fn sample(count: u64, budget: u64, index: u64) -> u32 {
        let stride = count / budget;
        let offset = index.wrapping_mul(2_654_435_761) % stride;
        (Self::stride_start(count, budget, index) + offset) as u32
    }

    fn stride_start(count: u64, budget: u64, index: u64) -> u64 {
        (index as u128 * count as u128 / budget as u128) as u64
    }

    fn is_sampled(count: u64, budget: u64, bits: u32) -> bool {
        let index = (bits as u128 * budget as u128 / count as u128) as u64;
        (index.saturating_sub(1)..=(index + 1).min(budget - 1))
            .any(|i| Self::sample(count, budget, i) == bits)
    }
}

// ───────────────────────────────── Driver ───────────────────────────────────

/// Runs both checks on one format. Never stops early.
pub fn validate_format(
    name: &str,
    format: &FloatFormat,
    entries: Option<&[ReferenceEntry]>,
    options: &ValidationOptions,
) -> FormatReport {
    log::debug!("{name}: validating {format}");
    let (reference, reference_mismatches) = match entries {
        Some(entries) => {
            let (report, mismatches) =
                check_reference(name, format, entries, options.max_reference_mismatches_logged);
            (Some(report), mismatches)
        }
        None => (None, Vec::new()),
    };
    let (round_trip, round_trip_mismatches, coverage) = check_round_trip(name, format, options);

    let report = FormatReport {
        name: name.to_owned(),
        reference,
        reference_mismatches,
        round_trip,
        round_trip_mismatches,
        coverage,
    };
    log::info!(
        "{name}: reference {}, round-trip {} ({})",
        report.reference.map_or_else(|| "no table".to_owned(), |r| r.to_string()),
        report.round_trip,
        report.coverage,
    );
    report
}

/// Validates every registry format, then counts each reference table whose
/// format is not in the registry as wholly failed.
pub fn run_validation(
    registry: &FormatRegistry,
    tables: &ReferenceTables,
    options: &ValidationOptions,
) -> ValidationSummary {
    let mut formats: Vec<FormatReport> = registry
        .iter()
        .map(|(name, format)| {
            validate_format(name, &format, tables.get(name).map(Vec::as_slice), options)
        })
        .collect();

    for (name, entries) in tables {
        if registry.lookup(name).is_ok() {
            continue;
        }
        log::warn!("{name}: reference table for unknown format ({} entries)", entries.len());
        formats.push(FormatReport {
            name: name.clone(),
            reference: Some(CheckReport { passed: 0, failed: entries.len().max(1) as u64 }),
            reference_mismatches: Vec::new(),
            round_trip: CheckReport::default(),
            round_trip_mismatches: Vec::new(),
            coverage: Coverage::Skipped,
        });
    }

    ValidationSummary { formats }
}
