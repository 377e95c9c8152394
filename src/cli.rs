use std::fs::{self, File};
use std::io::BufReader;
use std::path::PathBuf;

use crate::{
    Error, FormatRegistry, Result, ValidationOptions, ValidationSummary,
    load_reference_tables, run_validation,
};

pub const USAGE: &str = "usage: minifloat-validate [REFERENCE_JSON] [--formats FILE] \
                         [--exhaustive-bits N] [--samples N] [--threads N]";

/// Every check passed.
pub const EXIT_PASSED: u8 = 0;
/// At least one reference or round-trip mismatch.
pub const EXIT_MISMATCH: u8 = 1;
/// Bad arguments, or the formats or reference tables could not be loaded.
pub const EXIT_UNUSABLE: u8 = 2;

/// Command line of `minifloat-validate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub reference: PathBuf,
    pub formats: Option<PathBuf>,
    pub options: ValidationOptions,
}

impl Default for CliArgs {
    fn default() -> Self {
        Self {
            reference: PathBuf::from("reference_tables.json"),
            formats: None,
            options: ValidationOptions::default(),
        }
    }
}

impl CliArgs {
    /// Parses the arguments that follow the program name.
    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut parsed = Self::default();
        let mut it = args.into_iter().map(Into::<String>::into);
        while let Some(arg) = it.next() {
            let mut value = |flag: &str| {
                it.next().ok_or_else(|| Error::Usage(format!("{flag} needs a value")))
            };
            match arg.as_str() {
                "--formats" => parsed.formats = Some(value("--formats")?.into()),
                "--exhaustive-bits" => {
                    parsed.options.exhaustive_max_bits = number(&value("--exhaustive-bits")?)?
                }
                "--samples" => parsed.options.sample_budget = number(&value("--samples")?)?,
                "--threads" => parsed.options.threads = number(&value("--threads")?)?,
                "-h" | "--help" => return Err(Error::Usage(USAGE.to_owned())),
                flag if flag.starts_with('-') => {
                    return Err(Error::Usage(format!("unknown flag {flag}\n{USAGE}")));
                }
                path => parsed.reference = path.into(),
            }
        }
        Ok(parsed)
    }
}

fn number<T: std::str::FromStr>(s: &str) -> Result<T> {
    s.parse().map_err(|_| Error::Usage(format!("not a number: {s:?}")))
}

/// Loads the registry (builtin unless `--formats` was given) and the
/// reference tables, then validates every format.
pub fn run(args: &CliArgs) -> Result<ValidationSummary> {
    let registry = match &args.formats {
        Some(path) => {
            let json = fs::read_to_string(path).inspect_err(|err| {
                log::error!("reading formats from {}: {err}", path.display())
            })?;
            FormatRegistry::from_json(&json).inspect_err(|err| {
                log::error!("parsing formats from {}: {err}", path.display())
            })?
        }
        None => FormatRegistry::builtin(),
    };

    let file = File::open(&args.reference).inspect_err(|err| {
        log::error!("opening reference tables {}: {err}", args.reference.display())
    })?;
    let tables = load_reference_tables(BufReader::new(file)).inspect_err(|err| {
        log::error!("parsing reference tables {}: {err}", args.reference.display())
    })?;

    Ok(run_validation(&registry, &tables, &args.options))
}

/// Process exit status for the outcome of [`run`].
pub fn exit_code(outcome: &Result<ValidationSummary>) -> u8 {
    match outcome {
        Ok(summary) if summary.is_success() => EXIT_PASSED,
        Ok(_) => EXIT_MISMATCH,
        Err(_) => EXIT_UNUSABLE,
    }
}
