//! PatternRepository - recorded reference cases loaded from disk
//!
//! Layout:
//!
//! ```text
//! <root>/regular/<case>/bpm/*.csv
//! <root>/regular/<case>/uterus/*.csv
//! <root>/hypoxia/<case>/bpm/*.csv
//! <root>/hypoxia/<case>/uterus/*.csv
//! ```
//!
//! Each CSV has a header row followed by `time,value` rows.

use std::fs;
use std::path::{Path, PathBuf};

use contracts::ContractError;
use tracing::{debug, info, instrument, warn};

use crate::error::{ModelError, Result};
use crate::pattern::{PatternKind, ReferencePattern, Series, SeriesPoint};
use crate::random::RandomSource;

/// Default cap on cases loaded per pool
pub const DEFAULT_MAX_PER_POOL: usize = 5;

/// Probability of drawing from the regular pool
pub const REGULAR_POOL_WEIGHT: f64 = 0.7;

const HEART_RATE_DIR: &str = "bpm";
const UTERINE_TONE_DIR: &str = "uterus";

/// Handle to a pattern inside the repository
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternRef {
    pub kind: PatternKind,
    pub index: usize,
}

/// Read-only set of reference patterns, shareable across models
#[derive(Debug, Clone)]
pub struct PatternRepository {
    regular: Vec<ReferencePattern>,
    hypoxic: Vec<ReferencePattern>,
}

impl PatternRepository {
    /// Load both pools from `root`
    ///
    /// # Errors
    /// `ContractError::DataLoad` when a pool directory is unreadable or no
    /// case could be loaded at all
    #[instrument(name = "pattern_repository_load", skip(root), fields(root = %root.display()))]
    pub fn load(root: &Path, max_per_pool: usize) -> Result<Self> {
        let regular = load_pool(root, PatternKind::Regular, max_per_pool)?;
        let hypoxic = load_pool(root, PatternKind::Hypoxic, max_per_pool)?;

        let repository = Self::from_patterns(regular, hypoxic).map_err(|_| {
            ContractError::data_load(root.display().to_string(), "no loadable reference patterns")
        })?;

        info!(
            regular = repository.regular.len(),
            hypoxic = repository.hypoxic.len(),
            "reference patterns loaded"
        );
        Ok(repository)
    }

    /// Build from already decoded patterns
    ///
    /// # Errors
    /// `ContractError::DataLoad` when both pools are empty
    pub fn from_patterns(
        regular: Vec<ReferencePattern>,
        hypoxic: Vec<ReferencePattern>,
    ) -> Result<Self> {
        if regular.is_empty() && hypoxic.is_empty() {
            return Err(ContractError::data_load("<memory>", "no reference patterns").into());
        }
        Ok(Self { regular, hypoxic })
    }

    pub fn regular(&self) -> &[ReferencePattern] {
        &self.regular
    }

    pub fn hypoxic(&self) -> &[ReferencePattern] {
        &self.hypoxic
    }

    pub fn len(&self) -> usize {
        self.regular.len() + self.hypoxic.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, pattern: PatternRef) -> Option<&ReferencePattern> {
        self.pool(pattern.kind).get(pattern.index)
    }

    /// Pick a pattern: regular with probability 0.7, else hypoxic; an empty
    /// pool falls through to the other one
    pub fn choose(&self, rng: &mut RandomSource) -> PatternRef {
        let preferred = if rng.chance(REGULAR_POOL_WEIGHT) {
            PatternKind::Regular
        } else {
            PatternKind::Hypoxic
        };

        let kind = if self.pool(preferred).is_empty() {
            match preferred {
                PatternKind::Regular => PatternKind::Hypoxic,
                PatternKind::Hypoxic => PatternKind::Regular,
            }
        } else {
            preferred
        };

        PatternRef {
            kind,
            index: rng.index(self.pool(kind).len()),
        }
    }

    fn pool(&self, kind: PatternKind) -> &[ReferencePattern] {
        match kind {
            PatternKind::Regular => &self.regular,
            PatternKind::Hypoxic => &self.hypoxic,
        }
    }
}

fn load_pool(root: &Path, kind: PatternKind, max_per_pool: usize) -> Result<Vec<ReferencePattern>> {
    let pool_dir = root.join(kind.dir_name());
    let mut cases = sorted_entries(&pool_dir)?;
    cases.retain(|path| path.is_dir());

    let mut patterns = Vec::new();
    for case_dir in cases {
        if patterns.len() >= max_per_pool {
            break;
        }
        match load_case(&case_dir, kind) {
            Ok(pattern) => {
                debug!(
                    case = %pattern.name,
                    %kind,
                    heart_rate_points = pattern.heart_rate.points().len(),
                    uterine_points = pattern.uterine_tone.points().len(),
                    "pattern loaded"
                );
                patterns.push(pattern);
            }
            Err(e) => warn!(case = %case_dir.display(), error = %e, "skipping unreadable case"),
        }
    }

    Ok(patterns)
}

fn load_case(case_dir: &Path, kind: PatternKind) -> Result<ReferencePattern> {
    let name = case_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let heart_rate = load_series(&first_csv(&case_dir.join(HEART_RATE_DIR))?)?;
    let uterine_tone = load_series(&first_csv(&case_dir.join(UTERINE_TONE_DIR))?)?;

    Ok(ReferencePattern::new(name, kind, heart_rate, uterine_tone))
}

fn first_csv(dir: &Path) -> Result<PathBuf> {
    sorted_entries(dir)?
        .into_iter()
        .find(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        })
        .ok_or_else(|| ModelError::invalid_series(dir.display().to_string(), "no csv file"))
}

/// Parse `time,value` rows; short or non-numeric rows are skipped
pub fn load_series(path: &Path) -> Result<Series> {
    let display = path.display().to_string();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| ModelError::Csv {
            path: display.clone(),
            source,
        })?;

    let mut points = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| ModelError::Csv {
            path: display.clone(),
            source,
        })?;
        if record.len() < 2 {
            continue;
        }
        let (Ok(time), Ok(value)) = (record[0].parse::<f64>(), record[1].parse::<f64>()) else {
            continue;
        };
        if time.is_finite() && value.is_finite() {
            points.push(SeriesPoint::new(time, value));
        }
    }

    if points.is_empty() {
        return Err(ModelError::invalid_series(display, "no numeric rows"));
    }
    Ok(Series::new(points))
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let read_dir = fs::read_dir(dir)
        .map_err(|e| ContractError::data_load(dir.display().to_string(), e.to_string()))?;

    let mut entries: Vec<PathBuf> = read_dir
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    entries.sort();
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_case(root: &Path, pool: &str, case: &str, bpm: &str, uterus: &str) {
        let case_dir = root.join(pool).join(case);
        fs::create_dir_all(case_dir.join("bpm")).unwrap();
        fs::create_dir_all(case_dir.join("uterus")).unwrap();
        fs::write(case_dir.join("bpm").join("a.csv"), bpm).unwrap();
        fs::write(case_dir.join("uterus").join("a.csv"), uterus).unwrap();
    }

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        write_case(
            dir.path(),
            "regular",
            "case_01",
            "time,value\n0,140\n1,142\n2,138\n",
            "time,value\n0,15\n1,16\n2,17\n",
        );
        write_case(
            dir.path(),
            "hypoxia",
            "case_01",
            "time,value\n0,160\n1,150\n",
            "time,value\n0,20\n1,30\n",
        );
        dir
    }

    #[test]
    fn test_load_both_pools() {
        let dir = fixture();
        let repo = PatternRepository::load(dir.path(), DEFAULT_MAX_PER_POOL).unwrap();

        assert_eq!(repo.regular().len(), 1);
        assert_eq!(repo.hypoxic().len(), 1);
        assert_eq!(repo.regular()[0].name, "case_01");
        assert_eq!(repo.regular()[0].heart_rate.points().len(), 3);
        assert_eq!(repo.hypoxic()[0].kind, PatternKind::Hypoxic);
    }

    #[test]
    fn test_bad_rows_skipped() {
        let dir = fixture();
        write_case(
            dir.path(),
            "regular",
            "case_02",
            "time,value\n0,140\nbroken\n1,abc\n2,150\n",
            "time,value\n0,15\n",
        );

        let repo = PatternRepository::load(dir.path(), DEFAULT_MAX_PER_POOL).unwrap();
        let case = &repo.regular()[1];
        assert_eq!(case.heart_rate.points().len(), 2);
        assert_eq!(case.uterine_tone.points().len(), 1);
    }

    #[test]
    fn test_corrupt_case_skipped() {
        let dir = fixture();
        fs::create_dir_all(dir.path().join("regular").join("case_00").join("bpm")).unwrap();

        let repo = PatternRepository::load(dir.path(), DEFAULT_MAX_PER_POOL).unwrap();
        assert_eq!(repo.regular().len(), 1);
        assert_eq!(repo.regular()[0].name, "case_01");
    }

    #[test]
    fn test_max_per_pool() {
        let dir = fixture();
        for case in ["case_02", "case_03"] {
            write_case(dir.path(), "regular", case, "t,v\n0,1\n", "t,v\n0,1\n");
        }

        let repo = PatternRepository::load(dir.path(), 2).unwrap();
        assert_eq!(repo.regular().len(), 2);
        assert_eq!(repo.regular()[1].name, "case_02");
    }

    #[test]
    fn test_missing_pool_is_data_load_error() {
        let dir = TempDir::new().unwrap();
        write_case(dir.path(), "regular", "case_01", "t,v\n0,1\n", "t,v\n0,1\n");

        let err = PatternRepository::load(dir.path(), DEFAULT_MAX_PER_POOL).unwrap_err();
        assert!(matches!(
            ContractError::from(err),
            ContractError::DataLoad { .. }
        ));
    }

    #[test]
    fn test_empty_pools_is_data_load_error() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("regular")).unwrap();
        fs::create_dir_all(dir.path().join("hypoxia")).unwrap();

        assert!(PatternRepository::load(dir.path(), DEFAULT_MAX_PER_POOL).is_err());
    }

    #[test]
    fn test_choose_falls_through_to_non_empty_pool() {
        let only_hypoxic = vec![ReferencePattern::new(
            "h",
            PatternKind::Hypoxic,
            Series::default(),
            Series::default(),
        )];
        let repo = PatternRepository::from_patterns(Vec::new(), only_hypoxic).unwrap();
        let mut rng = RandomSource::seeded(0);

        for _ in 0..50 {
            let pick = repo.choose(&mut rng);
            assert_eq!(pick.kind, PatternKind::Hypoxic);
            assert!(repo.get(pick).is_some());
        }
    }
}
