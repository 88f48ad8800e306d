//! Recorded reference patterns

use std::fmt;

/// One recorded (time, value) point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    pub time: f64,
    pub value: f64,
}

impl SeriesPoint {
    pub const fn new(time: f64, value: f64) -> Self {
        Self { time, value }
    }
}

/// Summary statistics of a series
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SeriesStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
    pub count: usize,
}

impl SeriesStats {
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let values: Vec<f64> = values.into_iter().collect();
        if values.is_empty() {
            return Self::default();
        }

        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;

        Self {
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            mean,
            std_dev: variance.sqrt(),
            count,
        }
    }
}

/// Time-sorted recorded series
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Series {
    points: Vec<SeriesPoint>,
    stats: SeriesStats,
}

impl Series {
    /// Build a series; points are sorted by time
    pub fn new(mut points: Vec<SeriesPoint>) -> Self {
        points.sort_by(|a, b| a.time.total_cmp(&b.time));
        let stats = SeriesStats::from_values(points.iter().map(|p| p.value));
        Self { points, stats }
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn stats(&self) -> &SeriesStats {
        &self.stats
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Recorded span `tN - t0`
    pub fn duration(&self) -> f64 {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => last.time - first.time,
            _ => 0.0,
        }
    }

    /// Interpolated value at session time `elapsed`, looping over the recording
    pub fn value_at(&self, elapsed: f64, speed: f64) -> f64 {
        let points = &self.points;
        let (first, last) = match points.as_slice() {
            [] => return self.stats.mean,
            [only] => return only.value,
            [first, .., last] => (first, last),
        };

        let span = last.time - first.time;
        if span <= 0.0 {
            return first.value;
        }

        let query = first.time + (elapsed * speed).rem_euclid(span);

        // first index whose time lies strictly after the query
        let upper = points.partition_point(|p| p.time <= query);
        if upper == 0 {
            return first.value;
        }
        if upper >= points.len() {
            return last.value;
        }

        let a = points[upper - 1];
        let b = points[upper];
        let dt = b.time - a.time;
        if dt <= 0.0 {
            return a.value;
        }

        a.value + (b.value - a.value) * ((query - a.time) / dt)
    }
}

/// Pattern pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternKind {
    Regular,
    Hypoxic,
}

impl PatternKind {
    /// Pool directory name under the pattern root
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Hypoxic => "hypoxia",
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Regular => "regular",
            Self::Hypoxic => "hypoxic",
        })
    }
}

/// One recorded case (heart rate + uterine tone)
#[derive(Debug, Clone, PartialEq)]
pub struct ReferencePattern {
    pub name: String,
    pub kind: PatternKind,
    pub heart_rate: Series,
    pub uterine_tone: Series,
}

impl ReferencePattern {
    pub fn new(
        name: impl Into<String>,
        kind: PatternKind,
        heart_rate: Series,
        uterine_tone: Series,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            heart_rate,
            uterine_tone,
        }
    }
}
