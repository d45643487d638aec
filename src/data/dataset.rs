//! Comma-separated labelled samples: `id,label,f1,...,fK`.

use std::path::Path;

use serde::Deserialize;

use super::FeatureStats;
use crate::diagnostic::Diagnostic;
use crate::error::{Error, Result};
use crate::span::{Span, Spanned};

/// Label tokens for the two classes.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct LabelMap {
    /// Token for class 1.
    pub positive: String,
    /// Token for class 0.
    pub negative: String,
}

impl Default for LabelMap {
    fn default() -> Self {
        Self {
            positive: "M".into(),
            negative: "B".into(),
        }
    }
}

impl LabelMap {
    pub fn new(positive: impl Into<String>, negative: impl Into<String>) -> Self {
        Self {
            positive: positive.into(),
            negative: negative.into(),
        }
    }

    pub fn class(&self, token: &str) -> Option<usize> {
        if token == self.positive {
            Some(1)
        } else if token == self.negative {
            Some(0)
        } else {
            None
        }
    }
}

/// How to read a dataset file.
#[derive(Clone, Debug, PartialEq)]
pub struct DatasetFormat {
    pub labels: LabelMap,
    /// Expected feature columns. `None` infers the count from the first
    /// well-formed line.
    pub features: Option<usize>,
}

impl Default for DatasetFormat {
    fn default() -> Self {
        Self {
            labels: LabelMap::default(),
            features: Some(30),
        }
    }
}

/// Samples per class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClassDistribution {
    pub negative: usize,
    pub positive: usize,
}

impl ClassDistribution {
    pub fn total(&self) -> usize {
        self.negative + self.positive
    }

    pub fn negative_pct(&self) -> f64 {
        pct(self.negative, self.total())
    }

    pub fn positive_pct(&self) -> f64 {
        pct(self.positive, self.total())
    }
}

fn pct(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * part as f64 / total as f64
    }
}

/// Binary-labelled feature rows, in file order.
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    ids: Vec<String>,
    features: Vec<Vec<f64>>,
    labels: Vec<usize>,
    feature_count: usize,
}

impl Dataset {
    /// Build from already-parsed columns. Every row must have the same
    /// width and every label must be 0 or 1.
    pub fn from_parts(ids: Vec<String>, features: Vec<Vec<f64>>, labels: Vec<usize>) -> Result<Self> {
        if features.len() != labels.len() {
            return Err(Error::SizeMismatch {
                samples: features.len(),
                labels: labels.len(),
            });
        }
        if ids.len() != features.len() {
            return Err(Error::Dataset(format!(
                "{} ids for {} samples",
                ids.len(),
                features.len()
            )));
        }
        let Some(first) = features.first() else {
            return Err(Error::Dataset("no samples".into()));
        };
        let feature_count = first.len();
        if feature_count == 0 {
            return Err(Error::Dataset("samples have no features".into()));
        }
        if let Some((i, row)) = features.iter().enumerate().find(|(_, r)| r.len() != feature_count) {
            return Err(Error::Dataset(format!(
                "sample {} has {} features, expected {}",
                i,
                row.len(),
                feature_count
            )));
        }
        if let Some(bad) = labels.iter().find(|&&y| y > 1) {
            return Err(Error::Dataset(format!("label {} is not binary", bad)));
        }
        Ok(Self {
            ids,
            features,
            labels,
            feature_count,
        })
    }

    /// Parse a dataset from text.
    ///
    /// Malformed lines are skipped and returned as warnings; parsing only
    /// fails when no line survives.
    pub fn parse(source: &str, format: &DatasetFormat) -> Result<(Self, Vec<Diagnostic>)> {
        let mut parser = Parser {
            format,
            expected: format.features,
            ids: Vec::new(),
            features: Vec::new(),
            labels: Vec::new(),
            warnings: Vec::new(),
        };

        let mut offset = 0usize;
        for (idx, raw) in source.split_inclusive('\n').enumerate() {
            let line = raw.trim_end_matches(['\n', '\r']);
            parser.line(idx as u32 + 1, offset, line);
            offset += raw.len();
        }

        let skipped = parser.warnings.len();
        if parser.features.is_empty() {
            return Err(Error::Dataset(format!(
                "no usable samples ({} lines skipped)",
                skipped
            )));
        }
        let dataset = Self::from_parts(parser.ids, parser.features, parser.labels)?;
        Ok((dataset, parser.warnings))
    }

    /// Read and parse a dataset file. Skipped lines are logged at `warn`.
    pub fn load(path: impl AsRef<Path>, format: &DatasetFormat) -> Result<(Self, Vec<Diagnostic>)> {
        let (dataset, warnings, _) = Self::load_with_source(path, format)?;
        Ok((dataset, warnings))
    }

    /// Like [`Dataset::load`], also returning the file text the warning
    /// spans point into.
    pub fn load_with_source(
        path: impl AsRef<Path>,
        format: &DatasetFormat,
    ) -> Result<(Self, Vec<Diagnostic>, String)> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let (dataset, warnings) = Self::parse(&source, format)?;
        for warning in &warnings {
            tracing::warn!(file = %path.display(), "skipped {}", warning);
        }
        tracing::info!(
            file = %path.display(),
            samples = dataset.len(),
            features = dataset.feature_count(),
            skipped = warnings.len(),
            "dataset loaded"
        );
        Ok((dataset, warnings, source))
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn feature_count(&self) -> usize {
        self.feature_count
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn distribution(&self) -> ClassDistribution {
        let positive = self.labels.iter().filter(|&&y| y == 1).count();
        ClassDistribution {
            negative: self.labels.len() - positive,
            positive,
        }
    }

    /// Z-score every feature with statistics fitted on this dataset.
    pub fn normalize(&mut self) -> FeatureStats {
        let stats = FeatureStats::fit(self);
        stats.apply(&mut self.features);
        tracing::debug!(features = self.feature_count, "z-score normalization applied");
        stats
    }

    /// Z-score every feature with externally fitted statistics.
    pub fn normalize_with(&mut self, stats: &FeatureStats) -> Result<()> {
        if stats.len() != self.feature_count {
            return Err(Error::InputSizeMismatch {
                expected: self.feature_count,
                found: stats.len(),
            });
        }
        stats.apply(&mut self.features);
        Ok(())
    }
}

struct Parser<'f> {
    format: &'f DatasetFormat,
    expected: Option<usize>,
    ids: Vec<String>,
    features: Vec<Vec<f64>>,
    labels: Vec<usize>,
    warnings: Vec<Diagnostic>,
}

impl Parser<'_> {
    fn line(&mut self, number: u32, offset: usize, line: &str) {
        if line.trim().is_empty() {
            return;
        }
        let whole = Span::new(number, offset as u32, (offset + line.len()) as u32);
        let tokens = tokenize(number, offset, line);

        let id = &tokens[0];
        if id.node.is_empty() {
            self.skip(Diagnostic::warning("missing sample id".into(), id.span.merge(whole)));
            return;
        }

        let Some(label) = tokens.get(1) else {
            self.skip(
                Diagnostic::warning("missing label".into(), whole).with_help(format!(
                    "expected '{}' or '{}' after the id",
                    self.format.labels.positive, self.format.labels.negative
                )),
            );
            return;
        };
        let Some(class) = self.format.labels.class(label.node) else {
            self.skip(
                Diagnostic::warning(format!("unknown label '{}'", label.node), label.span).with_help(
                    format!(
                        "expected '{}' or '{}'",
                        self.format.labels.positive, self.format.labels.negative
                    ),
                ),
            );
            return;
        };

        let columns = &tokens[2..];
        let mut row = Vec::with_capacity(columns.len());
        for (i, column) in columns.iter().enumerate() {
            match column.node.parse::<f64>() {
                Ok(v) if v.is_finite() => row.push(v),
                _ => {
                    self.skip(Diagnostic::warning(
                        format!("cannot parse feature {} '{}'", i + 1, column.node),
                        column.span,
                    ));
                    return;
                }
            }
        }

        match self.expected {
            Some(expected) if expected != row.len() => {
                let span = match (columns.first(), columns.last()) {
                    (Some(a), Some(b)) => a.span.merge(b.span),
                    _ => whole,
                };
                self.skip(
                    Diagnostic::warning(
                        format!("expected {} features, found {}", expected, row.len()),
                        span,
                    )
                    .with_note(format!("sample '{}'", id.node)),
                );
                return;
            }
            Some(_) => {}
            None if row.is_empty() => {
                self.skip(Diagnostic::warning("no feature columns".into(), whole));
                return;
            }
            None => self.expected = Some(row.len()),
        }

        self.ids.push(id.node.to_string());
        self.labels.push(class);
        self.features.push(row);
    }

    fn skip(&mut self, diagnostic: Diagnostic) {
        self.warnings.push(diagnostic);
    }
}

/// Split a line on commas, trimming whitespace around each field.
fn tokenize(number: u32, offset: usize, line: &str) -> Vec<Spanned<&str>> {
    let mut tokens = Vec::new();
    let mut start = 0usize;
    for field in line.split(',') {
        let lead = field.len() - field.trim_start().len();
        let text = field.trim();
        let s = offset + start + lead;
        tokens.push(Spanned::new(
            text,
            Span::new(number, s as u32, (s + text.len()) as u32),
        ));
        start += field.len() + 1;
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three() -> DatasetFormat {
        DatasetFormat {
            labels: LabelMap::default(),
            features: Some(3),
        }
    }

    #[test]
    fn parses_well_formed_lines() {
        let src = "842302,M,17.99,10.38,122.8\n842517,B,20.57,17.77,132.9\n";
        let (ds, warnings) = Dataset::parse(src, &three()).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.feature_count(), 3);
        assert_eq!(ds.labels(), &[1, 0]);
        assert_eq!(ds.ids(), &["842302".to_string(), "842517".to_string()]);
        assert_eq!(ds.features()[1], vec![20.57, 17.77, 132.9]);
    }

    #[test]
    fn skips_malformed_lines_with_spans() {
        let src = "1,M,1,2,3\n2,X,1,2,3\n3,B,1,oops,3\n4,B,1,2\n\n5,B\n6,B,4,5,6\r\n";
        let (ds, warnings) = Dataset::parse(src, &three()).unwrap();
        assert_eq!(ds.ids(), &["1".to_string(), "6".to_string()]);
        assert_eq!(warnings.len(), 4);

        assert!(warnings[0].message.contains("unknown label 'X'"));
        assert_eq!(warnings[0].span.line, 2);
        assert_eq!(&src[warnings[0].span.range()], "X");

        assert!(warnings[1].message.contains("'oops'"));
        assert_eq!(&src[warnings[1].span.range()], "oops");

        assert!(warnings[2].message.contains("expected 3 features, found 2"));
        assert_eq!(&src[warnings[2].span.range()], "1,2");

        assert_eq!(warnings[3].span.line, 6);
        assert!(warnings[3].message.contains("expected 3 features, found 0"));
    }

    #[test]
    fn missing_label_is_reported() {
        let src = "7\n8,M,1,2,3\n";
        let (ds, warnings) = Dataset::parse(src, &three()).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(warnings[0].message, "missing label");
        assert!(warnings[0].help.is_some());
    }

    #[test]
    fn infers_feature_count_from_first_good_line() {
        let format = DatasetFormat {
            labels: LabelMap::new("yes", "no"),
            features: None,
        };
        let src = "a,maybe,1,2\nb,yes,1,2\nc,no,1,2,3\nd,no,0.5,0.25\n";
        let (ds, warnings) = Dataset::parse(src, &format).unwrap();
        assert_eq!(ds.feature_count(), 2);
        assert_eq!(ds.labels(), &[1, 0]);
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn no_usable_samples_is_an_error() {
        let err = Dataset::parse("1,Q,1,2,3\n", &three()).unwrap_err();
        assert!(matches!(err, Error::Dataset(_)));
        let err = Dataset::parse("", &three()).unwrap_err();
        assert!(matches!(err, Error::Dataset(_)));
    }

    #[test]
    fn distribution_percentages() {
        let src = "1,M,1,2,3\n2,B,1,2,3\n3,B,1,2,3\n4,B,1,2,3\n";
        let (ds, _) = Dataset::parse(src, &three()).unwrap();
        let d = ds.distribution();
        assert_eq!((d.negative, d.positive), (3, 1));
        assert_eq!(d.positive_pct(), 25.0);
        assert_eq!(d.negative_pct(), 75.0);
    }

    #[test]
    fn from_parts_validates() {
        assert!(Dataset::from_parts(vec![], vec![], vec![]).is_err());
        let err = Dataset::from_parts(
            vec!["a".into(), "b".into()],
            vec![vec![1.0], vec![1.0, 2.0]],
            vec![0, 1],
        )
        .unwrap_err();
        assert!(matches!(err, Error::Dataset(_)));
        let err = Dataset::from_parts(vec!["a".into()], vec![vec![1.0]], vec![2]).unwrap_err();
        assert!(err.to_string().contains("not binary"));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Dataset::load("/definitely/not/here.data", &three()).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.data"));
    }

    #[test]
    fn load_with_source_keeps_text_for_spans() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small.data");
        let text = "1,M,1,2,3\n2,Q,1,2,3\n3,B,4,5,6\n";
        std::fs::write(&path, text).unwrap();

        let (ds, warnings, source) = Dataset::load_with_source(&path, &three()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(source, text);
        assert_eq!(warnings.len(), 1);
        assert_eq!(&source[warnings[0].span.range()], "Q");

        let missing = dir.path().join("gone.data");
        let err = Dataset::load_with_source(&missing, &three()).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        assert!(err.to_string().contains("gone.data"));
    }

    #[test]
    fn normalize_with_checks_width() {
        let (mut a, _) = Dataset::parse("1,M,1,2,3\n2,B,3,4,5\n", &three()).unwrap();
        let stats = a.normalize();
        let (mut b, _) = Dataset::parse("1,M,1,2\n", &DatasetFormat {
            features: Some(2),
            ..Default::default()
        })
        .unwrap();
        assert!(matches!(
            b.normalize_with(&stats),
            Err(Error::InputSizeMismatch { expected: 2, found: 3 })
        ));
    }
}
