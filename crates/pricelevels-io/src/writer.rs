//! Level artifact writer: a JSON summary and a CSV of horizontal lines.

use std::fs;
use std::path::{Path, PathBuf};

use pricelevels_cluster::LevelFit;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::domain::Ticker;
use crate::IoError;

/// Writes fitted price levels to disk.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are named `{ticker}_levels.json` and `{ticker}_lines.csv`.
/// Band lines (`center ± spread`) are included unless disabled with
/// [`LevelWriter::with_plot_band`].
pub struct LevelWriter {
    output_dir: PathBuf,
    ticker: Ticker,
    plot_band: bool,
}

impl LevelWriter {
    /// Create a new writer targeting the given directory and ticker.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), ticker = %ticker))]
    pub fn new(output_dir: &Path, ticker: Ticker) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            ticker,
            plot_band: true,
        })
    }

    /// Include or omit the `± spread` band lines.
    #[must_use]
    pub fn with_plot_band(mut self, plot_band: bool) -> Self {
        self.plot_band = plot_band;
        self
    }

    /// Return the path of the JSON summary.
    #[must_use]
    pub fn levels_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_levels.json", self.ticker.as_str()))
    }

    /// Return the path of the lines CSV.
    #[must_use]
    pub fn lines_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_lines.csv", self.ticker.as_str()))
    }

    /// Write a fit to `{ticker}_levels.json`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::Serialize`] | The artifact cannot be encoded |
    /// | [`IoError::WriteFile`] | The file cannot be written |
    #[instrument(skip_all, fields(ticker = %self.ticker))]
    pub fn write_levels(&self, train_n: usize, fit: &LevelFit) -> Result<PathBuf, IoError> {
        let path = self.levels_path();

        let clusters: Vec<ClusterEntry> = fit
            .records
            .iter()
            .enumerate()
            .map(|(label, r)| ClusterEntry {
                label,
                center: r.center,
                spread: r.spread,
                member_count: r.member_count,
            })
            .collect();

        let bands = self.plot_band.then(|| {
            fit.bands()
                .into_iter()
                .map(|b| BandEntry {
                    lower: b.lower,
                    center: b.center,
                    upper: b.upper,
                })
                .collect()
        });

        let artifact = LevelsArtifact {
            ticker: self.ticker.as_str(),
            estimator: fit.estimator.as_str(),
            k: fit.k(),
            train_n,
            inertia: fit.inertia.value(),
            converged: fit.converged,
            iterations: fit.iterations,
            n_init_used: fit.n_init_used,
            clusters,
            bands,
        };

        let json = serde_json::to_string_pretty(&artifact).map_err(|e| IoError::Serialize {
            path: path.clone(),
            source: e,
        })?;
        fs::write(&path, &json).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

        info!(path = %path.display(), "levels written");
        Ok(path)
    }

    /// Write one row per horizontal line to `{ticker}_lines.csv`.
    ///
    /// Columns are `label,kind,level`. Each cluster contributes a `center`
    /// row, followed by `upper` and `lower` rows when bands are enabled.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::CsvWrite`] | A row cannot be encoded or the file cannot be created |
    /// | [`IoError::WriteFile`] | The file cannot be flushed |
    #[instrument(skip_all, fields(ticker = %self.ticker))]
    pub fn write_lines(&self, fit: &LevelFit) -> Result<PathBuf, IoError> {
        let path = self.lines_path();
        let rows = line_rows(fit, self.plot_band);

        let mut wtr = csv::Writer::from_path(&path).map_err(|e| IoError::CsvWrite {
            path: path.clone(),
            source: e,
        })?;
        for row in &rows {
            wtr.serialize(row).map_err(|e| IoError::CsvWrite {
                path: path.clone(),
                source: e,
            })?;
        }
        wtr.flush().map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

        info!(path = %path.display(), n_lines = rows.len(), "lines written");
        Ok(path)
    }
}

fn line_rows(fit: &LevelFit, plot_band: bool) -> Vec<LineRow> {
    let mut rows = Vec::with_capacity(fit.k() * if plot_band { 3 } else { 1 });
    for (i, band) in fit.bands().iter().enumerate() {
        rows.push(LineRow {
            label: format!("Cluster {i}"),
            kind: LineKind::Center,
            level: band.center,
        });
        if plot_band {
            rows.push(LineRow {
                label: format!("Cluster {i} + SD"),
                kind: LineKind::Upper,
                level: band.upper,
            });
            rows.push(LineRow {
                label: format!("Cluster {i} - SD"),
                kind: LineKind::Lower,
                level: band.lower,
            });
        }
    }
    rows
}

// ── Artifact types (private, serialization-only) ────────────────────────────

#[derive(Serialize)]
struct LevelsArtifact<'a> {
    ticker: &'a str,
    estimator: &'static str,
    k: usize,
    train_n: usize,
    inertia: f64,
    converged: bool,
    iterations: usize,
    n_init_used: usize,
    clusters: Vec<ClusterEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bands: Option<Vec<BandEntry>>,
}

#[derive(Serialize)]
struct ClusterEntry {
    label: usize,
    center: f64,
    spread: f64,
    member_count: usize,
}

#[derive(Serialize)]
struct BandEntry {
    lower: f64,
    center: f64,
    upper: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum LineKind {
    Center,
    Upper,
    Lower,
}

#[derive(Debug, Serialize)]
struct LineRow {
    label: String,
    kind: LineKind,
    level: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricelevels_cluster::LevelConfig;
    use pricelevels_stats::EstimatorKind;
    use tempfile::TempDir;

    fn sample_fit() -> LevelFit {
        LevelConfig::new(2, EstimatorKind::MeanStd)
            .unwrap()
            .fit(&[10.0, 11.0, 9.0, 100.0, 102.0, 98.0])
            .unwrap()
    }

    fn ticker(s: &str) -> Ticker {
        Ticker::new(s.to_string()).unwrap()
    }

    #[test]
    fn new_creates_nested_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        LevelWriter::new(&nested, ticker("X")).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn levels_json_fields() {
        let dir = TempDir::new().unwrap();
        let writer = LevelWriter::new(dir.path(), ticker("BTC-USD")).unwrap();
        let path = writer.write_levels(6, &sample_fit()).unwrap();
        assert_eq!(path, dir.path().join("BTC-USD_levels.json"));

        let content: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(content["ticker"], "BTC-USD");
        assert_eq!(content["estimator"], "mean");
        assert_eq!(content["k"], 2);
        assert_eq!(content["train_n"], 6);
        assert_eq!(content["converged"], true);
        assert_eq!(content["clusters"].as_array().unwrap().len(), 2);
        assert_eq!(content["clusters"][0]["center"].as_f64().unwrap(), 10.0);
        assert_eq!(content["clusters"][1]["member_count"], 3);
        assert_eq!(content["bands"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn levels_json_omits_bands_when_disabled() {
        let dir = TempDir::new().unwrap();
        let writer = LevelWriter::new(dir.path(), ticker("ETH"))
            .unwrap()
            .with_plot_band(false);
        let path = writer.write_levels(6, &sample_fit()).unwrap();
        let content: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(content.get("bands").is_none());
    }

    #[test]
    fn lines_csv_with_bands() {
        let dir = TempDir::new().unwrap();
        let writer = LevelWriter::new(dir.path(), ticker("SPY")).unwrap();
        let path = writer.write_lines(&sample_fit()).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "label,kind,level");
        assert_eq!(lines.len(), 1 + 2 * 3);
        assert_eq!(lines[1], "Cluster 0,center,10.0");
        assert!(lines[2].starts_with("Cluster 0 + SD,upper,"));
        assert!(lines[3].starts_with("Cluster 0 - SD,lower,"));
        assert_eq!(lines[4], "Cluster 1,center,100.0");
    }

    #[test]
    fn lines_csv_without_bands() {
        let dir = TempDir::new().unwrap();
        let writer = LevelWriter::new(dir.path(), ticker("SPY"))
            .unwrap()
            .with_plot_band(false);
        let path = writer.write_lines(&sample_fit()).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 1 + 2);
        assert!(text.lines().skip(1).all(|l| l.contains(",center,")));
    }

    #[test]
    fn band_rows_bracket_center() {
        let fit = sample_fit();
        let rows = line_rows(&fit, true);
        for chunk in rows.chunks(3) {
            assert!(chunk[2].level <= chunk[0].level && chunk[0].level <= chunk[1].level);
        }
    }
}
