use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, WriterBuilder};

use super::{write_atomic, SeriesStore};
use crate::execution::PriceSeries;
use crate::models::PricePoint;
use crate::Result;

/// Price series kept as header-less `index,price` CSV rows
pub struct CsvSeriesStore {
    path: PathBuf,
}

impl CsvSeriesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_points(&self) -> Result<Vec<PricePoint>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .from_path(&self.path)?;

        let mut points = Vec::new();
        for record in reader.deserialize() {
            let (index, price): (usize, f64) = record?;
            points.push(PricePoint { index, price });
        }

        Ok(points)
    }
}

impl SeriesStore for CsvSeriesStore {
    fn load(&self) -> PriceSeries {
        if !self.path.exists() {
            tracing::info!("No price history at {}, starting empty", self.path.display());
            return PriceSeries::new();
        }

        match self.read_points() {
            Ok(points) => {
                let series = PriceSeries::from_points(points);
                tracing::info!(
                    "Loaded {} prices from {}",
                    series.len(),
                    self.path.display()
                );
                series
            }
            Err(e) => {
                tracing::warn!(
                    "Price history at {} is unreadable ({}), starting empty",
                    self.path.display(),
                    e
                );
                PriceSeries::new()
            }
        }
    }

    fn save(&self, series: &PriceSeries) -> Result<()> {
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());

        for point in series.points() {
            writer.serialize((point.index, point.price))?;
        }
        writer.flush()?;

        write_atomic(&self.path, writer.get_ref())
    }
}
