use log::{info, warn};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use crate::dataset::Dataset;
use crate::describe::missing_values;
use crate::error::{AnalysisError, Result};
use crate::records::AppointmentRecord;

/// Reads the appointments file into a dataframe with the fixed raw schema.
pub async fn read_csv<P: AsRef<Path>>(path: P) -> Result<DataFrame> {
    let path = path.as_ref();
    let load_error = |source: PolarsError| AnalysisError::Load {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(|e| load_error(e.into()))?;

    let df = CsvReader::new(file)
        .has_header(true)
        .with_dtypes(Option::from(Arc::new(AppointmentRecord::raw_schema())))
        .finish()
        .map_err(load_error)?;

    info!("loaded {:?}: {} rows, {} columns", path, df.height(), df.width());
    Ok(df)
}

/// Reads the file and converts every row into an [`AppointmentRecord`].
///
/// Gaps are logged per column before the conversion, so a gap in a column the
/// report needs is visible next to the error it causes.
pub async fn load_dataset<P: AsRef<Path>>(path: P) -> Result<(DataFrame, Dataset)> {
    let df = read_csv(path).await?;
    for (column, nulls) in missing_values(&df) {
        if nulls > 0 {
            warn!("column {} has {} missing values", column, nulls);
        }
    }

    let dataset = Dataset::from_frame(&df)?;
    Ok((df, dataset))
}
