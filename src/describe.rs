//! Descriptive statistics and missing-value inspection of the raw frame.

use polars::prelude::*;

/// Row labels of the frame returned by [`describe`], in order
pub const STATISTICS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

/// Summarises every numeric column of `df`.
///
/// The result has a `statistic` column holding [`STATISTICS`] and one `f64`
/// column per numeric input column. `std` is the sample standard deviation and
/// the quartiles are linearly interpolated. Statistics undefined for a column
/// (for example over zero non-null values) are null.
pub fn describe(df: &DataFrame) -> PolarsResult<DataFrame> {
    let mut columns = vec![Series::new("statistic", &STATISTICS)];

    for series in df.get_columns() {
        if !series.dtype().is_numeric() {
            continue;
        }

        let values = series.cast(&DataType::Float64)?;
        let ca = values.f64()?;
        let count = (ca.len() - ca.null_count()) as f64;

        let summary: Vec<Option<f64>> = vec![
            Some(count),
            ca.mean(),
            ca.std(1),
            ca.min(),
            ca.quantile(0.25, QuantileInterpolOptions::Linear)?,
            ca.quantile(0.5, QuantileInterpolOptions::Linear)?,
            ca.quantile(0.75, QuantileInterpolOptions::Linear)?,
            ca.max(),
        ];
        columns.push(Series::new(series.name(), summary));
    }

    DataFrame::new(columns)
}

/// Pearson correlation between every pair of numeric columns of `df`.
///
/// The result has a `column` column naming the numeric columns and one `f64`
/// column per numeric column, so cell `(a, b)` holds `corr(a, b)`. Pairs with
/// no variance come out as NaN.
pub fn correlation(df: &DataFrame) -> PolarsResult<DataFrame> {
    let names: Vec<&str> = df
        .get_columns()
        .iter()
        .filter(|s| s.dtype().is_numeric())
        .map(|s| s.name())
        .collect();

    let mut columns = vec![Series::new("column", &names)];
    if names.is_empty() {
        return DataFrame::new(columns);
    }

    let mut exprs = Vec::with_capacity(names.len() * names.len());
    for (i, a) in names.iter().enumerate() {
        for (j, b) in names.iter().enumerate() {
            exprs.push(
                pearson_corr(
                    col(a).cast(DataType::Float64),
                    col(b).cast(DataType::Float64),
                    1,
                )
                .alias(&pair_name(i, j)),
            );
        }
    }
    let pairs = df.clone().lazy().select(exprs).collect()?;

    for (j, b) in names.iter().enumerate() {
        let values = (0..names.len())
            .map(|i| Ok(pairs.column(&pair_name(i, j))?.f64()?.get(0)))
            .collect::<PolarsResult<Vec<Option<f64>>>>()?;
        columns.push(Series::new(b, values));
    }

    DataFrame::new(columns)
}

fn pair_name(i: usize, j: usize) -> String {
    format!("{}_{}", i, j)
}

/// Null count of every column, in column order
pub fn missing_values(df: &DataFrame) -> Vec<(String, usize)> {
    df.get_columns()
        .iter()
        .map(|s| (s.name().to_string(), s.null_count()))
        .collect()
}
