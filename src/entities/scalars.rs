use crate::{
    column::{self, Column, ColumnRole, ColumnValues, EntityColumns},
    entities::{check_frame, Entity, FrameValue},
    error::{KinetraceError, KinetraceResult},
};

/// One scalar channel over the trial (a joint angle, an activation level),
/// optionally bracketed by a fixed display range.
#[derive(Clone, Debug)]
pub struct ScalarSeries {
    name: String,
    values: Vec<f64>,
    range: Option<(f64, f64)>,
}

impl ScalarSeries {
    pub fn new(
        name: impl Into<String>,
        values: Vec<f64>,
        range: Option<(f64, f64)>,
    ) -> KinetraceResult<Self> {
        let name = name.into();
        if values.is_empty() {
            return Err(KinetraceError::config(format!(
                "scalar series '{name}' needs at least one sample"
            )));
        }
        if let Some((min, max)) = range {
            if min > max {
                return Err(KinetraceError::config(format!(
                    "scalar series '{name}' has an inverted range ({min} > {max})"
                )));
            }
        }
        Ok(Self { name, values, range })
    }

    pub fn range(&self) -> Option<(f64, f64)> {
        self.range
    }
}

impl Entity for ScalarSeries {
    fn name(&self) -> &str {
        &self.name
    }

    fn frame_count(&self) -> usize {
        self.values.len()
    }

    fn value_at(&self, frame: usize) -> KinetraceResult<FrameValue> {
        check_frame(&self.name, frame, self.values.len())?;
        Ok(FrameValue::Scalar {
            value: self.values[frame],
            min: self.range.map(|(min, _)| min),
            max: self.range.map(|(_, max)| max),
        })
    }

    fn to_columns(&self) -> KinetraceResult<EntityColumns> {
        let frames = self.values.len();
        let mut columns = vec![Column::new(
            ColumnRole::Scalar,
            ColumnValues::Scalars(self.values.clone()),
            vec![1; frames],
        )?];
        if let Some((min, max)) = self.range {
            let (min_values, min_partition) = column::repeat_per_frame(min, frames).into_parts();
            let (max_values, max_partition) = column::repeat_per_frame(max, frames).into_parts();
            columns.push(Column::new(
                ColumnRole::ScalarMin,
                ColumnValues::Scalars(min_values),
                min_partition,
            )?);
            columns.push(Column::new(
                ColumnRole::ScalarMax,
                ColumnValues::Scalars(max_values),
                max_partition,
            )?);
        }
        EntityColumns::new(self.name.clone(), columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverted_range_is_rejected() {
        assert!(ScalarSeries::new("q/hip", vec![0.0], Some((1.0, -1.0))).is_err());
    }

    #[test]
    fn value_carries_the_range_bounds() {
        let series = ScalarSeries::new("q/hip", vec![0.1, 0.2], Some((-1.0, 1.0))).unwrap();
        let FrameValue::Scalar { value, min, max } = series.value_at(1).unwrap() else {
            panic!("expected scalar");
        };
        assert_eq!(value, 0.2);
        assert_eq!(min, Some(-1.0));
        assert_eq!(max, Some(1.0));
    }

    #[test]
    fn unbounded_series_encodes_a_single_column() {
        let series = ScalarSeries::new("q/hip", vec![0.1, 0.2, 0.3], None).unwrap();
        let columns = series.to_columns().unwrap();
        assert_eq!(columns.columns.len(), 1);
        assert_eq!(columns.columns[0].partition, vec![1, 1, 1]);
    }

    #[test]
    fn bounded_series_adds_min_and_max_columns() {
        let series = ScalarSeries::new("q/hip", vec![0.1, 0.2], Some((-1.0, 1.0))).unwrap();
        let columns = series.to_columns().unwrap();
        assert_eq!(columns.columns.len(), 3);
        assert_eq!(columns.columns[1].role, ColumnRole::ScalarMin);
        assert_eq!(columns.columns[2].role, ColumnRole::ScalarMax);
    }
}
