/// Reductions applicable to a feature series.
///
/// `NaN` values are ignored; reducing an empty (or all-`NaN`) series yields
/// `NaN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Min,
    Max,
    Sum,
    Averager,
    /// Population standard deviation
    StdDev,
}

impl Operator {
    #[allow(clippy::cast_precision_loss)]
    pub fn apply(self, values: &[f64]) -> f64 {
        let valid: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        if valid.is_empty() {
            return f64::NAN;
        }
        let n = valid.len() as f64;

        match self {
            Operator::Min => valid.iter().copied().fold(f64::INFINITY, f64::min),
            Operator::Max => valid.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Operator::Sum => valid.iter().sum(),
            Operator::Averager => valid.iter().sum::<f64>() / n,
            Operator::StdDev => {
                let mean = valid.iter().sum::<f64>() / n;
                let variance = valid.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
                variance.sqrt()
            }
        }
    }
}
