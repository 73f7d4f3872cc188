use std::cmp::Ordering;

use tankfill_core::Model;

use super::Error;

/// Integrand evaluations per application of the rule.
pub(super) const POINTS: usize = 15;

/// Kronrod abscissae on `[-1, 1]`, descending. Odd indices are Gauss nodes.
const XGK: [f64; 8] = [
    0.991_455_371_120_812_6,
    0.949_107_912_342_758_5,
    0.864_864_423_359_769_1,
    0.741_531_185_599_394_4,
    0.586_087_235_467_691_1,
    0.405_845_151_377_397_2,
    0.207_784_955_007_898_5,
    0.0,
];

/// Kronrod weights matching `XGK`.
const WGK: [f64; 8] = [
    0.022_935_322_010_529_22,
    0.063_092_092_629_978_55,
    0.104_790_010_322_250_18,
    0.140_653_259_715_525_92,
    0.169_004_726_639_267_9,
    0.190_350_578_064_785_4,
    0.204_432_940_075_298_9,
    0.209_482_141_084_727_83,
];

/// Gauss weights for `XGK[1]`, `XGK[3]`, `XGK[5]` and the center.
const WG: [f64; 4] = [
    0.129_484_966_168_869_7,
    0.279_705_391_489_276_7,
    0.381_830_050_505_118_9,
    0.417_959_183_673_469_4,
];

/// An interval with its Kronrod estimate and error.
#[derive(Debug, Clone, Copy)]
pub(super) struct Segment {
    pub(super) a: f64,
    pub(super) b: f64,
    pub(super) value: f64,
    pub(super) error: f64,
}

impl Segment {
    /// Applies the 7/15-point Gauss–Kronrod pair on `[a, b]`.
    pub(super) fn integrate<M>(model: &M, a: f64, b: f64) -> Result<Self, Error>
    where
        M: Model<Input = f64, Output = f64>,
    {
        let center = 0.5 * (a + b);
        let half = 0.5 * (b - a);

        let f_center = sample(model, center)?;
        let mut kronrod = WGK[7] * f_center;
        let mut gauss = WG[3] * f_center;

        for (j, (&x, &w)) in XGK.iter().zip(WGK.iter()).take(7).enumerate() {
            let dx = half * x;
            let pair = sample(model, center - dx)? + sample(model, center + dx)?;
            kronrod += w * pair;
            if j % 2 == 1 {
                gauss += WG[j / 2] * pair;
            }
        }

        Ok(Self {
            a,
            b,
            value: kronrod * half,
            error: ((kronrod - gauss) * half).abs(),
        })
    }
}

fn sample<M>(model: &M, t: f64) -> Result<f64, Error>
where
    M: Model<Input = f64, Output = f64>,
{
    let value = model.call(&t).map_err(|e| Error::model(t, e))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::NonFiniteIntegrand { t, value })
    }
}

// Heap order: largest error first.
impl PartialEq for Segment {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Segment {}

impl PartialOrd for Segment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Segment {
    fn cmp(&self, other: &Self) -> Ordering {
        self.error.total_cmp(&other.error)
    }
}
