/// A callable model that maps an input to an output.
///
/// Models must be pure with respect to their input: solvers call them many
/// times, in any order, and expect the same output for the same input.
pub trait Model {
    type Input;
    type Output;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Calls the model with the given input.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    fn call(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}

impl<M: Model + ?Sized> Model for &M {
    type Input = M::Input;
    type Output = M::Output;
    type Error = M::Error;

    fn call(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
        (**self).call(input)
    }
}

/// A captured input/output pair from a model call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot<I, O> {
    pub input: I,
    pub output: O,
}

impl<I, O> Snapshot<I, O> {
    /// Creates a new snapshot from input and output values.
    pub fn new(input: I, output: O) -> Self {
        Self { input, output }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::convert::Infallible;

    struct Doubler;

    impl Model for Doubler {
        type Input = f64;
        type Output = f64;
        type Error = Infallible;

        fn call(&self, input: &f64) -> Result<f64, Self::Error> {
            Ok(2.0 * input)
        }
    }

    fn call_generic<M: Model<Input = f64, Output = f64>>(model: M, x: f64) -> f64 {
        model.call(&x).unwrap_or(f64::NAN)
    }

    #[test]
    fn references_are_models() {
        let model = Doubler;
        assert!((call_generic(&model, 1.5) - 3.0).abs() < f64::EPSILON);
        assert!((call_generic(&&model, 2.0) - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn snapshot_keeps_pair() {
        let snapshot = Snapshot::new(1.0, "one");
        assert_eq!(snapshot.input, 1.0);
        assert_eq!(snapshot.output, "one");
    }
}
