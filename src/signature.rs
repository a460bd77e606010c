//! Return-signature classification.
//!
//! Each handler declares its outputs as a [`Signature`]. At registration time
//! [`classify`] turns that into a [`Classification`] recording which output
//! carries the result and which carries the error. The classification is
//! computed once and read by every call.
//!
//! The error capability is [`Fault`]: `None` means "no failure", `Some`
//! carries the failure.
//!
//! # Example
//!
//! ```
//! use procwire_rpc::signature::{classify, Fault, Signature};
//!
//! let sig = Signature::new().output::<String>().output::<Fault>();
//! let class = classify(&sig).unwrap();
//! assert_eq!(class.result_slot(), Some(0));
//! assert_eq!(class.error_slot(), Some(1));
//!
//! let bad = Signature::new().output::<String>().output::<u32>();
//! assert!(classify(&bad).is_err());
//! ```

use std::any::{type_name, TypeId};
use std::fmt;

use serde::Serialize;

use crate::error::{HandlerError, RegistrationError};
use crate::param::Param;

/// The error-shaped output type. `None` is success.
pub type Fault = Option<HandlerError>;

/// Description of one declared output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputType {
    name: &'static str,
    is_error: bool,
}

impl OutputType {
    /// Describe the output type `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            name: type_name::<T>(),
            is_error: TypeId::of::<T>() == TypeId::of::<Fault>(),
        }
    }

    /// Rust type name.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether this is the error capability.
    #[inline]
    pub fn is_error(&self) -> bool {
        self.is_error
    }
}

/// Declared outputs of a handler, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Signature {
    outputs: Vec<OutputType>,
}

impl Signature {
    /// A signature with no outputs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an output of type `T`.
    pub fn output<T: ?Sized + 'static>(mut self) -> Self {
        self.outputs.push(OutputType::of::<T>());
        self
    }

    /// Declared outputs.
    pub fn outputs(&self) -> &[OutputType] {
        &self.outputs
    }

    /// Number of declared outputs.
    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    /// Whether no outputs are declared.
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("fn(..)")?;
        match self.outputs.as_slice() {
            [] => Ok(()),
            [single] => write!(f, " -> {}", single.name),
            outputs => {
                f.write_str(" -> (")?;
                for (i, output) in outputs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str(output.name)?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Where a handler's result and error live among its outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    result_slot: Option<usize>,
    error_slot: Option<usize>,
    output_count: usize,
}

impl Classification {
    /// Index of the output carrying the result, if any.
    #[inline]
    pub fn result_slot(&self) -> Option<usize> {
        self.result_slot
    }

    /// Index of the output carrying the error, if any.
    #[inline]
    pub fn error_slot(&self) -> Option<usize> {
        self.error_slot
    }

    /// Number of outputs (0, 1 or 2).
    #[inline]
    pub fn output_count(&self) -> usize {
        self.output_count
    }
}

/// Classify a handler's declared outputs.
///
/// # Errors
///
/// - [`RegistrationError::SecondOutputNotError`] for two outputs where the
///   second is not [`Fault`].
/// - [`RegistrationError::TooManyReturnValues`] for three or more outputs.
pub fn classify(signature: &Signature) -> Result<Classification, RegistrationError> {
    let (result_slot, error_slot) = match signature.outputs() {
        [] => (None, None),
        [only] if only.is_error() => (None, Some(0)),
        [_] => (Some(0), None),
        [_, second] if second.is_error() => (Some(0), Some(1)),
        [_, second] => {
            return Err(RegistrationError::SecondOutputNotError {
                found: second.name(),
            })
        }
        _ => {
            return Err(RegistrationError::TooManyReturnValues {
                signature: signature.to_string(),
            })
        }
    };

    Ok(Classification {
        result_slot,
        error_slot,
        output_count: signature.len(),
    })
}

/// One output produced by a handler call.
#[derive(Debug)]
pub enum Output {
    /// A business value.
    Value(Param),
    /// The error slot. `None` is success.
    Error(Fault),
}

/// Return types a handler closure may use.
///
/// | Return type                  | Outputs            |
/// |------------------------------|--------------------|
/// | `()`                         | none               |
/// | [`Value<T>`]                 | `T`                |
/// | [`Fault`]                    | error              |
/// | `Result<T, HandlerError>`    | `T`, error         |
pub trait ReturnShape: Send + 'static {
    /// The declared outputs of this shape.
    fn signature() -> Signature;

    /// Split a returned value into its outputs, in declaration order.
    fn into_outputs(self) -> Vec<Output>;
}

/// Single non-error return value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value<T>(pub T);

impl ReturnShape for () {
    fn signature() -> Signature {
        Signature::new()
    }

    fn into_outputs(self) -> Vec<Output> {
        Vec::new()
    }
}

impl<T> ReturnShape for Value<T>
where
    T: Serialize + Send + Sync + 'static,
{
    fn signature() -> Signature {
        Signature::new().output::<T>()
    }

    fn into_outputs(self) -> Vec<Output> {
        vec![Output::Value(Param::from_typed(self.0))]
    }
}

impl ReturnShape for Fault {
    fn signature() -> Signature {
        Signature::new().output::<Fault>()
    }

    fn into_outputs(self) -> Vec<Output> {
        vec![Output::Error(self)]
    }
}

impl<T> ReturnShape for Result<T, HandlerError>
where
    T: Serialize + Send + Sync + 'static,
{
    fn signature() -> Signature {
        Signature::new().output::<T>().output::<Fault>()
    }

    fn into_outputs(self) -> Vec<Output> {
        match self {
            Ok(value) => vec![Output::Value(Param::from_typed(value)), Output::Error(None)],
            Err(err) => vec![Output::Value(Param::null()), Output::Error(Some(err))],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_outputs() {
        let class = classify(&Signature::new()).unwrap();
        assert_eq!(class.result_slot(), None);
        assert_eq!(class.error_slot(), None);
        assert_eq!(class.output_count(), 0);
    }

    #[test]
    fn test_single_error_output() {
        let class = classify(&Signature::new().output::<Fault>()).unwrap();
        assert_eq!(class.result_slot(), None);
        assert_eq!(class.error_slot(), Some(0));
        assert_eq!(class.output_count(), 1);
    }

    #[test]
    fn test_single_value_output() {
        let class = classify(&Signature::new().output::<Vec<String>>()).unwrap();
        assert_eq!(class.result_slot(), Some(0));
        assert_eq!(class.error_slot(), None);
        assert_eq!(class.output_count(), 1);
    }

    #[test]
    fn test_value_and_error() {
        let class = classify(&Signature::new().output::<u64>().output::<Fault>()).unwrap();
        assert_eq!(class.result_slot(), Some(0));
        assert_eq!(class.error_slot(), Some(1));
        assert_eq!(class.output_count(), 2);
    }

    #[test]
    fn test_error_first_then_error_is_accepted() {
        // Only the second position is checked.
        let class = classify(&Signature::new().output::<Fault>().output::<Fault>()).unwrap();
        assert_eq!(class.result_slot(), Some(0));
        assert_eq!(class.error_slot(), Some(1));
    }

    #[test]
    fn test_second_output_not_error() {
        let err = classify(&Signature::new().output::<u64>().output::<String>()).unwrap_err();
        assert_eq!(
            err,
            RegistrationError::SecondOutputNotError {
                found: type_name::<String>()
            }
        );
    }

    #[test]
    fn test_bare_handler_error_is_not_error_shaped() {
        // Without the `None` success value it cannot represent "no failure".
        assert!(!OutputType::of::<HandlerError>().is_error());
        assert!(classify(&Signature::new().output::<u8>().output::<HandlerError>()).is_err());
    }

    #[test]
    fn test_too_many_outputs() {
        let sig = Signature::new()
            .output::<u8>()
            .output::<u16>()
            .output::<Fault>();
        match classify(&sig).unwrap_err() {
            RegistrationError::TooManyReturnValues { signature } => {
                assert!(signature.contains("u8"));
                assert!(signature.contains("u16"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_signature_display() {
        assert_eq!(Signature::new().to_string(), "fn(..)");
        assert_eq!(Signature::new().output::<u8>().to_string(), "fn(..) -> u8");
        assert_eq!(
            Signature::new().output::<u8>().output::<bool>().to_string(),
            "fn(..) -> (u8, bool)"
        );
    }

    #[test]
    fn test_return_shape_signatures_classify() {
        let unit = classify(&<()>::signature()).unwrap();
        assert_eq!(unit.output_count(), 0);

        let value = classify(&Value::<String>::signature()).unwrap();
        assert_eq!(value.result_slot(), Some(0));

        let fault = classify(&Fault::signature()).unwrap();
        assert_eq!(fault.error_slot(), Some(0));

        let result = classify(&Result::<i32, HandlerError>::signature()).unwrap();
        assert_eq!(result.result_slot(), Some(0));
        assert_eq!(result.error_slot(), Some(1));
    }

    #[test]
    fn test_result_outputs() {
        let outputs = Ok::<_, HandlerError>(5).into_outputs();
        assert!(matches!(outputs.as_slice(), [Output::Value(_), Output::Error(None)]));

        let outputs = Err::<i32, _>(HandlerError::new("nope")).into_outputs();
        match outputs.as_slice() {
            [Output::Value(_), Output::Error(Some(err))] => assert_eq!(err.message(), "nope"),
            other => panic!("unexpected outputs: {other:?}"),
        }
    }

    #[test]
    fn test_classification_is_copy_and_shareable() {
        fn assert_copy_send_sync<T: Copy + Send + Sync>() {}
        assert_copy_send_sync::<Classification>();
    }
}
