//! Status codes and the library error type.
//!
//! Every fallible operation returns [`Result`]. The error carries enough
//! context to be useful in a log line, and [`Error::status`] collapses it
//! onto the closed [`Status`] enumeration whose numeric values match the
//! OpenCL error codes plus the BLAS-specific range starting at -1024.

use std::fmt;
use thiserror::Error;

/// Result type alias using qblas's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Closed set of status codes reported by every entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Status {
    Success = 0,
    OutOfResources = -5,
    OutOfHostMemory = -6,
    BuildProgramFailure = -11,
    CompilerNotAvailable = -15,
    InvalidValue = -30,
    InvalidDevice = -33,
    InvalidContext = -34,
    InvalidCommandQueue = -36,
    InvalidMemObject = -38,
    InvalidEventWaitList = -57,
    InvalidOperation = -59,

    NotImplemented = -1024,
    NotInitialized = -1023,
    InvalidMatA = -1022,
    InvalidMatB = -1021,
    InvalidMatC = -1020,
    InvalidVecX = -1019,
    InvalidVecY = -1018,
    InvalidDim = -1017,
    InvalidLeadDimA = -1016,
    InvalidLeadDimB = -1015,
    InvalidLeadDimC = -1014,
    InvalidIncX = -1013,
    InvalidIncY = -1012,
    InsufficientMemMatA = -1011,
    InsufficientMemMatB = -1010,
    InsufficientMemMatC = -1009,
    InsufficientMemVecX = -1008,
    InsufficientMemVecY = -1007,
}

impl Status {
    const ALL: [Status; 30] = [
        Status::Success,
        Status::OutOfResources,
        Status::OutOfHostMemory,
        Status::BuildProgramFailure,
        Status::CompilerNotAvailable,
        Status::InvalidValue,
        Status::InvalidDevice,
        Status::InvalidContext,
        Status::InvalidCommandQueue,
        Status::InvalidMemObject,
        Status::InvalidEventWaitList,
        Status::InvalidOperation,
        Status::NotImplemented,
        Status::NotInitialized,
        Status::InvalidMatA,
        Status::InvalidMatB,
        Status::InvalidMatC,
        Status::InvalidVecX,
        Status::InvalidVecY,
        Status::InvalidDim,
        Status::InvalidLeadDimA,
        Status::InvalidLeadDimB,
        Status::InvalidLeadDimC,
        Status::InvalidIncX,
        Status::InvalidIncY,
        Status::InsufficientMemMatA,
        Status::InsufficientMemMatB,
        Status::InsufficientMemMatC,
        Status::InsufficientMemVecX,
        Status::InsufficientMemVecY,
    ];

    /// Numeric code.
    #[inline]
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Reverse of [`Status::code`]. Unknown codes yield `None`.
    pub fn from_code(code: i32) -> Option<Status> {
        Self::ALL.iter().copied().find(|s| s.code() == code)
    }

    pub fn is_success(self) -> bool {
        self == Status::Success
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.code())
    }
}

/// Operand slot of a BLAS routine, used to pick the operand-specific status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand {
    A,
    B,
    C,
    X,
    Y,
}

impl Operand {
    pub fn is_matrix(self) -> bool {
        matches!(self, Operand::A | Operand::B | Operand::C)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operand::A => "A",
            Operand::B => "B",
            Operand::C => "C",
            Operand::X => "X",
            Operand::Y => "Y",
        };
        f.write_str(name)
    }
}

/// Errors that can occur in qblas operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// `setup()` has not been called, or `teardown()` already ran.
    #[error("library is not initialized")]
    NotInitialized,

    #[error("not implemented: {feature}")]
    NotImplemented { feature: &'static str },

    #[error("invalid value for '{arg}': {reason}")]
    InvalidValue { arg: &'static str, reason: String },

    /// Dimension arguments that are individually valid but inconsistent.
    #[error("invalid dimension '{arg}': {reason}")]
    InvalidDim { arg: &'static str, reason: String },

    #[error("leading dimension of {operand} is {ld}, must be at least {min}")]
    InvalidLeadDim { operand: Operand, ld: usize, min: usize },

    #[error("increment of vector {operand} must be non-zero")]
    InvalidInc { operand: Operand },

    /// Memory object is released, read-only where output is required, or
    /// belongs to a different context.
    #[error("invalid memory object for {operand}: {reason}")]
    InvalidOperand { operand: Operand, reason: &'static str },

    #[error("{operand} needs {required} elements but its buffer holds {capacity}")]
    InsufficientMem {
        operand: Operand,
        required: usize,
        capacity: usize,
    },

    /// Memory object that is not a routine operand (images, result buffers).
    #[error("invalid memory object: {0}")]
    InvalidMemObject(String),

    #[error("invalid command queue: {0}")]
    InvalidCommandQueue(String),

    #[error("invalid context: {0}")]
    InvalidContext(String),

    #[error("invalid device '{device}': {reason}")]
    InvalidDevice { device: String, reason: String },

    #[error("invalid event wait list: {0}")]
    InvalidEventWaitList(String),

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("out of resources: {0}")]
    OutOfResources(String),

    #[error("out of host memory: failed to allocate {bytes} bytes")]
    OutOfHostMemory { bytes: usize },

    #[error("failed to build kernel '{kernel}': {reason}")]
    BuildProgramFailure { kernel: String, reason: String },

    #[error("no kernel compiler available on device '{device}'")]
    CompilerNotAvailable { device: String },

    /// A status reported by an event or produced outside this crate.
    #[error("operation failed with status {0}")]
    Status(Status),
}

impl Error {
    /// The status code this error maps onto.
    pub fn status(&self) -> Status {
        match self {
            Error::NotInitialized => Status::NotInitialized,
            Error::NotImplemented { .. } => Status::NotImplemented,
            Error::InvalidValue { .. } => Status::InvalidValue,
            Error::InvalidDim { .. } => Status::InvalidDim,
            Error::InvalidLeadDim { operand, .. } => match operand {
                Operand::A => Status::InvalidLeadDimA,
                Operand::B => Status::InvalidLeadDimB,
                Operand::C => Status::InvalidLeadDimC,
                Operand::X | Operand::Y => Status::InvalidValue,
            },
            Error::InvalidInc { operand } => match operand {
                Operand::X => Status::InvalidIncX,
                Operand::Y => Status::InvalidIncY,
                _ => Status::InvalidValue,
            },
            Error::InvalidOperand { operand, .. } => match operand {
                Operand::A => Status::InvalidMatA,
                Operand::B => Status::InvalidMatB,
                Operand::C => Status::InvalidMatC,
                Operand::X => Status::InvalidVecX,
                Operand::Y => Status::InvalidVecY,
            },
            Error::InsufficientMem { operand, .. } => match operand {
                Operand::A => Status::InsufficientMemMatA,
                Operand::B => Status::InsufficientMemMatB,
                Operand::C => Status::InsufficientMemMatC,
                Operand::X => Status::InsufficientMemVecX,
                Operand::Y => Status::InsufficientMemVecY,
            },
            Error::InvalidMemObject(_) => Status::InvalidMemObject,
            Error::InvalidCommandQueue(_) => Status::InvalidCommandQueue,
            Error::InvalidContext(_) => Status::InvalidContext,
            Error::InvalidDevice { .. } => Status::InvalidDevice,
            Error::InvalidEventWaitList(_) => Status::InvalidEventWaitList,
            Error::InvalidOperation(_) => Status::InvalidOperation,
            Error::OutOfResources(_) => Status::OutOfResources,
            Error::OutOfHostMemory { .. } => Status::OutOfHostMemory,
            Error::BuildProgramFailure { .. } => Status::BuildProgramFailure,
            Error::CompilerNotAvailable { .. } => Status::CompilerNotAvailable,
            Error::Status(status) => *status,
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            arg,
            reason: reason.into(),
        }
    }

    /// Create an invalid dimension error
    pub fn invalid_dim(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidDim {
            arg,
            reason: reason.into(),
        }
    }

    pub fn invalid_device(device: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDevice {
            device: device.into(),
            reason: reason.into(),
        }
    }
}

impl From<Status> for Error {
    fn from(status: Status) -> Self {
        match status {
            Status::NotInitialized => Error::NotInitialized,
            other => Error::Status(other),
        }
    }
}
