use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Two disjoint error styles exist in this crate, mirrored from the operation surface it
/// implements: operations that can be meaningfully *refused* (adding a function reference that
/// is already present, removing an absent child) return `bool` and never construct an [`Error`];
/// operations that can *fail* (I/O, manifest parsing, invariant violations) return
/// [`Result<T>`](crate::Result) with one of the variants below.
///
/// # Error Categories
///
/// ## Persistence Errors
/// - [`Error::Malformed`] - Corrupted or invalid project manifest
/// - [`Error::FileError`] - Filesystem I/O errors
/// - [`Error::XmlError`] - Low-level XML reading/writing errors
///
/// ## Store Errors
/// - [`Error::DanglingHandle`] - A record reference points at no live record
/// - [`Error::CycleDetected`] - A mutation or walk would create/encounter a parent cycle
/// - [`Error::InvalidName`] - An empty or unusable entity name
/// - [`Error::NotFound`] - A lookup by id found nothing where a record was required
///
/// ## Registry Errors
/// - [`Error::DuplicateName`] - Registering a name that is already taken
/// - [`Error::LockError`] - Thread synchronization failure
#[derive(Error, Debug)]
pub enum Error {
    /// The project manifest is damaged and could not be parsed.
    ///
    /// The error includes the source location where the malformation was
    /// detected for debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// File I/O error.
    ///
    /// Wraps standard I/O errors that can occur during project creation,
    /// file import, or manifest persistence.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// Error from the quick-xml crate during manifest reading or writing.
    #[error("{0}")]
    XmlError(#[from] quick_xml::Error),

    /// A held entity reference points at a record that no longer exists in the store.
    ///
    /// This signals a construction or programming error, not a recoverable
    /// runtime condition: an operation walked from a live record to a
    /// referenced id and found nothing behind it.
    #[error("Dangling {kind} reference - {id}")]
    DanglingHandle {
        /// What kind of record the dead reference pointed at
        kind: &'static str,
        /// The id that resolved to no live record
        id: String,
    },

    /// A mutation would create a parent cycle, or a walk encountered one.
    ///
    /// `set_parent` and folder-ordering walks refuse cycles instead of
    /// looping. The id identifies the entity at which the cycle was detected.
    #[error("Parent cycle detected at {0}")]
    CycleDetected(String),

    /// An entity name was empty or otherwise unusable.
    #[error("Invalid name: {0:?}")]
    InvalidName(String),

    /// A lookup by id found nothing where a record was required.
    #[error("No record with id {0}")]
    NotFound(String),

    /// A registry refused a name that is already taken.
    #[error("Name already registered - {0}")]
    DuplicateName(String),

    /// Failed to lock target.
    ///
    /// This error occurs when thread synchronization fails, typically when
    /// trying to acquire a mutex or rwlock that is in an invalid state.
    #[error("Failed to lock target")]
    LockError,

    /// Generic error for miscellaneous failures.
    ///
    /// Used for errors that don't fit into other categories or for wrapping
    /// external failures with additional context.
    #[error("{0}")]
    Error(String),
}
