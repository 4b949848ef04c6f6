use crate::dependencies::Slot;

/// An error that occurred while loading a pack description file.
#[derive(Debug, thiserror::Error, docsplay::Display)]
pub enum LoadError {
    /// {path} is not a valid file
    NotAFile {
        /// The path that was given.
        path: String,
    },
    /// Failed to read {path}
    Io {
        /// The file that could not be read.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The pack description is not well-formed XML
    Xml(#[from] quick_xml::Error),
    /// The pack description is malformed: {reason}
    Malformed {
        /// What is wrong with the document.
        reason: String,
    },
    /// Element <{element}> is missing the required attribute '{attribute}'
    MissingAttribute {
        /// Local name of the element.
        element: &'static str,
        /// Name of the missing attribute.
        attribute: &'static str,
    },
    /// Supports only schema version {supported:?}, found {found:?}
    UnsupportedSchema {
        /// The `schemaVersion` of the document, if any.
        found: Option<String>,
        /// All schema versions this parser understands.
        supported: &'static [&'static str],
    },
}

impl From<quick_xml::events::attributes::AttrError> for LoadError {
    fn from(error: quick_xml::events::attributes::AttrError) -> Self {
        LoadError::Xml(error.into())
    }
}

/// Device "{device}" not found
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, docsplay::Display)]
pub struct NotFoundError {
    /// The device identifier that was looked up.
    pub device: String,
}

/// An error that occurred while resolving the build dependencies of a device.
#[derive(Debug, thiserror::Error, docsplay::Display)]
pub enum ResolutionError {
    /// {0}
    Device(#[from] NotFoundError),
    /// Environment extension "{extension}" is not found
    MissingEnvironment {
        /// The requested extension key.
        extension: String,
    },
    /// Device "{device}" has no <{element}> element for processor "{processor}"
    MissingElement {
        /// The device identifier.
        device: String,
        /// The processor name, empty for single core devices.
        processor: String,
        /// Local name of the element.
        element: &'static str,
    },
    /// Element <{element}> of device "{device}" is missing the attribute '{attribute}'
    MissingAttribute {
        /// The device identifier.
        device: String,
        /// Local name of the element.
        element: &'static str,
        /// Name of the missing attribute.
        attribute: &'static str,
    },
    /// Could not find {slot} "{path}"
    MissingFile {
        /// The kind of file that was referenced.
        slot: Slot,
        /// The absolute path that does not exist.
        path: String,
    },
}
