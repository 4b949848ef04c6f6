use std::fmt;

/// A device identifier of the form `base[:processor]`.
///
/// Multi-core devices are listed once per core, with the `Pname` of the
/// processor appended after a colon, e.g. `ATSAM4C4C:0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId<'a> {
    /// The `Dname` of the device.
    pub base: &'a str,
    /// The `Pname` of the selected processor, empty if none was given.
    pub processor: &'a str,
}

impl<'a> DeviceId<'a> {
    /// Splits `id` at the first colon.
    pub fn split(id: &'a str) -> Self {
        match id.split_once(':') {
            Some((base, processor)) => DeviceId { base, processor },
            None => DeviceId {
                base: id,
                processor: "",
            },
        }
    }

    /// Whether a specific processor of a multi-core device is selected.
    pub fn has_processor(&self) -> bool {
        !self.processor.is_empty()
    }
}

impl fmt::Display for DeviceId<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_processor() {
            write!(f, "{}:{}", self.base, self.processor)
        } else {
            f.write_str(self.base)
        }
    }
}
