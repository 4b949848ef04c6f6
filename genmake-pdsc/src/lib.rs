//! Build dependencies of devices described by CMSIS pack description files
//!
//! A `.pdsc` file describes the devices of a pack together with the
//! components (headers, startup code, linker scripts, project templates)
//! shipped for them. Vendors such as Atmel add project templates for GCC in
//! a vendor specific `<extension>` of a device environment.
//!
//! [`Descriptor::load`] reads such a file, [`Descriptor::list_devices`]
//! enumerates the device identifiers it describes and
//! [`Descriptor::resolve_dependencies`] collects the files a GCC project for
//! one of them is built from.
//!
//! ```no_run
//! use genmake_pdsc::{Descriptor, Resolution, Verbosity};
//!
//! let descriptor = Descriptor::load("Atmel.SAMD20_DFP.pdsc", Verbosity::Quiet)?;
//! if let Resolution::Resolved(dependencies) =
//!     descriptor.resolve_dependencies("ATSAMD20E14", "c", "exe", "atmel")?
//! {
//!     println!("-mcpu={} -D{}", dependencies.cpu, dependencies.define);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod dependencies;
mod descriptor;
mod device;
mod error;
pub mod package;
mod xml;

pub use dependencies::{
    classify, extension_namespace, Dependencies, InstructionMode, Language, LinkKind, Resolution,
    Rule, Skip, Slot, EXTENSION_NAMESPACES, RULES,
};
pub use descriptor::{Descriptor, DeviceSpecifics, Verbosity, SUPPORTED_SCHEMA_VERSIONS};
pub use device::DeviceId;
pub use error::{LoadError, NotFoundError, ResolutionError};
pub use package::Release;
