use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::device::DeviceId;
use crate::error::{LoadError, NotFoundError};
use crate::package::{ComponentKey, Device, Package, Release};

/// Schema versions of `.pdsc` files this crate understands.
pub const SUPPORTED_SCHEMA_VERSIONS: &[&str] = &["1.3"];

/// Controls how chatty the resolver is about its progress.
///
/// Progress messages are always emitted through `tracing`; `Verbose` raises
/// them from `DEBUG` to `INFO`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Verbosity {
    #[default]
    Quiet,
    Verbose,
}

/// Header, define and SVD file of a device, as used by IDE integrations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceSpecifics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub define: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub svd: Option<String>,
}

/// A loaded pack description file.
///
/// All relative file references of the description are resolved against
/// the directory containing it.
#[derive(Debug)]
pub struct Descriptor {
    pack_dir: PathBuf,
    package: Package,
    pub(crate) catalog: HashMap<ComponentKey, usize>,
    devices: Vec<String>,
    verbosity: Verbosity,
}

impl Descriptor {
    /// Loads and validates the `.pdsc` file at `path`.
    pub fn load(path: impl AsRef<Path>, verbosity: Verbosity) -> Result<Self, LoadError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(LoadError::NotAFile {
                path: path.display().to_string(),
            });
        }

        let io_error = |source| LoadError::Io {
            path: path.display().to_string(),
            source,
        };
        let path = path.canonicalize().map_err(io_error)?;
        let xml = std::fs::read_to_string(&path).map_err(io_error)?;

        let pack_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("/"));

        Self::parse(&xml, pack_dir, verbosity)
    }

    /// Parses a pack description held in memory.
    ///
    /// `pack_dir` is the directory file references are resolved against.
    pub fn parse(
        xml: &str,
        pack_dir: impl Into<PathBuf>,
        verbosity: Verbosity,
    ) -> Result<Self, LoadError> {
        let root = crate::xml::parse(xml)?;

        let schema_version = root.attribute("schemaVersion");
        if !schema_version.is_some_and(|version| SUPPORTED_SCHEMA_VERSIONS.contains(&version)) {
            return Err(LoadError::UnsupportedSchema {
                found: schema_version.map(str::to_owned),
                supported: SUPPORTED_SCHEMA_VERSIONS,
            });
        }

        let package = Package::from_element(&root)?;
        let catalog = package.component_index();
        let devices = list_devices(&package.devices);

        let descriptor = Descriptor {
            pack_dir: pack_dir.into(),
            package,
            catalog,
            devices,
            verbosity,
        };
        descriptor.progress(format_args!("verified schema version"));

        Ok(descriptor)
    }

    /// The directory file references are resolved against.
    pub fn pack_dir(&self) -> &Path {
        &self.pack_dir
    }

    /// The typed content of the description.
    pub fn package(&self) -> &Package {
        &self.package
    }

    /// The release history, in document order.
    pub fn releases(&self) -> &[Release] {
        &self.package.releases
    }

    /// The first release listed, which by convention is the newest one.
    pub fn latest_release(&self) -> Option<&Release> {
        self.package.releases.first()
    }

    /// All device identifiers, in document order.
    ///
    /// Single core devices are listed by name; devices with named processors
    /// are listed once per processor as `name:Pname`.
    pub fn list_devices(&self) -> &[String] {
        &self.devices
    }

    /// Looks up the device element for `id`.
    ///
    /// `id` has to be one of [`Descriptor::list_devices`]. The returned
    /// device is not narrowed down to the selected processor.
    pub fn resolve_device(&self, id: &str) -> Result<&Device, NotFoundError> {
        let not_found = || NotFoundError {
            device: id.to_string(),
        };

        if !self.devices.iter().any(|device| device == id) {
            return Err(not_found());
        }

        let split = DeviceId::split(id);
        self.progress(format_args!(
            "Device: {} Pname: {}",
            split.base, split.processor
        ));

        self.package
            .devices
            .iter()
            .find(|device| device.name == split.base)
            .ok_or_else(not_found)
    }

    /// Names of all environments declared for the device.
    pub fn environments(&self, id: &str) -> Result<Vec<String>, NotFoundError> {
        let device = self.resolve_device(id)?;
        Ok(device
            .environments
            .iter()
            .filter_map(|environment| environment.name.clone())
            .collect())
    }

    /// Header, define and SVD file for the device.
    ///
    /// When several elements apply, the last one wins.
    pub fn device_specifics(&self, id: &str) -> Result<DeviceSpecifics, NotFoundError> {
        let device = self.resolve_device(id)?;
        let processor = DeviceId::split(id).processor;
        let applies =
            |scope: &Option<String>| processor.is_empty() || scope.as_deref() == Some(processor);

        let compile = device.compiles.iter().filter(|c| applies(&c.processor)).last();
        let debug = device.debugs.iter().filter(|d| applies(&d.processor)).last();

        Ok(DeviceSpecifics {
            header: compile.and_then(|c| c.header.clone()),
            define: compile.and_then(|c| c.define.clone()),
            svd: debug.and_then(|d| d.svd.clone()),
        })
    }

    pub(crate) fn progress(&self, message: fmt::Arguments<'_>) {
        match self.verbosity {
            Verbosity::Verbose => tracing::info!("{message}"),
            Verbosity::Quiet => tracing::debug!("{message}"),
        }
    }
}

fn list_devices(devices: &[Device]) -> Vec<String> {
    let mut identifiers = Vec::new();
    for device in devices {
        let named = device
            .processors
            .iter()
            .filter_map(|processor| processor.name.as_deref())
            .map(|processor| format!("{}:{}", device.name, processor))
            .collect::<Vec<_>>();

        if named.is_empty() {
            identifiers.push(device.name.clone());
        } else {
            identifiers.extend(named);
        }
    }
    identifiers
}
