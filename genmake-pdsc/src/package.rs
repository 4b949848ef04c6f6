//! Typed representation of the parts of a pack description that are needed
//! to generate build files.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::LoadError;
use crate::xml::Element;

/// A single entry of the release history of a pack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Release {
    /// Version of the pack.
    pub version: String,
    /// Release date, as written in the pack.
    pub date: String,
    /// Release notes.
    pub description: String,
}

/// A `<device>` element of a device family.
#[derive(Debug, Clone, Default)]
pub struct Device {
    /// The `Dname` of the device.
    pub name: String,
    /// All processors of the device, more than one for multi-core devices.
    pub processors: Vec<Processor>,
    /// Compile settings, optionally scoped to a processor.
    pub compiles: Vec<Compile>,
    /// Debug settings, optionally scoped to a processor.
    pub debugs: Vec<Debug>,
    /// Tool environments described for this device.
    pub environments: Vec<Environment>,
}

/// A `<processor>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Processor {
    /// `Pname`, only present on multi-core devices.
    pub name: Option<String>,
    /// `Dcore`, e.g. `Cortex-M0+`.
    pub core: Option<String>,
}

/// A `<compile>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compile {
    /// `Pname` this element applies to.
    pub processor: Option<String>,
    /// Device header file.
    pub header: Option<String>,
    /// Preprocessor define selecting the device.
    pub define: Option<String>,
}

/// A `<debug>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Debug {
    /// `Pname` this element applies to.
    pub processor: Option<String>,
    /// System view description file.
    pub svd: Option<String>,
}

/// An `<environment>` element and its vendor extensions.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    /// The environment name, which doubles as the extension key.
    pub name: Option<String>,
    /// `<extension>` children together with the namespace they were declared in.
    pub extensions: Vec<Extension>,
}

/// A vendor specific `<extension>` of an environment.
#[derive(Debug, Clone, Default)]
pub struct Extension {
    /// Namespace URI of the extension element.
    pub namespace: Option<String>,
    /// Project templates declared in the extension namespace.
    pub projects: Vec<Project>,
}

/// A project template of a vendor extension.
#[derive(Debug, Clone, Default)]
pub struct Project {
    /// `Pname` this project is meant for.
    pub processor: Option<String>,
    /// Human readable name, e.g. `GCC C Executable`.
    pub name: Option<String>,
    /// Components the project is built from.
    pub components: Vec<ComponentRef>,
}

/// A reference from a project to a component of the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentRef {
    pub vendor: Option<String>,
    pub class: Option<String>,
    pub group: Option<String>,
}

impl ComponentRef {
    /// The catalog key of this reference when bound to `condition`.
    pub fn key(&self, condition: &str) -> Option<ComponentKey> {
        Some(ComponentKey {
            vendor: self.vendor.clone()?,
            class: self.class.clone()?,
            group: self.group.clone()?,
            condition: condition.to_string(),
        })
    }
}

/// Composite key identifying a component in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentKey {
    pub vendor: String,
    pub class: String,
    pub group: String,
    pub condition: String,
}

/// A top level `<component>` of the pack.
#[derive(Debug, Clone, Default)]
pub struct Component {
    pub vendor: Option<String>,
    pub class: Option<String>,
    pub group: Option<String>,
    pub condition: Option<String>,
    pub files: Vec<FileEntry>,
}

impl Component {
    fn key(&self) -> Option<ComponentKey> {
        Some(ComponentKey {
            vendor: self.vendor.clone()?,
            class: self.class.clone()?,
            group: self.group.clone()?,
            condition: self.condition.clone()?,
        })
    }
}

/// A `<file>` entry of a component.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileEntry {
    pub condition: Option<String>,
    pub category: Option<String>,
    /// Path relative to the pack directory.
    pub name: Option<String>,
}

/// The typed content of a `.pdsc` file.
#[derive(Debug, Clone, Default)]
pub struct Package {
    pub schema_version: Option<String>,
    pub releases: Vec<Release>,
    pub devices: Vec<Device>,
    pub components: Vec<Component>,
}

impl Package {
    pub(crate) fn from_element(root: &Element) -> Result<Self, LoadError> {
        let releases = root
            .descendants("releases/release")
            .into_iter()
            .map(|release| Release {
                version: release.owned_attribute("version").unwrap_or_default(),
                date: release.owned_attribute("date").unwrap_or_default(),
                description: release.text.trim().to_string(),
            })
            .collect();

        let devices = root
            .descendants("devices/family/device")
            .into_iter()
            .map(device)
            .collect::<Result<_, _>>()?;

        let components = root
            .descendants("components/component")
            .into_iter()
            .map(|component| Component {
                vendor: component.owned_attribute("Cvendor"),
                class: component.owned_attribute("Cclass"),
                group: component.owned_attribute("Cgroup"),
                condition: component.owned_attribute("condition"),
                files: component
                    .descendants("files/file")
                    .into_iter()
                    .map(|file| FileEntry {
                        condition: file.owned_attribute("condition"),
                        category: file.owned_attribute("category"),
                        name: file.owned_attribute("name"),
                    })
                    .collect(),
            })
            .collect();

        Ok(Package {
            schema_version: root.owned_attribute("schemaVersion"),
            releases,
            devices,
            components,
        })
    }

    /// Indexes the component catalog by its composite key.
    ///
    /// The first component with a given key wins, components lacking one of
    /// the key attributes can never be referenced and are left out.
    pub fn component_index(&self) -> HashMap<ComponentKey, usize> {
        let mut index = HashMap::new();
        for (position, component) in self.components.iter().enumerate() {
            if let Some(key) = component.key() {
                index.entry(key).or_insert(position);
            }
        }
        index
    }
}

fn device(element: &Element) -> Result<Device, LoadError> {
    let name = element
        .owned_attribute("Dname")
        .ok_or(LoadError::MissingAttribute {
            element: "device",
            attribute: "Dname",
        })?;

    Ok(Device {
        name,
        processors: element
            .children("processor")
            .map(|processor| Processor {
                name: processor.owned_attribute("Pname"),
                core: processor.owned_attribute("Dcore"),
            })
            .collect(),
        compiles: element
            .children("compile")
            .map(|compile| Compile {
                processor: compile.owned_attribute("Pname"),
                header: compile.owned_attribute("header"),
                define: compile.owned_attribute("define"),
            })
            .collect(),
        debugs: element
            .children("debug")
            .map(|debug| Debug {
                processor: debug.owned_attribute("Pname"),
                svd: debug.owned_attribute("svd"),
            })
            .collect(),
        environments: element.children("environment").map(environment).collect(),
    })
}

fn environment(element: &Element) -> Environment {
    let extensions = element
        .children
        .iter()
        .filter(|child| child.name == "extension")
        .map(|extension| {
            let namespace = extension.namespace.as_deref();
            Extension {
                namespace: extension.namespace.clone(),
                projects: extension
                    .children_in(namespace, "project")
                    .map(|project| Project {
                        processor: project.owned_attribute("Pname"),
                        name: project.owned_attribute("name"),
                        components: project
                            .children_in(namespace, "component")
                            .map(|component| ComponentRef {
                                vendor: component.owned_attribute("Cvendor"),
                                class: component.owned_attribute("Cclass"),
                                group: component.owned_attribute("Cgroup"),
                            })
                            .collect(),
                    })
                    .collect(),
            }
        })
        .collect();

    Environment {
        name: element.owned_attribute("name"),
        extensions,
    }
}

impl Device {
    /// The processor addressed by `processor`, or the first one when empty.
    pub fn processor(&self, processor: &str) -> Option<&Processor> {
        if processor.is_empty() {
            self.processors.first()
        } else {
            self.processors
                .iter()
                .find(|p| p.name.as_deref() == Some(processor))
        }
    }

    /// The compile settings for `processor`, or the first ones when empty.
    pub fn compile(&self, processor: &str) -> Option<&Compile> {
        if processor.is_empty() {
            self.compiles.first()
        } else {
            self.compiles
                .iter()
                .find(|c| c.processor.as_deref() == Some(processor))
        }
    }

    /// The environment named `name`.
    pub fn environment(&self, name: &str) -> Option<&Environment> {
        self.environments
            .iter()
            .find(|environment| environment.name.as_deref() == Some(name))
    }
}
