//! Resolution of the files a GCC project for a device is built from.
//!
//! The vendor extension of a device declares project templates, which list
//! components of the pack. Every file of those components is sorted into a
//! [`Slot`] by [`RULES`].

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;

use crate::descriptor::Descriptor;
use crate::device::DeviceId;
use crate::error::ResolutionError;
use crate::package::FileEntry;

/// Vendor extension keys understood by the resolver, with their namespace.
pub const EXTENSION_NAMESPACES: &[(&str, &str)] = &[(
    "atmel",
    "http://www.atmel.com/schemas/pack-device-atmel-extension",
)];

/// Returns the namespace URI registered for the extension key `extension`.
pub fn extension_namespace(extension: &str) -> Option<&'static str> {
    EXTENSION_NAMESPACES
        .iter()
        .find(|(key, _)| *key == extension)
        .map(|(_, namespace)| *namespace)
}

/// Source language of the project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    C,
    Cpp,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::C => "c",
            Language::Cpp => "cpp",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match &s.to_ascii_lowercase()[..] {
            "c" => Ok(Language::C),
            "cpp" => Ok(Language::Cpp),
            _ => Err(format!("'{s}' is not a supported language")),
        }
    }
}

/// Whether the project produces an executable or a library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    Exe,
    Lib,
}

impl LinkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkKind::Exe => "exe",
            LinkKind::Lib => "lib",
        }
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LinkKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match &s.to_ascii_lowercase()[..] {
            "exe" => Ok(LinkKind::Exe),
            "lib" => Ok(LinkKind::Lib),
            _ => Err(format!("'{s}' is not a supported project kind")),
        }
    }
}

/// Instruction set the sources are compiled for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InstructionMode {
    #[default]
    Thumb,
}

impl fmt::Display for InstructionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstructionMode::Thumb => f.write_str("thumb"),
        }
    }
}

/// The place a component file takes in the generated project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, docsplay::Display)]
pub enum Slot {
    /// include directory
    Include,
    /// header file
    Header,
    /// template file
    Template,
    /// linker script
    LinkerScript,
    /// system file
    System,
    /// startup file
    Startup,
    /// other config file
    Other,
}

impl Slot {
    /// Whether the slot refers to a directory instead of a file.
    pub fn is_directory(&self) -> bool {
        matches!(self, Slot::Include)
    }

    /// Whether the slot collects every matching file.
    ///
    /// All other slots keep the last file assigned to them.
    pub fn accumulates(&self) -> bool {
        matches!(self, Slot::Other)
    }
}

#[derive(Debug, Clone, Copy)]
enum NameTest {
    Any,
    EndsWith(&'static str),
    Contains(&'static str),
}

impl NameTest {
    fn matches(&self, name: &str) -> bool {
        match self {
            NameTest::Any => true,
            NameTest::EndsWith(suffix) => name.trim_end().ends_with(suffix),
            NameTest::Contains(part) => name.contains(part),
        }
    }
}

/// One row of the file classification table.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    condition: &'static str,
    category: Option<&'static str>,
    target: Option<(Language, LinkKind)>,
    name: NameTest,
    slot: Slot,
}

impl Rule {
    const fn new(condition: &'static str, category: &'static str, slot: Slot) -> Self {
        Rule {
            condition,
            category: Some(category),
            target: None,
            name: NameTest::Any,
            slot,
        }
    }

    const fn template(
        condition: &'static str,
        language: Language,
        link: LinkKind,
        suffix: &'static str,
    ) -> Self {
        Rule {
            condition,
            category: None,
            target: Some((language, link)),
            name: NameTest::EndsWith(suffix),
            slot: Slot::Template,
        }
    }

    const fn named(
        condition: &'static str,
        category: &'static str,
        part: &'static str,
        slot: Slot,
    ) -> Self {
        Rule {
            condition,
            category: Some(category),
            target: None,
            name: NameTest::Contains(part),
            slot,
        }
    }

    fn matches(
        &self,
        condition: &str,
        category: &str,
        name: &str,
        language: Language,
        link: LinkKind,
    ) -> bool {
        self.condition == condition
            && self.category.map_or(true, |c| c == category)
            && self.target.map_or(true, |t| t == (language, link))
            && self.name.matches(name)
    }
}

/// File classification table, evaluated top to bottom.
///
/// Dual core devices use nested linker scripts, which are listed in the
/// `other` category.
pub const RULES: &[Rule] = &[
    Rule::new("c", "include", Slot::Include),
    Rule::new("c", "header", Slot::Header),
    Rule::template("c exe", Language::C, LinkKind::Exe, "main.c"),
    Rule::template("c exe", Language::Cpp, LinkKind::Exe, "main.cpp"),
    Rule::template("c lib", Language::C, LinkKind::Lib, "library.c"),
    Rule::template("c lib", Language::Cpp, LinkKind::Lib, "library.cpp"),
    Rule::new("gcc exe", "linkerscript", Slot::LinkerScript),
    Rule::named("gcc exe", "source", "system_", Slot::System),
    Rule::named("gcc exe", "source", "startup_", Slot::Startup),
    Rule::new("gcc exe", "other", Slot::Other),
];

/// Finds the slot for a file entry, if any rule applies.
///
/// `condition` and `category` are compared case-insensitively.
pub fn classify(
    condition: &str,
    category: &str,
    name: &str,
    language: Language,
    link: LinkKind,
) -> Option<Slot> {
    let condition = condition.to_lowercase();
    let category = category.to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.matches(&condition, &category, name, language, link))
        .map(|rule| rule.slot)
}

/// Everything needed to build a project for one device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Dependencies {
    pub mode: InstructionMode,
    /// Core name usable with `-mcpu`, e.g. `cortex-m0plus`.
    pub cpu: String,
    /// Preprocessor define selecting the device.
    pub define: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linker_script: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub startup: Option<PathBuf>,
    /// Auxiliary files, e.g. linker scripts included by the main one.
    pub other: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmsis_include: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmsis_lib: Option<PathBuf>,
}

impl Dependencies {
    fn assign(&mut self, slot: Slot, path: PathBuf) {
        if slot.accumulates() {
            self.other.push(path);
            return;
        }
        match slot {
            Slot::Include => self.include = Some(path),
            Slot::Header => self.header = Some(path),
            Slot::Template => self.template = Some(path),
            Slot::LinkerScript => self.linker_script = Some(path),
            Slot::System => self.system = Some(path),
            Slot::Startup => self.startup = Some(path),
            // Collected above.
            Slot::Other => {}
        }
    }
}

/// Why no dependencies were resolved for a combination of arguments.
#[derive(Debug, Clone, PartialEq, Eq, docsplay::Display)]
pub enum Skip {
    /// Incorrect project configuration "{0}"
    UnsupportedLinkKind(String),
    /// Language "{0}" is not supported by the parser
    UnsupportedLanguage(String),
    /// Extension "{0}" is not supported by the parser
    UnsupportedExtension(String),
    /// Could not find '{language}' project in pdsc file for device {device}.
    NoProject {
        /// The requested language.
        language: Language,
        /// The requested device identifier.
        device: String,
    },
}

/// Outcome of [`Descriptor::resolve_dependencies`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(Dependencies),
    /// Nothing to build for this combination; not an error.
    Skipped(Skip),
}

impl Resolution {
    pub fn dependencies(self) -> Option<Dependencies> {
        match self {
            Resolution::Resolved(dependencies) => Some(dependencies),
            Resolution::Skipped(_) => None,
        }
    }
}

impl Descriptor {
    /// Resolves the files a GCC project for `device` is built from.
    ///
    /// `language` is `c` or `cpp`, `link_kind` is `exe` or `lib` and
    /// `extension` selects the vendor extension the project templates are
    /// read from. Unsupported arguments and devices without a matching
    /// project are reported as [`Resolution::Skipped`]. Any referenced file
    /// missing on disk fails the whole resolution.
    pub fn resolve_dependencies(
        &self,
        device: &str,
        language: &str,
        link_kind: &str,
        extension: &str,
    ) -> Result<Resolution, ResolutionError> {
        self.progress(format_args!("Find GCC project dependencies"));
        let target = self.resolve_device(device)?;
        let id = DeviceId::split(device);

        let Ok(link) = link_kind.parse::<LinkKind>() else {
            return Ok(Resolution::Skipped(Skip::UnsupportedLinkKind(
                link_kind.to_string(),
            )));
        };
        let Ok(language) = language.parse::<Language>() else {
            return Ok(Resolution::Skipped(Skip::UnsupportedLanguage(
                language.to_string(),
            )));
        };
        self.progress(format_args!(
            "device: {device} lang: {language} exe: {link}"
        ));

        let Some(namespace) = extension_namespace(extension) else {
            return Ok(Resolution::Skipped(Skip::UnsupportedExtension(
                extension.to_string(),
            )));
        };

        let missing_element = |element| ResolutionError::MissingElement {
            device: device.to_string(),
            processor: id.processor.to_string(),
            element,
        };
        let missing_attribute = |element, attribute| ResolutionError::MissingAttribute {
            device: device.to_string(),
            element,
            attribute,
        };

        let cpu = target
            .processor(id.processor)
            .ok_or_else(|| missing_element("processor"))?
            .core
            .as_deref()
            .ok_or_else(|| missing_attribute("processor", "Dcore"))?
            .replace('+', "plus");
        let define = target
            .compile(id.processor)
            .ok_or_else(|| missing_element("compile"))?
            .define
            .clone()
            .ok_or_else(|| missing_attribute("compile", "define"))?;

        let environment = target
            .environment(extension)
            .ok_or_else(|| ResolutionError::MissingEnvironment {
                extension: extension.to_string(),
            })?;

        // Spaces keep `c` from matching inside `cpp`.
        let token = format!(" {language} ");
        let project = environment
            .extensions
            .iter()
            .filter(|e| e.namespace.as_deref() == Some(namespace))
            .flat_map(|e| &e.projects)
            .filter(|p| !id.has_processor() || p.processor.as_deref() == Some(id.processor))
            .find(|p| {
                p.name
                    .as_deref()
                    .is_some_and(|name| name.to_lowercase().contains(&token))
            });
        let Some(project) = project else {
            return Ok(Resolution::Skipped(Skip::NoProject {
                language,
                device: device.to_string(),
            }));
        };

        let mut dependencies = Dependencies {
            mode: InstructionMode::Thumb,
            cpu,
            define,
            ..Default::default()
        };

        for reference in &project.components {
            let Some(component) = reference
                .key(device)
                .and_then(|key| self.catalog.get(&key))
                .map(|&index| &self.package().components[index])
            else {
                tracing::debug!(
                    "Component {:?}/{:?}/{:?} is not available for {device}",
                    reference.vendor,
                    reference.class,
                    reference.group
                );
                continue;
            };

            for file in &component.files {
                self.resolve_file(file, device, language, link, &mut dependencies)?;
            }
        }

        Ok(Resolution::Resolved(dependencies))
    }

    fn resolve_file(
        &self,
        file: &FileEntry,
        device: &str,
        language: Language,
        link: LinkKind,
        dependencies: &mut Dependencies,
    ) -> Result<(), ResolutionError> {
        let required = |value: &Option<String>, attribute| {
            value
                .clone()
                .ok_or_else(|| ResolutionError::MissingAttribute {
                    device: device.to_string(),
                    element: "file",
                    attribute,
                })
        };
        let condition = required(&file.condition, "condition")?;
        let category = required(&file.category, "category")?;
        let name = required(&file.name, "name")?;

        let Some(slot) = classify(&condition, &category, &name, language, link) else {
            return Ok(());
        };

        // File names are always relative to the pack, even when rooted.
        let relative = name.replace('\\', "/");
        let path = self.pack_dir().join(relative.trim_start_matches('/'));
        let exists = if slot.is_directory() {
            path.is_dir()
        } else {
            path.is_file()
        };
        if !exists {
            return Err(ResolutionError::MissingFile {
                slot,
                path: path.display().to_string(),
            });
        }

        tracing::trace!("{condition}:{category}:{name} -> {slot}");
        dependencies.assign(slot, path);

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::{classify, Dependencies, Language, LinkKind, Resolution, Skip, Slot};
    use crate::descriptor::{Descriptor, Verbosity};
    use crate::error::ResolutionError;

    const ATMEL: &str = "http://www.atmel.com/schemas/pack-device-atmel-extension";

    /// Writes `files` below a fresh pack directory and loads `pdsc` from it.
    fn pack(pdsc: &str, files: &[&str]) -> (tempfile::TempDir, Descriptor) {
        let dir = tempfile::tempdir().unwrap();
        for file in files {
            let path = dir.path().join(file);
            if file.ends_with('/') {
                std::fs::create_dir_all(&path).unwrap();
            } else {
                std::fs::create_dir_all(path.parent().unwrap()).unwrap();
                std::fs::write(&path, "").unwrap();
            }
        }
        let path = dir.path().join("Atmel.pdsc");
        std::fs::write(&path, pdsc).unwrap();
        let descriptor = Descriptor::load(&path, Verbosity::Quiet).unwrap();
        (dir, descriptor)
    }

    fn single_core(components: &str) -> String {
        format!(
            r#"<package schemaVersion="1.3" xmlns:at="{ATMEL}">
  <devices>
    <family Dfamily="SAM D20">
      <device Dname="ATSAMD20E14">
        <processor Dcore="Cortex-M0+"/>
        <compile header="samd20.h" define="__SAMD20E14__"/>
        <environment name="atmel">
          <at:extension>
            <at:project name="GCC C Executable">
              <at:component Cvendor="Atmel" Cclass="Device" Cgroup="Startup"/>
              <at:component Cvendor="Atmel" Cclass="Device" Cgroup="Extra"/>
              <at:component Cvendor="Atmel" Cclass="Device" Cgroup="Absent"/>
            </at:project>
            <at:project name="GCC C Library"/>
          </at:extension>
        </environment>
      </device>
    </family>
  </devices>
  <components>
{components}
  </components>
</package>"#
        )
    }

    const STARTUP: &str = r#"
    <component Cvendor="Atmel" Cclass="Device" Cgroup="Startup" condition="ATSAMD20E14">
      <files>
        <file category="include" condition="C" name="samd20/include/"/>
        <file category="header" condition="C" name="samd20/include/samd20.h"/>
        <file category="source" condition="C Exe" name="samd20/templates/main.c"/>
        <file category="source" condition="C Exe" name="samd20/templates/main.cpp"/>
        <file category="source" condition="GCC Exe" name="samd20/gcc/system_samd20.c"/>
        <file category="source" condition="GCC Exe" name="samd20/gcc/gcc/startup_samd20.c"/>
        <file category="linkerScript" condition="GCC Exe" name="samd20/gcc/gcc/samd20e14_flash.ld"/>
        <file category="doc" condition="C" name="samd20/readme.txt"/>
      </files>
    </component>"#;

    const STARTUP_FILES: &[&str] = &[
        "samd20/include/",
        "samd20/include/samd20.h",
        "samd20/templates/main.c",
        "samd20/templates/main.cpp",
        "samd20/gcc/system_samd20.c",
        "samd20/gcc/gcc/startup_samd20.c",
        "samd20/gcc/gcc/samd20e14_flash.ld",
    ];

    #[test]
    fn resolves_a_single_core_executable() {
        let (dir, descriptor) = pack(&single_core(STARTUP), STARTUP_FILES);
        let root = dir.path().canonicalize().unwrap();

        let dependencies = descriptor
            .resolve_dependencies("ATSAMD20E14", "c", "exe", "atmel")
            .unwrap()
            .dependencies()
            .unwrap();

        assert_eq!(dependencies.mode.to_string(), "thumb");
        assert_eq!(dependencies.cpu, "Cortex-M0plus");
        assert_eq!(dependencies.define, "__SAMD20E14__");
        assert_eq!(dependencies.include, Some(root.join("samd20/include/")));
        assert_eq!(
            dependencies.header,
            Some(root.join("samd20/include/samd20.h"))
        );
        assert_eq!(
            dependencies.template,
            Some(root.join("samd20/templates/main.c"))
        );
        assert_eq!(
            dependencies.system,
            Some(root.join("samd20/gcc/system_samd20.c"))
        );
        assert_eq!(
            dependencies.startup,
            Some(root.join("samd20/gcc/gcc/startup_samd20.c"))
        );
        assert_eq!(
            dependencies.linker_script,
            Some(root.join("samd20/gcc/gcc/samd20e14_flash.ld"))
        );
        assert!(dependencies.other.is_empty());
        assert_eq!(dependencies.cmsis_include, None);
    }

    #[test]
    fn cpp_projects_are_not_matched_by_c() {
        let (_dir, descriptor) = pack(&single_core(STARTUP), STARTUP_FILES);

        assert_eq!(
            descriptor
                .resolve_dependencies("ATSAMD20E14", "cpp", "exe", "atmel")
                .unwrap(),
            Resolution::Skipped(Skip::NoProject {
                language: Language::Cpp,
                device: "ATSAMD20E14".to_string(),
            })
        );
    }

    #[test]
    fn library_kind_uses_the_first_matching_project() {
        let (_dir, descriptor) = pack(&single_core(STARTUP), STARTUP_FILES);

        // The first project matching " c " is the executable one.
        let dependencies = descriptor
            .resolve_dependencies("ATSAMD20E14", "C", "LIB", "atmel")
            .unwrap()
            .dependencies()
            .unwrap();

        assert!(dependencies.template.is_none());
        assert!(dependencies.include.is_some());
        assert!(dependencies.linker_script.is_some());
    }

    #[test]
    fn unsupported_arguments_are_skipped() {
        let (_dir, descriptor) = pack(&single_core(STARTUP), STARTUP_FILES);

        assert_eq!(
            descriptor
                .resolve_dependencies("ATSAMD20E14", "c", "dll", "atmel")
                .unwrap(),
            Resolution::Skipped(Skip::UnsupportedLinkKind("dll".to_string()))
        );
        assert_eq!(
            descriptor
                .resolve_dependencies("ATSAMD20E14", "java", "exe", "atmel")
                .unwrap(),
            Resolution::Skipped(Skip::UnsupportedLanguage("java".to_string()))
        );
        assert_eq!(
            descriptor
                .resolve_dependencies("ATSAMD20E14", "c", "exe", "atme")
                .unwrap(),
            Resolution::Skipped(Skip::UnsupportedExtension("atme".to_string()))
        );
        assert_eq!(
            Skip::UnsupportedLinkKind("dll".to_string()).to_string(),
            "Incorrect project configuration \"dll\""
        );
    }

    #[test]
    fn unknown_device_fails() {
        let (_dir, descriptor) = pack(&single_core(STARTUP), STARTUP_FILES);

        assert!(matches!(
            descriptor.resolve_dependencies("ATSAMD21G18A", "c", "exe", "atmel"),
            Err(ResolutionError::Device(_))
        ));
    }

    #[test]
    fn missing_file_fails_without_partial_result() {
        let (_dir, descriptor) = pack(
            &single_core(STARTUP),
            &STARTUP_FILES[..STARTUP_FILES.len() - 1],
        );

        let error = descriptor
            .resolve_dependencies("ATSAMD20E14", "c", "exe", "atmel")
            .unwrap_err();
        match error {
            ResolutionError::MissingFile { slot, path } => {
                assert_eq!(slot, Slot::LinkerScript);
                assert!(path.ends_with("samd20e14_flash.ld"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn include_must_be_a_directory() {
        let components = r#"
    <component Cvendor="Atmel" Cclass="Device" Cgroup="Startup" condition="ATSAMD20E14">
      <files><file category="include" condition="C" name="include"/></files>
    </component>"#;
        let (_dir, descriptor) = pack(&single_core(components), &["include"]);

        assert!(matches!(
            descriptor.resolve_dependencies("ATSAMD20E14", "c", "exe", "atmel"),
            Err(ResolutionError::MissingFile {
                slot: Slot::Include,
                ..
            })
        ));
    }

    // Two components contributing the same singular slot: the file processed
    // last wins. This mirrors how the descriptors have always been read and
    // may hide mistakes in a pack; `other` files accumulate instead.
    #[test]
    fn singular_slots_overwrite_and_other_accumulates() {
        let components = r#"
    <component Cvendor="Atmel" Cclass="Device" Cgroup="Startup" condition="ATSAMD20E14">
      <files>
        <file category="header" condition="C" name="first.h"/>
        <file category="other" condition="GCC Exe" name="gcc/first.ld"/>
      </files>
    </component>
    <component Cvendor="Atmel" Cclass="Device" Cgroup="Extra" condition="ATSAMD20E14">
      <files>
        <file category="header" condition="C" name="second.h"/>
        <file category="other" condition="GCC Exe" name="gcc/second.ld"/>
      </files>
    </component>"#;
        let (dir, descriptor) = pack(
            &single_core(components),
            &["first.h", "second.h", "gcc/first.ld", "gcc/second.ld"],
        );
        let root = dir.path().canonicalize().unwrap();

        let dependencies = descriptor
            .resolve_dependencies("ATSAMD20E14", "c", "exe", "atmel")
            .unwrap()
            .dependencies()
            .unwrap();

        assert_eq!(dependencies.header, Some(root.join("second.h")));
        assert_eq!(
            dependencies.other,
            [root.join("gcc/first.ld"), root.join("gcc/second.ld")]
        );
    }

    #[test]
    fn missing_environment_is_a_hard_failure() {
        let pdsc = format!(
            r#"<package schemaVersion="1.3" xmlns:at="{ATMEL}">
  <devices><family><device Dname="ATSAMD20E14">
    <processor Dcore="Cortex-M0+"/>
    <compile define="__SAMD20E14__"/>
    <environment name="uv"/>
  </device></family></devices>
</package>"#
        );
        let (_dir, descriptor) = pack(&pdsc, &[]);

        let error = descriptor
            .resolve_dependencies("ATSAMD20E14", "c", "exe", "atmel")
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "Environment extension \"atmel\" is not found"
        );
    }

    const DUAL_CORE: &str = r#"<package schemaVersion="1.3" xmlns:at="http://www.atmel.com/schemas/pack-device-atmel-extension">
  <devices>
    <family Dfamily="SAM4C">
      <device Dname="ATSAM4C4C">
        <processor Pname="0" Dcore="Cortex-M4"/>
        <processor Pname="1" Dcore="Cortex-M4+"/>
        <compile Pname="0" define="__SAM4C4C_0__"/>
        <compile Pname="1" define="__SAM4C4C_1__"/>
        <environment name="atmel">
          <at:extension>
            <at:project Pname="1" name="GCC C Executable">
              <at:component Cvendor="Atmel" Cclass="Device" Cgroup="Boot"/>
            </at:project>
            <at:project Pname="0" name="GCC C Executable">
              <at:component Cvendor="Atmel" Cclass="Device" Cgroup="Startup"/>
            </at:project>
          </at:extension>
        </environment>
      </device>
    </family>
  </devices>
  <components>
    <component Cvendor="Atmel" Cclass="Device" Cgroup="Startup" condition="ATSAM4C4C:0">
      <files>
        <file category="linkerScript" condition="GCC Exe" name="gcc/sam4c4c_0_flash.ld"/>
      </files>
    </component>
    <component Cvendor="Atmel" Cclass="Device" Cgroup="Boot" condition="ATSAM4C4C:1">
      <files>
        <file category="linkerScript" condition="GCC Exe" name="gcc/sam4c4c_1_flash.ld"/>
        <file category="other" condition="GCC Exe" name="gcc/sam4c4c_1_sram.ld"/>
      </files>
    </component>
  </components>
</package>"#;

    #[test]
    fn dual_core_devices_are_scoped_by_processor() {
        let (dir, descriptor) = pack(
            DUAL_CORE,
            &[
                "gcc/sam4c4c_0_flash.ld",
                "gcc/sam4c4c_1_flash.ld",
                "gcc/sam4c4c_1_sram.ld",
            ],
        );
        let root = dir.path().canonicalize().unwrap();

        let core0 = descriptor
            .resolve_dependencies("ATSAM4C4C:0", "c", "exe", "atmel")
            .unwrap()
            .dependencies()
            .unwrap();
        assert_eq!(core0.cpu, "Cortex-M4");
        assert_eq!(core0.define, "__SAM4C4C_0__");
        assert_eq!(
            core0.linker_script,
            Some(root.join("gcc/sam4c4c_0_flash.ld"))
        );
        assert!(core0.other.is_empty());

        let core1 = descriptor
            .resolve_dependencies("ATSAM4C4C:1", "c", "exe", "atmel")
            .unwrap()
            .dependencies()
            .unwrap();
        assert_eq!(core1.cpu, "Cortex-M4plus");
        assert_eq!(core1.define, "__SAM4C4C_1__");
        assert_eq!(
            core1.linker_script,
            Some(root.join("gcc/sam4c4c_1_flash.ld"))
        );
        assert_eq!(core1.other, [root.join("gcc/sam4c4c_1_sram.ld")]);
    }

    #[test]
    fn core_without_a_project_of_its_own_is_skipped() {
        let pdsc = DUAL_CORE.replace(
            r#"Pname="1" name="GCC C Executable""#,
            r#"Pname="1" name="GCC C++ Executable""#,
        );
        let (_dir, descriptor) = pack(&pdsc, &["gcc/sam4c4c_0_flash.ld"]);

        let core0 = descriptor
            .resolve_dependencies("ATSAM4C4C:0", "c", "exe", "atmel")
            .unwrap();
        assert!(matches!(core0, Resolution::Resolved(_)));

        let core1 = descriptor
            .resolve_dependencies("ATSAM4C4C:1", "c", "exe", "atmel")
            .unwrap();
        assert_eq!(
            core1,
            Resolution::Skipped(Skip::NoProject {
                language: Language::C,
                device: "ATSAM4C4C:1".to_string(),
            })
        );
    }

    #[test]
    fn rooted_file_names_stay_inside_the_pack() {
        let components = r#"
    <component Cvendor="Atmel" Cclass="Device" Cgroup="Startup" condition="ATSAMD20E14">
      <files>
        <file category="header" condition="C" name="/include/samd20.h"/>
        <file category="other" condition="GCC Exe" name="\gcc\sram.ld"/>
      </files>
    </component>"#;
        let (dir, descriptor) = pack(
            &single_core(components),
            &["include/samd20.h", "gcc/sram.ld"],
        );
        let root = dir.path().canonicalize().unwrap();

        let dependencies = descriptor
            .resolve_dependencies("ATSAMD20E14", "c", "exe", "atmel")
            .unwrap()
            .dependencies()
            .unwrap();

        assert_eq!(dependencies.header, Some(root.join("include/samd20.h")));
        assert_eq!(dependencies.other, [root.join("gcc/sram.ld")]);
    }

    #[test]
    fn rooted_file_outside_the_pack_is_missing() {
        let outside = tempfile::tempdir().unwrap();
        let header = outside.path().join("samd20.h");
        std::fs::write(&header, "").unwrap();
        let components = format!(
            r#"
    <component Cvendor="Atmel" Cclass="Device" Cgroup="Startup" condition="ATSAMD20E14">
      <files>
        <file category="header" condition="C" name="{}"/>
      </files>
    </component>"#,
            header.display()
        );
        let (_dir, descriptor) = pack(&single_core(&components), &[]);

        let error = descriptor
            .resolve_dependencies("ATSAMD20E14", "c", "exe", "atmel")
            .unwrap_err();
        assert!(matches!(
            error,
            ResolutionError::MissingFile {
                slot: Slot::Header,
                ..
            }
        ));
    }

    #[test]
    fn language_token_is_space_delimited() {
        let project = |name: &str| {
            format!(
                r#"<package schemaVersion="1.3" xmlns:at="{ATMEL}">
  <devices><family><device Dname="D">
    <processor Dcore="Cortex-M0"/>
    <compile define="__D__"/>
    <environment name="atmel"><at:extension><at:project name="{name}"/></at:extension></environment>
  </device></family></devices>
</package>"#
            )
        };

        let matched = Descriptor::parse(&project("GCC C Executable"), ".", Verbosity::Quiet)
            .unwrap()
            .resolve_dependencies("D", "c", "exe", "atmel")
            .unwrap();
        assert!(matches!(matched, Resolution::Resolved(_)));

        let unmatched = Descriptor::parse(&project("GCC Cpp Executable"), ".", Verbosity::Quiet)
            .unwrap()
            .resolve_dependencies("D", "c", "exe", "atmel")
            .unwrap();
        assert!(matches!(unmatched, Resolution::Skipped(Skip::NoProject { .. })));
    }

    #[test]
    fn only_accumulating_slots_keep_every_file() {
        for slot in [
            Slot::Include,
            Slot::Header,
            Slot::Template,
            Slot::LinkerScript,
            Slot::System,
            Slot::Startup,
            Slot::Other,
        ] {
            let mut dependencies = Dependencies::default();
            dependencies.assign(slot, "first".into());
            dependencies.assign(slot, "second".into());

            let expected = if slot.accumulates() { 2 } else { 0 };
            assert_eq!(dependencies.other.len(), expected, "{slot:?}");
        }
    }

    #[test]
    fn classification_table() {
        use Language::{Cpp, C};
        use LinkKind::{Exe, Lib};

        assert_eq!(classify("C", "Include", "inc", C, Exe), Some(Slot::Include));
        assert_eq!(
            classify("c exe", "source", "templates/main.c ", C, Exe),
            Some(Slot::Template)
        );
        assert_eq!(classify("c exe", "source", "templates/main.c", Cpp, Exe), None);
        assert_eq!(
            classify("c lib", "source", "templates/library.cpp", Cpp, Lib),
            Some(Slot::Template)
        );
        assert_eq!(classify("c lib", "source", "templates/library.c", C, Exe), None);
        assert_eq!(
            classify("gcc exe", "source", "gcc/startup_samd20.c", C, Exe),
            Some(Slot::Startup)
        );
        assert_eq!(
            classify("gcc exe", "source", "gcc/system_samd20.c", Cpp, Lib),
            Some(Slot::System)
        );
        assert_eq!(classify("gcc exe", "source", "gcc/other.c", C, Exe), None);
        assert_eq!(classify("iar exe", "linkerscript", "x.icf", C, Exe), None);
        assert!(Slot::Other.accumulates());
        assert!(!Slot::Header.accumulates());
    }
}
