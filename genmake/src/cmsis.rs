//! The CMSIS core pack, which provides the generic Cortex-M headers and
//! the DSP libraries.

use std::path::{Path, PathBuf};

use genmake_pdsc::Dependencies;

/// Location of the CMSIS core headers, relative to the CMSIS pack.
pub const INCLUDE_DIR: &str = "CMSIS/Include";
/// Location of the prebuilt GCC libraries, relative to the CMSIS pack.
pub const LIB_DIR: &str = "CMSIS/Lib/GCC";

/// cmsis pack directory '{0}' doesn't exist
#[derive(Debug, thiserror::Error, docsplay::Display)]
pub struct MissingPackDir(pub String);

/// CMSIS {kind} directory "{path}" not found.
#[derive(Debug, Clone, PartialEq, Eq, docsplay::Display)]
pub struct MissingDirectory {
    pub kind: &'static str,
    pub path: String,
}

/// The optional directories found in a CMSIS pack.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CmsisDirs {
    pub include: Option<PathBuf>,
    pub lib: Option<PathBuf>,
    /// Directories that were looked for but do not exist.
    pub missing: Vec<MissingDirectory>,
}

impl CmsisDirs {
    /// Looks for the include and library directories below `pack_dir`.
    pub fn probe(pack_dir: &Path) -> Result<Self, MissingPackDir> {
        if !pack_dir.exists() {
            return Err(MissingPackDir(pack_dir.display().to_string()));
        }
        let pack_dir = pack_dir
            .canonicalize()
            .map_err(|_| MissingPackDir(pack_dir.display().to_string()))?;

        let mut missing = Vec::new();
        let mut find = |kind: &'static str, relative: &str| {
            let path = pack_dir.join(relative);
            if path.is_dir() {
                return Some(path);
            }
            missing.push(MissingDirectory {
                kind,
                path: path.display().to_string(),
            });
            None
        };

        let include = find("include", INCLUDE_DIR);
        let lib = find("lib", LIB_DIR);

        Ok(CmsisDirs {
            include,
            lib,
            missing,
        })
    }

    /// Adds the directories that were found to `dependencies`.
    pub fn apply(&self, dependencies: &mut Dependencies) {
        dependencies.cmsis_include.clone_from(&self.include);
        dependencies.cmsis_lib.clone_from(&self.lib);
    }
}
