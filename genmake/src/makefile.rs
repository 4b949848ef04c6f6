use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use genmake_pdsc::{Dependencies, Language, LinkKind};

use crate::config::{Flags, Toolchain};
use crate::materialize::ProjectFiles;

/// A Makefile for one device, ready to be rendered.
pub struct Makefile<'a> {
    pub device: &'a str,
    pub language: Language,
    pub kind: LinkKind,
    pub dependencies: &'a Dependencies,
    pub files: &'a ProjectFiles,
    pub toolchain: &'a Toolchain,
    pub flags: &'a Flags,
}

impl Makefile<'_> {
    /// The device identifier in a form usable in file names.
    pub fn base_name(&self) -> String {
        self.device.replace(':', "_").to_lowercase()
    }

    /// Name of the file the Makefile is written to.
    pub fn file_name(&self) -> String {
        format!("{}_Makefile", self.base_name())
    }

    /// The artifact built by the Makefile.
    pub fn output_file(&self) -> String {
        match self.kind {
            LinkKind::Exe => format!("{}-application.elf", self.base_name()),
            LinkKind::Lib => format!("lib{}.a", self.base_name()),
        }
    }

    /// Renders the complete Makefile.
    pub fn render(&self) -> String {
        let mut out = self.header();
        out.push_str(&self.flags());
        out.push_str(&format!(
            "\nSRCS = {}\n\nOBJS = {}\n",
            self.files.sources.join(" "),
            self.files.objects.join(" ")
        ));
        out.push_str(&self.rules());
        out
    }

    /// Writes the Makefile into `dir` and returns its path.
    pub fn write(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(self.file_name());
        std::fs::write(&path, self.render())
            .with_context(|| format!("Could not write make file '{}'.", path.display()))?;
        Ok(path)
    }

    fn header(&self) -> String {
        let prefix = &self.toolchain.prefix;
        format!(
            "
#
# Makefile for {language} project of Atmel {device} device
#

ifdef SystemRoot
      SHELL = cmd.exe
      MKDIR = mkdir
else
   ifeq ($(shell uname), Linux)
    MKDIR = mkdir -p
   endif
endif

CC={prefix}gcc
CXX={prefix}g++
AR={prefix}ar
OBJCOPY={prefix}objcopy
OBJDUMP={prefix}objdump
SIZE={prefix}size

OUTPUT_FILE={output}
OUTPUT_FILE_NAME=$(basename $(OUTPUT_FILE))

",
            language = self.language,
            device = self.device,
            output = self.output_file(),
        )
    }

    /// Include paths and the compiler, assembler and linker flags.
    pub fn flags(&self) -> String {
        let dependencies = self.dependencies;
        let mode = dependencies.mode;
        // GCC only accepts lower case core names.
        let cpu = dependencies.cpu.to_lowercase();
        let define = &dependencies.define;
        let Flags {
            optimization,
            c_standard,
            cxx_standard,
        } = self.flags;

        let include_paths = [&dependencies.include, &dependencies.cmsis_include]
            .into_iter()
            .flatten()
            .map(|path| format!("-I{}", path.display()))
            .collect::<Vec<_>>()
            .join(" ");

        let mut ldflags = format!(
            "-Wl,--start-group -lm  -Wl,--end-group -Wl,--gc-sections -m{mode} -mcpu={cpu}"
        );
        if let Some(linker_script) = &self.files.linker_script {
            ldflags.push_str(&format!(" -T{linker_script}"));
        }
        if let Some(lib) = &dependencies.cmsis_lib {
            ldflags.push_str(&format!(" -L {}", lib.display()));
        }

        let common = format!("-m{mode} -mcpu={cpu} -D{define} {optimization} -ffunction-sections -Wall");
        format!(
            "INCLUDE_PATHS={include_paths}
ASFLAGS={common}
CFLAGS=-x c {common} -c -std={c_standard}
CXXFLAGS=-x c++ {common} -c -std={cxx_standard}
LDFLAGS={ldflags}
"
        )
    }

    fn rules(&self) -> String {
        let (target, clean) = match self.kind {
            LinkKind::Exe => (LINK_RULE, CLEAN_EXE),
            LinkKind::Lib => (ARCHIVE_RULE, CLEAN_LIB),
        };
        format!("{target}{COMPILE_RULES}{clean}")
    }
}

const LINK_RULE: &str = "
# All target
all: $(OUTPUT_FILE)

# Link target
$(OUTPUT_FILE): $(OBJS)
\t$(CC) -o $(OUTPUT_FILE) $(LDFLAGS) $(OBJS)
\t$(OBJCOPY) -O binary $(OUTPUT_FILE_NAME).elf $(OUTPUT_FILE_NAME).bin
\t$(OBJCOPY) -O ihex -R .eeprom -R .fuse -R .lock -R .signature  $(OUTPUT_FILE_NAME).elf $(OUTPUT_FILE_NAME).hex
\t$(OBJDUMP) -h -S $(OUTPUT_FILE_NAME).elf > $(OUTPUT_FILE_NAME).lss
\t$(SIZE) $(OUTPUT_FILE_NAME).elf
";

const ARCHIVE_RULE: &str = "
# All target
all: $(OUTPUT_FILE)

# Archive target
$(OUTPUT_FILE): $(OBJS)
\t$(AR) -rcs $(OUTPUT_FILE) $(OBJS)
";

const COMPILE_RULES: &str = "
# Compile target(s)
./%.o: ./%.cpp
\t$(CXX) $(CXXFLAGS) $(INCLUDE_PATHS) -o $@ $<

./%.o: ./%.c
\t$(CC) $(CFLAGS) $(INCLUDE_PATHS) -o $@ $<

startup/%.o: startup/%.c
\t$(CC) $(CFLAGS) $(INCLUDE_PATHS) -o $@ $<
";

const CLEAN_EXE: &str = "
clean:
\trm -f $(OBJS)
\trm -f $(OUTPUT_FILE_NAME).elf $(OUTPUT_FILE_NAME).bin $(OUTPUT_FILE_NAME).hex $(OUTPUT_FILE_NAME).lss
";

const CLEAN_LIB: &str = "
clean:
\trm -f $(OBJS)
\trm -f $(OUTPUT_FILE)
";
