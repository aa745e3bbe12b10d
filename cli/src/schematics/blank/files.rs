//! Template sets of the `blank` schematic, embedded at compile time.
//!
//! The files live next to this module under `project-files/` and
//! `schematic-files/`; the same layout is expected under a configured
//! templates directory (`<dir>/blank/<set>/`).
//!
use crate::core::templating::EmbeddedFile;

macro_rules! embed {
    ($set:literal, $path:literal) => {
        EmbeddedFile {
            path: $path,
            contents: include_str!(concat!($set, "/", $path)),
        }
    };
}

pub const PROJECT_FILES_SET: &str = "project-files";
pub const SCHEMATIC_FILES_SET: &str = "schematic-files";

/// Skeleton of a new schematics package.
pub static PROJECT_FILES: &[EmbeddedFile] = &[
    embed!("project-files", "__dot__gitignore"),
    embed!("project-files", "__dot__npmignore"),
    embed!("project-files", "README.md"),
    embed!("project-files", "package.json.template"),
    embed!("project-files", "src/collection.json"),
    embed!("project-files", "tsconfig.json"),
];

/// Source of a single schematic, placed under `src/<name>/`.
pub static SCHEMATIC_FILES: &[EmbeddedFile] = &[
    embed!("schematic-files", "src/__name@dasherize__/index.ts.template"),
    embed!("schematic-files", "src/__name@dasherize__/index_spec.ts.template"),
];
