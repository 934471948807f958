//! Locating the tools under test.

use std::ffi::OsString;
use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{CommandBuilder, ToolCommand};

/// Environment variable naming the directory that holds the tool binaries.
pub const BIN_DIR_VARIABLE: &str = "TRI_HARNESS_BIN_DIR";

/// The external tools driven by the harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    PointTriangulator,
    PolygonTriangulator,
    ObjToRfm,
    Discretizer,
    Transform,
    Concatenate,
    Print,
    RfmToObj,
    RfmToWrl,
}

impl Tool {
    /// The binary name of a release build.
    pub fn base_name(&self) -> &'static str {
        match self {
            Tool::PointTriangulator => "triangulate_points",
            Tool::PolygonTriangulator => "triangulate_polygons",
            Tool::ObjToRfm => "obj2rfm",
            Tool::Discretizer => "rfm_discmesh",
            Tool::Transform => "rfm_trans",
            Tool::Concatenate => "rfm_cat",
            Tool::Print => "rfm_print",
            Tool::RfmToObj => "rfm2obj",
            Tool::RfmToWrl => "rfm2wrl",
        }
    }
}

/// Which build of the tools to run.
///
/// Debug builds carry a `.debug` suffix and enable the tools' internal consistency checks,
/// which is what the regression and stress runners want. Timing runs use release builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde")
)]
pub enum Profile {
    #[default]
    Debug,
    Release,
}

impl Profile {
    fn suffix(&self) -> &'static str {
        match self {
            Profile::Debug => ".debug",
            Profile::Release => "",
        }
    }
}

/// Resolves tool names to programs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde")
)]
pub struct ToolSet {
    bin_dir: Option<PathBuf>,
    profile_override: Option<Profile>,
}

impl ToolSet {
    /// Tools are looked up through `PATH`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses [BIN_DIR_VARIABLE] as tool directory if it is set.
    pub fn from_env() -> Self {
        match std::env::var_os(BIN_DIR_VARIABLE) {
            Some(dir) if !dir.is_empty() => Self::new().with_bin_dir(dir),
            _ => Self::new(),
        }
    }

    /// Runs tools from `dir` instead of searching `PATH`.
    pub fn with_bin_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.bin_dir = Some(dir.into());
        self
    }

    /// Forces every runner onto the given build, ignoring its own default.
    pub fn with_profile_override(mut self, profile: Profile) -> Self {
        self.profile_override = Some(profile);
        self
    }

    pub fn bin_dir(&self) -> Option<&PathBuf> {
        self.bin_dir.as_ref()
    }

    /// Returns the program to run for `tool` when a runner asks for `profile`.
    pub fn program(&self, tool: Tool, profile: Profile) -> OsString {
        let profile = self.profile_override.unwrap_or(profile);
        let name = format!("{}{}", tool.base_name(), profile.suffix());
        match &self.bin_dir {
            Some(dir) => dir.join(name).into_os_string(),
            None => name.into(),
        }
    }

    /// Starts a command line for `tool`.
    pub fn command(&self, tool: Tool, profile: Profile) -> CommandBuilder {
        ToolCommand::builder(self.program(tool, profile))
    }
}

#[cfg(test)]
mod test {
    use std::path::Path;

    use super::{Profile, Tool, ToolSet};

    #[test]
    fn test_program_names() {
        let tools = ToolSet::new();
        assert_eq!(
            tools.program(Tool::PointTriangulator, Profile::Debug),
            "triangulate_points.debug"
        );
        assert_eq!(tools.program(Tool::Discretizer, Profile::Release), "rfm_discmesh");
    }

    #[test]
    fn test_bin_dir_and_override() {
        let tools = ToolSet::new()
            .with_bin_dir("/opt/tools")
            .with_profile_override(Profile::Release);
        assert_eq!(
            Path::new(&tools.program(Tool::ObjToRfm, Profile::Debug)),
            Path::new("/opt/tools/obj2rfm")
        );
    }
}
