use std::path::{Path, PathBuf};
use std::result::Result as StdResult;

use anyhow::Context as _;
use rust_embed::RustEmbed;
use serde::Deserialize;

use crate::serdable::GlobPattern;
use crate::testing::runner::SuiteCommand;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(skip)]
    pub source_config_file: Option<PathBuf>,
    pub harness: HarnessConfig,
    #[serde(default)]
    pub build: BuildConfig,
    pub suite: Vec<SuiteConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HarnessConfig {
    pub shell: PathBuf,
    pub testdata_dir: PathBuf,
}

/// Shell commands that build the toolchain before a run (compiler first,
/// then the emulator, in the order written).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BuildConfig {
    #[serde(default)]
    pub commands: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SuiteConfig {
    pub name: String,
    /// Directory of this suite's test cases, relative to the testdata dir.
    pub dir: PathBuf,
    /// Which files in that directory are test sources.
    pub include: GlobPattern,
    #[serde(flatten)]
    pub command: SuiteCommandConfig,
}

/// Either a single diffed command, or a compile/emulate pair. Which one a
/// `[[suite]]` table means is decided by the keys it carries.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SuiteCommandConfig {
    CompileEmulate {
        compile: String,
        emulate: String,
        artifact_ext: String,
    },
    Single {
        run: String,
    },
}

#[derive(RustEmbed)]
#[folder = "assets/"]
struct Asset;

impl Config {
    pub const FILENAME: &str = "gauntlet.toml";

    pub fn example_toml() -> String {
        let file = Asset::get(Self::FILENAME).unwrap();
        std::str::from_utf8(file.data.as_ref()).unwrap().to_owned()
    }

    pub fn from_toml(s: &str) -> StdResult<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn from_toml_file(filepath: PathBuf) -> anyhow::Result<Self> {
        let toml = fsutil::read_to_string(&filepath).context("Cannot read a file")?;
        let mut cfg = Self::from_toml(&toml)
            .with_context(|| format!("Invalid config TOML: {:?}", filepath))?;
        cfg.source_config_file = Some(filepath);
        Ok(cfg)
    }

    /// Find config file in ancestor dirs, including current dir.
    pub fn find_file_in_ancestors(cur_dir: impl AsRef<Path>) -> anyhow::Result<PathBuf> {
        let cur_dir = cur_dir.as_ref();
        cur_dir
            .ancestors()
            .map(|dir| dir.join(Self::FILENAME))
            .find(|path| path.is_file())
            .with_context(|| {
                format!(
                    "Not in a gauntlet dir: Cannot find '{}'",
                    Self::FILENAME
                )
            })
    }

    pub fn from_file_finding_in_ancestors(cur_dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let config_filepath = Config::find_file_in_ancestors(cur_dir)?;
        Self::from_toml_file(config_filepath)
    }

    pub fn testcase_dir(&self, suite: &SuiteConfig) -> PathBuf {
        self.harness.testdata_dir.join(&suite.dir)
    }

    /// All suites, or just the named one.
    pub fn select_suites(&self, name: Option<&str>) -> anyhow::Result<Vec<&SuiteConfig>> {
        match name {
            None => Ok(self.suite.iter().collect()),
            Some(name) => {
                let suite = self
                    .suite
                    .iter()
                    .find(|s| s.name == name)
                    .with_context(|| format!("No suite named '{}' in the config", name))?;
                Ok(vec![suite])
            }
        }
    }
}

impl SuiteCommandConfig {
    pub fn to_command(&self) -> SuiteCommand {
        match self {
            SuiteCommandConfig::Single { run } => SuiteCommand::Single {
                run: run.to_owned(),
            },
            SuiteCommandConfig::CompileEmulate {
                compile,
                emulate,
                artifact_ext,
            } => SuiteCommand::CompileEmulate {
                compile: compile.to_owned(),
                emulate: emulate.to_owned(),
                artifact_ext: artifact_ext.to_owned(),
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn example_toml_should_be_parsable() {
        let toml = Config::example_toml();
        let cfg = Config::from_toml(&toml).unwrap();

        let Config {
            source_config_file,
            harness,
            build,
            suite,
        } = cfg;

        assert_eq!(source_config_file, None);
        assert_eq!(harness.shell, Path::new("/bin/sh"));
        assert_eq!(harness.testdata_dir, Path::new("testdata"));
        assert_eq!(build.commands.len(), 2);

        assert_eq!(suite.len(), 2);

        assert_eq!(suite[0].name, "compiler");
        assert_eq!(suite[0].dir, Path::new("compiler"));
        assert!(suite[0].include.matches("c-add.gt"));
        assert_eq!(
            suite[0].command,
            SuiteCommandConfig::CompileEmulate {
                compile: "./Goat #{source}".to_owned(),
                emulate: "./resources/oz/oz #{artifact}".to_owned(),
                artifact_ext: "oz".to_owned(),
            }
        );

        assert_eq!(suite[1].name, "prettier");
        assert_eq!(
            suite[1].command,
            SuiteCommandConfig::Single {
                run: "./Goat -p #{source}".to_owned(),
            }
        );
    }

    #[test]
    fn select_suites_by_name() {
        let cfg = Config::from_toml(&Config::example_toml()).unwrap();
        assert_eq!(cfg.select_suites(None).unwrap().len(), 2);
        assert_eq!(cfg.select_suites(Some("prettier")).unwrap()[0].name, "prettier");
        assert!(cfg.select_suites(Some("nope")).is_err());
    }
}
