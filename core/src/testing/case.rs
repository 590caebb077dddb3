use std::path::{Path, PathBuf};

use crate::serdable::GlobPattern;

/// Expected outcome of a test case, encoded in the two-character prefix of
/// its file name: `c-` correct, `w-` wrong syntax, `s-` semantic, `r-`
/// runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum Category {
    #[strum(serialize = "correct program")]
    CorrectProgram,
    #[strum(serialize = "syntax error")]
    SyntaxError,
    #[strum(serialize = "semantic error")]
    SemanticError,
    #[strum(serialize = "runtime error")]
    RuntimeError,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("Unrecognized category prefix in test case name '{0}' (expected one of c-/w-/s-/r-)")]
pub struct InvalidIdentifier(pub String);

impl Category {
    pub fn classify(name: &str) -> Result<Self, InvalidIdentifier> {
        use Category::*;
        match name.get(..2) {
            Some("c-") => Ok(CorrectProgram),
            Some("w-") => Ok(SyntaxError),
            Some("s-") => Ok(SemanticError),
            Some("r-") => Ok(RuntimeError),
            _ => Err(InvalidIdentifier(name.to_owned())),
        }
    }
}

/// One discovered test case. Immutable: built once at discovery, consumed
/// once by an engine.
///
/// The optional stdin/golden paths record whether `name.in` / `name.out`
/// existed next to the source at discovery time, so the engines never have
/// to probe the filesystem themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    name: String,
    category: Category,
    source: PathBuf,
    stdin_file: Option<PathBuf>,
    golden_file: Option<PathBuf>,
}

impl TestCase {
    pub fn from_source_path(source: impl Into<PathBuf>) -> Result<Self, InvalidIdentifier> {
        let source = source.into();
        let name = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let category = Category::classify(&name)?;
        let stdin_file = existing_sibling(&source, "in");
        let golden_file = existing_sibling(&source, "out");
        Ok(Self {
            name,
            category,
            source,
            stdin_file,
            golden_file,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn stdin_file(&self) -> Option<&Path> {
        self.stdin_file.as_deref()
    }

    pub fn golden_file(&self) -> Option<&Path> {
        self.golden_file.as_deref()
    }

    /// Path the compile stage writes its artifact to: the source path with
    /// the suite's artifact extension.
    pub fn artifact_path(&self, ext: &str) -> PathBuf {
        self.source.with_extension(ext)
    }

    /// Collect the test cases of one suite directory: regular files whose
    /// name matches `include` and whose stem carries a recognized category
    /// prefix. Anything else is not a test case and is ignored, so
    /// unclassifiable names never reach an engine. Sorted by name.
    pub fn enumerate(dir: impl AsRef<Path>, include: &GlobPattern) -> fsutil::Result<Vec<Self>> {
        let mut res = Vec::new();
        for entry in fsutil::read_dir(&dir)?.filter_map(Result::ok) {
            let Ok(ft) = entry.file_type() else {
                continue;
            };
            if ft.is_dir() {
                continue;
            }
            if !include.matches(entry.file_name().to_string_lossy().as_ref()) {
                continue;
            }
            if let Ok(t) = Self::from_source_path(entry.path()) {
                res.push(t);
            }
        }
        res.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(res)
    }
}

fn existing_sibling(source: &Path, ext: &str) -> Option<PathBuf> {
    let path = source.with_extension(ext);
    path.is_file().then_some(path)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn classify_recognizes_the_four_prefixes() {
        assert_eq!(Category::classify("c-add").unwrap(), Category::CorrectProgram);
        assert_eq!(Category::classify("w-badtoken").unwrap(), Category::SyntaxError);
        assert_eq!(Category::classify("s-undecl").unwrap(), Category::SemanticError);
        assert_eq!(Category::classify("r-divzero").unwrap(), Category::RuntimeError);
    }

    #[test]
    fn classify_rejects_anything_else() {
        for name in ["x-add", "cadd", "", "c", "-c-add"] {
            let err = Category::classify(name).unwrap_err();
            assert_eq!(err, InvalidIdentifier(name.to_owned()));
        }
    }

    #[test]
    fn case_from_source_path_derives_name_and_category() {
        let t = TestCase::from_source_path("testdata/compiler/r-divzero.gt").unwrap();
        assert_eq!(t.name(), "r-divzero");
        assert_eq!(t.category(), Category::RuntimeError);
        assert_eq!(t.source(), Path::new("testdata/compiler/r-divzero.gt"));
        // Siblings do not exist on disk here.
        assert_eq!(t.stdin_file(), None);
        assert_eq!(t.golden_file(), None);
        assert_eq!(
            t.artifact_path("oz"),
            Path::new("testdata/compiler/r-divzero.oz")
        );
    }

    #[test]
    fn case_with_unknown_prefix_is_rejected() {
        assert!(TestCase::from_source_path("testdata/compiler/broken.gt").is_err());
    }
}
