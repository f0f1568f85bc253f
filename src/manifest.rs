//! TOML fixture manifests
//!
//! ```toml
//! [defaults]
//! mode = "0640"
//! verify = ["-accessed"]
//!
//! [[file]]
//! path = "a"
//! kind = "directory"
//! mode = "0750"
//!
//! [[file]]
//! path = "a/f"
//! kind = "regular"
//! size = 20
//! seed = 18
//! modified = 2024-01-02T03:04:05Z
//!
//! [[file]]
//! path = "a/l"
//! kind = "symlink"
//! target = "f"
//! ```

use anyhow::{Context, Result, bail};
use chrono::{DateTime, FixedOffset};
use filefactory::{Attribute, Constructor, Instruction, attr, dir, reg, sym, verify};
use serde::de::{self, Deserializer};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// A fixture manifest: factory defaults plus an ordered list of entries
#[derive(Debug, Deserialize, Default)]
pub struct Manifest {
    /// Factory extra defaults applied to every entry
    #[serde(default)]
    pub defaults: AttributeSpec,

    #[serde(default, rename = "file")]
    pub files: Vec<Entry>,
}

/// Optional attribute values, shared by `[defaults]` and each `[[file]]`
#[derive(Debug, Deserialize, Default, Clone)]
pub struct AttributeSpec {
    /// Octal permission bits, e.g. `"0750"`
    pub mode: Option<String>,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
    /// TOML offset datetime or RFC 3339 string
    #[serde(default, deserialize_with = "timestamp")]
    pub modified: Option<DateTime<FixedOffset>>,
    #[serde(default, deserialize_with = "timestamp")]
    pub accessed: Option<DateTime<FixedOffset>>,
    pub size: Option<u64>,
    pub seed: Option<u64>,
    /// Ordered instructions such as `"-mode-perm"` or `"+contents"`
    #[serde(default)]
    pub verify: Vec<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Regular,
    Directory,
    Symlink,
}

#[derive(Debug, Deserialize)]
pub struct Entry {
    pub path: PathBuf,
    pub kind: Kind,
    /// Link target, symlinks only
    pub target: Option<PathBuf>,
    #[serde(flatten)]
    pub attributes: AttributeSpec,
}

impl Manifest {
    /// Load a manifest from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read manifest: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid manifest: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let manifest: Self = toml::from_str(content).context("Invalid TOML format")?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Check entries for structural mistakes before anything is built
    pub fn validate(&self) -> Result<()> {
        self.defaults
            .to_attributes()
            .context("Invalid [defaults]")?;
        for entry in &self.files {
            entry
                .validate()
                .with_context(|| format!("Invalid entry '{}'", entry.path.display()))?;
        }
        Ok(())
    }

    /// Factory extra defaults for creating the fixture
    pub fn create_defaults(&self) -> Result<Vec<Attribute>> {
        self.defaults.to_attributes()
    }

    /// Factory extra defaults for verifying the fixture
    ///
    /// Timestamps a factory stamps at creation cannot be known by a later
    /// process, so time checks are off unless `[defaults]` pins them.
    /// Manifest instructions still apply after that.
    pub fn verify_defaults(&self) -> Result<Vec<Attribute>> {
        let mut attributes = Vec::new();
        if self.defaults.modified.is_none() {
            attributes.push(verify::modified_time(false).into());
        }
        if self.defaults.accessed.is_none() {
            attributes.push(verify::accessed_time(false).into());
        }
        attributes.extend(self.defaults.to_attributes()?);
        Ok(attributes)
    }

    /// One constructor per entry, in manifest order
    pub fn constructors(&self) -> Result<Vec<Constructor>> {
        self.files.iter().map(Entry::constructor).collect()
    }
}

impl Entry {
    fn validate(&self) -> Result<()> {
        match (self.kind, &self.target) {
            (Kind::Symlink, None) => bail!("symlink requires a target"),
            (Kind::Regular | Kind::Directory, Some(_)) => {
                bail!("only symlinks take a target")
            }
            _ => {}
        }
        if self.kind != Kind::Regular
            && (self.attributes.size.is_some() || self.attributes.seed.is_some())
        {
            bail!("size and seed only apply to regular files");
        }
        self.attributes.to_attributes()?;
        Ok(())
    }

    pub fn constructor(&self) -> Result<Constructor> {
        self.validate()?;
        let attributes = self.attributes.to_attributes()?;
        let constructor = match (self.kind, &self.target) {
            (Kind::Regular, _) => reg(&self.path, &attributes),
            (Kind::Directory, _) => dir(&self.path, &attributes),
            (Kind::Symlink, Some(target)) => sym(&self.path, target, &attributes),
            (Kind::Symlink, None) => bail!("symlink requires a target"),
        };
        Ok(constructor)
    }
}

impl AttributeSpec {
    /// Attributes in a fixed order, instructions last
    pub fn to_attributes(&self) -> Result<Vec<Attribute>> {
        let mut attributes = Vec::new();
        if let Some(mode) = &self.mode {
            attributes.push(attr::mode_perm(parse_mode(mode)?));
        }
        if let Some(uid) = self.uid {
            attributes.push(attr::owner(uid));
        }
        if let Some(gid) = self.gid {
            attributes.push(attr::group(gid));
        }
        if let Some(modified) = self.modified {
            attributes.push(attr::modified_at(SystemTime::from(modified)));
        }
        if let Some(accessed) = self.accessed {
            attributes.push(attr::accessed_at(SystemTime::from(accessed)));
        }
        if let Some(size) = self.size {
            attributes.push(attr::size(size));
        }
        if let Some(seed) = self.seed {
            attributes.push(attr::seed(seed));
        }
        for instruction in &self.verify {
            let instruction: Instruction = instruction
                .parse()
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("Invalid verify instruction '{instruction}'"))?;
            attributes.push(instruction.into());
        }
        Ok(attributes)
    }
}

/// Accept either a native TOML datetime or a quoted RFC 3339 string
fn timestamp<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<DateTime<FixedOffset>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(value) = Option::<toml::Value>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let text = match value {
        toml::Value::String(text) => text,
        toml::Value::Datetime(datetime)
            if datetime.date.is_some() && datetime.time.is_some() && datetime.offset.is_some() =>
        {
            datetime.to_string()
        }
        toml::Value::Datetime(datetime) => {
            return Err(de::Error::custom(format!(
                "timestamp {datetime} needs a date, a time and an offset"
            )));
        }
        other => {
            return Err(de::Error::custom(format!(
                "expected a timestamp, found {}",
                other.type_str()
            )));
        }
    };
    DateTime::parse_from_rfc3339(&text)
        .map(Some)
        .map_err(|e| de::Error::custom(format!("invalid timestamp '{text}': {e}")))
}

/// Parse octal permission bits: `"750"`, `"0750"` or `"0o750"`
pub fn parse_mode(mode: &str) -> Result<u32> {
    let digits = mode.trim();
    let digits = digits.strip_prefix("0o").unwrap_or(digits);
    let perm = u32::from_str_radix(digits, 8)
        .with_context(|| format!("Invalid octal mode '{mode}'"))?;
    if perm > 0o777 {
        bail!("Mode '{mode}' has bits outside 0777");
    }
    Ok(perm)
}
