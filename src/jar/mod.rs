//! Jar (zip) archive assembly for finished mods.
//!
//! A [`JarFile`] is an in-memory map of entry paths to bytes; nothing
//! touches the filesystem until the whole archive is assembled, so a failed
//! build leaves no partial jar behind. [`ModArchive`] layers the mod-loader
//! conventions on top: manifest attributes, the mod descriptor json, and
//! one `.class` entry per emitted class.

mod manifest;

pub use manifest::JarManifest;

use std::collections::BTreeMap;
use std::io::{Cursor, Read, Seek, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

use crate::emit::EmittedClass;

const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";
const MOD_DESCRIPTOR_PATH: &str = "fabric.mod.json";

#[derive(Debug)]
pub enum JarError {
    Io(std::io::Error),
    Zip(zip::result::ZipError),
    Json(serde_json::Error),
    ManifestParse(String),
}

impl std::fmt::Display for JarError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JarError::Io(e) => write!(f, "I/O error: {e}"),
            JarError::Zip(e) => write!(f, "ZIP error: {e}"),
            JarError::Json(e) => write!(f, "mod descriptor error: {e}"),
            JarError::ManifestParse(e) => write!(f, "manifest parse error: {e}"),
        }
    }
}

impl std::error::Error for JarError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            JarError::Io(e) => Some(e),
            JarError::Zip(e) => Some(e),
            JarError::Json(e) => Some(e),
            JarError::ManifestParse(_) => None,
        }
    }
}

impl From<std::io::Error> for JarError {
    fn from(e: std::io::Error) -> Self {
        JarError::Io(e)
    }
}

impl From<zip::result::ZipError> for JarError {
    fn from(e: zip::result::ZipError) -> Self {
        JarError::Zip(e)
    }
}

impl From<serde_json::Error> for JarError {
    fn from(e: serde_json::Error) -> Self {
        JarError::Json(e)
    }
}

pub type JarResult<T> = Result<T, JarError>;

/// In-memory representation of a jar archive. Entries are kept in a
/// `BTreeMap` so archive layout is deterministic.
#[derive(Clone, Debug, Default)]
pub struct JarFile {
    entries: BTreeMap<String, Vec<u8>>,
}

impl JarFile {
    pub fn new() -> Self {
        JarFile::default()
    }

    /// Read a jar from any reader; directory entries are skipped.
    pub fn read<R: Read + Seek>(reader: R) -> JarResult<Self> {
        let mut archive = zip::ZipArchive::new(reader)?;
        let mut entries = BTreeMap::new();
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            entries.insert(name, data);
        }
        Ok(JarFile { entries })
    }

    pub fn from_bytes(bytes: &[u8]) -> JarResult<Self> {
        Self::read(Cursor::new(bytes))
    }

    pub fn open(path: impl AsRef<Path>) -> JarResult<Self> {
        let file = std::fs::File::open(path)?;
        Self::read(std::io::BufReader::new(file))
    }

    /// Write the jar to any writer using deflate compression.
    pub fn write<W: Write + Seek>(&self, writer: W) -> JarResult<()> {
        let mut zip_writer = zip::ZipWriter::new(writer);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, data) in &self.entries {
            zip_writer.start_file(name, options)?;
            zip_writer.write_all(data)?;
        }
        zip_writer.finish()?;
        Ok(())
    }

    pub fn to_bytes(&self) -> JarResult<Vec<u8>> {
        let mut buf = Cursor::new(Vec::new());
        self.write(&mut buf)?;
        Ok(buf.into_inner())
    }

    /// Assemble in memory, then write the file in one shot.
    pub fn save(&self, path: impl AsRef<Path>) -> JarResult<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    pub fn entry_names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|s| s.as_str())
    }

    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.entry_names().filter(|n| n.ends_with(".class"))
    }

    pub fn get_entry(&self, path: &str) -> Option<&[u8]> {
        self.entries.get(path).map(|v| v.as_slice())
    }

    pub fn set_entry(&mut self, path: impl Into<String>, data: Vec<u8>) {
        self.entries.insert(path.into(), data);
    }

    pub fn contains_entry(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Parse `META-INF/MANIFEST.MF` if present.
    pub fn manifest(&self) -> JarResult<Option<JarManifest>> {
        match self.get_entry(MANIFEST_PATH) {
            Some(data) => Ok(Some(JarManifest::parse(data)?)),
            None => Ok(None),
        }
    }

    pub fn set_manifest(&mut self, manifest: &JarManifest) {
        self.set_entry(MANIFEST_PATH, manifest.to_bytes());
    }
}

/// The loader's mod descriptor, serialized to `fabric.mod.json`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModDescriptor {
    #[serde(rename = "schemaVersion")]
    pub schema_version: u32,
    pub id: String,
    pub version: String,
    pub entrypoints: Entrypoints,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Entrypoints {
    pub main: Vec<String>,
}

/// Everything needed to package one mod jar.
#[derive(Clone, Debug, Default)]
pub struct ModArchive {
    /// Loader-facing mod id.
    pub identifier: String,
    pub version: String,
    /// Dot-delimited main entrypoint class, if the mod declares one.
    pub entrypoint: Option<String>,
    /// Game version the bundled classes were resolved against.
    pub game_version: String,
    classes: Vec<EmittedClass>,
    resources: Vec<(String, Vec<u8>)>,
}

impl ModArchive {
    pub fn new(
        identifier: impl Into<String>,
        version: impl Into<String>,
        game_version: impl Into<String>,
    ) -> Self {
        ModArchive {
            identifier: identifier.into(),
            version: version.into(),
            game_version: game_version.into(),
            ..ModArchive::default()
        }
    }

    pub fn set_entrypoint(&mut self, class: impl Into<String>) {
        self.entrypoint = Some(class.into());
    }

    pub fn add_class(&mut self, class: EmittedClass) {
        self.classes.push(class);
    }

    /// Add an arbitrary extra entry, e.g. an icon or a data file.
    pub fn add_resource(&mut self, path: impl Into<String>, data: Vec<u8>) {
        self.resources.push((path.into(), data));
    }

    pub fn descriptor(&self) -> ModDescriptor {
        ModDescriptor {
            schema_version: 1,
            id: self.identifier.clone(),
            version: self.version.clone(),
            entrypoints: Entrypoints {
                main: self.entrypoint.iter().cloned().collect(),
            },
        }
    }

    /// File name the archive is saved under.
    pub fn jar_name(&self) -> String {
        format!(
            "{}-v{}-{}.jar",
            self.identifier, self.version, self.game_version
        )
    }

    /// Assemble the full archive: manifest, mod descriptor, class entries,
    /// extra resources.
    pub fn to_jar(&self) -> JarResult<JarFile> {
        let mut jar = JarFile::new();

        let mut manifest = JarManifest::versioned();
        manifest.set("Fabric-Jar-Type", "classes");
        manifest.set("Fabric-Minecraft-Version", &self.game_version);
        jar.set_manifest(&manifest);

        jar.set_entry(MOD_DESCRIPTOR_PATH, serde_json::to_vec_pretty(&self.descriptor())?);

        for class in &self.classes {
            jar.set_entry(format!("{}.class", class.name), class.bytes.clone());
        }
        for (path, data) in &self.resources {
            jar.set_entry(path.clone(), data.clone());
        }
        Ok(jar)
    }

    pub fn to_bytes(&self) -> JarResult<Vec<u8>> {
        self.to_jar()?.to_bytes()
    }

    /// Write the jar into `dir` under [`Self::jar_name`], returning the
    /// written path.
    pub fn save(&self, dir: impl AsRef<Path>) -> JarResult<PathBuf> {
        let path = dir.as_ref().join(self.jar_name());
        self.to_jar()?.save(&path)?;
        info!(path = %path.display(), classes = self.classes.len(), "wrote mod archive");
        Ok(path)
    }
}
