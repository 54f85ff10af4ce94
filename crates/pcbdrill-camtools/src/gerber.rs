//! Gerber decoding boundary.
//!
//! The classifier only needs two things from a Gerber decoder: whether the file
//! decodes, and which layer function it has. [`GerberDecoder`] is that narrow
//! interface; [`GerberFileDecoder`] implements it on top of `gerber_parser`.

use gerber_parser::parse;
use gerber_parser::gerber_types::Unit;
use pcbdrill_core::{Error, LayerKind, MeasurementSystem, Result};
use regex::Regex;
use std::fmt;
use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

static RE_FS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%FS.*?\*%").expect("invalid regex pattern"));
static RE_MO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%MO.*?\*%").expect("invalid regex pattern"));
static RE_FILE_FUNCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"%TF\.FileFunction,([^*%]*)\*%").expect("invalid regex pattern")
});

/// How the decoder should determine the layer kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayerKindHint {
    /// Infer from file attributes, extension, and file name
    #[default]
    Infer,
    /// Use the given kind without inference
    Fixed(LayerKind),
}

/// A decoded Gerber layer, owned by the record that holds it
pub trait GerberArtifact: fmt::Debug {
    /// Layer kind inferred (or fixed) at decode time
    fn layer_kind(&self) -> LayerKind;
}

/// Gerber decoding capability consumed by the directory classifier
pub trait GerberDecoder {
    /// Decode the file at `path`, failing with [`Error::Decode`] if it cannot be read or is not
    /// valid Gerber
    fn decode(&self, path: &Path, hint: LayerKindHint) -> Result<Box<dyn GerberArtifact>>;
}

/// Gerber layer decoded by `gerber_parser`
pub struct GerberLayerFile {
    path: PathBuf,
    kind: LayerKind,
    units: Option<MeasurementSystem>,
    command_count: usize,
    doc: gerber_parser::GerberDoc,
}

impl GerberLayerFile {
    /// Source file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Unit mode declared by `%MO`, if any
    pub fn units(&self) -> Option<MeasurementSystem> {
        self.units
    }

    /// Number of commands in the decoded document
    pub fn command_count(&self) -> usize {
        self.command_count
    }

    /// The decoded document, for renderers
    pub fn document(&self) -> &gerber_parser::GerberDoc {
        &self.doc
    }
}

impl fmt::Debug for GerberLayerFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GerberLayerFile")
            .field("path", &self.path)
            .field("kind", &self.kind)
            .field("units", &self.units)
            .field("command_count", &self.command_count)
            .finish_non_exhaustive()
    }
}

impl GerberArtifact for GerberLayerFile {
    fn layer_kind(&self) -> LayerKind {
        self.kind
    }
}

/// Default [`GerberDecoder`] backed by `gerber_parser`
#[derive(Debug, Clone, Copy, Default)]
pub struct GerberFileDecoder;

impl GerberFileDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Decode Gerber source text; `path` is used for kind inference and error reports
    pub fn decode_str(
        &self,
        path: &Path,
        content: &str,
        hint: LayerKindHint,
    ) -> Result<GerberLayerFile> {
        let sanitized = sanitize(content);
        let reader = BufReader::new(sanitized.as_bytes());
        let doc = parse(reader).map_err(|(_, e)| Error::decode(path, format!("{:?}", e)))?;

        if doc.format_specification.is_none() {
            return Err(Error::decode(path, "missing format specification (%FS)"));
        }

        let units = doc.units.as_ref().map(|u| match u {
            Unit::Millimeters => MeasurementSystem::Metric,
            Unit::Inches => MeasurementSystem::Imperial,
        });

        let kind = match hint {
            LayerKindHint::Fixed(kind) => kind,
            LayerKindHint::Infer => infer_layer_kind(path, content),
        };
        let command_count = doc.commands().into_iter().count();

        debug!(
            "Decoded Gerber {} as {} ({} commands)",
            path.display(),
            kind,
            command_count
        );

        Ok(GerberLayerFile {
            path: path.to_path_buf(),
            kind,
            units,
            command_count,
            doc,
        })
    }
}

impl GerberDecoder for GerberFileDecoder {
    fn decode(&self, path: &Path, hint: LayerKindHint) -> Result<Box<dyn GerberArtifact>> {
        let bytes =
            fs::read(path).map_err(|e| Error::decode(path, format!("cannot read file: {}", e)))?;
        let content = String::from_utf8_lossy(&bytes);
        let layer = self.decode_str(path, &content, hint)?;
        Ok(Box::new(layer))
    }
}

/// Keep only the first `%FS` and `%MO` statements; `gerber_parser` rejects repeats.
fn sanitize(content: &str) -> String {
    let keep_first = |re: &Regex, text: &str| -> String {
        let mut count = 0;
        re.replace_all(text, |caps: &regex::Captures| {
            count += 1;
            if count > 1 {
                String::new()
            } else {
                caps[0].to_string()
            }
        })
        .to_string()
    };

    let sanitized = keep_first(&RE_FS, content);
    keep_first(&RE_MO, &sanitized)
}

/// Infer the layer kind: `%TF.FileFunction` first, then extension, then file name.
pub fn infer_layer_kind(path: &Path, content: &str) -> LayerKind {
    if let Some(caps) = RE_FILE_FUNCTION.captures(content) {
        return layer_kind_from_file_function(&caps[1]);
    }

    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if let Some(kind) = layer_kind_from_extension(&ext) {
        return kind;
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    layer_kind_from_name(&name).unwrap_or(LayerKind::Unknown)
}

/// Map an X2 `.FileFunction` value such as `Copper,L1,Top` to a layer kind
pub fn layer_kind_from_file_function(value: &str) -> LayerKind {
    let function = value.split(',').next().unwrap_or_default().trim();
    match function.to_lowercase().as_str() {
        "copper" => LayerKind::Copper,
        "soldermask" => LayerKind::SolderMask,
        "legend" => LayerKind::Silkscreen,
        "paste" => LayerKind::Paste,
        "profile" => LayerKind::Outline,
        _ => LayerKind::Other,
    }
}

/// Protel-style extension conventions
pub fn layer_kind_from_extension(ext: &str) -> Option<LayerKind> {
    match ext {
        "gtl" | "gbl" => Some(LayerKind::Copper),
        "gts" | "gbs" => Some(LayerKind::SolderMask),
        "gto" | "gbo" => Some(LayerKind::Silkscreen),
        "gtp" | "gbp" => Some(LayerKind::Paste),
        "gko" | "gm1" => Some(LayerKind::Outline),
        _ => None,
    }
}

/// KiCad / EasyEDA style file-name conventions; `name` must be lowercase
pub fn layer_kind_from_name(name: &str) -> Option<LayerKind> {
    if name.contains("f.cu") || name.contains("b.cu") || name.contains("copper") {
        Some(LayerKind::Copper)
    } else if name.contains("mask") {
        Some(LayerKind::SolderMask)
    } else if name.contains("silks") || name.contains("legend") {
        Some(LayerKind::Silkscreen)
    } else if name.contains("paste") {
        Some(LayerKind::Paste)
    } else if name.contains("edge.cuts") || name.contains("outline") || name.contains("profile")
    {
        Some(LayerKind::Outline)
    } else {
        None
    }
}
