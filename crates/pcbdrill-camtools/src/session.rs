//! Caller-owned session state.
//!
//! A [`Session`] holds the layers of the most recently opened directory and
//! runs the exports against them. Nothing here is global: every front end (or
//! test) creates its own session.

use crate::drill_press::{DrillCycleGenerator, DrillCycleParameters};
use crate::drill_parser::parse_drill_file_with;
use crate::excellon::{ExcellonDecoder, ExcellonReader};
use crate::gerber::{GerberDecoder, GerberFileDecoder};
use crate::layer_scan::{scan_directory_with, GerberFailurePolicy, LayerPayload, LayerRecord};
use pcbdrill_core::Result;
use std::path::{Path, PathBuf};
use tracing::info;

/// External renderer for decoded Gerber layers
pub trait LayerRenderer {
    /// Render `layer` as a vector image at `out_path`
    fn render(&self, layer: &LayerRecord, out_path: &Path) -> Result<()>;
}

/// Outcome of a drill export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrillExport {
    /// The session has no drill files; nothing was written
    NoDrillFiles,
    /// A program was written
    Written { drill_files: usize, holes: usize },
}

/// Layers loaded from one directory, plus the decoders used to load and parse them
pub struct Session {
    layers: Vec<LayerRecord>,
    gerber_decoder: Box<dyn GerberDecoder>,
    excellon_decoder: Box<dyn ExcellonDecoder>,
    policy: GerberFailurePolicy,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Session with the default decoders and the abort policy
    pub fn new() -> Self {
        Self::with_decoders(
            Box::new(GerberFileDecoder),
            Box::new(ExcellonReader),
            GerberFailurePolicy::Abort,
        )
    }

    pub fn with_decoders(
        gerber_decoder: Box<dyn GerberDecoder>,
        excellon_decoder: Box<dyn ExcellonDecoder>,
        policy: GerberFailurePolicy,
    ) -> Self {
        Self {
            layers: Vec::new(),
            gerber_decoder,
            excellon_decoder,
            policy,
        }
    }

    pub fn set_failure_policy(&mut self, policy: GerberFailurePolicy) {
        self.policy = policy;
    }

    /// Scan `path` and replace the loaded layers. Returns the number of layers detected.
    ///
    /// On error the previously loaded layers are kept.
    pub fn open_directory(&mut self, path: &Path) -> Result<usize> {
        let layers = scan_directory_with(path, self.gerber_decoder.as_ref(), self.policy)?;
        self.layers = layers;
        Ok(self.layers.len())
    }

    pub fn layers(&self) -> &[LayerRecord] {
        &self.layers
    }

    /// `"<file name> [<KIND>]"` for each layer, in scan order
    pub fn layer_listing(&self) -> Vec<String> {
        self.layers.iter().map(LayerRecord::display_label).collect()
    }

    /// Paths of the unparsed (drill/text) layers, in scan order
    pub fn drill_files(&self) -> Vec<PathBuf> {
        self.layers
            .iter()
            .filter(|layer| layer.is_unparsed())
            .map(|layer| layer.file_path().to_path_buf())
            .collect()
    }

    /// Parse every drill file and write one program with all holes to `out_path`.
    ///
    /// Holes are concatenated in scan order, then file order. The first drill
    /// file that fails to parse aborts the export before anything is written.
    pub fn export_drill_gcode(
        &self,
        out_path: &Path,
        params: DrillCycleParameters,
    ) -> Result<DrillExport> {
        let drill_files = self.drill_files();
        if drill_files.is_empty() {
            info!("No drill files found");
            return Ok(DrillExport::NoDrillFiles);
        }

        let mut holes = Vec::new();
        for path in &drill_files {
            holes.extend(parse_drill_file_with(path, self.excellon_decoder.as_ref())?);
        }

        DrillCycleGenerator::new(params).write_to_file(&holes, out_path)?;
        Ok(DrillExport::Written {
            drill_files: drill_files.len(),
            holes: holes.len(),
        })
    }

    /// Hand every decoded Gerber layer to `renderer`, writing `<out_dir>/<stem>.svg`.
    /// Returns the number of layers rendered.
    pub fn export_layer_images(&self, out_dir: &Path, renderer: &dyn LayerRenderer) -> Result<usize> {
        let mut rendered = 0;
        for layer in &self.layers {
            let LayerPayload::ParsedGerber(_) = layer.payload() else {
                continue;
            };
            let stem = layer
                .file_path()
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            renderer.render(layer, &out_dir.join(format!("{}.svg", stem)))?;
            rendered += 1;
        }
        info!("Rendered {} layers to {}", rendered, out_dir.display());
        Ok(rendered)
    }
}
