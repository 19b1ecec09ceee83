use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::layout::text::{FixedAdvanceMeasure, TextMeasure};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Well-known locations of bold sans-serif faces, in fallback order.
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    // Linux
    "/usr/share/fonts/truetype/roboto/unhinted/RobotoTTF/Roboto-Bold.ttf",
    "/usr/share/fonts/truetype/roboto/hinted/Roboto-Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Bold.ttf",
    "/usr/share/fonts/noto/NotoSans-Bold.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSansBold.ttf",
    // macOS
    "/System/Library/Fonts/SFNS.ttf",
    "/System/Library/Fonts/Helvetica.ttc",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    // Windows
    "C:\\Windows\\Fonts\\segoeuib.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

/// Environment variable with extra font files (path-list separated) tried before system fonts.
pub const FONT_PATH_ENV: &str = "SLIDECAST_FONTS";

/// One font file in the fallback chain.
#[derive(Clone, Debug)]
pub struct FontFace {
    /// Human-readable origin (usually the file path).
    pub label: String,
    /// Raw font file bytes (TTF/OTF/TTC).
    pub bytes: Arc<Vec<u8>>,
}

/// Ordered font fallback chain.
///
/// Text is shaped bold against the faces in order, followed by the generic `sans-serif` family.
#[derive(Clone, Debug, Default)]
pub struct FontSet {
    faces: Vec<FontFace>,
}

impl FontSet {
    /// Empty chain. Only slides without visible text can be drawn with it.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a face from bytes.
    pub fn push_bytes(&mut self, label: impl Into<String>, bytes: Vec<u8>) {
        self.faces.push(FontFace {
            label: label.into(),
            bytes: Arc::new(bytes),
        });
    }

    /// Append a face read from `path`.
    pub fn push_path(&mut self, path: &Path) -> SlidecastResult<()> {
        let bytes = std::fs::read(path).map_err(|e| {
            SlidecastError::raster(format!("failed to read font '{}': {e}", path.display()))
        })?;
        self.push_bytes(path.display().to_string(), bytes);
        Ok(())
    }

    /// Chain made of exactly the given files, in order.
    pub fn from_paths<P: AsRef<Path>>(paths: &[P]) -> SlidecastResult<Self> {
        let mut set = Self::new();
        for p in paths {
            set.push_path(p.as_ref())?;
        }
        Ok(set)
    }

    /// Faces from [`FONT_PATH_ENV`] and the built-in system locations that exist on this host.
    pub fn discover_system() -> Self {
        let mut set = Self::new();
        for path in env_font_paths()
            .into_iter()
            .chain(SYSTEM_FONT_CANDIDATES.iter().map(PathBuf::from))
        {
            if !path.is_file() {
                continue;
            }
            match set.push_path(&path) {
                Ok(()) => tracing::debug!(font = %path.display(), "font added to fallback chain"),
                Err(e) => tracing::warn!(font = %path.display(), "skipping unreadable font: {e}"),
            }
        }
        set
    }

    /// Explicit files first, then whatever [`FontSet::discover_system`] finds.
    pub fn resolve<P: AsRef<Path>>(explicit: &[P]) -> SlidecastResult<Self> {
        let mut set = Self::from_paths(explicit)?;
        set.faces.extend(Self::discover_system().faces);
        Ok(set)
    }

    /// Faces in fallback order.
    pub fn faces(&self) -> &[FontFace] {
        &self.faces
    }

    /// Number of faces.
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    /// Return `true` when no face is available.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}

fn env_font_paths() -> Vec<PathBuf> {
    std::env::var_os(FONT_PATH_ENV)
        .map(|v| std::env::split_paths(&v).collect())
        .unwrap_or_default()
}

/// Parley-backed shaper for single lines of bold text.
///
/// Holds its own font and layout contexts, so one shaper serves one thread.
pub struct TextShaper {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<()>,
    font_stack: String,
    family_count: usize,
    face_bytes: HashMap<u64, Arc<Vec<u8>>>,
    paint_fonts: HashMap<(u64, u32), vello_cpu::peniko::FontData>,
}

impl TextShaper {
    /// Register every face of `fonts` and build the font stack.
    pub fn new(fonts: &FontSet) -> SlidecastResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let mut face_bytes = HashMap::new();
        let mut families = Vec::<String>::new();

        for face in fonts.faces() {
            let blob = parley::fontique::Blob::from(face.bytes.as_ref().clone());
            face_bytes.insert(blob.id(), Arc::clone(&face.bytes));
            let registered = font_ctx.collection.register_fonts(blob, None);
            if registered.is_empty() {
                tracing::warn!(font = %face.label, "font file contains no usable faces");
                continue;
            }
            for (family_id, _) in registered {
                let Some(name) = font_ctx.collection.family_name(family_id) else {
                    continue;
                };
                if !families.iter().any(|f| f == name) {
                    families.push(name.to_string());
                }
            }
        }

        if !fonts.is_empty() && families.is_empty() {
            return Err(SlidecastError::raster(
                "no font families could be registered from the fallback chain",
            ));
        }

        let family_count = families.len();
        let font_stack = css_font_stack(&families);
        tracing::debug!(%font_stack, "text shaper ready");
        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            font_stack,
            family_count,
            face_bytes,
            paint_fonts: HashMap::new(),
        })
    }

    /// Return `true` when at least one family is registered.
    pub fn has_fonts(&self) -> bool {
        self.family_count > 0
    }

    /// CSS-style family list used for shaping.
    pub fn font_stack(&self) -> &str {
        &self.font_stack
    }

    /// Shape `text` on a single unbroken line.
    pub(crate) fn shape_line(&mut self, text: &str, font_size_px: u32) -> parley::Layout<()> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.font_stack.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::BOLD,
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(font_size_px as f32));

        let mut layout: parley::Layout<()> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }

    /// Paint-side handle for a face chosen by the shaper.
    pub(crate) fn paint_font(
        &mut self,
        blob_id: u64,
        index: u32,
    ) -> SlidecastResult<vello_cpu::peniko::FontData> {
        if let Some(font) = self.paint_fonts.get(&(blob_id, index)) {
            return Ok(font.clone());
        }
        let bytes = self.face_bytes.get(&blob_id).ok_or_else(|| {
            SlidecastError::raster("shaped glyph run references an unregistered font")
        })?;
        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(bytes.as_ref().clone()),
            index,
        );
        self.paint_fonts.insert((blob_id, index), font.clone());
        Ok(font)
    }
}

impl TextMeasure for TextShaper {
    fn measure(&mut self, text: &str, font_size_px: u32) -> f32 {
        if !self.has_fonts() {
            return FixedAdvanceMeasure::default().measure(text, font_size_px);
        }
        self.shape_line(text, font_size_px).width()
    }
}

fn css_font_stack(families: &[String]) -> String {
    let mut out = String::new();
    for name in families {
        out.push('"');
        out.push_str(&name.replace('"', "\\\""));
        out.push_str("\", ");
    }
    out.push_str("sans-serif");
    out
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fonts.rs"]
mod tests;
