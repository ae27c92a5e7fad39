use voxel_tiles_storage::SmallKeyHashSet;

/// A way in which the hardware or configuration could not give us what was asked for.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Shortfall {
    /// A requested 2D page or 3D cube size was larger than the hardware maximum.
    TextureSizeClamped { requested: i32, max: i32 },
    /// Paletted textures were requested but are not supported.
    PalettedUnsupported,
    /// The composition mode needs a blend equation the hardware lacks.
    BlendEquationUnsupported,
    /// An environment override could not be used.
    InvalidOverride { name: &'static str },
}

/// Reports every distinct `Shortfall` once per rendering context.
#[derive(Clone, Debug, Default)]
pub struct Diagnostics {
    reported: SmallKeyHashSet<Shortfall>,
}

impl Diagnostics {
    /// Logs a warning for `shortfall` unless it was already reported. Returns `true` if this is the first report.
    pub fn warn_once(&mut self, shortfall: Shortfall) -> bool {
        if !self.reported.insert(shortfall) {
            return false;
        }

        match shortfall {
            Shortfall::TextureSizeClamped { requested, max } => {
                tracing::warn!("Texture size {} exceeds hardware maximum, clamping to {}", requested, max)
            }
            Shortfall::PalettedUnsupported => {
                tracing::warn!("Paletted textures are not supported, falling back to RGBA")
            }
            Shortfall::BlendEquationUnsupported => {
                tracing::warn!("Blend equations are not supported, falling back to over compositing")
            }
            Shortfall::InvalidOverride { name } => tracing::warn!("Ignoring invalid value of {}", name),
        }

        true
    }

    pub fn was_reported(&self, shortfall: &Shortfall) -> bool {
        self.reported.contains(shortfall)
    }

    pub fn num_reported(&self) -> usize {
        self.reported.len()
    }
}

// ████████╗███████╗███████╗████████╗███████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝
//    ██║   █████╗  ███████╗   ██║   ███████╗
//    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║
//    ██║   ███████╗███████║   ██║   ███████║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝
