use crate::models::Bitmap;

/// Rotation applied by the capture device, as recorded in the media index.
///
/// Anything other than the three non-trivial rotations collapses to
/// `Deg0`; the index is the authority and garbage degrades to identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Orientation {
    pub fn from_degrees(degrees: i32) -> Self {
        match degrees {
            90 => Self::Deg90,
            180 => Self::Deg180,
            270 => Self::Deg270,
            _ => Self::Deg0,
        }
    }

    pub fn degrees(self) -> u32 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    /// True when applying this orientation swaps width and height.
    pub fn swaps_dimensions(self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }
}

/// One entry of the media index projection: stable id, reported pixel
/// dimensions and capture orientation, sorted newest-first by the index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub id: String,
    pub width: u32,
    pub height: u32,
    pub orientation: Orientation,
}

/// A photo as held by the screen state: index metadata plus whatever
/// decoded pixels have arrived so far.
///
/// `id` never changes after construction. `thumbnail` and `full_image`
/// only move absent -> present (a load landing) or present -> absent
/// (an explicit refresh); the same id is never silently rebound to a
/// different image.
#[derive(Debug, Clone, PartialEq)]
pub struct Photo {
    pub id: String,
    pub orientation: Orientation,
    pub width: u32,
    pub height: u32,
    pub thumbnail: Option<Bitmap>,
    pub full_image: Option<Bitmap>,
}

impl Photo {
    /// Metadata-only photo straight from an index entry.
    pub fn from_entry(entry: IndexEntry) -> Self {
        Self {
            id: entry.id,
            orientation: entry.orientation,
            width: entry.width,
            height: entry.height,
            thumbnail: None,
            full_image: None,
        }
    }

    pub fn has_thumbnail(&self) -> bool {
        self.thumbnail.is_some()
    }

    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    /// Copy with both decoded fields dropped, used by refresh.
    pub fn without_images(&self) -> Self {
        Self {
            thumbnail: None,
            full_image: None,
            ..self.clone()
        }
    }
}
