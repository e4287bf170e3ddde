use std::path::{Path, PathBuf};

/// The transcript formats the transcription stage must produce for every item.
///
/// Why this exists:
/// - We want a single, strongly-typed representation of artifact formats
///   shared by the idempotency checks, the transcriber invocation, and tests.
/// - Using an enum avoids stringly-typed conditionals and keeps the "all
///   formats present" completeness rule explicit and discoverable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    /// Plain text transcript.
    Text,

    /// SubRip subtitles.
    Srt,

    /// WebVTT subtitles.
    Vtt,
}

/// Every format required for an item to count as transcribed.
///
/// An item with any subset missing is incomplete and stays eligible for retry.
pub const REQUIRED_FORMATS: &[ArtifactFormat] =
    &[ArtifactFormat::Text, ArtifactFormat::Srt, ArtifactFormat::Vtt];

impl ArtifactFormat {
    /// The file extension for this format (without the leading dot).
    pub fn extension(self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Srt => "srt",
            Self::Vtt => "vtt",
        }
    }

    /// The artifact path for item `id` under `output_dir`.
    pub fn path_for(self, output_dir: &Path, id: &str) -> PathBuf {
        output_dir.join(format!("{id}.{}", self.extension()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_are_distinct() {
        let exts: Vec<_> = REQUIRED_FORMATS.iter().map(|f| f.extension()).collect();
        assert_eq!(exts, vec!["txt", "srt", "vtt"]);
    }

    #[test]
    fn path_for_joins_id_and_extension() {
        let p = ArtifactFormat::Vtt.path_for(Path::new("/out"), "ep1");
        assert_eq!(p, Path::new("/out/ep1.vtt"));
    }
}
