//! Extension-based content type classification.

use crate::constants::DEFAULT_CONTENT_TYPE;

/// Map a filename to a MIME content type by its extension.
///
/// The extension is whatever follows the last `.`, compared case-insensitively.
/// Filenames without an extension, or with one not in the table, map to
/// `application/octet-stream`. Never fails.
pub fn classify(filename: &str) -> &'static str {
    let Some((_, ext)) = filename.rsplit_once('.') else {
        return DEFAULT_CONTENT_TYPE;
    };

    match ext.to_ascii_lowercase().as_str() {
        // Images
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "heic" => "image/heic",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",

        // Videos
        "mp4" => "video/mp4",
        "m4v" => "video/x-m4v",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",

        // Audio
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "flac" => "audio/flac",
        "m4a" => "audio/mp4",
        "aac" => "audio/aac",
        "ogg" => "audio/ogg",

        // Documents
        "txt" => "text/plain",
        "csv" => "text/csv",
        "json" => "application/json",
        "pdf" => "application/pdf",

        _ => DEFAULT_CONTENT_TYPE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_is_case_insensitive() {
        assert_eq!(classify("video.MOV"), "video/quicktime");
        assert_eq!(classify("video.mov"), "video/quicktime");
        assert_eq!(classify("Photo.JpEg"), "image/jpeg");
    }

    #[test]
    fn test_classify_uses_last_extension() {
        assert_eq!(classify("archive.tar.mp4"), "video/mp4");
        assert_eq!(classify("notes.final.txt"), "text/plain");
    }

    #[test]
    fn test_classify_falls_back_to_octet_stream() {
        assert_eq!(classify(""), DEFAULT_CONTENT_TYPE);
        assert_eq!(classify("README"), DEFAULT_CONTENT_TYPE);
        assert_eq!(classify("mp4"), DEFAULT_CONTENT_TYPE);
        assert_eq!(classify("trailing."), DEFAULT_CONTENT_TYPE);
        assert_eq!(classify("setlist.xyz"), DEFAULT_CONTENT_TYPE);
    }

    #[test]
    fn test_classify_is_total_and_deterministic() {
        let names = [
            "", ".", "..", "a.b.c", ".hidden", "song.FLAC", "clip.webm", "x.PDF", "weird name.M4A",
            "ünïcödé.wav", "no_ext",
        ];
        for name in names {
            let first = classify(name);
            assert!(!first.is_empty(), "empty classification for {:?}", name);
            assert_eq!(first, classify(name));
        }
    }

    #[test]
    fn test_classify_dotfile_uses_suffix() {
        assert_eq!(classify(".mp3"), "audio/mpeg");
        assert_eq!(classify(".hidden"), DEFAULT_CONTENT_TYPE);
    }
}
