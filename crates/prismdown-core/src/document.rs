//! Loading, decoding, and saving of markdown documents.
//!
//! Markdown files in the wild are sometimes authored with legacy encodings,
//! and silently mis-decoding corrupts content invisibly. The loader therefore
//! walks a deterministic fallback ladder and accepts the first decode that
//! looks like text. Saving always writes plain UTF-8, atomically.

use std::{
    fs,
    io::{self, Write as _},
    path::{Path, PathBuf},
    time::SystemTime,
};

use crate::{MAX_FILE_BYTES, error::LoadError};

/// Immutable snapshot of a file's decoded content at load time.
#[derive(Clone, Debug)]
pub struct Document {
    pub text: String,
    pub source_path: PathBuf,
}

/// Read and decode `path` into a [`Document`].
///
/// Pure read: no side effects beyond the filesystem access itself.
pub fn load(path: &Path) -> Result<Document, LoadError> {
    let len = fs::metadata(path)?.len();
    if len > MAX_FILE_BYTES {
        return Err(LoadError::TooLarge(len));
    }

    let bytes = fs::read(path)?;
    let text = decode_text(&bytes)?;
    Ok(Document {
        text,
        source_path: path.to_owned(),
    })
}

/// Decode raw bytes using the fallback ladder: UTF-8, UTF-16LE, UTF-16BE,
/// UTF-32LE, UTF-32BE, ASCII, Latin-1. First plausible decode wins.
pub fn decode_text(bytes: &[u8]) -> Result<String, LoadError> {
    let attempts: [fn(&[u8]) -> Option<String>; 7] = [
        decode_utf8,
        |b| decode_utf16(b, Endian::Little),
        |b| decode_utf16(b, Endian::Big),
        |b| decode_utf32(b, Endian::Little),
        |b| decode_utf32(b, Endian::Big),
        decode_ascii,
        decode_latin1,
    ];

    attempts
        .iter()
        .find_map(|attempt| attempt(bytes).filter(|text| is_plausible_text(text)))
        .ok_or(LoadError::UnsupportedEncoding)
}

#[derive(Clone, Copy)]
enum Endian {
    Little,
    Big,
}

fn decode_utf8(bytes: &[u8]) -> Option<String> {
    let bytes = bytes.strip_prefix(b"\xef\xbb\xbf").unwrap_or(bytes);
    std::str::from_utf8(bytes).ok().map(str::to_owned)
}

fn decode_utf16(bytes: &[u8], endian: Endian) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }

    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| match endian {
            Endian::Little => u16::from_le_bytes([pair[0], pair[1]]),
            Endian::Big => u16::from_be_bytes([pair[0], pair[1]]),
        })
        .collect();

    // 0xFFFE as the first unit is a byte-swapped BOM: wrong endianness.
    let units = match units.split_first() {
        Some((&0xFEFF, rest)) => rest,
        Some((&0xFFFE, _)) => return None,
        _ => &units[..],
    };

    String::from_utf16(units).ok()
}

fn decode_utf32(bytes: &[u8], endian: Endian) -> Option<String> {
    if bytes.len() % 4 != 0 {
        return None;
    }

    let mut out = String::with_capacity(bytes.len() / 4);
    for (index, quad) in bytes.chunks_exact(4).enumerate() {
        let unit = match endian {
            Endian::Little => u32::from_le_bytes([quad[0], quad[1], quad[2], quad[3]]),
            Endian::Big => u32::from_be_bytes([quad[0], quad[1], quad[2], quad[3]]),
        };
        if index == 0 && unit == 0xFEFF {
            continue;
        }
        out.push(char::from_u32(unit)?);
    }

    Some(out)
}

fn decode_ascii(bytes: &[u8]) -> Option<String> {
    bytes
        .iter()
        .all(u8::is_ascii)
        .then(|| bytes.iter().map(|&byte| char::from(byte)).collect())
}

fn decode_latin1(bytes: &[u8]) -> Option<String> {
    // True ISO-8859-1 text never uses the C1 control range; treating those
    // bytes as text would turn arbitrary binary into silent mojibake.
    bytes
        .iter()
        .all(|&byte| !matches!(byte, 0x80..=0x9f))
        .then(|| bytes.iter().map(|&byte| char::from(byte)).collect())
}

/// Reject decodes that produced binary-looking text. Embedded NULs and bare
/// control characters indicate the wrong rung of the ladder (for example a
/// UTF-16 read of UTF-32 bytes), not a legitimately authored markdown file.
fn is_plausible_text(text: &str) -> bool {
    text.chars().all(|c| {
        !matches!(c, '\u{00}'..='\u{1f}' | '\u{7f}'..='\u{9f}') || matches!(c, '\t' | '\n' | '\r')
    })
}

/// Write `contents` to `path` atomically: temp file in the same directory,
/// fsync, then rename into place. When rename-over-existing is unsupported,
/// the original is parked as a backup first so it can be restored.
pub fn write_text(path: &Path, contents: &str) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "path is missing a file name")
    })?;
    let file_name = file_name.to_string_lossy();

    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos());
    let suffix = u128::from(std::process::id()) ^ nanos;
    let tmp_path = dir.join(format!(".prismdown-tmp-{file_name}-{suffix}"));

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp_path)?;

    let result = write_and_swap(&mut file, &tmp_path, path, dir, &file_name, suffix, contents);
    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

fn write_and_swap(
    file: &mut fs::File,
    tmp_path: &Path,
    path: &Path,
    dir: &Path,
    file_name: &str,
    suffix: u128,
    contents: &str,
) -> io::Result<()> {
    file.write_all(contents.as_bytes())?;
    file.sync_all()?;

    if fs::rename(tmp_path, path).is_ok() {
        return Ok(());
    }

    if path.exists() {
        let backup_path = dir.join(format!(".prismdown-backup-{file_name}-{suffix}"));
        fs::rename(path, &backup_path)?;
        match fs::rename(tmp_path, path) {
            Ok(()) => {
                let _ = fs::remove_file(&backup_path);
                Ok(())
            }
            Err(err) => {
                let _ = fs::rename(&backup_path, path);
                Err(err)
            }
        }
    } else {
        fs::rename(tmp_path, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_utf16(text: &str, endian: Endian, bom: bool) -> Vec<u8> {
        let mut bytes = Vec::new();
        let units = text.encode_utf16();
        let all = if bom {
            std::iter::once(0xFEFF).chain(units).collect::<Vec<_>>()
        } else {
            units.collect()
        };
        for unit in all {
            match endian {
                Endian::Little => bytes.extend_from_slice(&unit.to_le_bytes()),
                Endian::Big => bytes.extend_from_slice(&unit.to_be_bytes()),
            }
        }
        bytes
    }

    fn encode_utf32(text: &str, endian: Endian) -> Vec<u8> {
        let mut bytes = Vec::new();
        for c in text.chars() {
            match endian {
                Endian::Little => bytes.extend_from_slice(&u32::from(c).to_le_bytes()),
                Endian::Big => bytes.extend_from_slice(&u32::from(c).to_be_bytes()),
            }
        }
        bytes
    }

    #[test]
    fn decode_utf8_round_trip() {
        let text = "# Héllo ✓\n\nplain *markdown*\n";
        assert_eq!(decode_text(text.as_bytes()).ok().as_deref(), Some(text));
    }

    #[test]
    fn decode_utf8_strips_bom() {
        let mut bytes = b"\xef\xbb\xbf".to_vec();
        bytes.extend_from_slice("# Title\n".as_bytes());
        assert_eq!(decode_text(&bytes).ok().as_deref(), Some("# Title\n"));
    }

    #[test]
    fn decode_utf16le_round_trip() {
        let text = "# Héllo\n";
        let bytes = encode_utf16(text, Endian::Little, false);
        assert_eq!(decode_text(&bytes).ok().as_deref(), Some(text));
    }

    #[test]
    fn decode_utf16be_with_bom_round_trip() {
        let text = "# Héllo\n";
        let bytes = encode_utf16(text, Endian::Big, true);
        assert_eq!(decode_text(&bytes).ok().as_deref(), Some(text));
    }

    #[test]
    fn decode_utf32_round_trips_both_endians() {
        let text = "héllo ✓\n";
        for endian in [Endian::Little, Endian::Big] {
            let bytes = encode_utf32(text, endian);
            assert_eq!(decode_text(&bytes).ok().as_deref(), Some(text));
        }
    }

    #[test]
    fn decode_ascii_round_trip() {
        let text = "# Plain ASCII markdown\n";
        assert_eq!(decode_text(text.as_bytes()).ok().as_deref(), Some(text));
    }

    #[test]
    fn decode_latin1_round_trip() {
        // "café!" as ISO-8859-1 bytes; the odd length keeps the
        // wide-encoding rungs out of the way.
        let bytes = b"caf\xe9!";
        assert_eq!(decode_text(bytes).ok().as_deref(), Some("café!"));
    }

    #[test]
    fn decode_rejects_undetectable_bytes() {
        // A lone C1 control byte: invalid UTF-8, odd length for the wide
        // encodings, non-ASCII, and implausible as Latin-1 text.
        let result = decode_text(&[0x90]);
        assert!(matches!(result, Err(LoadError::UnsupportedEncoding)));
    }

    #[test]
    fn decode_rejects_embedded_nul() {
        let result = decode_text(b"a\x00b\x00c");
        assert!(matches!(result, Err(LoadError::UnsupportedEncoding)));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().ok();
        let Some(dir) = dir else {
            return;
        };
        let result = load(&dir.path().join("absent.md"));
        assert!(matches!(result, Err(LoadError::Io(_))));
    }

    #[test]
    fn load_reads_document_snapshot() {
        let Ok(dir) = tempfile::tempdir() else {
            return;
        };
        let path = dir.path().join("note.md");
        fs::write(&path, "# Note\n").ok();

        let Ok(doc) = load(&path) else {
            unreachable!("load failed for a readable UTF-8 file");
        };
        assert_eq!(doc.text, "# Note\n");
        assert_eq!(doc.source_path, path);
    }

    #[test]
    fn write_text_creates_and_overwrites() {
        let Ok(dir) = tempfile::tempdir() else {
            return;
        };
        let path = dir.path().join("out.md");

        assert!(write_text(&path, "first").is_ok());
        assert_eq!(fs::read_to_string(&path).ok().as_deref(), Some("first"));

        assert!(write_text(&path, "second").is_ok());
        assert_eq!(fs::read_to_string(&path).ok().as_deref(), Some("second"));
    }

    #[test]
    fn write_text_rejects_missing_filename() {
        assert!(write_text(Path::new("/"), "data").is_err());
    }
}
