//! UpYun response types and parsers

use chrono::{DateTime, Utc};
use hyper::header::HeaderMap;
use hyper::StatusCode;
use serde::{Deserialize, Serialize};

/// Response header carrying the entry kind (`file` / `folder`)
pub const HEADER_FILE_TYPE: &str = "x-upyun-file-type";
/// Response header carrying the size in bytes
pub const HEADER_FILE_SIZE: &str = "x-upyun-file-size";
/// Response header carrying the modification time (epoch seconds)
pub const HEADER_FILE_DATE: &str = "x-upyun-file-date";

/// Listing type marker for plain files; every other marker is a folder
const FILE_MARKER: &str = "N";

/// Kind of a remote entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    #[default]
    File,
    Folder,
}

impl FileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::File => "file",
            FileKind::Folder => "folder",
        }
    }

    /// Kind from a metadata header value; unknown values count as files
    fn from_header(value: &str) -> Self {
        if value.eq_ignore_ascii_case("folder") {
            FileKind::Folder
        } else {
            FileKind::File
        }
    }
}

/// Parse an epoch-seconds timestamp; anything unparseable yields `None`
fn parse_epoch(value: &str) -> Option<DateTime<Utc>> {
    let secs: i64 = value.trim().parse().ok()?;
    DateTime::from_timestamp(secs, 0)
}

/// One line of a folder listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FileKind,
    /// Size in bytes, always 0 for folders
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
}

impl FileEntry {
    /// Parse one `name\tmarker\tsize\tepoch` record.
    ///
    /// Returns `None` for blank lines. Missing trailing fields default.
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            return None;
        }

        let mut fields = line.split('\t');
        let name = fields.next().unwrap_or_default().to_string();
        let kind = match fields.next() {
            Some(FILE_MARKER) => FileKind::File,
            _ => FileKind::Folder,
        };
        let size = match kind {
            FileKind::File => fields.next().and_then(|s| s.trim().parse().ok()).unwrap_or(0),
            FileKind::Folder => {
                fields.next();
                0
            }
        };
        let last_modified = fields.next().and_then(parse_epoch);

        Some(Self {
            name,
            kind,
            size,
            last_modified,
        })
    }

    pub fn is_folder(&self) -> bool {
        self.kind == FileKind::Folder
    }
}

/// Parse a whole listing body, preserving server order
pub fn parse_listing(body: &str) -> Vec<FileEntry> {
    if body.is_empty() {
        return Vec::new();
    }
    body.split('\n').filter_map(FileEntry::parse_line).collect()
}

/// Metadata of a single remote path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    #[serde(rename = "type")]
    pub kind: FileKind,
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
}

impl FileInfo {
    /// Read the `x-upyun-file-*` headers. Missing or malformed values
    /// default to a zero-sized file with no timestamp.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

        Self {
            kind: header(HEADER_FILE_TYPE)
                .map(FileKind::from_header)
                .unwrap_or_default(),
            size: header(HEADER_FILE_SIZE)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(0),
            last_modified: header(HEADER_FILE_DATE).and_then(parse_epoch),
        }
    }
}

/// Result of a HEAD probe: the raw status plus whatever metadata came back.
///
/// A missing path is not an error; it shows up as `status == 404` with a
/// default [`FileInfo`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStat {
    pub status: StatusCode,
    pub info: FileInfo,
}

impl FileStat {
    pub fn exists(&self) -> bool {
        self.status.is_success()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::HeaderValue;

    #[test]
    fn test_parse_empty_listing() {
        assert!(parse_listing("").is_empty());
    }

    #[test]
    fn test_parse_listing_preserves_order_and_kinds() {
        let body = "zeta.jpg\tN\t1024\t1445412480\nalpha\tF\t0\t1445412481\nbeta.txt\tN\t12\t1445412482";
        let entries = parse_listing(body);

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].name, "zeta.jpg");
        assert_eq!(entries[0].kind, FileKind::File);
        assert_eq!(entries[0].size, 1024);
        assert_eq!(
            entries[0].last_modified,
            DateTime::from_timestamp(1445412480, 0)
        );

        assert_eq!(entries[1].name, "alpha");
        assert!(entries[1].is_folder());
        assert_eq!(entries[1].size, 0);

        assert_eq!(entries[2].name, "beta.txt");
        assert_eq!(entries[2].size, 12);
    }

    #[test]
    fn test_unknown_marker_is_folder_with_zero_size() {
        let entry = FileEntry::parse_line("photos\tX\t4096\t0").unwrap();
        assert_eq!(entry.kind, FileKind::Folder);
        assert_eq!(entry.size, 0);
    }

    #[test]
    fn test_listing_skips_blank_lines() {
        let entries = parse_listing("a.txt\tN\t1\t1\n\n");
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_listing_tolerates_short_records() {
        let entry = FileEntry::parse_line("lonely").unwrap();
        assert_eq!(entry.name, "lonely");
        assert_eq!(entry.kind, FileKind::Folder);
        assert_eq!(entry.size, 0);
        assert_eq!(entry.last_modified, None);
    }

    #[test]
    fn test_file_info_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(HEADER_FILE_TYPE, HeaderValue::from_static("folder"));
        headers.insert(HEADER_FILE_SIZE, HeaderValue::from_static("0"));
        headers.insert(HEADER_FILE_DATE, HeaderValue::from_static("1445412480"));

        let info = FileInfo::from_headers(&headers);
        assert_eq!(info.kind, FileKind::Folder);
        assert_eq!(info.size, 0);
        assert_eq!(info.last_modified, DateTime::from_timestamp(1445412480, 0));
    }

    #[test]
    fn test_file_info_defaults_when_headers_missing() {
        let info = FileInfo::from_headers(&HeaderMap::new());
        assert_eq!(info.kind, FileKind::File);
        assert_eq!(info.size, 0);
        assert_eq!(info.last_modified, None);
    }

    #[test]
    fn test_file_info_ignores_garbage_size() {
        let mut headers = HeaderMap::new();
        headers.insert(HEADER_FILE_SIZE, HeaderValue::from_static("lots"));
        assert_eq!(FileInfo::from_headers(&headers).size, 0);
    }

    #[test]
    fn test_entry_serializes_kind_as_type() {
        let entry = FileEntry::parse_line("a.txt\tN\t3\t0").unwrap();
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "file");
        assert_eq!(json["size"], 3);
    }
}
