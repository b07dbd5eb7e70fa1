//! `.torrent` metainfo reading: root name and file list only.

use serde::Deserialize;
use serde_bencode::value::Value;

use crate::core::error::TorrentParseError;
use crate::core::model::TorrentInfo;
use crate::plugins::registry::TorrentParser;

// Names and paths stay raw: legacy keys are often GBK/Shift-JIS.
#[derive(Debug, Deserialize)]
struct RawFile {
    #[serde(default)]
    path: Vec<Value>,
    #[serde(default, rename = "path.utf-8")]
    path_utf8: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct RawInfo {
    #[serde(default)]
    name: Option<Value>,
    #[serde(default, rename = "name.utf-8")]
    name_utf8: Option<Value>,
    #[serde(default)]
    files: Option<Vec<RawFile>>,
}

#[derive(Debug, Deserialize)]
struct RawTorrent {
    info: RawInfo,
}

fn utf8(v: &Value) -> Option<String> {
    match v {
        Value::Bytes(b) => String::from_utf8(b.clone()).ok(),
        _ => None,
    }
}

fn lossy(v: &Value) -> Option<String> {
    match v {
        Value::Bytes(b) => Some(String::from_utf8_lossy(b).into_owned()),
        _ => None,
    }
}

impl RawFile {
    fn parts(&self) -> Vec<String> {
        self.path_utf8
            .as_ref()
            .and_then(|p| p.iter().map(utf8).collect::<Option<Vec<_>>>())
            .unwrap_or_else(|| self.path.iter().filter_map(lossy).collect())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BencodeParser;

impl BencodeParser {
    pub fn new() -> Self {
        Self
    }
}

impl TorrentParser for BencodeParser {
    fn parse(&self, bytes: &[u8]) -> Result<TorrentInfo, TorrentParseError> {
        let torrent: RawTorrent = serde_bencode::from_bytes(bytes)?;
        let info = torrent.info;

        let name = info
            .name_utf8
            .as_ref()
            .and_then(utf8)
            .or_else(|| info.name.as_ref().and_then(lossy))
            .filter(|n| !n.is_empty())
            .ok_or(TorrentParseError::MissingName)?;

        let files = match &info.files {
            Some(files) => files
                .iter()
                .map(|f| {
                    std::iter::once(name.clone())
                        .chain(f.parts())
                        .collect::<Vec<_>>()
                        .join("/")
                })
                .collect(),
            None => vec![name.clone()],
        };

        Ok(TorrentInfo { name, files })
    }
}
