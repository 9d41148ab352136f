//! Byte payloads for the whole note tree and for single notes.
//!
//! The whole-store payload is UTF-8 JSON. Older files carried the same JSON base64-encoded;
//! [`decode`] tries plain JSON first and only then the base64 form, so both read back.
//! Single-note payloads are the note text as UTF-8 bytes.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use thiserror::Error;
use tracing::debug;

use crate::store::NoteStore;

/// Base64 as older payloads were written: standard alphabet, padding optional on read.
const LEGACY_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Failed to serialize note store")]
    Encode(#[source] serde_json::Error),

    #[error("Invalid note store payload: neither JSON nor legacy-encoded JSON")]
    InvalidFormat,

    #[error("Invalid interchange file")]
    Interchange(#[source] serde_json::Error),
}

pub fn encode(store: &NoteStore) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(store).map_err(CodecError::Encode)
}

pub fn decode(payload: &[u8]) -> Result<NoteStore, CodecError> {
    match serde_json::from_slice(payload) {
        Ok(store) => Ok(store),
        Err(e) => {
            debug!("Payload is not plain JSON ({}), trying legacy encoding", e);
            decode_legacy(payload).ok_or(CodecError::InvalidFormat)
        }
    }
}

fn decode_legacy(payload: &[u8]) -> Option<NoteStore> {
    let text = std::str::from_utf8(payload).ok()?;
    let json = LEGACY_ENGINE.decode(text.trim()).ok()?;
    serde_json::from_slice(&json).ok()
}

pub fn encode_note(content: &str) -> Vec<u8> {
    content.as_bytes().to_vec()
}

/// Invalid UTF-8 sequences are replaced rather than rejected.
pub fn decode_note(payload: &[u8]) -> String {
    String::from_utf8_lossy(payload).into_owned()
}

/// Pretty-printed JSON for manual backups.
pub fn to_interchange_json(store: &NoteStore) -> Result<String, CodecError> {
    serde_json::to_string_pretty(store).map_err(CodecError::Encode)
}

pub fn from_interchange_json(json: &str) -> Result<NoteStore, CodecError> {
    serde_json::from_str(json).map_err(CodecError::Interchange)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ItemId, ItemKind};
    use base64::engine::general_purpose::STANDARD;

    fn sample_store() -> NoteStore {
        let mut store = NoteStore::new();
        let folder = store.create_folder();
        store.rename(&folder, ItemKind::Folder, "Ünïcødé / \"quoted\"").unwrap();
        let inside = store.create_note();
        store.set_content(&inside, "line one\n$$Title$$ **bold** 🦀\t\u{0}").unwrap();
        store.move_note(&inside, &folder).unwrap();
        let root = store.create_note();
        store.rename(&root, ItemKind::Note, "日本語.txt").unwrap();
        store
    }

    #[test]
    fn test_round_trip_preserves_store() {
        let store = sample_store();
        let payload = encode(&store).unwrap();
        assert_eq!(decode(&payload).unwrap(), store);
        assert_eq!(decode(&encode(&NoteStore::new()).unwrap()).unwrap(), NoteStore::new());
    }

    #[test]
    fn test_payload_field_names() {
        let mut store = NoteStore::new();
        let id = store.create_note();
        let value: serde_json::Value = serde_json::from_slice(&encode(&store).unwrap()).unwrap();

        let note = &value["files"][id.as_str()];
        assert_eq!(note["name"], "New File.txt");
        assert!(note["folderId"].is_null());
        assert!(value["folders"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_decode_legacy_base64_payload() {
        let store = sample_store();
        let legacy = STANDARD.encode(encode(&store).unwrap());
        assert_eq!(decode(legacy.as_bytes()).unwrap(), store);

        let unpadded = legacy.trim_end_matches('=').to_string() + "\n";
        assert_eq!(decode(unpadded.as_bytes()).unwrap(), store);
    }

    #[test]
    fn test_decode_accepts_hand_written_legacy_ids() {
        let json = r#"{
            "folders": { "folder_1700000000000": { "id": "folder_1700000000000", "name": "Work", "files": [] } },
            "files": { "file_1700000000001": { "id": "file_1700000000001", "name": "a.txt", "content": "hi", "folderId": "folder_1700000000000" } }
        }"#;
        let store = decode(json.as_bytes()).unwrap();
        let note = store.note(&ItemId::from("file_1700000000001")).unwrap();
        assert_eq!(store.folder_name_of(note), Some("Work"));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(decode(b"not json, not base64!"), Err(CodecError::InvalidFormat)));
        assert!(matches!(decode(&[0xff, 0xfe, 0x00]), Err(CodecError::InvalidFormat)));
        // valid base64, but not JSON underneath
        assert!(matches!(decode(STANDARD.encode("hello").as_bytes()), Err(CodecError::InvalidFormat)));
    }

    #[test]
    fn test_note_payload_is_identity_over_text() {
        let text = "plain <text> & \"quotes\" 🦀";
        assert_eq!(encode_note(text), text.as_bytes());
        assert_eq!(decode_note(&encode_note(text)), text);
        assert_eq!(decode_note(&[b'a', 0xff, b'b']), "a\u{fffd}b");
    }

    #[test]
    fn test_interchange_is_pretty_and_strict() {
        let store = sample_store();
        let json = to_interchange_json(&store).unwrap();
        assert!(json.contains("\n  "));
        assert_eq!(from_interchange_json(&json).unwrap(), store);

        let legacy = STANDARD.encode(encode(&store).unwrap());
        assert!(matches!(from_interchange_json(&legacy), Err(CodecError::Interchange(_))));
    }
}
