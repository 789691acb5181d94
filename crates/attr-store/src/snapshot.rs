// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Opaque whole-column persistence blobs.
//!
//! A snapshot carries the column and its default as CBOR, tagged with the
//! attribute type name and a blake3 digest of the payload. The layout is
//! private to each store family and is not meant to be cross-type compatible.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::SnapshotError;
use crate::ident::Hash;

/// Column contents as encoded inside a snapshot payload.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ColumnPayload<T> {
    pub(crate) default: T,
    pub(crate) data: Vec<T>,
}

/// Persistence blob produced by `save_data` and consumed by `restore_data`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSnapshot {
    type_name: String,
    payload: Bytes,
    digest: Hash,
}

impl StoreSnapshot {
    pub(crate) fn encode<T: Serialize>(
        type_name: &'static str,
        column: &ColumnPayload<T>,
    ) -> Result<Self, SnapshotError> {
        let mut buf = Vec::new();
        ciborium::into_writer(column, &mut buf)
            .map_err(|err| SnapshotError::Encode(err.to_string()))?;
        let payload = Bytes::from(buf);
        let digest = blake3::hash(&payload).into();
        Ok(Self {
            type_name: type_name.to_owned(),
            payload,
            digest,
        })
    }

    pub(crate) fn decode<T: DeserializeOwned>(
        &self,
        expected: &'static str,
    ) -> Result<ColumnPayload<T>, SnapshotError> {
        if self.type_name != expected {
            return Err(SnapshotError::TypeMismatch {
                expected,
                found: self.type_name.clone(),
            });
        }
        self.validate_digest()?;
        ciborium::from_reader(self.payload.as_ref())
            .map_err(|err| SnapshotError::Decode(err.to_string()))
    }

    /// Reassembles a snapshot from parts previously read out of one.
    ///
    /// Used by persistence layers that store snapshots externally; the digest
    /// is checked when the snapshot is restored.
    #[must_use]
    pub fn from_parts(type_name: impl Into<String>, payload: Bytes, digest: Hash) -> Self {
        Self {
            type_name: type_name.into(),
            payload,
            digest,
        }
    }

    /// Attribute type name of the store that produced this snapshot.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Encoded column payload.
    #[must_use]
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// blake3 digest of the payload.
    #[must_use]
    pub fn digest(&self) -> &Hash {
        &self.digest
    }

    /// Recomputes the payload digest and compares it against the stored one.
    ///
    /// # Errors
    /// Returns [`SnapshotError::DigestMismatch`] when the payload was altered.
    pub fn validate_digest(&self) -> Result<(), SnapshotError> {
        let actual: Hash = blake3::hash(&self.payload).into();
        if actual != self.digest {
            return Err(SnapshotError::DigestMismatch {
                expected: hex::encode(self.digest),
                found: hex::encode(actual),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn decode_checks_type_and_digest() {
        let column = ColumnPayload {
            default: 7_i64,
            data: vec![1, 2, 3],
        };
        let snap = StoreSnapshot::encode("long", &column).unwrap();
        let back: ColumnPayload<i64> = snap.decode("long").unwrap();
        assert_eq!(back.default, 7);
        assert_eq!(back.data, vec![1, 2, 3]);

        assert!(matches!(
            snap.decode::<i64>("integer"),
            Err(SnapshotError::TypeMismatch { .. })
        ));

        let mut tampered = snap.payload().to_vec();
        if let Some(last) = tampered.last_mut() {
            *last ^= 0xFF;
        }
        let forged = StoreSnapshot::from_parts("long", Bytes::from(tampered), *snap.digest());
        assert!(matches!(
            forged.decode::<i64>("long"),
            Err(SnapshotError::DigestMismatch { .. })
        ));
    }
}
