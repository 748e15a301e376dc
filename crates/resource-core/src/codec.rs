// This file is part of resourced.

// resourced is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// resourced is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with resourced.  If not, see <http://www.gnu.org/licenses/>.

//! Binary layout for root chunks and update chunks (§3, §4.1).

use crate::error::{Error, Result};
use crate::Signature65;

/// Maximum total chunk payload size, enforced on both encode and decode.
pub const MAX_CHUNK_SIZE: usize = 4096;

/// Byte length of an unsigned root chunk payload.
pub const ROOT_CHUNK_SIZE: usize = 16;

/// A decoded update chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedUpdate {
    /// Present iff validation is enabled for this chunk.
    pub signature: Option<Signature65>,
    /// Period this update belongs to.
    pub period: u32,
    /// Version within `period`.
    pub version: u32,
    /// Resource name, as raw bytes.
    pub name: Vec<u8>,
    /// Update payload.
    pub data: Vec<u8>,
}

/// Encodes the 16-byte root payload: `start_block` (u64 LE) ‖ `frequency`
/// (u64 LE).
pub fn encode_root(start_block: u64, frequency: u64) -> [u8; ROOT_CHUNK_SIZE] {
    let mut out = [0u8; ROOT_CHUNK_SIZE];
    out[0..8].copy_from_slice(&start_block.to_le_bytes());
    out[8..16].copy_from_slice(&frequency.to_le_bytes());
    out
}

/// Decodes a root payload. The payload must be exactly 16 bytes.
pub fn decode_root(chunk: &[u8]) -> Result<(u64, u64)> {
    if chunk.len() != ROOT_CHUNK_SIZE {
        return Err(Error::MalformedChunk(format!(
            "root payload length {} != {}",
            chunk.len(),
            ROOT_CHUNK_SIZE
        )));
    }
    let start_block = u64::from_le_bytes(chunk[0..8].try_into().unwrap());
    let frequency = u64::from_le_bytes(chunk[8..16].try_into().unwrap());
    Ok((start_block, frequency))
}

/// Encodes an update chunk payload per §3/§4.1.
///
/// `hdr_len = 8 + name.len()` covers `period`, `version` and `name` but not
/// the two u16 length prefixes. Fails if `name`/`data` don't fit in a u16, or
/// the total encoded size exceeds [`MAX_CHUNK_SIZE`].
pub fn encode_update(
    period: u32,
    version: u32,
    name: &[u8],
    data: &[u8],
    signature: Option<Signature65>,
) -> Result<Vec<u8>> {
    let hdr_len = 8usize
        .checked_add(name.len())
        .ok_or_else(|| Error::InvalidArgument("name too long".into()))?;
    let data_len = data.len();
    if hdr_len > u16::MAX as usize || data_len > u16::MAX as usize {
        return Err(Error::InvalidArgument(
            "name or data length exceeds u16 range".into(),
        ));
    }
    let sig_len = if signature.is_some() { 65 } else { 0 };
    let total = 4 + hdr_len + data_len + sig_len;
    if total > MAX_CHUNK_SIZE {
        return Err(Error::InvalidArgument(format!(
            "encoded update chunk would be {total} bytes, exceeds {MAX_CHUNK_SIZE}"
        )));
    }

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&(hdr_len as u16).to_le_bytes());
    out.extend_from_slice(&(data_len as u16).to_le_bytes());
    out.extend_from_slice(&period.to_le_bytes());
    out.extend_from_slice(&version.to_le_bytes());
    out.extend_from_slice(name);
    out.extend_from_slice(data);
    if let Some(sig) = signature {
        out.extend_from_slice(&sig);
    }
    Ok(out)
}

/// Decodes an update chunk payload. `validated` selects whether a trailing
/// 65-byte signature is expected.
pub fn decode_update(chunk: &[u8], validated: bool) -> Result<DecodedUpdate> {
    if chunk.len() < 4 {
        return Err(Error::MalformedChunk("chunk shorter than length prefix".into()));
    }
    let hdr_len = u16::from_le_bytes(chunk[0..2].try_into().unwrap()) as usize;
    let data_len = u16::from_le_bytes(chunk[2..4].try_into().unwrap()) as usize;

    // hdr_len/data_len are each at most u16::MAX, so this sum never overflows usize.
    let required = hdr_len + data_len + 4;
    if required > chunk.len() || hdr_len < 8 {
        return Err(Error::MalformedChunk(format!(
            "hdr_len ({hdr_len}) + data_len ({data_len}) + 4 exceeds chunk length ({})",
            chunk.len()
        )));
    }

    let period = u32::from_le_bytes(chunk[4..8].try_into().unwrap());
    let version = u32::from_le_bytes(chunk[8..12].try_into().unwrap());
    let namelen = hdr_len - 8;
    let name_start = 12;
    let name_end = name_start + namelen;
    let name = chunk[name_start..name_end].to_vec();

    let data_start = 4 + hdr_len;
    let data_end = data_start + data_len;
    let data = chunk[data_start..data_end].to_vec();

    let signature = if validated {
        let sig_start = data_end;
        let sig_end = sig_start + 65;
        if sig_end > chunk.len() {
            return Err(Error::MalformedChunk(
                "validation enabled but chunk is missing the 65-byte signature".into(),
            ));
        }
        let mut sig = [0u8; 65];
        sig.copy_from_slice(&chunk[sig_start..sig_end]);
        Some(sig)
    } else {
        None
    };

    Ok(DecodedUpdate {
        signature,
        period,
        version,
        name,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_round_trips() {
        let payload = encode_root(4200, 42);
        assert_eq!(
            payload,
            [0x68, 0x10, 0, 0, 0, 0, 0, 0, 0x2A, 0, 0, 0, 0, 0, 0, 0]
        );
        assert_eq!(decode_root(&payload).unwrap(), (4200, 42));
    }

    #[test]
    fn root_rejects_wrong_length() {
        assert!(decode_root(&[0u8; 15]).is_err());
        assert!(decode_root(&[0u8; 17]).is_err());
    }

    #[test]
    fn update_round_trips_without_signature() {
        let encoded = encode_update(2, 1, b"foo.bar", b"hello", None).unwrap();
        let decoded = decode_update(&encoded, false).unwrap();
        assert_eq!(decoded.period, 2);
        assert_eq!(decoded.version, 1);
        assert_eq!(decoded.name, b"foo.bar");
        assert_eq!(decoded.data, b"hello");
        assert_eq!(decoded.signature, None);
    }

    #[test]
    fn update_round_trips_with_signature() {
        let sig = [7u8; 65];
        let encoded = encode_update(9, 3, b"x", b"data", Some(sig)).unwrap();
        let decoded = decode_update(&encoded, true).unwrap();
        assert_eq!(decoded.signature, Some(sig));
        assert_eq!(decoded.name, b"x");
    }

    #[test]
    fn update_rejects_oversized_payload() {
        let name = vec![0u8; 10];
        let data = vec![0u8; MAX_CHUNK_SIZE];
        assert!(encode_update(1, 1, &name, &data, None).is_err());
    }

    #[test]
    fn update_decode_rejects_truncated_chunk() {
        let encoded = encode_update(1, 1, b"name", b"payload", None).unwrap();
        let truncated = &encoded[..encoded.len() - 2];
        assert!(decode_update(truncated, false).is_err());
    }

    #[test]
    fn update_accepts_exactly_the_size_limit() {
        // overhead here is 4 (len prefixes) + 8 (period/version) + name len
        let name = b"foo.bar".to_vec();
        let overhead = 4 + 8 + name.len();
        let data = vec![0xAB; MAX_CHUNK_SIZE - overhead];
        let encoded = encode_update(1, 1, &name, &data, None).unwrap();
        assert_eq!(encoded.len(), MAX_CHUNK_SIZE);
        let one_byte_more = vec![0xAB; MAX_CHUNK_SIZE - overhead + 1];
        assert!(encode_update(1, 1, &name, &one_byte_more, None).is_err());
    }
}
