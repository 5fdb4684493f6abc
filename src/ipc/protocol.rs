//! Wire protocol types for engine IPC
//!
//! Wire format:
//! ```text
//! Request:
//!   [4 bytes: total length (u32 BE)]
//!   [1 byte: descriptor length (u8)]
//!   [descriptor bytes (UTF-8)]
//!   [1 byte: method length (u8)]
//!   [method bytes (UTF-8)]
//!   [params bytes (MessagePack)]
//!
//! Response:
//!   [4 bytes: total length (u32 BE)]
//!   [1 byte: status (1 = ok, 0 = fault)]
//!   [payload bytes (MessagePack result or RemoteFault)]
//! ```

use std::fmt;
use std::io::{self, Read, Write};

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

/// Largest frame body accepted in either direction
pub const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

/// Errors raised when a call cannot reach or return from the remote endpoint
///
/// Every variant is a transport failure from the caller's point of view; the
/// variants only tell the cause apart for logging.
#[derive(Debug, Error)]
pub enum IpcError {
    #[error("unknown method: {0}")]
    UnknownMethod(String),

    #[error("interface descriptor mismatch: expected {expected}, found {found}")]
    DescriptorMismatch { expected: String, found: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] rmp_serde::encode::Error),

    #[error("deserialization error: {0}")]
    Deserialization(#[from] rmp_serde::decode::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid protocol: {0}")]
    InvalidProtocol(String),

    #[error("remote fault ({kind}): {message}")]
    Remote { kind: FaultKind, message: String },

    #[error("handler error: {0}")]
    Handler(String),
}

impl IpcError {
    /// Convert this error into the fault reported back over the wire
    pub fn to_fault(&self) -> RemoteFault {
        let kind = match self {
            IpcError::DescriptorMismatch { .. } => FaultKind::DescriptorMismatch,
            IpcError::UnknownMethod(_) => FaultKind::UnknownMethod,
            IpcError::Deserialization(_) | IpcError::InvalidProtocol(_) => FaultKind::BadRequest,
            IpcError::Remote { kind, .. } => *kind,
            _ => FaultKind::Handler,
        };
        RemoteFault {
            kind,
            message: self.to_string(),
        }
    }
}

/// Category of a fault returned by the serving side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaultKind {
    DescriptorMismatch,
    UnknownMethod,
    BadRequest,
    Handler,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FaultKind::DescriptorMismatch => "descriptor mismatch",
            FaultKind::UnknownMethod => "unknown method",
            FaultKind::BadRequest => "bad request",
            FaultKind::Handler => "handler",
        };
        f.write_str(name)
    }
}

/// Fault payload of an unsuccessful response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFault {
    pub kind: FaultKind,
    pub message: String,
}

impl From<RemoteFault> for IpcError {
    fn from(fault: RemoteFault) -> Self {
        IpcError::Remote {
            kind: fault.kind,
            message: fault.message,
        }
    }
}

/// Request parsed from wire format
#[derive(Debug, Clone)]
pub struct IpcRequest {
    /// Interface descriptor the caller expects to talk to
    pub descriptor: String,
    /// Method name
    pub method: String,
    /// Raw MessagePack params (not yet deserialized)
    pub params: Vec<u8>,
}

impl IpcRequest {
    /// Build a request, encoding `params` as MessagePack
    pub fn new<T: Serialize>(descriptor: &str, method: &str, params: &T) -> Result<Self, IpcError> {
        Ok(Self {
            descriptor: descriptor.to_string(),
            method: method.to_string(),
            params: rmp_serde::to_vec(params)?,
        })
    }

    /// Parse a request from raw bytes (after length prefix)
    pub fn from_bytes(data: &[u8]) -> Result<Self, IpcError> {
        if data.is_empty() {
            return Err(IpcError::InvalidProtocol("empty request".to_string()));
        }

        let (descriptor, rest) = read_short_str(data, "descriptor")?;
        let (method, params) = read_short_str(rest, "method")?;

        Ok(Self {
            descriptor,
            method,
            params: params.to_vec(),
        })
    }

    /// Serialize to wire format, including the length prefix
    pub fn to_bytes(&self) -> Result<Vec<u8>, IpcError> {
        let descriptor = self.descriptor.as_bytes();
        let method = self.method.as_bytes();
        if descriptor.len() > 255 {
            return Err(IpcError::InvalidProtocol("descriptor too long".to_string()));
        }
        if method.len() > 255 {
            return Err(IpcError::InvalidProtocol("method name too long".to_string()));
        }

        let total_len = 2 + descriptor.len() + method.len() + self.params.len();
        if total_len > MAX_FRAME_LEN {
            return Err(IpcError::InvalidProtocol(format!(
                "request too large: {total_len} bytes"
            )));
        }
        let mut buf = Vec::with_capacity(4 + total_len);

        buf.extend_from_slice(&(total_len as u32).to_be_bytes());
        buf.push(descriptor.len() as u8);
        buf.extend_from_slice(descriptor);
        buf.push(method.len() as u8);
        buf.extend_from_slice(method);
        buf.extend_from_slice(&self.params);

        Ok(buf)
    }

    /// Deserialize params into a typed call
    pub fn deserialize_params<T: DeserializeOwned>(&self) -> Result<T, IpcError> {
        rmp_serde::from_slice(&self.params).map_err(IpcError::from)
    }
}

/// Read a `[u8 len][bytes]` UTF-8 string, returning it and the remaining bytes
fn read_short_str<'a>(data: &'a [u8], what: &str) -> Result<(String, &'a [u8]), IpcError> {
    let Some((&len, rest)) = data.split_first() else {
        return Err(IpcError::InvalidProtocol(format!("missing {what}")));
    };
    let len = len as usize;
    if rest.len() < len {
        return Err(IpcError::InvalidProtocol(format!("truncated {what}")));
    }

    let value = std::str::from_utf8(&rest[..len])
        .map_err(|e| IpcError::InvalidProtocol(format!("invalid {what} UTF-8: {e}")))?;

    Ok((value.to_string(), &rest[len..]))
}

/// Response to be sent over wire
#[derive(Debug)]
pub struct IpcResponse {
    /// Whether the request succeeded
    pub success: bool,
    /// Raw MessagePack payload (result or fault)
    pub payload: Vec<u8>,
}

impl IpcResponse {
    /// Create a success response around an already-encoded result
    pub fn success(payload: Vec<u8>) -> Self {
        Self {
            success: true,
            payload,
        }
    }

    /// Create a fault response
    pub fn fault(fault: &RemoteFault) -> Result<Self, IpcError> {
        Ok(Self {
            success: false,
            payload: rmp_serde::to_vec(fault)?,
        })
    }

    /// Serialize to wire format
    pub fn to_bytes(&self) -> Vec<u8> {
        let total_len = 1 + self.payload.len();
        let mut buf = Vec::with_capacity(4 + total_len);

        buf.extend_from_slice(&(total_len as u32).to_be_bytes());
        buf.push(u8::from(self.success));
        buf.extend_from_slice(&self.payload);

        buf
    }

    /// Parse a response from raw bytes (after length prefix)
    pub fn from_bytes(data: &[u8]) -> Result<Self, IpcError> {
        let Some((&status, payload)) = data.split_first() else {
            return Err(IpcError::InvalidProtocol("empty response".to_string()));
        };

        Ok(Self {
            success: status == 1,
            payload: payload.to_vec(),
        })
    }

    /// Turn the response into the raw result bytes, or the remote fault
    pub fn into_result(self) -> Result<Vec<u8>, IpcError> {
        if self.success {
            return Ok(self.payload);
        }

        match rmp_serde::from_slice::<RemoteFault>(&self.payload) {
            Ok(fault) => Err(fault.into()),
            Err(_) => Err(IpcError::Remote {
                kind: FaultKind::Handler,
                message: String::from_utf8_lossy(&self.payload).into_owned(),
            }),
        }
    }
}

/// Read one length-prefixed frame body from a blocking stream
pub fn read_frame<R: Read>(reader: &mut R) -> Result<Vec<u8>, IpcError> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf)?;

    let len = u32::from_be_bytes(len_buf) as usize;
    check_frame_len(len)?;

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body)?;
    Ok(body)
}

/// Write an already length-prefixed frame to a blocking stream
pub fn write_frame<W: Write>(writer: &mut W, frame: &[u8]) -> Result<(), IpcError> {
    writer.write_all(frame)?;
    writer.flush()?;
    Ok(())
}

pub(crate) fn check_frame_len(len: usize) -> Result<(), IpcError> {
    if len == 0 || len > MAX_FRAME_LEN {
        return Err(IpcError::InvalidProtocol(format!("invalid frame length: {len}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct TestParams {
        version: String,
    }

    #[test]
    fn test_request_roundtrip() {
        let params = TestParams {
            version: "4.9.0".to_string(),
        };

        let request = IpcRequest::new("test.Interface", "installVersion", &params).unwrap();
        let bytes = request.to_bytes().unwrap();
        // Skip the 4-byte length prefix
        let parsed = IpcRequest::from_bytes(&bytes[4..]).unwrap();

        assert_eq!(parsed.descriptor, "test.Interface");
        assert_eq!(parsed.method, "installVersion");
        let decoded: TestParams = parsed.deserialize_params().unwrap();
        assert_eq!(decoded, params);
    }

    #[test]
    fn test_request_length_prefix_matches_body() {
        let request = IpcRequest::new("d", "m", &()).unwrap();
        let bytes = request.to_bytes().unwrap();
        let len = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
        assert_eq!(len, bytes.len() - 4);
    }

    #[test]
    fn test_request_truncated_method() {
        // descriptor "ab", then method length 5 with only 2 bytes following
        let data = [2, b'a', b'b', 5, b'x', b'y'];
        let result = IpcRequest::from_bytes(&data);
        assert!(matches!(result, Err(IpcError::InvalidProtocol(_))));
    }

    #[test]
    fn test_request_empty() {
        assert!(matches!(
            IpcRequest::from_bytes(&[]),
            Err(IpcError::InvalidProtocol(_))
        ));
    }

    #[test]
    fn test_request_method_too_long() {
        let request = IpcRequest {
            descriptor: "d".to_string(),
            method: "m".repeat(256),
            params: Vec::new(),
        };
        assert!(matches!(
            request.to_bytes(),
            Err(IpcError::InvalidProtocol(_))
        ));
    }

    #[test]
    fn test_response_success_roundtrip() {
        let payload = rmp_serde::to_vec(&"/data/cv/4.9.0").unwrap();
        let bytes = IpcResponse::success(payload).to_bytes();
        let parsed = IpcResponse::from_bytes(&bytes[4..]).unwrap();

        assert!(parsed.success);
        let raw = parsed.into_result().unwrap();
        let path: String = rmp_serde::from_slice(&raw).unwrap();
        assert_eq!(path, "/data/cv/4.9.0");
    }

    #[test]
    fn test_response_fault_roundtrip() {
        let fault = RemoteFault {
            kind: FaultKind::UnknownMethod,
            message: "unknown method: frobnicate".to_string(),
        };
        let bytes = IpcResponse::fault(&fault).unwrap().to_bytes();
        let parsed = IpcResponse::from_bytes(&bytes[4..]).unwrap();

        assert!(!parsed.success);
        match parsed.into_result() {
            Err(IpcError::Remote { kind, message }) => {
                assert_eq!(kind, FaultKind::UnknownMethod);
                assert_eq!(message, "unknown method: frobnicate");
            }
            other => panic!("expected remote fault, got {other:?}"),
        }
    }

    #[test]
    fn test_fault_kind_from_error() {
        let err = IpcError::DescriptorMismatch {
            expected: "a".to_string(),
            found: "b".to_string(),
        };
        assert_eq!(err.to_fault().kind, FaultKind::DescriptorMismatch);
        assert_eq!(
            IpcError::Handler("boom".to_string()).to_fault().kind,
            FaultKind::Handler
        );
    }

    #[test]
    fn test_read_frame_rejects_zero_length() {
        let mut data: &[u8] = &[0, 0, 0, 0];
        assert!(matches!(
            read_frame(&mut data),
            Err(IpcError::InvalidProtocol(_))
        ));
    }

    #[test]
    fn test_read_frame_body() {
        let request = IpcRequest::new("d", "m", &1u8).unwrap();
        let bytes = request.to_bytes().unwrap();
        let mut reader: &[u8] = &bytes;
        let body = read_frame(&mut reader).unwrap();
        assert_eq!(body, &bytes[4..]);
    }
}
